//! Reassembles SysEx packets from an arbitrarily chunked MIDI byte stream.

use super::packet::{SYSEX_END, SYSEX_START};

/// Accumulates bytes across calls and emits each complete `F0 .. F7` packet.
#[derive(Debug, Default)]
pub struct SysexFramer {
    buffer: Vec<u8>,
    in_packet: bool,
}

impl SysexFramer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn in_packet(&self) -> bool {
        self.in_packet
    }

    /// Feed one chunk; returns every packet completed by it.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<Vec<u8>> {
        let mut out = Vec::new();
        for &byte in bytes {
            if let Some(packet) = self.push_byte(byte) {
                out.push(packet);
            }
        }
        out
    }

    fn push_byte(&mut self, byte: u8) -> Option<Vec<u8>> {
        if !self.in_packet {
            if byte == SYSEX_START {
                self.start();
            }
            return None;
        }

        match byte {
            SYSEX_END => {
                self.buffer.push(byte);
                self.in_packet = false;
                Some(std::mem::take(&mut self.buffer))
            }
            SYSEX_START => {
                log::debug!(target: "sysex", "restarting interrupted packet after {} bytes", self.buffer.len());
                self.start();
                None
            }
            b if b & 0x80 != 0 => {
                log::debug!(target: "sysex", "discarding packet: status byte {:#04x} inside sysex", b);
                self.reset();
                None
            }
            b => {
                self.buffer.push(b);
                None
            }
        }
    }

    fn start(&mut self) {
        self.buffer.clear();
        self.buffer.push(SYSEX_START);
        self.in_packet = true;
    }

    pub fn reset(&mut self) {
        self.buffer.clear();
        self.in_packet = false;
    }
}
