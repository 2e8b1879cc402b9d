//! MIDI transport: port discovery, raw byte I/O and channel-message parsing.

mod ports;

use std::fmt;

pub use ports::{list_input_ports, list_output_ports, open_input, open_output, MidiInputHandle, MidiOutputHandle};

/// Client name registered with the MIDI driver.
pub(crate) const CLIENT_NAME: &str = "tonedit";

/// Channel messages the editor reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiEventKind {
    ControlChange {
        channel: u8,
        controller: u8,
        value: u8,
    },
    ProgramChange {
        channel: u8,
        program: u8,
    },
}

/// A message delivered from the input port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundMessage {
    /// A complete `F0 .. F7` packet, not yet validated.
    SysEx(Vec<u8>),
    Channel(MidiEventKind),
}

/// Information about an available MIDI port
#[derive(Debug, Clone)]
pub struct MidiPortInfo {
    pub index: usize,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The MIDI driver could not be initialised.
    Init(String),
    PortNotFound {
        direction: &'static str,
        name: String,
    },
    /// No port name configured.
    NotConfigured(&'static str),
    Connect(String),
    NotConnected,
    Send(String),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Init(e) => write!(f, "MIDI driver unavailable: {}", e),
            Self::PortNotFound { direction, name } => {
                write!(f, "MIDI {} port \"{}\" not found", direction, name)
            }
            Self::NotConfigured(direction) => {
                write!(f, "no MIDI {} port configured", direction)
            }
            Self::Connect(e) => write!(f, "could not open MIDI port: {}", e),
            Self::NotConnected => write!(f, "MIDI output port is not open"),
            Self::Send(e) => write!(f, "MIDI send failed: {}", e),
        }
    }
}

impl std::error::Error for TransportError {}

/// Outbound side of the transport. Implemented by the output port and by test doubles.
pub trait MidiTransport: Send + Sync {
    fn send(&self, bytes: &[u8]) -> Result<(), TransportError>;
}

/// Parse a raw channel message. Only bank select and program change matter here.
pub fn parse_midi_message(data: &[u8]) -> Option<MidiEventKind> {
    if data.is_empty() {
        return None;
    }

    let status = data[0];
    let channel = status & 0x0F;
    let message_type = status & 0xF0;

    match message_type {
        0xB0 => {
            if data.len() >= 3 {
                Some(MidiEventKind::ControlChange {
                    channel,
                    controller: data[1],
                    value: data[2],
                })
            } else {
                None
            }
        }
        0xC0 => {
            if data.len() >= 2 {
                Some(MidiEventKind::ProgramChange {
                    channel,
                    program: data[1],
                })
            } else {
                None
            }
        }
        _ => None,
    }
}

/// Pick a port by exact name, falling back to a prefix match
/// (drivers often append client/port numbers).
pub(crate) fn find_port<'a>(ports: &'a [MidiPortInfo], wanted: &str) -> Option<&'a MidiPortInfo> {
    ports
        .iter()
        .find(|p| p.name == wanted)
        .or_else(|| ports.iter().find(|p| p.name.starts_with(wanted)))
}
