//! Bulk parameter-set transfer.
//!
//! Upload:   SBS(send) -> ACK -> { HBS(chunk + CRC) -> ACK }* -> ESS -> EBS
//! Download: SBS(receive) -> ACK -> HBR -> { data | ACK -> request-next }* until ESS -> EBS
//!
//! Data packets carry the 7-bit encoded chunk followed by the 7-bit encoded,
//! base-128 packed CRC-32 of the header (without `F0`) plus the raw chunk.

use std::fmt;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError};

use super::packet::{build, short_packet, Command, SysexPacket, HEADER_LEN};
use super::transcode::{
    decode_7bit, encode_7bit, encoded_len, pack_crc, unpack_crc, TranscodeError, CRC_PACKED_LEN,
};
use crate::midi::{MidiTransport, TransportError};

pub const ACK_TIMEOUT: Duration = Duration::from_secs(4);

/// Largest raw chunk carried by one data packet.
pub const CHUNK_SIZE: usize = 128;

/// Start-session sub-commands.
pub const SESSION_RECEIVE: u8 = 2;
pub const SESSION_SEND: u8 = 3;

/// Parameter set id of a user tone.
pub const USER_TONE_PARAMETER_SET: u16 = 3;

/// Wire length of the CRC field at the end of a data packet.
const CRC_FIELD_LEN: usize = (CRC_PACKED_LEN * 8).div_ceil(7);

/// What a bulk transfer reads or writes on the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BulkTarget {
    /// Memory slot, carried in the block field
    pub slot: u16,
    /// Parameter set, carried in the type field
    pub parameter_set: u16,
}

impl BulkTarget {
    pub fn user_tone(slot: u16) -> Self {
        Self {
            slot,
            parameter_set: USER_TONE_PARAMETER_SET,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BulkError {
    /// No response within the ACK timeout.
    Timeout { after: &'static str },
    Transcode(TranscodeError),
    Transport(TransportError),
    /// Chunks with a bad CRC were dropped from the downloaded data.
    CrcMismatch { dropped: usize },
    /// The packet route closed while waiting.
    Disconnected,
    /// Another transfer already owns the bulk route.
    Busy,
}

impl fmt::Display for BulkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout { after } => write!(f, "timed out waiting for the synth after {}", after),
            Self::Transcode(e) => write!(f, "corrupt bulk data: {}", e),
            Self::Transport(e) => write!(f, "{}", e),
            Self::CrcMismatch { dropped } => {
                write!(f, "{} chunk(s) failed CRC check; data incomplete", dropped)
            }
            Self::Disconnected => write!(f, "bulk transfer route closed"),
            Self::Busy => write!(f, "another bulk transfer is in progress"),
        }
    }
}

impl std::error::Error for BulkError {}

impl From<TranscodeError> for BulkError {
    fn from(e: TranscodeError) -> Self {
        Self::Transcode(e)
    }
}

impl From<TransportError> for BulkError {
    fn from(e: TransportError) -> Self {
        Self::Transport(e)
    }
}

pub fn start_session_packet(target: BulkTarget, sub_command: u8) -> Vec<u8> {
    let mut bytes = build(Command::StartBulkSession, target.slot, target.parameter_set, &[]);
    bytes[6] = sub_command;
    bytes
}

pub fn block_request_packet(target: BulkTarget) -> Vec<u8> {
    build(Command::HostBlockRequest, target.slot, target.parameter_set, &[])
}

fn chunk_crc(header: &[u8], data: &[u8]) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(&header[1..HEADER_LEN]);
    hasher.update(data);
    hasher.finalize()
}

/// Build a data packet for one chunk.
pub fn data_packet(target: BulkTarget, chunk: &[u8]) -> Vec<u8> {
    let header = build(Command::HostBlockSend, target.slot, target.parameter_set, &[]);
    let crc = chunk_crc(&header, chunk);

    let mut payload = encode_7bit(chunk);
    payload.extend(encode_7bit(&pack_crc(crc)));
    build(Command::HostBlockSend, target.slot, target.parameter_set, &payload)
}

/// Decode a data packet. `Ok(None)` when the CRC does not match.
pub fn verify_data_packet(packet: &SysexPacket) -> Result<Option<Vec<u8>>, TranscodeError> {
    let payload = packet.payload();
    if payload.len() < CRC_FIELD_LEN {
        return Ok(None);
    }
    let (data_field, crc_field) = payload.split_at(payload.len() - CRC_FIELD_LEN);
    let data = decode_7bit(data_field)?;
    let expected = unpack_crc(&decode_7bit(crc_field)?);
    let actual = chunk_crc(packet.as_bytes(), &data);
    Ok((expected == actual).then_some(data))
}

/// Result of feeding one packet to [`BulkState::accept`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accepted {
    Ack,
    Data,
    EndOfData,
    Ignored,
}

/// Handshake state owned by one transfer.
#[derive(Debug, Default)]
pub struct BulkState {
    pub have_got_ack: bool,
    pub have_got_ess: bool,
    pub received: Vec<u8>,
    pub dropped_chunks: usize,
}

impl BulkState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accept(&mut self, packet: &SysexPacket) -> Result<Accepted, BulkError> {
        match packet.command() {
            Some(Command::Ack) => {
                self.have_got_ack = true;
                Ok(Accepted::Ack)
            }
            Some(Command::EndSendSession) | Some(Command::EndBulkSession) => {
                self.have_got_ack = true;
                self.have_got_ess = true;
                Ok(Accepted::EndOfData)
            }
            Some(Command::HostBlockSend) => {
                match verify_data_packet(packet)? {
                    Some(data) => {
                        log::debug!(target: "bulk", "chunk of {} bytes", data.len());
                        self.received.extend(data);
                    }
                    None => {
                        log::warn!(target: "bulk", "CRC mismatch, dropping chunk of {} bytes", packet.payload().len());
                        self.dropped_chunks += 1;
                    }
                }
                self.have_got_ack = true;
                Ok(Accepted::Data)
            }
            _ => {
                log::debug!(target: "bulk", "ignoring command {:#04x} during bulk session", packet.command_byte());
                Ok(Accepted::Ignored)
            }
        }
    }
}

/// One in-flight transfer. Packets routed to the session arrive on `inbox`.
pub struct BulkSession<'a> {
    transport: &'a dyn MidiTransport,
    inbox: Receiver<SysexPacket>,
    ack_timeout: Duration,
    send_delay: Duration,
    state: BulkState,
}

impl<'a> BulkSession<'a> {
    pub fn new(transport: &'a dyn MidiTransport, inbox: Receiver<SysexPacket>) -> Self {
        Self {
            transport,
            inbox,
            ack_timeout: ACK_TIMEOUT,
            send_delay: Duration::ZERO,
            state: BulkState::new(),
        }
    }

    pub fn with_ack_timeout(mut self, timeout: Duration) -> Self {
        self.ack_timeout = timeout;
        self
    }

    pub fn with_send_delay(mut self, delay: Duration) -> Self {
        self.send_delay = delay;
        self
    }

    pub fn state(&self) -> &BulkState {
        &self.state
    }

    /// Send `blob` to the device.
    pub fn upload(mut self, target: BulkTarget, blob: &[u8]) -> Result<(), BulkError> {
        let result = self.run_upload(target, blob);
        if result.is_err() {
            self.abort();
        }
        result
    }

    /// Read a parameter set from the device.
    pub fn download(mut self, target: BulkTarget) -> Result<Vec<u8>, BulkError> {
        let result = self.run_download(target);
        if result.is_err() {
            self.abort();
        }
        result
    }

    fn run_upload(&mut self, target: BulkTarget, blob: &[u8]) -> Result<(), BulkError> {
        log::info!(target: "bulk", "upload {} bytes to slot {}", blob.len(), target.slot);
        self.send(&start_session_packet(target, SESSION_SEND))?;
        self.wait_ack("start session")?;

        for (index, chunk) in blob.chunks(CHUNK_SIZE).enumerate() {
            log::debug!(target: "bulk", "sending chunk {} ({} bytes, {} on the wire)", index, chunk.len(), encoded_len(chunk.len()));
            self.send(&data_packet(target, chunk))?;
            self.wait_ack("data chunk")?;
        }

        self.send(&short_packet(Command::EndSendSession))?;
        self.send(&short_packet(Command::EndBulkSession))?;
        Ok(())
    }

    fn run_download(&mut self, target: BulkTarget) -> Result<Vec<u8>, BulkError> {
        log::info!(target: "bulk", "download slot {}", target.slot);
        self.send(&start_session_packet(target, SESSION_RECEIVE))?;
        self.wait_ack("start session")?;

        self.send(&block_request_packet(target))?;
        loop {
            self.wait_ack("block request")?;
            if self.state.have_got_ess {
                break;
            }
            self.send(&short_packet(Command::Ack))?;
        }
        self.send(&short_packet(Command::EndBulkSession))?;

        if self.state.dropped_chunks > 0 {
            return Err(BulkError::CrcMismatch {
                dropped: self.state.dropped_chunks,
            });
        }
        Ok(std::mem::take(&mut self.state.received))
    }

    fn send(&self, bytes: &[u8]) -> Result<(), BulkError> {
        self.transport.send(bytes)?;
        if !self.send_delay.is_zero() {
            std::thread::sleep(self.send_delay);
        }
        Ok(())
    }

    /// Block until the device answers, or the timeout expires.
    fn wait_ack(&mut self, after: &'static str) -> Result<(), BulkError> {
        self.state.have_got_ack = false;
        let deadline = Instant::now() + self.ack_timeout;
        while !self.state.have_got_ack {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.inbox.recv_timeout(remaining) {
                Ok(packet) => {
                    self.state.accept(&packet)?;
                }
                Err(RecvTimeoutError::Timeout) => {
                    log::warn!(target: "bulk", "no ACK after {}", after);
                    return Err(BulkError::Timeout { after });
                }
                Err(RecvTimeoutError::Disconnected) => return Err(BulkError::Disconnected),
            }
        }
        Ok(())
    }

    /// Best-effort session teardown after a failure.
    fn abort(&self) {
        if let Err(e) = self.transport.send(&short_packet(Command::EndBulkSession)) {
            log::warn!(target: "bulk", "could not close bulk session: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sysex::framer::SysexFramer;

    fn parse(bytes: &[u8]) -> SysexPacket {
        SysexPacket::parse(bytes).unwrap()
    }

    #[test]
    fn framed_ack_sets_have_got_ack() {
        let mut framer = SysexFramer::new();
        let input = [0xF0, 0x44, 0x19, 0x01, 0x7F, 0x0A, 0xF7];
        let packets = framer.push(&input);
        assert_eq!(packets, vec![input.to_vec()]);

        let mut state = BulkState::new();
        assert_eq!(state.accept(&parse(&packets[0])), Ok(Accepted::Ack));
        assert!(state.have_got_ack);
        assert!(!state.have_got_ess);
    }

    #[test]
    fn start_session_carries_sub_command() {
        let packet = parse(&start_session_packet(BulkTarget::user_tone(4), SESSION_SEND));
        assert_eq!(packet.command(), Some(Command::StartBulkSession));
        assert_eq!(packet.sub_command(), Some(SESSION_SEND));
        assert_eq!(packet.block(), Some(4));
        assert_eq!(packet.sysex_type(), Some(USER_TONE_PARAMETER_SET));
    }

    #[test]
    fn data_packet_roundtrip() {
        let chunk: Vec<u8> = (0..CHUNK_SIZE).map(|i| (i * 7) as u8).collect();
        let bytes = data_packet(BulkTarget::user_tone(1), &chunk);
        assert!(bytes[1..bytes.len() - 1].iter().all(|b| *b < 0x80));
        assert_eq!(verify_data_packet(&parse(&bytes)), Ok(Some(chunk)));
    }

    #[test]
    fn crc_covers_header_without_start_byte() {
        let chunk = [1u8, 2, 3];
        let bytes = data_packet(BulkTarget::user_tone(0), &chunk);
        let mut expected = bytes[1..HEADER_LEN].to_vec();
        expected.extend_from_slice(&chunk);
        let crc_field = &bytes[bytes.len() - 1 - CRC_FIELD_LEN..bytes.len() - 1];
        assert_eq!(
            unpack_crc(&decode_7bit(crc_field).unwrap()),
            crc32fast::hash(&expected)
        );
    }

    #[test]
    fn any_corrupted_data_byte_fails_crc() {
        let chunk: Vec<u8> = (0..40u8).collect();
        let bytes = data_packet(BulkTarget::user_tone(2), &chunk);
        let data_end = bytes.len() - 1 - CRC_FIELD_LEN;
        for i in HEADER_LEN..data_end {
            let mut corrupt = bytes.clone();
            corrupt[i] ^= 0x01;
            assert_eq!(verify_data_packet(&parse(&corrupt)), Ok(None), "byte {}", i);
        }
    }

    #[test]
    fn bad_crc_chunk_is_dropped() {
        let mut bytes = data_packet(BulkTarget::user_tone(2), &[9, 9, 9]);
        bytes[HEADER_LEN] ^= 0x01;
        let mut state = BulkState::new();
        assert_eq!(state.accept(&parse(&bytes)), Ok(Accepted::Data));
        assert!(state.received.is_empty());
        assert_eq!(state.dropped_chunks, 1);
    }

    #[test]
    fn high_bit_in_data_is_a_transcode_error() {
        let mut bytes = data_packet(BulkTarget::user_tone(2), &[9, 9, 9]);
        bytes[HEADER_LEN] = 0x85;
        let mut state = BulkState::new();
        assert!(matches!(
            state.accept(&parse(&bytes)),
            Err(BulkError::Transcode(TranscodeError::HighBitSet { .. }))
        ));
    }

    #[test]
    fn end_send_session_marks_ess() {
        let mut state = BulkState::new();
        state.accept(&parse(&short_packet(Command::EndSendSession))).unwrap();
        assert!(state.have_got_ack);
        assert!(state.have_got_ess);
    }
}
