#![allow(dead_code)]
//! Test harness for tonedit-core integration tests: a recording transport
//! and a simulated synth that answers requests on its own thread.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender};

use tonedit_core::midi::{MidiTransport, TransportError};
use tonedit_core::sync::{SyncOptions, ToneEvent, ToneSync};
use tonedit_core::sysex::bulk::{self, BulkTarget};
use tonedit_core::sysex::packet::{
    self, build, short_packet, Command, SysexPacket, DSP_MODULE_TYPE, DSP_PARAMS_TYPE,
    HEADER_LEN, TONE_NAME_LEN, TONE_NAME_TYPE,
};
use tonedit_types::{DSP_BLOCK_COUNT, DSP_OFF_ID, DSP_SLOT_COUNT};

/// Options with no send delay and short timeouts.
pub fn test_options() -> SyncOptions {
    SyncOptions {
        send_delay: Duration::ZERO,
        sync_timeout: Duration::from_secs(2),
        resync_delay: Duration::from_millis(100),
        ack_timeout: Duration::from_millis(300),
        ..SyncOptions::default()
    }
}

/// Records every outgoing packet and optionally forwards it to a synth thread.
#[derive(Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<Vec<u8>>>,
    forward: Mutex<Option<Sender<Vec<u8>>>>,
}

impl RecordingTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn sent(&self) -> Vec<Vec<u8>> {
        self.sent.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.sent.lock().unwrap().clear();
    }

    pub fn forward_to(&self, tx: Sender<Vec<u8>>) {
        *self.forward.lock().unwrap() = Some(tx);
    }
}

impl MidiTransport for RecordingTransport {
    fn send(&self, bytes: &[u8]) -> Result<(), TransportError> {
        self.sent.lock().unwrap().push(bytes.to_vec());
        if let Some(tx) = self.forward.lock().unwrap().as_ref() {
            let _ = tx.send(bytes.to_vec());
        }
        Ok(())
    }
}

/// A ToneSync over a recording transport with nothing answering.
pub fn unanswered(options: SyncOptions) -> (Arc<ToneSync>, Arc<RecordingTransport>, Receiver<ToneEvent>) {
    let transport = RecordingTransport::new();
    let (tx, rx) = crossbeam_channel::unbounded();
    let sync = ToneSync::new(transport.clone(), options, tx);
    (sync, transport, rx)
}

/// A ToneSync wired to a simulated synth.
pub fn with_synth(
    options: SyncOptions,
    synth: FakeSynth,
) -> (Arc<ToneSync>, Arc<RecordingTransport>, Receiver<ToneEvent>) {
    let (sync, transport, events) = unanswered(options);
    let (tx, rx) = crossbeam_channel::unbounded();
    transport.forward_to(tx);
    synth.spawn(Arc::downgrade(&sync), rx);
    (sync, transport, events)
}

/// Device-side state of the simulated synth.
pub struct FakeSynth {
    pub name: String,
    pub modules: [u8; DSP_BLOCK_COUNT],
    pub dsp_slots: [[u8; DSP_SLOT_COUNT]; DSP_BLOCK_COUNT],
    /// Raw payloads keyed by (parameter number, block); zeros when absent
    pub parameters: HashMap<(u16, u16), Vec<u8>>,
    /// Parameter numbers the synth never answers
    pub silent_parameters: Vec<u16>,
    /// Blob served to downloads
    pub stored_tone: Vec<u8>,
    /// Chunk index whose wire payload gets a flipped bit
    pub corrupt_chunk: Option<usize>,
    /// Ignore every bulk packet
    pub bulk_silent: bool,
    /// Data received by uploads
    pub uploaded: Arc<Mutex<Vec<u8>>>,
}

impl Default for FakeSynth {
    fn default() -> Self {
        Self {
            name: "Stereo Grand".to_string(),
            modules: [DSP_OFF_ID; DSP_BLOCK_COUNT],
            dsp_slots: [[0; DSP_SLOT_COUNT]; DSP_BLOCK_COUNT],
            parameters: HashMap::new(),
            silent_parameters: Vec::new(),
            stored_tone: Vec::new(),
            corrupt_chunk: None,
            bulk_silent: false,
            uploaded: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl FakeSynth {
    fn spawn(mut self, sync: Weak<ToneSync>, requests: Receiver<Vec<u8>>) {
        thread::Builder::new()
            .name("fake-synth".into())
            .spawn(move || {
                let mut next_chunk = 0;
                for request in requests.iter() {
                    let Some(sync) = sync.upgrade() else { return };
                    for reply in self.respond(&request, &mut next_chunk) {
                        sync.handle_packet(&reply);
                    }
                }
            })
            .unwrap();
    }

    fn respond(&mut self, request: &[u8], next_chunk: &mut usize) -> Vec<Vec<u8>> {
        let packet = SysexPacket::parse(request).unwrap();
        let command = packet.command().unwrap();
        if command.is_bulk() && self.bulk_silent {
            return vec![];
        }
        match command {
            Command::Request => self.answer(&packet).into_iter().collect(),
            Command::StartBulkSession => {
                *next_chunk = 0;
                vec![short_packet(Command::Ack)]
            }
            Command::HostBlockRequest | Command::Ack => {
                let target = BulkTarget::user_tone(packet.block().unwrap_or(0));
                let mut chunks = self.stored_tone.chunks(bulk::CHUNK_SIZE);
                match chunks.nth(*next_chunk) {
                    Some(chunk) => {
                        let mut data = bulk::data_packet(target, chunk);
                        if self.corrupt_chunk == Some(*next_chunk) {
                            data[HEADER_LEN] ^= 0x01;
                        }
                        *next_chunk += 1;
                        vec![data]
                    }
                    None => vec![short_packet(Command::EndSendSession)],
                }
            }
            Command::HostBlockSend => {
                if let Ok(Some(data)) = bulk::verify_data_packet(&packet) {
                    self.uploaded.lock().unwrap().extend(data);
                }
                vec![short_packet(Command::Ack)]
            }
            _ => vec![],
        }
    }

    fn answer(&self, packet: &SysexPacket) -> Option<Vec<u8>> {
        let block = packet.block()?;
        let sysex_type = packet.sysex_type()?;
        let payload = match sysex_type {
            TONE_NAME_TYPE => {
                let mut name = self.name.clone().into_bytes();
                name.resize(TONE_NAME_LEN, b' ');
                name
            }
            DSP_MODULE_TYPE => vec![self.modules[block as usize]],
            DSP_PARAMS_TYPE => self.dsp_slots[block as usize].to_vec(),
            number => {
                if self.silent_parameters.contains(&number) {
                    return None;
                }
                let width = packet::parameter_width(number)?;
                self.parameters
                    .get(&(number, block))
                    .cloned()
                    .unwrap_or_else(|| vec![0; width])
            }
        };
        Some(build(Command::Transmit, block, sysex_type, &payload))
    }
}

/// Collect events until `pred` matches one or `timeout` passes.
pub fn wait_for_event(
    events: &Receiver<ToneEvent>,
    timeout: Duration,
    pred: impl Fn(&ToneEvent) -> bool,
) -> (Option<ToneEvent>, Vec<ToneEvent>) {
    let deadline = Instant::now() + timeout;
    let mut seen = Vec::new();
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match events.recv_timeout(remaining) {
            Ok(event) if pred(&event) => return (Some(event), seen),
            Ok(event) => seen.push(event),
            Err(_) => return (None, seen),
        }
    }
}

/// Drain whatever is queued right now.
pub fn drain(events: &Receiver<ToneEvent>) -> Vec<ToneEvent> {
    events.try_iter().collect()
}

/// Type field of a sent packet, or `None` for short packets.
pub fn sysex_type(bytes: &[u8]) -> Option<u16> {
    SysexPacket::parse(bytes).ok()?.sysex_type()
}

/// Command byte and (block, type) of a sent packet.
pub fn describe(bytes: &[u8]) -> (u8, Option<u16>, Option<u16>) {
    let packet = SysexPacket::parse(bytes).unwrap();
    (packet.command_byte(), packet.block(), packet.sysex_type())
}
