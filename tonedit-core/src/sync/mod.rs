//! Tone synchronization: keeps the in-memory [`Tone`] and the synth in step.
//!
//! [`ToneSync`] issues parameter requests, routes the synth's responses back
//! into the model, forwards bulk traffic to the active transfer and reports
//! everything a front end needs through [`ToneEvent`]s.

mod debounce;
mod events;
mod import;

pub use debounce::Debouncer;
pub use events::{Panel, ToneEvent, UpdateSource, STATUS_DURATION};
pub use import::{DspBlockDocument, ImportChanges, ImportError, ToneDocument};

use std::fmt;
use std::io;
use std::sync::{
    Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak,
};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};

use tonedit_types::{
    dsp, instruments, DspModule, ParamKind, SynthModel, Tone, DSP_BLOCK_COUNT,
    UNKNOWN_TONE_NAME,
};

use crate::midi::{InboundMessage, MidiEventKind, MidiTransport, TransportError};
use crate::sysex::bulk::{BulkError, BulkSession, BulkTarget, ACK_TIMEOUT};
use crate::sysex::packet::{
    self, to_hex, Command, PacketError, SysexPacket, DSP_MODULE_TYPE, DSP_PARAMS_TYPE,
    TONE_NAME_TYPE,
};

/// Bank select controller number.
const BANK_SELECT: u8 = 0;

#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub model: SynthModel,
    /// 0-based channel for bank select / program change
    pub channel: u8,
    /// Pause after every outgoing packet
    pub send_delay: Duration,
    /// How long a synchronize may take before it is reported incomplete
    pub sync_timeout: Duration,
    /// Quiet period after an instrument change before resynchronizing
    pub resync_delay: Duration,
    pub ack_timeout: Duration,
    /// Emit raw traffic as [`ToneEvent::Log`]
    pub log_sysex: bool,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            model: SynthModel::default(),
            channel: 0,
            send_delay: Duration::from_millis(30),
            sync_timeout: Duration::from_secs(5),
            resync_delay: Duration::from_secs(2),
            ack_timeout: ACK_TIMEOUT,
            log_sysex: false,
        }
    }
}

/// Errors from user edits and imports.
#[derive(Debug)]
pub enum EditError {
    UnknownParameter(u16),
    UnknownModule(u8),
    BlockOutOfRange(usize),
    EmptyBlock(usize),
    UnknownDspParameter { block: usize, index: usize },
    Packet(PacketError),
    Import(ImportError),
    Transport(TransportError),
}

impl fmt::Display for EditError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownParameter(id) => write!(f, "no parameter with id {}", id),
            Self::UnknownModule(id) => write!(f, "no DSP module with id {}", id),
            Self::BlockOutOfRange(block) => write!(f, "DSP block {} does not exist", block),
            Self::EmptyBlock(block) => write!(f, "DSP block {} has no module", block),
            Self::UnknownDspParameter { block, index } => {
                write!(f, "module in DSP block {} has no parameter {}", block, index)
            }
            Self::Packet(e) => write!(f, "{}", e),
            Self::Import(e) => write!(f, "{}", e),
            Self::Transport(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for EditError {}

impl From<PacketError> for EditError {
    fn from(e: PacketError) -> Self {
        Self::Packet(e)
    }
}

impl From<ImportError> for EditError {
    fn from(e: ImportError) -> Self {
        Self::Import(e)
    }
}

impl From<TransportError> for EditError {
    fn from(e: TransportError) -> Self {
        Self::Transport(e)
    }
}

struct SyncState {
    tone: Tone,
    /// Requests sent and not yet answered
    active_jobs: usize,
    generation: u64,
    /// Signalled when `active_jobs` drops to zero during a synchronize
    completion: Option<Sender<()>>,
    /// Last bank select value seen on our channel
    bank: u8,
}

pub struct ToneSync {
    options: SyncOptions,
    transport: Arc<dyn MidiTransport>,
    events: Sender<ToneEvent>,
    state: RwLock<SyncState>,
    bulk_route: Mutex<Option<Sender<SysexPacket>>>,
    resync: Debouncer,
}

impl ToneSync {
    pub fn new(
        transport: Arc<dyn MidiTransport>,
        options: SyncOptions,
        events: Sender<ToneEvent>,
    ) -> Arc<Self> {
        Arc::new_cyclic(|weak: &Weak<ToneSync>| {
            let weak = weak.clone();
            let resync = Debouncer::spawn("tone-resync", options.resync_delay, move || {
                if let Some(sync) = weak.upgrade() {
                    log::info!(target: "sync", "instrument settled, resynchronizing");
                    sync.synchronize();
                }
            });
            ToneSync {
                state: RwLock::new(SyncState {
                    tone: Tone::new(options.model),
                    active_jobs: 0,
                    generation: 0,
                    completion: None,
                    bank: 0,
                }),
                options,
                transport,
                events,
                bulk_route: Mutex::new(None),
                resync,
            }
        })
    }

    pub fn options(&self) -> &SyncOptions {
        &self.options
    }

    /// Snapshot of the current tone.
    pub fn tone(&self) -> Tone {
        self.read_state().tone.clone()
    }

    /// Replace the whole model without talking to the synth.
    pub fn replace_tone(&self, tone: Tone) {
        self.write_state().tone = tone;
    }

    pub fn pending_jobs(&self) -> usize {
        self.read_state().active_jobs
    }

    pub fn generation(&self) -> u64 {
        self.read_state().generation
    }

    // ----- Full synchronization -----

    /// Request every piece of the tone from the synth. Returns the generation
    /// of this synchronize; completion is reported through events.
    pub fn synchronize(self: &Arc<Self>) -> u64 {
        let (generation, requests, done) = {
            let mut state = self.write_state();
            state.generation += 1;
            // Issuing token: keeps the count above zero until every request is out
            state.active_jobs = 1;
            let (done_tx, done_rx) = crossbeam_channel::bounded(1);
            state.completion = Some(done_tx);

            let tone = &state.tone;
            let mut requests = vec![packet::tone_name_request()];
            requests.extend(tone.main_parameters.iter().map(packet::parameter_request));
            requests.extend((0..DSP_BLOCK_COUNT as u8).map(packet::dsp_module_request));
            requests.extend(
                tone.populated_blocks()
                    .map(|block| packet::dsp_params_request(block as u8)),
            );
            // Advanced values trail the main sequence
            requests.extend(tone.advanced_parameters.iter().map(packet::parameter_request));
            (state.generation, requests, done_rx)
        };

        log::info!(target: "sync", "synchronize #{}: {} requests", generation, requests.len());
        self.emit(ToneEvent::status("Synchronizing with synth..."));
        self.spawn_sync_watcher(generation, done);

        for bytes in &requests {
            self.request(bytes);
        }
        self.finish_job();
        generation
    }

    fn spawn_sync_watcher(self: &Arc<Self>, generation: u64, done: Receiver<()>) {
        let weak = Arc::downgrade(self);
        let timeout = self.options.sync_timeout;
        let spawned = thread::Builder::new()
            .name("tone-sync-watch".into())
            .spawn(move || {
                let outcome = done.recv_timeout(timeout);
                let Some(sync) = weak.upgrade() else {
                    return;
                };
                match outcome {
                    Ok(()) => {
                        log::info!(target: "sync", "synchronize #{} complete", generation);
                        sync.emit(ToneEvent::FullSyncComplete);
                        sync.emit(ToneEvent::status("Synchronized"));
                    }
                    Err(RecvTimeoutError::Timeout) => {
                        let pending = {
                            let state = sync.read_state();
                            if state.generation != generation {
                                return;
                            }
                            state.active_jobs
                        };
                        log::warn!(target: "sync", "synchronize #{} timed out with {} pending", generation, pending);
                        sync.emit(ToneEvent::SyncIncomplete { pending });
                        sync.emit(ToneEvent::Error(format!(
                            "Synth did not answer {} request(s)",
                            pending
                        )));
                    }
                    // Superseded by a newer synchronize
                    Err(RecvTimeoutError::Disconnected) => {}
                }
            });
        if let Err(e) = spawned {
            log::error!(target: "sync", "failed to spawn sync watcher: {}", e);
        }
    }

    /// Send a counted request. A failed send gives its job back.
    fn request(&self, bytes: &[u8]) {
        self.write_state().active_jobs += 1;
        if let Err(e) = self.transmit(bytes) {
            log::error!(target: "sync", "request failed: {}", e);
            self.finish_job();
            self.emit(ToneEvent::Error(format!("Request failed: {}", e)));
        }
    }

    fn finish_job(&self) {
        let mut state = self.write_state();
        state.active_jobs = state.active_jobs.saturating_sub(1);
        if state.active_jobs == 0 {
            if let Some(done) = state.completion.take() {
                let _ = done.send(());
            }
        }
    }

    fn transmit(&self, bytes: &[u8]) -> Result<(), TransportError> {
        log::trace!(target: "sysex", "out {}", to_hex(bytes));
        if self.options.log_sysex {
            self.emit(ToneEvent::Log(format!("-> {}", to_hex(bytes))));
        }
        let result = self.transport.send(bytes);
        if !self.options.send_delay.is_zero() {
            thread::sleep(self.options.send_delay);
        }
        result
    }

    // ----- Inbound traffic -----

    /// Drain `inbound` on a named thread until every sender is gone.
    pub fn spawn_input_pump(
        self: &Arc<Self>,
        inbound: Receiver<InboundMessage>,
    ) -> io::Result<JoinHandle<()>> {
        let sync = Arc::clone(self);
        thread::Builder::new()
            .name("tone-input".into())
            .spawn(move || {
                for message in inbound.iter() {
                    sync.handle_inbound(message);
                }
                log::debug!(target: "midi", "input pump stopped");
            })
    }

    pub fn handle_inbound(&self, message: InboundMessage) {
        match message {
            InboundMessage::SysEx(bytes) => self.handle_packet(&bytes),
            InboundMessage::Channel(kind) => self.handle_channel_message(kind),
        }
    }

    /// Validate and dispatch one complete sysex packet.
    pub fn handle_packet(&self, bytes: &[u8]) {
        if self.options.log_sysex {
            self.emit(ToneEvent::Log(format!("<- {}", to_hex(bytes))));
        }
        let packet = match SysexPacket::parse(bytes) {
            Ok(packet) => packet,
            Err(e) => {
                log::warn!(target: "sysex", "dropping packet: {} [{}]", e, to_hex(bytes));
                return;
            }
        };
        match packet.command() {
            Some(Command::Transmit) => self.route_response(&packet),
            Some(command) if command.is_bulk() => self.route_bulk(packet),
            _ => {
                log::debug!(target: "sysex", "ignoring command {:#04x}", packet.command_byte())
            }
        }
    }

    fn route_response(&self, packet: &SysexPacket) {
        let (Some(block), Some(sysex_type)) = (packet.block(), packet.sysex_type()) else {
            log::warn!(target: "sysex", "transmit without header [{}]", to_hex(packet.as_bytes()));
            return;
        };
        let payload = packet.payload();
        match sysex_type {
            TONE_NAME_TYPE => self.apply_tone_name(payload),
            DSP_MODULE_TYPE => self.apply_dsp_module(block, payload),
            DSP_PARAMS_TYPE => self.apply_dsp_params(block, payload),
            number if packet::parameter_width(number).is_some() => {
                self.apply_parameter(number, block, payload)
            }
            other => log::info!(target: "sysex", "unrecognised sysex type {} (block {})", other, block),
        }
    }

    fn apply_tone_name(&self, payload: &[u8]) {
        let name = packet::decode_tone_name(payload);
        let display = {
            let mut state = self.write_state();
            state.tone.set_name(&name);
            display_name(&state.tone)
        };
        self.finish_job();
        self.emit(ToneEvent::ToneNameChanged(display));
    }

    fn apply_parameter(&self, number: u16, block: u16, payload: &[u8]) {
        let decoded = {
            let mut state = self.write_state();
            state
                .tone
                .parameter_mut(number, block)
                .map(|param| (param.kind, packet::decode_parameter_payload(param, payload)))
        };
        match decoded {
            Some((kind, result)) => {
                if let Err(e) = result {
                    log::warn!(target: "sysex", "parameter {}/{}: {}", number, block, e);
                }
                self.finish_job();
                let panel = match kind {
                    ParamKind::Advanced => Panel::Advanced,
                    _ => Panel::Main,
                };
                self.emit(ToneEvent::ParameterPanelDirty(panel));
            }
            None => log::info!(target: "sysex", "no parameter at number {} block {}", number, block),
        }
    }

    fn apply_dsp_module(&self, block: u16, payload: &[u8]) {
        let index = block as usize;
        if index >= DSP_BLOCK_COUNT {
            log::warn!(target: "sysex", "DSP module for block {} out of range", block);
            return;
        }
        let Some(&id) = payload.first() else {
            log::warn!(target: "sysex", "empty DSP module response for block {}", block);
            return;
        };
        let module = dsp::lookup(id);
        if module.is_none() && !DspModule::is_off_id(id) {
            log::warn!(target: "sysex", "unknown DSP module {} in block {}, treating as off", id, block);
        }
        let selected = module.as_ref().map(|m| m.id);
        self.write_state().tone.blocks[index] = module;

        self.emit(ToneEvent::DspModuleSelected {
            block: block as u8,
            module: selected,
            source: UpdateSource::Device,
        });
        self.emit(ToneEvent::ParameterPanelDirty(Panel::Dsp(block as u8)));
        // Follow-up goes out before this job is released so the count cannot touch zero
        if selected.is_some() {
            self.request(&packet::dsp_params_request(block as u8));
        }
        self.finish_job();
    }

    fn apply_dsp_params(&self, block: u16, payload: &[u8]) {
        let result = {
            let mut state = self.write_state();
            state
                .tone
                .block_mut(block as usize)
                .map(|module| packet::decode_dsp_slots(module, payload))
        };
        match result {
            Some(Ok(())) => {}
            Some(Err(e)) => log::warn!(target: "sysex", "DSP block {}: {}", block, e),
            None => log::info!(target: "sysex", "DSP params for empty block {}", block),
        }
        self.finish_job();
        self.emit(ToneEvent::ParameterPanelDirty(Panel::Dsp(block as u8)));
    }

    fn route_bulk(&self, packet: SysexPacket) {
        let route = self.lock_route();
        match route.as_ref() {
            Some(inbox) => {
                if inbox.send(packet).is_err() {
                    log::debug!(target: "bulk", "transfer finished, dropping late packet");
                }
            }
            None => log::debug!(target: "bulk", "no transfer active, dropping command {:#04x}", packet.command_byte()),
        }
    }

    /// Bank select and program change on the configured channel.
    pub fn handle_channel_message(&self, kind: MidiEventKind) {
        match kind {
            MidiEventKind::ControlChange {
                channel,
                controller: BANK_SELECT,
                value,
            } if channel == self.options.channel => {
                log::debug!(target: "midi", "bank select {}", value);
                self.write_state().bank = value;
            }
            MidiEventKind::ProgramChange { channel, program } if channel == self.options.channel => {
                self.select_instrument(program)
            }
            _ => {}
        }
    }

    fn select_instrument(&self, program: u8) {
        let (id, display) = {
            let mut state = self.write_state();
            match instruments::lookup(state.bank, program) {
                Some(instrument) => {
                    state.tone.name = instrument.name.to_string();
                    state.tone.parent = Some(instrument.id);
                }
                None => {
                    log::info!(target: "sync", "no instrument at bank {} program {}", state.bank, program);
                    state.tone.name = UNKNOWN_TONE_NAME.to_string();
                    state.tone.parent = None;
                }
            }
            (state.tone.parent, display_name(&state.tone))
        };
        self.emit(ToneEvent::InstrumentSelected {
            id,
            source: UpdateSource::Device,
        });
        self.emit(ToneEvent::ToneNameChanged(display));
        self.resync.poke();
    }

    // ----- User edits -----

    /// Set a main or advanced parameter by id and send it. Returns the stored value.
    pub fn set_main_parameter(&self, id: u16, value: i32) -> Result<i32, EditError> {
        let (stored, bytes) = {
            let mut state = self.write_state();
            let param = state
                .tone
                .parameter_by_id_mut(id)
                .ok_or(EditError::UnknownParameter(id))?;
            let stored = param.set_value(value);
            (stored, packet::parameter_set(param)?)
        };
        self.transmit(&bytes)?;
        Ok(stored)
    }

    /// Select a module (or `None` for off) and fetch its parameters from the synth.
    pub fn set_dsp_module(&self, block: usize, module_id: Option<u8>) -> Result<(), EditError> {
        if block >= DSP_BLOCK_COUNT {
            return Err(EditError::BlockOutOfRange(block));
        }
        let module = match module_id {
            Some(id) if !DspModule::is_off_id(id) => {
                Some(dsp::lookup(id).ok_or(EditError::UnknownModule(id))?)
            }
            _ => None,
        };
        let selected = module.as_ref().map(|m| m.id);
        self.write_state().tone.blocks[block] = module;

        self.transmit(&packet::dsp_module_select(block as u8, selected))?;
        self.emit(ToneEvent::DspModuleSelected {
            block: block as u8,
            module: selected,
            source: UpdateSource::User,
        });
        if selected.is_some() {
            self.request(&packet::dsp_params_request(block as u8));
        }
        Ok(())
    }

    /// Set one DSP slot and send the block's full parameter set.
    pub fn set_dsp_parameter(&self, block: usize, index: usize, value: i32) -> Result<i32, EditError> {
        if block >= DSP_BLOCK_COUNT {
            return Err(EditError::BlockOutOfRange(block));
        }
        let (stored, bytes) = {
            let mut state = self.write_state();
            let module = state
                .tone
                .block_mut(block)
                .ok_or(EditError::EmptyBlock(block))?;
            let stored = module
                .parameters
                .get_mut(index)
                .ok_or(EditError::UnknownDspParameter { block, index })?
                .set_value(value);
            (stored, packet::dsp_params_set(block as u8, module))
        };
        self.transmit(&bytes)?;
        Ok(stored)
    }

    /// Rename the tone. Non-printable characters are dropped, the name is cut
    /// to the synth's field width and an empty result becomes the default
    /// name. Returns the stored name.
    pub fn set_tone_name(&self, name: &str) -> Result<String, EditError> {
        let (clean, display) = {
            let mut state = self.write_state();
            let clean = state.tone.set_name(name).to_string();
            (clean, display_name(&state.tone))
        };
        self.transmit(&packet::tone_name_set(&clean))?;
        self.emit(ToneEvent::ToneNameChanged(display));
        Ok(clean)
    }

    /// Apply a JSON tone document, then send every changed parameter and block.
    pub fn import_json(&self, json: &str) -> Result<ImportChanges, EditError> {
        let document = ToneDocument::parse(json)?;
        let (changes, outgoing, display) = {
            let mut state = self.write_state();
            let changes = document.apply(&mut state.tone);
            let tone = &state.tone;

            let mut outgoing = Vec::new();
            if changes.name {
                outgoing.push(packet::tone_name_set(&tone.name));
            }
            for id in &changes.parameters {
                if let Some(param) = tone.parameters().find(|p| p.id == *id) {
                    outgoing.push(packet::parameter_set(param)?);
                }
            }
            for &block in &changes.blocks {
                let module = tone.block(block);
                outgoing.push(packet::dsp_module_select(block as u8, module.map(|m| m.id)));
                if let Some(module) = module {
                    outgoing.push(packet::dsp_params_set(block as u8, module));
                }
            }
            (changes, outgoing, display_name(tone))
        };

        log::info!(target: "sync", "import: {} parameter(s), {} block(s), {} skipped",
            changes.parameters.len(), changes.blocks.len(), changes.skipped.len());
        // Events go out even if a send fails
        let sent = outgoing.iter().try_for_each(|bytes| self.transmit(bytes));

        if changes.name {
            self.emit(ToneEvent::ToneNameChanged(display));
        }
        if !changes.parameters.is_empty() {
            self.emit(ToneEvent::ParameterPanelDirty(Panel::Main));
            self.emit(ToneEvent::ParameterPanelDirty(Panel::Advanced));
        }
        let tone = self.tone();
        for &block in &changes.blocks {
            self.emit(ToneEvent::DspModuleSelected {
                block: block as u8,
                module: tone.block(block).map(|m| m.id),
                source: UpdateSource::User,
            });
            self.emit(ToneEvent::ParameterPanelDirty(Panel::Dsp(block as u8)));
        }
        sent?;
        self.emit(ToneEvent::status(format!(
            "Imported {} parameter(s) and {} DSP block(s)",
            changes.parameters.len(),
            changes.blocks.len()
        )));
        Ok(changes)
    }

    // ----- Bulk transfer -----

    /// Read a user tone blob. Blocks the calling thread until the transfer ends.
    pub fn download_user_tone(&self, slot: u16) -> Result<Vec<u8>, BulkError> {
        let inbox = self.open_bulk_route()?;
        let result = self.bulk_session(inbox).download(BulkTarget::user_tone(slot));
        self.close_bulk_route();
        result
    }

    /// Write a user tone blob. Blocks the calling thread until the transfer ends.
    pub fn upload_user_tone(&self, slot: u16, blob: &[u8]) -> Result<(), BulkError> {
        let inbox = self.open_bulk_route()?;
        let result = self.bulk_session(inbox).upload(BulkTarget::user_tone(slot), blob);
        self.close_bulk_route();
        result
    }

    pub fn spawn_download(self: &Arc<Self>, slot: u16) -> io::Result<JoinHandle<()>> {
        let sync = Arc::clone(self);
        thread::Builder::new()
            .name("tone-bulk".into())
            .spawn(move || {
                sync.emit(ToneEvent::status(format!("Downloading user tone {}...", slot)));
                match sync.download_user_tone(slot) {
                    Ok(data) => {
                        sync.emit(ToneEvent::status(format!("Downloaded {} bytes", data.len())));
                        sync.emit(ToneEvent::BulkDownloaded { slot, data });
                    }
                    Err(e) => {
                        log::error!(target: "bulk", "download of slot {} failed: {}", slot, e);
                        sync.emit(ToneEvent::Error(format!("Download failed: {}", e)));
                    }
                }
            })
    }

    pub fn spawn_upload(self: &Arc<Self>, slot: u16, blob: Vec<u8>) -> io::Result<JoinHandle<()>> {
        let sync = Arc::clone(self);
        thread::Builder::new()
            .name("tone-bulk".into())
            .spawn(move || {
                sync.emit(ToneEvent::status(format!("Uploading user tone {}...", slot)));
                match sync.upload_user_tone(slot, &blob) {
                    Ok(()) => {
                        sync.emit(ToneEvent::status(format!("Uploaded {} bytes", blob.len())));
                        sync.emit(ToneEvent::BulkUploaded { slot });
                    }
                    Err(e) => {
                        log::error!(target: "bulk", "upload to slot {} failed: {}", slot, e);
                        sync.emit(ToneEvent::Error(format!("Upload failed: {}", e)));
                    }
                }
            })
    }

    fn bulk_session(&self, inbox: Receiver<SysexPacket>) -> BulkSession<'_> {
        BulkSession::new(&*self.transport, inbox)
            .with_ack_timeout(self.options.ack_timeout)
            .with_send_delay(self.options.send_delay)
    }

    fn open_bulk_route(&self) -> Result<Receiver<SysexPacket>, BulkError> {
        let mut route = self.lock_route();
        if route.is_some() {
            return Err(BulkError::Busy);
        }
        let (tx, rx) = crossbeam_channel::unbounded();
        *route = Some(tx);
        Ok(rx)
    }

    fn close_bulk_route(&self) {
        self.lock_route().take();
    }

    // ----- Plumbing -----

    fn emit(&self, event: ToneEvent) {
        if self.events.send(event).is_err() {
            log::trace!(target: "sync", "event receiver gone");
        }
    }

    fn read_state(&self) -> RwLockReadGuard<'_, SyncState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, SyncState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_route(&self) -> MutexGuard<'_, Option<Sender<SysexPacket>>> {
        self.bulk_route.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Name as shown to the user: prefixed with the parent preset number when known.
pub fn display_name(tone: &Tone) -> String {
    match tone.parent {
        Some(parent) => format!("{:03} {}", parent, tone.name),
        None => tone.name.clone(),
    }
}
