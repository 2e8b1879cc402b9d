use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam_channel::Receiver;

use crate::config::Config;
use crate::midi::{self, MidiInputHandle, TransportError};
use crate::sync::{ToneEvent, ToneSync};

/// Port names given on the command line; they win over the config file.
#[derive(Debug, Default)]
pub struct PortOverrides {
    pub input: Option<String>,
    pub output: Option<String>,
}

/// Open ports wired to a running orchestrator.
pub struct Session {
    pub sync: Arc<ToneSync>,
    pub events: Receiver<ToneEvent>,
    input: Option<MidiInputHandle>,
    pump: Option<JoinHandle<()>>,
}

impl Session {
    /// Close the input port and wait for the pump to drain.
    pub fn close(mut self) {
        if let Some(mut input) = self.input.take() {
            input.close();
        }
        if let Some(pump) = self.pump.take() {
            let _ = pump.join();
        }
    }
}

pub fn open_session(config: &Config, ports: &PortOverrides) -> Result<Session, TransportError> {
    let out_name = ports
        .output
        .as_deref()
        .or(config.out_port())
        .ok_or(TransportError::NotConfigured("output"))?;
    let in_name = ports
        .input
        .as_deref()
        .or(config.in_port())
        .ok_or(TransportError::NotConfigured("input"))?;

    let output = Arc::new(midi::open_output(out_name)?);
    let (event_tx, event_rx) = crossbeam_channel::unbounded();
    let sync = ToneSync::new(output, config.sync_options(), event_tx);

    let (inbound_tx, inbound_rx) = crossbeam_channel::unbounded();
    let input = midi::open_input(in_name, inbound_tx)?;
    let pump = match sync.spawn_input_pump(inbound_rx) {
        Ok(handle) => Some(handle),
        Err(e) => {
            log::error!("failed to spawn input pump: {}", e);
            None
        }
    };

    log::info!(
        "session open: in \"{}\", out \"{}\", channel {}",
        input.port_name(),
        out_name,
        config.channel() + 1
    );
    Ok(Session {
        sync,
        events: event_rx,
        input: Some(input),
        pump,
    })
}
