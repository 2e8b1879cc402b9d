//! midir-backed input and output ports.

use std::sync::Mutex;

use crossbeam_channel::Sender;
use midir::{Ignore, MidiInput, MidiInputConnection, MidiOutput, MidiOutputConnection};

use super::{
    find_port, parse_midi_message, InboundMessage, MidiPortInfo, MidiTransport, TransportError,
    CLIENT_NAME,
};
use crate::sysex::framer::SysexFramer;
use crate::sysex::packet::{to_hex, SYSEX_START};

pub fn list_input_ports() -> Result<Vec<MidiPortInfo>, TransportError> {
    let midi_in = MidiInput::new(CLIENT_NAME).map_err(|e| TransportError::Init(e.to_string()))?;
    Ok(midi_in
        .ports()
        .iter()
        .enumerate()
        .filter_map(|(index, port)| {
            midi_in
                .port_name(port)
                .ok()
                .map(|name| MidiPortInfo { index, name })
        })
        .collect())
}

pub fn list_output_ports() -> Result<Vec<MidiPortInfo>, TransportError> {
    let midi_out = MidiOutput::new(CLIENT_NAME).map_err(|e| TransportError::Init(e.to_string()))?;
    Ok(midi_out
        .ports()
        .iter()
        .enumerate()
        .filter_map(|(index, port)| {
            midi_out
                .port_name(port)
                .ok()
                .map(|name| MidiPortInfo { index, name })
        })
        .collect())
}

/// Open input connection. Dropping it closes the port.
pub struct MidiInputHandle {
    connection: Option<MidiInputConnection<SysexFramer>>,
    port_name: String,
}

impl MidiInputHandle {
    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    pub fn close(&mut self) {
        if let Some(conn) = self.connection.take() {
            conn.close();
            log::info!(target: "midi", "closed input {}", self.port_name);
        }
    }
}

impl Drop for MidiInputHandle {
    fn drop(&mut self) {
        self.close();
    }
}

/// Open the named input port. Every driver callback is pushed through a
/// [`SysexFramer`]; completed packets and channel messages go to `sink`.
pub fn open_input(
    name: &str,
    sink: Sender<InboundMessage>,
) -> Result<MidiInputHandle, TransportError> {
    let ports = list_input_ports()?;
    let info = find_port(&ports, name).ok_or_else(|| TransportError::PortNotFound {
        direction: "input",
        name: name.to_string(),
    })?;

    let mut midi_in = MidiInput::new(CLIENT_NAME).map_err(|e| TransportError::Init(e.to_string()))?;
    midi_in.ignore(Ignore::TimeAndActiveSense);
    let port = midi_in
        .ports()
        .into_iter()
        .nth(info.index)
        .ok_or(TransportError::PortNotFound {
            direction: "input",
            name: name.to_string(),
        })?;

    let connection = midi_in
        .connect(
            &port,
            "tonedit-input",
            move |_timestamp, message, framer: &mut SysexFramer| {
                if framer.in_packet() || message.first() == Some(&SYSEX_START) {
                    for packet in framer.push(message) {
                        log::trace!(target: "midi", "in  {}", to_hex(&packet));
                        let _ = sink.send(InboundMessage::SysEx(packet));
                    }
                } else if let Some(kind) = parse_midi_message(message) {
                    let _ = sink.send(InboundMessage::Channel(kind));
                }
            },
            SysexFramer::new(),
        )
        .map_err(|e| TransportError::Connect(e.to_string()))?;

    log::info!(target: "midi", "opened input {}", info.name);
    Ok(MidiInputHandle {
        connection: Some(connection),
        port_name: info.name.clone(),
    })
}

/// Open output connection; the [`MidiTransport`] used by the orchestrator.
pub struct MidiOutputHandle {
    connection: Mutex<Option<MidiOutputConnection>>,
    port_name: String,
}

impl MidiOutputHandle {
    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    pub fn close(&self) {
        let taken = match self.connection.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(conn) = taken {
            conn.close();
            log::info!(target: "midi", "closed output {}", self.port_name);
        }
    }
}

impl MidiTransport for MidiOutputHandle {
    fn send(&self, bytes: &[u8]) -> Result<(), TransportError> {
        let mut guard = self
            .connection
            .lock()
            .map_err(|_| TransportError::Send("output lock poisoned".to_string()))?;
        let conn = guard.as_mut().ok_or(TransportError::NotConnected)?;
        log::trace!(target: "midi", "out {}", to_hex(bytes));
        conn.send(bytes)
            .map_err(|e| TransportError::Send(e.to_string()))
    }
}

impl Drop for MidiOutputHandle {
    fn drop(&mut self) {
        self.close();
    }
}

pub fn open_output(name: &str) -> Result<MidiOutputHandle, TransportError> {
    let ports = list_output_ports()?;
    let info = find_port(&ports, name).ok_or_else(|| TransportError::PortNotFound {
        direction: "output",
        name: name.to_string(),
    })?;

    let midi_out = MidiOutput::new(CLIENT_NAME).map_err(|e| TransportError::Init(e.to_string()))?;
    let port = midi_out
        .ports()
        .into_iter()
        .nth(info.index)
        .ok_or(TransportError::PortNotFound {
            direction: "output",
            name: name.to_string(),
        })?;
    let connection = midi_out
        .connect(&port, "tonedit-output")
        .map_err(|e| TransportError::Connect(e.to_string()))?;

    log::info!(target: "midi", "opened output {}", info.name);
    Ok(MidiOutputHandle {
        connection: Mutex::new(Some(connection)),
        port_name: info.name.clone(),
    })
}
