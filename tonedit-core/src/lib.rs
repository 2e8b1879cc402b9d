//! # tonedit-core
//!
//! SysEx protocol engine for Casio CT-X keyboards. Talks to the synth over
//! MIDI, keeps a [`tonedit_types::Tone`] in step with it and moves user tone
//! blobs in and out with the bulk transfer protocol. Independent of any UI.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tonedit_core::config::Config;
//! use tonedit_core::midi::{open_input, open_output};
//! use tonedit_core::sync::ToneSync;
//!
//! let config = Config::load();
//! let output = Arc::new(open_output("CT-X3000")?);
//! let (event_tx, event_rx) = crossbeam_channel::unbounded();
//! let sync = ToneSync::new(output, config.sync_options(), event_tx);
//!
//! let (inbound_tx, inbound_rx) = crossbeam_channel::unbounded();
//! let _input = open_input("CT-X3000", inbound_tx)?;
//! sync.spawn_input_pump(inbound_rx)?;
//!
//! sync.synchronize();
//! for event in event_rx.iter() {
//!     // ToneEvent::FullSyncComplete, ToneEvent::Error, ...
//! }
//! ```
//!
//! ## Module Overview
//!
//! - [`sysex`]: 7-bit transcoder, packet codec, stream framer, bulk transfer
//! - [`midi`]: port discovery and the [`midi::MidiTransport`] seam
//! - [`sync`]: `ToneSync` orchestrator and the `ToneEvent` stream
//! - [`config`]: TOML configuration (embedded defaults + user override)

pub mod config;
pub mod midi;
pub mod sync;
pub mod sysex;
