//! # tonedit-types
//!
//! Data model for the tone editor: parameters, DSP modules, the preset
//! instrument catalog and the [`Tone`] being edited. Shared by tonedit-core
//! and front ends; contains no I/O.

pub mod dsp;
pub mod instruments;
mod param;
pub mod parameters;
mod tone;

pub use dsp::{DspModule, DSP_BLOCK_COUNT, DSP_OFF_ID, DSP_SLOT_COUNT};
pub use instruments::{Instrument, UNKNOWN_TONE_NAME};
pub use param::{Choices, ParamKind, ParamType, Parameter};
pub use tone::{SynthModel, Tone, DEFAULT_TONE_NAME, TONE_NAME_LEN};
