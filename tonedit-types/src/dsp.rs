//! DSP effect modules and the static module catalog.
//!
//! Catalog entries are shared template data. [`lookup`] hands out clones so a
//! tone never aliases the catalog.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::param::{Choices, ParamKind, ParamType, Parameter};

/// Number of DSP blocks on the device.
pub const DSP_BLOCK_COUNT: usize = 4;

/// Parameter slots in a DSP block payload.
pub const DSP_SLOT_COUNT: usize = 14;

/// Module id the synth reports for an empty block.
pub const DSP_OFF_ID: u8 = 0x7F;

/// Display name of an empty block.
pub const DSP_OFF_NAME: &str = "OFF";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DspModule {
    pub id: u8,
    pub name: String,
    pub description: String,
    pub parameters: Vec<Parameter>,
}

impl DspModule {
    /// Both 0 and 0x7F mean "no module".
    pub fn is_off_id(id: u8) -> bool {
        id == 0 || id == DSP_OFF_ID
    }

    pub fn parameter_by_name_mut(&mut self, name: &str) -> Option<&mut Parameter> {
        self.parameters.iter_mut().find(|p| p.name == name)
    }
}

enum Slot {
    Knob(&'static str, i32, i32),
    Combo(&'static str, &'static [&'static str]),
    Delay(&'static str, i32, i32),
}

use Slot::{Combo, Delay, Knob};

const EQ_FREQS: &[&str] = &["100Hz", "200Hz", "400Hz", "800Hz", "1.6kHz", "3.2kHz", "6.4kHz"];
const LFO_WAVES: &[&str] = &["Sine", "Triangle", "Square"];
const ROTARY_SPEED: &[&str] = &["Slow", "Fast"];
const OFF_ON: &[&str] = &["Off", "On"];

const MODULES: &[(u8, &str, &str, &[Slot])] = &[
    (1, "Equalizer", "Three band equalizer", &[
        Combo("Low Freq", EQ_FREQS),
        Knob("Low Gain", -12, 12),
        Combo("Mid Freq", EQ_FREQS),
        Knob("Mid Gain", -12, 12),
        Combo("High Freq", EQ_FREQS),
        Knob("High Gain", -12, 12),
    ]),
    (2, "Compressor", "Evens out the level of the input", &[
        Knob("Attack", 0, 127),
        Knob("Release", 0, 127),
        Knob("Threshold", 0, 127),
        Knob("Ratio", 0, 127),
        Knob("Level", 0, 127),
    ]),
    (3, "Limiter", "Caps the output level", &[
        Knob("Threshold", 0, 127),
        Knob("Release", 0, 127),
        Knob("Level", 0, 127),
    ]),
    (4, "Enhancer", "Emphasises low and high frequencies", &[
        Knob("Low Gain", -12, 12),
        Knob("High Gain", -12, 12),
    ]),
    (5, "Chorus", "Modulated short delay", &[
        Knob("Rate", 0, 127),
        Knob("Depth", 0, 127),
        Knob("Feedback", -64, 63),
        Knob("Wet Level", 0, 127),
        Knob("Dry Level", 0, 127),
    ]),
    (6, "Flanger", "Swept comb filter", &[
        Knob("Rate", 0, 127),
        Knob("Depth", 0, 127),
        Knob("Feedback", -64, 63),
        Knob("Manual", 0, 127),
        Knob("Wet Level", 0, 127),
        Knob("Dry Level", 0, 127),
    ]),
    (7, "Phaser", "Swept all-pass filter", &[
        Knob("Rate", 0, 127),
        Knob("Depth", 0, 127),
        Knob("Resonance", 0, 127),
        Knob("Manual", 0, 127),
        Knob("Wet Level", 0, 127),
        Knob("Dry Level", 0, 127),
    ]),
    (8, "Tremolo", "Periodic volume modulation", &[
        Combo("Type", LFO_WAVES),
        Knob("Rate", 0, 127),
        Knob("Depth", 0, 127),
    ]),
    (9, "Auto Pan", "Periodic stereo position modulation", &[
        Combo("Type", LFO_WAVES),
        Knob("Rate", 0, 127),
        Knob("Depth", 0, 127),
    ]),
    (10, "Rotary", "Rotating speaker simulation", &[
        Combo("Speed", ROTARY_SPEED),
        Combo("Brake", OFF_ON),
        Knob("Fall Time", 0, 127),
        Knob("Rise Time", 0, 127),
        Knob("Slow Rate", 0, 127),
        Knob("Fast Rate", 0, 127),
        Knob("Drive", 0, 127),
        Knob("Level", 0, 127),
    ]),
    (11, "Distortion", "Overdriven amplifier", &[
        Knob("Gain", 0, 127),
        Knob("Low", -12, 12),
        Knob("High", -12, 12),
        Knob("Level", 0, 127),
    ]),
    (12, "Pitch Shifter", "Transposed copy of the input", &[
        Knob("Pitch", -24, 24),
        Knob("Fine", -50, 50),
        Knob("Feedback", -64, 63),
        Knob("Wet Level", 0, 127),
        Knob("Dry Level", 0, 127),
    ]),
    (13, "Ring Modulator", "Multiplies the input with an oscillator", &[
        Knob("Osc Freq", 0, 127),
        Knob("LFO Rate", 0, 127),
        Knob("LFO Depth", 0, 127),
        Knob("Wet Level", 0, 127),
        Knob("Dry Level", 0, 127),
    ]),
    (14, "Stereo Delay", "Independent left and right delay lines", &[
        Knob("Input Level", 0, 127),
        Knob("Feedback", -64, 63),
        Knob("Low Damp", 0, 127),
        Knob("High Damp", 0, 127),
        Knob("Lch Level", 0, 127),
        Knob("Rch Level", 0, 127),
        Knob("Lch Pan", -64, 63),
        Knob("Rch Pan", -64, 63),
        Knob("Mod Rate", 0, 127),
        Knob("Mod Depth", 0, 127),
        Knob("Wet Level", 0, 127),
        Knob("Dry Level", 0, 127),
        Delay("Delay Time", 0, 2000),
    ]),
];

fn build_module(id: u8, name: &str, description: &str, slots: &[Slot]) -> DspModule {
    let parameters = slots
        .iter()
        .enumerate()
        .map(|(index, slot)| {
            let (label, param_type, choices) = match slot {
                Knob(label, min, max) => (*label, ParamType::Knob, Choices::range(*min, *max)),
                Combo(label, options) => (*label, ParamType::Combo, Choices::options(options)),
                Delay(label, min, max) => {
                    (*label, ParamType::SpecialDelayKnob, Choices::range(*min, *max))
                }
            };
            let slot_index = index as u16;
            Parameter::new(slot_index, label, slot_index, 0, ParamKind::Dsp, param_type, choices)
        })
        .collect();
    DspModule {
        id,
        name: name.to_string(),
        description: description.to_string(),
        parameters,
    }
}

/// The full module catalog.
pub fn catalog() -> &'static [DspModule] {
    static CATALOG: OnceLock<Vec<DspModule>> = OnceLock::new();
    CATALOG.get_or_init(|| {
        MODULES
            .iter()
            .map(|(id, name, description, slots)| build_module(*id, name, description, slots))
            .collect()
    })
}

/// Clone a catalog module into an owned copy. `None` for the off ids and unknown ids.
pub fn lookup(id: u8) -> Option<DspModule> {
    if DspModule::is_off_id(id) {
        return None;
    }
    catalog().iter().find(|m| m.id == id).cloned()
}

/// Clone a catalog module by display name.
pub fn lookup_by_name(name: &str) -> Option<DspModule> {
    catalog().iter().find(|m| m.name == name).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_module_exceeds_slot_count() {
        for module in catalog() {
            assert!(module.parameters.len() <= DSP_SLOT_COUNT, "{}", module.name);
        }
    }

    #[test]
    fn off_ids_have_no_module() {
        assert!(lookup(0).is_none());
        assert!(lookup(DSP_OFF_ID).is_none());
    }

    #[test]
    fn lookup_returns_independent_copy() {
        let mut copy = lookup(5).unwrap();
        copy.parameters[0].set_value(99);
        assert_eq!(catalog()[4].parameters[0].value, 0);
        assert_eq!(lookup(5).unwrap().parameters[0].value, 0);
    }

    #[test]
    fn exactly_one_module_has_delay_slot() {
        let with_delay: Vec<&DspModule> = catalog()
            .iter()
            .filter(|m| {
                m.parameters
                    .get(12)
                    .is_some_and(|p| p.param_type == ParamType::SpecialDelayKnob)
            })
            .collect();
        assert_eq!(with_delay.len(), 1);
        assert_eq!(with_delay[0].name, "Stereo Delay");
    }
}
