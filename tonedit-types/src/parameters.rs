//! Main and advanced tone parameter catalogs.
//!
//! Parameter numbers are the synth-side addresses used in the sysex type field.

use crate::param::{Choices, ParamKind, ParamType, Parameter};

struct Def {
    id: u16,
    name: &'static str,
    number: u16,
    block: u16,
    param_type: ParamType,
    choices: DefChoices,
}

enum DefChoices {
    Range(i32, i32),
    Options(&'static [&'static str]),
}

const fn knob(id: u16, name: &'static str, number: u16, min: i32, max: i32) -> Def {
    Def { id, name, number, block: 0, param_type: ParamType::Knob, choices: DefChoices::Range(min, max) }
}

const fn knob_x2(id: u16, name: &'static str, number: u16, block: u16, min: i32, max: i32) -> Def {
    Def { id, name, number, block, param_type: ParamType::KnobX2, choices: DefChoices::Range(min, max) }
}

const fn atk_rel(id: u16, name: &'static str, number: u16) -> Def {
    Def { id, name, number, block: 0, param_type: ParamType::SpecialAtkRelKnob, choices: DefChoices::Range(-64, 63) }
}

const fn combo(id: u16, name: &'static str, number: u16, options: &'static [&'static str]) -> Def {
    Def { id, name, number, block: 0, param_type: ParamType::Combo, choices: DefChoices::Options(options) }
}

const WAVES: &[&str] = &["Sine", "Triangle", "Saw", "Square"];
const OFF_ON: &[&str] = &["Off", "On"];
const FILTER_TYPES: &[&str] = &["Low Pass", "High Pass", "Band Pass", "Bypass"];

const MAIN: &[Def] = &[
    knob(0, "Volume", 30, 0, 127),
    knob(1, "Cutoff", 31, -64, 63),
    knob(2, "Resonance", 32, -64, 63),
    atk_rel(3, "Attack", 20),
    atk_rel(4, "Release", 21),
    knob(5, "Octave Shift", 33, -2, 2),
    knob(6, "Coarse Tune", 34, -24, 24),
    knob(7, "Fine Tune", 35, -50, 50),
    combo(8, "Vibrato Type", 40, WAVES),
    knob(9, "Vibrato Depth", 41, -64, 63),
    knob(10, "Vibrato Rate", 42, -64, 63),
    knob(11, "Vibrato Delay", 43, -64, 63),
    knob(12, "Touch Sense", 44, -64, 63),
    knob(13, "Reverb Send", 57, 0, 127),
    knob(14, "Chorus Send", 58, 0, 127),
];

const ADVANCED: &[Def] = &[
    knob(100, "Pitch Bend Range", 36, 0, 24),
    combo(101, "Portamento", 37, OFF_ON),
    knob(102, "Portamento Time", 38, 0, 127),
    knob(103, "Pan", 39, -64, 63),
    knob(104, "Key Follow", 77, -12, 12),
    knob(105, "Key Follow Base", 78, 0, 127),
    knob_x2(106, "Pitch Env Attack Rate", 22, 0, 0, 1023),
    knob_x2(107, "Pitch Env Attack Level", 23, 0, -512, 511),
    knob_x2(108, "Filter Env Attack Rate", 24, 0, 0, 1023),
    knob_x2(109, "Filter Env Release Rate", 25, 0, 0, 1023),
    knob_x2(110, "Amp Env Attack Rate", 26, 0, 0, 1023),
    knob_x2(111, "Amp Env Release Rate", 27, 0, 0, 1023),
    knob_x2(112, "Layer 2 Filter Env Attack Rate", 24, 1, 0, 1023),
    knob_x2(113, "Layer 2 Filter Env Release Rate", 25, 1, 0, 1023),
    knob_x2(114, "Layer 2 Amp Env Attack Rate", 26, 1, 0, 1023),
    knob_x2(115, "Layer 2 Amp Env Release Rate", 27, 1, 0, 1023),
    Def {
        id: 116,
        name: "Filter Type",
        number: 45,
        block: 0,
        param_type: ParamType::Combo,
        choices: DefChoices::Options(FILTER_TYPES),
    },
    knob_x2(117, "Velocity to Cutoff", 46, 0, -512, 511),
    knob_x2(118, "Velocity to Volume", 47, 0, -512, 511),
    knob_x2(119, "Filter Key Follow", 48, 0, -512, 511),
    knob_x2(120, "LFO Rate", 59, 0, 0, 1023),
    knob_x2(121, "LFO Depth", 60, 0, -512, 511),
];

fn build(defs: &[Def], kind: ParamKind) -> Vec<Parameter> {
    defs.iter()
        .map(|d| {
            let choices = match d.choices {
                DefChoices::Range(min, max) => Choices::range(min, max),
                DefChoices::Options(labels) => Choices::options(labels),
            };
            Parameter::new(d.id, d.name, d.number, d.block, kind, d.param_type, choices)
        })
        .collect()
}

/// Main parameters in panel order.
pub fn main_parameters() -> Vec<Parameter> {
    build(MAIN, ParamKind::Main)
}

/// Advanced parameters in panel order.
pub fn advanced_parameters() -> Vec<Parameter> {
    build(ADVANCED, ParamKind::Advanced)
}
