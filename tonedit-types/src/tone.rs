use serde::{Deserialize, Serialize};

use crate::dsp::{DspModule, DSP_BLOCK_COUNT};
use crate::param::Parameter;
use crate::parameters::{advanced_parameters, main_parameters};

/// Name used when the synth reports an empty tone name.
pub const DEFAULT_TONE_NAME: &str = "User Tone";

/// Width of the synth's tone name field.
pub const TONE_NAME_LEN: usize = 16;

/// Keyboard model the tone is edited for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SynthModel {
    #[default]
    CtX3000,
    CtX5000,
}

impl SynthModel {
    pub fn name(&self) -> &'static str {
        match self {
            SynthModel::CtX3000 => "CT-X3000",
            SynthModel::CtX5000 => "CT-X5000",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().replace(['-', ' '], "").as_str() {
            "CTX3000" => Some(SynthModel::CtX3000),
            "CTX5000" => Some(SynthModel::CtX5000),
            _ => None,
        }
    }
}

/// The patch being edited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tone {
    pub name: String,
    /// Catalog id of the preset this tone was derived from
    pub parent: Option<u16>,
    pub model: SynthModel,
    pub main_parameters: Vec<Parameter>,
    pub advanced_parameters: Vec<Parameter>,
    pub blocks: [Option<DspModule>; DSP_BLOCK_COUNT],
}

impl Tone {
    pub fn new(model: SynthModel) -> Self {
        Self {
            name: DEFAULT_TONE_NAME.to_string(),
            parent: None,
            model,
            main_parameters: main_parameters(),
            advanced_parameters: advanced_parameters(),
            blocks: Default::default(),
        }
    }

    /// Main then advanced parameters, in request order.
    pub fn parameters(&self) -> impl Iterator<Item = &Parameter> {
        self.main_parameters
            .iter()
            .chain(self.advanced_parameters.iter())
    }

    /// Find a main or advanced parameter by its (number, block) address.
    pub fn parameter_mut(&mut self, number: u16, block: u16) -> Option<&mut Parameter> {
        self.main_parameters
            .iter_mut()
            .chain(self.advanced_parameters.iter_mut())
            .find(|p| p.number == number && p.block == block)
    }

    pub fn parameter_by_id_mut(&mut self, id: u16) -> Option<&mut Parameter> {
        self.main_parameters
            .iter_mut()
            .chain(self.advanced_parameters.iter_mut())
            .find(|p| p.id == id)
    }

    pub fn parameter_by_name_mut(&mut self, name: &str) -> Option<&mut Parameter> {
        self.main_parameters
            .iter_mut()
            .chain(self.advanced_parameters.iter_mut())
            .find(|p| p.name == name)
    }

    /// Store a cleaned-up name: printable ASCII only, cut to the name field,
    /// trimmed, and [`DEFAULT_TONE_NAME`] if nothing is left.
    pub fn set_name(&mut self, name: &str) -> &str {
        let printable: String = name
            .chars()
            .filter(|c| (' '..='~').contains(c))
            .take(TONE_NAME_LEN)
            .collect();
        let trimmed = printable.trim();
        self.name = if trimmed.is_empty() {
            DEFAULT_TONE_NAME.to_string()
        } else {
            trimmed.to_string()
        };
        &self.name
    }

    pub fn block(&self, block: usize) -> Option<&DspModule> {
        self.blocks.get(block).and_then(|b| b.as_ref())
    }

    pub fn block_mut(&mut self, block: usize) -> Option<&mut DspModule> {
        self.blocks.get_mut(block).and_then(|b| b.as_mut())
    }

    /// Blocks that currently hold a module.
    pub fn populated_blocks(&self) -> impl Iterator<Item = usize> + '_ {
        self.blocks
            .iter()
            .enumerate()
            .filter(|(_, b)| b.is_some())
            .map(|(i, _)| i)
    }
}

impl Default for Tone {
    fn default() -> Self {
        Self::new(SynthModel::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp;

    #[test]
    fn new_tone_has_defaults() {
        let tone = Tone::new(SynthModel::CtX5000);
        assert_eq!(tone.name, DEFAULT_TONE_NAME);
        assert!(tone.parent.is_none());
        assert!(!tone.main_parameters.is_empty());
        assert!(tone.blocks.iter().all(Option::is_none));
    }

    #[test]
    fn set_name_strips_and_falls_back() {
        let mut tone = Tone::default();
        assert_eq!(tone.set_name("  Warm\u{7}Pad\t "), "WarmPad");
        assert_eq!(tone.set_name("A very long tone name"), "A very long tone");
        assert_eq!(tone.set_name("\u{1}\u{2}   "), DEFAULT_TONE_NAME);
        assert_eq!(tone.set_name(""), DEFAULT_TONE_NAME);
    }

    #[test]
    fn parameter_lookup_uses_number_and_block() {
        let mut tone = Tone::default();
        let layer1 = tone.parameter_mut(24, 0).unwrap().id;
        let layer2 = tone.parameter_mut(24, 1).unwrap().id;
        assert_ne!(layer1, layer2);
        assert!(tone.parameter_mut(24, 3).is_none());
    }

    #[test]
    fn populated_blocks_lists_occupied_slots() {
        let mut tone = Tone::default();
        tone.blocks[2] = dsp::lookup(5);
        assert_eq!(tone.populated_blocks().collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn parse_model_names() {
        assert_eq!(SynthModel::parse("CT-X3000"), Some(SynthModel::CtX3000));
        assert_eq!(SynthModel::parse("ctx5000"), Some(SynthModel::CtX5000));
        assert_eq!(SynthModel::parse("DX7"), None);
    }
}
