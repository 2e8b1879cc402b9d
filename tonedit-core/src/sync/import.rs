//! JSON tone documents.
//!
//! Values are keyed by parameter display name. Combo values are stored
//! 1-based in the document and shifted down on import.

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;

use tonedit_types::dsp::{self, DSP_OFF_NAME};
use tonedit_types::{ParamType, Parameter, Tone, DSP_BLOCK_COUNT};

#[derive(Debug, Default, Deserialize)]
pub struct ToneDocument {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub main: BTreeMap<String, i32>,
    #[serde(default)]
    pub advanced: BTreeMap<String, i32>,
    #[serde(default)]
    pub dsp: Vec<DspBlockDocument>,
}

#[derive(Debug, Deserialize)]
pub struct DspBlockDocument {
    pub block: usize,
    /// Module name, or "OFF"
    pub module: String,
    #[serde(default)]
    pub parameters: BTreeMap<String, i32>,
}

#[derive(Debug)]
pub enum ImportError {
    Json(serde_json::Error),
}

impl fmt::Display for ImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(e) => write!(f, "invalid tone document: {}", e),
        }
    }
}

impl std::error::Error for ImportError {}

impl From<serde_json::Error> for ImportError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

/// What an import touched. Everything listed here gets re-transmitted.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImportChanges {
    pub name: bool,
    /// Parameter ids, in application order
    pub parameters: Vec<u16>,
    pub blocks: Vec<usize>,
    /// Entries that matched nothing
    pub skipped: Vec<String>,
}

impl ImportChanges {
    pub fn is_empty(&self) -> bool {
        !self.name && self.parameters.is_empty() && self.blocks.is_empty()
    }
}

impl ToneDocument {
    pub fn parse(json: &str) -> Result<Self, ImportError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Apply the whole document to `tone`. Unknown names are skipped, not fatal.
    pub fn apply(&self, tone: &mut Tone) -> ImportChanges {
        let mut changes = ImportChanges::default();

        if let Some(name) = &self.name {
            tone.set_name(name);
            changes.name = true;
        }

        for (name, value) in &self.main {
            match tone.main_parameters.iter_mut().find(|p| &p.name == name) {
                Some(param) => {
                    apply_value(param, *value);
                    changes.parameters.push(param.id);
                }
                None => changes.skipped.push(format!("main parameter \"{}\"", name)),
            }
        }
        for (name, value) in &self.advanced {
            match tone.advanced_parameters.iter_mut().find(|p| &p.name == name) {
                Some(param) => {
                    apply_value(param, *value);
                    changes.parameters.push(param.id);
                }
                None => changes.skipped.push(format!("advanced parameter \"{}\"", name)),
            }
        }

        for entry in &self.dsp {
            if entry.block >= DSP_BLOCK_COUNT {
                changes.skipped.push(format!("DSP block {}", entry.block));
                continue;
            }
            let module = if entry.module.eq_ignore_ascii_case(DSP_OFF_NAME) {
                None
            } else {
                match dsp::lookup_by_name(&entry.module) {
                    Some(module) => Some(module),
                    None => {
                        changes.skipped.push(format!("DSP module \"{}\"", entry.module));
                        continue;
                    }
                }
            };
            tone.blocks[entry.block] = module;
            if let Some(module) = tone.block_mut(entry.block) {
                for (name, value) in &entry.parameters {
                    match module.parameter_by_name_mut(name) {
                        Some(param) => apply_value(param, *value),
                        None => changes.skipped.push(format!(
                            "DSP parameter \"{}\" in block {}",
                            name, entry.block
                        )),
                    }
                }
            }
            if !changes.blocks.contains(&entry.block) {
                changes.blocks.push(entry.block);
            }
        }

        for skipped in &changes.skipped {
            log::warn!(target: "sync", "import: no match for {}", skipped);
        }
        changes
    }
}

fn apply_value(param: &mut Parameter, value: i32) {
    let value = if param.param_type == ParamType::Combo {
        value - 1
    } else {
        value
    };
    param.set_value(value);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn main_value(tone: &Tone, name: &str) -> i32 {
        tone.main_parameters
            .iter()
            .find(|p| p.name == name)
            .unwrap()
            .value
    }

    #[test]
    fn applies_named_values_with_combo_offset() {
        let doc = ToneDocument::parse(
            r#"{
                "name": "Warm Pad ",
                "main": { "Volume": 100, "Vibrato Type": 2 },
                "advanced": { "Pan": -10 }
            }"#,
        )
        .unwrap();
        let mut tone = Tone::default();
        let changes = doc.apply(&mut tone);

        assert!(changes.name);
        assert_eq!(tone.name, "Warm Pad");
        assert_eq!(main_value(&tone, "Volume"), 100);
        assert_eq!(main_value(&tone, "Vibrato Type"), 1);
        assert_eq!(changes.parameters.len(), 3);
        assert!(changes.skipped.is_empty());
    }

    #[test]
    fn values_are_clamped_to_range() {
        let doc = ToneDocument::parse(r#"{ "main": { "Volume": 500 } }"#).unwrap();
        let mut tone = Tone::default();
        doc.apply(&mut tone);
        assert_eq!(main_value(&tone, "Volume"), 127);
    }

    #[test]
    fn dsp_blocks_select_modules_by_name() {
        let doc = ToneDocument::parse(
            r#"{ "dsp": [
                { "block": 1, "module": "Chorus" },
                { "block": 3, "module": "off" }
            ] }"#,
        )
        .unwrap();
        let mut tone = Tone::default();
        tone.blocks[3] = dsp::lookup(5);
        let changes = doc.apply(&mut tone);

        assert_eq!(tone.block(1).map(|m| m.id), Some(5));
        assert!(tone.block(3).is_none());
        assert_eq!(changes.blocks, vec![1, 3]);
    }

    #[test]
    fn unknown_names_are_skipped() {
        let doc = ToneDocument::parse(
            r#"{
                "main": { "Wobble": 3 },
                "dsp": [ { "block": 0, "module": "Time Machine" }, { "block": 9, "module": "Chorus" } ]
            }"#,
        )
        .unwrap();
        let mut tone = Tone::default();
        let changes = doc.apply(&mut tone);

        assert!(changes.is_empty());
        assert_eq!(changes.skipped.len(), 3);
        assert!(tone.blocks.iter().all(Option::is_none));
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(matches!(
            ToneDocument::parse("{ \"main\": [1, 2"),
            Err(ImportError::Json(_))
        ));
    }
}
