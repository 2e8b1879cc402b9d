use serde::{Deserialize, Serialize};

/// Wire encoding family of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParamType {
    /// Enumerated choice; the value is the 0-based option index.
    Combo,
    /// Linear range, possibly centred on zero.
    Knob,
    /// Knob carried in the two-byte payload form.
    KnobX2,
    /// Attack/release knob whose response is decoded by hex-pair concatenation.
    SpecialAtkRelKnob,
    /// Four decimal digits split into two two-digit wire bytes.
    SpecialDelayKnob,
}

/// Which list a parameter belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParamKind {
    Main,
    Advanced,
    Dsp,
}

/// Valid values for a parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Choices {
    Options(Vec<String>),
    Range { min: i32, max: i32 },
}

impl Choices {
    pub fn options(labels: &[&str]) -> Self {
        Choices::Options(labels.iter().map(|s| s.to_string()).collect())
    }

    pub fn range(min: i32, max: i32) -> Self {
        Choices::Range { min, max }
    }

    /// Smallest valid value.
    pub fn min(&self) -> i32 {
        match self {
            Choices::Options(_) => 0,
            Choices::Range { min, .. } => *min,
        }
    }

    /// Largest valid value.
    pub fn max(&self) -> i32 {
        match self {
            Choices::Options(labels) => labels.len().saturating_sub(1) as i32,
            Choices::Range { max, .. } => *max,
        }
    }

    pub fn clamp(&self, value: i32) -> i32 {
        value.clamp(self.min(), self.max())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub id: u16,
    pub name: String,
    /// Synth-side parameter number
    pub number: u16,
    /// Block the parameter is addressed to (always 0 for DSP parameters)
    pub block: u16,
    pub kind: ParamKind,
    pub param_type: ParamType,
    pub choices: Choices,
    pub value: i32,
}

impl Parameter {
    pub fn new(
        id: u16,
        name: &str,
        number: u16,
        block: u16,
        kind: ParamKind,
        param_type: ParamType,
        choices: Choices,
    ) -> Self {
        let value = choices.clamp(0);
        Self {
            id,
            name: name.to_string(),
            number,
            block,
            kind,
            param_type,
            choices,
            value,
        }
    }

    /// Set the value, clamping to bounds. Returns the stored value.
    pub fn set_value(&mut self, value: i32) -> i32 {
        self.value = self.choices.clamp(value);
        self.value
    }

    /// Human-readable value: the option label for combos, the number otherwise.
    pub fn display_value(&self) -> String {
        match &self.choices {
            Choices::Options(labels) => labels
                .get(self.value as usize)
                .cloned()
                .unwrap_or_else(|| self.value.to_string()),
            Choices::Range { .. } => self.value.to_string(),
        }
    }
}
