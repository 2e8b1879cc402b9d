//! Application value <-> wire value conversion.
//!
//! The synth centres signed ranges in one of three ways depending on the
//! range bounds; the table of maxima that use the fixed 64 offset is literal.

use tonedit_types::{Choices, ParamType, Parameter};

/// Range maxima that are centred on a fixed offset of 64.
const MIDPOINT_64_MAXIMA: [i32; 3] = [12, 24, 50];

const MIDPOINT: i32 = 64;

/// Offset added to an application value to get the wire value.
fn knob_offset(choices: &Choices) -> i32 {
    let (min, max) = (choices.min(), choices.max());
    if min == 0 {
        0
    } else if MIDPOINT_64_MAXIMA.contains(&max) {
        MIDPOINT
    } else {
        max + 1
    }
}

/// Wire value for an application value. Delay knobs are handled by the packet codec.
pub fn encode_value(param_type: ParamType, choices: &Choices, value: i32) -> u16 {
    let wire = match param_type {
        ParamType::Combo => value,
        ParamType::Knob
        | ParamType::KnobX2
        | ParamType::SpecialAtkRelKnob
        | ParamType::SpecialDelayKnob => value + knob_offset(choices),
    };
    wire.max(0) as u16
}

/// Application value for a wire value, clamped into the choices.
pub fn decode_value(param_type: ParamType, choices: &Choices, wire: u16) -> i32 {
    let wire = wire as i32;
    let value = match param_type {
        ParamType::Combo => wire,
        ParamType::Knob
        | ParamType::KnobX2
        | ParamType::SpecialAtkRelKnob
        | ParamType::SpecialDelayKnob => wire - knob_offset(choices),
    };
    choices.clamp(value)
}

pub fn encode_param(param: &Parameter) -> u16 {
    encode_value(param.param_type, &param.choices, param.value)
}

/// Split into 7-bit LSB/MSB bytes.
pub fn split_14bit(value: u16) -> [u8; 2] {
    [(value & 0x7F) as u8, ((value >> 7) & 0x7F) as u8]
}

pub fn join_14bit(lsb: u8, msb: u8) -> u16 {
    (lsb as u16 & 0x7F) | ((msb as u16 & 0x7F) << 7)
}

/// Attack/release responses are read as two hex digits per byte, high byte first.
pub fn decode_atk_rel_pair(lsb: u8, msb: u8) -> u16 {
    let digits = format!("{:02X}{:02X}", msb, lsb);
    u16::from_str_radix(&digits, 16).unwrap_or(0)
}

/// Zero-pad to four decimal digits and split into two two-digit bytes.
pub fn encode_delay(value: i32) -> [u8; 2] {
    let digits = format!("{:04}", value.clamp(0, 9999));
    let hi = digits[..2].parse::<u8>().unwrap_or(0);
    let lo = digits[2..].parse::<u8>().unwrap_or(0);
    [hi, lo]
}

pub fn decode_delay(hi: u8, lo: u8) -> i32 {
    hi as i32 * 100 + lo as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn knob(min: i32, max: i32) -> Choices {
        Choices::range(min, max)
    }

    #[test]
    fn knob_centred_on_64() {
        let choices = knob(-12, 12);
        assert_eq!(encode_value(ParamType::Knob, &choices, 5), 69);
        assert_eq!(decode_value(ParamType::Knob, &choices, 69), 5);
    }

    #[test]
    fn knob_starting_at_zero_is_unchanged() {
        let choices = knob(0, 127);
        assert_eq!(encode_value(ParamType::Knob, &choices, 100), 100);
        assert_eq!(decode_value(ParamType::Knob, &choices, 100), 100);
    }

    #[test]
    fn knob_general_offset_is_max_plus_one() {
        let choices = knob(-2, 2);
        assert_eq!(encode_value(ParamType::Knob, &choices, -2), 1);
        assert_eq!(encode_value(ParamType::Knob, &choices, 2), 5);
        assert_eq!(decode_value(ParamType::Knob, &choices, 3), 0);
    }

    #[test]
    fn roundtrip_every_knob_branch() {
        for choices in [knob(0, 127), knob(-24, 24), knob(-50, 50), knob(-64, 63), knob(-512, 511)] {
            for v in choices.min()..=choices.max() {
                let wire = encode_value(ParamType::KnobX2, &choices, v);
                assert_eq!(decode_value(ParamType::KnobX2, &choices, wire), v);
            }
        }
    }

    #[test]
    fn combo_is_index() {
        let choices = Choices::options(&["A", "B", "C"]);
        assert_eq!(encode_value(ParamType::Combo, &choices, 2), 2);
        assert_eq!(decode_value(ParamType::Combo, &choices, 9), 2);
    }

    #[test]
    fn decode_clamps_out_of_range_wire() {
        assert_eq!(decode_value(ParamType::Knob, &knob(-12, 12), 127), 12);
        assert_eq!(decode_value(ParamType::Knob, &knob(-12, 12), 0), -12);
    }

    #[test]
    fn split_and_join() {
        assert_eq!(split_14bit(1023), [0x7F, 0x07]);
        assert_eq!(join_14bit(0x7F, 0x07), 1023);
    }

    #[test]
    fn atk_rel_uses_hex_concatenation() {
        assert_eq!(decode_atk_rel_pair(0x40, 0x00), 64);
        // 0x01 then 0x48 reads as "0148", not (1 << 7) | 0x48
        assert_eq!(decode_atk_rel_pair(0x48, 0x01), 0x148);
        assert_ne!(decode_atk_rel_pair(0x48, 0x01), join_14bit(0x48, 0x01));
    }

    #[test]
    fn delay_is_decimal_pairs() {
        assert_eq!(encode_delay(1234), [12, 34]);
        assert_eq!(encode_delay(5), [0, 5]);
        assert_eq!(encode_delay(2000), [20, 0]);
        assert_eq!(decode_delay(12, 34), 1234);
    }
}
