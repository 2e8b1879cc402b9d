//! Preset instrument catalog, keyed by bank select and program change.

use serde::Serialize;

/// Name used when a program change matches no catalog entry.
pub const UNKNOWN_TONE_NAME: &str = "Unknown Tone";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Instrument {
    pub id: u16,
    pub name: &'static str,
    /// Bank select MSB (CC 0)
    pub bank: u8,
    pub program: u8,
}

const fn inst(id: u16, name: &'static str, bank: u8, program: u8) -> Instrument {
    Instrument { id, name, bank, program }
}

pub const INSTRUMENTS: &[Instrument] = &[
    inst(1, "Stereo Grand Piano", 0, 0),
    inst(2, "Mellow Piano", 1, 0),
    inst(3, "Bright Piano", 2, 0),
    inst(4, "Modern Piano", 3, 0),
    inst(5, "Rock Piano", 0, 1),
    inst(6, "Honky-Tonk Piano", 0, 3),
    inst(7, "Electric Piano", 0, 4),
    inst(8, "FM Electric Piano", 0, 5),
    inst(9, "Harpsichord", 0, 6),
    inst(10, "Clavi", 0, 7),
    inst(11, "Vibraphone", 0, 11),
    inst(12, "Marimba", 0, 12),
    inst(13, "Drawbar Organ", 0, 16),
    inst(14, "Percussive Organ", 0, 17),
    inst(15, "Rock Organ", 0, 18),
    inst(16, "Pipe Organ", 0, 19),
    inst(17, "Accordion", 0, 21),
    inst(18, "Nylon String Guitar", 0, 24),
    inst(19, "Steel String Guitar", 0, 25),
    inst(20, "Jazz Guitar", 0, 26),
    inst(21, "Overdrive Guitar", 0, 29),
    inst(22, "Acoustic Bass", 0, 32),
    inst(23, "Fingered Bass", 0, 33),
    inst(24, "Synth Bass", 0, 38),
    inst(25, "Strings", 0, 48),
    inst(26, "Slow Strings", 0, 49),
    inst(27, "Choir Aahs", 0, 52),
    inst(28, "Trumpet", 0, 56),
    inst(29, "Brass Section", 0, 61),
    inst(30, "Alto Sax", 0, 65),
    inst(31, "Flute", 0, 73),
    inst(32, "Square Lead", 0, 80),
    inst(33, "Saw Lead", 0, 81),
    inst(34, "Warm Pad", 0, 89),
];

/// Exact (bank, program) match.
pub fn lookup(bank: u8, program: u8) -> Option<&'static Instrument> {
    INSTRUMENTS
        .iter()
        .find(|i| i.bank == bank && i.program == program)
}
