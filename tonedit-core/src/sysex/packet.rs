//! Fixed-field SysEx packets.
//!
//! Layout (two-byte fields are 7-bit LSB/MSB):
//!
//! ```text
//! [0]      F0
//! [1..4]   44 19 01 7F      manufacturer, model, model, "don't care" device
//! [5]      command
//! [6..7]   00 00            (bulk start session carries its sub-command in [6])
//! [8..15]  00 x 8
//! [16..17] block id
//! [18..19] sysex type / parameter number
//! [20..23] 00 x 4
//! [24..]   payload
//! [-1]     F7
//! ```
//!
//! Short bulk control packets (ACK, end-of-session) are just
//! `F0 44 19 01 7F <command> F7`.

use std::fmt;

use tonedit_types::{DspModule, ParamType, Parameter, DSP_OFF_ID, DSP_SLOT_COUNT};

use super::value::{
    decode_atk_rel_pair, decode_delay, decode_value, encode_delay, encode_param, join_14bit,
    split_14bit,
};

pub const SYSEX_START: u8 = 0xF0;
pub const SYSEX_END: u8 = 0xF7;
pub const MANUFACTURER_ID: u8 = 0x44;
pub const DEVICE_ID: [u8; 4] = [MANUFACTURER_ID, 0x19, 0x01, 0x7F];

/// Bytes before the payload.
pub const HEADER_LEN: usize = 24;
/// Anything shorter cannot be a packet.
pub const MIN_PACKET_LEN: usize = 7;

pub const TONE_NAME_TYPE: u16 = 0;
pub use tonedit_types::TONE_NAME_LEN;
pub const DSP_MODULE_TYPE: u16 = 85;
pub const DSP_PARAMS_TYPE: u16 = 87;

/// Parameter numbers carried as a two-byte payload.
pub const LONG_PARAMETER_NUMBERS: &[u16] = &[20, 21, 22, 23, 24, 25, 26, 27, 45, 46, 47, 48, 59, 60];

/// Parameter numbers carried as a one-byte payload.
pub const SHORT_PARAMETER_NUMBERS: &[u16] = &[
    30, 31, 32, 33, 34, 35, 36, 37, 38, 39, 40, 41, 42, 43, 44, 57, 58, 77, 78,
];

/// Index of the DSP slot that may hold a delay knob spanning two slots.
const DELAY_SLOT: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Request = 0x00,
    Transmit = 0x01,
    HostBlockRequest = 0x04,
    HostBlockSend = 0x05,
    StartBulkSession = 0x08,
    Ack = 0x0A,
    EndSendSession = 0x0D,
    EndBulkSession = 0x0E,
}

impl Command {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x00 => Some(Command::Request),
            0x01 => Some(Command::Transmit),
            0x04 => Some(Command::HostBlockRequest),
            0x05 => Some(Command::HostBlockSend),
            0x08 => Some(Command::StartBulkSession),
            0x0A => Some(Command::Ack),
            0x0D => Some(Command::EndSendSession),
            0x0E => Some(Command::EndBulkSession),
            _ => None,
        }
    }

    /// Commands that only occur inside a bulk session.
    pub fn is_bulk(&self) -> bool {
        !matches!(self, Command::Request | Command::Transmit)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PacketError {
    TooShort(usize),
    BadStart(u8),
    BadDeviceId([u8; 4]),
    BadEnd(u8),
    /// Payload shorter than the parameter needs.
    Truncated { expected: usize, actual: usize },
    /// Parameter number in neither size table.
    UnknownParameter(u16),
}

impl fmt::Display for PacketError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooShort(len) => write!(f, "packet too short ({} bytes)", len),
            Self::BadStart(b) => write!(f, "bad start byte {:#04x}", b),
            Self::BadDeviceId(id) => write!(f, "unexpected device id {}", to_hex(id)),
            Self::BadEnd(b) => write!(f, "bad end byte {:#04x}", b),
            Self::Truncated { expected, actual } => {
                write!(f, "payload truncated: need {} bytes, got {}", expected, actual)
            }
            Self::UnknownParameter(n) => write!(f, "parameter {} has no known payload size", n),
        }
    }
}

impl std::error::Error for PacketError {}

/// Space-separated uppercase hex, for logs.
pub fn to_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

/// A validated packet received from the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SysexPacket {
    bytes: Vec<u8>,
}

impl SysexPacket {
    pub fn parse(bytes: &[u8]) -> Result<Self, PacketError> {
        if bytes.len() < MIN_PACKET_LEN {
            return Err(PacketError::TooShort(bytes.len()));
        }
        if bytes[0] != SYSEX_START {
            return Err(PacketError::BadStart(bytes[0]));
        }
        if bytes[1..5] != DEVICE_ID {
            let mut id = [0u8; 4];
            id.copy_from_slice(&bytes[1..5]);
            return Err(PacketError::BadDeviceId(id));
        }
        let last = bytes[bytes.len() - 1];
        if last != SYSEX_END {
            return Err(PacketError::BadEnd(last));
        }
        Ok(Self {
            bytes: bytes.to_vec(),
        })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn command_byte(&self) -> u8 {
        self.bytes[5]
    }

    pub fn command(&self) -> Option<Command> {
        Command::from_byte(self.command_byte())
    }

    /// Whether the packet carries the full fixed-field header.
    pub fn has_header(&self) -> bool {
        self.bytes.len() > HEADER_LEN
    }

    pub fn sub_command(&self) -> Option<u8> {
        self.has_header().then(|| self.bytes[6])
    }

    pub fn block(&self) -> Option<u16> {
        self.has_header()
            .then(|| join_14bit(self.bytes[16], self.bytes[17]))
    }

    pub fn sysex_type(&self) -> Option<u16> {
        self.has_header()
            .then(|| join_14bit(self.bytes[18], self.bytes[19]))
    }

    /// Bytes between the header and the end marker.
    pub fn payload(&self) -> &[u8] {
        if self.has_header() {
            &self.bytes[HEADER_LEN..self.bytes.len() - 1]
        } else {
            &[]
        }
    }
}

fn header(command: Command, block: u16, sysex_type: u16) -> Vec<u8> {
    let mut out = Vec::with_capacity(HEADER_LEN + 16);
    out.push(SYSEX_START);
    out.extend_from_slice(&DEVICE_ID);
    out.push(command as u8);
    out.extend_from_slice(&[0u8; 2]);
    out.extend_from_slice(&[0u8; 8]);
    out.extend_from_slice(&split_14bit(block));
    out.extend_from_slice(&split_14bit(sysex_type));
    out.extend_from_slice(&[0u8; 4]);
    debug_assert_eq!(out.len(), HEADER_LEN);
    out
}

/// Assemble a full fixed-field packet.
pub fn build(command: Command, block: u16, sysex_type: u16, payload: &[u8]) -> Vec<u8> {
    let mut out = header(command, block, sysex_type);
    out.extend_from_slice(payload);
    out.push(SYSEX_END);
    out
}

/// `F0 <device id> <command> F7`
pub fn short_packet(command: Command) -> Vec<u8> {
    let mut out = Vec::with_capacity(MIN_PACKET_LEN);
    out.push(SYSEX_START);
    out.extend_from_slice(&DEVICE_ID);
    out.push(command as u8);
    out.push(SYSEX_END);
    out
}

pub fn tone_name_request() -> Vec<u8> {
    build(Command::Request, 0, TONE_NAME_TYPE, &[])
}

/// Name is truncated or space-padded to the fixed field width.
pub fn tone_name_set(name: &str) -> Vec<u8> {
    let mut payload: Vec<u8> = name
        .bytes()
        .filter(|b| (0x20..0x7F).contains(b))
        .take(TONE_NAME_LEN)
        .collect();
    payload.resize(TONE_NAME_LEN, b' ');
    build(Command::Transmit, 0, TONE_NAME_TYPE, &payload)
}

/// Printable ASCII only, whitespace trimmed.
pub fn decode_tone_name(payload: &[u8]) -> String {
    let printable: String = payload
        .iter()
        .take(TONE_NAME_LEN)
        .filter(|b| (0x20..0x7F).contains(*b))
        .map(|b| *b as char)
        .collect();
    printable.trim().to_string()
}

/// Payload width for a main/advanced parameter number.
pub fn parameter_width(number: u16) -> Option<usize> {
    if LONG_PARAMETER_NUMBERS.contains(&number) {
        Some(2)
    } else if SHORT_PARAMETER_NUMBERS.contains(&number) {
        Some(1)
    } else {
        None
    }
}

pub fn parameter_request(param: &Parameter) -> Vec<u8> {
    build(Command::Request, param.block, param.number, &[])
}

/// Wire payload carrying the parameter's current value.
pub fn parameter_payload(param: &Parameter) -> Result<Vec<u8>, PacketError> {
    let width = parameter_width(param.number).ok_or(PacketError::UnknownParameter(param.number))?;
    let wire = encode_param(param);
    Ok(match width {
        2 => split_14bit(wire).to_vec(),
        _ => vec![(wire & 0x7F) as u8],
    })
}

pub fn parameter_set(param: &Parameter) -> Result<Vec<u8>, PacketError> {
    let payload = parameter_payload(param)?;
    Ok(build(Command::Transmit, param.block, param.number, &payload))
}

/// Decode a response payload into the parameter. Returns the stored value.
pub fn decode_parameter_payload(param: &mut Parameter, payload: &[u8]) -> Result<i32, PacketError> {
    let width = parameter_width(param.number).ok_or(PacketError::UnknownParameter(param.number))?;
    if payload.len() < width {
        return Err(PacketError::Truncated {
            expected: width,
            actual: payload.len(),
        });
    }
    let wire = match (width, param.param_type) {
        (2, ParamType::SpecialAtkRelKnob) => decode_atk_rel_pair(payload[0], payload[1]),
        (2, _) => join_14bit(payload[0], payload[1]),
        _ => payload[0] as u16,
    };
    let value = decode_value(param.param_type, &param.choices, wire);
    Ok(param.set_value(value))
}

pub fn dsp_module_request(block: u8) -> Vec<u8> {
    build(Command::Request, block as u16, DSP_MODULE_TYPE, &[])
}

/// Select a module for a block; `None` switches the block off.
pub fn dsp_module_select(block: u8, module_id: Option<u8>) -> Vec<u8> {
    let id = module_id.unwrap_or(DSP_OFF_ID);
    build(Command::Transmit, block as u16, DSP_MODULE_TYPE, &[id])
}

pub fn dsp_params_request(block: u8) -> Vec<u8> {
    build(Command::Request, block as u16, DSP_PARAMS_TYPE, &[])
}

/// One byte per slot in the module's parameter order; unused slots are zero.
pub fn encode_dsp_slots(module: &DspModule) -> [u8; DSP_SLOT_COUNT] {
    let mut slots = [0u8; DSP_SLOT_COUNT];
    for (slot, param) in slots.iter_mut().zip(&module.parameters) {
        *slot = (encode_param(param) & 0x7F) as u8;
    }
    if let Some(param) = module.parameters.get(DELAY_SLOT) {
        if param.param_type == ParamType::SpecialDelayKnob {
            let [hi, lo] = encode_delay(param.value);
            slots[DELAY_SLOT] = hi;
            slots[DELAY_SLOT + 1] = lo;
        }
    }
    slots
}

/// Apply a 14-slot response to the module's parameters.
pub fn decode_dsp_slots(module: &mut DspModule, slots: &[u8]) -> Result<(), PacketError> {
    if slots.len() < DSP_SLOT_COUNT {
        return Err(PacketError::Truncated {
            expected: DSP_SLOT_COUNT,
            actual: slots.len(),
        });
    }
    for (index, param) in module.parameters.iter_mut().enumerate() {
        let value = if index == DELAY_SLOT && param.param_type == ParamType::SpecialDelayKnob {
            decode_delay(slots[DELAY_SLOT], slots[DELAY_SLOT + 1])
        } else {
            decode_value(param.param_type, &param.choices, slots[index] as u16)
        };
        param.set_value(value);
    }
    Ok(())
}

pub fn dsp_params_set(block: u8, module: &DspModule) -> Vec<u8> {
    build(
        Command::Transmit,
        block as u16,
        DSP_PARAMS_TYPE,
        &encode_dsp_slots(module),
    )
}
