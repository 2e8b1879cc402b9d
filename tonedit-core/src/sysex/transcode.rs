//! 7-bit-safe packing for bulk payloads.
//!
//! Bits are taken least-significant first: every 7 input bits become one
//! output byte, so 7 input bytes become 8 output bytes. A trailing partial
//! group is emitted as one more byte, zero-padded.

use std::fmt;

/// Number of base-128 digits used to carry a CRC-32.
pub const CRC_PACKED_LEN: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscodeError {
    /// A "7-bit" byte had its high bit set.
    HighBitSet { index: usize, byte: u8 },
    /// Leftover bits at the end were not zero padding.
    TrailingBits { bits: u32 },
}

impl fmt::Display for TranscodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HighBitSet { index, byte } => {
                write!(f, "byte {:#04x} at offset {} is not 7-bit data", byte, index)
            }
            Self::TrailingBits { bits } => {
                write!(f, "non-zero trailing bits {:#x} in 7-bit data", bits)
            }
        }
    }
}

impl std::error::Error for TranscodeError {}

/// Repack arbitrary bytes into bytes below 0x80.
pub fn encode_7bit(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len() + data.len().div_ceil(7));
    let mut acc: u32 = 0;
    let mut bits = 0;
    for &byte in data {
        acc |= (byte as u32) << bits;
        bits += 8;
        while bits >= 7 {
            out.push((acc & 0x7F) as u8);
            acc >>= 7;
            bits -= 7;
        }
    }
    if bits > 0 {
        out.push((acc & 0x7F) as u8);
    }
    out
}

/// Exact inverse of [`encode_7bit`].
pub fn decode_7bit(data: &[u8]) -> Result<Vec<u8>, TranscodeError> {
    let mut out = Vec::with_capacity(data.len() * 7 / 8);
    let mut acc: u32 = 0;
    let mut bits = 0;
    for (index, &byte) in data.iter().enumerate() {
        if byte & 0x80 != 0 {
            return Err(TranscodeError::HighBitSet { index, byte });
        }
        acc |= (byte as u32) << bits;
        bits += 7;
        if bits >= 8 {
            out.push((acc & 0xFF) as u8);
            acc >>= 8;
            bits -= 8;
        }
    }
    if acc != 0 {
        return Err(TranscodeError::TrailingBits { bits: acc });
    }
    Ok(out)
}

/// Spread a CRC-32 over five base-128 digits, least significant first.
pub fn pack_crc(crc: u32) -> [u8; CRC_PACKED_LEN] {
    let mut out = [0u8; CRC_PACKED_LEN];
    for (i, digit) in out.iter_mut().enumerate() {
        *digit = ((crc >> (7 * i)) & 0x7F) as u8;
    }
    out
}

/// Inverse of [`pack_crc`].
pub fn unpack_crc(packed: &[u8]) -> u32 {
    packed
        .iter()
        .take(CRC_PACKED_LEN)
        .enumerate()
        .fold(0u32, |acc, (i, &digit)| acc | (((digit & 0x7F) as u32) << (7 * i)))
}

/// Wire length of a 7-bit encoded field of `len` raw bytes.
pub fn encoded_len(len: usize) -> usize {
    (len * 8).div_ceil(7)
}
