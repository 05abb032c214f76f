// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! SCALE compact (variable-length) unsigned integers.
//!
//! The two low bits of the first byte select the mode:
//!
//! | Mode | Range | Layout |
//! |------|-------|--------|
//! | `0b00` | `0..=63` | 1 byte, value in the upper 6 bits |
//! | `0b01` | `64..=16383` | 2 bytes LE, value in the upper 14 bits |
//! | `0b10` | `16384..=2^30-1` | 4 bytes LE, value in the upper 30 bits |
//! | `0b11` | larger | prefix byte `(n - 4) << 2 \| 0b11`, then `n` LE bytes |
//!
//! Decoding is canonical: a value written in a wider mode than necessary, or
//! a big-integer body with a zero top byte, is rejected.

use crate::cursor::{Cursor, Underrun};
use crate::error::{CodecError, Result};

/// Largest value of the single-byte mode.
pub const MAX_SINGLE_BYTE: u128 = 0x3f;
/// Largest value of the two-byte mode.
pub const MAX_TWO_BYTE: u128 = 0x3fff;
/// Largest value of the four-byte mode.
pub const MAX_FOUR_BYTE: u128 = 0x3fff_ffff;

/// Widest big-integer body (u128).
const MAX_BIG_BYTES: usize = 16;

/// Number of bytes `encode_compact(value)` produces.
pub fn compact_len(value: u128) -> usize {
    if value <= MAX_SINGLE_BYTE {
        1
    } else if value <= MAX_TWO_BYTE {
        2
    } else if value <= MAX_FOUR_BYTE {
        4
    } else {
        1 + big_body_len(value)
    }
}

/// Minimal little-endian body length for the big-integer mode.
fn big_body_len(value: u128) -> usize {
    let bits = 128 - value.leading_zeros() as usize;
    bits.div_ceil(8).max(4)
}

/// Append the compact encoding of `value` to `out`.
pub fn encode_compact_to(value: u128, out: &mut Vec<u8>) {
    if value <= MAX_SINGLE_BYTE {
        out.push((value as u8) << 2);
    } else if value <= MAX_TWO_BYTE {
        out.extend_from_slice(&(((value as u16) << 2) | 0b01).to_le_bytes());
    } else if value <= MAX_FOUR_BYTE {
        out.extend_from_slice(&(((value as u32) << 2) | 0b10).to_le_bytes());
    } else {
        let len = big_body_len(value);
        out.push((((len - 4) as u8) << 2) | 0b11);
        out.extend_from_slice(&value.to_le_bytes()[..len]);
    }
}

/// Compact encoding of `value`.
pub fn encode_compact(value: u128) -> Vec<u8> {
    let mut out = Vec::with_capacity(compact_len(value));
    encode_compact_to(value, &mut out);
    out
}

/// Decode a compact integer from the start of `bytes`.
///
/// Returns the value and the number of bytes consumed.
pub fn decode_compact(bytes: &[u8]) -> Result<(u128, usize)> {
    let mut cursor = Cursor::new(bytes);
    let value = read_compact(&mut cursor).map_err(|e| e.into_codec_error("Compact"))?;
    Ok((value, cursor.offset()))
}

/// Failure modes of [`read_compact`], labelled by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CompactError {
    Underrun(Underrun),
    NonCanonical { offset: usize },
    TooWide { offset: usize, bytes: usize },
}

impl From<Underrun> for CompactError {
    fn from(u: Underrun) -> Self {
        Self::Underrun(u)
    }
}

impl CompactError {
    pub(crate) fn into_codec_error(self, type_name: &str) -> CodecError {
        match self {
            Self::Underrun(u) => CodecError::Truncated {
                type_name: type_name.to_string(),
                offset: u.offset,
                needed: u.needed,
                available: u.available,
            },
            Self::NonCanonical { offset } => CodecError::InvalidValue {
                type_name: type_name.to_string(),
                offset,
                reason: "non-canonical compact encoding".into(),
            },
            Self::TooWide { offset, bytes } => CodecError::InvalidValue {
                type_name: type_name.to_string(),
                offset,
                reason: format!("compact body of {} bytes exceeds 128 bits", bytes),
            },
        }
    }
}

/// Read one compact integer at the cursor position.
pub(crate) fn read_compact(cursor: &mut Cursor<'_>) -> std::result::Result<u128, CompactError> {
    let start = cursor.offset();
    let first = cursor.peek_u8().ok_or(Underrun {
        offset: start,
        needed: 1,
        available: 0,
    })?;

    match first & 0b11 {
        0b00 => {
            cursor.read_u8()?;
            Ok(u128::from(first >> 2))
        }
        0b01 => {
            let value = u128::from(cursor.read_u16_le()? >> 2);
            if value <= MAX_SINGLE_BYTE {
                return Err(CompactError::NonCanonical { offset: start });
            }
            Ok(value)
        }
        0b10 => {
            let value = u128::from(cursor.read_u32_le()? >> 2);
            if value <= MAX_TWO_BYTE {
                return Err(CompactError::NonCanonical { offset: start });
            }
            Ok(value)
        }
        _ => {
            let len = usize::from(first >> 2) + 4;
            if len > MAX_BIG_BYTES {
                return Err(CompactError::TooWide {
                    offset: start,
                    bytes: len,
                });
            }
            cursor.read_u8()?;
            let body = cursor.read_bytes(len)?;
            if body[len - 1] == 0 {
                return Err(CompactError::NonCanonical { offset: start });
            }
            let mut buf = [0u8; MAX_BIG_BYTES];
            buf[..len].copy_from_slice(body);
            let value = u128::from_le_bytes(buf);
            if value <= MAX_FOUR_BYTE {
                return Err(CompactError::NonCanonical { offset: start });
            }
            Ok(value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(value: u128) {
        let encoded = encode_compact(value);
        assert_eq!(encoded.len(), compact_len(value), "length of {}", value);
        let (decoded, used) = decode_compact(&encoded).expect("decode");
        assert_eq!(decoded, value);
        assert_eq!(used, encoded.len());
    }

    #[test]
    fn test_known_encodings() {
        assert_eq!(encode_compact(0), vec![0x00]);
        assert_eq!(encode_compact(1), vec![0x04]);
        assert_eq!(encode_compact(63), vec![0xfc]);
        assert_eq!(encode_compact(64), vec![0x01, 0x01]);
        assert_eq!(encode_compact(16383), vec![0xfd, 0xff]);
        assert_eq!(encode_compact(16384), vec![0x02, 0x00, 0x01, 0x00]);
        assert_eq!(encode_compact(MAX_FOUR_BYTE), vec![0xfe, 0xff, 0xff, 0xff]);
        assert_eq!(
            encode_compact(1 << 30),
            vec![0x03, 0x00, 0x00, 0x00, 0x40]
        );
        assert_eq!(
            encode_compact(u128::from(u32::MAX)),
            vec![0x03, 0xff, 0xff, 0xff, 0xff]
        );
        assert_eq!(
            encode_compact(1 << 32),
            vec![0x07, 0x00, 0x00, 0x00, 0x00, 0x01]
        );

        let mut max = vec![0x33];
        max.extend_from_slice(&[0xff; 16]);
        assert_eq!(encode_compact(u128::MAX), max);
    }

    #[test]
    fn test_size_class_boundaries() {
        let cases = [
            (0, 1),
            (MAX_SINGLE_BYTE, 1),
            (MAX_SINGLE_BYTE + 1, 2),
            (MAX_TWO_BYTE, 2),
            (MAX_TWO_BYTE + 1, 4),
            (MAX_FOUR_BYTE, 4),
            (MAX_FOUR_BYTE + 1, 5),
            (u128::from(u32::MAX), 5),
            (u128::from(u32::MAX) + 1, 6),
            (u128::from(u64::MAX), 9),
            (u128::MAX, 17),
        ];
        for (value, len) in cases {
            assert_eq!(compact_len(value), len, "value {}", value);
            roundtrip(value);
        }
    }

    #[test]
    fn test_random_roundtrip() {
        for _ in 0..2000 {
            let shift = fastrand::u32(0..128);
            roundtrip(fastrand::u128(..) >> shift);
        }
    }

    #[test]
    fn test_truncated_input() {
        for value in [64u128, 16384, 1 << 30, u128::MAX] {
            let encoded = encode_compact(value);
            for cut in 0..encoded.len() {
                match decode_compact(&encoded[..cut]) {
                    Err(CodecError::Truncated { .. }) => {}
                    other => panic!("value {} cut at {}: {:?}", value, cut, other),
                }
            }
        }
    }

    #[test]
    fn test_rejects_non_canonical() {
        // 1 encoded in two-byte mode
        assert!(matches!(
            decode_compact(&[0x05, 0x00]),
            Err(CodecError::InvalidValue { .. })
        ));
        // 64 encoded in four-byte mode
        assert!(matches!(
            decode_compact(&[0x02, 0x01, 0x00, 0x00]),
            Err(CodecError::InvalidValue { .. })
        ));
        // big mode with zero top byte
        assert!(matches!(
            decode_compact(&[0x07, 0x00, 0x00, 0x00, 0x40, 0x00]),
            Err(CodecError::InvalidValue { .. })
        ));
        // big mode carrying a four-byte-range value
        assert!(matches!(
            decode_compact(&[0x03, 0xff, 0xff, 0xff, 0x3f]),
            Err(CodecError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_rejects_body_wider_than_u128() {
        // (17 - 4) << 2 | 0b11
        let mut bytes = vec![0x37];
        bytes.extend_from_slice(&[0xff; 17]);
        assert!(matches!(
            decode_compact(&bytes),
            Err(CodecError::InvalidValue { offset: 0, .. })
        ));
    }

    #[test]
    fn test_decode_reports_consumed_prefix() {
        let (value, used) = decode_compact(&[0x01, 0x01, 0xaa, 0xbb]).unwrap();
        assert_eq!(value, 64);
        assert_eq!(used, 2);
    }
}
