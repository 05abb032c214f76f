// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Bounds-checked read cursor over a SCALE buffer.
//!

/// Generate little-endian read methods for fixed-width integers.
///
/// Each generated method checks bounds, copies `$size` bytes and advances
/// the offset.
macro_rules! impl_read_le {
    ($name:ident, $type:ty, $size:expr) => {
        pub fn $name(&mut self) -> Result<$type, Underrun> {
            let mut bytes = [0u8; $size];
            bytes.copy_from_slice(self.read_bytes($size)?);
            Ok(<$type>::from_le_bytes(bytes))
        }
    };
}

/// A read past the end of the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Underrun {
    /// Offset at which the read started.
    pub offset: usize,
    /// Bytes the read required.
    pub needed: usize,
    /// Bytes that were left.
    pub available: usize,
}

/// Immutable cursor for reading (bounds-checked, zero-copy)
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    buffer: &'a [u8],
    offset: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self { buffer, offset: 0 }
    }

    impl_read_le!(read_u16_le, u16, 2);
    impl_read_le!(read_u32_le, u32, 4);
    impl_read_le!(read_u64_le, u64, 8);
    impl_read_le!(read_u128_le, u128, 16);
    impl_read_le!(read_i8, i8, 1);
    impl_read_le!(read_i16_le, i16, 2);
    impl_read_le!(read_i32_le, i32, 4);
    impl_read_le!(read_i64_le, i64, 8);
    impl_read_le!(read_i128_le, i128, 16);

    pub fn read_u8(&mut self) -> Result<u8, Underrun> {
        Ok(self.read_bytes(1)?[0])
    }

    /// Look at the next byte without consuming it.
    pub fn peek_u8(&self) -> Option<u8> {
        self.buffer.get(self.offset).copied()
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], Underrun> {
        let available = self.remaining();
        if len > available {
            return Err(Underrun {
                offset: self.offset,
                needed: len,
                available,
            });
        }
        let slice = &self.buffer[self.offset..self.offset + len];
        self.offset += len;
        Ok(slice)
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.offset)
    }

    pub fn is_eof(&self) -> bool {
        self.offset >= self.buffer.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_reads() {
        let data = [0xAB, 0xEF, 0xCD, 0x78, 0x56, 0x34, 0x12];
        let mut cursor = Cursor::new(&data);
        assert_eq!(cursor.read_u8().unwrap(), 0xAB);
        assert_eq!(cursor.read_u16_le().unwrap(), 0xCDEF);
        assert_eq!(cursor.read_u32_le().unwrap(), 0x1234_5678);
        assert!(cursor.is_eof());
        assert_eq!(cursor.offset(), 7);
    }

    #[test]
    fn test_signed_reads() {
        let data = (-2i32).to_le_bytes();
        let mut cursor = Cursor::new(&data);
        assert_eq!(cursor.read_i32_le().unwrap(), -2);

        let data = i128::MIN.to_le_bytes();
        let mut cursor = Cursor::new(&data);
        assert_eq!(cursor.read_i128_le().unwrap(), i128::MIN);
    }

    #[test]
    fn test_underrun_reports_position() {
        let data = [1u8, 2, 3];
        let mut cursor = Cursor::new(&data);
        cursor.read_u8().unwrap();
        let err = cursor.read_u32_le().unwrap_err();
        assert_eq!(
            err,
            Underrun {
                offset: 1,
                needed: 4,
                available: 2
            }
        );
        // Failed reads do not advance.
        assert_eq!(cursor.offset(), 1);
    }

    #[test]
    fn test_peek_does_not_advance() {
        let data = [9u8];
        let mut cursor = Cursor::new(&data);
        assert_eq!(cursor.peek_u8(), Some(9));
        assert_eq!(cursor.offset(), 0);
        cursor.read_u8().unwrap();
        assert_eq!(cursor.peek_u8(), None);
    }
}
