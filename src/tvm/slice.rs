//! Slice: sequential read cursor over a [`Cell`].
//!
//! Cursors only move forward; reading past the end is `Truncated`. Decoders
//! finish with [`expect_empty`](Slice::expect_empty) so that any layout
//! drift surfaces as `TrailingData` instead of being silently ignored.

use crate::tvm::address::Address;
use crate::tvm::cell::Cell;
use crate::tvm::error::{CellError, CellResult};
use std::sync::Arc;

/// Read cursor over one cell.
#[derive(Debug, Clone)]
pub struct Slice {
    cell: Arc<Cell>,
    bit_pos: usize,
    ref_pos: usize,
}

impl Slice {
    /// Creates a slice positioned at the start of a cell
    pub fn new(cell: Arc<Cell>) -> Self {
        Self {
            cell,
            bit_pos: 0,
            ref_pos: 0,
        }
    }

    /// Returns the number of unread bits
    pub fn remaining_bits(&self) -> usize {
        self.cell.bit_len() - self.bit_pos
    }

    /// Returns the number of unread references
    pub fn remaining_refs(&self) -> usize {
        self.cell.reference_count() - self.ref_pos
    }

    /// True when all bits and refs have been consumed
    pub fn is_empty(&self) -> bool {
        self.remaining_bits() == 0 && self.remaining_refs() == 0
    }

    /// Fails with `TrailingData` unless the slice is fully consumed.
    ///
    /// Every decode entry point calls this before returning: leftover bits
    /// or refs mean the cell did not have the expected layout.
    pub fn expect_empty(&self) -> CellResult<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(CellError::TrailingData {
                bits: self.remaining_bits(),
                refs: self.remaining_refs(),
            })
        }
    }

    /// Loads a single bit
    pub fn load_bit(&mut self) -> CellResult<bool> {
        if self.remaining_bits() == 0 {
            return Err(CellError::Truncated("no bits remain".into()));
        }
        let byte = self.cell.data()[self.bit_pos / 8];
        let bit = (byte >> (7 - self.bit_pos % 8)) & 1;
        self.bit_pos += 1;
        Ok(bit == 1)
    }

    /// Loads `n` bits into a byte vector, MSB-first
    pub fn load_bits(&mut self, n: usize) -> CellResult<Vec<u8>> {
        if n > self.remaining_bits() {
            return Err(CellError::Truncated(format!(
                "requested {n} bits, {} remain",
                self.remaining_bits()
            )));
        }

        let mut result = vec![0u8; n.div_ceil(8)];
        for i in 0..n {
            if self.load_bit()? {
                result[i / 8] |= 1 << (7 - i % 8);
            }
        }
        Ok(result)
    }

    /// Loads a byte
    pub fn load_byte(&mut self) -> CellResult<u8> {
        Ok(self.load_bits(8)?[0])
    }

    /// Loads `n` bytes
    pub fn load_bytes(&mut self, n: usize) -> CellResult<Vec<u8>> {
        self.load_bits(n * 8)
    }

    /// Loads a u32, big-endian
    pub fn load_u32(&mut self) -> CellResult<u32> {
        let bytes = self.load_bits(32)?;
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Loads a u64, big-endian
    pub fn load_u64(&mut self) -> CellResult<u64> {
        let bytes = self.load_bits(64)?;
        Ok(u64::from_be_bytes([
            bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
        ]))
    }

    /// Loads an unsigned integer of `bits` bits
    pub fn load_uint(&mut self, bits: usize) -> CellResult<u64> {
        if bits > 64 {
            return Err(CellError::ValueOutOfRange(format!(
                "cannot load {bits} bits into a u64"
            )));
        }
        if bits == 0 {
            return Ok(0);
        }

        let bytes = self.load_bits(bits)?;
        let mut result = 0u64;
        for &byte in &bytes {
            result = (result << 8) | byte as u64;
        }
        // The last byte is left-aligned, shift the padding back out
        Ok(result >> (bytes.len() * 8 - bits))
    }

    /// Loads a two's-complement signed integer of `bits` bits
    pub fn load_int(&mut self, bits: usize) -> CellResult<i64> {
        if bits > 64 {
            return Err(CellError::ValueOutOfRange(format!(
                "cannot load {bits} bits into an i64"
            )));
        }
        if bits == 0 {
            return Ok(0);
        }

        let unsigned = self.load_uint(bits)?;
        let sign_bit = 1u64 << (bits - 1);
        if bits < 64 && unsigned & sign_bit != 0 {
            Ok((unsigned | !0u64 << bits) as i64)
        } else {
            Ok(unsigned as i64)
        }
    }

    /// Loads the next child reference
    pub fn load_reference(&mut self) -> CellResult<Arc<Cell>> {
        match self.cell.reference(self.ref_pos) {
            Some(reference) => {
                let reference = reference.clone();
                self.ref_pos += 1;
                Ok(reference)
            }
            None => Err(CellError::Truncated("no references remain".into())),
        }
    }

    /// Loads a `Maybe ^Cell`: presence bit, then the ref if present
    pub fn load_maybe_ref(&mut self) -> CellResult<Option<Arc<Cell>>> {
        if self.load_bit()? {
            Ok(Some(self.load_reference()?))
        } else {
            Ok(None)
        }
    }

    /// Loads a Coins amount (VarUInteger 16): 4-bit length nibble, then
    /// that many bytes of big-endian magnitude.
    pub fn load_coins(&mut self) -> CellResult<u128> {
        let len = self.load_uint(4)? as usize;
        if len == 0 {
            return Ok(0);
        }

        let bytes = self.load_bytes(len)?;
        let mut result = 0u128;
        for &byte in &bytes {
            result = (result << 8) | byte as u128;
        }
        Ok(result)
    }

    /// Loads an address field.
    ///
    /// `addr_none$00` yields `None`; `addr_std$10` without anycast yields
    /// the address. Any other tag, or an anycast prefix, is not part of the
    /// wallet layouts and fails with `InvalidAddress`.
    pub fn load_address(&mut self) -> CellResult<Option<Address>> {
        let tag = self.load_uint(2)?;
        match tag {
            0b00 => Ok(None),
            0b10 => {
                if self.load_bit()? {
                    return Err(CellError::InvalidAddress(
                        "anycast addresses are not supported".into(),
                    ));
                }
                let workchain = self.load_int(8)? as i8;
                let hash_bytes = self.load_bits(256)?;
                let mut hash_part = [0u8; 32];
                hash_part.copy_from_slice(&hash_bytes);
                Ok(Some(Address::new(workchain, hash_part)))
            }
            other => Err(CellError::InvalidAddress(format!(
                "unsupported address tag {other:#04b}"
            ))),
        }
    }

    /// Skips `n` bits
    pub fn skip_bits(&mut self, n: usize) -> CellResult<()> {
        if n > self.remaining_bits() {
            return Err(CellError::Truncated(format!(
                "cannot skip {n} bits, {} remain",
                self.remaining_bits()
            )));
        }
        self.bit_pos += n;
        Ok(())
    }

    /// Gets the underlying cell
    pub fn cell(&self) -> &Arc<Cell> {
        &self.cell
    }
}

impl From<Arc<Cell>> for Slice {
    fn from(cell: Arc<Cell>) -> Self {
        Self::new(cell)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tvm::builder::Builder;

    #[test]
    fn test_slice_load_bits() {
        let mut builder = Builder::new();
        builder.store_byte(0xFF).unwrap();
        builder.store_byte(0x00).unwrap();
        let mut slice = Slice::new(builder.build().unwrap());

        assert_eq!(slice.remaining_bits(), 16);
        assert_eq!(slice.load_byte().unwrap(), 0xFF);
        assert_eq!(slice.load_byte().unwrap(), 0x00);
        slice.expect_empty().unwrap();
    }

    #[test]
    fn test_slice_load_uint_unaligned() {
        let mut builder = Builder::new();
        builder.store_uint(0b101, 3).unwrap();
        builder.store_uint(0x1234, 16).unwrap();
        let mut slice = Slice::new(builder.build().unwrap());

        assert_eq!(slice.load_uint(3).unwrap(), 0b101);
        assert_eq!(slice.load_uint(16).unwrap(), 0x1234);
        slice.expect_empty().unwrap();
    }

    #[test]
    fn test_slice_truncated_read() {
        let mut builder = Builder::new();
        builder.store_uint(7, 3).unwrap();
        let mut slice = Slice::new(builder.build().unwrap());

        let err = slice.load_uint(4).unwrap_err();
        assert!(matches!(err, CellError::Truncated(_)));

        let err = slice.load_reference().unwrap_err();
        assert!(matches!(err, CellError::Truncated(_)));
    }

    #[test]
    fn test_slice_trailing_data() {
        let mut builder = Builder::new();
        builder.store_byte(0xAB).unwrap();
        let mut slice = Slice::new(builder.build().unwrap());

        slice.load_uint(7).unwrap();
        let err = slice.expect_empty().unwrap_err();
        assert!(matches!(err, CellError::TrailingData { bits: 1, refs: 0 }));
    }

    #[test]
    fn test_slice_unread_ref_is_trailing() {
        let child = Builder::new().build().unwrap();
        let mut builder = Builder::new();
        builder.store_ref(child).unwrap();
        let slice = Slice::new(builder.build().unwrap());

        let err = slice.expect_empty().unwrap_err();
        assert!(matches!(err, CellError::TrailingData { bits: 0, refs: 1 }));
    }

    #[test]
    fn test_slice_coins_roundtrip() {
        let mut builder = Builder::new();
        builder.store_coins(0).unwrap();
        builder.store_coins(100_000_000).unwrap();
        builder.store_coins(crate::tvm::builder::MAX_COINS).unwrap();
        let mut slice = Slice::new(builder.build().unwrap());

        assert_eq!(slice.load_coins().unwrap(), 0);
        assert_eq!(slice.load_coins().unwrap(), 100_000_000);
        assert_eq!(slice.load_coins().unwrap(), crate::tvm::builder::MAX_COINS);
        slice.expect_empty().unwrap();
    }

    #[test]
    fn test_slice_address_roundtrip() {
        let addr = Address::new(-1, [0x42u8; 32]);
        let mut builder = Builder::new();
        builder.store_address(Some(&addr)).unwrap();
        builder.store_address(None).unwrap();
        let mut slice = Slice::new(builder.build().unwrap());

        assert_eq!(slice.load_address().unwrap(), Some(addr));
        assert_eq!(slice.load_address().unwrap(), None);
        slice.expect_empty().unwrap();
    }

    #[test]
    fn test_slice_rejects_extern_address_tag() {
        let mut builder = Builder::new();
        builder.store_uint(0b01, 2).unwrap();
        let mut slice = Slice::new(builder.build().unwrap());

        let err = slice.load_address().unwrap_err();
        assert!(matches!(err, CellError::InvalidAddress(_)));
    }

    #[test]
    fn test_slice_maybe_ref() {
        let payload = {
            let mut b = Builder::new();
            b.store_byte(0x77).unwrap();
            b.build().unwrap()
        };

        let mut builder = Builder::new();
        builder.store_maybe_ref(Some(payload.clone())).unwrap();
        builder.store_maybe_ref(None).unwrap();
        let mut slice = Slice::new(builder.build().unwrap());

        assert_eq!(slice.load_maybe_ref().unwrap(), Some(payload));
        assert_eq!(slice.load_maybe_ref().unwrap(), None);
        slice.expect_empty().unwrap();
    }
}
