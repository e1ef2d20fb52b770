//! Builder: append-only write cursor producing a [`Cell`].
//!
//! A builder is single-use: fields are appended in wire order and
//! [`build`](Builder::build) consumes it to yield the finished cell. Every
//! append checks the 1023-bit / 4-ref budget up front, so a failed append
//! never leaves a partially written field behind.

use crate::tvm::address::Address;
use crate::tvm::cell::{Cell, MAX_CELL_BITS, MAX_CELL_REFS};
use crate::tvm::error::{CellError, CellResult};
use crate::tvm::slice::Slice;
use std::sync::Arc;

/// Maximum Coins magnitude: VarUInteger 16 carries at most 15 payload bytes.
pub const MAX_COINS: u128 = (1 << 120) - 1;

/// Write cursor for assembling a cell.
#[derive(Debug)]
pub struct Builder {
    data: Vec<u8>,
    bit_len: usize,
    references: Vec<Arc<Cell>>,
}

impl Builder {
    /// Creates an empty builder
    pub fn new() -> Self {
        Self {
            data: Vec::new(),
            bit_len: 0,
            references: Vec::new(),
        }
    }

    /// Returns the number of bits written so far
    pub fn bit_len(&self) -> usize {
        self.bit_len
    }

    /// Returns the number of bits still available
    pub fn available_bits(&self) -> usize {
        MAX_CELL_BITS - self.bit_len
    }

    /// Returns the number of references stored so far
    pub fn ref_count(&self) -> usize {
        self.references.len()
    }

    /// Stores a single bit
    pub fn store_bit(&mut self, bit: bool) -> CellResult<&mut Self> {
        self.store_bits(&[if bit { 0x80 } else { 0x00 }], 1)
    }

    /// Stores the first `bit_len` bits of `bits` (MSB-first within each byte)
    pub fn store_bits(&mut self, bits: &[u8], bit_len: usize) -> CellResult<&mut Self> {
        if self.bit_len + bit_len > MAX_CELL_BITS {
            return Err(CellError::CapacityExceeded(format!(
                "storing {bit_len} bits at offset {} would exceed {MAX_CELL_BITS}",
                self.bit_len
            )));
        }
        if bits.len() < bit_len.div_ceil(8) {
            return Err(CellError::Truncated(format!(
                "source holds fewer than {bit_len} bits"
            )));
        }

        for i in 0..bit_len {
            let bit = (bits[i / 8] >> (7 - i % 8)) & 1;

            if self.bit_len / 8 >= self.data.len() {
                self.data.push(0);
            }
            if bit == 1 {
                self.data[self.bit_len / 8] |= 1 << (7 - self.bit_len % 8);
            }
            self.bit_len += 1;
        }

        Ok(self)
    }

    /// Stores a byte
    pub fn store_byte(&mut self, byte: u8) -> CellResult<&mut Self> {
        self.store_bits(&[byte], 8)
    }

    /// Stores multiple bytes
    pub fn store_bytes(&mut self, bytes: &[u8]) -> CellResult<&mut Self> {
        self.store_bits(bytes, bytes.len() * 8)
    }

    /// Stores a u32 value, big-endian
    pub fn store_u32(&mut self, value: u32) -> CellResult<&mut Self> {
        self.store_bits(&value.to_be_bytes(), 32)
    }

    /// Stores a u64 value, big-endian
    pub fn store_u64(&mut self, value: u64) -> CellResult<&mut Self> {
        self.store_bits(&value.to_be_bytes(), 64)
    }

    /// Stores the low `bits` bits of `value`, MSB-first.
    ///
    /// The value must fit the width; high bits are never silently dropped.
    pub fn store_uint(&mut self, value: u64, bits: usize) -> CellResult<&mut Self> {
        if bits > 64 {
            return Err(CellError::ValueOutOfRange(format!(
                "cannot store {bits} bits from a u64"
            )));
        }
        if bits < 64 && value >> bits != 0 {
            return Err(CellError::ValueOutOfRange(format!(
                "{value} does not fit in {bits} bits"
            )));
        }

        let mut packed = [0u8; 8];
        for i in 0..bits {
            if value & (1u64 << (bits - 1 - i)) != 0 {
                packed[i / 8] |= 1 << (7 - i % 8);
            }
        }
        self.store_bits(&packed, bits)
    }

    /// Stores a signed integer in two's complement over `bits` bits
    pub fn store_int(&mut self, value: i64, bits: usize) -> CellResult<&mut Self> {
        if bits > 64 {
            return Err(CellError::ValueOutOfRange(format!(
                "cannot store {bits} bits from an i64"
            )));
        }
        let unsigned = if bits < 64 {
            (value as u64) & ((1u64 << bits) - 1)
        } else {
            value as u64
        };
        let mut packed = [0u8; 8];
        for i in 0..bits {
            if unsigned & (1u64 << (bits - 1 - i)) != 0 {
                packed[i / 8] |= 1 << (7 - i % 8);
            }
        }
        self.store_bits(&packed, bits)
    }

    /// Stores a reference to an already-built child cell
    pub fn store_ref(&mut self, cell: Arc<Cell>) -> CellResult<&mut Self> {
        if self.references.len() >= MAX_CELL_REFS {
            return Err(CellError::CapacityExceeded(format!(
                "cell already holds {MAX_CELL_REFS} references"
            )));
        }
        self.references.push(cell);
        Ok(self)
    }

    /// Stores a `Maybe ^Cell`: one presence bit, then the ref if present
    pub fn store_maybe_ref(&mut self, cell: Option<Arc<Cell>>) -> CellResult<&mut Self> {
        match cell {
            Some(c) => {
                self.store_bit(true)?;
                self.store_ref(c)
            }
            None => self.store_bit(false),
        }
    }

    /// Stores a Coins amount (VarUInteger 16).
    ///
    /// A 4-bit length nibble `n`, then `n` bytes of big-endian magnitude;
    /// zero encodes as `n = 0` with no payload. Values above 2^120 − 1 do
    /// not fit the 15-byte payload and are rejected.
    pub fn store_coins(&mut self, amount: u128) -> CellResult<&mut Self> {
        if amount == 0 {
            return self.store_uint(0, 4);
        }
        if amount > MAX_COINS {
            return Err(CellError::ValueOutOfRange(format!(
                "coins amount {amount} exceeds 2^120 - 1"
            )));
        }

        let byte_len = ((128 - amount.leading_zeros()) as usize).div_ceil(8);
        self.store_uint(byte_len as u64, 4)?;
        let bytes = amount.to_be_bytes();
        self.store_bytes(&bytes[16 - byte_len..])
    }

    /// Stores an address: `addr_none$00` for `None`, otherwise
    /// `addr_std$10` + no-anycast bit + int8 workchain + 256-bit hash.
    pub fn store_address(&mut self, address: Option<&Address>) -> CellResult<&mut Self> {
        match address {
            None => self.store_uint(0b00, 2),
            Some(addr) => {
                self.store_uint(0b10, 2)?;
                self.store_bit(false)?;
                self.store_int(addr.workchain as i64, 8)?;
                self.store_bytes(&addr.hash_part)
            }
        }
    }

    /// Consumes the builder and yields the finished cell
    pub fn build(self) -> CellResult<Arc<Cell>> {
        Ok(Arc::new(Cell::new(self.data, self.bit_len, self.references)?))
    }

    /// Alias for [`build`](Builder::build)
    pub fn end_cell(self) -> CellResult<Arc<Cell>> {
        self.build()
    }

    /// Builds the cell and opens a slice over it
    pub fn to_slice(self) -> CellResult<Slice> {
        Ok(Slice::new(self.build()?))
    }
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_basic() {
        let mut builder = Builder::new();
        builder.store_u32(0x12345678).unwrap();
        builder.store_byte(0xFF).unwrap();

        let cell = builder.build().unwrap();
        assert_eq!(cell.bit_len(), 40);
        assert_eq!(cell.data(), &[0x12, 0x34, 0x56, 0x78, 0xFF]);
    }

    #[test]
    fn test_builder_capacity() {
        // A single oversized append fails up front
        let mut builder = Builder::new();
        let err = builder.store_bits(&[0u8; 128], 1024).unwrap_err();
        assert!(matches!(err, CellError::CapacityExceeded(_)));

        // Exactly 1023 bits is fine
        let mut builder = Builder::new();
        builder.store_bits(&[0xAA; 128], 1023).unwrap();
        let cell = builder.build().unwrap();
        assert_eq!(cell.bit_len(), 1023);

        // One more bit is not
        let mut builder = Builder::new();
        builder.store_bits(&[0xAA; 128], 1023).unwrap();
        let err = builder.store_bit(true).unwrap_err();
        assert!(matches!(err, CellError::CapacityExceeded(_)));
    }

    #[test]
    fn test_builder_ref_capacity() {
        let child = Builder::new().build().unwrap();
        let mut builder = Builder::new();
        for _ in 0..4 {
            builder.store_ref(child.clone()).unwrap();
        }
        let err = builder.store_ref(child).unwrap_err();
        assert!(matches!(err, CellError::CapacityExceeded(_)));
    }

    #[test]
    fn test_store_uint_range_check() {
        let mut builder = Builder::new();
        let err = builder.store_uint(16, 4).unwrap_err();
        assert!(matches!(err, CellError::ValueOutOfRange(_)));
        builder.store_uint(15, 4).unwrap();
    }

    #[test]
    fn test_store_coins_zero() {
        let mut builder = Builder::new();
        builder.store_coins(0).unwrap();
        let cell = builder.build().unwrap();

        // Just the length nibble, itself zero
        assert_eq!(cell.bit_len(), 4);
        assert_eq!(cell.data()[0] >> 4, 0);
    }

    #[test]
    fn test_store_coins_bounds() {
        let mut builder = Builder::new();
        builder.store_coins(MAX_COINS).unwrap();
        let cell = builder.build().unwrap();
        // 4-bit nibble (15) + 15 bytes of payload
        assert_eq!(cell.bit_len(), 4 + 15 * 8);

        let mut builder = Builder::new();
        let err = builder.store_coins(MAX_COINS + 1).unwrap_err();
        assert!(matches!(err, CellError::ValueOutOfRange(_)));
    }

    #[test]
    fn test_store_address_widths() {
        let addr = Address::new(0, [0u8; 32]);
        let mut builder = Builder::new();
        builder.store_address(Some(&addr)).unwrap();
        // 2 tag bits + 1 anycast bit + 8 workchain bits + 256 hash bits
        assert_eq!(builder.bit_len(), 267);

        let mut builder = Builder::new();
        builder.store_address(None).unwrap();
        assert_eq!(builder.bit_len(), 2);
    }
}
