//! Cell: the unit of the TON wire format.
//!
//! A cell stores up to 1023 bits of data and up to 4 references to other
//! cells. Cells are immutable once built; construction goes through
//! [`Builder`](crate::tvm::Builder) and reading through
//! [`Slice`](crate::tvm::Slice).

use crate::tvm::error::{CellError, CellResult};
use sha2::{Digest, Sha256};
use std::sync::Arc;

/// Maximum number of data bits a cell can store
pub const MAX_CELL_BITS: usize = 1023;

/// Maximum number of references a cell can have
pub const MAX_CELL_REFS: usize = 4;

/// An ordinary TON cell: a bit string plus an ordered list of child cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    /// Cell data, bit-packed MSB-first
    data: Vec<u8>,
    /// Number of meaningful bits in `data`
    bit_len: usize,
    /// Child cells, in storage order
    references: Vec<Arc<Cell>>,
}

impl Cell {
    /// Creates a cell, validating the capacity invariants.
    pub(crate) fn new(
        data: Vec<u8>,
        bit_len: usize,
        references: Vec<Arc<Cell>>,
    ) -> CellResult<Self> {
        if bit_len > MAX_CELL_BITS {
            return Err(CellError::CapacityExceeded(format!(
                "{bit_len} bits exceeds the {MAX_CELL_BITS}-bit cell limit"
            )));
        }
        if references.len() > MAX_CELL_REFS {
            return Err(CellError::CapacityExceeded(format!(
                "{} refs exceeds the {MAX_CELL_REFS}-ref cell limit",
                references.len()
            )));
        }
        if data.len() < bit_len.div_ceil(8) {
            return Err(CellError::Truncated(format!(
                "{} bytes of data cannot hold {bit_len} bits",
                data.len()
            )));
        }
        Ok(Self {
            data,
            bit_len,
            references,
        })
    }

    /// Creates a cell from raw data with no references.
    pub fn with_data(data: Vec<u8>, bit_len: usize) -> CellResult<Self> {
        Self::new(data, bit_len, Vec::new())
    }

    /// Returns the cell's data bytes
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Returns the number of bits in the cell
    pub fn bit_len(&self) -> usize {
        self.bit_len
    }

    /// Returns the cell's references
    pub fn references(&self) -> &[Arc<Cell>] {
        &self.references
    }

    /// Returns the number of references
    pub fn reference_count(&self) -> usize {
        self.references.len()
    }

    /// Gets a reference by index
    pub fn reference(&self, index: usize) -> Option<&Arc<Cell>> {
        self.references.get(index)
    }

    /// Computes the two descriptor bytes of the standard cell representation.
    ///
    /// d1 is the reference count (ordinary, level-0 cells only here), d2 is
    /// `floor(b/8) + ceil(b/8)` so an odd value marks a partial last byte.
    pub fn descriptors(&self) -> [u8; 2] {
        let refs_descriptor = self.references.len() as u8;
        let bits_descriptor = (self.bit_len / 8 + self.bit_len.div_ceil(8)) as u8;
        [refs_descriptor, bits_descriptor]
    }

    /// Returns the data bytes with the completion-tag bit set when the cell
    /// does not end on a byte boundary.
    pub fn serialize_data(&self) -> Vec<u8> {
        let mut result = self.data.clone();
        if self.bit_len % 8 != 0 {
            let last_byte_idx = self.bit_len / 8;
            if last_byte_idx < result.len() {
                result[last_byte_idx] |= 1 << (7 - self.bit_len % 8);
            }
        }
        result
    }

    /// Computes the depth of the cell tree rooted here.
    pub fn depth(&self) -> u16 {
        self.references
            .iter()
            .map(|r| r.depth() + 1)
            .max()
            .unwrap_or(0)
    }

    /// Computes the representation hash of the cell.
    ///
    /// SHA-256 over descriptors, padded data, then the depth and hash of
    /// each reference.
    pub fn hash(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(self.descriptors());
        hasher.update(self.serialize_data());
        for reference in &self.references {
            hasher.update(reference.depth().to_be_bytes());
        }
        for reference in &self.references {
            hasher.update(reference.hash());
        }

        let mut hash = [0u8; 32];
        hash.copy_from_slice(&hasher.finalize());
        hash
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_with_data() {
        let cell = Cell::with_data(vec![0x0F], 8).unwrap();
        assert_eq!(cell.bit_len(), 8);
        assert_eq!(cell.data()[0], 0x0F);
        assert_eq!(cell.reference_count(), 0);
    }

    #[test]
    fn test_cell_bit_limit() {
        let err = Cell::with_data(vec![0u8; 128], 1024).unwrap_err();
        assert!(matches!(err, CellError::CapacityExceeded(_)));

        let cell = Cell::with_data(vec![0u8; 128], 1023).unwrap();
        assert_eq!(cell.bit_len(), 1023);
    }

    #[test]
    fn test_cell_data_shorter_than_bit_len() {
        let err = Cell::with_data(vec![0xFF], 16).unwrap_err();
        assert!(matches!(err, CellError::Truncated(_)));
    }

    #[test]
    fn test_cell_hash() {
        let cell = Cell::with_data(vec![0x00, 0x00, 0x00, 0x0F], 32).unwrap();
        let hash = cell.hash();

        // Reference hash for this cell from the TON documentation
        let expected =
            hex::decode("57b520dbcb9d135863fc33963cde9f6db2ded1430d88056810a2c9434a3860f9")
                .unwrap();
        assert_eq!(&hash[..], &expected[..]);
    }

    #[test]
    fn test_descriptors_partial_byte() {
        // 5 bits: d2 = floor(5/8) + ceil(5/8) = 1, odd marks the padding
        let cell = Cell::with_data(vec![0b10100000], 5).unwrap();
        assert_eq!(cell.descriptors(), [0, 1]);
        // Completion tag lands at bit index 5, right after the data bits
        assert_eq!(cell.serialize_data(), vec![0b10100100]);
    }
}
