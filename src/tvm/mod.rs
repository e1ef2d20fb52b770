//! TON cell primitives.
//!
//! - Cell: up to 1023 bits of data plus up to 4 references to other cells
//! - Builder: append-only write cursor producing a cell
//! - Slice: sequential read cursor with a strict end-of-parse check
//! - Address: workchain + 256-bit account hash, with the string formats
//! - BoC: Bag of Cells byte envelope for storing and transmitting cells

pub mod address;
pub mod boc;
pub mod builder;
pub mod cell;
pub mod error;
pub mod slice;

pub use address::Address;
pub use boc::{
    base64_to_boc, boc_to_base64, boc_to_hex, deserialize_boc, hex_to_boc, serialize_boc,
};
pub use builder::{Builder, MAX_COINS};
pub use cell::{Cell, MAX_CELL_BITS, MAX_CELL_REFS};
pub use error::{CellError, CellResult};
pub use slice::Slice;
