use thiserror::Error;

/// Errors produced by the cell codec.
///
/// Every encode/decode fails fast: no partial cell is returned and a failed
/// slice must not be reused as if it were valid.
#[derive(Debug, Error)]
pub enum CellError {
    /// A builder append would exceed the 1023-bit or 4-ref cell budget
    #[error("cell capacity exceeded: {0}")]
    CapacityExceeded(String),
    /// A slice read requested more bits or refs than remain
    #[error("unexpected end of cell: {0}")]
    Truncated(String),
    /// A decode finished with unread bits or refs left in the slice
    #[error("trailing data after parse: {bits} bits, {refs} refs unread")]
    TrailingData { bits: usize, refs: usize },
    /// The leading 32-bit opcode does not match the operation being decoded
    #[error("unexpected opcode: expected {expected:#010x}, got {actual:#010x}")]
    UnexpectedOpcode { expected: u32, actual: u32 },
    /// A value does not fit its wire representation
    #[error("value out of range: {0}")]
    ValueOutOfRange(String),
    /// An address does not match the fixed addr_none/addr_std layout
    #[error("invalid address: {0}")]
    InvalidAddress(String),
}

pub type CellResult<T> = Result<T, CellError>;
