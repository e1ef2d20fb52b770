//! Cell codec for a lockable jetton wallet.
//!
//! Builds and parses the TL-B cell layouts of the wallet contract: its
//! persistent storage record and the operation messages it accepts
//! (transfer, burn, top-up, withdraw, lock-balance, withdraw-tons,
//! withdraw-jettons). Prompting, compilation and transaction submission
//! live outside this crate; it only produces and consumes cells.

pub mod crc;
pub mod tvm;
pub mod wallet;
