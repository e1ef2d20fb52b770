//! Message and storage schemas of the lockable jetton wallet.
//!
//! Seven operation bodies (transfer, burn, top-up, withdraw, lock-balance,
//! withdraw-tons, withdraw-jettons) plus the storage record, each a fixed
//! field sequence over the cell primitives in [`crate::tvm`].

pub mod messages;
pub mod storage;

pub use messages::{
    BurnMessage, LockBalanceMessage, Opcode, TopUpMessage, TransferMessage, WalletMessage,
    WithdrawJettonsMessage, WithdrawMessage, WithdrawTonsMessage,
};
pub use storage::WalletStorage;
