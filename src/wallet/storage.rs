//! Persistent storage layout of the wallet contract.

use crate::tvm::{Address, Builder, Cell, CellError, CellResult, Slice};
use std::sync::Arc;

/// The wallet's persistent state cell, in storage order.
///
/// ```text
/// storage#_ locked_balance:(VarUInteger 16) balance:(VarUInteger 16)
///     owner:MsgAddressInt jetton_master:MsgAddressInt = Storage;
/// ```
///
/// Unlike the message bodies this record carries no opcode header; it is
/// written once at deploy time and read back whenever the deployed state is
/// inspected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletStorage {
    pub locked_balance: u128,
    pub balance: u128,
    pub owner: Address,
    pub jetton_master: Address,
}

impl WalletStorage {
    /// The initial state for a freshly deployed wallet: zero balances.
    pub fn initial(owner: Address, jetton_master: Address) -> Self {
        Self {
            locked_balance: 0,
            balance: 0,
            owner,
            jetton_master,
        }
    }

    pub fn encode(&self) -> CellResult<Arc<Cell>> {
        let mut builder = Builder::new();
        builder.store_coins(self.locked_balance)?;
        builder.store_coins(self.balance)?;
        builder.store_address(Some(&self.owner))?;
        builder.store_address(Some(&self.jetton_master))?;
        builder.build()
    }

    pub fn decode(cell: &Arc<Cell>) -> CellResult<Self> {
        let mut slice = Slice::new(cell.clone());
        let locked_balance = slice.load_coins()?;
        let balance = slice.load_coins()?;
        let owner = slice
            .load_address()?
            .ok_or_else(|| CellError::InvalidAddress("storage owner cannot be absent".into()))?;
        let jetton_master = slice.load_address()?.ok_or_else(|| {
            CellError::InvalidAddress("storage jetton master cannot be absent".into())
        })?;
        slice.expect_empty()?;
        Ok(Self {
            locked_balance,
            balance,
            owner,
            jetton_master,
        })
    }
}
