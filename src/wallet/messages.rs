//! Operation message bodies of the lockable jetton wallet.
//!
//! Every message body is a single cell: a 32-bit opcode, a 64-bit query id,
//! then the operation's fields in fixed order. The receiving contract relies
//! on positional layout, so encode writes fields exactly in that order and
//! decode checks the opcode first, reads each field, and finishes with the
//! strict end-of-parse check.

use crate::tvm::{Address, Builder, Cell, CellError, CellResult, Slice};
use std::sync::Arc;

/// The closed set of wallet operations, one literal 32-bit code each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    Transfer,
    Burn,
    TopUp,
    Withdraw,
    LockBalance,
    WithdrawTons,
    WithdrawJettons,
}

impl Opcode {
    /// The wire value of the opcode
    pub const fn code(self) -> u32 {
        match self {
            Opcode::Transfer => 0x0f8a7ea5,
            Opcode::Burn => 0x595f07bc,
            Opcode::TopUp => 0xd372158c,
            Opcode::Withdraw => 0xcb03bfaf,
            Opcode::LockBalance => 0x6e287e91,
            Opcode::WithdrawTons => 0x6d8e5e3c,
            Opcode::WithdrawJettons => 0x768a50b2,
        }
    }
}

/// Writes the common `opcode queryId` header
fn store_header(builder: &mut Builder, opcode: Opcode, query_id: u64) -> CellResult<()> {
    builder.store_u32(opcode.code())?;
    builder.store_u64(query_id)?;
    Ok(())
}

/// Reads the header, failing before any field if the opcode is wrong
fn load_header(slice: &mut Slice, expected: Opcode) -> CellResult<u64> {
    let actual = slice.load_u32()?;
    if actual != expected.code() {
        return Err(CellError::UnexpectedOpcode {
            expected: expected.code(),
            actual,
        });
    }
    slice.load_u64()
}

/// `transfer` — move jettons to another owner.
///
/// ```text
/// transfer#0f8a7ea5 query_id:uint64 amount:(VarUInteger 16)
///     destination:MsgAddress response_destination:MsgAddress
///     custom_payload:(Maybe ^Cell) forward_ton_amount:(VarUInteger 16)
///     forward_payload:(Maybe ^Cell) = InternalMsgBody;
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferMessage {
    pub query_id: u64,
    pub amount: u128,
    pub destination: Address,
    pub response_destination: Option<Address>,
    pub custom_payload: Option<Arc<Cell>>,
    pub forward_ton_amount: u128,
    pub forward_payload: Option<Arc<Cell>>,
}

impl TransferMessage {
    pub fn encode(&self) -> CellResult<Arc<Cell>> {
        let mut builder = Builder::new();
        store_header(&mut builder, Opcode::Transfer, self.query_id)?;
        builder.store_coins(self.amount)?;
        builder.store_address(Some(&self.destination))?;
        builder.store_address(self.response_destination.as_ref())?;
        builder.store_maybe_ref(self.custom_payload.clone())?;
        builder.store_coins(self.forward_ton_amount)?;
        builder.store_maybe_ref(self.forward_payload.clone())?;
        builder.build()
    }

    pub fn decode(cell: &Arc<Cell>) -> CellResult<Self> {
        let mut slice = Slice::new(cell.clone());
        let query_id = load_header(&mut slice, Opcode::Transfer)?;
        let amount = slice.load_coins()?;
        let destination = slice.load_address()?.ok_or_else(|| {
            CellError::InvalidAddress("transfer destination cannot be absent".into())
        })?;
        let response_destination = slice.load_address()?;
        let custom_payload = slice.load_maybe_ref()?;
        let forward_ton_amount = slice.load_coins()?;
        let forward_payload = slice.load_maybe_ref()?;
        slice.expect_empty()?;
        Ok(Self {
            query_id,
            amount,
            destination,
            response_destination,
            custom_payload,
            forward_ton_amount,
            forward_payload,
        })
    }
}

/// `burn` — destroy jettons, optionally notifying a response address.
///
/// ```text
/// burn#595f07bc query_id:uint64 amount:(VarUInteger 16)
///     response_destination:MsgAddress custom_payload:(Maybe ^Cell)
///     = InternalMsgBody;
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BurnMessage {
    pub query_id: u64,
    pub amount: u128,
    pub response_destination: Option<Address>,
    pub custom_payload: Option<Arc<Cell>>,
}

impl BurnMessage {
    pub fn encode(&self) -> CellResult<Arc<Cell>> {
        let mut builder = Builder::new();
        store_header(&mut builder, Opcode::Burn, self.query_id)?;
        builder.store_coins(self.amount)?;
        builder.store_address(self.response_destination.as_ref())?;
        builder.store_maybe_ref(self.custom_payload.clone())?;
        builder.build()
    }

    pub fn decode(cell: &Arc<Cell>) -> CellResult<Self> {
        let mut slice = Slice::new(cell.clone());
        let query_id = load_header(&mut slice, Opcode::Burn)?;
        let amount = slice.load_coins()?;
        let response_destination = slice.load_address()?;
        let custom_payload = slice.load_maybe_ref()?;
        slice.expect_empty()?;
        Ok(Self {
            query_id,
            amount,
            response_destination,
            custom_payload,
        })
    }
}

/// `top_up` — add Toncoin to the wallet's gas balance. Header only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopUpMessage {
    pub query_id: u64,
}

impl TopUpMessage {
    pub fn encode(&self) -> CellResult<Arc<Cell>> {
        let mut builder = Builder::new();
        store_header(&mut builder, Opcode::TopUp, self.query_id)?;
        builder.build()
    }

    pub fn decode(cell: &Arc<Cell>) -> CellResult<Self> {
        let mut slice = Slice::new(cell.clone());
        let query_id = load_header(&mut slice, Opcode::TopUp)?;
        slice.expect_empty()?;
        Ok(Self { query_id })
    }
}

/// `withdraw` — release the withdrawable part of the balance. Header only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WithdrawMessage {
    pub query_id: u64,
}

impl WithdrawMessage {
    pub fn encode(&self) -> CellResult<Arc<Cell>> {
        let mut builder = Builder::new();
        store_header(&mut builder, Opcode::Withdraw, self.query_id)?;
        builder.build()
    }

    pub fn decode(cell: &Arc<Cell>) -> CellResult<Self> {
        let mut slice = Slice::new(cell.clone());
        let query_id = load_header(&mut slice, Opcode::Withdraw)?;
        slice.expect_empty()?;
        Ok(Self { query_id })
    }
}

/// `set_locked_balance` — lock part of the jetton balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockBalanceMessage {
    pub query_id: u64,
    pub amount: u128,
}

impl LockBalanceMessage {
    pub fn encode(&self) -> CellResult<Arc<Cell>> {
        let mut builder = Builder::new();
        store_header(&mut builder, Opcode::LockBalance, self.query_id)?;
        builder.store_coins(self.amount)?;
        builder.build()
    }

    pub fn decode(cell: &Arc<Cell>) -> CellResult<Self> {
        let mut slice = Slice::new(cell.clone());
        let query_id = load_header(&mut slice, Opcode::LockBalance)?;
        let amount = slice.load_coins()?;
        slice.expect_empty()?;
        Ok(Self { query_id, amount })
    }
}

/// `withdraw_tons` — owner rescue of excess Toncoin. Header only, its own
/// opcode distinct from `withdraw`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WithdrawTonsMessage {
    pub query_id: u64,
}

impl WithdrawTonsMessage {
    pub fn encode(&self) -> CellResult<Arc<Cell>> {
        let mut builder = Builder::new();
        store_header(&mut builder, Opcode::WithdrawTons, self.query_id)?;
        builder.build()
    }

    pub fn decode(cell: &Arc<Cell>) -> CellResult<Self> {
        let mut slice = Slice::new(cell.clone());
        let query_id = load_header(&mut slice, Opcode::WithdrawTons)?;
        slice.expect_empty()?;
        Ok(Self { query_id })
    }
}

/// `withdraw_jettons` — owner rescue of jettons mistakenly sent to the
/// wallet's own address on some other jetton's wallet.
///
/// The trailing maybe-ref slot is reserved by the wire layout; every
/// observed message encodes it as absent, but it is read and written either
/// way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WithdrawJettonsMessage {
    pub query_id: u64,
    pub source_wallet: Address,
    pub amount: u128,
    pub payload: Option<Arc<Cell>>,
}

impl WithdrawJettonsMessage {
    pub fn encode(&self) -> CellResult<Arc<Cell>> {
        let mut builder = Builder::new();
        store_header(&mut builder, Opcode::WithdrawJettons, self.query_id)?;
        builder.store_address(Some(&self.source_wallet))?;
        builder.store_coins(self.amount)?;
        builder.store_maybe_ref(self.payload.clone())?;
        builder.build()
    }

    pub fn decode(cell: &Arc<Cell>) -> CellResult<Self> {
        let mut slice = Slice::new(cell.clone());
        let query_id = load_header(&mut slice, Opcode::WithdrawJettons)?;
        let source_wallet = slice.load_address()?.ok_or_else(|| {
            CellError::InvalidAddress("withdraw_jettons source wallet cannot be absent".into())
        })?;
        let amount = slice.load_coins()?;
        let payload = slice.load_maybe_ref()?;
        slice.expect_empty()?;
        Ok(Self {
            query_id,
            source_wallet,
            amount,
            payload,
        })
    }
}

/// A decoded wallet message, tagged by operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletMessage {
    Transfer(TransferMessage),
    Burn(BurnMessage),
    TopUp(TopUpMessage),
    Withdraw(WithdrawMessage),
    LockBalance(LockBalanceMessage),
    WithdrawTons(WithdrawTonsMessage),
    WithdrawJettons(WithdrawJettonsMessage),
}

impl WalletMessage {
    /// The opcode of this message's variant
    pub fn opcode(&self) -> Opcode {
        match self {
            WalletMessage::Transfer(_) => Opcode::Transfer,
            WalletMessage::Burn(_) => Opcode::Burn,
            WalletMessage::TopUp(_) => Opcode::TopUp,
            WalletMessage::Withdraw(_) => Opcode::Withdraw,
            WalletMessage::LockBalance(_) => Opcode::LockBalance,
            WalletMessage::WithdrawTons(_) => Opcode::WithdrawTons,
            WalletMessage::WithdrawJettons(_) => Opcode::WithdrawJettons,
        }
    }

    /// Encodes the message into its body cell
    pub fn encode(&self) -> CellResult<Arc<Cell>> {
        match self {
            WalletMessage::Transfer(m) => m.encode(),
            WalletMessage::Burn(m) => m.encode(),
            WalletMessage::TopUp(m) => m.encode(),
            WalletMessage::Withdraw(m) => m.encode(),
            WalletMessage::LockBalance(m) => m.encode(),
            WalletMessage::WithdrawTons(m) => m.encode(),
            WalletMessage::WithdrawJettons(m) => m.encode(),
        }
    }

    /// Decodes a body cell as the given operation.
    ///
    /// Callers always know which operation they expect; this never sniffs
    /// an unknown cell, it tries the one expected tag and fails with
    /// `UnexpectedOpcode` otherwise.
    pub fn decode(cell: &Arc<Cell>, expected: Opcode) -> CellResult<Self> {
        Ok(match expected {
            Opcode::Transfer => WalletMessage::Transfer(TransferMessage::decode(cell)?),
            Opcode::Burn => WalletMessage::Burn(BurnMessage::decode(cell)?),
            Opcode::TopUp => WalletMessage::TopUp(TopUpMessage::decode(cell)?),
            Opcode::Withdraw => WalletMessage::Withdraw(WithdrawMessage::decode(cell)?),
            Opcode::LockBalance => WalletMessage::LockBalance(LockBalanceMessage::decode(cell)?),
            Opcode::WithdrawTons => {
                WalletMessage::WithdrawTons(WithdrawTonsMessage::decode(cell)?)
            }
            Opcode::WithdrawJettons => {
                WalletMessage::WithdrawJettons(WithdrawJettonsMessage::decode(cell)?)
            }
        })
    }
}
