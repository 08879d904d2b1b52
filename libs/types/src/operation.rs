//! Operations delivered by the host ledger.
//!
//! Each transaction arrives as a fixed 4-field record `(method, arg1, arg2,
//! arg3)`. Only the method code and — for swaps — the first argument are
//! meaningful; deposited amounts are read from the transaction's attached
//! asset transfers, never from message fields.

use crate::{AccountId, Amount, OpId, SeqNo};
use num_enum::TryFromPrimitive;
use serde::{Deserialize, Serialize};

/// Recognized method codes of the call message.
///
/// Codes outside this range are not an error at the protocol level: the
/// engine skips them, advancing its cursors, and any attached funds are
/// absorbed into reserves at reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, Serialize, Deserialize)]
#[repr(i64)]
pub enum MethodCode {
    AddLiquidity = 1,
    RemoveLiquidity = 2,
    SwapXForY = 3,
    SwapYForX = 4,
}

/// The raw 4-field message attached to a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallMessage {
    pub fields: [i64; 4],
}

impl CallMessage {
    pub fn new(fields: [i64; 4]) -> Self {
        Self { fields }
    }

    pub fn add_liquidity() -> Self {
        Self::new([MethodCode::AddLiquidity as i64, 0, 0, 0])
    }

    pub fn remove_liquidity() -> Self {
        Self::new([MethodCode::RemoveLiquidity as i64, 0, 0, 0])
    }

    pub fn swap_x_for_y(min_out: Amount) -> Self {
        Self::new([MethodCode::SwapXForY as i64, min_out, 0, 0])
    }

    pub fn swap_y_for_x(min_out: Amount) -> Self {
        Self::new([MethodCode::SwapYForX as i64, min_out, 0, 0])
    }

    /// Raw method code, recognized or not.
    pub fn raw_method(&self) -> i64 {
        self.fields[0]
    }

    pub fn method(&self) -> Option<MethodCode> {
        MethodCode::try_from(self.fields[0]).ok()
    }

    /// First argument; carries `min_out` for swap methods.
    pub fn arg1(&self) -> i64 {
        self.fields[1]
    }
}

/// Decoded intent of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    AddLiquidity,
    RemoveLiquidity,
    SwapXForY { min_out: Amount },
    SwapYForX { min_out: Amount },
    /// Unrecognized method code, skipped by every pass.
    Unknown { method: i64 },
}

/// One operation as delivered by the host ledger's ordered log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    /// Unique id, the key for admission records and trade notifications.
    pub id: OpId,
    /// Arrival-order position used for cursor advancement.
    pub seq: SeqNo,
    pub sender: AccountId,
    pub message: CallMessage,
}

impl Operation {
    pub fn kind(&self) -> OperationKind {
        match self.message.method() {
            Some(MethodCode::AddLiquidity) => OperationKind::AddLiquidity,
            Some(MethodCode::RemoveLiquidity) => OperationKind::RemoveLiquidity,
            Some(MethodCode::SwapXForY) => OperationKind::SwapXForY {
                min_out: self.message.arg1(),
            },
            Some(MethodCode::SwapYForX) => OperationKind::SwapYForX {
                min_out: self.message.arg1(),
            },
            None => OperationKind::Unknown {
                method: self.message.raw_method(),
            },
        }
    }
}
