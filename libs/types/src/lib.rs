//! # Batchswap Type System
//!
//! Shared types for the batch-settled AMM engine: newtype identifiers for
//! assets, accounts and operations, the fixed 4-field call message the host
//! ledger delivers per transaction, and the trade records emitted to the
//! tracker after execution.
//!
//! Everything here is plain data. Quantities are `i64` in the host ledger's
//! smallest unit; all arithmetic on them lives in the engine crate and
//! truncates toward zero.

pub mod identifiers;
pub mod operation;
pub mod trade;

pub use identifiers::{AccountId, AssetId, OpId, SeqNo};
pub use operation::{CallMessage, MethodCode, Operation, OperationKind};
pub use trade::{TradeDirection, TradeRecord};

/// Quantity of an asset in the ledger's smallest unit.
///
/// Signed because per-operation deltas (reserve outflows) are negative;
/// balances themselves never go below zero.
pub type Amount = i64;
