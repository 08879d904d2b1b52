//! The collaborator interface the engine consumes.

use thiserror::Error;
use types::{AccountId, Amount, AssetId, OpId, Operation, SeqNo, TradeRecord};

/// Error types for ledger operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Insufficient balance of {asset}: need {need}, have {have}")]
    InsufficientBalance {
        asset: AssetId,
        need: Amount,
        have: Amount,
    },

    #[error("Negative amount {amount} in {context}")]
    NegativeAmount {
        context: &'static str,
        amount: Amount,
    },

    #[error("Unknown asset {0}")]
    UnknownAsset(AssetId),

    #[error("Burn of {burn} exceeds supply {supply} of {asset}")]
    SupplyUnderflow {
        asset: AssetId,
        burn: Amount,
        supply: Amount,
    },
}

/// Host ledger operations the engine depends on.
///
/// The implementor owns all fund movement. The engine is the pool: `mint` and
/// `burn` act on the pool's own holdings of the share asset, `transfer` pays
/// out of the pool's balance, and `current_balance` reads the pool's
/// ground-truth holdings for end-of-epoch reconciliation.
///
/// Ordering contract: [`next_operation_after`](Ledger::next_operation_after)
/// returns operations in deterministic arrival order with strictly increasing
/// sequence numbers, so a pass resumes exactly at its cursor — including
/// across epochs for operations that arrived after an epoch was processed.
pub trait Ledger {
    /// Next operation strictly after `cursor`, or `None` when the log is
    /// exhausted for the current epoch.
    fn next_operation_after(&self, cursor: SeqNo) -> Option<Operation>;

    /// Amount of `asset` attached to the operation's transfers. Zero when the
    /// operation attached none.
    fn amount_attached(&self, op: OpId, asset: AssetId) -> Amount;

    /// Create a new fungible asset under the pool's control. Called once at
    /// deployment for the pool-share asset.
    fn issue_asset(&mut self, name: &str, decimals: u8) -> Result<AssetId, LedgerError>;

    /// Mint `amount` of `asset` into the pool's balance.
    fn mint(&mut self, asset: AssetId, amount: Amount) -> Result<(), LedgerError>;

    /// Burn `amount` of `asset` out of the pool's balance.
    fn burn(&mut self, asset: AssetId, amount: Amount) -> Result<(), LedgerError>;

    /// Pay `amount` of `asset` from the pool to `to`. Balance sufficiency is
    /// an invariant maintained by the engine; implementations still check it
    /// and error on shortfall rather than underflow.
    fn transfer(&mut self, asset: AssetId, amount: Amount, to: AccountId)
        -> Result<(), LedgerError>;

    /// Record the admission value for an operation. Non-zero means approved.
    fn set_admission(&mut self, op: OpId, value: Amount);

    /// Admission value previously recorded for an operation; zero when absent.
    fn admission(&self, op: OpId) -> Amount;

    /// Ground-truth balance of the pool's holdings of `asset`.
    fn current_balance(&self, asset: AssetId) -> Amount;

    /// Fire-and-forget trade notification to the tracker address.
    fn notify_trade(&mut self, tracker: AccountId, record: TradeRecord);
}
