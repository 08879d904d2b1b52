//! Engine-level errors.
//!
//! An error from epoch processing means the epoch must not commit: the host
//! retries from the last durably recorded cursors. Rejected swaps are not
//! errors — they are refunded by the execution pass.

use crate::math::MathError;
use ledger::LedgerError;
use thiserror::Error;
use types::AssetId;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid pool configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("Pool already deployed with share asset {0}")]
    AlreadyDeployed(AssetId),

    #[error("Pool not deployed: share asset missing")]
    NotDeployed,

    #[error("Arithmetic failure in {context}: {source}")]
    Math {
        context: &'static str,
        source: MathError,
    },

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl EngineError {
    pub(crate) fn math(context: &'static str) -> impl FnOnce(MathError) -> EngineError {
        move |source| EngineError::Math { context, source }
    }
}
