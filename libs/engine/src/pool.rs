//! Pool configuration and persistent state.

use crate::error::EngineError;
use serde::{Deserialize, Serialize};
use types::{AccountId, Amount, AssetId, SeqNo};

fn effectively_no_fee() -> Amount {
    Amount::MAX
}

/// Immutable creation-time surface of a pool.
///
/// Fee rates are expressed as `amount / divisor`; a divisor of `i64::MAX`
/// truncates every realistic amount to zero, which is how "no fee" is spelled.
/// There is no admin mutation path: the configuration is fixed for the life of
/// the pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolConfig {
    /// First pooled asset.
    pub asset_x: AssetId,
    /// Second pooled asset.
    pub asset_y: AssetId,
    /// Name the pool-share asset is issued under.
    pub share_name: String,
    /// Decimal places of the pool-share asset.
    pub share_decimals: u8,
    /// Divisor of the swap fee retained by the pool (LP revenue).
    #[serde(default = "effectively_no_fee")]
    pub swap_fee_divisor: Amount,
    /// Divisor of the platform fee forwarded to `fee_recipient`.
    #[serde(default = "effectively_no_fee")]
    pub platform_fee_divisor: Amount,
    /// Destination of platform fee skims.
    pub fee_recipient: AccountId,
    /// Destination of trade notifications.
    pub tracker: AccountId,
}

impl PoolConfig {
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.asset_x == self.asset_y {
            return Err(EngineError::InvalidConfig {
                reason: format!("pooled assets must differ, both are {}", self.asset_x),
            });
        }
        if self.swap_fee_divisor < 1 {
            return Err(EngineError::InvalidConfig {
                reason: format!("swap fee divisor must be >= 1, got {}", self.swap_fee_divisor),
            });
        }
        if self.platform_fee_divisor < 1 {
            return Err(EngineError::InvalidConfig {
                reason: format!(
                    "platform fee divisor must be >= 1, got {}",
                    self.platform_fee_divisor
                ),
            });
        }
        if self.share_name.is_empty() {
            return Err(EngineError::InvalidConfig {
                reason: "share asset name must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

/// Persistent pool state, authoritative at epoch boundaries.
///
/// Serializable so the host can checkpoint it together with the cursors; the
/// per-epoch scratch state is deliberately not part of this struct.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pool {
    pub(crate) config: PoolConfig,
    pub(crate) share_asset: Option<AssetId>,
    pub(crate) reserve_x: Amount,
    pub(crate) reserve_y: Amount,
    pub(crate) total_shares: Amount,
    pub(crate) liquidity_cursor: SeqNo,
    pub(crate) admission_cursor: SeqNo,
    pub(crate) execution_cursor: SeqNo,
}

impl Pool {
    /// Create an undeployed pool with empty reserves.
    pub fn new(config: PoolConfig) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self {
            config,
            share_asset: None,
            reserve_x: 0,
            reserve_y: 0,
            total_shares: 0,
            liquidity_cursor: SeqNo::GENESIS,
            admission_cursor: SeqNo::GENESIS,
            execution_cursor: SeqNo::GENESIS,
        })
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Share asset id, once deployed.
    pub fn share_asset(&self) -> Option<AssetId> {
        self.share_asset
    }

    /// Authoritative reserves `(x, y)` as of the last epoch boundary.
    pub fn reserves(&self) -> (Amount, Amount) {
        (self.reserve_x, self.reserve_y)
    }

    pub fn total_shares(&self) -> Amount {
        self.total_shares
    }

    /// Last consumed positions of the three passes, for durable checkpoints.
    pub fn cursors(&self) -> (SeqNo, SeqNo, SeqNo) {
        (
            self.liquidity_cursor,
            self.admission_cursor,
            self.execution_cursor,
        )
    }

    /// Spot price as the `(reserve_y, reserve_x)` ratio, for display only.
    pub fn spot_rate(&self) -> Option<f64> {
        if self.reserve_x == 0 {
            return None;
        }
        Some(self.reserve_y as f64 / self.reserve_x as f64)
    }
}
