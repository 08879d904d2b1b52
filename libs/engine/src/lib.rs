//! # Batchswap Engine - Batch-Settled Constant Product AMM
//!
//! ## Purpose
//!
//! Epoch-processing core of a two-asset liquidity pool that is resistant to
//! front-running. Operations queued during an epoch are consumed in three
//! strictly ordered passes: liquidity settlement, price admission, trade
//! execution — followed by fee forwarding and reserve reconciliation. Every
//! admitted trade of a direction fills at one uniform price derived from the
//! epoch's settled reserves, so bracketing a victim's trade inside an epoch
//! extracts nothing.
//!
//! ## Integration Points
//!
//! - **Input Sources**: the host ledger's ordered operation log via the
//!   [`ledger::Ledger`] trait
//! - **Output Destinations**: asset transfers, mint/burn and trade
//!   notifications issued back through the same trait
//! - **Lifecycle**: the host calls [`Pool::on_deploy`] once, then
//!   [`Pool::on_epoch_start`] at each epoch boundary
//!
//! ## Processing Model
//!
//! Strictly single-threaded and epoch-sequential. Each pass runs its cursor to
//! exhaustion before the next starts; cursors advance on every consumed
//! operation so a restarted host resumes without re-delivery. All arithmetic
//! is integer with truncation toward zero — rounding always favors the pool.

pub mod epoch;
pub mod error;
pub mod math;
pub mod pool;

pub use epoch::EpochSummary;
pub use error::EngineError;
pub use math::MathError;
pub use pool::{Pool, PoolConfig};
