//! # Host Ledger Abstraction
//!
//! The engine never talks to storage or consensus directly. Everything it
//! needs from the surrounding ledger — the ordered operation log, attached
//! asset transfers, mint/burn of the pool-share asset, per-operation admission
//! scratch storage, ground-truth balances and trade notifications — comes
//! through the [`Ledger`] trait.
//!
//! [`InMemoryLedger`] is a deterministic implementation of that trait used by
//! the test suites and the scenario simulator. It doubles as the harness: it
//! can create assets, airdrop balances and submit operations the way the host
//! chain would deliver them.

pub mod memory;
pub mod traits;

pub use memory::InMemoryLedger;
pub use traits::{Ledger, LedgerError};
