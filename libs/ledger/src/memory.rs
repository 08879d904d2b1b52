//! Deterministic in-memory ledger for tests and simulation.
//!
//! Mirrors the slice of host-chain behavior the engine depends on: an ordered
//! operation log, balances moved atomically, asset supplies adjusted by
//! mint/burn, and per-operation admission scratch storage. Submitting an
//! operation moves its attached funds to the pool account immediately, the way
//! a chain credits a contract before its code runs.

use crate::traits::{Ledger, LedgerError};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;
use types::{AccountId, Amount, AssetId, CallMessage, OpId, Operation, SeqNo, TradeRecord};

#[derive(Debug, Clone)]
struct AssetInfo {
    name: String,
    decimals: u8,
    supply: Amount,
}

/// In-memory [`Ledger`] implementation plus the harness surface used to
/// script scenarios against it.
#[derive(Debug, Clone)]
pub struct InMemoryLedger {
    pool: AccountId,
    balances: HashMap<(AccountId, AssetId), Amount>,
    assets: HashMap<AssetId, AssetInfo>,
    log: BTreeMap<SeqNo, Operation>,
    attachments: HashMap<OpId, HashMap<AssetId, Amount>>,
    admissions: HashMap<OpId, Amount>,
    notifications: Vec<(AccountId, TradeRecord)>,
    next_asset: u64,
    next_op: u64,
    next_seq: u64,
}

impl InMemoryLedger {
    /// Create an empty ledger with `pool` as the pool's own account.
    pub fn new(pool: AccountId) -> Self {
        Self {
            pool,
            balances: HashMap::new(),
            assets: HashMap::new(),
            log: BTreeMap::new(),
            attachments: HashMap::new(),
            admissions: HashMap::new(),
            notifications: Vec::new(),
            next_asset: 1,
            next_op: 1,
            next_seq: 1,
        }
    }

    /// The pool's own account id.
    pub fn pool_account(&self) -> AccountId {
        self.pool
    }

    /// Create an asset outside the pool's control (the pooled X and Y assets
    /// exist before the pool does).
    pub fn create_asset(&mut self, name: &str, decimals: u8) -> AssetId {
        let id = AssetId(self.next_asset);
        self.next_asset += 1;
        self.assets.insert(
            id,
            AssetInfo {
                name: name.to_string(),
                decimals,
                supply: 0,
            },
        );
        debug!(asset = %id, name, decimals, "asset created");
        id
    }

    /// Airdrop `amount` of `asset` to `account`, increasing total supply.
    pub fn credit(
        &mut self,
        account: AccountId,
        asset: AssetId,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        if amount < 0 {
            return Err(LedgerError::NegativeAmount {
                context: "credit",
                amount,
            });
        }
        let info = self
            .assets
            .get_mut(&asset)
            .ok_or(LedgerError::UnknownAsset(asset))?;
        info.supply += amount;
        *self.balances.entry((account, asset)).or_insert(0) += amount;
        Ok(())
    }

    /// Deliver an operation to the pool: debit the sender's attached amounts,
    /// credit them to the pool account, and append to the ordered log.
    pub fn submit(
        &mut self,
        sender: AccountId,
        message: CallMessage,
        attached: &[(AssetId, Amount)],
    ) -> Result<OpId, LedgerError> {
        for &(asset, amount) in attached {
            if amount < 0 {
                return Err(LedgerError::NegativeAmount {
                    context: "submit attachment",
                    amount,
                });
            }
            let have = self.balance(sender, asset);
            if have < amount {
                return Err(LedgerError::InsufficientBalance {
                    asset,
                    need: amount,
                    have,
                });
            }
        }

        let id = OpId(self.next_op);
        self.next_op += 1;
        let seq = SeqNo(self.next_seq);
        self.next_seq += 1;

        let mut attachment = HashMap::new();
        for &(asset, amount) in attached {
            *self.balances.entry((sender, asset)).or_insert(0) -= amount;
            *self.balances.entry((self.pool, asset)).or_insert(0) += amount;
            *attachment.entry(asset).or_insert(0) += amount;
        }
        self.attachments.insert(id, attachment);
        self.log.insert(
            seq,
            Operation {
                id,
                seq,
                sender,
                message,
            },
        );
        debug!(op = %id, %seq, %sender, "operation submitted");
        Ok(id)
    }

    /// Balance of any account, for assertions.
    pub fn balance(&self, account: AccountId, asset: AssetId) -> Amount {
        self.balances.get(&(account, asset)).copied().unwrap_or(0)
    }

    /// Total supply of an asset, for assertions.
    pub fn supply(&self, asset: AssetId) -> Amount {
        self.assets.get(&asset).map(|info| info.supply).unwrap_or(0)
    }

    /// Name and decimals an asset was issued with.
    pub fn asset_metadata(&self, asset: AssetId) -> Option<(&str, u8)> {
        self.assets
            .get(&asset)
            .map(|info| (info.name.as_str(), info.decimals))
    }

    /// Trade notifications delivered so far, in emission order.
    pub fn notifications(&self) -> &[(AccountId, TradeRecord)] {
        &self.notifications
    }
}

impl Ledger for InMemoryLedger {
    fn next_operation_after(&self, cursor: SeqNo) -> Option<Operation> {
        self.log
            .range((
                std::ops::Bound::Excluded(cursor),
                std::ops::Bound::Unbounded,
            ))
            .next()
            .map(|(_, op)| *op)
    }

    fn amount_attached(&self, op: OpId, asset: AssetId) -> Amount {
        self.attachments
            .get(&op)
            .and_then(|attachment| attachment.get(&asset))
            .copied()
            .unwrap_or(0)
    }

    fn issue_asset(&mut self, name: &str, decimals: u8) -> Result<AssetId, LedgerError> {
        Ok(self.create_asset(name, decimals))
    }

    fn mint(&mut self, asset: AssetId, amount: Amount) -> Result<(), LedgerError> {
        if amount < 0 {
            return Err(LedgerError::NegativeAmount {
                context: "mint",
                amount,
            });
        }
        let info = self
            .assets
            .get_mut(&asset)
            .ok_or(LedgerError::UnknownAsset(asset))?;
        info.supply += amount;
        *self.balances.entry((self.pool, asset)).or_insert(0) += amount;
        debug!(asset = %asset, amount, "minted to pool");
        Ok(())
    }

    fn burn(&mut self, asset: AssetId, amount: Amount) -> Result<(), LedgerError> {
        if amount < 0 {
            return Err(LedgerError::NegativeAmount {
                context: "burn",
                amount,
            });
        }
        let have = self.balance(self.pool, asset);
        if have < amount {
            return Err(LedgerError::InsufficientBalance {
                asset,
                need: amount,
                have,
            });
        }
        let info = self
            .assets
            .get_mut(&asset)
            .ok_or(LedgerError::UnknownAsset(asset))?;
        if info.supply < amount {
            return Err(LedgerError::SupplyUnderflow {
                asset,
                burn: amount,
                supply: info.supply,
            });
        }
        info.supply -= amount;
        *self.balances.entry((self.pool, asset)).or_insert(0) -= amount;
        debug!(asset = %asset, amount, "burned from pool");
        Ok(())
    }

    fn transfer(
        &mut self,
        asset: AssetId,
        amount: Amount,
        to: AccountId,
    ) -> Result<(), LedgerError> {
        if amount == 0 {
            return Ok(());
        }
        if amount < 0 {
            return Err(LedgerError::NegativeAmount {
                context: "transfer",
                amount,
            });
        }
        let have = self.balance(self.pool, asset);
        if have < amount {
            return Err(LedgerError::InsufficientBalance {
                asset,
                need: amount,
                have,
            });
        }
        *self.balances.entry((self.pool, asset)).or_insert(0) -= amount;
        *self.balances.entry((to, asset)).or_insert(0) += amount;
        debug!(asset = %asset, amount, to = %to, "transfer from pool");
        Ok(())
    }

    fn set_admission(&mut self, op: OpId, value: Amount) {
        self.admissions.insert(op, value);
    }

    fn admission(&self, op: OpId) -> Amount {
        self.admissions.get(&op).copied().unwrap_or(0)
    }

    fn current_balance(&self, asset: AssetId) -> Amount {
        self.balance(self.pool, asset)
    }

    fn notify_trade(&mut self, tracker: AccountId, record: TradeRecord) {
        self.notifications.push((tracker, record));
    }
}
