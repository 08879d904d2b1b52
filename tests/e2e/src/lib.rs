//! End-to-end test harness: a deployed pool wired to an in-memory ledger,
//! with helpers for funding accounts and queueing operations the way the host
//! chain delivers them. Each `epoch()` call is one block boundary.

use engine::{EpochSummary, Pool, PoolConfig};
use ledger::InMemoryLedger;
use types::{AccountId, Amount, AssetId, CallMessage, OpId, TradeRecord};

pub const POOL_ACCOUNT: AccountId = AccountId(1_000);
pub const FEE_RECIPIENT: AccountId = AccountId(2);
pub const TRACKER: AccountId = AccountId(3);

pub struct TestBench {
    pub pool: Pool,
    pub ledger: InMemoryLedger,
    pub asset_x: AssetId,
    pub asset_y: AssetId,
    pub share_asset: AssetId,
}

impl TestBench {
    /// Pool with both fees disabled.
    pub fn new() -> Self {
        Self::with_fees(Amount::MAX, Amount::MAX)
    }

    pub fn with_fees(swap_fee_divisor: Amount, platform_fee_divisor: Amount) -> Self {
        let mut ledger = InMemoryLedger::new(POOL_ACCOUNT);
        let asset_x = ledger.create_asset("X", 8);
        let asset_y = ledger.create_asset("Y", 8);
        let mut pool = Pool::new(PoolConfig {
            asset_x,
            asset_y,
            share_name: "XY".to_string(),
            share_decimals: 4,
            swap_fee_divisor,
            platform_fee_divisor,
            fee_recipient: FEE_RECIPIENT,
            tracker: TRACKER,
        })
        .expect("valid pool config");
        let share_asset = pool.on_deploy(&mut ledger).expect("deploy");
        Self {
            pool,
            ledger,
            asset_x,
            asset_y,
            share_asset,
        }
    }

    /// Airdrop X and Y to an account.
    pub fn fund(&mut self, account: AccountId, x: Amount, y: Amount) {
        self.ledger.credit(account, self.asset_x, x).expect("credit x");
        self.ledger.credit(account, self.asset_y, y).expect("credit y");
    }

    pub fn add_liquidity(&mut self, account: AccountId, dx: Amount, dy: Amount) -> OpId {
        self.ledger
            .submit(
                account,
                CallMessage::add_liquidity(),
                &[(self.asset_x, dx), (self.asset_y, dy)],
            )
            .expect("submit add_liquidity")
    }

    pub fn remove_liquidity(&mut self, account: AccountId, shares: Amount) -> OpId {
        self.ledger
            .submit(
                account,
                CallMessage::remove_liquidity(),
                &[(self.share_asset, shares)],
            )
            .expect("submit remove_liquidity")
    }

    pub fn swap_x_for_y(&mut self, account: AccountId, amount: Amount, min_out: Amount) -> OpId {
        self.ledger
            .submit(
                account,
                CallMessage::swap_x_for_y(min_out),
                &[(self.asset_x, amount)],
            )
            .expect("submit swap_x_for_y")
    }

    pub fn swap_y_for_x(&mut self, account: AccountId, amount: Amount, min_out: Amount) -> OpId {
        self.ledger
            .submit(
                account,
                CallMessage::swap_y_for_x(min_out),
                &[(self.asset_y, amount)],
            )
            .expect("submit swap_y_for_x")
    }

    /// Process one epoch boundary.
    pub fn epoch(&mut self) -> EpochSummary {
        self.pool.on_epoch_start(&mut self.ledger).expect("epoch")
    }

    pub fn balance_x(&self, account: AccountId) -> Amount {
        self.ledger.balance(account, self.asset_x)
    }

    pub fn balance_y(&self, account: AccountId) -> Amount {
        self.ledger.balance(account, self.asset_y)
    }

    pub fn shares(&self, account: AccountId) -> Amount {
        self.ledger.balance(account, self.share_asset)
    }

    /// All trade records notified so far.
    pub fn trades(&self) -> Vec<TradeRecord> {
        self.ledger
            .notifications()
            .iter()
            .map(|(_, record)| *record)
            .collect()
    }

    /// Reserves must equal the pool's ground-truth balances after every
    /// reconciled epoch.
    pub fn assert_reserves_reconciled(&self) {
        let (reserve_x, reserve_y) = self.pool.reserves();
        assert_eq!(reserve_x, self.ledger.balance(POOL_ACCOUNT, self.asset_x));
        assert_eq!(reserve_y, self.ledger.balance(POOL_ACCOUNT, self.asset_y));
    }
}

impl Default for TestBench {
    fn default() -> Self {
        Self::new()
    }
}
