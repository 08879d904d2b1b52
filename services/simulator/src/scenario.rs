//! Scenario files and their execution against the in-memory ledger.
//!
//! A scenario seeds accounts with balances, then scripts epochs of operations
//! exactly as the host chain would deliver them. Running it produces a report
//! with every epoch summary, every emitted trade record and the closing
//! balances.

use anyhow::{anyhow, bail, Context, Result};
use engine::{EpochSummary, Pool, PoolConfig};
use ledger::InMemoryLedger;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;
use types::{AccountId, Amount, CallMessage, TradeRecord};

fn effectively_no_fee() -> Amount {
    Amount::MAX
}

/// Pool settings of a scenario; asset ids and addresses are assigned by the
/// runner.
#[derive(Debug, Deserialize)]
pub struct PoolSettings {
    pub share_name: String,
    pub share_decimals: u8,
    #[serde(default = "effectively_no_fee")]
    pub swap_fee_divisor: Amount,
    #[serde(default = "effectively_no_fee")]
    pub platform_fee_divisor: Amount,
}

/// Opening balance of a named account.
#[derive(Debug, Deserialize)]
pub struct AccountSeed {
    pub name: String,
    #[serde(default)]
    pub x: Amount,
    #[serde(default)]
    pub y: Amount,
}

/// One scripted operation.
#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum OpScript {
    AddLiquidity {
        sender: String,
        x: Amount,
        y: Amount,
    },
    RemoveLiquidity {
        sender: String,
        shares: Amount,
    },
    SwapXForY {
        sender: String,
        amount: Amount,
        min_out: Amount,
    },
    SwapYForX {
        sender: String,
        amount: Amount,
        min_out: Amount,
    },
}

/// One epoch's worth of queued operations.
#[derive(Debug, Deserialize)]
pub struct EpochScript {
    #[serde(default)]
    pub ops: Vec<OpScript>,
}

#[derive(Debug, Deserialize)]
pub struct Scenario {
    pub pool: PoolSettings,
    #[serde(default)]
    pub accounts: Vec<AccountSeed>,
    #[serde(default)]
    pub epochs: Vec<EpochScript>,
}

/// Per-epoch slice of the run report.
#[derive(Debug, Serialize)]
pub struct EpochReport {
    pub summary: EpochSummary,
    pub trades: Vec<TradeRecord>,
}

/// Closing balance of a named account.
#[derive(Debug, Serialize)]
pub struct AccountReport {
    pub x: Amount,
    pub y: Amount,
    pub shares: Amount,
}

#[derive(Debug, Serialize)]
pub struct Report {
    pub epochs: Vec<EpochReport>,
    pub final_reserve_x: Amount,
    pub final_reserve_y: Amount,
    pub final_total_shares: Amount,
    /// Closing `reserve_y / reserve_x` ratio, for display only.
    pub final_spot_rate: Option<f64>,
    pub accounts: BTreeMap<String, AccountReport>,
}

const POOL_ACCOUNT: AccountId = AccountId(1);
const FEE_RECIPIENT: AccountId = AccountId(2);
const TRACKER: AccountId = AccountId(3);
const FIRST_USER_ACCOUNT: u64 = 100;

/// Execute a scenario from a fresh ledger and pool.
pub fn run(scenario: &Scenario) -> Result<Report> {
    let mut ledger = InMemoryLedger::new(POOL_ACCOUNT);
    let asset_x = ledger.create_asset("X", 8);
    let asset_y = ledger.create_asset("Y", 8);

    let mut accounts = BTreeMap::new();
    for (index, seed) in scenario.accounts.iter().enumerate() {
        let account = AccountId(FIRST_USER_ACCOUNT + index as u64);
        if accounts.insert(seed.name.clone(), account).is_some() {
            bail!("duplicate account name {:?}", seed.name);
        }
        ledger
            .credit(account, asset_x, seed.x)
            .with_context(|| format!("seeding {:?}", seed.name))?;
        ledger
            .credit(account, asset_y, seed.y)
            .with_context(|| format!("seeding {:?}", seed.name))?;
    }

    let mut pool = Pool::new(PoolConfig {
        asset_x,
        asset_y,
        share_name: scenario.pool.share_name.clone(),
        share_decimals: scenario.pool.share_decimals,
        swap_fee_divisor: scenario.pool.swap_fee_divisor,
        platform_fee_divisor: scenario.pool.platform_fee_divisor,
        fee_recipient: FEE_RECIPIENT,
        tracker: TRACKER,
    })?;
    let share_asset = pool.on_deploy(&mut ledger)?;
    if let Some((name, decimals)) = ledger.asset_metadata(share_asset) {
        info!(%share_asset, name, decimals, "share asset issued");
    }

    let mut epochs = Vec::with_capacity(scenario.epochs.len());
    for (number, epoch) in scenario.epochs.iter().enumerate() {
        for op in &epoch.ops {
            let (sender, message, attached) = match op {
                OpScript::AddLiquidity { sender, x, y } => (
                    sender,
                    CallMessage::add_liquidity(),
                    vec![(asset_x, *x), (asset_y, *y)],
                ),
                OpScript::RemoveLiquidity { sender, shares } => (
                    sender,
                    CallMessage::remove_liquidity(),
                    vec![(share_asset, *shares)],
                ),
                OpScript::SwapXForY {
                    sender,
                    amount,
                    min_out,
                } => (
                    sender,
                    CallMessage::swap_x_for_y(*min_out),
                    vec![(asset_x, *amount)],
                ),
                OpScript::SwapYForX {
                    sender,
                    amount,
                    min_out,
                } => (
                    sender,
                    CallMessage::swap_y_for_x(*min_out),
                    vec![(asset_y, *amount)],
                ),
            };
            let sender = *accounts
                .get(sender)
                .ok_or_else(|| anyhow!("unknown account {:?}", sender))?;
            ledger
                .submit(sender, message, &attached)
                .with_context(|| format!("submitting operation in epoch {number}"))?;
        }

        let trades_before = ledger.notifications().len();
        let summary = pool
            .on_epoch_start(&mut ledger)
            .with_context(|| format!("processing epoch {number}"))?;
        let trades = ledger.notifications()[trades_before..]
            .iter()
            .map(|(_, record)| *record)
            .collect::<Vec<_>>();

        info!(
            epoch = number,
            admitted = summary.swaps_admitted,
            refunded = summary.swaps_refunded,
            reserve_x = pool.reserves().0,
            reserve_y = pool.reserves().1,
            "epoch complete"
        );
        epochs.push(EpochReport { summary, trades });
    }

    let accounts = accounts
        .into_iter()
        .map(|(name, account)| {
            let report = AccountReport {
                x: ledger.balance(account, asset_x),
                y: ledger.balance(account, asset_y),
                shares: ledger.balance(account, share_asset),
            };
            (name, report)
        })
        .collect();

    let (final_reserve_x, final_reserve_y) = pool.reserves();
    Ok(Report {
        epochs,
        final_reserve_x,
        final_reserve_y,
        final_total_shares: pool.total_shares(),
        final_spot_rate: pool.spot_rate(),
        accounts,
    })
}
