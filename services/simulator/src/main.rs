mod scenario;

use anyhow::{Context, Result};
use clap::Parser;
use scenario::Scenario;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Replay a scripted scenario through the batch-settled AMM engine.
#[derive(Debug, Parser)]
#[command(name = "simulator")]
struct Args {
    /// Path to the TOML scenario file
    scenario: PathBuf,

    /// Print the full JSON report instead of the closing summary
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    info!("🚀 Starting Batchswap scenario simulator...");

    let raw = std::fs::read_to_string(&args.scenario)
        .with_context(|| format!("Failed to read scenario file {:?}", args.scenario))?;
    let parsed: Scenario = toml::from_str(&raw).context("Failed to parse scenario TOML")?;

    let report = scenario::run(&parsed).context("Scenario execution failed")?;
    info!("✅ Scenario complete");

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "reserves: ({}, {})  shares: {}",
            report.final_reserve_x, report.final_reserve_y, report.final_total_shares
        );
        for (number, epoch) in report.epochs.iter().enumerate() {
            println!(
                "epoch {number}: +{} liquidity, {} admitted, {} refunded, {} trades",
                epoch.summary.liquidity_adds,
                epoch.summary.swaps_admitted,
                epoch.summary.swaps_refunded,
                epoch.trades.len()
            );
            for trade in &epoch.trades {
                println!(
                    "  {} {} in={} out={} rate={:.6}",
                    trade.op,
                    trade.direction,
                    trade.delta_in,
                    -trade.delta_out,
                    trade.realized_rate()
                );
            }
        }
        for (name, account) in &report.accounts {
            println!(
                "{name}: x={} y={} shares={}",
                account.x, account.y, account.shares
            );
        }
    }
    Ok(())
}
