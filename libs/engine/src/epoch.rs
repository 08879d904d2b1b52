//! Epoch processing: the three-pass scan that gives every trade in an epoch
//! one uniform price.
//!
//! Pass order per epoch is fixed: liquidity settlement, price admission, trade
//! execution, then fee forwarding and reserve reconciliation. Each pass runs
//! its own cursor over the full operation log to exhaustion before the next
//! starts; a pass acts only on the operation kinds it owns and skips the rest,
//! still advancing its cursor. Because sequence numbers are strictly
//! increasing, operations arriving after an epoch was processed are picked up
//! by the next one.

use crate::error::EngineError;
use crate::math::{mul_div, MathError};
use crate::pool::{Pool, PoolConfig};
use ledger::Ledger;
use serde::Serialize;
use tracing::{debug, info, warn};
use types::{Amount, AssetId, OperationKind, TradeDirection, TradeRecord};

/// Per-epoch working state. Rebuilt at the start of every admission pass and
/// discarded after reconciliation; never persisted.
#[derive(Debug, Default, Clone, Copy)]
struct EpochScratch {
    /// Provisional reserves advanced by each approved admission.
    reserve_x_block: Amount,
    reserve_y_block: Amount,
    /// First accepted admission price per direction; zero until set.
    price_cap_x_for_y: Amount,
    price_cap_y_for_x: Amount,
    /// Platform fees accumulated per input asset.
    platform_fee_x: Amount,
    platform_fee_y: Amount,
}

/// Outcome counts of one epoch, for logging and assertions.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EpochSummary {
    pub liquidity_adds: u32,
    pub liquidity_removals: u32,
    pub shares_minted: Amount,
    pub shares_burned: Amount,
    pub swaps_admitted: u32,
    pub swaps_rejected: u32,
    pub swaps_refunded: u32,
    pub trades_executed: u32,
    pub platform_fee_x: Amount,
    pub platform_fee_y: Amount,
    /// Reconciliation deltas absorbed into the authoritative reserves.
    pub reconciled_x: Amount,
    pub reconciled_y: Amount,
}

/// Result of quoting one swap against the provisional reserves.
#[derive(Debug, Clone, Copy)]
struct AdmissionQuote {
    /// Input-side provisional reserve after crediting the full deposit.
    reserve_in_after: Amount,
    /// Output-side reserve delta (non-positive for any approvable quote).
    delta_out: Amount,
    platform_fee: Amount,
    /// Admission price metric; the first approved value caps the direction.
    price: Amount,
}

impl Pool {
    /// One-time deployment: issue the pool-share asset.
    pub fn on_deploy(&mut self, ledger: &mut impl Ledger) -> Result<AssetId, EngineError> {
        if let Some(existing) = self.share_asset {
            return Err(EngineError::AlreadyDeployed(existing));
        }
        let share_asset =
            ledger.issue_asset(&self.config.share_name, self.config.share_decimals)?;
        self.share_asset = Some(share_asset);
        info!(%share_asset, name = %self.config.share_name, "pool deployed");
        Ok(share_asset)
    }

    /// Process one epoch: settle liquidity, admit swaps, execute trades,
    /// forward fees and reconcile reserves.
    ///
    /// Errors abort the epoch; the host retries from the last recorded
    /// cursors. Rejected swaps are not errors — the execution pass refunds
    /// them.
    pub fn on_epoch_start(
        &mut self,
        ledger: &mut impl Ledger,
    ) -> Result<EpochSummary, EngineError> {
        let share_asset = self.share_asset.ok_or(EngineError::NotDeployed)?;
        let mut summary = EpochSummary::default();

        self.settle_liquidity(ledger, share_asset, &mut summary)?;
        let scratch = self.admit_swaps(ledger, &mut summary);
        self.execute_swaps(ledger, &scratch, &mut summary)?;
        self.forward_fees_and_reconcile(ledger, &scratch, &mut summary)?;

        info!(
            adds = summary.liquidity_adds,
            removals = summary.liquidity_removals,
            admitted = summary.swaps_admitted,
            rejected = summary.swaps_rejected,
            refunded = summary.swaps_refunded,
            executed = summary.trades_executed,
            reconciled_x = summary.reconciled_x,
            reconciled_y = summary.reconciled_y,
            "epoch processed"
        );
        Ok(summary)
    }

    /// First pass: settle every queued liquidity change so no swap in this
    /// epoch is priced against stale reserves.
    fn settle_liquidity(
        &mut self,
        ledger: &mut impl Ledger,
        share_asset: AssetId,
        summary: &mut EpochSummary,
    ) -> Result<(), EngineError> {
        while let Some(op) = ledger.next_operation_after(self.liquidity_cursor) {
            self.liquidity_cursor = op.seq;
            match op.kind() {
                OperationKind::AddLiquidity => {
                    let dx = ledger.amount_attached(op.id, self.config.asset_x);
                    let dy = ledger.amount_attached(op.id, self.config.asset_y);
                    let minted = self.shares_for_deposit(dx, dy)?;

                    ledger.mint(share_asset, minted)?;
                    ledger.transfer(share_asset, minted, op.sender)?;
                    self.total_shares = self
                        .total_shares
                        .checked_add(minted)
                        .ok_or(EngineError::Math {
                            context: "share supply accounting",
                            source: MathError::Overflow,
                        })?;
                    self.reserve_x += dx;
                    self.reserve_y += dy;

                    summary.liquidity_adds += 1;
                    summary.shares_minted += minted;
                    debug!(op = %op.id, dx, dy, minted, "liquidity added");
                }
                OperationKind::RemoveLiquidity => {
                    let shares = ledger.amount_attached(op.id, share_asset);
                    if self.total_shares == 0 {
                        // Unreachable by construction: no shares exist to send.
                        warn!(op = %op.id, shares, "share removal with zero supply ignored");
                        continue;
                    }
                    let dx = mul_div(shares, self.reserve_x, self.total_shares)
                        .map_err(EngineError::math("removal sizing"))?;
                    let dy = mul_div(shares, self.reserve_y, self.total_shares)
                        .map_err(EngineError::math("removal sizing"))?;

                    self.total_shares -= shares;
                    self.reserve_x -= dx;
                    self.reserve_y -= dy;
                    ledger.transfer(self.config.asset_x, dx, op.sender)?;
                    ledger.transfer(self.config.asset_y, dy, op.sender)?;
                    ledger.burn(share_asset, shares)?;

                    summary.liquidity_removals += 1;
                    summary.shares_burned += shares;
                    debug!(op = %op.id, shares, dx, dy, "liquidity removed");
                }
                OperationKind::SwapXForY { .. } | OperationKind::SwapYForX { .. } => {
                    // Owned by the admission and execution passes.
                }
                OperationKind::Unknown { method } => {
                    // Attached funds are absorbed into reserves at
                    // reconciliation; refusal is the host's job.
                    warn!(op = %op.id, method, "unrecognized method code ignored");
                }
            }
        }
        Ok(())
    }

    /// Share sizing for a deposit `(dx, dy)` at the current reserves.
    fn shares_for_deposit(&self, dx: Amount, dy: Amount) -> Result<Amount, EngineError> {
        if self.total_shares == 0 {
            // Geometric-mean bootstrap: fixes the initial share price from
            // both deposited amounts. The product of two floor roots of i64
            // values cannot overflow.
            return Ok(crate::math::isqrt(dx) * crate::math::isqrt(dy));
        }
        let by_x = mul_div(dx, self.total_shares, self.reserve_x)
            .map_err(EngineError::math("share sizing"))?;
        let by_y = mul_div(dy, self.total_shares, self.reserve_y)
            .map_err(EngineError::math("share sizing"))?;
        // The minimum of the two ratios: over-supplying one side mints
        // nothing extra, the excess is forfeited to the pool.
        Ok(by_x.min(by_y))
    }

    /// Second pass: decide which queued swaps may execute and at what price
    /// ceiling, advancing provisional reserves per approval.
    fn admit_swaps(&mut self, ledger: &mut impl Ledger, summary: &mut EpochSummary) -> EpochScratch {
        let mut scratch = EpochScratch {
            reserve_x_block: self.reserve_x,
            reserve_y_block: self.reserve_y,
            ..EpochScratch::default()
        };

        while let Some(op) = ledger.next_operation_after(self.admission_cursor) {
            self.admission_cursor = op.seq;
            let (direction, min_out) = match op.kind() {
                OperationKind::SwapXForY { min_out } => (TradeDirection::XForY, min_out),
                OperationKind::SwapYForX { min_out } => (TradeDirection::YForX, min_out),
                _ => continue,
            };

            if self.total_shares == 0 || min_out <= 0 {
                summary.swaps_rejected += 1;
                debug!(op = %op.id, %direction, min_out, "swap rejected before quoting");
                continue;
            }

            let quote = match direction {
                TradeDirection::XForY => quote_admission(
                    ledger.amount_attached(op.id, self.config.asset_x),
                    scratch.reserve_x_block,
                    scratch.reserve_y_block,
                    self.reserve_y,
                    min_out,
                    &self.config,
                ),
                TradeDirection::YForX => quote_admission(
                    ledger.amount_attached(op.id, self.config.asset_y),
                    scratch.reserve_y_block,
                    scratch.reserve_x_block,
                    self.reserve_x,
                    min_out,
                    &self.config,
                ),
            };
            let Some(quote) = quote else {
                summary.swaps_rejected += 1;
                debug!(op = %op.id, %direction, min_out, "swap rejected: minimum output unmet");
                continue;
            };

            let cap = match direction {
                TradeDirection::XForY => &mut scratch.price_cap_x_for_y,
                TradeDirection::YForX => &mut scratch.price_cap_y_for_x,
            };
            if *cap == 0 {
                *cap = quote.price;
            }
            if quote.price > *cap {
                summary.swaps_rejected += 1;
                debug!(
                    op = %op.id,
                    %direction,
                    price = quote.price,
                    cap = *cap,
                    "swap rejected above price cap"
                );
                continue;
            }

            match direction {
                TradeDirection::XForY => {
                    scratch.reserve_x_block = quote.reserve_in_after;
                    scratch.reserve_y_block += quote.delta_out;
                    scratch.platform_fee_x += quote.platform_fee;
                }
                TradeDirection::YForX => {
                    scratch.reserve_y_block = quote.reserve_in_after;
                    scratch.reserve_x_block += quote.delta_out;
                    scratch.platform_fee_y += quote.platform_fee;
                }
            }
            ledger.set_admission(op.id, min_out);
            summary.swaps_admitted += 1;
            debug!(op = %op.id, %direction, min_out, price = quote.price, "swap admitted");
        }

        info!(
            admitted = summary.swaps_admitted,
            rejected = summary.swaps_rejected,
            cap_x_for_y = scratch.price_cap_x_for_y,
            cap_y_for_x = scratch.price_cap_y_for_x,
            "admission complete"
        );
        scratch
    }

    /// Third pass: re-scan in arrival order, refunding unapproved swaps and
    /// filling approved ones at the epoch's single settled price.
    fn execute_swaps(
        &mut self,
        ledger: &mut impl Ledger,
        scratch: &EpochScratch,
        summary: &mut EpochSummary,
    ) -> Result<(), EngineError> {
        while let Some(op) = ledger.next_operation_after(self.execution_cursor) {
            self.execution_cursor = op.seq;
            let direction = match op.kind() {
                OperationKind::SwapXForY { .. } => TradeDirection::XForY,
                OperationKind::SwapYForX { .. } => TradeDirection::YForX,
                _ => continue,
            };

            if ledger.admission(op.id) == 0 {
                // Never touched reserves; return the deposit in full.
                let dx = ledger.amount_attached(op.id, self.config.asset_x);
                let dy = ledger.amount_attached(op.id, self.config.asset_y);
                ledger.transfer(self.config.asset_x, dx, op.sender)?;
                ledger.transfer(self.config.asset_y, dy, op.sender)?;
                summary.swaps_refunded += 1;
                debug!(op = %op.id, %direction, dx, dy, "swap refunded");
                continue;
            }

            // The combined fee is recomputed on the original deposit; the
            // output comes from the authoritative opposite reserve over the
            // final provisional reserve of the input asset. Every admitted
            // trade of a direction therefore fills at the identical ratio.
            let record = match direction {
                TradeDirection::XForY => {
                    let amount_in = ledger.amount_attached(op.id, self.config.asset_x);
                    let net_in = amount_in - self.combined_fee(amount_in);
                    let out = mul_div(net_in, self.reserve_y, scratch.reserve_x_block)
                        .map_err(EngineError::math("trade settlement"))?;
                    ledger.transfer(self.config.asset_y, out, op.sender)?;
                    TradeRecord {
                        op: op.id,
                        direction,
                        delta_in: net_in,
                        delta_out: -out,
                    }
                }
                TradeDirection::YForX => {
                    let amount_in = ledger.amount_attached(op.id, self.config.asset_y);
                    let net_in = amount_in - self.combined_fee(amount_in);
                    let out = mul_div(net_in, self.reserve_x, scratch.reserve_y_block)
                        .map_err(EngineError::math("trade settlement"))?;
                    ledger.transfer(self.config.asset_x, out, op.sender)?;
                    TradeRecord {
                        op: op.id,
                        direction,
                        delta_in: net_in,
                        delta_out: -out,
                    }
                }
            };
            ledger.notify_trade(self.config.tracker, record);
            summary.trades_executed += 1;
            debug!(
                op = %op.id,
                %direction,
                delta_in = record.delta_in,
                delta_out = record.delta_out,
                "trade executed"
            );
        }
        Ok(())
    }

    /// Swap plus platform fee on a deposit, both truncating.
    fn combined_fee(&self, amount_in: Amount) -> Amount {
        amount_in / self.config.swap_fee_divisor + amount_in / self.config.platform_fee_divisor
    }

    /// Final step: forward accumulated platform fees, then overwrite the
    /// authoritative reserves with the ledger's ground truth, absorbing
    /// truncation dust and funds attached to ignored operations.
    fn forward_fees_and_reconcile(
        &mut self,
        ledger: &mut impl Ledger,
        scratch: &EpochScratch,
        summary: &mut EpochSummary,
    ) -> Result<(), EngineError> {
        if scratch.platform_fee_x > 0 {
            ledger.transfer(
                self.config.asset_x,
                scratch.platform_fee_x,
                self.config.fee_recipient,
            )?;
        }
        if scratch.platform_fee_y > 0 {
            ledger.transfer(
                self.config.asset_y,
                scratch.platform_fee_y,
                self.config.fee_recipient,
            )?;
        }
        summary.platform_fee_x = scratch.platform_fee_x;
        summary.platform_fee_y = scratch.platform_fee_y;

        let actual_x = ledger.current_balance(self.config.asset_x);
        let actual_y = ledger.current_balance(self.config.asset_y);
        summary.reconciled_x = actual_x - self.reserve_x;
        summary.reconciled_y = actual_y - self.reserve_y;
        self.reserve_x = actual_x;
        self.reserve_y = actual_y;

        if summary.reconciled_x != 0 || summary.reconciled_y != 0 {
            debug!(
                dx = summary.reconciled_x,
                dy = summary.reconciled_y,
                "reserves reconciled"
            );
        }
        Ok(())
    }
}

/// Quote one swap against the provisional reserves. `None` means reject; the
/// swap has not touched any state and will be refunded by the execution pass.
/// Arithmetic failure while quoting is also a rejection for the same reason.
fn quote_admission(
    amount_in: Amount,
    reserve_in_block: Amount,
    reserve_out_block: Amount,
    reserve_out_open: Amount,
    min_out: Amount,
    config: &PoolConfig,
) -> Option<AdmissionQuote> {
    if amount_in <= 0 {
        return None;
    }
    let fee = amount_in / config.swap_fee_divisor;
    let platform_fee = amount_in / config.platform_fee_divisor;

    let reserve_in_after = reserve_in_block.checked_add(amount_in)?;
    let divisor = reserve_in_after - fee - platform_fee;
    if divisor <= 0 {
        return None;
    }
    let reserve_out_after = mul_div(reserve_in_block, reserve_out_block, divisor).ok()?;
    let delta_out = reserve_out_after - reserve_out_block;

    // Worst-case price the requester tolerates, measured against the
    // epoch-opening reserve so queue position does not change the metric.
    let price = mul_div(amount_in, reserve_out_open, min_out).ok()?;

    if -delta_out < min_out || price <= 0 {
        return None;
    }
    Some(AdmissionQuote {
        reserve_in_after,
        delta_out,
        platform_fee,
        price,
    })
}
