//! Uniform pricing and front-running resistance across an epoch.

use e2e::TestBench;
use types::AccountId;

const LP: AccountId = AccountId(10);
const BUYER1: AccountId = AccountId(11);
const BUYER2: AccountId = AccountId(12);
const BUYER3: AccountId = AccountId(13);
const ATTACKER: AccountId = AccountId(20);
const VICTIM: AccountId = AccountId(21);

const ONE: i64 = 100_000_000; // 8 decimals

/// Pool bootstrapped with (10000, 2); two identical swaps of 100 X in one
/// epoch must both fill at the same output ratio.
#[test]
fn two_swaps_in_one_epoch_pay_the_same_price() {
    let mut bench = TestBench::new();
    bench.fund(LP, 10_000 * ONE, 2 * ONE);
    bench.add_liquidity(LP, 10_000 * ONE, 2 * ONE);
    bench.epoch();

    let send_x = 100 * ONE;
    // Willing to accept 10% below the opening spot rate.
    let min_out = 2 * ONE / 10_000 * 100 * 9 / 10;
    bench.fund(BUYER1, send_x, 0);
    bench.fund(BUYER2, send_x, 0);
    bench.swap_x_for_y(BUYER1, send_x, min_out);
    bench.swap_x_for_y(BUYER2, send_x, min_out);

    let summary = bench.epoch();
    assert_eq!(summary.swaps_admitted, 2);
    assert_eq!(summary.trades_executed, 2);
    assert_eq!(summary.swaps_refunded, 0);

    let out1 = bench.balance_y(BUYER1);
    let out2 = bench.balance_y(BUYER2);
    assert!(out1 >= min_out);
    assert_eq!(out1, out2, "identical swaps must realize identical output");

    // out = dx * reserve_y / (reserve_x + 2 * dx): one settled denominator
    // for both trades.
    let expected = ((send_x as i128) * (2 * ONE) as i128
        / (10_000 * ONE + 2 * send_x) as i128) as i64;
    assert_eq!(out1, expected);
    bench.assert_reserves_reconciled();
}

/// The first accepted admission price per direction caps every later trade in
/// that direction for the rest of the epoch.
#[test]
fn admission_price_cap_is_monotone() {
    let mut bench = TestBench::new();
    bench.fund(LP, 1_000_000, 1_000_000);
    bench.add_liquidity(LP, 1_000_000, 1_000_000);
    bench.epoch();

    bench.fund(BUYER1, 10_000, 0);
    bench.fund(BUYER2, 10_000, 0);
    bench.fund(BUYER3, 10_000, 0);
    // price metric = amount * reserve_y / min_out
    bench.swap_x_for_y(BUYER1, 10_000, 9_000); // sets the cap
    bench.swap_x_for_y(BUYER2, 10_000, 9_500); // tighter minimum: below cap
    bench.swap_x_for_y(BUYER3, 10_000, 8_000); // looser minimum: above cap

    let summary = bench.epoch();
    assert_eq!(summary.swaps_admitted, 2);
    assert_eq!(summary.swaps_rejected, 1);
    assert_eq!(summary.swaps_refunded, 1);

    // The rejected swap never touched reserves.
    assert_eq!(bench.balance_x(BUYER3), 10_000);
    assert_eq!(bench.balance_y(BUYER3), 0);

    // Admitted swaps realized one uniform ratio.
    let trades = bench.trades();
    assert_eq!(trades.len(), 2);
    let [first, second] = [trades[0], trades[1]];
    assert_eq!(first.delta_in, second.delta_in);
    assert_eq!(first.delta_out, second.delta_out);
}

/// Bracketing a victim's swap inside one epoch extracts nothing: the victim
/// is refunded untouched and the attacker pays the price impact of their own
/// round trip.
#[test]
fn sandwich_attack_is_unprofitable() {
    let mut bench = TestBench::new();
    bench.fund(LP, 1_000_000, 1_000_000);
    bench.add_liquidity(LP, 1_000_000, 1_000_000);
    bench.epoch();

    let attacker_x0 = 100_000;
    let attacker_y0 = 90_000;
    bench.fund(ATTACKER, attacker_x0, attacker_y0);
    bench.fund(VICTIM, 10_000, 0);

    // Front-run, victim, back-run — all in arrival order within the epoch.
    bench.swap_x_for_y(ATTACKER, 100_000, 90_000);
    bench.swap_x_for_y(VICTIM, 10_000, 9_000);
    bench.swap_y_for_x(ATTACKER, 90_000, 80_000);

    bench.epoch();

    // The victim's minimum output can no longer be met once the attacker's
    // trade is provisionally applied, so the victim is refunded in full.
    assert_eq!(bench.balance_x(VICTIM), 10_000);
    assert_eq!(bench.balance_y(VICTIM), 0);

    // At the epoch-opening 1:1 spot rate the attacker's total holdings
    // strictly shrank: both legs paid slippage into the pool.
    let attacker_total = bench.balance_x(ATTACKER) + bench.balance_y(ATTACKER);
    assert!(
        attacker_total < attacker_x0 + attacker_y0,
        "sandwich round trip must not profit, got {attacker_total}"
    );
    bench.assert_reserves_reconciled();
}

/// A victim tolerant enough to accept the post-attack price is still safe:
/// the loosened minimum raises their admission price above the cap the
/// attacker's own trade established.
#[test]
fn tolerant_victim_is_rejected_by_the_price_cap() {
    let mut bench = TestBench::new();
    bench.fund(LP, 1_000_000, 1_000_000);
    bench.add_liquidity(LP, 1_000_000, 1_000_000);
    bench.epoch();

    bench.fund(ATTACKER, 100_000, 0);
    bench.fund(VICTIM, 10_000, 0);

    bench.swap_x_for_y(ATTACKER, 100_000, 90_000);
    // Loose minimum that the attacked price would satisfy.
    bench.swap_x_for_y(VICTIM, 10_000, 8_000);

    let summary = bench.epoch();
    assert_eq!(summary.swaps_admitted, 1);
    assert_eq!(summary.swaps_rejected, 1);
    assert_eq!(bench.balance_x(VICTIM), 10_000);
    assert_eq!(bench.balance_y(VICTIM), 0);
}

/// Opposite directions carry independent caps in the same epoch.
#[test]
fn directions_have_independent_price_caps() {
    let mut bench = TestBench::new();
    bench.fund(LP, 1_000_000, 1_000_000);
    bench.add_liquidity(LP, 1_000_000, 1_000_000);
    bench.epoch();

    bench.fund(BUYER1, 10_000, 0);
    bench.fund(BUYER2, 0, 10_000);
    bench.swap_x_for_y(BUYER1, 10_000, 9_000);
    bench.swap_y_for_x(BUYER2, 10_000, 9_000);

    let summary = bench.epoch();
    assert_eq!(summary.swaps_admitted, 2);
    assert_eq!(summary.trades_executed, 2);
    assert!(bench.balance_y(BUYER1) >= 9_000);
    assert!(bench.balance_x(BUYER2) >= 9_000);
}
