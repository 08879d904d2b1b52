//! Property tests over whole-epoch processing.
//!
//! These validate invariants that must hold regardless of specific amounts:
//! liquidity round trips never profit, admitted same-direction swaps fill at
//! one ratio, and reserves always match the ledger's ground truth after
//! reconciliation.

use e2e::TestBench;
use proptest::prelude::*;
use types::AccountId;

const LP: AccountId = AccountId(10);
const LP2: AccountId = AccountId(11);

prop_compose! {
    fn bootstrap_reserve()
        (amount in 10_000i64..1_000_000_000) -> i64 {
        amount
    }
}

prop_compose! {
    fn follow_up_deposit()
        (amount in 1i64..10_000_000) -> i64 {
        amount
    }
}

proptest! {
    /// Adding liquidity and immediately removing the minted shares returns at
    /// most the deposit — truncation and forfeited excess always favor the
    /// pool.
    #[test]
    fn round_trip_never_profits(
        bx in bootstrap_reserve(),
        by in bootstrap_reserve(),
        dx in follow_up_deposit(),
        dy in follow_up_deposit(),
    ) {
        let mut bench = TestBench::new();
        bench.fund(LP, bx, by);
        bench.add_liquidity(LP, bx, by);
        bench.epoch();

        bench.fund(LP2, dx, dy);
        bench.add_liquidity(LP2, dx, dy);
        bench.epoch();

        let minted = bench.shares(LP2);
        bench.remove_liquidity(LP2, minted);
        bench.epoch();

        prop_assert!(bench.balance_x(LP2) <= dx);
        prop_assert!(bench.balance_y(LP2) <= dy);
        prop_assert_eq!(bench.shares(LP2), 0);
    }

    /// Every admitted swap of a direction realizes the same output-per-input
    /// ratio, up to one truncation unit per comparison.
    #[test]
    fn same_direction_swaps_fill_at_one_ratio(
        bases in prop::collection::vec(10i64..1_000, 2..5),
    ) {
        let mut bench = TestBench::new();
        bench.fund(LP, 100_000_000, 100_000_000);
        bench.add_liquidity(LP, 100_000_000, 100_000_000);
        bench.epoch();

        // Amounts proportional to their minimums keep the admission price
        // metric identical, so every swap is admitted.
        for (i, &base) in bases.iter().enumerate() {
            let trader = AccountId(100 + i as u64);
            bench.fund(trader, base * 100, 0);
            bench.swap_x_for_y(trader, base * 100, base);
        }
        let summary = bench.epoch();
        prop_assert_eq!(summary.swaps_admitted, bases.len() as u32);

        let trades = bench.trades();
        for a in &trades {
            for b in &trades {
                let lhs = (-a.delta_out) as i128 * b.delta_in as i128;
                let rhs = (-b.delta_out) as i128 * a.delta_in as i128;
                prop_assert!(
                    (lhs - rhs).abs() < (a.delta_in + b.delta_in) as i128,
                    "ratios diverge beyond truncation: {:?} vs {:?}", a, b
                );
            }
        }
    }

    /// Whatever mix of directions and amounts an epoch carries, processing
    /// completes and the authoritative reserves equal the pool's ground-truth
    /// balances afterwards.
    #[test]
    fn reserves_match_ground_truth_after_any_swap_epoch(
        swaps in prop::collection::vec((1_000i64..100_000, any::<bool>()), 1..6),
    ) {
        let mut bench = TestBench::with_fees(500, 1_000);
        bench.fund(LP, 10_000_000, 10_000_000);
        bench.add_liquidity(LP, 10_000_000, 10_000_000);
        bench.epoch();

        for (i, &(amount, x_for_y)) in swaps.iter().enumerate() {
            let trader = AccountId(100 + i as u64);
            if x_for_y {
                bench.fund(trader, amount, 0);
                bench.swap_x_for_y(trader, amount, 1);
            } else {
                bench.fund(trader, 0, amount);
                bench.swap_y_for_x(trader, amount, 1);
            }
        }
        let summary = bench.epoch();
        prop_assert_eq!(
            summary.trades_executed + summary.swaps_refunded,
            swaps.len() as u32
        );
        bench.assert_reserves_reconciled();
    }
}
