//! Property-based tests using `proptest` for pool invariants.
//!
//! 1. **Fee conservation**: inside one uniformly liquid range, distributed
//!    fees equal the gross crossed amount times the fee rate.
//! 2. **Ledger consistency**: every slot equals the liquidity of the
//!    positions containing it.
//! 3. **Hold baseline invariance**: price paths never touch a position's
//!    baseline, range or liquidity.
//! 4. **No-op idempotence**: repeating a price distributes nothing.
//! 5. **Tick monotonicity**: ledger bounds enclose every position and the
//!    current tick.

use proptest::prelude::*;

use crate::{FeeVector, Pool, PoolConfig, ZeroLiquidityPolicy};

fn pool_at(price: f64) -> Pool {
    let Ok(pool) = Pool::new(
        PoolConfig::new(price)
            .with_tick_space(10)
            .with_tick_size(1.0001)
            .with_fee(0.003),
    ) else {
        panic!("valid pool");
    };
    pool
}

fn fee_total(pool: &Pool) -> FeeVector {
    pool.positions()
        .iter()
        .fold(FeeVector::ZERO, |acc, p| acc + p.fees())
}

proptest! {
    #[test]
    fn prop_fee_conservation_single_range(
        values in prop::collection::vec(1.0f64..1_000.0, 1..4),
        path in prop::collection::vec(80.0f64..120.0, 1..8),
    ) {
        let mut pool = pool_at(100.0);
        for v in &values {
            let Ok(_) = pool.open_position(50.0, 200.0, *v) else {
                panic!("valid position");
            };
        }
        let liquidity = pool.liquidity();
        let fee = pool.fee();

        let mut expected = FeeVector::ZERO;
        let mut sqrt = pool.sqrt_price();
        for price in path {
            let next = price.sqrt();
            if next > sqrt {
                expected.y += liquidity * (next - sqrt) / (1.0 - fee) * fee;
            } else {
                expected.x += liquidity * (1.0 / next - 1.0 / sqrt) / (1.0 - fee) * fee;
            }
            prop_assert!(pool.update_price(price).is_ok());
            sqrt = next;
        }

        let got = fee_total(&pool);
        prop_assert!((got.x - expected.x).abs() <= 1e-9 * (1.0 + expected.x));
        prop_assert!((got.y - expected.y).abs() <= 1e-9 * (1.0 + expected.y));
    }

    #[test]
    fn prop_ledger_matches_positions(
        ranges in prop::collection::vec((20.0f64..100.0, 1.05f64..3.0, 1.0f64..500.0), 1..6),
    ) {
        let mut pool = pool_at(100.0);
        for (low, width, value) in ranges {
            let Ok(_) = pool.open_position(low, low * width, value) else {
                panic!("valid position");
            };
        }

        for (tick, slot) in pool.ledger().iter() {
            let expected: f64 = pool
                .positions()
                .iter()
                .filter(|p| p.contains_tick(tick))
                .map(|p| p.liquidity())
                .sum();
            prop_assert!((slot - expected).abs() <= 1e-9 * (1.0 + expected));
        }

        let total: f64 = pool.positions().iter().map(|p| p.liquidity()).sum();
        prop_assert!((pool.liquidity() - total).abs() <= 1e-9 * total);

        for p in pool.positions() {
            prop_assert!(pool.lower_tick() <= p.min_tick());
            prop_assert!(p.min_tick() <= p.max_tick());
            prop_assert!(p.max_tick() <= pool.upper_tick());
        }
    }

    #[test]
    fn prop_baseline_invariant_and_bounds(
        path in prop::collection::vec(5.0f64..60.0, 1..10),
    ) {
        let Ok(mut pool) = Pool::new(
            PoolConfig::new(15.0)
                .with_tick_size(1.001)
                .with_tick_space(2)
                .with_zero_liquidity(ZeroLiquidityPolicy::PassThrough),
        ) else {
            panic!("valid pool");
        };
        let Ok(id) = pool.open_position(13.0, 17.0, 100.0) else {
            panic!("valid position");
        };
        let Ok(before) = pool.position(id).cloned() else {
            panic!("known position");
        };

        for price in path {
            prop_assert!(pool.update_price(price).is_ok());
            prop_assert!(pool.lower_tick() <= pool.current_tick());
            prop_assert!(pool.current_tick() <= pool.upper_tick());
        }

        let Ok(after) = pool.position(id) else {
            panic!("known position");
        };
        prop_assert_eq!(after.initial_x(), before.initial_x());
        prop_assert_eq!(after.initial_y(), before.initial_y());
        prop_assert_eq!(after.min_range(), before.min_range());
        prop_assert_eq!(after.max_range(), before.max_range());
        prop_assert_eq!(after.liquidity(), before.liquidity());
    }

    #[test]
    fn prop_repeated_price_is_noop(price in 80.0f64..120.0) {
        let mut pool = pool_at(100.0);
        let Ok(_) = pool.open_position(50.0, 200.0, 100.0) else {
            panic!("valid position");
        };
        prop_assert!(pool.update_price(price).is_ok());
        let fees = fee_total(&pool);
        let tick = pool.current_tick();

        prop_assert!(pool.update_price(price).is_ok());
        prop_assert_eq!(fee_total(&pool), fees);
        prop_assert_eq!(pool.current_tick(), tick);
    }
}
