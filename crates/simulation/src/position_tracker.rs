//! Position tracking for simulations.
//!
//! Drives a pool along a price path and records, after every step, the
//! reserves, fees and impermanent loss of each tracked position.

use crate::error::Result;
use crate::stats::to_decimal;
use clmm_model_domain::{FeeVector, Pool, PositionId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A snapshot of one position at a point of the path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionSnapshot {
    /// Step number, `0` is the state before the first move.
    pub step: usize,
    pub position: PositionId,
    /// Pool price at this step.
    pub price: f64,
    /// Whether price is inside the position's exact range.
    pub in_range: bool,
    pub x: f64,
    pub y: f64,
    /// Uncollected fees.
    pub fees: FeeVector,
    /// Impermanent loss relative to the hold value.
    pub il_pct: f64,
    /// Reserve value in token1.
    pub value: f64,
    /// Value of holding the initial reserves.
    pub hold_value: f64,
}

/// Records position snapshots while a pool follows a path.
#[derive(Debug, Clone, Default)]
pub struct PositionTracker {
    positions: Vec<PositionId>,
    /// All recorded snapshots, grouped by step.
    pub snapshots: Vec<PositionSnapshot>,
    current_step: usize,
}

impl PositionTracker {
    /// Creates a tracker for the given positions.
    #[must_use]
    pub fn new(positions: Vec<PositionId>) -> Self {
        Self {
            positions,
            snapshots: Vec::new(),
            current_step: 0,
        }
    }

    /// Tracks every position currently open in `pool`.
    #[must_use]
    pub fn for_pool(pool: &Pool) -> Self {
        Self::new(pool.position_ids().collect())
    }

    pub fn positions(&self) -> &[PositionId] {
        &self.positions
    }

    /// Snapshots every tracked position at the pool's current price.
    pub fn record(&mut self, pool: &mut Pool) -> Result<()> {
        let price = pool.price();
        for &id in &self.positions {
            let mut handle = pool.position_mut(id)?;
            let il_pct = handle.calculate_il();
            let value = handle.calculate_value();
            self.snapshots.push(PositionSnapshot {
                step: self.current_step,
                position: id,
                price,
                in_range: handle.is_in_range(price),
                x: handle.x(),
                y: handle.y(),
                fees: handle.fees(),
                il_pct,
                value,
                hold_value: handle.calculate_initial_value(),
            });
        }
        self.current_step += 1;
        Ok(())
    }

    /// Records the starting state, then moves the pool to each price in turn
    /// and records after every move. Stops at the first failed update.
    pub fn follow(&mut self, pool: &mut Pool, prices: &[f64]) -> Result<()> {
        self.record(pool)?;
        for &price in prices {
            pool.update_price(price)?;
            debug!(step = self.current_step, price, "Pool moved");
            self.record(pool)?;
        }
        Ok(())
    }

    /// Snapshots of one position, in step order.
    pub fn history(&self, id: PositionId) -> impl Iterator<Item = &PositionSnapshot> + '_ {
        self.snapshots.iter().filter(move |s| s.position == id)
    }

    /// Returns summary statistics for a tracked position.
    #[must_use]
    pub fn summary(&self, id: PositionId) -> TrackerSummary {
        let history: Vec<&PositionSnapshot> = self.history(id).collect();
        let total_steps = history.len();
        let in_range_steps = history.iter().filter(|s| s.in_range).count();

        let time_in_range_pct = if total_steps > 0 {
            Decimal::from(in_range_steps) / Decimal::from(total_steps)
        } else {
            Decimal::ZERO
        };

        let last = history.last();
        let final_price = last.map(|s| s.price).unwrap_or(0.0);

        // Max drawdown of reserve value plus uncollected fees
        let mut peak = 0.0_f64;
        let mut max_drawdown = 0.0_f64;
        for s in &history {
            let total = s.value + s.fees.value_at(s.price);
            peak = peak.max(total);
            if peak > 0.0 {
                max_drawdown = max_drawdown.max((peak - total) / peak);
            }
        }

        TrackerSummary {
            total_steps,
            time_in_range_pct,
            final_value: to_decimal(last.map(|s| s.value).unwrap_or(0.0)),
            final_il_pct: to_decimal(last.map(|s| s.il_pct).unwrap_or(0.0)),
            total_fees: to_decimal(last.map(|s| s.fees.value_at(final_price)).unwrap_or(0.0)),
            hodl_value: to_decimal(last.map(|s| s.hold_value).unwrap_or(0.0)),
            max_drawdown: to_decimal(max_drawdown),
        }
    }
}

/// Summary statistics from position tracking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackerSummary {
    pub total_steps: usize,
    /// Share of steps with the price inside the range.
    pub time_in_range_pct: Decimal,
    /// Final reserve value in token1.
    pub final_value: Decimal,
    pub final_il_pct: Decimal,
    /// Uncollected fees valued at the final price.
    pub total_fees: Decimal,
    /// Value of holding the initial reserves at the final price.
    pub hodl_value: Decimal,
    pub max_drawdown: Decimal,
}
