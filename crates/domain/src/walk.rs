//! Tick walk shared by price updates and swaps.
//!
//! A walk is planned against a read-only view of the ledger and produces a
//! [`WalkPlan`]: one [`Crossing`] per tick segment traversed, with the net
//! token amount moved along the curve and the fee carved out of it. The pool
//! commits a plan only once it has been built without error, so a failed
//! walk never touches pool state.
//!
//! Per segment of liquidity `L` between sqrt prices `a` and `b`:
//!
//! - price down realizes token0: `Δx = L (1/√b − 1/√a)`
//! - price up realizes token1: `Δy = L (√b − √a)`
//!
//! `Δ` is the net amount; the gross amount is `Δ / (1 − fee)` and the fee is
//! `gross · fee`, booked in the token realized by the segment.

use crate::config::ZeroLiquidityPolicy;
use crate::error::{PoolError, Result};
use crate::fees::FeeVector;
use crate::ledger::TickLedger;
use crate::math::concentrated_liquidity::{get_amount0_delta, get_amount1_delta};
use crate::math::price_tick::TickMath;
use serde::{Deserialize, Serialize};

/// Direction of price movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
}

/// When a walk stops.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum StopCondition {
    /// Stop at an exact price; `tick` is its spaced tick.
    TargetPrice { sqrt_price: f64, tick: i32 },
    /// Stop once this gross token amount has been pushed through.
    TokenBudget(f64),
}

/// One segment of a walk inside a single tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Crossing {
    pub tick: i32,
    pub liquidity: f64,
    pub sqrt_price_start: f64,
    pub sqrt_price_end: f64,
    /// Net amount moved along the curve.
    pub amount: f64,
    pub fees: FeeVector,
}

/// A fully validated walk, ready to be committed.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct WalkPlan {
    pub direction: Direction,
    pub crossings: Vec<Crossing>,
    pub final_tick: i32,
    pub final_sqrt_price: f64,
}

impl WalkPlan {
    pub fn total_fees(&self) -> FeeVector {
        self.crossings
            .iter()
            .fold(FeeVector::ZERO, |acc, c| acc + c.fees)
    }

    pub fn total_amount(&self) -> f64 {
        self.crossings.iter().map(|c| c.amount).sum()
    }

    /// Number of tick boundaries passed. Zero-width segments and the final
    /// partial segment do not count.
    pub fn ticks_crossed(&self) -> usize {
        self.crossings.split_last().map_or(0, |(_, whole)| {
            whole
                .iter()
                .filter(|c| c.sqrt_price_start != c.sqrt_price_end)
                .count()
        })
    }
}

/// Plans walks over a ledger snapshot.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TickWalker<'a> {
    pub ledger: &'a TickLedger,
    pub math: &'a TickMath,
    pub fee: f64,
    pub policy: ZeroLiquidityPolicy,
}

impl TickWalker<'_> {
    /// Plans a walk from `(start_tick, start_sqrt_price)` until `stop`.
    pub fn plan(
        &self,
        start_tick: i32,
        start_sqrt_price: f64,
        direction: Direction,
        stop: StopCondition,
    ) -> Result<WalkPlan> {
        match stop {
            StopCondition::TargetPrice { sqrt_price, tick } => {
                self.plan_to_target(start_tick, start_sqrt_price, direction, sqrt_price, tick)
            }
            StopCondition::TokenBudget(amount) => {
                self.plan_budget(start_tick, start_sqrt_price, direction, amount)
            }
        }
    }

    fn next_tick(&self, tick: i32, direction: Direction) -> i32 {
        match direction {
            Direction::Up => tick + self.math.tick_space(),
            Direction::Down => tick - self.math.tick_space(),
        }
    }

    /// Sqrt price of the boundary left when leaving `tick` in `direction`,
    /// never behind `running`. Truncated negative ticks can sit on the far
    /// side of the running price.
    fn boundary(&self, tick: i32, direction: Direction, running: f64) -> f64 {
        match direction {
            Direction::Up => self
                .math
                .tick_to_sqrt_price(self.next_tick(tick, direction))
                .max(running),
            Direction::Down => self.math.tick_to_sqrt_price(tick).min(running),
        }
    }

    fn amount_between(&self, liquidity: f64, from: f64, to: f64, direction: Direction) -> f64 {
        match direction {
            Direction::Up => get_amount1_delta(liquidity, from, to),
            Direction::Down => get_amount0_delta(liquidity, from, to),
        }
    }

    fn fees_for(&self, amount: f64, direction: Direction) -> FeeVector {
        let gross = amount / (1.0 - self.fee);
        let fee = gross * self.fee;
        match direction {
            Direction::Up => FeeVector::new(0.0, fee),
            Direction::Down => FeeVector::new(fee, 0.0),
        }
    }

    fn crossing(
        &self,
        tick: i32,
        liquidity: f64,
        (from, to): (f64, f64),
        amount: f64,
        direction: Direction,
    ) -> Crossing {
        Crossing {
            tick,
            liquidity,
            sqrt_price_start: from,
            sqrt_price_end: to,
            amount,
            fees: self.fees_for(amount, direction),
        }
    }

    /// Segment from `from` to `to` inside `tick`, for price-driven walks.
    fn segment(
        &self,
        tick: i32,
        (from, to): (f64, f64),
        direction: Direction,
    ) -> Result<Crossing> {
        let liquidity = self.ledger.liquidity_at(tick);
        if from == to {
            return Ok(self.crossing(tick, liquidity, (from, to), 0.0, direction));
        }
        if liquidity <= 0.0 {
            // A price sitting on a tick boundary up to float noise crosses nothing.
            if self.math.within_tick_tolerance(from, to) {
                return Ok(self.crossing(tick, 0.0, (from, to), 0.0, direction));
            }
            return match self.policy {
                ZeroLiquidityPolicy::Reject => Err(PoolError::LiquidityExhausted { tick }),
                ZeroLiquidityPolicy::PassThrough => {
                    Ok(self.crossing(tick, 0.0, (from, to), 0.0, direction))
                }
            };
        }
        let amount = self.amount_between(liquidity, from, to, direction);
        Ok(self.crossing(tick, liquidity, (from, to), amount, direction))
    }

    fn plan_to_target(
        &self,
        start_tick: i32,
        start_sqrt_price: f64,
        direction: Direction,
        target_sqrt_price: f64,
        target_tick: i32,
    ) -> Result<WalkPlan> {
        let mut crossings = Vec::new();
        let mut tick = start_tick;
        let mut running = start_sqrt_price;

        let before_target = |tick: i32| match direction {
            Direction::Up => tick < target_tick,
            Direction::Down => tick > target_tick,
        };

        while before_target(tick) {
            let boundary = match direction {
                Direction::Up => self.boundary(tick, direction, running).min(target_sqrt_price),
                Direction::Down => self.boundary(tick, direction, running).max(target_sqrt_price),
            };
            crossings.push(self.segment(tick, (running, boundary), direction)?);
            running = boundary;
            tick = self.next_tick(tick, direction);
        }

        crossings.push(self.segment(tick, (running, target_sqrt_price), direction)?);

        Ok(WalkPlan {
            direction,
            crossings,
            final_tick: tick,
            final_sqrt_price: target_sqrt_price,
        })
    }

    fn plan_budget(
        &self,
        start_tick: i32,
        start_sqrt_price: f64,
        direction: Direction,
        gross_amount: f64,
    ) -> Result<WalkPlan> {
        let mut crossings = Vec::new();
        let mut tick = start_tick;
        let mut running = start_sqrt_price;
        let mut remaining = gross_amount * (1.0 - self.fee);

        loop {
            let liquidity = self.ledger.liquidity_at(tick);
            let boundary = self.boundary(tick, direction, running);
            if liquidity <= 0.0 {
                if !self.math.within_tick_tolerance(running, boundary) {
                    return Err(PoolError::LiquidityExhausted { tick });
                }
                crossings.push(self.crossing(tick, 0.0, (running, boundary), 0.0, direction));
                running = boundary;
                tick = self.next_tick(tick, direction);
                continue;
            }

            let capacity = self.amount_between(liquidity, running, boundary, direction);

            if remaining <= capacity {
                let end = match direction {
                    Direction::Up => running + remaining / liquidity,
                    Direction::Down => 1.0 / (1.0 / running + remaining / liquidity),
                };
                crossings.push(self.crossing(tick, liquidity, (running, end), remaining, direction));
                return Ok(WalkPlan {
                    direction,
                    crossings,
                    final_tick: tick,
                    final_sqrt_price: end,
                });
            }

            crossings.push(self.crossing(tick, liquidity, (running, boundary), capacity, direction));
            remaining -= capacity;
            running = boundary;
            tick = self.next_tick(tick, direction);
        }
    }
}
