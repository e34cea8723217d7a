//! Concentrated liquidity pool.
//!
//! The pool owns its tick ledger and every position opened against it.
//! Price moves are driven either by a target price ([`Pool::update_price`])
//! or by a token amount ([`Pool::swap`]); both plan a tick walk first and
//! commit it only when the whole path is valid.

use crate::config::{PoolConfig, ZeroLiquidityPolicy};
use crate::error::{PoolError, Result};
use crate::fees::FeeVector;
use crate::ledger::TickLedger;
use crate::math::concentrated_liquidity::{
    get_liquidity_for_amount0, get_liquidity_for_amount1, value_per_liquidity,
};
use crate::math::price_tick::TickMath;
use crate::position::{Position, PositionHandle, PositionId};
use crate::walk::{Direction, StopCondition, TickWalker, WalkPlan};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, trace, warn};
use uuid::Uuid;

/// Identifier of a pool instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PoolId(pub Uuid);

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Result of a [`Pool::swap`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SwapOutcome {
    pub direction: Direction,
    /// Gross amount pushed through the pool, fee included.
    pub amount_in: f64,
    /// Fees distributed to positions.
    pub fees: FeeVector,
    /// Whole tick boundaries crossed.
    pub ticks_crossed: usize,
    /// Price after the swap.
    pub price: f64,
}

/// A tick-range liquidity pool.
#[derive(Debug, Clone)]
pub struct Pool {
    id: PoolId,
    math: TickMath,
    fee: f64,
    zero_liquidity: ZeroLiquidityPolicy,
    ledger: TickLedger,
    sqrt_price: f64,
    current_tick: i32,
    liquidity: f64,
    providers: Vec<Position>,
}

/// Creates a pool with the default zero-liquidity policy.
pub fn create_pool(tick_space: i32, fee: f64, tick_size: f64, initial_price: f64) -> Result<Pool> {
    Pool::new(
        PoolConfig::new(initial_price)
            .with_tick_space(tick_space)
            .with_fee(fee)
            .with_tick_size(tick_size),
    )
}

impl Pool {
    /// Creates an empty pool. The ledger initially spans half to twice the
    /// initial price.
    pub fn new(config: PoolConfig) -> Result<Self> {
        config.validate()?;
        let math = TickMath::new(config.tick_size, config.tick_space)?;
        let price = config.initial_price;

        let lower_tick = math.price_to_tick(price / 2.0)?;
        let upper_tick = math.price_to_tick(price * 2.0)?;
        let current_tick = math.price_to_tick(price)?;

        let pool = Self {
            id: PoolId(Uuid::new_v4()),
            math,
            fee: config.fee,
            zero_liquidity: config.zero_liquidity,
            ledger: TickLedger::new(lower_tick, upper_tick, config.tick_space),
            sqrt_price: price.sqrt(),
            current_tick,
            liquidity: 0.0,
            providers: Vec::new(),
        };
        debug!(
            pool = %pool.id,
            price,
            current_tick,
            lower_tick,
            upper_tick,
            "Pool created"
        );
        Ok(pool)
    }

    pub fn id(&self) -> PoolId {
        self.id
    }

    pub fn fee(&self) -> f64 {
        self.fee
    }

    pub fn tick_math(&self) -> &TickMath {
        &self.math
    }

    pub fn sqrt_price(&self) -> f64 {
        self.sqrt_price
    }

    pub fn price(&self) -> f64 {
        self.sqrt_price * self.sqrt_price
    }

    pub fn current_tick(&self) -> i32 {
        self.current_tick
    }

    /// Sum of the liquidity of every opened position.
    pub fn liquidity(&self) -> f64 {
        self.liquidity
    }

    pub fn lower_tick(&self) -> i32 {
        self.ledger.lower_tick()
    }

    pub fn upper_tick(&self) -> i32 {
        self.ledger.upper_tick()
    }

    pub fn ledger(&self) -> &TickLedger {
        &self.ledger
    }

    /// Aggregate liquidity at `tick` (zero outside the ledger).
    pub fn tick_liquidity(&self, tick: i32) -> f64 {
        self.ledger.liquidity_at(tick)
    }

    /// Positions in opening order.
    pub fn positions(&self) -> &[Position] {
        &self.providers
    }

    /// Handles of all positions, in opening order.
    pub fn position_ids(&self) -> impl Iterator<Item = PositionId> + '_ {
        self.providers.iter().map(Position::id)
    }

    pub fn position(&self, id: PositionId) -> Result<&Position> {
        if id.pool != self.id {
            return Err(PoolError::UnknownPosition(id));
        }
        self.providers
            .get(id.index)
            .ok_or(PoolError::UnknownPosition(id))
    }

    /// Borrows a position together with the current pool price.
    pub fn position_mut(&mut self, id: PositionId) -> Result<PositionHandle<'_>> {
        if id.pool != self.id {
            return Err(PoolError::UnknownPosition(id));
        }
        let sqrt_price = self.sqrt_price;
        self.providers
            .get_mut(id.index)
            .map(|position| PositionHandle::new(position, sqrt_price))
            .ok_or(PoolError::UnknownPosition(id))
    }

    /// Resolves the spaced tick range for a requested price range.
    fn resolve_range(&self, min_price: f64, max_price: f64) -> Result<(i32, i32)> {
        for price in [min_price, max_price] {
            if !price.is_finite() || price <= 0.0 {
                return Err(PoolError::InvalidPrice(price));
            }
        }
        let invalid = PoolError::InvalidRange {
            min_price,
            max_price,
        };
        if max_price <= min_price {
            return Err(invalid);
        }
        let min_tick = self.math.price_to_tick(min_price)?;
        let max_tick = self.math.price_to_tick(max_price)?;
        if max_tick <= min_tick {
            return Err(invalid);
        }
        Ok((min_tick, max_tick))
    }

    /// Opens a position worth `value` (token1 units) at the current price
    /// over `[min_price, max_price]`, snapped to the tick grid.
    ///
    /// Liquidity solves `value = L·(1/√P − 1/√Pu)·P + L·(√P − √Pl)` on the
    /// snapped range, with the out-of-range branches applied when the price
    /// is outside it.
    pub fn open_position(&mut self, min_price: f64, max_price: f64, value: f64) -> Result<PositionId> {
        if !value.is_finite() || value <= 0.0 {
            return Err(PoolError::InvalidAmount(value));
        }
        let (min_tick, max_tick) = self.resolve_range(min_price, max_price)?;
        let per_unit = value_per_liquidity(
            self.sqrt_price,
            self.math.tick_to_sqrt_price(min_tick),
            self.math.tick_to_sqrt_price(max_tick),
        );
        if per_unit <= 0.0 {
            return Err(PoolError::InvalidRange {
                min_price,
                max_price,
            });
        }
        Ok(self.add_position(min_tick, max_tick, value / per_unit))
    }

    /// Opens a position from token amounts: the largest liquidity that both
    /// `amount_x` and `amount_y` can back over the snapped range.
    pub fn open_position_with_tokens(
        &mut self,
        min_price: f64,
        max_price: f64,
        amount_x: f64,
        amount_y: f64,
    ) -> Result<PositionId> {
        for amount in [amount_x, amount_y] {
            if !amount.is_finite() || amount < 0.0 {
                return Err(PoolError::InvalidAmount(amount));
            }
        }
        let (min_tick, max_tick) = self.resolve_range(min_price, max_price)?;
        let sqrt_lower = self.math.tick_to_sqrt_price(min_tick);
        let sqrt_upper = self.math.tick_to_sqrt_price(max_tick);
        let s = self.sqrt_price;

        let liquidity = if s < sqrt_lower {
            get_liquidity_for_amount0(amount_x, sqrt_lower, sqrt_upper)
        } else if s > sqrt_upper {
            get_liquidity_for_amount1(amount_y, sqrt_lower, sqrt_upper)
        } else {
            let from_x = get_liquidity_for_amount0(amount_x, s, sqrt_upper);
            let from_y = get_liquidity_for_amount1(amount_y, sqrt_lower, s);
            match (from_x, from_y) {
                (Some(lx), Some(ly)) => Some(lx.min(ly)),
                (lx, ly) => lx.or(ly),
            }
        };

        match liquidity {
            Some(l) if l > 0.0 => Ok(self.add_position(min_tick, max_tick, l)),
            _ => Err(PoolError::InvalidAmount(amount_x.max(amount_y))),
        }
    }

    fn add_position(&mut self, min_tick: i32, max_tick: i32, liquidity: f64) -> PositionId {
        let id = PositionId {
            pool: self.id,
            index: self.providers.len(),
        };
        let position = Position::new(
            id,
            (min_tick, max_tick),
            (self.math.tick_to_price(min_tick), self.math.tick_to_price(max_tick)),
            liquidity,
            self.sqrt_price,
        );

        self.ledger.add_liquidity(min_tick, max_tick, liquidity);
        self.liquidity += liquidity;
        self.providers.push(position);

        debug!(
            position = %id,
            min_tick,
            max_tick,
            liquidity,
            "Opened position"
        );
        id
    }

    fn walker(&self) -> TickWalker<'_> {
        TickWalker {
            ledger: &self.ledger,
            math: &self.math,
            fee: self.fee,
            policy: self.zero_liquidity,
        }
    }

    /// Moves the pool to `new_price`, distributing the fee of every tick
    /// segment crossed to the positions in range for it.
    ///
    /// Fails with `LiquidityExhausted` when a segment with no liquidity must
    /// be crossed and the pool rejects empty ticks; the pool is unchanged
    /// on failure.
    pub fn update_price(&mut self, new_price: f64) -> Result<()> {
        if !new_price.is_finite() || new_price <= 0.0 {
            return Err(PoolError::InvalidPrice(new_price));
        }
        let target_sqrt = new_price.sqrt();
        if target_sqrt == self.sqrt_price {
            return Ok(());
        }
        let direction = if target_sqrt > self.sqrt_price {
            Direction::Up
        } else {
            Direction::Down
        };
        let target_tick = self.math.price_to_tick(new_price)?;

        let plan = self
            .walker()
            .plan(
                self.current_tick,
                self.sqrt_price,
                direction,
                StopCondition::TargetPrice {
                    sqrt_price: target_sqrt,
                    tick: target_tick,
                },
            )
            .inspect_err(|e| warn!(pool = %self.id, new_price, error = %e, "Price update rejected"))?;

        debug!(
            pool = %self.id,
            from_tick = self.current_tick,
            to_tick = plan.final_tick,
            segments = plan.crossings.len(),
            amount = plan.total_amount(),
            "Price updated"
        );
        self.commit(plan);
        Ok(())
    }

    /// Pushes `token_amount` through the pool. Positive amounts are token1
    /// and move the price up; negative amounts are token0 and move it down.
    /// The amount is gross: `amount · fee` goes to positions and the rest
    /// moves the curve.
    pub fn swap(&mut self, token_amount: f64) -> Result<SwapOutcome> {
        if !token_amount.is_finite() || token_amount == 0.0 {
            return Err(PoolError::InvalidAmount(token_amount));
        }
        let direction = if token_amount > 0.0 {
            Direction::Up
        } else {
            Direction::Down
        };
        let amount_in = token_amount.abs();

        let plan = self
            .walker()
            .plan(
                self.current_tick,
                self.sqrt_price,
                direction,
                StopCondition::TokenBudget(amount_in),
            )
            .inspect_err(|e| warn!(pool = %self.id, token_amount, error = %e, "Swap rejected"))?;

        let outcome = SwapOutcome {
            direction: plan.direction,
            amount_in,
            fees: plan.total_fees(),
            ticks_crossed: plan.ticks_crossed(),
            price: plan.final_sqrt_price * plan.final_sqrt_price,
        };
        debug!(
            pool = %self.id,
            token_amount,
            ticks_crossed = outcome.ticks_crossed,
            price = outcome.price,
            "Swap executed"
        );
        self.commit(plan);
        Ok(outcome)
    }

    fn commit(&mut self, plan: WalkPlan) {
        self.ledger.extend_to(plan.final_tick);
        for crossing in &plan.crossings {
            trace!(
                tick = crossing.tick,
                from = crossing.sqrt_price_start,
                to = crossing.sqrt_price_end,
                amount = crossing.amount,
                "Tick segment"
            );
            self.distribute_fees(crossing.tick, crossing.fees, crossing.liquidity);
        }
        self.current_tick = plan.final_tick;
        self.sqrt_price = plan.final_sqrt_price;
    }

    /// Splits `fees` among positions in range for `tick`, pro rata to their
    /// liquidity over the tick's aggregate liquidity.
    fn distribute_fees(&mut self, tick: i32, fees: FeeVector, tick_liquidity: f64) {
        if tick_liquidity <= 0.0 || fees.is_zero() {
            return;
        }
        for provider in self.providers.iter_mut().filter(|p| p.contains_tick(tick)) {
            let participation = provider.liquidity() / tick_liquidity;
            provider.collect_taxes(fees * participation);
        }
    }
}
