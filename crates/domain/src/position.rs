//! Liquidity positions.
//!
//! A position is created by [`Pool::open_position`](crate::pool::Pool::open_position)
//! and owned by that pool. Its liquidity and range never change afterwards;
//! reserves are recomputed from the pool price on demand and fees only grow
//! until withdrawn.

use crate::fees::FeeVector;
use crate::math::concentrated_liquidity::get_amounts_for_liquidity;
use crate::pool::PoolId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;

/// Handle to a position inside the pool that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PositionId {
    pub pool: PoolId,
    pub index: usize,
}

impl fmt::Display for PositionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.pool, self.index)
    }
}

/// A provider's liquidity over a tick range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    id: PositionId,
    min_tick: i32,
    max_tick: i32,
    /// Exact price at `min_tick`.
    min_range: f64,
    /// Exact price at `max_tick`.
    max_range: f64,
    liquidity: f64,
    x: f64,
    y: f64,
    initial_x: f64,
    initial_y: f64,
    fees: FeeVector,
    /// Last withdrawn fee total, in token1 units at withdrawal time.
    fees_withdraw: f64,
}

impl Position {
    /// Builds a position and fixes its hold baseline at `sqrt_price`.
    pub(crate) fn new(
        id: PositionId,
        (min_tick, max_tick): (i32, i32),
        (min_range, max_range): (f64, f64),
        liquidity: f64,
        sqrt_price: f64,
    ) -> Self {
        let (x, y) = get_amounts_for_liquidity(
            liquidity,
            sqrt_price,
            min_range.sqrt(),
            max_range.sqrt(),
        );
        Self {
            id,
            min_tick,
            max_tick,
            min_range,
            max_range,
            liquidity,
            x,
            y,
            initial_x: x,
            initial_y: y,
            fees: FeeVector::ZERO,
            fees_withdraw: 0.0,
        }
    }

    pub fn id(&self) -> PositionId {
        self.id
    }

    pub fn min_tick(&self) -> i32 {
        self.min_tick
    }

    pub fn max_tick(&self) -> i32 {
        self.max_tick
    }

    pub fn min_range(&self) -> f64 {
        self.min_range
    }

    pub fn max_range(&self) -> f64 {
        self.max_range
    }

    pub fn liquidity(&self) -> f64 {
        self.liquidity
    }

    /// Cached token0 reserve as of the last refresh.
    pub fn x(&self) -> f64 {
        self.x
    }

    /// Cached token1 reserve as of the last refresh.
    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn initial_x(&self) -> f64 {
        self.initial_x
    }

    pub fn initial_y(&self) -> f64 {
        self.initial_y
    }

    /// Uncollected fees.
    pub fn fees(&self) -> FeeVector {
        self.fees
    }

    pub fn fees_withdraw(&self) -> f64 {
        self.fees_withdraw
    }

    /// Whether the position is in range for `tick`.
    pub fn contains_tick(&self, tick: i32) -> bool {
        self.min_tick <= tick && tick <= self.max_tick
    }

    /// Whether `price` lies inside the exact range.
    pub fn is_in_range(&self, price: f64) -> bool {
        price >= self.min_range && price <= self.max_range
    }

    /// Reserves the position would hold at `sqrt_price`, without caching.
    pub fn reserves_at(&self, sqrt_price: f64) -> (f64, f64) {
        get_amounts_for_liquidity(
            self.liquidity,
            sqrt_price,
            self.min_range.sqrt(),
            self.max_range.sqrt(),
        )
    }

    /// Recomputes and caches `(x, y)` at `sqrt_price`.
    pub fn update_reserves(&mut self, sqrt_price: f64) {
        (self.x, self.y) = self.reserves_at(sqrt_price);
    }

    /// `x * price + y` from the cached reserves.
    pub fn calculate_value(&self, price: f64) -> f64 {
        self.x * price + self.y
    }

    /// Value of simply holding the initial reserves at `price`.
    pub fn calculate_initial_value(&self, price: f64) -> f64 {
        self.initial_x * price + self.initial_y
    }

    /// `value - hold_value` at `sqrt_price`, after refreshing reserves.
    pub fn calculate_il_absolute(&mut self, sqrt_price: f64) -> f64 {
        self.update_reserves(sqrt_price);
        let price = sqrt_price * sqrt_price;
        self.calculate_value(price) - self.calculate_initial_value(price)
    }

    /// Impermanent loss as a fraction of the hold value. Negative means the
    /// position is worth less than holding.
    pub fn calculate_il(&mut self, sqrt_price: f64) -> f64 {
        let il = self.calculate_il_absolute(sqrt_price);
        let hold = self.calculate_initial_value(sqrt_price * sqrt_price);
        if hold == 0.0 {
            return 0.0;
        }
        il / hold
    }

    /// Converts accrued fees to token1 at `price`, stores the total in
    /// `fees_withdraw` and resets the accumulator.
    pub fn withdraw_fees(&mut self, price: f64) -> f64 {
        self.fees_withdraw = self.fees.value_at(price);
        self.fees = FeeVector::ZERO;
        self.fees_withdraw
    }

    /// `(il + withdrawn fees) / hold_value`. Withdraws the fees, so a second
    /// call only counts fees accrued in between.
    pub fn calculate_total_return(&mut self, sqrt_price: f64) -> f64 {
        let price = sqrt_price * sqrt_price;
        let il = self.calculate_il_absolute(sqrt_price);
        let withdrawn = self.withdraw_fees(price);
        let hold = self.calculate_initial_value(price);
        if hold == 0.0 {
            return 0.0;
        }
        (il + withdrawn) / hold
    }

    pub(crate) fn collect_taxes(&mut self, fees_received: FeeVector) {
        self.fees += fees_received;
    }
}

/// A position bound to the current price of its pool.
///
/// Obtained from [`Pool::position_mut`](crate::pool::Pool::position_mut).
#[derive(Debug)]
pub struct PositionHandle<'a> {
    position: &'a mut Position,
    sqrt_price: f64,
}

impl<'a> PositionHandle<'a> {
    pub(crate) fn new(position: &'a mut Position, sqrt_price: f64) -> Self {
        Self {
            position,
            sqrt_price,
        }
    }

    fn price(&self) -> f64 {
        self.sqrt_price * self.sqrt_price
    }

    pub fn update_reserves(&mut self) {
        self.position.update_reserves(self.sqrt_price);
    }

    /// Current value, reserves refreshed first.
    pub fn calculate_value(&mut self) -> f64 {
        self.update_reserves();
        self.position.calculate_value(self.price())
    }

    pub fn calculate_initial_value(&self) -> f64 {
        self.position.calculate_initial_value(self.price())
    }

    pub fn calculate_il_absolute(&mut self) -> f64 {
        self.position.calculate_il_absolute(self.sqrt_price)
    }

    pub fn calculate_il(&mut self) -> f64 {
        self.position.calculate_il(self.sqrt_price)
    }

    pub fn withdraw_fees(&mut self) -> f64 {
        let price = self.price();
        self.position.withdraw_fees(price)
    }

    pub fn calculate_total_return(&mut self) -> f64 {
        self.position.calculate_total_return(self.sqrt_price)
    }
}

impl Deref for PositionHandle<'_> {
    type Target = Position;

    fn deref(&self) -> &Position {
        &*self.position
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn position(liquidity: f64, sqrt_price: f64) -> Position {
        let id = PositionId {
            pool: PoolId(Uuid::nil()),
            index: 0,
        };
        // Range [1, 4], sqrt [1, 2]
        Position::new(id, (0, 10), (1.0, 4.0), liquidity, sqrt_price)
    }

    #[test]
    fn test_initial_reserves_fixed_at_creation() {
        let mut p = position(100.0, 1.5);
        assert_eq!(p.x(), p.initial_x());
        assert_eq!(p.y(), p.initial_y());

        p.update_reserves(1.9);
        assert!(p.x() < p.initial_x());
        assert!(p.y() > p.initial_y());
        assert!((p.initial_y() - 50.0).abs() < 1e-12);
    }

    #[test]
    fn test_reserve_continuity_at_bounds() {
        let p = position(100.0, 1.5);

        let (_, y_near_min) = p.reserves_at(1.0 + 1e-9);
        assert!(y_near_min < 1e-6);
        let (x_near_max, _) = p.reserves_at(2.0 - 1e-9);
        assert!(x_near_max < 1e-6);

        assert_eq!(p.reserves_at(0.5).1, 0.0);
        assert_eq!(p.reserves_at(3.0).0, 0.0);
    }

    #[test]
    fn test_il_is_zero_at_entry_and_negative_after_move() {
        let mut p = position(100.0, 1.5);
        assert!(p.calculate_il(1.5).abs() < 1e-12);

        assert!(p.calculate_il(1.8) < 0.0);
        assert!(p.calculate_il(1.2) < 0.0);
        assert!(p.calculate_il_absolute(1.8) < 0.0);
    }

    #[test]
    fn test_total_return_withdraws_fees_once() {
        let mut p = position(100.0, 1.5);
        p.collect_taxes(FeeVector::new(1.0, 2.0));
        p.collect_taxes(FeeVector::new(0.5, 0.0));

        let hold = p.calculate_initial_value(2.25);
        let first = p.calculate_total_return(1.5);
        // fees = 1.5 * 2.25 + 2 = 5.375, IL is zero at the entry price
        assert!((first - 5.375 / hold).abs() < 1e-12);
        assert_eq!(p.fees_withdraw(), 5.375);
        assert!(p.fees().is_zero());

        let second = p.calculate_total_return(1.5);
        assert!(second.abs() < 1e-12);
        assert_eq!(p.fees_withdraw(), 0.0);
    }

    #[test]
    fn test_range_checks() {
        let p = position(100.0, 1.5);
        assert!(p.contains_tick(0));
        assert!(p.contains_tick(10));
        assert!(!p.contains_tick(20));
        assert!(p.is_in_range(4.0));
        assert!(!p.is_in_range(0.99));
    }
}
