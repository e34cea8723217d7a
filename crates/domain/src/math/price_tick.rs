//! Conversions between prices and spaced tick indices.

use crate::error::{PoolError, Result};

/// Slack applied before flooring `log(price) / log(tick_size)`, so that a
/// price produced by `tick_to_price(t)` maps back to `t` despite f64 noise.
const TICK_EPSILON: f64 = 1e-7;

/// Rounds `value` down to a multiple of `divisor`.
///
/// Integer division truncates toward zero, so negative values snap up
/// toward zero (`-15` with divisor `10` gives `-10`).
pub fn round_to_spacing(value: i32, divisor: i32) -> Result<i32> {
    if divisor == 0 {
        return Err(PoolError::Configuration(
            "Tick spacing cannot be zero".to_string(),
        ));
    }
    Ok((value / divisor) * divisor)
}

/// Price/tick conversions for a pool with a given tick size and spacing.
///
/// P = tick_size ^ tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickMath {
    tick_size: f64,
    tick_space: i32,
}

impl TickMath {
    /// Creates the conversion helper. `tick_size` must exceed 1 and
    /// `tick_space` must be positive.
    pub fn new(tick_size: f64, tick_space: i32) -> Result<Self> {
        if tick_space <= 0 {
            return Err(PoolError::Configuration(format!(
                "tick_space must be positive, got {tick_space}"
            )));
        }
        if !tick_size.is_finite() || tick_size <= 1.0 {
            return Err(PoolError::Configuration(format!(
                "tick_size must be greater than 1, got {tick_size}"
            )));
        }
        Ok(Self {
            tick_size,
            tick_space,
        })
    }

    /// Multiplicative step between adjacent ticks.
    pub fn tick_size(&self) -> f64 {
        self.tick_size
    }

    /// Tick spacing.
    pub fn tick_space(&self) -> i32 {
        self.tick_space
    }

    /// Returns the spaced tick for `price`: `floor(log_tick_size(price))`
    /// truncated to a multiple of the spacing.
    pub fn price_to_tick(&self, price: f64) -> Result<i32> {
        if !price.is_finite() || price <= 0.0 {
            return Err(PoolError::InvalidPrice(price));
        }
        let raw = (price.ln() / self.tick_size.ln() + TICK_EPSILON).floor();
        if raw < f64::from(i32::MIN) || raw > f64::from(i32::MAX) {
            return Err(PoolError::InvalidPrice(price));
        }
        round_to_spacing(raw as i32, self.tick_space)
    }

    /// Returns the price at `tick`.
    pub fn tick_to_price(&self, tick: i32) -> f64 {
        self.tick_size.powf(f64::from(tick))
    }

    /// Returns the square root of the price at `tick`. Derived from
    /// [`tick_to_price`](Self::tick_to_price) so it agrees bit for bit with
    /// `price.sqrt()` of an on-tick price.
    pub fn tick_to_sqrt_price(&self, tick: i32) -> f64 {
        self.tick_to_price(tick).sqrt()
    }

    /// Whether two sqrt prices are closer than the tolerance `price_to_tick`
    /// applies, i.e. indistinguishable on the tick grid.
    pub fn within_tick_tolerance(&self, sqrt_price_a: f64, sqrt_price_b: f64) -> bool {
        (sqrt_price_a / sqrt_price_b).ln().abs() <= TICK_EPSILON * self.tick_size.ln()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_to_price() {
        let math = TickMath::new(1.0001, 10).unwrap();

        // Tick 0 -> Price 1
        assert_eq!(math.tick_to_price(0), 1.0);

        // Tick 100 -> 1.0001^100 ~= 1.010049
        let diff = (math.tick_to_price(100) - 1.01004966).abs();
        assert!(diff < 0.000001);

        let sqrt = math.tick_to_sqrt_price(100);
        assert!((sqrt * sqrt - math.tick_to_price(100)).abs() < 1e-12);
    }

    #[test]
    fn test_price_to_tick() {
        let math = TickMath::new(1.0001, 10).unwrap();
        assert_eq!(math.price_to_tick(1.0).unwrap(), 0);

        // log_1.0001(13) ~= 25650.7
        assert_eq!(math.price_to_tick(13.0).unwrap(), 25650);

        // Exact tick prices map back to themselves.
        for tick in [-200, -10, 10, 25650, 40000] {
            assert_eq!(math.price_to_tick(math.tick_to_price(tick)).unwrap(), tick);
        }
    }

    #[test]
    fn test_negative_quotient_truncates_toward_zero() {
        let math = TickMath::new(1.01, 10).unwrap();
        // log_1.01(0.86) ~= -15.16 -> floor -16 -> truncated to -10
        assert_eq!(math.price_to_tick(0.86).unwrap(), -10);
        assert_eq!(round_to_spacing(-16, 10).unwrap(), -10);
        assert_eq!(round_to_spacing(16, 10).unwrap(), 10);
    }

    #[test]
    fn test_sqrt_price_matches_sqrt_of_tick_price() {
        let math = TickMath::new(1.0001, 10).unwrap();
        for tick in [-25650, -10, 0, 10, 25650] {
            assert_eq!(math.tick_to_sqrt_price(tick), math.tick_to_price(tick).sqrt());
        }
    }

    #[test]
    fn test_tick_tolerance() {
        let math = TickMath::new(1.0001, 10).unwrap();
        let s = math.tick_to_sqrt_price(25650);
        assert!(math.within_tick_tolerance(s, s));
        assert!(math.within_tick_tolerance(s * (1.0 + 1e-13), s));
        assert!(!math.within_tick_tolerance(s * (1.0 + 1e-6), s));
    }

    #[test]
    fn test_zero_divisor_is_configuration_error() {
        assert!(matches!(
            round_to_spacing(5, 0),
            Err(PoolError::Configuration(_))
        ));
        assert!(TickMath::new(1.0001, 0).is_err());
        assert!(TickMath::new(0.5, 10).is_err());
    }

    #[test]
    fn test_invalid_prices() {
        let math = TickMath::new(1.0001, 10).unwrap();
        assert_eq!(math.price_to_tick(0.0), Err(PoolError::InvalidPrice(0.0)));
        assert!(math.price_to_tick(f64::NAN).is_err());
        assert!(math.price_to_tick(-3.0).is_err());
    }
}
