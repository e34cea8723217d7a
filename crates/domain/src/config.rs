//! Pool configuration.

use crate::error::{PoolError, Result};
use serde::{Deserialize, Serialize};

/// What a price update does when it has to cross a tick without liquidity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZeroLiquidityPolicy {
    /// Fail the update with `LiquidityExhausted`.
    #[default]
    Reject,
    /// Move through the empty tick; nothing is realized and no fee is paid.
    PassThrough,
}

/// Parameters of a pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Only multiples of this value are valid tick indices.
    pub tick_space: i32,
    /// Proportional fee rate in `[0, 1)`.
    pub fee: f64,
    /// Multiplicative price step between adjacent ticks.
    pub tick_size: f64,
    /// Starting price of the pool.
    pub initial_price: f64,
    /// Behavior of `update_price` on empty ticks. Swaps always reject.
    pub zero_liquidity: ZeroLiquidityPolicy,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            tick_space: 10,
            fee: 0.003, // 0.3%
            tick_size: 1.0001,
            initial_price: 3000.0,
            zero_liquidity: ZeroLiquidityPolicy::Reject,
        }
    }
}

impl PoolConfig {
    /// Creates a config with the given price and default parameters.
    #[must_use]
    pub fn new(initial_price: f64) -> Self {
        Self {
            initial_price,
            ..Self::default()
        }
    }

    /// Sets the tick spacing.
    #[must_use]
    pub fn with_tick_space(mut self, tick_space: i32) -> Self {
        self.tick_space = tick_space;
        self
    }

    /// Sets the fee rate.
    #[must_use]
    pub fn with_fee(mut self, fee: f64) -> Self {
        self.fee = fee;
        self
    }

    /// Sets the tick size.
    #[must_use]
    pub fn with_tick_size(mut self, tick_size: f64) -> Self {
        self.tick_size = tick_size;
        self
    }

    /// Sets the zero-liquidity policy.
    #[must_use]
    pub fn with_zero_liquidity(mut self, policy: ZeroLiquidityPolicy) -> Self {
        self.zero_liquidity = policy;
        self
    }

    /// Checks every parameter against its allowed domain.
    pub fn validate(&self) -> Result<()> {
        if self.tick_space <= 0 {
            return Err(PoolError::Configuration(format!(
                "tick_space must be positive, got {}",
                self.tick_space
            )));
        }
        if !(0.0..1.0).contains(&self.fee) {
            return Err(PoolError::Configuration(format!(
                "fee must be in [0, 1), got {}",
                self.fee
            )));
        }
        if !self.tick_size.is_finite() || self.tick_size <= 1.0 {
            return Err(PoolError::Configuration(format!(
                "tick_size must be greater than 1, got {}",
                self.tick_size
            )));
        }
        if !self.initial_price.is_finite() || self.initial_price <= 0.0 {
            return Err(PoolError::InvalidPrice(self.initial_price));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(PoolConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_parameters() {
        let zero_space = PoolConfig::new(15.0).with_tick_space(0);
        assert!(matches!(
            zero_space.validate(),
            Err(PoolError::Configuration(_))
        ));

        let full_fee = PoolConfig::new(15.0).with_fee(1.0);
        assert!(matches!(full_fee.validate(), Err(PoolError::Configuration(_))));

        let flat_ticks = PoolConfig::new(15.0).with_tick_size(1.0);
        assert!(matches!(
            flat_ticks.validate(),
            Err(PoolError::Configuration(_))
        ));

        assert_eq!(
            PoolConfig::new(-1.0).validate(),
            Err(PoolError::InvalidPrice(-1.0))
        );
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let raw = r#"{"tick_space": 2, "zero_liquidity": "pass_through"}"#;
        let cfg: PoolConfig = serde_json::from_str(raw).unwrap();
        assert_eq!(cfg.tick_space, 2);
        assert_eq!(cfg.zero_liquidity, ZeroLiquidityPolicy::PassThrough);
        assert_eq!(cfg.fee, 0.003);
        assert_eq!(cfg.initial_price, 3000.0);
    }
}
