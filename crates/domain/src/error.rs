//! Error types for the pool model.
//!
//! Every fallible pool operation returns [`PoolError`]. A failed call leaves
//! the pool exactly as it was before the call.

use crate::position::PositionId;
use thiserror::Error;

/// Errors raised by pool configuration, position opening and price movement.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PoolError {
    /// The pool parameters are unusable (zero tick spacing, bad fee, ...).
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// The requested price range is inverted or collapses to zero width.
    #[error("Invalid price range [{min_price}, {max_price}]")]
    InvalidRange {
        /// Requested lower price.
        min_price: f64,
        /// Requested upper price.
        max_price: f64,
    },

    /// A price that is not strictly positive and finite.
    #[error("Price must be positive and finite, got {0}")]
    InvalidPrice(f64),

    /// A deposit value or swap amount that cannot be processed.
    #[error("Invalid amount: {0}")]
    InvalidAmount(f64),

    /// A tick on the walk has no active liquidity.
    #[error("Liquidity exhausted at tick {tick}")]
    LiquidityExhausted {
        /// The tick that could not be crossed.
        tick: i32,
    },

    /// The handle was not issued by this pool.
    #[error("Unknown position {0}")]
    UnknownPosition(PositionId),
}

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, PoolError>;
