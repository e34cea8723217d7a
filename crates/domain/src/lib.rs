//! # Tick-range concentrated liquidity pool model
//!
//! An in-memory analytic model of a concentrated liquidity AMM. A [`Pool`]
//! keeps a tick-indexed ledger of aggregate liquidity, positions supply
//! liquidity over bounded price ranges, and every price move walks the
//! ledger tick by tick, realizing token flows and splitting the fee carved
//! out of each segment among the positions in range.
//!
//! ```
//! use clmm_model_domain::{PoolConfig, Pool};
//!
//! let mut pool = Pool::new(PoolConfig::new(15.0)).unwrap();
//! let id = pool.open_position(13.0, 17.0, 100.0).unwrap();
//! pool.update_price(16.0).unwrap();
//!
//! let mut position = pool.position_mut(id).unwrap();
//! assert!(position.calculate_il() < 0.0);
//! assert!(position.fees().y > 0.0);
//! ```

pub mod config;
pub mod error;
pub mod fees;
pub mod ledger;
pub mod math;
pub mod metrics;
pub mod pool;
pub mod position;
pub mod walk;

#[cfg(test)]
mod proptest_properties;

pub use config::{PoolConfig, ZeroLiquidityPolicy};
pub use error::{PoolError, Result};
pub use fees::FeeVector;
pub use ledger::TickLedger;
pub use math::price_tick::TickMath;
pub use pool::{Pool, PoolId, SwapOutcome, create_pool};
pub use position::{Position, PositionHandle, PositionId};
pub use walk::Direction;
