//! Prelude module for convenient imports.
//!
//! ```rust
//! use clmm_model_simulation::prelude::*;
//! ```

// Arrivals
pub use crate::arrivals::PoissonArrivals;

// Errors
pub use crate::error::{Result, SimulationError};

// Monte Carlo
pub use crate::monte_carlo::{
    AggregateResult, MonteCarloConfig, MonteCarloReport, MonteCarloRunner, PriceRange,
};

// Position tracking
pub use crate::position_tracker::{PositionSnapshot, PositionTracker, TrackerSummary};

// Price path generators
pub use crate::price_path::{
    DeterministicPricePath, GeometricBrownianMotion, PricePathGenerator, StochasticPricePath,
};

// Statistics
pub use crate::stats::{SampleSummary, to_decimal};
