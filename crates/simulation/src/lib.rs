//! Stochastic simulation on top of the pool model.
//!
//! Generates trade-arrival driven price paths, follows them with a
//! [`Pool`](clmm_model_domain::Pool) and aggregates position outcomes over
//! many independent runs.

pub mod arrivals;
pub mod error;
pub mod monte_carlo;
pub mod position_tracker;
pub mod prelude;
pub mod price_path;
pub mod stats;

pub use error::{Result, SimulationError};
