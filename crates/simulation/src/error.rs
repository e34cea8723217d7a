//! Errors raised while generating paths or driving pools.

use clmm_model_domain::PoolError;
use thiserror::Error;

/// Errors from the simulation layer.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    /// The pool rejected an operation.
    #[error(transparent)]
    Pool(#[from] PoolError),

    /// A sampling distribution could not be built from its parameters.
    #[error("Invalid distribution parameters: {0}")]
    Distribution(String),

    /// A generated price left the positive half-line.
    #[error("Price path reached a non-positive price {price} at step {step}")]
    NonPositivePrice {
        /// Step index in the path.
        step: usize,
        /// Offending price.
        price: f64,
    },

    /// Simulation parameters are unusable.
    #[error("Invalid simulation config: {0}")]
    Config(String),
}

/// Convenience alias for simulation results.
pub type Result<T> = std::result::Result<T, SimulationError>;
