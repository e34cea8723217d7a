//! Price path generators.

use crate::arrivals::PoissonArrivals;
use crate::error::{Result, SimulationError};
use rand::Rng;
use rand_distr::{Distribution, StandardNormal};

/// Produces a sequence of prices starting at an initial price.
pub trait PricePathGenerator {
    fn generate<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<Vec<f64>>;
}

/// Euler discretization of `dX = X (mu dt + sigma dW)` sampled at Poisson
/// trade arrivals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StochasticPricePath {
    pub initial_price: f64,
    pub drift: f64,
    pub volatility: f64,
    pub arrivals: PoissonArrivals,
}

impl StochasticPricePath {
    pub fn new(initial_price: f64, drift: f64, volatility: f64, arrivals: PoissonArrivals) -> Self {
        Self {
            initial_price,
            drift,
            volatility,
            arrivals,
        }
    }

    /// Walks the process over the given, non-decreasing observation times.
    /// The first price is `initial_price` regardless of `times[0]`.
    pub fn path_over<R: Rng + ?Sized>(&self, times: &[f64], rng: &mut R) -> Result<Vec<f64>> {
        let mut prices = Vec::with_capacity(times.len().max(1));
        prices.push(self.initial_price);

        let mut current = self.initial_price;
        for (step, window) in times.windows(2).enumerate() {
            let dt = window[1] - window[0];
            let z: f64 = StandardNormal.sample(rng);
            current *= 1.0 + self.drift * dt + self.volatility * dt.sqrt() * z;

            if !(current > 0.0 && current.is_finite()) {
                return Err(SimulationError::NonPositivePrice {
                    step: step + 1,
                    price: current,
                });
            }
            prices.push(current);
        }

        Ok(prices)
    }
}

impl PricePathGenerator for StochasticPricePath {
    fn generate<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<Vec<f64>> {
        let times = self.arrivals.sample(rng)?;
        self.path_over(&times, rng)
    }
}

pub struct GeometricBrownianMotion {
    pub initial_price: f64,
    pub drift: f64,      // mu per unit of time
    pub volatility: f64, // sigma per unit of time
    pub time_step: f64,
    pub steps: usize,
}

impl GeometricBrownianMotion {
    pub fn new(initial_price: f64, drift: f64, volatility: f64, time_step: f64, steps: usize) -> Self {
        Self {
            initial_price,
            drift,
            volatility,
            time_step,
            steps,
        }
    }
}

impl PricePathGenerator for GeometricBrownianMotion {
    fn generate<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<Vec<f64>> {
        if self.time_step <= 0.0 || self.volatility < 0.0 {
            return Err(SimulationError::Distribution(format!(
                "time_step {} volatility {}",
                self.time_step, self.volatility
            )));
        }

        let mut prices = Vec::with_capacity(self.steps + 1);
        prices.push(self.initial_price);

        let dt = self.time_step;
        let drift_term = (self.drift - 0.5 * self.volatility.powi(2)) * dt;
        let vol_term = self.volatility * dt.sqrt();

        let mut current = self.initial_price;
        for _ in 0..self.steps {
            let z: f64 = StandardNormal.sample(rng);
            current *= (drift_term + vol_term * z).exp();
            prices.push(current);
        }

        Ok(prices)
    }
}

/// Replays a fixed list of prices.
pub struct DeterministicPricePath {
    pub prices: Vec<f64>,
}

impl PricePathGenerator for DeterministicPricePath {
    fn generate<R: Rng + ?Sized>(&mut self, _rng: &mut R) -> Result<Vec<f64>> {
        Ok(self.prices.clone())
    }
}
