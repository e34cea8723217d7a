//! Monte Carlo evaluation of liquidity ranges.
//!
//! Every iteration builds a fresh pool, opens one position per configured
//! range with the same deposit, drives the pool along an independent
//! stochastic price path and reads each position's impermanent loss, total
//! return and withdrawn fees. Iterations whose path runs into a tick without
//! liquidity are counted as failed and excluded from the aggregates.

use crate::arrivals::PoissonArrivals;
use crate::error::{Result, SimulationError};
use crate::price_path::{PricePathGenerator, StochasticPricePath};
use crate::stats::SampleSummary;
use clmm_model_domain::{Pool, PoolConfig, PoolError, PositionId};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// A price interval to open a position over.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min_price: f64,
    pub max_price: f64,
}

impl PriceRange {
    pub fn new(min_price: f64, max_price: f64) -> Self {
        Self {
            min_price,
            max_price,
        }
    }
}

/// Parameters of a Monte Carlo run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonteCarloConfig {
    /// Pool every iteration starts from; its initial price seeds the path.
    pub pool: PoolConfig,
    /// Ranges compared against each other.
    pub ranges: Vec<PriceRange>,
    /// Deposit per position, in token1.
    pub portfolio_value: f64,
    /// Length of each path in time units.
    pub horizon: f64,
    /// Trade arrivals per time unit.
    pub intensity: f64,
    /// Drift per time unit.
    pub drift: f64,
    /// Volatility per square-root time unit.
    pub volatility: f64,
    pub iterations: usize,
    /// Fixed RNG seed for reproducible runs.
    pub seed: Option<u64>,
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        Self {
            pool: PoolConfig::new(3000.0)
                .with_tick_space(2)
                .with_fee(0.003)
                .with_tick_size(1.001),
            ranges: vec![
                PriceRange::new(2800.0, 3000.0),
                PriceRange::new(2500.0, 3500.0),
                PriceRange::new(1000.0, 5000.0),
            ],
            portfolio_value: 100.0,
            horizon: 24.0,
            intensity: 222.0,
            drift: 0.00005,
            volatility: 0.0007,
            iterations: 3000,
            seed: None,
        }
    }
}

impl MonteCarloConfig {
    #[must_use]
    pub fn with_pool(mut self, pool: PoolConfig) -> Self {
        self.pool = pool;
        self
    }

    #[must_use]
    pub fn with_ranges(mut self, ranges: Vec<PriceRange>) -> Self {
        self.ranges = ranges;
        self
    }

    #[must_use]
    pub fn with_portfolio_value(mut self, value: f64) -> Self {
        self.portfolio_value = value;
        self
    }

    /// Sets the horizon and arrival intensity of each path.
    #[must_use]
    pub fn with_arrivals(mut self, horizon: f64, intensity: f64) -> Self {
        self.horizon = horizon;
        self.intensity = intensity;
        self
    }

    #[must_use]
    pub fn with_dynamics(mut self, drift: f64, volatility: f64) -> Self {
        self.drift = drift;
        self.volatility = volatility;
        self
    }

    #[must_use]
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.pool.validate()?;
        if self.iterations == 0 {
            return Err(SimulationError::Config("iterations must be positive".into()));
        }
        if self.ranges.is_empty() {
            return Err(SimulationError::Config("at least one range is required".into()));
        }
        if !(self.portfolio_value > 0.0 && self.portfolio_value.is_finite()) {
            return Err(SimulationError::Config(format!(
                "portfolio value must be positive, got {}",
                self.portfolio_value
            )));
        }
        if self.horizon <= 0.0 || self.intensity <= 0.0 || self.volatility < 0.0 {
            return Err(SimulationError::Config(format!(
                "horizon {} intensity {} volatility {}",
                self.horizon, self.intensity, self.volatility
            )));
        }
        Ok(())
    }
}

/// Per-position readings at the end of one path.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Outcome {
    il: f64,
    total_return: f64,
    fees: f64,
}

/// Aggregated results for one range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateResult {
    pub range: PriceRange,
    /// Impermanent loss ratio.
    pub il: SampleSummary,
    /// `(il + fees) / hold_value`.
    pub total_return: SampleSummary,
    /// Withdrawn fees in token1.
    pub fees: SampleSummary,
    /// Successful iterations behind these figures.
    pub samples: usize,
}

/// Outcome of a full run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloReport {
    pub iterations: usize,
    /// Iterations dropped because the path could not be followed.
    pub failed: usize,
    pub results: Vec<AggregateResult>,
}

pub struct MonteCarloRunner {
    pub config: MonteCarloConfig,
}

impl MonteCarloRunner {
    pub fn new(config: MonteCarloConfig) -> Self {
        Self { config }
    }

    pub fn run(&self) -> Result<MonteCarloReport> {
        self.config.validate()?;
        let config = &self.config;

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let mut process = StochasticPricePath::new(
            config.pool.initial_price,
            config.drift,
            config.volatility,
            PoissonArrivals::new(config.intensity, config.horizon),
        );

        info!(
            iterations = config.iterations,
            ranges = config.ranges.len(),
            initial_price = config.pool.initial_price,
            "Starting Monte Carlo run"
        );

        let mut outcomes: Vec<Vec<Outcome>> = vec![Vec::with_capacity(config.iterations); config.ranges.len()];
        let mut failed = 0;

        for iteration in 0..config.iterations {
            match self.run_once(&mut process, &mut rng) {
                Ok(per_range) => {
                    for (samples, outcome) in outcomes.iter_mut().zip(per_range) {
                        samples.push(outcome);
                    }
                }
                Err(
                    e @ (SimulationError::Pool(PoolError::LiquidityExhausted { .. })
                    | SimulationError::NonPositivePrice { .. }),
                ) => {
                    debug!(iteration, error = %e, "Iteration dropped");
                    failed += 1;
                }
                Err(e) => return Err(e),
            }
        }

        let results = config
            .ranges
            .iter()
            .zip(&outcomes)
            .map(|(range, samples)| aggregate(*range, samples))
            .collect();

        info!(
            iterations = config.iterations,
            failed, "Monte Carlo run finished"
        );

        Ok(MonteCarloReport {
            iterations: config.iterations,
            failed,
            results,
        })
    }

    fn run_once(&self, process: &mut StochasticPricePath, rng: &mut StdRng) -> Result<Vec<Outcome>> {
        let config = &self.config;
        let mut pool = Pool::new(config.pool.clone())?;
        let ids = config
            .ranges
            .iter()
            .map(|r| pool.open_position(r.min_price, r.max_price, config.portfolio_value))
            .collect::<std::result::Result<Vec<PositionId>, PoolError>>()?;

        let path = process.generate(rng)?;
        for &price in path.iter().skip(1) {
            pool.update_price(price)?;
        }

        let mut outcomes = Vec::with_capacity(ids.len());
        for id in ids {
            let mut position = pool.position_mut(id)?;
            let il = position.calculate_il();
            let total_return = position.calculate_total_return();
            outcomes.push(Outcome {
                il,
                total_return,
                fees: position.fees_withdraw(),
            });
        }
        Ok(outcomes)
    }
}

fn aggregate(range: PriceRange, samples: &[Outcome]) -> AggregateResult {
    let il: Vec<f64> = samples.iter().map(|o| o.il).collect();
    let total_return: Vec<f64> = samples.iter().map(|o| o.total_return).collect();
    let fees: Vec<f64> = samples.iter().map(|o| o.fees).collect();

    AggregateResult {
        range,
        il: SampleSummary::from_samples(&il),
        total_return: SampleSummary::from_samples(&total_return),
        fees: SampleSummary::from_samples(&fees),
        samples: samples.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn short_config() -> MonteCarloConfig {
        MonteCarloConfig::default()
            .with_arrivals(1.0, 222.0)
            .with_iterations(20)
            .with_seed(7)
    }

    #[test]
    fn test_default_config_matches_reference_setup() {
        let config = MonteCarloConfig::default();
        assert_eq!(config.pool.initial_price, 3000.0);
        assert_eq!(config.pool.tick_space, 2);
        assert_eq!(config.ranges.len(), 3);
        assert_eq!(config.iterations, 3000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let config = MonteCarloConfig::default().with_iterations(0);
        assert!(matches!(config.validate(), Err(SimulationError::Config(_))));

        let config = MonteCarloConfig::default().with_ranges(vec![]);
        assert!(matches!(config.validate(), Err(SimulationError::Config(_))));

        let config = MonteCarloConfig::default().with_pool(PoolConfig::new(3000.0).with_fee(1.0));
        assert!(matches!(config.validate(), Err(SimulationError::Pool(_))));
    }

    #[test]
    fn test_run_aggregates_every_range() {
        let report = MonteCarloRunner::new(short_config()).run().unwrap();

        assert_eq!(report.iterations, 20);
        assert_eq!(report.failed, 0);
        assert_eq!(report.results.len(), 3);
        for result in &report.results {
            assert_eq!(result.samples, 20);
            // Fees never go negative and IL is never a gain.
            assert!(result.fees.var_95 >= Decimal::ZERO);
            assert!(result.il.mean <= Decimal::ZERO);
        }

        // The wide range earns less per unit deposited than the middle one.
        assert!(report.results[2].fees.mean < report.results[1].fees.mean);
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let first = MonteCarloRunner::new(short_config().with_iterations(5)).run().unwrap();
        let second = MonteCarloRunner::new(short_config().with_iterations(5)).run().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_exhausted_paths_are_counted_as_failures() {
        let config = short_config()
            .with_ranges(vec![PriceRange::new(2990.0, 3010.0)])
            .with_dynamics(0.0, 0.05);
        let report = MonteCarloRunner::new(config).run().unwrap();

        assert!(report.failed > 0);
        assert_eq!(report.results[0].samples + report.failed, 20);
        if report.results[0].samples == 0 {
            assert_eq!(report.results[0].il.mean, dec!(0));
        }
    }

    #[test]
    fn test_invalid_range_is_fatal() {
        let config = short_config().with_ranges(vec![PriceRange::new(3100.0, 2900.0)]);
        let result = MonteCarloRunner::new(config).run();
        assert!(matches!(
            result,
            Err(SimulationError::Pool(PoolError::InvalidRange { .. }))
        ));
    }
}
