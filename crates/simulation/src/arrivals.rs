//! Poisson arrival times.

use crate::error::{Result, SimulationError};
use rand::Rng;
use rand_distr::{Distribution, Exp, Poisson};

/// Trade arrivals of a homogeneous Poisson process over `[0, horizon]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoissonArrivals {
    /// Expected arrivals per unit of time (lambda).
    pub intensity: f64,
    /// Length of the observation window.
    pub horizon: f64,
}

impl PoissonArrivals {
    pub fn new(intensity: f64, horizon: f64) -> Self {
        Self { intensity, horizon }
    }

    /// Samples arrival times. The first entry is always `0.0`; the number of
    /// further arrivals is Poisson(λT) and gaps are Exp(λ).
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Vec<f64>> {
        let count_dist = Poisson::new(self.intensity * self.horizon)
            .map_err(|e| SimulationError::Distribution(e.to_string()))?;
        let gap_dist =
            Exp::new(self.intensity).map_err(|e| SimulationError::Distribution(e.to_string()))?;

        let count = count_dist.sample(rng) as usize;
        let mut times = Vec::with_capacity(count + 1);
        times.push(0.0);

        let mut t = 0.0;
        for _ in 0..count {
            t += gap_dist.sample(rng);
            times.push(t);
        }
        Ok(times)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_arrivals_start_at_zero_and_increase() {
        let mut rng = StdRng::seed_from_u64(7);
        let times = PoissonArrivals::new(50.0, 2.0).sample(&mut rng).unwrap();

        assert_eq!(times[0], 0.0);
        assert!(times.windows(2).all(|w| w[1] >= w[0]));
        // E[N] = 100, a seeded draw lands well inside this band.
        assert!(times.len() > 50 && times.len() < 160);
    }

    #[test]
    fn test_invalid_intensity() {
        let mut rng = StdRng::seed_from_u64(7);
        let result = PoissonArrivals::new(0.0, 2.0).sample(&mut rng);
        assert!(matches!(result, Err(SimulationError::Distribution(_))));
    }
}
