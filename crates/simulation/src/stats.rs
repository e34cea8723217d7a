//! Sample statistics over simulation outputs.

use rust_decimal::Decimal;
use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};

/// Converts a model float to `Decimal`, mapping non-representable values to zero.
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or(Decimal::ZERO)
}

/// Mean, median and 5th percentile of a sample.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SampleSummary {
    pub mean: Decimal,
    pub median: Decimal,
    /// Value at the 5th percentile.
    pub var_95: Decimal,
}

impl SampleSummary {
    /// Summarizes `samples`. An empty sample yields all zeros.
    pub fn from_samples(samples: &[f64]) -> Self {
        if samples.is_empty() {
            return Self::default();
        }

        let mut values: Vec<Decimal> = samples.iter().copied().map(to_decimal).collect();
        let count = Decimal::from(values.len());
        let mean = values.iter().sum::<Decimal>() / count;

        values.sort();
        let median = values[values.len() / 2];
        let var_idx = (values.len() as f64 * 0.05).floor() as usize;
        let var_95 = values[var_idx.min(values.len() - 1)];

        Self {
            mean,
            median,
            var_95,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_distribution_from_samples() {
        let d = SampleSummary::from_samples(&[4.0, 1.0, 3.0, 2.0]);
        assert_eq!(d.mean, dec!(2.5));
        assert_eq!(d.median, dec!(3));
        assert_eq!(d.var_95, dec!(1));
    }

    #[test]
    fn test_var_index_over_forty_samples() {
        let samples: Vec<f64> = (1..=40).map(f64::from).collect();
        let d = SampleSummary::from_samples(&samples);
        // floor(40 * 0.05) = 2, third smallest
        assert_eq!(d.var_95, dec!(3));
    }

    #[test]
    fn test_empty_sample() {
        assert_eq!(SampleSummary::from_samples(&[]), SampleSummary::default());
    }

    #[test]
    fn test_non_finite_maps_to_zero() {
        assert_eq!(to_decimal(f64::NAN), Decimal::ZERO);
    }
}
