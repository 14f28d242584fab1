//! Configuration of a sweep.

use crate::core::{ParameterValue, MAX_PARAMETER_VALUE};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Seed of the random number generators if none is given.
pub const DEFAULT_SEED: u128 = 0xcafe_f00d_d15e_a5e5;

fn default_workers() -> usize {
    num_cpus::get()
}

const fn default_seed() -> u128 {
    DEFAULT_SEED
}

/// Everything the orchestrator needs to know to run a sweep.
///
/// The sweep visits the parameter values `step`, `2 * step`, ... up to and including the largest
/// multiple of `step` that does not exceed `max`. For each of them `trials_per_point` samples are
/// drawn and averaged. `workers` bounds the number of threads used, and `seed` fixes the random
/// numbers: two sweeps with equal configurations produce identical tables, independently of the
/// number of workers.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct SweepConfig {
    /// Spacing between sweep points, and the first point.
    pub step: u64,
    /// Upper bound (inclusive) of the sweep.
    pub max: u64,
    /// Number of samples averaged per point.
    pub trials_per_point: u64,
    /// Number of worker threads.
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Seed of the random number generators.
    #[serde(default = "default_seed")]
    pub seed: u128,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self::new(20, 8_000, 100_000)
    }
}

impl SweepConfig {
    /// Constructor; uses one worker per logical core and [`DEFAULT_SEED`].
    pub fn new(step: u64, max: u64, trials_per_point: u64) -> Self {
        Self {
            step,
            max,
            trials_per_point,
            workers: default_workers(),
            seed: DEFAULT_SEED,
        }
    }

    /// Sets the number of worker threads.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Sets the seed of the random number generators.
    pub fn with_seed(mut self, seed: u128) -> Self {
        self.seed = seed;
        self
    }

    /// Checks that a sweep can be started with this configuration.
    ///
    /// A `max` smaller than `step` is valid and describes an empty sweep.
    pub fn validate(&self) -> Result<()> {
        if self.step == 0 {
            return Err(Error::InvalidParameter("step must be positive".to_string()));
        }

        if self.max == 0 {
            return Err(Error::InvalidParameter("max must be positive".to_string()));
        }

        if self.max > MAX_PARAMETER_VALUE {
            return Err(Error::InvalidParameter(format!(
                "max must not exceed {}, got {}",
                MAX_PARAMETER_VALUE, self.max
            )));
        }

        if self.trials_per_point == 0 {
            return Err(Error::InvalidTrialCount);
        }

        if self.workers == 0 {
            return Err(Error::InvalidParameter(
                "at least one worker is required".to_string(),
            ));
        }

        Ok(())
    }

    /// Returns the number of parameter values in the sweep.
    pub fn point_count(&self) -> u64 {
        if self.step == 0 {
            0
        } else {
            self.max / self.step
        }
    }

    /// Returns the parameter values of the sweep in ascending order.
    pub fn parameter_values(&self) -> Vec<ParameterValue> {
        (1..=self.point_count()).map(|i| i * self.step).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameter_values() {
        let config = SweepConfig::new(20, 100, 1_000);

        assert_eq!(config.point_count(), 5);
        assert_eq!(config.parameter_values(), vec![20, 40, 60, 80, 100]);
    }

    #[test]
    fn test_parameter_values_max_not_multiple_of_step() {
        let config = SweepConfig::new(20, 119, 1);

        assert_eq!(config.parameter_values(), vec![20, 40, 60, 80, 100]);
    }

    #[test]
    fn test_empty_sweep_is_valid() {
        let config = SweepConfig::new(20, 10, 1_000);

        assert!(config.validate().is_ok());
        assert!(config.parameter_values().is_empty());
    }

    #[test]
    fn test_validate() {
        assert!(matches!(
            SweepConfig::new(0, 100, 10).validate(),
            Err(Error::InvalidParameter(_))
        ));
        assert!(matches!(
            SweepConfig::new(20, 0, 10).validate(),
            Err(Error::InvalidParameter(_))
        ));
        assert!(matches!(
            SweepConfig::new(20, 100, 0).validate(),
            Err(Error::InvalidTrialCount)
        ));
        assert!(matches!(
            SweepConfig::new(20, 100, 10).with_workers(0).validate(),
            Err(Error::InvalidParameter(_))
        ));
        assert_eq!(SweepConfig::new(0, 100, 10).point_count(), 0);
    }

    #[test]
    fn test_validate_upper_bound() {
        assert!(SweepConfig::new(1_000, MAX_PARAMETER_VALUE, 10)
            .validate()
            .is_ok());
        assert!(matches!(
            SweepConfig::new(u64::MAX, u64::MAX, 10).validate(),
            Err(Error::InvalidParameter(_))
        ));
        assert!(matches!(
            SweepConfig::new(20, MAX_PARAMETER_VALUE + 1, 10).validate(),
            Err(Error::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: SweepConfig =
            serde_json::from_str(r#"{"step": 5, "max": 50, "trials_per_point": 100}"#).unwrap();

        assert_eq!(config, SweepConfig::new(5, 50, 100));
        assert_eq!(config.seed, DEFAULT_SEED);
    }

    #[test]
    fn test_default() {
        let config = SweepConfig::default().with_workers(3).with_seed(7);

        assert_eq!(config.point_count(), 400);
        assert_eq!(config.trials_per_point, 100_000);
        assert_eq!(config.workers, 3);
        assert_eq!(config.seed, 7);
    }
}
