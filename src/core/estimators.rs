//! This module contains everything related to estimators.
use num_traits::{Float, FromPrimitive};
use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign};

/// Basic estimators, like the mean, variance, and the standard deviation.
pub trait BasicEstimators<T: Float> {
    /// Returns the mean value.
    fn mean(&self) -> T;

    /// Returns the variance of the mean, $V$.
    fn var(&self) -> T;

    /// Returns the standard deviation, $\sigma = \sqrt{V}$.
    fn std(&self) -> T {
        self.var().sqrt()
    }
}

/// More estimators.
pub trait Estimators<T: Float>: BasicEstimators<T> {
    /// Returns the number of samples, $N$, that entered the estimate.
    fn calls(&self) -> u64;
}

/// Exact accumulator for integer samples.
///
/// Sums are kept as integers, so merging partial accumulators gives the same result in whatever
/// order the partials arrive.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq, Serialize)]
pub struct SampleEstimators {
    sum: u128,
    sumsq: u128,
    calls: u64,
}

impl SampleEstimators {
    /// Adds a single sample. The sums are exact as long as every sample is at most
    /// [`MAX_PARAMETER_VALUE`](crate::core::MAX_PARAMETER_VALUE).
    pub fn update(&mut self, sample: u64) {
        let sample = u128::from(sample);
        self.calls += 1;
        self.sum += sample;
        self.sumsq += sample * sample;
    }

    /// Returns the sum of all samples.
    pub const fn sum(&self) -> u128 {
        self.sum
    }

    /// Returns the sum of all squared samples.
    pub const fn sumsq(&self) -> u128 {
        self.sumsq
    }
}

impl Add for SampleEstimators {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            sum: self.sum + other.sum,
            sumsq: self.sumsq + other.sumsq,
            calls: self.calls + other.calls,
        }
    }
}

impl AddAssign for SampleEstimators {
    fn add_assign(&mut self, other: Self) {
        self.sum += other.sum;
        self.sumsq += other.sumsq;
        self.calls += other.calls;
    }
}

impl<T> BasicEstimators<T> for SampleEstimators
where
    T: Float + FromPrimitive,
{
    fn mean(&self) -> T {
        let sum = T::from_u128(self.sum).unwrap_or_else(T::nan);
        let calls = T::from_u64(self.calls).unwrap_or_else(T::nan);
        sum / calls
    }

    fn var(&self) -> T {
        if self.calls < 2 {
            return T::zero();
        }

        let sum = T::from_u128(self.sum).unwrap_or_else(T::nan);
        let sumsq = T::from_u128(self.sumsq).unwrap_or_else(T::nan);
        let calls = T::from_u64(self.calls).unwrap_or_else(T::nan);
        (sumsq - sum * sum / calls) / calls / (calls - T::one())
    }
}

impl<T> Estimators<T> for SampleEstimators
where
    T: Float + FromPrimitive,
{
    fn calls(&self) -> u64 {
        self.calls
    }
}
