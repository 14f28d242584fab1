//! Implementation of different callback functions.
use crate::core::estimators::{BasicEstimators, Estimators};
use crate::core::TrialResult;

/// Trait for implementing callbacks that observe the progress of a sweep.
pub trait Callback {
    /// This method is called by the collector each time the result for a parameter value arrived.
    /// Results arrive in completion order, not in the order of the parameter values; `completed`
    /// counts the results collected so far, including `result`, out of `total`.
    fn print(&self, result: &TrialResult, completed: usize, total: usize);
}

/// A callback function that does nothing
pub struct SinkCallback {}

impl Callback for SinkCallback {
    fn print(&self, _: &TrialResult, _: usize, _: usize) {}
}

/// A callback function that logs every collected result
pub struct SimpleCallback {}

impl Callback for SimpleCallback {
    fn print(&self, result: &TrialResult, completed: usize, total: usize) {
        tracing::info!(
            completed,
            total,
            x = result.x(),
            calls = result.calls(),
            "E={} \u{b1} {}",
            result.mean(),
            result.std()
        );
    }
}
