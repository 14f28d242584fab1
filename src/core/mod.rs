//! The core module
pub mod estimators;

use crate::core::estimators::{BasicEstimators, Estimators, SampleEstimators};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Duration;

/// A point of the sweep: the inclusive upper bound for sample generation.
pub type ParameterValue = u64;

/// Largest accepted parameter value.
///
/// Samples never exceed their parameter value, so a squared sample stays below $2^{64}$ and the
/// sums of up to `u64::MAX` samples and squared samples fit into a `u128` without overflow.
pub const MAX_PARAMETER_VALUE: ParameterValue = u32::MAX as ParameterValue;

/// The empirical mean of all trials performed for a single parameter value.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct TrialResult {
    x: ParameterValue,
    avg: f64,
    var: f64,
    calls: u64,
}

impl TrialResult {
    /// Constructor.
    pub const fn new(x: ParameterValue, avg: f64, var: f64, calls: u64) -> Self {
        Self { x, avg, var, calls }
    }

    pub(crate) fn from_estimators(x: ParameterValue, estimators: &SampleEstimators) -> Self {
        Self {
            x,
            avg: BasicEstimators::<f64>::mean(estimators),
            var: BasicEstimators::<f64>::var(estimators),
            calls: Estimators::<f64>::calls(estimators),
        }
    }

    /// Returns the parameter value this result belongs to.
    pub const fn x(&self) -> ParameterValue {
        self.x
    }

    /// Returns the empirical average of all samples.
    pub const fn avg(&self) -> f64 {
        self.avg
    }
}

impl BasicEstimators<f64> for TrialResult {
    fn mean(&self) -> f64 {
        self.avg
    }

    fn var(&self) -> f64 {
        self.var
    }
}

impl Estimators<f64> for TrialResult {
    fn calls(&self) -> u64 {
        self.calls
    }
}

/// The results of a sweep, ordered by ascending parameter value.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct SweepTable {
    results: Vec<TrialResult>,
}

impl SweepTable {
    /// Builds the table from results in arbitrary (completion) order.
    pub fn from_unordered(mut results: Vec<TrialResult>) -> Self {
        results.sort_unstable_by_key(TrialResult::x);
        Self { results }
    }

    /// Returns the number of parameter values in this table.
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Returns `true` if the sweep contained no parameter values.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Iterates over the results in ascending order of `x`.
    pub fn iter(&self) -> std::slice::Iter<'_, TrialResult> {
        self.results.iter()
    }

    /// Returns the result for parameter value `x`, if it was part of the sweep.
    pub fn get(&self, x: ParameterValue) -> Option<&TrialResult> {
        self.results
            .binary_search_by_key(&x, TrialResult::x)
            .ok()
            .map(|index| &self.results[index])
    }

    /// Returns all parameter values.
    pub fn xs(&self) -> Vec<ParameterValue> {
        self.results.iter().map(TrialResult::x).collect()
    }

    /// Returns all averages, in the same order as [`SweepTable::xs`].
    pub fn avgs(&self) -> Vec<f64> {
        self.results.iter().map(TrialResult::avg).collect()
    }

    /// Returns `(x, avg)` pairs, suitable for plotting.
    pub fn points(&self) -> Vec<(f64, f64)> {
        self.results
            .iter()
            .map(|r| (r.x() as f64, r.avg()))
            .collect()
    }

    /// Returns the results as a slice.
    pub fn as_slice(&self) -> &[TrialResult] {
        &self.results
    }

    /// Serializes the table into a JSON string.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Deserializes a table from a JSON string. The results are re-sorted, so a table edited by
    /// hand is still ordered.
    pub fn from_json(json: &str) -> Result<Self> {
        let table: Self = serde_json::from_str(json)?;
        Ok(Self::from_unordered(table.results))
    }

    /// Writes the table as JSON to the file at `path`, replacing its contents.
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }
}

impl<'a> IntoIterator for &'a SweepTable {
    type Item = &'a TrialResult;
    type IntoIter = std::slice::Iter<'a, TrialResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.iter()
    }
}

/// The ordered table of a sweep together with the wall-clock time it took.
#[derive(Clone, Debug)]
pub struct SweepOutcome {
    table: SweepTable,
    elapsed: Duration,
}

impl SweepOutcome {
    pub(crate) const fn new(table: SweepTable, elapsed: Duration) -> Self {
        Self { table, elapsed }
    }

    /// Returns the ordered result table.
    pub const fn table(&self) -> &SweepTable {
        &self.table
    }

    /// Returns the wall-clock time from the start of the sweep until the table was complete.
    pub const fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Destructure the outcome and return its components.
    pub fn destructure(self) -> (SweepTable, Duration) {
        (self.table, self.elapsed)
    }
}
