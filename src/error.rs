//! Error types.

use thiserror::Error;

/// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong while setting up or running a sweep.
#[derive(Error, Debug)]
pub enum Error {
    /// A sweep bound, the step, a sample bound or the worker count is not positive, or a bound
    /// exceeds [`MAX_PARAMETER_VALUE`](crate::core::MAX_PARAMETER_VALUE).
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The number of trials per parameter value is zero.
    #[error("invalid trial count: at least one trial per parameter value is required")]
    InvalidTrialCount,

    /// A sampler returned a value outside of `[1, x]`.
    #[error("sample {sample} is outside of [1, {x}]")]
    SampleOutOfRange {
        /// Parameter value the sample was drawn for
        x: u64,
        /// The offending sample
        sample: u64,
    },

    /// A worker thread panicked before delivering its result.
    #[error("a worker thread panicked")]
    WorkerPanicked,

    /// The collector saw end-of-stream before every expected item arrived.
    #[error("incomplete collection: expected {expected} items, collected {collected}")]
    IncompleteCollection {
        /// Number of items the collector waited for
        expected: u64,
        /// Number of items that actually arrived
        collected: u64,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// (De)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
