#![warn(clippy::all, clippy::cargo, clippy::nursery, clippy::pedantic)]
#![warn(missing_docs)]

//! The crate `mcsweep` runs parameter sweeps of Monte Carlo experiments. For every value $x$ of a
//! control parameter, taken from the range `step, 2 * step, ..., max`, it draws a large number $T$
//! of independent random samples and computes their empirical average. The result is a table that
//! maps each parameter value to its average, ordered by parameter value, together with the
//! wall-clock time the sweep took.
//!
//! # Features
//!
//! - **Two-level fan-out**. Parameter values are processed concurrently, and within each of them
//! the samples are drawn concurrently as well. Both levels use a bounded pool of scoped threads
//! that pull work from a bounded channel, so the number of threads does not grow with the number
//! of samples.
//! - **Deterministic ordering**. Results are collected in whatever order they complete and are
//! sorted by parameter value afterwards.
//! - **Reproducibility**. Samples are drawn in fixed-size chunks, each with its own random number
//! generator whose stream is derived from the seed, the parameter value and the index of the
//! chunk. Sums of samples are kept as integers. Consequently a sweep only depends on its
//! configuration, not on the number of threads it was run with.
//! - **Fail fast**. Every parameter is checked before a single thread is started.
//!
//! # How do I get started?
//!
//! ```no_run
//! use mcsweep::{sweep, SimpleCallback, SweepConfig, UniformDraw};
//!
//! let config = SweepConfig::new(20, 100, 1_000);
//! let outcome = sweep::run(&config, &UniformDraw, &SimpleCallback {}).unwrap();
//!
//! for result in outcome.table() {
//!     println!("{}: {}", result.x(), result.avg());
//! }
//! println!("took {:?}", outcome.elapsed());
//! ```
//!
//! # What is ...?
//!
//! - a *sample* is a single random draw for a parameter value $x$; by default it is uniformly
//! distributed in $[1, x]$,
//! - a *trial* is the set of all $T$ samples drawn and averaged for a single parameter value,
//! - the *sweep* is the ordered set of parameter values for which trials are run.
//!
//! The average of a trial estimates $\mathrm{E}[X] = (x + 1) / 2$; its variance is reported as
//! the variance of the mean, $V = (\sum s^2 - (\sum s)^2 / T) / T / (T - 1)$.

pub mod callbacks;
pub mod config;
pub mod core;
pub mod error;
pub mod sampler;
pub mod sweep;
pub mod trials;

pub use crate::callbacks::{Callback, SimpleCallback, SinkCallback};
pub use crate::config::SweepConfig;
pub use crate::core::estimators::{BasicEstimators, Estimators, SampleEstimators};
pub use crate::core::*;
pub use crate::error::{Error, Result};
pub use crate::sampler::{generate, Sampler, UniformDraw};
