//! Trial aggregation: the average of many independent samples for one parameter value.
use crate::core::estimators::{Estimators, SampleEstimators};
use crate::core::{ParameterValue, TrialResult};
use crate::error::{Error, Result};
use crate::sampler::{check_bound, generate, Sampler};

use crossbeam::channel;
use crossbeam::sync::WaitGroup;
use crossbeam::thread;
use rand_pcg::Pcg64;
use std::convert::TryFrom;

/// Number of trials drawn from a single random number generator.
///
/// Every chunk owns a generator whose stream is derived from the parameter value and the index of
/// the chunk, which makes the result independent of how chunks are distributed over threads.
pub const CHUNK_SIZE: u64 = 4096;

/// Returns the number of chunks needed for `trials` trials.
pub(crate) const fn chunk_count(trials: u64) -> u64 {
    trials / CHUNK_SIZE + (trials % CHUNK_SIZE != 0) as u64
}

/// Compute the number of trials in chunk `chunk` (zero-based), given the total number of `chunks`
/// and the total number of `trials` to perform combined in all chunks.
pub(crate) fn compute_calls_for_chunk(chunk: u64, chunks: u64, trials: u64) -> u64 {
    debug_assert!(chunk < chunks);

    // the last chunk might not be full
    if chunks == chunk + 1 {
        trials - chunk * CHUNK_SIZE
    } else {
        CHUNK_SIZE
    }
}

/// Returns the random number generator for chunk `chunk` of parameter value `x`.
pub(crate) fn chunk_rng(seed: u128, x: ParameterValue, chunk: u64) -> Pcg64 {
    Pcg64::new(seed, (u128::from(x) << 64) | u128::from(chunk))
}

fn sample_chunk<S>(
    sampler: &S,
    x: ParameterValue,
    seed: u128,
    chunk: u64,
    calls: u64,
) -> Result<SampleEstimators>
where
    S: Sampler + ?Sized,
{
    let mut rng = chunk_rng(seed, x, chunk);

    (0..calls).try_fold(SampleEstimators::default(), |mut acc, _| {
        acc.update(generate(sampler, x, &mut rng)?);
        Ok(acc)
    })
}

/// Draws `trials` samples for the parameter value `x` on at most `workers` threads and returns
/// their average.
///
/// The trials are cut into chunks of [`CHUNK_SIZE`] which the workers pull from a bounded task
/// channel. Each worker sends a single partial sum over a result channel with room for one
/// message per worker, so no producer ever blocks on the collector. The result channel is closed
/// only after a [`WaitGroup`] counted every worker as finished.
pub fn run_trials<S>(
    sampler: &S,
    x: ParameterValue,
    trials: u64,
    workers: usize,
    seed: u128,
) -> Result<TrialResult>
where
    S: Sampler + ?Sized,
{
    check_bound(x)?;

    if trials == 0 {
        return Err(Error::InvalidTrialCount);
    }

    if workers == 0 {
        return Err(Error::InvalidParameter(
            "at least one worker is required".to_string(),
        ));
    }

    let chunks = chunk_count(trials);
    let n_workers = workers.min(usize::try_from(chunks).unwrap_or(usize::MAX));

    let (task_tx, task_rx) = channel::bounded::<u64>(n_workers);
    let (result_tx, result_rx) = channel::bounded::<Result<SampleEstimators>>(n_workers);
    let wg = WaitGroup::new();

    let estimators = thread::scope(|s| {
        s.spawn(move |_| {
            for chunk in 0..chunks {
                // all workers are gone, which only happens if they panicked
                if task_tx.send(chunk).is_err() {
                    break;
                }
            }
        });

        for _ in 0..n_workers {
            let task_rx = task_rx.clone();
            let result_tx = result_tx.clone();
            let wg = wg.clone();

            s.spawn(move |_| {
                // stops pulling chunks at the first invalid sample
                let partial = task_rx.iter().try_fold(
                    SampleEstimators::default(),
                    |acc, chunk| -> Result<SampleEstimators> {
                        let calls = compute_calls_for_chunk(chunk, chunks, trials);
                        Ok(acc + sample_chunk(sampler, x, seed, chunk, calls)?)
                    },
                );

                // the channel has room for every worker
                let _ = result_tx.send(partial);
                drop(wg);
            });
        }

        drop(task_rx);

        s.spawn(move |_| {
            wg.wait();
            drop(result_tx);
        });

        let mut estimators = SampleEstimators::default();
        let mut error = None;

        for partial in result_rx.iter() {
            match partial {
                Ok(partial) => estimators += partial,
                Err(err) => {
                    if error.is_none() {
                        error = Some(err);
                    }
                }
            }
        }

        error.map_or(Ok(estimators), Err)
    })
    .map_err(|_| {
        tracing::warn!(x, "worker panicked while drawing samples");
        Error::WorkerPanicked
    })??;

    let collected = Estimators::<f64>::calls(&estimators);

    if collected != trials {
        return Err(Error::IncompleteCollection {
            expected: trials,
            collected,
        });
    }

    let result = TrialResult::from_estimators(x, &estimators);
    tracing::debug!(x, trials, workers = n_workers, avg = result.avg(), "trials finished");

    Ok(result)
}
