//! The sweep orchestrator: one trial aggregation per parameter value, run concurrently, collected
//! and ordered by parameter value.
use crate::callbacks::{Callback, SinkCallback};
use crate::config::SweepConfig;
use crate::core::{ParameterValue, SweepOutcome, SweepTable, TrialResult};
use crate::error::{Error, Result};
use crate::sampler::{Sampler, UniformDraw};
use crate::trials::run_trials;

use crossbeam::channel;
use crossbeam::sync::WaitGroup;
use crossbeam::thread;
use std::time::Instant;

/// Returns how many parameter values are processed concurrently, and how many threads each of
/// them may use to draw its samples.
pub(crate) fn split_workers(workers: usize, points: usize) -> (usize, usize) {
    debug_assert!(workers > 0 && points > 0);

    let point_workers = workers.min(points);
    let workers_per_point = (workers / point_workers).max(1);

    (point_workers, workers_per_point)
}

/// Runs the sweep described by `config`, drawing samples with `sampler`. After each parameter value
/// is finished `callback` is invoked with its result.
///
/// The configuration is validated before any thread is started. Parameter values are pulled from a
/// bounded task channel by a pool of point workers, each of which runs [`run_trials`]. The results
/// come back in completion order over a channel with room for every parameter value; it is closed
/// once a [`WaitGroup`] saw every point worker finish. The collected results are sorted by
/// parameter value, and the returned outcome carries the wall-clock time of the whole sweep.
pub fn run<S, C>(config: &SweepConfig, sampler: &S, callback: &C) -> Result<SweepOutcome>
where
    S: Sampler + ?Sized,
    C: Callback + ?Sized,
{
    let start = Instant::now();

    config.validate()?;

    let xs = config.parameter_values();

    if xs.is_empty() {
        tracing::info!(
            step = config.step,
            max = config.max,
            "sweep contains no parameter values"
        );
        return Ok(SweepOutcome::new(SweepTable::default(), start.elapsed()));
    }

    let total = xs.len();
    let trials = config.trials_per_point;
    let seed = config.seed;
    let (point_workers, workers_per_point) = split_workers(config.workers, total);

    tracing::info!(
        points = total,
        trials,
        point_workers,
        workers_per_point,
        "starting sweep"
    );

    let (task_tx, task_rx) = channel::bounded::<ParameterValue>(total);
    let (result_tx, result_rx) = channel::bounded::<Result<TrialResult>>(total);
    let wg = WaitGroup::new();

    let collected = thread::scope(|s| {
        s.spawn(move |_| {
            for x in xs {
                if task_tx.send(x).is_err() {
                    break;
                }
            }
        });

        for _ in 0..point_workers {
            let task_rx = task_rx.clone();
            let result_tx = result_tx.clone();
            let wg = wg.clone();

            s.spawn(move |_| {
                for x in task_rx.iter() {
                    let result = run_trials(sampler, x, trials, workers_per_point, seed);

                    // the channel has room for every parameter value
                    if result_tx.send(result).is_err() {
                        break;
                    }
                }

                drop(wg);
            });
        }

        drop(task_rx);

        s.spawn(move |_| {
            wg.wait();
            drop(result_tx);
        });

        let mut results = Vec::with_capacity(total);
        let mut error = None;

        for result in result_rx.iter() {
            match result {
                Ok(result) => {
                    results.push(result);
                    callback.print(&result, results.len(), total);
                }
                Err(err) => {
                    if error.is_none() {
                        error = Some(err);
                    }
                }
            }
        }

        error.map_or(Ok(results), Err)
    })
    .map_err(|_| {
        tracing::warn!("point worker panicked");
        Error::WorkerPanicked
    })??;

    if collected.len() != total {
        return Err(Error::IncompleteCollection {
            expected: total as u64,
            collected: collected.len() as u64,
        });
    }

    let table = SweepTable::from_unordered(collected);
    let elapsed = start.elapsed();

    tracing::info!(points = total, trials, ?elapsed, "sweep finished");

    Ok(SweepOutcome::new(table, elapsed))
}

/// Runs a sweep over `step, 2 * step, ..., max` with `trials_per_point` uniform draws per point,
/// using one worker per logical core and the default seed.
pub fn run_uniform(step: u64, max: u64, trials_per_point: u64) -> Result<SweepOutcome> {
    run(
        &SweepConfig::new(step, max, trials_per_point),
        &UniformDraw,
        &SinkCallback {},
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::estimators::BasicEstimators;
    use crate::core::MAX_PARAMETER_VALUE;
    use rand_pcg::Pcg64;
    use std::cell::RefCell;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::Duration;

    /// Returns the parameter value itself, so every average is known exactly.
    struct Identity;

    impl Sampler for Identity {
        fn sample(&self, x: ParameterValue, _: &mut Pcg64) -> u64 {
            x
        }
    }

    #[derive(Default)]
    struct Counting {
        calls: AtomicU64,
    }

    impl Sampler for Counting {
        fn sample(&self, x: ParameterValue, rng: &mut Pcg64) -> u64 {
            self.calls.fetch_add(1, Ordering::Relaxed);
            UniformDraw.sample(x, rng)
        }
    }

    /// Panics for a single parameter value.
    struct PanicsAt(ParameterValue);

    impl Sampler for PanicsAt {
        fn sample(&self, x: ParameterValue, _: &mut Pcg64) -> u64 {
            assert_ne!(x, self.0, "sampler failure");
            x
        }
    }

    /// The smaller the parameter value, the longer a sample takes.
    struct SlowForSmall {
        max: ParameterValue,
    }

    impl Sampler for SlowForSmall {
        fn sample(&self, x: ParameterValue, _: &mut Pcg64) -> u64 {
            std::thread::sleep(Duration::from_millis((self.max - x) * 2));
            x
        }
    }

    #[derive(Default)]
    struct Recording {
        seen: RefCell<Vec<(ParameterValue, usize, usize)>>,
    }

    impl Callback for Recording {
        fn print(&self, result: &TrialResult, completed: usize, total: usize) {
            self.seen.borrow_mut().push((result.x(), completed, total));
        }
    }

    #[test]
    fn test_split_workers() {
        assert_eq!(split_workers(8, 400), (8, 1));
        assert_eq!(split_workers(8, 3), (3, 2));
        assert_eq!(split_workers(1, 1), (1, 1));
        assert_eq!(split_workers(16, 4), (4, 4));
    }

    #[test]
    fn test_identity_sweep() {
        let config = SweepConfig::new(3, 30, 50).with_workers(4);
        let outcome = run(&config, &Identity, &SinkCallback {}).unwrap();
        let table = outcome.table();

        assert_eq!(table.len(), 10);
        for (i, result) in table.iter().enumerate() {
            let x = 3 * (i as u64 + 1);
            assert_eq!(result.x(), x);
            assert_eq!(result.avg(), x as f64);
        }
    }

    #[test]
    fn test_callback_sees_every_point() {
        let callback = Recording::default();
        let config = SweepConfig::new(10, 60, 20).with_workers(3);
        run(&config, &Identity, &callback).unwrap();

        let seen = callback.seen.into_inner();
        assert_eq!(seen.len(), 6);
        assert_eq!(
            seen.iter().map(|s| s.1).collect::<Vec<_>>(),
            vec![1, 2, 3, 4, 5, 6]
        );
        assert!(seen.iter().all(|s| s.2 == 6));

        let mut xs = seen.iter().map(|s| s.0).collect::<Vec<_>>();
        xs.sort_unstable();
        assert_eq!(xs, vec![10, 20, 30, 40, 50, 60]);
    }

    #[test]
    fn test_table_is_ordered_when_completion_is_not() {
        let callback = Recording::default();
        let config = SweepConfig::new(20, 100, 1).with_workers(5);
        let outcome = run(&config, &SlowForSmall { max: 100 }, &callback).unwrap();

        let completion_order = callback
            .seen
            .into_inner()
            .into_iter()
            .map(|s| s.0)
            .collect::<Vec<_>>();

        assert_eq!(completion_order.len(), 5);
        assert!(completion_order.windows(2).any(|w| w[0] > w[1]));
        assert_eq!(outcome.table().xs(), vec![20, 40, 60, 80, 100]);
    }

    #[test]
    fn test_largest_parameter_value_is_bounded() {
        let sampler = Counting::default();

        assert!(matches!(
            run(
                &SweepConfig::new(u64::MAX, u64::MAX, 10).with_workers(2),
                &sampler,
                &SinkCallback {}
            ),
            Err(Error::InvalidParameter(_))
        ));
        assert_eq!(sampler.calls.load(Ordering::Relaxed), 0);

        let config = SweepConfig::new(MAX_PARAMETER_VALUE, MAX_PARAMETER_VALUE, 10).with_workers(2);
        let table = run(&config, &sampler, &SinkCallback {})
            .unwrap()
            .destructure()
            .0;

        assert_eq!(table.xs(), vec![MAX_PARAMETER_VALUE]);
        assert!(table.iter().all(|r| r.var() >= 0.0));
    }

    #[test]
    fn test_validation_happens_before_sampling() {
        let sampler = Counting::default();

        assert!(matches!(
            run(&SweepConfig::new(0, 100, 10), &sampler, &SinkCallback {}),
            Err(Error::InvalidParameter(_))
        ));
        assert!(matches!(
            run(&SweepConfig::new(20, 100, 0), &sampler, &SinkCallback {}),
            Err(Error::InvalidTrialCount)
        ));
        assert_eq!(sampler.calls.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_empty_sweep() {
        let sampler = Counting::default();
        let outcome = run(&SweepConfig::new(20, 10, 10), &sampler, &SinkCallback {}).unwrap();

        assert!(outcome.table().is_empty());
        assert_eq!(sampler.calls.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_total_sample_count() {
        let sampler = Counting::default();
        let config = SweepConfig::new(5, 50, 1_000).with_workers(4);
        run(&config, &sampler, &SinkCallback {}).unwrap();

        assert_eq!(sampler.calls.load(Ordering::Relaxed), 10 * 1_000);
    }

    #[test]
    fn test_panicking_point_is_reported() {
        let config = SweepConfig::new(10, 50, 10).with_workers(2);

        assert!(matches!(
            run(&config, &PanicsAt(30), &SinkCallback {}),
            Err(Error::WorkerPanicked)
        ));
    }
}
