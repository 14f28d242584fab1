//! Sample generation, the leaf unit of work of a sweep.

use crate::core::{ParameterValue, MAX_PARAMETER_VALUE};
use crate::error::{Error, Result};
use rand::distributions::{Distribution, Uniform};
use rand_pcg::Pcg64;

/// Trait which every sample generator must implement.
///
/// A sampler is shared between all worker threads of a sweep, but each call receives a random
/// number generator that is owned by the calling thread.
pub trait Sampler: Send + Sync {
    /// Draws one sample for the parameter value `x`, which is guaranteed to lie in
    /// `[1, MAX_PARAMETER_VALUE]`. The sample must lie in `[1, x]`.
    fn sample(&self, x: ParameterValue, rng: &mut Pcg64) -> u64;
}

/// Draws integers uniformly from `[1, x]`.
#[derive(Clone, Copy, Debug, Default)]
pub struct UniformDraw;

impl Sampler for UniformDraw {
    fn sample(&self, x: ParameterValue, rng: &mut Pcg64) -> u64 {
        Uniform::new_inclusive(1, x).sample(rng)
    }
}

/// Checks that `x` is a valid sample bound.
pub(crate) fn check_bound(x: ParameterValue) -> Result<()> {
    if x < 1 || x > MAX_PARAMETER_VALUE {
        return Err(Error::InvalidParameter(format!(
            "sample bound must lie in [1, {}], got {}",
            MAX_PARAMETER_VALUE, x
        )));
    }

    Ok(())
}

/// Draws one sample from `sampler` after checking that `x` is a valid bound, and checks that the
/// sample respects it.
pub fn generate<S>(sampler: &S, x: ParameterValue, rng: &mut Pcg64) -> Result<u64>
where
    S: Sampler + ?Sized,
{
    check_bound(x)?;

    let sample = sampler.sample(x, rng);

    if sample < 1 || sample > x {
        return Err(Error::SampleOutOfRange { x, sample });
    }

    Ok(sample)
}
