/*!
Post-processing of finalized chains: burn-in removal, thinning, pooling and
summary statistics.

All functions here are read-only transformations. The raw chain is never
modified; burn-in and thinning produce a derived sequence whose length is
exactly `floor((len - burn) / stride)` with `burn = floor(len * fraction)`,
deterministically for a given chain and parameters.
*/

use ndarray::Array1;
use num_traits::{Float, ToPrimitive};

use crate::error::SamplerError;

/// Point estimate and uncertainty computed over a post-processed sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PosteriorSummary<T> {
    /// Sample mean.
    pub mean: T,
    /// Population standard deviation (ddof = 0).
    pub std_dev: T,
    /// Number of samples summarized.
    pub n: usize,
}

/// Discards a leading burn-in prefix and keeps every `stride`-th remaining
/// entry.
///
/// `burn_in_fraction` must lie in [0, 1] and `stride` must be positive,
/// otherwise a [`SamplerError::Configuration`] error is returned. A fraction
/// of 1.0 yields an empty sequence.
pub fn burn_and_thin<T: Float>(
    chain: &[T],
    burn_in_fraction: f64,
    stride: usize,
) -> Result<Array1<T>, SamplerError> {
    if stride == 0 {
        return Err(SamplerError::Configuration(
            "thinning stride must be positive".to_string(),
        ));
    }
    if !burn_in_fraction.is_finite() || !(0.0..=1.0).contains(&burn_in_fraction) {
        return Err(SamplerError::Configuration(format!(
            "burn-in fraction must lie in [0, 1], got {burn_in_fraction}"
        )));
    }
    let burn = (chain.len() as f64 * burn_in_fraction) as usize;
    let count = chain.len().saturating_sub(burn) / stride;
    Ok(Array1::from_iter(
        (0..count).map(|i| chain[burn + i * stride]),
    ))
}

/// Concatenates post-processed samples from several chains into one pooled
/// sample.
pub fn pool<T: Float>(samples: &[Array1<T>]) -> Array1<T> {
    Array1::from_iter(samples.iter().flat_map(|s| s.iter().copied()))
}

/// Computes mean and standard deviation over a post-processed sample.
///
/// An empty sample is a [`SamplerError::EmptySample`] error, never a silent
/// NaN.
pub fn summarize<T: Float + std::fmt::Debug>(
    samples: &[T],
) -> Result<PosteriorSummary<T>, SamplerError> {
    if samples.is_empty() {
        return Err(SamplerError::EmptySample("posterior summary"));
    }
    let n = T::from(samples.len()).ok_or_else(|| {
        SamplerError::Configuration(format!("sample count {} not representable", samples.len()))
    })?;
    let mean = samples.iter().fold(T::zero(), |acc, &x| acc + x) / n;
    let variance = samples
        .iter()
        .fold(T::zero(), |acc, &x| acc + (x - mean) * (x - mean))
        / n;
    let summary = PosteriorSummary {
        mean,
        std_dev: variance.sqrt(),
        n: samples.len(),
    };
    if !summary.mean.is_finite() || !summary.std_dev.is_finite() {
        return Err(SamplerError::NumericalDivergence {
            context: "posterior summary",
            alpha: summary.mean.to_f64().unwrap_or(f64::NAN),
        });
    }
    Ok(summary)
}
