//! Error types shared across the samplers.

use thiserror::Error;

/// Everything that can go wrong while configuring or running a sampler.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SamplerError {
    /// The likelihood model was asked to evaluate a point outside its
    /// mathematical domain, e.g. a shape parameter of exactly 1 or an empty
    /// mass interval.
    #[error("domain error: {0}")]
    Domain(String),

    /// A likelihood, gradient or integrator evaluation produced a non-finite
    /// value mid-run. The chain's history prefix up to the failing iteration
    /// stays inspectable.
    #[error("numerical divergence in {context} at alpha = {alpha}")]
    NumericalDivergence {
        /// Which computation diverged.
        context: &'static str,
        /// The parameter value that triggered it.
        alpha: f64,
    },

    /// A sampler or post-processing parameter was structurally invalid, e.g.
    /// a non-positive step size or a zero thinning stride.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A summary was requested over an empty sample.
    #[error("empty sample: {0}")]
    EmptySample(&'static str),
}
