/*!
Defines the bounded power-law (Salpeter) likelihood model together with the
traits that the samplers are written against: [`Target`] for log-likelihood
evaluation, [`GradientTarget`] for targets with an analytic gradient, and
[`Proposal`] for candidate generation.

The likelihood never sees raw observations. It consumes a [`SufficientStat`],
the reduced statistic (D, N, M_min, M_max) where D is the sum of
log-transformed masses. This module is generic over the floating-point
precision (`f32` or `f64`) via [`num_traits::Float`].

# Examples

```rust
use salpeter_mcmc::distributions::{SalpeterTarget, SufficientStat, Target};

let stat = SufficientStat::idealized(2.35_f64, 1_000_000.0, 1.0, 100.0).unwrap();
let target = SalpeterTarget::new(stat);
let ll = target.log_likelihood(2.35).unwrap();
assert!(ll.is_finite());
```
*/

use num_traits::{Float, ToPrimitive};
use rand::rngs::SmallRng;
use rand::Rng;
use rand_distr::StandardNormal;

use crate::error::SamplerError;

/// A target distribution evaluated through its log-likelihood.
///
/// Evaluation is fallible: a parameter on the likelihood singularity yields
/// [`SamplerError::Domain`] and any non-finite result yields
/// [`SamplerError::NumericalDivergence`] instead of propagating NaN/Inf.
pub trait Target<T: Float> {
    /// Returns the log-likelihood at the given parameter value.
    fn log_likelihood(&self, alpha: T) -> Result<T, SamplerError>;
}

/// A target distribution that also provides the analytic derivative of its
/// log-likelihood, as required by Hamiltonian proposals.
pub trait GradientTarget<T: Float>: Target<T> {
    /// Returns d/d(alpha) of the log-likelihood at the given parameter value.
    fn gradient(&self, alpha: T) -> Result<T, SamplerError>;
}

/// Generates one candidate state from the current state.
///
/// Both strategies in this crate share this contract: return the candidate
/// together with the log acceptance ratio that the Metropolis rule should
/// test. For the random walk that ratio is the log-likelihood difference; for
/// the Hamiltonian strategy it is the negated energy difference.
pub trait Proposal<T: Float, D> {
    /// Proposes a candidate, returning `(candidate, log_accept_ratio)`.
    fn propose(
        &mut self,
        current: T,
        target: &D,
        rng: &mut SmallRng,
    ) -> Result<(T, T), SamplerError>;
}

/// Checks a freshly computed value for finiteness, converting NaN/Inf into
/// the divergence error contract.
pub(crate) fn ensure_finite<T: Float>(
    value: T,
    context: &'static str,
    alpha: T,
) -> Result<T, SamplerError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(SamplerError::NumericalDivergence {
            context,
            alpha: alpha.to_f64().unwrap_or(f64::NAN),
        })
    }
}

/**
The sufficient statistic of an observed mass sample under the bounded
power-law model: D (sum over log masses), N (sample count) and the support
bounds [M_min, M_max].

Immutable for a given run and safely shared across any number of parallel
chains.
*/
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SufficientStat<T> {
    log_mass_sum: T,
    n: T,
    m_min: T,
    m_max: T,
}

impl<T: Float + std::fmt::Debug> SufficientStat<T> {
    /// Builds a sufficient statistic from already-reduced values.
    ///
    /// Fails fast with [`SamplerError::Domain`] on invalid bounds
    /// (`m_min <= 0`, `m_min >= m_max`), a non-positive sample count, or a
    /// non-finite D.
    pub fn new(log_mass_sum: T, n: T, m_min: T, m_max: T) -> Result<Self, SamplerError> {
        if !(m_min > T::zero()) || !m_min.is_finite() {
            return Err(SamplerError::Domain(format!(
                "lower mass bound must be positive and finite, got {m_min:?}"
            )));
        }
        if !(m_min < m_max) || !m_max.is_finite() {
            return Err(SamplerError::Domain(format!(
                "mass bounds must satisfy M_min < M_max, got [{m_min:?}, {m_max:?}]"
            )));
        }
        if !(n > T::zero()) || !n.is_finite() {
            return Err(SamplerError::Domain(format!(
                "sample count must be positive, got {n:?}"
            )));
        }
        if !log_mass_sum.is_finite() {
            return Err(SamplerError::Domain(format!(
                "log-mass sum must be finite, got {log_mass_sum:?}"
            )));
        }
        Ok(Self {
            log_mass_sum,
            n,
            m_min,
            m_max,
        })
    }

    /// Reduces raw mass observations to their sufficient statistic.
    ///
    /// Every observation must be finite and lie inside `[m_min, m_max]`.
    pub fn from_observations(masses: &[T], m_min: T, m_max: T) -> Result<Self, SamplerError> {
        if masses.is_empty() {
            return Err(SamplerError::EmptySample("mass observations"));
        }
        let mut log_mass_sum = T::zero();
        for &m in masses {
            if !m.is_finite() || m < m_min || m > m_max {
                return Err(SamplerError::Domain(format!(
                    "observation {m:?} outside the support [{m_min:?}, {m_max:?}]"
                )));
            }
            log_mass_sum = log_mass_sum + m.ln();
        }
        let n = T::from(masses.len()).ok_or_else(|| {
            SamplerError::Domain(format!("sample count {} not representable", masses.len()))
        })?;
        Self::new(log_mass_sum, n, m_min, m_max)
    }

    /// The sufficient statistic of an idealized sample of size `n` drawn
    /// exactly from the power law with exponent `alpha`: D = N * E[ln M].
    ///
    /// The maximum-likelihood estimate under this statistic is exactly
    /// `alpha`, which makes it a convenient ground truth for calibration runs
    /// and regression tests.
    pub fn idealized(alpha: T, n: T, m_min: T, m_max: T) -> Result<Self, SamplerError> {
        let one = T::one();
        let b = one - alpha;
        if b == T::zero() {
            return Err(SamplerError::Domain(
                "exponent alpha = 1 sits on the normalization singularity".to_string(),
            ));
        }
        let p_min = m_min.powf(b);
        let p_max = m_max.powf(b);
        let c = b / (p_max - p_min);
        // Antiderivative of m^(b-1) ln m, so E[ln M] = c * (f(M_max) - f(M_min)).
        let f = |m: T, p: T| p * (m.ln() / b - one / (b * b));
        let mean_log_mass = c * (f(m_max, p_max) - f(m_min, p_min));
        Self::new(
            ensure_finite(mean_log_mass, "idealized log-mass mean", alpha)? * n,
            n,
            m_min,
            m_max,
        )
    }

    /// D, the sum over log-transformed observations.
    pub fn log_mass_sum(&self) -> T {
        self.log_mass_sum
    }

    /// N, the number of observations.
    pub fn n(&self) -> T {
        self.n
    }

    /// Lower support bound.
    pub fn m_min(&self) -> T {
        self.m_min
    }

    /// Upper support bound.
    pub fn m_max(&self) -> T {
        self.m_max
    }
}

/**
The Salpeter likelihood: a power-law density proportional to `m^(-alpha)` over
the bounded support `[M_min, M_max]`, conditioned on a fixed
[`SufficientStat`].

For parameter alpha (away from the singularity at 1) the log-likelihood is

```text
logL(alpha) = N * ln c(alpha) - alpha * D
c(alpha)    = (1 - alpha) / (M_max^(1 - alpha) - M_min^(1 - alpha))
```

and [`GradientTarget::gradient`] evaluates its closed-form derivative. Both
evaluations are pure functions of their inputs.
*/
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SalpeterTarget<T> {
    stat: SufficientStat<T>,
    log_m_min: T,
    log_m_max: T,
}

impl<T: Float + std::fmt::Debug> SalpeterTarget<T> {
    /// Creates the likelihood model for a fixed sufficient statistic.
    pub fn new(stat: SufficientStat<T>) -> Self {
        Self {
            log_m_min: stat.m_min().ln(),
            log_m_max: stat.m_max().ln(),
            stat,
        }
    }

    /// The sufficient statistic this model is conditioned on.
    pub fn stat(&self) -> &SufficientStat<T> {
        &self.stat
    }

    /// Computes `(1 - alpha, M_min^(1 - alpha), M_max^(1 - alpha))`, guarding
    /// the alpha = 1 singularity.
    fn powers(&self, alpha: T) -> Result<(T, T, T), SamplerError> {
        let b = T::one() - alpha;
        if b == T::zero() {
            return Err(SamplerError::Domain(
                "exponent alpha = 1 sits on the normalization singularity".to_string(),
            ));
        }
        Ok((b, self.stat.m_min().powf(b), self.stat.m_max().powf(b)))
    }
}

impl<T: Float + std::fmt::Debug> Target<T> for SalpeterTarget<T> {
    fn log_likelihood(&self, alpha: T) -> Result<T, SamplerError> {
        let (b, p_min, p_max) = self.powers(alpha)?;
        let c = b / (p_max - p_min);
        let ll = self.stat.n() * c.ln() - alpha * self.stat.log_mass_sum();
        ensure_finite(ll, "log-likelihood", alpha)
    }
}

impl<T: Float + std::fmt::Debug> GradientTarget<T> for SalpeterTarget<T> {
    fn gradient(&self, alpha: T) -> Result<T, SamplerError> {
        let (b, p_min, p_max) = self.powers(alpha)?;
        let mut grad = self.log_m_min * p_min - self.log_m_max * p_max;
        grad = T::one() + grad * b / (p_max - p_min);
        grad = -self.stat.log_mass_sum() - self.stat.n() * grad / b;
        ensure_finite(grad, "gradient", alpha)
    }
}

/**
A local Gaussian random-walk proposal: `candidate = current + N(0, step_size)`.

The proposal is symmetric, so the log acceptance ratio reduces to the
log-likelihood difference between candidate and current state. One likelihood
evaluation per endpoint, O(1) per proposal.
*/
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussianRandomWalk<T> {
    step_size: T,
}

impl<T: Float + std::fmt::Debug> GaussianRandomWalk<T> {
    /// Creates a random-walk proposal with the given standard deviation.
    ///
    /// A non-positive or non-finite step size is a
    /// [`SamplerError::Configuration`] error.
    pub fn new(step_size: T) -> Result<Self, SamplerError> {
        if !(step_size > T::zero()) || !step_size.is_finite() {
            return Err(SamplerError::Configuration(format!(
                "random-walk step size must be positive and finite, got {step_size:?}"
            )));
        }
        Ok(Self { step_size })
    }

    /// The proposal standard deviation.
    pub fn step_size(&self) -> T {
        self.step_size
    }
}

impl<T, D> Proposal<T, D> for GaussianRandomWalk<T>
where
    T: Float,
    D: Target<T>,
    StandardNormal: rand_distr::Distribution<T>,
{
    fn propose(
        &mut self,
        current: T,
        target: &D,
        rng: &mut SmallRng,
    ) -> Result<(T, T), SamplerError> {
        let noise: T = rng.sample(StandardNormal);
        let candidate = current + noise * self.step_size;
        let current_ll = target.log_likelihood(current)?;
        let candidate_ll = target.log_likelihood(candidate)?;
        Ok((candidate, candidate_ll - current_ll))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::SeedableRng;

    fn reference_target() -> SalpeterTarget<f64> {
        let stat = SufficientStat::idealized(2.35, 1_000_000.0, 1.0, 100.0).unwrap();
        SalpeterTarget::new(stat)
    }

    #[test]
    fn log_likelihood_matches_direct_formula() {
        let stat = SufficientStat::new(740_000.0, 1_000_000.0, 1.0, 100.0).unwrap();
        let target = SalpeterTarget::new(stat);
        for alpha in [0.5, 1.5, 2.35, 3.0] {
            let b = 1.0 - alpha;
            let c = b / (100.0_f64.powf(b) - 1.0);
            let expected = 1_000_000.0 * c.ln() - alpha * 740_000.0;
            let got = target.log_likelihood(alpha).unwrap();
            assert_relative_eq!(got, expected, max_relative = 1e-12);
        }
    }

    #[test]
    fn gradient_matches_finite_difference() {
        let stat = SufficientStat::new(740_000.0, 1_000_000.0, 1.0, 100.0).unwrap();
        let target = SalpeterTarget::new(stat);
        let h = 1e-6;
        for alpha in [-0.5, 0.5, 1.5, 2.0, 2.35, 3.0] {
            let numeric = (target.log_likelihood(alpha + h).unwrap()
                - target.log_likelihood(alpha - h).unwrap())
                / (2.0 * h);
            let analytic = target.gradient(alpha).unwrap();
            assert_relative_eq!(analytic, numeric, max_relative = 1e-4);
        }
    }

    #[test]
    fn gradient_vanishes_at_the_generating_exponent() {
        // With the idealized statistic, alpha = 2.35 is the exact MLE.
        let target = reference_target();
        let grad = target.gradient(2.35).unwrap();
        assert!(
            grad.abs() < 1e-4 * target.stat().n(),
            "expected near-zero score at the MLE, got {grad}"
        );
    }

    #[test]
    fn alpha_of_one_is_a_domain_error() {
        let target = reference_target();
        assert!(matches!(
            target.log_likelihood(1.0),
            Err(SamplerError::Domain(_))
        ));
        assert!(matches!(target.gradient(1.0), Err(SamplerError::Domain(_))));
    }

    #[test]
    fn invalid_bounds_are_domain_errors() {
        assert!(matches!(
            SufficientStat::new(1.0, 10.0, -1.0, 100.0),
            Err(SamplerError::Domain(_))
        ));
        assert!(matches!(
            SufficientStat::new(1.0, 10.0, 100.0, 1.0),
            Err(SamplerError::Domain(_))
        ));
        assert!(matches!(
            SufficientStat::new(1.0, 0.0, 1.0, 100.0),
            Err(SamplerError::Domain(_))
        ));
        assert!(matches!(
            SufficientStat::new(f64::NAN, 10.0, 1.0, 100.0),
            Err(SamplerError::Domain(_))
        ));
    }

    #[test]
    fn overflowing_normalization_reports_divergence() {
        // M_min < 1 makes M_min^(1 - alpha) overflow for huge alpha, which
        // must surface as a divergence error rather than a NaN likelihood.
        let stat = SufficientStat::new(0.0, 10.0, 0.5, 2.0).unwrap();
        let target = SalpeterTarget::new(stat);
        assert!(matches!(
            target.log_likelihood(1.0e4),
            Err(SamplerError::NumericalDivergence { .. })
        ));
    }

    #[test]
    fn from_observations_sums_log_masses() {
        let masses = [1.0, 2.0, 4.0, 8.0];
        let stat = SufficientStat::from_observations(&masses, 1.0, 10.0).unwrap();
        let expected: f64 = masses.iter().map(|m: &f64| m.ln()).sum();
        assert_relative_eq!(stat.log_mass_sum(), expected, max_relative = 1e-14);
        assert_eq!(stat.n(), 4.0);
    }

    #[test]
    fn from_observations_rejects_out_of_support_masses() {
        assert!(matches!(
            SufficientStat::from_observations(&[1.0, 200.0], 1.0, 100.0),
            Err(SamplerError::Domain(_))
        ));
        let empty: [f64; 0] = [];
        assert!(matches!(
            SufficientStat::from_observations(&empty, 1.0, 100.0),
            Err(SamplerError::EmptySample(_))
        ));
    }

    #[test]
    fn idealized_statistic_has_plausible_log_mass_mean() {
        // For alpha = 2.35 on [1, 100] the mean log mass is ~0.73.
        let stat = SufficientStat::idealized(2.35, 1.0, 1.0, 100.0).unwrap();
        assert_relative_eq!(stat.log_mass_sum(), 0.7316, max_relative = 1e-2);
    }

    #[test]
    fn random_walk_rejects_bad_step_sizes() {
        assert!(matches!(
            GaussianRandomWalk::new(0.0),
            Err(SamplerError::Configuration(_))
        ));
        assert!(matches!(
            GaussianRandomWalk::new(-0.1),
            Err(SamplerError::Configuration(_))
        ));
    }

    #[test]
    fn random_walk_log_ratio_is_likelihood_difference() {
        let target = reference_target();
        let mut proposal = GaussianRandomWalk::new(0.01).unwrap();
        let mut rng = SmallRng::seed_from_u64(3);
        let current = 2.4;
        let (candidate, log_ratio) = proposal.propose(current, &target, &mut rng).unwrap();
        let expected =
            target.log_likelihood(candidate).unwrap() - target.log_likelihood(current).unwrap();
        assert_relative_eq!(log_ratio, expected, max_relative = 1e-12);
    }
}
