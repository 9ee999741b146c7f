/*!
Hamiltonian Monte Carlo for the Salpeter exponent.

The [`LeapfrogProposal`] simulates Hamiltonian dynamics with the potential
`U(alpha) = -logL(alpha)`: a fresh momentum is drawn from a unit Gaussian at
every iteration, the leapfrog integrator takes `n_leapfrog` sub-steps of size
`step_size`, and the candidate is accepted with probability
`min(1, exp(H_old - H_new))`. The momentum is ephemeral and discarded after
the iteration regardless of the outcome.

Gradient information lets this strategy make much larger moves at high
acceptance probability than a random walk, at the price of `n_leapfrog`
gradient evaluations per proposal. The step size and sub-step count jointly
determine integrator stability; too large a step size makes the energy error
blow up and acceptance collapse, so both are configuration, never constants.

The gradient is recomputed at the freshly stepped position inside every
sub-step, which is what keeps the integrator symplectic and reversible.
*/

use num_traits::Float;
use rand::prelude::*;
use rand_distr::StandardNormal;

use crate::core::{Chain, HasChains};
use crate::distributions::{ensure_finite, GradientTarget, Proposal, Target};
use crate::error::SamplerError;

/// A Hamiltonian proposal driven by leapfrog integration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LeapfrogProposal<T> {
    step_size: T,
    n_leapfrog: usize,
}

impl<T: Float + std::fmt::Debug> LeapfrogProposal<T> {
    /// Creates a leapfrog proposal with the given micro-step size and
    /// sub-step count.
    ///
    /// Non-positive values for either are [`SamplerError::Configuration`]
    /// errors.
    pub fn new(step_size: T, n_leapfrog: usize) -> Result<Self, SamplerError> {
        if !(step_size > T::zero()) || !step_size.is_finite() {
            return Err(SamplerError::Configuration(format!(
                "leapfrog step size must be positive and finite, got {step_size:?}"
            )));
        }
        if n_leapfrog == 0 {
            return Err(SamplerError::Configuration(
                "leapfrog step count must be positive".to_string(),
            ));
        }
        Ok(Self {
            step_size,
            n_leapfrog,
        })
    }

    /// The leapfrog micro-step size.
    pub fn step_size(&self) -> T {
        self.step_size
    }

    /// The number of leapfrog sub-steps per proposal.
    pub fn n_leapfrog(&self) -> usize {
        self.n_leapfrog
    }

    /// Runs the leapfrog integrator from `(position, momentum)` and returns
    /// the final phase-space point.
    ///
    /// Each sub-step: half momentum update with the potential gradient, full
    /// position update, gradient recomputed at the new position, second half
    /// momentum update.
    fn integrate<D: GradientTarget<T>>(
        &self,
        mut position: T,
        mut momentum: T,
        target: &D,
    ) -> Result<(T, T), SamplerError> {
        let half = T::from(0.5).unwrap();
        // dU/d(alpha) is the negated log-likelihood gradient.
        let mut grad_u = -target.gradient(position)?;
        for _ in 0..self.n_leapfrog {
            momentum = momentum - self.step_size * grad_u * half;
            position = position + self.step_size * momentum;
            grad_u = -target.gradient(position)?;
            momentum = momentum - self.step_size * grad_u * half;
        }
        Ok((position, momentum))
    }

    /// The Hamiltonian `p^2 / 2 + U(alpha)` at a phase-space point.
    fn hamiltonian<D: Target<T>>(
        &self,
        position: T,
        momentum: T,
        target: &D,
    ) -> Result<T, SamplerError> {
        let half = T::from(0.5).unwrap();
        let energy = -target.log_likelihood(position)?;
        ensure_finite(momentum * momentum * half + energy, "hamiltonian", position)
    }
}

impl<T, D> Proposal<T, D> for LeapfrogProposal<T>
where
    T: Float + std::fmt::Debug,
    D: GradientTarget<T>,
    StandardNormal: rand_distr::Distribution<T>,
{
    fn propose(
        &mut self,
        current: T,
        target: &D,
        rng: &mut SmallRng,
    ) -> Result<(T, T), SamplerError> {
        let momentum: T = rng.sample(StandardNormal);
        let h_current = self.hamiltonian(current, momentum, target)?;
        let (candidate, new_momentum) = self.integrate(current, momentum, target)?;
        let h_candidate = self.hamiltonian(candidate, new_momentum, target)?;
        // Lower energy is better: log ratio = -(H_new - H_old).
        Ok((candidate, h_current - h_candidate))
    }
}

/// A Hamiltonian Monte Carlo sampler over independent parallel chains, all
/// initialized at the same guess and distinguished by their per-chain seeds.
#[derive(Debug, Clone)]
pub struct HamiltonianSampler<T, D> {
    /// The independent chains, each owning a clone of the target.
    pub chains: Vec<Chain<T, D, LeapfrogProposal<T>>>,
    /// The global random seed; chain `i` runs on `seed + i`.
    pub seed: u64,
}

impl<T, D> HamiltonianSampler<T, D>
where
    T: Float + std::fmt::Debug,
    D: GradientTarget<T> + Clone,
    rand_distr::Standard: rand_distr::Distribution<T>,
    StandardNormal: rand_distr::Distribution<T>,
{
    /// Creates `n_chains` chains at `initial_state` with the given leapfrog
    /// tuning.
    pub fn new(
        target: D,
        step_size: T,
        n_leapfrog: usize,
        initial_state: T,
        n_chains: usize,
    ) -> Result<Self, SamplerError> {
        if n_chains == 0 {
            return Err(SamplerError::Configuration(
                "chain count must be positive".to_string(),
            ));
        }
        let proposal = LeapfrogProposal::new(step_size, n_leapfrog)?;
        let chains = (0..n_chains)
            .map(|_| Chain::new(target.clone(), proposal, initial_state))
            .collect();
        let seed = thread_rng().gen::<u64>();
        Ok(Self { chains, seed })
    }

    /// Sets the global seed; chain `i` is re-seeded with `seed + i`.
    pub fn set_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        for (i, chain) in self.chains.iter_mut().enumerate() {
            chain.reseed(seed + i as u64);
        }
        self
    }
}

impl<T, D> HasChains<T, D, LeapfrogProposal<T>> for HamiltonianSampler<T, D>
where
    T: Float + std::fmt::Debug,
    D: GradientTarget<T> + Clone,
    rand_distr::Standard: rand_distr::Distribution<T>,
    StandardNormal: rand_distr::Distribution<T>,
{
    fn chains_mut(&mut self) -> &mut Vec<Chain<T, D, LeapfrogProposal<T>>> {
        &mut self.chains
    }
}
