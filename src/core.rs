/*!
The chain driver and the parallel multi-chain runner.

A [`Chain`] owns its target, its proposal strategy, its own seeded random
number generator and its full append-only history. One iteration reads the
last state, asks the proposal for a candidate plus log acceptance ratio,
applies the Metropolis rule, and appends exactly one entry (the candidate on
acceptance, a duplicate of the previous state on rejection).

[`ChainRunner`] runs several independent chains in parallel with `rayon`.
Chains never share mutable state; each owns an unshared generator and history,
and only the immutable target is shared (by cloning). Reproducibility follows
the usual convention: a global seed `s` gives chain `i` the seed `s + i`.
*/

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use ndarray::Array1;
use num_traits::Float;
use rand::prelude::*;
use rayon::prelude::*;

use crate::distributions::{Proposal, Target};
use crate::error::SamplerError;
use crate::stats::ChainTracker;

/// One Metropolis-Hastings accept/reject decision.
///
/// Draws u ~ Uniform[0, 1) and accepts iff `log_accept_ratio > ln u`, which
/// accepts strict improvements unconditionally and anything else with
/// probability `exp(log_accept_ratio)`.
pub fn metropolis_accept<T>(log_accept_ratio: T, rng: &mut SmallRng) -> bool
where
    T: Float,
    rand_distr::Standard: rand_distr::Distribution<T>,
{
    let u: T = rng.gen();
    log_accept_ratio > u.ln()
}

/// A single Markov chain over the scalar shape parameter.
///
/// The history is append-only and seeded with the initial guess, so after
/// `n` iterations it holds exactly `n + 1` entries. It is never truncated
/// during a run; burn-in and thinning live in [`crate::postprocess`].
#[derive(Debug, Clone)]
pub struct Chain<T, D, P> {
    /// The target distribution to sample from.
    pub target: D,
    /// The proposal strategy generating candidate states.
    pub proposal: P,
    /// The chain-specific random seed.
    pub seed: u64,
    history: Vec<T>,
    current_state: T,
    accepted: u64,
    rng: SmallRng,
}

impl<T, D, P> Chain<T, D, P>
where
    T: Float,
    D: Target<T>,
    P: Proposal<T, D>,
    rand_distr::Standard: rand_distr::Distribution<T>,
{
    /// Creates a chain seeded with `initial_state` and an entropy-derived
    /// random seed. Use [`Chain::reseed`] for reproducible runs.
    pub fn new(target: D, proposal: P, initial_state: T) -> Self {
        let seed = thread_rng().gen::<u64>();
        Self {
            target,
            proposal,
            seed,
            history: vec![initial_state],
            current_state: initial_state,
            accepted: 0,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Re-seeds this chain's random number generator.
    pub fn reseed(&mut self, seed: u64) {
        self.seed = seed;
        self.rng = SmallRng::seed_from_u64(seed);
    }

    /// Performs one proposal + accept/reject iteration, returning the new
    /// current state. Exactly one entry is appended to the history.
    pub fn step(&mut self) -> Result<T, SamplerError> {
        let (candidate, log_accept_ratio) =
            self.proposal
                .propose(self.current_state, &self.target, &mut self.rng)?;
        if metropolis_accept(log_accept_ratio, &mut self.rng) {
            self.current_state = candidate;
            self.accepted += 1;
        }
        self.history.push(self.current_state);
        Ok(self.current_state)
    }

    /// Runs the chain for `n_iterations` further iterations.
    ///
    /// Aborts on the first likelihood or proposal error; the history prefix
    /// built so far remains inspectable through [`Chain::history`].
    pub fn run(&mut self, n_iterations: usize) -> Result<&[T], SamplerError> {
        if n_iterations == 0 {
            return Err(SamplerError::Configuration(
                "iteration count must be positive".to_string(),
            ));
        }
        for _ in 0..n_iterations {
            self.step()?;
        }
        Ok(&self.history)
    }

    /// The current (most recent) state.
    pub fn current_state(&self) -> T {
        self.current_state
    }

    /// The full chain history, including the initial guess.
    pub fn history(&self) -> &[T] {
        &self.history
    }

    /// Number of iterations performed so far.
    pub fn iterations(&self) -> usize {
        self.history.len() - 1
    }

    /// Number of accepted proposals so far.
    pub fn accepted(&self) -> u64 {
        self.accepted
    }

    /// Fraction of iterations whose proposal was accepted, in [0, 1].
    pub fn acceptance_rate(&self) -> f64 {
        let iterations = self.iterations();
        if iterations == 0 {
            0.0
        } else {
            self.accepted as f64 / iterations as f64
        }
    }
}

/// The finalized output of one chain: the full history (initial guess
/// included) and the acceptance-rate diagnostic.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainRun<T> {
    /// All states, in iteration order.
    pub samples: Array1<T>,
    /// Accepted proposals divided by iteration count.
    pub acceptance_rate: f64,
}

/// Anything that owns a vector of chains over one target/proposal pairing.
pub trait HasChains<T, D, P> {
    /// Returns a mutable reference to the vector of chains.
    fn chains_mut(&mut self) -> &mut Vec<Chain<T, D, P>>;
}

/// Runs all chains of a sampler in parallel, one rayon task per chain.
pub trait ChainRunner<T, D, P>: HasChains<T, D, P>
where
    T: Float + Send + std::fmt::Debug,
    D: Target<T> + Send,
    P: Proposal<T, D> + Send,
    rand_distr::Standard: rand_distr::Distribution<T>,
{
    /// Runs every chain for `n_iterations` iterations and collects the
    /// finalized histories. The first error from any chain aborts the whole
    /// run.
    fn run(&mut self, n_iterations: usize) -> Result<Vec<ChainRun<T>>, SamplerError> {
        self.chains_mut()
            .par_iter_mut()
            .map(|chain| {
                chain.run(n_iterations)?;
                Ok(ChainRun {
                    samples: Array1::from(chain.history().to_vec()),
                    acceptance_rate: chain.acceptance_rate(),
                })
            })
            .collect()
    }

    /// Like [`ChainRunner::run`], with one progress bar per chain showing a
    /// sliding-window acceptance probability and the running mean.
    fn run_with_progress(&mut self, n_iterations: usize) -> Result<Vec<ChainRun<T>>, SamplerError> {
        if n_iterations == 0 {
            return Err(SamplerError::Configuration(
                "iteration count must be positive".to_string(),
            ));
        }
        let multi = MultiProgress::new();
        let pb_style = ProgressStyle::default_bar()
            .template("{prefix} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("##-");

        self.chains_mut()
            .par_iter_mut()
            .enumerate()
            .map(|(i, chain)| {
                let pb = multi.add(ProgressBar::new(n_iterations as u64));
                pb.set_prefix(format!("Chain {i}"));
                pb.set_style(pb_style.clone());

                let mut tracker = ChainTracker::new(chain.current_state());
                for _ in 0..n_iterations {
                    let state = chain.step()?;
                    tracker.step(state);
                    pb.inc(1);
                    pb.set_message(format!(
                        "p(accept)≈{:.2} mean≈{:.4}",
                        tracker.p_accept(),
                        tracker.mean()
                    ));
                }
                pb.finish_with_message("Done!");

                Ok(ChainRun {
                    samples: Array1::from(chain.history().to_vec()),
                    acceptance_rate: chain.acceptance_rate(),
                })
            })
            .collect()
    }
}

impl<T, D, P, S> ChainRunner<T, D, P> for S
where
    S: HasChains<T, D, P>,
    T: Float + Send + std::fmt::Debug,
    D: Target<T> + Send,
    P: Proposal<T, D> + Send,
    rand_distr::Standard: rand_distr::Distribution<T>,
{
}
