/*!
Random-walk Metropolis-Hastings for the Salpeter exponent.

The sampler owns a vector of independent [`Chain`]s, each combining the shared
target with a [`GaussianRandomWalk`] proposal and its own seeded random number
generator. Because the Gaussian walk is symmetric, the acceptance test reduces
to the plain likelihood-ratio Metropolis rule.

# Example

```rust
use salpeter_mcmc::core::ChainRunner;
use salpeter_mcmc::distributions::{SalpeterTarget, SufficientStat};
use salpeter_mcmc::metropolis_hastings::MetropolisHastings;

let stat = SufficientStat::idealized(2.35, 1_000_000.0, 1.0, 100.0).unwrap();
let target = SalpeterTarget::new(stat);
let mut mh = MetropolisHastings::new(target, 0.005, 3.0, 2)
    .unwrap()
    .set_seed(42);
let runs = mh.run(100).unwrap();
assert_eq!(runs[0].samples.len(), 101);
```
*/

use num_traits::Float;
use rand::prelude::*;
use rand_distr::StandardNormal;

use crate::core::{Chain, HasChains};
use crate::distributions::{GaussianRandomWalk, Target};
use crate::error::SamplerError;

/// A random-walk Metropolis-Hastings sampler over independent parallel
/// chains, all initialized at the same guess.
#[derive(Debug, Clone)]
pub struct MetropolisHastings<T, D> {
    /// The independent chains, each owning a clone of the target.
    pub chains: Vec<Chain<T, D, GaussianRandomWalk<T>>>,
    /// The global random seed; chain `i` runs on `seed + i`.
    pub seed: u64,
}

impl<T, D> MetropolisHastings<T, D>
where
    T: Float + std::fmt::Debug,
    D: Target<T> + Clone,
    rand_distr::Standard: rand_distr::Distribution<T>,
    StandardNormal: rand_distr::Distribution<T>,
{
    /// Creates `n_chains` chains at `initial_state` with the given proposal
    /// step size (standard deviation of the Gaussian walk).
    pub fn new(
        target: D,
        step_size: T,
        initial_state: T,
        n_chains: usize,
    ) -> Result<Self, SamplerError> {
        if n_chains == 0 {
            return Err(SamplerError::Configuration(
                "chain count must be positive".to_string(),
            ));
        }
        let proposal = GaussianRandomWalk::new(step_size)?;
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

impl<T, D> HasChains<T, D, GaussianRandomWalk<T>> for MetropolisHastings<T, D>
where
    T: Float + std::fmt::Debug,
    D: Target<T> + Clone,
    rand_distr::Standard: rand_distr::Distribution<T>,
    StandardNormal: rand_distr::Distribution<T>,
{
    fn chains_mut(&mut self) -> &mut Vec<Chain<T, D, GaussianRandomWalk<T>>> {
        &mut self.chains
    }
}
