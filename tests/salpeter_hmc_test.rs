//! End-to-end Hamiltonian Monte Carlo runs against the Salpeter likelihood.

use approx::assert_abs_diff_eq;
use salpeter_mcmc::core::ChainRunner;
use salpeter_mcmc::distributions::{SalpeterTarget, SufficientStat};
use salpeter_mcmc::hmc::HamiltonianSampler;
use salpeter_mcmc::metropolis_hastings::MetropolisHastings;
use salpeter_mcmc::postprocess::{burn_and_thin, summarize};

const SEED: u64 = 42;

fn idealized_target() -> SalpeterTarget<f64> {
    let stat = SufficientStat::idealized(2.35, 1_000_000.0, 1.0, 100.0).unwrap();
    SalpeterTarget::new(stat)
}

/// The reference scenario with the stability-tuned leapfrog parameters:
/// 10,000 iterations, step size 4.7e-5, 5 sub-steps, initial guess 3.0.
#[test]
fn recovers_the_salpeter_exponent() {
    let mut hmc = HamiltonianSampler::new(idealized_target(), 4.7e-5, 5, 3.0, 1)
        .unwrap()
        .set_seed(SEED);
    let runs = hmc.run(10_000).unwrap();
    assert_eq!(runs[0].samples.len(), 10_001);

    let clean = burn_and_thin(runs[0].samples.as_slice().unwrap(), 0.5, 10).unwrap();
    let summary = summarize(clean.as_slice().unwrap()).unwrap();
    assert_abs_diff_eq!(summary.mean, 2.35, epsilon = 0.01);
}

/// Gradient-guided proposals should accept far more often than the
/// random-walk run on the same posterior.
#[test]
fn accepts_more_often_than_the_random_walk() {
    let mut mh = MetropolisHastings::new(idealized_target(), 0.005, 3.0, 1)
        .unwrap()
        .set_seed(SEED);
    let mh_rate = mh.run(10_000).unwrap()[0].acceptance_rate;

    let mut hmc = HamiltonianSampler::new(idealized_target(), 4.7e-5, 5, 3.0, 1)
        .unwrap()
        .set_seed(SEED);
    let hmc_rate = hmc.run(10_000).unwrap()[0].acceptance_rate;

    assert!(
        hmc_rate > mh_rate,
        "expected HMC ({hmc_rate}) to accept more often than MH ({mh_rate})"
    );
    assert!(hmc_rate > 0.8);
}

/// The same seed must reproduce the chain bit for bit.
#[test]
fn fixed_seed_reproduces_the_run() {
    let mut a = HamiltonianSampler::new(idealized_target(), 4.7e-5, 5, 3.0, 1)
        .unwrap()
        .set_seed(SEED);
    let mut b = HamiltonianSampler::new(idealized_target(), 4.7e-5, 5, 3.0, 1)
        .unwrap()
        .set_seed(SEED);
    assert_eq!(a.run(2_000).unwrap(), b.run(2_000).unwrap());
}

/// A wildly unstable step size makes the integrator diverge; the run must
/// abort with a reported error instead of appending NaN states, and the
/// prefix built so far stays finite.
#[test]
fn unstable_step_size_aborts_with_an_error() {
    let mut hmc = HamiltonianSampler::new(idealized_target(), 50.0, 5, 3.0, 1)
        .unwrap()
        .set_seed(SEED);
    let result = hmc.run(1_000);
    assert!(result.is_err(), "expected the divergent run to abort");
    assert!(hmc.chains[0]
        .history()
        .iter()
        .all(|alpha| alpha.is_finite()));
}
