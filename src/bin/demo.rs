//! Fits the Salpeter exponent with both samplers and prints the summaries.

use salpeter_mcmc::core::{ChainRun, ChainRunner};
use salpeter_mcmc::distributions::{SalpeterTarget, SufficientStat};
use salpeter_mcmc::hmc::HamiltonianSampler;
use salpeter_mcmc::metropolis_hastings::MetropolisHastings;
use salpeter_mcmc::postprocess::{burn_and_thin, summarize};
use std::error::Error;

fn report(label: &str, runs: &[ChainRun<f64>]) -> Result<(), Box<dyn Error>> {
    for (i, run) in runs.iter().enumerate() {
        let clean = burn_and_thin(run.samples.as_slice().expect("contiguous"), 0.5, 10)?;
        let summary = summarize(clean.as_slice().expect("contiguous"))?;
        println!(
            "{label} chain {i}: p(accept) = {:.3}, alpha = {:.4} +/- {:.4} ({} samples kept)",
            run.acceptance_rate, summary.mean, summary.std_dev, summary.n
        );
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    const ITERATIONS: usize = 10_000;
    const N_CHAINS: usize = 4;
    const SEED: u64 = 42;

    // The sufficient statistic of an idealized million-mass sample at the
    // canonical Salpeter exponent 2.35 over [1, 100] solar masses.
    let stat = SufficientStat::idealized(2.35, 1_000_000.0, 1.0, 100.0)?;
    let target = SalpeterTarget::new(stat);

    let mut mh = MetropolisHastings::new(target, 0.005, 3.0, N_CHAINS)?.set_seed(SEED);
    let mh_runs = mh.run_with_progress(ITERATIONS)?;
    report("MH ", &mh_runs)?;

    let mut hmc = HamiltonianSampler::new(target, 4.7e-5, 5, 3.0, N_CHAINS)?.set_seed(SEED);
    let hmc_runs = hmc.run_with_progress(ITERATIONS)?;
    report("HMC", &hmc_runs)?;

    #[cfg(feature = "csv")]
    {
        salpeter_mcmc::io::csv::save_csv(&hmc_runs, "hmc_chains.csv")?;
        println!("Saved HMC chains to hmc_chains.csv");
    }

    Ok(())
}
