//! Shared helpers for the end-to-end tests.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Draws `n` masses from the bounded power law `p(m) ∝ m^(-alpha)` on
/// `[m_min, m_max]` by rejection sampling in log-mass space.
///
/// The density decays with mass, so the likelihood envelope peaks at `m_min`.
pub fn sample_masses(n: usize, alpha: f64, m_min: f64, m_max: f64, seed: u64) -> Vec<f64> {
    let mut rng = SmallRng::seed_from_u64(seed);
    let (log_min, log_max) = (m_min.ln(), m_max.ln());
    let max_likelihood = m_min.powf(1.0 - alpha);

    let mut masses = Vec::with_capacity(n);
    while masses.len() < n {
        let log_m = rng.gen_range(log_min..log_max);
        let m = log_m.exp();
        let likelihood = m.powf(1.0 - alpha);
        let u = rng.gen_range(0.0..max_likelihood);
        if u < likelihood {
            masses.push(m);
        }
    }
    masses
}
