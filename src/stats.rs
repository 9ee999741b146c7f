//! Running per-chain statistics used for live progress reporting.

use num_traits::{Float, ToPrimitive};
use std::collections::VecDeque;

/// Window length for the sliding acceptance-probability estimate.
const ACCEPT_WINDOW: usize = 100;

/// Tracks a single chain incrementally: iteration count, a sliding-window
/// acceptance probability and Welford-style running mean/variance.
///
/// Rejected iterations duplicate the previous state exactly, so acceptance is
/// detected by comparing consecutive states.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainTracker<T> {
    n: u64,
    last_state: T,
    accept_window: VecDeque<bool>,
    mean: f64,
    m2: f64,
}

/// A snapshot of the tracked diagnostics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChainStats {
    /// Iterations observed so far.
    pub n: u64,
    /// Sliding-window acceptance probability.
    pub p_accept: f64,
    /// Running mean of the tracked states.
    pub mean: f64,
    /// Running standard deviation of the tracked states.
    pub std_dev: f64,
}

impl<T: Float> ChainTracker<T> {
    /// Creates a tracker primed with the chain's initial state.
    pub fn new(initial_state: T) -> Self {
        Self {
            n: 0,
            last_state: initial_state,
            accept_window: VecDeque::with_capacity(ACCEPT_WINDOW),
            mean: 0.0,
            m2: 0.0,
        }
    }

    /// Records the state produced by one chain iteration.
    pub fn step(&mut self, state: T) {
        self.n += 1;
        let accepted = state != self.last_state;
        self.last_state = state;
        if self.accept_window.len() == ACCEPT_WINDOW {
            self.accept_window.pop_front();
        }
        self.accept_window.push_back(accepted);

        let x = state.to_f64().unwrap_or(f64::NAN);
        let delta = x - self.mean;
        self.mean += delta / self.n as f64;
        self.m2 += delta * (x - self.mean);
    }

    /// Acceptance probability over the most recent window of iterations.
    pub fn p_accept(&self) -> f64 {
        if self.accept_window.is_empty() {
            return 0.0;
        }
        let accepted = self.accept_window.iter().filter(|&&a| a).count();
        accepted as f64 / self.accept_window.len() as f64
    }

    /// Running mean over all observed states.
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Running population variance over all observed states.
    pub fn variance(&self) -> f64 {
        if self.n == 0 {
            0.0
        } else {
            self.m2 / self.n as f64
        }
    }

    /// Snapshot of all tracked diagnostics.
    pub fn stats(&self) -> ChainStats {
        ChainStats {
            n: self.n,
            p_accept: self.p_accept(),
            mean: self.mean(),
            std_dev: self.variance().sqrt(),
        }
    }
}
