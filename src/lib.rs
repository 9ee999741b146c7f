pub mod core;
pub mod distributions;
pub mod error;
pub mod hmc;
pub mod io;
pub mod metropolis_hastings;
pub mod postprocess;
pub mod stats;
