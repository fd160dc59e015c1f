//! Simulation orchestration: distribution choice, depths and noise policy.

mod config;
mod runner;

pub use config::{CountModel, SimulationConfig};
pub use runner::{simulate, simulate_seeded};
