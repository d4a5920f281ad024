//! Sweep an observation simulator over a grid of hour angles and collect the
//! outcome and log files of every run.

pub mod calibrators;
pub mod cli;
pub mod config;
pub mod error;
pub mod grid;
pub mod harvest;
pub mod logging;
pub mod runner;
pub mod sched_block;
pub mod sweep;

pub type Result<T> = anyhow::Result<T>;

use cli::Cli;
use runner::SystemProcess;
use sweep::{Simulation, SweepReport};

/// Resolve the command line and run the whole request against the real tools.
pub fn run(cli: Cli) -> Result<Vec<SweepReport>> {
    let config = cli.resolve()?;
    Simulation::new(&config, &SystemProcess).run()
}
