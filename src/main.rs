use clap::Parser;

use ha_sweep::Result;
use ha_sweep::cli::Cli;
use ha_sweep::logging::init_logging;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    let reports = ha_sweep::run(cli)?;

    let failures: usize = reports.iter().map(|r| r.failures()).sum();
    let runs: usize = reports.iter().map(|r| r.runs.len()).sum();
    println!("{} of {} simulations succeeded", runs - failures, runs);

    Ok(())
}
