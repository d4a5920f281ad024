//! Run executor: one synchronous simulator invocation per hour angle.

pub mod classify;
pub mod process;

pub use classify::identify_error;
pub use process::{ExternalProcess, ProcessOutput, SystemProcess, display_command};

use crate::error::SweepError;
use crate::grid::signed_ha;

use serde::Serialize;
use std::fmt;
use std::path::Path;
use tracing::{info, warn};

/// Outcome of a single simulator run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "lowercase")]
pub enum RunResult {
    Success,
    Failure(String),
}

impl RunResult {
    pub fn is_success(&self) -> bool {
        matches!(self, RunResult::Success)
    }
}

impl fmt::Display for RunResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunResult::Success => f.write_str("success"),
            RunResult::Failure(msg) => f.write_str(msg),
        }
    }
}

/// Simulator options that go on the command line only when set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimulatorOptions {
    pub array_config: Option<String>,
    pub correlator: Option<String>,
    pub write_query_log: bool,
}

/// Everything needed to build the simulator command line for one block.
#[derive(Debug, Clone)]
pub struct SimulationCommand {
    pub program: String,
    /// Positional block identification (the XML file name).
    pub block_args: Vec<String>,
    pub obs_date: Option<String>,
    pub options: SimulatorOptions,
}

impl SimulationCommand {
    /// `TRANSIT<signed HA>h`, optionally followed by `,<date>`.
    pub fn epoch(&self, ha: f64) -> String {
        let mut epoch = format!("TRANSIT{}h", signed_ha(ha));
        if let Some(date) = &self.obs_date {
            epoch.push(',');
            epoch.push_str(date);
        }
        epoch
    }

    pub fn args(&self, ha: f64) -> Vec<String> {
        let mut args = self.block_args.clone();
        args.push(self.epoch(ha));
        if let Some(config) = &self.options.array_config {
            args.push("-C".to_string());
            args.push(config.clone());
        }
        if let Some(correlator) = &self.options.correlator {
            args.push("-c".to_string());
            args.push(correlator.clone());
        }
        if self.options.write_query_log {
            args.push("--writeQueryLog".to_string());
        }
        args
    }

    /// Run the simulator for `ha` in `cwd` and classify the outcome.
    ///
    /// Only a failure to launch the simulator is an error.
    pub fn execute(
        &self,
        process: &dyn ExternalProcess,
        cwd: &Path,
        ha: f64,
    ) -> Result<RunResult, SweepError> {
        let args = self.args(ha);
        info!(command = %display_command(&self.program, &args), "executing command");

        let output = process
            .run(&self.program, &args, cwd)
            .map_err(|source| SweepError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if output.success() {
            Ok(RunResult::Success)
        } else {
            let message = identify_error(&output.stdout, &output.stderr);
            warn!(ha, code = ?output.code, %message, "simulation failed");
            Ok(RunResult::Failure(message))
        }
    }
}
