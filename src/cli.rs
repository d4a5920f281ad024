use crate::config::{DEFAULT_SIMULATOR, SweepConfig, SweepSettings};
use crate::harvest::{ConfirmPolicy, HarvestLayout};
use crate::runner::SimulatorOptions;
use crate::sched_block::fetch::DEFAULT_DATABASE;
use crate::sched_block::{RetrievalTool, SimRequest};

use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "ha-sweep")]
#[command(about = "Simulate scheduling blocks over a grid of hour angles", long_about = None)]
pub struct Cli {
    /// Project code, scheduling-block XML (`.xml`) or project archive (`.aot`).
    pub request: String,

    /// Scheduling-block name (project-code requests only).
    #[arg(default_value = "")]
    pub sb_name: String,

    /// Array configuration passed to the simulator.
    #[arg(short = 'C', long)]
    pub array_config: Option<String>,

    /// Correlator passed to the simulator.
    #[arg(short = 'c', long)]
    pub correlator: Option<String>,

    /// Smallest HA in hours [default: from the block's declination].
    #[arg(long, alias = "min_HA", allow_negative_numbers = true)]
    pub min_ha: Option<f64>,

    /// Largest HA in hours [default: from the block's declination].
    #[arg(long, alias = "max_HA", allow_negative_numbers = true)]
    pub max_ha: Option<f64>,

    /// HA step in hours.
    #[arg(long, alias = "HA_step", default_value_t = 1.0, allow_negative_numbers = true)]
    pub ha_step: f64,

    /// Observation date (YYYY-MM-DD).
    #[arg(long, alias = "obs_date")]
    pub obs_date: Option<String>,

    /// Have the simulator log its calibrator queries and tabulate them.
    #[arg(long, alias = "writeQueryLog")]
    pub write_query_log: bool,

    /// Simulation tool to run.
    #[arg(long, default_value = DEFAULT_SIMULATOR)]
    pub simulator: String,

    /// Working directory of the simulator; the request is resolved against it.
    #[arg(long, default_value = ".")]
    pub workdir: PathBuf,

    /// Where harvested log files go inside each log folder.
    #[arg(long, value_enum, default_value_t = HarvestLayout::PerHaFolder)]
    pub layout: HarvestLayout,

    /// How to answer questions about existing and leftover files.
    #[arg(long, value_enum, default_value_t = ConfirmPolicy::Ask)]
    pub on_existing: ConfirmPolicy,

    /// SB retrieval script [default: first existing well-known location].
    #[arg(long)]
    pub getsb: Option<PathBuf>,

    /// Run the retrieval script on this host over ssh.
    #[arg(long)]
    pub getsb_host: Option<String>,

    /// Database the retrieval script connects to.
    #[arg(long, default_value = DEFAULT_DATABASE)]
    pub getsb_database: String,

    /// Also write all results as JSON to this file.
    #[arg(long)]
    pub json_report: Option<PathBuf>,

    /// Log at debug level unless a filter is set in the environment.
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Turn parsed arguments into a validated configuration.
    pub fn resolve(self) -> Result<SweepConfig, crate::error::SweepError> {
        let mut retrieval = RetrievalTool::locate(self.getsb_host);
        if let Some(script) = self.getsb {
            retrieval.script = script;
        }
        retrieval.database = self.getsb_database;

        let config = SweepConfig {
            request: SimRequest::classify(&self.request, &self.sb_name),
            settings: SweepSettings {
                workdir: self.workdir,
                simulator: self.simulator,
                min_ha: self.min_ha,
                max_ha: self.max_ha,
                ha_step: self.ha_step,
                obs_date: self.obs_date,
                options: SimulatorOptions {
                    array_config: self.array_config,
                    correlator: self.correlator,
                    write_query_log: self.write_query_log,
                },
                layout: self.layout,
                policy: self.on_existing,
            },
            retrieval,
            json_report: self.json_report,
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SweepError;
    use pretty_assertions::assert_eq;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("ha-sweep").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn project_request_with_all_options() {
        let cli = parse(&[
            "2025.1.00001.S",
            "G022_a_06_TM1",
            "-C",
            "C43-5",
            "-c",
            "BL",
            "--min-ha",
            "-2",
            "--max-ha",
            "1",
            "--ha-step",
            "0.5",
            "--obs-date",
            "2025-03-01",
            "--write-query-log",
            "--on-existing",
            "delete",
        ]);
        let config = cli.resolve().unwrap();
        assert_eq!(
            config.request,
            SimRequest::Project {
                code: "2025.1.00001.S".to_string(),
                sb_name: "G022_a_06_TM1".to_string()
            }
        );
        let s = &config.settings;
        assert_eq!(s.min_ha, Some(-2.0));
        assert_eq!(s.max_ha, Some(1.0));
        assert_eq!(s.ha_step, 0.5);
        assert_eq!(s.obs_date.as_deref(), Some("2025-03-01"));
        assert_eq!(
            s.options,
            SimulatorOptions {
                array_config: Some("C43-5".to_string()),
                correlator: Some("BL".to_string()),
                write_query_log: true,
            }
        );
        assert_eq!(s.policy, ConfirmPolicy::Delete);
        assert_eq!(s.layout, HarvestLayout::PerHaFolder);
    }

    #[test]
    fn xml_request_defaults() {
        let config = parse(&["SB1.xml"]).resolve().unwrap();
        assert_eq!(config.request, SimRequest::Xml("SB1.xml".to_string()));
        assert_eq!(config.settings.simulator, "simulateSB.py");
        assert_eq!(config.settings.ha_step, 1.0);
        assert_eq!(config.settings.min_ha, None);
        assert_eq!(config.settings.options, SimulatorOptions::default());
        assert_eq!(config.settings.policy, ConfirmPolicy::Ask);
    }

    #[test]
    fn legacy_flag_spellings_are_accepted() {
        let cli = parse(&["SB1.xml", "--min_HA", "-3", "--HA_step", "2", "--writeQueryLog"]);
        assert_eq!(cli.min_ha, Some(-3.0));
        assert_eq!(cli.ha_step, 2.0);
        assert!(cli.write_query_log);
    }

    #[test]
    fn invalid_bounds_are_rejected_before_anything_runs() {
        let err = parse(&["SB1.xml", "--min-ha", "1", "--max-ha", "-1"])
            .resolve()
            .unwrap_err();
        assert!(matches!(err, SweepError::InvalidArguments(_)));
        let err = parse(&["SB1.xml", "--ha-step", "-1"]).resolve().unwrap_err();
        assert!(matches!(err, SweepError::InvalidArguments(_)));
    }

    #[test]
    fn layout_values() {
        let cli = parse(&["SB1.xml", "--layout", "ha-prefixed"]);
        assert_eq!(cli.layout, HarvestLayout::HaPrefixed);
    }
}
