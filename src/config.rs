//! Validated sweep configuration.

use crate::error::SweepError;
use crate::grid::validate_bounds;
use crate::harvest::{ConfirmPolicy, HarvestLayout};
use crate::runner::SimulatorOptions;
use crate::sched_block::{RetrievalTool, SimRequest};

use chrono::NaiveDate;
use std::path::PathBuf;

pub const DEFAULT_SIMULATOR: &str = "simulateSB.py";
/// Scratch file the simulator leaves behind after every run.
pub const SIM_RESULT_FILENAME: &str = "SimulatedCalResultsData.dat";
pub const CALIBRATOR_TABLE_FILENAME: &str = "available_calibrators.csv";

/// Settings shared by the sweeps of every scheduling block of a request.
#[derive(Debug, Clone)]
pub struct SweepSettings {
    /// Where the simulator runs and drops its log files. Request paths are
    /// relative to it.
    pub workdir: PathBuf,
    pub simulator: String,
    pub min_ha: Option<f64>,
    pub max_ha: Option<f64>,
    pub ha_step: f64,
    pub obs_date: Option<String>,
    pub options: SimulatorOptions,
    pub layout: HarvestLayout,
    pub policy: ConfirmPolicy,
}

impl SweepSettings {
    /// Settings with the command-line defaults for `workdir`.
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
            simulator: DEFAULT_SIMULATOR.to_string(),
            min_ha: None,
            max_ha: None,
            ha_step: 1.0,
            obs_date: None,
            options: SimulatorOptions::default(),
            layout: HarvestLayout::default(),
            policy: ConfirmPolicy::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SweepConfig {
    pub request: SimRequest,
    pub settings: SweepSettings,
    pub retrieval: RetrievalTool,
    pub json_report: Option<PathBuf>,
}

impl SweepConfig {
    /// Reject argument combinations that can never produce a sweep.
    pub fn validate(&self) -> Result<(), SweepError> {
        let s = &self.settings;
        validate_bounds(s.min_ha, s.max_ha, s.ha_step)?;

        if let SimRequest::Project { sb_name, .. } = &self.request {
            if sb_name.trim().is_empty() {
                return Err(SweepError::invalid(
                    "an SB name is required when simulating by project code",
                ));
            }
        }
        if let Some(date) = &s.obs_date {
            parse_obs_date(date)?;
        }
        if s.simulator.trim().is_empty() {
            return Err(SweepError::invalid("simulator command must not be empty"));
        }
        Ok(())
    }
}

/// Parse an observation date given as `YYYY-MM-DD`.
pub fn parse_obs_date(date: &str) -> Result<NaiveDate, SweepError> {
    // chrono accepts unpadded fields; the simulator does not.
    let padded = date.len() == 10 && date.as_bytes()[4] == b'-' && date.as_bytes()[7] == b'-';
    match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        Ok(parsed) if padded => Ok(parsed),
        Ok(_) => Err(SweepError::invalid(format!(
            "observation date must look like YYYY-MM-DD (got {date:?})"
        ))),
        Err(e) => Err(SweepError::invalid(format!(
            "observation date must be a calendar date as YYYY-MM-DD (got {date:?}: {e})"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(request: SimRequest) -> SweepConfig {
        SweepConfig {
            request,
            settings: SweepSettings::new("."),
            retrieval: RetrievalTool::locate(None),
            json_report: None,
        }
    }

    #[test]
    fn defaults_are_valid() {
        config(SimRequest::Xml("a.xml".to_string())).validate().unwrap();
    }

    #[test]
    fn project_mode_needs_sb_name() {
        let cfg = config(SimRequest::Project {
            code: "2025.1.00001.S".to_string(),
            sb_name: String::new(),
        });
        assert!(matches!(cfg.validate(), Err(SweepError::InvalidArguments(_))));
    }

    #[test]
    fn bad_bounds_and_dates_fail_fast() {
        let mut cfg = config(SimRequest::Xml("a.xml".to_string()));
        cfg.settings.min_ha = Some(2.0);
        cfg.settings.max_ha = Some(-2.0);
        assert!(cfg.validate().is_err());

        let mut cfg = config(SimRequest::Xml("a.xml".to_string()));
        cfg.settings.ha_step = 0.0;
        assert!(cfg.validate().is_err());

        let mut cfg = config(SimRequest::Xml("a.xml".to_string()));
        cfg.settings.obs_date = Some("2025-3-1".to_string());
        assert!(cfg.validate().is_err());
        for impossible in ["2025-02-30", "2025-13-45", "0000-00-00"] {
            cfg.settings.obs_date = Some(impossible.to_string());
            assert!(
                matches!(cfg.validate(), Err(SweepError::InvalidArguments(_))),
                "{impossible} accepted"
            );
        }
        cfg.settings.obs_date = Some("2024-02-29".to_string());
        cfg.validate().unwrap();
        cfg.settings.obs_date = Some("2025-03-01".to_string());
        cfg.validate().unwrap();
    }
}
