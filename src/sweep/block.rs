use crate::calibrators::{CalibratorTable, read_available_calibrators};
use crate::config::{CALIBRATOR_TABLE_FILENAME, SweepSettings};
use crate::grid::build_grid;
use crate::harvest::{Confirm, LogManifest, concatenate_calibrator_queries, harvest, remove_stale_logs};
use crate::runner::{ExternalProcess, SimulationCommand};
use crate::sched_block::SchedBlockXml;
use crate::sweep::report::{HaRun, SweepReport};

use anyhow::Context;
use std::path::{Path, PathBuf};
use tracing::{info, info_span};

/// The HA sweep of a single scheduling-block XML.
#[derive(Debug)]
pub struct BlockSweep<'a> {
    pub settings: &'a SweepSettings,
    /// XML file name, relative to the working directory.
    pub xml_file: String,
    /// Existing folder the block's logs are harvested into.
    pub log_folder: PathBuf,
}

impl<'a> BlockSweep<'a> {
    pub fn new(settings: &'a SweepSettings, xml_file: impl Into<String>, log_folder: impl Into<PathBuf>) -> Self {
        Self {
            settings,
            xml_file: xml_file.into(),
            log_folder: log_folder.into(),
        }
    }

    fn workdir(&self) -> &Path {
        &self.settings.workdir
    }

    /// Build the grid, then simulate and harvest each HA in turn.
    ///
    /// A run's logs are fully harvested before the next run starts.
    pub fn run(&self, process: &dyn ExternalProcess, confirm: &dyn Confirm) -> anyhow::Result<SweepReport> {
        let _span = info_span!("block", xml = %self.xml_file).entered();
        let s = self.settings;

        let xml_path = self.workdir().join(&self.xml_file);
        let xml = SchedBlockXml::from_file(&xml_path)?;
        let position = xml
            .representative_position()
            .with_context(|| format!("read representative coordinates of {}", xml_path.display()))?;
        info!(ra_deg = position.ra_deg, dec_deg = position.dec_deg, "representative coordinates");

        let has = build_grid(s.min_ha, s.max_ha, s.ha_step, Some(position.dec_deg))?;
        info!(count = has.len(), "hour angles to simulate");

        let manifest = LogManifest::for_xml(self.workdir(), &self.xml_file);
        remove_stale_logs(&manifest, confirm)?;

        let command = SimulationCommand {
            program: s.simulator.clone(),
            block_args: vec![self.xml_file.clone()],
            obs_date: s.obs_date.clone(),
            options: s.options.clone(),
        };
        let query_log = s.options.write_query_log;
        let mut calibrators = query_log.then(CalibratorTable::new);

        let mut runs = Vec::with_capacity(has.len());
        for ha in has {
            let result = command.execute(process, self.workdir(), ha)?;
            if let Some(table) = calibrators.as_mut() {
                table.push(ha, read_available_calibrators(&manifest)?);
                concatenate_calibrator_queries(&manifest)?;
            }
            let moved = harvest(&manifest, &self.log_folder, ha, s.layout)?;
            info!(ha, files = moved.len(), success = result.is_success(), "run harvested");
            runs.push(HaRun { ha, result });
        }

        if let Some(table) = &calibrators {
            let path = self.log_folder.join(CALIBRATOR_TABLE_FILENAME);
            table.write(&path)?;
            info!(path = %path.display(), "wrote calibrator summary");
        }

        let report = SweepReport {
            xml_file: self.xml_file.clone(),
            position,
            runs,
            calibrators,
        };
        for line in report.result_lines() {
            println!("{}", line);
        }
        Ok(report)
    }
}
