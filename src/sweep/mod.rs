//! Run aggregation: resolving a request into scheduling blocks and sweeping
//! each of them in turn.

pub mod block;
pub mod report;

pub use block::BlockSweep;
pub use report::{HaRun, SweepReport, append_summary_header, write_json_report};

use crate::config::{SIM_RESULT_FILENAME, SweepConfig};
use crate::error::SweepError;
use crate::harvest::{Confirm, Prompt, prepare_log_folder};
use crate::runner::ExternalProcess;
use crate::sched_block::{SimRequest, extract_sched_blocks, xml_filename};

use anyhow::Context;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

const BLOCK_SEPARATOR: &str = "------------------------------------------";

/// Name of the log folder for the block stored in `xml_file`.
pub fn log_folder_name(xml_file: &str) -> String {
    let stem = xml_file.strip_suffix(".xml").unwrap_or(xml_file);
    format!("log_files_{}", stem)
}

/// A whole request: one or more scheduling blocks swept one after another.
pub struct Simulation<'a> {
    config: &'a SweepConfig,
    process: &'a dyn ExternalProcess,
    confirm: &'a dyn Confirm,
}

impl<'a> Simulation<'a> {
    /// Prompts are answered according to the configured policy.
    pub fn new(config: &'a SweepConfig, process: &'a dyn ExternalProcess) -> Self {
        Self {
            config,
            process,
            confirm: &config.settings.policy,
        }
    }

    /// Answer prompts with `confirm` instead.
    pub fn with_confirm(self, confirm: &'a dyn Confirm) -> Self {
        Self { confirm, ..self }
    }

    fn workdir(&self) -> &Path {
        &self.config.settings.workdir
    }

    fn summary_file(&self) -> Option<PathBuf> {
        match &self.config.request {
            SimRequest::Archive(aot) => {
                Some(self.workdir().join(format!("{}_simulation_summary.txt", aot)))
            }
            _ => None,
        }
    }

    pub fn run(&self) -> anyhow::Result<Vec<SweepReport>> {
        self.config.validate()?;

        let xml_files = self.prepare_xml_files()?;
        let log_folders: Vec<PathBuf> = xml_files
            .iter()
            .map(|f| self.workdir().join(log_folder_name(f)))
            .collect();
        for folder in &log_folders {
            prepare_log_folder(folder, self.confirm)?;
        }

        let summary = self.summary_file();
        if let Some(path) = &summary {
            if path.exists() {
                info!(path = %path.display(), "deleting previous summary file");
                fs::remove_file(path).with_context(|| format!("delete {}", path.display()))?;
            }
        }

        let mut reports = Vec::with_capacity(xml_files.len());
        for (xml_file, log_folder) in xml_files.iter().zip(&log_folders) {
            info!(xml = %xml_file, "going to run simulations");
            if let Some(path) = &summary {
                append_summary_header(path, xml_file)?;
            }
            let report = BlockSweep::new(&self.config.settings, xml_file.as_str(), log_folder.as_path())
                .run(self.process, self.confirm)?;
            if let Some(path) = &summary {
                report.append_to_summary(path)?;
            }
            println!("\n{}\n", BLOCK_SEPARATOR);
            reports.push(report);
        }

        if let Some(path) = &self.config.json_report {
            write_json_report(path, &reports)?;
            info!(path = %path.display(), "wrote JSON report");
        }

        self.clean_up(&xml_files, &log_folders, summary.as_deref())?;
        Ok(reports)
    }

    /// Resolve the request into XML file names relative to the working directory.
    fn prepare_xml_files(&self) -> anyhow::Result<Vec<String>> {
        let settings = &self.config.settings;
        match &self.config.request {
            SimRequest::Xml(file) => Ok(vec![file.clone()]),
            SimRequest::Archive(aot) => {
                if let Some(array_config) = &settings.options.array_config {
                    let prompt = Prompt::UseConfigForAllBlocks(array_config.clone());
                    if !self.confirm.confirm(&prompt)? {
                        return Err(SweepError::Declined(format!(
                            "not using configuration {} for every SB",
                            array_config
                        ))
                        .into());
                    }
                }
                extract_sched_blocks(self.process, self.workdir(), aot)
            }
            SimRequest::Project { code, sb_name } => {
                let filename = xml_filename(sb_name);
                self.config.retrieval.download_to_file(
                    self.process,
                    &self.workdir().join(&filename),
                    code,
                    sb_name,
                )?;
                Ok(vec![filename])
            }
        }
    }

    fn clean_up(&self, xml_files: &[String], log_folders: &[PathBuf], summary: Option<&Path>) -> anyhow::Result<()> {
        if !matches!(self.config.request, SimRequest::Xml(_)) {
            for xml_file in xml_files {
                let path = self.workdir().join(xml_file);
                fs::remove_file(&path).with_context(|| format!("delete {}", path.display()))?;
                info!(path = %path.display(), "deleted xml");
            }
        }

        let scratch = self.workdir().join(SIM_RESULT_FILENAME);
        if scratch.exists() {
            fs::remove_file(&scratch).with_context(|| format!("delete {}", scratch.display()))?;
            info!(path = %scratch.display(), "deleted simulator scratch file");
        }

        if self.confirm.confirm(&Prompt::KeepLogFiles)? {
            let names: Vec<String> = log_folders.iter().map(|f| f.display().to_string()).collect();
            println!("log files can be found in following folder(s): {}", names.join(", "));
            if let Some(path) = summary {
                println!("summary file: {}", path.display());
            }
        } else {
            for folder in log_folders {
                fs::remove_dir_all(folder).with_context(|| format!("delete {}", folder.display()))?;
                info!(folder = %folder.display(), "deleted log folder");
            }
            if let Some(path) = summary {
                fs::remove_file(path).with_context(|| format!("delete {}", path.display()))?;
            }
        }
        Ok(())
    }
}
