use crate::calibrators::CalibratorTable;
use crate::runner::RunResult;
use crate::sched_block::SkyPosition;

use anyhow::Context;
use serde::Serialize;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

/// One simulated hour angle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HaRun {
    pub ha: f64,
    pub result: RunResult,
}

/// Everything one scheduling block's sweep produced.
#[derive(Debug, Clone, Serialize)]
pub struct SweepReport {
    pub xml_file: String,
    pub position: SkyPosition,
    pub runs: Vec<HaRun>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calibrators: Option<CalibratorTable>,
}

impl SweepReport {
    pub fn results(&self) -> Vec<&RunResult> {
        self.runs.iter().map(|r| &r.result).collect()
    }

    /// `<HA>h: <result>` per run, in HA order.
    pub fn result_lines(&self) -> Vec<String> {
        self.runs
            .iter()
            .map(|run| format!("{}h: {}", run.ha, run.result))
            .collect()
    }

    pub fn failures(&self) -> usize {
        self.runs.iter().filter(|r| !r.result.is_success()).count()
    }

    /// Append this block's section to a shared summary file.
    pub fn append_to_summary(&self, path: &Path) -> anyhow::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("open {}", path.display()))?;
        for line in self.result_lines() {
            writeln!(file, "{}", line).with_context(|| format!("write {}", path.display()))?;
        }
        Ok(())
    }
}

/// Mark the start of a block's section in the shared summary file.
pub fn append_summary_header(path: &Path, xml_file: &str) -> anyhow::Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open {}", path.display()))?;
    write!(file, "\n{}\n", xml_file).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

/// Write all reports as pretty-printed JSON.
pub fn write_json_report(path: &Path, reports: &[SweepReport]) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(reports)?;
    std::fs::write(path, json).with_context(|| format!("write {}", path.display()))
}
