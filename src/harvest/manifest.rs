use crate::calibrators::CalibratorType;

use anyhow::Context;
use glob::Pattern;
use std::path::PathBuf;

/// The log files one simulator run is expected to leave in the working
/// directory: `<prefix>_*.txt`, where the prefix is `log_<xml file name>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogManifest {
    workdir: PathBuf,
    prefix: String,
}

impl LogManifest {
    pub fn new(workdir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            workdir: workdir.into(),
            prefix: prefix.into(),
        }
    }

    /// Manifest of the logs the simulator writes for `xml_file`.
    pub fn for_xml(workdir: impl Into<PathBuf>, xml_file: &str) -> Self {
        Self::new(workdir, format!("log_{}", xml_file))
    }

    /// Glob pattern matching every file of the manifest.
    pub fn pattern(&self) -> String {
        let dir = Pattern::escape(&self.workdir.to_string_lossy());
        let name = format!("{}_*.txt", Pattern::escape(&self.prefix));
        if dir.is_empty() {
            name
        } else {
            format!("{}/{}", dir.trim_end_matches('/'), name)
        }
    }

    /// All matching files currently present, sorted by name.
    pub fn discover(&self) -> anyhow::Result<Vec<PathBuf>> {
        let pattern = self.pattern();
        let mut files = Vec::new();
        for entry in glob::glob(&pattern).with_context(|| format!("bad log file pattern {}", pattern))? {
            let path = entry.with_context(|| format!("read match of {}", pattern))?;
            if path.is_file() {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    /// Query log the simulator writes for one calibrator type.
    pub fn calibrator_query_file(&self, cal_type: CalibratorType) -> PathBuf {
        self.workdir
            .join(format!("{}_{}.txt", self.prefix, cal_type.as_str()))
    }

    /// Where the per-type query logs are concatenated to.
    pub fn concatenated_queries_file(&self) -> PathBuf {
        self.workdir
            .join(format!("{}_calibrator_queries.txt", self.prefix))
    }
}
