//! Calibrator availability: parsing the simulator's query logs and
//! tabulating them per hour angle.

pub mod parse;
pub mod table;

pub use parse::{parse_calibrator_line, parse_calibrator_log};
pub use table::{CalibratorTable, NONE_MARKER, NOT_QUERIED_MARKER};

use crate::harvest::LogManifest;

use anyhow::Context;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;

/// Calibrator kinds the simulator writes a query log for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CalibratorType {
    Bandpass,
    Check,
    Phase,
    Pointing,
    Diffgain,
}

impl CalibratorType {
    pub const ALL: [CalibratorType; 5] = [
        CalibratorType::Bandpass,
        CalibratorType::Check,
        CalibratorType::Phase,
        CalibratorType::Pointing,
        CalibratorType::Diffgain,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CalibratorType::Bandpass => "bandpass",
            CalibratorType::Check => "check",
            CalibratorType::Phase => "phase",
            CalibratorType::Pointing => "pointing",
            CalibratorType::Diffgain => "diffgain",
        }
    }
}

impl fmt::Display for CalibratorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Calibrators available at one HA, per type that was queried.
/// A type without an entry was not queried.
pub type Availability = BTreeMap<CalibratorType, Vec<String>>;

/// Read the query logs the last run left in the working directory.
pub fn read_available_calibrators(manifest: &LogManifest) -> anyhow::Result<Availability> {
    let mut available = Availability::new();
    for cal_type in CalibratorType::ALL {
        let path = manifest.calibrator_query_file(cal_type);
        if !path.is_file() {
            continue;
        }
        let text = fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
        available.insert(cal_type, parse_calibrator_log(&text));
    }
    Ok(available)
}
