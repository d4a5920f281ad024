use crate::calibrators::{Availability, CalibratorType};

use anyhow::Context;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

/// Cell for a type that was queried but returned no calibrators.
pub const NONE_MARKER: &str = "None";
/// Cell for a type that was not queried at that HA.
pub const NOT_QUERIED_MARKER: &str = "not queried";

#[derive(Debug, Clone, Serialize)]
pub struct CalibratorRow {
    pub ha: f64,
    pub available: Availability,
}

/// Available calibrators per HA, one row per simulated HA in sweep order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CalibratorTable {
    pub rows: Vec<CalibratorRow>,
}

impl CalibratorTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, ha: f64, available: Availability) {
        self.rows.push(CalibratorRow { ha, available });
    }

    /// Types queried at any HA of the sweep.
    pub fn queried_types(&self) -> Vec<CalibratorType> {
        let types: BTreeSet<CalibratorType> = self
            .rows
            .iter()
            .flat_map(|row| row.available.keys().copied())
            .collect();
        types.into_iter().collect()
    }

    /// Render as comma-separated text with a header row.
    pub fn render(&self) -> String {
        let types = self.queried_types();

        let mut out = String::from("HA");
        for t in &types {
            out.push(',');
            out.push_str(t.as_str());
        }
        out.push('\n');

        for row in &self.rows {
            out.push_str(&row.ha.to_string());
            for t in &types {
                out.push(',');
                match row.available.get(t) {
                    Some(cals) if cals.is_empty() => out.push_str(NONE_MARKER),
                    Some(cals) => out.push_str(&cals.join(";")),
                    None => out.push_str(NOT_QUERIED_MARKER),
                }
            }
            out.push('\n');
        }
        out
    }

    pub fn write(&self, path: &Path) -> anyhow::Result<()> {
        fs::write(path, self.render()).with_context(|| format!("write {}", path.display()))
    }
}
