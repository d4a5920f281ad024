//! Log harvesting: draining the working directory of a run's log files
//! before the next run starts.

pub mod confirm;
pub mod manifest;

pub use confirm::{Confirm, ConfirmPolicy, Prompt, ask_yes_no};
pub use manifest::LogManifest;

use crate::calibrators::CalibratorType;
use crate::error::SweepError;
use crate::grid::signed_ha;

use anyhow::Context;
use clap::ValueEnum;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Written after each concatenated calibrator query log.
pub const QUERY_LOG_SEPARATOR: &str = "\n\n######################################\n\n";

/// Where harvested files end up inside the block's log folder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum HarvestLayout {
    /// `HA<signed HA>h/<file>`
    #[default]
    PerHaFolder,
    /// `HA<HA>h_<file>` directly in the log folder.
    HaPrefixed,
}

/// Delete leftovers of a previous invocation so they are not attributed to
/// the coming sweep. Declining aborts.
pub fn remove_stale_logs(manifest: &LogManifest, confirm: &dyn Confirm) -> anyhow::Result<()> {
    let stale = manifest.discover()?;
    if stale.is_empty() {
        return Ok(());
    }

    let names: Vec<String> = stale.iter().map(|p| p.display().to_string()).collect();
    if !confirm.confirm(&Prompt::RemoveStaleLogFiles(names))? {
        return Err(SweepError::StaleArtifacts {
            what: "log files",
            path: PathBuf::from(manifest.pattern()),
        }
        .into());
    }
    for file in &stale {
        info!(path = %file.display(), "deleting stale log file");
        fs::remove_file(file).with_context(|| format!("delete {}", file.display()))?;
    }
    Ok(())
}

/// Create a block's root log folder, confirming removal of an existing one.
pub fn prepare_log_folder(folder: &Path, confirm: &dyn Confirm) -> anyhow::Result<()> {
    if folder.is_dir() {
        if !confirm.confirm(&Prompt::RemoveLogFolder(folder.display().to_string()))? {
            return Err(SweepError::StaleArtifacts {
                what: "folder containing log files",
                path: folder.to_path_buf(),
            }
            .into());
        }
        info!(folder = %folder.display(), "deleting existing log folder");
        fs::remove_dir_all(folder).with_context(|| format!("delete {}", folder.display()))?;
    }
    fs::create_dir_all(folder).with_context(|| format!("create {}", folder.display()))?;
    Ok(())
}

/// Merge the per-type calibrator query logs of the last run into one file,
/// removing the originals.
pub fn concatenate_calibrator_queries(manifest: &LogManifest) -> anyhow::Result<PathBuf> {
    let out_path = manifest.concatenated_queries_file();
    let mut merged = String::new();
    for cal_type in CalibratorType::ALL {
        let path = manifest.calibrator_query_file(cal_type);
        if !path.is_file() {
            continue;
        }
        let text = fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
        merged.push_str(&text);
        merged.push_str(QUERY_LOG_SEPARATOR);
        fs::remove_file(&path).with_context(|| format!("delete {}", path.display()))?;
    }
    fs::write(&out_path, merged).with_context(|| format!("write {}", out_path.display()))?;
    Ok(out_path)
}

/// Move every file of the manifest into `log_folder` for hour angle `ha`.
///
/// The file set is discovered once and moved as a unit. Returns the new
/// locations.
pub fn harvest(
    manifest: &LogManifest,
    log_folder: &Path,
    ha: f64,
    layout: HarvestLayout,
) -> anyhow::Result<Vec<PathBuf>> {
    let files = manifest.discover()?;

    let dest_dir = match layout {
        HarvestLayout::PerHaFolder => {
            let dir = log_folder.join(format!("HA{}h", signed_ha(ha)));
            fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
            dir
        }
        HarvestLayout::HaPrefixed => log_folder.to_path_buf(),
    };

    let mut moved = Vec::with_capacity(files.len());
    for src in files {
        let Some(name) = src.file_name().map(|n| n.to_string_lossy().into_owned()) else {
            continue;
        };
        let dest = match layout {
            HarvestLayout::PerHaFolder => dest_dir.join(&name),
            HarvestLayout::HaPrefixed => dest_dir.join(format!("HA{}h_{}", ha, name)),
        };
        move_file(&src, &dest)
            .with_context(|| format!("move {} to {}", src.display(), dest.display()))?;
        debug!(from = %src.display(), to = %dest.display(), "harvested log file");
        moved.push(dest);
    }
    Ok(moved)
}

/// Rename, falling back to copy-and-delete when crossing filesystems.
fn move_file(src: &Path, dest: &Path) -> io::Result<()> {
    match fs::rename(src, dest) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::CrossesDevices => {
            fs::copy(src, dest)?;
            fs::remove_file(src)
        }
        Err(err) => Err(err),
    }
}
