use crate::error::SweepError;
use crate::runner::{ExternalProcess, display_command};
use crate::sched_block::{SchedBlockXml, xml_filename};

use anyhow::Context;
use glob::Pattern;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Archive members holding scheduling blocks.
pub const SCHED_BLOCK_MEMBERS: &str = "Sch*.xml";

fn extracted_members(workdir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let pattern = format!(
        "{}/{}",
        Pattern::escape(&workdir.to_string_lossy()).trim_end_matches('/'),
        SCHED_BLOCK_MEMBERS
    );
    let mut files = Vec::new();
    for entry in glob::glob(&pattern)? {
        files.push(entry?);
    }
    files.sort();
    Ok(files)
}

/// Extract every scheduling block of the project archive `aot` into
/// `workdir`, renaming each to `<SB name>.xml`.
///
/// Returns the new file names, relative to `workdir`.
pub fn extract_sched_blocks(
    process: &dyn ExternalProcess,
    workdir: &Path,
    aot: &str,
) -> anyhow::Result<Vec<String>> {
    info!(archive = aot, "extracting xml files");
    if !extracted_members(workdir)?.is_empty() {
        return Err(SweepError::AlreadyExists(workdir.join(SCHED_BLOCK_MEMBERS)).into());
    }

    let args = vec![aot.to_string(), SCHED_BLOCK_MEMBERS.to_string()];
    info!(command = %display_command("unzip", &args), "unpacking archive");
    let output = process
        .run("unzip", &args, workdir)
        .map_err(|source| SweepError::Spawn {
            program: "unzip".to_string(),
            source,
        })?;
    if !output.success() {
        return Err(SweepError::ToolFailed {
            program: "unzip".to_string(),
            code: output.code,
            message: output.stderr.lines().last().unwrap_or_default().to_string(),
        }
        .into());
    }

    let mut renamed = Vec::new();
    for member in extracted_members(workdir)? {
        let xml = SchedBlockXml::from_file(&member)?;
        let name = xml
            .name()
            .with_context(|| format!("read SB name from {}", member.display()))?;
        let filename = xml_filename(&name);
        let dest = workdir.join(&filename);
        if dest.exists() {
            return Err(SweepError::AlreadyExists(dest).into());
        }
        fs::rename(&member, &dest)
            .with_context(|| format!("rename {} to {}", member.display(), dest.display()))?;
        renamed.push(filename);
    }
    info!(files = ?renamed, "extracted xml files");
    Ok(renamed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::ProcessOutput;
    use crate::sched_block::xml::tests::sched_block_xml;
    use pretty_assertions::assert_eq;
    use std::io;

    /// Pretends to unzip two scheduling blocks.
    struct FakeUnzip;

    impl ExternalProcess for FakeUnzip {
        fn run(&self, program: &str, args: &[String], cwd: &Path) -> io::Result<ProcessOutput> {
            assert_eq!(program, "unzip");
            assert_eq!(args[1], SCHED_BLOCK_MEMBERS);
            fs::write(cwd.join("SchedBlock0.xml"), sched_block_xml("SB_TM1", 1.0, 2.0))?;
            fs::write(cwd.join("SchedBlock1.xml"), sched_block_xml("SB_7M", 1.0, 2.0))?;
            Ok(ProcessOutput {
                code: Some(0),
                ..Default::default()
            })
        }
    }

    #[test]
    fn members_are_renamed_by_sb_name() {
        let dir = tempfile::tempdir().unwrap();
        let files = extract_sched_blocks(&FakeUnzip, dir.path(), "project.aot").unwrap();
        assert_eq!(files, vec!["SB_TM1.xml", "SB_7M.xml"]);
        assert!(dir.path().join("SB_7M.xml").is_file());
        assert!(!dir.path().join("SchedBlock0.xml").exists());
    }

    #[test]
    fn refuses_when_members_already_exist() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("SchedBlock9.xml"), "<x/>").unwrap();
        let err = extract_sched_blocks(&FakeUnzip, dir.path(), "project.aot").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SweepError>(),
            Some(SweepError::AlreadyExists(_))
        ));
    }
}
