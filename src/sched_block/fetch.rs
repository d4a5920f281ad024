//! Retrieving scheduling-block XML from the archive database.

use crate::error::SweepError;
use crate::runner::{ExternalProcess, display_command};
use crate::sched_block::SchedBlockXml;

use anyhow::Context;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Locations of the retrieval script, in order of preference.
pub const DEFAULT_GETSB_SCRIPTS: &[&str] = &[
    "/groups/science/scripts/P2G/getsb/getsb.py",
    "/users/ahirota/AIV/science/scripts/P2G/getsb/getsb.py",
];

pub const DEFAULT_DATABASE: &str = "ora.sco.alma.cl:1521/ONLINE.SCO.CL";

/// The external retrieval script, run locally or on a remote host over ssh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrievalTool {
    pub script: PathBuf,
    /// Host to run the script on when the database client is not available locally.
    pub remote_host: Option<String>,
    pub database: String,
}

impl RetrievalTool {
    /// Pick the first default script that exists, or the last candidate when
    /// none does (it may exist on the remote host).
    pub fn locate(remote_host: Option<String>) -> Self {
        let script = DEFAULT_GETSB_SCRIPTS
            .iter()
            .map(PathBuf::from)
            .find(|p| p.is_file())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_GETSB_SCRIPTS[DEFAULT_GETSB_SCRIPTS.len() - 1]));
        Self {
            script,
            remote_host,
            database: DEFAULT_DATABASE.to_string(),
        }
    }

    /// Program and arguments retrieving block `sb_name` of `project_code`.
    pub fn command(&self, project_code: &str, sb_name: &str) -> (String, Vec<String>) {
        let script = self.script.display().to_string();
        match &self.remote_host {
            Some(host) => {
                let target = match std::env::var("USER") {
                    Ok(user) if !user.is_empty() => format!("{}@{}", user, host),
                    _ => host.clone(),
                };
                (
                    "ssh".to_string(),
                    vec![
                        target,
                        format!("{} -p '{}' -s '{}'", script, project_code, sb_name),
                        "-S".to_string(),
                        self.database.clone(),
                    ],
                )
            }
            None => (
                script,
                vec![
                    "-p".to_string(),
                    project_code.to_string(),
                    "-s".to_string(),
                    sb_name.to_string(),
                    "-S".to_string(),
                    self.database.clone(),
                ],
            ),
        }
    }

    /// Run the script and return the XML it prints.
    pub fn download(
        &self,
        process: &dyn ExternalProcess,
        cwd: &Path,
        project_code: &str,
        sb_name: &str,
    ) -> anyhow::Result<SchedBlockXml> {
        let (program, args) = self.command(project_code, sb_name);
        info!(command = %display_command(&program, &args), "retrieving SB xml");

        let output = process
            .run(&program, &args, cwd)
            .map_err(|source| SweepError::Spawn {
                program: program.clone(),
                source,
            })?;
        if !output.success() || output.stdout.trim().is_empty() {
            let message = output.stderr.lines().last().unwrap_or("no XML on stdout").to_string();
            return Err(SweepError::ToolFailed {
                program,
                code: output.code,
                message,
            }
            .into());
        }

        let xml = SchedBlockXml::from_text(output.stdout)
            .with_context(|| format!("parse XML retrieved for {} {}", project_code, sb_name))?;
        Ok(xml)
    }

    /// Retrieve the block and store it as `dest`, which must not exist yet.
    pub fn download_to_file(
        &self,
        process: &dyn ExternalProcess,
        dest: &Path,
        project_code: &str,
        sb_name: &str,
    ) -> anyhow::Result<()> {
        if dest.exists() {
            return Err(SweepError::AlreadyExists(dest.to_path_buf()).into());
        }
        let cwd = dest.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
        let xml = self.download(process, cwd, project_code, sb_name)?;
        fs::write(dest, xml.text()).with_context(|| format!("write {}", dest.display()))?;
        info!(path = %dest.display(), "stored retrieved SB xml");
        Ok(())
    }
}
