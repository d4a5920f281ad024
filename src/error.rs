use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that stop a sweep before or between external runs.
///
/// A failing simulation run is not an error: it is recorded as a
/// [`crate::runner::RunResult::Failure`] and the sweep moves on.
#[derive(Debug, Error)]
pub enum SweepError {
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),
    #[error("aborting, please remove or rename {what}: {}", .path.display())]
    StaleArtifacts { what: &'static str, path: PathBuf },
    #[error("aborting: {0}")]
    Declined(String),
    #[error("refusing to overwrite existing file {}", .0.display())]
    AlreadyExists(PathBuf),
    #[error("failed to launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("{program} exited with status {code:?}: {message}")]
    ToolFailed {
        program: String,
        code: Option<i32>,
        message: String,
    },
}

impl SweepError {
    pub fn invalid<T: Into<String>>(message: T) -> Self {
        SweepError::InvalidArguments(message.into())
    }
}
