//! Scheduling blocks: where they come from and what the sweep reads from them.

pub mod archive;
pub mod fetch;
pub mod xml;

pub use archive::extract_sched_blocks;
pub use fetch::RetrievalTool;
pub use xml::SchedBlockXml;

use serde::Serialize;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Representative sky position of a scheduling block, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SkyPosition {
    pub ra_deg: f64,
    pub dec_deg: f64,
}

#[derive(Debug, Error)]
pub enum SchedBlockError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed scheduling block XML: {0}")]
    Parse(#[from] roxmltree::Error),
    #[error("found {count} matching elements for {tag}, expected exactly one")]
    ElementCount { tag: String, count: usize },
    #[error("missing element {0}")]
    MissingElement(String),
    #[error("{tag} has unit {unit:?}, expected \"deg\"")]
    BadUnit { tag: String, unit: String },
    #[error("{tag} is not a number: {value:?}")]
    BadNumber { tag: String, value: String },
}

/// How the user asked for scheduling blocks to be found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimRequest {
    /// A single scheduling-block XML file.
    Xml(String),
    /// A project archive holding several scheduling blocks.
    Archive(String),
    /// A project code and block name to retrieve from the archive database.
    Project { code: String, sb_name: String },
}

impl SimRequest {
    pub fn classify(request: &str, sb_name: &str) -> SimRequest {
        if request.ends_with(".xml") {
            SimRequest::Xml(request.to_string())
        } else if request.ends_with(".aot") {
            SimRequest::Archive(request.to_string())
        } else {
            SimRequest::Project {
                code: request.to_string(),
                sb_name: sb_name.to_string(),
            }
        }
    }
}

/// File name an XML for block `sb_name` is stored under.
pub fn xml_filename(sb_name: &str) -> String {
    format!("{}.xml", sb_name)
}
