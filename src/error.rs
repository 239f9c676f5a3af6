//! Error taxonomy for a harvest run.

use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum HarvestError {
    /// Region name has no entry in the reference table. Fatal; fix the configuration.
    #[error("unknown region {0:?} (known: {known})", known = crate::region::Region::known_names())]
    UnknownRegion(String),

    /// No submissions matched. Recoverable: adjust the criteria and retry.
    #[error("no posts found matching the search criteria")]
    EmptyResult,

    #[error("remote search failed: {0}")]
    Remote(String),

    #[error("filesystem error at {path}: {source}")]
    Filesystem {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl HarvestError {
    pub fn fs(path: impl Into<PathBuf>, source: io::Error) -> Self {
        HarvestError::Filesystem { path: path.into(), source }
    }

    /// Only an empty result sends the run back to input collection.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, HarvestError::EmptyResult)
    }
}

impl From<reqwest::Error> for HarvestError {
    fn from(e: reqwest::Error) -> Self {
        HarvestError::Remote(e.to_string())
    }
}

pub type Result<T, E = HarvestError> = std::result::Result<T, E>;
