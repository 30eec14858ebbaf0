//! Static JSON export of the whole database.
//!
//! Each entity is turned into an [`Export`] by its kind's exporter. The
//! [`ExportPipeline`] writes documents under `<root>/json/<group>/<id>.json`,
//! keeps one `.journal.json` index per top-level group, and mirrors referenced
//! assets under `<root>/assets/`.

mod exporters;
mod fetcher;
mod pipeline;
mod progress;

pub use exporters::{ExportHelper, ExportManager, Exporter};
pub use fetcher::{AssetFetcher, FetchError};
#[cfg(feature = "http-assets")]
pub use fetcher::HttpFetcher;
pub use pipeline::{is_non_empty_dir, ExportOptions, ExportPipeline, ExportSummary, Target};
pub use progress::{NoProgress, ProgressReporter};

use std::collections::BTreeMap;

use crate::entity::{EntityId, EntityKind};
use crate::repository::RepoError;

/// A remotely hosted file referenced by an exported document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRef {
    pub uri: String,
}

impl AssetRef {
    pub fn new(uri: impl Into<String>) -> Self {
        Self { uri: uri.into() }
    }
}

/// One exported document
#[derive(Debug, Clone, PartialEq)]
pub struct Export {
    /// Slash-delimited group, e.g. `weapons/great-sword`
    pub group: String,
    /// Document body; keys are kept sorted
    pub data: BTreeMap<String, serde_json::Value>,
    pub assets: Vec<AssetRef>,
}

impl Export {
    pub fn new(group: impl Into<String>, data: BTreeMap<String, serde_json::Value>) -> Self {
        Self {
            group: group.into(),
            data,
            assets: Vec::new(),
        }
    }

    pub fn with_assets(mut self, assets: Vec<AssetRef>) -> Self {
        self.assets = assets;
        self
    }

    /// Split the group into its top-level directory and the subpath below it
    pub fn split_group(&self) -> Option<(&str, &str)> {
        let (top, sub) = match self.group.split_once('/') {
            Some((top, sub)) => (top, sub.trim_matches('/')),
            None => (self.group.as_str(), ""),
        };
        if top.is_empty() {
            None
        } else {
            Some((top, sub))
        }
    }
}

/// Error type for export operations
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Invalid target descriptor: {0}")]
    InvalidTarget(String),

    #[error("Unknown entity: {0}")]
    UnknownEntity(String),

    #[error("No top level group found for {kind} {id}")]
    MissingGroup { kind: EntityKind, id: EntityId },

    #[error("Could not export asset {uri}: {reason}")]
    Asset { uri: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// Result type for export operations
pub type ExportResult<T> = Result<T, ExportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_group() {
        let export = Export::new("weapons/great-sword", BTreeMap::new());
        assert_eq!(export.split_group(), Some(("weapons", "great-sword")));

        let export = Export::new("items", BTreeMap::new());
        assert_eq!(export.split_group(), Some(("items", "")));

        let export = Export::new("a/b/c", BTreeMap::new());
        assert_eq!(export.split_group(), Some(("a", "b/c")));

        assert_eq!(Export::new("", BTreeMap::new()).split_group(), None);
        assert_eq!(Export::new("/x", BTreeMap::new()).split_group(), None);
    }
}
