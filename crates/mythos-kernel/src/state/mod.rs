//! Filesystem snapshot persistence.
//!
//! The whole node tree is saved as one JSON document, by default at
//! `$XDG_DATA_HOME/mythos/{name}.fs.json`. Saving happens on `reboot` and
//! `shutdown`; loading happens at boot.

pub mod paths;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::vfs::NodeRecord;

/// On-disk envelope around the node records.
#[derive(Debug, Serialize, Deserialize)]
struct SnapshotFile {
    version: String,
    saved_at: DateTime<Utc>,
    root: NodeRecord,
}

/// Reads and writes one snapshot file.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the saved tree. `Ok(None)` when nothing has been saved yet.
    pub fn load(&self) -> Result<Option<NodeRecord>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let text = std::fs::read_to_string(&self.path)
            .with_context(|| format!("reading snapshot: {}", self.path.display()))?;
        let file: SnapshotFile = serde_json::from_str(&text)
            .with_context(|| format!("parsing snapshot: {}", self.path.display()))?;
        info!(path = %self.path.display(), version = %file.version, "loaded snapshot");
        Ok(Some(file.root))
    }

    /// Write the tree, creating parent directories as needed.
    pub fn save(&self, root: &NodeRecord) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating snapshot directory: {}", parent.display()))?;
        }
        let file = SnapshotFile {
            version: crate::OS_VERSION.to_string(),
            saved_at: Utc::now(),
            root: root.clone(),
        };
        let json = serde_json::to_string_pretty(&file).context("serializing snapshot")?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("writing snapshot: {}", self.path.display()))?;
        info!(path = %self.path.display(), "saved snapshot");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vfs::default_layout;

    #[test]
    fn missing_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("none.fs.json"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("nested").join("m.fs.json"));
        let record = default_layout().snapshot();

        store.save(&record).unwrap();
        assert_eq!(store.load().unwrap(), Some(record));
    }

    #[test]
    fn corrupt_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.fs.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = SnapshotStore::new(&path).load().unwrap_err();
        assert!(format!("{err:#}").contains("parsing snapshot"));
    }
}
