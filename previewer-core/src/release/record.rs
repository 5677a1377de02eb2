//! Installed-tag record (`.design_previewer_tag.json`)
//!
//! Tracks which release tag is materialized in a checkout directory so a
//! re-run with the same tag can skip the download.

use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{PreviewerError, Result};

/// Record file name inside the checkout directory
pub const TAG_STATE_FILE: &str = ".design_previewer_tag.json";

/// The repository and tag currently installed in a checkout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstalledTag {
    pub repo: String,
    pub tag: String,
}

impl InstalledTag {
    pub fn new(repo: &str, tag: &str) -> Self {
        Self {
            repo: repo.to_string(),
            tag: tag.to_string(),
        }
    }

    /// Location of the record for a checkout directory
    pub fn path_for(target_dir: &Path) -> PathBuf {
        target_dir.join(TAG_STATE_FILE)
    }

    /// Installed tag of `target_dir`, if any
    ///
    /// A missing, unreadable or malformed record reads as "nothing installed".
    pub fn read_tag(target_dir: &Path) -> Option<String> {
        let path = Self::path_for(target_dir);
        let content = std::fs::read_to_string(&path).ok()?;

        let payload: serde_json::Value = match serde_json::from_str(&content) {
            Ok(payload) => payload,
            Err(e) => {
                debug!("Ignoring unparsable tag record {:?}: {}", path, e);
                return None;
            }
        };

        payload
            .get("tag")
            .and_then(|tag| tag.as_str())
            .filter(|tag| !tag.is_empty())
            .map(str::to_string)
    }

    /// Write the record into `target_dir`, replacing any previous one
    ///
    /// The content goes to a temporary file first and is renamed over the
    /// record so readers never see a half-written file.
    pub fn save(&self, target_dir: &Path) -> Result<()> {
        let path = Self::path_for(target_dir);

        let mut content = serde_json::to_string_pretty(self)?;
        content.push('\n');

        let mut temp = tempfile::NamedTempFile::new_in(target_dir)
            .map_err(|e| PreviewerError::filesystem(target_dir, e))?;
        temp.write_all(content.as_bytes())
            .map_err(|e| PreviewerError::filesystem(temp.path(), e))?;
        temp.persist(&path)
            .map_err(|e| PreviewerError::filesystem(&path, e.error))?;

        debug!("Recorded {}@{} in {:?}", self.repo, self.tag, path);
        Ok(())
    }
}
