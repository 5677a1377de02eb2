//! Manifest data model (manifest.json)
//!
//! The previewer UI reads this tree to build its navigation:
//! versions contain groups, groups contain document items.

use serde::{Deserialize, Serialize};

/// A single document file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesignItem {
    /// Display title derived from the file name
    pub title: String,
    /// Root-relative, `./`-prefixed, forward-slash path
    pub path: String,
}

/// A directory of documents rendered as one section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesignGroup {
    /// Literal directory name
    pub key: String,
    /// Normalized display name
    pub label: String,
    #[serde(default)]
    pub items: Vec<DesignItem>,
}

/// A document revision generation (`v1`, `v2`, ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesignVersion {
    pub key: String,
    pub label: String,
    #[serde(default)]
    pub groups: Vec<DesignGroup>,
}

/// The manifest root
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignManifest {
    pub title: String,
    pub description: String,
    /// ISO-8601 local time with offset, second precision
    pub generated_at: String,
    pub root_path: String,
    #[serde(default)]
    pub versions: Vec<DesignVersion>,
}

impl DesignManifest {
    /// Serialize with 2-space indentation and a trailing newline
    pub fn to_json(&self) -> serde_json::Result<String> {
        let mut content = serde_json::to_string_pretty(self)?;
        content.push('\n');
        Ok(content)
    }

    /// Parse a manifest previously written by [`DesignManifest::to_json`]
    pub fn from_json(content: &str) -> serde_json::Result<Self> {
        serde_json::from_str(content)
    }

    /// Total number of document items across all versions
    pub fn item_count(&self) -> usize {
        self.versions
            .iter()
            .flat_map(|v| &v.groups)
            .map(|g| g.items.len())
            .sum()
    }
}
