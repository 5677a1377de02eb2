//! Defaults and environment resolution
//!
//! ## Configuration Sources (in precedence order)
//!
//! 1. Command-line flags
//! 2. `DESIGN_PREVIEWER_REPO` / `DESIGN_PREVIEWER_TAG` environment variables
//! 3. Built-in defaults
//!
//! Blank values count as unset at every level.

use std::path::{Path, PathBuf};

use crate::error::{PreviewerError, Result};

/// Public GitHub slug of the previewer release repository
pub const DEFAULT_REPO: &str = "lifeforce-dev/design_previewer";

/// Environment variable overriding the release repository
pub const REPO_ENV: &str = "DESIGN_PREVIEWER_REPO";

/// Environment variable pinning an explicit release tag
pub const TAG_ENV: &str = "DESIGN_PREVIEWER_TAG";

pub const DEFAULT_TITLE: &str = "Design Previewer";
pub const DEFAULT_DESCRIPTION: &str = "Auto-discovered design preview manifest.";
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8123;

/// File name of the generated manifest
pub const MANIFEST_FILE: &str = "manifest.json";

/// Default manifest location: inside the previewer checkout under `root`
pub fn default_manifest_path(root: &Path) -> PathBuf {
    root.join(last_segment(DEFAULT_REPO)).join(MANIFEST_FILE)
}

/// Directory name a repository is checked out into
///
/// `owner/name.git` becomes `name`. A slug that leaves no usable folder
/// name (`owner/name/`, `.git`, `..`) is rejected.
pub fn repo_folder_name(repo: &str) -> Result<String> {
    let folder = last_segment(repo);

    if folder.is_empty() || folder == "." || folder == ".." {
        return Err(PreviewerError::Configuration(format!(
            "Repository '{}' does not name a checkout folder",
            repo.trim()
        )));
    }

    Ok(folder.to_string())
}

fn last_segment(repo: &str) -> &str {
    let folder = repo.trim().rsplit('/').next().unwrap_or_default();

    let cut = folder.len().saturating_sub(4);
    match folder.get(cut..) {
        Some(suffix) if suffix.eq_ignore_ascii_case(".git") => &folder[..cut],
        _ => folder,
    }
}

/// Which repository to fetch and, optionally, which tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchSettings {
    pub repo: String,
    /// `None` means "resolve the latest tag remotely"
    pub tag: Option<String>,
}

impl FetchSettings {
    /// Resolve from flags, then the process environment, then defaults
    pub fn resolve(repo_flag: Option<&str>, tag_flag: Option<&str>) -> Self {
        Self::resolve_with(repo_flag, tag_flag, |key| std::env::var(key).ok())
    }

    /// Resolve with an explicit environment lookup
    pub fn resolve_with<F>(repo_flag: Option<&str>, tag_flag: Option<&str>, env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let repo = repo_flag
            .map(str::to_string)
            .or_else(|| env(REPO_ENV))
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| DEFAULT_REPO.to_string());

        let tag = tag_flag
            .map(str::to_string)
            .or_else(|| env(TAG_ENV))
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        Self { repo, tag }
    }

    /// Default checkout directory for this repository under `base`
    pub fn checkout_dir(&self, base: &Path) -> Result<PathBuf> {
        Ok(base.join(repo_folder_name(&self.repo)?))
    }
}
