//! Release checkout management
//!
//! Downloads a tag archive, extracts it next to the checkout directory and
//! swaps it into place. A checkout whose record already names the requested
//! tag (and still has its entry-point file) is left alone.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::{InstalledTag, ReleaseSource};
use crate::error::{PreviewerError, Result};

/// File whose presence marks a complete previewer checkout
pub const DEFAULT_ENTRY_POINT: &str = "setup_previewer.py";

const ARCHIVE_FILE: &str = "release.zip";
const EXTRACT_DIR: &str = "extracted";

/// Keeps a checkout directory in sync with a release tag
pub struct CheckoutCache {
    source: Arc<dyn ReleaseSource>,
    entry_point: String,
    // Serializes the read-compare-write of the installed-tag record
    guard: Mutex<()>,
}

impl CheckoutCache {
    /// Create a cache with the default entry-point file
    pub fn new(source: Arc<dyn ReleaseSource>) -> Self {
        Self {
            source,
            entry_point: DEFAULT_ENTRY_POINT.to_string(),
            guard: Mutex::new(()),
        }
    }

    /// Use a different entry-point file to validate checkouts
    pub fn with_entry_point(mut self, entry_point: &str) -> Self {
        self.entry_point = entry_point.to_string();
        self
    }

    pub fn entry_point(&self) -> &str {
        &self.entry_point
    }

    /// Whether `target_dir` already holds a complete checkout of `tag`
    pub fn is_current(&self, target_dir: &Path, tag: &str) -> bool {
        InstalledTag::read_tag(target_dir).as_deref() == Some(tag)
            && target_dir.join(&self.entry_point).exists()
    }

    /// Make sure `target_dir` holds `repo` at `tag`, fetching only when needed
    pub async fn ensure_checkout(&self, target_dir: &Path, repo: &str, tag: &str) -> Result<PathBuf> {
        check_target(target_dir)?;

        let _guard = self.guard.lock().await;

        if self.is_current(target_dir, tag) {
            debug!("Checkout {:?} already at {}", target_dir, tag);
            return Ok(target_dir.to_path_buf());
        }

        info!("Fetching {}@{} into {:?}", repo, tag, target_dir);
        let archive = self.source.download_archive(repo, tag).await?;

        self.install(target_dir, repo, tag, &archive)?;
        InstalledTag::new(repo, tag).save(target_dir)?;

        info!("Installed {}@{} at {:?}", repo, tag, target_dir);
        Ok(target_dir.to_path_buf())
    }

    /// Extract `archive` beside `target_dir`, validate it, then swap it in
    fn install(&self, target_dir: &Path, repo: &str, tag: &str, archive: &[u8]) -> Result<()> {
        let parent = target_dir
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(parent).map_err(|e| PreviewerError::filesystem(parent, e))?;

        // Same filesystem as the target, so the final move is a rename.
        // Dropping the TempDir removes the workspace on every exit path.
        let workspace = tempfile::Builder::new()
            .prefix(".previewer-fetch-")
            .tempdir_in(parent)
            .map_err(|e| PreviewerError::filesystem(parent, e))?;

        let archive_path = workspace.path().join(ARCHIVE_FILE);
        std::fs::write(&archive_path, archive)
            .map_err(|e| PreviewerError::filesystem(&archive_path, e))?;

        let extract_dir = workspace.path().join(EXTRACT_DIR);
        extract_zip(&archive_path, &extract_dir, repo, tag)?;

        let source_dir = single_top_level_dir(&extract_dir, repo, tag)?;

        if !source_dir.join(&self.entry_point).is_file() {
            return Err(PreviewerError::fetch(
                repo,
                tag,
                format!("release is missing {}", self.entry_point),
            ));
        }

        if target_dir.exists() {
            std::fs::remove_dir_all(target_dir)
                .map_err(|e| PreviewerError::filesystem(target_dir, e))?;
        }

        std::fs::rename(&source_dir, target_dir)
            .map_err(|e| PreviewerError::filesystem(target_dir, e))?;

        Ok(())
    }
}

/// Refuse targets whose replacement would delete the working directory
fn check_target(target_dir: &Path) -> Result<()> {
    let raw = target_dir.to_string_lossy();
    let last = raw
        .trim_end_matches(['/', '\\'])
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();

    if matches!(last, "" | "." | "..") {
        return Err(PreviewerError::Configuration(format!(
            "Checkout directory {} must name a folder",
            target_dir.display()
        )));
    }

    let cwd = std::env::current_dir().and_then(|cwd| cwd.canonicalize());
    if let (Ok(target), Ok(cwd)) = (target_dir.canonicalize(), cwd) {
        if cwd.starts_with(&target) {
            return Err(PreviewerError::Configuration(format!(
                "Checkout directory {} contains the working directory",
                target_dir.display()
            )));
        }
    }

    Ok(())
}

fn extract_zip(archive_path: &Path, dest: &Path, repo: &str, tag: &str) -> Result<()> {
    let file = File::open(archive_path).map_err(|e| PreviewerError::filesystem(archive_path, e))?;

    let mut archive = zip::ZipArchive::new(file)
        .map_err(|e| PreviewerError::fetch(repo, tag, format!("invalid zip archive: {e}")))?;

    archive
        .extract(dest)
        .map_err(|e| PreviewerError::fetch(repo, tag, format!("failed to extract archive: {e}")))?;

    debug!("Extracted {} entries to {:?}", archive.len(), dest);
    Ok(())
}

fn single_top_level_dir(extract_dir: &Path, repo: &str, tag: &str) -> Result<PathBuf> {
    let mut dirs = Vec::new();

    if extract_dir.exists() {
        for entry in
            std::fs::read_dir(extract_dir).map_err(|e| PreviewerError::filesystem(extract_dir, e))?
        {
            let entry = entry.map_err(|e| PreviewerError::filesystem(extract_dir, e))?;
            if entry.path().is_dir() {
                dirs.push(entry.path());
            }
        }
    }

    match dirs.len() {
        1 => Ok(dirs.remove(0)),
        0 => Err(PreviewerError::fetch(
            repo,
            tag,
            "release archive did not contain files",
        )),
        n => Err(PreviewerError::fetch(
            repo,
            tag,
            format!("expected one top-level directory in archive, found {n}"),
        )),
    }
}
