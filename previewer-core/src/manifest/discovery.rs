//! Design tree discovery
//!
//! Two layouts are recognized under the scan root:
//!
//! ```text
//! root/                      root/
//! ├── v1/                    ├── designs/
//! │   ├── menus/*.html       ├── designs-hud/*.html
//! │   └── hud/*.html         └── other/        (ignored)
//! └── v2/...
//! ```
//!
//! Versioned trees use every subdirectory of a `v<n>` directory as a group.
//! Flat trees become one implicit `v1` whose groups are the `designs*`
//! directories. Empty groups and versions are pruned.

use once_cell::sync::Lazy;
use regex::Regex;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use super::naming::{file_title, group_label, GROUP_CONTAINER_PREFIX};
use super::{DesignGroup, DesignItem, DesignManifest, DesignVersion};
use crate::error::{PreviewerError, Result};

/// File name excluded from every group (the previewer shell itself)
pub const INDEX_FILE: &str = "index.html";

/// Extension of discoverable documents
pub const DOCUMENT_EXTENSION: &str = "html";

/// Key of the synthetic version used for flat layouts
pub const IMPLICIT_VERSION_KEY: &str = "v1";

static VERSION_DIR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^v\d+$").expect("version directory pattern is valid"));

/// Whether a directory name denotes a version directory
pub fn is_version_dir_name(name: &str) -> bool {
    VERSION_DIR.is_match(name)
}

/// Discover all non-empty versions under `root`
pub fn discover_versions(root: &Path) -> Result<Vec<DesignVersion>> {
    let version_dirs: Vec<PathBuf> = subdirectories(root)?
        .into_iter()
        .filter(|path| is_version_dir_name(&entry_name(path)))
        .collect();

    if !version_dirs.is_empty() {
        let mut versions = Vec::new();

        for version_dir in version_dirs {
            let name = entry_name(&version_dir);
            let groups = collect_groups(subdirectories(&version_dir)?, root)?;

            if groups.is_empty() {
                debug!("Skipping empty version directory: {:?}", version_dir);
                continue;
            }

            versions.push(DesignVersion {
                key: name.to_lowercase(),
                label: name.to_uppercase(),
                groups,
            });
        }

        return Ok(versions);
    }

    debug!(
        "No version directories in {:?}, using '{}' containers",
        root, GROUP_CONTAINER_PREFIX
    );

    let containers = subdirectories(root)?
        .into_iter()
        .filter(|path| {
            entry_name(path)
                .to_lowercase()
                .starts_with(GROUP_CONTAINER_PREFIX)
        })
        .collect();

    let groups = collect_groups(containers, root)?;
    if groups.is_empty() {
        return Ok(Vec::new());
    }

    Ok(vec![DesignVersion {
        key: IMPLICIT_VERSION_KEY.to_string(),
        label: IMPLICIT_VERSION_KEY.to_uppercase(),
        groups,
    }])
}

/// Build a complete manifest for `root`
pub fn build_manifest(root: &Path, title: &str, description: &str) -> Result<DesignManifest> {
    let versions = discover_versions(root)?;

    Ok(DesignManifest {
        title: title.to_string(),
        description: description.to_string(),
        generated_at: chrono::Local::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, false),
        root_path: root.display().to_string(),
        versions,
    })
}

/// Write a manifest as pretty JSON, creating parent directories
pub fn write_manifest(manifest: &DesignManifest, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| PreviewerError::filesystem(parent, e))?;
    }

    let content = manifest.to_json()?;
    std::fs::write(path, content).map_err(|e| PreviewerError::filesystem(path, e))?;

    Ok(())
}

/// Scan `root`, write the manifest to `output` and return it
pub fn generate(
    root: &Path,
    output: &Path,
    title: &str,
    description: &str,
) -> Result<DesignManifest> {
    let root = root.canonicalize().map_err(|e| {
        PreviewerError::Configuration(format!(
            "Design root {} cannot be resolved: {e}",
            root.display()
        ))
    })?;

    if !root.is_dir() {
        return Err(PreviewerError::Configuration(format!(
            "Design root is not a directory: {}",
            root.display()
        )));
    }

    info!("Scanning design documents in: {:?}", root);
    let manifest = build_manifest(&root, title, description)?;
    write_manifest(&manifest, output)?;

    info!(
        versions = manifest.versions.len(),
        items = manifest.item_count(),
        "Manifest written: {}",
        output.display()
    );

    Ok(manifest)
}

/// Render `target` relative to `root` as a `./`-prefixed forward-slash path
///
/// Paths outside `root` are retried after resolving them against the current
/// working directory.
pub fn relative_path(root: &Path, target: &Path) -> Result<String> {
    let relative = match target.strip_prefix(root) {
        Ok(relative) => relative.to_path_buf(),
        Err(_) => {
            let cwd = std::env::current_dir()
                .map_err(|e| PreviewerError::filesystem(target, e))?;
            let resolved = cwd.join(target).canonicalize().map_err(|e| {
                PreviewerError::Configuration(format!(
                    "{} cannot be resolved against {}: {e}",
                    target.display(),
                    cwd.display()
                ))
            })?;

            resolved
                .strip_prefix(root)
                .map(Path::to_path_buf)
                .map_err(|_| {
                    PreviewerError::Configuration(format!(
                        "{} is outside the design root {}",
                        target.display(),
                        root.display()
                    ))
                })?
        }
    };

    let segments: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();

    Ok(format!("./{}", segments.join("/")))
}

fn collect_groups(group_dirs: Vec<PathBuf>, root: &Path) -> Result<Vec<DesignGroup>> {
    let mut groups = Vec::new();

    for group_dir in group_dirs {
        if let Some(group) = build_group(&group_dir, root)? {
            groups.push(group);
        }
    }

    Ok(groups)
}

fn build_group(group_dir: &Path, root: &Path) -> Result<Option<DesignGroup>> {
    let documents: Vec<PathBuf> = sorted_entries(group_dir)?
        .into_iter()
        .filter(|path| path.is_file() && is_document(path))
        .collect();

    if documents.is_empty() {
        debug!("Skipping group without documents: {:?}", group_dir);
        return Ok(None);
    }

    let items = documents
        .iter()
        .map(|path| -> Result<DesignItem> {
            Ok(DesignItem {
                title: file_title(&entry_name(path)),
                path: relative_path(root, path)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let key = entry_name(group_dir);
    debug!("Group '{}': {} documents", key, items.len());

    Ok(Some(DesignGroup {
        label: group_label(&key),
        key,
        items,
    }))
}

fn is_document(path: &Path) -> bool {
    let is_html = path
        .extension()
        .map(|ext| ext == DOCUMENT_EXTENSION)
        .unwrap_or(false);

    is_html && entry_name(path).to_lowercase() != INDEX_FILE
}

/// Immediate subdirectories of `dir`, sorted case-insensitively
fn subdirectories(dir: &Path) -> Result<Vec<PathBuf>> {
    Ok(sorted_entries(dir)?
        .into_iter()
        .filter(|path| path.is_dir())
        .collect())
}

/// Immediate children of `dir` (links followed), sorted case-insensitively
fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>> {
    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by(|a, b| {
            a.file_name()
                .to_string_lossy()
                .to_lowercase()
                .cmp(&b.file_name().to_string_lossy().to_lowercase())
        });

    let mut entries = Vec::new();
    for entry in walker {
        match entry {
            Ok(entry) => entries.push(entry.into_path()),
            Err(err) if err.depth() > 0 => {
                warn!("Skipping unreadable entry in {:?}: {}", dir, err);
            }
            Err(err) => return Err(walk_error(dir, err)),
        }
    }

    Ok(entries)
}

fn walk_error(dir: &Path, err: walkdir::Error) -> PreviewerError {
    let path = err
        .path()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| dir.to_path_buf());
    let source = err
        .into_io_error()
        .unwrap_or_else(|| io::Error::other("filesystem loop detected"));

    PreviewerError::filesystem(path, source)
}

fn entry_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
