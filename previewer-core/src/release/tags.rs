//! Latest release tag resolution
//!
//! Release tags follow `dev-<major>.<minor>.<patch>`. The newest one is picked
//! by numeric comparison of the triple, so `dev-1.10.0` beats `dev-1.9.9`.
//! Repositories without such tags fall back to the first tag the API lists.

use once_cell::sync::Lazy;
use regex::Regex;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::ReleaseSource;
use crate::error::{PreviewerError, Result};

static DEV_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^dev-([0-9]+)\.([0-9]+)\.([0-9]+)$").expect("dev tag pattern is valid")
});

/// Numeric `major.minor.patch` of a `dev-x.y.z` tag
///
/// Components are kept as decimal strings without leading zeros, so any
/// width compares correctly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DevVersion {
    parts: [String; 3],
}

impl DevVersion {
    fn from_digits(major: &str, minor: &str, patch: &str) -> Self {
        let trim = |digits: &str| {
            let trimmed = digits.trim_start_matches('0');
            let trimmed = if trimmed.is_empty() { "0" } else { trimmed };
            trimmed.to_string()
        };

        Self {
            parts: [trim(major), trim(minor), trim(patch)],
        }
    }
}

impl Ord for DevVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.parts
            .iter()
            .zip(&other.parts)
            .map(|(a, b)| a.len().cmp(&b.len()).then_with(|| a.cmp(b)))
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for DevVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for DevVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.parts[0], self.parts[1], self.parts[2])
    }
}

/// Parse `dev-x.y.z` into its version
pub fn parse_dev_tag(name: &str) -> Option<DevVersion> {
    let captures = DEV_TAG.captures(name)?;
    Some(DevVersion::from_digits(&captures[1], &captures[2], &captures[3]))
}

/// Pick the latest tag from a raw tag list payload
///
/// Entries that are not objects, or lack a non-empty string `name`, are
/// skipped. The first-listed fallback assumes the API orders tags
/// most-recent-first; GitHub does not document that ordering.
pub fn select_latest_tag(repo: &str, payload: &serde_json::Value) -> Result<String> {
    let entries = payload
        .as_array()
        .ok_or_else(|| PreviewerError::UnexpectedResponse {
            repo: repo.to_string(),
            reason: "expected a JSON array of tags".to_string(),
        })?;

    let names: Vec<&str> = entries
        .iter()
        .filter_map(|entry| {
            let name = entry.as_object()?.get("name")?.as_str()?;
            if name.is_empty() {
                None
            } else {
                Some(name)
            }
        })
        .collect();

    if names.len() < entries.len() {
        warn!(
            "Skipped {} malformed tag entries for '{}'",
            entries.len() - names.len(),
            repo
        );
    }

    let mut latest: Option<(&str, DevVersion)> = None;
    for &name in &names {
        if let Some(version) = parse_dev_tag(name) {
            if latest.as_ref().map_or(true, |(_, best)| version > *best) {
                latest = Some((name, version));
            }
        }
    }

    match (latest, names.first()) {
        (Some((name, _)), _) => Ok(name.to_string()),
        (None, Some(first)) => {
            debug!("No dev-x.y.z tags for '{}', using first listed tag", repo);
            Ok(first.to_string())
        }
        (None, None) => Err(PreviewerError::NoTags {
            repo: repo.to_string(),
        }),
    }
}

/// Resolves the latest release tag of a repository
pub struct TagResolver {
    source: Arc<dyn ReleaseSource>,
}

impl TagResolver {
    pub fn new(source: Arc<dyn ReleaseSource>) -> Self {
        Self { source }
    }

    /// Fetch the tag list for `repo` and select the latest tag
    pub async fn resolve_latest(&self, repo: &str) -> Result<String> {
        let payload = self.source.list_tags(repo).await?;
        let tag = select_latest_tag(repo, &payload)?;

        info!("Resolved latest tag for {}: {}", repo, tag);
        Ok(tag)
    }
}
