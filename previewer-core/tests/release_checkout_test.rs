//! Tag resolution and checkout against an in-memory release source

#![cfg(feature = "fetch")]

use async_trait::async_trait;
use std::collections::HashMap;
use std::io::{Cursor, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;

use previewer_core::release::{
    CheckoutCache, InstalledTag, ReleaseSource, TagResolver, TAG_STATE_FILE,
};
use previewer_core::{PreviewerError, Result};

/// Fake remote: a tag list plus one archive per tag
#[derive(Default)]
struct FakeRemote {
    tags: Mutex<serde_json::Value>,
    releases: Mutex<HashMap<String, Vec<(String, String)>>>,
    downloads: AtomicUsize,
}

impl FakeRemote {
    fn publish(&self, tag: &str, files: &[(&str, &str)]) {
        let root = format!("design_previewer-{tag}");
        let files = files
            .iter()
            .map(|(path, content)| (format!("{root}/{path}"), content.to_string()))
            .collect();
        self.releases.lock().unwrap().insert(tag.to_string(), files);

        let mut tags = self.tags.lock().unwrap();
        let mut list = tags.as_array().cloned().unwrap_or_default();
        list.insert(0, serde_json::json!({ "name": tag }));
        *tags = serde_json::Value::Array(list);
    }

    fn downloads(&self) -> usize {
        self.downloads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReleaseSource for FakeRemote {
    async fn list_tags(&self, _repo: &str) -> Result<serde_json::Value> {
        Ok(self.tags.lock().unwrap().clone())
    }

    async fn download_archive(&self, repo: &str, tag: &str) -> Result<Vec<u8>> {
        self.downloads.fetch_add(1, Ordering::SeqCst);

        let files = self
            .releases
            .lock()
            .unwrap()
            .get(tag)
            .cloned()
            .ok_or_else(|| PreviewerError::HttpStatus {
                url: format!("fake://{repo}/{tag}"),
                status: 404,
            })?;

        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (path, content) in files {
            writer.start_file(path, SimpleFileOptions::default()).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        Ok(writer.finish().unwrap().into_inner())
    }
}

const REPO: &str = "lifeforce-dev/design_previewer";

/// Resolve the latest tag and make sure the checkout holds it
async fn update(remote: &Arc<FakeRemote>, cache: &CheckoutCache, target: &std::path::Path) -> Result<String> {
    let tag = TagResolver::new(remote.clone()).resolve_latest(REPO).await?;
    cache.ensure_checkout(target, REPO, &tag).await?;
    Ok(tag)
}

#[tokio::test]
async fn test_resolve_then_checkout() {
    let temp_dir = TempDir::new().unwrap();
    let target = temp_dir.path().join("design_previewer");
    let remote = Arc::new(FakeRemote::default());
    remote.publish("dev-1.9.9", &[("setup_previewer.py", "v199")]);
    remote.publish("dev-1.10.0", &[("setup_previewer.py", "v1100")]);
    remote.publish("release-x", &[("setup_previewer.py", "x")]);

    let cache = CheckoutCache::new(remote.clone());
    let tag = update(&remote, &cache, &target).await.unwrap();

    assert_eq!(tag, "dev-1.10.0");
    assert_eq!(
        std::fs::read_to_string(target.join("setup_previewer.py")).unwrap(),
        "v1100"
    );
    assert_eq!(InstalledTag::read_tag(&target).as_deref(), Some("dev-1.10.0"));
}

#[tokio::test]
async fn test_repeat_runs_download_once() {
    let temp_dir = TempDir::new().unwrap();
    let target = temp_dir.path().join("design_previewer");
    let remote = Arc::new(FakeRemote::default());
    remote.publish("dev-1.0.0", &[("setup_previewer.py", "one")]);

    let cache = CheckoutCache::new(remote.clone());
    update(&remote, &cache, &target).await.unwrap();
    update(&remote, &cache, &target).await.unwrap();

    // A fresh cache only sees what is on disk
    let cache = CheckoutCache::new(remote.clone());
    update(&remote, &cache, &target).await.unwrap();

    assert_eq!(remote.downloads(), 1);
}

#[tokio::test]
async fn test_new_release_replaces_checkout() {
    let temp_dir = TempDir::new().unwrap();
    let target = temp_dir.path().join("design_previewer");
    let remote = Arc::new(FakeRemote::default());
    remote.publish("dev-1.0.0", &[("setup_previewer.py", "one"), ("old.html", "")]);

    let cache = CheckoutCache::new(remote.clone());
    update(&remote, &cache, &target).await.unwrap();

    remote.publish("dev-1.1.0", &[("setup_previewer.py", "two")]);
    let tag = update(&remote, &cache, &target).await.unwrap();

    assert_eq!(tag, "dev-1.1.0");
    assert_eq!(remote.downloads(), 2);
    assert!(!target.join("old.html").exists());
    assert_eq!(
        std::fs::read_to_string(target.join("setup_previewer.py")).unwrap(),
        "two"
    );
}

#[tokio::test]
async fn test_broken_release_keeps_previous_checkout() {
    let temp_dir = TempDir::new().unwrap();
    let target = temp_dir.path().join("design_previewer");
    let remote = Arc::new(FakeRemote::default());
    remote.publish("dev-1.0.0", &[("setup_previewer.py", "one")]);

    let cache = CheckoutCache::new(remote.clone());
    update(&remote, &cache, &target).await.unwrap();

    remote.publish("dev-2.0.0", &[("README.md", "no entry point")]);
    let result = update(&remote, &cache, &target).await;

    assert!(matches!(result, Err(PreviewerError::Fetch { .. })));
    assert_eq!(InstalledTag::read_tag(&target).as_deref(), Some("dev-1.0.0"));
    assert!(target.join("setup_previewer.py").is_file());
    assert!(target.join(TAG_STATE_FILE).is_file());
}

#[tokio::test]
async fn test_no_tags() {
    let temp_dir = TempDir::new().unwrap();
    let target = temp_dir.path().join("design_previewer");
    let remote = Arc::new(FakeRemote::default());
    *remote.tags.lock().unwrap() = serde_json::json!([]);

    let cache = CheckoutCache::new(remote.clone());
    let result = update(&remote, &cache, &target).await;

    assert!(matches!(result, Err(PreviewerError::NoTags { .. })));
    assert!(!target.exists());
    assert_eq!(remote.downloads(), 0);
}

#[tokio::test]
async fn test_missing_archive_is_network_error() {
    let temp_dir = TempDir::new().unwrap();
    let target = temp_dir.path().join("design_previewer");
    let remote = Arc::new(FakeRemote::default());

    let cache = CheckoutCache::new(remote.clone());
    let err = cache
        .ensure_checkout(&target, REPO, "dev-9.9.9")
        .await
        .unwrap_err();

    assert!(err.is_network());
    assert!(!target.exists());
}
