//! Remote release source
//!
//! [`ReleaseSource`] is the only place the release logic touches the network.
//! [`GitHubSource`] talks to the GitHub REST API for tag lists and to the
//! codeload host for tag archives.

use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

use crate::error::{PreviewerError, Result};

/// Default GitHub REST API base URL
pub const GITHUB_API_URL: &str = "https://api.github.com";

/// Default GitHub archive host
pub const GITHUB_CODELOAD_URL: &str = "https://codeload.github.com";

/// Fixed request timeout; requests are never retried
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Up to this many tags are requested (a single page)
pub const TAG_PAGE_SIZE: usize = 100;

/// Lists tags and downloads tag archives for a repository slug
#[async_trait]
pub trait ReleaseSource: Send + Sync {
    /// Raw tag list payload, in the order the remote returns it
    async fn list_tags(&self, repo: &str) -> Result<serde_json::Value>;

    /// Zip archive bytes for `repo` at `tag`
    async fn download_archive(&self, repo: &str, tag: &str) -> Result<Vec<u8>>;
}

/// [`ReleaseSource`] backed by GitHub
pub struct GitHubSource {
    client: reqwest::Client,
    api_url: String,
    codeload_url: String,
}

impl GitHubSource {
    /// Create a source pointing at the public GitHub hosts
    pub fn new() -> Result<Self> {
        Self::with_base_urls(GITHUB_API_URL, GITHUB_CODELOAD_URL)
    }

    /// Create a source with custom API and archive hosts
    pub fn with_base_urls(api_url: &str, codeload_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("design-previewer/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|source| PreviewerError::Network {
                url: api_url.to_string(),
                source,
            })?;

        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            codeload_url: codeload_url.trim_end_matches('/').to_string(),
        })
    }

    /// URL of the tag list for `repo`
    pub fn tags_url(&self, repo: &str) -> String {
        format!("{}/repos/{repo}/tags?per_page={TAG_PAGE_SIZE}", self.api_url)
    }

    /// URL of the zip archive for `repo` at `tag`
    pub fn archive_url(&self, repo: &str, tag: &str) -> String {
        format!("{}/{repo}/zip/refs/tags/{tag}", self.codeload_url)
    }

    async fn get(&self, url: &str, accept: &str) -> Result<reqwest::Response> {
        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, accept)
            .send()
            .await
            .map_err(|source| PreviewerError::Network {
                url: url.to_string(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(PreviewerError::HttpStatus {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl ReleaseSource for GitHubSource {
    async fn list_tags(&self, repo: &str) -> Result<serde_json::Value> {
        let url = self.tags_url(repo);
        let response = self.get(&url, "application/vnd.github+json").await?;

        let body = response
            .bytes()
            .await
            .map_err(|source| PreviewerError::Network { url, source })?;

        serde_json::from_slice(&body).map_err(|e| PreviewerError::UnexpectedResponse {
            repo: repo.to_string(),
            reason: format!("tag list is not JSON: {e}"),
        })
    }

    async fn download_archive(&self, repo: &str, tag: &str) -> Result<Vec<u8>> {
        let url = self.archive_url(repo, tag);
        let response = self.get(&url, "application/zip").await?;

        let bytes = response
            .bytes()
            .await
            .map_err(|source| PreviewerError::Network { url, source })?;

        debug!("Downloaded {} bytes for {}@{}", bytes.len(), repo, tag);
        Ok(bytes.to_vec())
    }
}
