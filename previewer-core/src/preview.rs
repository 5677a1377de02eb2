//! Local static preview server
//!
//! Serves the design root as plain static files. Directory requests resolve
//! to their `index.html`.

use axum::Router;
use std::future::Future;
use std::path::Path;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::{PreviewerError, Result};

/// Entry document opened in the browser
pub const ENTRY_DOCUMENT: &str = "index.html";

/// Router serving `root` as static files
pub fn create_router(root: &Path) -> Router {
    Router::new()
        .fallback_service(ServeDir::new(root))
        .layer(TraceLayer::new_for_http())
}

/// URL of the entry document for a host and port
pub fn preview_url(host: &str, port: u16) -> String {
    format!("http://{host}:{port}/{ENTRY_DOCUMENT}")
}

/// Serve `root` on `host:port` until `shutdown` resolves
pub async fn serve<F>(root: &Path, host: &str, port: u16, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if !root.is_dir() {
        return Err(PreviewerError::Configuration(format!(
            "Preview root is not a directory: {}",
            root.display()
        )));
    }

    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind((host, port))
        .await
        .map_err(|source| PreviewerError::Server {
            addr: addr.clone(),
            source,
        })?;

    let local_port = listener
        .local_addr()
        .map(|a| a.port())
        .unwrap_or(port);
    info!("Serving previewer at {}", preview_url(host, local_port));

    axum::serve(listener, create_router(root))
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|source| PreviewerError::Server { addr, source })?;

    info!("Preview server stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum_test::TestServer;
    use tempfile::TempDir;

    fn site() -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("index.html"), "<h1>previewer</h1>").unwrap();
        std::fs::create_dir_all(temp_dir.path().join("v1/hud")).unwrap();
        std::fs::write(temp_dir.path().join("v1/hud/a.html"), "<p>a</p>").unwrap();
        temp_dir
    }

    #[tokio::test]
    async fn test_serves_files() {
        let root = site();
        let server = TestServer::new(create_router(root.path())).unwrap();

        let response = server.get("/v1/hud/a.html").await;
        response.assert_status_ok();
        assert_eq!(response.text(), "<p>a</p>");
    }

    #[tokio::test]
    async fn test_directory_serves_index() {
        let root = site();
        let server = TestServer::new(create_router(root.path())).unwrap();

        let response = server.get("/").await;
        response.assert_status_ok();
        assert_eq!(response.text(), "<h1>previewer</h1>");
    }

    #[tokio::test]
    async fn test_missing_file_is_404() {
        let root = site();
        let server = TestServer::new(create_router(root.path())).unwrap();

        server.get("/nope.html").await.assert_status_not_found();
    }

    #[tokio::test]
    async fn test_serve_stops_on_shutdown() {
        let root = site();
        serve(root.path(), "127.0.0.1", 0, async {}).await.unwrap();
    }

    #[tokio::test]
    async fn test_serve_rejects_missing_root() {
        let root = site();
        let result = serve(&root.path().join("missing"), "127.0.0.1", 0, async {}).await;
        assert!(matches!(result, Err(PreviewerError::Configuration(_))));
    }

    #[test]
    fn test_preview_url() {
        assert_eq!(preview_url("127.0.0.1", 8123), "http://127.0.0.1:8123/index.html");
    }
}
