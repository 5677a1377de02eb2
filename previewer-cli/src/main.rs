//! Design Previewer - manifest generation, release fetching and local preview
//!
//! Logs go to stderr; stdout carries only command results.

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use previewer_core::config::{self, FetchSettings};
use previewer_core::release::{CheckoutCache, GitHubSource, TagResolver, DEFAULT_ENTRY_POINT};
use previewer_core::{manifest, preview};

/// Log levels
#[derive(Debug, Clone, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_filter_directive(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

#[derive(Parser, Debug)]
#[clap(
    name = "previewer",
    about = "Generate, fetch and serve design previews",
    version
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,

    /// Set log level (RUST_LOG takes precedence when set)
    #[clap(long, default_value = "info", global = true)]
    log_level: LogLevel,
}

#[derive(Parser, Debug)]
enum Command {
    /// Scan a design tree and write the previewer manifest
    Manifest {
        /// Design root to scan (defaults to the current directory)
        #[clap(long)]
        root: Option<PathBuf>,

        /// Output path (defaults to <root>/design_previewer/manifest.json)
        #[clap(long)]
        manifest: Option<PathBuf>,

        /// Manifest title
        #[clap(long, default_value = config::DEFAULT_TITLE)]
        title: String,

        /// Manifest description
        #[clap(long, default_value = config::DEFAULT_DESCRIPTION)]
        description: String,

        /// Serve the root after writing the manifest
        #[clap(long)]
        serve: bool,

        #[clap(flatten)]
        server: ServerArgs,
    },

    /// Serve a design tree over HTTP
    Serve {
        /// Directory to serve (defaults to the current directory)
        #[clap(long)]
        root: Option<PathBuf>,

        #[clap(flatten)]
        server: ServerArgs,
    },

    /// Download the previewer release into a local checkout
    Fetch {
        /// GitHub repository slug (owner/name)
        #[clap(long)]
        repo: Option<String>,

        /// Release tag (defaults to the latest dev-x.y.z tag)
        #[clap(long)]
        tag: Option<String>,

        /// Checkout directory (defaults to ./<repo folder name>)
        #[clap(long)]
        dir: Option<PathBuf>,

        /// File that must exist in a complete checkout
        #[clap(long, default_value = DEFAULT_ENTRY_POINT)]
        entry_point: String,
    },

    /// Print the latest release tag of a repository
    Resolve {
        /// GitHub repository slug (owner/name)
        #[clap(long)]
        repo: Option<String>,
    },
}

#[derive(clap::Args, Debug)]
struct ServerArgs {
    /// Address to bind
    #[clap(long, default_value = config::DEFAULT_HOST)]
    host: String,

    /// Port to bind
    #[clap(long, default_value_t = config::DEFAULT_PORT)]
    port: u16,

    /// Open the preview in the default browser
    #[clap(long)]
    open: bool,
}

/// Initialize tracing from --log-level, letting RUST_LOG override it
fn initialize_tracing(log_level: &LogLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_filter_directive()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    initialize_tracing(&cli.log_level);

    let result = match cli.command {
        Command::Manifest {
            root,
            manifest,
            title,
            description,
            serve,
            server,
        } => manifest_command(root, manifest, &title, &description, serve.then_some(server)).await,
        Command::Serve { root, server } => serve_command(root, server).await,
        Command::Fetch {
            repo,
            tag,
            dir,
            entry_point,
        } => fetch_command(repo, tag, dir, &entry_point).await,
        Command::Resolve { repo } => resolve_command(repo).await,
    };

    if let Err(e) = result {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn current_dir_or(root: Option<PathBuf>) -> Result<PathBuf> {
    match root {
        Some(root) => Ok(root),
        None => std::env::current_dir().context("Failed to read the current directory"),
    }
}

async fn manifest_command(
    root: Option<PathBuf>,
    output: Option<PathBuf>,
    title: &str,
    description: &str,
    server: Option<ServerArgs>,
) -> Result<()> {
    let root = current_dir_or(root)?;
    let output = output.unwrap_or_else(|| config::default_manifest_path(&root));

    let built = manifest::generate(&root, &output, title, description)
        .with_context(|| format!("Failed to generate manifest for {}", root.display()))?;

    println!(
        "Wrote {} ({} versions, {} documents)",
        output.display(),
        built.versions.len(),
        built.item_count()
    );

    match server {
        Some(server) => run_server(&root, server).await,
        None => Ok(()),
    }
}

async fn serve_command(root: Option<PathBuf>, server: ServerArgs) -> Result<()> {
    let root = current_dir_or(root)?;
    run_server(&root, server).await
}

async fn run_server(root: &Path, server: ServerArgs) -> Result<()> {
    if server.open {
        let url = preview::preview_url(&server.host, server.port);
        if let Err(e) = open::that(&url) {
            warn!("Could not open {} in a browser: {}", url, e);
        }
    }

    let shutdown = async {
        ctrl_c().await;
        info!("Shutting down preview server");
    };

    preview::serve(root, &server.host, server.port, shutdown)
        .await
        .context("Preview server failed")
}

async fn fetch_command(
    repo: Option<String>,
    tag: Option<String>,
    dir: Option<PathBuf>,
    entry_point: &str,
) -> Result<()> {
    let settings = FetchSettings::resolve(repo.as_deref(), tag.as_deref());
    let target_dir = match dir {
        Some(dir) => dir,
        None => settings.checkout_dir(&current_dir_or(None)?)?,
    };

    let source = Arc::new(GitHubSource::new().context("Failed to build HTTP client")?);
    let cache = CheckoutCache::new(source.clone()).with_entry_point(entry_point);

    let work = async {
        let tag = match settings.tag.clone() {
            Some(tag) => tag,
            None => TagResolver::new(source)
                .resolve_latest(&settings.repo)
                .await
                .with_context(|| {
                    format!("Failed to resolve the latest tag of {}", settings.repo)
                })?,
        };

        let checkout = cache
            .ensure_checkout(&target_dir, &settings.repo, &tag)
            .await
            .with_context(|| format!("Failed to fetch {}@{}", settings.repo, tag))?;

        Ok::<_, anyhow::Error>((tag, checkout))
    };

    // Dropping `work` on Ctrl-C removes any partial download workspace
    let (tag, checkout) = until_interrupted(work, ctrl_c()).await?;

    println!("{}@{} ready at {}", settings.repo, tag, checkout.display());
    println!();
    println!("Next steps:");
    println!("  previewer manifest --serve --open");

    Ok(())
}

/// Resolves on Ctrl-C; never resolves if the signal cannot be watched
async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}

/// Run `work` unless `interrupt` resolves first, in which case `work` is dropped
async fn until_interrupted<T, W, I>(work: W, interrupt: I) -> Result<T>
where
    W: Future<Output = Result<T>>,
    I: Future<Output = ()>,
{
    tokio::select! {
        result = work => result,
        _ = interrupt => bail!("Interrupted"),
    }
}

async fn resolve_command(repo: Option<String>) -> Result<()> {
    let settings = FetchSettings::resolve(repo.as_deref(), None);
    let source = Arc::new(GitHubSource::new().context("Failed to build HTTP client")?);

    let tag = TagResolver::new(source)
        .resolve_latest(&settings.repo)
        .await
        .with_context(|| format!("Failed to resolve the latest tag of {}", settings.repo))?;

    println!("{tag}");
    Ok(())
}
