//! Design Previewer core
//!
//! Builds the design manifest consumed by the previewer page, fetches and
//! caches previewer releases, and serves a design tree locally.

pub mod config;
pub mod error;
pub mod manifest;

#[cfg(feature = "serve")]
pub mod preview;

#[cfg(feature = "fetch")]
pub mod release;

pub use error::{PreviewerError, Result};
