//! Design manifest generation
//!
//! Scans a design root, derives display names from naming conventions and
//! produces the `manifest.json` consumed by the previewer UI.
//!
//! # Architecture
//!
//! ```text
//! design root (v1/, v2/ or designs*/)
//!     │
//!     ▼
//! discovery   ← walks versions → groups → *.html
//!     │
//!     ├── naming ← titles and labels
//!     ▼
//! DesignManifest → manifest.json
//! ```

mod discovery;
mod model;
pub mod naming;

pub use discovery::{
    build_manifest, discover_versions, generate, is_version_dir_name, relative_path,
    write_manifest, DOCUMENT_EXTENSION, IMPLICIT_VERSION_KEY, INDEX_FILE,
};
pub use model::{DesignGroup, DesignItem, DesignManifest, DesignVersion};
