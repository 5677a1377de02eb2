//! Previewer release fetching
//!
//! Resolves the latest `dev-x.y.z` tag of the previewer repository and keeps a
//! local checkout of it, re-downloading only when the tag changes.
//!
//! # Architecture
//!
//! ```text
//! GitHub
//!     │
//!     ├── /repos/{repo}/tags            ← tag list (TagResolver)
//!     └── codeload /{repo}/zip/refs/... ← tag archive
//!            │
//!            ▼
//!     CheckoutCache
//!            │
//!            ▼
//!     ./design_previewer/                         ← extracted release
//!     ./design_previewer/.design_previewer_tag.json ← installed tag
//! ```

mod checkout;
mod record;
mod source;
mod tags;

pub use checkout::{CheckoutCache, DEFAULT_ENTRY_POINT};
pub use record::{InstalledTag, TAG_STATE_FILE};
pub use source::{
    GitHubSource, ReleaseSource, GITHUB_API_URL, GITHUB_CODELOAD_URL, REQUEST_TIMEOUT,
    TAG_PAGE_SIZE,
};
pub use tags::{parse_dev_tag, select_latest_tag, DevVersion, TagResolver};
