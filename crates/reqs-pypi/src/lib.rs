//! PyPI package index for reqs-lsp.
//!
//! Provides the lookup collaborator the finder framework consults for
//! package names and documentation:
//!
//! - **Installed distributions**: `*.dist-info/METADATA` files under the
//!   discovered site-packages directories, rendered to Markdown with
//!   requires/required-by cross references.
//! - **Remote name index**: one scrape of the registry's simple index at
//!   startup, bounded by the configured timeout. Names known only remotely
//!   carry a not-found sentinel instead of documentation.
//! - **On-demand fetch**: a cache miss during hover falls back to the
//!   registry JSON API for that single name.
//!
//! The table is process-wide, keyed by PEP 503 normalized name, and safe
//! under last-writer-wins concurrent population.

pub mod error;
pub mod index;
pub mod installed;
pub mod remote;

pub use error::{PypiError, Result};
pub use index::{IndexOptions, NOT_FOUND, PackageIndex, normalize_package_name};
pub use installed::DistMetadata;
pub use remote::package_url;
