//! Server configuration.
//!
//! One struct, deserialized from the client's `initialization_options` and
//! passed by reference to the components that need it. Defaults match the
//! public registry.

use reqs_pypi::IndexOptions;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServerConfig {
    /// Bound, in seconds, on the startup fetch of the remote name index.
    pub timeout: u64,
    /// Simple index page used for the package name list.
    pub index_url: String,
    /// JSON API base used for on-demand documentation fetches.
    pub json_api_url: String,
    /// Explicit site-packages directories; empty means auto-discover from
    /// the environment.
    pub site_packages: Vec<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            timeout: 3,
            index_url: reqs_pypi::remote::DEFAULT_SIMPLE_INDEX_URL.into(),
            json_api_url: reqs_pypi::remote::DEFAULT_JSON_API_URL.into(),
            site_packages: Vec::new(),
        }
    }
}

impl ServerConfig {
    /// Package index construction options for this configuration.
    pub fn index_options(&self) -> IndexOptions {
        IndexOptions {
            simple_index_url: self.index_url.clone(),
            json_api_url: self.json_api_url.clone(),
            timeout: Duration::from_secs(self.timeout),
            site_packages: self.site_packages.clone(),
        }
    }
}
