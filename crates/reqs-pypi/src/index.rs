//! The process-wide package table.
//!
//! One [`PackageIndex`] lives for the whole session, shared via `Arc`. It
//! is populated in the background at startup (installed scan plus one
//! remote name fetch) and read synchronously by finder predicates; a miss
//! during hover triggers an on-demand fetch for that single name. Entries
//! are append/overwrite keyed by normalized name, so concurrent population
//! is safe under last-writer-wins.

use crate::installed;
use crate::remote;
use dashmap::DashMap;
use futures::StreamExt;
use reqs_core::PackageLookup;
use std::path::PathBuf;
use std::time::Duration;

/// Sentinel documentation for names known to the registry but not
/// installed locally.
pub const NOT_FOUND: &str = "Package not found locally";

/// Concurrency bound for rendering installed-package documentation.
const POPULATE_CONCURRENCY: usize = 8;

/// Normalize a package name according to PEP 503.
///
/// Converts to lowercase and collapses runs of `-`, `_` and `.` into a
/// single hyphen, so lookups are insensitive to how the name was written.
///
/// # Examples
///
/// ```
/// # use reqs_pypi::normalize_package_name;
/// assert_eq!(normalize_package_name("Flask"), "flask");
/// assert_eq!(normalize_package_name("django_rest_framework"), "django-rest-framework");
/// assert_eq!(normalize_package_name("my__package"), "my-package");
/// ```
pub fn normalize_package_name(name: &str) -> String {
    name.to_lowercase()
        .replace(['_', '.'], "-")
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Construction options for [`PackageIndex`].
#[derive(Debug, Clone)]
pub struct IndexOptions {
    /// Simple index page listing every package name.
    pub simple_index_url: String,
    /// JSON API base, `{base}/{name}/json`.
    pub json_api_url: String,
    /// Bound on the remote name-index fetch. On expiry the index keeps
    /// whatever installed information it already has.
    pub timeout: Duration,
    /// Explicit site-packages directories; empty means auto-discover.
    pub site_packages: Vec<PathBuf>,
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self {
            simple_index_url: remote::DEFAULT_SIMPLE_INDEX_URL.into(),
            json_api_url: remote::DEFAULT_JSON_API_URL.into(),
            timeout: Duration::from_secs(3),
            site_packages: Vec::new(),
        }
    }
}

/// Process-wide table of package name → rendered documentation.
pub struct PackageIndex {
    docs: DashMap<String, String>,
    client: reqwest::Client,
    options: IndexOptions,
}

impl PackageIndex {
    pub fn new(options: IndexOptions) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(concat!("reqs-lsp/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();

        Self {
            docs: DashMap::new(),
            client,
            options,
        }
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// Inserts or overwrites one entry, normalizing the key.
    pub fn insert(&self, name: &str, documentation: String) {
        self.docs.insert(normalize_package_name(name), documentation);
    }

    /// The stored entry for `name`, sentinel included.
    pub fn entry(&self, name: &str) -> Option<String> {
        self.docs
            .get(&normalize_package_name(name))
            .map(|doc| doc.value().clone())
    }

    /// Known names starting with `prefix` (normalized), sorted, capped at
    /// `limit`. Drives completion.
    pub fn names_with_prefix(&self, prefix: &str, limit: usize) -> Vec<String> {
        let prefix = normalize_package_name(prefix);
        let mut names: Vec<String> = self
            .docs
            .iter()
            .map(|entry| entry.key().clone())
            .filter(|name| name.starts_with(&prefix))
            .collect();
        names.sort();
        names.truncate(limit);
        names
    }

    /// Full startup population: installed distributions first, then the
    /// remote name index under the configured timeout. Failures degrade to
    /// whatever is already in the table.
    pub async fn populate(&self) {
        self.refresh_installed().await;

        match tokio::time::timeout(self.options.timeout, self.fetch_remote_names()).await {
            Ok(Ok(count)) => tracing::info!(count, "remote name index loaded"),
            Ok(Err(e)) => tracing::warn!(error = %e, "remote name index fetch failed"),
            Err(_) => tracing::warn!(
                timeout = ?self.options.timeout,
                "remote name index fetch timed out"
            ),
        }
    }

    /// Rescans installed distributions and (re)renders their documentation.
    pub async fn refresh_installed(&self) {
        let dirs = installed::discover_site_packages(&self.options.site_packages);
        let dists = match tokio::task::spawn_blocking(move || installed::scan_installed(&dirs)).await
        {
            Ok(dists) => dists,
            Err(e) => {
                tracing::warn!(error = %e, "installed-package scan did not complete");
                return;
            }
        };

        let required_by = installed::required_by_table(&dists);

        // One independent, order-insensitive unit of work per distribution.
        futures::stream::iter(dists)
            .for_each_concurrent(POPULATE_CONCURRENCY, |dist| {
                let required_by = required_by
                    .get(&normalize_package_name(&dist.name))
                    .cloned()
                    .unwrap_or_default();
                async move {
                    let doc = installed::render_document(&dist, &required_by);
                    self.insert(&dist.name, doc);
                }
            })
            .await;

        tracing::debug!(entries = self.len(), "installed documentation rendered");
    }

    /// Loads the remote name list, marking names without local metadata
    /// with the not-found sentinel. Returns how many names were added.
    pub async fn fetch_remote_names(&self) -> crate::Result<usize> {
        let names =
            remote::fetch_simple_index(&self.client, &self.options.simple_index_url).await?;
        let mut added = 0usize;
        for name in names {
            let key = normalize_package_name(&name);
            if !self.docs.contains_key(&key) {
                self.docs.insert(key, NOT_FOUND.to_string());
                added += 1;
            }
        }
        Ok(added)
    }

    /// Documentation for `name`, fetching from the JSON API when the table
    /// has nothing better than the sentinel. A failed fetch degrades to the
    /// stored entry (or nothing) instead of propagating.
    pub async fn get_or_fetch(&self, name: &str) -> Option<String> {
        let key = normalize_package_name(name);
        let cached = self.docs.get(&key).map(|doc| doc.value().clone());
        if let Some(doc) = &cached {
            if doc != NOT_FOUND {
                return Some(doc.clone());
            }
        }

        match remote::fetch_package_metadata(&self.client, &self.options.json_api_url, &key).await {
            Ok(dist) => {
                let doc = installed::render_document(&dist, &[]);
                self.docs.insert(key, doc.clone());
                Some(doc)
            }
            Err(e) => {
                tracing::warn!(package = %key, error = %e, "on-demand metadata fetch failed");
                cached
            }
        }
    }
}

impl Default for PackageIndex {
    fn default() -> Self {
        Self::new(IndexOptions::default())
    }
}

impl PackageLookup for PackageIndex {
    fn is_known(&self, name: &str) -> bool {
        self.docs.contains_key(&normalize_package_name(name))
    }

    fn documentation(&self, name: &str) -> Option<String> {
        self.entry(name).filter(|doc| doc != NOT_FOUND)
    }
}
