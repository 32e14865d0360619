//! Remote registry access: the simple-index name list and the JSON API
//! used for on-demand documentation fetches.
//!
//! Base URLs are injected so tests can point at a local mock server.

use crate::error::{PypiError, Result};
use crate::installed::DistMetadata;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashMap;

/// Base URL for package pages on pypi.org.
pub const PYPI_PROJECT_URL: &str = "https://pypi.org/project";

/// Default simple index used for the name list.
pub const DEFAULT_SIMPLE_INDEX_URL: &str = "https://pypi.org/simple/";

/// Default JSON API base (`{base}/{name}/json`).
pub const DEFAULT_JSON_API_URL: &str = "https://pypi.org/pypi";

static SIMPLE_LINK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#""/simple/([^/]+)/""#).unwrap());

/// Returns the URL for a package's page on the registry.
///
/// Names are normalized and URL-encoded so they are safe to embed in a
/// document link.
pub fn package_url(name: &str) -> String {
    let normalized = crate::index::normalize_package_name(name);
    format!("{}/{}", PYPI_PROJECT_URL, urlencoding::encode(&normalized))
}

/// Fetches the simple index page and extracts every package name from its
/// anchor targets.
pub(crate) async fn fetch_simple_index(
    client: &reqwest::Client,
    simple_index_url: &str,
) -> Result<Vec<String>> {
    let body = client
        .get(simple_index_url)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;

    let names: Vec<String> = SIMPLE_LINK_RE
        .captures_iter(&body)
        .map(|caps| caps[1].to_string())
        .collect();

    if names.is_empty() {
        return Err(PypiError::InvalidResponse(
            "simple index listed no packages".into(),
        ));
    }
    Ok(names)
}

// JSON API response types.

#[derive(Debug, Deserialize)]
struct JsonResponse {
    info: JsonInfo,
}

#[derive(Debug, Deserialize)]
struct JsonInfo {
    name: String,
    version: String,
    summary: Option<String>,
    home_page: Option<String>,
    author: Option<String>,
    license: Option<String>,
    requires_python: Option<String>,
    requires_dist: Option<Vec<String>>,
    project_urls: Option<HashMap<String, String>>,
}

/// Fetches one package's metadata from the JSON API.
///
/// # Errors
///
/// Returns [`PypiError::PackageNotFound`] on a 404, and request/decoding
/// errors otherwise.
pub(crate) async fn fetch_package_metadata(
    client: &reqwest::Client,
    json_api_url: &str,
    name: &str,
) -> Result<DistMetadata> {
    let url = format!("{json_api_url}/{name}/json");
    let response = client.get(&url).send().await?;
    if response.status() == reqwest::StatusCode::NOT_FOUND {
        return Err(PypiError::PackageNotFound(name.to_string()));
    }
    let parsed: JsonResponse = response.error_for_status()?.json().await?;

    let info = parsed.info;
    let homepage = info.home_page.filter(|s| !s.is_empty()).or_else(|| {
        info.project_urls
            .as_ref()
            .and_then(|urls| urls.get("Homepage").cloned())
    });

    Ok(DistMetadata {
        name: info.name,
        version: info.version,
        summary: info.summary.filter(|s| !s.is_empty()),
        homepage,
        author: info.author.filter(|s| !s.is_empty()),
        license: info.license.filter(|s| !s.is_empty()),
        requires_python: info.requires_python,
        requires_dist: info.requires_dist.unwrap_or_default(),
    })
}
