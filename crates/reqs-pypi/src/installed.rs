//! Installed-distribution discovery and documentation rendering.
//!
//! Scans site-packages directories for `*.dist-info/METADATA` files and
//! renders each distribution's metadata to Markdown. Discovery is purely
//! filesystem-based: the virtualenv layout via `VIRTUAL_ENV`, any
//! `PYTHONPATH` entries, or explicitly configured directories.

use crate::index::normalize_package_name;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Parsed core metadata of one installed distribution.
#[derive(Debug, Clone, Default)]
pub struct DistMetadata {
    pub name: String,
    pub version: String,
    pub summary: Option<String>,
    pub homepage: Option<String>,
    pub author: Option<String>,
    pub license: Option<String>,
    pub requires_python: Option<String>,
    pub requires_dist: Vec<String>,
}

/// Parses an RFC 822 style METADATA header block.
///
/// Returns `None` when the `Name` header is absent. The message body (the
/// long description) is ignored.
pub fn parse_metadata(text: &str) -> Option<DistMetadata> {
    let mut dist = DistMetadata::default();

    for line in text.lines() {
        if line.is_empty() {
            break;
        }
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        match key {
            "Name" => dist.name = value.to_string(),
            "Version" => dist.version = value.to_string(),
            "Summary" => dist.summary = Some(value.to_string()),
            "Home-page" => dist.homepage = Some(value.to_string()),
            "Author" => dist.author = Some(value.to_string()),
            "License" => dist.license = Some(value.to_string()),
            "Requires-Python" => dist.requires_python = Some(value.to_string()),
            "Requires-Dist" => dist.requires_dist.push(value.to_string()),
            _ => {}
        }
    }

    if dist.name.is_empty() {
        return None;
    }
    Some(dist)
}

/// The bare package name of a `Requires-Dist` specification, e.g.
/// `requests (>=2.0); extra == "socks"` yields `requests`.
pub fn requirement_name(spec: &str) -> &str {
    let spec = spec.trim_start();
    let end = spec
        .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')))
        .unwrap_or(spec.len());
    &spec[..end]
}

/// Site-packages directories to scan. Explicit configuration wins; the
/// fallbacks are the active virtualenv and `PYTHONPATH`.
pub fn discover_site_packages(explicit: &[PathBuf]) -> Vec<PathBuf> {
    if !explicit.is_empty() {
        return explicit.to_vec();
    }

    let mut dirs = Vec::new();
    if let Ok(venv) = std::env::var("VIRTUAL_ENV") {
        let lib = Path::new(&venv).join("lib");
        if let Ok(entries) = std::fs::read_dir(&lib) {
            for entry in entries.flatten() {
                let site = entry.path().join("site-packages");
                if site.is_dir() {
                    dirs.push(site);
                }
            }
        }
    }
    if let Ok(pythonpath) = std::env::var("PYTHONPATH") {
        dirs.extend(std::env::split_paths(&pythonpath));
    }
    dirs
}

/// Reads every `*.dist-info/METADATA` under the given directories.
pub fn scan_installed(dirs: &[PathBuf]) -> Vec<DistMetadata> {
    let mut dists = Vec::new();
    for dir in dirs {
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::debug!(dir = %dir.display(), error = %e, "skipping site-packages dir");
                continue;
            }
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "dist-info") {
                match std::fs::read_to_string(path.join("METADATA")) {
                    Ok(text) => {
                        if let Some(dist) = parse_metadata(&text) {
                            dists.push(dist);
                        }
                    }
                    Err(e) => {
                        tracing::debug!(path = %path.display(), error = %e, "unreadable METADATA");
                    }
                }
            }
        }
    }
    tracing::debug!(count = dists.len(), "scanned installed distributions");
    dists
}

/// Inverts the dependency edges of the scanned distributions: normalized
/// name → names of distributions that require it.
pub fn required_by_table(dists: &[DistMetadata]) -> HashMap<String, Vec<String>> {
    let mut table: HashMap<String, Vec<String>> = HashMap::new();
    for dist in dists {
        for spec in &dist.requires_dist {
            let dep = normalize_package_name(requirement_name(spec));
            if dep.is_empty() {
                continue;
            }
            table.entry(dep).or_default().push(dist.name.clone());
        }
    }
    table
}

/// Renders one distribution's documentation as Markdown.
///
/// `required_by` lists the installed distributions depending on this one;
/// both lists are sorted case-insensitively.
pub fn render_document(dist: &DistMetadata, required_by: &[String]) -> String {
    let mut requires: Vec<&str> = dist
        .requires_dist
        .iter()
        .map(|spec| requirement_name(spec))
        .filter(|name| !name.is_empty())
        .collect();
    requires.sort_by_key(|name| name.to_lowercase());
    requires.dedup();

    let mut required_by: Vec<&String> = required_by.iter().collect();
    required_by.sort_by_key(|name| name.to_lowercase());
    required_by.dedup();

    let mut doc = format!("# {} {}\n", dist.name, dist.version);
    if let Some(summary) = &dist.summary {
        doc.push_str(&format!("\n{summary}\n"));
    }

    doc.push('\n');
    if let Some(homepage) = &dist.homepage {
        doc.push_str(&format!("- Home-page: {homepage}\n"));
    }
    if let Some(author) = &dist.author {
        doc.push_str(&format!("- Author: {author}\n"));
    }
    if let Some(license) = &dist.license {
        doc.push_str(&format!("- License: {license}\n"));
    }
    if let Some(requires_python) = &dist.requires_python {
        doc.push_str(&format!("- Requires-Python: {requires_python}\n"));
    }

    if !requires.is_empty() {
        doc.push_str("\n## Requires\n");
        for name in requires {
            doc.push_str(&format!("- {name}\n"));
        }
    }
    if !required_by.is_empty() {
        doc.push_str("\n## Required by\n");
        for name in required_by {
            doc.push_str(&format!("- {name}\n"));
        }
    }

    doc
}
