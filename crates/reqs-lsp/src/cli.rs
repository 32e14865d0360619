//! Check and format modes.
//!
//! `--check` parses each file, runs the diagnostic finder set, prints one
//! linter line per finding, and returns the count of findings at Warning
//! severity or above (the process exit code, 0 meaning clean). `--format`
//! applies the unsorted-pair swap edits in place.

use crate::finders::{diagnostic_finders, formatting_edits};
use clap::ValueEnum;
use reqs_core::{PackageLookup, apply_text_edits, count_level, get_diagnostics, linter_message};
use reqs_pypi::PackageIndex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tower_lsp_server::ls_types::{DiagnosticSeverity, Uri};

/// When to colorize linter output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    Auto,
    Always,
    Never,
}

impl ColorChoice {
    /// Resolves `auto` against the terminal.
    pub fn colorize(self) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Auto => console::Term::stdout().features().colors_supported(),
        }
    }
}

fn document_uri(path: &Path) -> Option<Uri> {
    let absolute = std::path::absolute(path).ok()?;
    Uri::from_file_path(&absolute)
}

/// An offline package lookup for check mode: installed distributions only,
/// no network. `None` when nothing is installed, so the advisory
/// package-existence check stays quiet instead of flagging everything.
pub async fn offline_lookup() -> Option<Arc<dyn PackageLookup>> {
    let index = PackageIndex::default();
    index.refresh_installed().await;
    if index.is_empty() {
        None
    } else {
        Some(Arc::new(index))
    }
}

/// Checks each file, printing linter lines to stdout. Returns the count of
/// diagnostics at or above Warning severity across all files.
pub fn check(paths: &[PathBuf], colorize: bool, lookup: Option<Arc<dyn PackageLookup>>) -> usize {
    let mut total = 0usize;

    for path in paths {
        let display = path.display().to_string();
        let source = match std::fs::read_to_string(path) {
            Ok(source) => source,
            Err(e) => {
                eprintln!("{display}: {e}");
                total += 1;
                continue;
            }
        };
        let Some(uri) = document_uri(path) else {
            eprintln!("{display}: not a valid file path");
            total += 1;
            continue;
        };

        let tree = reqs_syntax::parse(&source);
        let mut finders = diagnostic_finders(lookup.clone());
        let diagnostics = get_diagnostics(&mut finders, &uri, &tree);
        for diagnostic in &diagnostics {
            println!("{}", linter_message(&display, diagnostic, colorize));
        }
        total += count_level(&diagnostics, DiagnosticSeverity::WARNING);
    }

    total
}

/// Re-sorts each file in place. Returns how many files were rewritten.
pub fn format_files(paths: &[PathBuf]) -> usize {
    let mut rewritten = 0usize;

    for path in paths {
        let shown = path.display().to_string();
        let source = match std::fs::read_to_string(path) {
            Ok(source) => source,
            Err(e) => {
                eprintln!("{shown}: {e}");
                continue;
            }
        };
        let Some(uri) = document_uri(path) else {
            eprintln!("{shown}: not a valid file path");
            continue;
        };

        let tree = reqs_syntax::parse(&source);
        let edits = formatting_edits(&uri, &tree);
        if edits.is_empty() {
            continue;
        }
        let formatted = apply_text_edits(&source, &edits);
        if formatted == source {
            continue;
        }
        match std::fs::write(path, &formatted) {
            Ok(()) => {
                tracing::info!(path = %shown, "re-sorted requirements file");
                rewritten += 1;
            }
            Err(e) => eprintln!("{shown}: {e}"),
        }
    }

    rewritten
}
