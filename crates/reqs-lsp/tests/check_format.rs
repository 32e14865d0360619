//! End-to-end tests for the check/format surface over real files.

use reqs_lsp::cli::{check, format_files};
use reqs_lsp::finders::{diagnostic_finders, repeated_package_finder};
use reqs_core::{Finder, count_level, get_diagnostics};
use std::path::PathBuf;
use tempfile::TempDir;
use tower_lsp_server::ls_types::{DiagnosticSeverity, Uri};

fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn check_reports_syntax_error_and_duplicate() {
    let dir = TempDir::new().unwrap();
    let file = write_file(&dir, "requirements.txt", "foo\n%%bad\nfoo\n");

    // One error + one warning, both at-or-above the warning threshold.
    assert_eq!(check(&[file], false, None), 2);
}

#[test]
fn check_flags_missing_requirement_file() {
    let dir = TempDir::new().unwrap();
    let file = write_file(&dir, "requirements.txt", "-r missing.txt\n");

    assert_eq!(check(std::slice::from_ref(&file), false, None), 1);

    let uri = Uri::from_file_path(&file).unwrap();
    let tree = reqs_syntax::parse(&std::fs::read_to_string(&file).unwrap());
    let diagnostics = get_diagnostics(&mut diagnostic_finders(None), &uri, &tree);
    assert_eq!(diagnostics.len(), 1);
    assert!(diagnostics[0].message.contains("missing.txt"));
    assert_eq!(diagnostics[0].severity, Some(DiagnosticSeverity::ERROR));
}

#[test]
fn check_follows_includes_for_duplicates() {
    let dir = TempDir::new().unwrap();
    write_file(&dir, "base.txt", "flask\nrequests\n");
    let top = write_file(&dir, "requirements.txt", "-r base.txt\nflask\n");

    // The duplicate against the included file is one warning.
    assert_eq!(check(&[top], false, None), 1);
}

#[test]
fn check_reports_cyclic_includes() {
    let dir = TempDir::new().unwrap();
    let a = write_file(&dir, "a.txt", "-r b.txt\npkg-a\n");
    write_file(&dir, "b.txt", "-r a.txt\npkg-b\n");

    let uri = Uri::from_file_path(&a).unwrap();
    let tree = reqs_syntax::parse(&std::fs::read_to_string(&a).unwrap());
    let diagnostics = get_diagnostics(&mut diagnostic_finders(None), &uri, &tree);
    assert!(
        diagnostics
            .iter()
            .any(|d| d.message.contains("cyclic inclusion"))
    );
    // Still countable as errors in check mode.
    assert!(count_level(&diagnostics, DiagnosticSeverity::WARNING) >= 1);
}

#[test]
fn format_round_trips_to_sorted_file() {
    let dir = TempDir::new().unwrap();
    let file = write_file(&dir, "requirements.txt", "banana\napple\ncherry\n");

    assert_eq!(format_files(std::slice::from_ref(&file)), 1);
    let formatted = std::fs::read_to_string(&file).unwrap();
    assert_eq!(formatted, "apple\nbanana\ncherry\n");

    // After formatting, a fresh check reports no ordering warnings.
    let uri = Uri::from_file_path(&file).unwrap();
    let tree = reqs_syntax::parse(&formatted);
    let mut finder = reqs_lsp::finders::unsorted_requirement_finder();
    assert!(finder.find_all(&uri, &tree).is_empty());
}

#[test]
fn format_converges_under_repeated_passes() {
    // Pairwise exchange sorts heavily shuffled input over a few passes.
    let dir = TempDir::new().unwrap();
    let file = write_file(&dir, "requirements.txt", "zope\nbanana\napple\ncherry\n");

    for _ in 0..8 {
        if format_files(std::slice::from_ref(&file)) == 0 {
            break;
        }
    }

    let formatted = std::fs::read_to_string(&file).unwrap();
    assert_eq!(formatted, "apple\nbanana\ncherry\nzope\n");

    let uri = Uri::from_file_path(&file).unwrap();
    let tree = reqs_syntax::parse(&formatted);
    let mut finder = reqs_lsp::finders::unsorted_requirement_finder();
    assert!(finder.find_all(&uri, &tree).is_empty());
}

#[test]
fn definitions_resolve_across_included_documents() {
    let dir = TempDir::new().unwrap();
    write_file(&dir, "base.txt", "flask\n");
    let top = write_file(&dir, "requirements.txt", "-r base.txt\nflask\n");

    let uri = Uri::from_file_path(&top).unwrap();
    let tree = reqs_syntax::parse(&std::fs::read_to_string(&top).unwrap());

    let mut finder = repeated_package_finder();
    let matches = finder.find_all(&uri, &tree);
    assert_eq!(matches.len(), 1);

    // The definition lives in the included document.
    let definitions = finder.get_definitions(&matches[0]);
    assert_eq!(definitions.len(), 1);
    assert!(definitions[0].uri.as_str().ends_with("base.txt"));
}

#[test]
fn comments_and_blank_lines_are_clean() {
    let dir = TempDir::new().unwrap();
    let file = write_file(
        &dir,
        "requirements.txt",
        "# runtime dependencies\n\nflask>=2.0  # web\nrequests==2.31.0\n",
    );
    assert_eq!(check(&[file], false, None), 0);
}
