//! Domain finder assembly for requirements documents.
//!
//! Thin constructors over the `reqs-core` finders, fixing the node kinds
//! and messages for this grammar, plus the standard analysis sets the
//! server and CLI run.

use reqs_core::{
    ErrorFinder, Finder, InvalidPackageFinder, InvalidPathFinder, MissingFinder, PackageLookup,
    RepeatedFinder, UnsortedFinder,
};
use reqs_syntax::{SyntaxKind, Tree};
use std::sync::Arc;
use tower_lsp_server::ls_types::{TextEdit, Uri};

/// Duplicate-package detection spanning the document and everything it
/// includes via `-r`/`-c`.
pub fn repeated_package_finder() -> RepeatedFinder {
    RepeatedFinder::new(SyntaxKind::Package).follow_includes()
}

/// Sort-order checking over whole requirement entries.
///
/// Deliberately does not follow includes: its swap edits drive formatting
/// and must never span documents.
pub fn unsorted_requirement_finder() -> UnsortedFinder {
    UnsortedFinder::new(SyntaxKind::Requirement)
}

/// The diagnostic finder set, in reporting order.
///
/// The package-existence check joins only when a lookup collaborator is
/// available; it is advisory and must not fire against an absent index.
pub fn diagnostic_finders(lookup: Option<Arc<dyn PackageLookup>>) -> Vec<Box<dyn Finder + Send>> {
    let mut finders: Vec<Box<dyn Finder + Send>> = vec![
        Box::new(ErrorFinder::new()),
        Box::new(MissingFinder::new()),
        Box::new(InvalidPathFinder::new()),
        Box::new(repeated_package_finder()),
        Box::new(unsorted_requirement_finder()),
    ];
    if let Some(lookup) = lookup {
        finders.insert(2, Box::new(InvalidPackageFinder::new(lookup)));
    }
    finders
}

/// Formatting: the pairwise swap edits that re-sort a document's entries.
///
/// A node takes part in at most one swap per pass (an entry anchoring
/// several pairs would otherwise receive overlapping edits), so a heavily
/// shuffled file converges over repeated formatting passes rather than in
/// one.
pub fn formatting_edits(uri: &Uri, tree: &Tree) -> Vec<TextEdit> {
    let mut finder = unsorted_requirement_finder();
    finder.find_all(uri, tree);

    let mut used: Vec<&reqs_core::Uni> = Vec::new();
    let mut edits = Vec::new();
    for (later, earlier) in finder.pairs() {
        if used.contains(&later) || used.contains(&earlier) {
            continue;
        }
        used.push(later);
        used.push(earlier);
        edits.push(later.text_edit(earlier.text().to_string()));
        edits.push(earlier.text_edit(later.text().to_string()));
    }
    edits
}
