//! Standard finders: parser-flagged problems, kind/point queries, the
//! pairing state machine behind duplicate and sort-order detection, and the
//! domain validity finders that consult external collaborators.

use crate::finder::Finder;
use crate::lookup::PackageLookup;
use crate::uni::Uni;
use reqs_syntax::{Point, SyntaxKind};
use std::marker::PhantomData;
use std::path::PathBuf;
use std::sync::Arc;
use tower_lsp_server::ls_types::{DiagnosticSeverity, Location, Position, Range, TextEdit};

/// Matches leaf nodes the parser flagged as unparseable.
pub struct ErrorFinder {
    message: String,
    severity: DiagnosticSeverity,
}

impl ErrorFinder {
    pub fn new() -> Self {
        Self {
            message: "{text}: syntax error".into(),
            severity: DiagnosticSeverity::ERROR,
        }
    }
}

impl Default for ErrorFinder {
    fn default() -> Self {
        Self::new()
    }
}

impl Finder for ErrorFinder {
    fn predicate(&mut self, uni: &Uni) -> bool {
        uni.node.is_leaf() && uni.node.has_error()
    }

    fn message(&self) -> &str {
        &self.message
    }

    fn severity(&self) -> DiagnosticSeverity {
        self.severity
    }
}

/// Matches zero-width nodes standing in for required-but-absent tokens.
pub struct MissingFinder {
    message: String,
    severity: DiagnosticSeverity,
}

impl MissingFinder {
    pub fn new() -> Self {
        Self {
            message: "missing {kind}".into(),
            severity: DiagnosticSeverity::ERROR,
        }
    }
}

impl Default for MissingFinder {
    fn default() -> Self {
        Self::new()
    }
}

impl Finder for MissingFinder {
    fn predicate(&mut self, uni: &Uni) -> bool {
        uni.node.is_leaf() && uni.node.is_missing()
    }

    fn message(&self) -> &str {
        &self.message
    }

    fn severity(&self) -> DiagnosticSeverity {
        self.severity
    }
}

/// Matches every node of one kind. A building block for collection and
/// composition rather than a diagnostic source of its own.
pub struct TypeFinder {
    kind: SyntaxKind,
    message: String,
}

impl TypeFinder {
    pub fn new(kind: SyntaxKind) -> Self {
        Self {
            kind,
            message: "{text}".into(),
        }
    }
}

impl Finder for TypeFinder {
    fn predicate(&mut self, uni: &Uni) -> bool {
        uni.kind() == self.kind
    }

    fn message(&self) -> &str {
        &self.message
    }

    fn severity(&self) -> DiagnosticSeverity {
        DiagnosticSeverity::INFORMATION
    }
}

/// Matches the leaf whose span contains a point, boundaries inclusive.
///
/// Used to resolve the node under a cursor. For a point exactly on a shared
/// boundary between two leaves, the first leaf in traversal order wins.
pub struct PositionFinder {
    position: Position,
    message: String,
}

impl PositionFinder {
    pub fn new(position: Position) -> Self {
        Self {
            position,
            message: "{text}".into(),
        }
    }

    fn belongs(&self, uni: &Uni) -> bool {
        let point = Point::new(self.position.line, self.position.character);
        uni.node.start_point() <= point && point <= uni.node.end_point()
    }
}

impl Finder for PositionFinder {
    fn predicate(&mut self, uni: &Uni) -> bool {
        uni.node.is_leaf() && !uni.node.is_missing() && self.belongs(uni)
    }

    fn message(&self) -> &str {
        &self.message
    }

    fn severity(&self) -> DiagnosticSeverity {
        DiagnosticSeverity::INFORMATION
    }
}

/// Matches nodes whose span equals a range exactly (not containment).
///
/// Re-identifies a previously reported node after a tree rebuild.
pub struct RangeFinder {
    range: Range,
    message: String,
}

impl RangeFinder {
    pub fn new(range: Range) -> Self {
        Self {
            range,
            message: "{text}".into(),
        }
    }
}

impl Finder for RangeFinder {
    fn predicate(&mut self, uni: &Uni) -> bool {
        uni.range() == self.range
    }

    fn message(&self) -> &str {
        &self.message
    }

    fn severity(&self) -> DiagnosticSeverity {
        DiagnosticSeverity::INFORMATION
    }
}

/// The relation a [`PairingFinder`] checks between the current node and an
/// earlier-seen one.
pub trait PairRelation {
    fn related(current: &Uni, earlier: &Uni) -> bool;
}

/// Textual equality: the current entry repeats an earlier one.
pub struct TextEqual;

impl PairRelation for TextEqual {
    fn related(current: &Uni, earlier: &Uni) -> bool {
        current.text() == earlier.text()
    }
}

/// Lexicographic order violation: the current entry sorts before an earlier
/// one, so it should have come first.
pub struct SortsBefore;

impl PairRelation for SortsBefore {
    fn related(current: &Uni, earlier: &Uni) -> bool {
        current.text() < earlier.text()
    }
}

/// Detects duplicate entries among nodes of one kind.
pub type RepeatedFinder = PairingFinder<TextEqual>;

/// Detects out-of-order entries among nodes of one kind.
pub type UnsortedFinder = PairingFinder<SortsBefore>;

/// Stateful pairing finder.
///
/// Nodes passing the kind filter are compared against every previously seen
/// first occurrence, in insertion order, stopping at the first relation hit.
/// A hit records the `(later, earlier)` pair and reports the later node; a
/// miss adds the node to the seen list. A node is therefore the later member
/// of at most one pair but may anchor many later ones, and the seen list
/// never contains two mutually related entries.
pub struct PairingFinder<R> {
    filter: SyntaxKind,
    follow_includes: bool,
    message: String,
    severity: DiagnosticSeverity,
    seen: Vec<Uni>,
    pairs: Vec<(Uni, Uni)>,
    _relation: PhantomData<R>,
}

impl PairingFinder<TextEqual> {
    /// Duplicate detection over nodes of `filter` kind.
    pub fn new(filter: SyntaxKind) -> Self {
        Self::with_message(filter, "{text} is repeated on {other}")
    }
}

impl PairingFinder<SortsBefore> {
    /// Sort-order checking over nodes of `filter` kind.
    pub fn new(filter: SyntaxKind) -> Self {
        Self::with_message(filter, "{text} is unsorted due to {other}")
    }
}

impl<R: PairRelation> PairingFinder<R> {
    pub fn with_message(filter: SyntaxKind, message: &str) -> Self {
        Self {
            filter,
            follow_includes: false,
            message: message.into(),
            severity: DiagnosticSeverity::WARNING,
            seen: Vec::new(),
            pairs: Vec::new(),
            _relation: PhantomData,
        }
    }

    /// Also walk documents referenced by `-r`/`--requirement` and
    /// `-c`/`--constraint`, making the analysis one flat search across the
    /// entry point and everything it includes.
    pub fn follow_includes(mut self) -> Self {
        self.follow_includes = true;
        self
    }

    /// First occurrences seen so far, in traversal order.
    pub fn seen(&self) -> &[Uni] {
        &self.seen
    }

    /// Recorded `(later, earlier)` pairs, in traversal order.
    pub fn pairs(&self) -> &[(Uni, Uni)] {
        &self.pairs
    }

    /// The earlier occurrence's location, if `uni` was recorded as the
    /// later member of a pair.
    pub fn get_definitions(&self, uni: &Uni) -> Vec<Location> {
        for (later, earlier) in &self.pairs {
            if later == uni {
                return vec![earlier.location()];
            }
        }
        Vec::new()
    }

    /// Every later occurrence paired against `uni` as the earlier member.
    pub fn get_references(&self, uni: &Uni) -> Vec<Location> {
        self.pairs
            .iter()
            .filter(|(_, earlier)| earlier == uni)
            .map(|(later, _)| later.location())
            .collect()
    }

    /// For every pair, two edits that swap the nodes' text, physically
    /// re-ordering entries by pairwise exchange.
    pub fn get_text_edits(&self) -> Vec<TextEdit> {
        let mut edits = Vec::with_capacity(self.pairs.len() * 2);
        for (later, earlier) in &self.pairs {
            edits.push(later.text_edit(earlier.text().to_string()));
            edits.push(earlier.text_edit(later.text().to_string()));
        }
        edits
    }
}

impl<R: PairRelation> Finder for PairingFinder<R> {
    fn reset(&mut self) {
        self.seen.clear();
        self.pairs.clear();
    }

    fn predicate(&mut self, uni: &Uni) -> bool {
        if uni.kind() != self.filter {
            return false;
        }
        for earlier in &self.seen {
            if R::related(uni, earlier) {
                self.pairs.push((uni.clone(), earlier.clone()));
                return true;
            }
        }
        self.seen.push(uni.clone());
        false
    }

    fn message(&self) -> &str {
        &self.message
    }

    fn severity(&self) -> DiagnosticSeverity {
        self.severity
    }

    fn paired_with(&self, uni: &Uni) -> Option<Uni> {
        self.pairs
            .iter()
            .find(|(later, _)| later == uni)
            .map(|(_, earlier)| earlier.clone())
    }

    fn inclusion_target(&self, uni: &Uni) -> Option<PathBuf> {
        if self.follow_includes {
            include_target(uni)
        } else {
            None
        }
    }
}

/// Matches `package` nodes naming packages unknown to the lookup
/// collaborator. Purely advisory: a lookup that has not finished populating
/// simply reports fewer findings.
pub struct InvalidPackageFinder {
    lookup: Arc<dyn PackageLookup>,
    message: String,
    severity: DiagnosticSeverity,
}

impl InvalidPackageFinder {
    pub fn new(lookup: Arc<dyn PackageLookup>) -> Self {
        Self {
            lookup,
            message: "{text}: no such package".into(),
            severity: DiagnosticSeverity::ERROR,
        }
    }
}

impl Finder for InvalidPackageFinder {
    fn predicate(&mut self, uni: &Uni) -> bool {
        uni.kind() == SyntaxKind::Package && !self.lookup.is_known(uni.text())
    }

    fn message(&self) -> &str {
        &self.message
    }

    fn severity(&self) -> DiagnosticSeverity {
        self.severity
    }
}

/// What kind of filesystem entry an option's path argument must name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PathExpectation {
    File,
    Directory,
    Any,
}

fn path_expectation(uni: &Uni) -> PathExpectation {
    let flag = uni
        .node
        .parent()
        .filter(|p| p.kind() == SyntaxKind::GlobalOpt)
        .and_then(|p| p.child(0));
    match flag.as_ref().map(|f| f.text()) {
        Some("-r" | "--requirement" | "-c" | "--constraint") => PathExpectation::File,
        Some("-e" | "--editable") => PathExpectation::Directory,
        _ => PathExpectation::Any,
    }
}

/// Matches `path` nodes whose resolved target does not exist as the kind
/// the preceding option flag implies (`-r`/`-c` a file, `-e` a directory).
///
/// Resolution is against the containing document's directory, never the
/// process working directory.
pub struct InvalidPathFinder {
    message: String,
    severity: DiagnosticSeverity,
}

impl InvalidPathFinder {
    pub fn new() -> Self {
        Self {
            message: "{text}: no such file or directory".into(),
            severity: DiagnosticSeverity::ERROR,
        }
    }
}

impl Default for InvalidPathFinder {
    fn default() -> Self {
        Self::new()
    }
}

impl Finder for InvalidPathFinder {
    fn predicate(&mut self, uni: &Uni) -> bool {
        if uni.kind() != SyntaxKind::Path || uni.node.is_missing() {
            return false;
        }
        let Some(target) = uni.resolve_path() else {
            return false;
        };
        match path_expectation(uni) {
            PathExpectation::File => !target.is_file(),
            PathExpectation::Directory => !target.is_dir(),
            PathExpectation::Any => !target.exists(),
        }
    }

    fn message(&self) -> &str {
        &self.message
    }

    fn severity(&self) -> DiagnosticSeverity {
        self.severity
    }
}

/// Resolves a node as an inclusion point: a `path` argument of
/// `-r`/`--requirement`/`-c`/`--constraint`, resolved against the
/// containing document's directory.
pub fn include_target(uni: &Uni) -> Option<PathBuf> {
    if uni.kind() != SyntaxKind::Path || uni.node.is_missing() {
        return None;
    }
    let parent = uni.node.parent()?;
    if parent.kind() != SyntaxKind::GlobalOpt {
        return None;
    }
    let flag = parent.child(0)?;
    if flag.kind() != SyntaxKind::OptionFlag {
        return None;
    }
    if !matches!(flag.text(), "-r" | "--requirement" | "-c" | "--constraint") {
        return None;
    }
    uni.resolve_path()
}
