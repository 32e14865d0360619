//! The `Finder` contract and its traversal engine.
//!
//! A finder is a stateful predicate over [`Uni`]s plus rendering metadata
//! (message template, severity). The provided methods implement the shared
//! traversal: depth-first pre-order with an explicit stack, where a matched
//! node's subtree is pruned and, for finders that declare inclusion points,
//! referenced documents are parsed on demand and folded into the same
//! conceptual walk.

use crate::uni::{Uni, path_to_uri};
use reqs_syntax::Tree;
use std::path::{Path, PathBuf};
use tower_lsp_server::ls_types::{Diagnostic, DiagnosticSeverity, Uri};

/// Upper bound on transitive include nesting. Deeper references are skipped
/// with a warning rather than walked.
pub const MAX_INCLUDE_DEPTH: usize = 16;

/// Outcome of one `find_report` traversal.
pub struct FindReport {
    /// Every UNI the predicate accepted, in traversal order.
    pub matches: Vec<Uni>,
    /// Include-reference nodes whose target was already being traversed
    /// (cyclic inclusion). Reported instead of recursing.
    pub cycles: Vec<Uni>,
}

/// Traversal context: the chain of documents currently being walked.
///
/// A fresh `Walk` is created per `find`/`find_all` call, so recursive
/// delegation never shares cursor state with an outer traversal.
pub struct Walk {
    current: Uri,
    outer: Vec<Uri>,
    cycles: Vec<Uni>,
}

impl Walk {
    fn new(uri: Uri) -> Self {
        Self {
            current: uri,
            outer: Vec::new(),
            cycles: Vec::new(),
        }
    }

    fn uri(&self) -> &Uri {
        &self.current
    }

    fn depth(&self) -> usize {
        self.outer.len()
    }

    /// Switches the context into an included document, parsing it on
    /// demand. Returns `None` (and only aborts the sub-traversal) when the
    /// target is cyclic, too deep, or unreadable.
    fn enter(&mut self, origin: &Uni, target: &Path) -> Option<Tree> {
        let Some(uri) = path_to_uri(target) else {
            tracing::warn!(path = %target.display(), "include target has no valid URI");
            return None;
        };
        if uri == self.current || self.outer.contains(&uri) {
            tracing::warn!(path = %target.display(), "cyclic inclusion, not recursing");
            self.cycles.push(origin.clone());
            return None;
        }
        if self.depth() + 1 >= MAX_INCLUDE_DEPTH {
            tracing::warn!(
                path = %target.display(),
                depth = self.depth(),
                "include nesting too deep, skipping"
            );
            return None;
        }
        let text = match std::fs::read_to_string(target) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(path = %target.display(), error = %e, "cannot read include target");
                return None;
            }
        };
        self.outer.push(std::mem::replace(&mut self.current, uri));
        Some(reqs_syntax::parse(&text))
    }

    /// Restores the including document's context.
    fn leave(&mut self) {
        if let Some(prev) = self.outer.pop() {
            self.current = prev;
        }
    }
}

/// A stateful predicate-plus-renderer over parse trees.
///
/// Implementors supply the predicate and rendering metadata; traversal,
/// diagnostics rendering, and cross-document delegation come with the
/// trait. One instance must not be shared across concurrent traversals:
/// each `find`/`find_all` call owns the accumulator state from `reset()`
/// through return.
pub trait Finder {
    /// Whether this UNI is a finding. May mutate accumulator state.
    fn predicate(&mut self, uni: &Uni) -> bool;

    /// Message template. `{text}` and `{kind}` expand from the matched UNI;
    /// `{other}` expands from [`Finder::paired_with`].
    fn message(&self) -> &str;

    fn severity(&self) -> DiagnosticSeverity;

    /// Clears accumulator state. Called at the start of every traversal so
    /// results never leak between runs.
    fn reset(&mut self) {}

    /// Declares a node as an inclusion point by resolving the document it
    /// references. The traversal folds that document in before descending
    /// into the node's children.
    fn inclusion_target(&self, uni: &Uni) -> Option<PathBuf> {
        let _ = uni;
        None
    }

    /// The earlier UNI paired with `uni`, for `{other}` in messages.
    fn paired_with(&self, uni: &Uni) -> Option<Uni> {
        let _ = uni;
        None
    }

    /// First matching UNI in pre-order, or `None`.
    fn find(&mut self, uri: &Uri, tree: &Tree) -> Option<Uni> {
        self.reset();
        let mut walk = Walk::new(uri.clone());
        let mut out = Vec::with_capacity(1);
        self.search(&mut walk, tree, &mut out, true);
        out.pop()
    }

    /// Every matching UNI in traversal order.
    fn find_all(&mut self, uri: &Uri, tree: &Tree) -> Vec<Uni> {
        self.find_report(uri, tree).matches
    }

    /// Like `find_all`, but also surfaces cyclic-inclusion findings.
    fn find_report(&mut self, uri: &Uri, tree: &Tree) -> FindReport {
        self.reset();
        let mut walk = Walk::new(uri.clone());
        let mut matches = Vec::new();
        self.search(&mut walk, tree, &mut matches, false);
        FindReport {
            matches,
            cycles: walk.cycles,
        }
    }

    /// Traversal engine shared by `find`/`find_all`. Returns true when the
    /// search stopped early (first-only mode).
    #[doc(hidden)]
    fn search(&mut self, walk: &mut Walk, tree: &Tree, out: &mut Vec<Uni>, first_only: bool) -> bool {
        let mut stack = vec![tree.root()];
        while let Some(node) = stack.pop() {
            let uni = Uni::new(walk.uri().clone(), node.clone());
            if self.predicate(&uni) {
                out.push(uni);
                if first_only {
                    return true;
                }
                // A match's subtree is pruned.
                continue;
            }
            if let Some(target) = self.inclusion_target(&uni) {
                if let Some(included) = walk.enter(&uni, &target) {
                    let stopped = self.search(walk, &included, out, first_only);
                    walk.leave();
                    if stopped {
                        return true;
                    }
                }
            }
            for child in node.children().into_iter().rev() {
                stack.push(child);
            }
        }
        false
    }

    /// Renders the message template for a matched UNI.
    fn render_message(&self, uni: &Uni) -> String {
        render_template(self.message(), uni, self.paired_with(uni).as_ref())
    }

    fn uni_to_diagnostic(&self, uni: &Uni) -> Diagnostic {
        uni.diagnostic(self.render_message(uni), self.severity())
    }

    fn unis_to_diagnostics(&self, unis: &[Uni]) -> Vec<Diagnostic> {
        unis.iter().map(|uni| self.uni_to_diagnostic(uni)).collect()
    }
}

/// Expands `{text}`, `{kind}` and `{other}` placeholders.
pub(crate) fn render_template(template: &str, uni: &Uni, other: Option<&Uni>) -> String {
    let mut message = template
        .replace("{text}", uni.text())
        .replace("{kind}", uni.kind().as_str());
    if message.contains("{other}") {
        let other = other.map(ToString::to_string).unwrap_or_default();
        message = message.replace("{other}", &other);
    }
    message
}

/// Pointwise combination of two finders' predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombineOp {
    And,
    Or,
    AndNot,
}

/// A finder whose predicate combines two others, keeping the left operand's
/// configuration (message, severity, inclusion points, pairing state).
///
/// Built by [`FinderExt::and`]/[`FinderExt::or`]/[`FinderExt::and_not`];
/// neither input is mutated by composition itself.
pub struct Combined<L, R> {
    op: CombineOp,
    left: L,
    right: R,
}

impl<L: Finder, R: Finder> Finder for Combined<L, R> {
    fn predicate(&mut self, uni: &Uni) -> bool {
        match self.op {
            CombineOp::And => self.left.predicate(uni) && self.right.predicate(uni),
            CombineOp::Or => self.left.predicate(uni) || self.right.predicate(uni),
            CombineOp::AndNot => self.left.predicate(uni) && !self.right.predicate(uni),
        }
    }

    fn message(&self) -> &str {
        self.left.message()
    }

    fn severity(&self) -> DiagnosticSeverity {
        self.left.severity()
    }

    fn reset(&mut self) {
        self.left.reset();
        self.right.reset();
    }

    fn inclusion_target(&self, uni: &Uni) -> Option<PathBuf> {
        self.left.inclusion_target(uni)
    }

    fn paired_with(&self, uni: &Uni) -> Option<Uni> {
        self.left.paired_with(uni)
    }
}

/// Combinators over finders.
pub trait FinderExt: Finder + Sized {
    /// Matches where both finders match.
    fn and<R: Finder>(self, right: R) -> Combined<Self, R> {
        Combined {
            op: CombineOp::And,
            left: self,
            right,
        }
    }

    /// Matches where either finder matches.
    fn or<R: Finder>(self, right: R) -> Combined<Self, R> {
        Combined {
            op: CombineOp::Or,
            left: self,
            right,
        }
    }

    /// Matches where the left finder matches and the right does not.
    fn and_not<R: Finder>(self, right: R) -> Combined<Self, R> {
        Combined {
            op: CombineOp::AndNot,
            left: self,
            right,
        }
    }
}

impl<F: Finder> FinderExt for F {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finders::TypeFinder;
    use reqs_syntax::{SyntaxKind, parse};
    use std::io::Write;

    fn test_uri() -> Uri {
        Uri::from_file_path("/tmp/requirements.txt").unwrap()
    }

    #[test]
    fn test_find_returns_first_in_document_order() {
        let tree = parse("alpha\nbeta\n");
        let mut finder = TypeFinder::new(SyntaxKind::Package);
        let uni = finder.find(&test_uri(), &tree).unwrap();
        assert_eq!(uni.text(), "alpha");
    }

    #[test]
    fn test_find_all_is_deterministic_under_reset() {
        let tree = parse("alpha\nbeta\ngamma\n");
        let mut finder = TypeFinder::new(SyntaxKind::Package);
        let first: Vec<String> = finder
            .find_all(&test_uri(), &tree)
            .iter()
            .map(|u| u.text().to_string())
            .collect();
        let second: Vec<String> = finder
            .find_all(&test_uri(), &tree)
            .iter()
            .map(|u| u.text().to_string())
            .collect();
        assert_eq!(first, vec!["alpha", "beta", "gamma"]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_matched_subtree_is_pruned() {
        // Matching requirements must not also yield their package children.
        let tree = parse("alpha\nbeta\n");
        let mut finder = TypeFinder::new(SyntaxKind::Requirement);
        let matches = finder.find_all(&test_uri(), &tree);
        assert_eq!(matches.len(), 2);
        assert!(matches.iter().all(|u| u.kind() == SyntaxKind::Requirement));
    }

    #[test]
    fn test_and_combinator() {
        let tree = parse("flask\n%%bad\n");
        let mut finder =
            TypeFinder::new(SyntaxKind::Requirement).and(crate::finders::ErrorFinder::new());
        // Requirement nodes are not leaves, so the error side never holds.
        assert!(finder.find_all(&test_uri(), &tree).is_empty());
    }

    #[test]
    fn test_or_combinator() {
        let tree = parse("flask\n-r base.txt\n");
        let mut finder =
            TypeFinder::new(SyntaxKind::Package).or(TypeFinder::new(SyntaxKind::Path));
        let texts: Vec<_> = finder
            .find_all(&test_uri(), &tree)
            .iter()
            .map(|u| u.text().to_string())
            .collect();
        assert_eq!(texts, vec!["flask", "base.txt"]);
    }

    #[test]
    fn test_and_not_combinator() {
        let tree = parse("flask\ndjango\n");
        struct TextIs(&'static str);
        impl Finder for TextIs {
            fn predicate(&mut self, uni: &Uni) -> bool {
                uni.text() == self.0
            }
            fn message(&self) -> &str {
                "{text}"
            }
            fn severity(&self) -> DiagnosticSeverity {
                DiagnosticSeverity::INFORMATION
            }
        }
        let mut finder = TypeFinder::new(SyntaxKind::Package).and_not(TextIs("flask"));
        let texts: Vec<_> = finder
            .find_all(&test_uri(), &tree)
            .iter()
            .map(|u| u.text().to_string())
            .collect();
        assert_eq!(texts, vec!["django"]);
    }

    #[test]
    fn test_render_template_placeholders() {
        let tree = parse("flask\n");
        let uni = Uni::new(test_uri(), tree.root().child(0).unwrap().child(0).unwrap());
        let rendered = render_template("{text} ({kind})", &uni, None);
        assert_eq!(rendered, "flask (package)");
    }

    #[test]
    fn test_inclusion_points_fold_other_documents() {
        struct IncludingPackages;
        impl Finder for IncludingPackages {
            fn predicate(&mut self, uni: &Uni) -> bool {
                uni.kind() == SyntaxKind::Package
            }
            fn message(&self) -> &str {
                "{text}"
            }
            fn severity(&self) -> DiagnosticSeverity {
                DiagnosticSeverity::INFORMATION
            }
            fn inclusion_target(&self, uni: &Uni) -> Option<PathBuf> {
                crate::finders::include_target(uni)
            }
        }

        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("base.txt");
        let mut f = std::fs::File::create(&base).unwrap();
        writeln!(f, "included-pkg").unwrap();

        let top = dir.path().join("requirements.txt");
        std::fs::write(&top, "-r base.txt\ntop-pkg\n").unwrap();

        let tree = parse(&std::fs::read_to_string(&top).unwrap());
        let uri = Uri::from_file_path(&top).unwrap();
        let mut finder = IncludingPackages;
        let texts: Vec<_> = finder
            .find_all(&uri, &tree)
            .iter()
            .map(|u| u.text().to_string())
            .collect();
        // The included document is folded in at its reference point.
        assert_eq!(texts, vec!["included-pkg", "top-pkg"]);
    }

    #[test]
    fn test_cyclic_inclusion_is_reported_not_recursed() {
        struct IncludingPackages;
        impl Finder for IncludingPackages {
            fn predicate(&mut self, uni: &Uni) -> bool {
                uni.kind() == SyntaxKind::Package
            }
            fn message(&self) -> &str {
                "{text}"
            }
            fn severity(&self) -> DiagnosticSeverity {
                DiagnosticSeverity::INFORMATION
            }
            fn inclusion_target(&self, uni: &Uni) -> Option<PathBuf> {
                crate::finders::include_target(uni)
            }
        }

        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.txt");
        std::fs::write(&a, "-r b.txt\npkg-a\n").unwrap();
        std::fs::write(&b, "-r a.txt\npkg-b\n").unwrap();

        let tree = parse(&std::fs::read_to_string(&a).unwrap());
        let uri = Uri::from_file_path(&a).unwrap();
        let mut finder = IncludingPackages;
        let report = finder.find_report(&uri, &tree);

        let texts: Vec<_> = report.matches.iter().map(|u| u.text().to_string()).collect();
        assert_eq!(texts, vec!["pkg-b", "pkg-a"]);
        assert_eq!(report.cycles.len(), 1);
        assert_eq!(report.cycles[0].text(), "a.txt");
    }

    #[test]
    fn test_missing_include_target_aborts_only_subtraversal() {
        struct IncludingPackages;
        impl Finder for IncludingPackages {
            fn predicate(&mut self, uni: &Uni) -> bool {
                uni.kind() == SyntaxKind::Package
            }
            fn message(&self) -> &str {
                "{text}"
            }
            fn severity(&self) -> DiagnosticSeverity {
                DiagnosticSeverity::INFORMATION
            }
            fn inclusion_target(&self, uni: &Uni) -> Option<PathBuf> {
                crate::finders::include_target(uni)
            }
        }

        let dir = tempfile::tempdir().unwrap();
        let top = dir.path().join("requirements.txt");
        std::fs::write(&top, "-r does-not-exist.txt\nstill-here\n").unwrap();

        let tree = parse(&std::fs::read_to_string(&top).unwrap());
        let uri = Uri::from_file_path(&top).unwrap();
        let mut finder = IncludingPackages;
        let report = finder.find_report(&uri, &tree);
        let texts: Vec<_> = report.matches.iter().map(|u| u.text().to_string()).collect();
        assert_eq!(texts, vec!["still-here"]);
        assert!(report.cycles.is_empty());
    }
}
