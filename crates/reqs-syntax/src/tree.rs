//! Arena-backed syntax tree with cheap node handles.
//!
//! The tree owns all node records in a single `Vec`; a [`Node`] is an
//! `Arc` to the arena plus an index, so handles are `Clone + Send + Sync`
//! and equality is node identity (same tree, same index) rather than
//! structural comparison. That identity semantics is what the finder layer
//! relies on when it pairs nodes across a traversal and looks them up again
//! later.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Node kind tags for the requirements grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntaxKind {
    /// Document root.
    File,
    /// A `#`-to-end-of-line comment.
    Comment,
    /// One requirement entry (package plus specifiers/markers).
    Requirement,
    /// Package name token.
    Package,
    /// Bracketed extras list, including the brackets.
    Extras,
    /// A full version specifier list (`>=1.0,<2.0`).
    VersionSpec,
    /// A single comparison operator (`==`, `>=`, ...).
    VersionCmp,
    /// A version token.
    Version,
    /// Environment marker expression after `;`.
    Marker,
    /// A whole option line (`-r other.txt`, `--index-url ...`).
    GlobalOpt,
    /// The option flag token itself.
    OptionFlag,
    /// A filesystem path argument.
    Path,
    /// A URL argument.
    Url,
    /// Any other option argument.
    Argument,
    /// Unparseable input.
    Error,
}

impl SyntaxKind {
    /// Stable tag string for this kind, matching the requirements grammar.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Comment => "comment",
            Self::Requirement => "requirement",
            Self::Package => "package",
            Self::Extras => "extras",
            Self::VersionSpec => "version_spec",
            Self::VersionCmp => "version_cmp",
            Self::Version => "version",
            Self::Marker => "marker",
            Self::GlobalOpt => "global_opt",
            Self::OptionFlag => "option",
            Self::Path => "path",
            Self::Url => "url",
            Self::Argument => "argument",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for SyntaxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A (line, character) position. Lines are 0-based; characters are 0-based
/// UTF-16 code units, the editor protocol's convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Point {
    pub line: u32,
    pub character: u32,
}

impl Point {
    pub fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.character)
    }
}

pub(crate) struct NodeData {
    pub(crate) kind: SyntaxKind,
    pub(crate) start_byte: usize,
    pub(crate) end_byte: usize,
    pub(crate) start: Point,
    pub(crate) end: Point,
    pub(crate) parent: Option<u32>,
    pub(crate) children: Vec<u32>,
    pub(crate) is_missing: bool,
    pub(crate) has_error: bool,
}

pub(crate) struct TreeData {
    pub(crate) source: String,
    pub(crate) nodes: Vec<NodeData>,
}

/// An immutable parse tree for one document version.
///
/// Cloning a `Tree` is cheap (it shares the arena). A new tree is built from
/// scratch on every content change.
#[derive(Clone)]
pub struct Tree {
    data: Arc<TreeData>,
}

impl Tree {
    pub(crate) fn new(data: TreeData) -> Self {
        Self {
            data: Arc::new(data),
        }
    }

    /// The root node. Always present, kind [`SyntaxKind::File`].
    pub fn root(&self) -> Node {
        Node {
            data: Arc::clone(&self.data),
            id: 0,
        }
    }

    /// The full source text this tree was parsed from.
    pub fn source(&self) -> &str {
        &self.data.source
    }
}

impl fmt::Debug for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tree")
            .field("nodes", &self.data.nodes.len())
            .finish()
    }
}

/// A handle to one node inside a [`Tree`].
///
/// Equality and hashing are by node identity: two handles are equal iff they
/// point into the same tree at the same index. Handles from different trees
/// (including a reparse of identical text) never compare equal.
#[derive(Clone)]
pub struct Node {
    data: Arc<TreeData>,
    id: u32,
}

impl Node {
    fn get(&self) -> &NodeData {
        &self.data.nodes[self.id as usize]
    }

    pub fn kind(&self) -> SyntaxKind {
        self.get().kind
    }

    /// The raw source slice this node spans. Empty for missing nodes.
    pub fn text(&self) -> &str {
        let data = self.get();
        &self.data.source[data.start_byte..data.end_byte]
    }

    pub fn start_byte(&self) -> usize {
        self.get().start_byte
    }

    pub fn end_byte(&self) -> usize {
        self.get().end_byte
    }

    pub fn start_point(&self) -> Point {
        self.get().start
    }

    /// End position, exclusive.
    pub fn end_point(&self) -> Point {
        self.get().end
    }

    pub fn child_count(&self) -> usize {
        self.get().children.len()
    }

    pub fn is_leaf(&self) -> bool {
        self.get().children.is_empty()
    }

    pub fn child(&self, index: usize) -> Option<Node> {
        self.get().children.get(index).map(|&id| Node {
            data: Arc::clone(&self.data),
            id,
        })
    }

    /// All children in document order.
    pub fn children(&self) -> Vec<Node> {
        self.get()
            .children
            .iter()
            .map(|&id| Node {
                data: Arc::clone(&self.data),
                id,
            })
            .collect()
    }

    pub fn parent(&self) -> Option<Node> {
        self.get().parent.map(|id| Node {
            data: Arc::clone(&self.data),
            id,
        })
    }

    /// True for zero-width placeholder nodes inserted where a required token
    /// was absent (e.g. `-r` with no path).
    pub fn is_missing(&self) -> bool {
        self.get().is_missing
    }

    /// True if this node is unparseable input or contains any such node.
    pub fn has_error(&self) -> bool {
        self.get().has_error
    }

    /// The point `(line, character)` span rendered 1-based, as used in
    /// human-facing messages. The end character stays at its exclusive
    /// value.
    pub fn display_span(&self) -> String {
        let (s, e) = (self.start_point(), self.end_point());
        format!(
            "{}:{}-{}:{}",
            s.line + 1,
            s.character + 1,
            e.line + 1,
            e.character
        )
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.data, &other.data) && self.id == other.id
    }
}

impl Eq for Node {}

impl Hash for Node {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (Arc::as_ptr(&self.data) as usize).hash(state);
        self.id.hash(state);
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}@{}..{} {:?}",
            self.kind(),
            self.start_point(),
            self.end_point(),
            self.text()
        )
    }
}

#[cfg(test)]
mod tests {
    use crate::parse;

    #[test]
    fn test_node_identity_equality() {
        let tree = parse("flask\n");
        let a = tree.root().child(0).unwrap();
        let b = tree.root().child(0).unwrap();
        assert_eq!(a, b);

        // Reparsing identical text yields a different tree: not equal.
        let other = parse("flask\n");
        assert_ne!(a, other.root().child(0).unwrap());
    }

    #[test]
    fn test_parent_links() {
        let tree = parse("flask>=2.0\n");
        let requirement = tree.root().child(0).unwrap();
        let package = requirement.child(0).unwrap();
        assert_eq!(package.parent().unwrap(), requirement);
        assert_eq!(requirement.parent().unwrap(), tree.root());
        assert!(tree.root().parent().is_none());
    }

    #[test]
    fn test_display_span_is_one_based() {
        let tree = parse("flask\n");
        let package = tree.root().child(0).unwrap().child(0).unwrap();
        assert_eq!(package.display_span(), "1:1-1:5");
    }

    #[test]
    fn test_kind_tags() {
        use crate::SyntaxKind;
        assert_eq!(SyntaxKind::Package.as_str(), "package");
        assert_eq!(SyntaxKind::GlobalOpt.as_str(), "global_opt");
        assert_eq!(SyntaxKind::OptionFlag.as_str(), "option");
    }
}
