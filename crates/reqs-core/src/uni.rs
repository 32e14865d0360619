//! The unit of interest: a (document, node) pair.

use crate::DIAGNOSTIC_SOURCE;
use reqs_syntax::{Node, Point, SyntaxKind};
use std::fmt;
use std::path::{Path, PathBuf};
use tower_lsp_server::ls_types::{
    Diagnostic, DiagnosticSeverity, DocumentLink, Location, Position, Range, TextEdit, Uri,
};

/// Converts a document URI to a filesystem path, if it names a file.
pub fn uri_to_path(uri: &Uri) -> Option<PathBuf> {
    uri.to_file_path().map(|p| p.as_ref().to_path_buf())
}

/// Converts a filesystem path to a `file://` URI.
pub fn path_to_uri(path: &Path) -> Option<Uri> {
    Uri::from_file_path(path)
}

/// One reportable unit inside a parsed document.
///
/// Equality is by node identity (same tree arena, same node) plus document
/// URI, which is what lets pairing finders re-identify a node they recorded
/// earlier in the same traversal.
#[derive(Clone, PartialEq, Eq)]
pub struct Uni {
    pub uri: Uri,
    pub node: Node,
}

impl Uni {
    pub fn new(uri: Uri, node: Node) -> Self {
        Self { uri, node }
    }

    pub fn text(&self) -> &str {
        self.node.text()
    }

    pub fn kind(&self) -> SyntaxKind {
        self.node.kind()
    }

    /// Protocol range of the node. The parser's end points are already
    /// exclusive, so they map straight onto the protocol convention.
    pub fn range(&self) -> Range {
        Range {
            start: point_to_position(self.node.start_point()),
            end: point_to_position(self.node.end_point()),
        }
    }

    pub fn location(&self) -> Location {
        Location {
            uri: self.uri.clone(),
            range: self.range(),
        }
    }

    pub fn text_edit(&self, new_text: String) -> TextEdit {
        TextEdit {
            range: self.range(),
            new_text,
        }
    }

    /// A document link over this node pointing at `target`. Returns `None`
    /// if `target` is not a valid URI.
    pub fn document_link(&self, target: &str) -> Option<DocumentLink> {
        let target: Uri = target.parse().ok()?;
        Some(DocumentLink {
            range: self.range(),
            target: Some(target),
            tooltip: None,
            data: None,
        })
    }

    pub fn diagnostic(&self, message: String, severity: DiagnosticSeverity) -> Diagnostic {
        Diagnostic {
            range: self.range(),
            severity: Some(severity),
            source: Some(DIAGNOSTIC_SOURCE.into()),
            message,
            ..Default::default()
        }
    }

    /// Directory of the containing document, for resolving relative paths.
    pub fn dir(&self) -> Option<PathBuf> {
        let path = uri_to_path(&self.uri)?;
        path.parent().map(Path::to_path_buf)
    }

    /// This node's text resolved as a path against the containing
    /// document's directory. Absolute paths are taken as-is.
    pub fn resolve_path(&self) -> Option<PathBuf> {
        let text = self.text();
        if text.is_empty() {
            return None;
        }
        let candidate = Path::new(text);
        if candidate.is_absolute() {
            return Some(candidate.to_path_buf());
        }
        Some(self.dir()?.join(candidate))
    }
}

fn point_to_position(point: Point) -> Position {
    Position {
        line: point.line,
        character: point.character,
    }
}

impl fmt::Display for Uni {
    /// `text@line:col-line:col`, 1-based except the exclusive end column;
    /// the form embedded in pairing diagnostics.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.text(), self.node.display_span())
    }
}

impl fmt::Debug for Uni {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Uni({:?}, {:?})", self.uri.as_str(), self.node)
    }
}
