//! Open-document store.
//!
//! One entry per open document holding the latest source and its parse
//! tree. Entries are replaced wholesale on every change notification and
//! removed on close; there is no incremental patching.

use dashmap::DashMap;
use reqs_syntax::Tree;
use tower_lsp_server::ls_types::Uri;

/// One open document version.
#[derive(Clone)]
pub struct Document {
    pub source: String,
    pub tree: Tree,
}

#[derive(Default)]
pub struct DocumentStore {
    documents: DashMap<Uri, Document>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses `source` and stores it as the current version of `uri`,
    /// replacing any previous tree.
    pub fn update(&self, uri: Uri, source: String) -> Document {
        let document = Document {
            tree: reqs_syntax::parse(&source),
            source,
        };
        self.documents.insert(uri, document.clone());
        document
    }

    pub fn get(&self, uri: &Uri) -> Option<Document> {
        self.documents.get(uri).map(|doc| doc.clone())
    }

    pub fn remove(&self, uri: &Uri) {
        self.documents.remove(uri);
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}
