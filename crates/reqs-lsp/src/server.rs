//! The LSP façade: wires finder analyses to protocol events.

use crate::config::ServerConfig;
use crate::document::DocumentStore;
use crate::finders::{diagnostic_finders, formatting_edits, repeated_package_finder};
use crate::options;
use reqs_core::{Finder, PackageLookup, PositionFinder, TypeFinder, get_diagnostics};
use reqs_pypi::{PackageIndex, package_url};
use reqs_syntax::SyntaxKind;
use std::sync::{Arc, OnceLock};
use tokio::sync::RwLock;
use tower_lsp_server::ls_types::{
    CompletionItem, CompletionItemKind, CompletionOptions, CompletionParams, CompletionResponse,
    Diagnostic, DidChangeTextDocumentParams, DidCloseTextDocumentParams, DidOpenTextDocumentParams,
    Documentation, DocumentFormattingParams, DocumentLink, DocumentLinkOptions, DocumentLinkParams,
    GotoDefinitionParams, GotoDefinitionResponse, Hover, HoverContents, HoverParams,
    HoverProviderCapability, InitializeParams, InitializeResult, InitializedParams, Location,
    MarkupContent, MarkupKind, MessageType, OneOf, Position, ReferenceParams, ServerCapabilities,
    ServerInfo, TextDocumentSyncCapability, TextDocumentSyncKind, TextEdit, Uri,
};
use tower_lsp_server::{Client, LanguageServer, jsonrpc::Result};

/// Cap on completion items returned for one request.
const MAX_COMPLETIONS: usize = 100;

pub struct Backend {
    pub(crate) client: Client,
    store: DocumentStore,
    config: Arc<RwLock<ServerConfig>>,
    index: OnceLock<Arc<PackageIndex>>,
}

impl Backend {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            store: DocumentStore::new(),
            config: Arc::new(RwLock::new(ServerConfig::default())),
            index: OnceLock::new(),
        }
    }

    fn lookup(&self) -> Option<Arc<dyn PackageLookup>> {
        self.index
            .get()
            .map(|index| Arc::clone(index) as Arc<dyn PackageLookup>)
    }

    /// Runs the diagnostic finder set over the stored tree for `uri`.
    fn compute_diagnostics(&self, uri: &Uri) -> Vec<Diagnostic> {
        let Some(document) = self.store.get(uri) else {
            return Vec::new();
        };
        let mut finders = diagnostic_finders(self.lookup());
        get_diagnostics(&mut finders, uri, &document.tree)
    }

    async fn reparse_and_publish(&self, uri: Uri, content: String) {
        self.store.update(uri.clone(), content);
        let diagnostics = self.compute_diagnostics(&uri);
        tracing::debug!(uri = ?uri, count = diagnostics.len(), "publishing diagnostics");
        self.client.publish_diagnostics(uri, diagnostics, None).await;
    }

    /// The node under the cursor, if the document is open.
    fn node_at(&self, uri: &Uri, position: Position) -> Option<reqs_core::Uni> {
        let document = self.store.get(uri)?;
        PositionFinder::new(position).find(uri, &document.tree)
    }

    fn definitions_at(&self, uri: &Uri, position: Position) -> Vec<Location> {
        let Some(document) = self.store.get(uri) else {
            return Vec::new();
        };
        let Some(target) = PositionFinder::new(position).find(uri, &document.tree) else {
            return Vec::new();
        };
        let mut finder = repeated_package_finder();
        finder.find_all(uri, &document.tree);
        finder.get_definitions(&target)
    }

    fn references_at(&self, uri: &Uri, position: Position) -> Vec<Location> {
        let Some(document) = self.store.get(uri) else {
            return Vec::new();
        };
        let Some(target) = PositionFinder::new(position).find(uri, &document.tree) else {
            return Vec::new();
        };
        let mut finder = repeated_package_finder();
        finder.find_all(uri, &document.tree);
        finder.get_references(&target)
    }

    fn document_links(&self, uri: &Uri) -> Vec<DocumentLink> {
        let Some(document) = self.store.get(uri) else {
            return Vec::new();
        };
        let lookup = self.lookup();
        let mut finder = TypeFinder::new(SyntaxKind::Package);
        finder
            .find_all(uri, &document.tree)
            .iter()
            .filter(|uni| {
                lookup
                    .as_ref()
                    .is_none_or(|lookup| lookup.is_known(uni.text()))
            })
            .filter_map(|uni| uni.document_link(&package_url(uni.text())))
            .collect()
    }

    async fn hover_at(&self, uri: &Uri, position: Position) -> Option<Hover> {
        let target = self.node_at(uri, position)?;
        match target.kind() {
            SyntaxKind::OptionFlag => {
                let help = options::option_help(target.text())?;
                Some(Hover {
                    contents: HoverContents::Markup(MarkupContent {
                        kind: MarkupKind::PlainText,
                        value: help.to_string(),
                    }),
                    range: Some(target.range()),
                })
            }
            SyntaxKind::Package => {
                let index = self.index.get()?;
                let documentation = index.get_or_fetch(target.text()).await?;
                Some(Hover {
                    contents: HoverContents::Markup(MarkupContent {
                        kind: MarkupKind::Markdown,
                        value: documentation,
                    }),
                    range: Some(target.range()),
                })
            }
            _ => None,
        }
    }

    fn completions_at(&self, uri: &Uri, position: Position) -> Vec<CompletionItem> {
        let Some(target) = self.node_at(uri, position) else {
            return Vec::new();
        };
        let text = target.text();

        if target.kind() == SyntaxKind::Package {
            let Some(index) = self.index.get() else {
                return Vec::new();
            };
            return index
                .names_with_prefix(text, MAX_COMPLETIONS)
                .into_iter()
                .map(|name| CompletionItem {
                    label: name.clone(),
                    kind: Some(CompletionItemKind::MODULE),
                    documentation: index.documentation(&name).map(|doc| {
                        Documentation::MarkupContent(MarkupContent {
                            kind: MarkupKind::Markdown,
                            value: doc,
                        })
                    }),
                    insert_text: Some(name),
                    ..Default::default()
                })
                .collect();
        }

        // Incomplete option flags parse as error leaves, so match on the
        // text rather than the node kind.
        if text.starts_with('-') {
            return options::matching_options(text)
                .map(|spec| {
                    let label = options::completion_label(spec);
                    CompletionItem {
                        label: label.clone(),
                        kind: Some(CompletionItemKind::KEYWORD),
                        documentation: Some(Documentation::String(spec.help.to_string())),
                        insert_text: Some(label),
                        ..Default::default()
                    }
                })
                .collect();
        }

        Vec::new()
    }

    fn server_capabilities() -> ServerCapabilities {
        ServerCapabilities {
            text_document_sync: Some(TextDocumentSyncCapability::Kind(TextDocumentSyncKind::FULL)),
            completion_provider: Some(CompletionOptions {
                trigger_characters: Some(vec!["-".into(), "=".into()]),
                resolve_provider: Some(false),
                ..Default::default()
            }),
            hover_provider: Some(HoverProviderCapability::Simple(true)),
            definition_provider: Some(OneOf::Left(true)),
            references_provider: Some(OneOf::Left(true)),
            document_formatting_provider: Some(OneOf::Left(true)),
            document_link_provider: Some(DocumentLinkOptions {
                resolve_provider: Some(false),
                work_done_progress_options: Default::default(),
            }),
            ..Default::default()
        }
    }
}

impl LanguageServer for Backend {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        tracing::info!("initializing reqs-lsp server");

        if let Some(init_options) = params.initialization_options
            && let Ok(config) = serde_json::from_value::<ServerConfig>(init_options)
        {
            tracing::debug!("loaded configuration: {:?}", config);
            *self.config.write().await = config;
        }

        let options = self.config.read().await.index_options();
        let _ = self.index.set(Arc::new(PackageIndex::new(options)));

        Ok(InitializeResult {
            capabilities: Self::server_capabilities(),
            server_info: Some(ServerInfo {
                name: "reqs-lsp".into(),
                version: Some(env!("CARGO_PKG_VERSION").into()),
            }),
            offset_encoding: None,
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        tracing::info!("reqs-lsp server initialized");
        self.client
            .log_message(MessageType::INFO, "reqs-lsp ready")
            .await;

        // Fire-and-forget population; readers tolerate a partial table.
        if let Some(index) = self.index.get() {
            let index = Arc::clone(index);
            tokio::spawn(async move {
                index.populate().await;
            });
        }
    }

    async fn shutdown(&self) -> Result<()> {
        tracing::info!("shutting down reqs-lsp server");
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let uri = params.text_document.uri;
        tracing::info!("document opened: {:?}", uri);
        self.reparse_and_publish(uri, params.text_document.text).await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        if let Some(change) = params.content_changes.first() {
            self.reparse_and_publish(uri, change.text.clone()).await;
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;
        tracing::info!("document closed: {:?}", uri);
        self.store.remove(&uri);
        self.client.publish_diagnostics(uri, Vec::new(), None).await;
    }

    async fn formatting(&self, params: DocumentFormattingParams) -> Result<Option<Vec<TextEdit>>> {
        let uri = params.text_document.uri;
        let Some(document) = self.store.get(&uri) else {
            return Ok(None);
        };
        let edits = formatting_edits(&uri, &document.tree);
        tracing::debug!(uri = ?uri, count = edits.len(), "formatting edits");
        Ok(Some(edits))
    }

    async fn goto_definition(
        &self,
        params: GotoDefinitionParams,
    ) -> Result<Option<GotoDefinitionResponse>> {
        let uri = params.text_document_position_params.text_document.uri;
        let position = params.text_document_position_params.position;
        let definitions = self.definitions_at(&uri, position);
        if definitions.is_empty() {
            Ok(None)
        } else {
            Ok(Some(GotoDefinitionResponse::Array(definitions)))
        }
    }

    async fn references(&self, params: ReferenceParams) -> Result<Option<Vec<Location>>> {
        let uri = params.text_document_position.text_document.uri;
        let position = params.text_document_position.position;
        let references = self.references_at(&uri, position);
        if references.is_empty() {
            Ok(None)
        } else {
            Ok(Some(references))
        }
    }

    async fn document_link(&self, params: DocumentLinkParams) -> Result<Option<Vec<DocumentLink>>> {
        Ok(Some(self.document_links(&params.text_document.uri)))
    }

    async fn hover(&self, params: HoverParams) -> Result<Option<Hover>> {
        let uri = params.text_document_position_params.text_document.uri;
        let position = params.text_document_position_params.position;
        Ok(self.hover_at(&uri, position).await)
    }

    async fn completion(&self, params: CompletionParams) -> Result<Option<CompletionResponse>> {
        let uri = params.text_document_position.text_document.uri;
        let position = params.text_document_position.position;
        let items = self.completions_at(&uri, position);
        if items.is_empty() {
            Ok(None)
        } else {
            Ok(Some(CompletionResponse::Array(items)))
        }
    }
}
