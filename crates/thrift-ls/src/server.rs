//! The server: serve loop, dispatch, lifecycle, and cancellation.

use crate::features::{
    diagnostics, folding, formatting, selection, semantic_tokens, symbols,
};
use rustc_hash::{FxHashMap, FxHashSet};
use serde_json::{Value, json};
use std::io::{self, BufRead, Write};
use thrift_diagnostics::Error;
use thrift_lint::Runner;
use thrift_ls_protocol::{
    CancelParams, DidChangeParams, DidOpenParams, DocumentFormattingParams,
    DocumentRangeFormattingParams, ErrorCode, JsonRpcRequest, JsonRpcResponse, ResponseError,
    SelectionRangeParams, TextDocumentParams,
};
use thrift_ls_transport::{Frame, read_message, write_message, write_notification};
use thrift_store::{DocumentChange, SnapshotStore};
use thrift_text::{Context, Utf16Position};
use tracing::{debug, warn};

/// The Thrift language server.
///
/// Messages are processed sequentially on one loop. A `$/cancelRequest`
/// for a request that has not started yet is recorded and answered with
/// `-32800` when the request arrives.
pub struct LspServer {
    store: SnapshotStore,
    lint: Runner,
    shutdown_requested: bool,
    pending_cancels: FxHashSet<String>,
    active: FxHashMap<String, Context>,
}

impl Default for LspServer {
    fn default() -> Self {
        Self::new()
    }
}

impl LspServer {
    /// Creates a server with the built-in lint rules.
    pub fn new() -> Self {
        Self {
            store: SnapshotStore::new(),
            lint: Runner::with_builtin_rules("thriftls.lint"),
            shutdown_requested: false,
            pending_cancels: FxHashSet::default(),
            active: FxHashMap::default(),
        }
    }

    /// Serves stdio until `exit`. Returns the process exit code.
    pub fn run(&mut self) -> io::Result<i32> {
        let stdin = io::stdin();
        let mut reader = stdin.lock();
        let stdout = io::stdout();
        let mut writer = stdout.lock();
        self.serve(&mut reader, &mut writer)
    }

    /// Serves an arbitrary transport until `exit` or EOF.
    pub fn serve<R: BufRead, W: Write>(
        &mut self,
        reader: &mut R,
        writer: &mut W,
    ) -> io::Result<i32> {
        loop {
            let frame = match read_message(reader)? {
                Some(frame) => frame,
                None => {
                    // EOF without `exit` is an abnormal shutdown.
                    return Ok(if self.shutdown_requested { 0 } else { 1 });
                }
            };
            match frame {
                Frame::Malformed(message) => {
                    let error = ResponseError::new(ErrorCode::ParseError, message);
                    write_message(writer, &JsonRpcResponse::reply(None, Err(error)))?;
                }
                Frame::Request(request) => {
                    if request.method == "exit" {
                        return Ok(if self.shutdown_requested { 0 } else { 1 });
                    }
                    self.dispatch(request, writer)?;
                }
            }
        }
    }

    fn dispatch<W: Write>(&mut self, request: JsonRpcRequest, writer: &mut W) -> io::Result<()> {
        if !request.speaks_supported_version() {
            if let Some(id) = request.id {
                let error = ResponseError::new(ErrorCode::InvalidRequest, "unknown jsonrpc version");
                write_message(writer, &JsonRpcResponse::reply(Some(id), Err(error)))?;
            }
            return Ok(());
        }
        if request.is_notification() {
            self.handle_notification(&request.method, request.params, writer)
        } else {
            self.handle_request(request, writer)
        }
    }

    fn handle_request<W: Write>(
        &mut self,
        request: JsonRpcRequest,
        writer: &mut W,
    ) -> io::Result<()> {
        let id = request.id.unwrap_or(Value::Null);
        let key = id.to_string();

        if self.pending_cancels.remove(&key) {
            let error = ResponseError::new(ErrorCode::RequestCancelled, "request cancelled");
            return write_message(writer, &JsonRpcResponse::reply(Some(id), Err(error)));
        }
        if self.shutdown_requested && request.method != "shutdown" {
            let error =
                ResponseError::new(ErrorCode::InvalidRequest, Error::ShutdownRequested.to_string());
            return write_message(writer, &JsonRpcResponse::reply(Some(id), Err(error)));
        }

        let ctx = Context::new();
        self.active.insert(key.clone(), ctx.clone());
        let outcome = self.invoke(&ctx, &request.method, request.params.as_ref());
        self.active.remove(&key);

        let outcome = outcome.map_err(|error| {
            debug!(method = request.method.as_str(), %error, "request failed");
            map_error(&error)
        });
        write_message(writer, &JsonRpcResponse::reply(Some(id), outcome))
    }

    fn invoke(
        &mut self,
        ctx: &Context,
        method: &str,
        params: Option<&Value>,
    ) -> Result<Value, RequestError> {
        match method {
            "initialize" => Ok(self.initialize_result()),
            "shutdown" => {
                // Idempotent.
                self.shutdown_requested = true;
                Ok(Value::Null)
            }
            "textDocument/formatting" => {
                let params: DocumentFormattingParams = parse_params(params)?;
                let edits = formatting::formatting(ctx, &self.store, &params)?;
                to_value(&edits)
            }
            "textDocument/rangeFormatting" => {
                let params: DocumentRangeFormattingParams = parse_params(params)?;
                let edits = formatting::range_formatting(ctx, &self.store, &params)?;
                to_value(&edits)
            }
            "textDocument/documentSymbol" => {
                let params: TextDocumentParams = parse_params(params)?;
                let snapshot = self.require_open(&params.text_document.uri)?;
                to_value(&symbols::document_symbols(&snapshot.tree))
            }
            "textDocument/foldingRange" => {
                let params: TextDocumentParams = parse_params(params)?;
                let snapshot = self.require_open(&params.text_document.uri)?;
                to_value(&folding::folding_ranges(&snapshot.tree))
            }
            "textDocument/selectionRange" => {
                let params: SelectionRangeParams = parse_params(params)?;
                let snapshot = self.require_open(&params.text_document.uri)?;
                to_value(&selection::selection_ranges(&snapshot.tree, &params.positions))
            }
            "textDocument/semanticTokens/full" => {
                let params: TextDocumentParams = parse_params(params)?;
                let snapshot = self.require_open(&params.text_document.uri)?;
                to_value(&semantic_tokens::semantic_tokens_full(&snapshot.tree))
            }
            other => Err(RequestError::MethodNotFound(other.to_string())),
        }
    }

    fn handle_notification<W: Write>(
        &mut self,
        method: &str,
        params: Option<Value>,
        writer: &mut W,
    ) -> io::Result<()> {
        let ctx = Context::new();
        match method {
            "initialized" => {}
            "$/cancelRequest" => {
                if let Ok(params) = parse_params::<CancelParams>(params.as_ref()) {
                    let key = params.id.to_string();
                    if let Some(active) = self.active.get(&key) {
                        active.cancel();
                    } else {
                        self.pending_cancels.insert(key);
                    }
                }
            }
            "textDocument/didOpen" => {
                if let Ok(params) = parse_params::<DidOpenParams>(params.as_ref()) {
                    let document = params.text_document;
                    match self.store.open(&ctx, &document.uri, document.version, document.text) {
                        Ok(_) => self.publish(&ctx, &document.uri, writer)?,
                        Err(error) => warn!(%error, uri = document.uri.as_str(), "didOpen failed"),
                    }
                }
            }
            "textDocument/didChange" => {
                if let Ok(params) = parse_params::<DidChangeParams>(params.as_ref()) {
                    let uri = params.text_document.uri.clone();
                    let changes: Vec<DocumentChange> = params
                        .content_changes
                        .iter()
                        .map(|change| DocumentChange {
                            range: change.range.map(|r| {
                                (
                                    Utf16Position::new(r.start.line, r.start.character),
                                    Utf16Position::new(r.end.line, r.end.character),
                                )
                            }),
                            text: change.text.clone(),
                        })
                        .collect();
                    match self.store.change(&ctx, &uri, params.text_document.version, &changes) {
                        Ok(_) => self.publish(&ctx, &uri, writer)?,
                        Err(error) => warn!(%error, uri = uri.as_str(), "didChange failed"),
                    }
                }
            }
            "textDocument/didSave" => {
                if let Ok(params) = parse_params::<TextDocumentParams>(params.as_ref()) {
                    self.publish(&ctx, &params.text_document.uri, writer)?;
                }
            }
            "textDocument/didClose" => {
                if let Ok(params) = parse_params::<TextDocumentParams>(params.as_ref()) {
                    let uri = params.text_document.uri;
                    if self.store.close(&uri).is_ok() {
                        let cleared = diagnostics::cleared(&uri);
                        write_notification(
                            writer,
                            "textDocument/publishDiagnostics",
                            json!(cleared),
                        )?;
                    }
                }
            }
            other => {
                debug!(method = other, "ignoring notification");
            }
        }
        Ok(())
    }

    fn publish<W: Write>(&self, ctx: &Context, uri: &str, writer: &mut W) -> io::Result<()> {
        if let Some(params) = diagnostics::collect(ctx, &self.store, &self.lint, uri) {
            write_notification(writer, "textDocument/publishDiagnostics", json!(params))?;
        }
        Ok(())
    }

    fn require_open(
        &self,
        uri: &str,
    ) -> Result<std::sync::Arc<thrift_store::Snapshot>, RequestError> {
        self.store
            .snapshot(uri)
            .ok_or_else(|| RequestError::Lib(Error::DocumentNotOpen { uri: uri.to_string() }))
    }

    fn initialize_result(&self) -> Value {
        json!({
            "capabilities": {
                "textDocumentSync": {
                    "openClose": true,
                    "change": 2,
                    "save": {}
                },
                "documentFormattingProvider": true,
                "documentRangeFormattingProvider": true,
                "documentSymbolProvider": true,
                "foldingRangeProvider": true,
                "selectionRangeProvider": true,
                "semanticTokensProvider": {
                    "legend": semantic_tokens::legend(),
                    "full": true
                }
            },
            "serverInfo": {
                "name": "thriftls",
                "version": env!("CARGO_PKG_VERSION")
            }
        })
    }
}

/// Request-level failure: either a dispatch problem or a library error.
#[derive(Debug)]
enum RequestError {
    MethodNotFound(String),
    InvalidParams(String),
    SerializeFailed(String),
    Lib(Error),
}

impl From<Error> for RequestError {
    fn from(error: Error) -> Self {
        RequestError::Lib(error)
    }
}

impl std::fmt::Display for RequestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestError::MethodNotFound(method) => write!(f, "method not found: {method}"),
            RequestError::InvalidParams(message) => write!(f, "invalid params: {message}"),
            RequestError::SerializeFailed(message) => write!(f, "serialize failed: {message}"),
            RequestError::Lib(error) => error.fmt(f),
        }
    }
}

fn parse_params<T: serde::de::DeserializeOwned>(
    params: Option<&Value>,
) -> Result<T, RequestError> {
    let value = params.cloned().unwrap_or(Value::Null);
    serde_json::from_value(value).map_err(|err| RequestError::InvalidParams(err.to_string()))
}

fn to_value<T: serde::Serialize>(value: &T) -> Result<Value, RequestError> {
    serde_json::to_value(value).map_err(|err| RequestError::SerializeFailed(err.to_string()))
}

/// Maps request failures onto the JSON-RPC / LSP code table.
fn map_error(error: &RequestError) -> ResponseError {
    let code = match error {
        RequestError::MethodNotFound(_) => ErrorCode::MethodNotFound,
        RequestError::InvalidParams(_) => ErrorCode::InvalidParams,
        RequestError::SerializeFailed(_) => ErrorCode::InternalError,
        RequestError::Lib(error) => match error {
            Error::Cancelled => ErrorCode::RequestCancelled,
            Error::StaleVersion { .. } => ErrorCode::ContentModified,
            Error::UnsafeToFormat { .. } => ErrorCode::RequestFailed,
            Error::DocumentNotOpen { .. }
            | Error::InvalidEdit(_)
            | Error::InvalidSpan { .. }
            | Error::InvalidRange { .. }
            | Error::InvalidOption(_)
            | Error::InvalidPosition(_) => ErrorCode::InvalidParams,
            Error::ShutdownRequested => ErrorCode::InvalidRequest,
            _ => ErrorCode::InternalError,
        },
    };
    ResponseError::new(code, error.to_string())
}
