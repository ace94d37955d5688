//! LSP wire structures (UTF-16 positions).

use serde::{Deserialize, Serialize};

/// Position in a document (UTF-16 based).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Position {
    /// Line position (0-based)
    pub line: u32,
    /// Character position (UTF-16 code units, 0-based)
    pub character: u32,
}

impl Position {
    /// Creates a position.
    pub fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

/// Range in a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Range {
    /// Start position (inclusive)
    pub start: Position,
    /// End position (exclusive)
    pub end: Position,
}

impl Range {
    /// Creates a range.
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }
}

/// Text edit applied by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextEdit {
    /// The range to replace
    pub range: Range,
    /// The new text
    #[serde(rename = "newText")]
    pub new_text: String,
}

/// A document URI with content, from `didOpen`.
#[derive(Debug, Clone, Deserialize)]
pub struct TextDocumentItem {
    /// Document URI
    pub uri: String,
    /// Language id (unused)
    #[serde(default, rename = "languageId")]
    pub language_id: String,
    /// Initial version
    pub version: i32,
    /// Full content
    pub text: String,
}

/// A bare document identifier.
#[derive(Debug, Clone, Deserialize)]
pub struct TextDocumentIdentifier {
    /// Document URI
    pub uri: String,
}

/// A document identifier with a version.
#[derive(Debug, Clone, Deserialize)]
pub struct VersionedTextDocumentIdentifier {
    /// Document URI
    pub uri: String,
    /// Version after the change
    pub version: i32,
}

/// One content change in `didChange`.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentChange {
    /// Changed range; absent for whole-document replacement
    #[serde(default)]
    pub range: Option<Range>,
    /// New text for the range (or the whole document)
    pub text: String,
}

/// `textDocument/didOpen` parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct DidOpenParams {
    /// The opened document
    #[serde(rename = "textDocument")]
    pub text_document: TextDocumentItem,
}

/// `textDocument/didChange` parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct DidChangeParams {
    /// The changed document
    #[serde(rename = "textDocument")]
    pub text_document: VersionedTextDocumentIdentifier,
    /// The changes, applied in order
    #[serde(rename = "contentChanges")]
    pub content_changes: Vec<ContentChange>,
}

/// `textDocument/didSave` and `didClose` parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct TextDocumentParams {
    /// The document
    #[serde(rename = "textDocument")]
    pub text_document: TextDocumentIdentifier,
}

/// `textDocument/formatting` parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentFormattingParams {
    /// The document
    #[serde(rename = "textDocument")]
    pub text_document: TextDocumentIdentifier,
    /// Client formatting options (unused beyond defaults)
    #[serde(default)]
    pub options: serde_json::Value,
    /// Optional version pin; the request fails as stale when it does not
    /// match the current snapshot
    #[serde(default)]
    pub version: Option<i32>,
}

/// `textDocument/rangeFormatting` parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentRangeFormattingParams {
    /// The document
    #[serde(rename = "textDocument")]
    pub text_document: TextDocumentIdentifier,
    /// The UTF-16 range to format
    pub range: Range,
    /// Client formatting options (unused beyond defaults)
    #[serde(default)]
    pub options: serde_json::Value,
}

/// `textDocument/selectionRange` parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct SelectionRangeParams {
    /// The document
    #[serde(rename = "textDocument")]
    pub text_document: TextDocumentIdentifier,
    /// Positions to compute selection chains for
    pub positions: Vec<Position>,
}

/// `$/cancelRequest` parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct CancelParams {
    /// Id of the request to cancel
    pub id: serde_json::Value,
}

/// Diagnostic sent to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WireDiagnostic {
    /// Range of the diagnostic
    pub range: Range,
    /// Severity (1=error, 2=warning, 3=info)
    pub severity: u8,
    /// Stable diagnostic code
    pub code: String,
    /// Producing component
    pub source: String,
    /// Message
    pub message: String,
}

/// `textDocument/publishDiagnostics` parameters.
#[derive(Debug, Clone, Serialize)]
pub struct PublishDiagnosticsParams {
    /// Document URI
    pub uri: String,
    /// Diagnostics (empty clears)
    pub diagnostics: Vec<WireDiagnostic>,
    /// Version the diagnostics were computed from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<i32>,
}

/// One node of the `documentSymbol` response.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentSymbol {
    /// Symbol name
    pub name: String,
    /// Symbol kind (see [`crate::codes::symbol_kind`])
    pub kind: u32,
    /// Full range of the declaration
    pub range: Range,
    /// Range of the name
    #[serde(rename = "selectionRange")]
    pub selection_range: Range,
    /// Member symbols
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<DocumentSymbol>,
}

/// One `foldingRange` response entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FoldingRange {
    /// First folded line
    #[serde(rename = "startLine")]
    pub start_line: u32,
    /// Start character on the first line
    #[serde(rename = "startCharacter", skip_serializing_if = "Option::is_none")]
    pub start_character: Option<u32>,
    /// Last folded line
    #[serde(rename = "endLine")]
    pub end_line: u32,
    /// End character on the last line
    #[serde(rename = "endCharacter", skip_serializing_if = "Option::is_none")]
    pub end_character: Option<u32>,
    /// Folding kind (`comment` for comment runs)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

/// One `selectionRange` response entry; a chain linked through `parent`.
#[derive(Debug, Clone, Serialize)]
pub struct SelectionRange {
    /// The range of this step
    pub range: Range,
    /// The next (wider) step
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<Box<SelectionRange>>,
}

/// `semanticTokens/full` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SemanticTokens {
    /// Delta-encoded token stream
    pub data: Vec<u32>,
}
