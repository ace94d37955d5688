//! The built-in Thrift grammar.
//!
//! A recursive-descent parser over the lexer's token stream producing raw
//! nodes with the kind names in [`kinds`]. Recovery is panic-mode: an
//! unexpected token run becomes an `ERROR` node and scanning resumes at the
//! next synchronization point (separator, closing brace, or top-level
//! keyword). Expected-but-absent names and closing braces become zero-width
//! `MISSING` nodes.
//!
//! Node spans always coincide with token boundaries: a span starts at its
//! first token's start and ends at its last token's end.

use super::kinds;
use super::raw::{GrammarTree, RawNode, RawNodeId};
use super::{GrammarError, GrammarParser};
use thrift_text::ByteSpan;
use thrift_token::{Token, TokenKind};

/// Maximum recursion depth for nested types and const values.
const MAX_DEPTH: usize = 128;

/// The default grammar parser.
#[derive(Debug, Default)]
pub struct NativeGrammarParser;

impl NativeGrammarParser {
    /// Creates a parser.
    pub fn new() -> Self {
        Self
    }
}

impl GrammarParser for NativeGrammarParser {
    fn parse(
        &mut self,
        source: &[u8],
        tokens: &[Token],
        _old_tree: Option<&GrammarTree>,
    ) -> Result<GrammarTree, GrammarError> {
        if tokens.is_empty() {
            return Err(GrammarError::ParseFailed("empty token stream".to_string()));
        }
        Ok(Parser::new(source, tokens).parse_document())
    }
}

struct Parser<'a> {
    source: &'a [u8],
    tokens: &'a [Token],
    pos: usize,
    nodes: Vec<RawNode>,
}

impl<'a> Parser<'a> {
    fn new(source: &'a [u8], tokens: &'a [Token]) -> Self {
        Self { source, tokens, pos: 0, nodes: Vec::new() }
    }

    // -- token cursor ------------------------------------------------------

    fn kind(&self) -> TokenKind {
        self.tokens[self.pos.min(self.tokens.len() - 1)].kind
    }

    fn kind_at(&self, ahead: usize) -> TokenKind {
        self.tokens[(self.pos + ahead).min(self.tokens.len() - 1)].kind
    }

    fn at_eof(&self) -> bool {
        self.kind() == TokenKind::Eof
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.kind() == kind
    }

    fn bump(&mut self) {
        if !self.at_eof() {
            self.pos += 1;
        }
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn token_text(&self) -> &[u8] {
        self.tokens[self.pos.min(self.tokens.len() - 1)].text(self.source)
    }

    fn at_ident(&self, text: &str) -> bool {
        self.at(TokenKind::Identifier) && self.token_text() == text.as_bytes()
    }

    /// Start offset of the current token (source end at EOF).
    fn offset(&self) -> usize {
        self.tokens[self.pos.min(self.tokens.len() - 1)].span.start
    }

    /// End offset of the previous token.
    fn previous_end(&self) -> usize {
        if self.pos == 0 { 0 } else { self.tokens[self.pos - 1].span.end }
    }

    // -- node construction -------------------------------------------------

    fn push(&mut self, mut node: RawNode) -> RawNodeId {
        node.has_error = node.error
            || node.missing
            || node.children.iter().any(|&c| self.nodes[c].has_error);
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    fn node(&mut self, kind: &'static str, span: ByteSpan, children: Vec<RawNodeId>) -> RawNodeId {
        self.push(RawNode {
            kind,
            span,
            named: true,
            error: false,
            missing: false,
            has_error: false,
            children,
        })
    }

    fn missing(&mut self, at: usize) -> RawNodeId {
        self.push(RawNode {
            kind: kinds::MISSING,
            span: ByteSpan::empty(at),
            named: true,
            error: false,
            missing: true,
            has_error: false,
            children: Vec::new(),
        })
    }

    /// Consumes tokens until a synchronization point and wraps them into an
    /// `ERROR` node. Consumes at least one token.
    fn error_until(&mut self, stop: &[TokenKind]) -> RawNodeId {
        let start = self.offset();
        let mut end = start;
        loop {
            if self.at_eof() {
                break;
            }
            let kind = self.kind();
            if end > start && (stop.contains(&kind) || starts_declaration(kind)) {
                break;
            }
            end = self.tokens[self.pos].span.end;
            self.bump();
        }
        self.push(RawNode {
            kind: kinds::ERROR,
            span: ByteSpan::new(start, end.max(start)),
            named: true,
            error: true,
            missing: false,
            has_error: true,
            children: Vec::new(),
        })
    }

    // -- grammar -----------------------------------------------------------

    fn parse_document(mut self) -> GrammarTree {
        let mut children = Vec::new();
        while !self.at_eof() {
            let before = self.pos;
            if let Some(id) = self.parse_declaration() {
                children.push(id);
            } else {
                children.push(self.error_until(&[]));
            }
            if self.pos == before {
                // No progress: force one token into an error node.
                let start = self.offset();
                let end = self.tokens[self.pos].span.end;
                self.bump();
                let id = self.push(RawNode {
                    kind: kinds::ERROR,
                    span: ByteSpan::new(start, end),
                    named: true,
                    error: true,
                    missing: false,
                    has_error: true,
                    children: Vec::new(),
                });
                children.push(id);
            }
        }
        let span = ByteSpan::new(0, self.source.len());
        let root = RawNode {
            kind: kinds::DOCUMENT,
            span,
            named: true,
            error: false,
            missing: false,
            has_error: children.iter().any(|&c| self.nodes[c].has_error),
            children,
        };
        // Root lives at index 0.
        self.nodes.insert(0, root);
        for node in self.nodes.iter_mut().skip(1) {
            for child in &mut node.children {
                *child += 1;
            }
        }
        if let Some(root) = self.nodes.first_mut() {
            for child in &mut root.children {
                *child += 1;
            }
        }
        GrammarTree { nodes: self.nodes }
    }

    fn parse_declaration(&mut self) -> Option<RawNodeId> {
        match self.kind() {
            TokenKind::KwInclude => Some(self.parse_include(kinds::INCLUDE_DECLARATION)),
            TokenKind::KwCppInclude => Some(self.parse_include(kinds::CPP_INCLUDE_DECLARATION)),
            TokenKind::KwNamespace => Some(self.parse_namespace()),
            TokenKind::KwTypedef => Some(self.parse_typedef()),
            TokenKind::KwConst => Some(self.parse_const()),
            TokenKind::KwEnum => Some(self.parse_enum()),
            TokenKind::KwSenum => Some(self.parse_senum()),
            TokenKind::KwStruct => Some(self.parse_struct_like(kinds::STRUCT_DEFINITION)),
            TokenKind::KwUnion => Some(self.parse_struct_like(kinds::UNION_DEFINITION)),
            TokenKind::KwException => Some(self.parse_struct_like(kinds::EXCEPTION_DEFINITION)),
            TokenKind::KwService => Some(self.parse_service()),
            _ => None,
        }
    }

    fn parse_include(&mut self, kind: &'static str) -> RawNodeId {
        let start = self.offset();
        self.bump(); // include / cpp_include
        let mut children = Vec::new();
        if !self.eat(TokenKind::StringLiteral) && !self.eat(TokenKind::Error) {
            children.push(self.missing(self.previous_end()));
        }
        let span = ByteSpan::new(start, self.previous_end().max(start));
        self.node(kind, span, children)
    }

    fn parse_namespace(&mut self) -> RawNodeId {
        let start = self.offset();
        self.bump(); // namespace
        // Scope: identifier or `*`.
        if !self.eat(TokenKind::Identifier) {
            self.eat(TokenKind::Star);
        }
        let mut children = Vec::new();
        if self.at(TokenKind::Identifier) {
            self.parse_dotted_name();
        } else {
            children.push(self.missing(self.previous_end()));
        }
        let span = ByteSpan::new(start, self.previous_end().max(start));
        self.node(kinds::NAMESPACE_DECLARATION, span, children)
    }

    fn parse_typedef(&mut self) -> RawNodeId {
        let start = self.offset();
        self.bump(); // typedef
        let mut children = Vec::new();
        self.parse_type(&mut children, 0);
        if !self.eat(TokenKind::Identifier) {
            children.push(self.missing(self.previous_end()));
        }
        self.parse_annotations_into(&mut children);
        self.eat_separator();
        let span = ByteSpan::new(start, self.previous_end().max(start));
        self.node(kinds::TYPEDEF_DECLARATION, span, children)
    }

    fn parse_const(&mut self) -> RawNodeId {
        let start = self.offset();
        self.bump(); // const
        let mut children = Vec::new();
        self.parse_type(&mut children, 0);
        if !self.eat(TokenKind::Identifier) {
            children.push(self.missing(self.previous_end()));
        }
        if self.eat(TokenKind::Eq) {
            if let Some(value) = self.parse_const_value(0) {
                children.push(value);
            } else {
                children.push(self.missing(self.previous_end()));
            }
        } else {
            children.push(self.missing(self.previous_end()));
        }
        self.eat_separator();
        let span = ByteSpan::new(start, self.previous_end().max(start));
        self.node(kinds::CONST_DECLARATION, span, children)
    }

    fn parse_enum(&mut self) -> RawNodeId {
        let start = self.offset();
        self.bump(); // enum
        let mut children = Vec::new();
        if !self.eat(TokenKind::Identifier) {
            children.push(self.missing(self.previous_end()));
        }
        if self.at(TokenKind::LBrace) {
            children.push(self.parse_enum_block());
        } else {
            children.push(self.missing(self.previous_end()));
        }
        self.parse_annotations_into(&mut children);
        let span = ByteSpan::new(start, self.previous_end().max(start));
        self.node(kinds::ENUM_DEFINITION, span, children)
    }

    fn parse_enum_block(&mut self) -> RawNodeId {
        let start = self.offset();
        self.bump(); // {
        let mut children = Vec::new();
        loop {
            if self.at(TokenKind::RBrace) || self.at_eof() {
                break;
            }
            let before = self.pos;
            if self.at(TokenKind::Identifier) {
                children.push(self.parse_enum_value());
            } else {
                children.push(self.error_until(&[TokenKind::Comma, TokenKind::Semicolon,
                    TokenKind::RBrace]));
                self.eat_separator();
            }
            if self.pos == before {
                break;
            }
        }
        if !self.eat(TokenKind::RBrace) {
            children.push(self.missing(self.previous_end()));
        }
        let span = ByteSpan::new(start, self.previous_end().max(start));
        self.node(kinds::ENUM_BLOCK, span, children)
    }

    fn parse_enum_value(&mut self) -> RawNodeId {
        let start = self.offset();
        self.bump(); // name
        let mut children = Vec::new();
        if self.eat(TokenKind::Eq) {
            self.eat(TokenKind::Minus);
            if !self.eat(TokenKind::IntLiteral) {
                children.push(self.missing(self.previous_end()));
            }
        }
        self.parse_annotations_into(&mut children);
        self.eat_separator();
        let span = ByteSpan::new(start, self.previous_end().max(start));
        self.node(kinds::ENUM_VALUE, span, children)
    }

    fn parse_senum(&mut self) -> RawNodeId {
        let start = self.offset();
        self.bump(); // senum
        let mut children = Vec::new();
        if !self.eat(TokenKind::Identifier) {
            children.push(self.missing(self.previous_end()));
        }
        if self.eat(TokenKind::LBrace) {
            loop {
                if self.at(TokenKind::RBrace) || self.at_eof() {
                    break;
                }
                let before = self.pos;
                if self.at(TokenKind::StringLiteral) {
                    children.push(self.parse_senum_value());
                } else {
                    children.push(self.error_until(&[TokenKind::Comma, TokenKind::Semicolon,
                        TokenKind::RBrace]));
                    self.eat_separator();
                }
                if self.pos == before {
                    break;
                }
            }
            if !self.eat(TokenKind::RBrace) {
                children.push(self.missing(self.previous_end()));
            }
        } else {
            children.push(self.missing(self.previous_end()));
        }
        let span = ByteSpan::new(start, self.previous_end().max(start));
        self.node(kinds::SENUM_DEFINITION, span, children)
    }

    fn parse_senum_value(&mut self) -> RawNodeId {
        let start = self.offset();
        self.bump(); // string literal
        let value_end = self.previous_end();
        self.eat_separator();
        let span = ByteSpan::new(start, value_end);
        self.node(kinds::SENUM_VALUE, span, Vec::new())
    }

    fn parse_struct_like(&mut self, kind: &'static str) -> RawNodeId {
        let start = self.offset();
        self.bump(); // struct / union / exception
        let mut children = Vec::new();
        if !self.eat(TokenKind::Identifier) {
            children.push(self.missing(self.previous_end()));
        }
        // Legacy xsd_all marker.
        if self.at_ident("xsd_all") {
            self.bump();
        }
        if self.at(TokenKind::LBrace) {
            children.push(self.parse_field_block());
        } else {
            children.push(self.missing(self.previous_end()));
        }
        self.parse_annotations_into(&mut children);
        let span = ByteSpan::new(start, self.previous_end().max(start));
        self.node(kind, span, children)
    }

    fn parse_field_block(&mut self) -> RawNodeId {
        let start = self.offset();
        self.bump(); // {
        let mut children = Vec::new();
        loop {
            if self.at(TokenKind::RBrace) || self.at_eof() {
                break;
            }
            let before = self.pos;
            if self.at_field_start() {
                children.push(self.parse_field());
            } else {
                children.push(self.error_until(&[TokenKind::Comma, TokenKind::Semicolon,
                    TokenKind::RBrace]));
                self.eat_separator();
            }
            if self.pos == before {
                break;
            }
        }
        if !self.eat(TokenKind::RBrace) {
            children.push(self.missing(self.previous_end()));
        }
        let span = ByteSpan::new(start, self.previous_end().max(start));
        self.node(kinds::FIELD_BLOCK, span, children)
    }

    fn at_field_start(&self) -> bool {
        matches!(
            self.kind(),
            TokenKind::IntLiteral
                | TokenKind::Minus
                | TokenKind::Plus
                | TokenKind::KwRequired
                | TokenKind::KwOptional
                | TokenKind::Identifier
                | TokenKind::KwMap
                | TokenKind::KwList
                | TokenKind::KwSet
        ) || self.kind().is_base_type()
    }

    /// Parses one field (struct member or function parameter).
    fn parse_field(&mut self) -> RawNodeId {
        let start = self.offset();
        let mut children = Vec::new();

        // field_id: [+-]? integer `:`
        if (self.at(TokenKind::IntLiteral)
            && self.kind_at(1) == TokenKind::Colon)
            || (matches!(self.kind(), TokenKind::Minus | TokenKind::Plus)
                && self.kind_at(1) == TokenKind::IntLiteral
                && self.kind_at(2) == TokenKind::Colon)
        {
            let id_start = self.offset();
            if !self.at(TokenKind::IntLiteral) {
                self.bump(); // sign
            }
            self.bump(); // integer
            let id_span = ByteSpan::new(id_start, self.previous_end());
            children.push(self.node(kinds::FIELD_ID, id_span, Vec::new()));
            self.bump(); // `:`
        }

        // Modifier.
        if self.at(TokenKind::KwRequired) || self.at(TokenKind::KwOptional) {
            self.bump();
        }

        self.parse_type(&mut children, 0);

        // field_name
        if self.at(TokenKind::Identifier) && !self.at_xsd_modifier() {
            let name_span = self.tokens[self.pos].span;
            self.bump();
            children.push(self.node(kinds::FIELD_NAME, name_span, Vec::new()));
        } else {
            children.push(self.missing(self.previous_end()));
        }

        // Default value.
        if self.eat(TokenKind::Eq) {
            if let Some(value) = self.parse_const_value(0) {
                children.push(value);
            } else {
                children.push(self.missing(self.previous_end()));
            }
        }

        // Deprecated xsd modifiers.
        while self.at_xsd_modifier() {
            let xsd_start = self.offset();
            let text = self.token_text().to_vec();
            self.bump();
            let (kind, nested) = if text == b"xsd_attrs" {
                // xsd_attrs { field* }
                let mut nested = Vec::new();
                if self.eat(TokenKind::LBrace) {
                    loop {
                        if self.at(TokenKind::RBrace) || self.at_eof() {
                            break;
                        }
                        let before = self.pos;
                        if self.at_field_start() {
                            nested.push(self.parse_field());
                        } else {
                            nested.push(self.error_until(&[TokenKind::RBrace]));
                        }
                        if self.pos == before {
                            break;
                        }
                    }
                    self.eat(TokenKind::RBrace);
                }
                (kinds::XSD_ATTRS, nested)
            } else if text == b"xsd_nillable" {
                (kinds::XSD_NILLABLE, Vec::new())
            } else {
                (kinds::XSD_OPTIONAL, Vec::new())
            };
            let span = ByteSpan::new(xsd_start, self.previous_end());
            children.push(self.node(kind, span, nested));
        }

        self.parse_annotations_into(&mut children);
        self.eat_separator();
        let span = ByteSpan::new(start, self.previous_end().max(start));
        self.node(kinds::FIELD, span, children)
    }

    fn at_xsd_modifier(&self) -> bool {
        self.at_ident("xsd_optional") || self.at_ident("xsd_nillable") || self.at_ident("xsd_attrs")
    }

    fn parse_service(&mut self) -> RawNodeId {
        let start = self.offset();
        self.bump(); // service
        let mut children = Vec::new();
        if !self.eat(TokenKind::Identifier) {
            children.push(self.missing(self.previous_end()));
        }
        if self.eat(TokenKind::KwExtends) {
            if self.at(TokenKind::Identifier) {
                self.parse_dotted_name();
            } else {
                children.push(self.missing(self.previous_end()));
            }
        }
        if self.at(TokenKind::LBrace) {
            children.push(self.parse_function_block());
        } else {
            children.push(self.missing(self.previous_end()));
        }
        self.parse_annotations_into(&mut children);
        let span = ByteSpan::new(start, self.previous_end().max(start));
        self.node(kinds::SERVICE_DEFINITION, span, children)
    }

    fn parse_function_block(&mut self) -> RawNodeId {
        let start = self.offset();
        self.bump(); // {
        let mut children = Vec::new();
        loop {
            if self.at(TokenKind::RBrace) || self.at_eof() {
                break;
            }
            let before = self.pos;
            if self.at_function_start() {
                children.push(self.parse_function());
            } else {
                children.push(self.error_until(&[TokenKind::Comma, TokenKind::Semicolon,
                    TokenKind::RBrace]));
                self.eat_separator();
            }
            if self.pos == before {
                break;
            }
        }
        if !self.eat(TokenKind::RBrace) {
            children.push(self.missing(self.previous_end()));
        }
        let span = ByteSpan::new(start, self.previous_end().max(start));
        self.node(kinds::FUNCTION_BLOCK, span, children)
    }

    fn at_function_start(&self) -> bool {
        matches!(
            self.kind(),
            TokenKind::KwOneway
                | TokenKind::KwAsync
                | TokenKind::KwVoid
                | TokenKind::Identifier
                | TokenKind::KwMap
                | TokenKind::KwList
                | TokenKind::KwSet
        ) || self.kind().is_base_type()
    }

    fn parse_function(&mut self) -> RawNodeId {
        let start = self.offset();
        let mut children = Vec::new();
        if self.at(TokenKind::KwOneway) || self.at(TokenKind::KwAsync) {
            self.bump();
        }
        if !self.eat(TokenKind::KwVoid) {
            self.parse_type(&mut children, 0);
        }
        if !self.eat(TokenKind::Identifier) {
            children.push(self.missing(self.previous_end()));
        }
        if self.at(TokenKind::LParen) {
            children.push(self.parse_param_list(kinds::PARAMETERS, self.offset()));
        } else {
            children.push(self.missing(self.previous_end()));
        }
        if self.at(TokenKind::KwThrows) {
            let throws_start = self.offset();
            self.bump();
            if self.at(TokenKind::LParen) {
                children.push(self.parse_param_list(kinds::THROWS, throws_start));
            } else {
                children.push(self.missing(self.previous_end()));
            }
        }
        self.parse_annotations_into(&mut children);
        self.eat_separator();
        let span = ByteSpan::new(start, self.previous_end().max(start));
        self.node(kinds::FUNCTION_DEFINITION, span, children)
    }

    /// `( field* )`, used for both parameter lists and throws clauses. The
    /// node starts at `start` so a `throws` keyword is covered by its node.
    fn parse_param_list(&mut self, kind: &'static str, start: usize) -> RawNodeId {
        self.bump(); // (
        let mut children = Vec::new();
        loop {
            if self.at(TokenKind::RParen) || self.at_eof() {
                break;
            }
            let before = self.pos;
            if self.at_field_start() {
                children.push(self.parse_field());
            } else {
                children.push(self.error_until(&[TokenKind::Comma, TokenKind::Semicolon,
                    TokenKind::RParen]));
                self.eat_separator();
            }
            if self.pos == before {
                break;
            }
        }
        if !self.eat(TokenKind::RParen) {
            children.push(self.missing(self.previous_end()));
        }
        let span = ByteSpan::new(start, self.previous_end().max(start));
        self.node(kind, span, children)
    }

    /// Consumes the tokens of a type. Annotations attached to the type are
    /// parsed into `children`.
    fn parse_type(&mut self, children: &mut Vec<RawNodeId>, depth: usize) {
        if depth > MAX_DEPTH {
            self.bump();
            return;
        }
        match self.kind() {
            k if k.is_base_type() => {
                self.bump();
                self.parse_annotations_into(children);
            }
            TokenKind::KwMap => {
                self.bump();
                if self.eat(TokenKind::LAngle) {
                    self.parse_type(children, depth + 1);
                    self.eat(TokenKind::Comma);
                    self.parse_type(children, depth + 1);
                    self.eat(TokenKind::RAngle);
                }
                self.parse_annotations_into(children);
            }
            TokenKind::KwList | TokenKind::KwSet => {
                self.bump();
                if self.eat(TokenKind::LAngle) {
                    self.parse_type(children, depth + 1);
                    self.eat(TokenKind::RAngle);
                }
                self.parse_annotations_into(children);
            }
            TokenKind::KwVoid => {
                self.bump();
            }
            TokenKind::Identifier => {
                self.parse_dotted_name();
            }
            _ => {}
        }
    }

    fn parse_dotted_name(&mut self) {
        self.bump(); // leading identifier
        while self.at(TokenKind::Dot) && self.kind_at(1) == TokenKind::Identifier {
            self.bump();
            self.bump();
        }
    }

    fn parse_const_value(&mut self, depth: usize) -> Option<RawNodeId> {
        if depth > MAX_DEPTH {
            return Some(self.error_until(&[TokenKind::Comma, TokenKind::Semicolon,
                TokenKind::RBracket, TokenKind::RBrace]));
        }
        match self.kind() {
            TokenKind::IntLiteral
            | TokenKind::FloatLiteral
            | TokenKind::StringLiteral
            | TokenKind::KwTrue
            | TokenKind::KwFalse => {
                self.bump();
                None
            }
            TokenKind::Plus | TokenKind::Minus => {
                self.bump();
                if self.at(TokenKind::IntLiteral) || self.at(TokenKind::FloatLiteral) {
                    self.bump();
                }
                None
            }
            TokenKind::Identifier => {
                self.parse_dotted_name();
                None
            }
            TokenKind::LBracket => Some(self.parse_const_list(depth)),
            TokenKind::LBrace => Some(self.parse_const_map(depth)),
            _ => {
                // No value here; caller decides whether that is an error.
                if self.at_eof()
                    || matches!(self.kind(), TokenKind::Comma | TokenKind::Semicolon
                        | TokenKind::RBrace | TokenKind::RBracket | TokenKind::RParen)
                    || starts_declaration(self.kind())
                {
                    return None;
                }
                Some(self.error_until(&[TokenKind::Comma, TokenKind::Semicolon,
                    TokenKind::RBracket, TokenKind::RBrace]))
            }
        }
    }

    fn parse_const_list(&mut self, depth: usize) -> RawNodeId {
        let start = self.offset();
        self.bump(); // [
        let mut children = Vec::new();
        loop {
            if self.at(TokenKind::RBracket) || self.at_eof() {
                break;
            }
            let before = self.pos;
            if let Some(value) = self.parse_const_value(depth + 1) {
                children.push(value);
            }
            self.eat_separator();
            if self.pos == before {
                break;
            }
        }
        if !self.eat(TokenKind::RBracket) {
            children.push(self.missing(self.previous_end()));
        }
        let span = ByteSpan::new(start, self.previous_end().max(start));
        self.node(kinds::CONST_LIST, span, children)
    }

    fn parse_const_map(&mut self, depth: usize) -> RawNodeId {
        let start = self.offset();
        self.bump(); // {
        let mut children = Vec::new();
        loop {
            if self.at(TokenKind::RBrace) || self.at_eof() {
                break;
            }
            let before = self.pos;
            if let Some(key) = self.parse_const_value(depth + 1) {
                children.push(key);
            }
            if self.eat(TokenKind::Colon) {
                if let Some(value) = self.parse_const_value(depth + 1) {
                    children.push(value);
                }
            }
            self.eat_separator();
            if self.pos == before {
                break;
            }
        }
        if !self.eat(TokenKind::RBrace) {
            children.push(self.missing(self.previous_end()));
        }
        let span = ByteSpan::new(start, self.previous_end().max(start));
        self.node(kinds::CONST_MAP, span, children)
    }

    /// `( … )` annotation list following a type, name, or definition.
    fn parse_annotations_into(&mut self, children: &mut Vec<RawNodeId>) {
        if !self.at(TokenKind::LParen) {
            return;
        }
        let start = self.offset();
        self.bump();
        let mut depth = 1usize;
        while depth > 0 && !self.at_eof() {
            match self.kind() {
                TokenKind::LParen => depth += 1,
                TokenKind::RParen => depth -= 1,
                _ => {}
            }
            self.bump();
        }
        let span = ByteSpan::new(start, self.previous_end().max(start));
        children.push(self.node(kinds::ANNOTATIONS, span, Vec::new()));
    }

    fn eat_separator(&mut self) {
        if self.at(TokenKind::Comma) || self.at(TokenKind::Semicolon) {
            self.bump();
        }
    }
}

fn starts_declaration(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::KwInclude
            | TokenKind::KwCppInclude
            | TokenKind::KwNamespace
            | TokenKind::KwTypedef
            | TokenKind::KwConst
            | TokenKind::KwEnum
            | TokenKind::KwSenum
            | TokenKind::KwStruct
            | TokenKind::KwUnion
            | TokenKind::KwException
            | TokenKind::KwService
    )
}
