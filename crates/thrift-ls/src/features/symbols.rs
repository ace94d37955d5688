//! Document symbols.
//!
//! Symbols are built from the top-level declarations and their member
//! nodes. Names are extracted token-wise: container declarations and enum
//! values take the first identifier in the node; senum values take the
//! string literal's contents; functions, fields, typedefs, and consts take
//! the last identifier before a kind-specific boundary token, tracking
//! delimiter depth so type names inside generics never shadow the real
//! name.

use crate::convert::span_to_range;
use thrift_ls_protocol::{DocumentSymbol, symbol_kind};
use thrift_syntax::{Node, NodeId, Tree, kinds, member_node_ids, top_level_declaration_ids};
use thrift_text::ByteSpan;
use thrift_token::TokenKind;

/// Builds the symbol tree for a document.
pub fn document_symbols(tree: &Tree) -> Vec<DocumentSymbol> {
    top_level_declaration_ids(tree)
        .into_iter()
        .filter_map(|id| declaration_symbol(tree, id))
        .collect()
}

fn declaration_symbol(tree: &Tree, id: NodeId) -> Option<DocumentSymbol> {
    let node = tree.node(id)?;
    let kind = match tree.kind_of(node) {
        kinds::STRUCT_DEFINITION | kinds::UNION_DEFINITION | kinds::EXCEPTION_DEFINITION => {
            symbol_kind::STRUCT
        }
        kinds::ENUM_DEFINITION | kinds::SENUM_DEFINITION => symbol_kind::ENUM,
        kinds::SERVICE_DEFINITION => symbol_kind::INTERFACE,
        kinds::TYPEDEF_DECLARATION => symbol_kind::TYPE_PARAMETER,
        kinds::CONST_DECLARATION => symbol_kind::CONSTANT,
        _ => return None,
    };
    let (name, name_span) = symbol_name(tree, node)?;
    let children = member_node_ids(tree, id)
        .into_iter()
        .filter_map(|member| member_symbol(tree, member))
        .collect();
    Some(DocumentSymbol {
        name,
        kind,
        range: span_to_range(tree, node.span),
        selection_range: span_to_range(tree, name_span),
        children,
    })
}

fn member_symbol(tree: &Tree, id: NodeId) -> Option<DocumentSymbol> {
    let node = tree.node(id)?;
    let kind = match tree.kind_of(node) {
        kinds::FUNCTION_DEFINITION => symbol_kind::METHOD,
        kinds::FIELD => symbol_kind::FIELD,
        kinds::ENUM_VALUE | kinds::SENUM_VALUE => symbol_kind::ENUM_MEMBER,
        _ => return None,
    };
    let (name, name_span) = symbol_name(tree, node)?;
    Some(DocumentSymbol {
        name,
        kind,
        range: span_to_range(tree, node.span),
        selection_range: span_to_range(tree, name_span),
        children: Vec::new(),
    })
}

/// Extracts a symbol's name and its span.
fn symbol_name(tree: &Tree, node: &Node) -> Option<(String, ByteSpan)> {
    match tree.kind_of(node) {
        kinds::STRUCT_DEFINITION
        | kinds::UNION_DEFINITION
        | kinds::EXCEPTION_DEFINITION
        | kinds::ENUM_DEFINITION
        | kinds::SENUM_DEFINITION
        | kinds::SERVICE_DEFINITION
        | kinds::ENUM_VALUE => first_identifier(tree, node),
        kinds::SENUM_VALUE => first_string_contents(tree, node),
        kinds::FUNCTION_DEFINITION => last_identifier_before(tree, node, &[TokenKind::LParen]),
        kinds::FIELD => last_identifier_before(tree, node, &[
            TokenKind::Eq,
            TokenKind::LParen,
            TokenKind::Comma,
            TokenKind::Semicolon,
            TokenKind::RParen,
            TokenKind::RBrace,
        ]),
        kinds::TYPEDEF_DECLARATION | kinds::CONST_DECLARATION => {
            last_identifier_before(tree, node, &[
                TokenKind::Eq,
                TokenKind::LParen,
                TokenKind::Comma,
                TokenKind::Semicolon,
            ])
        }
        _ => None,
    }
}

fn first_identifier(tree: &Tree, node: &Node) -> Option<(String, ByteSpan)> {
    let (first, last) = node.token_range?;
    for index in first..=last {
        let token = tree.token(index)?;
        if token.kind == TokenKind::Identifier {
            let text = token.text_str(&tree.source)?.to_string();
            return Some((text, token.span));
        }
    }
    None
}

fn first_string_contents(tree: &Tree, node: &Node) -> Option<(String, ByteSpan)> {
    let (first, last) = node.token_range?;
    for index in first..=last {
        let token = tree.token(index)?;
        if token.kind == TokenKind::StringLiteral {
            let text = token.text_str(&tree.source)?;
            let trimmed = text.trim_matches(|c| c == '"' || c == '\'');
            return Some((trimmed.to_string(), token.span));
        }
    }
    None
}

/// The last identifier at delimiter depth zero before the first boundary
/// token at depth zero.
fn last_identifier_before(
    tree: &Tree,
    node: &Node,
    boundaries: &[TokenKind],
) -> Option<(String, ByteSpan)> {
    let (first, last) = node.token_range?;
    let mut depth = 0i32;
    let mut name: Option<(String, ByteSpan)> = None;
    for index in first..=last {
        let token = tree.token(index)?;
        if depth == 0 && boundaries.contains(&token.kind) {
            break;
        }
        match token.kind {
            TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace | TokenKind::LAngle => {
                depth += 1;
            }
            TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace | TokenKind::RAngle => {
                depth -= 1;
            }
            TokenKind::Identifier if depth == 0 => {
                let text = token.text_str(&tree.source)?.to_string();
                name = Some((text, token.span));
            }
            _ => {}
        }
    }
    name
}
