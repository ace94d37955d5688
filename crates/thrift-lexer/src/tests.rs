use super::*;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn kinds(source: &[u8]) -> Vec<TokenKind> {
    lex(source).tokens.iter().map(|t| t.kind).collect()
}

fn codes(source: &[u8]) -> Vec<DiagnosticCode> {
    lex(source).diagnostics.iter().map(|d| d.code).collect()
}

/// Concatenating trivia and token bytes must reproduce the source.
fn assert_lossless(source: &[u8]) {
    let out = lex(source);
    let mut rebuilt = Vec::new();
    for token in &out.tokens {
        for trivia in &token.leading_trivia {
            rebuilt.extend_from_slice(trivia.text(source));
        }
        rebuilt.extend_from_slice(&source[token.span.to_range()]);
    }
    assert_eq!(rebuilt, source, "lexer lost bytes for {:?}", String::from_utf8_lossy(source));
}

#[test]
fn empty_input_yields_eof() {
    let out = lex(b"");
    assert_eq!(out.tokens.len(), 1);
    assert_eq!(out.tokens[0].kind, TokenKind::Eof);
    assert_eq!(out.tokens[0].span, ByteSpan::empty(0));
    assert!(out.diagnostics.is_empty());
}

#[test]
fn eof_is_zero_width_at_len() {
    let out = lex(b"struct Foo {}\n");
    let eof = out.tokens.last().unwrap();
    assert_eq!(eof.kind, TokenKind::Eof);
    assert_eq!(eof.span, ByteSpan::empty(14));
}

#[test]
fn keywords_and_identifiers() {
    assert_eq!(
        kinds(b"struct Foo"),
        vec![TokenKind::KwStruct, TokenKind::Identifier, TokenKind::Eof]
    );
    assert_eq!(kinds(b"async byte i8"), vec![
        TokenKind::KwAsync,
        TokenKind::KwByte,
        TokenKind::KwI8,
        TokenKind::Eof
    ]);
    // Keywords are case-sensitive.
    assert_eq!(kinds(b"Struct"), vec![TokenKind::Identifier, TokenKind::Eof]);
}

#[test]
fn trivia_attaches_to_next_token() {
    let src = b"  // lead\nstruct";
    let out = lex(src);
    let tok = &out.tokens[0];
    assert_eq!(tok.kind, TokenKind::KwStruct);
    let trivia_kinds: Vec<_> = tok.leading_trivia.iter().map(|t| t.kind).collect();
    assert_eq!(trivia_kinds, vec![
        TriviaKind::Whitespace,
        TriviaKind::LineComment,
        TriviaKind::Newline
    ]);
}

#[test]
fn trailing_trivia_attaches_to_eof() {
    let src = b"x  # tail";
    let out = lex(src);
    let eof = out.tokens.last().unwrap();
    assert_eq!(eof.leading_trivia.len(), 2);
    assert_eq!(eof.leading_trivia[1].kind, TriviaKind::HashComment);
}

#[test]
fn newline_forms() {
    let out = lex(b"a\nb\r\nc\rd");
    let newlines: Vec<ByteSpan> = out
        .tokens
        .iter()
        .flat_map(|t| &t.leading_trivia)
        .filter(|t| t.kind == TriviaKind::Newline)
        .map(|t| t.span)
        .collect();
    assert_eq!(newlines, vec![ByteSpan::new(1, 2), ByteSpan::new(3, 5), ByteSpan::new(6, 7)]);
}

#[test]
fn comment_kinds() {
    let src = b"/* b */ /** d */ /**/ x";
    let out = lex(src);
    let trivia: Vec<_> = out.tokens[0].leading_trivia.iter().map(|t| t.kind).collect();
    assert_eq!(trivia, vec![
        TriviaKind::BlockComment,
        TriviaKind::Whitespace,
        TriviaKind::DocComment,
        TriviaKind::Whitespace,
        TriviaKind::BlockComment,
        TriviaKind::Whitespace,
    ]);
}

#[test]
fn unterminated_block_comment() {
    let src = b"x /* never";
    let out = lex(src);
    assert_eq!(codes(src), vec![DiagnosticCode::LexUnterminatedBlockComment]);
    let err = &out.tokens[1];
    assert_eq!(err.kind, TokenKind::Error);
    assert_eq!(err.span, ByteSpan::new(2, 10));
    assert!(err.flags.contains(TokenFlags::MALFORMED));
    assert_lossless(src);
}

#[test]
fn numbers() {
    assert_eq!(kinds(b"42"), vec![TokenKind::IntLiteral, TokenKind::Eof]);
    assert_eq!(kinds(b"0xFF"), vec![TokenKind::IntLiteral, TokenKind::Eof]);
    assert_eq!(kinds(b"3.14"), vec![TokenKind::FloatLiteral, TokenKind::Eof]);
    assert_eq!(kinds(b".5"), vec![TokenKind::FloatLiteral, TokenKind::Eof]);
    assert_eq!(kinds(b"1e10"), vec![TokenKind::FloatLiteral, TokenKind::Eof]);
    assert_eq!(kinds(b"2.5e-3"), vec![TokenKind::FloatLiteral, TokenKind::Eof]);
    // `.` not followed by a digit is a Dot token.
    assert_eq!(kinds(b"a.b"), vec![
        TokenKind::Identifier,
        TokenKind::Dot,
        TokenKind::Identifier,
        TokenKind::Eof
    ]);
    // An exponent without digits is not consumed.
    assert_eq!(kinds(b"1e"), vec![TokenKind::IntLiteral, TokenKind::Identifier, TokenKind::Eof]);
}

#[test]
fn invalid_hex_literal() {
    let src = b"0x;";
    assert_eq!(codes(src), vec![DiagnosticCode::LexInvalidHexLiteral]);
    let out = lex(src);
    assert_eq!(out.tokens[0].kind, TokenKind::IntLiteral);
    assert!(out.tokens[0].flags.contains(TokenFlags::MALFORMED));
    assert_eq!(out.tokens[0].span, ByteSpan::new(0, 2));
}

#[test]
fn strings() {
    assert_eq!(kinds(b"\"hi\" 'there'"), vec![
        TokenKind::StringLiteral,
        TokenKind::StringLiteral,
        TokenKind::Eof
    ]);
    // Escapes consume two bytes, including escaped quotes.
    assert_eq!(kinds(br#""a\"b""#), vec![TokenKind::StringLiteral, TokenKind::Eof]);
}

#[test]
fn unterminated_string_at_newline() {
    let src = b"const string X = 'unterminated\n";
    let out = lex(src);
    assert_eq!(codes(src), vec![DiagnosticCode::LexUnterminatedString]);
    let err = out.tokens.iter().find(|t| t.kind == TokenKind::Error).unwrap();
    // The error token stops before the newline, which becomes Eof trivia.
    assert_eq!(err.span, ByteSpan::new(17, 30));
    assert_lossless(src);
}

#[test]
fn unterminated_string_at_eof() {
    let src = b"'abc";
    assert_eq!(codes(src), vec![DiagnosticCode::LexUnterminatedString]);
    let out = lex(src);
    assert_eq!(out.tokens[0].span, ByteSpan::new(0, 4));
}

#[test]
fn unknown_and_invalid_bytes() {
    assert_eq!(codes(b"@"), vec![DiagnosticCode::LexUnknownCharacter]);
    assert_eq!(codes("é".as_bytes()), vec![DiagnosticCode::LexUnknownCharacter]);
    assert_eq!(codes(&[0xFF]), vec![DiagnosticCode::LexInvalidByte]);
    assert_lossless(&[b'a', 0xFF, 0xFE, b'b']);
}

#[test]
fn delimiters() {
    assert_eq!(kinds(b"{}()[]<>,;:=.+-*/"), vec![
        TokenKind::LBrace,
        TokenKind::RBrace,
        TokenKind::LParen,
        TokenKind::RParen,
        TokenKind::LBracket,
        TokenKind::RBracket,
        TokenKind::LAngle,
        TokenKind::RAngle,
        TokenKind::Comma,
        TokenKind::Semicolon,
        TokenKind::Colon,
        TokenKind::Eq,
        TokenKind::Dot,
        TokenKind::Plus,
        TokenKind::Minus,
        TokenKind::Star,
        TokenKind::Slash,
        TokenKind::Eof,
    ]);
}

#[test]
fn leading_bom_is_whitespace_trivia() {
    let src = b"\xEF\xBB\xBFstruct";
    let out = lex(src);
    assert_eq!(out.tokens[0].kind, TokenKind::KwStruct);
    assert_eq!(out.tokens[0].leading_trivia[0].kind, TriviaKind::Whitespace);
    assert_eq!(out.tokens[0].leading_trivia[0].span, ByteSpan::new(0, 3));
    assert!(out.diagnostics.is_empty());
    assert_lossless(src);
}

#[test]
fn token_spans_are_monotone_and_disjoint() {
    let src = b"struct Foo { 1: required i32 id; }\n";
    let out = lex(src);
    for pair in out.tokens.windows(2) {
        assert!(pair[0].span.end <= pair[1].span.start);
    }
}

#[test]
fn representative_document_is_lossless() {
    assert_lossless(
        b"include \"shared.thrift\"\n\nnamespace go demo\n\n/** Doc */\nstruct Foo {\n  1: required i32 id; // inline\n  2: optional string name,\n}\n",
    );
}

proptest! {
    #[test]
    fn lossless_on_arbitrary_bytes(source in proptest::collection::vec(any::<u8>(), 0..256)) {
        assert_lossless(&source);
        let out = lex(&source);
        let eof = out.tokens.last().unwrap();
        prop_assert_eq!(eof.kind, TokenKind::Eof);
        prop_assert_eq!(eof.span, ByteSpan::empty(source.len()));
    }

    #[test]
    fn lossless_on_ascii_soup(source in "[ -~\\n\\r\\t]{0,200}") {
        assert_lossless(source.as_bytes());
    }
}
