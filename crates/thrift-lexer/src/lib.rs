//! Lossless lexer for Thrift IDL.
//!
//! The lexer produces a token stream where concatenating every token span
//! plus every trivia span reproduces the input bytes exactly. Trivia
//! (whitespace, newlines, comments) is attached as *leading* trivia to the
//! next token; the stream always terminates with a zero-width `Eof` token at
//! the end of the source.
//!
//! Malformed input never panics: unterminated literals, unknown characters,
//! and invalid UTF-8 produce `Error` tokens plus diagnostics, and scanning
//! continues.

use memchr::{memchr, memchr2, memchr3};
use thrift_diagnostics::{Diagnostic, DiagnosticCode, DiagnosticSource};
use thrift_text::ByteSpan;
use thrift_token::{Token, TokenFlags, TokenKind, Trivia, TriviaKind};

/// Result of lexing one source buffer.
#[derive(Debug, Clone)]
pub struct LexOutput {
    /// Tokens in source order; the last token is always `Eof`
    pub tokens: Vec<Token>,
    /// Lexer diagnostics in source order
    pub diagnostics: Vec<Diagnostic>,
}

/// Lexes `source` into a lossless token stream.
pub fn lex(source: &[u8]) -> LexOutput {
    Lexer::new(source).run()
}

struct Lexer<'a> {
    source: &'a [u8],
    pos: usize,
    pending_trivia: Vec<Trivia>,
    tokens: Vec<Token>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a [u8]) -> Self {
        Self {
            source,
            pos: 0,
            pending_trivia: Vec::new(),
            tokens: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    fn run(mut self) -> LexOutput {
        // A leading byte-order mark becomes whitespace trivia; the
        // formatter re-emits it from its source policy.
        if self.source.starts_with(b"\xEF\xBB\xBF") {
            self.pos = 3;
            self.push_trivia(TriviaKind::Whitespace, 0);
        }
        loop {
            self.scan_trivia();
            if self.pos >= self.source.len() {
                self.push_token(TokenKind::Eof, self.pos, TokenFlags::NONE);
                break;
            }
            self.scan_token();
        }
        LexOutput { tokens: self.tokens, diagnostics: self.diagnostics }
    }

    #[inline]
    fn peek(&self) -> Option<u8> {
        self.source.get(self.pos).copied()
    }

    #[inline]
    fn peek_at(&self, ahead: usize) -> Option<u8> {
        self.source.get(self.pos + ahead).copied()
    }

    fn push_trivia(&mut self, kind: TriviaKind, start: usize) {
        self.pending_trivia.push(Trivia::new(kind, ByteSpan::new(start, self.pos)));
    }

    fn push_token(&mut self, kind: TokenKind, start: usize, flags: TokenFlags) {
        let mut token = Token::new(kind, ByteSpan::new(start, self.pos));
        token.flags = flags;
        token.leading_trivia = std::mem::take(&mut self.pending_trivia);
        self.tokens.push(token);
    }

    fn report(&mut self, code: DiagnosticCode, span: ByteSpan, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic::new(code, span, DiagnosticSource::Lexer, message));
    }

    /// Accumulates whitespace, newline, and comment trivia.
    fn scan_trivia(&mut self) {
        loop {
            let start = self.pos;
            match self.peek() {
                Some(b' ') | Some(b'\t') | Some(0x0B) | Some(0x0C) => {
                    while matches!(self.peek(), Some(b' ') | Some(b'\t') | Some(0x0B) | Some(0x0C))
                    {
                        self.pos += 1;
                    }
                    self.push_trivia(TriviaKind::Whitespace, start);
                }
                Some(b'\n') => {
                    self.pos += 1;
                    self.push_trivia(TriviaKind::Newline, start);
                }
                Some(b'\r') => {
                    self.pos += 1;
                    if self.peek() == Some(b'\n') {
                        self.pos += 1;
                    }
                    self.push_trivia(TriviaKind::Newline, start);
                }
                Some(b'#') => {
                    self.skip_to_line_end();
                    self.push_trivia(TriviaKind::HashComment, start);
                }
                Some(b'/') if self.peek_at(1) == Some(b'/') => {
                    self.skip_to_line_end();
                    self.push_trivia(TriviaKind::LineComment, start);
                }
                Some(b'/') if self.peek_at(1) == Some(b'*') => {
                    if !self.scan_block_comment(start) {
                        return; // unterminated: an Error token was emitted
                    }
                }
                _ => return,
            }
        }
    }

    fn skip_to_line_end(&mut self) {
        match memchr2(b'\n', b'\r', &self.source[self.pos..]) {
            Some(i) => self.pos += i,
            None => self.pos = self.source.len(),
        }
    }

    /// Returns false if the comment was unterminated (an `Error` token is
    /// emitted spanning to end of file).
    fn scan_block_comment(&mut self, start: usize) -> bool {
        let is_doc = self.peek_at(2) == Some(b'*') && self.peek_at(3) != Some(b'/');
        self.pos += 2;
        let mut search = self.pos;
        while let Some(i) = memchr(b'*', &self.source[search..]) {
            let at = search + i;
            if self.source.get(at + 1) == Some(&b'/') {
                self.pos = at + 2;
                let kind = if is_doc { TriviaKind::DocComment } else { TriviaKind::BlockComment };
                self.push_trivia(kind, start);
                return true;
            }
            search = at + 1;
        }
        self.pos = self.source.len();
        self.report(
            DiagnosticCode::LexUnterminatedBlockComment,
            ByteSpan::new(start, self.pos),
            "unterminated block comment",
        );
        self.push_token(TokenKind::Error, start, TokenFlags::MALFORMED);
        false
    }

    fn scan_token(&mut self) {
        let start = self.pos;
        let byte = self.source[self.pos];
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'_' => self.scan_identifier(start),
            b'0'..=b'9' => self.scan_number(start),
            b'.' => {
                if self.peek_at(1).is_some_and(|b| b.is_ascii_digit()) {
                    self.scan_number(start)
                } else {
                    self.pos += 1;
                    self.push_token(TokenKind::Dot, start, TokenFlags::NONE);
                }
            }
            b'"' | b'\'' => self.scan_string(start, byte),
            _ => {
                if let Some(kind) = punct_kind(byte) {
                    self.pos += 1;
                    self.push_token(kind, start, TokenFlags::NONE);
                } else if byte.is_ascii() {
                    self.pos += 1;
                    let span = ByteSpan::new(start, self.pos);
                    self.report(
                        DiagnosticCode::LexUnknownCharacter,
                        span,
                        format!("unknown character `{}`", byte.escape_ascii()),
                    );
                    self.push_token(TokenKind::Error, start, TokenFlags::MALFORMED);
                } else {
                    self.scan_non_ascii(start);
                }
            }
        }
    }

    fn scan_identifier(&mut self, start: usize) {
        while self
            .peek()
            .is_some_and(|b| b.is_ascii_alphanumeric() || b == b'_')
        {
            self.pos += 1;
        }
        // The grammar has no non-ASCII identifiers, so the slice is ASCII.
        let text = &self.source[start..self.pos];
        let kind = std::str::from_utf8(text)
            .ok()
            .and_then(TokenKind::keyword)
            .unwrap_or(TokenKind::Identifier);
        self.push_token(kind, start, TokenFlags::NONE);
    }

    fn scan_number(&mut self, start: usize) {
        // Hex: 0x with at least one hex digit.
        if self.peek() == Some(b'0')
            && matches!(self.peek_at(1), Some(b'x') | Some(b'X'))
        {
            self.pos += 2;
            let digits_start = self.pos;
            while self.peek().is_some_and(|b| b.is_ascii_hexdigit()) {
                self.pos += 1;
            }
            let mut flags = TokenFlags::NONE;
            if self.pos == digits_start {
                flags |= TokenFlags::MALFORMED;
                self.report(
                    DiagnosticCode::LexInvalidHexLiteral,
                    ByteSpan::new(start, self.pos),
                    "hex literal has no digits",
                );
            }
            self.push_token(TokenKind::IntLiteral, start, flags);
            return;
        }

        let mut is_float = false;
        while self.peek().is_some_and(|b| b.is_ascii_digit()) {
            self.pos += 1;
        }
        if self.peek() == Some(b'.') && self.peek_at(1).is_some_and(|b| b.is_ascii_digit()) {
            is_float = true;
            self.pos += 1;
            while self.peek().is_some_and(|b| b.is_ascii_digit()) {
                self.pos += 1;
            }
        }
        // Exponent: [eE][+-]?digits, consumed only when digits follow.
        if matches!(self.peek(), Some(b'e') | Some(b'E')) {
            let mut ahead = 1;
            if matches!(self.peek_at(1), Some(b'+') | Some(b'-')) {
                ahead = 2;
            }
            if self.peek_at(ahead).is_some_and(|b| b.is_ascii_digit()) {
                is_float = true;
                self.pos += ahead;
                while self.peek().is_some_and(|b| b.is_ascii_digit()) {
                    self.pos += 1;
                }
            }
        }
        let kind = if is_float { TokenKind::FloatLiteral } else { TokenKind::IntLiteral };
        self.push_token(kind, start, TokenFlags::NONE);
    }

    fn scan_string(&mut self, start: usize, quote: u8) {
        self.pos += 1;
        loop {
            let rest = &self.source[self.pos..];
            match memchr3(quote, b'\\', b'\n', rest) {
                Some(i) if rest[i] == quote => {
                    // A lone `\r` also terminates the line.
                    if let Some(r) = memchr(b'\r', &rest[..i]) {
                        self.pos += r;
                        break;
                    }
                    self.pos += i + 1;
                    self.push_token(TokenKind::StringLiteral, start, TokenFlags::NONE);
                    return;
                }
                Some(i) if rest[i] == b'\\' => {
                    if let Some(r) = memchr(b'\r', &rest[..i]) {
                        self.pos += r;
                        break;
                    }
                    if self.pos + i + 2 > self.source.len() {
                        self.pos = self.source.len();
                        break;
                    }
                    self.pos += i + 2; // `\<any>` consumes two bytes
                }
                Some(i) => {
                    // Unescaped newline.
                    self.pos += memchr(b'\r', &rest[..i]).unwrap_or(i);
                    break;
                }
                None => {
                    match memchr(b'\r', rest) {
                        Some(r) => self.pos += r,
                        None => self.pos = self.source.len(),
                    }
                    break;
                }
            }
        }
        self.report(
            DiagnosticCode::LexUnterminatedString,
            ByteSpan::new(start, self.pos),
            "unterminated string literal",
        );
        self.push_token(TokenKind::Error, start, TokenFlags::MALFORMED);
    }

    fn scan_non_ascii(&mut self, start: usize) {
        let rest = &self.source[self.pos..];
        match first_utf8_char(rest) {
            Some((ch, len)) => {
                // Valid UTF-8, but the grammar has no non-ASCII tokens.
                self.pos += len;
                self.report(
                    DiagnosticCode::LexUnknownCharacter,
                    ByteSpan::new(start, self.pos),
                    format!("unknown character `{}`", ch.escape_unicode()),
                );
            }
            None => {
                self.pos += 1;
                self.report(
                    DiagnosticCode::LexInvalidByte,
                    ByteSpan::new(start, self.pos),
                    format!("invalid UTF-8 byte 0x{:02X}", self.source[start]),
                );
            }
        }
        self.push_token(TokenKind::Error, start, TokenFlags::MALFORMED);
    }
}

/// Decodes the leading UTF-8 character of `bytes`, if well-formed.
fn first_utf8_char(bytes: &[u8]) -> Option<(char, usize)> {
    let len = match bytes.first()? {
        0xC2..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF4 => 4,
        _ => return None,
    };
    let slice = bytes.get(..len)?;
    let text = std::str::from_utf8(slice).ok()?;
    let ch = text.chars().next()?;
    Some((ch, len))
}

fn punct_kind(byte: u8) -> Option<TokenKind> {
    Some(match byte {
        b'{' => TokenKind::LBrace,
        b'}' => TokenKind::RBrace,
        b'(' => TokenKind::LParen,
        b')' => TokenKind::RParen,
        b'[' => TokenKind::LBracket,
        b']' => TokenKind::RBracket,
        b'<' => TokenKind::LAngle,
        b'>' => TokenKind::RAngle,
        b',' => TokenKind::Comma,
        b';' => TokenKind::Semicolon,
        b':' => TokenKind::Colon,
        b'=' => TokenKind::Eq,
        b'+' => TokenKind::Plus,
        b'-' => TokenKind::Minus,
        b'*' => TokenKind::Star,
        b'/' => TokenKind::Slash,
        _ => return None,
    })
}

#[cfg(test)]
mod tests;
