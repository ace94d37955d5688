//! The closed token kind set and keyword table.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Token kinds for Thrift IDL.
///
/// Keywords are matched against [`KEYWORDS`] after scanning an identifier,
/// so deprecated spellings (`async`, `byte`) keep their own kinds and are
/// never rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    /// `[A-Za-z_][A-Za-z0-9_]*` not in the keyword table
    Identifier,
    /// Decimal or hex integer literal
    IntLiteral,
    /// Float literal with fraction and/or exponent
    FloatLiteral,
    /// Single- or double-quoted string literal
    StringLiteral,

    /// `include`
    KwInclude,
    /// `cpp_include`
    KwCppInclude,
    /// `namespace`
    KwNamespace,
    /// `const`
    KwConst,
    /// `typedef`
    KwTypedef,
    /// `enum`
    KwEnum,
    /// `senum`
    KwSenum,
    /// `struct`
    KwStruct,
    /// `union`
    KwUnion,
    /// `exception`
    KwException,
    /// `service`
    KwService,
    /// `extends`
    KwExtends,
    /// `oneway`
    KwOneway,
    /// `async` (deprecated spelling of `oneway`, preserved as written)
    KwAsync,
    /// `throws`
    KwThrows,
    /// `required`
    KwRequired,
    /// `optional`
    KwOptional,
    /// `void`
    KwVoid,
    /// `bool`
    KwBool,
    /// `byte` (deprecated spelling of `i8`, preserved as written)
    KwByte,
    /// `i8`
    KwI8,
    /// `i16`
    KwI16,
    /// `i32`
    KwI32,
    /// `i64`
    KwI64,
    /// `double`
    KwDouble,
    /// `string`
    KwString,
    /// `binary`
    KwBinary,
    /// `map`
    KwMap,
    /// `list`
    KwList,
    /// `set`
    KwSet,
    /// `true`
    KwTrue,
    /// `false`
    KwFalse,

    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `<`
    LAngle,
    /// `>`
    RAngle,
    /// `,`
    Comma,
    /// `;`
    Semicolon,
    /// `:`
    Colon,
    /// `=`
    Eq,
    /// `.`
    Dot,
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `/`
    Slash,

    /// Invalid input
    Error,
    /// End of file; zero-width, always last
    Eof,
}

/// Keyword table: identifier text to keyword kind.
pub static KEYWORDS: phf::Map<&'static str, TokenKind> = phf::phf_map! {
    "include" => TokenKind::KwInclude,
    "cpp_include" => TokenKind::KwCppInclude,
    "namespace" => TokenKind::KwNamespace,
    "const" => TokenKind::KwConst,
    "typedef" => TokenKind::KwTypedef,
    "enum" => TokenKind::KwEnum,
    "senum" => TokenKind::KwSenum,
    "struct" => TokenKind::KwStruct,
    "union" => TokenKind::KwUnion,
    "exception" => TokenKind::KwException,
    "service" => TokenKind::KwService,
    "extends" => TokenKind::KwExtends,
    "oneway" => TokenKind::KwOneway,
    "async" => TokenKind::KwAsync,
    "throws" => TokenKind::KwThrows,
    "required" => TokenKind::KwRequired,
    "optional" => TokenKind::KwOptional,
    "void" => TokenKind::KwVoid,
    "bool" => TokenKind::KwBool,
    "byte" => TokenKind::KwByte,
    "i8" => TokenKind::KwI8,
    "i16" => TokenKind::KwI16,
    "i32" => TokenKind::KwI32,
    "i64" => TokenKind::KwI64,
    "double" => TokenKind::KwDouble,
    "string" => TokenKind::KwString,
    "binary" => TokenKind::KwBinary,
    "map" => TokenKind::KwMap,
    "list" => TokenKind::KwList,
    "set" => TokenKind::KwSet,
    "true" => TokenKind::KwTrue,
    "false" => TokenKind::KwFalse,
};

impl TokenKind {
    /// Looks up an identifier in the keyword table.
    pub fn keyword(text: &str) -> Option<TokenKind> {
        KEYWORDS.get(text).copied()
    }

    /// True for any keyword kind.
    pub fn is_keyword(self) -> bool {
        matches!(
            self,
            TokenKind::KwInclude
                | TokenKind::KwCppInclude
                | TokenKind::KwNamespace
                | TokenKind::KwConst
                | TokenKind::KwTypedef
                | TokenKind::KwEnum
                | TokenKind::KwSenum
                | TokenKind::KwStruct
                | TokenKind::KwUnion
                | TokenKind::KwException
                | TokenKind::KwService
                | TokenKind::KwExtends
                | TokenKind::KwOneway
                | TokenKind::KwAsync
                | TokenKind::KwThrows
                | TokenKind::KwRequired
                | TokenKind::KwOptional
                | TokenKind::KwVoid
                | TokenKind::KwBool
                | TokenKind::KwByte
                | TokenKind::KwI8
                | TokenKind::KwI16
                | TokenKind::KwI32
                | TokenKind::KwI64
                | TokenKind::KwDouble
                | TokenKind::KwString
                | TokenKind::KwBinary
                | TokenKind::KwMap
                | TokenKind::KwList
                | TokenKind::KwSet
                | TokenKind::KwTrue
                | TokenKind::KwFalse
        )
    }

    /// True for builtin type keywords (used by the base-type grammar rule).
    pub fn is_base_type(self) -> bool {
        matches!(
            self,
            TokenKind::KwBool
                | TokenKind::KwByte
                | TokenKind::KwI8
                | TokenKind::KwI16
                | TokenKind::KwI32
                | TokenKind::KwI64
                | TokenKind::KwDouble
                | TokenKind::KwString
                | TokenKind::KwBinary
        )
    }

    /// True for identifiers, literals, keywords, and `Error` tokens.
    ///
    /// Word-like tokens get a separating space between each other when
    /// formatted.
    pub fn is_word_like(self) -> bool {
        self.is_keyword()
            || matches!(
                self,
                TokenKind::Identifier
                    | TokenKind::IntLiteral
                    | TokenKind::FloatLiteral
                    | TokenKind::StringLiteral
                    | TokenKind::Error
            )
    }

    /// True for `( [ { <`.
    pub fn is_open_delim(self) -> bool {
        matches!(
            self,
            TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace | TokenKind::LAngle
        )
    }

    /// True for `) ] } >`.
    pub fn is_close_delim(self) -> bool {
        matches!(
            self,
            TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace | TokenKind::RAngle
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Identifier => "identifier",
            TokenKind::IntLiteral => "integer literal",
            TokenKind::FloatLiteral => "float literal",
            TokenKind::StringLiteral => "string literal",
            TokenKind::KwInclude => "include",
            TokenKind::KwCppInclude => "cpp_include",
            TokenKind::KwNamespace => "namespace",
            TokenKind::KwConst => "const",
            TokenKind::KwTypedef => "typedef",
            TokenKind::KwEnum => "enum",
            TokenKind::KwSenum => "senum",
            TokenKind::KwStruct => "struct",
            TokenKind::KwUnion => "union",
            TokenKind::KwException => "exception",
            TokenKind::KwService => "service",
            TokenKind::KwExtends => "extends",
            TokenKind::KwOneway => "oneway",
            TokenKind::KwAsync => "async",
            TokenKind::KwThrows => "throws",
            TokenKind::KwRequired => "required",
            TokenKind::KwOptional => "optional",
            TokenKind::KwVoid => "void",
            TokenKind::KwBool => "bool",
            TokenKind::KwByte => "byte",
            TokenKind::KwI8 => "i8",
            TokenKind::KwI16 => "i16",
            TokenKind::KwI32 => "i32",
            TokenKind::KwI64 => "i64",
            TokenKind::KwDouble => "double",
            TokenKind::KwString => "string",
            TokenKind::KwBinary => "binary",
            TokenKind::KwMap => "map",
            TokenKind::KwList => "list",
            TokenKind::KwSet => "set",
            TokenKind::KwTrue => "true",
            TokenKind::KwFalse => "false",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::LAngle => "<",
            TokenKind::RAngle => ">",
            TokenKind::Comma => ",",
            TokenKind::Semicolon => ";",
            TokenKind::Colon => ":",
            TokenKind::Eq => "=",
            TokenKind::Dot => ".",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Error => "error",
            TokenKind::Eof => "end of file",
        };
        f.write_str(name)
    }
}
