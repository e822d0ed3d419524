//! Token kinds produced by the lexer.

use std::fmt;

/// A single lexical token, tagged with the 1-based source line it started on.
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: u32,
}

impl Token {
    pub fn new(kind: TokenKind, line: u32) -> Self {
        Self { kind, line }
    }
}

/// The kinds of token the lexer can produce.
#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    Ident(String),
    /// A decimal or `0x`-prefixed integer literal, kept as both the parsed
    /// value and the original text (constant and array-size expressions are
    /// re-emitted verbatim, so the text is what downstream code uses).
    Int { value: i64, text: String },

    LBrace,
    RBrace,
    LParen,
    RParen,
    LBracket,
    RBracket,
    LAngle,
    RAngle,
    Semi,
    Comma,
    Eq,
    Star,
    Colon,

    KwConst,
    KwEnum,
    KwStruct,
    KwUnion,
    KwTypedef,
    KwProgram,
    KwVersion,
    KwSwitch,
    KwCase,
    KwDefault,
    KwVoid,
    KwOpaque,
    KwString,
    KwUnsigned,
    KwInt,
    KwHyper,
    KwFloat,
    KwDouble,
    KwBool,
    KwZerocopy,
    KwLinkedlist,

    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Ident(s) => write!(f, "identifier `{s}`"),
            TokenKind::Int { text, .. } => write!(f, "integer `{text}`"),
            TokenKind::LBrace => write!(f, "`{{`"),
            TokenKind::RBrace => write!(f, "`}}`"),
            TokenKind::LParen => write!(f, "`(`"),
            TokenKind::RParen => write!(f, "`)`"),
            TokenKind::LBracket => write!(f, "`[`"),
            TokenKind::RBracket => write!(f, "`]`"),
            TokenKind::LAngle => write!(f, "`<`"),
            TokenKind::RAngle => write!(f, "`>`"),
            TokenKind::Semi => write!(f, "`;`"),
            TokenKind::Comma => write!(f, "`,`"),
            TokenKind::Eq => write!(f, "`=`"),
            TokenKind::Star => write!(f, "`*`"),
            TokenKind::Colon => write!(f, "`:`"),
            TokenKind::KwConst => write!(f, "`const`"),
            TokenKind::KwEnum => write!(f, "`enum`"),
            TokenKind::KwStruct => write!(f, "`struct`"),
            TokenKind::KwUnion => write!(f, "`union`"),
            TokenKind::KwTypedef => write!(f, "`typedef`"),
            TokenKind::KwProgram => write!(f, "`program`"),
            TokenKind::KwVersion => write!(f, "`version`"),
            TokenKind::KwSwitch => write!(f, "`switch`"),
            TokenKind::KwCase => write!(f, "`case`"),
            TokenKind::KwDefault => write!(f, "`default`"),
            TokenKind::KwVoid => write!(f, "`void`"),
            TokenKind::KwOpaque => write!(f, "`opaque`"),
            TokenKind::KwString => write!(f, "`string`"),
            TokenKind::KwUnsigned => write!(f, "`unsigned`"),
            TokenKind::KwInt => write!(f, "`int`"),
            TokenKind::KwHyper => write!(f, "`hyper`"),
            TokenKind::KwFloat => write!(f, "`float`"),
            TokenKind::KwDouble => write!(f, "`double`"),
            TokenKind::KwBool => write!(f, "`bool`"),
            TokenKind::KwZerocopy => write!(f, "`zerocopy`"),
            TokenKind::KwLinkedlist => write!(f, "`linkedlist`"),
            TokenKind::Eof => write!(f, "end of file"),
        }
    }
}

pub fn keyword(ident: &str) -> Option<TokenKind> {
    Some(match ident {
        "const" => TokenKind::KwConst,
        "enum" => TokenKind::KwEnum,
        "struct" => TokenKind::KwStruct,
        "union" => TokenKind::KwUnion,
        "typedef" => TokenKind::KwTypedef,
        "program" => TokenKind::KwProgram,
        "version" => TokenKind::KwVersion,
        "switch" => TokenKind::KwSwitch,
        "case" => TokenKind::KwCase,
        "default" => TokenKind::KwDefault,
        "void" => TokenKind::KwVoid,
        "opaque" => TokenKind::KwOpaque,
        "string" => TokenKind::KwString,
        "unsigned" => TokenKind::KwUnsigned,
        "int" => TokenKind::KwInt,
        "hyper" => TokenKind::KwHyper,
        "float" => TokenKind::KwFloat,
        "double" => TokenKind::KwDouble,
        "bool" => TokenKind::KwBool,
        "zerocopy" => TokenKind::KwZerocopy,
        "linkedlist" => TokenKind::KwLinkedlist,
        _ => return None,
    })
}
