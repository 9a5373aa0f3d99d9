//! Token definitions for the lexer

use crate::common::Span;
use logos::Logos;

/// Token with source location
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Literal value of a number token
    pub fn number(&self) -> Option<i64> {
        match self.kind {
            TokenKind::Num(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_punct(&self, op: &str) -> bool {
        matches!(&self.kind, TokenKind::Punct(p) if p == op)
    }

    pub fn is_keyword(&self, keyword: Keyword) -> bool {
        matches!(&self.kind, TokenKind::Keyword(k) if *k == keyword)
    }
}

/// Errors the scanner can hit inside a single token
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LexErrorKind {
    #[default]
    InvalidCharacter,
    NumberTooLarge,
}

/// Token kinds
///
/// `Keyword` and `Eof` never come out of the scanner directly: keywords are
/// classified from identifiers in a pass over the finished stream, and the
/// end marker is appended once scanning stops.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(error = LexErrorKind)]
#[logos(skip r"[ \t\n\r\x0B\x0C]+")]
pub enum TokenKind {
    /// Unsigned decimal literal
    #[regex(r"[0-9]+", parse_number)]
    Num(i64),

    #[regex(r"==|!=|<=|>=|[-+*/()<>=;{},&]", |lex| lex.slice().to_string())]
    Punct(String),

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Identifier(String),

    Keyword(Keyword),

    Eof,
}

fn parse_number(lex: &mut logos::Lexer<TokenKind>) -> Result<i64, LexErrorKind> {
    lex.slice()
        .parse::<u32>()
        .map(i64::from)
        .map_err(|_| LexErrorKind::NumberTooLarge)
}

/// Reserved words
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    Return,
    If,
    Else,
    For,
    While,
    Int,
}

const KEYWORDS: [(&str, Keyword); 6] = [
    ("return", Keyword::Return),
    ("if", Keyword::If),
    ("else", Keyword::Else),
    ("for", Keyword::For),
    ("while", Keyword::While),
    ("int", Keyword::Int),
];

impl Keyword {
    /// Look `text` up in the full reserved-word table
    pub fn lookup(text: &str) -> Option<Keyword> {
        KEYWORDS
            .iter()
            .find(|(word, _)| *word == text)
            .map(|(_, keyword)| *keyword)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Keyword::Return => "return",
            Keyword::If => "if",
            Keyword::Else => "else",
            Keyword::For => "for",
            Keyword::While => "while",
            Keyword::Int => "int",
        }
    }

    /// Keywords that can begin a declaration
    pub fn is_type_name(&self) -> bool {
        matches!(self, Keyword::Int)
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenKind::Num(n) => write!(f, "number '{}'", n),
            TokenKind::Punct(p) => write!(f, "'{}'", p),
            TokenKind::Identifier(s) => write!(f, "identifier '{}'", s),
            TokenKind::Keyword(k) => write!(f, "keyword '{}'", k.as_str()),
            TokenKind::Eof => write!(f, "end of input"),
        }
    }
}
