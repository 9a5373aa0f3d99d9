//! Lexer module for tokenizing source text

mod token;
mod scanner;

pub use token::{Keyword, LexErrorKind, Token, TokenKind};
pub use scanner::{Lexer, mark_keywords, tokenize};
