//! Lexer implementation using logos

use super::token::{Keyword, LexErrorKind, Token, TokenKind};
use crate::common::{CompileError, CompileResult, Span};
use logos::Logos;

/// Lexer over a single source string
pub struct Lexer<'a> {
    inner: logos::Lexer<'a, TokenKind>,
    at_eof: bool,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given source code
    pub fn new(source: &'a str) -> Self {
        Self {
            inner: TokenKind::lexer(source),
            at_eof: false,
        }
    }

    /// Get the next raw token; identifiers are not yet classified as keywords
    pub fn next_token(&mut self) -> CompileResult<Token> {
        if self.at_eof {
            let len = self.inner.source().len();
            return Ok(Token::new(TokenKind::Eof, Span::point(len)));
        }

        match self.inner.next() {
            Some(Ok(kind)) => Ok(Token::new(kind, self.inner.span().into())),
            Some(Err(LexErrorKind::NumberTooLarge)) => Err(CompileError::lexer(
                format!("integer literal '{}' is too large", self.inner.slice()),
                self.inner.span().into(),
            )),
            Some(Err(LexErrorKind::InvalidCharacter)) => {
                let span = self.inner.span();
                let ch = self.inner.source()[span.start..].chars().next().unwrap_or('\0');
                Err(CompileError::lexer(
                    format!("invalid token '{}'", ch.escape_default()),
                    Span::new(span.start, span.start + ch.len_utf8()),
                ))
            }
            None => {
                self.at_eof = true;
                let len = self.inner.source().len();
                Ok(Token::new(TokenKind::Eof, Span::point(len)))
            }
        }
    }

    /// Tokenize the entire source, terminated by one `Eof` token
    pub fn tokenize_all(mut self) -> CompileResult<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let is_eof = matches!(token.kind, TokenKind::Eof);
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        mark_keywords(&mut tokens);
        Ok(tokens)
    }
}

/// Reclassify identifiers that spell a reserved word
pub fn mark_keywords(tokens: &mut [Token]) {
    for token in tokens {
        if let TokenKind::Identifier(name) = &token.kind {
            if let Some(keyword) = Keyword::lookup(name) {
                token.kind = TokenKind::Keyword(keyword);
            }
        }
    }
}

/// Lex `source` into a keyword-classified token vector
pub fn tokenize(source: &str) -> CompileResult<Vec<Token>> {
    let tokens = Lexer::new(source).tokenize_all()?;
    log::debug!("lexed {} tokens", tokens.len());
    Ok(tokens)
}
