//! Frontend
//!
//! The frontend takes program text to a typed [`Program`]:
//! 1. Lexing source code into tokens
//! 2. Parsing tokens into per-function ASTs, resolving names and types on the way
//! 3. Checking calls against the functions the program defines

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod sema;

use crate::common::CompileResult;

pub use ast::Program;
pub use lexer::{Lexer, Token, TokenKind};
pub use parser::Parser;

/// Configuration options for the frontend
#[derive(Debug, Clone, Default)]
pub struct FrontendConfig {
    pub dump_tokens: bool,
    pub dump_ast: bool,
}

/// Source-to-AST stage of the pipeline
pub struct Frontend {
    config: FrontendConfig,
}

impl Frontend {
    pub fn new(config: FrontendConfig) -> Self {
        Self { config }
    }

    pub fn compile(&self, source: &str) -> CompileResult<Program> {
        let tokens = lexer::tokenize(source)?;

        if self.config.dump_tokens {
            eprintln!("=== Tokens ===");
            for token in &tokens {
                eprintln!("{:?}", token);
            }
            eprintln!("=== End Tokens ===\n");
        }

        let mut parser = Parser::new(tokens);
        let mut program = parser.parse()?;

        sema::resolve_program(&mut program)?;
        sema::check_calls(&program)?;

        if self.config.dump_ast {
            eprintln!("=== AST ===");
            eprintln!("{:#?}", program);
            eprintln!("=== End AST ===\n");
        }

        log::debug!("frontend produced {} function(s)", program.functions.len());
        Ok(program)
    }
}

impl Default for Frontend {
    fn default() -> Self {
        Self::new(FrontendConfig::default())
    }
}
