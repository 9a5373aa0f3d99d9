//! rvcc - C subset compiler targeting 32-bit RISC-V
//!
//! Translates a small C dialect (`int`, pointers, functions of up to six
//! parameters, `if`/`for`/`while`/`return`, arithmetic and comparisons) into
//! RV32IM assembly text for a GNU-style assembler.
//!
//! ## Architecture
//!
//! The compiler is organized into:
//! - **Common** (`common/`): Errors, spans and diagnostic rendering
//! - **Frontend** (`frontend/`): Lexer, parser, name and type resolution
//! - **Backend** (`backend/`): Frame layout and RISC-V code generation
//! - **Driver** (`driver/`): The pipeline tying the stages together

pub mod common;
pub mod frontend;
pub mod backend;
pub mod driver;

// Re-exports for convenience
pub use common::{CompileError, CompileResult, DiagnosticReporter, DiagnosticStyle, Span};
pub use frontend::{Frontend, FrontendConfig};
pub use backend::{BackendConfig, RiscvBackend};
pub use driver::Pipeline;

/// Compile `source` with the default configuration
pub fn compile(source: &str) -> CompileResult<String> {
    Pipeline::default().compile(source)
}
