//! Backend
//!
//! The backend turns a typed [`Program`](crate::frontend::ast::Program) into
//! RV32 assembly text:
//! 1. Laying out each function's stack frame
//! 2. Emitting stack-machine code for every statement and expression

pub mod riscv;

pub use riscv::{CodeGenerator, RiscvBackend};

/// Configuration options for backends
#[derive(Debug, Clone, Default)]
pub struct BackendConfig {
    /// Interleave `#` comments describing each emitted step
    pub annotate: bool,
}
