//! RISC-V code generation backend
//!
//! Emits RV32IM assembly using `a0` as the accumulator and the machine stack
//! for intermediate values. Every local lives in a 4-byte slot addressed
//! from `fp`.

mod inst;
mod frame;
mod emit;

pub use inst::*;
pub use frame::{align_to, assign_offsets, layout_program};
pub use emit::CodeGenerator;

use crate::backend::BackendConfig;
use crate::common::CompileResult;
use crate::frontend::ast::Program;

/// RISC-V assembly backend
pub struct RiscvBackend {
    config: BackendConfig,
}

impl RiscvBackend {
    pub fn new(config: BackendConfig) -> Self {
        Self { config }
    }

    /// Generate assembly for `program`, assigning frame offsets first
    ///
    /// Each call uses a fresh [`CodeGenerator`], so label numbering restarts
    /// at 1 for every program.
    pub fn generate(&self, program: &mut Program) -> CompileResult<String> {
        layout_program(program);

        let mut codegen = CodeGenerator::new().with_annotations(self.config.annotate);
        let asm = codegen.generate(program)?;

        log::debug!("generated {} bytes of assembly", asm.len());
        Ok(asm)
    }
}

impl Default for RiscvBackend {
    fn default() -> Self {
        Self::new(BackendConfig::default())
    }
}
