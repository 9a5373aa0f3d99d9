//! Compilation driver and pipeline orchestration

use crate::backend::{BackendConfig, RiscvBackend};
use crate::common::CompileResult;
use crate::frontend::{Frontend, FrontendConfig, Program};

/// Source-to-assembly pipeline
///
/// Holds configuration only. Every call to [`Pipeline::compile`] builds its
/// own frontend and code generator, so nothing leaks between compilations.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    frontend: FrontendConfig,
    backend: BackendConfig,
}

impl Pipeline {
    pub fn new(frontend: FrontendConfig, backend: BackendConfig) -> Self {
        Self { frontend, backend }
    }

    /// Run the frontend only
    pub fn parse(&self, source: &str) -> CompileResult<Program> {
        Frontend::new(self.frontend.clone()).compile(source)
    }

    /// Compile `source` to RV32 assembly text
    pub fn compile(&self, source: &str) -> CompileResult<String> {
        log::debug!("compiling {} bytes of source", source.len());
        let mut program = self.parse(source)?;
        RiscvBackend::new(self.backend.clone()).generate(&mut program)
    }
}
