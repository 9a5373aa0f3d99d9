//! Common infrastructure shared by every compilation stage

mod error;
mod span;

pub use error::{CompileError, CompileResult, DiagnosticReporter, DiagnosticStyle};
pub use span::Span;
