//! Semantic analysis
//!
//! Name resolution happens while parsing (through [`Scope`]); this module also
//! holds the type resolver the parser calls into and the whole-program call
//! checker that runs once every function is known.

mod scope;
mod resolve;
mod calls;

pub use scope::Scope;
pub use resolve::{TypeResolver, resolve_program};
pub use calls::check_calls;
