//! Parser producing typed per-function ASTs

mod parser;

pub use parser::Parser;
