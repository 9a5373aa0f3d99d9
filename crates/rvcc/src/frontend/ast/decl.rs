//! Objects and function definitions

use super::{Stmt, Type, VarId};
use crate::common::Span;

/// Arguments and parameters are passed in a0..a5 only
pub const MAX_REG_ARGS: usize = 6;

/// A local variable or parameter
#[derive(Debug, Clone, PartialEq)]
pub struct Obj {
    pub name: String,
    pub ty: Type,
    /// Frame-pointer-relative offset, assigned by the frame layout pass
    pub offset: i64,
    pub span: Span,
}

impl Obj {
    pub fn new(name: String, ty: Type, span: Span) -> Self {
        Self {
            name,
            ty,
            offset: 0,
            span,
        }
    }
}

/// Function definition
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: String,
    /// Always a `Type::Function`
    pub ty: Type,
    /// Parameters in declaration order, as indices into `locals`
    pub params: Vec<VarId>,
    /// Every object in the frame, parameters first
    pub locals: Vec<Obj>,
    /// Always a `StmtKind::Block`
    pub body: Stmt,
    /// Frame size in bytes, assigned by the frame layout pass
    pub stack_size: i64,
    pub span: Span,
}

impl Function {
    pub fn local(&self, id: VarId) -> &Obj {
        &self.locals[id.0]
    }

    pub fn param_objs(&self) -> impl Iterator<Item = &Obj> {
        self.params.iter().map(|id| self.local(*id))
    }
}
