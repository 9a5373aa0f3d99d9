//! Statement AST nodes

use super::Expr;
use crate::common::Span;

/// Statement node
#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Block with no statements; also what a bare `;` parses to
    pub fn empty(span: Span) -> Self {
        Self::new(StmtKind::Block(Vec::new()), span)
    }
}

/// Statement kinds
#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    /// Expression statement: expr;
    Expr(Expr),

    /// Return statement: return expr;
    Return(Expr),

    /// If statement: if (cond) then [else else]
    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },

    /// Loop shared by `for` and `while`; `while (c) s` has only a condition
    For {
        init: Option<Box<Stmt>>,
        condition: Option<Expr>,
        update: Option<Expr>,
        body: Box<Stmt>,
    },

    /// Compound statement: { ... }
    Block(Vec<Stmt>),
}
