//! Call arity checking across a whole program

use crate::common::{CompileError, CompileResult};
use crate::frontend::ast::{Expr, ExprKind, Program, Stmt, StmtKind};
use std::collections::HashMap;

/// Reject calls whose argument count differs from the callee's definition
///
/// Only callees defined in `program` are checked. Anything else is assumed
/// to be an external routine resolved at link time.
pub fn check_calls(program: &Program) -> CompileResult<()> {
    let arities: HashMap<&str, usize> = program
        .functions
        .iter()
        .filter_map(|f| Some((f.name.as_str(), f.ty.arity()?)))
        .collect();

    let checker = CallChecker { arities };
    program
        .functions
        .iter()
        .try_for_each(|f| checker.stmt(&f.body))
}

struct CallChecker<'a> {
    arities: HashMap<&'a str, usize>,
}

impl CallChecker<'_> {
    fn stmt(&self, stmt: &Stmt) -> CompileResult<()> {
        match &stmt.kind {
            StmtKind::Expr(expr) | StmtKind::Return(expr) => self.expr(expr),
            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.expr(condition)?;
                self.stmt(then_branch)?;
                else_branch.as_deref().map_or(Ok(()), |s| self.stmt(s))
            }
            StmtKind::For {
                init,
                condition,
                update,
                body,
            } => {
                if let Some(init) = init {
                    self.stmt(init)?;
                }
                if let Some(condition) = condition {
                    self.expr(condition)?;
                }
                if let Some(update) = update {
                    self.expr(update)?;
                }
                self.stmt(body)
            }
            StmtKind::Block(stmts) => stmts.iter().try_for_each(|s| self.stmt(s)),
        }
    }

    fn expr(&self, expr: &Expr) -> CompileResult<()> {
        match &expr.kind {
            ExprKind::Num(_) | ExprKind::Var(_) => Ok(()),
            ExprKind::Neg(operand) | ExprKind::AddrOf(operand) | ExprKind::Deref(operand) => {
                self.expr(operand)
            }
            ExprKind::Binary { lhs, rhs, .. } | ExprKind::Assign { lhs, rhs } => {
                self.expr(lhs)?;
                self.expr(rhs)
            }
            ExprKind::Call { name, args } => {
                if let Some(&expected) = self.arities.get(name.as_str()) {
                    if expected != args.len() {
                        return Err(CompileError::type_error(
                            format!(
                                "function '{}' expects {} argument(s), got {}",
                                name,
                                expected,
                                args.len()
                            ),
                            expr.span,
                        ));
                    }
                }
                args.iter().try_for_each(|arg| self.expr(arg))
            }
        }
    }
}
