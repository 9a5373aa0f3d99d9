//! Type resolution over parsed expressions and statements

use crate::common::{CompileError, CompileResult};
use crate::frontend::ast::{ExprKind, Expr, Function, Obj, Program, Stmt, StmtKind, Type};

/// Assigns a type to every expression reachable from a node
///
/// Resolution is post-order and idempotent: a node that already carries a
/// type is left alone, so the parser can resolve operands early and the
/// enclosing statement again later.
pub struct TypeResolver<'a> {
    locals: &'a [Obj],
}

impl<'a> TypeResolver<'a> {
    pub fn new(locals: &'a [Obj]) -> Self {
        Self { locals }
    }

    pub fn stmt(&self, stmt: &mut Stmt) -> CompileResult<()> {
        match &mut stmt.kind {
            StmtKind::Expr(expr) | StmtKind::Return(expr) => self.expr(expr),
            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.expr(condition)?;
                self.stmt(then_branch)?;
                if let Some(else_branch) = else_branch {
                    self.stmt(else_branch)?;
                }
                Ok(())
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
            StmtKind::Block(stmts) => stmts.iter_mut().try_for_each(|s| self.stmt(s)),
        }
    }

    pub fn expr(&self, expr: &mut Expr) -> CompileResult<()> {
        if expr.ty.is_some() {
            return Ok(());
        }

        match &mut expr.kind {
            ExprKind::Num(_) | ExprKind::Var(_) => {}
            ExprKind::Neg(operand) | ExprKind::AddrOf(operand) | ExprKind::Deref(operand) => {
                self.expr(operand)?;
            }
            ExprKind::Binary { lhs, rhs, .. } | ExprKind::Assign { lhs, rhs } => {
                self.expr(lhs)?;
                self.expr(rhs)?;
            }
            ExprKind::Call { args, .. } => {
                args.iter_mut().try_for_each(|arg| self.expr(arg))?;
            }
        }

        let ty = match &expr.kind {
            ExprKind::Num(_) | ExprKind::Call { .. } => Type::int(),
            ExprKind::Binary { op, lhs, .. } => {
                if op.is_comparison() {
                    Type::int()
                } else {
                    type_of(lhs)?
                }
            }
            ExprKind::Neg(operand) => type_of(operand)?,
            ExprKind::Assign { lhs, .. } => type_of(lhs)?,
            ExprKind::Var(id) => match self.locals.get(id.0) {
                Some(obj) => obj.ty.clone(),
                None => {
                    return Err(CompileError::type_error(
                        format!("unknown variable slot {}", id.0),
                        expr.span,
                    ));
                }
            },
            ExprKind::AddrOf(operand) => Type::pointer_to(type_of(operand)?),
            ExprKind::Deref(operand) => match type_of(operand)?.base() {
                Some(base) => base.clone(),
                None => {
                    return Err(CompileError::type_error(
                        "invalid pointer dereference",
                        expr.span,
                    ));
                }
            },
        };

        expr.ty = Some(ty);
        Ok(())
    }
}

fn type_of(expr: &Expr) -> CompileResult<Type> {
    expr.ty
        .clone()
        .ok_or_else(|| CompileError::type_error("expression has no type", expr.span))
}

/// Resolve every function body in `program`
pub fn resolve_program(program: &mut Program) -> CompileResult<()> {
    program.functions.iter_mut().try_for_each(resolve_function)
}

fn resolve_function(function: &mut Function) -> CompileResult<()> {
    let resolver = TypeResolver::new(&function.locals);
    resolver.stmt(&mut function.body)?;
    log::trace!("resolved types in '{}'", function.name);
    Ok(())
}
