//! RISC-V code emitter

use super::inst::*;
use crate::common::{CompileError, CompileResult};
use crate::frontend::ast::*;

/// Stack-machine code generator over a laid-out [`Program`]
///
/// Expressions leave their value in `a0`. Binary operators evaluate the right
/// operand first, push it, evaluate the left operand and pop the right one
/// into `a1`.
pub struct CodeGenerator {
    output: Vec<RvInst>,
    /// Values currently pushed on the machine stack
    depth: usize,
    /// Last label number handed out
    label_count: usize,
    annotate: bool,
}

impl CodeGenerator {
    pub fn new() -> Self {
        Self {
            output: Vec::new(),
            depth: 0,
            label_count: 0,
            annotate: false,
        }
    }

    pub fn with_annotations(mut self, annotate: bool) -> Self {
        self.annotate = annotate;
        self
    }

    /// Generate assembly text for `program`
    ///
    /// Frame offsets must already be assigned, see
    /// [`layout_program`](super::layout_program).
    pub fn generate(&mut self, program: &Program) -> CompileResult<String> {
        let instructions = self.generate_instructions(program)?;

        let mut result = String::new();
        for inst in &instructions {
            result.push_str(&inst.format());
            result.push('\n');
        }

        Ok(result)
    }

    pub fn generate_instructions(&mut self, program: &Program) -> CompileResult<Vec<RvInst>> {
        self.output.clear();

        for function in &program.functions {
            self.generate_function(function)?;
        }

        Ok(std::mem::take(&mut self.output))
    }

    /// Values pushed and not yet popped
    pub fn stack_depth(&self) -> usize {
        self.depth
    }

    fn emit(&mut self, inst: RvInst) {
        self.output.push(inst);
    }

    fn note(&mut self, text: impl Into<String>) {
        if self.annotate {
            self.emit(RvInst::Comment(text.into()));
        }
    }

    /// `rd = rs + imm`, going through `t0` when `imm` does not fit an I-type
    fn add_imm(&mut self, rd: Reg, rs: Reg, imm: i64) {
        if fits_imm12(imm) {
            self.emit(RvInst::Addi(rd, rs, imm));
        } else {
            self.emit(RvInst::Li(Reg::T0, imm));
            self.emit(RvInst::Add(rd, rs, Reg::T0));
        }
    }

    fn next_label(&mut self) -> usize {
        self.label_count += 1;
        self.label_count
    }

    fn push(&mut self) {
        self.note("push a0");
        self.emit(RvInst::Addi(Reg::Sp, Reg::Sp, -WORD_SIZE));
        self.emit(RvInst::Sw(Reg::A0, 0, Reg::Sp));
        self.depth += 1;
    }

    fn pop(&mut self, reg: Reg) -> CompileResult<()> {
        if self.depth == 0 {
            return Err(CompileError::codegen(format!(
                "pop into {} from an empty operand stack",
                reg
            )));
        }
        self.note(format!("pop into {}", reg));
        self.emit(RvInst::Lw(reg, 0, Reg::Sp));
        self.emit(RvInst::Addi(Reg::Sp, Reg::Sp, WORD_SIZE));
        self.depth -= 1;
        Ok(())
    }

    fn generate_function(&mut self, func: &Function) -> CompileResult<()> {
        if func.params.len() > MAX_REG_ARGS {
            return Err(CompileError::codegen(format!(
                "function '{}' has {} parameters, at most {} fit in registers",
                func.name,
                func.params.len(),
                MAX_REG_ARGS
            )));
        }

        self.depth = 0;

        self.emit(RvInst::Directive(format!(".global {}", func.name)));
        self.emit(RvInst::Label(func.name.clone()));

        // Prologue
        self.note("save fp and ra");
        self.emit(RvInst::Addi(Reg::Sp, Reg::Sp, -2 * WORD_SIZE));
        self.emit(RvInst::Sw(Reg::Fp, 0, Reg::Sp));
        self.emit(RvInst::Sw(Reg::Ra, WORD_SIZE, Reg::Sp));
        self.emit(RvInst::Mv(Reg::Fp, Reg::Sp));
        self.note(format!("reserve {} bytes for locals", func.stack_size));
        self.add_imm(Reg::Sp, Reg::Sp, -func.stack_size);

        for (param, reg) in func.param_objs().zip(ARG_REGS) {
            self.note(format!("spill {} into '{}'", reg, param.name));
            self.emit(RvInst::Sw(reg, param.offset, Reg::Fp));
        }

        self.gen_stmt(func, &func.body)?;

        if self.depth != 0 {
            return Err(CompileError::codegen(format!(
                "operand stack unbalanced by {} at the end of '{}'",
                self.depth, func.name
            )));
        }

        // Epilogue
        self.emit(RvInst::Label(return_label(func)));
        self.note("restore fp and ra");
        self.emit(RvInst::Mv(Reg::Sp, Reg::Fp));
        self.emit(RvInst::Lw(Reg::Fp, 0, Reg::Sp));
        self.emit(RvInst::Lw(Reg::Ra, WORD_SIZE, Reg::Sp));
        self.emit(RvInst::Addi(Reg::Sp, Reg::Sp, 2 * WORD_SIZE));
        self.emit(RvInst::Ret);

        log::trace!(
            "generated '{}' ({} byte frame, {} label(s) so far)",
            func.name,
            func.stack_size,
            self.label_count
        );
        Ok(())
    }

    fn gen_stmt(&mut self, func: &Function, stmt: &Stmt) -> CompileResult<()> {
        match &stmt.kind {
            StmtKind::Expr(expr) => self.gen_expr(func, expr),

            StmtKind::Return(expr) => {
                self.gen_expr(func, expr)?;
                self.emit(RvInst::J(return_label(func)));
                Ok(())
            }

            StmtKind::Block(stmts) => stmts.iter().try_for_each(|s| self.gen_stmt(func, s)),

            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                let n = self.next_label();
                let end_label = format!(".L.end.{}", n);

                self.gen_expr(func, condition)?;
                match else_branch {
                    Some(else_branch) => {
                        let else_label = format!(".L.else.{}", n);
                        self.note(format!("if a0 == 0, jump to {}", else_label));
                        self.emit(RvInst::Beqz(Reg::A0, else_label.clone()));
                        self.gen_stmt(func, then_branch)?;
                        self.emit(RvInst::J(end_label.clone()));
                        self.emit(RvInst::Label(else_label));
                        self.gen_stmt(func, else_branch)?;
                    }
                    None => {
                        self.note(format!("if a0 == 0, jump to {}", end_label));
                        self.emit(RvInst::Beqz(Reg::A0, end_label.clone()));
                        self.gen_stmt(func, then_branch)?;
                    }
                }
                self.emit(RvInst::Label(end_label));
                Ok(())
            }

            StmtKind::For {
                init,
                condition,
                update,
                body,
            } => {
                let n = self.next_label();
                let begin_label = format!(".L.begin.{}", n);
                let end_label = format!(".L.end.{}", n);

                if let Some(init) = init {
                    self.gen_stmt(func, init)?;
                }
                self.emit(RvInst::Label(begin_label.clone()));
                if let Some(condition) = condition {
                    self.gen_expr(func, condition)?;
                    self.note(format!("if a0 == 0, jump to {}", end_label));
                    self.emit(RvInst::Beqz(Reg::A0, end_label.clone()));
                }
                self.gen_stmt(func, body)?;
                if let Some(update) = update {
                    self.gen_expr(func, update)?;
                }
                self.emit(RvInst::J(begin_label));
                self.emit(RvInst::Label(end_label));
                Ok(())
            }
        }
    }

    fn gen_expr(&mut self, func: &Function, expr: &Expr) -> CompileResult<()> {
        if expr.ty.is_none() {
            return Err(CompileError::codegen(format!(
                "untyped expression at {}..{} in '{}'",
                expr.span.start, expr.span.end, func.name
            )));
        }

        let (op, lhs, rhs) = match &expr.kind {
            ExprKind::Num(value) => {
                // Literals wrap to the 32-bit register width
                self.emit(RvInst::Li(Reg::A0, i64::from(*value as i32)));
                return Ok(());
            }
            ExprKind::Neg(operand) => {
                self.gen_expr(func, operand)?;
                self.emit(RvInst::Neg(Reg::A0, Reg::A0));
                return Ok(());
            }
            ExprKind::Assign { lhs, rhs } => {
                self.gen_addr(func, lhs)?;
                self.push();
                self.gen_expr(func, rhs)?;
                self.pop(Reg::A1)?;
                self.note("store a0 to 0(a1)");
                self.emit(RvInst::Sw(Reg::A0, 0, Reg::A1));
                return Ok(());
            }
            ExprKind::Var(_) => {
                self.gen_addr(func, expr)?;
                self.emit(RvInst::Lw(Reg::A0, 0, Reg::A0));
                return Ok(());
            }
            ExprKind::AddrOf(operand) => return self.gen_addr(func, operand),
            ExprKind::Deref(operand) => {
                self.gen_expr(func, operand)?;
                self.emit(RvInst::Lw(Reg::A0, 0, Reg::A0));
                return Ok(());
            }
            ExprKind::Call { name, args } => return self.gen_call(func, name, args),
            ExprKind::Binary { op, lhs, rhs } => (*op, lhs, rhs),
        };

        self.gen_expr(func, rhs)?;
        self.push();
        self.gen_expr(func, lhs)?;
        self.pop(Reg::A1)?;

        self.note(format!("a0 = a0 {} a1", op.as_str()));
        match op {
            BinaryOp::Add => self.emit(RvInst::Add(Reg::A0, Reg::A0, Reg::A1)),
            BinaryOp::Sub => self.emit(RvInst::Sub(Reg::A0, Reg::A0, Reg::A1)),
            BinaryOp::Mul => self.emit(RvInst::Mul(Reg::A0, Reg::A0, Reg::A1)),
            BinaryOp::Div => self.emit(RvInst::Div(Reg::A0, Reg::A0, Reg::A1)),
            BinaryOp::Eq => {
                self.emit(RvInst::Xor(Reg::A0, Reg::A0, Reg::A1));
                self.emit(RvInst::Seqz(Reg::A0, Reg::A0));
            }
            BinaryOp::Ne => {
                self.emit(RvInst::Xor(Reg::A0, Reg::A0, Reg::A1));
                self.emit(RvInst::Snez(Reg::A0, Reg::A0));
            }
            BinaryOp::Lt => self.emit(RvInst::Slt(Reg::A0, Reg::A0, Reg::A1)),
            BinaryOp::Le => {
                self.emit(RvInst::Slt(Reg::A0, Reg::A1, Reg::A0));
                self.emit(RvInst::Xori(Reg::A0, Reg::A0, 1));
            }
        }

        Ok(())
    }

    /// Leave the address of an lvalue in `a0`
    fn gen_addr(&mut self, func: &Function, expr: &Expr) -> CompileResult<()> {
        match &expr.kind {
            ExprKind::Var(id) => {
                let obj = func.locals.get(id.0).ok_or_else(|| {
                    CompileError::codegen(format!(
                        "variable slot {} does not exist in '{}'",
                        id.0, func.name
                    ))
                })?;
                self.note(format!("address of '{}'", obj.name));
                self.add_imm(Reg::A0, Reg::Fp, obj.offset);
                Ok(())
            }
            ExprKind::Deref(operand) => self.gen_expr(func, operand),
            _ => Err(CompileError::codegen(format!(
                "not an lvalue at {}..{} in '{}'",
                expr.span.start, expr.span.end, func.name
            ))),
        }
    }

    fn gen_call(&mut self, func: &Function, name: &str, args: &[Expr]) -> CompileResult<()> {
        if args.len() > MAX_REG_ARGS {
            return Err(CompileError::codegen(format!(
                "call to '{}' passes {} arguments, at most {} fit in registers",
                name,
                args.len(),
                MAX_REG_ARGS
            )));
        }

        self.note(format!("call {}", name));
        for arg in args {
            self.gen_expr(func, arg)?;
            self.push();
        }
        for reg in ARG_REGS[..args.len()].iter().rev() {
            self.pop(*reg)?;
        }
        self.emit(RvInst::Call(name.to_string()));
        Ok(())
    }
}

impl Default for CodeGenerator {
    fn default() -> Self {
        Self::new()
    }
}

fn return_label(func: &Function) -> String {
    format!(".L.return.{}", func.name)
}
