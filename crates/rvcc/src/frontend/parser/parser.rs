//! Recursive descent parser

use crate::common::{CompileError, CompileResult, Span};
use crate::frontend::ast::*;
use crate::frontend::lexer::{Keyword, Token, TokenKind, tokenize};
use crate::frontend::sema::{Scope, TypeResolver};
use std::collections::HashSet;

/// Result of parsing a declarator
struct Declarator {
    name: String,
    ty: Type,
    span: Span,
    /// Parameter declarators when `ty` is a function type
    params: Vec<Declarator>,
}

/// Recursive descent parser over a finished token stream
///
/// Locals and the name scope are reset at the start of every function, so a
/// parsed [`Function`] owns every object its body refers to.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    locals: Vec<Obj>,
    scope: Scope,
    defined: HashSet<String>,
}

impl Parser {
    /// Create a parser; an `Eof` marker is appended if the stream lacks one
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if !matches!(tokens.last().map(|t| &t.kind), Some(TokenKind::Eof)) {
            let end = tokens.last().map_or(0, |t| t.span.end);
            tokens.push(Token::new(TokenKind::Eof, Span::point(end)));
        }

        Self {
            tokens,
            pos: 0,
            locals: Vec::new(),
            scope: Scope::new(),
            defined: HashSet::new(),
        }
    }

    /// Tokenize `source` and create a parser over the result
    pub fn from_source(source: &str) -> CompileResult<Self> {
        Ok(Self::new(tokenize(source)?))
    }

    /// Parse a complete program
    ///
    /// Input that does not open with a function definition is read as the
    /// body of an implicit `int main()`.
    pub fn parse(&mut self) -> CompileResult<Program> {
        if self.at_end() {
            return Ok(Program::new(Vec::new()));
        }

        if !self.at_function_definition() {
            let main = self.parse_implicit_main()?;
            return Ok(Program::new(vec![main]));
        }

        let mut functions = Vec::new();
        while !self.at_end() {
            if !self.at_type_name() {
                return Err(CompileError::parser(
                    format!("expected a function definition, found {}", self.current().kind),
                    self.current().span,
                ));
            }
            functions.push(self.parse_function()?);
        }

        log::debug!("parsed {} function(s)", functions.len());
        Ok(Program::new(functions))
    }

    // =========================================================================
    // Helper methods
    // =========================================================================

    fn current(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn at_end(&self) -> bool {
        matches!(self.current().kind, TokenKind::Eof)
    }

    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if !self.at_end() {
            self.pos += 1;
        }
        token
    }

    fn current_punct(&self) -> Option<&str> {
        match &self.current().kind {
            TokenKind::Punct(p) => Some(p.as_str()),
            _ => None,
        }
    }

    fn check_punct(&self, op: &str) -> bool {
        self.current().is_punct(op)
    }

    fn match_punct(&mut self, op: &str) -> bool {
        if self.check_punct(op) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect_punct(&mut self, op: &str) -> CompileResult<Token> {
        if self.check_punct(op) {
            Ok(self.advance())
        } else {
            Err(CompileError::parser(
                format!("expected '{}', found {}", op, self.current().kind),
                self.current().span,
            ))
        }
    }

    fn check_keyword(&self, keyword: Keyword) -> bool {
        self.current().is_keyword(keyword)
    }

    fn at_type_name(&self) -> bool {
        is_type_name(self.current())
    }

    fn match_keyword(&mut self, keyword: Keyword) -> bool {
        if self.check_keyword(keyword) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect_keyword(&mut self, keyword: Keyword) -> CompileResult<Token> {
        if self.check_keyword(keyword) {
            Ok(self.advance())
        } else {
            Err(CompileError::parser(
                format!("expected '{}', found {}", keyword.as_str(), self.current().kind),
                self.current().span,
            ))
        }
    }

    fn expect_identifier(&mut self) -> CompileResult<(String, Span)> {
        match &self.current().kind {
            TokenKind::Identifier(name) => {
                let name = name.clone();
                let span = self.advance().span;
                Ok((name, span))
            }
            other => Err(CompileError::parser(
                format!("expected an identifier, found {}", other),
                self.current().span,
            )),
        }
    }

    /// `int` `*`* ident `(` starts a function definition
    fn at_function_definition(&self) -> bool {
        let mut i = self.pos;
        if !is_type_name(&self.tokens[i]) {
            return false;
        }
        i += 1;
        while self.tokens.get(i).is_some_and(|t| t.is_punct("*")) {
            i += 1;
        }
        matches!(self.tokens.get(i).map(|t| &t.kind), Some(TokenKind::Identifier(_)))
            && self.tokens.get(i + 1).is_some_and(|t| t.is_punct("("))
    }

    fn begin_function(&mut self) {
        self.locals.clear();
        self.scope = Scope::new();
    }

    fn declare_local(&mut self, name: String, ty: Type, span: Span) -> VarId {
        let id = VarId(self.locals.len());
        self.scope.declare(&name, id);
        self.locals.push(Obj::new(name, ty, span));
        id
    }

    // =========================================================================
    // Functions and declarations
    // =========================================================================

    fn parse_function(&mut self) -> CompileResult<Function> {
        let start_span = self.current().span;
        let base = self.parse_declspec()?;
        let Declarator {
            name,
            ty,
            span: name_span,
            params,
        } = self.parse_declarator(base)?;

        if !ty.is_function() {
            return Err(CompileError::parser(
                format!("expected '(' after function name '{}'", name),
                name_span,
            ));
        }
        if !self.defined.insert(name.clone()) {
            return Err(CompileError::parser(
                format!("redefinition of function '{}'", name),
                name_span,
            ));
        }
        if params.len() > MAX_REG_ARGS {
            return Err(CompileError::parser(
                format!("function '{}' has more than {} parameters", name, MAX_REG_ARGS),
                name_span,
            ));
        }

        self.begin_function();
        let mut param_ids = Vec::with_capacity(params.len());
        for param in params {
            param_ids.push(self.declare_local(param.name, param.ty, param.span));
        }

        let body = self.parse_compound_stmt()?;
        let span = start_span.merge(body.span);
        log::trace!("parsed function '{}' with {} local(s)", name, self.locals.len());

        Ok(Function {
            name,
            ty,
            params: param_ids,
            locals: std::mem::take(&mut self.locals),
            body,
            stack_size: 0,
            span,
        })
    }

    fn parse_implicit_main(&mut self) -> CompileResult<Function> {
        self.begin_function();
        self.defined.insert("main".to_string());

        let start_span = self.current().span;
        let mut stmts = Vec::new();
        while !self.at_end() {
            stmts.push(self.parse_block_item()?);
        }
        let span = start_span.merge(self.current().span);
        log::trace!("parsed implicit main with {} local(s)", self.locals.len());

        Ok(Function {
            name: "main".to_string(),
            ty: Type::function(Type::int(), Vec::new()),
            params: Vec::new(),
            locals: std::mem::take(&mut self.locals),
            body: Stmt::new(StmtKind::Block(stmts), span),
            stack_size: 0,
            span,
        })
    }

    fn parse_declspec(&mut self) -> CompileResult<Type> {
        self.expect_keyword(Keyword::Int)?;
        Ok(Type::int())
    }

    fn parse_declarator(&mut self, base: Type) -> CompileResult<Declarator> {
        let mut ty = base;
        while self.match_punct("*") {
            ty = Type::pointer_to(ty);
        }

        let (name, span) = self.expect_identifier()?;

        if self.match_punct("(") {
            let params = self.parse_parameter_list()?;
            let param_types = params.iter().map(|p| p.ty.clone()).collect();
            return Ok(Declarator {
                name,
                ty: Type::function(ty, param_types),
                span,
                params,
            });
        }

        Ok(Declarator {
            name,
            ty,
            span,
            params: Vec::new(),
        })
    }

    /// Parameters after the opening parenthesis, through the closing one
    fn parse_parameter_list(&mut self) -> CompileResult<Vec<Declarator>> {
        let mut params = Vec::new();
        if self.match_punct(")") {
            return Ok(params);
        }

        loop {
            let base = self.parse_declspec()?;
            let param = self.parse_declarator(base)?;
            if param.ty.is_function() {
                return Err(CompileError::parser(
                    format!("parameter '{}' cannot have function type", param.name),
                    param.span,
                ));
            }
            params.push(param);

            if !self.match_punct(",") {
                self.expect_punct(")")?;
                return Ok(params);
            }
        }
    }

    /// Declaration inside a body, lowered to a block of initializing assignments
    fn parse_declaration(&mut self) -> CompileResult<Stmt> {
        let start_span = self.current().span;
        let base = self.parse_declspec()?;

        let mut stmts = Vec::new();
        let mut first = true;
        while !self.check_punct(";") {
            if !first {
                self.expect_punct(",")?;
            }
            first = false;

            let decl = self.parse_declarator(base.clone())?;
            if decl.ty.is_function() {
                return Err(CompileError::parser(
                    format!("function '{}' cannot be declared inside a function body", decl.name),
                    decl.span,
                ));
            }
            let id = self.declare_local(decl.name, decl.ty, decl.span);

            if self.match_punct("=") {
                let rhs = self.parse_assign()?;
                let lhs = Expr::new(ExprKind::Var(id), decl.span);
                let span = decl.span.merge(rhs.span);
                let assign = Expr::new(
                    ExprKind::Assign {
                        lhs: Box::new(lhs),
                        rhs: Box::new(rhs),
                    },
                    span,
                );
                stmts.push(Stmt::new(StmtKind::Expr(assign), span));
            }
        }

        let end = self.expect_punct(";")?;
        Ok(Stmt::new(StmtKind::Block(stmts), start_span.merge(end.span)))
    }

    // =========================================================================
    // Statements
    // =========================================================================

    /// A declaration or statement, typed before it is handed back
    fn parse_block_item(&mut self) -> CompileResult<Stmt> {
        let mut stmt = if self.at_type_name() {
            self.parse_declaration()?
        } else {
            self.parse_stmt()?
        };
        TypeResolver::new(&self.locals).stmt(&mut stmt)?;
        Ok(stmt)
    }

    fn parse_compound_stmt(&mut self) -> CompileResult<Stmt> {
        let start = self.expect_punct("{")?;

        let mut stmts = Vec::new();
        while !self.check_punct("}") {
            if self.at_end() {
                return Err(CompileError::parser(
                    "expected '}', found end of input",
                    self.current().span,
                ));
            }
            stmts.push(self.parse_block_item()?);
        }

        let end = self.expect_punct("}")?;
        Ok(Stmt::new(StmtKind::Block(stmts), start.span.merge(end.span)))
    }

    fn parse_stmt(&mut self) -> CompileResult<Stmt> {
        let start_span = self.current().span;

        if self.match_keyword(Keyword::Return) {
            let value = self.parse_expr()?;
            let end = self.expect_punct(";")?;
            return Ok(Stmt::new(StmtKind::Return(value), start_span.merge(end.span)));
        }

        if self.match_keyword(Keyword::If) {
            self.expect_punct("(")?;
            let condition = self.parse_expr()?;
            self.expect_punct(")")?;
            let then_branch = Box::new(self.parse_stmt()?);
            let else_branch = if self.match_keyword(Keyword::Else) {
                Some(Box::new(self.parse_stmt()?))
            } else {
                None
            };

            let end_span = else_branch.as_ref().map_or(then_branch.span, |s| s.span);
            return Ok(Stmt::new(
                StmtKind::If {
                    condition,
                    then_branch,
                    else_branch,
                },
                start_span.merge(end_span),
            ));
        }

        if self.match_keyword(Keyword::For) {
            self.expect_punct("(")?;
            let init = if self.match_punct(";") {
                None
            } else {
                Some(Box::new(self.parse_expr_stmt()?))
            };
            let condition = if self.check_punct(";") {
                None
            } else {
                Some(self.parse_expr()?)
            };
            self.expect_punct(";")?;
            let update = if self.check_punct(")") {
                None
            } else {
                Some(self.parse_expr()?)
            };
            self.expect_punct(")")?;
            let body = Box::new(self.parse_stmt()?);

            let span = start_span.merge(body.span);
            return Ok(Stmt::new(
                StmtKind::For {
                    init,
                    condition,
                    update,
                    body,
                },
                span,
            ));
        }

        if self.match_keyword(Keyword::While) {
            self.expect_punct("(")?;
            let condition = self.parse_expr()?;
            self.expect_punct(")")?;
            let body = Box::new(self.parse_stmt()?);

            let span = start_span.merge(body.span);
            return Ok(Stmt::new(
                StmtKind::For {
                    init: None,
                    condition: Some(condition),
                    update: None,
                    body,
                },
                span,
            ));
        }

        if self.check_punct("{") {
            return self.parse_compound_stmt();
        }

        self.parse_expr_stmt()
    }

    fn parse_expr_stmt(&mut self) -> CompileResult<Stmt> {
        let start_span = self.current().span;
        if self.match_punct(";") {
            return Ok(Stmt::empty(start_span));
        }

        let expr = self.parse_expr()?;
        let end = self.expect_punct(";")?;
        Ok(Stmt::new(StmtKind::Expr(expr), start_span.merge(end.span)))
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    fn parse_expr(&mut self) -> CompileResult<Expr> {
        self.parse_assign()
    }

    fn parse_assign(&mut self) -> CompileResult<Expr> {
        let lhs = self.parse_equality()?;

        if self.match_punct("=") {
            if !lhs.is_lvalue() {
                return Err(CompileError::parser("not an lvalue", lhs.span));
            }
            let rhs = self.parse_assign()?;
            let span = lhs.span.merge(rhs.span);
            return Ok(Expr::new(
                ExprKind::Assign {
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                },
                span,
            ));
        }

        Ok(lhs)
    }

    fn parse_equality(&mut self) -> CompileResult<Expr> {
        let mut lhs = self.parse_relational()?;

        loop {
            let op = match self.current_punct() {
                Some("==") => BinaryOp::Eq,
                Some("!=") => BinaryOp::Ne,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_relational()?;
            let span = lhs.span.merge(rhs.span);
            lhs = Expr::binary(op, lhs, rhs, span);
        }

        Ok(lhs)
    }

    /// `a > b` and `a >= b` are built as `b < a` and `b <= a`
    fn parse_relational(&mut self) -> CompileResult<Expr> {
        let mut lhs = self.parse_add()?;

        loop {
            let (op, swapped) = match self.current_punct() {
                Some("<") => (BinaryOp::Lt, false),
                Some("<=") => (BinaryOp::Le, false),
                Some(">") => (BinaryOp::Lt, true),
                Some(">=") => (BinaryOp::Le, true),
                _ => break,
            };
            self.advance();
            let rhs = self.parse_add()?;
            let span = lhs.span.merge(rhs.span);
            lhs = if swapped {
                Expr::binary(op, rhs, lhs, span)
            } else {
                Expr::binary(op, lhs, rhs, span)
            };
        }

        Ok(lhs)
    }

    fn parse_add(&mut self) -> CompileResult<Expr> {
        let mut lhs = self.parse_mul()?;

        loop {
            let op = match self.current_punct() {
                Some("+") => BinaryOp::Add,
                Some("-") => BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_mul()?;
            lhs = match op {
                BinaryOp::Add => self.new_add(lhs, rhs)?,
                _ => self.new_sub(lhs, rhs)?,
            };
        }

        Ok(lhs)
    }

    fn parse_mul(&mut self) -> CompileResult<Expr> {
        let mut lhs = self.parse_unary()?;

        loop {
            let op = match self.current_punct() {
                Some("*") => BinaryOp::Mul,
                Some("/") => BinaryOp::Div,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_unary()?;
            let span = lhs.span.merge(rhs.span);
            lhs = Expr::binary(op, lhs, rhs, span);
        }

        Ok(lhs)
    }

    fn parse_unary(&mut self) -> CompileResult<Expr> {
        let start_span = self.current().span;

        if self.match_punct("+") {
            return self.parse_unary();
        }

        if self.match_punct("-") {
            let operand = self.parse_unary()?;
            let span = start_span.merge(operand.span);
            return Ok(Expr::new(ExprKind::Neg(Box::new(operand)), span));
        }

        if self.match_punct("&") {
            let operand = self.parse_unary()?;
            if !operand.is_lvalue() {
                return Err(CompileError::parser("not an lvalue", operand.span));
            }
            let span = start_span.merge(operand.span);
            return Ok(Expr::new(ExprKind::AddrOf(Box::new(operand)), span));
        }

        if self.match_punct("*") {
            let operand = self.parse_unary()?;
            let span = start_span.merge(operand.span);
            return Ok(Expr::new(ExprKind::Deref(Box::new(operand)), span));
        }

        self.parse_primary()
    }

    fn parse_primary(&mut self) -> CompileResult<Expr> {
        let token = self.current().clone();

        match token.kind {
            TokenKind::Punct(p) if p == "(" => {
                self.advance();
                let expr = self.parse_expr()?;
                self.expect_punct(")")?;
                Ok(expr)
            }
            TokenKind::Num(value) => {
                self.advance();
                Ok(Expr::num(value, token.span))
            }
            TokenKind::Identifier(name) => {
                self.advance();
                if self.match_punct("(") {
                    return self.parse_call(name, token.span);
                }

                match self.scope.lookup(&name) {
                    Some(id) => Ok(Expr::new(ExprKind::Var(id), token.span)),
                    None => Err(CompileError::parser(
                        format!("undefined variable '{}'", name),
                        token.span,
                    )),
                }
            }
            other => Err(CompileError::parser(
                format!("expected an expression, found {}", other),
                token.span,
            )),
        }
    }

    /// Arguments after the opening parenthesis of a call
    fn parse_call(&mut self, name: String, name_span: Span) -> CompileResult<Expr> {
        let mut args = Vec::new();
        if !self.check_punct(")") {
            loop {
                args.push(self.parse_assign()?);
                if !self.match_punct(",") {
                    break;
                }
            }
        }
        let end = self.expect_punct(")")?;
        let span = name_span.merge(end.span);

        if args.len() > MAX_REG_ARGS {
            return Err(CompileError::parser(
                format!("call to '{}' passes more than {} arguments", name, MAX_REG_ARGS),
                span,
            ));
        }

        Ok(Expr::new(ExprKind::Call { name, args }, span))
    }

    // =========================================================================
    // Pointer arithmetic
    // =========================================================================

    fn new_add(&self, mut lhs: Expr, mut rhs: Expr) -> CompileResult<Expr> {
        let resolver = TypeResolver::new(&self.locals);
        resolver.expr(&mut lhs)?;
        resolver.expr(&mut rhs)?;
        let span = lhs.span.merge(rhs.span);

        match (is_pointer(&lhs), is_pointer(&rhs)) {
            (false, false) => Ok(Expr::binary(BinaryOp::Add, lhs, rhs, span)),
            (true, false) => Ok(pointer_offset(BinaryOp::Add, lhs, rhs, span)),
            (false, true) => Ok(pointer_offset(BinaryOp::Add, rhs, lhs, span)),
            (true, true) => Err(CompileError::type_error(
                "invalid operands: cannot add two pointers",
                span,
            )),
        }
    }

    fn new_sub(&self, mut lhs: Expr, mut rhs: Expr) -> CompileResult<Expr> {
        let resolver = TypeResolver::new(&self.locals);
        resolver.expr(&mut lhs)?;
        resolver.expr(&mut rhs)?;
        let span = lhs.span.merge(rhs.span);

        match (is_pointer(&lhs), is_pointer(&rhs)) {
            (false, false) => Ok(Expr::binary(BinaryOp::Sub, lhs, rhs, span)),
            (true, false) => Ok(pointer_offset(BinaryOp::Sub, lhs, rhs, span)),
            (true, true) => Err(CompileError::type_error(
                "invalid operands: pointer difference is not supported",
                span,
            )),
            (false, true) => Err(CompileError::type_error(
                "invalid operands: cannot subtract a pointer from an integer",
                span,
            )),
        }
    }
}

/// Token that can begin a declaration
fn is_type_name(token: &Token) -> bool {
    matches!(&token.kind, TokenKind::Keyword(k) if k.is_type_name())
}

fn is_pointer(expr: &Expr) -> bool {
    expr.ty.as_ref().is_some_and(Type::is_pointer)
}

/// `ptr op index`, with the index scaled by the pointee size
fn pointer_offset(op: BinaryOp, ptr: Expr, index: Expr, span: Span) -> Expr {
    let elem_size = ptr
        .ty
        .as_ref()
        .and_then(Type::base)
        .map_or(WORD_SIZE, Type::size);
    let index_span = index.span;
    let scaled = Expr::binary(
        BinaryOp::Mul,
        index,
        Expr::num(elem_size, index_span),
        index_span,
    );
    Expr::binary(op, ptr, scaled, span)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> CompileResult<Program> {
        Parser::from_source(source)?.parse()
    }

    fn body(function: &Function) -> &[Stmt] {
        match &function.body.kind {
            StmtKind::Block(stmts) => stmts,
            other => panic!("expected block body, got {other:?}"),
        }
    }

    fn returned(stmt: &Stmt) -> &Expr {
        match &stmt.kind {
            StmtKind::Return(expr) => expr,
            other => panic!("expected return, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_simple_function() {
        let program = parse("int main() { return 0; }").unwrap();

        assert_eq!(program.functions.len(), 1);
        let main = &program.functions[0];
        assert_eq!(main.name, "main");
        assert!(main.params.is_empty());
        assert_eq!(body(main).len(), 1);
    }

    #[test]
    fn test_parse_parameters_become_leading_locals() {
        let program = parse("int add(int a, int *b) { int c; return a; }").unwrap();
        let add = program.function("add").unwrap();

        assert_eq!(add.params, vec![VarId(0), VarId(1)]);
        let names: Vec<_> = add.locals.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert_eq!(add.locals[1].ty, Type::pointer_to(Type::int()));
        assert_eq!(add.ty.arity(), Some(2));
    }

    #[test]
    fn test_statements_without_function_form_implicit_main() {
        let program = parse("{ return 5; }").unwrap();
        assert_eq!(program.functions.len(), 1);
        assert_eq!(program.functions[0].name, "main");

        let program = parse("int a; a = 3; return a;").unwrap();
        let main = &program.functions[0];
        assert_eq!(main.locals.len(), 1);
        assert_eq!(body(main).len(), 3);
    }

    #[test]
    fn test_empty_source_is_empty_program() {
        let program = parse("  ").unwrap();
        assert!(program.functions.is_empty());
    }

    #[test]
    fn test_declaration_lowers_initializers() {
        let program = parse("int main() { int x = 1, *y, z = 3; }").unwrap();
        let main = &program.functions[0];

        assert_eq!(main.locals.len(), 3);
        match &body(main)[0].kind {
            StmtKind::Block(inits) => {
                assert_eq!(inits.len(), 2);
                assert!(inits.iter().all(|s| matches!(
                    &s.kind,
                    StmtKind::Expr(Expr { kind: ExprKind::Assign { .. }, .. })
                )));
            }
            other => panic!("expected lowered declaration, got {other:?}"),
        }
    }

    #[test]
    fn test_every_expression_is_typed() {
        let program = parse("int main() { int x; int *p; p = &x; *p = 2; return x + *p; }").unwrap();
        let main = &program.functions[0];
        let ret = returned(&body(main)[4]);

        assert_eq!(ret.ty, Some(Type::int()));
        match &body(main)[2].kind {
            StmtKind::Expr(assign) => {
                assert_eq!(assign.ty, Some(Type::pointer_to(Type::int())));
            }
            other => panic!("expected assignment, got {other:?}"),
        }
    }

    #[test]
    fn test_pointer_addition_scales_and_normalizes() {
        let program = parse("int main() { int *p; return 2 + p; }").unwrap();
        let ret = returned(&body(&program.functions[0])[1]);

        match &ret.kind {
            ExprKind::Binary {
                op: BinaryOp::Add,
                lhs,
                rhs,
            } => {
                assert!(matches!(lhs.kind, ExprKind::Var(VarId(0))));
                match &rhs.kind {
                    ExprKind::Binary {
                        op: BinaryOp::Mul,
                        lhs,
                        rhs,
                    } => {
                        assert!(matches!(lhs.kind, ExprKind::Num(2)));
                        assert!(matches!(rhs.kind, ExprKind::Num(4)));
                    }
                    other => panic!("expected scaled index, got {other:?}"),
                }
            }
            other => panic!("expected addition, got {other:?}"),
        }
        assert!(ret.ty.as_ref().is_some_and(Type::is_pointer));
    }

    #[test]
    fn test_pointer_subtraction_scales() {
        let program = parse("int main() { int *p; return p - 1; }").unwrap();
        let ret = returned(&body(&program.functions[0])[1]);
        assert!(matches!(
            &ret.kind,
            ExprKind::Binary { op: BinaryOp::Sub, rhs, .. }
                if matches!(rhs.kind, ExprKind::Binary { op: BinaryOp::Mul, .. })
        ));
    }

    #[test]
    fn test_invalid_pointer_arithmetic() {
        for source in [
            "int main() { int *p; int *q; return p + q; }",
            "int main() { int *p; int *q; return p - q; }",
            "int main() { int *p; return 1 - p; }",
        ] {
            let err = parse(source).unwrap_err();
            assert!(matches!(err, CompileError::Type { .. }), "{source}: {err:?}");
        }
    }

    #[test]
    fn test_greater_than_swaps_operands() {
        let program = parse("int main() { int a; return a > 1; }").unwrap();
        let ret = returned(&body(&program.functions[0])[1]);
        match &ret.kind {
            ExprKind::Binary {
                op: BinaryOp::Lt,
                lhs,
                rhs,
            } => {
                assert!(matches!(lhs.kind, ExprKind::Num(1)));
                assert!(matches!(rhs.kind, ExprKind::Var(_)));
            }
            other => panic!("expected swapped comparison, got {other:?}"),
        }
    }

    #[test]
    fn test_while_becomes_condition_only_loop() {
        let program = parse("int main() { int i; while (i < 3) i = i + 1; return i; }").unwrap();
        assert!(matches!(
            &body(&program.functions[0])[1].kind,
            StmtKind::For {
                init: None,
                condition: Some(_),
                update: None,
                ..
            }
        ));
    }

    #[test]
    fn test_for_with_empty_clauses() {
        let program = parse("int main() { for (;;) return 1; }").unwrap();
        assert!(matches!(
            &body(&program.functions[0])[0].kind,
            StmtKind::For {
                init: None,
                condition: None,
                update: None,
                ..
            }
        ));
    }

    #[test]
    fn test_shadowing_redeclaration() {
        let program = parse("int main() { int x; int x; x = 1; return x; }").unwrap();
        let main = &program.functions[0];
        assert_eq!(main.locals.len(), 2);
        match &body(main)[2].kind {
            StmtKind::Expr(Expr {
                kind: ExprKind::Assign { lhs, .. },
                ..
            }) => assert!(matches!(lhs.kind, ExprKind::Var(VarId(1)))),
            other => panic!("expected assignment, got {other:?}"),
        }
    }

    #[test]
    fn test_incomplete_expression_points_at_end() {
        let err = parse("1 +").unwrap_err();
        assert_eq!(err.span(), Some(Span::point(3)));
        assert!(matches!(err, CompileError::Parser { .. }));
    }

    #[test]
    fn test_syntax_errors() {
        for source in [
            "int main() { return x; }",
            "int main() { 1 = 2; }",
            "int main() { return &3; }",
            "int main() { return 1 }",
            "int main() { return 1; } }",
            "int main() { return 1; } int main() { return 2; }",
            "int main() { int f(); return 0; }",
            "int f(int a, int b, int c, int d, int e, int g, int h) { return 0; }",
            "int main() { return f(1, 2, 3, 4, 5, 6, 7); }",
            "int main() { return 1;",
            "int main() { if 1 return 2; }",
        ] {
            let err = parse(source).unwrap_err();
            assert!(matches!(err, CompileError::Parser { .. }), "{source}: {err:?}");
        }
    }

    #[test]
    fn test_deref_of_integer_is_type_error() {
        let err = parse("int main() { int x; return *x; }").unwrap_err();
        assert_eq!(err.message(), "invalid pointer dereference");
    }

    #[test]
    fn test_six_arguments_are_accepted() {
        let program = parse("int main() { return f(1, 2, 3, 4, 5, 6); }").unwrap();
        match &returned(&body(&program.functions[0])[0]).kind {
            ExprKind::Call { name, args } => {
                assert_eq!(name, "f");
                assert_eq!(args.len(), 6);
            }
            other => panic!("expected call, got {other:?}"),
        }
    }
}
