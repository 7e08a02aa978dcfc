//! Recursive-descent parser for MiniLang.
//!
//! Implements the precedence ladder (low to high):
//! `or` -> `and` -> `== !=` -> `< > <= >=` -> `+ -` -> `* / %` -> `**`
//! (right-associative) -> unary `- not` -> primary.

use mlc_util::diagnostic::DiagnosticCode;
use mlc_util::{Handler, Span, Symbol};

use mlc_lex::{Token, TokenKind};

use crate::ast::*;

pub struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    handler: &'a Handler,
}

type PResult<T> = Result<T, ()>;

impl<'a> Parser<'a> {
    pub fn new(tokens: Vec<Token>, handler: &'a Handler) -> Self {
        Self {
            tokens,
            pos: 0,
            handler,
        }
    }

    /// Parses the whole token stream as a program.
    ///
    /// Returns `None` if a syntax error was reported; the handler holds the
    /// diagnostic. Parsing stops at the first error rather than attempting
    /// recovery.
    pub fn parse_program(&mut self) -> Option<Program> {
        let mut statements = Vec::new();
        while !self.at(&TokenKind::Eof) {
            match self.parse_statement() {
                Ok(stmt) => statements.push(stmt),
                Err(()) => return None,
            }
        }
        Some(Program { statements })
    }

    // -- token stream helpers -------------------------------------------

    fn current(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn at(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(&self.current().kind) == std::mem::discriminant(kind)
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn pos_of(&self, tok: &Token) -> Pos {
        Pos {
            line: tok.line,
            column: tok.column,
        }
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> PResult<Token> {
        if self.at(&kind) {
            Ok(self.advance())
        } else {
            self.error_unexpected(what)
        }
    }

    fn error_unexpected(&mut self, expected: &str) -> PResult<Token> {
        let tok = self.current().clone();
        if matches!(tok.kind, TokenKind::Eof) {
            self.error(
                &tok,
                DiagnosticCode::E_SYNTAX_UNEXPECTED_EOF,
                format!("Unexpected end of file, expected {}", expected),
            );
        } else {
            self.error(
                &tok,
                DiagnosticCode::E_SYNTAX_EXPECTED_TOKEN,
                format!("Unexpected token {:?}, expected {}", tok.kind, expected),
            );
        }
        Err(())
    }

    fn error(&self, tok: &Token, code: DiagnosticCode, message: String) {
        self.handler
            .build_error(Span::point(tok.line, tok.column), message)
            .code(code)
            .emit(self.handler);
    }

    fn type_keyword_at(&self, kind: &TokenKind) -> bool {
        matches!(
            kind,
            TokenKind::Int | TokenKind::Float | TokenKind::Bool | TokenKind::StringType
        )
    }

    fn parse_type(&mut self) -> PResult<TypeName> {
        let base = match &self.current().kind {
            TokenKind::Int => TypeName::Int,
            TokenKind::Float => TypeName::Float,
            TokenKind::Bool => TypeName::Bool,
            TokenKind::StringType => TypeName::String,
            _ => return self.error_unexpected("a type name").map(|_| unreachable!()),
        };
        self.advance();
        let mut ty = base;
        while self.at(&TokenKind::LBracket) {
            self.advance();
            self.expect(TokenKind::RBracket, "]")?;
            ty = TypeName::Array(Box::new(ty));
        }
        Ok(ty)
    }

    // -- statements -------------------------------------------------------

    fn parse_statement(&mut self) -> PResult<Stmt> {
        let kind = self.current().kind.clone();

        if self.type_keyword_at(&kind) {
            return self.parse_var_decl();
        }

        match kind {
            TokenKind::Function => self.parse_function_def(),
            TokenKind::If => self.parse_if(),
            TokenKind::While => self.parse_while(),
            TokenKind::For => self.parse_for(),
            TokenKind::Return => self.parse_return(),
            TokenKind::Print => self.parse_print(),
            TokenKind::Ident(_) => self.parse_ident_led_statement(),
            _ => self.error_unexpected("a statement").map(|_| unreachable!()),
        }
    }

    fn parse_var_decl(&mut self) -> PResult<Stmt> {
        let start = self.current().clone();
        let ty = self.parse_type()?;
        let name = self.expect_ident()?;
        let initializer = if self.at(&TokenKind::Assign) {
            self.advance();
            Some(self.parse_expression()?)
        } else {
            None
        };
        self.expect(TokenKind::Semicolon, ";")?;
        Ok(Stmt {
            kind: StmtKind::VarDecl {
                ty,
                name,
                initializer,
            },
            pos: self.pos_of(&start),
        })
    }

    fn expect_ident(&mut self) -> PResult<Symbol> {
        match self.current().kind.clone() {
            TokenKind::Ident(sym) => {
                self.advance();
                Ok(sym)
            }
            _ => self.error_unexpected("an identifier").map(|_| unreachable!()),
        }
    }

    fn parse_block(&mut self) -> PResult<Vec<Stmt>> {
        self.expect(TokenKind::LBrace, "{")?;
        let mut statements = Vec::new();
        while !self.at(&TokenKind::RBrace) {
            if matches!(self.current().kind, TokenKind::Eof) {
                return self.error_unexpected("}").map(|_| unreachable!());
            }
            statements.push(self.parse_statement()?);
        }
        self.advance();
        Ok(statements)
    }

    fn parse_if(&mut self) -> PResult<Stmt> {
        let start = self.advance();
        self.expect(TokenKind::LParen, "(")?;
        let condition = self.parse_expression()?;
        self.expect(TokenKind::RParen, ")")?;
        let then_block = self.parse_block()?;
        let else_block = if self.at(&TokenKind::Else) {
            self.advance();
            Some(self.parse_block()?)
        } else {
            None
        };
        Ok(Stmt {
            kind: StmtKind::If {
                condition,
                then_block,
                else_block,
            },
            pos: self.pos_of(&start),
        })
    }

    fn parse_while(&mut self) -> PResult<Stmt> {
        let start = self.advance();
        self.expect(TokenKind::LParen, "(")?;
        let condition = self.parse_expression()?;
        self.expect(TokenKind::RParen, ")")?;
        let body = self.parse_block()?;
        Ok(Stmt {
            kind: StmtKind::While { condition, body },
            pos: self.pos_of(&start),
        })
    }

    fn parse_for(&mut self) -> PResult<Stmt> {
        let start = self.advance();
        self.expect(TokenKind::LParen, "(")?;
        let init = Box::new(self.parse_for_clause_decl_or_assign()?);
        self.expect(TokenKind::Semicolon, ";")?;
        let condition = self.parse_expression()?;
        self.expect(TokenKind::Semicolon, ";")?;
        let update = Box::new(self.parse_assignment_no_semicolon()?);
        self.expect(TokenKind::RParen, ")")?;
        let body = self.parse_block()?;
        Ok(Stmt {
            kind: StmtKind::For {
                init,
                condition,
                update,
                body,
            },
            pos: self.pos_of(&start),
        })
    }

    /// `for` init clause: a declaration or assignment, without a trailing
    /// semicolon consumed here (the caller consumes it uniformly).
    fn parse_for_clause_decl_or_assign(&mut self) -> PResult<Stmt> {
        if self.type_keyword_at(&self.current().kind.clone()) {
            let start = self.current().clone();
            let ty = self.parse_type()?;
            let name = self.expect_ident()?;
            self.expect(TokenKind::Assign, "=")?;
            let initializer = Some(self.parse_expression()?);
            Ok(Stmt {
                kind: StmtKind::VarDecl {
                    ty,
                    name,
                    initializer,
                },
                pos: self.pos_of(&start),
            })
        } else {
            self.parse_assignment_no_semicolon()
        }
    }

    fn parse_assignment_no_semicolon(&mut self) -> PResult<Stmt> {
        let start = self.current().clone();
        let name = self.expect_ident()?;
        self.expect(TokenKind::Assign, "=")?;
        let value = self.parse_expression()?;
        Ok(Stmt {
            kind: StmtKind::Assignment { name, value },
            pos: self.pos_of(&start),
        })
    }

    fn parse_return(&mut self) -> PResult<Stmt> {
        let start = self.advance();
        let value = if self.at(&TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect(TokenKind::Semicolon, ";")?;
        Ok(Stmt {
            kind: StmtKind::Return(value),
            pos: self.pos_of(&start),
        })
    }

    fn parse_print(&mut self) -> PResult<Stmt> {
        let start = self.advance();
        self.expect(TokenKind::LParen, "(")?;
        let mut args = Vec::new();
        if !self.at(&TokenKind::RParen) {
            args.push(self.parse_expression()?);
            while self.at(&TokenKind::Comma) {
                self.advance();
                args.push(self.parse_expression()?);
            }
        }
        self.expect(TokenKind::RParen, ")")?;
        self.expect(TokenKind::Semicolon, ";")?;
        Ok(Stmt {
            kind: StmtKind::Print(args),
            pos: self.pos_of(&start),
        })
    }

    fn parse_function_def(&mut self) -> PResult<Stmt> {
        let start = self.advance();
        let return_type = self.parse_type()?;
        let name = self.expect_ident()?;
        self.expect(TokenKind::LParen, "(")?;
        let mut parameters = Vec::new();
        if !self.at(&TokenKind::RParen) {
            parameters.push(self.parse_param()?);
            while self.at(&TokenKind::Comma) {
                self.advance();
                parameters.push(self.parse_param()?);
            }
        }
        self.expect(TokenKind::RParen, ")")?;
        let body = self.parse_block()?;
        Ok(Stmt {
            kind: StmtKind::FunctionDef {
                return_type,
                name,
                parameters,
                body,
            },
            pos: self.pos_of(&start),
        })
    }

    fn parse_param(&mut self) -> PResult<Param> {
        let ty = self.parse_type()?;
        let name = self.expect_ident()?;
        Ok(Param { ty, name })
    }

    /// An identifier-led statement is an assignment, an array-element
    /// assignment, or an expression statement; one token of lookahead past
    /// the identifier disambiguates.
    fn parse_ident_led_statement(&mut self) -> PResult<Stmt> {
        let start = self.current().clone();
        let name = self.expect_ident()?;

        if self.at(&TokenKind::Assign) {
            self.advance();
            let value = self.parse_expression()?;
            self.expect(TokenKind::Semicolon, ";")?;
            return Ok(Stmt {
                kind: StmtKind::Assignment { name, value },
                pos: self.pos_of(&start),
            });
        }

        if self.at(&TokenKind::LBracket) {
            self.advance();
            let index = self.parse_expression()?;
            self.expect(TokenKind::RBracket, "]")?;
            self.expect(TokenKind::Assign, "=")?;
            let value = self.parse_expression()?;
            self.expect(TokenKind::Semicolon, ";")?;
            return Ok(Stmt {
                kind: StmtKind::ArrayAssignment {
                    array_name: name,
                    index,
                    value,
                },
                pos: self.pos_of(&start),
            });
        }

        // Expression statement, e.g. a bare function call: rebuild the
        // leading identifier into a primary and continue through the
        // precedence ladder so trailing operators still parse.
        let leading = Expr {
            kind: if self.at(&TokenKind::LParen) {
                self.advance();
                let arguments = self.parse_call_arguments()?;
                ExprKind::Call { name, arguments }
            } else {
                ExprKind::Identifier(name)
            },
            pos: self.pos_of(&start),
        };
        let expr = self.parse_expression_from(leading)?;
        self.expect(TokenKind::Semicolon, ";")?;
        Ok(Stmt {
            kind: StmtKind::ExprStmt(expr),
            pos: self.pos_of(&start),
        })
    }

    fn parse_call_arguments(&mut self) -> PResult<Vec<Expr>> {
        let mut args = Vec::new();
        if !self.at(&TokenKind::RParen) {
            args.push(self.parse_expression()?);
            while self.at(&TokenKind::Comma) {
                self.advance();
                args.push(self.parse_expression()?);
            }
        }
        self.expect(TokenKind::RParen, ")")?;
        Ok(args)
    }

    // -- expressions: precedence ladder -----------------------------------

    fn parse_expression(&mut self) -> PResult<Expr> {
        self.parse_or()
    }

    /// Continues the precedence ladder starting from an already-parsed
    /// primary (used when a statement's leading identifier was consumed
    /// ahead of the general expression parser).
    fn parse_expression_from(&mut self, primary: Expr) -> PResult<Expr> {
        let left = self.parse_postfix_from(primary)?;
        let left = self.parse_power_from(left)?;
        let left = self.parse_mul_div_mod_from(left)?;
        let left = self.parse_add_sub_from(left)?;
        let left = self.parse_relational_from(left)?;
        let left = self.parse_equality_from(left)?;
        let left = self.parse_and_from(left)?;
        self.parse_or_from(left)
    }

    fn parse_or(&mut self) -> PResult<Expr> {
        let left = self.parse_and()?;
        self.parse_or_from(left)
    }

    fn parse_or_from(&mut self, mut left: Expr) -> PResult<Expr> {
        while self.at(&TokenKind::Or) {
            let tok = self.advance();
            let right = self.parse_and()?;
            left = Expr {
                pos: self.pos_of(&tok),
                kind: ExprKind::Binary {
                    op: BinaryOp::Or,
                    left: Box::new(left),
                    right: Box::new(right),
                },
            };
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> PResult<Expr> {
        let left = self.parse_equality()?;
        self.parse_and_from(left)
    }

    fn parse_and_from(&mut self, mut left: Expr) -> PResult<Expr> {
        while self.at(&TokenKind::And) {
            let tok = self.advance();
            let right = self.parse_equality()?;
            left = Expr {
                pos: self.pos_of(&tok),
                kind: ExprKind::Binary {
                    op: BinaryOp::And,
                    left: Box::new(left),
                    right: Box::new(right),
                },
            };
        }
        Ok(left)
    }

    fn parse_equality(&mut self) -> PResult<Expr> {
        let left = self.parse_relational()?;
        self.parse_equality_from(left)
    }

    fn parse_equality_from(&mut self, mut left: Expr) -> PResult<Expr> {
        loop {
            let op = match self.current().kind {
                TokenKind::EqEq => BinaryOp::Eq,
                TokenKind::NotEq => BinaryOp::NotEq,
                _ => break,
            };
            let tok = self.advance();
            let right = self.parse_relational()?;
            left = Expr {
                pos: self.pos_of(&tok),
                kind: ExprKind::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
            };
        }
        Ok(left)
    }

    fn parse_relational(&mut self) -> PResult<Expr> {
        let left = self.parse_add_sub()?;
        self.parse_relational_from(left)
    }

    fn parse_relational_from(&mut self, mut left: Expr) -> PResult<Expr> {
        loop {
            let op = match self.current().kind {
                TokenKind::Lt => BinaryOp::Lt,
                TokenKind::Gt => BinaryOp::Gt,
                TokenKind::LtEq => BinaryOp::LtEq,
                TokenKind::GtEq => BinaryOp::GtEq,
                _ => break,
            };
            let tok = self.advance();
            let right = self.parse_add_sub()?;
            left = Expr {
                pos: self.pos_of(&tok),
                kind: ExprKind::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
            };
        }
        Ok(left)
    }

    fn parse_add_sub(&mut self) -> PResult<Expr> {
        let left = self.parse_mul_div_mod()?;
        self.parse_add_sub_from(left)
    }

    fn parse_add_sub_from(&mut self, mut left: Expr) -> PResult<Expr> {
        loop {
            let op = match self.current().kind {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => break,
            };
            let tok = self.advance();
            let right = self.parse_mul_div_mod()?;
            left = Expr {
                pos: self.pos_of(&tok),
                kind: ExprKind::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
            };
        }
        Ok(left)
    }

    fn parse_mul_div_mod(&mut self) -> PResult<Expr> {
        let left = self.parse_power()?;
        self.parse_mul_div_mod_from(left)
    }

    fn parse_mul_div_mod_from(&mut self, mut left: Expr) -> PResult<Expr> {
        loop {
            let op = match self.current().kind {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                TokenKind::Percent => BinaryOp::Mod,
                _ => break,
            };
            let tok = self.advance();
            let right = self.parse_power()?;
            left = Expr {
                pos: self.pos_of(&tok),
                kind: ExprKind::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
            };
        }
        Ok(left)
    }

    /// `**` is right-associative: parsed by recursing back into itself on
    /// the right-hand side instead of looping.
    fn parse_power(&mut self) -> PResult<Expr> {
        let left = self.parse_unary()?;
        self.parse_power_from(left)
    }

    fn parse_power_from(&mut self, left: Expr) -> PResult<Expr> {
        if self.at(&TokenKind::Power) {
            let tok = self.advance();
            let right = self.parse_power()?;
            return Ok(Expr {
                pos: self.pos_of(&tok),
                kind: ExprKind::Binary {
                    op: BinaryOp::Pow,
                    left: Box::new(left),
                    right: Box::new(right),
                },
            });
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> PResult<Expr> {
        match self.current().kind {
            TokenKind::Minus => {
                let tok = self.advance();
                let operand = self.parse_unary()?;
                Ok(Expr {
                    pos: self.pos_of(&tok),
                    kind: ExprKind::Unary {
                        op: UnaryOp::Neg,
                        operand: Box::new(operand),
                    },
                })
            }
            TokenKind::Not => {
                let tok = self.advance();
                let operand = self.parse_unary()?;
                Ok(Expr {
                    pos: self.pos_of(&tok),
                    kind: ExprKind::Unary {
                        op: UnaryOp::Not,
                        operand: Box::new(operand),
                    },
                })
            }
            _ => self.parse_postfix(),
        }
    }

    fn parse_postfix(&mut self) -> PResult<Expr> {
        let primary = self.parse_primary()?;
        self.parse_postfix_from(primary)
    }

    fn parse_postfix_from(&mut self, mut expr: Expr) -> PResult<Expr> {
        while self.at(&TokenKind::LBracket) {
            let tok = self.advance();
            let index = self.parse_expression()?;
            self.expect(TokenKind::RBracket, "]")?;
            expr = Expr {
                pos: self.pos_of(&tok),
                kind: ExprKind::ArrayAccess {
                    array: Box::new(expr),
                    index: Box::new(index),
                },
            };
        }
        Ok(expr)
    }

    fn parse_primary(&mut self) -> PResult<Expr> {
        let tok = self.current().clone();
        let pos = self.pos_of(&tok);

        match tok.kind {
            TokenKind::IntLiteral(v) => {
                self.advance();
                Ok(Expr {
                    kind: ExprKind::Literal(LiteralValue::Int(v)),
                    pos,
                })
            }
            TokenKind::FloatLiteral(v) => {
                self.advance();
                Ok(Expr {
                    kind: ExprKind::Literal(LiteralValue::Float(v)),
                    pos,
                })
            }
            TokenKind::BoolLiteral(v) => {
                self.advance();
                Ok(Expr {
                    kind: ExprKind::Literal(LiteralValue::Bool(v)),
                    pos,
                })
            }
            TokenKind::StringLiteral(sym) => {
                self.advance();
                Ok(Expr {
                    kind: ExprKind::Literal(LiteralValue::String(sym)),
                    pos,
                })
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expression()?;
                self.expect(TokenKind::RParen, ")")?;
                Ok(inner)
            }
            TokenKind::LBracket => {
                self.advance();
                let mut elements = Vec::new();
                if !self.at(&TokenKind::RBracket) {
                    elements.push(self.parse_expression()?);
                    while self.at(&TokenKind::Comma) {
                        self.advance();
                        elements.push(self.parse_expression()?);
                    }
                }
                self.expect(TokenKind::RBracket, "]")?;
                Ok(Expr {
                    kind: ExprKind::ArrayLiteral(elements),
                    pos,
                })
            }
            TokenKind::Len => self.parse_builtin_call(BuiltIn::Len),
            TokenKind::Random => self.parse_builtin_call(BuiltIn::Random),
            TokenKind::Substr => self.parse_builtin_call(BuiltIn::Substr),
            TokenKind::Concat => self.parse_builtin_call(BuiltIn::Concat),
            TokenKind::Input => self.parse_builtin_call(BuiltIn::Input),
            TokenKind::Ident(sym) => {
                self.advance();
                if self.at(&TokenKind::LParen) {
                    self.advance();
                    let arguments = self.parse_call_arguments()?;
                    Ok(Expr {
                        kind: ExprKind::Call { name: sym, arguments },
                        pos,
                    })
                } else {
                    Ok(Expr {
                        kind: ExprKind::Identifier(sym),
                        pos,
                    })
                }
            }
            _ => self.error_unexpected("an expression").map(|_| unreachable!()),
        }
    }

    fn parse_builtin_call(&mut self, function: BuiltIn) -> PResult<Expr> {
        let tok = self.advance();
        self.expect(TokenKind::LParen, "(")?;
        let arguments = self.parse_call_arguments()?;
        Ok(Expr {
            kind: ExprKind::BuiltInCall { function, arguments },
            pos: self.pos_of(&tok),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mlc_util::{Handler, Interner};

    fn parse(src: &str) -> (Option<Program>, Handler) {
        let mut interner = Interner::new();
        let handler = Handler::new();
        let tokens = {
            let mut lexer = mlc_lex::Lexer::new(src, &mut interner, &handler);
            lexer.tokenize()
        };
        let program = Parser::new(tokens, &handler).parse_program();
        (program, handler)
    }

    #[test]
    fn parses_var_decl_with_initializer() {
        let (program, handler) = parse("int x = 5;");
        assert!(!handler.has_errors());
        let stmts = program.unwrap().statements;
        assert_eq!(stmts.len(), 1);
        assert!(matches!(stmts[0].kind, StmtKind::VarDecl { .. }));
    }

    #[test]
    fn power_is_right_associative() {
        // 2 ** 3 ** 2 should parse as 2 ** (3 ** 2)
        let (program, handler) = parse("int x = 2 ** 3 ** 2;");
        assert!(!handler.has_errors());
        let stmts = program.unwrap().statements;
        if let StmtKind::VarDecl { initializer: Some(expr), .. } = &stmts[0].kind {
            if let ExprKind::Binary { op: BinaryOp::Pow, right, .. } = &expr.kind {
                assert!(matches!(right.kind, ExprKind::Binary { op: BinaryOp::Pow, .. }));
            } else {
                panic!("expected top-level power");
            }
        } else {
            panic!("expected var decl");
        }
    }

    #[test]
    fn parses_if_else() {
        let (program, handler) = parse("if (x > 0) { print(x); } else { print(0); }");
        assert!(!handler.has_errors());
        let stmts = program.unwrap().statements;
        assert!(matches!(stmts[0].kind, StmtKind::If { else_block: Some(_), .. }));
    }

    #[test]
    fn parses_while_loop() {
        let (program, handler) = parse("while (x < 10) { x = x + 1; }");
        assert!(!handler.has_errors());
        assert!(matches!(program.unwrap().statements[0].kind, StmtKind::While { .. }));
    }

    #[test]
    fn parses_for_loop() {
        let (program, handler) = parse("for (int i = 0; i < 10; i = i + 1) { print(i); }");
        assert!(!handler.has_errors());
        assert!(matches!(program.unwrap().statements[0].kind, StmtKind::For { .. }));
    }

    #[test]
    fn parses_function_def_and_call() {
        let (program, handler) = parse(
            "function int add(int a, int b) { return a + b; } int r = add(1, 2);",
        );
        assert!(!handler.has_errors());
        let stmts = program.unwrap().statements;
        assert!(matches!(stmts[0].kind, StmtKind::FunctionDef { .. }));
    }

    #[test]
    fn parses_array_literal_and_access() {
        let (program, handler) = parse("int[] xs = [1, 2, 3]; int y = xs[0];");
        assert!(!handler.has_errors());
        assert!(program.is_some());
    }

    #[test]
    fn parses_array_assignment() {
        let (program, handler) = parse("xs[0] = 5;");
        assert!(!handler.has_errors());
        assert!(matches!(
            program.unwrap().statements[0].kind,
            StmtKind::ArrayAssignment { .. }
        ));
    }

    #[test]
    fn missing_semicolon_is_a_syntax_error() {
        let (program, handler) = parse("int x = 5");
        assert!(handler.has_errors());
        assert!(program.is_none());
    }

    #[test]
    fn builtin_call_parses() {
        let (program, handler) = parse("int n = len(xs);");
        assert!(!handler.has_errors());
        assert!(program.is_some());
    }

    #[test]
    fn bare_call_statement_parses() {
        let (program, handler) = parse("print(5); foo();");
        assert!(!handler.has_errors());
        let stmts = program.unwrap().statements;
        assert!(matches!(stmts[1].kind, StmtKind::ExprStmt(_)));
    }
}
