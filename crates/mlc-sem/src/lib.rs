//! mlc-sem - Semantic Analyzer for MiniLang.
//!
//! Walks the parser's AST, resolving every identifier to a declared type,
//! checking assignment and call compatibility, and rejecting `return`
//! outside a function. MiniLang has no structs, enums, traits, or
//! generics, so this is a single flat pass over [`mlc_par::ast`] rather
//! than a HIR lowering: variables carry one of [`Type`]'s six shapes and
//! functions carry a fixed parameter/return signature.

pub mod scope;
pub mod types;

use mlc_util::diagnostic::DiagnosticCode;
use mlc_util::{Handler, Interner, Span, Symbol};
use rustc_hash::FxHashMap;

use mlc_par::ast::*;

pub use types::Type;
use scope::ScopeStack;

#[derive(Clone, Debug)]
pub struct FunctionSignature {
    pub params: Vec<Type>,
    pub return_type: Type,
}

/// Built-in free functions: `len`, `random`, `substr`, `concat`, `input`.
fn builtin_signature(builtin: BuiltIn) -> (&'static [Type], Type) {
    match builtin {
        BuiltIn::Len => (&[], Type::Int), // arity checked structurally below
        BuiltIn::Random => (&[Type::Int, Type::Int], Type::Int),
        BuiltIn::Substr => (&[Type::String, Type::Int, Type::Int], Type::String),
        BuiltIn::Concat => (&[Type::String, Type::String], Type::String),
        BuiltIn::Input => (&[], Type::String),
    }
}

pub struct SemanticAnalyzer<'a> {
    handler: &'a Handler,
    interner: &'a Interner,
    functions: FxHashMap<Symbol, FunctionSignature>,
    scopes: ScopeStack,
    current_return_type: Option<Type>,
}

impl<'a> SemanticAnalyzer<'a> {
    pub fn new(handler: &'a Handler, interner: &'a Interner) -> Self {
        Self {
            handler,
            interner,
            functions: FxHashMap::default(),
            scopes: ScopeStack::new(),
            current_return_type: None,
        }
    }

    /// Analyzes `program` in place. Returns `true` if no semantic errors
    /// were reported (warnings don't affect the result).
    pub fn analyze(&mut self, program: &Program) -> bool {
        self.hoist_functions(&program.statements);
        for stmt in &program.statements {
            self.check_stmt(stmt);
        }
        !self.handler.has_errors()
    }

    /// Function definitions are visible throughout the whole program,
    /// including before their textual declaration, so signatures are
    /// collected before any statement is type-checked.
    fn hoist_functions(&mut self, statements: &[Stmt]) {
        for stmt in statements {
            if let StmtKind::FunctionDef {
                return_type,
                name,
                parameters,
                ..
            } = &stmt.kind
            {
                let sig = FunctionSignature {
                    params: parameters.iter().map(|p| Type::from_ast(&p.ty)).collect(),
                    return_type: Type::from_ast(return_type),
                };
                if self.functions.insert(*name, sig).is_some() {
                    self.error(
                        stmt.pos,
                        DiagnosticCode::E_SEMANTIC_DUPLICATE_DEF,
                        format!("function '{}' is already defined", self.name(*name)),
                    );
                }
            }
        }
    }

    fn name(&self, sym: Symbol) -> &str {
        self.interner.resolve(sym)
    }

    fn error(&self, pos: Pos, code: DiagnosticCode, message: String) {
        self.handler
            .build_error(Span::point(pos.line, pos.column), message)
            .code(code)
            .emit(self.handler);
    }

    // -- statements --------------------------------------------------------

    fn check_stmt(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::VarDecl {
                ty,
                name,
                initializer,
            } => self.check_var_decl(stmt.pos, ty, *name, initializer.as_ref()),
            StmtKind::Assignment { name, value } => self.check_assignment(stmt.pos, *name, value),
            StmtKind::ArrayAssignment {
                array_name,
                index,
                value,
            } => self.check_array_assignment(stmt.pos, *array_name, index, value),
            StmtKind::If {
                condition,
                then_block,
                else_block,
            } => self.check_if(condition, then_block, else_block.as_deref()),
            StmtKind::While { condition, body } => self.check_while(condition, body),
            StmtKind::For {
                init,
                condition,
                update,
                body,
            } => self.check_for(init, condition, update, body),
            StmtKind::FunctionDef {
                return_type,
                name,
                parameters,
                body,
            } => self.check_function_def(stmt.pos, return_type, *name, parameters, body),
            StmtKind::Return(value) => self.check_return(stmt.pos, value.as_ref()),
            StmtKind::Print(args) => {
                for arg in args {
                    self.infer(arg);
                }
            }
            StmtKind::ExprStmt(expr) => {
                self.infer(expr);
            }
        }
    }

    fn check_var_decl(&mut self, pos: Pos, ty: &TypeName, name: Symbol, initializer: Option<&Expr>) {
        let declared = Type::from_ast(ty);
        if let Some(init) = initializer {
            let actual = self.infer(init);
            if !actual.is_assignable_to(&declared) {
                self.error(
                    pos,
                    DiagnosticCode::E_SEMANTIC_TYPE_MISMATCH,
                    format!("cannot assign {} to {}", actual, declared),
                );
            }
        }
        if !self.scopes.declare(name, declared) {
            self.error(
                pos,
                DiagnosticCode::E_SEMANTIC_DUPLICATE_DEF,
                format!("'{}' is already declared in this scope", self.name(name)),
            );
        }
    }

    fn check_assignment(&mut self, pos: Pos, name: Symbol, value: &Expr) {
        let actual = self.infer(value);
        match self.scopes.lookup(name).cloned() {
            Some(declared) => {
                if !actual.is_assignable_to(&declared) {
                    self.error(
                        pos,
                        DiagnosticCode::E_SEMANTIC_TYPE_MISMATCH,
                        format!("cannot assign {} to {}", actual, declared),
                    );
                }
            }
            None => self.error(
                pos,
                DiagnosticCode::E_SEMANTIC_UNDEFINED_VAR,
                format!("undefined variable '{}'", self.name(name)),
            ),
        }
    }

    fn check_array_assignment(&mut self, pos: Pos, array_name: Symbol, index: &Expr, value: &Expr) {
        let index_ty = self.infer(index);
        if index_ty != Type::Int {
            self.error(
                pos,
                DiagnosticCode::E_SEMANTIC_TYPE_MISMATCH,
                format!("array index must be int, found {}", index_ty),
            );
        }
        let value_ty = self.infer(value);
        match self.scopes.lookup(array_name).cloned() {
            Some(Type::Array(elem)) => {
                if !value_ty.is_assignable_to(&elem) {
                    self.error(
                        pos,
                        DiagnosticCode::E_SEMANTIC_TYPE_MISMATCH,
                        format!("cannot assign {} to {}", value_ty, elem),
                    );
                }
            }
            Some(other) => self.error(
                pos,
                DiagnosticCode::E_SEMANTIC_TYPE_MISMATCH,
                format!("'{}' is {}, not an array", self.name(array_name), other),
            ),
            None => self.error(
                pos,
                DiagnosticCode::E_SEMANTIC_UNDEFINED_VAR,
                format!("undefined variable '{}'", self.name(array_name)),
            ),
        }
    }

    fn check_if(&mut self, condition: &Expr, then_block: &[Stmt], else_block: Option<&[Stmt]>) {
        self.check_condition(condition);
        self.scopes.push_scope();
        for stmt in then_block {
            self.check_stmt(stmt);
        }
        self.scopes.pop_scope();
        if let Some(else_block) = else_block {
            self.scopes.push_scope();
            for stmt in else_block {
                self.check_stmt(stmt);
            }
            self.scopes.pop_scope();
        }
    }

    fn check_while(&mut self, condition: &Expr, body: &[Stmt]) {
        self.check_condition(condition);
        self.scopes.push_scope();
        for stmt in body {
            self.check_stmt(stmt);
        }
        self.scopes.pop_scope();
    }

    fn check_for(&mut self, init: &Stmt, condition: &Expr, update: &Stmt, body: &[Stmt]) {
        self.scopes.push_scope();
        self.check_stmt(init);
        self.check_condition(condition);
        self.check_stmt(update);
        for stmt in body {
            self.check_stmt(stmt);
        }
        self.scopes.pop_scope();
    }

    fn check_condition(&mut self, condition: &Expr) {
        let ty = self.infer(condition);
        if ty != Type::Bool {
            self.error(
                condition.pos,
                DiagnosticCode::E_SEMANTIC_TYPE_MISMATCH,
                format!("condition must be bool, found {}", ty),
            );
        }
    }

    fn check_function_def(
        &mut self,
        pos: Pos,
        return_type: &TypeName,
        name: Symbol,
        parameters: &[Param],
        body: &[Stmt],
    ) {
        let return_type = Type::from_ast(return_type);
        let previous_return_type = self.current_return_type.replace(return_type.clone());

        self.scopes.push_scope();
        for param in parameters {
            self.scopes.declare(param.name, Type::from_ast(&param.ty));
        }
        for stmt in body {
            self.check_stmt(stmt);
        }
        self.scopes.pop_scope();

        if return_type != Type::Void && !body.iter().any(|s| matches!(s.kind, StmtKind::Return(_))) {
            self.error(
                pos,
                DiagnosticCode::E_SEMANTIC_MISSING_RETURN,
                format!("function '{}' must return a value of type {}", self.name(name), return_type),
            );
        }

        self.current_return_type = previous_return_type;
    }

    fn check_return(&mut self, pos: Pos, value: Option<&Expr>) {
        let Some(expected) = self.current_return_type.clone() else {
            self.error(
                pos,
                DiagnosticCode::E_SEMANTIC_RETURN_OUTSIDE_FUNCTION,
                "'return' used outside a function".to_string(),
            );
            return;
        };

        match value {
            Some(expr) => {
                let actual = self.infer(expr);
                if !actual.is_assignable_to(&expected) {
                    self.error(
                        pos,
                        DiagnosticCode::E_SEMANTIC_TYPE_MISMATCH,
                        format!("cannot return {} from a function returning {}", actual, expected),
                    );
                }
            }
            None => {
                if expected != Type::Void {
                    self.error(
                        pos,
                        DiagnosticCode::E_SEMANTIC_TYPE_MISMATCH,
                        format!("function must return a value of type {}", expected),
                    );
                }
            }
        }
    }

    // -- expressions ---------------------------------------------------------

    fn infer(&mut self, expr: &Expr) -> Type {
        match &expr.kind {
            ExprKind::Literal(lit) => match lit {
                LiteralValue::Int(_) => Type::Int,
                LiteralValue::Float(_) => Type::Float,
                LiteralValue::Bool(_) => Type::Bool,
                LiteralValue::String(_) => Type::String,
            },
            ExprKind::Identifier(name) => self.infer_identifier(expr.pos, *name),
            ExprKind::Binary { op, left, right } => self.infer_binary(expr.pos, *op, left, right),
            ExprKind::Unary { op, operand } => self.infer_unary(expr.pos, *op, operand),
            ExprKind::ArrayLiteral(elements) => self.infer_array_literal(elements),
            ExprKind::ArrayAccess { array, index } => self.infer_array_access(expr.pos, array, index),
            ExprKind::Call { name, arguments } => self.infer_call(expr.pos, *name, arguments),
            ExprKind::BuiltInCall { function, arguments } => {
                self.infer_builtin_call(expr.pos, *function, arguments)
            }
        }
    }

    fn infer_identifier(&mut self, pos: Pos, name: Symbol) -> Type {
        match self.scopes.lookup(name) {
            Some(ty) => ty.clone(),
            None => {
                self.error(
                    pos,
                    DiagnosticCode::E_SEMANTIC_UNDEFINED_VAR,
                    format!("undefined variable '{}'", self.name(name)),
                );
                Type::Void
            }
        }
    }

    fn infer_binary(&mut self, pos: Pos, op: BinaryOp, left: &Expr, right: &Expr) -> Type {
        let lt = self.infer(left);
        let rt = self.infer(right);

        match op {
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod | BinaryOp::Pow => {
                if lt.is_numeric() && rt.is_numeric() {
                    lt.numeric_result(&rt)
                } else {
                    self.error(
                        pos,
                        DiagnosticCode::E_SEMANTIC_TYPE_MISMATCH,
                        format!("arithmetic requires numeric operands, found {} and {}", lt, rt),
                    );
                    Type::Void
                }
            }
            BinaryOp::Lt | BinaryOp::Gt | BinaryOp::LtEq | BinaryOp::GtEq => {
                if lt.is_numeric() && rt.is_numeric() {
                    Type::Bool
                } else {
                    self.error(
                        pos,
                        DiagnosticCode::E_SEMANTIC_TYPE_MISMATCH,
                        format!("comparison requires numeric operands, found {} and {}", lt, rt),
                    );
                    Type::Void
                }
            }
            BinaryOp::Eq | BinaryOp::NotEq => {
                if lt == rt || (lt.is_numeric() && rt.is_numeric()) {
                    Type::Bool
                } else {
                    self.error(
                        pos,
                        DiagnosticCode::E_SEMANTIC_TYPE_MISMATCH,
                        format!("cannot compare {} and {} for equality", lt, rt),
                    );
                    Type::Void
                }
            }
            BinaryOp::And | BinaryOp::Or => {
                if lt == Type::Bool && rt == Type::Bool {
                    Type::Bool
                } else {
                    self.error(
                        pos,
                        DiagnosticCode::E_SEMANTIC_TYPE_MISMATCH,
                        format!("logical operators require bool operands, found {} and {}", lt, rt),
                    );
                    Type::Void
                }
            }
        }
    }

    fn infer_unary(&mut self, pos: Pos, op: UnaryOp, operand: &Expr) -> Type {
        let ty = self.infer(operand);
        match op {
            UnaryOp::Neg => {
                if ty.is_numeric() {
                    ty
                } else {
                    self.error(
                        pos,
                        DiagnosticCode::E_SEMANTIC_TYPE_MISMATCH,
                        format!("unary '-' requires a numeric operand, found {}", ty),
                    );
                    Type::Void
                }
            }
            UnaryOp::Not => {
                if ty == Type::Bool {
                    Type::Bool
                } else {
                    self.error(
                        pos,
                        DiagnosticCode::E_SEMANTIC_TYPE_MISMATCH,
                        format!("unary 'not' requires a bool operand, found {}", ty),
                    );
                    Type::Void
                }
            }
        }
    }

    fn infer_array_literal(&mut self, elements: &[Expr]) -> Type {
        let mut element_ty = None;
        for elem in elements {
            let ty = self.infer(elem);
            match &element_ty {
                None => element_ty = Some(ty),
                Some(expected) => {
                    if !ty.is_assignable_to(expected) {
                        self.error(
                            elem.pos,
                            DiagnosticCode::E_SEMANTIC_TYPE_MISMATCH,
                            format!("array elements must all be {}, found {}", expected, ty),
                        );
                    }
                }
            }
        }
        Type::Array(Box::new(element_ty.unwrap_or(Type::Int)))
    }

    fn infer_array_access(&mut self, pos: Pos, array: &Expr, index: &Expr) -> Type {
        let array_ty = self.infer(array);
        let index_ty = self.infer(index);
        if index_ty != Type::Int {
            self.error(
                pos,
                DiagnosticCode::E_SEMANTIC_TYPE_MISMATCH,
                format!("array index must be int, found {}", index_ty),
            );
        }
        match array_ty {
            Type::Array(elem) => *elem,
            other => {
                self.error(
                    pos,
                    DiagnosticCode::E_SEMANTIC_TYPE_MISMATCH,
                    format!("cannot index into {}", other),
                );
                Type::Void
            }
        }
    }

    fn infer_call(&mut self, pos: Pos, name: Symbol, arguments: &[Expr]) -> Type {
        let Some(sig) = self.functions.get(&name).cloned() else {
            self.error(
                pos,
                DiagnosticCode::E_SEMANTIC_UNDEFINED_FN,
                format!("undefined function '{}'", self.name(name)),
            );
            for arg in arguments {
                self.infer(arg);
            }
            return Type::Void;
        };

        if sig.params.len() != arguments.len() {
            self.error(
                pos,
                DiagnosticCode::E_SEMANTIC_ARITY_MISMATCH,
                format!(
                    "'{}' expects {} argument(s), found {}",
                    self.name(name),
                    sig.params.len(),
                    arguments.len()
                ),
            );
        }

        for (arg, expected) in arguments.iter().zip(sig.params.iter()) {
            let actual = self.infer(arg);
            if !actual.is_assignable_to(expected) {
                self.error(
                    arg.pos,
                    DiagnosticCode::E_SEMANTIC_TYPE_MISMATCH,
                    format!("cannot pass {} where {} is expected", actual, expected),
                );
            }
        }
        for arg in arguments.iter().skip(sig.params.len()) {
            self.infer(arg);
        }

        sig.return_type
    }

    fn infer_builtin_call(&mut self, pos: Pos, builtin: BuiltIn, arguments: &[Expr]) -> Type {
        for arg in arguments {
            self.infer(arg);
        }

        let (params, return_type) = builtin_signature(builtin);
        match builtin {
            BuiltIn::Len => {
                if arguments.len() != 1 {
                    self.error(
                        pos,
                        DiagnosticCode::E_SEMANTIC_ARITY_MISMATCH,
                        "'len' expects exactly 1 argument".to_string(),
                    );
                }
            }
            BuiltIn::Input => {
                if !arguments.is_empty() {
                    self.error(
                        pos,
                        DiagnosticCode::E_SEMANTIC_ARITY_MISMATCH,
                        "'input' expects no arguments".to_string(),
                    );
                }
            }
            _ => {
                if arguments.len() != params.len() {
                    self.error(
                        pos,
                        DiagnosticCode::E_SEMANTIC_ARITY_MISMATCH,
                        format!("builtin expects {} argument(s), found {}", params.len(), arguments.len()),
                    );
                }
            }
        }
        return_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mlc_util::Handler;

    fn analyze(src: &str) -> (bool, Handler) {
        let mut interner = Interner::new();
        let handler = Handler::new();
        let tokens = {
            let mut lexer = mlc_lex::Lexer::new(src, &mut interner, &handler);
            lexer.tokenize()
        };
        let program = mlc_par::Parser::new(tokens, &handler)
            .parse_program()
            .expect("parses cleanly");
        let ok = SemanticAnalyzer::new(&handler, &interner).analyze(&program);
        (ok, handler)
    }

    #[test]
    fn well_typed_program_passes() {
        let (ok, handler) = analyze("int x = 5; float y = x;");
        assert!(ok, "{:?}", handler.diagnostics());
    }

    #[test]
    fn assigning_bool_to_int_is_an_error() {
        let (ok, _) = analyze("int x = true;");
        assert!(!ok);
    }

    #[test]
    fn undefined_variable_is_an_error() {
        let (ok, _) = analyze("x = 5;");
        assert!(!ok);
    }

    #[test]
    fn duplicate_declaration_in_same_scope_is_an_error() {
        let (ok, _) = analyze("int x = 1; int x = 2;");
        assert!(!ok);
    }

    #[test]
    fn shadowing_in_nested_block_is_fine() {
        let (ok, handler) = analyze("int x = 1; if (true) { int x = 2; print(x); }");
        assert!(ok, "{:?}", handler.diagnostics());
    }

    #[test]
    fn function_call_checks_arity_and_types() {
        let (ok, handler) = analyze(
            "function int add(int a, int b) { return a + b; } int r = add(1, 2);",
        );
        assert!(ok, "{:?}", handler.diagnostics());
    }

    #[test]
    fn wrong_arity_call_is_an_error() {
        let (ok, _) = analyze("function int add(int a, int b) { return a + b; } int r = add(1);");
        assert!(!ok);
    }

    #[test]
    fn return_outside_function_is_an_error() {
        let (ok, _) = analyze("return 5;");
        assert!(!ok);
    }

    #[test]
    fn missing_return_in_non_void_function_is_an_error() {
        let (ok, _) = analyze("function int f() { print(1); }");
        assert!(!ok);
    }

    #[test]
    fn while_condition_must_be_bool() {
        let (ok, _) = analyze("while (1) { print(1); }");
        assert!(!ok);
    }

    #[test]
    fn array_index_must_be_int() {
        let (ok, _) = analyze("int[] xs = [1, 2, 3]; int y = xs[true];");
        assert!(!ok);
    }

    #[test]
    fn array_element_assignment_checks_element_type() {
        let (ok, _) = analyze("int[] xs = [1, 2, 3]; xs[0] = true;");
        assert!(!ok);
    }

    #[test]
    fn undefined_function_call_is_an_error() {
        let (ok, _) = analyze("int x = mystery(1);");
        assert!(!ok);
    }

    #[test]
    fn builtin_len_typechecks() {
        let (ok, handler) = analyze("int[] xs = [1, 2]; int n = len(xs);");
        assert!(ok, "{:?}", handler.diagnostics());
    }
}
