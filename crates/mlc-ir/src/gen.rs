//! Lowers a parsed [`mlc_par::ast::Program`] into a flat list of
//! [`Instruction`]s.

use mlc_util::{Interner, Symbol};

use mlc_par::ast::*;

use crate::instr::{Instruction, LabelId, Op, Operand};

pub struct IrGenerator<'a> {
    instructions: Vec<Instruction>,
    interner: &'a mut Interner,
    temp_counter: u32,
    label_counter: u32,
}

impl<'a> IrGenerator<'a> {
    pub fn new(interner: &'a mut Interner) -> Self {
        Self {
            instructions: Vec::new(),
            interner,
            temp_counter: 0,
            label_counter: 0,
        }
    }

    pub fn generate(mut self, program: &Program) -> Vec<Instruction> {
        for stmt in &program.statements {
            self.lower_stmt(stmt);
        }
        self.instructions
    }

    fn fresh_temp(&mut self) -> Symbol {
        let name = format!("_t{}", self.temp_counter);
        self.temp_counter += 1;
        self.interner.intern(&name)
    }

    fn fresh_label(&mut self) -> LabelId {
        let id = LabelId(self.label_counter);
        self.label_counter += 1;
        id
    }

    fn emit(&mut self, instr: Instruction) {
        self.instructions.push(instr);
    }

    // -- statements ----------------------------------------------------------

    fn lower_stmt(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::VarDecl { name, initializer, .. } => {
                if let Some(init) = initializer {
                    let value = self.lower_expr(init);
                    self.emit(Instruction::new(Op::Assign).arg1(value).result(Operand::Var(*name)));
                }
            }
            StmtKind::Assignment { name, value } => {
                let value = self.lower_expr(value);
                self.emit(Instruction::new(Op::Assign).arg1(value).result(Operand::Var(*name)));
            }
            StmtKind::ArrayAssignment {
                array_name,
                index,
                value,
            } => {
                let index = self.lower_expr(index);
                let value = self.lower_expr(value);
                self.emit(
                    Instruction::new(Op::ArraySet)
                        .arg1(Operand::Var(*array_name))
                        .arg2(index)
                        .result(value),
                );
            }
            StmtKind::If {
                condition,
                then_block,
                else_block,
            } => self.lower_if(condition, then_block, else_block.as_deref()),
            StmtKind::While { condition, body } => self.lower_while(condition, body),
            StmtKind::For {
                init,
                condition,
                update,
                body,
            } => self.lower_for(init, condition, update, body),
            StmtKind::FunctionDef {
                name,
                parameters,
                body,
                ..
            } => self.lower_function_def(*name, parameters, body),
            StmtKind::Return(value) => {
                let mut instr = Instruction::new(Op::Return);
                if let Some(value) = value {
                    instr = instr.arg1(self.lower_expr(value));
                }
                self.emit(instr);
            }
            StmtKind::Print(args) => {
                for arg in args {
                    let value = self.lower_expr(arg);
                    self.emit(Instruction::new(Op::Print).arg1(value));
                }
            }
            StmtKind::ExprStmt(expr) => {
                self.lower_expr(expr);
            }
        }
    }

    fn lower_block(&mut self, statements: &[Stmt]) {
        for stmt in statements {
            self.lower_stmt(stmt);
        }
    }

    fn lower_if(&mut self, condition: &Expr, then_block: &[Stmt], else_block: Option<&[Stmt]>) {
        let cond = self.lower_expr(condition);
        let else_label = self.fresh_label();
        self.emit(Instruction::new(Op::IfFalse).arg1(cond).result(Operand::Label(else_label)));
        self.lower_block(then_block);

        if let Some(else_block) = else_block {
            let end_label = self.fresh_label();
            self.emit(Instruction::new(Op::Goto).result(Operand::Label(end_label)));
            self.emit(Instruction::new(Op::Label).result(Operand::Label(else_label)));
            self.lower_block(else_block);
            self.emit(Instruction::new(Op::Label).result(Operand::Label(end_label)));
        } else {
            self.emit(Instruction::new(Op::Label).result(Operand::Label(else_label)));
        }
    }

    fn lower_while(&mut self, condition: &Expr, body: &[Stmt]) {
        let start_label = self.fresh_label();
        let end_label = self.fresh_label();

        self.emit(Instruction::new(Op::Label).result(Operand::Label(start_label)));
        let cond = self.lower_expr(condition);
        self.emit(Instruction::new(Op::IfFalse).arg1(cond).result(Operand::Label(end_label)));
        self.lower_block(body);
        self.emit(Instruction::new(Op::Goto).result(Operand::Label(start_label)));
        self.emit(Instruction::new(Op::Label).result(Operand::Label(end_label)));
    }

    fn lower_for(&mut self, init: &Stmt, condition: &Expr, update: &Stmt, body: &[Stmt]) {
        self.lower_stmt(init);
        let start_label = self.fresh_label();
        let end_label = self.fresh_label();

        self.emit(Instruction::new(Op::Label).result(Operand::Label(start_label)));
        let cond = self.lower_expr(condition);
        self.emit(Instruction::new(Op::IfFalse).arg1(cond).result(Operand::Label(end_label)));
        self.lower_block(body);
        self.lower_stmt(update);
        self.emit(Instruction::new(Op::Goto).result(Operand::Label(start_label)));
        self.emit(Instruction::new(Op::Label).result(Operand::Label(end_label)));
    }

    fn lower_function_def(&mut self, name: Symbol, parameters: &[Param], body: &[Stmt]) {
        self.emit(Instruction::new(Op::BeginFunc).arg1(Operand::Func(name)));
        for param in parameters {
            self.emit(Instruction::new(Op::ParamDecl).arg1(Operand::Var(param.name)));
        }
        self.lower_block(body);
        self.emit(Instruction::new(Op::EndFunc).arg1(Operand::Func(name)));
    }

    // -- expressions -----------------------------------------------------------

    fn lower_expr(&mut self, expr: &Expr) -> Operand {
        match &expr.kind {
            ExprKind::Literal(lit) => match lit {
                LiteralValue::Int(v) => Operand::IntConst(*v),
                LiteralValue::Float(v) => Operand::FloatConst(*v),
                LiteralValue::Bool(v) => Operand::BoolConst(*v),
                LiteralValue::String(sym) => Operand::StrConst(*sym),
            },
            ExprKind::Identifier(name) => Operand::Var(*name),
            ExprKind::Binary { op, left, right } => self.lower_binary(*op, left, right),
            ExprKind::Unary { op, operand } => self.lower_unary(*op, operand),
            ExprKind::ArrayLiteral(elements) => self.lower_array_literal(elements),
            ExprKind::ArrayAccess { array, index } => self.lower_array_access(array, index),
            ExprKind::Call { name, arguments } => self.lower_call(*name, arguments),
            ExprKind::BuiltInCall { function, arguments } => self.lower_builtin_call(*function, arguments),
        }
    }

    fn lower_binary(&mut self, op: BinaryOp, left: &Expr, right: &Expr) -> Operand {
        let left = self.lower_expr(left);
        let right = self.lower_expr(right);
        let ir_op = match op {
            BinaryOp::Add => Op::Add,
            BinaryOp::Sub => Op::Sub,
            BinaryOp::Mul => Op::Mul,
            BinaryOp::Div => Op::Div,
            BinaryOp::Mod => Op::Mod,
            BinaryOp::Pow => Op::Pow,
            BinaryOp::Lt => Op::Lt,
            BinaryOp::Gt => Op::Gt,
            BinaryOp::LtEq => Op::LtEq,
            BinaryOp::GtEq => Op::GtEq,
            BinaryOp::Eq => Op::Eq,
            BinaryOp::NotEq => Op::NotEq,
            BinaryOp::And => Op::And,
            BinaryOp::Or => Op::Or,
        };
        let temp = self.fresh_temp();
        self.emit(
            Instruction::new(ir_op)
                .arg1(left)
                .arg2(right)
                .result(Operand::Var(temp)),
        );
        Operand::Var(temp)
    }

    /// Unary negation has no dedicated opcode: `-x` lowers to `0 - x`, the
    /// same promotion rule the `Sub` instruction already applies.
    fn lower_unary(&mut self, op: UnaryOp, operand: &Expr) -> Operand {
        let value = self.lower_expr(operand);
        let temp = self.fresh_temp();
        match op {
            UnaryOp::Neg => {
                self.emit(
                    Instruction::new(Op::Sub)
                        .arg1(Operand::IntConst(0))
                        .arg2(value)
                        .result(Operand::Var(temp)),
                );
            }
            UnaryOp::Not => {
                self.emit(Instruction::new(Op::Not).arg1(value).result(Operand::Var(temp)));
            }
        }
        Operand::Var(temp)
    }

    fn lower_array_literal(&mut self, elements: &[Expr]) -> Operand {
        let temp = self.fresh_temp();
        self.emit(
            Instruction::new(Op::ArrayInit)
                .arg1(Operand::Count(elements.len() as u32))
                .result(Operand::Var(temp)),
        );
        for element in elements {
            let value = self.lower_expr(element);
            self.emit(
                Instruction::new(Op::ArrayAppend)
                    .arg1(Operand::Var(temp))
                    .arg2(value),
            );
        }
        Operand::Var(temp)
    }

    fn lower_array_access(&mut self, array: &Expr, index: &Expr) -> Operand {
        let array = self.lower_expr(array);
        let index = self.lower_expr(index);
        let temp = self.fresh_temp();
        self.emit(
            Instruction::new(Op::ArrayGet)
                .arg1(array)
                .arg2(index)
                .result(Operand::Var(temp)),
        );
        Operand::Var(temp)
    }

    fn lower_call(&mut self, name: Symbol, arguments: &[Expr]) -> Operand {
        for arg in arguments {
            let value = self.lower_expr(arg);
            self.emit(Instruction::new(Op::Param).arg1(value));
        }
        let temp = self.fresh_temp();
        self.emit(
            Instruction::new(Op::Call)
                .arg1(Operand::Func(name))
                .arg2(Operand::Count(arguments.len() as u32))
                .result(Operand::Var(temp)),
        );
        Operand::Var(temp)
    }

    fn lower_builtin_call(&mut self, function: BuiltIn, arguments: &[Expr]) -> Operand {
        for arg in arguments {
            let value = self.lower_expr(arg);
            self.emit(Instruction::new(Op::Param).arg1(value));
        }
        let op = match function {
            BuiltIn::Len => Op::BuiltinLen,
            BuiltIn::Random => Op::BuiltinRandom,
            BuiltIn::Substr => Op::BuiltinSubstr,
            BuiltIn::Concat => Op::BuiltinConcat,
            BuiltIn::Input => Op::BuiltinInput,
        };
        let temp = self.fresh_temp();
        self.emit(
            Instruction::new(op)
                .arg2(Operand::Count(arguments.len() as u32))
                .result(Operand::Var(temp)),
        );
        Operand::Var(temp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generate(src: &str) -> (Vec<Instruction>, Interner) {
        let mut interner = Interner::new();
        let handler = mlc_util::Handler::new();
        let tokens = {
            let mut lexer = mlc_lex::Lexer::new(src, &mut interner, &handler);
            lexer.tokenize()
        };
        let program = mlc_par::Parser::new(tokens, &handler)
            .parse_program()
            .expect("parses cleanly");
        let instructions = IrGenerator::new(&mut interner).generate(&program);
        (instructions, interner)
    }

    #[test]
    fn var_decl_lowers_to_a_single_assign() {
        let (instrs, _) = generate("int x = 5;");
        assert_eq!(instrs.len(), 1);
        assert_eq!(instrs[0].op, Op::Assign);
    }

    #[test]
    fn binary_expression_lowers_to_one_temp() {
        let (instrs, _) = generate("int x = 1 + 2;");
        assert_eq!(instrs[0].op, Op::Add);
        assert_eq!(instrs[1].op, Op::Assign);
    }

    #[test]
    fn if_without_else_emits_single_label() {
        let (instrs, _) = generate("if (true) { print(1); }");
        let labels = instrs.iter().filter(|i| i.op == Op::Label).count();
        assert_eq!(labels, 1);
    }

    #[test]
    fn if_with_else_emits_two_labels_and_a_goto() {
        let (instrs, _) = generate("if (true) { print(1); } else { print(2); }");
        let labels = instrs.iter().filter(|i| i.op == Op::Label).count();
        let gotos = instrs.iter().filter(|i| i.op == Op::Goto).count();
        assert_eq!(labels, 2);
        assert_eq!(gotos, 1);
    }

    #[test]
    fn while_loop_has_matching_start_and_end_labels() {
        let (instrs, _) = generate("while (true) { print(1); }");
        assert_eq!(instrs[0].op, Op::Label);
        assert_eq!(instrs.last().unwrap().op, Op::Label);
    }

    #[test]
    fn function_def_brackets_body_in_begin_end() {
        let (instrs, _) = generate("function int f() { return 1; }");
        assert_eq!(instrs[0].op, Op::BeginFunc);
        assert_eq!(instrs.last().unwrap().op, Op::EndFunc);
    }

    #[test]
    fn call_emits_params_then_call() {
        let (instrs, _) = generate("function int f(int a) { return a; } int x = f(1);");
        let call_pos = instrs.iter().position(|i| i.op == Op::Call).unwrap();
        assert_eq!(instrs[call_pos - 1].op, Op::Param);
    }
}
