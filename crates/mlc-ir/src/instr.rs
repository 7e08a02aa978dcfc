//! The flat three-address instruction set produced by [`crate::gen`] and
//! consumed by [`crate::optimize`] and the interpreter crate.
//!
//! Each [`Instruction`] has exactly the shape `{op, arg1, arg2, result}`.
//! Unlike the reference implementation this IR is lowered from, operands
//! are a typed enum rather than strings that are re-parsed on every VM
//! step - a constant's kind and a variable's name are distinguished at
//! generation time, once, instead of being sniffed out of text later.

use mlc_util::Symbol;

/// One operand slot: a constant, a variable reference, a jump target, a
/// function name, or a plain count (array sizes, call argument counts).
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Operand {
    IntConst(i64),
    FloatConst(f64),
    BoolConst(bool),
    StrConst(Symbol),
    Var(Symbol),
    Func(Symbol),
    Label(LabelId),
    Count(u32),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LabelId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Op {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    Lt,
    Gt,
    LtEq,
    GtEq,
    Eq,
    NotEq,
    And,
    Or,
    Not,
    Assign,
    Param,
    ParamDecl,
    Call,
    Return,
    Label,
    Goto,
    IfFalse,
    IfTrue,
    BeginFunc,
    EndFunc,
    ArrayInit,
    ArrayAppend,
    ArrayGet,
    ArraySet,
    Print,
    BuiltinLen,
    BuiltinRandom,
    BuiltinSubstr,
    BuiltinConcat,
    BuiltinInput,
}

impl Op {
    pub fn is_binary_arithmetic(self) -> bool {
        matches!(
            self,
            Op::Add | Op::Sub | Op::Mul | Op::Div | Op::Mod | Op::Pow
        )
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            Op::Lt | Op::Gt | Op::LtEq | Op::GtEq | Op::Eq | Op::NotEq
        )
    }

    pub fn is_logical(self) -> bool {
        matches!(self, Op::And | Op::Or)
    }
}

/// A single three-address instruction.
#[derive(Clone, Debug, PartialEq)]
pub struct Instruction {
    pub op: Op,
    pub arg1: Option<Operand>,
    pub arg2: Option<Operand>,
    pub result: Option<Operand>,
}

impl Instruction {
    pub fn new(op: Op) -> Self {
        Self {
            op,
            arg1: None,
            arg2: None,
            result: None,
        }
    }

    pub fn arg1(mut self, operand: Operand) -> Self {
        self.arg1 = Some(operand);
        self
    }

    pub fn arg2(mut self, operand: Operand) -> Self {
        self.arg2 = Some(operand);
        self
    }

    pub fn result(mut self, operand: Operand) -> Self {
        self.result = Some(operand);
        self
    }
}
