//! Renders a generated instruction list back into readable IR text, the
//! format the driver's `--verbose` flag prints.

use std::fmt::Write as _;

use mlc_util::Interner;

use crate::instr::{Instruction, Op, Operand};

fn render_operand(operand: Operand, interner: &Interner) -> String {
    match operand {
        Operand::IntConst(v) => v.to_string(),
        Operand::FloatConst(v) => v.to_string(),
        Operand::BoolConst(v) => v.to_string(),
        Operand::StrConst(sym) => format!("\"{}\"", interner.resolve(sym)),
        Operand::Var(sym) => interner.resolve(sym).to_string(),
        Operand::Func(sym) => interner.resolve(sym).to_string(),
        Operand::Label(id) => format!("L{}", id.0),
        Operand::Count(n) => n.to_string(),
    }
}

fn op_symbol(op: Op) -> &'static str {
    match op {
        Op::Add => "+",
        Op::Sub => "-",
        Op::Mul => "*",
        Op::Div => "/",
        Op::Mod => "%",
        Op::Pow => "**",
        Op::Lt => "<",
        Op::Gt => ">",
        Op::LtEq => "<=",
        Op::GtEq => ">=",
        Op::Eq => "==",
        Op::NotEq => "!=",
        Op::And => "and",
        Op::Or => "or",
        _ => "",
    }
}

fn render_line(instr: &Instruction, interner: &Interner) -> String {
    let operand = |o: Option<Operand>| o.map(|o| render_operand(o, interner)).unwrap_or_default();

    match instr.op {
        Op::Add | Op::Sub | Op::Mul | Op::Div | Op::Mod | Op::Pow | Op::Lt | Op::Gt | Op::LtEq
        | Op::GtEq | Op::Eq | Op::NotEq | Op::And | Op::Or => format!(
            "{} = {} {} {}",
            operand(instr.result),
            operand(instr.arg1),
            op_symbol(instr.op),
            operand(instr.arg2)
        ),
        Op::Not => format!("{} = not {}", operand(instr.result), operand(instr.arg1)),
        Op::Assign => format!("{} = {}", operand(instr.result), operand(instr.arg1)),
        Op::Label => format!("{}:", operand(instr.result)),
        Op::Goto => format!("goto {}", operand(instr.result)),
        Op::IfFalse => format!("if_false {} goto {}", operand(instr.arg1), operand(instr.result)),
        Op::IfTrue => format!("if_true {} goto {}", operand(instr.arg1), operand(instr.result)),
        Op::Param => format!("param {}", operand(instr.arg1)),
        Op::ParamDecl => format!("param_decl {}", operand(instr.arg1)),
        Op::Call => match instr.result {
            Some(_) => format!(
                "{} = call {}, {}",
                operand(instr.result),
                operand(instr.arg1),
                operand(instr.arg2)
            ),
            None => format!("call {}, {}", operand(instr.arg1), operand(instr.arg2)),
        },
        Op::Return => match instr.arg1 {
            Some(_) => format!("return {}", operand(instr.arg1)),
            None => "return".to_string(),
        },
        Op::Print => format!("print {}", operand(instr.arg1)),
        Op::BeginFunc => format!("begin_func {}", operand(instr.arg1)),
        Op::EndFunc => format!("end_func {}", operand(instr.arg1)),
        Op::ArrayInit => format!("{} = array_init {}", operand(instr.result), operand(instr.arg1)),
        Op::ArrayAppend => format!("array_append {}, {}", operand(instr.arg1), operand(instr.arg2)),
        Op::ArrayGet => format!(
            "{} = array_get {}, {}",
            operand(instr.result),
            operand(instr.arg1),
            operand(instr.arg2)
        ),
        Op::ArraySet => format!(
            "array_set {}, {}, {}",
            operand(instr.arg1),
            operand(instr.arg2),
            operand(instr.result)
        ),
        Op::BuiltinLen => format!("{} = builtin_len {}", operand(instr.result), operand(instr.arg2)),
        Op::BuiltinRandom => format!("{} = builtin_random {}", operand(instr.result), operand(instr.arg2)),
        Op::BuiltinSubstr => format!("{} = builtin_substr {}", operand(instr.result), operand(instr.arg2)),
        Op::BuiltinConcat => format!("{} = builtin_concat {}", operand(instr.result), operand(instr.arg2)),
        Op::BuiltinInput => format!("{} = builtin_input {}", operand(instr.result), operand(instr.arg2)),
        _ => unreachable!("every Op variant is handled above"),
    }
}

/// Produces a numbered listing, one instruction per line, `NNN: ` prefixed.
pub fn format_program(instructions: &[Instruction], interner: &Interner) -> String {
    let mut out = String::new();
    for (i, instr) in instructions.iter().enumerate() {
        let _ = writeln!(out, "{:03}: {}", i, render_line(instr, interner));
    }
    out
}
