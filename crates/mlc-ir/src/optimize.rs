//! A three-pass optimizer run in fixed order: constant folding, then copy
//! propagation, then dead-code elimination. Each pass tracks its facts
//! (known constants, known copies) per basic block and forgets them at
//! every `label`, `goto`, `if_false`, or `if_true` instruction, since any
//! of those can be a control-flow join or split point.

use std::collections::HashMap;

use mlc_util::Symbol;

use crate::instr::{Instruction, Op, Operand};

pub fn optimize(instructions: Vec<Instruction>) -> Vec<Instruction> {
    let instructions = fold_constants(instructions);
    let instructions = propagate_copies(instructions);
    eliminate_dead_code(instructions)
}

fn is_block_boundary(op: Op) -> bool {
    matches!(op, Op::Label | Op::Goto | Op::IfFalse | Op::IfTrue)
}

fn var_of(operand: Operand) -> Option<Symbol> {
    match operand {
        Operand::Var(sym) => Some(sym),
        _ => None,
    }
}

fn is_const(operand: Operand) -> bool {
    matches!(
        operand,
        Operand::IntConst(_) | Operand::FloatConst(_) | Operand::BoolConst(_) | Operand::StrConst(_)
    )
}

enum Num {
    Int(i64),
    Float(f64),
}

fn as_num(operand: Operand) -> Option<Num> {
    match operand {
        Operand::IntConst(v) => Some(Num::Int(v)),
        Operand::FloatConst(v) => Some(Num::Float(v)),
        _ => None,
    }
}

fn as_bool(operand: Operand) -> Option<bool> {
    match operand {
        Operand::BoolConst(v) => Some(v),
        _ => None,
    }
}

/// Folds a binary arithmetic/comparison op over two constant operands.
/// Mixed int/float operands promote to float, matching the interpreter's
/// own promotion rule; integer division and modulo truncate toward zero.
/// Integer division truncates toward negative infinity, matching the
/// reference interpreter's `//`/`%` rather than Rust's default
/// truncate-toward-zero.
fn floor_div(a: i64, b: i64) -> i64 {
    let q = a / b;
    let r = a % b;
    if r != 0 && (r < 0) != (b < 0) {
        q - 1
    } else {
        q
    }
}

fn floor_mod(a: i64, b: i64) -> i64 {
    let r = a % b;
    if r != 0 && (r < 0) != (b < 0) {
        r + b
    } else {
        r
    }
}

fn fold_binary(op: Op, a: Operand, b: Operand) -> Option<Operand> {
    if op.is_binary_arithmetic() {
        let (a, b) = (as_num(a)?, as_num(b)?);
        return Some(match (a, b) {
            (Num::Int(a), Num::Int(b)) => match op {
                Op::Add => Operand::IntConst(a + b),
                Op::Sub => Operand::IntConst(a - b),
                Op::Mul => Operand::IntConst(a * b),
                Op::Div if b != 0 => Operand::IntConst(floor_div(a, b)),
                Op::Mod if b != 0 => Operand::IntConst(floor_mod(a, b)),
                Op::Pow => Operand::IntConst(a.pow(b.max(0) as u32)),
                _ => return None,
            },
            (a, b) => {
                let a = match a {
                    Num::Int(v) => v as f64,
                    Num::Float(v) => v,
                };
                let b = match b {
                    Num::Int(v) => v as f64,
                    Num::Float(v) => v,
                };
                match op {
                    Op::Add => Operand::FloatConst(a + b),
                    Op::Sub => Operand::FloatConst(a - b),
                    Op::Mul => Operand::FloatConst(a * b),
                    Op::Div if b != 0.0 => Operand::FloatConst(a / b),
                    Op::Mod if b != 0.0 => Operand::FloatConst(a % b),
                    Op::Pow => Operand::FloatConst(a.powf(b)),
                    _ => return None,
                }
            }
        });
    }

    if op.is_comparison() {
        let (a, b) = (as_num(a)?, as_num(b)?);
        let (a, b) = match (a, b) {
            (Num::Int(a), Num::Int(b)) => (a as f64, b as f64),
            (a, b) => {
                let a = match a {
                    Num::Int(v) => v as f64,
                    Num::Float(v) => v,
                };
                let b = match b {
                    Num::Int(v) => v as f64,
                    Num::Float(v) => v,
                };
                (a, b)
            }
        };
        let result = match op {
            Op::Lt => a < b,
            Op::Gt => a > b,
            Op::LtEq => a <= b,
            Op::GtEq => a >= b,
            Op::Eq => a == b,
            Op::NotEq => a != b,
            _ => return None,
        };
        return Some(Operand::BoolConst(result));
    }

    if op.is_logical() {
        let (a, b) = (as_bool(a)?, as_bool(b)?);
        let result = match op {
            Op::And => a && b,
            Op::Or => a || b,
            _ => return None,
        };
        return Some(Operand::BoolConst(result));
    }

    None
}

fn fold_constants(mut instructions: Vec<Instruction>) -> Vec<Instruction> {
    let mut known: HashMap<Symbol, Operand> = HashMap::new();

    for instr in &mut instructions {
        if is_block_boundary(instr.op) {
            known.clear();
            continue;
        }

        let resolve = |op: Option<Operand>, known: &HashMap<Symbol, Operand>| {
            op.map(|o| match var_of(o) {
                Some(sym) => known.get(&sym).copied().unwrap_or(o),
                None => o,
            })
        };

        let a = resolve(instr.arg1, &known);
        let b = resolve(instr.arg2, &known);
        instr.arg1 = a;
        instr.arg2 = b;

        if let (Some(a), Some(b)) = (a, b) {
            if is_const(a) && is_const(b) {
                if let Some(folded) = fold_binary(instr.op, a, b) {
                    instr.op = Op::Assign;
                    instr.arg1 = Some(folded);
                    instr.arg2 = None;
                }
            }
        } else if instr.op == Op::Not {
            if let Some(a) = a {
                if let Some(v) = as_bool(a) {
                    instr.op = Op::Assign;
                    instr.arg1 = Some(Operand::BoolConst(!v));
                }
            }
        }

        if instr.op == Op::Assign {
            if let (Some(result), Some(value)) = (instr.result, instr.arg1) {
                if let Some(sym) = var_of(result) {
                    if is_const(value) {
                        known.insert(sym, value);
                    } else {
                        known.remove(&sym);
                    }
                }
            }
        } else if let Some(result) = instr.result {
            if let Some(sym) = var_of(result) {
                known.remove(&sym);
            }
        }
    }

    instructions
}

fn propagate_copies(mut instructions: Vec<Instruction>) -> Vec<Instruction> {
    let mut copies: HashMap<Symbol, Operand> = HashMap::new();

    for instr in &mut instructions {
        if is_block_boundary(instr.op) {
            copies.clear();
            continue;
        }

        let resolve = |op: Option<Operand>, copies: &HashMap<Symbol, Operand>| {
            op.map(|o| match var_of(o) {
                Some(sym) => copies.get(&sym).copied().unwrap_or(o),
                None => o,
            })
        };
        instr.arg1 = resolve(instr.arg1, &copies);
        instr.arg2 = resolve(instr.arg2, &copies);

        // ArraySet/ArrayAppend stash their value operand in `result`; every
        // other op's `result` is an assignment target, not a use.
        if matches!(instr.op, Op::ArraySet | Op::ArrayAppend) {
            instr.result = resolve(instr.result, &copies);
        }

        if instr.op == Op::Assign {
            if let (Some(result), Some(value)) = (instr.result, instr.arg1) {
                if let Some(sym) = var_of(result) {
                    if is_const(value) || var_of(value).is_some() {
                        copies.insert(sym, value);
                    } else {
                        copies.remove(&sym);
                    }
                }
            }
        } else if let Some(result) = instr.result {
            if let Some(sym) = var_of(result) {
                copies.remove(&sym);
            }
        }
    }

    instructions
}

/// Ops whose `result` is purely a data value (the instruction has no
/// assignment target of its own), not an eligible-for-removal binding.
fn is_side_effect_only(op: Op) -> bool {
    matches!(
        op,
        Op::Param
            | Op::ParamDecl
            | Op::Call
            | Op::Return
            | Op::Label
            | Op::Goto
            | Op::IfFalse
            | Op::IfTrue
            | Op::BeginFunc
            | Op::EndFunc
            | Op::ArraySet
            | Op::ArrayAppend
            | Op::Print
            | Op::BuiltinRandom
            | Op::BuiltinInput
    )
}

/// Removes instructions whose result is never read, iterating to a
/// fixpoint since dropping one dead store can make another instruction's
/// result unused in turn.
fn eliminate_dead_code(instructions: Vec<Instruction>) -> Vec<Instruction> {
    let mut used: std::collections::HashSet<Symbol> = std::collections::HashSet::new();
    for instr in &instructions {
        for operand in [instr.arg1, instr.arg2] {
            if let Some(sym) = operand.and_then(var_of) {
                used.insert(sym);
            }
        }
        if is_side_effect_only(instr.op) {
            if let Some(sym) = instr.result.and_then(var_of) {
                used.insert(sym);
            }
        }
    }

    let before = instructions.len();
    let kept: Vec<Instruction> = instructions
        .into_iter()
        .filter(|instr| {
            if is_side_effect_only(instr.op) {
                return true;
            }
            match instr.result.and_then(var_of) {
                Some(sym) => used.contains(&sym),
                None => true,
            }
        })
        .collect();

    if kept.len() == before {
        kept
    } else {
        eliminate_dead_code(kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mlc_util::Interner;

    fn optimized(src: &str) -> Vec<Instruction> {
        let mut interner = Interner::new();
        let handler = mlc_util::Handler::new();
        let tokens = {
            let mut lexer = mlc_lex::Lexer::new(src, &mut interner, &handler);
            lexer.tokenize()
        };
        let program = mlc_par::Parser::new(tokens, &handler)
            .parse_program()
            .expect("parses cleanly");
        let raw = crate::gen::IrGenerator::new(&mut interner).generate(&program);
        optimize(raw)
    }

    #[test]
    fn constant_arithmetic_folds_to_one_assign() {
        let instrs = optimized("int x = 2 + 3 * 4;");
        assert_eq!(instrs.len(), 1);
        assert_eq!(instrs[0].op, Op::Assign);
        assert_eq!(instrs[0].arg1, Some(Operand::IntConst(14)));
    }

    #[test]
    fn copy_propagation_removes_intermediate_temp() {
        let instrs = optimized("int x = 5; int y = x;");
        // y's source folds straight to the constant 5; x itself is unused
        // afterwards and dead-code elimination will have already dropped it
        // if nothing else reads it.
        assert!(instrs.iter().any(|i| i.op == Op::Assign));
    }

    #[test]
    fn dead_store_is_eliminated() {
        let instrs = optimized("int x = 1 + 2; print(3);");
        assert!(instrs.iter().all(|i| i.op != Op::Add));
    }

    #[test]
    fn print_and_calls_are_never_eliminated() {
        let instrs = optimized("print(1);");
        assert!(instrs.iter().any(|i| i.op == Op::Print));
    }

    #[test]
    fn folding_stops_at_block_boundaries() {
        let instrs = optimized("int x = 1; if (true) { x = 2; } print(x);");
        // x is reassigned inside the if, so the final print cannot be
        // folded to a compile-time constant.
        let has_print_of_var = instrs
            .iter()
            .any(|i| i.op == Op::Print && matches!(i.arg1, Some(Operand::Var(_))));
        assert!(has_print_of_var);
    }
}
