//! The tree-walking-free, pc-driven interpreter for the flat IR produced
//! by `mlc-ir`.

use std::cell::RefCell;
use std::io::{BufRead, Write};
use std::rc::Rc;

use rand::Rng;
use rustc_hash::FxHashMap;

use mlc_ir::{Instruction, LabelId, Op, Operand};
use mlc_util::{Interner, Symbol};

use crate::error::RuntimeError;
use crate::frame::Frame;
use crate::value::Value;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VmState {
    Running,
    Halted,
    Errored,
}

struct FunctionInfo {
    /// Index of the first instruction *after* `begin_func` - the call
    /// target, so `begin_func` itself is never re-executed on entry.
    start_pc: usize,
    /// Index of the matching `end_func`, used to skip the body when
    /// control falls into it at the top level instead of through `call`.
    end_pc: usize,
}

pub struct Vm<'a, R, W> {
    instructions: &'a [Instruction],
    interner: &'a Interner,
    variables: FxHashMap<Symbol, Value>,
    call_stack: Vec<Frame>,
    pending_args: Vec<Value>,
    functions: FxHashMap<Symbol, FunctionInfo>,
    labels: FxHashMap<LabelId, usize>,
    pc: usize,
    state: VmState,
    input: R,
    output: W,
}

impl<'a, R: BufRead, W: Write> Vm<'a, R, W> {
    pub fn new(instructions: &'a [Instruction], interner: &'a Interner, input: R, output: W) -> Self {
        let mut functions = FxHashMap::default();
        let mut labels = FxHashMap::default();

        for (i, instr) in instructions.iter().enumerate() {
            match (instr.op, instr.arg1, instr.result) {
                (Op::BeginFunc, Some(Operand::Func(name)), _) => {
                    functions.insert(
                        name,
                        FunctionInfo {
                            start_pc: i + 1,
                            end_pc: 0,
                        },
                    );
                }
                (Op::EndFunc, Some(Operand::Func(name)), _) => {
                    if let Some(info) = functions.get_mut(&name) {
                        info.end_pc = i;
                    }
                }
                (Op::Label, _, Some(Operand::Label(id))) => {
                    labels.insert(id, i);
                }
                _ => {}
            }
        }

        Self {
            instructions,
            interner,
            variables: FxHashMap::default(),
            call_stack: Vec::new(),
            pending_args: Vec::new(),
            functions,
            labels,
            pc: 0,
            state: VmState::Running,
            input,
            output,
        }
    }

    pub fn state(&self) -> VmState {
        self.state
    }

    pub fn variables(&self) -> &FxHashMap<Symbol, Value> {
        &self.variables
    }

    /// Runs to completion or until a runtime error is raised.
    pub fn run(&mut self) -> Result<(), RuntimeError> {
        while self.pc < self.instructions.len() && self.state == VmState::Running {
            self.step()?;
        }
        if self.state == VmState::Running {
            self.state = VmState::Halted;
        }
        Ok(())
    }

    fn step(&mut self) -> Result<(), RuntimeError> {
        let instr = &self.instructions[self.pc];
        let mut next_pc = self.pc + 1;

        match instr.op {
            Op::Add | Op::Sub | Op::Mul | Op::Div | Op::Mod | Op::Pow => {
                self.exec_arithmetic(instr, instr.op)?
            }
            Op::Lt | Op::Gt | Op::LtEq | Op::GtEq | Op::Eq | Op::NotEq => {
                self.exec_comparison(instr, instr.op)
            }
            Op::And | Op::Or => self.exec_logical(instr, instr.op),
            Op::Not => {
                let v = self.eval(instr.arg1).as_bool().expect("bool operand");
                self.store(instr.result, Value::Bool(!v));
            }
            Op::Assign => {
                let v = self.eval(instr.arg1);
                self.store(instr.result, v);
            }
            Op::Param => {
                let v = self.eval(instr.arg1);
                self.pending_args.push(v);
            }
            Op::ParamDecl => {
                let name = var_symbol(instr.arg1);
                let frame = self.call_stack.last_mut().expect("param_decl inside a call");
                let value = frame.params[frame.next_param_index].clone();
                frame.next_param_index += 1;
                self.variables.insert(name, value);
            }
            Op::Call => {
                next_pc = self.exec_call(instr)?;
            }
            Op::Return => {
                next_pc = self.exec_return(instr);
            }
            Op::Label => {}
            Op::Goto => {
                next_pc = self.label_target(instr.result);
            }
            Op::IfFalse => {
                let cond = self.eval(instr.arg1).as_bool().expect("bool condition");
                if !cond {
                    next_pc = self.label_target(instr.result);
                }
            }
            Op::IfTrue => {
                let cond = self.eval(instr.arg1).as_bool().expect("bool condition");
                if cond {
                    next_pc = self.label_target(instr.result);
                }
            }
            Op::BeginFunc => {
                let name = func_symbol(instr.arg1);
                next_pc = self.functions[&name].end_pc + 1;
            }
            Op::EndFunc => {
                if !self.call_stack.is_empty() {
                    next_pc = self.pop_frame(None);
                }
            }
            Op::ArrayInit => {
                self.store(instr.result, Value::Array(Rc::new(RefCell::new(Vec::new()))));
            }
            Op::ArrayAppend => {
                let array = self.eval(instr.arg1);
                let value = self.eval(instr.arg2);
                array.as_array().expect("array operand").borrow_mut().push(value);
            }
            Op::ArrayGet => {
                let array = self.eval(instr.arg1);
                let index = self.eval(instr.arg2).as_i64().expect("int index");
                let elements = array.as_array().expect("array operand").borrow();
                let value = elements
                    .get(index as usize)
                    .cloned()
                    .ok_or(RuntimeError::IndexOutOfBounds { index })?;
                drop(elements);
                self.store(instr.result, value);
            }
            Op::ArraySet => {
                let array = self.eval(instr.arg1);
                let index = self.eval(instr.arg2).as_i64().expect("int index");
                let value = self.eval(instr.result);
                let cell = array.as_array().expect("array operand");
                let mut elements = cell.borrow_mut();
                let slot = elements
                    .get_mut(index as usize)
                    .ok_or(RuntimeError::IndexOutOfBounds { index })?;
                *slot = value;
            }
            Op::Print => {
                let value = self.eval(instr.arg1);
                let _ = write!(self.output, "{} ", value);
            }
            Op::BuiltinLen => {
                let args = self.take_args(instr);
                let len = args[0].as_array().expect("array argument").borrow().len();
                self.store(instr.result, Value::Int(len as i64));
            }
            Op::BuiltinRandom => {
                let args = self.take_args(instr);
                let lo = args[0].as_i64().expect("int argument");
                let hi = args[1].as_i64().expect("int argument");
                let value = rand::thread_rng().gen_range(lo..=hi);
                self.store(instr.result, Value::Int(value));
            }
            Op::BuiltinSubstr => {
                let args = self.take_args(instr);
                let s = args[0].as_str().expect("string argument");
                let start = args[1].as_i64().expect("int argument") as usize;
                let len = args[2].as_i64().expect("int argument") as usize;
                let substring: String = s.chars().skip(start).take(len).collect();
                self.store(instr.result, Value::Str(substring.into()));
            }
            Op::BuiltinConcat => {
                let args = self.take_args(instr);
                let a = args[0].as_str().expect("string argument");
                let b = args[1].as_str().expect("string argument");
                self.store(instr.result, Value::Str(format!("{}{}", a, b).into()));
            }
            Op::BuiltinInput => {
                let _ = self.take_args(instr);
                let mut line = String::new();
                let _ = self.input.read_line(&mut line);
                let trimmed = line.trim_end_matches(['\n', '\r']).to_string();
                self.store(instr.result, Value::Str(trimmed.into()));
            }
        }

        self.pc = next_pc;
        Ok(())
    }

    fn take_args(&mut self, instr: &Instruction) -> Vec<Value> {
        let count = match instr.arg2 {
            Some(Operand::Count(n)) => n as usize,
            _ => 0,
        };
        let at = self.pending_args.len() - count;
        self.pending_args.split_off(at)
    }

    fn exec_call(&mut self, instr: &Instruction) -> Result<usize, RuntimeError> {
        let name = func_symbol(instr.arg1);
        let args = self.take_args(instr);
        let info = self
            .functions
            .get(&name)
            .ok_or_else(|| RuntimeError::UndefinedFunction(self.interner.resolve(name).to_string()))?;

        let frame = Frame {
            return_pc: self.pc + 1,
            saved_variables: std::mem::take(&mut self.variables),
            params: args,
            next_param_index: 0,
            result_var: instr.result.map(|op| var_symbol(Some(op))),
        };
        let start_pc = info.start_pc;
        self.call_stack.push(frame);
        Ok(start_pc)
    }

    fn exec_return(&mut self, instr: &Instruction) -> usize {
        let value = instr.arg1.map(|operand| self.eval(Some(operand)));
        self.pop_frame(value)
    }

    fn pop_frame(&mut self, value: Option<Value>) -> usize {
        match self.call_stack.pop() {
            Some(frame) => {
                self.variables = frame.saved_variables;
                if let (Some(result_var), Some(value)) = (frame.result_var, value) {
                    self.variables.insert(result_var, value);
                }
                frame.return_pc
            }
            None => {
                self.state = VmState::Halted;
                self.instructions.len()
            }
        }
    }

    fn label_target(&self, operand: Option<Operand>) -> usize {
        match operand {
            Some(Operand::Label(id)) => self.labels[&id],
            _ => unreachable!("jump target must be a label"),
        }
    }

    fn store(&mut self, result: Option<Operand>, value: Value) {
        self.variables.insert(var_symbol(result), value);
    }

    fn eval(&mut self, operand: Option<Operand>) -> Value {
        match operand.expect("operand present") {
            Operand::IntConst(v) => Value::Int(v),
            Operand::FloatConst(v) => Value::Float(v),
            Operand::BoolConst(v) => Value::Bool(v),
            Operand::StrConst(sym) => Value::Str(self.interner.resolve(sym).into()),
            Operand::Var(sym) => self
                .variables
                .get(&sym)
                .cloned()
                .unwrap_or_else(|| panic!("undefined variable '{}'", self.interner.resolve(sym))),
            Operand::Func(_) | Operand::Label(_) | Operand::Count(_) => {
                unreachable!("not a value operand")
            }
        }
    }

    fn exec_arithmetic(&mut self, instr: &Instruction, op: Op) -> Result<(), RuntimeError> {
        let a = self.eval(instr.arg1);
        let b = self.eval(instr.arg2);

        let result = match (&a, &b) {
            (Value::Int(x), Value::Int(y)) => match op {
                Op::Add => Value::Int(x + y),
                Op::Sub => Value::Int(x - y),
                Op::Mul => Value::Int(x * y),
                Op::Div => {
                    if *y == 0 {
                        return Err(RuntimeError::DivisionByZero);
                    }
                    Value::Int(floor_div(*x, *y))
                }
                Op::Mod => {
                    if *y == 0 {
                        return Err(RuntimeError::ModuloByZero);
                    }
                    Value::Int(floor_mod(*x, *y))
                }
                Op::Pow => Value::Int(x.pow((*y).max(0) as u32)),
                _ => unreachable!(),
            },
            _ => {
                let x = a.as_f64().expect("numeric operand");
                let y = b.as_f64().expect("numeric operand");
                match op {
                    Op::Add => Value::Float(x + y),
                    Op::Sub => Value::Float(x - y),
                    Op::Mul => Value::Float(x * y),
                    Op::Div => {
                        if y == 0.0 {
                            return Err(RuntimeError::DivisionByZero);
                        }
                        Value::Float(x / y)
                    }
                    Op::Mod => {
                        if y == 0.0 {
                            return Err(RuntimeError::ModuloByZero);
                        }
                        Value::Float(x % y)
                    }
                    Op::Pow => Value::Float(x.powf(y)),
                    _ => unreachable!(),
                }
            }
        };
        self.store(instr.result, result);
        Ok(())
    }

    fn exec_comparison(&mut self, instr: &Instruction, op: Op) {
        let a = self.eval(instr.arg1);
        let b = self.eval(instr.arg2);
        let result = if let (Some(x), Some(y)) = (a.as_f64(), b.as_f64()) {
            match op {
                Op::Lt => x < y,
                Op::Gt => x > y,
                Op::LtEq => x <= y,
                Op::GtEq => x >= y,
                Op::Eq => x == y,
                Op::NotEq => x != y,
                _ => unreachable!(),
            }
        } else {
            // Non-numeric equality (bool/string) compares by display form,
            // which is exact for these value kinds.
            let eq = a.to_string() == b.to_string();
            match op {
                Op::Eq => eq,
                Op::NotEq => !eq,
                _ => unreachable!("only == and != apply to non-numeric operands"),
            }
        };
        self.store(instr.result, Value::Bool(result));
    }

    fn exec_logical(&mut self, instr: &Instruction, op: Op) {
        let a = self.eval(instr.arg1).as_bool().expect("bool operand");
        let b = self.eval(instr.arg2).as_bool().expect("bool operand");
        let result = match op {
            Op::And => a && b,
            Op::Or => a || b,
            _ => unreachable!(),
        };
        self.store(instr.result, Value::Bool(result));
    }
}

fn var_symbol(operand: Option<Operand>) -> Symbol {
    match operand {
        Some(Operand::Var(sym)) => sym,
        _ => unreachable!("expected a variable operand"),
    }
}

fn func_symbol(operand: Option<Operand>) -> Symbol {
    match operand {
        Some(Operand::Func(sym)) => sym,
        _ => unreachable!("expected a function-name operand"),
    }
}

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
