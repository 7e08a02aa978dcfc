//! A single call frame.

use mlc_util::Symbol;
use rustc_hash::FxHashMap;

use crate::value::Value;

pub struct Frame {
    /// Instruction index to resume at once this call returns.
    pub return_pc: usize,
    /// The caller's variable bindings, swapped back in on return.
    pub saved_variables: FxHashMap<Symbol, Value>,
    /// Argument values in declaration order, consumed one per `param_decl`.
    pub params: Vec<Value>,
    pub next_param_index: usize,
    /// Where to store the callee's return value in the caller's scope.
    pub result_var: Option<Symbol>,
}
