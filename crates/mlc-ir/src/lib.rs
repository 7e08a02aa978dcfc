//! mlc-ir - Intermediate Representation: generator and optimizer.
//!
//! Lowers the parser's AST into a flat three-address instruction list
//! (`{op, arg1, arg2, result}`), then optionally runs it through a fixed
//! three-pass optimizer: constant folding, copy propagation, dead-code
//! elimination.

pub mod gen;
pub mod instr;
pub mod optimize;
pub mod print;

pub use gen::IrGenerator;
pub use instr::{Instruction, LabelId, Op, Operand};
pub use optimize::optimize;
pub use print::format_program;
