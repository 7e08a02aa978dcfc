//! Errors the interpreter can raise while executing a program.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuntimeError {
    #[error("Division by zero")]
    DivisionByZero,

    #[error("Modulo by zero")]
    ModuloByZero,

    #[error("Array index out of bounds: {index}")]
    IndexOutOfBounds { index: i64 },

    #[error("Undefined function: {0}")]
    UndefinedFunction(String),

    #[error("Undefined variable: {0}")]
    UndefinedVariable(String),
}
