//! mlc-par - Parser (Syntactic Analyzer) for MiniLang.
//!
//! Recursive-descent parser that turns a token stream from `mlc-lex` into
//! the AST defined in [`ast`]. Expressions are parsed through an explicit
//! precedence ladder (see [`parser`]) rather than a Pratt/binding-power
//! table, matching the named precedence levels MiniLang's grammar spells
//! out one by one.

pub mod ast;
pub mod parser;

pub use ast::*;
pub use parser::Parser;
