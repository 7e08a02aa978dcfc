//! mlc-lex - Lexical Analyzer for MiniLang.
//!
//! Transforms MiniLang source text into a stream of tokens: type keywords
//! (`int`, `float`, `bool`, `string`), control keywords (`if`, `else`,
//! `while`, `for`, `return`, `print`, `function`, `input`), built-in names
//! (`len`, `random`, `substr`, `concat`), logical keywords (`and`, `or`,
//! `not`), identifiers, literals, delimiters, and operators.
//!
//! Identifiers are ASCII-only (`[A-Za-z_][A-Za-z0-9_]*`); MiniLang has no
//! Unicode-aware identifier rules.

pub mod cursor;
pub mod lexer;
pub mod token;

pub use lexer::Lexer;
pub use token::{keyword_from_ident, Token, TokenKind};
