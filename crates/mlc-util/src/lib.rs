//! mlc-util - core utilities shared by every stage of the MiniLang compiler.
//!
//! This crate has no dependency on any other `mlc-*` crate. It provides the
//! foundation types that the lexer, parser, semantic analyzer, IR layer, and
//! driver all build on:
//!
//! - [`symbol`] - string interning (`Symbol`, `Interner`)
//! - [`span`] - source location tracking (`Span`, `FileId`, `SourceMap`)
//! - [`diagnostic`] - error/warning reporting (`Diagnostic`, `Handler`, `DiagnosticBuilder`)
//! - [`index_vec`] - typed-index vectors (`IndexVec`, `Idx`, `define_idx!`)
//! - [`def_id`] - global identifiers for declared functions
//! - [`error`] - shared error enums for the above

pub mod def_id;
pub mod diagnostic;
pub mod error;
pub mod index_vec;
pub mod span;
pub mod symbol;

pub use def_id::{DefId, DefIdGenerator};
pub use diagnostic::{Diagnostic, DiagnosticBuilder, DiagnosticCode, Handler, Level};
pub use index_vec::{Idx, IndexVec};
pub use span::{FileId, SourceFile, SourceMap, Span};
pub use symbol::{Interner, Symbol};
