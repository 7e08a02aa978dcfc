//! Orchestrates one MiniLang program through every stage: lex, parse,
//! semantic analysis, IR generation, optional optimization, interpretation.

use std::io::{BufRead, Write};

use mlc_util::{Handler, Interner, Level};

use crate::diagnostics::{ErrorRecord, Stage};

/// Runs `source` to completion. `stdin`/`stdout` back the program's
/// `input`/`print` built-ins directly, so output is observable as it's
/// produced rather than buffered until the end.
///
/// A compile-time error halts before interpretation and returns every
/// diagnostic raised at that stage. A runtime error halts interpretation
/// and returns a single-element record list. No partial IR is ever run.
pub fn run_source<R: BufRead, W: Write>(
    source: &str,
    optimize: bool,
    verbose: bool,
    stdin: R,
    mut stdout: W,
) -> Result<(), Vec<ErrorRecord>> {
    let mut interner = Interner::new();
    let handler = Handler::new();

    let tokens = {
        tracing::debug!("lexing {} bytes of source", source.len());
        let mut lexer = mlc_lex::Lexer::new(source, &mut interner, &handler);
        lexer.tokenize()
    };
    if handler.has_errors() {
        return Err(to_records(&handler, Stage::Lex));
    }
    tracing::debug!(tokens = tokens.len(), "lexing complete");

    let program = match mlc_par::Parser::new(tokens, &handler).parse_program() {
        Some(program) => program,
        None => return Err(to_records(&handler, Stage::Parse)),
    };
    tracing::debug!(statements = program.statements.len(), "parsing complete");

    let mut analyzer = mlc_sem::SemanticAnalyzer::new(&handler, &interner);
    if !analyzer.analyze(&program) {
        return Err(to_records(&handler, Stage::Semantic));
    }
    tracing::debug!("semantic analysis complete");

    let mut instructions = mlc_ir::IrGenerator::new(&mut interner).generate(&program);
    tracing::debug!(instructions = instructions.len(), "ir generation complete");
    if optimize {
        instructions = mlc_ir::optimize(instructions);
        tracing::debug!(instructions = instructions.len(), "optimization complete");
    }

    if verbose {
        eprint!("{}", mlc_ir::format_program(&instructions, &interner));
    }

    let mut vm = mlc_vm::Vm::new(&instructions, &interner, stdin, &mut stdout);
    vm.run().map_err(|err| {
        tracing::debug!(error = %err, "runtime error");
        vec![ErrorRecord::runtime(err.to_string())]
    })
}

fn to_records(handler: &Handler, stage: Stage) -> Vec<ErrorRecord> {
    handler
        .diagnostics()
        .iter()
        .filter(|d| d.level == Level::Error)
        .map(|d| ErrorRecord::from_diagnostic(stage, d))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn run(source: &str) -> Result<String, Vec<ErrorRecord>> {
        let stdin = Cursor::new(Vec::<u8>::new());
        let mut out = Vec::new();
        run_source(source, true, false, stdin, &mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    #[test]
    fn factorial_prints_120() {
        let out = run(
            "function int factorial(int n) { \
                if (n <= 1) { return 1; } \
                return n * factorial(n - 1); \
             } \
             int r = factorial(5); print(r);",
        )
        .unwrap();
        assert_eq!(out, "120 ");
    }

    #[test]
    fn type_error_is_reported_as_a_semantic_record() {
        let err = run("int x = true;").unwrap_err();
        assert_eq!(err.len(), 1);
        assert_eq!(err[0].stage, Stage::Semantic);
        assert!(err[0].message.contains("bool"));
    }

    #[test]
    fn array_out_of_bounds_is_reported_as_a_runtime_record() {
        let err = run("int[] a = [1]; print(a[5]);").unwrap_err();
        assert_eq!(err.len(), 1);
        assert_eq!(err[0].stage, Stage::Runtime);
        assert_eq!(err[0].message, "Array index out of bounds: 5");
    }

    #[test]
    fn unoptimized_and_optimized_runs_agree() {
        let stdin = Cursor::new(Vec::<u8>::new());
        let mut out = Vec::new();
        run_source("int x = 2 + 3 * 4; print(x);", false, false, stdin, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "14 ");
    }
}
