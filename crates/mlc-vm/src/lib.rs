//! mlc-vm - the MiniLang interpreter.
//!
//! Executes the flat instruction list produced by `mlc-ir` directly, with
//! a program counter and an explicit call stack rather than recursing
//! through Rust's own stack for MiniLang function calls.

pub mod error;
pub mod frame;
pub mod interpreter;
pub mod value;

pub use error::RuntimeError;
pub use interpreter::{Vm, VmState};
pub use value::Value;

#[cfg(test)]
mod tests {
    use super::*;
    use mlc_util::Interner;
    use std::io::Cursor;

    fn run(src: &str) -> (String, Interner) {
        let mut interner = Interner::new();
        let handler = mlc_util::Handler::new();
        let tokens = {
            let mut lexer = mlc_lex::Lexer::new(src, &mut interner, &handler);
            lexer.tokenize()
        };
        let program = mlc_par::Parser::new(tokens, &handler)
            .parse_program()
            .expect("parses cleanly");
        let instructions = mlc_ir::IrGenerator::new(&mut interner).generate(&program);

        let mut output = Vec::new();
        {
            let input = Cursor::new(Vec::<u8>::new());
            let mut vm = Vm::new(&instructions, &interner, input, &mut output);
            vm.run().expect("runs without a runtime error");
        }
        (String::from_utf8(output).unwrap(), interner)
    }

    #[test]
    fn prints_arithmetic_result() {
        let (out, _) = run("print(2 + 3 * 4);");
        assert_eq!(out, "14 ");
    }

    #[test]
    fn while_loop_prints_each_iteration() {
        let (out, _) = run("int i = 1; while (i <= 3) { print(i); i = i + 1; }");
        assert_eq!(out, "1 2 3 ");
    }

    #[test]
    fn recursive_function_computes_factorial() {
        let (out, _) = run(
            "function int fact(int n) { \
                if (n <= 1) { return 1; } \
                return n * fact(n - 1); \
             } \
             print(fact(5));",
        );
        assert_eq!(out, "120 ");
    }

    #[test]
    fn array_sum_accumulates_correctly() {
        let (out, _) = run(
            "int[] xs = [10, 20, 30]; \
             int total = 0; \
             int i = 0; \
             while (i < len(xs)) { total = total + xs[i]; i = i + 1; } \
             print(total);",
        );
        assert_eq!(out, "60 ");
    }

    #[test]
    fn integer_division_floors_toward_negative_infinity() {
        let (out, _) = run("print(-7 / 2);");
        assert_eq!(out, "-4 ");
    }

    #[test]
    fn division_by_zero_is_a_runtime_error() {
        let mut interner = Interner::new();
        let handler = mlc_util::Handler::new();
        let tokens = {
            let mut lexer = mlc_lex::Lexer::new("print(1 / 0);", &mut interner, &handler);
            lexer.tokenize()
        };
        let program = mlc_par::Parser::new(tokens, &handler).parse_program().unwrap();
        let instructions = mlc_ir::IrGenerator::new(&mut interner).generate(&program);
        let input = Cursor::new(Vec::<u8>::new());
        let mut output = Vec::new();
        let mut vm = Vm::new(&instructions, &interner, input, &mut output);
        assert_eq!(vm.run(), Err(RuntimeError::DivisionByZero));
    }

    #[test]
    fn array_index_out_of_bounds_is_a_runtime_error() {
        let mut interner = Interner::new();
        let handler = mlc_util::Handler::new();
        let tokens = {
            let mut lexer = mlc_lex::Lexer::new("int[] xs = [1, 2]; print(xs[5]);", &mut interner, &handler);
            lexer.tokenize()
        };
        let program = mlc_par::Parser::new(tokens, &handler).parse_program().unwrap();
        let instructions = mlc_ir::IrGenerator::new(&mut interner).generate(&program);
        let input = Cursor::new(Vec::<u8>::new());
        let mut output = Vec::new();
        let mut vm = Vm::new(&instructions, &interner, input, &mut output);
        assert_eq!(vm.run(), Err(RuntimeError::IndexOutOfBounds { index: 5 }));
    }

    #[test]
    fn optimized_program_produces_the_same_output() {
        let mut interner = Interner::new();
        let handler = mlc_util::Handler::new();
        let tokens = {
            let mut lexer = mlc_lex::Lexer::new("int x = 2 + 3; print(x * 2);", &mut interner, &handler);
            lexer.tokenize()
        };
        let program = mlc_par::Parser::new(tokens, &handler).parse_program().unwrap();
        let raw = mlc_ir::IrGenerator::new(&mut interner).generate(&program);
        let optimized = mlc_ir::optimize(raw);

        let input = Cursor::new(Vec::<u8>::new());
        let mut output = Vec::new();
        let mut vm = Vm::new(&optimized, &interner, input, &mut output);
        vm.run().unwrap();
        assert_eq!(String::from_utf8(output).unwrap(), "10 ");
    }
}
