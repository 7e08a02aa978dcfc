//! The `{stage, message, line?, column?}` record handed back to CLI users
//! and embedding callers, per the pipeline stage that raised it.

use std::fmt;

use mlc_util::Diagnostic;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Lex,
    Parse,
    Semantic,
    Runtime,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Lex => "lex",
            Stage::Parse => "parse",
            Stage::Semantic => "semantic",
            Stage::Runtime => "runtime",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorRecord {
    pub stage: Stage,
    pub message: String,
    pub line: Option<u32>,
    pub column: Option<u32>,
}

impl ErrorRecord {
    pub fn from_diagnostic(stage: Stage, diagnostic: &Diagnostic) -> Self {
        let line = (diagnostic.span.line > 0).then_some(diagnostic.span.line);
        let column = (diagnostic.span.column > 0).then_some(diagnostic.span.column);
        Self {
            stage,
            message: diagnostic.message.clone(),
            line,
            column,
        }
    }

    pub fn runtime(message: impl Into<String>) -> Self {
        Self {
            stage: Stage::Runtime,
            message: message.into(),
            line: None,
            column: None,
        }
    }
}

impl fmt::Display for ErrorRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} error: {}", self.stage, self.message)?;
        if let Some(line) = self.line {
            write!(f, " at line {}", line)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mlc_util::Span;

    #[test]
    fn renders_stage_and_message() {
        let record = ErrorRecord::runtime("Division by zero");
        assert_eq!(format!("{}", record), "runtime error: Division by zero");
    }

    #[test]
    fn includes_line_when_the_span_carries_one() {
        let diag = Diagnostic::error("cannot assign bool to int", Span::point(1, 9));
        let record = ErrorRecord::from_diagnostic(Stage::Semantic, &diag);
        assert_eq!(format!("{}", record), "semantic error: cannot assign bool to int at line 1");
    }

    #[test]
    fn omits_line_for_a_dummy_span() {
        let diag = Diagnostic::error("unexpected token", Span::DUMMY);
        let record = ErrorRecord::from_diagnostic(Stage::Parse, &diag);
        assert_eq!(record.line, None);
    }
}
