//! Main lexer implementation for MiniLang.
//!
//! Transforms source text into a stream of [`Token`]s. Errors (unexpected
//! characters, malformed numbers, unterminated strings/comments) are
//! reported through a [`Handler`] rather than by panicking, so a caller can
//! collect every lexical diagnostic before deciding whether to proceed.

use mlc_util::diagnostic::DiagnosticCode;
use mlc_util::{Handler, Interner, Span};

use crate::cursor::Cursor;
use crate::token::{keyword_from_ident, Token, TokenKind};

/// Scans MiniLang source text into tokens.
pub struct Lexer<'a> {
    cursor: Cursor<'a>,
    interner: &'a mut Interner,
    handler: &'a Handler,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str, interner: &'a mut Interner, handler: &'a Handler) -> Self {
        Self {
            cursor: Cursor::new(source),
            interner,
            handler,
        }
    }

    /// Tokenizes the whole source, returning every token including the
    /// trailing `Eof`. Lexical errors are reported to the handler and the
    /// lexer resynchronizes by skipping the offending character.
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let tok = self.next_token();
            let is_eof = matches!(tok.kind, TokenKind::Eof);
            tokens.push(tok);
            if is_eof {
                break;
            }
        }
        tokens
    }

    fn next_token(&mut self) -> Token {
        self.skip_whitespace_and_comments();

        let line = self.cursor.line();
        let column = self.cursor.column();

        if self.cursor.is_at_end() {
            return Token::new(TokenKind::Eof, line, column);
        }

        let c = self.cursor.current_char();
        let kind = match c {
            '(' => self.single(TokenKind::LParen),
            ')' => self.single(TokenKind::RParen),
            '{' => self.single(TokenKind::LBrace),
            '}' => self.single(TokenKind::RBrace),
            '[' => self.single(TokenKind::LBracket),
            ']' => self.single(TokenKind::RBracket),
            ';' => self.single(TokenKind::Semicolon),
            ',' => self.single(TokenKind::Comma),
            ':' => self.single(TokenKind::Colon),
            '+' => self.single(TokenKind::Plus),
            '-' => self.single(TokenKind::Minus),
            '*' => self.lex_star(),
            '/' => self.single(TokenKind::Slash),
            '%' => self.single(TokenKind::Percent),
            '=' => self.lex_equals(),
            '!' => self.lex_bang(line, column),
            '<' => self.lex_lt(),
            '>' => self.lex_gt(),
            '"' => self.lex_string(line, column),
            c if c.is_ascii_digit() => return self.lex_number(line, column),
            c if c.is_ascii_alphabetic() || c == '_' => return self.lex_identifier(line, column),
            c => {
                self.error(line, column, format!("Unexpected character: {}", c));
                self.cursor.advance();
                TokenKind::Eof
            }
        };

        Token::new(kind, line, column)
    }

    fn single(&mut self, kind: TokenKind) -> TokenKind {
        self.cursor.advance();
        kind
    }

    fn lex_star(&mut self) -> TokenKind {
        self.cursor.advance();
        if self.cursor.match_char('*') {
            TokenKind::Power
        } else {
            TokenKind::Star
        }
    }

    fn lex_equals(&mut self) -> TokenKind {
        self.cursor.advance();
        if self.cursor.match_char('=') {
            TokenKind::EqEq
        } else {
            TokenKind::Assign
        }
    }

    fn lex_bang(&mut self, line: u32, column: u32) -> TokenKind {
        self.cursor.advance();
        if self.cursor.match_char('=') {
            TokenKind::NotEq
        } else {
            self.error(line, column, "Unexpected character: !".to_string());
            TokenKind::Eof
        }
    }

    fn lex_lt(&mut self) -> TokenKind {
        self.cursor.advance();
        if self.cursor.match_char('=') {
            TokenKind::LtEq
        } else {
            TokenKind::Lt
        }
    }

    fn lex_gt(&mut self) -> TokenKind {
        self.cursor.advance();
        if self.cursor.match_char('=') {
            TokenKind::GtEq
        } else {
            TokenKind::Gt
        }
    }

    fn lex_identifier(&mut self, line: u32, column: u32) -> Token {
        let start = self.cursor.position();
        while self.cursor.current_char().is_ascii_alphanumeric() || self.cursor.current_char() == '_' {
            self.cursor.advance();
        }
        let text = &self.cursor.source()[start..self.cursor.position()];

        let kind = match keyword_from_ident(text) {
            Some(kind) => kind,
            None => TokenKind::Ident(self.interner.intern(text)),
        };
        Token::new(kind, line, column)
    }

    fn lex_number(&mut self, line: u32, column: u32) -> Token {
        let start = self.cursor.position();
        let mut dot_count = 0;

        while self.cursor.current_char().is_ascii_digit() || self.cursor.current_char() == '.' {
            if self.cursor.current_char() == '.' {
                dot_count += 1;
            }
            self.cursor.advance();
        }

        let text = &self.cursor.source()[start..self.cursor.position()];

        if dot_count > 1 {
            self.error(
                line,
                column,
                "Invalid number format: multiple decimal points".to_string(),
            );
            return Token::new(TokenKind::Eof, line, column);
        }

        let kind = if dot_count == 1 {
            TokenKind::FloatLiteral(text.parse().expect("digits and a single dot parse as f64"))
        } else {
            TokenKind::IntLiteral(text.parse().expect("digits parse as i64"))
        };
        Token::new(kind, line, column)
    }

    fn lex_string(&mut self, line: u32, column: u32) -> Token {
        self.cursor.advance(); // opening quote
        let mut value = String::new();

        loop {
            if self.cursor.is_at_end() || self.cursor.current_char() == '\n' {
                self.error(line, column, "Unterminated string literal".to_string());
                return Token::new(TokenKind::Eof, line, column);
            }
            let c = self.cursor.current_char();
            if c == '"' {
                self.cursor.advance();
                break;
            }
            if c == '\\' {
                self.cursor.advance();
                let escaped = self.cursor.current_char();
                match escaped {
                    'n' => value.push('\n'),
                    't' => value.push('\t'),
                    '\\' => value.push('\\'),
                    '"' => value.push('"'),
                    other => value.push(other),
                }
                self.cursor.advance();
            } else {
                value.push(c);
                self.cursor.advance();
            }
        }

        Token::new(TokenKind::StringLiteral(self.interner.intern(&value)), line, column)
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.cursor.current_char() {
                c if c.is_whitespace() => {
                    self.cursor.advance();
                }
                '/' if self.cursor.peek_char(1) == '/' => {
                    while !self.cursor.is_at_end() && self.cursor.current_char() != '\n' {
                        self.cursor.advance();
                    }
                }
                '/' if self.cursor.peek_char(1) == '*' => {
                    let line = self.cursor.line();
                    let column = self.cursor.column();
                    self.cursor.advance();
                    self.cursor.advance();
                    let mut closed = false;
                    while !self.cursor.is_at_end() {
                        if self.cursor.current_char() == '*' && self.cursor.peek_char(1) == '/' {
                            self.cursor.advance();
                            self.cursor.advance();
                            closed = true;
                            break;
                        }
                        self.cursor.advance();
                    }
                    if !closed {
                        self.error(
                            line,
                            column,
                            "Unterminated multi-line comment".to_string(),
                        );
                    }
                }
                _ => break,
            }
        }
    }

    fn error(&self, line: u32, column: u32, message: String) {
        let code = if message.starts_with("Unexpected character") {
            DiagnosticCode::E_LEXICAL_UNEXPECTED_CHAR
        } else if message.starts_with("Unterminated string") {
            DiagnosticCode::E_LEXICAL_UNTERMINATED_STRING
        } else if message.starts_with("Invalid number") {
            DiagnosticCode::E_LEXICAL_INVALID_NUMBER
        } else {
            DiagnosticCode::E_LEXICAL_UNTERMINATED_COMMENT
        };
        self.handler
            .build_error(Span::point(line, column), message)
            .code(code)
            .emit(self.handler);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenize(src: &str) -> (Vec<TokenKind>, Handler) {
        let mut interner = Interner::new();
        let handler = Handler::new();
        let kinds = {
            let mut lexer = Lexer::new(src, &mut interner, &handler);
            lexer.tokenize().into_iter().map(|t| t.kind).collect()
        };
        (kinds, handler)
    }

    #[test]
    fn lexes_var_declaration() {
        let (kinds, handler) = tokenize("int x = 5;");
        assert!(!handler.has_errors());
        assert!(matches!(kinds[0], TokenKind::Int));
        assert!(matches!(kinds[1], TokenKind::Ident(_)));
        assert_eq!(
            &kinds[2..],
            &[
                TokenKind::Assign,
                TokenKind::IntLiteral(5),
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lexes_power_operator_not_double_star() {
        let (kinds, handler) = tokenize("2 ** 3");
        assert!(!handler.has_errors());
        assert_eq!(
            kinds,
            vec![
                TokenKind::IntLiteral(2),
                TokenKind::Power,
                TokenKind::IntLiteral(3),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn float_literal_has_exactly_one_dot() {
        let (kinds, _) = tokenize("3.14");
        assert_eq!(kinds, vec![TokenKind::FloatLiteral(3.14), TokenKind::Eof]);
    }

    #[test]
    fn two_dots_is_a_lexical_error() {
        let (_, handler) = tokenize("3.1.4;");
        assert!(handler.has_errors());
    }

    #[test]
    fn unterminated_string_is_an_error() {
        let (_, handler) = tokenize("\"hello");
        assert!(handler.has_errors());
    }

    #[test]
    fn string_escapes_are_decoded() {
        let mut interner = Interner::new();
        let handler = Handler::new();
        let mut lexer = Lexer::new(r#""a\nb\t\"\\""#, &mut interner, &handler);
        let tokens = lexer.tokenize();
        match &tokens[0].kind {
            TokenKind::StringLiteral(sym) => {
                assert_eq!(interner.resolve(*sym), "a\nb\t\"\\");
            }
            other => panic!("expected string literal, got {:?}", other),
        }
    }

    #[test]
    fn bang_alone_is_an_error_not_logical_not() {
        let (_, handler) = tokenize("!x");
        assert!(handler.has_errors());
    }

    #[test]
    fn not_equal_is_fine() {
        let (kinds, handler) = tokenize("x != y");
        assert!(!handler.has_errors());
        assert!(kinds.contains(&TokenKind::NotEq));
    }

    #[test]
    fn line_comment_is_skipped() {
        let (kinds, _) = tokenize("1 // comment\n2");
        assert_eq!(
            kinds,
            vec![TokenKind::IntLiteral(1), TokenKind::IntLiteral(2), TokenKind::Eof]
        );
    }

    #[test]
    fn unterminated_block_comment_is_an_error() {
        let (_, handler) = tokenize("/* never closes");
        assert!(handler.has_errors());
    }

    #[test]
    fn keywords_and_identifiers_are_distinguished() {
        let (kinds, _) = tokenize("function add not_a_keyword");
        assert_eq!(kinds[0], TokenKind::Function);
        assert!(matches!(kinds[1], TokenKind::Ident(_)));
        assert!(matches!(kinds[2], TokenKind::Ident(_)));
    }

    #[test]
    fn bool_literals_lex_directly_as_literals() {
        let (kinds, _) = tokenize("true false");
        assert_eq!(
            kinds,
            vec![
                TokenKind::BoolLiteral(true),
                TokenKind::BoolLiteral(false),
                TokenKind::Eof
            ]
        );
    }
}
