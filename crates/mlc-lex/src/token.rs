//! Token kinds produced by the lexer.

use mlc_util::Symbol;

/// A lexical token with its source position.
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: u32,
    pub column: u32,
}

impl Token {
    pub fn new(kind: TokenKind, line: u32, column: u32) -> Self {
        Self { kind, line, column }
    }
}

/// Every category of token MiniLang source can produce.
#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    // Type keywords
    Int,
    Float,
    Bool,
    StringType,

    // Control keywords
    If,
    Else,
    While,
    For,
    Return,
    Print,
    Function,
    Input,

    // Built-in names
    Len,
    Random,
    Substr,
    Concat,

    // Logical keywords
    And,
    Or,
    Not,

    // Identifiers and literals
    Ident(Symbol),
    IntLiteral(i64),
    FloatLiteral(f64),
    StringLiteral(Symbol),
    BoolLiteral(bool),

    // Delimiters
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Semicolon,
    Comma,
    Colon,

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Power,
    Assign,
    EqEq,
    NotEq,
    Lt,
    Gt,
    LtEq,
    GtEq,

    Eof,
}

/// Maps a scanned identifier to its keyword token, if any.
///
/// Mirrors the `KEYWORDS` dictionary lookup in the original reference
/// lexer: every reserved word is recognized here, everything else comes
/// back as a plain identifier.
pub fn keyword_from_ident(ident: &str) -> Option<TokenKind> {
    Some(match ident {
        "int" => TokenKind::Int,
        "float" => TokenKind::Float,
        "bool" => TokenKind::Bool,
        "string" => TokenKind::StringType,
        "if" => TokenKind::If,
        "else" => TokenKind::Else,
        "while" => TokenKind::While,
        "for" => TokenKind::For,
        "return" => TokenKind::Return,
        "print" => TokenKind::Print,
        "function" => TokenKind::Function,
        "input" => TokenKind::Input,
        "len" => TokenKind::Len,
        "random" => TokenKind::Random,
        "substr" => TokenKind::Substr,
        "concat" => TokenKind::Concat,
        "and" => TokenKind::And,
        "or" => TokenKind::Or,
        "not" => TokenKind::Not,
        "true" => TokenKind::BoolLiteral(true),
        "false" => TokenKind::BoolLiteral(false),
        _ => return None,
    })
}
