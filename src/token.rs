//! Tokens produced by the lexer.

use crate::datetime::Datetime;
use std::fmt;

/// A location in the source text. Lines and columns are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
    pub offset: usize,
}

impl Position {
    pub fn start() -> Self {
        Position {
            line: 1,
            column: 1,
            offset: 0,
        }
    }

    /// Moves past `ch`, wrapping to the next line on `\n`.
    pub fn advance(&mut self, ch: char) {
        self.offset += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// The four string flavours. Only basic strings process escapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringKind {
    Basic,
    MultilineBasic,
    Literal,
    MultilineLiteral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Radix {
    Decimal,
    Hex,
    Octal,
    Binary,
}

impl Radix {
    pub const fn base(self) -> u32 {
        match self {
            Radix::Decimal => 10,
            Radix::Hex => 16,
            Radix::Octal => 8,
            Radix::Binary => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    BareKey(String),
    String { value: String, kind: StringKind },
    Integer { value: i64, radix: Radix },
    Float(f64),
    Boolean(bool),
    Datetime(Datetime),
    TableOpen,
    TableClose,
    ArrayTableOpen,
    ArrayTableClose,
    ArrayOpen,
    ArrayClose,
    InlineTableOpen,
    InlineTableClose,
    Dot,
    Equals,
    Comma,
    Newline,
    Comment(String),
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::BareKey(key) => write!(f, "key '{}'", key),
            TokenKind::String { .. } => write!(f, "string"),
            TokenKind::Integer { value, .. } => write!(f, "integer {}", value),
            TokenKind::Float(value) => write!(f, "float {}", value),
            TokenKind::Boolean(value) => write!(f, "boolean {}", value),
            TokenKind::Datetime(value) => write!(f, "datetime {}", value),
            TokenKind::TableOpen => write!(f, "'['"),
            TokenKind::TableClose => write!(f, "']'"),
            TokenKind::ArrayTableOpen => write!(f, "'[['"),
            TokenKind::ArrayTableClose => write!(f, "']]'"),
            TokenKind::ArrayOpen => write!(f, "'['"),
            TokenKind::ArrayClose => write!(f, "']'"),
            TokenKind::InlineTableOpen => write!(f, "'{{'"),
            TokenKind::InlineTableClose => write!(f, "'}}'"),
            TokenKind::Dot => write!(f, "'.'"),
            TokenKind::Equals => write!(f, "'='"),
            TokenKind::Comma => write!(f, "','"),
            TokenKind::Newline => write!(f, "newline"),
            TokenKind::Comment(_) => write!(f, "comment"),
            TokenKind::Eof => write!(f, "end of input"),
        }
    }
}

/// A token together with the position of its first character.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub position: Position,
}

impl Token {
    pub fn new(kind: TokenKind, position: Position) -> Self {
        Token { kind, position }
    }
}
