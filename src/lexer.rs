//! Pull-model lexer.
//!
//! The lexer turns raw text into [`Token`]s one at a time. TOML is not
//! context-free at the token level (`true = true` is a key then a boolean,
//! `2000-01-01` may be a bare key or a date), so the lexer tracks what it
//! expects next: a key, what may follow a key, a value, or what may follow a
//! value. It also keeps the nesting of arrays and inline tables and whether a
//! `[header]` is open, because newlines and comments are legal inside arrays,
//! illegal inside inline tables and headers, and terminate a line elsewhere.
//!
//! The lexer knows nothing about tables. The first malformed token is
//! reported as [`Error::Lex`] and lexing stops.

use crate::datetime::Datetime;
use crate::error::{Error, Result};
use crate::token::{Position, Radix, StringKind, Token, TokenKind};

/// Deepest nesting of arrays and inline tables the lexer accepts.
pub(crate) const MAX_NESTING: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Nest {
    Array,
    InlineTable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Header {
    Table,
    ArrayOfTables,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expect {
    Key,
    AfterKey,
    Value,
    AfterValue,
}

pub(crate) struct Lexer<'a> {
    input: &'a str,
    pos: Position,
    nesting: Vec<Nest>,
    header: Option<Header>,
    expect: Expect,
    // `}` directly after `{` is an empty inline table; after `,` it is an error
    opened_inline: bool,
}

fn is_bare_key_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_' || ch == '-'
}

fn is_number_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '_' | '.' | '+' | '-')
}

/// Control characters that may not appear raw in strings or comments.
pub(crate) fn is_control(ch: char) -> bool {
    (ch < ' ' && ch != '\t') || ch == '\u{7f}'
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        let mut lexer = Lexer {
            input,
            pos: Position::start(),
            nesting: Vec::new(),
            header: None,
            expect: Expect::Key,
            opened_inline: false,
        };
        if input.starts_with('\u{feff}') {
            lexer.pos.offset = '\u{feff}'.len_utf8();
        }
        lexer
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos.offset..]
    }

    fn peek_char(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn next_char(&mut self) -> Option<char> {
        let ch = self.peek_char()?;
        self.pos.advance(ch);
        Some(ch)
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let start = self.pos.offset;
        while let Some(ch) = self.peek_char() {
            if !pred(ch) {
                break;
            }
            self.next_char();
        }
        &self.input[start..self.pos.offset]
    }

    fn skip_blanks(&mut self) {
        self.take_while(|ch| ch == ' ' || ch == '\t');
    }

    fn error(&self, at: Position, msg: &str) -> Error {
        Error::lex(at.line, at.column, msg, self.input)
    }

    fn open(&mut self, nest: Nest, start: Position) -> Result<()> {
        if self.nesting.len() >= MAX_NESTING {
            return Err(self.error(
                start,
                &format!("arrays and inline tables nested deeper than {}", MAX_NESTING),
            ));
        }
        self.nesting.push(nest);
        Ok(())
    }

    fn token(&mut self, kind: TokenKind, start: Position) -> Result<Token> {
        self.opened_inline = matches!(kind, TokenKind::InlineTableOpen);
        Ok(Token::new(kind, start))
    }

    /// Produces the next token. Once input is exhausted every call returns `Eof`.
    pub fn next_token(&mut self) -> Result<Token> {
        loop {
            self.skip_blanks();
            let start = self.pos;
            let Some(ch) = self.peek_char() else {
                return self.end_of_input(start);
            };

            match ch {
                '#' => {
                    if self.header.is_some() || self.nesting.last() == Some(&Nest::InlineTable) {
                        return Err(self.error(start, "comments are not allowed here"));
                    }
                    let text = self.lex_comment()?;
                    return self.token(TokenKind::Comment(text), start);
                }
                '\n' | '\r' => {
                    self.consume_newline(start)?;
                    match self.nesting.last() {
                        Some(Nest::Array) => continue,
                        Some(Nest::InlineTable) => {
                            return Err(self.error(start, "newline inside inline table"));
                        }
                        None => {
                            if self.header.is_some() {
                                return Err(self.error(start, "newline inside table header"));
                            }
                            self.expect = Expect::Key;
                            return self.token(TokenKind::Newline, start);
                        }
                    }
                }
                _ => {}
            }

            return match self.expect {
                Expect::Key => self.lex_key(ch, start),
                Expect::AfterKey => self.lex_after_key(ch, start),
                Expect::Value => self.lex_value(ch, start),
                Expect::AfterValue => self.lex_after_value(ch, start),
            };
        }
    }

    fn end_of_input(&mut self, at: Position) -> Result<Token> {
        if self.header.is_some() {
            return Err(self.error(at, "unterminated table header"));
        }
        match self.nesting.last() {
            Some(Nest::Array) => Err(self.error(at, "unterminated array")),
            Some(Nest::InlineTable) => Err(self.error(at, "unterminated inline table")),
            None => self.token(TokenKind::Eof, at),
        }
    }

    fn consume_newline(&mut self, at: Position) -> Result<()> {
        if self.next_char() == Some('\r') && self.next_char() != Some('\n') {
            return Err(self.error(at, "carriage return must be followed by a newline"));
        }
        Ok(())
    }

    fn lex_comment(&mut self) -> Result<String> {
        self.next_char();
        let start = self.pos.offset;
        while let Some(ch) = self.peek_char() {
            if ch == '\n' || ch == '\r' {
                break;
            }
            if is_control(ch) {
                return Err(self.error(self.pos, "control character in comment"));
            }
            self.next_char();
        }
        Ok(self.input[start..self.pos.offset].to_string())
    }

    fn lex_key(&mut self, ch: char, start: Position) -> Result<Token> {
        if ch == '[' && self.nesting.is_empty() && self.header.is_none() {
            self.next_char();
            let kind = if self.peek_char() == Some('[') {
                self.next_char();
                self.header = Some(Header::ArrayOfTables);
                TokenKind::ArrayTableOpen
            } else {
                self.header = Some(Header::Table);
                TokenKind::TableOpen
            };
            return self.token(kind, start);
        }

        if ch == '}' && self.opened_inline {
            self.next_char();
            self.nesting.pop();
            self.expect = Expect::AfterValue;
            return self.token(TokenKind::InlineTableClose, start);
        }

        if is_bare_key_char(ch) {
            let key = self.take_while(is_bare_key_char).to_string();
            self.expect = Expect::AfterKey;
            return self.token(TokenKind::BareKey(key), start);
        }

        if ch == '"' || ch == '\'' {
            if self.rest().starts_with("\"\"\"") || self.rest().starts_with("'''") {
                return Err(self.error(start, "multiline strings cannot be used as keys"));
            }
            let (value, kind) = if ch == '"' {
                (self.lex_basic_string(start)?, StringKind::Basic)
            } else {
                (self.lex_literal_string(start)?, StringKind::Literal)
            };
            self.expect = Expect::AfterKey;
            return self.token(TokenKind::String { value, kind }, start);
        }

        Err(self.error(start, &format!("expected a key, found '{}'", ch)))
    }

    fn lex_after_key(&mut self, ch: char, start: Position) -> Result<Token> {
        match ch {
            '.' => {
                self.next_char();
                self.expect = Expect::Key;
                self.token(TokenKind::Dot, start)
            }
            '=' if self.header.is_none() => {
                self.next_char();
                self.expect = Expect::Value;
                self.token(TokenKind::Equals, start)
            }
            ']' if self.header.is_some() => {
                self.next_char();
                let kind = if self.header == Some(Header::ArrayOfTables) {
                    if self.next_char() != Some(']') {
                        return Err(self.error(start, "expected ']]' to close array of tables header"));
                    }
                    TokenKind::ArrayTableClose
                } else {
                    TokenKind::TableClose
                };
                self.header = None;
                self.expect = Expect::AfterValue;
                self.token(kind, start)
            }
            _ if self.header.is_some() => {
                Err(self.error(start, "expected '.' or ']' in table header"))
            }
            _ => Err(self.error(start, "expected '.' or '=' after key")),
        }
    }

    fn lex_after_value(&mut self, ch: char, start: Position) -> Result<Token> {
        match (ch, self.nesting.last().copied()) {
            (',', Some(Nest::Array)) => {
                self.next_char();
                self.expect = Expect::Value;
                self.token(TokenKind::Comma, start)
            }
            (',', Some(Nest::InlineTable)) => {
                self.next_char();
                self.expect = Expect::Key;
                self.token(TokenKind::Comma, start)
            }
            (']', Some(Nest::Array)) => {
                self.next_char();
                self.nesting.pop();
                self.token(TokenKind::ArrayClose, start)
            }
            ('}', Some(Nest::InlineTable)) => {
                self.next_char();
                self.nesting.pop();
                self.token(TokenKind::InlineTableClose, start)
            }
            (_, None) => Err(self.error(start, "expected newline or comment after value")),
            (_, Some(Nest::Array)) => Err(self.error(start, "expected ',' or ']' in array")),
            (_, Some(Nest::InlineTable)) => {
                Err(self.error(start, "expected ',' or '}' in inline table"))
            }
        }
    }

    fn lex_value(&mut self, ch: char, start: Position) -> Result<Token> {
        let kind = match ch {
            '[' => {
                self.open(Nest::Array, start)?;
                self.next_char();
                self.expect = Expect::Value;
                return self.token(TokenKind::ArrayOpen, start);
            }
            ']' if self.nesting.last() == Some(&Nest::Array) => {
                self.next_char();
                self.nesting.pop();
                self.expect = Expect::AfterValue;
                return self.token(TokenKind::ArrayClose, start);
            }
            '{' => {
                self.open(Nest::InlineTable, start)?;
                self.next_char();
                self.expect = Expect::Key;
                return self.token(TokenKind::InlineTableOpen, start);
            }
            '"' if self.rest().starts_with("\"\"\"") => TokenKind::String {
                value: self.lex_multiline_basic_string(start)?,
                kind: StringKind::MultilineBasic,
            },
            '"' => TokenKind::String {
                value: self.lex_basic_string(start)?,
                kind: StringKind::Basic,
            },
            '\'' if self.rest().starts_with("'''") => TokenKind::String {
                value: self.lex_multiline_literal_string(start)?,
                kind: StringKind::MultilineLiteral,
            },
            '\'' => TokenKind::String {
                value: self.lex_literal_string(start)?,
                kind: StringKind::Literal,
            },
            't' | 'f' => match self.take_while(is_bare_key_char) {
                "true" => TokenKind::Boolean(true),
                "false" => TokenKind::Boolean(false),
                other => {
                    return Err(self.error(start, &format!("invalid value '{}'", other)));
                }
            },
            _ => self.lex_scalar(start)?,
        };
        self.expect = Expect::AfterValue;
        self.token(kind, start)
    }

    fn lex_scalar(&mut self, start: Position) -> Result<TokenKind> {
        if let Some(len) = datetime_len(self.rest()) {
            let text = &self.rest()[..len];
            let datetime = text
                .parse::<Datetime>()
                .map_err(|e| self.error(start, &e.to_string()))?;
            for _ in 0..len {
                self.next_char();
            }
            return Ok(TokenKind::Datetime(datetime));
        }

        let word = self.take_while(is_number_char);
        if word.is_empty() {
            let found = self.peek_char().unwrap_or(' ');
            return Err(self.error(start, &format!("expected a value, found '{}'", found)));
        }
        parse_number(word).map_err(|msg| self.error(start, msg))
    }

    fn lex_escape(&mut self, at: Position, out: &mut String) -> Result<()> {
        let ch = match self.next_char() {
            Some('b') => '\u{8}',
            Some('t') => '\t',
            Some('n') => '\n',
            Some('f') => '\u{c}',
            Some('r') => '\r',
            Some('"') => '"',
            Some('\\') => '\\',
            Some('u') => self.lex_unicode(at, 4)?,
            Some('U') => self.lex_unicode(at, 8)?,
            _ => return Err(self.error(at, "invalid escape sequence")),
        };
        out.push(ch);
        Ok(())
    }

    fn lex_unicode(&mut self, at: Position, digits: usize) -> Result<char> {
        let hex: String = self.rest().chars().take(digits).collect();
        if hex.len() != digits || !hex.chars().all(|ch| ch.is_ascii_hexdigit()) {
            return Err(self.error(at, "unicode escape needs hexadecimal digits"));
        }
        for _ in 0..digits {
            self.next_char();
        }
        u32::from_str_radix(&hex, 16)
            .ok()
            .and_then(char::from_u32)
            .ok_or_else(|| self.error(at, "unicode escape is not a scalar value"))
    }

    fn lex_basic_string(&mut self, start: Position) -> Result<String> {
        self.next_char();
        let mut out = String::new();
        loop {
            let at = self.pos;
            match self.next_char() {
                None | Some('\n') | Some('\r') => {
                    return Err(self.error(start, "unterminated string"));
                }
                Some('"') => return Ok(out),
                Some('\\') => self.lex_escape(at, &mut out)?,
                Some(ch) if is_control(ch) => {
                    return Err(self.error(at, "control characters must be escaped"));
                }
                Some(ch) => out.push(ch),
            }
        }
    }

    fn lex_literal_string(&mut self, start: Position) -> Result<String> {
        self.next_char();
        let mut out = String::new();
        loop {
            let at = self.pos;
            match self.next_char() {
                None | Some('\n') | Some('\r') => {
                    return Err(self.error(start, "unterminated string"));
                }
                Some('\'') => return Ok(out),
                Some(ch) if is_control(ch) => {
                    return Err(self.error(at, "control character in literal string"));
                }
                Some(ch) => out.push(ch),
            }
        }
    }

    /// Consumes the opening delimiter and the newline that may follow it.
    fn open_multiline(&mut self) {
        for _ in 0..3 {
            self.next_char();
        }
        if self.rest().starts_with('\n') {
            self.next_char();
        } else if self.rest().starts_with("\r\n") {
            self.next_char();
            self.next_char();
        }
    }

    /// At a closing delimiter, consumes it plus up to two quotes that belong
    /// to the content.
    fn close_multiline(&mut self, quote: char, at: Position, out: &mut String) -> Result<bool> {
        let run = self.rest().chars().take_while(|ch| *ch == quote).count();
        if run < 3 {
            return Ok(false);
        }
        if run > 5 {
            return Err(self.error(at, "too many quotes at end of multiline string"));
        }
        for _ in 0..run {
            self.next_char();
        }
        for _ in 3..run {
            out.push(quote);
        }
        Ok(true)
    }

    fn multiline_newline(&mut self, at: Position, out: &mut String) -> Result<()> {
        if self.next_char() != Some('\n') {
            return Err(self.error(at, "carriage return must be followed by a newline"));
        }
        out.push_str("\r\n");
        Ok(())
    }

    fn lex_multiline_basic_string(&mut self, start: Position) -> Result<String> {
        self.open_multiline();
        let mut out = String::new();
        loop {
            let at = self.pos;
            if self.close_multiline('"', at, &mut out)? {
                return Ok(out);
            }
            match self.next_char() {
                None => return Err(self.error(start, "unterminated multiline string")),
                Some('\\') => {
                    let rest = self.rest().trim_start_matches([' ', '\t']);
                    if rest.starts_with('\n') || rest.starts_with("\r\n") {
                        self.take_while(|ch| matches!(ch, ' ' | '\t' | '\n' | '\r'));
                    } else {
                        self.lex_escape(at, &mut out)?;
                    }
                }
                Some('\n') => out.push('\n'),
                Some('\r') => self.multiline_newline(at, &mut out)?,
                Some(ch) if is_control(ch) => {
                    return Err(self.error(at, "control characters must be escaped"));
                }
                Some(ch) => out.push(ch),
            }
        }
    }

    fn lex_multiline_literal_string(&mut self, start: Position) -> Result<String> {
        self.open_multiline();
        let mut out = String::new();
        loop {
            let at = self.pos;
            if self.close_multiline('\'', at, &mut out)? {
                return Ok(out);
            }
            match self.next_char() {
                None => return Err(self.error(start, "unterminated multiline string")),
                Some('\n') => out.push('\n'),
                Some('\r') => self.multiline_newline(at, &mut out)?,
                Some(ch) if is_control(ch) => {
                    return Err(self.error(at, "control character in literal string"));
                }
                Some(ch) => out.push(ch),
            }
        }
    }
}

/// Length of the datetime at the start of `text`, if it starts like one.
///
/// Only the shape is checked here (`dddd-` or `dd:`); validation happens in
/// `Datetime::from_str` so that malformed dates are reported as such.
fn datetime_len(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let digits = |range: std::ops::Range<usize>| {
        bytes.len() >= range.end && bytes[range].iter().all(u8::is_ascii_digit)
    };
    let is_date = digits(0..4) && bytes.get(4) == Some(&b'-');
    let is_time = digits(0..2) && bytes.get(2) == Some(&b':');
    if !is_date && !is_time {
        return None;
    }

    let mut len = 0;
    while len < bytes.len() {
        let b = bytes[len];
        let spaced_time = is_date
            && len == 10
            && b == b' '
            && digits(11..13)
            && bytes.get(13) == Some(&b':');
        if b.is_ascii_digit() || matches!(b, b'-' | b':' | b'.' | b'+' | b'T' | b't' | b'Z' | b'z')
            || spaced_time
        {
            len += 1;
        } else {
            break;
        }
    }
    Some(len)
}

fn check_digits(digits: &str, base: u32) -> std::result::Result<(), &'static str> {
    if digits.is_empty() {
        return Err("expected digits");
    }
    if digits.starts_with('_') || digits.ends_with('_') || digits.contains("__") {
        return Err("underscores must sit between digits");
    }
    if !digits.chars().all(|ch| ch == '_' || ch.is_digit(base)) {
        return Err("invalid digit in number");
    }
    Ok(())
}

fn check_decimal(digits: &str) -> std::result::Result<(), &'static str> {
    check_digits(digits, 10)?;
    if digits.len() > 1 && digits.starts_with('0') {
        return Err("leading zeros are not allowed");
    }
    Ok(())
}

fn without_underscores(text: &str) -> String {
    text.chars().filter(|ch| *ch != '_').collect()
}

/// Classifies and converts an integer or float literal.
fn parse_number(word: &str) -> std::result::Result<TokenKind, &'static str> {
    let signed = word.starts_with(['+', '-']);
    let negative = word.starts_with('-');
    let body = if signed { &word[1..] } else { word };

    match body {
        "inf" if negative => return Ok(TokenKind::Float(f64::NEG_INFINITY)),
        "inf" => return Ok(TokenKind::Float(f64::INFINITY)),
        "nan" => return Ok(TokenKind::Float(f64::NAN)),
        _ => {}
    }

    let radix = match body.get(..2) {
        Some("0x") => Some(Radix::Hex),
        Some("0o") => Some(Radix::Octal),
        Some("0b") => Some(Radix::Binary),
        _ => None,
    };
    if let Some(radix) = radix {
        if signed {
            return Err("signs are not allowed on hexadecimal, octal or binary integers");
        }
        let digits = &body[2..];
        check_digits(digits, radix.base())?;
        let value = i64::from_str_radix(&without_underscores(digits), radix.base())
            .map_err(|_| "integer out of range")?;
        return Ok(TokenKind::Integer { value, radix });
    }

    if body.contains(['.', 'e', 'E']) {
        let (mantissa, exponent) = match body.find(['e', 'E']) {
            Some(i) => (&body[..i], Some(&body[i + 1..])),
            None => (body, None),
        };
        let (int_part, fraction) = match mantissa.find('.') {
            Some(i) => (&mantissa[..i], Some(&mantissa[i + 1..])),
            None => (mantissa, None),
        };
        check_decimal(int_part)?;
        if let Some(fraction) = fraction {
            check_digits(fraction, 10).map_err(|_| "a decimal point needs digits on both sides")?;
        }
        if let Some(exponent) = exponent {
            check_digits(exponent.strip_prefix(['+', '-']).unwrap_or(exponent), 10)?;
        }
        let value: f64 = without_underscores(word)
            .parse()
            .map_err(|_| "invalid float")?;
        if value.is_infinite() {
            return Err("float out of range");
        }
        return Ok(TokenKind::Float(value));
    }

    check_decimal(body)?;
    let value = without_underscores(word)
        .parse::<i64>()
        .map_err(|_| "integer out of range")?;
    Ok(TokenKind::Integer {
        value,
        radix: Radix::Decimal,
    })
}
