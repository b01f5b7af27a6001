//! Error types for TOML parsing, decoding and encoding.
//!
//! Every failure in the crate is reported through [`Error`]:
//!
//! - **Lex errors**: malformed tokens, with line/column and the offending source line
//! - **Parse errors**: grammar violations such as duplicate keys or table redefinitions
//! - **Decode errors**: type mismatches, missing keys and, in strict mode, unmatched keys
//! - **Encode errors**: values with no TOML representation
//!
//! Decode errors are created deep inside serde visitors where the key path is not
//! known yet. They are located on the way out, so the innermost path wins.
//!
//! ## Examples
//!
//! ```rust
//! use serde_tomlkit::{parse, Error};
//!
//! let err = parse("x = 1\nx = 2\n").unwrap_err();
//! assert!(matches!(err, Error::Parse { .. }));
//! assert!(err.to_string().contains("`x`"));
//! ```

use crate::metadata::Key;
use std::fmt;
use thiserror::Error;

/// Represents all possible errors raised by this crate.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// IO error during reading or writing
    #[error("IO error: {0}")]
    Io(String),

    /// Malformed token
    #[error("Lex error at line {line}, column {col}: {msg}\n{context}")]
    Lex {
        line: usize,
        col: usize,
        msg: String,
        context: String,
    },

    /// Grammar violation
    #[error("Parse error at line {line}, column {col} (key `{key}`): {msg}")]
    Parse {
        line: usize,
        col: usize,
        key: Key,
        msg: String,
    },

    /// A tree node cannot be coerced into the requested type
    #[error("Type mismatch for key `{}`: expected {expected}, found {found}", display_key(key))]
    TypeMismatch {
        key: Option<Key>,
        expected: String,
        found: String,
    },

    /// The node has the right kind but its value does not fit the target
    #[error("Invalid value for key `{}`: {msg}", display_key(key))]
    InvalidValue { key: Option<Key>, msg: String },

    /// A required field is absent from the document
    #[error("Missing required key `{}`", missing_key(key, field))]
    MissingKey { key: Option<Key>, field: String },

    /// Strict decoding found keys no field consumed
    #[error("Unmatched keys: {}", join_keys(keys))]
    UnmatchedKeys { keys: Vec<Key> },

    /// Value has no TOML representation
    #[error("Encode error: {0}")]
    Encode(String),

    /// Unsupported type for serialization
    #[error("Unsupported type: {0}")]
    UnsupportedType(String),

    /// `None` reached a position where it cannot be skipped
    #[error("Unsupported None value")]
    UnsupportedNone,

    /// Custom error
    #[error("Error: {0}")]
    Custom(String),
}

fn display_key(key: &Option<Key>) -> String {
    key.as_ref().map(ToString::to_string).unwrap_or_default()
}

fn missing_key(key: &Option<Key>, field: &str) -> String {
    match key {
        Some(key) => key.to_string(),
        None => field.to_string(),
    }
}

fn join_keys(keys: &[Key]) -> String {
    keys.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl Error {
    /// Creates a lex error, quoting the source line it occurred on.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_tomlkit::Error;
    ///
    /// let err = Error::lex(2, 5, "invalid escape", "a = 1\nb = \"\\q\"\n");
    /// assert!(err.to_string().contains("line 2"));
    /// assert!(err.to_string().contains("b = \"\\q\""));
    /// ```
    pub fn lex(line: usize, col: usize, msg: &str, source: &str) -> Self {
        let text = source.lines().nth(line.saturating_sub(1)).unwrap_or("");
        let pointer = " ".repeat(col.saturating_sub(1));
        Error::Lex {
            line,
            col,
            msg: msg.to_string(),
            context: format!("  {}\n  {}^", text, pointer),
        }
    }

    /// Creates a parse error for the given key path.
    pub fn parse(line: usize, col: usize, key: Key, msg: &str) -> Self {
        Error::Parse {
            line,
            col,
            key,
            msg: msg.to_string(),
        }
    }

    /// Creates a type mismatch error naming both kinds.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_tomlkit::{Error, Key};
    ///
    /// let err = Error::type_mismatch(Key::from(["server", "port"]), "Integer", "String");
    /// assert_eq!(
    ///     err.to_string(),
    ///     "Type mismatch for key `server.port`: expected Integer, found String"
    /// );
    /// ```
    pub fn type_mismatch(key: Key, expected: &str, found: &str) -> Self {
        Error::TypeMismatch {
            key: Some(key),
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }

    /// Creates an unmatched keys error.
    pub fn unmatched_keys(keys: Vec<Key>) -> Self {
        Error::UnmatchedKeys { keys }
    }

    /// Creates an encode error.
    pub fn encode<T: fmt::Display>(msg: T) -> Self {
        Error::Encode(msg.to_string())
    }

    /// Creates an unsupported type error for types that have no TOML form.
    pub fn unsupported_type(msg: &str) -> Self {
        Error::UnsupportedType(msg.to_string())
    }

    /// Creates a custom error with a display message.
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }

    /// Creates an I/O error for file reading/writing failures.
    pub fn io(msg: &str) -> Self {
        Error::Io(msg.to_string())
    }

    /// Returns the key path this error refers to, if it has been located.
    pub fn key(&self) -> Option<&Key> {
        match self {
            Error::Parse { key, .. } => Some(key),
            Error::TypeMismatch { key, .. }
            | Error::InvalidValue { key, .. }
            | Error::MissingKey { key, .. } => key.as_ref(),
            _ => None,
        }
    }

    /// Attaches `path` to decode errors that do not carry a key yet.
    pub(crate) fn at(mut self, path: &Key) -> Self {
        match &mut self {
            Error::TypeMismatch { key, .. } | Error::InvalidValue { key, .. } => {
                if key.is_none() {
                    *key = Some(path.clone());
                }
            }
            Error::MissingKey { key, field } => {
                if key.is_none() {
                    *key = Some(path.child(field));
                }
            }
            _ => {}
        }
        self
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

impl serde::de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }

    fn invalid_type(unexp: serde::de::Unexpected<'_>, exp: &dyn serde::de::Expected) -> Self {
        Error::TypeMismatch {
            key: None,
            expected: exp.to_string(),
            found: unexp.to_string(),
        }
    }

    fn invalid_value(unexp: serde::de::Unexpected<'_>, exp: &dyn serde::de::Expected) -> Self {
        Error::InvalidValue {
            key: None,
            msg: format!("invalid value: {}, expected {}", unexp, exp),
        }
    }

    fn invalid_length(len: usize, exp: &dyn serde::de::Expected) -> Self {
        Error::InvalidValue {
            key: None,
            msg: format!("invalid length {}, expected {}", len, exp),
        }
    }

    fn missing_field(field: &'static str) -> Self {
        Error::MissingKey {
            key: None,
            field: field.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
