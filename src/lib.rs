//! # serde_tomlkit
//!
//! A Serde-compatible engine for TOML configuration files: a lexer and parser
//! producing a typed document tree, a metadata index of every key, a decoder
//! with an optional strict mode, and an encoder.
//!
//! ## Key Features
//!
//! - **Typed tree**: every node keeps its kind, including the four datetime
//!   flavours (offset, local datetime, local date, local time)
//! - **Metadata**: every key path in document order, with its kind
//! - **Strict decoding**: fail when the document has keys the target type does
//!   not consume, listing all of them at once
//! - **Forgiving field matching**: keys match struct fields case-insensitively
//! - **Faithful encoding**: datetimes keep their flavour, floats stay floats,
//!   sequences of structs become arrays of tables
//!
//! ## Quick Start
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use serde_tomlkit::{from_str, to_string};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct Server {
//!     host: String,
//!     port: u16,
//! }
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct Config {
//!     title: String,
//!     server: Server,
//! }
//!
//! let text = "title = 'demo'\n\n[server]\nhost = 'localhost'\nport = 8080\n";
//! let config: Config = from_str(text).unwrap();
//! assert_eq!(config.server.port, 8080);
//!
//! assert_eq!(to_string(&config).unwrap(), text);
//! ```
//!
//! ### Strict decoding
//!
//! ```rust
//! use serde::Deserialize;
//! use serde_tomlkit::{from_str_strict, Error};
//!
//! #[derive(Deserialize, Debug)]
//! struct Config { a: i64 }
//!
//! let err = from_str_strict::<Config>("a = 1\nb = 2\nc = 3\n").unwrap_err();
//! match err {
//!     Error::UnmatchedKeys { keys } => assert_eq!(keys.len(), 2),
//!     other => panic!("unexpected error: {other}"),
//! }
//! ```
//!
//! ### Inspecting a document
//!
//! ```rust
//! use serde_tomlkit::{parse, Kind};
//!
//! let doc = parse("[owner]\nname = 'Tom'\ndob = 1979-05-27T07:32:00-08:00\n").unwrap();
//! for (key, kind) in doc.metadata().entries() {
//!     println!("{key}: {kind}");
//! }
//! assert_eq!(doc.metadata().type_of(&["owner", "dob"]), Some(Kind::OffsetDatetime));
//! ```
//!
//! ## Logging
//!
//! Parse, decode and encode completion are reported as `tracing` events at
//! `debug` level. The crate never installs a subscriber.
//!
//! ## Safety Guarantees
//!
//! - No `unsafe` code blocks
//! - No panics in the public API; every failure is an [`Error`]
//! - A parsed [`Document`] is immutable and can be decoded from several threads
//!   at once
//!
//! ## Demos
//!
//! - **`validate.rs`** - parse a file and list every key with its kind
//! - **`config.rs`** - decode a configuration strictly and write it back
//!
//! Run one with: `cargo run --example <name>`

pub mod datetime;
pub mod de;
pub mod error;
pub mod kind;
pub(crate) mod lexer;
pub mod macros;
pub mod map;
pub mod metadata;
pub mod options;
pub mod parser;
pub mod ser;
pub mod token;
pub mod value;

pub use datetime::{Datetime, DatetimeParseError, Offset};
pub use de::{from_value, Deserializer};
pub use error::{Error, Result};
pub use kind::Kind;
pub use map::Table;
pub use metadata::{Key, Metadata};
pub use options::{DecodeOptions, EncodeOptions};
pub use parser::Document;
pub use ser::{Serializer, ValueSerializer};
pub use value::Value;

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io;
use std::path::Path;

/// Parses TOML text into a [`Document`]: the tree plus its metadata.
///
/// # Examples
///
/// ```rust
/// use serde_tomlkit::parse;
///
/// let doc = parse("a.b = 1\n").unwrap();
/// let keys: Vec<String> = doc.metadata().keys().map(|k| k.to_string()).collect();
/// assert_eq!(keys, ["a", "a.b"]);
/// ```
///
/// # Errors
///
/// Returns [`Error::Lex`] for malformed tokens and [`Error::Parse`] for grammar
/// violations such as duplicate keys. No partial tree is returned.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn parse(text: &str) -> Result<Document> {
    parser::parse_document(text)
}

/// Parses `text` and decodes it into `T`.
///
/// Returns the decoded value together with the metadata, whose
/// [`undecoded`](Metadata::undecoded) lists the keys `T` did not consume.
///
/// # Examples
///
/// ```rust
/// use serde::Deserialize;
/// use serde_tomlkit::{decode, DecodeOptions};
///
/// #[derive(Deserialize)]
/// struct Config { a: i64 }
///
/// let (config, metadata) = decode::<Config>("a = 1\nb = 2\n", DecodeOptions::new()).unwrap();
/// assert_eq!(config.a, 1);
/// assert_eq!(metadata.undecoded().len(), 1);
/// ```
///
/// # Errors
///
/// Returns parse errors, the first decode error, or in strict mode
/// [`Error::UnmatchedKeys`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn decode<T>(text: &str, options: DecodeOptions) -> Result<(T, Metadata)>
where
    T: DeserializeOwned,
{
    let document = parse(text)?;
    document.decode(options)
}

/// Deserialize an instance of type `T` from a string of TOML text.
///
/// Keys the type does not know about are ignored.
///
/// # Examples
///
/// ```rust
/// use serde_tomlkit::from_str;
/// use serde::Deserialize;
///
/// #[derive(Deserialize, PartialEq, Debug)]
/// struct Point { x: i32, y: i32 }
///
/// let point: Point = from_str("x = 1\ny = 2\nz = 3\n").unwrap();
/// assert_eq!(point, Point { x: 1, y: 2 });
/// ```
///
/// # Errors
///
/// Returns an error if the input is not valid TOML or does not fit `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str<T>(s: &str) -> Result<T>
where
    T: DeserializeOwned,
{
    decode(s, DecodeOptions::default()).map(|(value, _)| value)
}

/// Like [`from_str`], but fails if any key of the document is left unconsumed.
///
/// # Errors
///
/// Returns [`Error::UnmatchedKeys`] with every unconsumed key, besides the
/// errors [`from_str`] can return.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str_strict<T>(s: &str) -> Result<T>
where
    T: DeserializeOwned,
{
    decode(s, DecodeOptions::strict()).map(|(value, _)| value)
}

/// Deserialize an instance of type `T` from bytes of TOML text.
///
/// # Examples
///
/// ```rust
/// use serde_tomlkit::from_slice;
/// use serde::Deserialize;
///
/// #[derive(Deserialize, PartialEq, Debug)]
/// struct Point { x: i32, y: i32 }
///
/// let point: Point = from_slice(b"x = 1\ny = 2").unwrap();
/// assert_eq!(point, Point { x: 1, y: 2 });
/// ```
///
/// # Errors
///
/// Returns an error if the bytes are not valid UTF-8, not valid TOML,
/// or cannot be deserialized to type `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_slice<T>(v: &[u8]) -> Result<T>
where
    T: DeserializeOwned,
{
    let s = std::str::from_utf8(v).map_err(|e| Error::custom(e.to_string()))?;
    from_str(s)
}

/// Deserialize an instance of type `T` from an I/O stream of TOML.
///
/// # Examples
///
/// ```rust
/// use serde_tomlkit::from_reader;
/// use serde::Deserialize;
/// use std::io::Cursor;
///
/// #[derive(Deserialize, PartialEq, Debug)]
/// struct Point { x: i32, y: i32 }
///
/// let point: Point = from_reader(Cursor::new(b"x = 1\ny = 2")).unwrap();
/// assert_eq!(point, Point { x: 1, y: 2 });
/// ```
///
/// # Errors
///
/// Returns an error if reading fails, the input is not valid TOML,
/// or the data cannot be deserialized to type `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_reader<R, T>(mut reader: R) -> Result<T>
where
    R: io::Read,
    T: DeserializeOwned,
{
    let mut string = String::new();
    reader
        .read_to_string(&mut string)
        .map_err(|e| Error::io(&e.to_string()))?;
    from_str(&string)
}

/// Reads the file at `path` and decodes it into `T`.
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be read, plus anything [`decode`]
/// can return.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_path<T, P>(path: P, options: DecodeOptions) -> Result<(T, Metadata)>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .map_err(|e| Error::io(&format!("{}: {}", path.display(), e)))?;
    decode(&text, options)
}

/// Serialize any `T: Serialize` to a TOML string.
///
/// `T` must serialize as a table: a struct or a map.
///
/// # Examples
///
/// ```rust
/// use serde_tomlkit::to_string;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Point { x: i32, y: i32 }
///
/// assert_eq!(to_string(&Point { x: 1, y: 2 }).unwrap(), "x = 1\ny = 2\n");
/// ```
///
/// # Errors
///
/// Returns an error if `T` is not table-shaped or holds a value TOML cannot
/// represent.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string<T>(value: &T) -> Result<String>
where
    T: ?Sized + Serialize,
{
    to_string_with_options(value, EncodeOptions::default())
}

/// Serialize any `T: Serialize` to a TOML string with nested sections indented.
///
/// # Errors
///
/// Returns an error if the value cannot be serialized.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string_pretty<T>(value: &T) -> Result<String>
where
    T: ?Sized + Serialize,
{
    to_string_with_options(value, EncodeOptions::pretty())
}

/// Serialize any `T: Serialize` to a TOML string with custom options.
///
/// # Errors
///
/// Returns an error if the value cannot be serialized.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string_with_options<T>(value: &T, options: EncodeOptions) -> Result<String>
where
    T: ?Sized + Serialize,
{
    let mut serializer = Serializer::new(options);
    value.serialize(&mut serializer)?;
    Ok(serializer.into_inner())
}

/// Convert any `T: Serialize` to a [`Value`].
///
/// # Examples
///
/// ```rust
/// use serde_tomlkit::{to_value, Value};
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Point { x: i32, y: i32 }
///
/// let value = to_value(&Point { x: 1, y: 2 }).unwrap();
/// assert_eq!(value.get("x"), Some(&Value::Integer(1)));
/// ```
///
/// # Errors
///
/// Returns an error if the value cannot be serialized.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_value<T>(value: &T) -> Result<Value>
where
    T: ?Sized + Serialize,
{
    value.serialize(ValueSerializer)
}

/// Serialize any `T: Serialize` to a writer in TOML format.
///
/// # Errors
///
/// Returns an error if serialization fails or writing to the writer fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer<W, T>(writer: W, value: &T) -> Result<()>
where
    W: io::Write,
    T: ?Sized + Serialize,
{
    to_writer_with_options(writer, value, EncodeOptions::default())
}

/// Serialize any `T: Serialize` to a writer in TOML format with custom options.
///
/// # Errors
///
/// Returns an error if serialization fails or writing to the writer fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer_with_options<W, T>(mut writer: W, value: &T, options: EncodeOptions) -> Result<()>
where
    W: io::Write,
    T: ?Sized + Serialize,
{
    let text = to_string_with_options(value, options)?;
    writer
        .write_all(text.as_bytes())
        .map_err(|e| Error::io(&e.to_string()))?;
    Ok(())
}
