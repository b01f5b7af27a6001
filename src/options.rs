//! Options for encoding and decoding.
//!
//! - [`EncodeOptions`]: layout of the emitted document
//! - [`DecodeOptions`]: how strictly a document must match the target type
//!
//! ## Examples
//!
//! ```rust
//! use serde_tomlkit::{to_string_with_options, EncodeOptions};
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct Server { host: String }
//!
//! #[derive(Serialize)]
//! struct Config { server: Server }
//!
//! let config = Config { server: Server { host: "localhost".into() } };
//!
//! let flat = to_string_with_options(&config, EncodeOptions::new()).unwrap();
//! assert_eq!(flat, "[server]\nhost = 'localhost'\n");
//!
//! let pretty = to_string_with_options(&config, EncodeOptions::pretty().with_indent(4)).unwrap();
//! assert_eq!(pretty, "[server]\n    host = 'localhost'\n");
//! ```

/// Layout options for the encoder.
///
/// The default is a flat layout: every header and key starts at column one.
/// Pretty output indents each table's keys (and nested headers) by
/// `indent` spaces per level of nesting.
///
/// # Examples
///
/// ```rust
/// use serde_tomlkit::EncodeOptions;
///
/// let options = EncodeOptions::new();
/// assert_eq!(options.indent, 2);
/// assert!(!options.pretty);
///
/// let options = EncodeOptions::pretty().with_indent(4);
/// assert!(options.pretty);
/// assert_eq!(options.indent, 4);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodeOptions {
    pub indent: usize,
    pub pretty: bool,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        EncodeOptions {
            indent: 2,
            pretty: false,
        }
    }
}

impl EncodeOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Options for indented output.
    #[must_use]
    pub fn pretty() -> Self {
        EncodeOptions {
            pretty: true,
            ..Default::default()
        }
    }

    /// Sets the number of spaces per nesting level. Only affects pretty output.
    #[must_use]
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }
}

/// Options for the decoder.
///
/// In strict mode a decode fails if any key of the document was not consumed
/// by the target type. The error lists every such key, in the order the keys
/// appear in the document.
///
/// # Examples
///
/// ```rust
/// use serde_tomlkit::{decode, DecodeOptions, Error};
/// use serde::Deserialize;
///
/// #[derive(Debug, Deserialize)]
/// struct Config { a: i64 }
///
/// let text = "a = 1\nb = 2\n";
/// assert!(decode::<Config>(text, DecodeOptions::new()).is_ok());
///
/// let err = decode::<Config>(text, DecodeOptions::strict()).unwrap_err();
/// assert!(matches!(err, Error::UnmatchedKeys { .. }));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DecodeOptions {
    pub strict: bool,
}

impl DecodeOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Options that reject documents with keys the target does not consume.
    #[must_use]
    pub fn strict() -> Self {
        DecodeOptions { strict: true }
    }

    #[must_use]
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}
