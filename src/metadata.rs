//! Key paths and the metadata index built alongside a document.
//!
//! The parser records one entry per leaf key and per table, in the order the
//! keys first appear in the text. Headers that re-enter a table, and repeated
//! `[[array]]` elements, do not add entries: keys inside an array of tables are
//! recorded once, without an element index (`products.name`).
//!
//! After a decode, the index also knows which keys were consumed by the target
//! type, which is what strict mode reports on.
//!
//! ```rust
//! use serde_tomlkit::{parse, Kind};
//!
//! let doc = parse("title = 'x'\n[owner]\nname = 'Tom'\n").unwrap();
//! let keys: Vec<String> = doc.metadata().keys().map(|k| k.to_string()).collect();
//! assert_eq!(keys, ["title", "owner", "owner.name"]);
//! assert_eq!(doc.metadata().type_of(&["owner"]), Some(Kind::Table));
//! ```

use crate::kind::Kind;
use indexmap::IndexMap;
use std::collections::HashSet;
use std::fmt;

/// A fully qualified key path such as `servers.alpha.ip`.
///
/// Segments are stored unquoted; `Display` quotes the ones that are not bare keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Key(Vec<String>);

impl Key {
    /// The empty path, naming the document root.
    #[must_use]
    pub fn root() -> Self {
        Key(Vec::new())
    }

    #[must_use]
    pub fn new(segments: Vec<String>) -> Self {
        Key(segments)
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the last segment, if any.
    pub fn last(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    /// Returns a new path with `segment` appended.
    #[must_use]
    pub fn child(&self, segment: &str) -> Key {
        let mut segments = Vec::with_capacity(self.0.len() + 1);
        segments.extend(self.0.iter().cloned());
        segments.push(segment.to_string());
        Key(segments)
    }

    /// Returns a new path made of this path followed by `rest`.
    #[must_use]
    pub fn join(&self, rest: &[String]) -> Key {
        let mut segments = self.0.clone();
        segments.extend(rest.iter().cloned());
        Key(segments)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                out.push('.');
            }
            crate::ser::write_key(&mut out, segment);
        }
        f.write_str(&out)
    }
}

impl<const N: usize> From<[&str; N]> for Key {
    fn from(segments: [&str; N]) -> Self {
        Key(segments.iter().map(|s| s.to_string()).collect())
    }
}

impl From<&[&str]> for Key {
    fn from(segments: &[&str]) -> Self {
        Key(segments.iter().map(|s| s.to_string()).collect())
    }
}

impl From<Vec<String>> for Key {
    fn from(segments: Vec<String>) -> Self {
        Key(segments)
    }
}

/// Key paths of a document with their kinds, in discovery order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metadata {
    entries: IndexMap<Key, Kind>,
    decoded: HashSet<Key>,
}

impl Metadata {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Records `key` unless it is already known; the first kind seen wins.
    pub(crate) fn record(&mut self, key: Key, kind: Kind) {
        self.entries.entry(key).or_insert(kind);
    }

    pub(crate) fn set_decoded(&mut self, decoded: HashSet<Key>) {
        self.decoded = decoded;
    }

    /// Returns every key path in first-discovery order.
    pub fn keys(&self) -> impl Iterator<Item = &Key> + '_ {
        self.entries.keys()
    }

    /// Returns `(key, kind)` pairs in first-discovery order.
    pub fn entries(&self) -> impl Iterator<Item = (&Key, Kind)> + '_ {
        self.entries.iter().map(|(key, kind)| (key, *kind))
    }

    /// Returns the kind recorded for an exact key path.
    ///
    /// ```rust
    /// use serde_tomlkit::{parse, Kind};
    ///
    /// let doc = parse("[[fruit]]\nname = 'apple'\n").unwrap();
    /// assert_eq!(doc.metadata().type_of(&["fruit"]), Some(Kind::ArrayOfTables));
    /// assert_eq!(doc.metadata().type_of(&["fruit", "name"]), Some(Kind::String));
    /// assert_eq!(doc.metadata().type_of(&["fruit", "color"]), None);
    /// ```
    pub fn type_of(&self, path: &[&str]) -> Option<Kind> {
        self.entries.get(&Key::from(path)).copied()
    }

    /// Same as [`Metadata::type_of`] for an owned [`Key`].
    pub fn kind(&self, key: &Key) -> Option<Kind> {
        self.entries.get(key).copied()
    }

    pub fn is_defined(&self, path: &[&str]) -> bool {
        self.entries.contains_key(&Key::from(path))
    }

    /// Position of `key` in discovery order.
    pub fn discovery_index(&self, key: &Key) -> Option<usize> {
        self.entries.get_index_of(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the keys no decode has consumed, in discovery order.
    ///
    /// Before any decode every key is undecoded.
    pub fn undecoded(&self) -> Vec<Key> {
        self.entries
            .keys()
            .filter(|key| !self.decoded.contains(*key))
            .cloned()
            .collect()
    }
}
