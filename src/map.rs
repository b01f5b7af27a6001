//! Ordered map type for TOML tables.
//!
//! [`Table`] wraps an [`IndexMap`] so iteration follows insertion order: a
//! parsed table lists its keys in source order, and a table built by the
//! encoder lists struct fields in declaration order.
//!
//! Equality ignores order, so two tables with the same entries compare equal
//! however they were built.
//!
//! ```rust
//! use serde_tomlkit::{Table, Value};
//!
//! let mut table = Table::new();
//! table.insert("name".to_string(), Value::from("Alice"));
//! table.insert("age".to_string(), Value::from(30));
//!
//! assert_eq!(table.len(), 2);
//! assert_eq!(table.get("name").and_then(|v| v.as_str()), Some("Alice"));
//! ```

use crate::value::Value;
use indexmap::IndexMap;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// An ordered map of keys to TOML values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table(IndexMap<String, Value>);

impl Table {
    /// Creates an empty `Table`.
    #[must_use]
    pub fn new() -> Self {
        Table(IndexMap::new())
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Table(IndexMap::with_capacity(capacity))
    }

    /// Inserts a key-value pair, keeping the original position if the key
    /// already existed.
    pub fn insert(&mut self, key: String, value: Value) -> Option<Value> {
        self.0.insert(key, value)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.0.get_mut(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Removes a key, preserving the order of the remaining entries.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.shift_remove(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> indexmap::map::Keys<'_, String, Value> {
        self.0.keys()
    }

    pub fn values(&self) -> indexmap::map::Values<'_, String, Value> {
        self.0.values()
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Value> {
        self.0.iter()
    }

    /// Sorts entries lexicographically by key.
    pub fn sort_keys(&mut self) {
        self.0.sort_keys();
    }

    /// Looks up a dotted path of keys through nested tables.
    ///
    /// ```rust
    /// use serde_tomlkit::parse;
    ///
    /// let doc = parse("[server]\nport = 8080\n").unwrap();
    /// let port = doc.table().get_path(&["server", "port"]);
    /// assert_eq!(port.and_then(|v| v.as_integer()), Some(8080));
    /// ```
    pub fn get_path(&self, path: &[&str]) -> Option<&Value> {
        let (last, parents) = path.split_last()?;
        let mut table = self;
        for segment in parents {
            table = table.get(segment)?.as_table()?;
        }
        table.get(last)
    }
}

impl fmt::Display for Table {
    /// Emits the table as a TOML document, keeping its key order.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        crate::ser::write_document(&mut out, self, &crate::options::EncodeOptions::default());
        f.write_str(&out)
    }
}

impl From<HashMap<String, Value>> for Table {
    fn from(map: HashMap<String, Value>) -> Self {
        let mut table: Table = map.into_iter().collect();
        table.sort_keys();
        table
    }
}

impl From<BTreeMap<String, Value>> for Table {
    fn from(map: BTreeMap<String, Value>) -> Self {
        map.into_iter().collect()
    }
}

impl From<Table> for HashMap<String, Value> {
    fn from(table: Table) -> Self {
        table.0.into_iter().collect()
    }
}

impl IntoIterator for Table {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Table {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<(String, Value)> for Table {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Table(IndexMap::from_iter(iter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insertion_order_is_kept() {
        let mut table = Table::new();
        table.insert("zebra".to_string(), Value::from(1));
        table.insert("apple".to_string(), Value::from(2));
        let keys: Vec<_> = table.keys().cloned().collect();
        assert_eq!(keys, vec!["zebra", "apple"]);

        table.sort_keys();
        let keys: Vec<_> = table.keys().cloned().collect();
        assert_eq!(keys, vec!["apple", "zebra"]);
    }

    #[test]
    fn test_equality_ignores_order() {
        let a: Table = [("x", 1), ("y", 2)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), Value::from(v)))
            .collect();
        let b: Table = [("y", 2), ("x", 1)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), Value::from(v)))
            .collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_remove_preserves_order() {
        let mut table: Table = ["a", "b", "c"]
            .into_iter()
            .map(|k| (k.to_string(), Value::from(true)))
            .collect();
        table.remove("b");
        let keys: Vec<_> = table.keys().cloned().collect();
        assert_eq!(keys, vec!["a", "c"]);
    }
}
