//! TOML deserialization.
//!
//! Decoding works on a parsed [`Document`]. The [`Deserializer`] walks the tree
//! while serde drives it, and remembers the key path of every node the target
//! type consumed. Those paths end up in the returned [`Metadata`], and strict
//! mode turns any leftover key into an [`Error::UnmatchedKeys`].
//!
//! ## Matching rules
//!
//! - Struct fields match keys exactly first, then case-insensitively.
//! - Missing fields are an error unless the field has `#[serde(default)]` or is
//!   an `Option`.
//! - Integers decode into float targets; floats never decode into integers.
//! - Integer targets narrower than `i64` are range checked.
//! - Datetimes decode into [`Datetime`](crate::Datetime), or into any type that
//!   parses itself from a string (such as the chrono types).
//! - A field of type [`Value`] captures the subtree untouched.
//!
//! Keys consumed through `#[serde(flatten)]` are buffered by serde as a whole,
//! so every key of a table holding a flattened field counts as decoded, even
//! one the flattened struct then ignores. Strict mode cannot flag those.
//!
//! ## Usage
//!
//! ```rust
//! use serde_tomlkit::{parse, DecodeOptions};
//! use serde::Deserialize;
//!
//! #[derive(Deserialize, Debug, PartialEq)]
//! struct Server { host: String, port: u16 }
//!
//! let doc = parse("Host = 'localhost'\nport = 8080\nextra = true\n").unwrap();
//! let (server, metadata): (Server, _) = doc.decode(DecodeOptions::new()).unwrap();
//! assert_eq!(server, Server { host: "localhost".into(), port: 8080 });
//!
//! let undecoded: Vec<String> = metadata.undecoded().iter().map(|k| k.to_string()).collect();
//! assert_eq!(undecoded, ["extra"]);
//! ```

use crate::datetime::{self, Datetime};
use crate::error::{Error, Result};
use crate::map::Table;
use crate::metadata::{Key, Metadata};
use crate::options::DecodeOptions;
use crate::parser::Document;
use crate::value::Value;
use serde::de::value::{BorrowedStrDeserializer, StringDeserializer};
use serde::de::DeserializeOwned;
use serde::{de, forward_to_deserialize_any, Deserialize};
use std::cell::RefCell;
use std::collections::HashSet;
use tracing::debug;

type Decoded = RefCell<HashSet<Key>>;

/// The TOML deserializer.
///
/// Borrows a [`Document`]; strings can be decoded as `&str` without copying.
/// Created via [`Deserializer::new`] or [`Deserializer::with_options`].
pub struct Deserializer<'de> {
    document: &'de Document,
    options: DecodeOptions,
    decoded: Decoded,
}

impl<'de> Deserializer<'de> {
    pub fn new(document: &'de Document) -> Self {
        Self::with_options(document, DecodeOptions::default())
    }

    pub fn with_options(document: &'de Document, options: DecodeOptions) -> Self {
        Deserializer {
            document,
            options,
            decoded: RefCell::new(HashSet::new()),
        }
    }

    /// Decodes the document into `T` and returns it with the document's
    /// metadata, updated with the keys `T` consumed.
    ///
    /// # Errors
    ///
    /// Returns the first decode error, or in strict mode an
    /// [`Error::UnmatchedKeys`] listing every unconsumed key in document order.
    pub fn decode<T: Deserialize<'de>>(self) -> Result<(T, Metadata)> {
        let value = T::deserialize(&self)?;

        let mut metadata = self.document.metadata().clone();
        metadata.set_decoded(self.decoded.into_inner());
        let undecoded = metadata.undecoded();
        debug!(
            keys = metadata.len(),
            undecoded = undecoded.len(),
            strict = self.options.strict,
            "decoded document"
        );

        if self.options.strict && !undecoded.is_empty() {
            return Err(Error::unmatched_keys(undecoded));
        }
        Ok((value, metadata))
    }

    fn root(&self) -> TableAccess<'de, '_> {
        TableAccess::new(self.document.table(), Key::root(), &self.decoded, None)
    }
}

impl<'de> de::Deserializer<'de> for &Deserializer<'de> {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor
            .visit_map(self.root())
            .map_err(|e| e.at(&Key::root()))
    }

    fn deserialize_struct<V>(
        self,
        _name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        let access = TableAccess::new(
            self.document.table(),
            Key::root(),
            &self.decoded,
            Some(fields),
        );
        visitor
            .visit_map(access)
            .map_err(|e| e.at(&Key::root()))
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_some(self)
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_ignored_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_unit()
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf unit unit_struct seq tuple tuple_struct map enum identifier
    }
}

fn mismatch(expected: &str, found: &Value) -> Error {
    Error::TypeMismatch {
        key: None,
        expected: expected.to_string(),
        found: found.kind().to_string(),
    }
}

/// Deserializes one tree node found at `path`.
struct ValueDeserializer<'de, 's> {
    value: &'de Value,
    path: Key,
    decoded: &'s Decoded,
}

impl<'de, 's> ValueDeserializer<'de, 's> {
    fn new(value: &'de Value, path: Key, decoded: &'s Decoded) -> Self {
        ValueDeserializer {
            value,
            path,
            decoded,
        }
    }

    fn mark(&self) {
        self.decoded.borrow_mut().insert(self.path.clone());
    }

    fn table(&self, table: &'de Table, fields: Option<&'static [&'static str]>) -> TableAccess<'de, 's> {
        TableAccess::new(table, self.path.clone(), self.decoded, fields)
    }

    fn array(&self, items: &'de [Value]) -> ArrayAccess<'de, 's> {
        ArrayAccess {
            iter: items.iter(),
            path: self.path.clone(),
            decoded: self.decoded,
        }
    }
}

macro_rules! deserialize_integer {
    ($($method:ident)*) => {$(
        fn $method<V>(self, visitor: V) -> Result<V::Value>
        where
            V: de::Visitor<'de>,
        {
            self.mark();
            match self.value {
                Value::Integer(i) => visitor.visit_i64(*i),
                other => Err(mismatch("Integer", other)),
            }
            .map_err(|e| e.at(&self.path))
        }
    )*};
}

macro_rules! deserialize_float {
    ($($method:ident)*) => {$(
        fn $method<V>(self, visitor: V) -> Result<V::Value>
        where
            V: de::Visitor<'de>,
        {
            self.mark();
            match self.value {
                Value::Float(f) => visitor.visit_f64(*f),
                Value::Integer(i) => visitor.visit_f64(*i as f64),
                other => Err(mismatch("Float", other)),
            }
            .map_err(|e| e.at(&self.path))
        }
    )*};
}

impl<'de, 's> de::Deserializer<'de> for ValueDeserializer<'de, 's> {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.mark();
        match self.value {
            Value::String(s) => visitor.visit_borrowed_str(s),
            Value::Integer(i) => visitor.visit_i64(*i),
            Value::Float(f) => visitor.visit_f64(*f),
            Value::Boolean(b) => visitor.visit_bool(*b),
            Value::Datetime(dt) => visitor.visit_map(DatetimeAccess::new(*dt)),
            Value::Array(items) => visitor.visit_seq(self.array(items)),
            Value::Table(table) => visitor.visit_map(self.table(table, None)),
        }
        .map_err(|e| e.at(&self.path))
    }

    deserialize_integer! {
        deserialize_i8 deserialize_i16 deserialize_i32 deserialize_i64 deserialize_i128
        deserialize_u8 deserialize_u16 deserialize_u32 deserialize_u64 deserialize_u128
    }

    deserialize_float! { deserialize_f32 deserialize_f64 }

    fn deserialize_bool<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.mark();
        match self.value {
            Value::Boolean(b) => visitor.visit_bool(*b),
            other => Err(mismatch("Bool", other)),
        }
        .map_err(|e| e.at(&self.path))
    }

    fn deserialize_str<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.mark();
        match self.value {
            Value::String(s) => visitor.visit_borrowed_str(s),
            Value::Datetime(dt) => visitor.visit_string(dt.to_string()),
            other => Err(mismatch("String", other)),
        }
        .map_err(|e| e.at(&self.path))
    }

    fn deserialize_string<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_str(visitor)
    }

    fn deserialize_char<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_str(visitor)
    }

    fn deserialize_identifier<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_str(visitor)
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_some(self)
    }

    fn deserialize_unit<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.mark();
        match self.value {
            Value::Table(table) if table.is_empty() => visitor.visit_unit(),
            other => Err(mismatch("empty Table", other)),
        }
        .map_err(|e| e.at(&self.path))
    }

    fn deserialize_unit_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_unit(visitor)
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.mark();
        match self.value {
            Value::Array(items) => visitor.visit_seq(self.array(items)),
            other => Err(mismatch("Array", other)),
        }
        .map_err(|e| e.at(&self.path))
    }

    fn deserialize_tuple<V>(self, _len: usize, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_tuple_struct<V>(
        self,
        _name: &'static str,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_map<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.mark();
        match self.value {
            Value::Table(table) => visitor.visit_map(self.table(table, None)),
            other => Err(mismatch("Table", other)),
        }
        .map_err(|e| e.at(&self.path))
    }

    fn deserialize_struct<V>(
        self,
        name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.mark();
        let result = if name == datetime::NAME {
            match self.value {
                Value::Datetime(dt) => visitor.visit_map(DatetimeAccess::new(*dt)),
                other => Err(mismatch("Datetime", other)),
            }
        } else {
            match self.value {
                Value::Table(table) => visitor.visit_map(self.table(table, Some(fields))),
                other => Err(mismatch("Table", other)),
            }
        };
        result.map_err(|e| e.at(&self.path))
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.mark();
        match self.value {
            Value::String(s) => visitor.visit_enum(BorrowedStrDeserializer::<Error>::new(s)),
            Value::Table(table) if table.len() == 1 => match table.iter().next() {
                Some((variant, value)) => visitor.visit_enum(TableVariant {
                    variant,
                    value,
                    path: self.path.child(variant),
                    decoded: self.decoded,
                }),
                None => Err(mismatch("enum variant", self.value)),
            },
            other => Err(mismatch("String or single-key Table", other)),
        }
        .map_err(|e| e.at(&self.path))
    }

    fn deserialize_ignored_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_unit()
    }

    forward_to_deserialize_any! { bytes byte_buf }
}

/// Walks a table's entries, resolving keys against struct fields when known.
struct TableAccess<'de, 's> {
    table: &'de Table,
    iter: indexmap::map::Iter<'de, String, Value>,
    path: Key,
    decoded: &'s Decoded,
    fields: Option<&'static [&'static str]>,
    claimed: Vec<&'static str>,
    pending: Option<(&'de String, &'de Value)>,
}

impl<'de, 's> TableAccess<'de, 's> {
    fn new(
        table: &'de Table,
        path: Key,
        decoded: &'s Decoded,
        fields: Option<&'static [&'static str]>,
    ) -> Self {
        TableAccess {
            table,
            iter: table.iter(),
            path,
            decoded,
            fields,
            claimed: Vec::new(),
            pending: None,
        }
    }

    /// Maps a document key to the struct field it should fill.
    ///
    /// An exact match always wins. Otherwise the first field equal to the key
    /// ignoring case is used, unless the table also holds that field's exact
    /// name or another key already claimed it.
    ///
    /// serde hands over field names after `#[serde(rename)]` is applied, so a
    /// renamed field cannot be told apart and matches ignoring case as well.
    fn resolve(&mut self, key: &'de str) -> &'de str {
        let Some(fields) = self.fields else {
            return key;
        };
        if fields.iter().any(|field| *field == key) {
            return key;
        }
        let folded = key.to_lowercase();
        for &field in fields {
            if field.to_lowercase() == folded
                && !self.table.contains_key(field)
                && !self.claimed.contains(&field)
            {
                self.claimed.push(field);
                return field;
            }
        }
        key
    }
}

impl<'de, 's> de::MapAccess<'de> for TableAccess<'de, 's> {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: de::DeserializeSeed<'de>,
    {
        let Some((key, value)) = self.iter.next() else {
            return Ok(None);
        };
        self.pending = Some((key, value));
        let name = self.resolve(key);
        seed.deserialize(BorrowedStrDeserializer::new(name)).map(Some)
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: de::DeserializeSeed<'de>,
    {
        match self.pending.take() {
            Some((key, value)) => {
                seed.deserialize(ValueDeserializer::new(value, self.path.child(key), self.decoded))
            }
            None => Err(Error::custom("next_value_seed called before next_key_seed")),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

/// Elements share the array's own path, so `[[products]]` entries all mark
/// `products.name` and friends.
struct ArrayAccess<'de, 's> {
    iter: std::slice::Iter<'de, Value>,
    path: Key,
    decoded: &'s Decoded,
}

impl<'de, 's> de::SeqAccess<'de> for ArrayAccess<'de, 's> {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some(value) => seed
                .deserialize(ValueDeserializer::new(value, self.path.clone(), self.decoded))
                .map(Some),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

/// Presents a datetime as the single-field struct [`Datetime`] deserializes from.
struct DatetimeAccess {
    datetime: Option<Datetime>,
    key_sent: bool,
}

impl DatetimeAccess {
    fn new(datetime: Datetime) -> Self {
        DatetimeAccess {
            datetime: Some(datetime),
            key_sent: false,
        }
    }
}

impl<'de> de::MapAccess<'de> for DatetimeAccess {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: de::DeserializeSeed<'de>,
    {
        if self.key_sent {
            return Ok(None);
        }
        self.key_sent = true;
        seed.deserialize(BorrowedStrDeserializer::new(datetime::FIELD))
            .map(Some)
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: de::DeserializeSeed<'de>,
    {
        match self.datetime.take() {
            Some(dt) => seed.deserialize(StringDeserializer::new(dt.to_string())),
            None => Err(Error::custom("datetime value requested twice")),
        }
    }
}

/// An enum written as a table with a single key naming the variant.
struct TableVariant<'de, 's> {
    variant: &'de str,
    value: &'de Value,
    path: Key,
    decoded: &'s Decoded,
}

impl<'de, 's> de::EnumAccess<'de> for TableVariant<'de, 's> {
    type Error = Error;
    type Variant = Self;

    fn variant_seed<V>(self, seed: V) -> Result<(V::Value, Self::Variant)>
    where
        V: de::DeserializeSeed<'de>,
    {
        let variant = seed.deserialize(BorrowedStrDeserializer::new(self.variant))?;
        Ok((variant, self))
    }
}

impl<'de, 's> de::VariantAccess<'de> for TableVariant<'de, 's> {
    type Error = Error;

    fn unit_variant(self) -> Result<()> {
        de::Deserializer::deserialize_unit(
            ValueDeserializer::new(self.value, self.path, self.decoded),
            de::IgnoredAny,
        )
        .map(|_| ())
    }

    fn newtype_variant_seed<T>(self, seed: T) -> Result<T::Value>
    where
        T: de::DeserializeSeed<'de>,
    {
        seed.deserialize(ValueDeserializer::new(self.value, self.path, self.decoded))
    }

    fn tuple_variant<V>(self, _len: usize, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        de::Deserializer::deserialize_seq(
            ValueDeserializer::new(self.value, self.path, self.decoded),
            visitor,
        )
    }

    fn struct_variant<V>(self, fields: &'static [&'static str], visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        de::Deserializer::deserialize_struct(
            ValueDeserializer::new(self.value, self.path, self.decoded),
            "",
            fields,
            visitor,
        )
    }
}

/// Decodes a borrowed [`Value`] tree into `T`.
///
/// Error paths are relative to `value`.
pub(crate) fn from_value_ref<'de, T>(value: &'de Value) -> Result<T>
where
    T: Deserialize<'de>,
{
    let decoded = RefCell::new(HashSet::new());
    T::deserialize(ValueDeserializer::new(value, Key::root(), &decoded))
}

/// Decodes an owned [`Value`] tree into `T`.
///
/// # Examples
///
/// ```rust
/// use serde_tomlkit::{from_value, toml};
/// use serde::Deserialize;
///
/// #[derive(Deserialize, Debug, PartialEq)]
/// struct Point { x: i32, y: i32 }
///
/// let point: Point = from_value(toml!({"x": 1, "y": 2})).unwrap();
/// assert_eq!(point, Point { x: 1, y: 2 });
/// ```
///
/// # Errors
///
/// Returns an error if the tree does not fit `T`.
pub fn from_value<T>(value: Value) -> Result<T>
where
    T: DeserializeOwned,
{
    from_value_ref(&value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::Kind;
    use crate::parser::parse_document;
    use serde::Deserialize;
    use std::collections::HashMap;

    fn decode<T: DeserializeOwned>(text: &str, options: DecodeOptions) -> Result<(T, Metadata)> {
        let doc = parse_document(text)?;
        Deserializer::with_options(&doc, options).decode()
    }

    #[derive(Deserialize, Debug, PartialEq)]
    struct Small {
        a: i64,
    }

    #[test]
    fn test_strict_lists_every_unmatched_key_in_order() {
        let err = decode::<Small>("a = 1\nb = 2\nc = 3\n", DecodeOptions::strict()).unwrap_err();
        match err {
            Error::UnmatchedKeys { keys } => {
                assert_eq!(keys, vec![Key::from(["b"]), Key::from(["c"])]);
            }
            other => panic!("expected unmatched keys, got {other:?}"),
        }
    }

    #[test]
    fn test_non_strict_reports_undecoded() {
        let (small, metadata) = decode::<Small>("a = 1\nb = 2\nc = 3\n", DecodeOptions::new()).unwrap();
        assert_eq!(small, Small { a: 1 });
        assert_eq!(metadata.undecoded(), vec![Key::from(["b"]), Key::from(["c"])]);
    }

    #[test]
    fn test_unmatched_nested_table_reports_table_and_children() {
        let err = decode::<Small>("a = 1\n[extra]\nx = 1\n", DecodeOptions::strict()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unmatched keys: extra, extra.x"
        );
    }

    #[test]
    fn test_case_insensitive_field_match() {
        #[derive(Deserialize, Debug, PartialEq)]
        struct Server {
            host: String,
            port: u16,
        }
        let (server, _) =
            decode::<Server>("HOST = 'a'\nPort = 80\n", DecodeOptions::strict()).unwrap();
        assert_eq!(server, Server { host: "a".into(), port: 80 });
    }

    #[test]
    fn test_exact_match_beats_folded_match() {
        #[derive(Deserialize, Debug, PartialEq)]
        struct Named {
            name: String,
        }
        let (named, metadata) =
            decode::<Named>("Name = 'folded'\nname = 'exact'\n", DecodeOptions::new()).unwrap();
        assert_eq!(named.name, "exact");
        assert_eq!(metadata.undecoded(), vec![Key::from(["Name"])]);
    }

    #[test]
    fn test_missing_key_names_full_path() {
        #[derive(Deserialize, Debug)]
        #[allow(dead_code)]
        struct Database {
            user: String,
            password: String,
        }
        #[derive(Deserialize, Debug)]
        #[allow(dead_code)]
        struct Config {
            database: Database,
        }
        let err = decode::<Config>("[database]\nuser = 'x'\n", DecodeOptions::new()).unwrap_err();
        assert_eq!(err.key(), Some(&Key::from(["database", "password"])));
    }

    #[test]
    fn test_defaults_and_options_fill_gaps() {
        #[derive(Deserialize, Debug, PartialEq)]
        struct Config {
            #[serde(default)]
            retries: u32,
            timeout: Option<u32>,
            name: String,
        }
        let (config, _) = decode::<Config>("name = 'x'\n", DecodeOptions::strict()).unwrap();
        assert_eq!(
            config,
            Config { retries: 0, timeout: None, name: "x".into() }
        );
    }

    #[test]
    fn test_type_mismatch_names_path_and_kinds() {
        #[derive(Deserialize, Debug)]
        #[allow(dead_code)]
        struct Server {
            port: u16,
        }
        #[derive(Deserialize, Debug)]
        #[allow(dead_code)]
        struct Config {
            server: Server,
        }
        let err = decode::<Config>("[server]\nport = 'eighty'\n", DecodeOptions::new()).unwrap_err();
        match err {
            Error::TypeMismatch { key, expected, found } => {
                assert_eq!(key, Some(Key::from(["server", "port"])));
                assert_eq!(expected, "Integer");
                assert_eq!(found, "String");
            }
            other => panic!("expected type mismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_integer_range_is_checked() {
        #[derive(Deserialize, Debug)]
        #[allow(dead_code)]
        struct Byte {
            b: u8,
        }
        let err = decode::<Byte>("b = 300\n", DecodeOptions::new()).unwrap_err();
        assert!(matches!(err, Error::InvalidValue { .. }));
        assert_eq!(err.key(), Some(&Key::from(["b"])));

        assert!(decode::<Byte>("b = -1\n", DecodeOptions::new()).is_err());
    }

    #[test]
    fn test_integer_into_float_but_not_back() {
        #[derive(Deserialize, Debug, PartialEq)]
        struct Ratio {
            r: f64,
        }
        let (ratio, _) = decode::<Ratio>("r = 3\n", DecodeOptions::new()).unwrap();
        assert_eq!(ratio.r, 3.0);

        let err = decode::<Small>("a = 1.5\n", DecodeOptions::new()).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { .. }));
    }

    #[test]
    fn test_flatten_collects_leftovers() {
        #[derive(Deserialize, Debug)]
        struct Config {
            name: String,
            #[serde(flatten)]
            rest: HashMap<String, i64>,
        }
        let (config, metadata) =
            decode::<Config>("name = 'x'\nb = 2\nc = 3\n", DecodeOptions::strict()).unwrap();
        assert_eq!(config.name, "x");
        assert_eq!(config.rest.get("c"), Some(&3));
        assert!(metadata.undecoded().is_empty());
    }

    #[test]
    fn test_flatten_into_struct_counts_every_key_as_decoded() {
        #[derive(Deserialize, Debug)]
        struct Common {
            region: String,
        }
        #[derive(Deserialize, Debug)]
        struct Service {
            name: String,
            #[serde(flatten)]
            common: Common,
        }
        let (service, metadata) = decode::<Service>(
            "name = 'api'\nregion = 'eu'\ntypo = 1\n",
            DecodeOptions::strict(),
        )
        .unwrap();
        assert_eq!(service.name, "api");
        assert_eq!(service.common.region, "eu");
        assert!(metadata.undecoded().is_empty());
    }

    #[test]
    fn test_value_field_captures_subtree() {
        #[derive(Deserialize, Debug)]
        struct Plugin {
            settings: Value,
        }
        let (plugin, metadata) = decode::<Plugin>(
            "[settings]\nsize = 64\nwhen = 1979-05-27\n",
            DecodeOptions::strict(),
        )
        .unwrap();
        assert_eq!(plugin.settings.get("size"), Some(&Value::Integer(64)));
        assert_eq!(
            plugin.settings.get("when").map(Value::kind),
            Some(Kind::LocalDate)
        );
        assert!(metadata.undecoded().is_empty());
    }

    #[test]
    fn test_datetimes_decode_into_datetime_and_chrono() {
        #[derive(Deserialize, Debug)]
        struct Times {
            at: Datetime,
            day: chrono::NaiveDate,
            stamp: chrono::DateTime<chrono::FixedOffset>,
        }
        let (times, _) = decode::<Times>(
            "at = 07:32:00\nday = 1979-05-27\nstamp = 1979-05-27T07:32:00-07:00\n",
            DecodeOptions::strict(),
        )
        .unwrap();
        assert_eq!(times.at.kind(), Kind::LocalTime);
        assert_eq!(times.day.to_string(), "1979-05-27");
        assert_eq!(times.stamp.offset().local_minus_utc(), -7 * 3600);
    }

    #[test]
    fn test_array_of_tables_marks_shared_paths() {
        #[derive(Deserialize, Debug)]
        struct Product {
            name: String,
        }
        #[derive(Deserialize, Debug)]
        struct Inventory {
            products: Vec<Product>,
        }
        let (inventory, _) = decode::<Inventory>(
            "[[products]]\nname = 'a'\n[[products]]\nname = 'b'\n",
            DecodeOptions::strict(),
        )
        .unwrap();
        let names: Vec<_> = inventory.products.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["a", "b"]);
    }

    #[test]
    fn test_strict_sees_keys_of_inline_tables_in_arrays() {
        #[derive(Deserialize, Debug)]
        struct Point {
            x: i64,
        }
        #[derive(Deserialize, Debug)]
        struct Shape {
            points: Vec<Point>,
        }
        let text = "points = [{ x = 1, y = 2 }, { x = 3 }]\n";

        match decode::<Shape>(text, DecodeOptions::strict()).unwrap_err() {
            Error::UnmatchedKeys { keys } => assert_eq!(keys, vec![Key::from(["points", "y"])]),
            other => panic!("expected unmatched keys, got {other:?}"),
        }

        let (shape, metadata) = decode::<Shape>(text, DecodeOptions::new()).unwrap();
        assert_eq!(shape.points.len(), 2);
        assert_eq!(shape.points[1].x, 3);
        assert_eq!(metadata.undecoded(), vec![Key::from(["points", "y"])]);
    }

    #[test]
    fn test_mixed_array_fails_on_first_bad_element() {
        #[derive(Deserialize, Debug)]
        #[allow(dead_code)]
        struct Numbers {
            n: Vec<i64>,
        }
        let err = decode::<Numbers>("n = [1, 'two', 3.0]\n", DecodeOptions::new()).unwrap_err();
        match err {
            Error::TypeMismatch { key, found, .. } => {
                assert_eq!(key, Some(Key::from(["n"])));
                assert_eq!(found, "String");
            }
            other => panic!("expected type mismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_enums_from_strings_and_tables() {
        #[derive(Deserialize, Debug, PartialEq)]
        #[serde(rename_all = "lowercase")]
        enum Level {
            Debug,
            Info,
        }
        #[derive(Deserialize, Debug, PartialEq)]
        enum Shape {
            Circle { radius: f64 },
        }
        #[derive(Deserialize, Debug, PartialEq)]
        struct Config {
            level: Level,
            shape: Shape,
        }
        let (config, _) = decode::<Config>(
            "level = 'info'\n[shape.Circle]\nradius = 2.0\n",
            DecodeOptions::strict(),
        )
        .unwrap();
        assert_eq!(config.level, Level::Info);
        assert_eq!(config.shape, Shape::Circle { radius: 2.0 });
    }

    #[test]
    fn test_custom_unmarshal_via_deserialize_with() {
        fn upper<'de, D: de::Deserializer<'de>>(d: D) -> std::result::Result<String, D::Error> {
            String::deserialize(d).map(|s| s.to_uppercase())
        }
        #[derive(Deserialize, Debug)]
        struct Config {
            #[serde(deserialize_with = "upper")]
            code: String,
        }
        let (config, _) = decode::<Config>("code = 'abc'\n", DecodeOptions::strict()).unwrap();
        assert_eq!(config.code, "ABC");
    }

    #[test]
    fn test_borrowed_strings() {
        #[derive(Deserialize, Debug)]
        struct Borrowed<'a> {
            name: &'a str,
        }
        let doc = parse_document("name = 'zero copy'\n").unwrap();
        let (borrowed, _): (Borrowed<'_>, _) = Deserializer::new(&doc).decode().unwrap();
        assert_eq!(borrowed.name, "zero copy");
    }

    #[test]
    fn test_from_value_paths_are_relative() {
        let value = crate::toml!({"inner": {"n": "x"}});
        #[derive(Deserialize, Debug)]
        #[allow(dead_code)]
        struct Inner {
            n: i64,
        }
        #[derive(Deserialize, Debug)]
        #[allow(dead_code)]
        struct Outer {
            inner: Inner,
        }
        let err = from_value::<Outer>(value).unwrap_err();
        assert_eq!(err.key(), Some(&Key::from(["inner", "n"])));
    }
}
