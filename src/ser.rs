//! TOML serialization.
//!
//! Serialization happens in two steps. [`ValueSerializer`] turns any
//! `T: Serialize` into a [`Value`] tree, and the emitter writes that tree out
//! as a document. The [`Serializer`] glues the two together.
//!
//! ## Layout rules
//!
//! - Each table writes its plain `key = value` lines first, then its
//!   sub-tables, depth-first, so no header is ever reopened.
//! - A non-empty array whose elements are all tables becomes a run of
//!   `[[path]]` blocks; every other array is written inline.
//! - Map keys are sorted; struct fields keep declaration order.
//! - `None` fields and map entries are left out.
//! - Strings use single quotes when nothing needs escaping and the text holds
//!   no `'`, double quotes with escapes otherwise.
//! - Floats always carry a `.` or an exponent; specials are `inf`, `-inf` and
//!   `nan`.
//!
//! ## Usage
//!
//! ```rust
//! use serde_tomlkit::to_string;
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct Item { name: String, price: f64 }
//!
//! #[derive(Serialize)]
//! struct Order { id: u32, items: Vec<Item> }
//!
//! let order = Order {
//!     id: 7,
//!     items: vec![
//!         Item { name: "pen".into(), price: 2.0 },
//!         Item { name: "ink".into(), price: 4.5 },
//!     ],
//! };
//!
//! assert_eq!(
//!     to_string(&order).unwrap(),
//!     "id = 7\n\n[[items]]\nname = 'pen'\nprice = 2.0\n\n[[items]]\nname = 'ink'\nprice = 4.5\n"
//! );
//! ```
//!
//! ## Direct Serializer Usage
//!
//! ```rust
//! use serde_tomlkit::{EncodeOptions, Serializer};
//! use serde::Serialize;
//! use std::collections::BTreeMap;
//!
//! let mut serializer = Serializer::new(EncodeOptions::new());
//!
//! let data: BTreeMap<&str, i32> = [("b", 2), ("a", 1)].into_iter().collect();
//! data.serialize(&mut serializer).unwrap();
//!
//! assert_eq!(serializer.into_inner(), "a = 1\nb = 2\n");
//! ```

use crate::datetime::{self, Datetime};
use crate::lexer::is_control;
use crate::map::Table;
use crate::options::EncodeOptions;
use crate::value::{is_array_of_tables, Value};
use crate::{Error, Result};
use serde::{ser, Serialize};
use tracing::debug;

/// The TOML serializer.
///
/// The value handed to it must serialize as a table (a struct or a map).
pub struct Serializer {
    output: String,
    options: EncodeOptions,
}

impl Serializer {
    pub fn new(options: EncodeOptions) -> Self {
        Serializer {
            output: String::with_capacity(256),
            options,
        }
    }

    pub fn into_inner(self) -> String {
        self.output
    }

    fn emit(&mut self, value: Value) -> Result<()> {
        match value {
            Value::Table(table) => {
                write_document(&mut self.output, &table, &self.options);
                debug!(
                    keys = table.len(),
                    bytes = self.output.len(),
                    "encoded document"
                );
                Ok(())
            }
            other => Err(Error::encode(format!(
                "top-level value must be a table, found {}",
                other.kind()
            ))),
        }
    }
}

macro_rules! serialize_through_value {
    ($($method:ident($ty:ty)),* $(,)?) => {$(
        fn $method(self, v: $ty) -> Result<()> {
            let value = ser::Serializer::$method(ValueSerializer, v)?;
            self.emit(value)
        }
    )*};
}

impl<'a> ser::Serializer for &'a mut Serializer {
    type Ok = ();
    type Error = Error;

    type SerializeSeq = Compound<'a, SerializeVec>;
    type SerializeTuple = Compound<'a, SerializeVec>;
    type SerializeTupleStruct = Compound<'a, SerializeVec>;
    type SerializeTupleVariant = Compound<'a, SerializeVec>;
    type SerializeMap = Compound<'a, SerializeMap>;
    type SerializeStruct = Compound<'a, SerializeMap>;
    type SerializeStructVariant = Compound<'a, SerializeMap>;

    serialize_through_value! {
        serialize_bool(bool),
        serialize_i8(i8),
        serialize_i16(i16),
        serialize_i32(i32),
        serialize_i64(i64),
        serialize_i128(i128),
        serialize_u8(u8),
        serialize_u16(u16),
        serialize_u32(u32),
        serialize_u64(u64),
        serialize_u128(u128),
        serialize_f32(f32),
        serialize_f64(f64),
        serialize_char(char),
        serialize_str(&str),
        serialize_bytes(&[u8]),
    }

    fn serialize_none(self) -> Result<()> {
        Err(Error::UnsupportedNone)
    }

    fn serialize_some<T>(self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<()> {
        Err(Error::unsupported_type("unit"))
    }

    fn serialize_unit_struct(self, name: &'static str) -> Result<()> {
        Err(Error::unsupported_type(name))
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<()> {
        self.emit(Value::String(variant.to_string()))
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        name: &'static str,
        variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let value =
            ser::Serializer::serialize_newtype_variant(ValueSerializer, name, variant_index, variant, value)?;
        self.emit(value)
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<Self::SerializeSeq> {
        Ok(Compound::new(self, ser::Serializer::serialize_seq(ValueSerializer, len)?))
    }

    fn serialize_tuple(self, len: usize) -> Result<Self::SerializeTuple> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        name: &'static str,
        variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        let inner =
            ser::Serializer::serialize_tuple_variant(ValueSerializer, name, variant_index, variant, len)?;
        Ok(Compound::new(self, inner))
    }

    fn serialize_map(self, len: Option<usize>) -> Result<Self::SerializeMap> {
        Ok(Compound::new(self, ser::Serializer::serialize_map(ValueSerializer, len)?))
    }

    fn serialize_struct(self, name: &'static str, len: usize) -> Result<Self::SerializeStruct> {
        Ok(Compound::new(
            self,
            ser::Serializer::serialize_struct(ValueSerializer, name, len)?,
        ))
    }

    fn serialize_struct_variant(
        self,
        name: &'static str,
        variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        let inner = ser::Serializer::serialize_struct_variant(
            ValueSerializer,
            name,
            variant_index,
            variant,
            len,
        )?;
        Ok(Compound::new(self, inner))
    }
}

/// Collects a compound value into a tree, then emits it on `end`.
pub struct Compound<'a, S> {
    ser: &'a mut Serializer,
    inner: S,
}

impl<'a, S> Compound<'a, S> {
    fn new(ser: &'a mut Serializer, inner: S) -> Self {
        Compound { ser, inner }
    }
}

impl<'a> ser::SerializeSeq for Compound<'a, SerializeVec> {
    type Ok = ();
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        ser::SerializeSeq::serialize_element(&mut self.inner, value)
    }

    fn end(self) -> Result<()> {
        let value = ser::SerializeSeq::end(self.inner)?;
        self.ser.emit(value)
    }
}

impl<'a> ser::SerializeTuple for Compound<'a, SerializeVec> {
    type Ok = ();
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        ser::SerializeSeq::serialize_element(&mut self.inner, value)
    }

    fn end(self) -> Result<()> {
        let value = ser::SerializeSeq::end(self.inner)?;
        self.ser.emit(value)
    }
}

impl<'a> ser::SerializeTupleStruct for Compound<'a, SerializeVec> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        ser::SerializeSeq::serialize_element(&mut self.inner, value)
    }

    fn end(self) -> Result<()> {
        let value = ser::SerializeSeq::end(self.inner)?;
        self.ser.emit(value)
    }
}

impl<'a> ser::SerializeTupleVariant for Compound<'a, SerializeVec> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        ser::SerializeSeq::serialize_element(&mut self.inner, value)
    }

    fn end(self) -> Result<()> {
        let value = ser::SerializeSeq::end(self.inner)?;
        self.ser.emit(value)
    }
}

impl<'a> ser::SerializeMap for Compound<'a, SerializeMap> {
    type Ok = ();
    type Error = Error;

    fn serialize_key<T>(&mut self, key: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        ser::SerializeMap::serialize_key(&mut self.inner, key)
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        ser::SerializeMap::serialize_value(&mut self.inner, value)
    }

    fn end(self) -> Result<()> {
        let value = ser::SerializeMap::end(self.inner)?;
        self.ser.emit(value)
    }
}

impl<'a> ser::SerializeStruct for Compound<'a, SerializeMap> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        ser::SerializeStruct::serialize_field(&mut self.inner, key, value)
    }

    fn end(self) -> Result<()> {
        let value = ser::SerializeMap::end(self.inner)?;
        self.ser.emit(value)
    }
}

impl<'a> ser::SerializeStructVariant for Compound<'a, SerializeMap> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        ser::SerializeStruct::serialize_field(&mut self.inner, key, value)
    }

    fn end(self) -> Result<()> {
        let value = ser::SerializeMap::end(self.inner)?;
        self.ser.emit(value)
    }
}

/// Serializes any `T: Serialize` into a [`Value`] tree.
pub struct ValueSerializer;

pub struct SerializeVec {
    vec: Vec<Value>,
    variant: Option<&'static str>,
}

/// Builds either a table or, for the private datetime struct, a [`Datetime`].
pub enum SerializeMap {
    Table {
        table: Table,
        next_key: Option<String>,
        sort: bool,
        variant: Option<&'static str>,
    },
    Datetime(Option<Datetime>),
}

fn wrap_variant(variant: Option<&'static str>, value: Value) -> Value {
    match variant {
        Some(name) => {
            let mut table = Table::with_capacity(1);
            table.insert(name.to_string(), value);
            Value::Table(table)
        }
        None => value,
    }
}

fn to_value<T: Serialize + ?Sized>(value: &T) -> Result<Value> {
    value.serialize(ValueSerializer)
}

impl ser::Serializer for ValueSerializer {
    type Ok = Value;
    type Error = Error;

    type SerializeSeq = SerializeVec;
    type SerializeTuple = SerializeVec;
    type SerializeTupleStruct = SerializeVec;
    type SerializeTupleVariant = SerializeVec;
    type SerializeMap = SerializeMap;
    type SerializeStruct = SerializeMap;
    type SerializeStructVariant = SerializeMap;

    fn serialize_bool(self, v: bool) -> Result<Value> {
        Ok(Value::Boolean(v))
    }

    fn serialize_i8(self, v: i8) -> Result<Value> {
        Ok(Value::Integer(i64::from(v)))
    }

    fn serialize_i16(self, v: i16) -> Result<Value> {
        Ok(Value::Integer(i64::from(v)))
    }

    fn serialize_i32(self, v: i32) -> Result<Value> {
        Ok(Value::Integer(i64::from(v)))
    }

    fn serialize_i64(self, v: i64) -> Result<Value> {
        Ok(Value::Integer(v))
    }

    fn serialize_i128(self, v: i128) -> Result<Value> {
        i64::try_from(v)
            .map(Value::Integer)
            .map_err(|_| Error::encode(format!("integer {} does not fit in 64 bits", v)))
    }

    fn serialize_u8(self, v: u8) -> Result<Value> {
        Ok(Value::Integer(i64::from(v)))
    }

    fn serialize_u16(self, v: u16) -> Result<Value> {
        Ok(Value::Integer(i64::from(v)))
    }

    fn serialize_u32(self, v: u32) -> Result<Value> {
        Ok(Value::Integer(i64::from(v)))
    }

    fn serialize_u64(self, v: u64) -> Result<Value> {
        i64::try_from(v)
            .map(Value::Integer)
            .map_err(|_| Error::encode(format!("integer {} does not fit in 64 bits", v)))
    }

    fn serialize_u128(self, v: u128) -> Result<Value> {
        i64::try_from(v)
            .map(Value::Integer)
            .map_err(|_| Error::encode(format!("integer {} does not fit in 64 bits", v)))
    }

    fn serialize_f32(self, v: f32) -> Result<Value> {
        Ok(Value::Float(f64::from(v)))
    }

    fn serialize_f64(self, v: f64) -> Result<Value> {
        Ok(Value::Float(v))
    }

    fn serialize_char(self, v: char) -> Result<Value> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<Value> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Value> {
        Ok(Value::Array(
            v.iter().map(|&b| Value::Integer(i64::from(b))).collect(),
        ))
    }

    fn serialize_none(self) -> Result<Value> {
        Err(Error::UnsupportedNone)
    }

    fn serialize_some<T>(self, value: &T) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Value> {
        Err(Error::unsupported_type("unit"))
    }

    fn serialize_unit_struct(self, name: &'static str) -> Result<Value> {
        Err(Error::unsupported_type(name))
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Value> {
        Ok(Value::String(variant.to_string()))
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        Ok(wrap_variant(Some(variant), to_value(value)?))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SerializeVec> {
        Ok(SerializeVec {
            vec: Vec::with_capacity(len.unwrap_or(0)),
            variant: None,
        })
    }

    fn serialize_tuple(self, len: usize) -> Result<SerializeVec> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> Result<SerializeVec> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SerializeVec> {
        Ok(SerializeVec {
            vec: Vec::with_capacity(len),
            variant: Some(variant),
        })
    }

    fn serialize_map(self, len: Option<usize>) -> Result<SerializeMap> {
        Ok(SerializeMap::Table {
            table: Table::with_capacity(len.unwrap_or(0)),
            next_key: None,
            sort: true,
            variant: None,
        })
    }

    fn serialize_struct(self, name: &'static str, len: usize) -> Result<SerializeMap> {
        if name == datetime::NAME {
            return Ok(SerializeMap::Datetime(None));
        }
        Ok(SerializeMap::Table {
            table: Table::with_capacity(len),
            next_key: None,
            sort: false,
            variant: None,
        })
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SerializeMap> {
        Ok(SerializeMap::Table {
            table: Table::with_capacity(len),
            next_key: None,
            sort: false,
            variant: Some(variant),
        })
    }
}

impl ser::SerializeSeq for SerializeVec {
    type Ok = Value;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.vec.push(to_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(wrap_variant(self.variant, Value::Array(self.vec)))
    }
}

impl ser::SerializeTuple for SerializeVec {
    type Ok = Value;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Value> {
        ser::SerializeSeq::end(self)
    }
}

impl ser::SerializeTupleStruct for SerializeVec {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Value> {
        ser::SerializeSeq::end(self)
    }
}

impl ser::SerializeTupleVariant for SerializeVec {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Value> {
        ser::SerializeSeq::end(self)
    }
}

impl SerializeMap {
    fn insert(&mut self, key: String, value: Result<Value>) -> Result<()> {
        match self {
            SerializeMap::Table { table, .. } => match value {
                Ok(value) => {
                    table.insert(key, value);
                    Ok(())
                }
                Err(Error::UnsupportedNone) => Ok(()),
                Err(err) => Err(err),
            },
            SerializeMap::Datetime(slot) => {
                if key != datetime::FIELD {
                    return Err(Error::encode("unexpected field in datetime"));
                }
                match value? {
                    Value::String(text) => {
                        let parsed = text.parse::<Datetime>().map_err(Error::encode)?;
                        *slot = Some(parsed);
                        Ok(())
                    }
                    other => Err(Error::encode(format!(
                        "datetime must be written as a string, found {}",
                        other.kind()
                    ))),
                }
            }
        }
    }
}

impl ser::SerializeMap for SerializeMap {
    type Ok = Value;
    type Error = Error;

    fn serialize_key<T>(&mut self, key: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let SerializeMap::Table { next_key, .. } = self else {
            return Err(Error::encode("datetime cannot hold map entries"));
        };
        match to_value(key)? {
            Value::String(s) => {
                *next_key = Some(s);
                Ok(())
            }
            other => Err(Error::encode(format!(
                "map keys must be strings, found {}",
                other.kind()
            ))),
        }
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let key = match self {
            SerializeMap::Table { next_key, .. } => next_key.take(),
            SerializeMap::Datetime(_) => None,
        }
        .ok_or_else(|| Error::custom("serialize_value called without serialize_key"))?;
        self.insert(key, to_value(value))
    }

    fn end(self) -> Result<Value> {
        match self {
            SerializeMap::Table {
                mut table,
                sort,
                variant,
                ..
            } => {
                if sort {
                    table.sort_keys();
                }
                Ok(wrap_variant(variant, Value::Table(table)))
            }
            SerializeMap::Datetime(Some(dt)) => Ok(Value::Datetime(dt)),
            SerializeMap::Datetime(None) => Err(Error::encode("datetime without a value")),
        }
    }
}

impl ser::SerializeStruct for SerializeMap {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.insert(key.to_string(), to_value(value))
    }

    fn end(self) -> Result<Value> {
        ser::SerializeMap::end(self)
    }
}

impl ser::SerializeStructVariant for SerializeMap {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.insert(key.to_string(), to_value(value))
    }

    fn end(self) -> Result<Value> {
        ser::SerializeMap::end(self)
    }
}

/// Writes `table` as a complete document.
pub(crate) fn write_document(out: &mut String, table: &Table, options: &EncodeOptions) {
    let mut path = Vec::new();
    write_table(out, table, &mut path, options);
}

fn indent(out: &mut String, level: usize, options: &EncodeOptions) {
    if options.pretty {
        for _ in 0..level * options.indent {
            out.push(' ');
        }
    }
}

/// A table with only sub-tables can be left for the sub-table headers to
/// create implicitly.
fn needs_header(table: &Table) -> bool {
    table.is_empty() || table.values().any(|value| !value.is_table_like())
}

fn write_table(out: &mut String, table: &Table, path: &mut Vec<String>, options: &EncodeOptions) {
    for (key, value) in table.iter().filter(|(_, value)| !value.is_table_like()) {
        indent(out, path.len(), options);
        write_key(out, key);
        out.push_str(" = ");
        write_inline_value(out, value);
        out.push('\n');
    }

    for (key, value) in table.iter() {
        match value {
            Value::Table(child) => {
                path.push(key.clone());
                if needs_header(child) {
                    write_header(out, path, false, options);
                }
                write_table(out, child, path, options);
                path.pop();
            }
            Value::Array(items) if is_array_of_tables(items) => {
                path.push(key.clone());
                for item in items {
                    if let Value::Table(child) = item {
                        write_header(out, path, true, options);
                        write_table(out, child, path, options);
                    }
                }
                path.pop();
            }
            _ => {}
        }
    }
}

fn write_header(out: &mut String, path: &[String], array: bool, options: &EncodeOptions) {
    if !out.is_empty() {
        out.push('\n');
    }
    indent(out, path.len().saturating_sub(1), options);
    out.push_str(if array { "[[" } else { "[" });
    for (i, segment) in path.iter().enumerate() {
        if i > 0 {
            out.push('.');
        }
        write_key(out, segment);
    }
    out.push_str(if array { "]]" } else { "]" });
    out.push('\n');
}

/// Writes a key bare when it only uses `A-Za-z0-9_-`, quoted otherwise.
pub(crate) fn write_key(out: &mut String, key: &str) {
    let bare = !key.is_empty()
        && key
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-');
    if bare {
        out.push_str(key);
    } else {
        write_basic_string(out, key);
    }
}

/// Writes a value in the form it takes after `key = `.
pub(crate) fn write_inline_value(out: &mut String, value: &Value) {
    match value {
        Value::String(s) => write_string(out, s),
        Value::Integer(i) => out.push_str(&i.to_string()),
        Value::Float(f) => write_float(out, *f),
        Value::Boolean(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Datetime(dt) => out.push_str(&dt.to_string()),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_inline_value(out, item);
            }
            out.push(']');
        }
        Value::Table(table) => {
            if table.is_empty() {
                out.push_str("{}");
                return;
            }
            out.push_str("{ ");
            for (i, (key, item)) in table.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_key(out, key);
                out.push_str(" = ");
                write_inline_value(out, item);
            }
            out.push_str(" }");
        }
    }
}

fn write_float(out: &mut String, f: f64) {
    if f.is_nan() {
        out.push_str("nan");
    } else if f.is_infinite() {
        out.push_str(if f > 0.0 { "inf" } else { "-inf" });
    } else {
        let text = format!("{:?}", f);
        out.push_str(&text);
        if !text.contains(|ch| matches!(ch, '.' | 'e' | 'E')) {
            out.push_str(".0");
        }
    }
}

fn write_string(out: &mut String, s: &str) {
    if !s.contains('\'') && !s.chars().any(char::is_control) {
        out.push('\'');
        out.push_str(s);
        out.push('\'');
    } else {
        write_basic_string(out, s);
    }
}

fn write_basic_string(out: &mut String, s: &str) {
    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\u{0008}' => out.push_str("\\b"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\u{000C}' => out.push_str("\\f"),
            '\r' => out.push_str("\\r"),
            ch if is_control(ch) => out.push_str(&format!("\\u{:04X}", ch as u32)),
            ch => out.push(ch),
        }
    }
    out.push('"');
}
