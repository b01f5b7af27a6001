//! Parser: turns the token stream into a [`Document`].
//!
//! Tables under construction live in an arena and refer to each other by
//! index; the "current table" that key/value lines are added to is just an
//! index into that arena. Each table remembers how it came to exist:
//!
//! - `Header`: named by a `[header]` (or an `[[array]]` element). Cannot be
//!   named by a header again, nor extended with dotted keys from elsewhere.
//! - `Implicit`: created as an intermediate segment of a header path. May be
//!   defined by its own header exactly once.
//! - `Dotted`: created by a dotted key. May be extended by more dotted keys and
//!   have sub-tables declared under it, but cannot be opened by a header.
//!
//! Inline tables are built into finished [`Value::Table`]s immediately, so
//! nothing can extend them afterwards.
//!
//! Once every token is consumed the arena is folded into an owned [`Table`].

use crate::de::Deserializer;
use crate::error::{Error, Result};
use crate::kind::Kind;
use crate::lexer::Lexer;
use crate::map::Table;
use crate::metadata::{Key, Metadata};
use crate::options::DecodeOptions;
use crate::token::{Position, Token, TokenKind};
use crate::value::Value;
use indexmap::IndexMap;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

type TableId = usize;

const ROOT: TableId = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    Header,
    Implicit,
    Dotted,
}

enum Slot {
    Value(Value),
    Table(TableId),
    Array(Vec<TableId>),
}

struct Node {
    entries: IndexMap<String, Slot>,
    origin: Origin,
}

/// A parsed TOML document: the root table and its metadata index.
///
/// A `Document` is immutable; any number of threads may decode from the same
/// `&Document` at once.
///
/// ```rust
/// use serde_tomlkit::{parse, Kind};
///
/// let doc = parse("[server]\nhost = 'localhost'\nport = 8080\n").unwrap();
/// assert_eq!(doc.metadata().type_of(&["server", "port"]), Some(Kind::Integer));
/// assert_eq!(doc.to_string(), "[server]\nhost = 'localhost'\nport = 8080\n");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    table: Table,
    metadata: Metadata,
}

impl Document {
    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn into_table(self) -> Table {
        self.table
    }

    pub fn into_parts(self) -> (Table, Metadata) {
        (self.table, self.metadata)
    }

    /// Decodes the document into `T`.
    ///
    /// The returned metadata records which keys were consumed.
    ///
    /// # Errors
    ///
    /// Fails on the first type mismatch or missing key, and in strict mode
    /// with every key `T` left unconsumed.
    pub fn decode<'de, T: Deserialize<'de>>(
        &'de self,
        options: DecodeOptions,
    ) -> Result<(T, Metadata)> {
        Deserializer::with_options(self, options).decode()
    }
}

impl FromStr for Document {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self> {
        Parser::new(input).parse()
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.table, f)
    }
}

pub(crate) struct Parser<'a> {
    lexer: Lexer<'a>,
    peeked: Option<Token>,
    arena: Vec<Node>,
    current: TableId,
    current_path: Key,
    metadata: Metadata,
}

fn error(position: Position, key: &Key, msg: &str) -> Error {
    Error::parse(position.line, position.column, key.clone(), msg)
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> Self {
        Parser {
            lexer: Lexer::new(input),
            peeked: None,
            arena: vec![Node {
                entries: IndexMap::new(),
                origin: Origin::Header,
            }],
            current: ROOT,
            current_path: Key::root(),
            metadata: Metadata::new(),
        }
    }

    fn next(&mut self) -> Result<Token> {
        match self.peeked.take() {
            Some(token) => Ok(token),
            None => self.lexer.next_token(),
        }
    }

    fn peek_kind(&mut self) -> Result<&TokenKind> {
        let token = match self.peeked.take() {
            Some(token) => token,
            None => self.lexer.next_token()?,
        };
        Ok(&self.peeked.insert(token).kind)
    }

    fn new_node(&mut self, origin: Origin) -> TableId {
        self.arena.push(Node {
            entries: IndexMap::new(),
            origin,
        });
        self.arena.len() - 1
    }

    pub fn parse(mut self) -> Result<Document> {
        loop {
            let token = self.next()?;
            match token.kind {
                TokenKind::Eof => break,
                TokenKind::Newline | TokenKind::Comment(_) => {}
                TokenKind::TableOpen => self.table_header(token.position)?,
                TokenKind::ArrayTableOpen => self.array_header(token.position)?,
                TokenKind::BareKey(_) | TokenKind::String { .. } => self.key_value_line(token)?,
                other => {
                    return Err(error(
                        token.position,
                        &self.current_path,
                        &format!("expected a key or table header, found {}", other),
                    ));
                }
            }
        }

        let table = self.build(ROOT);
        debug!(
            keys = self.metadata.len(),
            tables = self.arena.len(),
            "parsed document"
        );
        Ok(Document {
            table,
            metadata: self.metadata,
        })
    }

    fn key_text(&self, token: Token) -> Result<String> {
        match token.kind {
            TokenKind::BareKey(key) => Ok(key),
            TokenKind::String { value, .. } => Ok(value),
            other => Err(error(
                token.position,
                &self.current_path,
                &format!("expected a key, found {}", other),
            )),
        }
    }

    /// Reads `a.b.c` starting from an already consumed first segment.
    fn key_path(&mut self, first: Token) -> Result<Vec<String>> {
        let mut segments = vec![self.key_text(first)?];
        while matches!(self.peek_kind()?, TokenKind::Dot) {
            self.next()?;
            let token = self.next()?;
            segments.push(self.key_text(token)?);
        }
        Ok(segments)
    }

    fn expect(&mut self, expected: TokenKind, key: &Key) -> Result<()> {
        let token = self.next()?;
        if token.kind == expected {
            return Ok(());
        }
        Err(error(
            token.position,
            key,
            &format!("expected {}, found {}", expected, token.kind),
        ))
    }

    fn end_of_line(&mut self, key: &Key) -> Result<()> {
        let mut token = self.next()?;
        if let TokenKind::Comment(_) = token.kind {
            token = self.next()?;
        }
        match token.kind {
            TokenKind::Newline | TokenKind::Eof => Ok(()),
            other => Err(error(
                token.position,
                key,
                &format!("expected end of line, found {}", other),
            )),
        }
    }

    fn key_value_line(&mut self, first: Token) -> Result<()> {
        let position = first.position;
        let path = self.key_path(first)?;
        let base = self.current_path.clone();
        let full = base.join(&path);
        self.expect(TokenKind::Equals, &full)?;
        self.assign(self.current, &base, &path, position)?;
        self.end_of_line(&full)
    }

    /// Adds `path = <value>` to `table`, creating dotted intermediate tables.
    ///
    /// `prefix` is the key path of `table`, used for metadata and diagnostics.
    /// Keys of inline tables inside an array are recorded under the array's
    /// path, the same way `[[header]]` elements share one path.
    fn assign(
        &mut self,
        mut table: TableId,
        prefix: &Key,
        path: &[String],
        position: Position,
    ) -> Result<()> {
        let Some((last, parents)) = path.split_last() else {
            return Err(error(position, prefix, "empty key"));
        };

        let mut full = prefix.clone();
        for segment in parents {
            full = full.child(segment);
            table = self.descend_dotted(table, segment, &full, position)?;
        }
        let full = full.child(last);

        if self.arena[table].entries.contains_key(last) {
            return Err(error(
                position,
                &full,
                &format!("duplicate key `{}`", full),
            ));
        }

        let kind = match self.peek_kind()? {
            TokenKind::String { .. } => Some(Kind::String),
            TokenKind::Integer { .. } => Some(Kind::Integer),
            TokenKind::Float(_) => Some(Kind::Float),
            TokenKind::Boolean(_) => Some(Kind::Bool),
            TokenKind::Datetime(dt) => Some(dt.kind()),
            TokenKind::ArrayOpen => Some(Kind::Array),
            TokenKind::InlineTableOpen => Some(Kind::Table),
            _ => None,
        };
        if let Some(kind) = kind {
            self.metadata.record(full.clone(), kind);
        }

        let value = self.value(&full)?;
        self.arena[table]
            .entries
            .insert(last.clone(), Slot::Value(value));
        Ok(())
    }

    fn descend_dotted(
        &mut self,
        table: TableId,
        segment: &str,
        full: &Key,
        position: Position,
    ) -> Result<TableId> {
        match self.arena[table].entries.get(segment) {
            None => {
                let id = self.new_node(Origin::Dotted);
                self.arena[table]
                    .entries
                    .insert(segment.to_string(), Slot::Table(id));
                self.metadata.record(full.clone(), Kind::Table);
                Ok(id)
            }
            Some(Slot::Table(id)) if self.arena[*id].origin == Origin::Header => Err(error(
                position,
                full,
                &format!("table `{}` is defined by a header and cannot be extended with dotted keys", full),
            )),
            Some(Slot::Table(id)) => Ok(*id),
            Some(Slot::Array(_)) => Err(error(
                position,
                full,
                &format!("array of tables `{}` cannot be extended with dotted keys", full),
            )),
            Some(Slot::Value(_)) => Err(error(
                position,
                full,
                &format!("key `{}` is already defined as a value", full),
            )),
        }
    }

    fn descend_header(
        &mut self,
        table: TableId,
        segment: &str,
        full: &Key,
        position: Position,
    ) -> Result<TableId> {
        match self.arena[table].entries.get(segment) {
            None => {
                let id = self.new_node(Origin::Implicit);
                self.arena[table]
                    .entries
                    .insert(segment.to_string(), Slot::Table(id));
                self.metadata.record(full.clone(), Kind::Table);
                Ok(id)
            }
            Some(Slot::Table(id)) => Ok(*id),
            Some(Slot::Array(ids)) => ids.last().copied().ok_or_else(|| {
                error(position, full, "array of tables has no element to extend")
            }),
            Some(Slot::Value(_)) => Err(error(
                position,
                full,
                &format!("key `{}` is not a table", full),
            )),
        }
    }

    /// Reads the rest of a header and walks to the parent of its last segment.
    fn header_path(
        &mut self,
        position: Position,
        close: TokenKind,
    ) -> Result<(TableId, Key, String)> {
        let first = self.next()?;
        let path = self.key_path(first)?;
        let full = Key::new(path.clone());
        self.expect(close, &full)?;
        self.end_of_line(&full)?;

        let Some((last, parents)) = path.split_last() else {
            return Err(error(position, &full, "empty table header"));
        };
        let mut table = ROOT;
        let mut walked = Key::root();
        for segment in parents {
            walked = walked.child(segment);
            table = self.descend_header(table, segment, &walked, position)?;
        }
        Ok((table, full, last.clone()))
    }

    fn table_header(&mut self, position: Position) -> Result<()> {
        let (parent, full, last) = self.header_path(position, TokenKind::TableClose)?;

        let id = match self.arena[parent].entries.get(&last) {
            None => {
                let id = self.new_node(Origin::Header);
                self.arena[parent].entries.insert(last, Slot::Table(id));
                self.metadata.record(full.clone(), Kind::Table);
                id
            }
            Some(Slot::Table(id)) => {
                let id = *id;
                match self.arena[id].origin {
                    Origin::Implicit => self.arena[id].origin = Origin::Header,
                    Origin::Header => {
                        return Err(error(
                            position,
                            &full,
                            &format!("table `{}` is defined more than once", full),
                        ));
                    }
                    Origin::Dotted => {
                        return Err(error(
                            position,
                            &full,
                            &format!("table `{}` was created by dotted keys and cannot be reopened", full),
                        ));
                    }
                }
                id
            }
            Some(Slot::Array(_)) => {
                return Err(error(
                    position,
                    &full,
                    &format!("`{}` is already an array of tables", full),
                ));
            }
            Some(Slot::Value(_)) => {
                return Err(error(
                    position,
                    &full,
                    &format!("key `{}` is already defined as a value", full),
                ));
            }
        };

        self.current = id;
        self.current_path = full;
        Ok(())
    }

    fn array_header(&mut self, position: Position) -> Result<()> {
        let (parent, full, last) = self.header_path(position, TokenKind::ArrayTableClose)?;

        let id = self.new_node(Origin::Header);
        match self.arena[parent].entries.get_mut(&last) {
            None => {
                self.arena[parent].entries.insert(last, Slot::Array(vec![id]));
                self.metadata.record(full.clone(), Kind::ArrayOfTables);
            }
            Some(Slot::Array(ids)) => ids.push(id),
            Some(Slot::Table(_)) => {
                return Err(error(
                    position,
                    &full,
                    &format!("table `{}` cannot be redefined as an array of tables", full),
                ));
            }
            Some(Slot::Value(_)) => {
                return Err(error(
                    position,
                    &full,
                    &format!("cannot append to statically defined value `{}`", full),
                ));
            }
        }

        self.current = id;
        self.current_path = full;
        Ok(())
    }

    fn value(&mut self, key: &Key) -> Result<Value> {
        let token = self.next()?;
        let value = match token.kind {
            TokenKind::String { value, .. } => Value::String(value),
            TokenKind::Integer { value, .. } => Value::Integer(value),
            TokenKind::Float(value) => Value::Float(value),
            TokenKind::Boolean(value) => Value::Boolean(value),
            TokenKind::Datetime(value) => Value::Datetime(value),
            TokenKind::ArrayOpen => self.array(key)?,
            TokenKind::InlineTableOpen => self.inline_table(key)?,
            other => {
                return Err(error(
                    token.position,
                    key,
                    &format!("expected a value, found {}", other),
                ));
            }
        };
        Ok(value)
    }

    fn array(&mut self, key: &Key) -> Result<Value> {
        let mut items = Vec::new();
        loop {
            let token = self.next()?;
            match token.kind {
                TokenKind::ArrayClose => break,
                TokenKind::Comma | TokenKind::Comment(_) => {}
                _ => {
                    self.peeked = Some(token);
                    items.push(self.value(key)?);
                }
            }
        }
        Ok(Value::Array(items))
    }

    fn inline_table(&mut self, key: &Key) -> Result<Value> {
        let id = self.new_node(Origin::Header);
        loop {
            let token = self.next()?;
            match token.kind {
                TokenKind::InlineTableClose => break,
                TokenKind::Comma => {}
                TokenKind::BareKey(_) | TokenKind::String { .. } => {
                    let position = token.position;
                    let path = self.key_path(token)?;
                    self.expect(TokenKind::Equals, &key.join(&path))?;
                    self.assign(id, key, &path, position)?;
                }
                other => {
                    return Err(error(
                        token.position,
                        key,
                        &format!("expected a key in inline table, found {}", other),
                    ));
                }
            }
        }
        Ok(Value::Table(self.build(id)))
    }

    /// Moves the arena node `id` and everything below it into an owned table.
    fn build(&mut self, id: TableId) -> Table {
        let entries = std::mem::take(&mut self.arena[id].entries);
        let mut table = Table::with_capacity(entries.len());
        for (key, slot) in entries {
            let value = match slot {
                Slot::Value(value) => value,
                Slot::Table(child) => Value::Table(self.build(child)),
                Slot::Array(children) => Value::Array(
                    children
                        .into_iter()
                        .map(|child| Value::Table(self.build(child)))
                        .collect(),
                ),
            };
            table.insert(key, value);
        }
        table
    }
}

/// Parses `input` into a [`Document`].
pub(crate) fn parse_document(input: &str) -> Result<Document> {
    Parser::new(input).parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(doc: &Document) -> Vec<String> {
        doc.metadata().keys().map(ToString::to_string).collect()
    }

    fn parse_err(input: &str) -> Error {
        match parse_document(input) {
            Ok(doc) => panic!("expected an error, parsed {:?}", doc.table()),
            Err(err) => err,
        }
    }

    #[test]
    fn test_duplicate_key_names_key() {
        let err = parse_err("x = 1\nx = 2\n");
        assert_eq!(err.key(), Some(&Key::from(["x"])));
        match err {
            Error::Parse { line, .. } => assert_eq!(line, 2),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_key_in_inline_table() {
        let err = parse_err("point = { x = 1, x = 2 }\n");
        assert_eq!(err.key(), Some(&Key::from(["point", "x"])));
    }

    #[test]
    fn test_dotted_keys_build_tables() {
        let doc = parse_document("fruit.apple.color = 'red'\nfruit.apple.size = 3\n").unwrap();
        let size = doc.table().get_path(&["fruit", "apple", "size"]);
        assert_eq!(size, Some(&Value::Integer(3)));
        assert_eq!(
            keys(&doc),
            ["fruit", "fruit.apple", "fruit.apple.color", "fruit.apple.size"]
        );
    }

    #[test]
    fn test_table_defined_twice() {
        let err = parse_err("[a]\nx = 1\n[a]\ny = 2\n");
        assert_eq!(err.key(), Some(&Key::from(["a"])));
    }

    #[test]
    fn test_implicit_table_defined_once() {
        let doc = parse_document("[a.b.c]\nx = 1\n[a]\ny = 2\n").unwrap();
        assert_eq!(doc.table().get_path(&["a", "y"]), Some(&Value::Integer(2)));
        assert_eq!(keys(&doc), ["a", "a.b", "a.b.c", "a.b.c.x", "a.y"]);

        assert!(parse_document("[a.b.c]\n[a]\n[a]\n").is_err());
    }

    #[test]
    fn test_dotted_table_cannot_be_reopened() {
        assert!(parse_document("[fruit]\napple.color = 'red'\n[fruit.apple]\n").is_err());
        let doc =
            parse_document("[fruit]\napple.color = 'red'\n[fruit.apple.texture]\nsmooth = true\n")
                .unwrap();
        let smooth = doc.table().get_path(&["fruit", "apple", "texture", "smooth"]);
        assert_eq!(smooth, Some(&Value::Boolean(true)));
    }

    #[test]
    fn test_header_table_cannot_take_dotted_keys_later() {
        assert!(parse_document("[a.b]\nx = 1\n[a]\nb.y = 2\n").is_err());
    }

    #[test]
    fn test_array_of_tables_keeps_order() {
        let doc = parse_document(
            "[[items]]\nname = 'first'\n[[items]]\nname = 'second'\n[items.detail]\nok = true\n",
        )
        .unwrap();
        let items = doc.table().get("items").and_then(Value::as_array).unwrap();
        let names: Vec<_> = items
            .iter()
            .map(|item| item.get("name").and_then(Value::as_str).unwrap())
            .collect();
        assert_eq!(names, ["first", "second"]);
        assert!(items[1].get("detail").is_some());
        assert!(items[0].get("detail").is_none());
        assert_eq!(
            keys(&doc),
            ["items", "items.name", "items.detail", "items.detail.ok"]
        );
        assert_eq!(doc.metadata().type_of(&["items"]), Some(Kind::ArrayOfTables));
    }

    #[test]
    fn test_array_kind_clashes() {
        assert!(parse_document("[a]\n[[a]]\n").is_err());
        assert!(parse_document("[[a]]\n[a]\n").is_err());
        assert!(parse_document("a = []\n[[a]]\n").is_err());
        assert!(parse_document("a = 1\n[a]\n").is_err());
    }

    #[test]
    fn test_inline_tables_are_closed() {
        assert!(parse_document("a = { b = 1 }\n[a]\n").is_err());
        assert!(parse_document("a = { b = 1 }\na.c = 2\n").is_err());
        assert!(parse_document("a = { b = 1 }\n[a.c]\n").is_err());

        let doc = parse_document("a = { b.c = 1, b.d = 2 }\n").unwrap();
        assert_eq!(doc.table().get_path(&["a", "b", "d"]), Some(&Value::Integer(2)));
        assert_eq!(keys(&doc), ["a", "a.b", "a.b.c", "a.b.d"]);
    }

    #[test]
    fn test_mixed_arrays_are_accepted() {
        let doc = parse_document("mixed = [1, 'a', 2.5, [true], { x = 1 }]\n").unwrap();
        let mixed = doc.table().get("mixed").and_then(Value::as_array).unwrap();
        assert_eq!(mixed.len(), 5);
        assert_eq!(keys(&doc), ["mixed", "mixed.x"]);
    }

    #[test]
    fn test_inline_tables_in_arrays_share_the_array_path() {
        let doc = parse_document(
            "points = [{ x = 1, y = 2 }, { x = 3, z = { w = 1 } }]\nnested = [[{ id = 'a' }]]\n",
        )
        .unwrap();
        assert_eq!(
            keys(&doc),
            [
                "points",
                "points.x",
                "points.y",
                "points.z",
                "points.z.w",
                "nested",
                "nested.id"
            ]
        );
        assert_eq!(doc.metadata().type_of(&["points"]), Some(Kind::Array));
        assert_eq!(doc.metadata().type_of(&["points", "z"]), Some(Kind::Table));
    }

    #[test]
    fn test_deep_nesting_is_an_error() {
        let text = format!("a = {}{}\n", "[".repeat(5_000), "]".repeat(5_000));
        match parse_err(&text) {
            Error::Lex { line, .. } => assert_eq!(line, 1),
            other => panic!("expected lex error, got {other:?}"),
        }

        let text = format!("a = {}1{}\n", "{ b = ".repeat(5_000), " }".repeat(5_000));
        assert!(matches!(parse_err(&text), Error::Lex { .. }));
    }

    #[test]
    fn test_quoted_keys() {
        let doc = parse_document("[site.\"google.com\"]\n'key with space' = 1\n").unwrap();
        assert_eq!(
            doc.table().get_path(&["site", "google.com", "key with space"]),
            Some(&Value::Integer(1))
        );
        assert_eq!(
            doc.metadata().type_of(&["site", "google.com"]),
            Some(Kind::Table)
        );
    }

    #[test]
    fn test_missing_value() {
        let err = parse_err("a =\n");
        assert_eq!(err.key(), Some(&Key::from(["a"])));
    }

    #[test]
    fn test_empty_document() {
        let doc = parse_document("# only a comment\n\n").unwrap();
        assert!(doc.table().is_empty());
        assert!(doc.metadata().is_empty());
    }
}
