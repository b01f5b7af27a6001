//! Grammar conformance: documents that must parse to a known tree, and
//! documents that must be rejected.
//!
//! Valid documents are compared through the tagged JSON form used by the
//! `toml-test` suite, where every scalar becomes `{"type": ..., "value": ...}`.

use serde_json::{json, Value as Json};
use serde_tomlkit::{parse, Error, Kind, Value};

fn tagged(value: &Value) -> Json {
    let scalar = |kind: &str, text: String| json!({ "type": kind, "value": text });
    match value {
        Value::String(s) => scalar("string", s.clone()),
        Value::Integer(i) => scalar("integer", i.to_string()),
        Value::Float(_) => scalar("float", value.to_string()),
        Value::Boolean(b) => scalar("bool", b.to_string()),
        Value::Datetime(dt) => {
            let kind = match dt.kind() {
                Kind::OffsetDatetime => "datetime",
                Kind::LocalDatetime => "datetime-local",
                Kind::LocalDate => "date-local",
                _ => "time-local",
            };
            scalar(kind, dt.to_string())
        }
        Value::Array(items) => Json::Array(items.iter().map(tagged).collect()),
        Value::Table(table) => Json::Object(
            table
                .iter()
                .map(|(key, value)| (key.clone(), tagged(value)))
                .collect(),
        ),
    }
}

fn assert_tagged(input: &str, expected: Json) {
    let doc = parse(input).unwrap_or_else(|e| panic!("{input:?} failed to parse: {e}"));
    assert_eq!(tagged(&Value::Table(doc.into_table())), expected, "input: {input:?}");
}

fn assert_invalid(input: &str) {
    assert!(parse(input).is_err(), "{input:?} should be rejected");
}

#[test]
fn test_integers() {
    assert_tagged(
        "dec = +99\nhex = 0x1A\noct = 0o755\nbin = 0b1101\nsep = 1_000\nneg = -17\n",
        json!({
            "dec": {"type": "integer", "value": "99"},
            "hex": {"type": "integer", "value": "26"},
            "oct": {"type": "integer", "value": "493"},
            "bin": {"type": "integer", "value": "13"},
            "sep": {"type": "integer", "value": "1000"},
            "neg": {"type": "integer", "value": "-17"}
        }),
    );
}

#[test]
fn test_invalid_integers() {
    for input in [
        "a = 1__0\n",
        "a = _1\n",
        "a = 1_\n",
        "a = 007\n",
        "a = +0x10\n",
        "a = 0b102\n",
        "a = 9223372036854775808\n",
    ] {
        assert_invalid(input);
    }
}

#[test]
fn test_floats() {
    assert_tagged(
        "a = +1.0\nb = -0.01\nc = 5e+22\nd = 1e06\ne = -2E-2\nf = 6.626e-34\ng = inf\nh = -inf\ni = nan\n",
        json!({
            "a": {"type": "float", "value": "1.0"},
            "b": {"type": "float", "value": "-0.01"},
            "c": {"type": "float", "value": "5e22"},
            "d": {"type": "float", "value": "1000000.0"},
            "e": {"type": "float", "value": "-0.02"},
            "f": {"type": "float", "value": "6.626e-34"},
            "g": {"type": "float", "value": "inf"},
            "h": {"type": "float", "value": "-inf"},
            "i": {"type": "float", "value": "nan"}
        }),
    );
}

#[test]
fn test_invalid_floats() {
    for input in ["a = .7\n", "a = 7.\n", "a = 3.e+20\n", "a = 1e\n", "a = 1.5.3\n"] {
        assert_invalid(input);
    }
}

#[test]
fn test_booleans_and_strings() {
    assert_tagged(
        concat!(
            "t = true\n",
            "f = false\n",
            "basic = \"I'm a string. \\\"You can quote me\\\". Tab\\t\\u00E9\"\n",
            "literal = 'C:\\Users\\nodejs\\templates'\n",
            "multi = \"\"\"\nThe quick brown \\\n  fox.\"\"\"\n",
            "raw = '''\nfirst line\nsecond line'''\n",
        ),
        json!({
            "t": {"type": "bool", "value": "true"},
            "f": {"type": "bool", "value": "false"},
            "basic": {"type": "string", "value": "I'm a string. \"You can quote me\". Tab\t\u{e9}"},
            "literal": {"type": "string", "value": "C:\\Users\\nodejs\\templates"},
            "multi": {"type": "string", "value": "The quick brown fox."},
            "raw": {"type": "string", "value": "first line\nsecond line"}
        }),
    );
}

#[test]
fn test_invalid_strings() {
    for input in [
        "a = \"no end\n",
        "a = 'no end\n",
        "a = \"bad \\q\"\n",
        "a = \"\\uZZZZ\"\n",
        "a = \"\"\"never closed\n",
        "a = \"raw\u{1}control\"\n",
    ] {
        assert_invalid(input);
    }
}

#[test]
fn test_datetimes() {
    assert_tagged(
        concat!(
            "odt1 = 1979-05-27T07:32:00Z\n",
            "odt2 = 1979-05-27T00:32:00.999999-07:00\n",
            "odt3 = 1979-05-27 07:32:00Z\n",
            "ldt = 1979-05-27T07:32:00\n",
            "ld = 1979-05-27\n",
            "lt = 00:32:00.5\n",
        ),
        json!({
            "odt1": {"type": "datetime", "value": "1979-05-27T07:32:00Z"},
            "odt2": {"type": "datetime", "value": "1979-05-27T00:32:00.999999-07:00"},
            "odt3": {"type": "datetime", "value": "1979-05-27T07:32:00Z"},
            "ldt": {"type": "datetime-local", "value": "1979-05-27T07:32:00"},
            "ld": {"type": "date-local", "value": "1979-05-27"},
            "lt": {"type": "time-local", "value": "00:32:00.5"}
        }),
    );
}

#[test]
fn test_invalid_datetimes() {
    for input in [
        "a = 1979-13-01\n",
        "a = 1979-02-30\n",
        "a = 25:00:00\n",
        "a = 1979-05-27T07:32\n",
    ] {
        assert_invalid(input);
    }
}

#[test]
fn test_keys() {
    assert_tagged(
        concat!(
            "bare_key-1 = 1\n",
            "\"quoted key\" = 2\n",
            "'literal.key' = 3\n",
            "site.\"google.com\" = true\n",
            "1234 = 'numeric'\n",
        ),
        json!({
            "bare_key-1": {"type": "integer", "value": "1"},
            "quoted key": {"type": "integer", "value": "2"},
            "literal.key": {"type": "integer", "value": "3"},
            "site": {"google.com": {"type": "bool", "value": "true"}},
            "1234": {"type": "string", "value": "numeric"}
        }),
    );
}

#[test]
fn test_tables_and_arrays_of_tables() {
    assert_tagged(
        concat!(
            "[dog.\"tater.man\"]\n",
            "type.name = 'pug'\n",
            "\n",
            "[[products]]\n",
            "name = 'Hammer'\n",
            "\n",
            "[[products]]\n",
            "\n",
            "[[products]]\n",
            "name = 'Nail'\n",
            "color = 'gray'\n",
        ),
        json!({
            "dog": {"tater.man": {"type": {"name": {"type": "string", "value": "pug"}}}},
            "products": [
                {"name": {"type": "string", "value": "Hammer"}},
                {},
                {
                    "name": {"type": "string", "value": "Nail"},
                    "color": {"type": "string", "value": "gray"}
                }
            ]
        }),
    );
}

#[test]
fn test_inline_tables_and_arrays() {
    assert_tagged(
        concat!(
            "point = { x = 1, y = 2 }\n",
            "empty = {}\n",
            "nested = [[1, 2], ['a']]\n",
            "multi = [\n  1, # first\n  2,\n]\n",
            "records = [{ id = 1 }, { id = 2 }]\n",
        ),
        json!({
            "point": {
                "x": {"type": "integer", "value": "1"},
                "y": {"type": "integer", "value": "2"}
            },
            "empty": {},
            "nested": [
                [{"type": "integer", "value": "1"}, {"type": "integer", "value": "2"}],
                [{"type": "string", "value": "a"}]
            ],
            "multi": [{"type": "integer", "value": "1"}, {"type": "integer", "value": "2"}],
            "records": [
                {"id": {"type": "integer", "value": "1"}},
                {"id": {"type": "integer", "value": "2"}}
            ]
        }),
    );
}

#[test]
fn test_invalid_structure() {
    for input in [
        "a = 1\na = 2\n",
        "a = 1 b = 2\n",
        "= 1\n",
        "a\n",
        "a =\n",
        "[a]\n[a]\n",
        "a = 1\n[a]\n",
        "[a]\nb = 1\n[a.b]\n",
        "a = { b = 1 }\n[a]\n",
        "a = { b = 1, }\n",
        "a = { b = 1,\n c = 2 }\n",
        "a = [1,,2]\n",
        "a = [1, 2\n",
        "[[a]]\n[a]\n",
        "[a]\n[[a]]\n",
        "[a\n",
        "[]\n",
        "a.b = 1\na.b.c = 2\n",
    ] {
        assert_invalid(input);
    }
}

#[test]
fn test_errors_carry_positions() {
    match parse("title = 'ok'\n\n[server]\nport = 0x\n").unwrap_err() {
        Error::Lex { line, col, .. } => {
            assert_eq!(line, 4);
            assert_eq!(col, 8);
        }
        other => panic!("expected lex error, got {other}"),
    }

    match parse("[server]\nport = 1\nport = 2\n").unwrap_err() {
        Error::Parse { line, key, .. } => {
            assert_eq!(line, 3);
            assert_eq!(key.to_string(), "server.port");
        }
        other => panic!("expected parse error, got {other}"),
    }
}

#[test]
fn test_whitespace_and_comments() {
    assert_tagged(
        "# leading comment\n\t  a   =   1   # trailing\r\n\n[ t ]   # header comment\nb = 2",
        json!({
            "a": {"type": "integer", "value": "1"},
            "t": {"b": {"type": "integer", "value": "2"}}
        }),
    );
}
