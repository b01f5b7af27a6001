use serde_tomlkit::{toml, to_string, Datetime, Kind, Table, Value};

#[test]
fn test_toml_macro_booleans() {
    assert_eq!(toml!(true), Value::Boolean(true));
    assert_eq!(toml!(false), Value::Boolean(false));
}

#[test]
fn test_toml_macro_numbers() {
    assert_eq!(toml!(42), Value::Integer(42));
    assert_eq!(toml!(3.5), Value::Float(3.5));
    assert_eq!(toml!(-123), Value::Integer(-123));
}

#[test]
fn test_toml_macro_strings() {
    assert_eq!(toml!("hello world"), Value::String("hello world".to_string()));
    assert_eq!(toml!(""), Value::String(String::new()));
}

#[test]
fn test_toml_macro_datetime_expression() {
    let dt: Datetime = "1979-05-27".parse().unwrap();
    let value = toml!(dt);
    assert_eq!(value.kind(), Kind::LocalDate);
}

#[test]
fn test_toml_macro_arrays() {
    assert_eq!(toml!([]), Value::Array(vec![]));

    assert_eq!(
        toml!([1, 2, 3]),
        Value::Array(vec![
            Value::Integer(1),
            Value::Integer(2),
            Value::Integer(3),
        ])
    );

    assert_eq!(
        toml!([1, "hello", true]),
        Value::Array(vec![
            Value::Integer(1),
            Value::String("hello".to_string()),
            Value::Boolean(true),
        ])
    );
}

#[test]
fn test_toml_macro_tables() {
    assert_eq!(toml!({}), Value::Table(Table::new()));

    let simple = toml!({
        "name": "Alice",
        "age": 30
    });

    match simple {
        Value::Table(ref table) => {
            assert_eq!(table.len(), 2);
            assert_eq!(table.get("name"), Some(&Value::String("Alice".to_string())));
            assert_eq!(table.get("age"), Some(&Value::Integer(30)));
        }
        _ => panic!("Expected table"),
    }
}

#[test]
fn test_toml_macro_nested() {
    let nested = toml!({
        "user": {
            "id": 123,
            "name": "Bob",
            "active": true
        },
        "tags": ["admin", "developer"],
        "count": 42
    });

    let table = nested.as_table().unwrap();
    assert_eq!(table.len(), 3);

    let user = table.get("user").and_then(Value::as_table).unwrap();
    assert_eq!(user.get("id"), Some(&Value::Integer(123)));
    assert_eq!(user.get("name"), Some(&Value::String("Bob".to_string())));
    assert_eq!(user.get("active"), Some(&Value::Boolean(true)));

    let tags = table.get("tags").and_then(Value::as_array).unwrap();
    assert_eq!(tags.len(), 2);
    assert_eq!(tags[0], Value::String("admin".to_string()));

    assert_eq!(table.get_path(&["user", "name"]).and_then(Value::as_str), Some("Bob"));
}

#[test]
fn test_toml_macro_keeps_key_order() {
    let value = toml!({"zeta": 1, "alpha": 2, "mid": 3});
    let keys: Vec<&str> = value.as_table().unwrap().keys().map(String::as_str).collect();
    assert_eq!(keys, ["zeta", "alpha", "mid"]);
}

#[test]
fn test_toml_macro_encodes() {
    let value = toml!({
        "title": "demo",
        "servers": [{"ip": "10.0.0.1"}, {"ip": "10.0.0.2"}],
        "owner": {"name": "Tom"}
    });

    assert_eq!(
        to_string(&value).unwrap(),
        "title = 'demo'\n\n[owner]\nname = 'Tom'\n\n[[servers]]\nip = '10.0.0.1'\n\n[[servers]]\nip = '10.0.0.2'\n"
    );
}

#[test]
fn test_value_methods() {
    let bool_val = toml!(true);
    assert!(bool_val.is_bool());
    assert!(!bool_val.is_str());
    assert_eq!(bool_val.as_bool(), Some(true));
    assert_eq!(bool_val.kind(), Kind::Bool);

    let str_val = toml!("hello");
    assert!(str_val.is_str());
    assert_eq!(str_val.as_str(), Some("hello"));

    let float_val = toml!(0.5);
    assert!(float_val.is_float());
    assert_eq!(float_val.as_float(), Some(0.5));
    assert_eq!(float_val.as_integer(), None);

    let array_val = toml!([1, 2, 3]);
    assert!(array_val.is_array());
    assert!(!array_val.is_table_like());
    assert_eq!(array_val.as_array().unwrap().len(), 3);

    let aot = toml!([{"a": 1}, {"a": 2}]);
    assert!(aot.is_table_like());

    let table_val = toml!({"key": "value"});
    assert!(table_val.is_table());
    assert_eq!(table_val.as_table().unwrap().len(), 1);
}
