/// Builds a [`Value`](crate::Value) from a JSON-like literal.
///
/// Tables keep the order their keys are written in. Any other expression is
/// converted with `Value::from`.
///
/// ```rust
/// use serde_tomlkit::{toml, Value};
///
/// let server = toml!({
///     "host": "localhost",
///     "ports": [8000, 8001],
///     "tls": { "enabled": false }
/// });
/// assert_eq!(server.get("ports"), Some(&toml!([8000, 8001])));
/// assert_eq!(toml!(1.5), Value::Float(1.5));
/// ```
#[macro_export]
macro_rules! toml {
    (true) => {
        $crate::Value::Boolean(true)
    };

    (false) => {
        $crate::Value::Boolean(false)
    };

    ([]) => {
        $crate::Value::Array(vec![])
    };

    ([ $($elem:tt),* $(,)? ]) => {
        $crate::Value::Array(vec![$($crate::toml!($elem)),*])
    };

    ({}) => {
        $crate::Value::Table($crate::Table::new())
    };

    ({ $($key:literal : $value:tt),* $(,)? }) => {{
        let mut table = $crate::Table::new();
        $(
            table.insert($key.to_string(), $crate::toml!($value));
        )*
        $crate::Value::Table(table)
    }};

    ($other:expr) => {
        $crate::Value::from($other)
    };
}

#[cfg(test)]
mod tests {
    use crate::{Table, Value};

    #[test]
    fn test_toml_macro_scalars() {
        assert_eq!(toml!(true), Value::Boolean(true));
        assert_eq!(toml!(42), Value::Integer(42));
        assert_eq!(toml!(2.5), Value::Float(2.5));
        assert_eq!(toml!("hello"), Value::String("hello".to_string()));
    }

    #[test]
    fn test_toml_macro_nesting() {
        assert_eq!(toml!({}), Value::Table(Table::new()));
        let value = toml!({"a": [1, {"b": false}]});
        let items = value.get("a").and_then(Value::as_array).unwrap();
        assert_eq!(items[0], Value::Integer(1));
        assert_eq!(items[1].get("b"), Some(&Value::Boolean(false)));
    }
}
