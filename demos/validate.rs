//! Parse a TOML file and list every key with its kind.
//!
//! Run with: cargo run --example validate -- path/to/file.toml
//!
//! Without an argument a built-in sample is used.

use serde_tomlkit::{parse, Kind};
use std::error::Error;

const SAMPLE: &str = r#"
title = "TOML Example"

[owner]
name = "Tom Preston-Werner"
dob = 1979-05-27T07:32:00-08:00

[database]
ports = [ 8000, 8001, 8002 ]
data = [ ["delta", "phi"], [3.14] ]
temp_targets = { cpu = 79.5, case = 72.0 }

[[products]]
name = "Hammer"
sku = 738594937

[[products]]
name = "Nail"
color = "gray"
"#;

fn main() -> Result<(), Box<dyn Error>> {
    let (source, text) = match std::env::args().nth(1) {
        Some(path) => {
            let text = std::fs::read_to_string(&path)?;
            (path, text)
        }
        None => ("<sample>".to_string(), SAMPLE.to_string()),
    };

    let document = match parse(&text) {
        Ok(document) => document,
        Err(e) => {
            eprintln!("{}: invalid\n{}", source, e);
            std::process::exit(1);
        }
    };

    println!("{}: valid, {} keys\n", source, document.metadata().len());
    for (key, kind) in document.metadata().entries() {
        let depth = key.len().saturating_sub(1);
        let marker = if kind.is_table_like() { "/" } else { "" };
        println!("{}{}{}  ({})", "  ".repeat(depth), key, marker, kind);
    }

    let tables = document
        .metadata()
        .entries()
        .filter(|(_, kind)| matches!(kind, Kind::Table | Kind::ArrayOfTables))
        .count();
    let datetimes = document
        .metadata()
        .entries()
        .filter(|(_, kind)| kind.is_datetime())
        .count();
    println!("\n{} tables, {} datetimes", tables, datetimes);

    println!("\nRe-encoded:\n{}", document);
    Ok(())
}
