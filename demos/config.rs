//! Decode an application config, report keys nothing consumed, and write it back.
//!
//! Run with: cargo run --example config

use serde::{Deserialize, Serialize};
use serde_tomlkit::{decode, to_string, to_string_pretty, DecodeOptions, Error};
use std::collections::BTreeMap;

#[derive(Debug, Serialize, Deserialize)]
struct Config {
    name: String,
    #[serde(default)]
    debug: bool,
    server: Server,
    #[serde(default)]
    upstream: Vec<Upstream>,
    #[serde(default)]
    labels: BTreeMap<String, String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Server {
    host: String,
    #[serde(default = "default_port")]
    port: u16,
    timeout_secs: Option<f64>,
}

fn default_port() -> u16 {
    8080
}

#[derive(Debug, Serialize, Deserialize)]
struct Upstream {
    url: String,
    weight: u32,
}

const CONFIG: &str = r#"
Name = "gateway"
started = 2024-03-01T09:30:00Z

[server]
HOST = "0.0.0.0"
timeout_secs = 2.5
workers = 4

[[upstream]]
url = "http://10.0.0.1:9000"
weight = 3

[[upstream]]
url = "http://10.0.0.2:9000"
weight = 1

[labels]
team = "edge"
"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (config, metadata) = decode::<Config>(CONFIG, DecodeOptions::new())?;
    println!("Decoded: {:#?}\n", config);

    println!("Keys not consumed by Config:");
    for key in metadata.undecoded() {
        println!("  {}", key);
    }

    match decode::<Config>(CONFIG, DecodeOptions::strict()) {
        Ok(_) => println!("\nStrict decode succeeded"),
        Err(Error::UnmatchedKeys { keys }) => {
            println!("\nStrict decode rejected {} keys", keys.len());
        }
        Err(e) => return Err(e.into()),
    }

    println!("\nEncoded:\n{}", to_string(&config)?);
    println!("Pretty:\n{}", to_string_pretty(&config)?);
    Ok(())
}
