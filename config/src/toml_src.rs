//! TOML front end for [`Table`].
//!
//! The engine feeds the registry from its own script parser; the tooling in
//! this workspace reads the same structure from TOML files.

use crate::table::{Table, Value};

#[derive(Debug)]
pub enum ConfigError {
    Parse(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Parse(msg) => write!(f, "config parse error: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Parse a TOML document into a [`Table`].
pub fn from_toml_str(src: &str) -> Result<Table, ConfigError> {
    let doc: toml::Table = src
        .parse()
        .map_err(|e: toml::de::Error| ConfigError::Parse(e.to_string()))?;
    Ok(convert_table(&doc))
}

fn convert_table(doc: &toml::Table) -> Table {
    let mut out = Table::new();
    for (key, value) in doc.iter() {
        out.insert(key, convert_value(value));
    }
    out
}

fn convert_value(value: &toml::Value) -> Value {
    match value {
        toml::Value::Boolean(b) => Value::Bool(*b),
        toml::Value::Integer(i) => Value::Int(*i),
        toml::Value::Float(f) => Value::Float(*f),
        toml::Value::String(s) => Value::Str(s.clone()),
        toml::Value::Datetime(d) => Value::Str(d.to_string()),
        toml::Value::Array(items) => Value::List(items.iter().map(convert_value).collect()),
        toml::Value::Table(t) => Value::Table(convert_table(t)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_tables() {
        let table = from_toml_str(
            r#"
            useDefaultExplosions = false

            [sparks]
            class = "CSpark"
            ground = true
            count = 8

            [sparks.properties]
            size = "5 r2"
            "#,
        )
        .unwrap();

        assert!(!table.get_bool("useDefaultExplosions", true));
        let sparks = table.sub_table("sparks").unwrap();
        assert_eq!(sparks.get_string("class", ""), "CSpark");
        assert_eq!(sparks.get_int("count", 1), 8);
        let props = sparks.sub_table("properties").unwrap();
        assert_eq!(props.get_string("size", ""), "5 r2");
    }

    #[test]
    fn rejects_bad_toml() {
        assert!(from_toml_str("= nope").is_err());
    }
}
