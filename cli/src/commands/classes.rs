use anyhow::Result;
use reflect::AliasList;
use serde_json::{Map, Value};
use std::fs;

use crate::defs::{self, kind_name};

/// Print the spawnable, non-synced classes with their configurable fields,
/// as JSON. This is the reference a config author works from.
pub fn dump_classes(defs_path: &str, aliases: Option<&str>) -> Result<()> {
    let types = defs::load_registry(defs_path)?;

    let mut alias_list = AliasList::new();
    if let Some(path) = aliases {
        let text = fs::read_to_string(path)?;
        let root = config::from_toml_str(&text)?;
        if let Some(t) = root.sub_table("projectiles") {
            alias_list.load(t.string_entries());
        }
    }

    let mut out = Map::new();
    for (id, def) in types.iter() {
        if !def.spawnable || def.synced {
            continue;
        }

        let mut entry = Map::new();
        entry.insert(
            "alias".to_string(),
            Value::String(alias_list.find_alias(&def.name)),
        );
        for field in types.configurable_fields(id) {
            entry.insert(
                field.name.clone(),
                Value::String(kind_name(&types, &field.kind)),
            );
        }
        out.insert(def.name.clone(), Value::Object(entry));
    }

    println!("{}", serde_json::to_string_pretty(&Value::Object(out))?);
    Ok(())
}
