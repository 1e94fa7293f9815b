//! Class definitions from TOML.
//!
//! The engine feeds the compiler its reflected classes; the CLI reads an
//! equivalent description from a file so configs can be compiled and test
//! fired outside the engine.

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;

use reflect::{AssetKind, FieldKind, TypeBuilder, TypeRegistry};

#[derive(Debug, Deserialize)]
pub struct ClassDefs {
    #[serde(default)]
    pub types: Vec<ClassDef>,
}

#[derive(Debug, Deserialize)]
pub struct ClassDef {
    pub name: String,
    #[serde(default)]
    pub base: Option<String>,
    #[serde(default)]
    pub synced: bool,
    #[serde(default)]
    pub spawnable: bool,
    #[serde(default)]
    pub fields: Vec<FieldDef>,
}

#[derive(Debug, Deserialize)]
pub struct FieldDef {
    pub name: String,
    /// `i32`, `f32`, `bool`, `u8`, `texture`, `groundfx`, `colormap`,
    /// `generator`, a registered type name, or any of these with an array
    /// suffix like `f32[3]`.
    pub kind: String,
    #[serde(default)]
    pub config: bool,
}

pub fn load_registry(path: &str) -> Result<TypeRegistry> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read class definitions from {}", path))?;
    let defs: ClassDefs =
        toml::from_str(&text).with_context(|| format!("failed to parse {}", path))?;
    build_registry(&defs)
}

pub fn build_registry(defs: &ClassDefs) -> Result<TypeRegistry> {
    let mut registry = TypeRegistry::new();

    for class in &defs.types {
        let mut builder = TypeBuilder::new(&class.name);
        if let Some(base) = &class.base {
            builder = builder.base(base);
        }
        if class.synced {
            builder = builder.synced();
        }
        if class.spawnable {
            builder = builder.spawnable();
        }
        for field in &class.fields {
            let kind = parse_kind(&registry, &field.kind)
                .with_context(|| format!("field {}::{}", class.name, field.name))?;
            builder = if field.config {
                builder.config_field(&field.name, kind)
            } else {
                builder.field(&field.name, kind)
            };
        }
        registry
            .register(builder)
            .with_context(|| format!("registering class {}", class.name))?;
    }

    Ok(registry)
}

fn parse_kind(registry: &TypeRegistry, spec: &str) -> Result<FieldKind> {
    if let Some((elem, rest)) = spec.split_once('[') {
        let count: u32 = rest
            .trim_end_matches(']')
            .parse()
            .with_context(|| format!("bad array length in \"{}\"", spec))?;
        return Ok(FieldKind::Array {
            elem: Box::new(parse_kind(registry, elem)?),
            count,
        });
    }

    Ok(match spec {
        "i32" => FieldKind::Int32,
        "f32" => FieldKind::Float32,
        "bool" => FieldKind::Bool,
        "u8" => FieldKind::UInt8,
        "texture" => FieldKind::Asset(AssetKind::Texture),
        "groundfx" => FieldKind::Asset(AssetKind::GroundFxTexture),
        "colormap" => FieldKind::Asset(AssetKind::ColorMap),
        "generator" => FieldKind::Asset(AssetKind::Generator),
        name => FieldKind::Object(
            registry
                .find(name)
                .ok_or_else(|| anyhow!("unknown field kind \"{}\"", name))?,
        ),
    })
}

/// Inverse of `parse_kind`, for the `classes` dump.
pub fn kind_name(registry: &TypeRegistry, kind: &FieldKind) -> String {
    match kind {
        FieldKind::Int32 => "i32".to_string(),
        FieldKind::Float32 => "f32".to_string(),
        FieldKind::Bool => "bool".to_string(),
        FieldKind::UInt8 => "u8".to_string(),
        FieldKind::Object(tid) => registry.def(*tid).name.clone(),
        FieldKind::Array { elem, count } => {
            format!("{}[{}]", kind_name(registry, elem), count)
        }
        FieldKind::Asset(AssetKind::Texture) => "texture".to_string(),
        FieldKind::Asset(AssetKind::GroundFxTexture) => "groundfx".to_string(),
        FieldKind::Asset(AssetKind::ColorMap) => "colormap".to_string(),
        FieldKind::Asset(AssetKind::Generator) => "generator".to_string(),
    }
}
