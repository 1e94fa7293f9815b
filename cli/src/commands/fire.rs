use anyhow::{bail, Result};
use explgen::{
    CustomExplosionGenerator, ExplosionEnv, ExplosionGenerator, ExplosionGeneratorHandler,
    ExplosionParams,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use reflect::{FieldKind, Float3, Instance, TypeRegistry};

use crate::defs;
use crate::stores::{CollectSink, FileConfig, FlatGround, RecordingAssets, SharedAssets};

pub fn fire_tag(
    defs_path: &str,
    explosions: &str,
    aliases: Option<&str>,
    tag: &str,
    damage: f32,
    radius: f32,
    height: f32,
    seed: u64,
) -> Result<()> {
    let types = defs::load_registry(defs_path)?;
    let assets = SharedAssets::default();
    let mut handler = ExplosionGeneratorHandler::new(
        Box::new(FileConfig::new(explosions, aliases)),
        Box::new(assets.clone()),
    );
    let mut custom = CustomExplosionGenerator::new();

    let id = custom.load(&mut handler, &types, tag);
    if !id.is_valid() {
        bail!("tag \"{}\" did not compile", tag);
    }

    let mut sink = CollectSink::default();
    let ground = FlatGround(0.0);
    let mut rng = StdRng::seed_from_u64(seed);
    let mut env = ExplosionEnv {
        types: &types,
        ground: &ground,
        sink: &mut sink,
        rng: &mut rng,
    };
    let params = ExplosionParams {
        pos: Float3::new(0.0, height, 0.0),
        dir: Float3::new(0.0, 1.0, 0.0),
        damage,
        radius,
        gfx_mod: 1.0,
        owner: None,
        hit_unit: false,
    };

    let ok = custom.explosion(id, &params, &mut env);
    println!(
        "{} (id {}): {}",
        tag,
        id.0,
        if ok { "fired" } else { "failed" }
    );

    let recorded = assets.0.borrow();
    for (i, instance) in sink.spawned.iter().enumerate() {
        let name = &types.def(instance.type_id()).name;
        println!("[{}] {}", i, name);
        print_instance(&types, &recorded, instance);
    }

    for flash in &sink.flashes {
        println!(
            "groundflash: size {} alpha {} growth {} ttl {}",
            flash.flash_size, flash.flash_alpha, flash.circle_growth, flash.ttl
        );
    }
    if !sink.defaults.is_empty() {
        println!("default explosion triggered ({} time(s))", sink.defaults.len());
    }

    Ok(())
}

fn print_instance(types: &TypeRegistry, assets: &RecordingAssets, instance: &Instance) {
    for field in types.layout_fields(instance.type_id()) {
        let value = format_value(types, assets, instance, &field.kind, field.offset as usize);
        println!("    {:<16} {}", field.name, value);
    }
}

fn format_value(
    types: &TypeRegistry,
    assets: &RecordingAssets,
    instance: &Instance,
    kind: &FieldKind,
    offset: usize,
) -> String {
    match kind {
        FieldKind::Int32 => instance
            .read_i32(offset)
            .map(|v| v.to_string())
            .unwrap_or_else(|_| "?".to_string()),
        FieldKind::Float32 => instance
            .read_f32(offset)
            .map(|v| v.to_string())
            .unwrap_or_else(|_| "?".to_string()),
        FieldKind::Bool => instance
            .read_i32(offset)
            .map(|v| (v != 0).to_string())
            .unwrap_or_else(|_| "?".to_string()),
        FieldKind::UInt8 => instance
            .read_u8(offset)
            .map(|v| v.to_string())
            .unwrap_or_else(|_| "?".to_string()),
        FieldKind::Object(tid) => {
            let parts: Vec<String> = types
                .layout_fields(*tid)
                .iter()
                .map(|f| {
                    format!(
                        "{}: {}",
                        f.name,
                        format_value(types, assets, instance, &f.kind, offset + f.offset as usize)
                    )
                })
                .collect();
            format!("{{ {} }}", parts.join(", "))
        }
        FieldKind::Array { elem, count } => {
            let stride = types.kind_size(elem) as usize;
            let parts: Vec<String> = (0..*count as usize)
                .map(|i| format_value(types, assets, instance, elem, offset + i * stride))
                .collect();
            format!("[{}]", parts.join(", "))
        }
        FieldKind::Asset(_) => match instance.read_u32(offset) {
            Ok(0) => "<unset>".to_string(),
            Ok(handle) => match assets.name_of(handle) {
                Some(name) => format!("{} (#{})", name, handle),
                None => format!("#{}", handle),
            },
            Err(_) => "?".to_string(),
        },
    }
}
