use anyhow::Result;
use explgen::{CustomExplosionGenerator, ExplosionGenerator, ExplosionGeneratorHandler};

use crate::defs;
use crate::stores::{FileConfig, SharedAssets};

pub fn compile_tags(
    defs_path: &str,
    explosions: &str,
    aliases: Option<&str>,
    tag: Option<&str>,
) -> Result<()> {
    let types = defs::load_registry(defs_path)?;
    let assets = SharedAssets::default();
    let mut handler = ExplosionGeneratorHandler::new(
        Box::new(FileConfig::new(explosions, aliases)),
        Box::new(assets.clone()),
    );
    let mut custom = CustomExplosionGenerator::new();

    let tags: Vec<String> = match tag {
        Some(t) => vec![t.to_string()],
        None => handler
            .explosion_root()
            .map(|root| root.keys().map(str::to_string).collect())
            .unwrap_or_default(),
    };

    if tags.is_empty() {
        println!("nothing to compile in {}", explosions);
        return Ok(());
    }

    for tag in &tags {
        let id = custom.load(&mut handler, &types, tag);
        match custom.ceg_data(id) {
            Some(ceg) => {
                let bytes: usize = ceg.spawns.iter().map(|s| s.program.len()).sum();
                println!(
                    "{:<24} id {:<4} {} spawn entries, {} bytes, {} assets",
                    tag,
                    id.0,
                    ceg.spawns.len(),
                    bytes,
                    ceg.handles.len()
                );
            }
            None => println!("{:<24} INVALID", tag),
        }
    }

    Ok(())
}
