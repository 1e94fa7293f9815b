use anyhow::{bail, Result};
use explgen::{CustomExplosionGenerator, ExplosionGenerator, ExplosionGeneratorHandler};
use vm::disasm::disassemble;

use crate::defs;
use crate::stores::{FileConfig, SharedAssets};

pub fn disassemble_tag(
    defs_path: &str,
    explosions: &str,
    aliases: Option<&str>,
    tag: &str,
) -> Result<()> {
    let types = defs::load_registry(defs_path)?;
    let assets = SharedAssets::default();
    let mut handler = ExplosionGeneratorHandler::new(
        Box::new(FileConfig::new(explosions, aliases)),
        Box::new(assets.clone()),
    );
    let mut custom = CustomExplosionGenerator::new();

    let id = custom.load(&mut handler, &types, tag);
    let ceg = match custom.ceg_data(id) {
        Some(c) => c,
        None => bail!("tag \"{}\" did not compile", tag),
    };

    println!("== {} (id {}) ==", tag, id.0);
    for (i, psi) in ceg.spawns.iter().enumerate() {
        println!(
            "spawn {}: {} x{}  flags 0x{:02x}  target {}",
            i,
            psi.class_name,
            psi.count,
            psi.flags,
            types.def(psi.target).name
        );
        for line in disassemble(psi.program.code()) {
            println!("  {}", line);
        }
    }

    if !ceg.handles.is_empty() {
        println!("asset side-table:");
        let recorded = assets.0.borrow();
        for (i, handle) in ceg.handles.iter().enumerate() {
            match recorded.name_of(handle.raw()) {
                Some(name) => println!("  handle[{}] = {} ({:?})", i, name, handle),
                None => println!("  handle[{}] = {:?}", i, handle),
            }
        }
    }

    Ok(())
}
