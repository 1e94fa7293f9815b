//! The custom explosion generator: compiles tagged configuration into
//! program-sets and caches them under dense, stable ids.

use std::collections::HashMap;

use compiler::{ProgramCompiler, ResolveContext};
use config::Table;
use log::{error, info, warn};
use reflect::{Float3, TypeRegistry};
use vm::AssetRef;

use crate::data::{CegData, GroundFlashInfo, ProjectileSpawnInfo};
use crate::flags::{
    flags_from_height, flags_from_table, SPW_GROUND, SPW_NO_UNIT, SPW_UNIT,
};
use crate::handler::ExplosionGeneratorHandler;
use crate::sink::{ExplosionEnv, ExplosionParams};
use crate::stdgen;
use crate::{ExplosionGenerator, ExplosionId, GeneratorId};

#[derive(Debug)]
enum LoadError {
    /// A spawn entry named a class from the synchronized-state partition.
    /// That refuses the whole generator, not just the entry.
    SyncedClass { class: String },
}

/// Compile-time resolution context backed by the handler's stores. Nested
/// generator loads are recorded so the caller can own (and later release)
/// them.
struct SpawnResolveCtx<'a> {
    handler: &'a mut ExplosionGeneratorHandler,
    types: &'a TypeRegistry,
    loaded: &'a mut Vec<GeneratorId>,
}

impl ResolveContext for SpawnResolveCtx<'_> {
    fn resolve_texture(&mut self, name: &str) -> Option<AssetRef> {
        self.handler.assets_mut().resolve_texture(name).map(AssetRef::Texture)
    }

    fn resolve_ground_fx_texture(&mut self, name: &str) -> Option<AssetRef> {
        self.handler
            .assets_mut()
            .resolve_ground_fx_texture(name)
            .map(AssetRef::GroundFxTexture)
    }

    fn resolve_color_map(&mut self, def: &str) -> Option<AssetRef> {
        self.handler.assets_mut().resolve_color_map(def).map(AssetRef::ColorMap)
    }

    fn load_spawn_generator(&mut self, tag: &str) -> Option<AssetRef> {
        let id = self.handler.load_generator(self.types, tag)?;
        self.loaded.push(id);
        Some(AssetRef::Generator(id.0))
    }
}

#[derive(Default)]
pub struct CustomExplosionGenerator {
    generator_id: GeneratorId,
    ids: HashMap<String, u32>,
    data: Vec<CegData>,
    /// Generator instances our compiled programs reference; released on
    /// unload.
    spawn_gens: Vec<GeneratorId>,
}

impl CustomExplosionGenerator {
    pub fn new() -> Self {
        CustomExplosionGenerator::default()
    }

    /// Number of compiled program-sets currently cached.
    pub fn cached_count(&self) -> usize {
        self.data.len()
    }

    /// The id a tag currently resolves to, without compiling.
    pub fn lookup(&self, tag: &str) -> ExplosionId {
        self.ids
            .get(tag)
            .map(|&id| ExplosionId(id))
            .unwrap_or(ExplosionId::INVALID)
    }

    pub fn ceg_data(&self, id: ExplosionId) -> Option<&CegData> {
        self.data.get(id.0 as usize)
    }

    pub fn clear_cache(&mut self) {
        self.spawn_gens.clear();
        self.ids.clear();
        self.data.clear();
    }
}

fn compile_ceg(
    handler: &mut ExplosionGeneratorHandler,
    types: &TypeRegistry,
    tag: &str,
    table: &Table,
    loaded: &mut Vec<GeneratorId>,
) -> Result<CegData, LoadError> {
    let mut ceg = CegData::default();

    for (name, _) in table.iter() {
        let spawn_table = match table.sub_table(name) {
            Some(t) if name != "groundflash" => t,
            _ => continue,
        };

        let class_name = spawn_table.get_string("class", name);
        let resolved = handler.projectile_classes.resolve(&class_name);

        let target = match types.find(&resolved) {
            Some(t) => t,
            None => {
                warn!("{}: unknown class \"{}\"", tag, class_name);
                continue;
            }
        };
        let def = types.def(target);
        if def.synced {
            return Err(LoadError::SyncedClass { class: class_name });
        }
        if !def.spawnable {
            warn!("{}: class \"{}\" is not spawnable", tag, class_name);
            continue;
        }

        let flags = flags_from_table(spawn_table);
        let count = spawn_table.get_int("count", 1);

        let mut ctx = SpawnResolveCtx {
            handler: &mut *handler,
            types,
            loaded: &mut *loaded,
        };
        let mut pc = ProgramCompiler::new(types, &mut ctx, &mut ceg.handles);

        if let Some(props) = spawn_table.sub_table("properties") {
            for (prop, script) in props.string_entries() {
                match types.find_field(target, &prop) {
                    Some(field) if field.config => {
                        pc.compile_field(&field.kind, field.offset, &script)
                    }
                    _ => warn!("{}: unknown property {}::{}", tag, resolved, prop),
                }
            }
        }

        ceg.spawns.push(ProjectileSpawnInfo {
            class_name: resolved,
            target,
            flags,
            count,
            program: pc.finish(target),
        });
    }

    if let Some(gnd) = table.sub_table("groundflash") {
        let ttl = gnd.get_int("ttl", 0);
        if ttl > 0 {
            ceg.ground_flash = GroundFlashInfo {
                flash_size: gnd.get_float("flashSize", 0.0),
                flash_alpha: gnd.get_float("flashAlpha", 0.0),
                circle_growth: gnd.get_float("circleGrowth", 0.0),
                circle_alpha: gnd.get_float("circleAlpha", 0.0),
                color: gnd.get_float3("color", Float3::new(1.0, 1.0, 0.8)),
                ttl,
                flags: SPW_GROUND | flags_from_table(gnd),
            };
        }
    }

    ceg.use_default_explosions = table.get_bool("useDefaultExplosions", false);

    Ok(ceg)
}

impl ExplosionGenerator for CustomExplosionGenerator {
    fn generator_id(&self) -> GeneratorId {
        self.generator_id
    }

    fn set_generator_id(&mut self, id: GeneratorId) {
        self.generator_id = id;
    }

    fn load(
        &mut self,
        handler: &mut ExplosionGeneratorHandler,
        types: &TypeRegistry,
        tag: &str,
    ) -> ExplosionId {
        if let Some(&id) = self.ids.get(tag) {
            return ExplosionId(id);
        }

        let table = match handler.explosion_root().and_then(|root| root.sub_table(tag)) {
            Some(t) => t.clone(),
            None => {
                // not fatal: firing the invalid id is a clean no-op
                warn!("table for explosion \"{}\" missing or invalid", tag);
                return ExplosionId::INVALID;
            }
        };

        let mut loaded = Vec::new();
        match compile_ceg(handler, types, tag, &table, &mut loaded) {
            Ok(ceg) => {
                self.spawn_gens.extend(loaded);
                self.data.push(ceg);
                let id = (self.data.len() - 1) as u32;
                self.ids.insert(tag.to_string(), id);
                ExplosionId(id)
            }
            Err(e) => {
                error!("explosion \"{}\" refused: {:?}", tag, e);
                for id in loaded {
                    handler.unload_generator(id);
                }
                ExplosionId::INVALID
            }
        }
    }

    fn reload(
        &mut self,
        handler: &mut ExplosionGeneratorHandler,
        types: &TypeRegistry,
        tag: &str,
    ) {
        if tag.is_empty() {
            // full reload: recompile every cached tag in ascending id order
            // so each keeps its id
            let mut old: Vec<(String, u32)> =
                self.ids.iter().map(|(t, &id)| (t.clone(), id)).collect();
            old.sort_by_key(|&(_, id)| id);

            self.unload(handler);
            self.clear_cache();

            for (tmp_tag, old_id) in old {
                info!(
                    "[generator {}] reloading \"{}\" (id {})",
                    self.generator_id.0, tmp_tag, old_id
                );
                self.load(handler, types, &tmp_tag);
            }
            return;
        }

        // single-tag reload: swap-and-pop the slot, recompile, and restore
        // the previous data if recompilation fails
        let ceg_index = match self.ids.get(tag) {
            Some(&id) => id as usize,
            None => return,
        };

        let num_cegs = self.data.len();
        let old_ceg = self.data[ceg_index].clone();
        let tmp_ceg = self.data[num_cegs - 1].clone();

        self.ids.remove(tag);
        self.data[ceg_index] = tmp_ceg.clone();
        self.data.pop();

        info!(
            "[generator {}] reloading single explosion \"{}\" (id {})",
            self.generator_id.0, tag, ceg_index
        );

        if self.load(handler, types, tag) == ExplosionId::INVALID {
            error!(
                "[generator {}] failed to reload \"{}\" (id {}), keeping previous data",
                self.generator_id.0, tag, ceg_index
            );
            self.ids.insert(tag.to_string(), ceg_index as u32);
            self.data.push(tmp_ceg);
            self.data[ceg_index] = old_ceg;
            return;
        }

        // move the fresh data into the tag's original slot and put the
        // relocated last entry back where it was
        self.ids.insert(tag.to_string(), ceg_index as u32);
        if num_cegs > 1 {
            self.data.swap(ceg_index, num_cegs - 1);
        }
    }

    fn unload(&mut self, handler: &mut ExplosionGeneratorHandler) {
        for id in std::mem::take(&mut self.spawn_gens) {
            handler.unload_generator(id);
        }
    }

    fn explosion(
        &self,
        id: ExplosionId,
        params: &ExplosionParams,
        env: &mut ExplosionEnv<'_>,
    ) -> bool {
        // not a custom id: defer to the default treatment
        if id == ExplosionId::STANDARD {
            return stdgen::default_explosion(params, env);
        }
        if id == ExplosionId::INVALID {
            return false;
        }

        // spawner references always mean the newest compiled explosion
        let index = if id == ExplosionId::SPAWNER {
            match self.data.len() {
                0 => return false,
                n => n - 1,
            }
        } else {
            id.0 as usize
        };

        let ceg = match self.data.get(index) {
            Some(c) => c,
            None => return false,
        };

        let height = env.ground.height_at(params.pos.x, params.pos.z);
        let altitude = params.pos.y - height;
        let mut flags = flags_from_height(params.pos.y, altitude);
        flags |= if params.hit_unit { SPW_UNIT } else { SPW_NO_UNIT };

        for psi in &ceg.spawns {
            if psi.flags & flags == 0 {
                continue;
            }
            // no new projectiles when the particle system is saturated
            if env.sink.particle_saturation() > 1.0 {
                continue;
            }

            for spawn_index in 0..psi.count {
                let mut instance = match env.types.create_instance(psi.target) {
                    Some(i) => i,
                    None => break,
                };
                match vm::execute(
                    &psi.program,
                    &mut instance,
                    &ceg.handles,
                    params.damage,
                    spawn_index,
                    params.dir,
                    &mut env.rng,
                ) {
                    Ok(()) => env.sink.spawn_projectile(instance, params.pos, params.owner),
                    Err(e) => {
                        warn!("program for \"{}\" failed: {:?}", psi.class_name, e);
                        break;
                    }
                }
            }
        }

        let flash = &ceg.ground_flash;
        if flags & SPW_GROUND != 0 && flash.ttl > 0 && flash.flash_size > 1.0 {
            env.sink.spawn_ground_flash(params.pos, flash);
        }

        if ceg.use_default_explosions {
            return stdgen::default_explosion(params, env);
        }

        true
    }
}
