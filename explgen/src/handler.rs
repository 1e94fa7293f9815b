//! The handler owns what every generator needs to compile: the parsed
//! explosion tables, the class alias lists, asset resolution, and the
//! dynamically loaded generator instances referenced from scripts.

use std::collections::HashMap;

use config::{ConfigError, Table};
use log::{error, warn};
use reflect::{AliasList, TypeRegistry};

use crate::custom::CustomExplosionGenerator;
use crate::stdgen::StdExplosionGenerator;
use crate::{ExplosionGenerator, GeneratorId, CEG_PREFIX};

/// Where the explosion and alias tables come from. Implementations re-read
/// their backing source on every call, so a reload picks up fresh content.
pub trait ConfigSource {
    fn load_explosions(&mut self) -> Result<Table, ConfigError>;
    fn load_aliases(&mut self) -> Result<Table, ConfigError>;
}

/// Resolution of asset names to opaque handles, done once at compile time.
/// The returned ids are whatever the renderer's stores hand out.
pub trait AssetStore {
    fn resolve_texture(&mut self, name: &str) -> Option<u32>;
    fn resolve_ground_fx_texture(&mut self, name: &str) -> Option<u32>;
    fn resolve_color_map(&mut self, def: &str) -> Option<u32>;
}

/// Generator references may chain (a spawned generator's config referencing
/// another generator); past this depth the chain is cut with an error.
const MAX_SPAWN_DEPTH: u32 = 8;

pub struct ExplosionGeneratorHandler {
    config: Box<dyn ConfigSource>,
    assets: Box<dyn AssetStore>,
    expl_root: Option<Table>,
    pub projectile_classes: AliasList,
    pub generator_classes: AliasList,
    num_loaded: u32,
    load_depth: u32,
    generators: HashMap<GeneratorId, Box<dyn ExplosionGenerator>>,
}

impl ExplosionGeneratorHandler {
    pub fn new(config: Box<dyn ConfigSource>, assets: Box<dyn AssetStore>) -> Self {
        let mut handler = ExplosionGeneratorHandler {
            config,
            assets,
            expl_root: None,
            projectile_classes: AliasList::new(),
            generator_classes: AliasList::new(),
            num_loaded: 0,
            load_depth: 0,
            generators: HashMap::new(),
        };
        handler.reparse_tables();
        handler
    }

    /// Root of the parsed explosion tables, if the last parse succeeded.
    pub fn explosion_root(&self) -> Option<&Table> {
        self.expl_root.as_ref()
    }

    pub(crate) fn assets_mut(&mut self) -> &mut dyn AssetStore {
        self.assets.as_mut()
    }

    /// Re-read the alias and explosion tables from the config source.
    /// Parse failures keep the previous aliases and drop the explosion
    /// root, so later loads resolve to the invalid id instead of stale data.
    pub fn reparse_tables(&mut self) {
        match self.config.load_aliases() {
            Ok(root) => {
                self.projectile_classes.clear();
                if let Some(t) = root.sub_table("projectiles") {
                    self.projectile_classes.load(t.string_entries());
                }
                self.generator_classes.clear();
                if let Some(t) = root.sub_table("generators") {
                    self.generator_classes.load(t.string_entries());
                }
            }
            Err(e) => error!("failed to parse explosion aliases: {}", e),
        }

        match self.config.load_explosions() {
            Ok(root) => self.expl_root = Some(root),
            Err(e) => {
                error!("failed to parse explosions: {}", e);
                self.expl_root = None;
            }
        }
    }

    /// Create and load a generator instance for a script reference.
    ///
    /// `custom:tag` loads the custom generator with `tag`; any other name
    /// goes through the generator alias list and must resolve to a known
    /// generator class (`std` or `custom`).
    pub fn load_generator(&mut self, types: &TypeRegistry, tag: &str) -> Option<GeneratorId> {
        if self.load_depth >= MAX_SPAWN_DEPTH {
            error!("generator reference chain too deep at \"{}\"", tag);
            return None;
        }

        let (class, postfix) = match tag.split_once(':') {
            Some((prefix, postfix)) => {
                debug_assert_eq!(format!("{}:", prefix), CEG_PREFIX);
                (self.generator_classes.resolve(prefix), postfix)
            }
            None => (self.generator_classes.resolve(tag), ""),
        };

        let mut generator: Box<dyn ExplosionGenerator> = match class.as_str() {
            "std" => Box::new(StdExplosionGenerator::new()),
            "custom" => Box::new(CustomExplosionGenerator::new()),
            other => {
                warn!("\"{}\" does not name an explosion generator class", other);
                return None;
            }
        };

        self.num_loaded += 1;
        let id = GeneratorId(self.num_loaded);
        generator.set_generator_id(id);

        if !postfix.is_empty() {
            self.load_depth += 1;
            generator.load(self, types, postfix);
            self.load_depth -= 1;
        }

        self.generators.insert(id, generator);
        Some(id)
    }

    /// Unload and drop a generator previously handed out by
    /// [`load_generator`](Self::load_generator).
    pub fn unload_generator(&mut self, id: GeneratorId) {
        match self.generators.remove(&id) {
            Some(mut generator) => generator.unload(self),
            None => warn!("unload of unknown generator id {}", id.0),
        }
    }

    pub fn generator(&self, id: GeneratorId) -> Option<&dyn ExplosionGenerator> {
        self.generators.get(&id).map(|g| g.as_ref())
    }

    pub fn loaded_generator_count(&self) -> usize {
        self.generators.len()
    }

    /// Re-parse the config tables, then reload every loaded generator plus
    /// the application's global pair. An empty `tag` reloads everything.
    pub fn reload_generators(
        &mut self,
        types: &TypeRegistry,
        std_gen: &mut StdExplosionGenerator,
        custom: &mut CustomExplosionGenerator,
        tag: &str,
    ) {
        self.reparse_tables();

        // one id at a time: a reloading generator may itself load or unload
        // others through the handler
        let ids: Vec<GeneratorId> = self.generators.keys().copied().collect();
        for id in ids {
            if let Some(mut generator) = self.generators.remove(&id) {
                generator.reload(self, types, tag);
                self.generators.insert(id, generator);
            }
        }

        std_gen.reload(self, types, tag);
        custom.reload(self, types, tag);
    }
}
