//! File-backed and in-memory collaborators for running the generator
//! pipeline outside the engine.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::rc::Rc;

use config::{from_toml_str, ConfigError, Table};
use explgen::{AssetStore, ConfigSource, DefaultExplosion, GroundFlashInfo, GroundSource, ProjectileSink};
use reflect::{Float3, Instance};

/// Config source reading TOML files, re-read on every (re)parse.
pub struct FileConfig {
    pub explosions: PathBuf,
    pub aliases: Option<PathBuf>,
}

impl FileConfig {
    pub fn new(explosions: &str, aliases: Option<&str>) -> Self {
        FileConfig {
            explosions: PathBuf::from(explosions),
            aliases: aliases.map(PathBuf::from),
        }
    }

    fn read(path: &PathBuf) -> Result<Table, ConfigError> {
        let text = fs::read_to_string(path)
            .map_err(|e| ConfigError::Parse(format!("{}: {}", path.display(), e)))?;
        from_toml_str(&text)
    }
}

impl ConfigSource for FileConfig {
    fn load_explosions(&mut self) -> Result<Table, ConfigError> {
        Self::read(&self.explosions)
    }

    fn load_aliases(&mut self) -> Result<Table, ConfigError> {
        match &self.aliases {
            Some(path) => Self::read(path),
            None => Ok(Table::new()),
        }
    }
}

/// Deterministic stand-in for the renderer's asset stores: every distinct
/// name gets a sequential handle, and the names are remembered so the
/// disassembler and `fire` can annotate handles.
#[derive(Default)]
pub struct RecordingAssets {
    names: Vec<String>,
    by_name: HashMap<String, u32>,
}

impl RecordingAssets {
    fn intern(&mut self, family: &str, name: &str) -> Option<u32> {
        let key = format!("{}:{}", family, name);
        if let Some(&id) = self.by_name.get(&key) {
            return Some(id);
        }
        self.names.push(key.clone());
        let id = self.names.len() as u32;
        self.by_name.insert(key, id);
        Some(id)
    }

    /// The `family:name` a handle was interned under.
    pub fn name_of(&self, handle: u32) -> Option<&str> {
        self.names.get(handle.checked_sub(1)? as usize).map(String::as_str)
    }
}

/// Shareable wrapper so the CLI can keep reading names after the handler
/// has taken ownership of the store.
#[derive(Clone, Default)]
pub struct SharedAssets(pub Rc<RefCell<RecordingAssets>>);

impl AssetStore for SharedAssets {
    fn resolve_texture(&mut self, name: &str) -> Option<u32> {
        self.0.borrow_mut().intern("texture", name)
    }

    fn resolve_ground_fx_texture(&mut self, name: &str) -> Option<u32> {
        self.0.borrow_mut().intern("groundfx", name)
    }

    fn resolve_color_map(&mut self, def: &str) -> Option<u32> {
        self.0.borrow_mut().intern("colormap", def)
    }
}

/// Perfectly flat terrain.
pub struct FlatGround(pub f32);

impl GroundSource for FlatGround {
    fn height_at(&self, _x: f32, _z: f32) -> f32 {
        self.0
    }
}

/// Collects everything an explosion produces, for printing.
#[derive(Default)]
pub struct CollectSink {
    pub spawned: Vec<Instance>,
    pub flashes: Vec<GroundFlashInfo>,
    pub defaults: Vec<DefaultExplosion>,
}

impl ProjectileSink for CollectSink {
    fn spawn_projectile(&mut self, instance: Instance, _pos: Float3, _owner: Option<u32>) {
        self.spawned.push(instance);
    }

    fn spawn_ground_flash(&mut self, _pos: Float3, flash: &GroundFlashInfo) {
        self.flashes.push(flash.clone());
    }

    fn spawn_default_explosion(&mut self, explosion: &DefaultExplosion) {
        self.defaults.push(*explosion);
    }
}
