//! Collaborator interfaces for the execution path: the world query that
//! classifies the explosion, and the sink that takes ownership of spawned
//! instances for rendering/simulation.

use rand::RngCore;
use reflect::{Float3, Instance, TypeRegistry};

use crate::data::GroundFlashInfo;

/// Inputs of one explosion trigger.
#[derive(Debug, Clone, Copy)]
pub struct ExplosionParams {
    pub pos: Float3,
    pub dir: Float3,
    pub damage: f32,
    pub radius: f32,
    pub gfx_mod: f32,
    pub owner: Option<u32>,
    /// Whether a unit was hit, for the unit/nounit spawn conditions.
    pub hit_unit: bool,
}

/// What the standard generator hands to the sink: visually shaped damage
/// plus the classification it computed.
#[derive(Debug, Clone, Copy)]
pub struct DefaultExplosion {
    pub pos: Float3,
    pub dir: Float3,
    pub damage: f32,
    pub radius: f32,
    pub altitude: f32,
    pub flags: u32,
    pub owner: Option<u32>,
}

pub trait GroundSource {
    fn height_at(&self, x: f32, z: f32) -> f32;
}

/// Receives everything an explosion produces. Implementations own the
/// instances after the interpreter has filled them in and perform the
/// type-specific initialization (position, owner) themselves.
pub trait ProjectileSink {
    /// Above 1.0 the particle system is saturated and spawn entries are
    /// skipped entirely.
    fn particle_saturation(&self) -> f32 {
        0.0
    }

    fn spawn_projectile(&mut self, instance: Instance, pos: Float3, owner: Option<u32>);

    fn spawn_ground_flash(&mut self, pos: Float3, flash: &GroundFlashInfo);

    /// The non-scripted default explosion (the full particle treatment lives
    /// with the renderer, outside this crate).
    fn spawn_default_explosion(&mut self, explosion: &DefaultExplosion);
}

/// Bundled per-trigger context threaded through `explosion()`.
pub struct ExplosionEnv<'a> {
    pub types: &'a TypeRegistry,
    pub ground: &'a dyn GroundSource,
    pub sink: &'a mut dyn ProjectileSink,
    pub rng: &'a mut dyn RngCore,
}
