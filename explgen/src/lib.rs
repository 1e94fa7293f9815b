//! Explosion generator registry and execution.
//!
//! A *generator* owns a cache of compiled program-sets, one per named tag.
//! The standard generator handles the non-scripted default explosion; the
//! custom generator compiles per-tag configuration into byte programs and
//! runs them once per spawned effect instance. Both are plain values owned
//! by the composing application — there are no module-level globals — and
//! the [`ExplosionGeneratorHandler`] carries the shared state: parsed
//! tables, alias lists, asset resolution, and dynamically loaded generator
//! instances.

pub mod custom;
pub mod data;
pub mod flags;
pub mod handler;
pub mod sink;
pub mod stdgen;

pub use custom::CustomExplosionGenerator;
pub use data::{CegData, GroundFlashInfo, ProjectileSpawnInfo};
pub use handler::{AssetStore, ConfigSource, ExplosionGeneratorHandler};
pub use sink::{DefaultExplosion, ExplosionEnv, ExplosionParams, GroundSource, ProjectileSink};
pub use stdgen::StdExplosionGenerator;

use reflect::TypeRegistry;

/// Identifier of a compiled explosion within one generator's cache.
///
/// Compiled ids are dense indices; the top of the range is reserved.
/// Callers must treat ids as opaque: a reload may relocate storage
/// internally, but a tag that once resolved keeps resolving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExplosionId(pub u32);

impl ExplosionId {
    /// No such explosion; firing it is a no-op that reports failure.
    pub const INVALID: ExplosionId = ExplosionId(u32::MAX);
    /// Route to the standard (non-scripted) generator.
    pub const STANDARD: ExplosionId = ExplosionId(u32::MAX - 1);
    /// Re-resolve to the most recently compiled explosion.
    pub const SPAWNER: ExplosionId = ExplosionId(u32::MAX - 2);

    #[inline]
    pub fn is_valid(self) -> bool {
        self != ExplosionId::INVALID
    }
}

/// Identifier of a dynamically loaded generator instance, handed out by the
/// handler. The application-owned global generators keep the default id 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct GeneratorId(pub u32);

/// Tag prefix selecting the custom generator.
pub const CEG_PREFIX: &str = "custom:";

pub trait ExplosionGenerator {
    fn generator_id(&self) -> GeneratorId;

    fn set_generator_id(&mut self, id: GeneratorId);

    /// Compile (or fetch from cache) the explosion for `tag`.
    fn load(
        &mut self,
        handler: &mut ExplosionGeneratorHandler,
        types: &TypeRegistry,
        tag: &str,
    ) -> ExplosionId;

    /// Recompile `tag`, or everything when `tag` is empty.
    fn reload(
        &mut self,
        _handler: &mut ExplosionGeneratorHandler,
        _types: &TypeRegistry,
        _tag: &str,
    ) {
    }

    /// Release whatever this generator caused to be loaded elsewhere.
    fn unload(&mut self, _handler: &mut ExplosionGeneratorHandler) {}

    /// Fire the explosion. Returns false for ids that do not resolve;
    /// that is the expected recoverable path, not an error.
    fn explosion(
        &self,
        id: ExplosionId,
        params: &ExplosionParams,
        env: &mut ExplosionEnv<'_>,
    ) -> bool;
}

/// Resolve a tag the way non-specialized call sites do: without the
/// `custom:` prefix a non-script caller gets the standard generator, a
/// script caller always gets the custom one.
pub fn load_global(
    std_gen: &mut StdExplosionGenerator,
    custom: &mut CustomExplosionGenerator,
    handler: &mut ExplosionGeneratorHandler,
    types: &TypeRegistry,
    tag: &str,
    script_call: bool,
) -> ExplosionId {
    if tag.is_empty() {
        return ExplosionId::INVALID;
    }

    match tag.strip_prefix(CEG_PREFIX) {
        Some(postfix) => custom.load(handler, types, postfix),
        None if script_call => custom.load(handler, types, tag),
        None => std_gen.load(handler, types, tag),
    }
}
