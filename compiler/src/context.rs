use vm::AssetRef;

/// Compile-time resolution seam. Asset names and nested-generator tags are
/// resolved once, while compiling; the interpreter only ever sees the
/// resulting [`AssetRef`] through the side-table.
///
/// Every method returns `None` for an unresolvable name; the compiler logs
/// and emits nothing for that field.
pub trait ResolveContext {
    /// Entry in the projectile texture atlas.
    fn resolve_texture(&mut self, name: &str) -> Option<AssetRef>;

    /// Entry in the ground-effects texture atlas.
    fn resolve_ground_fx_texture(&mut self, name: &str) -> Option<AssetRef>;

    /// Color ramp built from its definition string.
    fn resolve_color_map(&mut self, def: &str) -> Option<AssetRef>;

    /// Load (compile-on-demand) another generator by tag. The implementation
    /// records ownership so the generator can be torn down when the
    /// program-set that referenced it is unloaded.
    fn load_spawn_generator(&mut self, tag: &str) -> Option<AssetRef>;
}
