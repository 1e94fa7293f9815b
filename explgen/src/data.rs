use reflect::{Float3, TypeId};
use vm::{AssetRef, Program};

/// Ground-flash parameters, copied verbatim from config, never compiled.
/// A `ttl` of 0 means no flash.
#[derive(Debug, Clone, Default)]
pub struct GroundFlashInfo {
    pub flash_size: f32,
    pub flash_alpha: f32,
    pub circle_growth: f32,
    pub circle_alpha: f32,
    pub color: Float3,
    pub ttl: i32,
    pub flags: u32,
}

/// One spawn entry: which effect type to create, under which conditions,
/// how many times, and the program that fills in its fields.
#[derive(Debug, Clone)]
pub struct ProjectileSpawnInfo {
    pub class_name: String,
    pub target: TypeId,
    pub flags: u32,
    pub count: i32,
    pub program: Program,
}

/// Everything compiled for one generator tag. Replaced wholesale on reload.
#[derive(Debug, Clone, Default)]
pub struct CegData {
    pub spawns: Vec<ProjectileSpawnInfo>,
    /// Asset side-table the spawn programs index into.
    pub handles: Vec<AssetRef>,
    pub ground_flash: GroundFlashInfo,
    /// Also run the standard non-scripted explosion after the spawns.
    pub use_default_explosions: bool,
}
