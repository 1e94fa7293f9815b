//! Spawn-condition flags.

use config::Table;

pub const SPW_GROUND: u32 = 1 << 0;
pub const SPW_WATER: u32 = 1 << 1;
pub const SPW_AIR: u32 = 1 << 2;
pub const SPW_UNDERWATER: u32 = 1 << 3;
pub const SPW_UNIT: u32 = 1 << 4;
pub const SPW_NO_UNIT: u32 = 1 << 5;

/// Read a spawn entry's condition flags from its boolean keys.
pub fn flags_from_table(table: &Table) -> u32 {
    let mut flags = 0;

    if table.get_bool("ground", false) {
        flags |= SPW_GROUND;
    }
    if table.get_bool("water", false) {
        flags |= SPW_WATER;
    }
    if table.get_bool("air", false) {
        flags |= SPW_AIR;
    }
    if table.get_bool("underwater", false) {
        flags |= SPW_UNDERWATER;
    }
    if table.get_bool("unit", false) {
        flags |= SPW_UNIT;
    }
    if table.get_bool("nounit", false) {
        flags |= SPW_NO_UNIT;
    }

    flags
}

/// Classify an explosion by world height and altitude above ground.
///
/// The thresholds are adjacent and the checks are ordered air > ground >
/// water > underwater; callers are written as if the ranges could overlap,
/// so neither the numbers nor the order may change.
pub fn flags_from_height(height: f32, altitude: f32) -> u32 {
    if height > 0.0 && altitude >= 20.0 {
        SPW_AIR
    } else if height > 0.0 && altitude >= -1.0 {
        SPW_GROUND
    } else if height > -5.0 && altitude >= -1.0 {
        SPW_WATER
    } else if height <= -5.0 && altitude >= -1.0 {
        SPW_UNDERWATER
    } else {
        0
    }
}
