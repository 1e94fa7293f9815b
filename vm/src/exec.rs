//! The effect-program interpreter.
//!
//! A straight fetch-decode-execute loop over one f32 accumulator, one
//! pointer register, and a 16-slot scratch buffer, all local to the call.
//! Programs are read-only, so concurrent executions of the same program are
//! fine; every write into the instance is bounds-checked.

use byteorder::{LittleEndian, ReadBytesExt};
use rand::{Rng, RngCore};
use reflect::{Float3, Instance};

use crate::error::ExecError;
use crate::opcode::OpCode;
use crate::program::{AssetRef, Program};

/// Scratch-buffer size. Slot operands are clamped to this at compile time
/// and validated again here, since the bytecode could be corrupt.
pub const SCRATCH_SLOTS: usize = 16;

/// Run `program` once against a freshly created `instance`.
///
/// `damage` and `spawn_index` are the per-invocation scale inputs, `dir` the
/// direction vector `CopyDir` writes verbatim. `handles` is the asset
/// side-table of the generator that owns the program.
pub fn execute<R: RngCore>(
    program: &Program,
    instance: &mut Instance,
    handles: &[AssetRef],
    damage: f32,
    spawn_index: i32,
    dir: Float3,
    rng: &mut R,
) -> Result<(), ExecError> {
    if program.target() != instance.type_id() {
        return Err(ExecError::TargetMismatch {
            expected: program.target(),
            found: instance.type_id(),
        });
    }

    let mut code: &[u8] = program.code();
    let mut val: f32 = 0.0;
    let mut ptr: Option<AssetRef> = None;
    let mut slots = [0.0f32; SCRATCH_SLOTS];

    loop {
        let byte = code.read_u8()?;
        let op = OpCode::from_u8(byte).ok_or(ExecError::InvalidOpcode(byte))?;

        match op {
            OpCode::End => return Ok(()),

            OpCode::StoreInt => {
                let ofs = code.read_u16::<LittleEndian>()? as usize;
                instance.write_i32(ofs, val as i32)?;
                val = 0.0;
            }
            OpCode::StoreFloat => {
                let ofs = code.read_u16::<LittleEndian>()? as usize;
                instance.write_f32(ofs, val)?;
                val = 0.0;
            }
            OpCode::StoreByte => {
                let ofs = code.read_u16::<LittleEndian>()? as usize;
                instance.write_u8(ofs, (val as i32) as u8)?;
                val = 0.0;
            }
            OpCode::StorePtr => {
                let ofs = code.read_u16::<LittleEndian>()? as usize;
                instance.write_u32(ofs, ptr.map(AssetRef::raw).unwrap_or(0))?;
                ptr = None;
            }

            OpCode::AddConst => {
                val += code.read_f32::<LittleEndian>()?;
            }
            OpCode::AddRandom => {
                let k = code.read_f32::<LittleEndian>()?;
                val += rng.gen::<f32>() * k;
            }
            OpCode::AddDamage => {
                val += damage * code.read_f32::<LittleEndian>()?;
            }
            OpCode::AddIndex => {
                val += spawn_index as f32 * code.read_f32::<LittleEndian>()?;
            }

            OpCode::LoadPtr => {
                let idx = code.read_u16::<LittleEndian>()?;
                ptr = Some(
                    *handles
                        .get(idx as usize)
                        .ok_or(ExecError::BadHandleIndex(idx))?,
                );
            }
            OpCode::CopyDir => {
                let ofs = code.read_u16::<LittleEndian>()? as usize;
                instance.write_float3(ofs, dir)?;
            }

            OpCode::Sawtooth => {
                // float-domain modulo; floor keeps the result in [0, k)
                // for positive k even when val is negative
                let k = code.read_f32::<LittleEndian>()?;
                val -= k * (val / k).floor();
            }
            OpCode::Discretize => {
                let k = code.read_f32::<LittleEndian>()?;
                val = if k == 0.0 { 0.0 } else { k * (val / k).floor() };
            }
            OpCode::Sine => {
                val = code.read_f32::<LittleEndian>()? * val.sin();
            }
            OpCode::PowConst => {
                val = val.powf(code.read_f32::<LittleEndian>()?);
            }

            OpCode::Yank => {
                slots[slot_index(&mut code)?] = val;
                val = 0.0;
            }
            OpCode::Multiply => {
                val *= slots[slot_index(&mut code)?];
            }
            OpCode::AddSlot => {
                val += slots[slot_index(&mut code)?];
            }
            OpCode::PowSlot => {
                val = val.powf(slots[slot_index(&mut code)?]);
            }
        }
    }
}

fn slot_index(code: &mut &[u8]) -> Result<usize, ExecError> {
    let i = code.read_i32::<LittleEndian>()?;
    if !(0..SCRATCH_SLOTS as i32).contains(&i) {
        return Err(ExecError::BadSlotIndex(i));
    }
    Ok(i as usize)
}
