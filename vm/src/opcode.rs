//! OpCode definitions for compiled effect programs.
//!
//! Instructions are variable-length: a one-byte opcode followed by zero or
//! one operand. Operand widths (little-endian):
//!
//! - store/copy opcodes: u16 absolute field offset into the instance
//! - accumulator arithmetic: f32 literal
//! - scratch-slot opcodes: i32 slot index, clamped to [0, 15] at compile time
//! - `LoadPtr`: u16 index into the owning generator's asset side-table
//!
//! A program is the plain concatenation of instructions ending in `End`.

use std::fmt;

/// Effect-program instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OpCode {
    /// Stop execution.
    End = 0,
    /// `instance[ofs] = val as i32; val = 0` (also used for bool fields)
    StoreInt = 1,
    /// `instance[ofs] = val; val = 0`
    StoreFloat = 2,
    /// `instance[ofs] = val as u8; val = 0` (truncate, then wrap)
    StoreByte = 3,
    /// `instance[ofs] = raw(ptr); ptr = none`
    StorePtr = 4,
    /// `val += k`
    AddConst = 5,
    /// `val += rand01() * k`, one fresh uniform sample per execution
    AddRandom = 6,
    /// `val += damage * k`
    AddDamage = 7,
    /// `val += spawn_index * k`
    AddIndex = 8,
    /// `ptr = handles[idx]`
    LoadPtr = 9,
    /// Copy the 3-float direction vector to `instance[ofs]`.
    CopyDir = 10,
    /// Float modulo: `val -= k * floor(val / k)`
    Sawtooth = 11,
    /// `val = k * floor(val / k)`, 0 when `k` is 0
    Discretize = 12,
    /// `val = k * sin(val)`
    Sine = 13,
    /// `slot[i] = val; val = 0`
    Yank = 14,
    /// `val *= slot[i]`
    Multiply = 15,
    /// `val += slot[i]`
    AddSlot = 16,
    /// `val = val.powf(k)`
    PowConst = 17,
    /// `val = val.powf(slot[i])`
    PowSlot = 18,
}

/// Shape of the operand trailing an opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandKind {
    None,
    /// u16 field offset.
    Offset,
    /// f32 literal.
    Float,
    /// i32 scratch-slot index.
    Slot,
    /// u16 asset side-table index.
    Handle,
}

impl OpCode {
    /// Get opcode from byte value.
    pub fn from_u8(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(OpCode::End),
            1 => Some(OpCode::StoreInt),
            2 => Some(OpCode::StoreFloat),
            3 => Some(OpCode::StoreByte),
            4 => Some(OpCode::StorePtr),
            5 => Some(OpCode::AddConst),
            6 => Some(OpCode::AddRandom),
            7 => Some(OpCode::AddDamage),
            8 => Some(OpCode::AddIndex),
            9 => Some(OpCode::LoadPtr),
            10 => Some(OpCode::CopyDir),
            11 => Some(OpCode::Sawtooth),
            12 => Some(OpCode::Discretize),
            13 => Some(OpCode::Sine),
            14 => Some(OpCode::Yank),
            15 => Some(OpCode::Multiply),
            16 => Some(OpCode::AddSlot),
            17 => Some(OpCode::PowConst),
            18 => Some(OpCode::PowSlot),
            _ => None,
        }
    }

    /// Convert opcode to byte value.
    #[inline]
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn operand_kind(self) -> OperandKind {
        match self {
            OpCode::End => OperandKind::None,
            OpCode::StoreInt | OpCode::StoreFloat | OpCode::StoreByte | OpCode::StorePtr
            | OpCode::CopyDir => OperandKind::Offset,
            OpCode::AddConst | OpCode::AddRandom | OpCode::AddDamage | OpCode::AddIndex
            | OpCode::Sawtooth | OpCode::Discretize | OpCode::Sine | OpCode::PowConst => {
                OperandKind::Float
            }
            OpCode::Yank | OpCode::Multiply | OpCode::AddSlot | OpCode::PowSlot => OperandKind::Slot,
            OpCode::LoadPtr => OperandKind::Handle,
        }
    }

    /// Get human-readable name.
    pub fn name(self) -> &'static str {
        match self {
            OpCode::End => "END",
            OpCode::StoreInt => "STORE_INT",
            OpCode::StoreFloat => "STORE_FLOAT",
            OpCode::StoreByte => "STORE_BYTE",
            OpCode::StorePtr => "STORE_PTR",
            OpCode::AddConst => "ADD",
            OpCode::AddRandom => "RAND",
            OpCode::AddDamage => "DAMAGE",
            OpCode::AddIndex => "INDEX",
            OpCode::LoadPtr => "LOAD_PTR",
            OpCode::CopyDir => "COPY_DIR",
            OpCode::Sawtooth => "SAWTOOTH",
            OpCode::Discretize => "DISCRETIZE",
            OpCode::Sine => "SINE",
            OpCode::Yank => "YANK",
            OpCode::Multiply => "MULTIPLY",
            OpCode::AddSlot => "ADD_SLOT",
            OpCode::PowConst => "POW",
            OpCode::PowSlot => "POW_SLOT",
        }
    }
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opcode_conversion() {
        assert_eq!(OpCode::AddConst.as_u8(), 5);
        assert_eq!(OpCode::from_u8(5), Some(OpCode::AddConst));
        assert_eq!(OpCode::from_u8(18), Some(OpCode::PowSlot));
        assert_eq!(OpCode::from_u8(19), None);
        assert_eq!(OpCode::from_u8(255), None);
    }

    #[test]
    fn test_every_opcode_roundtrips() {
        for byte in 0u8..=18 {
            let op = OpCode::from_u8(byte).expect("gap in opcode numbering");
            assert_eq!(op.as_u8(), byte);
        }
    }
}
