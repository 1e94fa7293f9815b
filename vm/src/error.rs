use reflect::{AccessError, TypeId};

#[derive(Debug, PartialEq)]
pub enum ExecError {
    /// The program ran past its last byte without hitting `End`.
    Truncated,
    InvalidOpcode(u8),
    /// The instance was allocated for a different type than the program was
    /// compiled against.
    TargetMismatch { expected: TypeId, found: TypeId },
    /// `LoadPtr` index outside the asset side-table.
    BadHandleIndex(u16),
    /// Slot index outside the 16-slot scratch buffer.
    BadSlotIndex(i32),
    /// A store landed outside the instance buffer.
    OutOfBounds {
        offset: usize,
        size: usize,
        len: usize,
    },
}

impl From<std::io::Error> for ExecError {
    fn from(_: std::io::Error) -> Self {
        ExecError::Truncated
    }
}

impl From<AccessError> for ExecError {
    fn from(e: AccessError) -> Self {
        match e {
            AccessError::OutOfBounds { offset, size, len } => {
                ExecError::OutOfBounds { offset, size, len }
            }
        }
    }
}
