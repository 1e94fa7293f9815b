//! Human-readable rendering of compiled programs, used by the CLI's
//! `disassemble` command and handy in tests.

use byteorder::{LittleEndian, ReadBytesExt};

use crate::opcode::{OpCode, OperandKind};

/// Render a program's byte stream, one line per instruction. Decoding stops
/// at `End`, at an unknown opcode, or at a truncated operand; the trouble is
/// reported in the final line rather than returned as an error, since this
/// is a diagnostic surface.
pub fn disassemble(code: &[u8]) -> Vec<String> {
    let mut out = Vec::new();
    let mut cur: &[u8] = code;

    loop {
        let at = code.len() - cur.len();
        let byte = match cur.read_u8() {
            Ok(b) => b,
            Err(_) => break,
        };
        let op = match OpCode::from_u8(byte) {
            Some(op) => op,
            None => {
                out.push(format!("{:04} ??? (0x{:02x})", at, byte));
                break;
            }
        };

        match op.operand_kind() {
            OperandKind::None => out.push(format!("{:04} {}", at, op.name())),
            OperandKind::Offset => match cur.read_u16::<LittleEndian>() {
                Ok(ofs) => out.push(format!("{:04} {:<12} @{}", at, op.name(), ofs)),
                Err(_) => {
                    out.push(format!("{:04} {:<12} <truncated>", at, op.name()));
                    break;
                }
            },
            OperandKind::Float => match cur.read_f32::<LittleEndian>() {
                Ok(k) => out.push(format!("{:04} {:<12} {}", at, op.name(), k)),
                Err(_) => {
                    out.push(format!("{:04} {:<12} <truncated>", at, op.name()));
                    break;
                }
            },
            OperandKind::Slot => match cur.read_i32::<LittleEndian>() {
                Ok(i) => out.push(format!("{:04} {:<12} slot[{}]", at, op.name(), i)),
                Err(_) => {
                    out.push(format!("{:04} {:<12} <truncated>", at, op.name()));
                    break;
                }
            },
            OperandKind::Handle => match cur.read_u16::<LittleEndian>() {
                Ok(i) => out.push(format!("{:04} {:<12} handle[{}]", at, op.name(), i)),
                Err(_) => {
                    out.push(format!("{:04} {:<12} <truncated>", at, op.name()));
                    break;
                }
            },
        }

        if op == OpCode::End {
            break;
        }
    }

    out
}
