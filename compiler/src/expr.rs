//! The expression compiler.
//!
//! One compiler instance emits the byte program for one spawn entry: fields
//! are compiled in turn into a shared code buffer, and `finish` seals it
//! with `End`. Script errors never abort compilation — unrecognized tokens
//! are logged and skipped, so a partially wrong script still produces a
//! valid (just shorter) program.

use byteorder::{ByteOrder, LittleEndian};
use log::warn;
use reflect::{AssetKind, FieldKind, TypeId, TypeRegistry};
use vm::{AssetRef, OpCode, Program};

use crate::context::ResolveContext;

/// Scratch slots available to the yank/multiply/add/pow-by-slot operators.
const MAX_SLOT: i64 = 15;

pub struct ProgramCompiler<'a> {
    types: &'a TypeRegistry,
    ctx: &'a mut dyn ResolveContext,
    /// Side-table shared by every program of the owning generator.
    handles: &'a mut Vec<AssetRef>,
    code: Vec<u8>,
}

impl<'a> ProgramCompiler<'a> {
    pub fn new(
        types: &'a TypeRegistry,
        ctx: &'a mut dyn ResolveContext,
        handles: &'a mut Vec<AssetRef>,
    ) -> Self {
        ProgramCompiler {
            types,
            ctx,
            handles,
            code: Vec::new(),
        }
    }

    /// Append the instructions for one field. `offset` is the field's
    /// absolute byte offset within the target instance.
    pub fn compile_field(&mut self, kind: &FieldKind, offset: u16, fragment: &str) {
        let head = fragment.split(';').next().unwrap_or("");

        // keyword escape hatch for vector fields, regardless of kind
        if head == "dir" {
            self.emit_op(OpCode::CopyDir);
            self.emit_u16(offset);
            return;
        }

        match kind {
            FieldKind::Int32 | FieldKind::Float32 | FieldKind::Bool | FieldKind::UInt8 => {
                self.compile_ops(fragment);
                let store = match kind {
                    FieldKind::Float32 => OpCode::StoreFloat,
                    FieldKind::UInt8 => OpCode::StoreByte,
                    // bool fields take the integer store
                    _ => OpCode::StoreInt,
                };
                self.emit_op(store);
                self.emit_u16(offset);
            }

            FieldKind::Object(tid) => {
                let fields = self.types.layout_fields(*tid);
                let mut pieces = fragment.split(',');
                for field in fields {
                    match pieces.next() {
                        Some(piece) => {
                            self.compile_field(&field.kind, offset + field.offset, piece)
                        }
                        None => break, // remaining members stay zeroed
                    }
                }
            }

            FieldKind::Array { elem, count } => {
                let stride = self.types.kind_size(elem) as u16;
                let mut pieces = fragment.split(',');
                for i in 0..*count {
                    match pieces.next() {
                        Some(piece) => {
                            self.compile_field(elem, offset + i as u16 * stride, piece)
                        }
                        None => break,
                    }
                }
            }

            FieldKind::Asset(asset) => self.compile_asset(*asset, offset, head),
        }
    }

    /// Seal the program with `End` and bind it to its target type.
    pub fn finish(mut self, target: TypeId) -> Program {
        self.emit_op(OpCode::End);
        Program::new(target, self.code)
    }

    /// Tokenize a numeric fragment: single-letter operator prefixes, each
    /// followed by a literal; a bare literal means add-constant.
    fn compile_ops(&mut self, fragment: &str) {
        let bytes = fragment.as_bytes();
        let mut p = 0;

        while p < bytes.len() {
            let c = bytes[p] as char;
            p += 1;

            if c.is_ascii_whitespace() {
                continue;
            }

            let mut literal_at = p;
            let (op, slot_operand) = match c {
                'i' => (OpCode::AddIndex, false),
                'r' => (OpCode::AddRandom, false),
                'd' => (OpCode::AddDamage, false),
                'm' => (OpCode::Sawtooth, false),
                'k' => (OpCode::Discretize, false),
                's' => (OpCode::Sine, false),
                'p' => (OpCode::PowConst, false),
                'y' => (OpCode::Yank, true),
                'x' => (OpCode::Multiply, true),
                'a' => (OpCode::AddSlot, true),
                'q' => (OpCode::PowSlot, true),
                _ if c.is_ascii_digit() || c == '.' || c == '-' => {
                    literal_at = p - 1;
                    (OpCode::AddConst, false)
                }
                _ => {
                    warn!(
                        "unknown op-code '{}' in \"{}\" at index {}",
                        c, fragment, p
                    );
                    continue;
                }
            };

            // a trailing operator with no operand emits nothing
            if literal_at >= bytes.len() {
                continue;
            }

            if slot_operand {
                match scan_int(&bytes[literal_at..]) {
                    Some((v, used)) => {
                        p = literal_at + used;
                        self.emit_op(op);
                        self.emit_i32(v.clamp(0, MAX_SLOT) as i32);
                    }
                    None => {
                        // the prefix is consumed, the operand position is
                        // rescanned as a fresh token; no emit
                        warn!(
                            "missing slot index after '{}' in \"{}\" at index {}",
                            c, fragment, p
                        );
                    }
                }
            } else {
                match scan_float(&bytes[literal_at..]) {
                    Some((v, used)) => {
                        p = literal_at + used;
                        self.emit_op(op);
                        self.emit_f32(v);
                    }
                    None => {
                        warn!(
                            "missing operand after '{}' in \"{}\" at index {}",
                            c, fragment, p
                        );
                    }
                }
            }
        }
    }

    fn compile_asset(&mut self, asset: AssetKind, offset: u16, name: &str) {
        let resolved = match asset {
            AssetKind::Texture => self.ctx.resolve_texture(name),
            AssetKind::GroundFxTexture => self.ctx.resolve_ground_fx_texture(name),
            AssetKind::ColorMap => self.ctx.resolve_color_map(name),
            AssetKind::Generator => self.ctx.load_spawn_generator(name),
        };

        let handle = match resolved {
            Some(h) => h,
            None => {
                warn!("could not resolve {:?} \"{}\"", asset, name);
                return;
            }
        };

        if self.handles.len() > u16::MAX as usize {
            warn!("asset side-table overflow, dropping \"{}\"", name);
            return;
        }

        let idx = self.handles.len() as u16;
        self.handles.push(handle);
        self.emit_op(OpCode::LoadPtr);
        self.emit_u16(idx);
        self.emit_op(OpCode::StorePtr);
        self.emit_u16(offset);
    }

    fn emit_op(&mut self, op: OpCode) {
        self.code.push(op.as_u8());
    }

    fn emit_u16(&mut self, v: u16) {
        let mut b = [0u8; 2];
        LittleEndian::write_u16(&mut b, v);
        self.code.extend_from_slice(&b);
    }

    fn emit_f32(&mut self, v: f32) {
        let mut b = [0u8; 4];
        LittleEndian::write_f32(&mut b, v);
        self.code.extend_from_slice(&b);
    }

    fn emit_i32(&mut self, v: i32) {
        let mut b = [0u8; 4];
        LittleEndian::write_i32(&mut b, v);
        self.code.extend_from_slice(&b);
    }
}

/// Scan a float literal prefix: `[+-]? digits [. digits] [eE [+-] digits]`.
/// Returns the value and the number of bytes consumed, or `None` when no
/// digit is present.
fn scan_float(b: &[u8]) -> Option<(f32, usize)> {
    let mut i = 0;
    if i < b.len() && (b[i] == b'+' || b[i] == b'-') {
        i += 1;
    }
    let mantissa = i;
    while i < b.len() && b[i].is_ascii_digit() {
        i += 1;
    }
    if i < b.len() && b[i] == b'.' {
        i += 1;
        while i < b.len() && b[i].is_ascii_digit() {
            i += 1;
        }
    }
    if !b[mantissa..i].iter().any(|c| c.is_ascii_digit()) {
        return None;
    }
    if i < b.len() && (b[i] == b'e' || b[i] == b'E') {
        let mut j = i + 1;
        if j < b.len() && (b[j] == b'+' || b[j] == b'-') {
            j += 1;
        }
        let exp = j;
        while j < b.len() && b[j].is_ascii_digit() {
            j += 1;
        }
        if j > exp {
            i = j;
        }
    }
    let text = std::str::from_utf8(&b[..i]).ok()?;
    text.parse::<f32>().ok().map(|v| (v, i))
}

/// Scan a decimal integer prefix. Returns value and bytes consumed.
fn scan_int(b: &[u8]) -> Option<(i64, usize)> {
    let mut i = 0;
    if i < b.len() && (b[i] == b'+' || b[i] == b'-') {
        i += 1;
    }
    let digits = i;
    while i < b.len() && b[i].is_ascii_digit() {
        i += 1;
    }
    if i == digits {
        return None;
    }
    let text = std::str::from_utf8(&b[..i]).ok()?;
    text.parse::<i64>().ok().map(|v| (v, i))
}
