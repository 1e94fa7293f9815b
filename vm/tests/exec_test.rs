use byteorder::{LittleEndian, WriteBytesExt};
use rand::rngs::mock::StepRng;
use rand::rngs::StdRng;
use rand::SeedableRng;
use reflect::{Float3, Instance, TypeId};
use vm::{execute, AssetRef, ExecError, OpCode, Program};

/// Tiny assembler for hand-built test programs.
struct Asm(Vec<u8>);

impl Asm {
    fn new() -> Self {
        Asm(Vec::new())
    }
    fn op(mut self, op: OpCode) -> Self {
        self.0.push(op.as_u8());
        self
    }
    fn f32(mut self, v: f32) -> Self {
        self.0.write_f32::<LittleEndian>(v).unwrap();
        self
    }
    fn u16(mut self, v: u16) -> Self {
        self.0.write_u16::<LittleEndian>(v).unwrap();
        self
    }
    fn i32(mut self, v: i32) -> Self {
        self.0.write_i32::<LittleEndian>(v).unwrap();
        self
    }
    fn end(self) -> Vec<u8> {
        let mut code = self.0;
        code.push(OpCode::End.as_u8());
        code
    }
}

const TID: TypeId = TypeId(7);

fn run(code: Vec<u8>, size: usize) -> Instance {
    let mut inst = Instance::new(TID, size);
    let program = Program::new(TID, code);
    let mut rng = StepRng::new(0, 0);
    execute(&program, &mut inst, &[], 0.0, 0, Float3::ZERO, &mut rng).expect("exec failed");
    inst
}

#[test]
fn test_store_float_resets_accumulator() {
    let code = Asm::new()
        .op(OpCode::AddConst)
        .f32(5.0)
        .op(OpCode::StoreFloat)
        .u16(0)
        .op(OpCode::StoreFloat)
        .u16(4)
        .end();
    let inst = run(code, 8);
    assert_eq!(inst.read_f32(0).unwrap(), 5.0);
    assert_eq!(inst.read_f32(4).unwrap(), 0.0, "val must reset after a store");
}

#[test]
fn test_int_and_byte_stores_truncate_toward_zero() {
    let code = Asm::new()
        .op(OpCode::AddConst)
        .f32(7.9)
        .op(OpCode::StoreInt)
        .u16(0)
        .op(OpCode::AddConst)
        .f32(-3.7)
        .op(OpCode::StoreInt)
        .u16(4)
        .op(OpCode::AddConst)
        .f32(300.0)
        .op(OpCode::StoreByte)
        .u16(8)
        .end();
    let inst = run(code, 12);
    assert_eq!(inst.read_i32(0).unwrap(), 7);
    assert_eq!(inst.read_i32(4).unwrap(), -3);
    assert_eq!(inst.read_u8(8).unwrap(), 44); // 300 wraps as a byte
}

#[test]
fn test_damage_and_index_scaling() {
    let code = Asm::new()
        .op(OpCode::AddDamage)
        .f32(0.5)
        .op(OpCode::StoreFloat)
        .u16(0)
        .op(OpCode::AddIndex)
        .f32(2.0)
        .op(OpCode::StoreFloat)
        .u16(4)
        .end();
    let mut inst = Instance::new(TID, 8);
    let program = Program::new(TID, code);
    let mut rng = StepRng::new(0, 0);
    execute(&program, &mut inst, &[], 10.0, 3, Float3::ZERO, &mut rng).unwrap();
    assert_eq!(inst.read_f32(0).unwrap(), 5.0);
    assert_eq!(inst.read_f32(4).unwrap(), 6.0);
}

#[test]
fn test_sawtooth_is_floor_based_modulo() {
    // 13 mod 10 -> 3
    let code = Asm::new()
        .op(OpCode::AddConst)
        .f32(13.0)
        .op(OpCode::Sawtooth)
        .f32(10.0)
        .op(OpCode::StoreFloat)
        .u16(0)
        .end();
    assert_eq!(run(code, 4).read_f32(0).unwrap(), 3.0);

    // -3 mod 10 -> 7, never negative for a positive modulus
    let code = Asm::new()
        .op(OpCode::AddConst)
        .f32(-3.0)
        .op(OpCode::Sawtooth)
        .f32(10.0)
        .op(OpCode::StoreFloat)
        .u16(0)
        .end();
    assert_eq!(run(code, 4).read_f32(0).unwrap(), 7.0);
}

#[test]
fn test_discretize_quantizes_and_guards_zero() {
    let code = Asm::new()
        .op(OpCode::AddConst)
        .f32(7.3)
        .op(OpCode::Discretize)
        .f32(2.0)
        .op(OpCode::StoreFloat)
        .u16(0)
        .op(OpCode::AddConst)
        .f32(9.0)
        .op(OpCode::Discretize)
        .f32(0.0)
        .op(OpCode::StoreFloat)
        .u16(4)
        .end();
    let inst = run(code, 8);
    assert_eq!(inst.read_f32(0).unwrap(), 6.0);
    assert_eq!(inst.read_f32(4).unwrap(), 0.0, "division by zero quantizes to 0");
}

#[test]
fn test_sine_and_pow() {
    let code = Asm::new()
        .op(OpCode::AddConst)
        .f32(std::f32::consts::FRAC_PI_2)
        .op(OpCode::Sine)
        .f32(3.0)
        .op(OpCode::StoreFloat)
        .u16(0)
        .op(OpCode::AddConst)
        .f32(2.0)
        .op(OpCode::PowConst)
        .f32(10.0)
        .op(OpCode::StoreFloat)
        .u16(4)
        .end();
    let inst = run(code, 8);
    assert!((inst.read_f32(0).unwrap() - 3.0).abs() < 1e-6);
    assert_eq!(inst.read_f32(4).unwrap(), 1024.0);
}

#[test]
fn test_scratch_slots() {
    // slot[0] = 3; val = 4 * slot[0] + slot[0] = 15; slot[1] = 15; val = 2^15
    let code = Asm::new()
        .op(OpCode::AddConst)
        .f32(3.0)
        .op(OpCode::Yank)
        .i32(0)
        .op(OpCode::AddConst)
        .f32(4.0)
        .op(OpCode::Multiply)
        .i32(0)
        .op(OpCode::AddSlot)
        .i32(0)
        .op(OpCode::Yank)
        .i32(1)
        .op(OpCode::AddConst)
        .f32(2.0)
        .op(OpCode::PowSlot)
        .i32(1)
        .op(OpCode::StoreFloat)
        .u16(0)
        .end();
    assert_eq!(run(code, 4).read_f32(0).unwrap(), 32768.0);
}

#[test]
fn test_yank_resets_accumulator() {
    let code = Asm::new()
        .op(OpCode::AddConst)
        .f32(9.0)
        .op(OpCode::Yank)
        .i32(2)
        .op(OpCode::StoreFloat)
        .u16(0)
        .op(OpCode::AddSlot)
        .i32(2)
        .op(OpCode::StoreFloat)
        .u16(4)
        .end();
    let inst = run(code, 8);
    assert_eq!(inst.read_f32(0).unwrap(), 0.0);
    assert_eq!(inst.read_f32(4).unwrap(), 9.0);
}

#[test]
fn test_copy_dir_writes_vector_verbatim() {
    let code = Asm::new().op(OpCode::CopyDir).u16(4).end();
    let mut inst = Instance::new(TID, 16);
    let program = Program::new(TID, code);
    let mut rng = StepRng::new(0, 0);
    let dir = Float3::new(0.0, 1.0, -0.5);
    execute(&program, &mut inst, &[], 0.0, 0, dir, &mut rng).unwrap();
    assert_eq!(inst.read_float3(4).unwrap(), dir);
    assert_eq!(inst.read_f32(0).unwrap(), 0.0);
}

#[test]
fn test_ptr_goes_through_side_table() {
    let code = Asm::new()
        .op(OpCode::LoadPtr)
        .u16(1)
        .op(OpCode::StorePtr)
        .u16(0)
        .end();
    let handles = [AssetRef::Texture(11), AssetRef::ColorMap(42)];
    let mut inst = Instance::new(TID, 4);
    let program = Program::new(TID, code);
    let mut rng = StepRng::new(0, 0);
    execute(&program, &mut inst, &handles, 0.0, 0, Float3::ZERO, &mut rng).unwrap();
    assert_eq!(inst.read_u32(0).unwrap(), 42);
}

#[test]
fn test_bad_handle_index_is_an_error() {
    let code = Asm::new().op(OpCode::LoadPtr).u16(3).end();
    let mut inst = Instance::new(TID, 4);
    let program = Program::new(TID, code);
    let mut rng = StepRng::new(0, 0);
    let err = execute(&program, &mut inst, &[], 0.0, 0, Float3::ZERO, &mut rng).unwrap_err();
    assert_eq!(err, ExecError::BadHandleIndex(3));
}

#[test]
fn test_target_mismatch_refused() {
    let code = Asm::new().end();
    let program = Program::new(TypeId(1), code);
    let mut inst = Instance::new(TypeId(2), 4);
    let mut rng = StepRng::new(0, 0);
    let err = execute(&program, &mut inst, &[], 0.0, 0, Float3::ZERO, &mut rng).unwrap_err();
    assert!(matches!(err, ExecError::TargetMismatch { .. }));
}

#[test]
fn test_malformed_programs_fail_cleanly() {
    let mut rng = StepRng::new(0, 0);

    // runs off the end without End
    let program = Program::new(TID, vec![OpCode::AddConst.as_u8(), 0, 0]);
    let mut inst = Instance::new(TID, 4);
    assert_eq!(
        execute(&program, &mut inst, &[], 0.0, 0, Float3::ZERO, &mut rng).unwrap_err(),
        ExecError::Truncated
    );

    // unknown opcode byte
    let program = Program::new(TID, vec![0xee]);
    assert_eq!(
        execute(&program, &mut inst, &[], 0.0, 0, Float3::ZERO, &mut rng).unwrap_err(),
        ExecError::InvalidOpcode(0xee)
    );

    // slot index out of range
    let code = Asm::new().op(OpCode::Yank).i32(16).end();
    let program = Program::new(TID, code);
    assert_eq!(
        execute(&program, &mut inst, &[], 0.0, 0, Float3::ZERO, &mut rng).unwrap_err(),
        ExecError::BadSlotIndex(16)
    );

    // store outside the instance
    let code = Asm::new()
        .op(OpCode::AddConst)
        .f32(1.0)
        .op(OpCode::StoreFloat)
        .u16(400)
        .end();
    let program = Program::new(TID, code);
    assert!(matches!(
        execute(&program, &mut inst, &[], 0.0, 0, Float3::ZERO, &mut rng).unwrap_err(),
        ExecError::OutOfBounds { .. }
    ));
}

#[test]
fn test_add_random_stays_in_range() {
    let code = Asm::new()
        .op(OpCode::AddRandom)
        .f32(2.0)
        .op(OpCode::StoreFloat)
        .u16(0)
        .end();
    let program = Program::new(TID, code);
    let mut rng = StdRng::seed_from_u64(0xfeed);

    for _ in 0..100 {
        let mut inst = Instance::new(TID, 4);
        execute(&program, &mut inst, &[], 0.0, 0, Float3::ZERO, &mut rng).unwrap();
        let v = inst.read_f32(0).unwrap();
        assert!((0.0..2.0).contains(&v), "sample {} out of range", v);
    }
}
