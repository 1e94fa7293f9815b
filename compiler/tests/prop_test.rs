//! Property tests: the compiler must produce identical bytes for identical
//! input, and whatever it produces must execute cleanly inside the target's
//! bounds — for any script a config file could throw at it.

use compiler::{ProgramCompiler, ResolveContext};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use reflect::{FieldKind, Float3, TypeBuilder, TypeRegistry};
use vm::{execute, AssetRef};

struct NullCtx;

impl ResolveContext for NullCtx {
    fn resolve_texture(&mut self, _: &str) -> Option<AssetRef> {
        None
    }
    fn resolve_ground_fx_texture(&mut self, _: &str) -> Option<AssetRef> {
        None
    }
    fn resolve_color_map(&mut self, _: &str) -> Option<AssetRef> {
        None
    }
    fn load_spawn_generator(&mut self, _: &str) -> Option<AssetRef> {
        None
    }
}

fn registry() -> TypeRegistry {
    let mut reg = TypeRegistry::new();
    // 12 bytes so a randomly generated "dir" fragment (a vector copy) still
    // lands inside the instance
    reg.register(
        TypeBuilder::new("scalar")
            .config_field("v", FieldKind::Float32)
            .field("pad0", FieldKind::Float32)
            .field("pad1", FieldKind::Float32),
    )
    .unwrap();
    reg
}

fn compile(reg: &TypeRegistry, fragment: &str) -> vm::Program {
    let mut ctx = NullCtx;
    let mut handles = Vec::new();
    let target = reg.find("scalar").unwrap();
    let mut pc = ProgramCompiler::new(reg, &mut ctx, &mut handles);
    pc.compile_field(&FieldKind::Float32, 0, fragment);
    pc.finish(target)
}

proptest! {
    #[test]
    fn compilation_is_deterministic(fragment in "[irdmkspyxaq0-9eE \\.\\-\\+;]{0,32}") {
        let reg = registry();
        let a = compile(&reg, &fragment);
        let b = compile(&reg, &fragment);
        prop_assert_eq!(a.code(), b.code());
    }

    #[test]
    fn compiled_programs_execute_in_bounds(fragment in "[irdmkspyxaq0-9eE \\.\\-\\+;]{0,32}") {
        let reg = registry();
        let target = reg.find("scalar").unwrap();
        let program = compile(&reg, &fragment);
        let mut inst = reg.create_instance(target).unwrap();
        let mut rng = StdRng::seed_from_u64(42);

        let result = execute(&program, &mut inst, &[], 25.0, 3, Float3::ZERO, &mut rng);
        prop_assert!(result.is_ok(), "fragment {:?} produced {:?}", fragment, result);
    }
}
