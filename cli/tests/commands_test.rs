use std::io::Write;
use tempfile::NamedTempFile;

fn write_temp_toml(content: &str) -> NamedTempFile {
    let mut f = NamedTempFile::with_suffix(".toml").unwrap();
    f.write_all(content.as_bytes()).unwrap();
    f.flush().unwrap();
    f
}

const CLASSES: &str = r#"
[[types]]
name = "float3"
fields = [
    { name = "x", kind = "f32", config = true },
    { name = "y", kind = "f32", config = true },
    { name = "z", kind = "f32", config = true },
]

[[types]]
name = "CFlameProjectile"
spawnable = true
fields = [
    { name = "size", kind = "f32", config = true },
    { name = "ttl", kind = "i32", config = true },
    { name = "pos", kind = "float3", config = true },
    { name = "sizes", kind = "f32[2]", config = true },
    { name = "tex", kind = "texture", config = true },
]
"#;

const EXPLOSIONS: &str = r#"
[blast.flames]
class = "CFlameProjectile"
ground = true
count = 3

[blast.flames.properties]
size = "5 r2"
ttl = "d0.1 90"
pos = "dir"
tex = "flame"

[blast.groundflash]
ttl = 10
flashSize = 12.0
"#;

// ======================================================================
// compile
// ======================================================================

#[test]
fn compile_all_tags() {
    let defs = write_temp_toml(CLASSES);
    let expl = write_temp_toml(EXPLOSIONS);
    let result = cli::commands::compile::compile_tags(
        defs.path().to_str().unwrap(),
        expl.path().to_str().unwrap(),
        None,
        None,
    );
    assert!(result.is_ok(), "compile failed: {:?}", result.err());
}

#[test]
fn compile_single_tag() {
    let defs = write_temp_toml(CLASSES);
    let expl = write_temp_toml(EXPLOSIONS);
    let result = cli::commands::compile::compile_tags(
        defs.path().to_str().unwrap(),
        expl.path().to_str().unwrap(),
        None,
        Some("blast"),
    );
    assert!(result.is_ok());
}

#[test]
fn compile_missing_defs_file_fails() {
    let expl = write_temp_toml(EXPLOSIONS);
    let result = cli::commands::compile::compile_tags(
        "/tmp/nonexistent_pyro_classes.toml",
        expl.path().to_str().unwrap(),
        None,
        None,
    );
    assert!(result.is_err());
}

#[test]
fn compile_bad_defs_toml_fails() {
    let defs = write_temp_toml("types = 3");
    let expl = write_temp_toml(EXPLOSIONS);
    let result = cli::commands::compile::compile_tags(
        defs.path().to_str().unwrap(),
        expl.path().to_str().unwrap(),
        None,
        None,
    );
    assert!(result.is_err());
}

// ======================================================================
// disassemble
// ======================================================================

#[test]
fn disassemble_compiled_tag() {
    let defs = write_temp_toml(CLASSES);
    let expl = write_temp_toml(EXPLOSIONS);
    let result = cli::commands::disassemble::disassemble_tag(
        defs.path().to_str().unwrap(),
        expl.path().to_str().unwrap(),
        None,
        "blast",
    );
    assert!(result.is_ok(), "disassemble failed: {:?}", result.err());
}

#[test]
fn disassemble_unknown_tag_fails() {
    let defs = write_temp_toml(CLASSES);
    let expl = write_temp_toml(EXPLOSIONS);
    let result = cli::commands::disassemble::disassemble_tag(
        defs.path().to_str().unwrap(),
        expl.path().to_str().unwrap(),
        None,
        "no_such_tag",
    );
    assert!(result.is_err());
    let err = format!("{}", result.unwrap_err());
    assert!(err.contains("did not compile"), "unexpected error: {err}");
}

// ======================================================================
// classes
// ======================================================================

#[test]
fn classes_dump() {
    let defs = write_temp_toml(CLASSES);
    let result = cli::commands::classes::dump_classes(defs.path().to_str().unwrap(), None);
    assert!(result.is_ok());
}

// ======================================================================
// fire
// ======================================================================

#[test]
fn fire_compiled_tag() {
    let defs = write_temp_toml(CLASSES);
    let expl = write_temp_toml(EXPLOSIONS);
    let result = cli::commands::fire::fire_tag(
        defs.path().to_str().unwrap(),
        expl.path().to_str().unwrap(),
        None,
        "blast",
        100.0,
        20.0,
        1.0,
        42,
    );
    assert!(result.is_ok(), "fire failed: {:?}", result.err());
}

#[test]
fn fire_unknown_tag_fails() {
    let defs = write_temp_toml(CLASSES);
    let expl = write_temp_toml(EXPLOSIONS);
    let result = cli::commands::fire::fire_tag(
        defs.path().to_str().unwrap(),
        expl.path().to_str().unwrap(),
        None,
        "nope",
        100.0,
        20.0,
        1.0,
        42,
    );
    assert!(result.is_err());
}

// ======================================================================
// class definition parsing
// ======================================================================

#[test]
fn defs_build_layout_and_kinds() {
    let defs = write_temp_toml(CLASSES);
    let registry = cli::defs::load_registry(defs.path().to_str().unwrap()).unwrap();

    let flame = registry.find("CFlameProjectile").unwrap();
    let def = registry.def(flame);
    assert!(def.spawnable);
    assert!(!def.synced);

    // size@0 ttl@4 pos@8..20 sizes@20..28 tex@28
    assert_eq!(registry.find_field(flame, "size").unwrap().offset, 0);
    assert_eq!(registry.find_field(flame, "ttl").unwrap().offset, 4);
    assert_eq!(registry.find_field(flame, "pos").unwrap().offset, 8);
    assert_eq!(registry.find_field(flame, "sizes").unwrap().offset, 20);
    assert_eq!(registry.find_field(flame, "tex").unwrap().offset, 28);
    assert_eq!(def.size, 32);
}

#[test]
fn defs_reject_unknown_kind() {
    let defs = write_temp_toml(
        r#"
[[types]]
name = "broken"
fields = [ { name = "a", kind = "quaternion" } ]
"#,
    );
    assert!(cli::defs::load_registry(defs.path().to_str().unwrap()).is_err());
}
