//! Type metadata registry.
//!
//! The engine proper derives this information from its class reflection
//! system; here types are registered explicitly through [`TypeBuilder`].
//! Layout is sequential with natural alignment, little-endian, and capped at
//! 65535 bytes so every field offset fits the bytecode's u16 store operand.

use std::collections::HashMap;
use std::fmt;

use crate::instance::Instance;

/// Dense handle for a registered type. Stable for the registry's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeId(pub u32);

/// Flavor of an asset-reference field, resolved at compile time through the
/// matching external store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    /// Entry in the projectile texture atlas.
    Texture,
    /// Entry in the ground-effects texture atlas.
    GroundFxTexture,
    /// Color ramp built from a definition string.
    ColorMap,
    /// Another explosion generator, loaded on demand.
    Generator,
}

/// Primitive kind of a field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Int32,
    Float32,
    /// Stored as a 4-byte integer; the store instruction for bool fields is
    /// the integer store.
    Bool,
    UInt8,
    /// Nested structure; its fields are compiled member-by-member.
    Object(TypeId),
    /// Fixed-size inline array.
    Array { elem: Box<FieldKind>, count: u32 },
    /// Opaque 4-byte handle filled in from the asset side-table.
    Asset(AssetKind),
}

/// One field of a registered type.
#[derive(Debug, Clone)]
pub struct Field {
    pub name: String,
    /// Byte offset from the start of the instance.
    pub offset: u16,
    pub kind: FieldKind,
    /// Whether configuration scripts may target this field.
    pub config: bool,
}

#[derive(Debug, Clone)]
pub struct TypeDef {
    pub name: String,
    pub base: Option<TypeId>,
    /// Total instance size in bytes, including base fields.
    pub size: u32,
    /// Restricted to the engine's synchronized-state partition; effect
    /// scripts must never compile against such a type.
    pub synced: bool,
    /// May be used as the target of a spawn entry.
    pub spawnable: bool,
    /// Own fields only; base fields live on the base def.
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReflectError {
    UnknownType(String),
    DuplicateType(String),
    DuplicateField(String),
    InstanceTooLarge(String),
    EmptyArray(String),
}

impl fmt::Display for ReflectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReflectError::UnknownType(n) => write!(f, "unknown type \"{}\"", n),
            ReflectError::DuplicateType(n) => write!(f, "type \"{}\" already registered", n),
            ReflectError::DuplicateField(n) => write!(f, "duplicate field \"{}\"", n),
            ReflectError::InstanceTooLarge(n) => write!(f, "type \"{}\" exceeds 65535 bytes", n),
            ReflectError::EmptyArray(n) => write!(f, "field \"{}\" is a zero-length array", n),
        }
    }
}

impl std::error::Error for ReflectError {}

/// Builder for one type registration.
pub struct TypeBuilder {
    name: String,
    base: Option<String>,
    synced: bool,
    spawnable: bool,
    fields: Vec<(String, FieldKind, bool)>,
}

impl TypeBuilder {
    pub fn new(name: &str) -> Self {
        TypeBuilder {
            name: name.to_string(),
            base: None,
            synced: false,
            spawnable: false,
            fields: Vec::new(),
        }
    }

    pub fn base(mut self, name: &str) -> Self {
        self.base = Some(name.to_string());
        self
    }

    pub fn synced(mut self) -> Self {
        self.synced = true;
        self
    }

    pub fn spawnable(mut self) -> Self {
        self.spawnable = true;
        self
    }

    /// Add a field that scripts cannot target.
    pub fn field(mut self, name: &str, kind: FieldKind) -> Self {
        self.fields.push((name.to_string(), kind, false));
        self
    }

    /// Add a script-configurable field.
    pub fn config_field(mut self, name: &str, kind: FieldKind) -> Self {
        self.fields.push((name.to_string(), kind, true));
        self
    }
}

/// Registry of all known effect-object types. Immutable once populated.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    types: Vec<TypeDef>,
    by_name: HashMap<String, TypeId>,
}

/// Hard cap so store offsets always fit the u16 operand.
pub const MAX_INSTANCE_SIZE: u32 = u16::MAX as u32;

impl TypeRegistry {
    pub fn new() -> Self {
        TypeRegistry::default()
    }

    pub fn register(&mut self, builder: TypeBuilder) -> Result<TypeId, ReflectError> {
        if self.by_name.contains_key(&builder.name) {
            return Err(ReflectError::DuplicateType(builder.name));
        }

        let base = match &builder.base {
            Some(name) => Some(
                self.find(name)
                    .ok_or_else(|| ReflectError::UnknownType(name.clone()))?,
            ),
            None => None,
        };

        let mut offset = base.map(|b| self.def(b).size).unwrap_or(0);
        let mut fields = Vec::with_capacity(builder.fields.len());

        for (name, kind, config) in builder.fields {
            if fields.iter().any(|f: &Field| f.name == name) {
                return Err(ReflectError::DuplicateField(name));
            }
            if let FieldKind::Array { count: 0, .. } = kind {
                return Err(ReflectError::EmptyArray(name));
            }

            let align = self.kind_align(&kind);
            let size = self.kind_size(&kind);
            offset = (offset + align - 1) / align * align;

            if offset + size > MAX_INSTANCE_SIZE {
                return Err(ReflectError::InstanceTooLarge(builder.name));
            }

            fields.push(Field {
                name,
                offset: offset as u16,
                kind,
                config,
            });
            offset += size;
        }

        // round the tail out so arrays of this type stay aligned
        let size = (offset + 3) / 4 * 4;
        if size > MAX_INSTANCE_SIZE {
            return Err(ReflectError::InstanceTooLarge(builder.name));
        }

        let id = TypeId(self.types.len() as u32);
        self.types.push(TypeDef {
            name: builder.name.clone(),
            base,
            size,
            synced: builder.synced,
            spawnable: builder.spawnable,
            fields,
        });
        self.by_name.insert(builder.name, id);
        Ok(id)
    }

    #[inline]
    pub fn def(&self, id: TypeId) -> &TypeDef {
        &self.types[id.0 as usize]
    }

    pub fn get(&self, id: TypeId) -> Option<&TypeDef> {
        self.types.get(id.0 as usize)
    }

    pub fn find(&self, name: &str) -> Option<TypeId> {
        self.by_name.get(name).copied()
    }

    /// All registered types, in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (TypeId, &TypeDef)> {
        self.types
            .iter()
            .enumerate()
            .map(|(i, def)| (TypeId(i as u32), def))
    }

    pub fn base_type(&self, id: TypeId) -> Option<TypeId> {
        self.def(id).base
    }

    pub fn is_synced(&self, id: TypeId) -> bool {
        self.def(id).synced
    }

    /// All fields of a type in layout order: base-type fields first, then the
    /// type's own, each group in declaration order.
    pub fn layout_fields(&self, id: TypeId) -> Vec<&Field> {
        let mut out = Vec::new();
        self.collect_fields(id, &mut out);
        out
    }

    fn collect_fields<'a>(&'a self, id: TypeId, out: &mut Vec<&'a Field>) {
        if let Some(base) = self.def(id).base {
            self.collect_fields(base, out);
        }
        out.extend(self.def(id).fields.iter());
    }

    /// Look a field up by name, searching the type and then its base chain.
    pub fn find_field(&self, id: TypeId, name: &str) -> Option<&Field> {
        let def = self.def(id);
        def.fields
            .iter()
            .find(|f| f.name == name)
            .or_else(|| def.base.and_then(|b| self.find_field(b, name)))
    }

    /// The script-targetable fields of a type, layout order.
    pub fn configurable_fields(&self, id: TypeId) -> Vec<&Field> {
        self.layout_fields(id)
            .into_iter()
            .filter(|f| f.config)
            .collect()
    }

    /// Byte size of a field of the given kind.
    pub fn kind_size(&self, kind: &FieldKind) -> u32 {
        match kind {
            FieldKind::Int32 | FieldKind::Float32 | FieldKind::Bool => 4,
            FieldKind::UInt8 => 1,
            FieldKind::Object(tid) => self.def(*tid).size,
            FieldKind::Array { elem, count } => self.kind_size(elem) * count,
            FieldKind::Asset(_) => 4,
        }
    }

    fn kind_align(&self, kind: &FieldKind) -> u32 {
        match kind {
            FieldKind::UInt8 => 1,
            FieldKind::Array { elem, .. } => self.kind_align(elem),
            _ => 4,
        }
    }

    /// Allocate a zero-initialized instance of the given type. This is the
    /// factory the interpreter's callers go through; the returned buffer is
    /// tagged with its type so a program compiled for another type refuses
    /// to run against it.
    pub fn create_instance(&self, id: TypeId) -> Option<Instance> {
        let def = self.get(id)?;
        Some(Instance::new(id, def.size as usize))
    }
}
