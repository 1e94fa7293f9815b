pub mod alias;
pub mod float3;
pub mod instance;
pub mod types;

pub use alias::AliasList;
pub use float3::Float3;
pub use instance::{AccessError, Instance};
pub use types::{AssetKind, Field, FieldKind, ReflectError, TypeBuilder, TypeDef, TypeId, TypeRegistry};
