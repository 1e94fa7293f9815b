use reflect::TypeId;

/// A handle resolved at compile time and kept in the side-table of the
/// generator that owns the program. Programs refer to these by index; the
/// raw bits are what `StorePtr` writes into the instance field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetRef {
    Texture(u32),
    GroundFxTexture(u32),
    ColorMap(u32),
    /// A nested explosion generator, loaded on demand during compilation.
    Generator(u32),
}

impl AssetRef {
    #[inline]
    pub fn raw(self) -> u32 {
        match self {
            AssetRef::Texture(h)
            | AssetRef::GroundFxTexture(h)
            | AssetRef::ColorMap(h)
            | AssetRef::Generator(h) => h,
        }
    }
}

/// One compiled effect program, bound to the type it was compiled against.
/// The binding is what makes executing against a wrong-typed instance a
/// checked error instead of memory corruption.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    target: TypeId,
    code: Box<[u8]>,
}

impl Program {
    pub fn new(target: TypeId, code: Vec<u8>) -> Self {
        Program {
            target,
            code: code.into_boxed_slice(),
        }
    }

    #[inline]
    pub fn target(&self) -> TypeId {
        self.target
    }

    #[inline]
    pub fn code(&self) -> &[u8] {
        &self.code
    }

    pub fn len(&self) -> usize {
        self.code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }
}
