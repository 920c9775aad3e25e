use alloc::boxed::Box;
use core::any::TypeId;
use core::ops::Deref;

use pj_utils::TypeIdMap;

use crate::registry::{TypeRegistry, TypeTrait};
use crate::value::{Typed, ValueKind};

// -----------------------------------------------------------------------------
// TypeMeta

/// Runtime storage for type metadata, registered into the [`TypeRegistry`].
///
/// Holds the stable type path, the [`ValueKind`] and a [`TypeTrait`] table.
/// Usually generated by [`impl_polymorphic!`](crate::impl_polymorphic)
/// through [`GetTypeMeta`].
pub struct TypeMeta {
    type_id: TypeId,
    type_path: &'static str,
    type_name: &'static str,
    kind: ValueKind,
    trait_table: TypeIdMap<Box<dyn TypeTrait>>,
}

impl TypeMeta {
    /// Create a empty [`TypeMeta`] from a type.
    #[inline]
    pub fn of<T: Typed>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_path: T::type_path(),
            type_name: T::type_name(),
            kind: T::KIND,
            trait_table: TypeIdMap::new(),
        }
    }

    #[inline(always)]
    pub const fn type_id(&self) -> TypeId {
        self.type_id
    }

    #[inline(always)]
    pub const fn type_path(&self) -> &'static str {
        self.type_path
    }

    #[inline(always)]
    pub const fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns the [`ValueKind`] shared by all values of the type.
    #[inline(always)]
    pub const fn kind(&self) -> ValueKind {
        self.kind
    }

    /// Insert a new [`TypeTrait`], replacing a previous one of the same type.
    #[inline(always)]
    pub fn insert_trait<T: TypeTrait>(&mut self, data: T) {
        self.insert_trait_by_id(TypeId::of::<T>(), Box::new(data));
    }

    // Block code inline.
    #[inline(never)]
    fn insert_trait_by_id(&mut self, id: TypeId, val: Box<dyn TypeTrait>) {
        self.trait_table.insert(id, val);
    }

    /// Get a [`TypeTrait`] reference, or return `None` if it's doesn't exist.
    #[inline]
    pub fn get_trait<T: TypeTrait>(&self) -> Option<&T> {
        self.trait_table
            .get(&TypeId::of::<T>())
            .map(Deref::deref)
            .and_then(<dyn TypeTrait>::downcast_ref)
    }

    /// Return true if specific [`TypeTrait`] is exist.
    #[inline]
    pub fn has_trait<T: TypeTrait>(&self) -> bool {
        self.trait_table.contains_type::<T>()
    }
}

impl Clone for TypeMeta {
    fn clone(&self) -> Self {
        let mut trait_table = TypeIdMap::new();
        for (id, type_trait) in self.trait_table.iter() {
            trait_table.insert(*id, (**type_trait).clone_type_trait());
        }

        Self {
            trait_table,
            ..*self
        }
    }
}

impl core::fmt::Debug for TypeMeta {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TypeMeta")
            .field("type_path", &self.type_path)
            .field("kind", &self.kind)
            .field("trait_len", &self.trait_table.len())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// GetTypeMeta

/// A trait which allows a type to generate its [`TypeMeta`]
/// for registration into the [`TypeRegistry`].
///
/// Implemented by [`impl_polymorphic!`](crate::impl_polymorphic), and for
/// `Vec`, `BTreeMap` and `HashMap` of slot elements.
#[diagnostic::on_unimplemented(
    message = "`{Self}` does not implement `GetTypeMeta` so cannot be registered",
    note = "consider `pj_codec::impl_polymorphic!((in your::module) {Self})`"
)]
pub trait GetTypeMeta: Typed {
    /// Returns the **default** [`TypeMeta`] for this type.
    fn get_type_meta() -> TypeMeta;

    /// Registers other types needed by this type.
    fn register_dependencies(_registry: &mut TypeRegistry) {}
}
