use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;
use core::any::TypeId;
use std::collections::HashMap as StdHashMap;

use pj_utils::TypeIdMap;
use pj_utils::hash::{FixedHashState, HashMap};
use serde::de::DeserializeOwned;

use crate::registry::{GetTypeMeta, TypeMeta, TypeTrait};
use crate::slot::{DeclaredType, SlotElement};
use crate::value::{Dynamic, DynamicMap};

// -----------------------------------------------------------------------------
// TypeRegistry

/// The central store of [`TypeMeta`]s, keyed by [`TypeId`] and by type path.
///
/// A policy owns the registry behind an `Arc` and only reads it, so it has no
/// interior mutability and needs no locking once built.
///
/// # Example
///
/// ```
/// use pj_codec::registry::{TypeRegistry, TypeTraitDeserialize};
/// use pj_codec::value::ValueKind;
///
/// let registry = TypeRegistry::new();
///
/// let meta = registry
///     .get_with_type_path("alloc::vec::Vec<pj_codec::Dynamic>")
///     .unwrap();
/// assert_eq!(meta.kind(), ValueKind::Sequence);
/// assert!(meta.has_trait::<TypeTraitDeserialize>());
/// ```
pub struct TypeRegistry {
    type_meta_table: TypeIdMap<TypeMeta>,
    type_path_to_id: HashMap<&'static str, TypeId>,
}

impl Default for TypeRegistry {
    /// See [`TypeRegistry::new`] .
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    /// Create a empty [`TypeRegistry`].
    #[inline]
    pub const fn empty() -> Self {
        Self {
            type_meta_table: TypeIdMap::new(),
            type_path_to_id: HashMap::with_hasher(FixedHashState),
        }
    }

    /// Create a type registry with the untyped containers registered.
    ///
    /// - `Vec<Dynamic>`
    /// - `DynamicMap`
    /// - `BTreeMap<String, Dynamic>`
    /// - `HashMap<String, Dynamic>`
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register::<Vec<Dynamic>>();
        registry.register::<DynamicMap>();
        registry.register::<BTreeMap<String, Dynamic>>();
        registry.register::<StdHashMap<String, Dynamic>>();
        registry
    }

    fn register_internal(
        &mut self,
        type_id: TypeId,
        get_type_meta: impl FnOnce() -> TypeMeta,
    ) -> bool {
        self.type_meta_table.try_insert(type_id, || {
            let meta = get_type_meta();
            self.type_path_to_id.insert(meta.type_path(), type_id);
            meta
        })
    }

    /// Registers the type `T`, then its dependencies.
    ///
    /// Registering a type twice keeps the first [`TypeMeta`].
    pub fn register<T: GetTypeMeta>(&mut self) {
        if self.register_internal(TypeId::of::<T>(), T::get_type_meta) {
            T::register_dependencies(self);
        }
    }

    /// Registers the containers of a declared slot type.
    ///
    /// For `dyn Shape` this registers `Vec<Box<dyn Shape>>`,
    /// `BTreeMap<String, Box<dyn Shape>>` and `HashMap<String, Box<dyn Shape>>`,
    /// so that their wrapped or tagged forms can be read back.
    pub fn register_slot<D>(&mut self)
    where
        D: ?Sized + DeclaredType,
        Box<D>: SlotElement + DeserializeOwned,
    {
        self.register::<Vec<Box<D>>>();
        self.register::<BTreeMap<String, Box<D>>>();
        self.register::<StdHashMap<String, Box<D>>>();
    }

    /// Registers every type submitted through [`auto_register!`](crate::auto_register).
    ///
    /// Repeated calls are cheap and will not insert duplicates.
    ///
    /// Returns `false` if the `auto_register` feature is disabled or the
    /// platform is not supported by [`inventory`], in which case types must
    /// be registered manually.
    #[cfg_attr(not(feature = "auto_register"), inline(always))]
    pub fn auto_register(&mut self) -> bool {
        #[cfg(feature = "auto_register")]
        {
            use crate::__macro_exports::auto_register;
            // Reduce the cost of duplicate registrations.
            if self.contains(TypeId::of::<auto_register::__AvailFlag>()) {
                return true;
            }
            auto_register::__register_types(self);
            self.contains(TypeId::of::<auto_register::__AvailFlag>())
        }
        #[cfg(not(feature = "auto_register"))]
        {
            false
        }
    }

    /// Returns `true` if the type is registered.
    #[inline]
    pub fn contains(&self, type_id: TypeId) -> bool {
        self.type_meta_table.contains(&type_id)
    }

    /// Returns the [`TypeMeta`] of the type, if registered.
    #[inline]
    pub fn get(&self, type_id: TypeId) -> Option<&TypeMeta> {
        self.type_meta_table.get(&type_id)
    }

    /// Returns the [`TypeMeta`] registered under the given type path.
    pub fn get_with_type_path(&self, type_path: &str) -> Option<&TypeMeta> {
        match self.type_path_to_id.get(type_path) {
            Some(id) => self.get(*id),
            None => None,
        }
    }

    /// Returns the [`TypeTrait`] of the type, if both are registered.
    pub fn get_type_trait<T: TypeTrait>(&self, type_id: TypeId) -> Option<&T> {
        self.get(type_id).and_then(TypeMeta::get_trait::<T>)
    }

    /// Returns the number of registered types.
    #[inline]
    pub fn len(&self) -> usize {
        self.type_meta_table.len()
    }

    /// Iterates over all registered types in arbitrary order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &TypeMeta> {
        self.type_meta_table.values()
    }
}

impl core::fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_set().entries(self.type_path_to_id.keys()).finish()
    }
}

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::collections::BTreeMap;
    use alloc::string::String;
    use alloc::vec::Vec;
    use core::any::TypeId;

    use super::TypeRegistry;
    use crate::registry::{TypeTraitCast, TypeTraitDeserialize};
    use crate::testing::{Circle, Shape};
    use crate::value::ValueKind;

    #[test]
    fn register_keeps_first_meta() {
        let mut registry = TypeRegistry::empty();
        registry.register::<Circle>();
        registry.register::<Circle>();

        assert_eq!(registry.len(), 1);
        let meta = registry.get_with_type_path("shapes::Circle").unwrap();
        assert_eq!(meta.type_id(), TypeId::of::<Circle>());
        assert_eq!(meta.kind(), ValueKind::Structured);
        assert!(meta.has_trait::<TypeTraitCast<dyn Shape>>());
        assert!(
            registry
                .get_type_trait::<TypeTraitDeserialize>(TypeId::of::<Circle>())
                .is_some()
        );
    }

    #[test]
    fn register_slot_containers() {
        let mut registry = TypeRegistry::empty();
        registry.register_slot::<dyn Shape>();

        assert!(registry.contains(TypeId::of::<Vec<Box<dyn Shape>>>()));
        let meta = registry
            .get_with_type_path(
                "alloc::collections::BTreeMap<alloc::string::String, alloc::boxed::Box<dyn shapes::Shape>>",
            )
            .unwrap();
        assert_eq!(meta.type_id(), TypeId::of::<BTreeMap<String, Box<dyn Shape>>>());
        assert_eq!(meta.kind(), ValueKind::Map);
    }

    #[cfg(feature = "auto_register")]
    #[test]
    fn auto_register() {
        let mut registry = TypeRegistry::empty();
        if registry.auto_register() {
            assert!(registry.contains(TypeId::of::<crate::testing::Square>()));
            assert!(registry.auto_register());
        }
    }
}
