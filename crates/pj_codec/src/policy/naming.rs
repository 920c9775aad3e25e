use alloc::borrow::Cow;
use core::any::TypeId;

use pj_utils::TypeIdMap;
use pj_utils::hash::HashMap;

use crate::error::CodecError;
use crate::path::TypePath;
use crate::registry::{TypeMeta, TypeRegistry};

/// The pluggable mapping between types and discriminator ids.
///
/// Both directions must agree: `id_to_type(type_to_id(T)) == T` for every
/// type that is written and read back.
pub trait TypeNaming: Send + Sync + 'static {
    /// Returns the id written for a runtime type, `None` if it has none.
    fn type_to_id(&self, type_id: TypeId, type_path: &'static str) -> Option<Cow<'_, str>>;

    /// Returns the registered type an id stands for.
    fn id_to_type<'r>(&self, id: &str, registry: &'r TypeRegistry) -> Option<&'r TypeMeta>;
}

// -----------------------------------------------------------------------------
// TypePathNaming

/// Uses the stable [`TypePath`] as the id.
///
/// Paths carry no crate version, so ids survive rebuilds. They do change when
/// a type moves to another module, unless its path is pinned with
/// `impl_polymorphic!((in old::module) Type)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypePathNaming;

impl TypeNaming for TypePathNaming {
    #[inline]
    fn type_to_id(&self, _type_id: TypeId, type_path: &'static str) -> Option<Cow<'_, str>> {
        Some(Cow::Borrowed(type_path))
    }

    #[inline]
    fn id_to_type<'r>(&self, id: &str, registry: &'r TypeRegistry) -> Option<&'r TypeMeta> {
        registry.get_with_type_path(id)
    }
}

// -----------------------------------------------------------------------------
// NamingTable

/// An explicit id table, typically for ids persisted by another producer.
///
/// Types missing from the table have no id unless the table falls back to
/// [`TypePathNaming`].
///
/// ```
/// use pj_codec::policy::{NamingTable, TypeNaming};
/// use pj_codec::DynamicMap;
/// use core::any::TypeId;
///
/// let mut table = NamingTable::new();
/// table.insert::<DynamicMap>("Hashtable-id").unwrap();
/// assert!(table.insert::<String>("Hashtable-id").is_err());
///
/// let id = table.type_to_id(TypeId::of::<DynamicMap>(), "pj_codec::DynamicMap");
/// assert_eq!(id.as_deref(), Some("Hashtable-id"));
/// ```
#[derive(Debug, Default)]
pub struct NamingTable {
    ids: TypeIdMap<Cow<'static, str>>,
    types: HashMap<Cow<'static, str>, TypeId>,
    type_path_fallback: bool,
}

impl NamingTable {
    /// Creates an empty table without fallback.
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses type paths for types and ids missing from the table.
    pub fn with_type_path_fallback(mut self) -> Self {
        self.type_path_fallback = true;
        self
    }

    /// Assigns `id` to `T`.
    ///
    /// Fails if `T` already has an id or `id` already names a type.
    pub fn insert<T: TypePath + ?Sized>(
        &mut self,
        id: impl Into<Cow<'static, str>>,
    ) -> Result<(), CodecError> {
        let id = id.into();
        if id.is_empty() {
            return Err(CodecError::configuration("type discriminator ids must not be empty"));
        }
        if self.ids.contains_type::<T>() {
            return Err(CodecError::configuration(alloc::format!(
                "`{}` already has a type discriminator",
                T::type_path()
            )));
        }
        if self.types.contains_key(id.as_ref()) {
            return Err(CodecError::configuration(alloc::format!(
                "type discriminator `{id}` is already assigned"
            )));
        }
        self.types.insert(id.clone(), TypeId::of::<T>());
        self.ids.insert_type::<T>(id);
        Ok(())
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with<T: TypePath + ?Sized>(
        mut self,
        id: impl Into<Cow<'static, str>>,
    ) -> Result<Self, CodecError> {
        self.insert::<T>(id)?;
        Ok(self)
    }
}

impl TypeNaming for NamingTable {
    fn type_to_id(&self, type_id: TypeId, type_path: &'static str) -> Option<Cow<'_, str>> {
        match self.ids.get(&type_id) {
            Some(id) => Some(Cow::Borrowed(id.as_ref())),
            None if self.type_path_fallback => Some(Cow::Borrowed(type_path)),
            None => None,
        }
    }

    fn id_to_type<'r>(&self, id: &str, registry: &'r TypeRegistry) -> Option<&'r TypeMeta> {
        match self.types.get(id) {
            Some(type_id) => registry.get(*type_id),
            None if self.type_path_fallback => registry.get_with_type_path(id),
            None => None,
        }
    }
}
