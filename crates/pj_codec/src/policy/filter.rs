use alloc::borrow::Cow;
use alloc::vec::Vec;

use crate::registry::{TypeMeta, TypeTraitDeserialize};

/// The allow-list predicate applied to every resolved discriminator.
///
/// A rejected type is never constructed. Any `Fn(&TypeMeta) -> bool` is a
/// filter.
pub trait TypeFilter: Send + Sync + 'static {
    fn is_allowed(&self, meta: &TypeMeta) -> bool;
}

impl<F: Fn(&TypeMeta) -> bool + Send + Sync + 'static> TypeFilter for F {
    #[inline]
    fn is_allowed(&self, meta: &TypeMeta) -> bool {
        self(meta)
    }
}

/// Allows registered types that can be built from JSON.
///
/// Trait objects and generic parameters never reach the registry, only
/// concrete types do, so this is the "concrete, non-abstract" rule.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultTypeFilter;

impl TypeFilter for DefaultTypeFilter {
    #[inline]
    fn is_allowed(&self, meta: &TypeMeta) -> bool {
        meta.has_trait::<TypeTraitDeserialize>()
    }
}

/// [`DefaultTypeFilter`] restricted to type paths with one of the prefixes.
#[derive(Debug, Clone, Default)]
pub struct AllowList {
    prefixes: Vec<Cow<'static, str>>,
}

impl AllowList {
    pub fn new<I, P>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Cow<'static, str>>,
    {
        Self {
            prefixes: prefixes.into_iter().map(Into::into).collect(),
        }
    }

    pub fn allow(mut self, prefix: impl Into<Cow<'static, str>>) -> Self {
        self.prefixes.push(prefix.into());
        self
    }
}

impl TypeFilter for AllowList {
    fn is_allowed(&self, meta: &TypeMeta) -> bool {
        DefaultTypeFilter.is_allowed(meta)
            && self
                .prefixes
                .iter()
                .any(|prefix| meta.type_path().starts_with(prefix.as_ref()))
    }
}
