//! The type discriminator policy.
//!
//! A [`TypeDiscriminatorPolicy`] is built once, then shared read-only by every
//! call. It holds the wire property names, the `wrap_arrays` toggle, the
//! [`TypeRegistry`], and the pluggable [`TypeNaming`] and [`TypeFilter`].

mod filter;
mod naming;
mod options;

pub use filter::{AllowList, DefaultTypeFilter, TypeFilter};
pub use naming::{NamingTable, TypeNaming, TypePathNaming};
pub use options::PolicyOptions;

use alloc::borrow::Cow;
use alloc::sync::Arc;
use core::fmt;

use log::{debug, trace, warn};

use crate::Polymorphic;
use crate::error::CodecError;
use crate::registry::{TypeMeta, TypeRegistry};

// -----------------------------------------------------------------------------
// TypeDiscriminatorPolicy

/// Immutable codec configuration, cheap to clone.
///
/// ```
/// use std::sync::Arc;
/// use pj_codec::policy::TypeDiscriminatorPolicy;
/// use pj_codec::registry::TypeRegistry;
///
/// let policy = TypeDiscriminatorPolicy::new(Arc::new(TypeRegistry::new()));
/// let with_arrays = policy.with_wrap_arrays(true);
///
/// assert_eq!(policy.tag_property_name(), "$type");
/// assert!(!policy.wrap_arrays());
/// assert!(with_arrays.wrap_arrays());
/// ```
#[derive(Clone)]
pub struct TypeDiscriminatorPolicy {
    inner: Arc<PolicyInner>,
}

#[derive(Clone)]
struct PolicyInner {
    tag_property_name: Cow<'static, str>,
    scalar_value_property_name: Cow<'static, str>,
    array_value_property_name: Cow<'static, str>,
    wrap_arrays: bool,
    registry: Arc<TypeRegistry>,
    naming: Arc<dyn TypeNaming>,
    filter: Arc<dyn TypeFilter>,
}

impl TypeDiscriminatorPolicy {
    /// A policy with default property names, type-path ids, the
    /// [`DefaultTypeFilter`] and `wrap_arrays` off.
    pub fn new(registry: Arc<TypeRegistry>) -> Self {
        Self {
            inner: Arc::new(PolicyInner {
                tag_property_name: Cow::Borrowed(PolicyBuilder::DEFAULT_TAG),
                scalar_value_property_name: Cow::Borrowed(PolicyBuilder::DEFAULT_SCALAR_VALUE),
                array_value_property_name: Cow::Borrowed(PolicyBuilder::DEFAULT_ARRAY_VALUE),
                wrap_arrays: false,
                registry,
                naming: Arc::new(TypePathNaming),
                filter: Arc::new(DefaultTypeFilter),
            }),
        }
    }

    #[inline]
    pub fn builder(registry: Arc<TypeRegistry>) -> PolicyBuilder {
        PolicyBuilder::new(registry)
    }

    /// Builds a validated policy from [`PolicyOptions`].
    pub fn from_options(
        options: &PolicyOptions,
        registry: Arc<TypeRegistry>,
    ) -> Result<Self, CodecError> {
        PolicyBuilder::from_options(options, registry).build()
    }

    /// Returns a copy of this policy with another `wrap_arrays` setting.
    pub fn with_wrap_arrays(&self, wrap_arrays: bool) -> Self {
        if self.inner.wrap_arrays == wrap_arrays {
            return self.clone();
        }
        let mut inner = PolicyInner::clone(&self.inner);
        inner.wrap_arrays = wrap_arrays;
        Self {
            inner: Arc::new(inner),
        }
    }

    #[inline]
    pub fn tag_property_name(&self) -> &str {
        &self.inner.tag_property_name
    }

    /// Reserved for wrapping scalars, never written.
    #[inline]
    pub fn scalar_value_property_name(&self) -> &str {
        &self.inner.scalar_value_property_name
    }

    #[inline]
    pub fn array_value_property_name(&self) -> &str {
        &self.inner.array_value_property_name
    }

    #[inline]
    pub fn wrap_arrays(&self) -> bool {
        self.inner.wrap_arrays
    }

    #[inline]
    pub fn registry(&self) -> &TypeRegistry {
        &self.inner.registry
    }

    /// Returns the id of a runtime value's type, if the naming has one.
    #[inline]
    pub fn type_to_id(&self, value: &dyn Polymorphic) -> Option<Cow<'_, str>> {
        self.inner
            .naming
            .type_to_id(value.ty_id(), value.reflect_type_path())
    }

    /// Returns the registered type of an id, without the allow-list check.
    #[inline]
    pub fn id_to_type(&self, id: &str) -> Option<&TypeMeta> {
        self.inner.naming.id_to_type(id, &self.inner.registry)
    }

    #[inline]
    pub fn is_allowed_type(&self, meta: &TypeMeta) -> bool {
        self.inner.filter.is_allowed(meta)
    }

    /// Returns the id to write for a runtime value.
    pub fn get_required_id(&self, value: &dyn Polymorphic) -> Result<Cow<'_, str>, CodecError> {
        self.type_to_id(value)
            .ok_or_else(|| CodecError::UnresolvableType {
                type_path: value.reflect_type_path(),
            })
    }

    /// Resolves an id read from the wire to an allowed, registered type.
    pub fn resolve_required_type(&self, id: &str) -> Result<&TypeMeta, CodecError> {
        let Some(meta) = self.id_to_type(id) else {
            debug!("unknown type discriminator `{id}`");
            return Err(CodecError::UnknownDiscriminator { id: id.into() });
        };
        if !self.is_allowed_type(meta) {
            warn!("type discriminator `{id}` ({}) rejected by allow-list", meta.type_path());
            return Err(CodecError::DisallowedType {
                id: id.into(),
                type_path: meta.type_path(),
            });
        }
        trace!("resolved type discriminator `{id}` to {}", meta.type_path());
        Ok(meta)
    }
}

impl fmt::Debug for TypeDiscriminatorPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDiscriminatorPolicy")
            .field("tag_property_name", &self.inner.tag_property_name)
            .field("scalar_value_property_name", &self.inner.scalar_value_property_name)
            .field("array_value_property_name", &self.inner.array_value_property_name)
            .field("wrap_arrays", &self.inner.wrap_arrays)
            .field("registry", &self.inner.registry)
            .finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// PolicyBuilder

/// Builds a [`TypeDiscriminatorPolicy`], validating property names.
pub struct PolicyBuilder {
    inner: PolicyInner,
}

impl PolicyBuilder {
    pub const DEFAULT_TAG: &'static str = "$type";
    pub const DEFAULT_SCALAR_VALUE: &'static str = "$value";
    pub const DEFAULT_ARRAY_VALUE: &'static str = "$values";

    pub fn new(registry: Arc<TypeRegistry>) -> Self {
        let policy = TypeDiscriminatorPolicy::new(registry);
        Self {
            inner: PolicyInner::clone(&policy.inner),
        }
    }

    /// Starts from [`PolicyOptions`]. A non-empty `allowed_prefixes` installs
    /// an [`AllowList`].
    pub fn from_options(options: &PolicyOptions, registry: Arc<TypeRegistry>) -> Self {
        let builder = Self::new(registry)
            .tag_property_name(options.tag_property_name.clone())
            .scalar_value_property_name(options.scalar_value_property_name.clone())
            .array_value_property_name(options.array_value_property_name.clone())
            .wrap_arrays(options.wrap_arrays);
        if options.allowed_prefixes.is_empty() {
            builder
        } else {
            builder.filter(AllowList::new(options.allowed_prefixes.iter().cloned()))
        }
    }

    pub fn tag_property_name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.inner.tag_property_name = name.into();
        self
    }

    pub fn scalar_value_property_name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.inner.scalar_value_property_name = name.into();
        self
    }

    pub fn array_value_property_name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.inner.array_value_property_name = name.into();
        self
    }

    pub fn wrap_arrays(mut self, wrap_arrays: bool) -> Self {
        self.inner.wrap_arrays = wrap_arrays;
        self
    }

    pub fn naming(mut self, naming: impl TypeNaming) -> Self {
        self.inner.naming = Arc::new(naming);
        self
    }

    pub fn filter(mut self, filter: impl TypeFilter) -> Self {
        self.inner.filter = Arc::new(filter);
        self
    }

    pub fn build(self) -> Result<TypeDiscriminatorPolicy, CodecError> {
        validate_names([
            &self.inner.tag_property_name,
            &self.inner.scalar_value_property_name,
            &self.inner.array_value_property_name,
        ])?;
        Ok(TypeDiscriminatorPolicy {
            inner: Arc::new(self.inner),
        })
    }
}

fn validate_names<S: AsRef<str>>(names: [&S; 3]) -> Result<(), CodecError> {
    let [tag, scalar, array]: [&str; 3] = names.map(|name| name.as_ref());
    if tag.is_empty() || scalar.is_empty() || array.is_empty() {
        return Err(CodecError::configuration("property names must not be empty"));
    }
    if tag == scalar || tag == array || scalar == array {
        return Err(CodecError::configuration(alloc::format!(
            "property names must be distinct, got `{tag}`, `{scalar}` and `{array}`"
        )));
    }
    Ok(())
}
