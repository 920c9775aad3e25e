//! The type registry consulted when resolving discriminators.
//!
//! - [`TypeTrait`]: a capability supported by a registered type.
//! - [`FromType`]: builds a `TypeTrait` for a concrete type.
//! - [`TypeMeta`]: type path, value kind and `TypeTrait` table of one type.
//! - [`GetTypeMeta`]: builds the `TypeMeta` of a type.
//! - [`TypeRegistry`]: the `TypeMeta` store, read-only once handed to a policy.
//! - TypeTraits:
//!     - [`TypeTraitDeserialize`]: build a boxed value from any deserializer.
//!     - [`TypeTraitCast`]: assignability to a declared trait object.
//!     - [`TypeTraitElement`]: the element type of a list or dictionary type.
//!
//! ## auto_register
//!
//! See [`TypeRegistry::auto_register`]. Static registration uses the
//! [`inventory`] crate, which not all platforms support. On those platforms
//! the method returns `false` without failing.

// -----------------------------------------------------------------------------
// Modules

mod from_type;
mod traits;
mod type_meta;
mod type_registry;
mod type_trait;

// -----------------------------------------------------------------------------
// Exports

pub use from_type::FromType;
pub use traits::{TypeTraitCast, TypeTraitDeserialize, TypeTraitElement};
pub use type_meta::{GetTypeMeta, TypeMeta};
pub use type_registry::TypeRegistry;
pub use type_trait::TypeTrait;
