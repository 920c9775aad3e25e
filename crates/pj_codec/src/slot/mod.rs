//! Polymorphic slots.
//!
//! A slot is a field whose declared type is abstract: a trait object, the
//! [`Dynamic`] "any" type, or a list or string-keyed map of those. Slots
//! opt in through serde's `with` attribute:
//!
//! ```ignore
//! #[derive(Serialize, Deserialize)]
//! struct Drawing {
//!     #[serde(with = "pj_codec::slot::object")]
//!     background: Box<dyn Shape>,
//!     #[serde(with = "pj_codec::slot::list_with_arrays")]
//!     layers: Vec<Box<dyn Shape>>,
//!     #[serde(with = "pj_codec::slot::auto")]
//!     by_name: BTreeMap<String, Box<dyn Shape>>,
//! }
//! ```
//!
//! - [`SlotElement`]: a type that may fill one position of a slot.
//! - [`SlotShape`]: a declared field type, with its [`SlotKind`].
//! - [`SlotConverter`]: the six converter singletons.
//! - [`SchemaDecorator`]: validates and caches the converter of a field type.

mod converter;
mod decorator;
mod with;

pub use converter::{SlotConverter, WrapArrays};
pub(crate) use converter::SlotValue;
pub use decorator::{SchemaDecorator, SlotDescriptor};
pub use with::{
    auto, auto_with_arrays, dictionary, dictionary_with_arrays, list, list_with_arrays, object,
    object_with_arrays,
};

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;
use core::any::TypeId;
use core::fmt;
use core::fmt::Debug;
use std::collections::HashMap;

use serde_json::Value;

use crate::codec::read;
use crate::error::CodecError;
use crate::path::TypePath;
use crate::policy::TypeDiscriminatorPolicy;
use crate::registry::{TypeMeta, TypeTraitCast, TypeTraitElement};
use crate::value::{Dynamic, DynamicMap, Polymorphic, ValueKind};

// -----------------------------------------------------------------------------
// SlotKind

/// The three slot categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotKind {
    /// A single polymorphic value.
    Object,
    /// A sequence of polymorphic values.
    List,
    /// A string-keyed map of polymorphic values.
    Dictionary,
}

impl fmt::Display for SlotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Object => "object",
            Self::List => "list",
            Self::Dictionary => "dictionary",
        })
    }
}

// -----------------------------------------------------------------------------
// DeclaredType

/// A trait object usable as the declared type of a slot.
///
/// Implemented by [`declare_slot!`](crate::declare_slot), which also gives
/// `dyn Trait` its `Serialize` impl and `Box<dyn Trait>` its `Deserialize`
/// impl.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a declared slot type",
    note = "consider `pj_codec::declare_slot!((in your::module) {Self})`"
)]
pub trait DeclaredType: TypePath + Debug + Send + Sync {
    /// Returns the value as seen by the write path.
    fn upcast(&self) -> &dyn Polymorphic;
}

// -----------------------------------------------------------------------------
// SlotElement

/// A type that may fill one position of a slot: the field itself for an
/// object slot, an element of a list slot or a value of a dictionary slot.
pub trait SlotElement: TypePath + Debug + Send + Sync + Sized + 'static {
    /// Whether untagged payloads are accepted, which only "any" does.
    const ACCEPTS_UNTAGGED: bool;

    /// Returns the value as seen by the write path, `None` for absent values.
    fn as_polymorphic(&self) -> Option<&dyn Polymorphic>;

    /// Returns `true` if a value of the registered type fits this position.
    fn is_assignable(meta: &TypeMeta) -> bool;

    /// Builds the element for a JSON `null`.
    fn from_null() -> Result<Self, CodecError>;

    /// Builds the element from a value resolved from its tag.
    fn from_resolved(value: Box<dyn Polymorphic>, meta: &TypeMeta) -> Result<Self, CodecError>;

    /// Builds the element from an untagged payload, if accepted.
    fn from_untagged(value: Dynamic) -> Option<Self>;

    /// The identity matched against [`TypeTraitElement`] of tagged containers.
    #[inline]
    fn element_type_id() -> TypeId {
        TypeId::of::<Self>()
    }
}

impl<D: ?Sized + DeclaredType> SlotElement for Box<D> {
    const ACCEPTS_UNTAGGED: bool = false;

    #[inline]
    fn as_polymorphic(&self) -> Option<&dyn Polymorphic> {
        Some((**self).upcast())
    }

    #[inline]
    fn is_assignable(meta: &TypeMeta) -> bool {
        meta.has_trait::<TypeTraitCast<D>>()
    }

    fn from_null() -> Result<Self, CodecError> {
        Err(CodecError::Structural {
            expected: "a value",
            found: "null",
            declared: Self::type_path(),
        })
    }

    fn from_resolved(value: Box<dyn Polymorphic>, meta: &TypeMeta) -> Result<Self, CodecError> {
        let mismatch = || CodecError::TypeMismatch {
            type_path: meta.type_path(),
            declared: Self::type_path(),
        };
        let cast = meta.get_trait::<TypeTraitCast<D>>().ok_or_else(mismatch)?;
        cast.cast(value).map_err(|_| mismatch())
    }

    #[inline]
    fn from_untagged(_value: Dynamic) -> Option<Self> {
        None
    }
}

impl SlotElement for Dynamic {
    const ACCEPTS_UNTAGGED: bool = true;

    #[inline]
    fn as_polymorphic(&self) -> Option<&dyn Polymorphic> {
        Dynamic::as_polymorphic(self)
    }

    #[inline]
    fn is_assignable(_meta: &TypeMeta) -> bool {
        true
    }

    #[inline]
    fn from_null() -> Result<Self, CodecError> {
        Ok(Dynamic::Null)
    }

    fn from_resolved(value: Box<dyn Polymorphic>, _meta: &TypeMeta) -> Result<Self, CodecError> {
        // The untyped containers come back as themselves, not as objects.
        let value = match value.take::<Vec<Dynamic>>() {
            Ok(list) => return Ok(Dynamic::List(list)),
            Err(value) => value,
        };
        Ok(match value.take::<DynamicMap>() {
            Ok(map) => Dynamic::Map(map),
            Err(value) => Dynamic::Object(value),
        })
    }

    #[inline]
    fn from_untagged(value: Dynamic) -> Option<Self> {
        Some(value)
    }
}

impl<E: SlotElement> SlotElement for Option<E> {
    const ACCEPTS_UNTAGGED: bool = E::ACCEPTS_UNTAGGED;

    #[inline]
    fn as_polymorphic(&self) -> Option<&dyn Polymorphic> {
        self.as_ref().and_then(E::as_polymorphic)
    }

    #[inline]
    fn is_assignable(meta: &TypeMeta) -> bool {
        E::is_assignable(meta)
    }

    #[inline]
    fn from_null() -> Result<Self, CodecError> {
        Ok(None)
    }

    fn from_resolved(value: Box<dyn Polymorphic>, meta: &TypeMeta) -> Result<Self, CodecError> {
        E::from_resolved(value, meta).map(Some)
    }

    fn from_untagged(value: Dynamic) -> Option<Self> {
        E::from_untagged(value).map(Some)
    }

    #[inline]
    fn element_type_id() -> TypeId {
        E::element_type_id()
    }
}

// -----------------------------------------------------------------------------
// SlotShape

/// A field type that a slot converter can handle.
///
/// | field type                       | kind         |
/// |----------------------------------|--------------|
/// | `Box<dyn Trait>`, [`Dynamic`]    | `Object`     |
/// | `Vec<E>`                         | `List`       |
/// | `BTreeMap<String, E>`, `HashMap` | `Dictionary` |
/// | `Option<S>`                      | kind of `S`  |
///
/// `E` is any [`SlotElement`]. Maps with non-string keys and lists of
/// concrete types implement no `SlotShape`, so annotating them fails to
/// compile.
pub trait SlotShape: TypePath + Sized {
    const KIND: SlotKind;

    /// Returns the root value to write, `None` for absent values.
    fn as_root(&self) -> Option<&dyn Polymorphic>;

    /// Returns `true` if a tagged root of the registered type fits this field.
    fn is_assignable(meta: &TypeMeta) -> bool;

    /// Reads the field from its JSON node.
    fn read_root(node: Value, policy: &TypeDiscriminatorPolicy) -> Result<Self, CodecError>;
}

impl<D: ?Sized + DeclaredType> SlotShape for Box<D> {
    const KIND: SlotKind = SlotKind::Object;

    #[inline]
    fn as_root(&self) -> Option<&dyn Polymorphic> {
        Some((**self).upcast())
    }

    #[inline]
    fn is_assignable(meta: &TypeMeta) -> bool {
        <Self as SlotElement>::is_assignable(meta)
    }

    fn read_root(node: Value, policy: &TypeDiscriminatorPolicy) -> Result<Self, CodecError> {
        read::read_element(node, policy)
    }
}

impl SlotShape for Dynamic {
    const KIND: SlotKind = SlotKind::Object;

    #[inline]
    fn as_root(&self) -> Option<&dyn Polymorphic> {
        self.as_polymorphic()
    }

    #[inline]
    fn is_assignable(meta: &TypeMeta) -> bool {
        <Self as SlotElement>::is_assignable(meta)
    }

    fn read_root(node: Value, policy: &TypeDiscriminatorPolicy) -> Result<Self, CodecError> {
        read::read_element(node, policy)
    }
}

impl<S: SlotShape> SlotShape for Option<S> {
    const KIND: SlotKind = S::KIND;

    #[inline]
    fn as_root(&self) -> Option<&dyn Polymorphic> {
        self.as_ref().and_then(S::as_root)
    }

    #[inline]
    fn is_assignable(meta: &TypeMeta) -> bool {
        S::is_assignable(meta)
    }

    fn read_root(node: Value, policy: &TypeDiscriminatorPolicy) -> Result<Self, CodecError> {
        match node {
            Value::Null => Ok(None),
            node => S::read_root(node, policy).map(Some),
        }
    }
}

/// A tagged container fits when its kind matches and its elements are `E`.
/// Elements of "any" accept every container of the kind.
fn container_fits<E: SlotElement>(meta: &TypeMeta, kind: ValueKind) -> bool {
    meta.kind() == kind
        && (E::ACCEPTS_UNTAGGED
            || meta
                .get_trait::<TypeTraitElement>()
                .is_some_and(TypeTraitElement::fits::<E>))
}

impl<E: SlotElement> SlotShape for Vec<E> {
    const KIND: SlotKind = SlotKind::List;

    #[inline]
    fn as_root(&self) -> Option<&dyn Polymorphic> {
        Some(self)
    }

    #[inline]
    fn is_assignable(meta: &TypeMeta) -> bool {
        container_fits::<E>(meta, ValueKind::Sequence)
    }

    fn read_root(node: Value, policy: &TypeDiscriminatorPolicy) -> Result<Self, CodecError> {
        read::read_sequence::<Self>(node, policy)?
            .into_iter()
            .map(|item| read::read_element(item, policy))
            .collect()
    }
}

impl<E: SlotElement> SlotShape for BTreeMap<String, E> {
    const KIND: SlotKind = SlotKind::Dictionary;

    #[inline]
    fn as_root(&self) -> Option<&dyn Polymorphic> {
        Some(self)
    }

    #[inline]
    fn is_assignable(meta: &TypeMeta) -> bool {
        container_fits::<E>(meta, ValueKind::Map)
    }

    fn read_root(node: Value, policy: &TypeDiscriminatorPolicy) -> Result<Self, CodecError> {
        read::read_dictionary::<Self>(node, policy)?
            .into_iter()
            .map(|(key, value)| read::read_element(value, policy).map(|value| (key, value)))
            .collect()
    }
}

impl<E: SlotElement> SlotShape for HashMap<String, E> {
    const KIND: SlotKind = SlotKind::Dictionary;

    #[inline]
    fn as_root(&self) -> Option<&dyn Polymorphic> {
        Some(self)
    }

    #[inline]
    fn is_assignable(meta: &TypeMeta) -> bool {
        container_fits::<E>(meta, ValueKind::Map)
    }

    fn read_root(node: Value, policy: &TypeDiscriminatorPolicy) -> Result<Self, CodecError> {
        read::read_dictionary::<Self>(node, policy)?
            .into_iter()
            .map(|(key, value)| read::read_element(value, policy).map(|value| (key, value)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::collections::BTreeMap;
    use alloc::string::String;
    use alloc::vec::Vec;
    use std::collections::HashMap;

    use serde_json::json;

    use super::{DeclaredType, SlotKind, SlotShape};
    use crate::Dynamic;
    use crate::codec::scope::CodecScope;
    use crate::error::ErrorKind;
    use crate::testing::{self, Circle, Shape, Square};

    #[test]
    fn kinds() {
        assert_eq!(<Box<dyn Shape>>::KIND, SlotKind::Object);
        assert_eq!(<Option<Dynamic>>::KIND, SlotKind::Object);
        assert_eq!(<Vec<Option<Box<dyn Shape>>>>::KIND, SlotKind::List);
        assert_eq!(<BTreeMap<String, Dynamic>>::KIND, SlotKind::Dictionary);
    }

    #[test]
    fn read_tagged_elements() {
        let policy = testing::policy(false);
        let shapes = <Vec<Box<dyn Shape>>>::read_root(
            json!([
                { "$type": "Circle-id", "radius": 2 },
                { "$type": "Square-id", "side": 3 },
            ]),
            &policy,
        )
        .unwrap();

        assert_eq!(shapes[0].upcast().downcast_ref(), Some(&Circle { radius: 2 }));
        assert_eq!(shapes[1].upcast().downcast_ref(), Some(&Square { side: 3 }));
    }

    #[test]
    fn null_elements() {
        let policy = testing::policy(false);

        let shapes =
            <Vec<Option<Box<dyn Shape>>>>::read_root(json!([null]), &policy).unwrap();
        assert!(shapes[0].is_none());

        let error = <Vec<Box<dyn Shape>>>::read_root(json!([null]), &policy).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Structural);
    }

    #[test]
    fn resolved_type_must_be_assignable() {
        let policy = testing::policy(false);
        let error = <Box<dyn Shape>>::read_root(
            json!({ "$type": "Hashtable-id", "a": 1 }),
            &policy,
        )
        .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::TypeMismatch);

        // "Any" accepts every registered type.
        let _scope = CodecScope::enter(&policy);
        let value =
            Dynamic::read_root(json!({ "$type": "Hashtable-id", "a": 1 }), &policy).unwrap();
        assert_eq!(value.as_map().and_then(|m| m.get("a")).and_then(Dynamic::as_i64), Some(1));
    }

    #[test]
    fn dictionary_requires_a_tag() {
        let policy = testing::policy(false);
        let error = <BTreeMap<String, Box<dyn Shape>>>::read_root(
            json!({ "a": { "$type": "Circle-id", "radius": 2 } }),
            &policy,
        )
        .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::MissingDiscriminator);

        let error = <BTreeMap<String, Dynamic>>::read_root(json!([]), &policy).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Structural);
    }

    #[test]
    fn untagged_object_for_declared_trait() {
        let policy = testing::policy(false);
        let error = <Box<dyn Shape>>::read_root(json!({ "radius": 2 }), &policy).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::MissingDiscriminator);

        let error = <Box<dyn Shape>>::read_root(json!(2), &policy).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::MissingDiscriminator);
    }

    #[test]
    fn wrapped_sequence_tag_must_be_a_sequence() {
        let policy = testing::policy(false);
        let error = <Vec<Box<dyn Shape>>>::read_root(
            json!({ "$type": "Circle-id", "$values": [] }),
            &policy,
        )
        .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::TypeMismatch);
    }

    #[test]
    fn tagged_container_elements_must_fit() {
        let policy = testing::policy(false);
        let circles = json!([{ "$type": "Circle-id", "radius": 2 }]);

        let error = <Vec<Box<dyn Shape>>>::read_root(
            json!({ "$type": "ArrayList-id", "$values": circles.clone() }),
            &policy,
        )
        .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::TypeMismatch);

        let error = <BTreeMap<String, Box<dyn Shape>>>::read_root(
            json!({ "$type": "Hashtable-id", "a": { "$type": "Circle-id", "radius": 2 } }),
            &policy,
        )
        .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::TypeMismatch);

        // Same elements in another container type, or behind `Option`.
        let shapes = <Vec<Option<Box<dyn Shape>>>>::read_root(
            json!({ "$type": "List<IShape>-id", "$values": circles.clone() }),
            &policy,
        )
        .unwrap();
        assert_eq!(shapes.len(), 1);

        let shapes = <HashMap<String, Box<dyn Shape>>>::read_root(
            json!({
                "$type": "Dictionary<String,IShape>-id",
                "a": { "$type": "Circle-id", "radius": 2 },
            }),
            &policy,
        )
        .unwrap();
        assert_eq!(shapes["a"].area(), 12);

        // "Any" elements take every sequence type.
        let _scope = CodecScope::enter(&policy);
        let values = <Vec<Dynamic>>::read_root(
            json!({ "$type": "List<IShape>-id", "$values": circles }),
            &policy,
        )
        .unwrap();
        assert_eq!(values[0].downcast_ref(), Some(&Circle { radius: 2 }));
    }
}
