use alloc::boxed::Box;
use core::any::TypeId;
use std::sync::{PoisonError, RwLock};

use log::debug;
use pj_utils::TypeIdMap;

use crate::error::CodecError;
use crate::slot::{SlotConverter, SlotKind, SlotShape, WrapArrays};

/// The converter installed on one field type.
#[derive(Debug)]
pub struct SlotDescriptor {
    declared: &'static str,
    kind: SlotKind,
    converter: &'static SlotConverter,
}

impl SlotDescriptor {
    /// The type path of the field type.
    #[inline]
    pub const fn declared(&self) -> &'static str {
        self.declared
    }

    #[inline]
    pub const fn kind(&self) -> SlotKind {
        self.kind
    }

    #[inline]
    pub const fn converter(&self) -> &'static SlotConverter {
        self.converter
    }
}

// Indexed by `WrapArrays`.
type DescriptorPair = [Option<&'static SlotDescriptor>; 2];

static DESCRIPTORS: RwLock<TypeIdMap<DescriptorPair>> = RwLock::new(TypeIdMap::new());

/// Validates field types against the slot they are annotated with.
///
/// The first use of a field type with a converter checks the pair and
/// installs a [`SlotDescriptor`]. Later uses only read the cached table.
///
/// ```
/// use pj_codec::slot::{SchemaDecorator, SlotConverter, SlotKind};
/// use pj_codec::Dynamic;
///
/// let descriptor = SchemaDecorator::decorate::<Vec<Dynamic>>(SlotConverter::LIST).unwrap();
/// assert_eq!(descriptor.kind(), SlotKind::List);
///
/// // A list converter on a single-value field.
/// assert!(SchemaDecorator::decorate::<Dynamic>(SlotConverter::LIST).is_err());
/// ```
pub struct SchemaDecorator;

impl SchemaDecorator {
    /// Returns the descriptor of `T` under `requested`, installing it on first use.
    pub fn decorate<T: SlotShape>(
        requested: &'static SlotConverter,
    ) -> Result<&'static SlotDescriptor, CodecError> {
        if !requested.can_handle::<T>() {
            return Err(CodecError::configuration(alloc::format!(
                "`{}` is a {} slot and cannot use the {} slot converter",
                T::type_path(),
                T::KIND,
                requested.kind(),
            )));
        }

        Ok(install::<T>(requested))
    }

    /// Returns the descriptor `auto` installs for `T`.
    #[inline]
    pub fn infer<T: SlotShape>(wrap: WrapArrays) -> &'static SlotDescriptor {
        install::<T>(SlotConverter::get(T::KIND, wrap))
    }
}

fn install<T: SlotShape>(converter: &'static SlotConverter) -> &'static SlotDescriptor {
    let index = wrap_index(converter.wrap());
    let type_id = TypeId::of::<T>();

    let cached = DESCRIPTORS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&type_id)
        .and_then(|pair| pair[index]);
    if let Some(descriptor) = cached {
        return descriptor;
    }

    let mut table = DESCRIPTORS.write().unwrap_or_else(PoisonError::into_inner);
    let pair = table.get_or_insert(type_id, || [None; 2]);
    *pair[index].get_or_insert_with(|| {
        debug!(
            "installed {} slot converter for `{}` (wrap: {:?})",
            T::KIND,
            T::type_path(),
            converter.wrap(),
        );
        &*Box::leak(Box::new(SlotDescriptor {
            declared: T::type_path(),
            kind: T::KIND,
            converter,
        }))
    })
}

#[inline]
const fn wrap_index(wrap: WrapArrays) -> usize {
    match wrap {
        WrapArrays::Inherit => 0,
        WrapArrays::Always => 1,
    }
}

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::collections::BTreeMap;
    use alloc::string::String;
    use core::ptr;

    use super::SchemaDecorator;
    use crate::error::ErrorKind;
    use crate::slot::{SlotConverter, SlotKind, WrapArrays};
    use crate::testing::Shape;

    #[test]
    fn cached_once_per_wrap_setting() {
        type Field = BTreeMap<String, Box<dyn Shape>>;

        let first = SchemaDecorator::decorate::<Field>(SlotConverter::DICTIONARY).unwrap();
        let second = SchemaDecorator::decorate::<Field>(SlotConverter::DICTIONARY).unwrap();
        let forced =
            SchemaDecorator::decorate::<Field>(SlotConverter::DICTIONARY_WITH_ARRAYS).unwrap();

        assert!(ptr::eq(first, second));
        assert!(!ptr::eq(first, forced));
        assert_eq!(forced.converter().wrap(), WrapArrays::Always);
        assert_eq!(first.kind(), SlotKind::Dictionary);
        assert_eq!(
            first.declared(),
            "alloc::collections::BTreeMap<alloc::string::String, alloc::boxed::Box<dyn shapes::Shape>>"
        );
    }

    #[test]
    fn rejects_mismatched_annotation() {
        let error = SchemaDecorator::decorate::<Box<dyn Shape>>(SlotConverter::LIST).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn infer_follows_the_field_type() {
        let descriptor = SchemaDecorator::infer::<Option<Box<dyn Shape>>>(WrapArrays::Always);
        assert_eq!(descriptor.converter(), SlotConverter::OBJECT_WITH_ARRAYS);
    }
}
