//! Modules for `#[serde(with = "..")]`, one per converter.

macro_rules! slot_module {
    ($(#[$doc:meta])* $name:ident => $converter:ident) => {
        $(#[$doc])*
        pub mod $name {
            use serde::{Deserializer, Serializer};

            use crate::slot::{SlotConverter, SlotShape};

            #[inline]
            pub fn serialize<T: SlotShape, S: Serializer>(
                value: &T,
                serializer: S,
            ) -> Result<S::Ok, S::Error> {
                SlotConverter::$converter.serialize(value, serializer)
            }

            #[inline]
            pub fn deserialize<'de, T: SlotShape, D: Deserializer<'de>>(
                deserializer: D,
            ) -> Result<T, D::Error> {
                SlotConverter::$converter.deserialize(deserializer)
            }
        }
    };
}

slot_module!(
    /// A single polymorphic value, `Box<dyn Trait>` or [`Dynamic`](crate::Dynamic).
    object => OBJECT
);
slot_module!(
    /// Like `object`, always wrapping a sequence held by the field.
    object_with_arrays => OBJECT_WITH_ARRAYS
);
slot_module!(
    /// A `Vec` of polymorphic values.
    list => LIST
);
slot_module!(
    /// Like `list`, always wrapping the list and its nested sequences.
    list_with_arrays => LIST_WITH_ARRAYS
);
slot_module!(
    /// A `BTreeMap` or `HashMap` from `String` to polymorphic values.
    dictionary => DICTIONARY
);
slot_module!(
    /// Like `dictionary`, always wrapping nested sequences.
    dictionary_with_arrays => DICTIONARY_WITH_ARRAYS
);

macro_rules! auto_module {
    ($(#[$doc:meta])* $name:ident => $wrap:ident) => {
        $(#[$doc])*
        pub mod $name {
            use serde::{Deserializer, Serializer};

            use crate::slot::{SchemaDecorator, SlotShape, WrapArrays};

            #[inline]
            pub fn serialize<T: SlotShape, S: Serializer>(
                value: &T,
                serializer: S,
            ) -> Result<S::Ok, S::Error> {
                SchemaDecorator::infer::<T>(WrapArrays::$wrap)
                    .converter()
                    .serialize(value, serializer)
            }

            #[inline]
            pub fn deserialize<'de, T: SlotShape, D: Deserializer<'de>>(
                deserializer: D,
            ) -> Result<T, D::Error> {
                SchemaDecorator::infer::<T>(WrapArrays::$wrap)
                    .converter()
                    .deserialize(deserializer)
            }
        }
    };
}

auto_module!(
    /// Picks the slot kind from the field type.
    auto => Inherit
);
auto_module!(
    /// Like `auto`, always wrapping sequences.
    auto_with_arrays => Always
);
