use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;
use std::collections::HashMap;

use serde::de::DeserializeOwned;

use crate::registry::{FromType, GetTypeMeta, TypeMeta, TypeTraitDeserialize, TypeTraitElement};
use crate::slot::SlotElement;
use crate::value::{Polymorphic, Typed, ValueKind, ValueRef};

// -----------------------------------------------------------------------------
// Scalars

macro_rules! impl_scalar {
    ($($ty:ty),* $(,)?) => {$(
        impl Typed for $ty {
            const KIND: ValueKind = ValueKind::Scalar;
        }

        impl Polymorphic for $ty {
            #[inline]
            fn value_ref(&self) -> ValueRef<'_> {
                ValueRef::Scalar(self)
            }
        }
    )*};
}

// `String` is iterable but stays a scalar.
impl_scalar!(
    bool, char, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64,
    String, serde_json::Number, serde_json::Value,
);

// -----------------------------------------------------------------------------
// Containers

impl<E: SlotElement> Typed for Vec<E> {
    const KIND: ValueKind = ValueKind::Sequence;
}

impl<E: SlotElement> Polymorphic for Vec<E> {
    fn value_ref(&self) -> ValueRef<'_> {
        ValueRef::Sequence(Box::new(self.iter().map(E::as_polymorphic)))
    }
}

impl<E: SlotElement> Typed for BTreeMap<String, E> {
    const KIND: ValueKind = ValueKind::Map;
}

impl<E: SlotElement> Polymorphic for BTreeMap<String, E> {
    fn value_ref(&self) -> ValueRef<'_> {
        ValueRef::Map(Box::new(
            self.iter().map(|(key, value)| (key.as_str(), value.as_polymorphic())),
        ))
    }
}

impl<E: SlotElement> Typed for HashMap<String, E> {
    const KIND: ValueKind = ValueKind::Map;
}

impl<E: SlotElement> Polymorphic for HashMap<String, E> {
    fn value_ref(&self) -> ValueRef<'_> {
        ValueRef::Map(Box::new(
            self.iter().map(|(key, value)| (key.as_str(), value.as_polymorphic())),
        ))
    }
}

macro_rules! impl_container_meta {
    ($($ty:ty),*) => {$(
        impl<E: SlotElement + DeserializeOwned> GetTypeMeta for $ty {
            fn get_type_meta() -> TypeMeta {
                let mut meta = TypeMeta::of::<Self>();
                meta.insert_trait::<TypeTraitDeserialize>(FromType::<Self>::from_type());
                meta.insert_trait::<TypeTraitElement>(FromType::<Self>::from_type());
                meta
            }
        }
    )*};
}

impl_container_meta!(Vec<E>, BTreeMap<String, E>, HashMap<String, E>);

#[cfg(test)]
mod tests {
    use alloc::collections::BTreeMap;
    use alloc::string::String;
    use alloc::vec;

    use crate::Dynamic;
    use crate::value::{ValueKind, classify};

    #[test]
    fn scalars_are_never_sequences() {
        assert_eq!(classify(&String::from("abc")), ValueKind::Scalar);
        assert_eq!(classify(&'c'), ValueKind::Scalar);
        assert_eq!(classify(&serde_json::json!([1, 2])), ValueKind::Scalar);
    }

    #[test]
    fn containers() {
        assert_eq!(classify(&vec![Dynamic::Null]), ValueKind::Sequence);

        let mut map = BTreeMap::new();
        map.insert(String::from("a"), Dynamic::from(1));
        assert_eq!(classify(&map), ValueKind::Map);
    }
}
