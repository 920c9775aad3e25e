use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::Polymorphic;
use crate::codec::scope::{self, CodecScope, raise_de, raise_ser};
use crate::codec::write::WriteNode;
use crate::error::CodecError;
use crate::policy::TypeDiscriminatorPolicy;
use crate::slot::{SchemaDecorator, SlotKind, SlotShape};

/// Where a converter takes its `wrap_arrays` setting from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WrapArrays {
    /// Use the policy of the current call.
    Inherit,
    /// Wrap wrap-eligible sequences whatever the policy says.
    Always,
}

// -----------------------------------------------------------------------------
// SlotConverter

/// The converter installed on one polymorphic slot.
///
/// There is one singleton per `(SlotKind, WrapArrays)` pair. Converters hold
/// no state: the policy is taken from the current call.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct SlotConverter {
    kind: SlotKind,
    wrap: WrapArrays,
}

impl SlotConverter {
    pub const OBJECT: &'static Self = &Self::new(SlotKind::Object, WrapArrays::Inherit);
    pub const OBJECT_WITH_ARRAYS: &'static Self = &Self::new(SlotKind::Object, WrapArrays::Always);
    pub const LIST: &'static Self = &Self::new(SlotKind::List, WrapArrays::Inherit);
    pub const LIST_WITH_ARRAYS: &'static Self = &Self::new(SlotKind::List, WrapArrays::Always);
    pub const DICTIONARY: &'static Self = &Self::new(SlotKind::Dictionary, WrapArrays::Inherit);
    pub const DICTIONARY_WITH_ARRAYS: &'static Self =
        &Self::new(SlotKind::Dictionary, WrapArrays::Always);

    const fn new(kind: SlotKind, wrap: WrapArrays) -> Self {
        Self { kind, wrap }
    }

    /// Returns the singleton for a slot kind and wrap setting.
    pub const fn get(kind: SlotKind, wrap: WrapArrays) -> &'static Self {
        match (kind, wrap) {
            (SlotKind::Object, WrapArrays::Inherit) => Self::OBJECT,
            (SlotKind::Object, WrapArrays::Always) => Self::OBJECT_WITH_ARRAYS,
            (SlotKind::List, WrapArrays::Inherit) => Self::LIST,
            (SlotKind::List, WrapArrays::Always) => Self::LIST_WITH_ARRAYS,
            (SlotKind::Dictionary, WrapArrays::Inherit) => Self::DICTIONARY,
            (SlotKind::Dictionary, WrapArrays::Always) => Self::DICTIONARY_WITH_ARRAYS,
        }
    }

    #[inline]
    pub const fn kind(&self) -> SlotKind {
        self.kind
    }

    #[inline]
    pub const fn wrap(&self) -> WrapArrays {
        self.wrap
    }

    /// Returns `true` if fields of type `T` can use this converter.
    #[inline]
    pub fn can_handle<T: SlotShape>(&self) -> bool {
        T::KIND == self.kind
    }

    /// The effective `wrap_arrays` under `policy`.
    #[inline]
    pub fn wrap_arrays(&self, policy: &TypeDiscriminatorPolicy) -> bool {
        self.wrap == WrapArrays::Always || policy.wrap_arrays()
    }

    // -------------------------------------------------------------------------
    // serde side, policy taken from the current call

    /// Writes a field as this slot.
    pub fn serialize<T: SlotShape, S: Serializer>(
        self: &'static Self,
        value: &T,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        SchemaDecorator::decorate::<T>(self).map_err(raise_ser::<S::Error>)?;
        self.serialize_value(value.as_root(), serializer)
    }

    /// Writes an already upcast value as the root of this slot.
    pub fn serialize_value<S: Serializer>(
        &self,
        value: Option<&dyn Polymorphic>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let policy = scope::active_policy().map_err(raise_ser::<S::Error>)?;
        WriteNode::root(value, self.kind, self.wrap_arrays(&policy), &policy).serialize(serializer)
    }

    /// Reads a field as this slot.
    pub fn deserialize<'de, T: SlotShape, D: Deserializer<'de>>(
        self: &'static Self,
        deserializer: D,
    ) -> Result<T, D::Error> {
        SchemaDecorator::decorate::<T>(self).map_err(raise_de::<D::Error>)?;
        let policy = scope::active_policy().map_err(raise_de::<D::Error>)?;
        let node = Value::deserialize(deserializer)?;
        T::read_root(node, &policy).map_err(raise_de)
    }

    // -------------------------------------------------------------------------
    // Standalone, with an explicit policy

    /// Writes `value` as the root of this slot into a JSON tree.
    pub fn write<T: SlotShape>(
        self: &'static Self,
        policy: &TypeDiscriminatorPolicy,
        value: &T,
    ) -> Result<Value, CodecError> {
        let scope = CodecScope::enter(policy);
        let result = serde_json::to_value(SlotValue {
            converter: self,
            value,
        });
        scope.finish(result)
    }

    /// Reads the root of this slot from a JSON tree.
    pub fn read<T: SlotShape>(
        self: &'static Self,
        policy: &TypeDiscriminatorPolicy,
        node: Value,
    ) -> Result<T, CodecError> {
        SchemaDecorator::decorate::<T>(self)?;
        let scope = CodecScope::enter(policy);
        let result = T::read_root(node, policy);
        scope.settle(result)
    }
}

/// A field value paired with the converter it is written with.
pub(crate) struct SlotValue<'a, T> {
    pub(crate) converter: &'static SlotConverter,
    pub(crate) value: &'a T,
}

impl<T: SlotShape> Serialize for SlotValue<'_, T> {
    #[inline]
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.converter.serialize(self.value, serializer)
    }
}

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::vec;
    use alloc::vec::Vec;

    use serde_json::json;

    use super::{SlotConverter, WrapArrays};
    use crate::Dynamic;
    use crate::error::ErrorKind;
    use crate::slot::SlotKind;
    use crate::testing::{self, Circle, Shape};

    #[test]
    fn six_singletons() {
        let mut all = Vec::new();
        for kind in [SlotKind::Object, SlotKind::List, SlotKind::Dictionary] {
            for wrap in [WrapArrays::Inherit, WrapArrays::Always] {
                let converter = SlotConverter::get(kind, wrap);
                assert_eq!(converter.kind(), kind);
                assert_eq!(converter.wrap(), wrap);
                assert!(!all.contains(&converter));
                all.push(converter);
            }
        }
        assert_eq!(
            SlotConverter::get(SlotKind::List, WrapArrays::Always),
            SlotConverter::LIST_WITH_ARRAYS
        );
    }

    #[test]
    fn can_handle() {
        assert!(SlotConverter::OBJECT.can_handle::<Box<dyn Shape>>());
        assert!(SlotConverter::LIST.can_handle::<Vec<Dynamic>>());
        assert!(!SlotConverter::LIST.can_handle::<Dynamic>());
        assert!(!SlotConverter::DICTIONARY.can_handle::<Vec<Box<dyn Shape>>>());
    }

    #[test]
    fn forced_wrap_ignores_policy() {
        let policy = testing::policy(false);
        let shapes: Vec<Box<dyn Shape>> = vec![Box::new(Circle { radius: 2 })];

        let value = SlotConverter::LIST_WITH_ARRAYS.write(&policy, &shapes).unwrap();
        assert_eq!(
            value,
            json!({
                "$type": "List<IShape>-id",
                "$values": [{ "$type": "Circle-id", "radius": 2 }],
            })
        );

        let value = SlotConverter::LIST.write(&policy, &shapes).unwrap();
        assert_eq!(value, json!([{ "$type": "Circle-id", "radius": 2 }]));
    }

    #[test]
    fn wrong_kind_is_a_configuration_error() {
        let policy = testing::policy(false);
        let error = SlotConverter::DICTIONARY
            .write(&policy, &Vec::<Dynamic>::new())
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Configuration);

        let error = SlotConverter::OBJECT
            .read::<Vec<Dynamic>>(&policy, json!([]))
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn outside_of_a_call() {
        let error = serde_json::to_string(&Dynamic::from(1)).unwrap_err();
        assert!(error.to_string().contains("outside of a codec call"));
    }
}
