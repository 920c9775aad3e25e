//! Entry points.
//!
//! Every call takes its policy explicitly and installs it for the duration of
//! the call, so annotated slots anywhere in the value use it.
//!
//! - General: [`to_string`], [`to_value`], [`from_str`], .. for any serde
//!   type with annotated slots.
//! - Collections: [`list_to_string`], [`dictionary_from_str`], .. for a bare
//!   list or dictionary slot, without a containing type.

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::codec::scope::CodecScope;
use crate::error::CodecError;
use crate::policy::TypeDiscriminatorPolicy;
use crate::slot::{SlotConverter, SlotShape, SlotValue};
use crate::value::Dynamic;

// -----------------------------------------------------------------------------
// General

/// Serializes `value` to a JSON string.
pub fn to_string<T: ?Sized + Serialize>(
    value: &T,
    policy: &TypeDiscriminatorPolicy,
) -> Result<String, CodecError> {
    let scope = CodecScope::enter(policy);
    scope.finish(serde_json::to_string(value))
}

/// Serializes `value` to a pretty-printed JSON string.
pub fn to_string_pretty<T: ?Sized + Serialize>(
    value: &T,
    policy: &TypeDiscriminatorPolicy,
) -> Result<String, CodecError> {
    let scope = CodecScope::enter(policy);
    scope.finish(serde_json::to_string_pretty(value))
}

/// Serializes `value` to JSON bytes.
pub fn to_vec<T: ?Sized + Serialize>(
    value: &T,
    policy: &TypeDiscriminatorPolicy,
) -> Result<Vec<u8>, CodecError> {
    let scope = CodecScope::enter(policy);
    scope.finish(serde_json::to_vec(value))
}

/// Serializes `value` to a JSON tree.
pub fn to_value<T: ?Sized + Serialize>(
    value: &T,
    policy: &TypeDiscriminatorPolicy,
) -> Result<Value, CodecError> {
    let scope = CodecScope::enter(policy);
    scope.finish(serde_json::to_value(value))
}

/// Deserializes a `T` from a JSON string.
///
/// ```
/// use std::sync::Arc;
/// use pj_codec::policy::TypeDiscriminatorPolicy;
/// use pj_codec::registry::TypeRegistry;
/// use pj_codec::Dynamic;
///
/// let policy = TypeDiscriminatorPolicy::new(Arc::new(TypeRegistry::new()));
/// let value: Dynamic = pj_codec::from_str(r#"{ "a": [1, "two"] }"#, &policy).unwrap();
///
/// let list = value.as_map().and_then(|m| m.get("a")).and_then(Dynamic::as_list).unwrap();
/// assert_eq!(list[1].as_str(), Some("two"));
/// ```
pub fn from_str<T: DeserializeOwned>(
    json: &str,
    policy: &TypeDiscriminatorPolicy,
) -> Result<T, CodecError> {
    let scope = CodecScope::enter(policy);
    scope.finish(serde_json::from_str(json))
}

/// Deserializes a `T` from JSON bytes.
pub fn from_slice<T: DeserializeOwned>(
    json: &[u8],
    policy: &TypeDiscriminatorPolicy,
) -> Result<T, CodecError> {
    let scope = CodecScope::enter(policy);
    scope.finish(serde_json::from_slice(json))
}

/// Deserializes a `T` from a JSON tree.
pub fn from_value<T: DeserializeOwned>(
    value: Value,
    policy: &TypeDiscriminatorPolicy,
) -> Result<T, CodecError> {
    let scope = CodecScope::enter(policy);
    scope.finish(serde_json::from_value(value))
}

// -----------------------------------------------------------------------------
// Collections

/// Serializes a bare list slot, `Vec<E>`, to a JSON string.
///
/// Any other collection type is a configuration error.
pub fn list_to_string<L: SlotShape>(
    list: &L,
    policy: &TypeDiscriminatorPolicy,
) -> Result<String, CodecError> {
    to_string(&slot_value(SlotConverter::LIST, list), policy)
}

/// Serializes a bare list slot to a JSON tree.
pub fn list_to_value<L: SlotShape>(
    list: &L,
    policy: &TypeDiscriminatorPolicy,
) -> Result<Value, CodecError> {
    SlotConverter::LIST.write(policy, list)
}

/// Deserializes a bare list slot from its bare or wrapped form.
pub fn list_from_str<L: SlotShape>(
    json: &str,
    policy: &TypeDiscriminatorPolicy,
) -> Result<L, CodecError> {
    list_from_value(serde_json::from_str(json)?, policy)
}

pub fn list_from_value<L: SlotShape>(
    value: Value,
    policy: &TypeDiscriminatorPolicy,
) -> Result<L, CodecError> {
    SlotConverter::LIST.read(policy, value)
}

/// Serializes a bare dictionary slot, `BTreeMap<String, E>` or
/// `HashMap<String, E>`, to a JSON string.
pub fn dictionary_to_string<M: SlotShape>(
    map: &M,
    policy: &TypeDiscriminatorPolicy,
) -> Result<String, CodecError> {
    to_string(&slot_value(SlotConverter::DICTIONARY, map), policy)
}

pub fn dictionary_to_value<M: SlotShape>(
    map: &M,
    policy: &TypeDiscriminatorPolicy,
) -> Result<Value, CodecError> {
    SlotConverter::DICTIONARY.write(policy, map)
}

/// Deserializes a bare dictionary slot from its tagged form.
pub fn dictionary_from_str<M: SlotShape>(
    json: &str,
    policy: &TypeDiscriminatorPolicy,
) -> Result<M, CodecError> {
    dictionary_from_value(serde_json::from_str(json)?, policy)
}

pub fn dictionary_from_value<M: SlotShape>(
    value: Value,
    policy: &TypeDiscriminatorPolicy,
) -> Result<M, CodecError> {
    SlotConverter::DICTIONARY.read(policy, value)
}

/// [`list_from_str`] with untyped elements.
#[inline]
pub fn list_of_objects_from_str(
    json: &str,
    policy: &TypeDiscriminatorPolicy,
) -> Result<Vec<Dynamic>, CodecError> {
    list_from_str(json, policy)
}

/// [`list_from_value`] with untyped elements.
#[inline]
pub fn list_of_objects_from_value(
    value: Value,
    policy: &TypeDiscriminatorPolicy,
) -> Result<Vec<Dynamic>, CodecError> {
    list_from_value(value, policy)
}

/// [`dictionary_from_str`] with untyped values.
#[inline]
pub fn dictionary_of_objects_from_str(
    json: &str,
    policy: &TypeDiscriminatorPolicy,
) -> Result<BTreeMap<String, Dynamic>, CodecError> {
    dictionary_from_str(json, policy)
}

/// [`dictionary_from_value`] with untyped values.
#[inline]
pub fn dictionary_of_objects_from_value(
    value: Value,
    policy: &TypeDiscriminatorPolicy,
) -> Result<BTreeMap<String, Dynamic>, CodecError> {
    dictionary_from_value(value, policy)
}

#[inline]
fn slot_value<'a, T>(converter: &'static SlotConverter, value: &'a T) -> SlotValue<'a, T> {
    SlotValue { converter, value }
}

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::collections::BTreeMap;
    use alloc::string::String;
    use alloc::sync::Arc;
    use alloc::vec;
    use alloc::vec::Vec;
    use std::collections::HashMap;

    use serde::{Deserialize, Serialize};
    use serde_json::json;

    use crate::error::{CodecError, ErrorKind};
    use crate::policy::TypeDiscriminatorPolicy;
    use crate::registry::TypeRegistry;
    use crate::slot::DeclaredType;
    use crate::testing::{self, Circle, Shape, Square};
    use crate::{Dynamic, DynamicMap};

    fn shapes() -> Vec<Box<dyn Shape>> {
        vec![Box::new(Circle { radius: 2 }), Box::new(Square { side: 3 })]
    }

    fn circle(shape: &dyn Shape) -> Option<&Circle> {
        shape.upcast().downcast_ref()
    }

    fn square(shape: &dyn Shape) -> Option<&Square> {
        shape.upcast().downcast_ref()
    }

    #[derive(Debug, Serialize, Deserialize)]
    struct Drawing {
        #[serde(with = "crate::slot::object")]
        background: Box<dyn Shape>,
        #[serde(with = "crate::slot::object")]
        overlay: Option<Box<dyn Shape>>,
        #[serde(with = "crate::slot::list")]
        layers: Vec<Box<dyn Shape>>,
        #[serde(with = "crate::slot::dictionary")]
        named: BTreeMap<String, Box<dyn Shape>>,
        #[serde(with = "crate::slot::auto")]
        extra: Dynamic,
        title: String,
    }

    fn drawing() -> Drawing {
        let mut named: BTreeMap<String, Box<dyn Shape>> = BTreeMap::new();
        named.insert("sun".into(), Box::new(Circle { radius: 5 }));

        Drawing {
            background: Box::new(Square { side: 10 }),
            overlay: None,
            layers: shapes(),
            named,
            extra: Dynamic::List(vec![Dynamic::from(1), Dynamic::object(Circle { radius: 1 })]),
            title: "sketch".into(),
        }
    }

    // -------------------------------------------------------------------------
    // Scenarios

    #[test]
    fn dictionary_is_tagged() {
        let policy = testing::policy(false);
        let mut map: BTreeMap<String, Box<dyn Shape>> = BTreeMap::new();
        map.insert("a".into(), Box::new(Circle { radius: 2 }));
        map.insert("b".into(), Box::new(Square { side: 3 }));

        let json = super::dictionary_to_string(&map, &policy).unwrap();
        assert_eq!(
            json,
            r#"{"$type":"Dictionary<String,IShape>-id","a":{"$type":"Circle-id","radius":2},"b":{"$type":"Square-id","side":3}}"#
        );

        let map: BTreeMap<String, Box<dyn Shape>> =
            super::dictionary_from_str(&json, &policy).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(circle(&*map["a"]), Some(&Circle { radius: 2 }));
        assert_eq!(square(&*map["b"]), Some(&Square { side: 3 }));
    }

    #[test]
    fn list_is_wrapped() {
        let policy = testing::policy(true);
        let list: Vec<Box<dyn Shape>> = vec![Box::new(Circle { radius: 2 })];

        let json = super::list_to_string(&list, &policy).unwrap();
        assert_eq!(
            json,
            r#"{"$type":"List<IShape>-id","$values":[{"$type":"Circle-id","radius":2}]}"#
        );
    }

    #[test]
    fn bare_list_is_read_under_any_policy() {
        let json = r#"[{"$type":"Circle-id","radius":2}]"#;
        for wrap_arrays in [false, true] {
            let list: Vec<Box<dyn Shape>> =
                super::list_from_str(json, &testing::policy(wrap_arrays)).unwrap();
            assert_eq!(list.len(), 1);
            assert_eq!(circle(&*list[0]), Some(&Circle { radius: 2 }));
        }
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let policy = testing::policy(false);
        let shape: Box<dyn Shape> =
            super::from_str(r#"{"$type":"Circle-id","radius":2,"color":"red"}"#, &policy).unwrap();
        assert_eq!(circle(&*shape), Some(&Circle { radius: 2 }));
        assert_eq!(shape.area(), 12);
    }

    #[test]
    fn disallowed_type_is_never_built() {
        let policy = testing::policy(false);
        let json = r#"{"$type":"System.Diagnostics.Process-id","pid":1}"#;

        let error = super::from_str::<Box<dyn Shape>>(json, &policy).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::DisallowedType);
        let error = super::from_str::<Dynamic>(json, &policy).unwrap_err();
        assert!(matches!(
            error,
            CodecError::DisallowedType { ref id, type_path: "system::diagnostics::Process" }
                if id == "System.Diagnostics.Process-id"
        ));

        let list = alloc::format!("[{json}]");
        let error = super::list_from_str::<Vec<Box<dyn Shape>>>(&list, &policy).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::DisallowedType);
    }

    #[test]
    fn null_object_slot() {
        let policy = testing::policy(true);
        let shape: Option<Box<dyn Shape>> = None;

        let json = super::to_string(&Dynamic::Null, &policy).unwrap();
        assert_eq!(json, "null");

        #[derive(Serialize, Deserialize)]
        struct Holder {
            #[serde(with = "crate::slot::object")]
            shape: Option<Box<dyn Shape>>,
        }

        let json = super::to_string(&Holder { shape }, &policy).unwrap();
        assert_eq!(json, r#"{"shape":null}"#);
        let holder: Holder = super::from_str(&json, &policy).unwrap();
        assert!(holder.shape.is_none());
    }

    // -------------------------------------------------------------------------
    // Invariants

    #[test]
    fn round_trip() {
        for wrap_arrays in [false, true] {
            let policy = testing::policy(wrap_arrays);
            let json = super::to_string(&drawing(), &policy).unwrap();
            let read: Drawing = super::from_str(&json, &policy).unwrap();

            assert_eq!(square(&*read.background), Some(&Square { side: 10 }));
            assert!(read.overlay.is_none());
            assert_eq!(circle(&*read.layers[0]), Some(&Circle { radius: 2 }));
            assert_eq!(square(&*read.layers[1]), Some(&Square { side: 3 }));
            assert_eq!(circle(&*read.named["sun"]), Some(&Circle { radius: 5 }));
            assert_eq!(read.title, "sketch");

            let extra = read.extra.as_list().unwrap();
            assert_eq!(extra[0].as_i64(), Some(1));
            assert_eq!(extra[1].downcast_ref(), Some(&Circle { radius: 1 }));

            assert_eq!(super::to_string(&read, &policy).unwrap(), json);
        }
    }

    #[test]
    fn round_trip_hash_map() {
        let policy = testing::policy(false);
        let mut map: HashMap<String, Box<dyn Shape>> = HashMap::new();
        map.insert("a".into(), Box::new(Circle { radius: 2 }));

        let value = super::dictionary_to_value(&map, &policy).unwrap();
        assert_eq!(
            value,
            json!({
                "$type": "Hashtable<String,IShape>-id",
                "a": { "$type": "Circle-id", "radius": 2 },
            })
        );

        let map: HashMap<String, Box<dyn Shape>> =
            super::dictionary_from_value(value, &policy).unwrap();
        assert_eq!(circle(&*map["a"]), Some(&Circle { radius: 2 }));
    }

    #[test]
    fn tag_precedes_declared_type() {
        let policy = testing::policy(false);

        let value: Dynamic = super::from_str(r#"{"$type":"Square-id","side":3}"#, &policy).unwrap();
        assert_eq!(value.downcast_ref(), Some(&Square { side: 3 }));

        let error = super::from_str::<Box<dyn Shape>>(r#"{"$type":"Hashtable-id"}"#, &policy)
            .unwrap_err();
        assert!(matches!(
            error,
            CodecError::TypeMismatch { type_path: "pj_codec::DynamicMap", .. }
        ));

        // Non-string tags are plain data.
        let value: Dynamic = super::from_str(r#"{"$type":1}"#, &policy).unwrap();
        assert_eq!(value.as_map().and_then(|m| m.get("$type")).and_then(Dynamic::as_i64), Some(1));
    }

    #[test]
    fn bare_and_wrapped_lists_read_alike() {
        let bare = json!([{ "$type": "Circle-id", "radius": 2 }, null, 7]);
        let wrapped = json!({ "$type": "ArrayList-id", "$values": bare.clone() });

        for wrap_arrays in [false, true] {
            let policy = testing::policy(wrap_arrays);
            let from_bare = super::list_of_objects_from_value(bare.clone(), &policy).unwrap();
            let from_wrapped = super::list_of_objects_from_value(wrapped.clone(), &policy).unwrap();

            for list in [&from_bare, &from_wrapped] {
                assert_eq!(list.len(), 3);
                assert_eq!(list[0].downcast_ref(), Some(&Circle { radius: 2 }));
                assert!(list[1].is_null());
                assert_eq!(list[2].as_i64(), Some(7));
            }
        }
    }

    #[test]
    fn wrap_scope_propagation() {
        let policy = testing::policy(true);
        let nested = vec![Dynamic::List(vec![Dynamic::from(1), Dynamic::from(2)])];

        // A list slot keeps nested sequences wrap-eligible.
        let json = super::list_to_string(&nested, &policy).unwrap();
        assert_eq!(
            json,
            r#"{"$type":"ArrayList-id","$values":[{"$type":"ArrayList-id","$values":[1,2]}]}"#
        );

        // An object slot wraps its own sequence only.
        let json = super::to_string(&Dynamic::List(nested), &policy).unwrap();
        assert_eq!(json, r#"{"$type":"ArrayList-id","$values":[[1,2]]}"#);
    }

    #[test]
    fn map_values_inherit_wrap_scope() {
        let policy = testing::policy(true);
        let mut map = BTreeMap::new();
        map.insert(String::from("a"), Dynamic::List(vec![Dynamic::from(1)]));

        let json = super::dictionary_to_string(&map, &policy).unwrap();
        assert_eq!(
            json,
            r#"{"$type":"Dictionary<String,Object>-id","a":{"$type":"ArrayList-id","$values":[1]}}"#
        );

        let inner: DynamicMap = [("a", Dynamic::List(vec![Dynamic::from(1)]))]
            .into_iter()
            .collect();
        let json = super::to_string(&Dynamic::from(inner), &policy).unwrap();
        assert_eq!(json, r#"{"$type":"Hashtable-id","a":[1]}"#);
    }

    #[test]
    fn strings_are_never_sequences() {
        let policy = testing::policy(true);
        let json = super::list_to_string(&vec![Dynamic::from("abc")], &policy).unwrap();
        assert_eq!(json, r#"{"$type":"ArrayList-id","$values":["abc"]}"#);

        let json = super::to_string(&Dynamic::from("abc"), &policy).unwrap();
        assert_eq!(json, r#""abc""#);
    }

    // -------------------------------------------------------------------------
    // Nesting and errors

    #[derive(Debug, Serialize, Deserialize)]
    struct Group {
        #[serde(with = "crate::slot::list")]
        members: Vec<Box<dyn Shape>>,
    }

    impl Shape for Group {
        fn area(&self) -> u32 {
            self.members.iter().map(|member| member.area()).sum()
        }
    }

    crate::impl_polymorphic!((in shapes) Group as [Shape]);

    fn path_policy() -> TypeDiscriminatorPolicy {
        let mut registry = TypeRegistry::new();
        registry.register::<Circle>();
        registry.register::<Group>();
        registry.register_slot::<dyn Shape>();
        TypeDiscriminatorPolicy::new(Arc::new(registry))
    }

    #[test]
    fn nested_slots_use_their_own_converters() {
        let policy = path_policy().with_wrap_arrays(true);
        let group: Box<dyn Shape> = Box::new(Group {
            members: vec![Box::new(Circle { radius: 1 })],
        });

        let value = super::to_value(&group, &policy).unwrap();
        assert_eq!(
            value,
            json!({
                "$type": "shapes::Group",
                "members": {
                    "$type": "alloc::vec::Vec<alloc::boxed::Box<dyn shapes::Shape>>",
                    "$values": [{ "$type": "shapes::Circle", "radius": 1 }],
                },
            })
        );

        let group: Box<dyn Shape> = super::from_value(value, &policy).unwrap();
        assert_eq!(group.area(), 3);
    }

    #[test]
    fn nested_errors_keep_their_kind() {
        let policy = path_policy();
        let json = r#"{"$type":"shapes::Group","members":[{"$type":"shapes::Triangle"}]}"#;

        let error = super::from_str::<Box<dyn Shape>>(json, &policy).unwrap_err();
        assert!(matches!(
            error,
            CodecError::UnknownDiscriminator { ref id } if id == "shapes::Triangle"
        ));

        let error = super::from_slice::<Box<dyn Shape>>(br#"{"$type":"shapes::Circle"}"#, &policy)
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Host);

        // The legacy table has no id for `Group`.
        let group = Dynamic::object(Group { members: Vec::new() });
        let error = super::to_vec(&group, &testing::policy(false)).unwrap_err();
        assert!(matches!(error, CodecError::UnresolvableType { type_path: "shapes::Group" }));
    }

    #[test]
    fn tag_key_in_a_map_is_rejected() {
        let policy = testing::policy(false);
        let mut map = BTreeMap::new();
        map.insert(String::from("$type"), Dynamic::from("Circle-id"));
        map.insert(String::from("radius"), Dynamic::from(2));

        let error = super::dictionary_to_string(&map, &policy).unwrap_err();
        assert!(matches!(error, CodecError::ReservedKey { ref key, .. } if key == "$type"));
        assert_eq!(error.kind(), ErrorKind::Structural);

        let inner: DynamicMap = [("$type", Dynamic::from(1))].into_iter().collect();
        let error = super::to_string(&Dynamic::from(inner), &policy).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Structural);
    }

    #[test]
    fn values_key_outside_sequences_is_data() {
        let policy = testing::policy(false);
        let inner: DynamicMap = [("$values", Dynamic::List(vec![Dynamic::from(1)]))]
            .into_iter()
            .collect();

        let json = super::to_string(&Dynamic::from(inner), &policy).unwrap();
        assert_eq!(json, r#"{"$type":"Hashtable-id","$values":[1]}"#);

        let read: Dynamic = super::from_str(&json, &policy).unwrap();
        let values = read
            .as_map()
            .and_then(|m| m.get("$values"))
            .and_then(Dynamic::as_list)
            .unwrap();
        assert_eq!(values[0].as_i64(), Some(1));

        // Sequence types still need their values.
        let error = super::from_str::<Dynamic>(r#"{"$type":"ArrayList-id"}"#, &policy).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Structural);
    }

    #[test]
    fn untagged_payload_for_declared_trait() {
        let policy = testing::policy(false);
        let error = super::from_str::<Box<dyn Shape>>(r#"{"radius":2}"#, &policy).unwrap_err();
        assert!(matches!(
            error,
            CodecError::MissingDiscriminator { ref tag, .. } if tag == "$type"
        ));
    }

    #[test]
    fn wrong_collection_shape() {
        let policy = testing::policy(false);
        let error =
            super::list_to_string(&BTreeMap::<String, Dynamic>::new(), &policy).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Configuration);

        let error = super::dictionary_of_objects_from_str("[]", &policy).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Structural);

        let error = super::list_of_objects_from_str("[", &policy).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Json);
    }

    #[test]
    fn pretty_output() {
        let policy = testing::policy(false);
        let value = Dynamic::object(Circle { radius: 2 });
        let json = super::to_string_pretty(&value, &policy).unwrap();
        assert_eq!(json, "{\n  \"$type\": \"Circle-id\",\n  \"radius\": 2\n}");
    }
}
