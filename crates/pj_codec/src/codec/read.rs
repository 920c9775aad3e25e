//! The read half of the codec core.
//!
//! Reading is driven by the declared slot type, never by the policy's
//! `wrap_arrays`: bare and wrapped sequences are both accepted everywhere.

use alloc::boxed::Box;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use serde_json::{Map, Value};

use crate::Polymorphic;
use crate::codec::lenient::LenientObject;
use crate::codec::scope;
use crate::error::CodecError;
use crate::policy::TypeDiscriminatorPolicy;
use crate::registry::{TypeMeta, TypeTraitDeserialize};
use crate::slot::{SlotElement, SlotShape};
use crate::value::{Dynamic, DynamicMap, ValueKind};

/// Reads one value into a slot element.
///
/// A tag is resolved before the declared type is considered; the declared
/// type only decides whether the resolved type is acceptable.
pub(crate) fn read_element<E: SlotElement>(
    node: Value,
    policy: &TypeDiscriminatorPolicy,
) -> Result<E, CodecError> {
    let _trail = scope::enter_type(E::type_path());

    let node = match node {
        Value::Null => return E::from_null(),
        Value::Object(mut object) => match take_tag(&mut object, policy) {
            Some(id) => {
                let meta = resolve(&id, E::type_path(), policy, E::is_assignable)?;
                let value = construct(meta, object, policy)?;
                return E::from_resolved(value, meta);
            }
            None => Value::Object(object),
        },
        node => node,
    };

    if E::ACCEPTS_UNTAGGED
        && let Some(element) = E::from_untagged(read_untyped(node, policy)?)
    {
        return Ok(element);
    }
    Err(CodecError::MissingDiscriminator {
        tag: policy.tag_property_name().into(),
        declared: E::type_path(),
    })
}

/// Reads the elements of a list slot, bare or wrapped.
///
/// A wrapper's tag must name a sequence type whose elements fit `S`.
pub(crate) fn read_sequence<S: SlotShape>(
    node: Value,
    policy: &TypeDiscriminatorPolicy,
) -> Result<Vec<Value>, CodecError> {
    let declared = S::type_path();
    match node {
        Value::Array(items) => Ok(items),
        Value::Object(mut object) => {
            let Some(id) = take_tag(&mut object, policy) else {
                return Err(CodecError::MissingDiscriminator {
                    tag: policy.tag_property_name().into(),
                    declared,
                });
            };
            resolve(&id, declared, policy, S::is_assignable)?;
            take_values(&mut object, declared, policy)
        }
        other => Err(CodecError::structural(
            "an array or a tagged sequence",
            &other,
            declared,
        )),
    }
}

/// Reads the entries of a dictionary slot, which are always tagged.
pub(crate) fn read_dictionary<S: SlotShape>(
    node: Value,
    policy: &TypeDiscriminatorPolicy,
) -> Result<Map<String, Value>, CodecError> {
    let declared = S::type_path();
    match node {
        Value::Object(mut object) => {
            let Some(id) = take_tag(&mut object, policy) else {
                return Err(CodecError::MissingDiscriminator {
                    tag: policy.tag_property_name().into(),
                    declared,
                });
            };
            resolve(&id, declared, policy, S::is_assignable)?;
            Ok(object)
        }
        other => Err(CodecError::structural("a tagged object", &other, declared)),
    }
}

/// Removes the array under the array-values property of a wrapped sequence.
fn take_values(
    object: &mut Map<String, Value>,
    declared: &'static str,
    policy: &TypeDiscriminatorPolicy,
) -> Result<Vec<Value>, CodecError> {
    match object.shift_remove(policy.array_value_property_name()) {
        Some(Value::Array(items)) => Ok(items),
        Some(other) => Err(CodecError::structural(
            "an array under the array-values property",
            &other,
            declared,
        )),
        None => Err(CodecError::Structural {
            expected: "an array under the array-values property",
            found: "an object without one",
            declared,
        }),
    }
}

/// Removes and returns a string-valued tag. Other tag values are left as data.
fn take_tag(object: &mut Map<String, Value>, policy: &TypeDiscriminatorPolicy) -> Option<String> {
    let tag = policy.tag_property_name();
    if !object.get(tag).is_some_and(Value::is_string) {
        return None;
    }
    match object.shift_remove(tag) {
        Some(Value::String(id)) => Some(id),
        _ => None,
    }
}

fn resolve<'p>(
    id: &str,
    declared: &'static str,
    policy: &'p TypeDiscriminatorPolicy,
    is_assignable: impl FnOnce(&TypeMeta) -> bool,
) -> Result<&'p TypeMeta, CodecError> {
    let meta = policy.resolve_required_type(id)?;
    if !is_assignable(meta) {
        return Err(CodecError::TypeMismatch {
            type_path: meta.type_path(),
            declared,
        });
    }
    Ok(meta)
}

/// Builds the resolved type from the rest of a tagged object.
fn construct(
    meta: &TypeMeta,
    mut object: Map<String, Value>,
    policy: &TypeDiscriminatorPolicy,
) -> Result<Box<dyn Polymorphic>, CodecError> {
    let deserialize = meta.get_trait::<TypeTraitDeserialize>().ok_or_else(|| {
        CodecError::configuration(alloc::format!(
            "`{}` is registered without deserialization support",
            meta.type_path()
        ))
    })?;

    // Only sequence types are wrapped, so maps and structs keep a field
    // named like the array-values property as data.
    let result = if meta.kind() == ValueKind::Sequence {
        let items = take_values(&mut object, meta.type_path(), policy)?;
        deserialize.deserialize(Value::Array(items))
    } else {
        deserialize.deserialize(LenientObject(object))
    };

    result.map_err(|error| CodecError::Host {
        type_path: meta.type_path(),
        message: error.to_string(),
    })
}

/// Materializes an untagged node for an "any" slot.
///
/// Objects and arrays are walked through [`read_element`], so tags are still
/// honored at every depth.
fn read_untyped(node: Value, policy: &TypeDiscriminatorPolicy) -> Result<Dynamic, CodecError> {
    match node {
        Value::Array(items) => items
            .into_iter()
            .map(|item| read_element::<Dynamic>(item, policy))
            .collect::<Result<Vec<_>, _>>()
            .map(Dynamic::List),
        Value::Object(object) => object
            .into_iter()
            .map(|(key, value)| read_element::<Dynamic>(value, policy).map(|value| (key, value)))
            .collect::<Result<DynamicMap, _>>()
            .map(Dynamic::Map),
        scalar => Ok(Dynamic::from_json(scalar)),
    }
}
