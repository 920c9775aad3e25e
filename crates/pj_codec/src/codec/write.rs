//! The write half of the codec core.
//!
//! | runtime value | wire form                                             |
//! |---------------|-------------------------------------------------------|
//! | absent        | `null`                                                |
//! | scalar        | written by the host, never tagged                     |
//! | map           | `{ "$type": id, key: value, .. }`                     |
//! | sequence      | `[ .. ]`, or `{ "$type": id, "$values": [ .. ] }`     |
//! | structured    | `{ "$type": id, ..fields written by the host }`       |
//!
//! Whether a sequence is wrapped depends on the slot it is written from and
//! on the wrap scope inherited from its ancestors:
//!
//! - A list slot keeps every nested sequence wrap-eligible.
//! - A dictionary slot keeps every nested sequence wrap-eligible.
//! - An object slot wraps its own sequence only, nested ones stay bare.

use alloc::string::ToString;
use alloc::vec::Vec;

use log::trace;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::Polymorphic;
use crate::codec::scope::{self, raise_ser};
use crate::error::CodecError;
use crate::policy::TypeDiscriminatorPolicy;
use crate::slot::SlotKind;
use crate::value::ValueRef;

/// One value at one position of the write traversal.
pub(crate) struct WriteNode<'a> {
    value: Option<&'a dyn Polymorphic>,
    // `None` for map values and sequence elements.
    slot: Option<SlotKind>,
    wrap_scope: bool,
    wrap_arrays: bool,
    policy: &'a TypeDiscriminatorPolicy,
}

impl<'a> WriteNode<'a> {
    /// The root value of a slot.
    pub(crate) fn root(
        value: Option<&'a dyn Polymorphic>,
        slot: SlotKind,
        wrap_arrays: bool,
        policy: &'a TypeDiscriminatorPolicy,
    ) -> Self {
        Self {
            value,
            slot: Some(slot),
            wrap_scope: match slot {
                SlotKind::Object => false,
                SlotKind::List | SlotKind::Dictionary => wrap_arrays,
            },
            wrap_arrays,
            policy,
        }
    }

    #[inline]
    fn nested(&self, value: Option<&'a dyn Polymorphic>, wrap_scope: bool) -> Self {
        Self {
            value,
            slot: None,
            wrap_scope,
            wrap_arrays: self.wrap_arrays,
            policy: self.policy,
        }
    }

    fn should_wrap(&self) -> bool {
        self.wrap_arrays
            && (matches!(self.slot, Some(SlotKind::List | SlotKind::Object)) || self.wrap_scope)
    }
}

impl Serialize for WriteNode<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let Some(value) = self.value else {
            return serializer.serialize_none();
        };
        let _trail = scope::enter_type(value.reflect_type_path());

        match value.value_ref() {
            ValueRef::Scalar(scalar) => Serialize::serialize(scalar, serializer),
            ValueRef::Map(entries) => {
                let id = self.policy.get_required_id(value).map_err(raise_ser::<S::Error>)?;
                trace!("writing tagged map `{id}`");

                let tag = self.policy.tag_property_name();
                let mut map = serializer.serialize_map(Some(entries.len() + 1))?;
                map.serialize_entry(tag, &id)?;
                for (key, entry) in entries {
                    if key == tag {
                        return Err(raise_ser(CodecError::ReservedKey {
                            key: key.into(),
                            declared: value.reflect_type_path(),
                        }));
                    }
                    map.serialize_entry(key, &self.nested(entry, self.wrap_scope))?;
                }
                map.end()
            }
            ValueRef::Sequence(elements) if !self.should_wrap() => {
                let elements = elements.map(|element| self.nested(element, self.wrap_scope));
                serializer.collect_seq(elements)
            }
            ValueRef::Sequence(elements) => {
                let id = self.policy.get_required_id(value).map_err(raise_ser::<S::Error>)?;
                trace!("writing wrapped sequence `{id}`");

                let next_scope = self.slot != Some(SlotKind::Object) && self.wrap_scope;
                let elements: Vec<_> = elements
                    .map(|element| self.nested(element, next_scope))
                    .collect();

                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry(self.policy.tag_property_name(), &id)?;
                map.serialize_entry(self.policy.array_value_property_name(), &elements)?;
                map.end()
            }
            ValueRef::Structured(structured) => {
                let id = self.policy.get_required_id(value).map_err(raise_ser::<S::Error>)?;
                trace!("writing tagged structured value `{id}`");

                // Nested slots of the value run through their own converters here.
                let fields = match serde_json::to_value(structured) {
                    Ok(Value::Object(fields)) => fields,
                    Ok(other) => {
                        return Err(raise_ser(CodecError::structural(
                            "an object from the host serializer",
                            &other,
                            value.reflect_type_path(),
                        )));
                    }
                    Err(error) => {
                        return Err(raise_ser(CodecError::Host {
                            type_path: value.reflect_type_path(),
                            message: error.to_string(),
                        }));
                    }
                };

                let tag = self.policy.tag_property_name();
                let mut map = serializer.serialize_map(Some(fields.len() + 1))?;
                map.serialize_entry(tag, &id)?;
                for (key, field) in fields.iter().filter(|(key, _)| key.as_str() != tag) {
                    map.serialize_entry(key, field)?;
                }
                map.end()
            }
        }
    }
}
