use serde::de::Visitor;
use serde::{Deserializer, forward_to_deserialize_any};
use serde_json::{Map, Value};

/// Deserializes the sibling fields of a tagged object, ignoring fields the
/// target struct does not declare.
///
/// Producers may add fields this build does not know about, so unknown fields
/// are dropped even for `#[serde(deny_unknown_fields)]` types. Only fields
/// listed by the struct survive; a field known solely by a serde alias is
/// dropped as well.
pub(crate) struct LenientObject(pub Map<String, Value>);

impl<'de> Deserializer<'de> for LenientObject {
    type Error = serde_json::Error;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        Value::Object(self.0).deserialize_any(visitor)
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        let mut object = self.0;
        object.retain(|key, _| fields.contains(&key.as_str()));
        Value::Object(object).deserialize_struct(name, fields, visitor)
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        name: &'static str,
        variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        Value::Object(self.0).deserialize_enum(name, variants, visitor)
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf option unit unit_struct seq tuple tuple_struct map
        identifier ignored_any
    }
}
