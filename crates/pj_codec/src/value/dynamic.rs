use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use pj_utils::hash::HashMap;
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Number;
use thiserror::Error;

use crate::registry::{FromType, GetTypeMeta, TypeMeta, TypeTraitDeserialize};
use crate::slot::SlotConverter;
use crate::value::{Polymorphic, Typed, ValueKind, ValueRef};

// -----------------------------------------------------------------------------
// Dynamic

/// The universal "any" slot type.
///
/// Untagged JSON read into a `Dynamic` becomes untyped values. Tagged objects,
/// at any depth, become [`Dynamic::Object`] holding the resolved type, or
/// [`Dynamic::List`]/[`Dynamic::Map`] for the untyped containers.
///
/// Serializing a `Dynamic` directly behaves like an object slot.
///
/// ```
/// use pj_codec::{Dynamic, DynamicMap};
///
/// let mut map = DynamicMap::new();
/// map.insert("answer", 42);
/// let value = Dynamic::from(map);
///
/// assert_eq!(value.as_map().and_then(|m| m.get("answer")).and_then(Dynamic::as_i64), Some(42));
/// ```
#[derive(Debug, Default)]
pub enum Dynamic {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    List(Vec<Dynamic>),
    Map(DynamicMap),
    /// A value whose concrete type was resolved from its tag.
    Object(Box<dyn Polymorphic>),
}

impl Dynamic {
    /// Wraps a concrete value.
    #[inline]
    pub fn object(value: impl Polymorphic) -> Self {
        Self::Object(Box::new(value))
    }

    /// Returns the value as seen by the write path, `None` for [`Dynamic::Null`].
    pub fn as_polymorphic(&self) -> Option<&dyn Polymorphic> {
        match self {
            Self::Null => None,
            Self::Bool(value) => Some(value),
            Self::Number(value) => Some(value),
            Self::String(value) => Some(value),
            Self::List(value) => Some(value),
            Self::Map(value) => Some(value),
            Self::Object(value) => Some(&**value),
        }
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Number(value) => value.as_i64(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(value) => value.as_f64(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Dynamic]> {
        match self {
            Self::List(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&DynamicMap> {
        match self {
            Self::Map(value) => Some(value),
            _ => None,
        }
    }

    /// Downcasts a resolved [`Dynamic::Object`] to `T`.
    pub fn downcast_ref<T: Polymorphic>(&self) -> Option<&T> {
        match self {
            Self::Object(value) => value.downcast_ref(),
            _ => None,
        }
    }

    /// Converts an untyped JSON tree without resolving any tag.
    pub(crate) fn from_json(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => Self::Null,
            Value::Bool(value) => Self::Bool(value),
            Value::Number(value) => Self::Number(value),
            Value::String(value) => Self::String(value),
            Value::Array(items) => Self::List(items.into_iter().map(Self::from_json).collect()),
            Value::Object(entries) => Self::Map(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, Self::from_json(value)))
                    .collect(),
            ),
        }
    }
}

macro_rules! impl_from {
    ($($ty:ty => |$value:ident| $body:expr;)*) => {$(
        impl From<$ty> for Dynamic {
            #[inline]
            fn from($value: $ty) -> Self {
                $body
            }
        }
    )*};
}

impl_from! {
    bool => |value| Self::Bool(value);
    i32 => |value| Self::Number(value.into());
    i64 => |value| Self::Number(value.into());
    u32 => |value| Self::Number(value.into());
    u64 => |value| Self::Number(value.into());
    Number => |value| Self::Number(value);
    &str => |value| Self::String(value.into());
    String => |value| Self::String(value);
    Vec<Dynamic> => |value| Self::List(value);
    DynamicMap => |value| Self::Map(value);
}

/// A float JSON cannot represent: NaN or an infinity.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("`{0}` is not a finite JSON number")]
pub struct NonFiniteFloat(pub f64);

impl TryFrom<f64> for Dynamic {
    type Error = NonFiniteFloat;

    #[inline]
    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Number::from_f64(value)
            .map(Self::Number)
            .ok_or(NonFiniteFloat(value))
    }
}

impl Serialize for Dynamic {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        SlotConverter::OBJECT.serialize(self, serializer)
    }
}

impl<'de> Deserialize<'de> for Dynamic {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        SlotConverter::OBJECT.deserialize(deserializer)
    }
}

crate::impl_type_path!((in pj_codec) Dynamic);

// -----------------------------------------------------------------------------
// DynamicMap

/// An insertion-ordered, string-keyed map of [`Dynamic`] values.
///
/// This is what untagged JSON objects read into. Its own tag resolves back
/// to `DynamicMap`, so it round-trips through any slot.
#[derive(Default)]
pub struct DynamicMap {
    entries: Vec<(String, Dynamic)>,
    indices: HashMap<String, usize>,
}

impl DynamicMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a value, keeping the position of an existing key.
    ///
    /// Returns the replaced value, if any.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Dynamic>) -> Option<Dynamic> {
        let key = key.into();
        let value = value.into();
        match self.indices.get(&key) {
            Some(&index) => Some(core::mem::replace(&mut self.entries[index].1, value)),
            None => {
                self.indices.insert(key.clone(), self.entries.len());
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&Dynamic> {
        self.indices.get(key).map(|&index| &self.entries[index].1)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.indices.contains_key(key)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over the entries in insertion order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&str, &Dynamic)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn keys(&self) -> impl ExactSizeIterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }
}

impl fmt::Debug for DynamicMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: Into<String>> FromIterator<(K, Dynamic)> for DynamicMap {
    fn from_iter<I: IntoIterator<Item = (K, Dynamic)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

impl Typed for DynamicMap {
    const KIND: ValueKind = ValueKind::Map;
}

impl Polymorphic for DynamicMap {
    fn value_ref(&self) -> ValueRef<'_> {
        ValueRef::Map(Box::new(
            self.entries
                .iter()
                .map(|(key, value)| (key.as_str(), value.as_polymorphic())),
        ))
    }
}

impl<'de> Deserialize<'de> for DynamicMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct DynamicMapVisitor;

        impl<'de> Visitor<'de> for DynamicMapVisitor {
            type Value = DynamicMap;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a string-keyed map")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<DynamicMap, A::Error> {
                let mut map = DynamicMap::new();
                while let Some((key, value)) = access.next_entry::<String, Dynamic>()? {
                    map.insert(key, value);
                }
                Ok(map)
            }
        }

        deserializer.deserialize_map(DynamicMapVisitor)
    }
}

impl GetTypeMeta for DynamicMap {
    fn get_type_meta() -> TypeMeta {
        let mut meta = TypeMeta::of::<Self>();
        meta.insert_trait::<TypeTraitDeserialize>(FromType::<Self>::from_type());
        meta
    }
}

crate::impl_type_path!((in pj_codec) DynamicMap);
