use alloc::boxed::Box;

use serde::de::DeserializeOwned;
use serde::{Deserializer, de};

use crate::Polymorphic;
use crate::registry::FromType;
use crate::value::Typed;

/// A container providing `serde` deserialization for a registered type.
///
/// This is how a resolved discriminator becomes a value: the read path
/// looks the type up, then hands the payload to this function pointer.
///
/// # Examples
///
/// ```
/// use pj_codec::registry::{TypeRegistry, TypeTraitDeserialize};
/// use pj_codec::DynamicMap;
///
/// let registry = TypeRegistry::new();
/// let meta = registry.get_with_type_path("pj_codec::DynamicMap").unwrap();
/// let deserialize = meta.get_trait::<TypeTraitDeserialize>().unwrap();
///
/// let value = deserialize.deserialize(serde_json::json!({})).unwrap();
/// assert!(value.take::<DynamicMap>().unwrap().is_empty());
/// ```
#[derive(Clone)]
pub struct TypeTraitDeserialize {
    func: fn(
        deserializer: &mut dyn erased_serde::Deserializer,
    ) -> Result<Box<dyn Polymorphic>, erased_serde::Error>,
}

impl TypeTraitDeserialize {
    /// Deserializes a boxed value of the registered type.
    #[inline(always)]
    pub fn deserialize<'de, D: Deserializer<'de>>(
        &self,
        deserializer: D,
    ) -> Result<Box<dyn Polymorphic>, D::Error> {
        let mut erased = <dyn erased_serde::Deserializer>::erase(deserializer);
        (self.func)(&mut erased).map_err(<D::Error as de::Error>::custom)
    }
}

impl<T: DeserializeOwned + Typed + Polymorphic> FromType<T> for TypeTraitDeserialize {
    fn from_type() -> Self {
        Self {
            func: |deserializer| Ok(Box::new(T::deserialize(deserializer)?)),
        }
    }
}
