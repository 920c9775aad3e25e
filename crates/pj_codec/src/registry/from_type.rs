use crate::value::Typed;

/// Builds a [`TypeTrait`] for the concrete type `T`.
///
/// ```
/// use pj_codec::registry::{FromType, TypeMeta, TypeTraitDeserialize};
///
/// let mut meta = TypeMeta::of::<pj_codec::DynamicMap>();
/// meta.insert_trait::<TypeTraitDeserialize>(FromType::<pj_codec::DynamicMap>::from_type());
/// assert!(meta.has_trait::<TypeTraitDeserialize>());
/// ```
///
/// [`TypeTrait`]: crate::registry::TypeTrait
pub trait FromType<T: Typed> {
    fn from_type() -> Self;
}
