use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;
use core::any::TypeId;
use std::collections::HashMap;

use crate::registry::FromType;
use crate::slot::SlotElement;

/// The element type of a registered list or dictionary type.
///
/// A tagged container fills a list or dictionary slot only when its elements
/// have the slot's element type. `Option` is transparent here, so
/// `Vec<Option<Box<dyn Shape>>>` matches a registered `Vec<Box<dyn Shape>>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeTraitElement {
    element: TypeId,
}

impl TypeTraitElement {
    /// Creates the trait data for containers of `E`.
    #[inline]
    pub fn of<E: SlotElement>() -> Self {
        Self {
            element: E::element_type_id(),
        }
    }

    /// Returns `true` if the registered elements fit positions of type `E`.
    #[inline]
    pub fn fits<E: SlotElement>(&self) -> bool {
        self.element == E::element_type_id()
    }
}

macro_rules! impl_from_container {
    ($($ty:ty),*) => {$(
        impl<E: SlotElement> FromType<$ty> for TypeTraitElement {
            #[inline]
            fn from_type() -> Self {
                Self::of::<E>()
            }
        }
    )*};
}

impl_from_container!(Vec<E>, BTreeMap<String, E>, HashMap<String, E>);
