use alloc::boxed::Box;
use core::any::{Any, TypeId};
use core::fmt::Debug;

use crate::path::{DynamicTypePath, TypePath};
use crate::value::{ValueKind, ValueRef};

// -----------------------------------------------------------------------------
// Polymorphic

/// A runtime value that may occupy a polymorphic slot.
///
/// Implemented for scalars, for `Vec`/`BTreeMap`/`HashMap` of slot elements,
/// for [`DynamicMap`](crate::DynamicMap), and for user types through
/// [`impl_polymorphic!`](crate::impl_polymorphic).
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot be written to a polymorphic slot",
    note = "consider `pj_codec::impl_polymorphic!((in your::module) {Self})`"
)]
pub trait Polymorphic: Any + Send + Sync + Debug + DynamicTypePath {
    /// Returns the [`TypeId`] of the underlying type.
    #[inline(always)]
    fn ty_id(&self) -> TypeId {
        TypeId::of::<Self>()
    }

    /// Returns the classified view used by the write path.
    fn value_ref(&self) -> ValueRef<'_>;
}

impl dyn Polymorphic {
    /// Returns `true` if the underlying value is of type `T`.
    #[inline(always)]
    pub fn is<T: Any>(&self) -> bool {
        self.ty_id() == TypeId::of::<T>()
    }

    /// Downcasts the value to type `T` by reference.
    #[inline]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        <dyn Any>::downcast_ref(self)
    }

    /// Downcasts the value to type `T`, consuming the trait object.
    ///
    /// If the underlying value is not of type `T`, returns `Err(self)`.
    #[inline]
    pub fn downcast<T: Any>(self: Box<dyn Polymorphic>) -> Result<Box<T>, Box<dyn Polymorphic>> {
        if self.is::<T>() {
            #[expect(unsafe_code, reason = "type is already checked")]
            Ok(unsafe { <Box<dyn Any>>::downcast::<T>(self).unwrap_unchecked() })
        } else {
            Err(self)
        }
    }

    /// Downcasts the value to type `T`, unboxing and consuming the trait object.
    ///
    /// If the underlying value is not of type `T`, returns `Err(self)`.
    #[inline]
    pub fn take<T: Any>(self: Box<dyn Polymorphic>) -> Result<T, Box<dyn Polymorphic>> {
        self.downcast::<T>().map(|value| *value)
    }
}

// -----------------------------------------------------------------------------
// Typed

/// Static classification of a registered type.
pub trait Typed: TypePath {
    /// The [`ValueKind`] every value of this type has.
    const KIND: ValueKind;
}
