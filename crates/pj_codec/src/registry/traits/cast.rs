use alloc::boxed::Box;

use crate::Polymorphic;

/// Records that a registered type is assignable to the trait object `D`.
///
/// A tagged payload may only fill a `Box<dyn D>` slot when the resolved type
/// carries `TypeTraitCast<dyn D>`. Inserted by
/// [`impl_polymorphic!`](crate::impl_polymorphic) for each `as [..]` trait.
pub struct TypeTraitCast<D: ?Sized> {
    func: fn(Box<dyn Polymorphic>) -> Result<Box<D>, Box<dyn Polymorphic>>,
}

impl<D: ?Sized> TypeTraitCast<D> {
    /// Creates the cast from a downcast function.
    #[inline]
    pub const fn new(
        func: fn(Box<dyn Polymorphic>) -> Result<Box<D>, Box<dyn Polymorphic>>,
    ) -> Self {
        Self { func }
    }

    /// Converts the value, returning it unchanged if it has another type.
    #[inline]
    pub fn cast(&self, value: Box<dyn Polymorphic>) -> Result<Box<D>, Box<dyn Polymorphic>> {
        (self.func)(value)
    }
}

// `derive(Clone)` would require `D: Clone`.
impl<D: ?Sized> Clone for TypeTraitCast<D> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<D: ?Sized> Copy for TypeTraitCast<D> {}
