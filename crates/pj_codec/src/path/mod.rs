//! Stable type paths.
//!
//! Type discriminators default to these paths, so they must not change with
//! compiler versions or crate versions. [`core::any::type_name`] gives no such
//! guarantee.

mod cell;
mod impls;

pub use cell::{GenericTypePathCell, concat};

// -----------------------------------------------------------------------------
// TypePath

/// A static accessor to type paths and names.
///
/// - [`type_path`]: the unique identifier of the type, cannot be duplicated.
/// - [`type_name`]: the type name without module path, may be duplicated.
///
/// Paths never start with `::`. Users should also ensure this when
/// implementing the trait manually.
///
/// # Implementation
///
/// Use [`impl_type_path!`](crate::impl_type_path), or
/// [`impl_polymorphic!`](crate::impl_polymorphic) which implements it as well:
///
/// ```
/// use pj_codec::path::TypePath;
///
/// struct Circle;
/// pj_codec::impl_type_path!((in shapes) Circle);
///
/// assert_eq!(Circle::type_path(), "shapes::Circle");
/// assert_eq!(Circle::type_name(), "Circle");
/// ```
///
/// For generic types, [`GenericTypePathCell`] caches the concatenated path:
///
/// ```
/// use pj_codec::path::{concat, GenericTypePathCell, TypePath};
///
/// struct Layer<T>(T);
///
/// impl<T: TypePath> TypePath for Layer<T> {
///     fn type_path() -> &'static str {
///         static CELL: GenericTypePathCell = GenericTypePathCell::new();
///         CELL.get_or_insert::<Self>(|| concat(&["shapes::Layer<", T::type_path(), ">"]))
///     }
///     fn type_name() -> &'static str {
///         static CELL: GenericTypePathCell = GenericTypePathCell::new();
///         CELL.get_or_insert::<Self>(|| concat(&["Layer<", T::type_name(), ">"]))
///     }
/// }
///
/// assert_eq!(<Layer<u8>>::type_path(), "shapes::Layer<u8>");
/// ```
///
/// [`type_path`]: TypePath::type_path
/// [`type_name`]: TypePath::type_name
pub trait TypePath: 'static {
    /// Returns the fully qualified path with generics of the target type.
    ///
    /// For `Option<Vec<usize>>`, this is `"core::option::Option<alloc::vec::Vec<usize>>"`.
    fn type_path() -> &'static str;

    /// Returns a short, pretty-print enabled path to the type.
    ///
    /// For `Option<Vec<usize>>`, this is `"Option<Vec<usize>>"`.
    fn type_name() -> &'static str;
}

// -----------------------------------------------------------------------------
// DynamicTypePath

/// Provide dynamic dispatch for types that implement [`TypePath`].
///
/// Auto impl for all sized types that implemented [`TypePath`].
///
/// ```
/// use pj_codec::path::DynamicTypePath;
/// use pj_codec::Polymorphic;
///
/// let value: &dyn Polymorphic = &String::new();
/// assert_eq!(value.reflect_type_path(), "alloc::string::String");
/// ```
pub trait DynamicTypePath {
    /// See [`TypePath::type_path`].
    fn reflect_type_path(&self) -> &'static str;

    /// See [`TypePath::type_name`].
    fn reflect_type_name(&self) -> &'static str;
}

impl<T: TypePath> DynamicTypePath for T {
    #[inline]
    fn reflect_type_path(&self) -> &'static str {
        Self::type_path()
    }

    #[inline]
    fn reflect_type_name(&self) -> &'static str {
        Self::type_name()
    }
}
