//! The value model and the value classifier.
//!
//! - [`Polymorphic`]: a runtime value the codec can classify and tag.
//! - [`ValueKind`] and [`ValueRef`]: the classification, as a closed sum type.
//! - [`Dynamic`]: the universal "any" slot type.

mod dynamic;
mod impls;
mod kind;
mod polymorphic;

pub use dynamic::{Dynamic, DynamicMap, NonFiniteFloat};
pub use kind::{Elements, Entries, ValueKind, ValueRef, classify};
pub use polymorphic::{Polymorphic, Typed};
