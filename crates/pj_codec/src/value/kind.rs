use alloc::boxed::Box;
use core::fmt;

use super::Polymorphic;

/// The four shapes a runtime value can take on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// Numbers, strings, booleans and opaque JSON nodes. Written without a tag.
    Scalar,
    /// String-keyed maps. Always written as a tagged object.
    Map,
    /// Sequences other than strings. Written bare or wrapped in `$values`.
    Sequence,
    /// Everything else. Written as a tagged object with the host's fields.
    Structured,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Scalar => "scalar",
            Self::Map => "map",
            Self::Sequence => "sequence",
            Self::Structured => "structured",
        })
    }
}

/// The elements of a sequence, `None` for absent values.
pub type Elements<'a> = Box<dyn ExactSizeIterator<Item = Option<&'a dyn Polymorphic>> + 'a>;

/// The entries of a string-keyed map, `None` for absent values.
pub type Entries<'a> =
    Box<dyn ExactSizeIterator<Item = (&'a str, Option<&'a dyn Polymorphic>)> + 'a>;

/// A borrowed, classified view of a [`Polymorphic`] value.
///
/// Matching on it is how the write path branches, so every value has
/// exactly one classification.
pub enum ValueRef<'a> {
    /// Serialized verbatim.
    Scalar(&'a dyn erased_serde::Serialize),
    /// Key-value pairs in iteration order.
    Map(Entries<'a>),
    /// Elements in order.
    Sequence(Elements<'a>),
    /// Serialized by the host, then re-emitted with a tag.
    Structured(&'a dyn erased_serde::Serialize),
}

impl ValueRef<'_> {
    /// Returns the [`ValueKind`] of this view.
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Scalar(_) => ValueKind::Scalar,
            Self::Map(_) => ValueKind::Map,
            Self::Sequence(_) => ValueKind::Sequence,
            Self::Structured(_) => ValueKind::Structured,
        }
    }
}

/// Classifies a runtime value.
///
/// ```
/// use pj_codec::Dynamic;
/// use pj_codec::value::{classify, ValueKind};
///
/// // Strings are never sequences.
/// assert_eq!(classify(&String::from("abc")), ValueKind::Scalar);
/// assert_eq!(classify(&vec![Dynamic::from(1)]), ValueKind::Sequence);
/// ```
#[inline]
pub fn classify(value: &dyn Polymorphic) -> ValueKind {
    value.value_ref().kind()
}
