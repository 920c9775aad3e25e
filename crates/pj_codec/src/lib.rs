#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod codec;
mod facade;
mod macros;

pub mod error;
pub mod path;
pub mod policy;
pub mod registry;
pub mod slot;
pub mod value;

#[cfg(test)]
mod testing;

// -----------------------------------------------------------------------------
// Top-Level exports

#[doc(hidden)]
pub mod __macro_exports;

pub use error::{CodecError, ErrorKind};
pub use facade::{
    dictionary_from_str, dictionary_from_value, dictionary_of_objects_from_str,
    dictionary_of_objects_from_value, dictionary_to_string, dictionary_to_value, from_slice,
    from_str, from_value, list_from_str, list_from_value, list_of_objects_from_str,
    list_of_objects_from_value, list_to_string, list_to_value, to_string, to_string_pretty,
    to_value, to_vec,
};
pub use policy::TypeDiscriminatorPolicy;
pub use value::{Dynamic, DynamicMap, Polymorphic};
