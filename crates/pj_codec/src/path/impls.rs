use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;
use std::collections::HashMap;

use super::{GenericTypePathCell, TypePath, concat};

/// Implements [`TypePath`] for a type.
///
/// ```
/// struct Circle;
/// struct Square;
///
/// // `shapes::Circle`
/// pj_codec::impl_type_path!((in shapes) Circle);
/// // `geometry::shapes::Square`
/// pj_codec::impl_type_path!((in geometry::shapes) Square);
/// ```
#[macro_export]
macro_rules! impl_type_path {
    ((in $($module:ident)::+) $ident:ident) => {
        impl $crate::path::TypePath for $ident {
            #[inline]
            fn type_path() -> &'static str {
                ::core::concat!($(::core::stringify!($module), "::",)+ ::core::stringify!($ident))
            }

            #[inline]
            fn type_name() -> &'static str {
                ::core::stringify!($ident)
            }
        }
    };
}

macro_rules! impl_primitive_path {
    ($($ty:ty => $path:literal, $name:literal;)*) => {$(
        impl TypePath for $ty {
            #[inline]
            fn type_path() -> &'static str {
                $path
            }

            #[inline]
            fn type_name() -> &'static str {
                $name
            }
        }
    )*};
}

impl_primitive_path! {
    bool => "bool", "bool";
    char => "char", "char";
    i8 => "i8", "i8";
    i16 => "i16", "i16";
    i32 => "i32", "i32";
    i64 => "i64", "i64";
    isize => "isize", "isize";
    u8 => "u8", "u8";
    u16 => "u16", "u16";
    u32 => "u32", "u32";
    u64 => "u64", "u64";
    usize => "usize", "usize";
    f32 => "f32", "f32";
    f64 => "f64", "f64";
    String => "alloc::string::String", "String";
    serde_json::Number => "serde_json::Number", "Number";
    serde_json::Value => "serde_json::Value", "Value";
}

macro_rules! impl_generic_path {
    ($ident:ident < $($param:ident),+ > => $module:literal) => {
        impl<$($param: TypePath),+> TypePath for $ident<$($param),+> {
            fn type_path() -> &'static str {
                static CELL: GenericTypePathCell = GenericTypePathCell::new();
                CELL.get_or_insert::<Self>(|| {
                    let params = [$($param::type_path()),+].join(", ");
                    concat(&[$module, "::", stringify!($ident), "<", &params, ">"])
                })
            }

            fn type_name() -> &'static str {
                static CELL: GenericTypePathCell = GenericTypePathCell::new();
                CELL.get_or_insert::<Self>(|| {
                    concat(&[stringify!($ident), "<", &[$($param::type_name()),+].join(", "), ">"])
                })
            }
        }
    };
}

impl_generic_path!(Vec<T> => "alloc::vec");
impl_generic_path!(Option<T> => "core::option");
impl_generic_path!(BTreeMap<K, V> => "alloc::collections");

impl<K: TypePath, V: TypePath> TypePath for HashMap<K, V> {
    fn type_path() -> &'static str {
        static CELL: GenericTypePathCell = GenericTypePathCell::new();
        CELL.get_or_insert::<Self>(|| {
            concat(&["std::collections::HashMap<", K::type_path(), ", ", V::type_path(), ">"])
        })
    }

    fn type_name() -> &'static str {
        static CELL: GenericTypePathCell = GenericTypePathCell::new();
        CELL.get_or_insert::<Self>(|| {
            concat(&["HashMap<", K::type_name(), ", ", V::type_name(), ">"])
        })
    }
}

impl<T: TypePath + ?Sized> TypePath for Box<T> {
    fn type_path() -> &'static str {
        static CELL: GenericTypePathCell = GenericTypePathCell::new();
        CELL.get_or_insert::<Self>(|| concat(&["alloc::boxed::Box<", T::type_path(), ">"]))
    }

    fn type_name() -> &'static str {
        static CELL: GenericTypePathCell = GenericTypePathCell::new();
        CELL.get_or_insert::<Self>(|| concat(&["Box<", T::type_name(), ">"]))
    }
}
