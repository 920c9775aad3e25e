// -----------------------------------------------------------------------------
// impl_polymorphic

/// Makes a serde type usable as a polymorphic value.
///
/// Implements [`TypePath`](crate::path::TypePath), [`Typed`](crate::value::Typed),
/// [`Polymorphic`](crate::Polymorphic) and
/// [`GetTypeMeta`](crate::registry::GetTypeMeta). The type must implement
/// `Serialize`, `DeserializeOwned`, `Debug`, `Send` and `Sync`.
///
/// `as [..]` lists the declared slot traits the type may be read into. Each
/// one must be implemented by the type and declared with
/// [`declare_slot!`](crate::declare_slot).
///
/// ```
/// use serde::{Deserialize, Serialize};
/// use pj_codec::Polymorphic;
///
/// pub trait Shape: Polymorphic {}
/// pj_codec::declare_slot!((in shapes) dyn Shape);
///
/// #[derive(Debug, Serialize, Deserialize)]
/// pub struct Circle {
///     radius: u32,
/// }
///
/// impl Shape for Circle {}
/// pj_codec::impl_polymorphic!((in shapes) Circle as [Shape]);
/// ```
///
/// Types serialized as plain JSON values use the `scalar` form. They are
/// written without a tag.
///
/// ```
/// # use serde::{Deserialize, Serialize};
/// #[derive(Debug, Serialize, Deserialize)]
/// #[serde(transparent)]
/// pub struct Celsius(f64);
///
/// pj_codec::impl_polymorphic!(scalar (in units) Celsius);
/// ```
#[macro_export]
macro_rules! impl_polymorphic {
    (scalar (in $($module:ident)::+) $ident:ident) => {
        $crate::impl_type_path!((in $($module)::+) $ident);

        impl $crate::value::Typed for $ident {
            const KIND: $crate::value::ValueKind = $crate::value::ValueKind::Scalar;
        }

        impl $crate::Polymorphic for $ident {
            #[inline]
            fn value_ref(&self) -> $crate::value::ValueRef<'_> {
                $crate::value::ValueRef::Scalar(self)
            }
        }

        $crate::impl_polymorphic!(@meta $ident);
    };
    ((in $($module:ident)::+) $ident:ident $(as [$($trait_:path),* $(,)?])?) => {
        $crate::impl_type_path!((in $($module)::+) $ident);

        impl $crate::value::Typed for $ident {
            const KIND: $crate::value::ValueKind = $crate::value::ValueKind::Structured;
        }

        impl $crate::Polymorphic for $ident {
            #[inline]
            fn value_ref(&self) -> $crate::value::ValueRef<'_> {
                $crate::value::ValueRef::Structured(self)
            }
        }

        $crate::impl_polymorphic!(@meta $ident $($($trait_),*)?);
    };
    (@meta $ident:ident $($trait_:path),*) => {
        impl $crate::registry::GetTypeMeta for $ident {
            fn get_type_meta() -> $crate::registry::TypeMeta {
                let mut meta = $crate::registry::TypeMeta::of::<Self>();
                meta.insert_trait::<$crate::registry::TypeTraitDeserialize>(
                    $crate::registry::FromType::<Self>::from_type(),
                );
                $(
                    meta.insert_trait($crate::registry::TypeTraitCast::<dyn $trait_>::new(
                        |value| {
                            value
                                .downcast::<Self>()
                                .map(|value| -> $crate::__macro_exports::Box<dyn $trait_> { value })
                        },
                    ));
                )*
                meta
            }
        }
    };
}

// -----------------------------------------------------------------------------
// declare_slot

/// Makes a trait usable as the declared type of a slot.
///
/// The trait must have [`Polymorphic`](crate::Polymorphic) as a supertrait.
/// Besides [`DeclaredType`](crate::slot::DeclaredType), this implements
/// `Serialize` for `dyn Trait` and `Deserialize` for `Box<dyn Trait>` as an
/// object slot, so fields of those types need no annotation.
///
/// The type path is `dyn` followed by the given module path.
#[macro_export]
macro_rules! declare_slot {
    ((in $($module:ident)::+) dyn $trait_:ident) => {
        impl $crate::path::TypePath for dyn $trait_ {
            #[inline]
            fn type_path() -> &'static str {
                ::core::concat!(
                    "dyn ",
                    $(::core::stringify!($module), "::",)+
                    ::core::stringify!($trait_)
                )
            }

            #[inline]
            fn type_name() -> &'static str {
                ::core::concat!("dyn ", ::core::stringify!($trait_))
            }
        }

        impl $crate::slot::DeclaredType for dyn $trait_ {
            #[inline]
            fn upcast(&self) -> &dyn $crate::Polymorphic {
                self
            }
        }

        impl $crate::__macro_exports::serde::Serialize for dyn $trait_ {
            fn serialize<S: $crate::__macro_exports::serde::Serializer>(
                &self,
                serializer: S,
            ) -> ::core::result::Result<S::Ok, S::Error> {
                $crate::slot::SlotConverter::OBJECT.serialize_value(
                    ::core::option::Option::Some($crate::slot::DeclaredType::upcast(self)),
                    serializer,
                )
            }
        }

        impl<'de> $crate::__macro_exports::serde::Deserialize<'de>
            for $crate::__macro_exports::Box<dyn $trait_>
        {
            fn deserialize<D: $crate::__macro_exports::serde::Deserializer<'de>>(
                deserializer: D,
            ) -> ::core::result::Result<Self, D::Error> {
                $crate::slot::SlotConverter::OBJECT.deserialize(deserializer)
            }
        }
    };
}

// -----------------------------------------------------------------------------
// auto_register

/// Submits a type for [`TypeRegistry::auto_register`](crate::registry::TypeRegistry::auto_register).
///
/// `auto_register!(slot dyn Trait)` submits the containers of a declared
/// slot, as [`TypeRegistry::register_slot`](crate::registry::TypeRegistry::register_slot)
/// does. Generic types must be submitted once per instantiation.
///
/// Expands to nothing without the `auto_register` feature.
#[cfg(feature = "auto_register")]
#[macro_export]
macro_rules! auto_register {
    (slot dyn $trait_:path) => {
        const _: () = {
            $crate::__macro_exports::inventory::submit! {
                $crate::__macro_exports::auto_register::__AutoRegisterFunc(
                    $crate::registry::TypeRegistry::register_slot::<dyn $trait_>
                )
            }
        };
    };
    ($ty:ty) => {
        const _: () = {
            $crate::__macro_exports::inventory::submit! {
                $crate::__macro_exports::auto_register::__AutoRegisterFunc(
                    $crate::registry::TypeRegistry::register::<$ty>
                )
            }
        };
    };
}

/// Submits a type for [`TypeRegistry::auto_register`](crate::registry::TypeRegistry::auto_register).
///
/// Expands to nothing without the `auto_register` feature.
#[cfg(not(feature = "auto_register"))]
#[macro_export]
macro_rules! auto_register {
    ($($tt:tt)*) => {};
}
