//! Items used by the exported macros. Not public API.

pub use alloc::boxed::Box;
pub use serde;

#[cfg(feature = "auto_register")]
pub use inventory;

#[cfg(feature = "auto_register")]
pub mod auto_register {
    use crate::registry::{GetTypeMeta, TypeMeta, TypeRegistry};
    use crate::value::{Typed, ValueKind};

    /// A registration function submitted by [`auto_register!`](crate::auto_register).
    pub struct __AutoRegisterFunc(pub fn(&mut TypeRegistry));

    inventory::collect!(__AutoRegisterFunc);

    /// Registered only if `inventory` works on this platform.
    ///
    /// It carries no deserializer, so no filter ever resolves it.
    pub struct __AvailFlag;

    crate::impl_type_path!((in pj_codec::__macro_exports::auto_register) __AvailFlag);

    impl Typed for __AvailFlag {
        const KIND: ValueKind = ValueKind::Structured;
    }

    impl GetTypeMeta for __AvailFlag {
        #[inline]
        fn get_type_meta() -> TypeMeta {
            TypeMeta::of::<Self>()
        }
    }

    inventory::submit! {
        __AutoRegisterFunc(TypeRegistry::register::<__AvailFlag>)
    }

    pub fn __register_types(registry: &mut TypeRegistry) {
        for func in inventory::iter::<__AutoRegisterFunc> {
            (func.0)(registry);
        }
    }
}
