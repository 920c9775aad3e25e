//! Shared fixtures for unit tests.

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::Polymorphic;
use crate::policy::{AllowList, NamingTable, TypeDiscriminatorPolicy};
use crate::registry::TypeRegistry;
use crate::value::{Dynamic, DynamicMap};

pub trait Shape: Polymorphic {
    fn area(&self) -> u32;
}

crate::declare_slot!((in shapes) dyn Shape);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub radius: u32,
}

impl Shape for Circle {
    fn area(&self) -> u32 {
        3 * self.radius * self.radius
    }
}

crate::impl_polymorphic!((in shapes) Circle as [Shape]);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Square {
    pub side: u32,
}

impl Shape for Square {
    fn area(&self) -> u32 {
        self.side * self.side
    }
}

crate::impl_polymorphic!((in shapes) Square as [Shape]);
crate::auto_register!(Square);

/// A type no payload may activate.
#[derive(Debug, Serialize, Deserialize)]
pub struct Process {
    pub pid: u32,
}

crate::impl_polymorphic!((in system::diagnostics) Process);

pub fn registry() -> Arc<TypeRegistry> {
    let mut registry = TypeRegistry::new();
    registry.register::<Circle>();
    registry.register::<Square>();
    registry.register::<Process>();
    registry.register_slot::<dyn Shape>();
    Arc::new(registry)
}

/// Legacy ids, no type-path fallback, and everything under `system::` denied.
pub fn policy(wrap_arrays: bool) -> TypeDiscriminatorPolicy {
    let naming = NamingTable::new()
        .with::<Circle>("Circle-id")
        .and_then(|table| table.with::<Square>("Square-id"))
        .and_then(|table| table.with::<Process>("System.Diagnostics.Process-id"))
        .and_then(|table| table.with::<Vec<Box<dyn Shape>>>("List<IShape>-id"))
        .and_then(|table| {
            table.with::<BTreeMap<String, Box<dyn Shape>>>("Dictionary<String,IShape>-id")
        })
        .and_then(|table| {
            table.with::<HashMap<String, Box<dyn Shape>>>("Hashtable<String,IShape>-id")
        })
        .and_then(|table| table.with::<Vec<Dynamic>>("ArrayList-id"))
        .and_then(|table| table.with::<DynamicMap>("Hashtable-id"))
        .and_then(|table| table.with::<BTreeMap<String, Dynamic>>("Dictionary<String,Object>-id"))
        .unwrap();

    TypeDiscriminatorPolicy::builder(registry())
        .naming(naming)
        .filter(AllowList::new(["shapes::", "pj_codec::", "alloc::", "std::"]))
        .wrap_arrays(wrap_arrays)
        .build()
        .unwrap()
}
