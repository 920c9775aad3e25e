use alloc::vec::Vec;
use core::fmt::{Debug, Formatter};

/// The type paths entered by the current traversal, outermost first.
#[derive(Default)]
pub(super) struct TypePathTrail {
    stack: Vec<&'static str>,
}

impl TypePathTrail {
    pub const fn new() -> Self {
        Self { stack: Vec::new() }
    }

    pub fn push(&mut self, type_path: &'static str) {
        self.stack.push(type_path);
    }

    pub fn pop(&mut self) {
        self.stack.pop();
    }
}

impl Debug for TypePathTrail {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        let mut iter = self.stack.iter();

        if let Some(first) = iter.next() {
            writeln!(f, "`{first}`")?;
        }

        for type_path in iter {
            writeln!(f, " -> `{type_path}`")?;
        }

        Ok(())
    }
}
