//! The recursive codec core.
//!
//! - [`write`]: walks a runtime value and decides, per nested value, between
//!   a tagged envelope and the raw form.
//! - [`read`]: resolves tags back to registered types, accepting both the
//!   tagged and the bare form of sequences.
//! - [`scope`]: the per-call state reached from inside serde callbacks.

pub(crate) mod lenient;
pub(crate) mod read;
pub(crate) mod scope;
pub(crate) mod write;

#[cfg(all(debug_assertions, feature = "debug"))]
mod trail;
