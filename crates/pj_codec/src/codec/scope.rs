//! Per-call codec state.
//!
//! Slot converters are reached through serde's `with` functions and
//! `Deserialize` impls, which cannot take extra arguments. Each entry point
//! therefore pushes a frame holding its policy onto a thread-local stack for
//! the duration of the call. The frame also keeps the first [`CodecError`]
//! raised inside serde, so the entry point can return it instead of the
//! stringly error serde propagates.

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::cell::RefCell;
use core::marker::PhantomData;

use crate::error::CodecError;
use crate::policy::TypeDiscriminatorPolicy;

struct Frame {
    policy: TypeDiscriminatorPolicy,
    error: Option<CodecError>,
    #[cfg(all(debug_assertions, feature = "debug"))]
    trail: super::trail::TypePathTrail,
}

std::thread_local! {
    static FRAMES: RefCell<Vec<Frame>> = const { RefCell::new(Vec::new()) };
}

// -----------------------------------------------------------------------------
// CodecScope

/// Guard for one entry-point call. Pops its frame on drop.
pub(crate) struct CodecScope {
    // Frames are thread-local.
    _marker: PhantomData<*const ()>,
}

impl CodecScope {
    pub(crate) fn enter(policy: &TypeDiscriminatorPolicy) -> Self {
        FRAMES.with_borrow_mut(|frames| {
            frames.push(Frame {
                policy: policy.clone(),
                error: None,
                #[cfg(all(debug_assertions, feature = "debug"))]
                trail: super::trail::TypePathTrail::new(),
            });
        });
        Self {
            _marker: PhantomData,
        }
    }

    /// Maps the host result, preferring the first codec error of this scope.
    #[inline]
    pub(crate) fn finish<T>(self, result: Result<T, serde_json::Error>) -> Result<T, CodecError> {
        self.settle(result.map_err(CodecError::Json))
    }

    /// Like [`finish`](Self::finish), for results already in codec errors.
    pub(crate) fn settle<T>(self, result: Result<T, CodecError>) -> Result<T, CodecError> {
        let stashed = FRAMES.with_borrow_mut(|frames| {
            frames.last_mut().and_then(|frame| frame.error.take())
        });
        result.map_err(|error| stashed.unwrap_or(error))
    }
}

impl Drop for CodecScope {
    fn drop(&mut self) {
        FRAMES.with_borrow_mut(|frames| {
            frames.pop();
        });
    }
}

/// Returns the policy of the innermost call.
pub(crate) fn active_policy() -> Result<TypeDiscriminatorPolicy, CodecError> {
    FRAMES
        .with_borrow(|frames| frames.last().map(|frame| frame.policy.clone()))
        .ok_or_else(|| {
            CodecError::configuration(
                "polymorphic slot used outside of a codec call, use the `pj_codec` entry points",
            )
        })
}

// -----------------------------------------------------------------------------
// Errors

/// Records `error` in the innermost frame and returns its message.
fn stash(error: CodecError) -> String {
    let message = error.to_string();
    FRAMES.with_borrow_mut(|frames| match frames.last_mut() {
        Some(frame) => {
            #[cfg(all(debug_assertions, feature = "debug"))]
            let message = {
                log::debug!("polymorphic traversal failed: {error}");
                alloc::format!("{message} (trail:\n{:?})", frame.trail)
            };
            if frame.error.is_none() {
                frame.error = Some(error);
            }
            message
        }
        None => message,
    })
}

/// Converts a codec error into a serializer error, keeping the original.
#[inline]
pub(crate) fn raise_ser<E: serde::ser::Error>(error: CodecError) -> E {
    E::custom(stash(error))
}

/// Converts a codec error into a deserializer error, keeping the original.
#[inline]
pub(crate) fn raise_de<E: serde::de::Error>(error: CodecError) -> E {
    E::custom(stash(error))
}

// -----------------------------------------------------------------------------
// Trail

/// Marks a type path as entered until dropped.
pub(crate) struct TrailGuard(());

#[inline]
pub(crate) fn enter_type(type_path: &'static str) -> TrailGuard {
    #[cfg(all(debug_assertions, feature = "debug"))]
    FRAMES.with_borrow_mut(|frames| {
        if let Some(frame) = frames.last_mut() {
            frame.trail.push(type_path);
        }
    });
    #[cfg(not(all(debug_assertions, feature = "debug")))]
    let _ = type_path;
    TrailGuard(())
}

impl Drop for TrailGuard {
    #[inline]
    fn drop(&mut self) {
        #[cfg(all(debug_assertions, feature = "debug"))]
        FRAMES.with_borrow_mut(|frames| {
            if let Some(frame) = frames.last_mut() {
                frame.trail.pop();
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::{CodecScope, active_policy, raise_de};
    use crate::error::{CodecError, ErrorKind};
    use crate::testing;

    #[test]
    fn no_policy_outside_of_a_call() {
        let error = active_policy().unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn nested_scopes() {
        let outer = CodecScope::enter(&testing::policy(false));
        {
            let _inner = CodecScope::enter(&testing::policy(true));
            assert!(active_policy().unwrap().wrap_arrays());
        }
        assert!(!active_policy().unwrap().wrap_arrays());
        drop(outer);
        assert!(active_policy().is_err());
    }

    #[test]
    fn first_error_wins() {
        let scope = CodecScope::enter(&testing::policy(false));
        let first: serde_json::Error =
            raise_de(CodecError::UnknownDiscriminator { id: "a".into() });
        let _: serde_json::Error = raise_de(CodecError::configuration("second"));

        let error = scope.finish::<()>(Err(first)).unwrap_err();
        assert!(matches!(error, CodecError::UnknownDiscriminator { id } if id == "a"));
    }
}
