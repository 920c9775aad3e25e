//! Errors raised by the codec.

use alloc::borrow::Cow;
use alloc::string::String;
use core::fmt;

use thiserror::Error;

/// The failure categories a caller can match on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A type has no id, or an id has no type.
    Discriminator,
    /// The resolved type is rejected by the allow-list.
    DisallowedType,
    /// The resolved type is not assignable to the declared slot type.
    TypeMismatch,
    /// A required polymorphic slot has no tag.
    MissingDiscriminator,
    /// The payload shape matches no slot encoding.
    Structural,
    /// The codec or a slot is misconfigured.
    Configuration,
    /// A resolved type rejected its own payload.
    Host,
    /// The JSON engine failed.
    Json,
}

/// Every error the codec surfaces to its caller.
///
/// All of them abort the current call. Errors raised inside nested slots keep
/// their variant, they are not flattened into [`CodecError::Json`].
#[derive(Debug, Error)]
pub enum CodecError {
    // === Discriminators ===
    /// The naming strategy produced no id for a runtime type.
    #[error("no type discriminator can be produced for `{type_path}`")]
    UnresolvableType { type_path: &'static str },

    /// The id resolves to no registered type.
    #[error("type discriminator `{id}` does not resolve to a registered type")]
    UnknownDiscriminator { id: String },

    /// The allow-list rejected the resolved type.
    #[error("type `{type_path}` (discriminator `{id}`) is not allowed")]
    DisallowedType { id: String, type_path: &'static str },

    /// The resolved type cannot live in the declared slot.
    #[error("type `{type_path}` is not assignable to `{declared}`")]
    TypeMismatch {
        type_path: &'static str,
        declared: &'static str,
    },

    /// An untagged payload reached a slot that requires a tag.
    #[error("missing `{tag}` discriminator for a value of `{declared}`")]
    MissingDiscriminator { tag: String, declared: &'static str },

    // === Payload shape ===
    /// The payload shape does not fit the slot.
    #[error("expected {expected} for `{declared}`, found {found}")]
    Structural {
        expected: &'static str,
        found: &'static str,
        declared: &'static str,
    },

    /// A map key collides with the tag property.
    #[error("key `{key}` of `{declared}` is reserved for the type discriminator")]
    ReservedKey { key: String, declared: &'static str },

    // === Setup ===
    /// The policy, the naming table or a slot annotation is invalid.
    #[error("invalid codec configuration: {0}")]
    Configuration(Cow<'static, str>),

    // === Delegated ===
    /// A resolved type failed to deserialize its own payload.
    #[error("failed to deserialize `{type_path}`: {message}")]
    Host {
        type_path: &'static str,
        message: String,
    },

    /// The JSON engine failed outside of any slot.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl CodecError {
    /// Returns the failure category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnresolvableType { .. } | Self::UnknownDiscriminator { .. } => {
                ErrorKind::Discriminator
            }
            Self::DisallowedType { .. } => ErrorKind::DisallowedType,
            Self::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            Self::MissingDiscriminator { .. } => ErrorKind::MissingDiscriminator,
            Self::Structural { .. } | Self::ReservedKey { .. } => ErrorKind::Structural,
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::Host { .. } => ErrorKind::Host,
            Self::Json(_) => ErrorKind::Json,
        }
    }

    #[inline]
    pub(crate) fn configuration(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Configuration(message.into())
    }

    pub(crate) fn structural(
        expected: &'static str,
        found: &serde_json::Value,
        declared: &'static str,
    ) -> Self {
        Self::Structural {
            expected,
            found: json_kind(found),
            declared,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Discriminator => "discriminator",
            Self::DisallowedType => "disallowed type",
            Self::TypeMismatch => "type mismatch",
            Self::MissingDiscriminator => "missing discriminator",
            Self::Structural => "structural",
            Self::Configuration => "configuration",
            Self::Host => "host",
            Self::Json => "json",
        })
    }
}

/// Describes a JSON node for error messages.
pub(crate) fn json_kind(value: &serde_json::Value) -> &'static str {
    use serde_json::Value;
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
