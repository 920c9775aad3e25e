use alloc::string::String;
use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

use crate::error::CodecError;
use crate::policy::PolicyBuilder;

/// The serializable configuration of a [`TypeDiscriminatorPolicy`].
///
/// Missing fields take their defaults.
///
/// ```
/// use pj_codec::policy::PolicyOptions;
///
/// let options = PolicyOptions::from_json(r#"{ "wrap_arrays": true }"#).unwrap();
/// assert_eq!(options.tag_property_name, "$type");
/// assert!(options.wrap_arrays);
///
/// assert!(PolicyOptions::from_json(r#"{ "array_value_property_name": "$type" }"#).is_err());
/// ```
///
/// [`TypeDiscriminatorPolicy`]: crate::policy::TypeDiscriminatorPolicy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PolicyOptions {
    pub tag_property_name: String,
    /// Reserved, never written.
    pub scalar_value_property_name: String,
    pub array_value_property_name: String,
    pub wrap_arrays: bool,
    /// Type-path prefixes accepted on read. Empty accepts every registered
    /// type that can be built from JSON.
    pub allowed_prefixes: Vec<String>,
}

impl Default for PolicyOptions {
    fn default() -> Self {
        Self {
            tag_property_name: String::from(PolicyBuilder::DEFAULT_TAG),
            scalar_value_property_name: String::from(PolicyBuilder::DEFAULT_SCALAR_VALUE),
            array_value_property_name: String::from(PolicyBuilder::DEFAULT_ARRAY_VALUE),
            wrap_arrays: false,
            allowed_prefixes: Vec::new(),
        }
    }
}

impl PolicyOptions {
    /// Parses and validates options from JSON.
    pub fn from_json(json: &str) -> Result<Self, CodecError> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    /// Checks that the property names are non-empty and distinct.
    pub fn validate(&self) -> Result<(), CodecError> {
        super::validate_names([
            &self.tag_property_name,
            &self.scalar_value_property_name,
            &self.array_value_property_name,
        ])
    }
}
