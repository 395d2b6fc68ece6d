//! Error taxonomy for registration and (de)serialization.

use limlib_core::{RegistryKey, RegistryKeyError};
use thiserror::Error;

use crate::DescriptorId;

/// Startup-time registration failures. These are fatal and must abort
/// bootstrap rather than be logged and skipped.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A key was registered twice in the same registry.
    #[error("duplicate key {key} in registry {registry}")]
    DuplicateKey {
        /// Registry label.
        registry: &'static str,
        /// The conflicting key.
        key: RegistryKey,
    },
    /// A descriptor was registered under a second key.
    #[error("descriptor {descriptor} already registered as {existing} in registry {registry}")]
    DuplicateDescriptor {
        /// Registry label.
        registry: &'static str,
        /// The descriptor being registered again.
        descriptor: DescriptorId,
        /// Key the descriptor is already registered under.
        existing: RegistryKey,
    },
    /// Registration attempted after the registry was frozen.
    #[error("registry {registry} is frozen; cannot register {key}")]
    Frozen {
        /// Registry label.
        registry: &'static str,
        /// The rejected key.
        key: RegistryKey,
    },
    /// A preset holds a variant whose descriptor is not registered.
    #[error("preset {key} in registry {registry} uses unregistered variant {descriptor}")]
    UnregisteredPreset {
        /// Preset registry label.
        registry: &'static str,
        /// Preset key.
        key: RegistryKey,
        /// Descriptor of the preset's variant.
        descriptor: DescriptorId,
    },
    /// A registration used a malformed key.
    #[error("invalid registry key: {0}")]
    InvalidKey(#[from] RegistryKeyError),
    /// A pre-registration hook failed.
    #[error("pre-registration hook {hook} failed")]
    Hook {
        /// Hook identifier.
        hook: String,
        /// Underlying registration failure.
        #[source]
        source: Box<RegistryError>,
    },
}

/// Failures while encoding or decoding a family value.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The value's descriptor was never registered. Programmer error.
    #[error("{family}: variant {descriptor} is not registered")]
    UnregisteredVariant {
        /// Family registry label.
        family: &'static str,
        /// Descriptor reported by the value.
        descriptor: DescriptorId,
    },
    /// A descriptor was asked to encode a value of a different variant.
    #[error("{family}: descriptor {descriptor} cannot encode this variant")]
    VariantMismatch {
        /// Family registry label.
        family: &'static str,
        /// Descriptor that rejected the value.
        descriptor: DescriptorId,
    },
    /// A variant's encoded fields contain the family's tag field.
    #[error("{family}: variant fields collide with tag field {tag:?}")]
    TagCollision {
        /// Family registry label.
        family: &'static str,
        /// Tag field name.
        tag: &'static str,
    },
    /// Input (or an encoded variant) was not a record.
    #[error("expected a record, found {found}")]
    NotARecord {
        /// JSON kind that was found instead.
        found: &'static str,
    },
    /// The tag field is absent.
    #[error("{family}: missing tag field {tag:?}")]
    MissingTag {
        /// Family registry label.
        family: &'static str,
        /// Tag field name.
        tag: &'static str,
    },
    /// The tag names no registered variant.
    #[error("{family}: unknown variant {key:?}")]
    UnknownVariant {
        /// Family registry label.
        family: &'static str,
        /// Tag value as found in the input.
        key: String,
    },
    /// A field is missing, mistyped, or outside its declared domain.
    #[error("field {field:?}: {reason}")]
    FieldDecode {
        /// Offending field name.
        field: String,
        /// What was wrong with it.
        reason: String,
    },
    /// Raw JSON (de)serialization failure.
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

impl CodecError {
    /// Build a [`CodecError::FieldDecode`].
    pub fn field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::FieldDecode {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Name of the field a [`CodecError::FieldDecode`] refers to.
    pub fn field_name(&self) -> Option<&str> {
        match self {
            Self::FieldDecode { field, .. } => Some(field),
            _ => None,
        }
    }
}

/// Short name of a JSON value's kind, for error messages.
pub fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "record",
    }
}
