//! Dimension effects documents.
//!
//! A document bundles one value of each family:
//!
//! ```json
//! {
//!   "sky_effects": { "type": "limlib:static", "sky_type": "END", ... },
//!   "reverb": "limlib:default",
//!   "distortion": { "type": "limlib:empty" }
//! }
//! ```
//!
//! Each member is either an inline tagged record or the key of a preset.
//! Absent members resolve to the family's empty variant.

use serde_json::{Map, Value};
use thiserror::Error;

use limlib_registry::{json_kind, CodecError, EffectFamily};

use crate::{DistortionEffect, EffectRegistries, Family, ReverbEffect, SkyEffects};

/// Member holding the sky effects.
pub const SKY_EFFECTS_MEMBER: &str = "sky_effects";
/// Member holding the reverb effect.
pub const REVERB_MEMBER: &str = "reverb";
/// Member holding the distortion effect.
pub const DISTORTION_MEMBER: &str = "distortion";

/// Errors raised while reading or writing a [`DimensionEffects`] document.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// The document root is not a record.
    #[error("expected a dimension effects record, found {found}")]
    NotARecord {
        /// JSON kind found instead.
        found: &'static str,
    },
    /// A member referenced a preset that does not exist.
    #[error("{member}: unknown preset {key:?}")]
    UnknownPreset {
        /// Member name.
        member: &'static str,
        /// Preset key as written.
        key: String,
    },
    /// A member failed to encode or decode.
    #[error("{member}: {source}")]
    Member {
        /// Member name.
        member: &'static str,
        /// Underlying codec failure.
        #[source]
        source: CodecError,
    },
    /// Document text is not valid JSON.
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
}

impl DocumentError {
    /// Member the error refers to, if any.
    pub fn member(&self) -> Option<&'static str> {
        match self {
            Self::UnknownPreset { member, .. } | Self::Member { member, .. } => Some(member),
            _ => None,
        }
    }
}

/// Effects attached to one dimension.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DimensionEffects {
    /// Sky rendering effects.
    pub sky_effects: SkyEffects,
    /// Ambient reverb.
    pub reverb: ReverbEffect,
    /// Ambient distortion.
    pub distortion: DistortionEffect,
}

impl EffectRegistries {
    /// Decode a document value.
    pub fn decode_document(&self, input: &Value) -> Result<DimensionEffects, DocumentError> {
        let Value::Object(members) = input else {
            return Err(DocumentError::NotARecord {
                found: json_kind(input),
            });
        };
        Ok(DimensionEffects {
            sky_effects: decode_member(self.sky(), members, SKY_EFFECTS_MEMBER)?,
            reverb: decode_member(self.reverb(), members, REVERB_MEMBER)?,
            distortion: decode_member(self.distortion(), members, DISTORTION_MEMBER)?,
        })
    }

    /// Encode a document; every member is written inline.
    pub fn encode_document(&self, effects: &DimensionEffects) -> Result<Value, DocumentError> {
        let mut members = Map::new();
        members.insert(
            SKY_EFFECTS_MEMBER.to_string(),
            encode_member(self.sky(), &effects.sky_effects, SKY_EFFECTS_MEMBER)?,
        );
        members.insert(
            REVERB_MEMBER.to_string(),
            encode_member(self.reverb(), &effects.reverb, REVERB_MEMBER)?,
        );
        members.insert(
            DISTORTION_MEMBER.to_string(),
            encode_member(self.distortion(), &effects.distortion, DISTORTION_MEMBER)?,
        );
        Ok(Value::Object(members))
    }

    /// Decode a document from JSON text.
    pub fn document_from_str(&self, input: &str) -> Result<DimensionEffects, DocumentError> {
        let value: Value = serde_json::from_str(input)?;
        self.decode_document(&value)
    }

    /// Encode a document as pretty-printed JSON text.
    pub fn document_to_string_pretty(
        &self,
        effects: &DimensionEffects,
    ) -> Result<String, DocumentError> {
        Ok(serde_json::to_string_pretty(&self.encode_document(effects)?)?)
    }
}

fn decode_member<F: EffectFamily + Copy + Default>(
    family: &Family<F>,
    members: &Map<String, Value>,
    member: &'static str,
) -> Result<F, DocumentError> {
    match members.get(member) {
        None | Some(Value::Null) => Ok(F::default()),
        Some(Value::String(key)) => {
            family
                .preset(key)
                .copied()
                .ok_or_else(|| DocumentError::UnknownPreset {
                    member,
                    key: key.clone(),
                })
        }
        Some(value) => family
            .decode(value)
            .map_err(|source| DocumentError::Member { member, source }),
    }
}

fn encode_member<F: EffectFamily>(
    family: &Family<F>,
    value: &F,
    member: &'static str,
) -> Result<Value, DocumentError> {
    family
        .encode(value)
        .map_err(|source| DocumentError::Member { member, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn absent_members_default_to_empty() {
        let registries = EffectRegistries::builtin().unwrap();
        let effects = registries.decode_document(&json!({})).unwrap();
        assert_eq!(effects, DimensionEffects::default());
    }

    #[test]
    fn string_members_resolve_presets() {
        let registries = EffectRegistries::builtin().unwrap();
        let effects = registries
            .decode_document(&json!({ "sky_effects": "limlib:default" }))
            .unwrap();
        assert_eq!(effects.sky_effects, SkyEffects::Empty);

        let err = registries
            .decode_document(&json!({ "reverb": "limlib:cathedral" }))
            .unwrap_err();
        assert!(matches!(
            err,
            DocumentError::UnknownPreset { member: "reverb", ref key } if key == "limlib:cathedral"
        ));
    }

    #[test]
    fn member_errors_name_the_member() {
        let registries = EffectRegistries::builtin().unwrap();
        let err = registries
            .decode_document(&json!({ "distortion": { "type": "limlib:static" } }))
            .unwrap_err();
        assert_eq!(err.member(), Some("distortion"));
        match err {
            DocumentError::Member { source, .. } => {
                assert_eq!(source.field_name(), Some("enabled"));
            }
            other => panic!("unexpected error: {other}"),
        }

        let err = registries.decode_document(&json!([1, 2])).unwrap_err();
        assert!(matches!(err, DocumentError::NotARecord { found: "array" }));
    }
}
