//! Tagged-union codec over a frozen variant table.

use serde_json::{Map, Value};
use tracing::error;

use limlib_core::RegistryKey;

use crate::error::json_kind;
use crate::{CodecError, EffectFamily, FieldReader, VariantTable};

/// Encodes and decodes any value of family `F` as
/// `{ <F::TAG>: <key>, ...fields }`.
///
/// Only constructible from a frozen [`VariantTable`], so the key set it sees
/// never changes.
pub struct DispatchCodec<F: EffectFamily> {
    variants: VariantTable<F>,
}

impl<F: EffectFamily> Clone for DispatchCodec<F> {
    fn clone(&self) -> Self {
        Self {
            variants: self.variants.clone(),
        }
    }
}

impl<F: EffectFamily> DispatchCodec<F> {
    /// Builds the codec from a frozen table.
    pub fn new(variants: VariantTable<F>) -> Self {
        Self { variants }
    }

    /// The variant table backing this codec.
    pub fn variants(&self) -> &VariantTable<F> {
        &self.variants
    }

    /// Encode `value` into a tagged record.
    pub fn encode(&self, value: &F) -> Result<Value, CodecError> {
        let descriptor_id = value.descriptor_id();
        let Some((key, descriptor)) = self
            .variants
            .key_of(descriptor_id)
            .and_then(|key| Some((key, self.variants.lookup_by_key(key)?)))
        else {
            error!(
                family = F::NAME,
                descriptor = %descriptor_id,
                "attempted to encode an unregistered variant"
            );
            return Err(CodecError::UnregisteredVariant {
                family: F::NAME,
                descriptor: descriptor_id,
            });
        };

        let mut fields = descriptor.encode(value)?;
        if fields.contains_key(F::TAG) {
            return Err(CodecError::TagCollision {
                family: F::NAME,
                tag: F::TAG,
            });
        }

        let mut record = Map::new();
        record.insert(F::TAG.to_string(), Value::String(key.to_string()));
        record.append(&mut fields);
        Ok(Value::Object(record))
    }

    /// Decode a tagged record. No value is constructed unless every field
    /// decodes.
    pub fn decode(&self, input: &Value) -> Result<F, CodecError> {
        let Value::Object(fields) = input else {
            return Err(CodecError::NotARecord {
                found: json_kind(input),
            });
        };

        let tag = fields.get(F::TAG).ok_or(CodecError::MissingTag {
            family: F::NAME,
            tag: F::TAG,
        })?;
        let Value::String(raw) = tag else {
            return Err(CodecError::field(
                F::TAG,
                format!("expected a registry key string, found {}", json_kind(tag)),
            ));
        };
        let key =
            RegistryKey::parse(raw).map_err(|err| CodecError::field(F::TAG, err.to_string()))?;

        let descriptor =
            self.variants
                .lookup_by_key(&key)
                .ok_or_else(|| CodecError::UnknownVariant {
                    family: F::NAME,
                    key: raw.clone(),
                })?;
        descriptor.decode(&FieldReader::new(fields))
    }

    /// Encode `value` as a compact JSON string.
    pub fn to_json_string(&self, value: &F) -> Result<String, CodecError> {
        Ok(serde_json::to_string(&self.encode(value)?)?)
    }

    /// Decode a value from JSON text.
    pub fn from_json_str(&self, input: &str) -> Result<F, CodecError> {
        let value: Value = serde_json::from_str(input)?;
        self.decode(&value)
    }
}
