//! Variant descriptors and field-level decoding.

use std::fmt;
use std::ops::RangeInclusive;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::json_kind;
use crate::CodecError;

/// An abstract effect family: a closed enum with one case per variant.
pub trait EffectFamily: Sized + Send + Sync + 'static {
    /// Registry label, e.g. `limlib/sky_effects`.
    const NAME: &'static str;
    /// Name of the tag field carrying the variant key.
    const TAG: &'static str = "type";

    /// Descriptor of the concrete variant this value is.
    fn descriptor_id(&self) -> DescriptorId;
}

/// Stable identity of a [`Descriptor`], independent of the key it is
/// registered under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DescriptorId(&'static str);

impl DescriptorId {
    /// Wraps a static identifier.
    pub const fn new(id: &'static str) -> Self {
        Self(id)
    }

    /// The identifier string.
    pub const fn as_str(self) -> &'static str {
        self.0
    }
}

impl fmt::Display for DescriptorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// A concrete variant's field record.
///
/// Encoding goes through `Serialize` and must produce a JSON object; decoding
/// reads each field by name so errors identify the field that failed.
pub trait Record: Serialize + Sized {
    /// Decode the record from its fields.
    fn read(fields: &FieldReader<'_>) -> Result<Self, CodecError>;
}

type EncodeFn<F> = dyn Fn(&F) -> Result<Map<String, Value>, CodecError> + Send + Sync;
type DecodeFn<F> = dyn Fn(&FieldReader<'_>) -> Result<F, CodecError> + Send + Sync;

/// Serialization descriptor for one concrete variant of family `F`.
pub struct Descriptor<F> {
    id: DescriptorId,
    encode: Box<EncodeFn<F>>,
    decode: Box<DecodeFn<F>>,
}

impl<F: EffectFamily> Descriptor<F> {
    /// Descriptor for a variant carrying a [`Record`].
    ///
    /// `wrap` lifts the record into the family; `unwrap` projects it back out
    /// and returns `None` for other variants.
    pub fn record<V>(id: DescriptorId, wrap: fn(V) -> F, unwrap: fn(&F) -> Option<&V>) -> Self
    where
        V: Record + 'static,
    {
        Self {
            id,
            encode: Box::new(move |value: &F| match unwrap(value) {
                Some(record) => encode_record(record),
                None => Err(CodecError::VariantMismatch {
                    family: F::NAME,
                    descriptor: id,
                }),
            }),
            decode: Box::new(move |fields: &FieldReader<'_>| V::read(fields).map(wrap)),
        }
    }

    /// Descriptor for a field-less variant. Encodes as an empty record and
    /// decodes to `make()` regardless of extra fields.
    pub fn unit(id: DescriptorId, make: fn() -> F) -> Self {
        Self {
            id,
            encode: Box::new(move |value: &F| {
                if value.descriptor_id() == id {
                    Ok(Map::new())
                } else {
                    Err(CodecError::VariantMismatch {
                        family: F::NAME,
                        descriptor: id,
                    })
                }
            }),
            decode: Box::new(move |_: &FieldReader<'_>| Ok(make())),
        }
    }

    /// Identity of this descriptor.
    pub fn id(&self) -> DescriptorId {
        self.id
    }

    /// Encode `value`'s fields (without the tag).
    pub fn encode(&self, value: &F) -> Result<Map<String, Value>, CodecError> {
        (self.encode)(value)
    }

    /// Decode a value from its fields.
    pub fn decode(&self, fields: &FieldReader<'_>) -> Result<F, CodecError> {
        (self.decode)(fields)
    }
}

impl<F> fmt::Debug for Descriptor<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Descriptor").field("id", &self.id).finish()
    }
}

fn encode_record<V: Serialize>(record: &V) -> Result<Map<String, Value>, CodecError> {
    match serde_json::to_value(record)? {
        Value::Object(fields) => Ok(fields),
        other => Err(CodecError::NotARecord {
            found: json_kind(&other),
        }),
    }
}

/// Typed, name-addressed access to a record's fields.
///
/// Absent and `null` fields are treated the same; only `optional*` readers
/// accept them.
#[derive(Debug, Clone, Copy)]
pub struct FieldReader<'a> {
    fields: &'a Map<String, Value>,
}

impl<'a> FieldReader<'a> {
    /// Wraps a record's field map.
    pub fn new(fields: &'a Map<String, Value>) -> Self {
        Self { fields }
    }

    fn raw(&self, field: &str) -> Option<&'a Value> {
        self.fields.get(field).filter(|value| !value.is_null())
    }

    /// Whether `field` is present and non-null.
    pub fn has(&self, field: &str) -> bool {
        self.raw(field).is_some()
    }

    /// A field that must be present.
    pub fn required<T: DeserializeOwned>(&self, field: &str) -> Result<T, CodecError> {
        let raw = self
            .raw(field)
            .ok_or_else(|| CodecError::field(field, "missing required field"))?;
        parse_field(field, raw)
    }

    /// A field that may be absent.
    pub fn optional<T: DeserializeOwned>(&self, field: &str) -> Result<Option<T>, CodecError> {
        self.raw(field).map(|raw| parse_field(field, raw)).transpose()
    }

    /// A required field constrained to `range`.
    pub fn required_in<T>(&self, field: &str, range: RangeInclusive<T>) -> Result<T, CodecError>
    where
        T: DeserializeOwned + PartialOrd + fmt::Display,
    {
        let value = self.required(field)?;
        check_range(field, value, &range)
    }

    /// An optional field constrained to `range` when present.
    pub fn optional_in<T>(
        &self,
        field: &str,
        range: RangeInclusive<T>,
    ) -> Result<Option<T>, CodecError>
    where
        T: DeserializeOwned + PartialOrd + fmt::Display,
    {
        self.optional(field)?
            .map(|value| check_range(field, value, &range))
            .transpose()
    }

    /// An optional field constrained to `range`, falling back to `default`.
    pub fn optional_in_or<T>(
        &self,
        field: &str,
        range: RangeInclusive<T>,
        default: T,
    ) -> Result<T, CodecError>
    where
        T: DeserializeOwned + PartialOrd + fmt::Display,
    {
        Ok(self.optional_in(field, range)?.unwrap_or(default))
    }

    /// A required string that must not be blank.
    pub fn required_non_empty(&self, field: &str) -> Result<String, CodecError> {
        let value: String = self.required(field)?;
        if value.trim().is_empty() {
            return Err(CodecError::field(field, "must not be empty"));
        }
        Ok(value)
    }
}

fn parse_field<T: DeserializeOwned>(field: &str, raw: &Value) -> Result<T, CodecError> {
    T::deserialize(raw).map_err(|err| CodecError::field(field, err.to_string()))
}

fn check_range<T>(
    field: &str,
    value: T,
    range: &RangeInclusive<T>,
) -> Result<T, CodecError>
where
    T: PartialOrd + fmt::Display,
{
    if range.contains(&value) {
        Ok(value)
    } else {
        Err(CodecError::field(
            field,
            format!(
                "{value} is outside [{}, {}]",
                range.start(),
                range.end()
            ),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("test input must be an object"),
        }
    }

    #[test]
    fn required_fields_name_themselves_in_errors() {
        let map = fields(json!({ "gain": "loud" }));
        let reader = FieldReader::new(&map);

        let err = reader.required::<f32>("edge").unwrap_err();
        assert_eq!(err.field_name(), Some("edge"));
        assert!(err.to_string().contains("missing required field"));

        let err = reader.required::<f32>("gain").unwrap_err();
        assert_eq!(err.field_name(), Some("gain"));
    }

    #[test]
    fn optional_fields_accept_absence_and_null() {
        let map = fields(json!({ "cloud_height": null, "darkened": true }));
        let reader = FieldReader::new(&map);

        assert_eq!(reader.optional::<f32>("cloud_height").unwrap(), None);
        assert_eq!(reader.optional::<f32>("missing").unwrap(), None);
        assert_eq!(reader.optional::<bool>("darkened").unwrap(), Some(true));
        assert!(!reader.has("cloud_height"));
        assert!(reader.has("darkened"));
    }

    #[test]
    fn range_checks_report_the_domain() {
        let map = fields(json!({ "density": 1.5, "edge": 0.25 }));
        let reader = FieldReader::new(&map);

        let err = reader.required_in("density", 0.0f32..=1.0).unwrap_err();
        assert_eq!(err.field_name(), Some("density"));
        assert!(err.to_string().contains("outside [0, 1]"));

        assert_eq!(reader.required_in("edge", 0.0f32..=1.0).unwrap(), 0.25);
        assert_eq!(
            reader.optional_in_or("gain", 0.01f32..=1.0, 0.05).unwrap(),
            0.05
        );
    }

    #[test]
    fn blank_strings_are_rejected() {
        let map = fields(json!({ "name": "  " }));
        let reader = FieldReader::new(&map);
        let err = reader.required_non_empty("name").unwrap_err();
        assert_eq!(err.field_name(), Some("name"));
    }
}
