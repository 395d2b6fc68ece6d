//! Sky effects: a host-independent description of a dimension's sky.

use serde::{Deserialize, Serialize};

use limlib_registry::{CodecError, Descriptor, DescriptorId, EffectFamily, FieldReader, Record};

/// Descriptor of [`SkyEffects::Empty`].
pub const EMPTY_SKY_EFFECTS: DescriptorId = DescriptorId::new("limlib/sky_effects/empty");
/// Descriptor of [`SkyEffects::Static`].
pub const STATIC_SKY_EFFECTS: DescriptorId = DescriptorId::new("limlib/sky_effects/static");
/// Descriptor of [`SkyEffects::Shaded`].
pub const SHADED_SKY_EFFECTS: DescriptorId = DescriptorId::new("limlib/sky_effects/static_v2");

/// Sky shading reported by variants that don't carry one.
pub const DEFAULT_SKY_SHADING: f32 = 1.0;

const EMPTY: StaticSkyEffects = StaticSkyEffects {
    cloud_height: None,
    alternate_sky_color: false,
    sky_type: SkyType::None,
    brighten_lighting: false,
    darkened: false,
    thick_fog: false,
};

/// Which sky the host renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SkyType {
    /// No sky.
    #[default]
    None,
    /// Overworld-style sky.
    Normal,
    /// End-style sky.
    End,
}

impl SkyType {
    /// Canonical name as stored in documents.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Normal => "NORMAL",
            Self::End => "END",
        }
    }
}

/// Sky effects family.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum SkyEffects {
    /// Every setting at its default; registered as `limlib:empty`.
    #[default]
    Empty,
    /// Fixed settings; registered as `limlib:static`.
    Static(StaticSkyEffects),
    /// Fixed settings plus sky shading; registered as `limlib:static/v2`.
    Shaded(ShadedSkyEffects),
}

impl EffectFamily for SkyEffects {
    const NAME: &'static str = "limlib/sky_effects";

    fn descriptor_id(&self) -> DescriptorId {
        match self {
            Self::Empty => EMPTY_SKY_EFFECTS,
            Self::Static(_) => STATIC_SKY_EFFECTS,
            Self::Shaded(_) => SHADED_SKY_EFFECTS,
        }
    }
}

impl SkyEffects {
    /// The static settings this variant resolves to.
    pub fn settings(&self) -> &StaticSkyEffects {
        match self {
            Self::Empty => &EMPTY,
            Self::Static(settings) => settings,
            Self::Shaded(shaded) => &shaded.base,
        }
    }

    /// Sky shading, [`DEFAULT_SKY_SHADING`] for unshaded variants.
    pub fn sky_shading(&self) -> f32 {
        match self {
            Self::Shaded(shaded) => shaded.sky_shading,
            _ => DEFAULT_SKY_SHADING,
        }
    }

    /// Project into the properties the host renderer consumes.
    pub fn to_sky_properties(&self) -> SkyProperties {
        let settings = self.settings();
        SkyProperties {
            cloud_height: settings.cloud_height(),
            alternate_sky_color: settings.alternate_sky_color,
            sky_type: settings.sky_type,
            brighten_lighting: settings.brighten_lighting,
            darkened: settings.darkened,
            thick_fog: settings.thick_fog,
            sky_shading: self.sky_shading(),
        }
    }

    /// Descriptor for [`SkyEffects::Empty`].
    pub fn empty_descriptor() -> Descriptor<Self> {
        Descriptor::unit(EMPTY_SKY_EFFECTS, || Self::Empty)
    }
}

/// Sky settings where every value is fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StaticSkyEffects {
    #[serde(skip_serializing_if = "Option::is_none")]
    cloud_height: Option<f32>,
    alternate_sky_color: bool,
    sky_type: SkyType,
    brighten_lighting: bool,
    darkened: bool,
    thick_fog: bool,
}

impl Default for StaticSkyEffects {
    fn default() -> Self {
        EMPTY
    }
}

impl StaticSkyEffects {
    /// Build static settings. A non-finite `cloud_height` means no clouds.
    pub fn new(
        cloud_height: Option<f32>,
        alternate_sky_color: bool,
        sky_type: SkyType,
        brighten_lighting: bool,
        darkened: bool,
        thick_fog: bool,
    ) -> Self {
        Self {
            cloud_height: cloud_height.filter(|height| height.is_finite()),
            alternate_sky_color,
            sky_type,
            brighten_lighting,
            darkened,
            thick_fog,
        }
    }

    /// Cloud height, `NaN` when absent (the host's "no clouds" sentinel).
    pub fn cloud_height(&self) -> f32 {
        self.cloud_height.unwrap_or(f32::NAN)
    }

    /// Cloud height as stored.
    pub fn cloud_height_opt(&self) -> Option<f32> {
        self.cloud_height
    }

    /// Whether the alternate sky color is used.
    pub fn alternate_sky_color(&self) -> bool {
        self.alternate_sky_color
    }

    /// Sky type.
    pub fn sky_type(&self) -> SkyType {
        self.sky_type
    }

    /// Whether lighting is brightened.
    pub fn brighten_lighting(&self) -> bool {
        self.brighten_lighting
    }

    /// Whether the sky is darkened.
    pub fn darkened(&self) -> bool {
        self.darkened
    }

    /// Whether thick fog is used everywhere.
    pub fn thick_fog(&self) -> bool {
        self.thick_fog
    }

    /// Descriptor for [`SkyEffects::Static`].
    pub fn descriptor() -> Descriptor<SkyEffects> {
        Descriptor::record(STATIC_SKY_EFFECTS, SkyEffects::Static, |sky| match sky {
            SkyEffects::Static(settings) => Some(settings),
            _ => None,
        })
    }
}

impl Record for StaticSkyEffects {
    fn read(fields: &FieldReader<'_>) -> Result<Self, CodecError> {
        let cloud_height: Option<f32> = fields.optional("cloud_height")?;
        if cloud_height.is_some_and(|height| !height.is_finite()) {
            return Err(CodecError::field("cloud_height", "must be a finite number"));
        }
        Ok(Self {
            cloud_height,
            alternate_sky_color: fields.required("alternate_sky_color")?,
            sky_type: fields.required("sky_type")?,
            brighten_lighting: fields.required("brighten_lighting")?,
            darkened: fields.required("darkened")?,
            thick_fog: fields.required("thick_fog")?,
        })
    }
}

/// Second schema revision of [`StaticSkyEffects`], adding `sky_shading`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ShadedSkyEffects {
    #[serde(flatten)]
    base: StaticSkyEffects,
    sky_shading: f32,
}

impl ShadedSkyEffects {
    /// Accepted `sky_shading` range.
    pub const SKY_SHADING: std::ops::RangeInclusive<f32> = 0.0..=1.0;

    /// Build shaded settings; `sky_shading` is clamped to [`Self::SKY_SHADING`]
    /// and NaN becomes [`DEFAULT_SKY_SHADING`].
    pub fn new(base: StaticSkyEffects, sky_shading: f32) -> Self {
        let sky_shading = if sky_shading.is_nan() {
            DEFAULT_SKY_SHADING
        } else {
            sky_shading.clamp(*Self::SKY_SHADING.start(), *Self::SKY_SHADING.end())
        };
        Self { base, sky_shading }
    }

    /// The v1 settings.
    pub fn base(&self) -> &StaticSkyEffects {
        &self.base
    }

    /// Sky shading multiplier.
    pub fn sky_shading(&self) -> f32 {
        self.sky_shading
    }

    /// Descriptor for [`SkyEffects::Shaded`].
    pub fn descriptor() -> Descriptor<SkyEffects> {
        Descriptor::record(SHADED_SKY_EFFECTS, SkyEffects::Shaded, |sky| match sky {
            SkyEffects::Shaded(shaded) => Some(shaded),
            _ => None,
        })
    }
}

impl Record for ShadedSkyEffects {
    fn read(fields: &FieldReader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            base: StaticSkyEffects::read(fields)?,
            sky_shading: fields.required_in("sky_shading", Self::SKY_SHADING)?,
        })
    }
}

/// Sky parameters handed to the host renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkyProperties {
    /// Cloud height; `NaN` disables clouds.
    pub cloud_height: f32,
    /// Whether the alternate sky color is used.
    pub alternate_sky_color: bool,
    /// Which sky to render.
    pub sky_type: SkyType,
    /// Whether lighting is brightened.
    pub brighten_lighting: bool,
    /// Whether the sky is darkened.
    pub darkened: bool,
    /// Whether thick fog is used.
    pub thick_fog: bool,
    /// Sky shading multiplier.
    pub sky_shading: f32,
}

impl SkyProperties {
    /// Fog color adjustment; static skies leave the color untouched.
    pub fn adjust_fog_color(&self, color: [f64; 3], _sun_height: f32) -> [f64; 3] {
        color
    }

    /// Whether thick fog applies at the given camera column.
    pub fn use_thick_fog(&self, _camera_x: i32, _camera_y: i32) -> bool {
        self.thick_fog
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_resolves_to_defaults() {
        let settings = SkyEffects::Empty.settings();
        assert!(settings.cloud_height().is_nan());
        assert_eq!(settings.cloud_height_opt(), None);
        assert_eq!(settings.sky_type(), SkyType::None);
        assert!(!settings.alternate_sky_color());
        assert!(!settings.thick_fog());
        assert_eq!(*settings, StaticSkyEffects::default());
    }

    #[test]
    fn projection_copies_fields() {
        let sky = SkyEffects::Static(StaticSkyEffects::new(
            Some(128.0),
            true,
            SkyType::End,
            true,
            false,
            true,
        ));
        let props = sky.to_sky_properties();
        assert_eq!(props.cloud_height, 128.0);
        assert_eq!(props.sky_type, SkyType::End);
        assert!(props.use_thick_fog(0, 0));
        assert_eq!(props.sky_shading, DEFAULT_SKY_SHADING);
        assert_eq!(props.adjust_fog_color([0.1, 0.2, 0.3], 0.5), [0.1, 0.2, 0.3]);
    }

    #[test]
    fn shading_is_clamped_on_construction() {
        let shaded = ShadedSkyEffects::new(StaticSkyEffects::default(), 3.0);
        assert_eq!(shaded.sky_shading(), 1.0);
        assert_eq!(SkyEffects::Shaded(shaded).to_sky_properties().sky_shading, 1.0);
    }

    #[test]
    fn non_finite_inputs_are_normalized() {
        for height in [f32::NAN, f32::INFINITY, f32::NEG_INFINITY] {
            let settings =
                StaticSkyEffects::new(Some(height), false, SkyType::Normal, false, false, false);
            assert_eq!(settings.cloud_height_opt(), None);
            assert!(settings.cloud_height().is_nan());
        }

        let base = StaticSkyEffects::default();
        assert_eq!(ShadedSkyEffects::new(base, f32::NAN).sky_shading(), DEFAULT_SKY_SHADING);
        assert_eq!(ShadedSkyEffects::new(base, f32::INFINITY).sky_shading(), 1.0);
        assert_eq!(ShadedSkyEffects::new(base, f32::NEG_INFINITY).sky_shading(), 0.0);
    }

    #[test]
    fn sky_type_names_match_documents() {
        for sky_type in [SkyType::None, SkyType::Normal, SkyType::End] {
            let json = serde_json::to_value(sky_type).unwrap();
            assert_eq!(json, serde_json::Value::from(sky_type.as_str()));
        }
    }
}
