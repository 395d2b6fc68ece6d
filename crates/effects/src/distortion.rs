//! Distortion effects, expressed as EFX distortion parameters.

use std::ops::RangeInclusive;

use serde::Serialize;

use limlib_registry::{CodecError, Descriptor, DescriptorId, EffectFamily, FieldReader, Record};

/// Descriptor of [`DistortionEffect::Empty`].
pub const EMPTY_DISTORTION_EFFECT: DescriptorId =
    DescriptorId::new("limlib/distortion_effects/empty");
/// Descriptor of [`DistortionEffect::Static`].
pub const STATIC_DISTORTION_EFFECT: DescriptorId =
    DescriptorId::new("limlib/distortion_effects/static");

/// Accepted `edge` range.
pub const EDGE: RangeInclusive<f32> = 0.0..=1.0;
/// Accepted `gain` range.
pub const GAIN: RangeInclusive<f32> = 0.01..=1.0;
/// Accepted range for the frequency parameters, in Hz.
pub const FREQUENCY: RangeInclusive<f32> = 80.0..=24000.0;

/// Distortion effects family.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DistortionEffect {
    /// No distortion; registered as `limlib:empty`.
    #[default]
    Empty,
    /// Fixed parameters; registered as `limlib:static`.
    Static(StaticDistortionEffect),
}

impl EffectFamily for DistortionEffect {
    const NAME: &'static str = "limlib/distortion_effects";

    fn descriptor_id(&self) -> DescriptorId {
        match self {
            Self::Empty => EMPTY_DISTORTION_EFFECT,
            Self::Static(_) => STATIC_DISTORTION_EFFECT,
        }
    }
}

impl DistortionEffect {
    /// Parameters the host should apply, or `None` when distortion is off.
    pub fn active(&self) -> Option<&StaticDistortionEffect> {
        match self {
            Self::Static(effect) if effect.enabled => Some(effect),
            _ => None,
        }
    }

    /// Descriptor for [`DistortionEffect::Empty`].
    pub fn empty_descriptor() -> Descriptor<Self> {
        Descriptor::unit(EMPTY_DISTORTION_EFFECT, || Self::Empty)
    }
}

/// Distortion with fixed parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StaticDistortionEffect {
    enabled: bool,
    edge: f32,
    gain: f32,
    lowpass_cutoff: f32,
    eq_center: f32,
    eq_bandwidth: f32,
}

impl Default for StaticDistortionEffect {
    fn default() -> Self {
        Self {
            enabled: true,
            edge: 0.2,
            gain: 0.05,
            lowpass_cutoff: 8000.0,
            eq_center: 3600.0,
            eq_bandwidth: 3600.0,
        }
    }
}

impl StaticDistortionEffect {
    /// Build with every value clamped to its EFX range. NaN takes the
    /// parameter's default.
    pub fn new(
        enabled: bool,
        edge: f32,
        gain: f32,
        lowpass_cutoff: f32,
        eq_center: f32,
        eq_bandwidth: f32,
    ) -> Self {
        let d = Self::default();
        Self {
            enabled,
            edge: clamp(edge, EDGE, d.edge),
            gain: clamp(gain, GAIN, d.gain),
            lowpass_cutoff: clamp(lowpass_cutoff, FREQUENCY, d.lowpass_cutoff),
            eq_center: clamp(eq_center, FREQUENCY, d.eq_center),
            eq_bandwidth: clamp(eq_bandwidth, FREQUENCY, d.eq_bandwidth),
        }
    }

    /// Whether the effect is applied.
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Distortion shape.
    pub fn edge(&self) -> f32 {
        self.edge
    }

    /// Output level.
    pub fn gain(&self) -> f32 {
        self.gain
    }

    /// Pre-distortion low-pass cutoff in Hz.
    pub fn lowpass_cutoff(&self) -> f32 {
        self.lowpass_cutoff
    }

    /// Post-distortion band-pass center in Hz.
    pub fn eq_center(&self) -> f32 {
        self.eq_center
    }

    /// Post-distortion band-pass width in Hz.
    pub fn eq_bandwidth(&self) -> f32 {
        self.eq_bandwidth
    }

    /// Descriptor for [`DistortionEffect::Static`].
    pub fn descriptor() -> Descriptor<DistortionEffect> {
        Descriptor::record(
            STATIC_DISTORTION_EFFECT,
            DistortionEffect::Static,
            |distortion| match distortion {
                DistortionEffect::Static(effect) => Some(effect),
                _ => None,
            },
        )
    }
}

impl Record for StaticDistortionEffect {
    fn read(fields: &FieldReader<'_>) -> Result<Self, CodecError> {
        let d = Self::default();
        Ok(Self {
            enabled: fields.required("enabled")?,
            edge: fields.optional_in_or("edge", EDGE, d.edge)?,
            gain: fields.optional_in_or("gain", GAIN, d.gain)?,
            lowpass_cutoff: fields.optional_in_or("lowpass_cutoff", FREQUENCY, d.lowpass_cutoff)?,
            eq_center: fields.optional_in_or("eq_center", FREQUENCY, d.eq_center)?,
            eq_bandwidth: fields.optional_in_or("eq_bandwidth", FREQUENCY, d.eq_bandwidth)?,
        })
    }
}

fn clamp(value: f32, range: RangeInclusive<f32>, fallback: f32) -> f32 {
    if value.is_nan() {
        fallback
    } else {
        value.clamp(*range.start(), *range.end())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn construction_clamps_parameters() {
        let effect = StaticDistortionEffect::new(true, 3.0, 0.0, 10.0, 50000.0, 1200.0);
        assert_eq!(effect.edge(), 1.0);
        assert_eq!(effect.gain(), 0.01);
        assert_eq!(effect.lowpass_cutoff(), 80.0);
        assert_eq!(effect.eq_center(), 24000.0);
        assert_eq!(effect.eq_bandwidth(), 1200.0);
    }

    #[test]
    fn non_finite_parameters_stay_in_range() {
        let d = StaticDistortionEffect::default();
        let effect = StaticDistortionEffect::new(
            true,
            f32::NAN,
            f32::INFINITY,
            f32::NEG_INFINITY,
            f32::NAN,
            f32::INFINITY,
        );
        assert_eq!(effect.edge(), d.edge());
        assert_eq!(effect.gain(), 1.0);
        assert_eq!(effect.lowpass_cutoff(), 80.0);
        assert_eq!(effect.eq_center(), d.eq_center());
        assert_eq!(effect.eq_bandwidth(), 24000.0);
    }

    #[test]
    fn only_enabled_static_distortion_is_active() {
        assert!(DistortionEffect::Empty.active().is_none());
        let off = StaticDistortionEffect::new(false, 0.5, 0.5, 8000.0, 3600.0, 3600.0);
        assert!(DistortionEffect::Static(off).active().is_none());
        let on = StaticDistortionEffect::default();
        assert_eq!(DistortionEffect::Static(on).active(), Some(&on));
    }
}
