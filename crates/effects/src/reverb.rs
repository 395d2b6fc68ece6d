//! Reverb effects, expressed as EFX EAX-reverb parameters.

use std::ops::RangeInclusive;

use serde::Serialize;

use limlib_registry::{CodecError, Descriptor, DescriptorId, EffectFamily, FieldReader, Record};

/// Descriptor of [`ReverbEffect::Empty`].
pub const EMPTY_REVERB_EFFECT: DescriptorId = DescriptorId::new("limlib/reverb_effects/empty");
/// Descriptor of [`ReverbEffect::Static`].
pub const STATIC_REVERB_EFFECT: DescriptorId = DescriptorId::new("limlib/reverb_effects/static");

/// Accepted parameter ranges, as defined by the EFX extension.
pub mod ranges {
    use super::RangeInclusive;

    /// `density`.
    pub const DENSITY: RangeInclusive<f32> = 0.0..=1.0;
    /// `diffusion`.
    pub const DIFFUSION: RangeInclusive<f32> = 0.0..=1.0;
    /// `gain`.
    pub const GAIN: RangeInclusive<f32> = 0.0..=1.0;
    /// `gain_hf`.
    pub const GAIN_HF: RangeInclusive<f32> = 0.0..=1.0;
    /// `decay_time` in seconds.
    pub const DECAY_TIME: RangeInclusive<f32> = 0.1..=20.0;
    /// `decay_hf_ratio`.
    pub const DECAY_HF_RATIO: RangeInclusive<f32> = 0.1..=2.0;
    /// `reflections_gain`.
    pub const REFLECTIONS_GAIN: RangeInclusive<f32> = 0.0..=3.16;
    /// `reflections_delay` in seconds.
    pub const REFLECTIONS_DELAY: RangeInclusive<f32> = 0.0..=0.3;
    /// `late_reverb_gain`.
    pub const LATE_REVERB_GAIN: RangeInclusive<f32> = 0.0..=10.0;
    /// `late_reverb_delay` in seconds.
    pub const LATE_REVERB_DELAY: RangeInclusive<f32> = 0.0..=0.1;
    /// `air_absorption_gain_hf`.
    pub const AIR_ABSORPTION_GAIN_HF: RangeInclusive<f32> = 0.892..=1.0;
    /// `room_rolloff_factor`.
    pub const ROOM_ROLLOFF_FACTOR: RangeInclusive<f32> = 0.0..=10.0;
}

/// Reverb effects family.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ReverbEffect {
    /// No reverb; registered as `limlib:empty`.
    #[default]
    Empty,
    /// Fixed parameters; registered as `limlib:static`.
    Static(StaticReverbEffect),
}

impl EffectFamily for ReverbEffect {
    const NAME: &'static str = "limlib/reverb_effects";

    fn descriptor_id(&self) -> DescriptorId {
        match self {
            Self::Empty => EMPTY_REVERB_EFFECT,
            Self::Static(_) => STATIC_REVERB_EFFECT,
        }
    }
}

impl ReverbEffect {
    /// Parameters the host should apply, or `None` when reverb is off.
    pub fn active(&self) -> Option<&StaticReverbEffect> {
        match self {
            Self::Static(effect) if effect.enabled => Some(effect),
            _ => None,
        }
    }

    /// Descriptor for [`ReverbEffect::Empty`].
    pub fn empty_descriptor() -> Descriptor<Self> {
        Descriptor::unit(EMPTY_REVERB_EFFECT, || Self::Empty)
    }
}

/// Reverb with fixed parameters.
///
/// Only `enabled` is required in documents; every other parameter falls
/// back to its EFX default when absent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StaticReverbEffect {
    enabled: bool,
    density: f32,
    diffusion: f32,
    gain: f32,
    gain_hf: f32,
    decay_time: f32,
    decay_hf_ratio: f32,
    reflections_gain: f32,
    reflections_delay: f32,
    late_reverb_gain: f32,
    late_reverb_delay: f32,
    air_absorption_gain_hf: f32,
    room_rolloff_factor: f32,
    decay_hf_limit: bool,
}

impl Default for StaticReverbEffect {
    fn default() -> Self {
        Self {
            enabled: true,
            density: 1.0,
            diffusion: 1.0,
            gain: 0.32,
            gain_hf: 0.89,
            decay_time: 1.49,
            decay_hf_ratio: 0.83,
            reflections_gain: 0.05,
            reflections_delay: 0.007,
            late_reverb_gain: 1.26,
            late_reverb_delay: 0.011,
            air_absorption_gain_hf: 0.994,
            room_rolloff_factor: 0.0,
            decay_hf_limit: true,
        }
    }
}

impl StaticReverbEffect {
    /// Start from the EFX defaults.
    pub fn builder() -> StaticReverbEffectBuilder {
        StaticReverbEffectBuilder {
            effect: Self::default(),
        }
    }

    /// Whether the effect is applied.
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Modal density.
    pub fn density(&self) -> f32 {
        self.density
    }

    /// Echo density.
    pub fn diffusion(&self) -> f32 {
        self.diffusion
    }

    /// Master output level.
    pub fn gain(&self) -> f32 {
        self.gain
    }

    /// High-frequency output level.
    pub fn gain_hf(&self) -> f32 {
        self.gain_hf
    }

    /// Decay time in seconds.
    pub fn decay_time(&self) -> f32 {
        self.decay_time
    }

    /// High-frequency decay ratio.
    pub fn decay_hf_ratio(&self) -> f32 {
        self.decay_hf_ratio
    }

    /// Early reflections level.
    pub fn reflections_gain(&self) -> f32 {
        self.reflections_gain
    }

    /// Early reflections delay in seconds.
    pub fn reflections_delay(&self) -> f32 {
        self.reflections_delay
    }

    /// Late reverb level.
    pub fn late_reverb_gain(&self) -> f32 {
        self.late_reverb_gain
    }

    /// Late reverb delay in seconds.
    pub fn late_reverb_delay(&self) -> f32 {
        self.late_reverb_delay
    }

    /// Air absorption per metre at high frequencies.
    pub fn air_absorption_gain_hf(&self) -> f32 {
        self.air_absorption_gain_hf
    }

    /// Room rolloff factor.
    pub fn room_rolloff_factor(&self) -> f32 {
        self.room_rolloff_factor
    }

    /// Whether high-frequency decay is limited by air absorption.
    pub fn decay_hf_limit(&self) -> bool {
        self.decay_hf_limit
    }

    /// Descriptor for [`ReverbEffect::Static`].
    pub fn descriptor() -> Descriptor<ReverbEffect> {
        Descriptor::record(STATIC_REVERB_EFFECT, ReverbEffect::Static, |reverb| {
            match reverb {
                ReverbEffect::Static(effect) => Some(effect),
                _ => None,
            }
        })
    }
}

impl Record for StaticReverbEffect {
    fn read(fields: &FieldReader<'_>) -> Result<Self, CodecError> {
        let d = Self::default();
        Ok(Self {
            enabled: fields.required("enabled")?,
            density: fields.optional_in_or("density", ranges::DENSITY, d.density)?,
            diffusion: fields.optional_in_or("diffusion", ranges::DIFFUSION, d.diffusion)?,
            gain: fields.optional_in_or("gain", ranges::GAIN, d.gain)?,
            gain_hf: fields.optional_in_or("gain_hf", ranges::GAIN_HF, d.gain_hf)?,
            decay_time: fields.optional_in_or("decay_time", ranges::DECAY_TIME, d.decay_time)?,
            decay_hf_ratio: fields.optional_in_or(
                "decay_hf_ratio",
                ranges::DECAY_HF_RATIO,
                d.decay_hf_ratio,
            )?,
            reflections_gain: fields.optional_in_or(
                "reflections_gain",
                ranges::REFLECTIONS_GAIN,
                d.reflections_gain,
            )?,
            reflections_delay: fields.optional_in_or(
                "reflections_delay",
                ranges::REFLECTIONS_DELAY,
                d.reflections_delay,
            )?,
            late_reverb_gain: fields.optional_in_or(
                "late_reverb_gain",
                ranges::LATE_REVERB_GAIN,
                d.late_reverb_gain,
            )?,
            late_reverb_delay: fields.optional_in_or(
                "late_reverb_delay",
                ranges::LATE_REVERB_DELAY,
                d.late_reverb_delay,
            )?,
            air_absorption_gain_hf: fields.optional_in_or(
                "air_absorption_gain_hf",
                ranges::AIR_ABSORPTION_GAIN_HF,
                d.air_absorption_gain_hf,
            )?,
            room_rolloff_factor: fields.optional_in_or(
                "room_rolloff_factor",
                ranges::ROOM_ROLLOFF_FACTOR,
                d.room_rolloff_factor,
            )?,
            decay_hf_limit: fields
                .optional("decay_hf_limit")?
                .unwrap_or(d.decay_hf_limit),
        })
    }
}

/// Clamp into `range`; NaN yields `fallback`.
fn clamp(value: f32, range: RangeInclusive<f32>, fallback: f32) -> f32 {
    if value.is_nan() {
        fallback
    } else {
        value.clamp(*range.start(), *range.end())
    }
}

/// Builder for [`StaticReverbEffect`]. Setters clamp to the EFX ranges;
/// a NaN leaves the parameter unchanged.
#[derive(Debug, Clone, Copy)]
pub struct StaticReverbEffectBuilder {
    effect: StaticReverbEffect,
}

impl StaticReverbEffectBuilder {
    /// Set whether the effect is applied.
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.effect.enabled = enabled;
        self
    }

    /// Set modal density.
    pub fn density(mut self, value: f32) -> Self {
        self.effect.density = clamp(value, ranges::DENSITY, self.effect.density);
        self
    }

    /// Set echo density.
    pub fn diffusion(mut self, value: f32) -> Self {
        self.effect.diffusion = clamp(value, ranges::DIFFUSION, self.effect.diffusion);
        self
    }

    /// Set master output level.
    pub fn gain(mut self, value: f32) -> Self {
        self.effect.gain = clamp(value, ranges::GAIN, self.effect.gain);
        self
    }

    /// Set high-frequency output level.
    pub fn gain_hf(mut self, value: f32) -> Self {
        self.effect.gain_hf = clamp(value, ranges::GAIN_HF, self.effect.gain_hf);
        self
    }

    /// Set decay time in seconds.
    pub fn decay_time(mut self, value: f32) -> Self {
        self.effect.decay_time = clamp(value, ranges::DECAY_TIME, self.effect.decay_time);
        self
    }

    /// Set high-frequency decay ratio.
    pub fn decay_hf_ratio(mut self, value: f32) -> Self {
        self.effect.decay_hf_ratio =
            clamp(value, ranges::DECAY_HF_RATIO, self.effect.decay_hf_ratio);
        self
    }

    /// Set early reflections level.
    pub fn reflections_gain(mut self, value: f32) -> Self {
        self.effect.reflections_gain =
            clamp(value, ranges::REFLECTIONS_GAIN, self.effect.reflections_gain);
        self
    }

    /// Set early reflections delay in seconds.
    pub fn reflections_delay(mut self, value: f32) -> Self {
        self.effect.reflections_delay =
            clamp(value, ranges::REFLECTIONS_DELAY, self.effect.reflections_delay);
        self
    }

    /// Set late reverb level.
    pub fn late_reverb_gain(mut self, value: f32) -> Self {
        self.effect.late_reverb_gain =
            clamp(value, ranges::LATE_REVERB_GAIN, self.effect.late_reverb_gain);
        self
    }

    /// Set late reverb delay in seconds.
    pub fn late_reverb_delay(mut self, value: f32) -> Self {
        self.effect.late_reverb_delay =
            clamp(value, ranges::LATE_REVERB_DELAY, self.effect.late_reverb_delay);
        self
    }

    /// Set air absorption at high frequencies.
    pub fn air_absorption_gain_hf(mut self, value: f32) -> Self {
        self.effect.air_absorption_gain_hf =
            clamp(value, ranges::AIR_ABSORPTION_GAIN_HF, self.effect.air_absorption_gain_hf);
        self
    }

    /// Set room rolloff factor.
    pub fn room_rolloff_factor(mut self, value: f32) -> Self {
        self.effect.room_rolloff_factor =
            clamp(value, ranges::ROOM_ROLLOFF_FACTOR, self.effect.room_rolloff_factor);
        self
    }

    /// Set whether high-frequency decay is limited.
    pub fn decay_hf_limit(mut self, limit: bool) -> Self {
        self.effect.decay_hf_limit = limit;
        self
    }

    /// Finish building.
    pub fn build(self) -> StaticReverbEffect {
        self.effect
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_clamps_to_efx_ranges() {
        let effect = StaticReverbEffect::builder()
            .density(2.0)
            .decay_time(0.0)
            .air_absorption_gain_hf(0.5)
            .late_reverb_gain(4.0)
            .build();
        assert_eq!(effect.density(), 1.0);
        assert_eq!(effect.decay_time(), 0.1);
        assert_eq!(effect.air_absorption_gain_hf(), 0.892);
        assert_eq!(effect.late_reverb_gain(), 4.0);
        assert!(effect.enabled());
    }

    #[test]
    fn builder_ignores_nan_and_clamps_infinities() {
        let d = StaticReverbEffect::default();
        let effect = StaticReverbEffect::builder()
            .density(f32::NAN)
            .gain(f32::INFINITY)
            .decay_time(f32::NEG_INFINITY)
            .late_reverb_gain(f32::NAN)
            .room_rolloff_factor(f32::INFINITY)
            .build();
        assert_eq!(effect.density(), d.density());
        assert_eq!(effect.gain(), 1.0);
        assert_eq!(effect.decay_time(), 0.1);
        assert_eq!(effect.late_reverb_gain(), d.late_reverb_gain());
        assert_eq!(effect.room_rolloff_factor(), 10.0);
    }

    #[test]
    fn disabled_or_empty_reverb_is_inactive() {
        assert!(ReverbEffect::Empty.active().is_none());

        let off = StaticReverbEffect::builder().enabled(false).build();
        assert!(ReverbEffect::Static(off).active().is_none());

        let on = StaticReverbEffect::builder().decay_time(6.0).build();
        let reverb = ReverbEffect::Static(on);
        assert_eq!(reverb.active().map(|e| e.decay_time()), Some(6.0));
    }

    #[test]
    fn defaults_lie_within_ranges() {
        let d = StaticReverbEffect::default();
        assert!(ranges::DENSITY.contains(&d.density()));
        assert!(ranges::DECAY_TIME.contains(&d.decay_time()));
        assert!(ranges::REFLECTIONS_DELAY.contains(&d.reflections_delay()));
        assert!(ranges::LATE_REVERB_DELAY.contains(&d.late_reverb_delay()));
        assert!(ranges::AIR_ABSORPTION_GAIN_HF.contains(&d.air_absorption_gain_hf()));
    }
}
