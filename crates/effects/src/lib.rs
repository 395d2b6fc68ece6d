#![warn(missing_docs)]
//! Effect families for limlib dimensions.
//!
//! Provides the sky, reverb and distortion families, their built-in
//! variants, and the bootstrap that registers and freezes them.
//!
//! # Architecture
//!
//! - [`SkyEffects`] - sky rendering properties
//! - [`ReverbEffect`] / [`DistortionEffect`] - EFX audio parameters
//! - [`EffectRegistries`] - frozen dispatch codecs and presets per family
//! - [`DimensionEffects`] - the per-dimension document bundling all three
//!
//! # Example
//!
//! ```ignore
//! let registries = EffectRegistries::builtin()?;
//! let effects = registries.document_from_str(&text)?;
//! let sky = effects.sky_effects.to_sky_properties();
//! ```

mod bootstrap;
mod distortion;
mod document;
mod reverb;
mod sky;

pub use bootstrap::{
    EffectRegistries, EffectRegistriesBuilder, Family, FamilyBuilder, LimlibEffects,
    DEFAULT_PRESET_PATH, DISTORTION_PRESETS, EMPTY_PATH, REVERB_PRESETS, SKY_PRESETS,
    STATIC_PATH, STATIC_V2_PATH,
};
pub use distortion::{
    DistortionEffect, StaticDistortionEffect, EMPTY_DISTORTION_EFFECT, STATIC_DISTORTION_EFFECT,
};
pub use document::{
    DimensionEffects, DocumentError, DISTORTION_MEMBER, REVERB_MEMBER, SKY_EFFECTS_MEMBER,
};
pub use reverb::{
    ranges as reverb_ranges, ReverbEffect, StaticReverbEffect, StaticReverbEffectBuilder,
    EMPTY_REVERB_EFFECT, STATIC_REVERB_EFFECT,
};
pub use sky::{
    ShadedSkyEffects, SkyEffects, SkyProperties, SkyType, StaticSkyEffects, DEFAULT_SKY_SHADING,
    EMPTY_SKY_EFFECTS, SHADED_SKY_EFFECTS, STATIC_SKY_EFFECTS,
};

pub mod distortion_ranges {
    //! Accepted distortion parameter ranges, as defined by the EFX extension.
    pub use crate::distortion::{EDGE, FREQUENCY, GAIN};
}
