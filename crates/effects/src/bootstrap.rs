//! Startup wiring: registers the built-in variants, runs extension hooks
//! and freezes every family before any codec is handed out.

use std::sync::Arc;

use serde_json::Value;
use tracing::{error, info};

use limlib_core::RegistryKey;
use limlib_registry::{
    CodecError, Descriptor, DispatchCodec, EffectFamily, PreRegistration, PreRegistrations,
    Registry, RegistryCell, RegistryError, VariantRegistry,
};

use crate::{
    DistortionEffect, ReverbEffect, ShadedSkyEffects, SkyEffects, StaticDistortionEffect,
    StaticReverbEffect, StaticSkyEffects,
};

/// Path of the always-registered default variant in every family.
pub const EMPTY_PATH: &str = "empty";
/// Path of the fixed-parameter variant in every family.
pub const STATIC_PATH: &str = "static";
/// Path of the second sky schema revision.
pub const STATIC_V2_PATH: &str = "static/v2";
/// Path of the default preset in every family.
pub const DEFAULT_PRESET_PATH: &str = "default";

/// Label of the sky presets registry.
pub const SKY_PRESETS: &str = "limlib/sky_effects/presets";
/// Label of the reverb presets registry.
pub const REVERB_PRESETS: &str = "limlib/reverb_effects/presets";
/// Label of the distortion presets registry.
pub const DISTORTION_PRESETS: &str = "limlib/distortion_effects/presets";

/// Registration-time state for one family: its variants and named presets.
pub struct FamilyBuilder<F: EffectFamily> {
    variants: VariantRegistry<F>,
    presets: RegistryCell<F>,
}

impl<F: EffectFamily> FamilyBuilder<F> {
    fn new(presets_label: &'static str) -> Self {
        Self {
            variants: VariantRegistry::new(),
            presets: RegistryCell::new(presets_label),
        }
    }

    /// Register a variant descriptor under `key`.
    pub fn register_variant(
        &mut self,
        key: RegistryKey,
        descriptor: Descriptor<F>,
    ) -> Result<&mut Self, RegistryError> {
        self.variants.register(key, descriptor)?;
        Ok(self)
    }

    /// Register a named instance under `key`.
    pub fn register_preset(
        &mut self,
        key: RegistryKey,
        value: F,
    ) -> Result<&mut Self, RegistryError> {
        self.presets.register(key, value)?;
        Ok(self)
    }

    /// Freeze variants and presets. Every preset must use a registered variant.
    fn freeze(mut self) -> Result<Family<F>, RegistryError> {
        let codec = DispatchCodec::new(self.variants.freeze());
        let presets = self.presets.freeze();
        for (key, preset) in presets.iter() {
            if codec.variants().lookup_by_instance(preset).is_none() {
                error!(
                    family = F::NAME,
                    preset = %key,
                    variant = %preset.descriptor_id(),
                    "preset uses a variant with no registered codec"
                );
                return Err(RegistryError::UnregisteredPreset {
                    registry: presets.label(),
                    key: key.clone(),
                    descriptor: preset.descriptor_id(),
                });
            }
        }
        Ok(Family { codec, presets })
    }
}

/// A frozen family: its dispatch codec and named presets.
pub struct Family<F: EffectFamily> {
    codec: DispatchCodec<F>,
    presets: Arc<Registry<F>>,
}

impl<F: EffectFamily> Clone for Family<F> {
    fn clone(&self) -> Self {
        Self {
            codec: self.codec.clone(),
            presets: Arc::clone(&self.presets),
        }
    }
}

impl<F: EffectFamily> Family<F> {
    /// The family's dispatch codec.
    pub fn codec(&self) -> &DispatchCodec<F> {
        &self.codec
    }

    /// Encode a value as a tagged record.
    pub fn encode(&self, value: &F) -> Result<Value, CodecError> {
        self.codec.encode(value)
    }

    /// Decode a tagged record.
    pub fn decode(&self, input: &Value) -> Result<F, CodecError> {
        self.codec.decode(input)
    }

    /// Named preset by key (`namespace:path` or bare path).
    pub fn preset(&self, key: &str) -> Option<&F> {
        self.presets.get_str(key)
    }

    /// All presets.
    pub fn presets(&self) -> &Registry<F> {
        &self.presets
    }

    /// Registered variant keys in registration order.
    pub fn variant_keys(&self) -> impl Iterator<Item = &RegistryKey> {
        self.codec.variants().keys()
    }
}

/// Registries for every effect family, before the freeze point.
pub struct EffectRegistriesBuilder {
    sky: FamilyBuilder<SkyEffects>,
    reverb: FamilyBuilder<ReverbEffect>,
    distortion: FamilyBuilder<DistortionEffect>,
    hooks: PreRegistrations<EffectRegistriesBuilder>,
}

impl EffectRegistriesBuilder {
    /// Sky effects family.
    pub fn sky(&mut self) -> &mut FamilyBuilder<SkyEffects> {
        &mut self.sky
    }

    /// Reverb family.
    pub fn reverb(&mut self) -> &mut FamilyBuilder<ReverbEffect> {
        &mut self.reverb
    }

    /// Distortion family.
    pub fn distortion(&mut self) -> &mut FamilyBuilder<DistortionEffect> {
        &mut self.distortion
    }

    /// Queue a pre-registration hook. Hooks run after the built-ins, in the
    /// order they were added.
    pub fn with_hook(
        mut self,
        hook: impl PreRegistration<EffectRegistriesBuilder> + 'static,
    ) -> Self {
        self.hooks.push(hook);
        self
    }

    /// Run the hooks, then freeze every family.
    ///
    /// Fails if a hook fails or a preset uses a variant with no registered
    /// descriptor.
    pub fn build(mut self) -> Result<EffectRegistries, RegistryError> {
        let hooks = std::mem::take(&mut self.hooks);
        hooks.run(&mut self)?;

        let registries = EffectRegistries {
            sky: self.sky.freeze()?,
            reverb: self.reverb.freeze()?,
            distortion: self.distortion.freeze()?,
        };
        info!(
            sky = registries.sky.codec.variants().len(),
            reverb = registries.reverb.codec.variants().len(),
            distortion = registries.distortion.codec.variants().len(),
            "effect registries frozen"
        );
        Ok(registries)
    }
}

/// Frozen registries for every effect family. Cheap to clone and safe to
/// share between threads.
#[derive(Clone)]
pub struct EffectRegistries {
    sky: Family<SkyEffects>,
    reverb: Family<ReverbEffect>,
    distortion: Family<DistortionEffect>,
}

impl EffectRegistries {
    /// Open registries with the built-in [`LimlibEffects`] hook queued first.
    pub fn builder() -> EffectRegistriesBuilder {
        let mut hooks = PreRegistrations::new();
        hooks.push(LimlibEffects);
        EffectRegistriesBuilder {
            sky: FamilyBuilder::new(SKY_PRESETS),
            reverb: FamilyBuilder::new(REVERB_PRESETS),
            distortion: FamilyBuilder::new(DISTORTION_PRESETS),
            hooks,
        }
    }

    /// Registries holding only the built-in variants.
    pub fn builtin() -> Result<Self, RegistryError> {
        Self::builder().build()
    }

    /// Sky effects family.
    pub fn sky(&self) -> &Family<SkyEffects> {
        &self.sky
    }

    /// Reverb family.
    pub fn reverb(&self) -> &Family<ReverbEffect> {
        &self.reverb
    }

    /// Distortion family.
    pub fn distortion(&self) -> &Family<DistortionEffect> {
        &self.distortion
    }
}

/// Built-in registrations: `limlib:empty` and `limlib:static` in every
/// family, `limlib:static/v2` for sky, and a `limlib:default` preset.
pub struct LimlibEffects;

impl LimlibEffects {
    /// Hook identifier.
    pub const ID: &'static str = "limlib:effects";
}

impl PreRegistration<EffectRegistriesBuilder> for LimlibEffects {
    fn id(&self) -> &str {
        Self::ID
    }

    fn register(&self, registrar: &mut EffectRegistriesBuilder) -> Result<(), RegistryError> {
        let empty = RegistryKey::limlib(EMPTY_PATH)?;
        let fixed = RegistryKey::limlib(STATIC_PATH)?;
        let preset = RegistryKey::limlib(DEFAULT_PRESET_PATH)?;

        registrar
            .sky()
            .register_variant(empty.clone(), SkyEffects::empty_descriptor())?
            .register_variant(fixed.clone(), StaticSkyEffects::descriptor())?
            .register_variant(RegistryKey::limlib(STATIC_V2_PATH)?, ShadedSkyEffects::descriptor())?
            .register_preset(preset.clone(), SkyEffects::Empty)?;

        registrar
            .reverb()
            .register_variant(empty.clone(), ReverbEffect::empty_descriptor())?
            .register_variant(fixed.clone(), StaticReverbEffect::descriptor())?
            .register_preset(preset.clone(), ReverbEffect::Empty)?;

        registrar
            .distortion()
            .register_variant(empty, DistortionEffect::empty_descriptor())?
            .register_variant(fixed, StaticDistortionEffect::descriptor())?
            .register_preset(preset, DistortionEffect::Empty)?;

        Ok(())
    }
}
