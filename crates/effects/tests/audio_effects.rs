//! Reverb and distortion records.

use limlib_effects::{
    DistortionEffect, EffectRegistries, ReverbEffect, StaticDistortionEffect, StaticReverbEffect,
};
use serde_json::json;

#[test]
fn reverb_params_default_when_absent() {
    let registries = EffectRegistries::builtin().unwrap();
    let decoded = registries
        .reverb()
        .decode(&json!({ "type": "limlib:static", "enabled": true, "decay_time": 8.0 }))
        .unwrap();
    let expected = StaticReverbEffect::builder().decay_time(8.0).build();
    assert_eq!(decoded, ReverbEffect::Static(expected));
}

#[test]
fn reverb_out_of_range_is_rejected() {
    let registries = EffectRegistries::builtin().unwrap();
    let err = registries
        .reverb()
        .decode(&json!({ "type": "limlib:static", "enabled": true, "reflections_delay": 1.0 }))
        .unwrap_err();
    assert_eq!(err.field_name(), Some("reflections_delay"));
}

#[test]
fn reverb_encoding_writes_every_parameter() {
    let registries = EffectRegistries::builtin().unwrap();
    let reverb = ReverbEffect::Static(
        StaticReverbEffect::builder()
            .density(0.5)
            .gain(0.7)
            .decay_hf_limit(false)
            .build(),
    );
    let encoded = registries.reverb().encode(&reverb).unwrap();
    let fields = encoded.as_object().unwrap();
    assert_eq!(fields.len(), 15);
    assert_eq!(fields["type"], "limlib:static");
    assert_eq!(fields["decay_hf_limit"], false);
    assert_eq!(registries.reverb().decode(&encoded).unwrap(), reverb);
}

#[test]
fn distortion_round_trips_and_validates() {
    let registries = EffectRegistries::builtin().unwrap();
    let distortion =
        DistortionEffect::Static(StaticDistortionEffect::new(true, 0.75, 0.5, 4000.0, 1200.0, 800.0));
    let encoded = registries.distortion().encode(&distortion).unwrap();
    assert_eq!(registries.distortion().decode(&encoded).unwrap(), distortion);

    let err = registries
        .distortion()
        .decode(&json!({ "type": "limlib:static", "enabled": true, "eq_center": 20.0 }))
        .unwrap_err();
    assert_eq!(err.field_name(), Some("eq_center"));

    let empty = registries
        .distortion()
        .decode(&json!({ "type": "limlib:empty" }))
        .unwrap();
    assert_eq!(empty, DistortionEffect::Empty);
}

#[test]
fn non_finite_audio_parameters_survive_encoding() {
    let registries = EffectRegistries::builtin().unwrap();

    let reverb = ReverbEffect::Static(
        StaticReverbEffect::builder()
            .density(f32::NAN)
            .diffusion(f32::INFINITY)
            .reflections_delay(f32::NEG_INFINITY)
            .build(),
    );
    let encoded = registries.reverb().encode(&reverb).unwrap();
    assert!(encoded.as_object().unwrap().values().all(|v| !v.is_null()));
    assert_eq!(registries.reverb().decode(&encoded).unwrap(), reverb);

    let distortion = DistortionEffect::Static(StaticDistortionEffect::new(
        true,
        f32::NAN,
        f32::NEG_INFINITY,
        f32::INFINITY,
        f32::NAN,
        f32::NAN,
    ));
    let encoded = registries.distortion().encode(&distortion).unwrap();
    assert!(encoded.as_object().unwrap().values().all(|v| !v.is_null()));
    assert_eq!(registries.distortion().decode(&encoded).unwrap(), distortion);
}
