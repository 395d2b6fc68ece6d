use std::{fs, path::Path};

use limlib_effects::{DistortionEffect, EffectRegistries, SkyType};

const PACK_EFFECTS: &str = "effect_packs/example_pack/effects";

fn read_example(name: &str) -> String {
    fs::read_to_string(Path::new(PACK_EFFECTS).join(name)).expect("example document readable")
}

#[test]
fn example_documents_resolve_to_sky_and_audio_parameters() {
    let registries = EffectRegistries::builtin().expect("builtin registries");

    let hallways = registries
        .document_from_str(&read_example("the_end_of_hallways.json"))
        .expect("hallways document");
    let sky = hallways.sky_effects.to_sky_properties();
    assert_eq!(sky.sky_type, SkyType::None);
    assert!(sky.darkened);
    assert!(sky.thick_fog);
    assert_eq!(sky.cloud_height, 192.0);
    assert_eq!(sky.sky_shading, 1.0);
    let reverb = hallways.reverb.active().expect("reverb enabled");
    assert_eq!(reverb.decay_time(), 7.5);
    assert_eq!(hallways.distortion, DistortionEffect::Empty);

    let plains = registries
        .document_from_str(&read_example("dusk_plains.json"))
        .expect("plains document");
    let sky = plains.sky_effects.to_sky_properties();
    assert_eq!(sky.sky_type, SkyType::Normal);
    assert!(sky.cloud_height.is_nan());
    assert_eq!(sky.sky_shading, 0.4);
    assert!(plains.reverb.active().is_none());
    let distortion = plains.distortion.active().expect("distortion enabled");
    assert_eq!(distortion.lowpass_cutoff(), 8000.0);
}

#[test]
fn encoded_documents_decode_to_the_same_effects() {
    let registries = EffectRegistries::builtin().expect("builtin registries");
    for name in ["the_end_of_hallways.json", "dusk_plains.json"] {
        let effects = registries
            .document_from_str(&read_example(name))
            .expect("example document");
        let text = registries
            .document_to_string_pretty(&effects)
            .expect("encode document");
        let again = registries.document_from_str(&text).expect("re-decode");
        assert_eq!(again, effects, "{name}");
    }
}
