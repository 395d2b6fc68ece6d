use std::{
    io::Write,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use limlib_effects::{DimensionEffects, EffectRegistries};
use serde_json::{Map, Value};
use tracing::{debug, error, info};

use crate::{config::LimlibConfig, effect_packs};

/// Outcome of validating a batch of documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ValidationSummary {
    pub valid: usize,
    pub invalid: usize,
}

/// Decode each file and write its canonical form; failures are logged and counted.
pub fn validate(
    registries: &EffectRegistries,
    config: &LimlibConfig,
    files: &[PathBuf],
    out: &mut impl Write,
) -> Result<ValidationSummary> {
    let mut summary = ValidationSummary::default();
    for path in files {
        match effect_packs::load_document(registries, path) {
            Ok(effects) => {
                summary.valid += 1;
                let value = registries.encode_document(&effects)?;
                writeln!(out, "{}: ok", path.display())?;
                write_json(out, config, &value)?;
            }
            Err(err) => {
                summary.invalid += 1;
                error!("{err:#}");
                writeln!(out, "{}: invalid", path.display())?;
                if config.strict {
                    break;
                }
            }
        }
    }
    info!(
        valid = summary.valid,
        invalid = summary.invalid,
        "validation finished"
    );
    Ok(summary)
}

/// Load every enabled pack and write the resolved document per dimension.
pub fn packs(
    registries: &EffectRegistries,
    config: &LimlibConfig,
    out: &mut impl Write,
) -> Result<()> {
    let packs = if config.strict {
        effect_packs::discover_packs_strict(&config.packs_dir)?
    } else {
        effect_packs::discover_packs_lenient(&config.packs_dir)
    };
    info!(
        "Discovered {} effect pack(s) in {}",
        packs.len(),
        config.packs_dir.display()
    );

    for pack in &packs {
        info!(
            pack = %pack.id,
            name = pack.manifest.name.as_deref().unwrap_or(""),
            description = pack.manifest.description.as_deref().unwrap_or(""),
            priority = pack.manifest.priority,
            "using effect pack"
        );
    }

    let documents = effect_packs::load_all(registries, &packs, config.strict)?;
    let mut dimensions = Map::new();
    for (key, document) in &documents {
        debug!(dimension = %key, pack = %document.pack, path = %document.path.display(), "resolved");
        dimensions.insert(
            key.to_string(),
            registries
                .encode_document(&document.effects)
                .with_context(|| format!("Failed to encode {key}"))?,
        );
    }
    write_json(out, config, &Value::Object(dimensions))
}

/// Write the document a dimension gets when it declares no effects.
pub fn defaults(
    registries: &EffectRegistries,
    config: &LimlibConfig,
    out: &mut impl Write,
) -> Result<()> {
    let value = registries.encode_document(&DimensionEffects::default())?;
    write_json(out, config, &value)
}

/// Write the default configuration to `path`.
pub fn init_config(path: &Path, out: &mut impl Write) -> Result<()> {
    LimlibConfig::default()
        .save_to_path(path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    writeln!(out, "wrote {}", path.display())?;
    Ok(())
}

/// List registered variants and presets per family.
pub fn variants(registries: &EffectRegistries, out: &mut impl Write) -> Result<()> {
    list_family(
        out,
        "sky_effects",
        registries.sky().variant_keys(),
        registries.sky().presets().keys(),
    )?;
    list_family(
        out,
        "reverb",
        registries.reverb().variant_keys(),
        registries.reverb().presets().keys(),
    )?;
    list_family(
        out,
        "distortion",
        registries.distortion().variant_keys(),
        registries.distortion().presets().keys(),
    )
}

fn list_family<'a>(
    out: &mut impl Write,
    name: &str,
    variants: impl Iterator<Item = &'a limlib_core::RegistryKey>,
    presets: impl Iterator<Item = &'a limlib_core::RegistryKey>,
) -> Result<()> {
    writeln!(out, "{name}")?;
    for key in variants {
        writeln!(out, "  variant {key}")?;
    }
    for key in presets {
        writeln!(out, "  preset  {key}")?;
    }
    Ok(())
}

fn write_json(out: &mut impl Write, config: &LimlibConfig, value: &Value) -> Result<()> {
    let text = if config.pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    writeln!(out, "{text}")?;
    Ok(())
}
