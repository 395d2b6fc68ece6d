use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::warn;

use crate::effect_packs;

pub const DEFAULT_CONFIG_PATH: &str = "config/limlib.toml";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LimlibConfig {
    /// Directory scanned for effect packs.
    pub packs_dir: PathBuf,
    /// Fail on the first invalid pack or document instead of skipping it.
    pub strict: bool,
    /// Pretty-print JSON written to stdout.
    pub pretty: bool,
}

impl Default for LimlibConfig {
    fn default() -> Self {
        Self {
            packs_dir: PathBuf::from(effect_packs::EFFECT_PACKS_DIR),
            strict: false,
            pretty: true,
        }
    }
}

impl LimlibConfig {
    /// Load configuration from an explicit path, falling back to defaults on errors.
    pub fn load_from_path(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<LimlibConfig>(&contents) {
                Ok(cfg) => cfg,
                Err(err) => {
                    warn!("Failed to parse {}: {err}. Using defaults", path.display());
                    LimlibConfig::default()
                }
            },
            Err(err) => {
                if path != Path::new(DEFAULT_CONFIG_PATH)
                    || err.kind() != std::io::ErrorKind::NotFound
                {
                    warn!("Failed to read {}: {err}. Using defaults", path.display());
                }
                LimlibConfig::default()
            }
        }
    }

    /// Save configuration to an explicit path.
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        let toml = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)?;
        Ok(())
    }
}
