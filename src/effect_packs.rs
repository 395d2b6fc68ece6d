use anyhow::{Context, Result};
use limlib_core::{RegistryKey, DEFAULT_NAMESPACE};
use limlib_effects::{DimensionEffects, EffectRegistries};
use serde::Deserialize;
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, warn};

/// Default directory containing effect packs.
pub const EFFECT_PACKS_DIR: &str = "effect_packs";

/// Effect pack manifest file name.
pub const EFFECT_PACK_MANIFEST_FILE: &str = "pack.json";

/// Directory inside a pack holding one effects document per dimension.
pub const EFFECTS_DIR: &str = "effects";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EffectPackManifest {
    /// Human-friendly pack name (defaults to the directory name).
    pub name: Option<String>,
    /// Optional description, purely informational.
    pub description: Option<String>,
    /// Namespace for the pack's dimension keys.
    pub namespace: String,
    /// If false, the pack is ignored.
    pub enabled: bool,
    /// Deterministic pack load ordering (lower loads earlier).
    pub priority: i32,
}

impl Default for EffectPackManifest {
    fn default() -> Self {
        Self {
            name: None,
            description: None,
            namespace: DEFAULT_NAMESPACE.to_string(),
            enabled: true,
            priority: 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DiscoveredEffectPack {
    pub id: String,
    pub dir: PathBuf,
    pub manifest: EffectPackManifest,
}

/// A decoded effects document and where it came from.
#[derive(Debug, Clone)]
pub struct LoadedDocument {
    pub pack: String,
    pub path: PathBuf,
    pub effects: DimensionEffects,
}

fn load_manifest(pack_dir: &Path, pack_id: &str) -> Result<EffectPackManifest> {
    let manifest_path = pack_dir.join(EFFECT_PACK_MANIFEST_FILE);
    let mut manifest = if !manifest_path.exists() {
        EffectPackManifest::default()
    } else {
        let contents = fs::read_to_string(&manifest_path)
            .with_context(|| format!("Failed to read {}", manifest_path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", manifest_path.display()))?
    };

    if manifest.name.as_deref().unwrap_or("").is_empty() {
        manifest.name = Some(pack_id.to_string());
    }

    Ok(manifest)
}

/// Discover effect pack directories under the given root.
///
/// Pack discovery is deterministic: directories are returned in sorted order.
pub fn discover_pack_dirs(root: &Path) -> Result<Vec<PathBuf>> {
    sorted_entries(root, |path| path.is_dir())
}

fn sorted_entries(dir: &Path, keep: impl Fn(&Path) -> bool) -> Result<Vec<PathBuf>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(err).with_context(|| format!("Failed to read {}", dir.display())),
    };

    let mut paths = Vec::new();
    for entry in entries {
        let entry =
            entry.with_context(|| format!("Failed to read dir entry in {}", dir.display()))?;
        let path = entry.path();
        if keep(&path) {
            paths.push(path);
        }
    }

    paths.sort();
    Ok(paths)
}

fn pack_id(pack_dir: &Path) -> String {
    pack_dir
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| pack_dir.display().to_string())
}

fn sort_packs(packs: &mut [DiscoveredEffectPack]) {
    packs.sort_by(|a, b| {
        a.manifest
            .priority
            .cmp(&b.manifest.priority)
            .then_with(|| a.id.cmp(&b.id))
    });
}

/// Discover effect packs under the given root, applying manifest ordering and enablement.
///
/// This function is strict: it errors if a manifest exists but can't be read/parsed.
pub fn discover_packs_strict(root: &Path) -> Result<Vec<DiscoveredEffectPack>> {
    let mut packs = Vec::new();
    for pack_dir in discover_pack_dirs(root)? {
        let id = pack_id(&pack_dir);
        let manifest = load_manifest(&pack_dir, &id)?;
        if !manifest.enabled {
            continue;
        }
        packs.push(DiscoveredEffectPack {
            id,
            dir: pack_dir,
            manifest,
        });
    }

    sort_packs(&mut packs);
    Ok(packs)
}

/// Discover effect packs under the given root, applying manifest ordering and enablement.
///
/// This function is lenient: packs with unreadable/invalid manifests are skipped with a warning.
pub fn discover_packs_lenient(root: &Path) -> Vec<DiscoveredEffectPack> {
    let pack_dirs = match discover_pack_dirs(root) {
        Ok(pack_dirs) => pack_dirs,
        Err(err) => {
            warn!("Failed to scan effect packs dir {}: {err:#}", root.display());
            return Vec::new();
        }
    };

    let mut packs = Vec::with_capacity(pack_dirs.len());
    for pack_dir in pack_dirs {
        let id = pack_id(&pack_dir);
        let manifest = match load_manifest(&pack_dir, &id) {
            Ok(manifest) => manifest,
            Err(err) => {
                warn!(
                    "Skipping effect pack {} due to invalid manifest: {err:#}",
                    pack_dir.display()
                );
                continue;
            }
        };
        if !manifest.enabled {
            continue;
        }
        packs.push(DiscoveredEffectPack {
            id,
            dir: pack_dir,
            manifest,
        });
    }

    sort_packs(&mut packs);
    packs
}

/// Read and decode one effects document.
pub fn load_document(registries: &EffectRegistries, path: &Path) -> Result<DimensionEffects> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    registries
        .document_from_str(&contents)
        .with_context(|| format!("Invalid effects document {}", path.display()))
}

/// Dimension key for a document: the pack namespace plus the file stem.
fn dimension_key(pack: &DiscoveredEffectPack, path: &Path) -> Result<RegistryKey> {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    RegistryKey::new(&pack.manifest.namespace, &stem).with_context(|| {
        format!(
            "{} does not name a valid dimension key in namespace {}",
            path.display(),
            pack.manifest.namespace
        )
    })
}

fn pack_documents(pack: &DiscoveredEffectPack) -> Result<Vec<PathBuf>> {
    sorted_entries(&pack.dir.join(EFFECTS_DIR), |path| {
        path.is_file() && path.extension().is_some_and(|ext| ext == "json")
    })
}

/// Load every document from every pack.
///
/// In strict mode the first invalid document or duplicate dimension key is an
/// error; otherwise it is logged and skipped, and earlier packs win.
pub fn load_all(
    registries: &EffectRegistries,
    packs: &[DiscoveredEffectPack],
    strict: bool,
) -> Result<BTreeMap<RegistryKey, LoadedDocument>> {
    let mut documents = BTreeMap::new();
    for pack in packs {
        let paths = match pack_documents(pack) {
            Ok(paths) => paths,
            Err(err) if !strict => {
                warn!("Skipping effect pack {}: {err:#}", pack.id);
                continue;
            }
            Err(err) => return Err(err),
        };

        for path in paths {
            let loaded = dimension_key(pack, &path).and_then(|key| {
                load_document(registries, &path).map(|effects| (key, effects))
            });
            let (key, effects) = match loaded {
                Ok(loaded) => loaded,
                Err(err) if !strict => {
                    warn!("Skipping {}: {err:#}", path.display());
                    continue;
                }
                Err(err) => return Err(err),
            };

            if documents.contains_key(&key) {
                if strict {
                    anyhow::bail!("Duplicate dimension {key} in {}", path.display());
                }
                warn!("Ignoring duplicate dimension {key} from {}", path.display());
                continue;
            }

            debug!(dimension = %key, pack = %pack.id, "loaded effects document");
            documents.insert(
                key,
                LoadedDocument {
                    pack: pack.id.clone(),
                    path,
                    effects,
                },
            );
        }
    }
    Ok(documents)
}
