//! Dice pack discovery and metadata.
//!
//! A pack is a folder under the packs directory carrying a `pack.json`
//! plus per-die-type subfolders of numbered landing frames:
//!
//! ```text
//! dice_packs/
//!   classic/
//!     pack.json
//!     d20/
//!       land_01.png .. land_20.png
//!       tumble/            (optional, pre-rendered)
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::api::types::DieKind;

/// Pack id reported when no real packs are installed.
pub const PLACEHOLDER_PACK: &str = "_placeholder";

/// Color hues used by the placeholder pack and as fallback for unknown
/// color names. A hue of -1 means no tint (white/grey).
pub const DEFAULT_COLORS: [(&str, i32); 7] = [
    ("red", 0),
    ("gold", 45),
    ("green", 120),
    ("cyan", 180),
    ("blue", 210),
    ("purple", 270),
    ("white", -1),
];

/// Look up a default hue by color name.
pub fn default_hue(color: &str) -> i32 {
    DEFAULT_COLORS
        .iter()
        .find(|(name, _)| *name == color)
        .map(|(_, hue)| *hue)
        .unwrap_or(0)
}

/// Hue target for one named color variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorDef {
    /// Target HSV hue in degrees, or -1 to leave the art untinted.
    pub hue_shift: i32,
}

/// pack.json metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackManifest {
    pub name: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub colors: BTreeMap<String, ColorDef>,
}

impl PackManifest {
    /// Parse a manifest from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Manifest reported for the auto-generated placeholder pack.
pub fn placeholder_manifest() -> PackManifest {
    PackManifest {
        name: "Placeholder".into(),
        author: "dicecast".into(),
        description: "Auto-generated placeholder dice".into(),
        colors: DEFAULT_COLORS
            .iter()
            .map(|(name, hue)| (name.to_string(), ColorDef { hue_shift: *hue }))
            .collect(),
    }
}

/// A discovered pack: parsed manifest plus its folder on disk.
#[derive(Debug, Clone)]
pub struct DiePack {
    pub id: String,
    pub manifest: PackManifest,
    pub root: PathBuf,
}

impl DiePack {
    /// Hue target for a color variant, if the pack declares it.
    pub fn hue_for(&self, color: &str) -> Option<i32> {
        self.manifest.colors.get(color).map(|c| c.hue_shift)
    }

    /// Path of a landing frame: `<root>/<die>/land_{face:02}.png`.
    pub fn landing_path(&self, die: DieKind, face: u16) -> PathBuf {
        self.root
            .join(die.label())
            .join(format!("land_{face:02}.png"))
    }

    /// Path of the optional pre-rendered tumble folder.
    pub fn tumble_dir(&self, die: DieKind) -> PathBuf {
        self.root.join(die.label()).join("tumble")
    }

    pub fn has_prerendered_tumble(&self, die: DieKind) -> bool {
        self.tumble_dir(die).is_dir()
    }

    /// Die types this pack ships art for (subfolders that exist).
    pub fn available_die_kinds(&self) -> Vec<DieKind> {
        DieKind::ALL
            .into_iter()
            .filter(|die| self.root.join(die.label()).is_dir())
            .collect()
    }
}

/// Discover packs from the packs directory. Folders without a readable
/// pack.json are skipped with a warning — discovery never fails.
pub fn scan_packs(dir: &Path) -> BTreeMap<String, DiePack> {
    let mut packs = BTreeMap::new();
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(_) => return packs,
    };

    for entry in entries.flatten() {
        let folder = entry.path();
        if !folder.is_dir() {
            continue;
        }
        let meta_file = folder.join("pack.json");
        let json = match std::fs::read_to_string(&meta_file) {
            Ok(json) => json,
            Err(_) => continue,
        };
        let manifest = match PackManifest::from_json(&json) {
            Ok(manifest) => manifest,
            Err(err) => {
                log::warn!("skipping pack {}: bad pack.json: {err}", folder.display());
                continue;
            }
        };
        let id = entry.file_name().to_string_lossy().into_owned();
        packs.insert(
            id.clone(),
            DiePack {
                id,
                manifest,
                root: folder,
            },
        );
    }
    packs
}
