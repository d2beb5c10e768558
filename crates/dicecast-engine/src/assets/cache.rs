//! Frame cache: memoized landing and tumble sprites.
//!
//! The cache is the only shared resource across sprites. Frames are
//! published as `Arc<SpriteFrame>` and never mutated after construction;
//! `clear_cache()`/`rescan()` swap the underlying maps out rather than
//! touching entries, so frames held by mid-animation sprites stay valid
//! until their holders drop them.
//!
//! Every failure path degrades to placeholder art — a missing pack, a
//! missing file, or a corrupt frame never reaches the orchestrator as an
//! error.

use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeMap, HashMap};
use std::hash::{Hash, Hasher};
use std::path::PathBuf;
use std::sync::Arc;

use image::RgbaImage;

use crate::api::types::DieKind;
use crate::assets::hue::HueShift;
use crate::assets::pack::{
    self, default_hue, placeholder_manifest, DiePack, PackManifest, PLACEHOLDER_PACK,
};
use crate::assets::placeholder;
use crate::systems::effects::Rng;

/// Which animation a frame belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PoseKind {
    /// At rest, showing a specific face.
    Landing,
    /// In-air motion, not tied to a resolved face.
    Tumble,
}

/// Logical identity of a frame.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FrameKey {
    pub pose: PoseKind,
    pub pack: String,
    pub die: DieKind,
    /// `None` for tumble frames.
    pub face: Option<u16>,
    pub color: String,
}

/// An immutable bitmap frame plus its logical key.
#[derive(Debug)]
pub struct SpriteFrame {
    pub key: FrameKey,
    pub image: RgbaImage,
}

/// Cache key for landing frames. Structured rather than a concatenated
/// string so two distinct requests can never collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LandingKey {
    pub pack: String,
    pub die: DieKind,
    pub face: u16,
    pub color: String,
}

/// Cache key for a die's tumble frame set.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TumbleKey {
    pub pack: String,
    pub die: DieKind,
    pub color: String,
}

/// Loads and caches dice sprite frames from pack folders, generating
/// placeholder art when the requested pack or frame does not exist.
pub struct FrameCache {
    packs_dir: PathBuf,
    packs: BTreeMap<String, DiePack>,
    landing: HashMap<LandingKey, Arc<SpriteFrame>>,
    tumble: HashMap<TumbleKey, Arc<Vec<Arc<SpriteFrame>>>>,
    hue: HueShift,
    seed: u64,
}

impl FrameCache {
    /// Create a cache rooted at a packs directory and scan it once.
    /// The seed fixes the session's pseudo-tumble shuffle order.
    pub fn new(packs_dir: impl Into<PathBuf>, seed: u64) -> Self {
        let packs_dir = packs_dir.into();
        let packs = pack::scan_packs(&packs_dir);
        log::debug!(
            "frame cache: {} pack(s) under {}",
            packs.len(),
            packs_dir.display()
        );
        FrameCache {
            packs_dir,
            packs,
            landing: HashMap::new(),
            tumble: HashMap::new(),
            hue: HueShift::detect(),
            seed,
        }
    }

    /// Available pack ids. Never empty: reports the placeholder pack when
    /// nothing real is installed.
    pub fn available_packs(&self) -> Vec<String> {
        if self.packs.is_empty() {
            vec![PLACEHOLDER_PACK.to_string()]
        } else {
            self.packs.keys().cloned().collect()
        }
    }

    /// Manifest metadata for a pack.
    pub fn pack_info(&self, pack_id: &str) -> Option<PackManifest> {
        if pack_id == PLACEHOLDER_PACK {
            return Some(placeholder_manifest());
        }
        self.packs.get(pack_id).map(|p| p.manifest.clone())
    }

    /// Color variant names for a pack, in manifest order.
    pub fn available_colors(&self, pack_id: &str) -> Vec<String> {
        self.pack_info(pack_id)
            .map(|m| m.colors.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// The sprite for a resolved die face. Memoized; the first call per key
    /// loads or generates, later calls are map hits returning the same Arc.
    pub fn landing_frame(
        &mut self,
        pack_id: &str,
        die: DieKind,
        face: u16,
        color: &str,
    ) -> Arc<SpriteFrame> {
        let key = LandingKey {
            pack: pack_id.to_string(),
            die,
            face,
            color: color.to_string(),
        };
        if let Some(frame) = self.landing.get(&key) {
            return Arc::clone(frame);
        }

        let image = self
            .load_landing_image(pack_id, die, face, color)
            .unwrap_or_else(|| {
                let hue = self.resolve_hue(pack_id, color);
                placeholder::generate_face(die, face, hue)
            });

        let frame = Arc::new(SpriteFrame {
            key: FrameKey {
                pose: PoseKind::Landing,
                pack: pack_id.to_string(),
                die,
                face: Some(face),
                color: color.to_string(),
            },
            image,
        });
        self.landing.insert(key, Arc::clone(&frame));
        frame
    }

    /// All tumble frames for a die. Resolution order: pre-rendered tumble
    /// art, then landing frames (real or placeholder) in a shuffled order
    /// that is stable per (pack, die, color) for this cache's seed.
    pub fn tumble_frames(
        &mut self,
        pack_id: &str,
        die: DieKind,
        color: &str,
    ) -> Arc<Vec<Arc<SpriteFrame>>> {
        let key = TumbleKey {
            pack: pack_id.to_string(),
            die,
            color: color.to_string(),
        };
        if let Some(frames) = self.tumble.get(&key) {
            return Arc::clone(frames);
        }

        let mut frames = self.load_prerendered_tumble(pack_id, die, color);
        if frames.is_empty() {
            let mut faces: Vec<u16> = (1..=die.faces()).collect();
            let mut rng = Rng::new(self.seed ^ hash_key(&key));
            rng.shuffle(&mut faces);
            frames = faces
                .into_iter()
                .map(|face| self.landing_frame(pack_id, die, face, color))
                .collect();
        }

        let frames = Arc::new(frames);
        self.tumble.insert(key, Arc::clone(&frames));
        frames
    }

    /// Drop all memoized frames. Outstanding Arcs stay valid; the next
    /// request per key regenerates.
    pub fn clear_cache(&mut self) {
        self.landing = HashMap::new();
        self.tumble = HashMap::new();
    }

    /// Re-discover packs from disk and clear the cache. Safe to call while
    /// sprites are mid-animation.
    pub fn rescan(&mut self) {
        self.packs = pack::scan_packs(&self.packs_dir);
        self.clear_cache();
        log::debug!("frame cache rescan: {} pack(s)", self.packs.len());
    }

    // -- load paths --

    fn load_landing_image(
        &self,
        pack_id: &str,
        die: DieKind,
        face: u16,
        color: &str,
    ) -> Option<RgbaImage> {
        let pack = self.packs.get(pack_id)?;
        let path = pack.landing_path(die, face);
        if !path.is_file() {
            return None;
        }
        let mut image = match image::open(&path) {
            Ok(img) => img.to_rgba8(),
            Err(err) => {
                log::warn!("unreadable frame {}: {err}", path.display());
                return None;
            }
        };
        if let Some(hue) = pack.hue_for(color).filter(|h| *h >= 0) {
            self.hue.apply(&mut image, hue);
        }
        Some(image)
    }

    fn load_prerendered_tumble(
        &self,
        pack_id: &str,
        die: DieKind,
        color: &str,
    ) -> Vec<Arc<SpriteFrame>> {
        let Some(pack) = self.packs.get(pack_id) else {
            return Vec::new();
        };
        let dir = pack.tumble_dir(die);
        let Ok(entries) = std::fs::read_dir(&dir) else {
            return Vec::new();
        };

        let mut paths: Vec<PathBuf> = entries
            .flatten()
            .map(|e| e.path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "png"))
            .collect();
        paths.sort();

        let hue = pack.hue_for(color).filter(|h| *h >= 0);
        let mut frames = Vec::with_capacity(paths.len());
        for path in paths {
            let mut image = match image::open(&path) {
                Ok(img) => img.to_rgba8(),
                Err(err) => {
                    log::warn!("unreadable tumble frame {}: {err}", path.display());
                    continue;
                }
            };
            if let Some(hue) = hue {
                self.hue.apply(&mut image, hue);
            }
            frames.push(Arc::new(SpriteFrame {
                key: FrameKey {
                    pose: PoseKind::Tumble,
                    pack: pack_id.to_string(),
                    die,
                    face: None,
                    color: color.to_string(),
                },
                image,
            }));
        }
        frames
    }

    fn resolve_hue(&self, pack_id: &str, color: &str) -> i32 {
        self.packs
            .get(pack_id)
            .and_then(|p| p.hue_for(color))
            .unwrap_or_else(|| default_hue(color))
    }
}

fn hash_key(key: &TumbleKey) -> u64 {
    let mut hasher = DefaultHasher::new();
    key.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache() -> FrameCache {
        FrameCache::new("/nonexistent/dice_packs", 42)
    }

    #[test]
    fn missing_packs_report_placeholder() {
        let cache = cache();
        assert_eq!(cache.available_packs(), vec![PLACEHOLDER_PACK.to_string()]);
        assert!(cache.pack_info(PLACEHOLDER_PACK).is_some());
        assert!(cache
            .available_colors(PLACEHOLDER_PACK)
            .contains(&"blue".to_string()));
    }

    #[test]
    fn landing_frame_is_memoized() {
        let mut cache = cache();
        let a = cache.landing_frame("classic", DieKind::D20, 17, "blue");
        let b = cache.landing_frame("classic", DieKind::D20, 17, "blue");
        assert!(Arc::ptr_eq(&a, &b), "second call must be a cache hit");
    }

    #[test]
    fn distinct_keys_get_distinct_frames() {
        let mut cache = cache();
        let a = cache.landing_frame("classic", DieKind::D20, 17, "blue");
        let b = cache.landing_frame("classic", DieKind::D20, 18, "blue");
        let c = cache.landing_frame("classic", DieKind::D20, 17, "red");
        assert!(!Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
        assert_ne!(a.image.as_raw(), c.image.as_raw());
    }

    #[test]
    fn placeholder_output_is_identical_across_caches() {
        let a = cache().landing_frame("classic", DieKind::D20, 7, "red");
        let b = cache().landing_frame("classic", DieKind::D20, 7, "red");
        assert_eq!(a.image.as_raw(), b.image.as_raw());
    }

    #[test]
    fn landing_key_carries_pose_and_face() {
        let mut cache = cache();
        let frame = cache.landing_frame("classic", DieKind::D8, 3, "green");
        assert_eq!(frame.key.pose, PoseKind::Landing);
        assert_eq!(frame.key.face, Some(3));
        assert_eq!(frame.key.die, DieKind::D8);
    }

    #[test]
    fn tumble_covers_every_face_once() {
        let mut cache = cache();
        let frames = cache.tumble_frames("classic", DieKind::D6, "red");
        assert_eq!(frames.len(), 6);
        let mut faces: Vec<u16> = frames.iter().filter_map(|f| f.key.face).collect();
        faces.sort_unstable();
        assert_eq!(faces, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn tumble_order_is_stable_within_a_session() {
        let mut cache = cache();
        let order = |frames: &Arc<Vec<Arc<SpriteFrame>>>| -> Vec<Option<u16>> {
            frames.iter().map(|f| f.key.face).collect()
        };
        let first = order(&cache.tumble_frames("classic", DieKind::D20, "red"));
        // Clearing drops the memo, but the shuffle is keyed by seed + key,
        // so regeneration yields the same order.
        cache.clear_cache();
        let second = order(&cache.tumble_frames("classic", DieKind::D20, "red"));
        assert_eq!(first, second);
    }

    #[test]
    fn tumble_order_differs_between_colors() {
        let mut cache = cache();
        let red: Vec<_> = cache
            .tumble_frames("classic", DieKind::D20, "red")
            .iter()
            .map(|f| f.key.face)
            .collect();
        let blue: Vec<_> = cache
            .tumble_frames("classic", DieKind::D20, "blue")
            .iter()
            .map(|f| f.key.face)
            .collect();
        assert_ne!(red, blue, "shuffle should be keyed per color");
    }

    #[test]
    fn clear_cache_keeps_old_frames_alive() {
        let mut cache = cache();
        let held = cache.landing_frame("classic", DieKind::D20, 20, "gold");
        cache.clear_cache();
        // The held Arc is still fully usable after the cache dropped its map.
        assert_eq!(held.image.width(), placeholder::PLACEHOLDER_SIZE);
        let fresh = cache.landing_frame("classic", DieKind::D20, 20, "gold");
        assert!(!Arc::ptr_eq(&held, &fresh));
        assert_eq!(held.image.as_raw(), fresh.image.as_raw());
    }

    #[test]
    fn rescan_is_safe_with_no_packs_dir() {
        let mut cache = cache();
        let _ = cache.landing_frame("classic", DieKind::D20, 1, "red");
        cache.rescan();
        assert_eq!(cache.available_packs(), vec![PLACEHOLDER_PACK.to_string()]);
    }

    #[test]
    fn loads_real_pack_from_disk() {
        use std::fs;

        // Unique scratch dir; no tempdir crate in this workspace.
        let root = std::env::temp_dir().join(format!(
            "dicecast-pack-test-{}-{}",
            std::process::id(),
            line!()
        ));
        let d6 = root.join("testpack").join("d6");
        fs::create_dir_all(&d6).unwrap();
        fs::write(
            root.join("testpack").join("pack.json"),
            r#"{ "name": "Test", "colors": { "red": { "hue_shift": 0 } } }"#,
        )
        .unwrap();
        // A tiny saturated frame for face 4.
        let mut img = RgbaImage::new(4, 4);
        for px in img.pixels_mut() {
            px.0 = [200, 40, 40, 255];
        }
        img.save(d6.join("land_04.png")).unwrap();

        let mut cache = FrameCache::new(&root, 42);
        assert_eq!(cache.available_packs(), vec!["testpack".to_string()]);

        let frame = cache.landing_frame("testpack", DieKind::D6, 4, "red");
        assert_eq!(frame.image.width(), 4, "should load the real 4x4 frame");

        // Missing face falls back to the generated placeholder.
        let missing = cache.landing_frame("testpack", DieKind::D6, 5, "red");
        assert_eq!(missing.image.width(), placeholder::PLACEHOLDER_SIZE);

        fs::remove_dir_all(&root).ok();
    }
}
