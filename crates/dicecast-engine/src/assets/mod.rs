pub mod cache;
pub mod hue;
pub mod pack;
pub mod placeholder;

// Re-export public types
pub use cache::{FrameCache, FrameKey, LandingKey, PoseKind, SpriteFrame, TumbleKey};
pub use hue::HueShift;
pub use pack::{ColorDef, DiePack, PackManifest, DEFAULT_COLORS, PLACEHOLDER_PACK};
pub use placeholder::PLACEHOLDER_SIZE;
