pub mod api;
pub mod assets;
pub mod components;
pub mod core;
pub mod extensions;
pub mod renderer;
pub mod systems;

// Re-export key types at crate root for convenience
pub use api::config::OverlayConfig;
pub use api::types::{DieKind, DisplayMode, RollEvent, RollEventError, Side};
pub use assets::cache::{FrameCache, FrameKey, LandingKey, PoseKind, SpriteFrame, TumbleKey};
pub use assets::hue::HueShift;
pub use assets::pack::{ColorDef, DiePack, PackManifest, DEFAULT_COLORS, PLACEHOLDER_PACK};
pub use components::card::{CardPhase, RollCard};
pub use components::die::{DieParams, DiePhase, DieSprite, ExitStyle};
pub use core::overlay::Overlay;
pub use renderer::paint::{CardPaint, PaintBuffer, SpritePaint};
pub use systems::effects::{
    EffectsState, FlashPhase, Particle, ParticleShape, ResultFlash, Rng, ScreenShake,
};

// Extensions — animation math decoupled from the overlay
pub use extensions::{ease, ease_vec2, lerp, lerp_vec2, Easing};
