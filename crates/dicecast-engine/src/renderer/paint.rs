//! Per-tick paint output.
//!
//! The overlay rebuilds a `PaintBuffer` each tick; the host draws it in
//! fixed order — `dice` first, then `cards`, then the effect primitives
//! read from `EffectsState` on top. The order is part of the contract and
//! is not configurable.

use std::sync::Arc;

use glam::Vec2;

use crate::assets::cache::SpriteFrame;

/// A die sprite ready to draw: bitmap frame plus placement.
#[derive(Debug, Clone)]
pub struct SpritePaint {
    pub frame: Arc<SpriteFrame>,
    /// Center position in window coordinates.
    pub pos: Vec2,
    /// Rotation in radians.
    pub rotation: f32,
    /// Uniform scale factor over the configured die size.
    pub scale: f32,
    /// Opacity in [0, 1].
    pub opacity: f32,
    /// Whether to draw a ground shadow beneath (hold phase only).
    pub shadow: bool,
    /// Crack overlay progress in [0, 1]; zero except during a shatter exit.
    pub crack_progress: f32,
}

/// A roll card ready to draw. The host renders the card chrome itself;
/// this carries placement plus the roll summary to print on it.
#[derive(Debug, Clone)]
pub struct CardPaint {
    /// Top-left corner in window coordinates.
    pub pos: Vec2,
    pub size: Vec2,
    pub opacity: f32,
    /// Accent color (per-character tint).
    pub accent: [u8; 4],
    pub character: String,
    pub result: u16,
    pub crit: bool,
    pub fumble: bool,
}

/// Paint buffer rebuilt once per tick.
#[derive(Debug, Default)]
pub struct PaintBuffer {
    pub dice: Vec<SpritePaint>,
    pub cards: Vec<CardPaint>,
}

impl PaintBuffer {
    pub fn new() -> Self {
        Self {
            dice: Vec::with_capacity(8),
            cards: Vec::with_capacity(8),
        }
    }

    pub fn clear(&mut self) {
        self.dice.clear();
        self.cards.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.dice.is_empty() && self.cards.is_empty()
    }
}
