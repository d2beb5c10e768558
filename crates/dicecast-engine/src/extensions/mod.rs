// extensions/mod.rs
//
// Animation math decoupled from sprites and the overlay — pure functions only.

pub mod easing;

pub use easing::{ease, ease_vec2, lerp, lerp_vec2, Easing};
