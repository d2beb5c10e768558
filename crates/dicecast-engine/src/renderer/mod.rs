pub mod paint;

// Re-export key types for convenient access
pub use paint::{CardPaint, PaintBuffer, SpritePaint};
