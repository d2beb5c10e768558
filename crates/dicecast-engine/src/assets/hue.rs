//! Hue-shift color variants.
//!
//! Packs ship neutral base art; color variants are produced by moving every
//! saturated pixel's hue to a target while preserving saturation, value, and
//! alpha. Grey and near-transparent pixels are left untouched so outlines,
//! highlights, and shadows survive the tint.
//!
//! Two implementations exist: a bulk slice transform (parallelized when the
//! `bulk-color` feature is on) and a per-pixel walk. Both run the same
//! per-pixel math, so their output is identical — the strategy is picked once
//! at startup and is invisible to callers.

use image::RgbaImage;

/// Pixels below this saturation are considered grey and not tinted.
const MIN_SATURATION: f32 = 0.08;
/// Pixels at or below this alpha are considered transparent and not tinted.
const MIN_ALPHA: u8 = 10;

/// Strategy for applying a hue shift to a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HueShift {
    /// Flat-buffer transform over 4-byte chunks.
    #[cfg(feature = "bulk-color")]
    Bulk,
    /// Pixel-API walk. Always available.
    PerPixel,
}

impl HueShift {
    /// Pick the fastest available implementation. Resolved once at startup,
    /// never re-decided per call.
    pub fn detect() -> Self {
        #[cfg(feature = "bulk-color")]
        {
            HueShift::Bulk
        }
        #[cfg(not(feature = "bulk-color"))]
        {
            HueShift::PerPixel
        }
    }

    /// Move every saturated pixel's hue to `target_hue` (degrees, 0-360).
    /// A negative target is a no-op (untinted variants).
    pub fn apply(self, image: &mut RgbaImage, target_hue: i32) {
        if target_hue < 0 {
            return;
        }
        let target = target_hue as f32 % 360.0;
        match self {
            #[cfg(feature = "bulk-color")]
            HueShift::Bulk => apply_bulk(image, target),
            HueShift::PerPixel => apply_per_pixel(image, target),
        }
    }
}

#[cfg(feature = "bulk-color")]
fn apply_bulk(image: &mut RgbaImage, target: f32) {
    use rayon::prelude::*;
    // The image buffer derefs to its flat RGBA byte slice.
    image.par_chunks_exact_mut(4).for_each(|px| {
        let shifted = shift_pixel([px[0], px[1], px[2], px[3]], target);
        px.copy_from_slice(&shifted);
    });
}

fn apply_per_pixel(image: &mut RgbaImage, target: f32) {
    for pixel in image.pixels_mut() {
        pixel.0 = shift_pixel(pixel.0, target);
    }
}

/// The shared per-pixel math both strategies run.
fn shift_pixel(px: [u8; 4], target_hue: f32) -> [u8; 4] {
    let [r, g, b, a] = px;
    if a <= MIN_ALPHA {
        return px;
    }
    let (_, s, v) = rgb_to_hsv(r, g, b);
    if s <= MIN_SATURATION {
        return px;
    }
    let (nr, ng, nb) = hsv_to_rgb(target_hue, s, v);
    [nr, ng, nb, a]
}

/// RGB (0-255) to HSV: hue in degrees [0, 360), saturation/value in [0, 1].
pub fn rgb_to_hsv(r: u8, g: u8, b: u8) -> (f32, f32, f32) {
    let r = r as f32 / 255.0;
    let g = g as f32 / 255.0;
    let b = b as f32 / 255.0;
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let hue = if delta == 0.0 {
        0.0
    } else if max == r {
        60.0 * (((g - b) / delta).rem_euclid(6.0))
    } else if max == g {
        60.0 * ((b - r) / delta + 2.0)
    } else {
        60.0 * ((r - g) / delta + 4.0)
    };
    let saturation = if max == 0.0 { 0.0 } else { delta / max };
    (hue, saturation, max)
}

/// HSV (hue degrees, s/v in [0, 1]) to RGB bytes.
pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> (u8, u8, u8) {
    let h = h.rem_euclid(360.0);
    let c = v * s;
    let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
    let m = v - c;
    let (r, g, b) = match h {
        h if h < 60.0 => (c, x, 0.0),
        h if h < 120.0 => (x, c, 0.0),
        h if h < 180.0 => (0.0, c, x),
        h if h < 240.0 => (0.0, x, c),
        h if h < 300.0 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    (
        ((r + m) * 255.0).round() as u8,
        ((g + m) * 255.0).round() as u8,
        ((b + m) * 255.0).round() as u8,
    )
}
