//! Procedural placeholder die faces.
//!
//! When no pack art exists for a request, the cache falls back to a
//! generated diamond with the face number on it. Generation is a pure
//! function of (die, face, hue) — the same inputs produce byte-identical
//! pixels in every cache instance and every run.

use image::RgbaImage;

use crate::api::types::DieKind;
use crate::assets::hue::hsv_to_rgb;

/// Side length of generated placeholder frames, in px.
pub const PLACEHOLDER_SIZE: u32 = 128;

/// Generate a single placeholder face: a tinted diamond with a border,
/// an inner highlight, the face number, and a die-type label.
pub fn generate_face(die: DieKind, face: u16, hue: i32) -> RgbaImage {
    let size = PLACEHOLDER_SIZE;
    let mut img = RgbaImage::new(size, size);

    let (face_color, border_color) = if hue < 0 {
        ([220, 220, 225], [180, 180, 185])
    } else {
        let hue = hue as f32 % 360.0;
        let (fr, fg, fb) = hsv_to_rgb(hue, 160.0 / 255.0, 220.0 / 255.0);
        let (br, bg, bb) = hsv_to_rgb(hue, 200.0 / 255.0, 180.0 / 255.0);
        ([fr, fg, fb], [br, bg, bb])
    };

    let center = size as f32 / 2.0;
    let margin = size as f32 * 0.08;
    let half = center - margin;
    let border_width = 3.0;
    let inner_half = half * 0.6;

    for y in 0..size {
        for x in 0..size {
            let dx = (x as f32 + 0.5 - center).abs();
            let dy = (y as f32 + 0.5 - center).abs();
            let dist = dx + dy;
            if dist > half {
                continue;
            }

            // Feathered edge over the outermost 1.5px.
            let coverage = ((half - dist) / 1.5).clamp(0.0, 1.0);
            let rgb = if dist > half - border_width {
                border_color
            } else {
                face_color
            };
            let alpha = (coverage * 255.0).round() as u8;
            blend_px(&mut img, x, y, [rgb[0], rgb[1], rgb[2], alpha]);

            // Inner highlight diamond, shifted up slightly.
            let hy = (y as f32 + 0.5 - (center - 2.0)).abs();
            if dx + hy <= inner_half {
                blend_px(&mut img, x, y, [255, 255, 255, 50]);
            }
        }
    }

    // Face number, centered, with a 1px drop shadow for readability.
    let text = face.to_string();
    let scale = if face < 10 { 5 } else { 4 };
    let text_h = 7 * scale;
    let top = (size - text_h) / 2;
    draw_text(&mut img, &text, center as u32, top, scale, [0, 0, 0, 100], 1);
    draw_text(&mut img, &text, center as u32, top, scale, [255, 255, 255, 240], 0);

    // Die-type label at the bottom.
    let label = die.label().to_uppercase();
    let label_scale = 2;
    let label_top = size - (size as f32 * 0.06) as u32 - 7 * label_scale;
    draw_text(
        &mut img,
        &label,
        center as u32,
        label_top,
        label_scale,
        [255, 255, 255, 150],
        0,
    );

    img
}

/// Source-over blend of one pixel.
fn blend_px(img: &mut RgbaImage, x: u32, y: u32, src: [u8; 4]) {
    let dst = img.get_pixel_mut(x, y);
    let sa = src[3] as f32 / 255.0;
    if sa <= 0.0 {
        return;
    }
    let da = dst.0[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        return;
    }
    for i in 0..3 {
        let sc = src[i] as f32;
        let dc = dst.0[i] as f32;
        dst.0[i] = (((sc * sa) + dc * da * (1.0 - sa)) / out_a).round() as u8;
    }
    dst.0[3] = (out_a * 255.0).round() as u8;
}

// 5x7 glyphs for digits and 'D', one byte per row, low 5 bits used.
fn glyph(c: char) -> Option<[u8; 7]> {
    let rows = match c {
        '0' => [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E],
        '1' => [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E],
        '2' => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F],
        '3' => [0x1F, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0E],
        '4' => [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02],
        '5' => [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E],
        '6' => [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E],
        '7' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08],
        '8' => [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E],
        '9' => [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C],
        'D' => [0x1E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x1E],
        _ => return None,
    };
    Some(rows)
}

/// Draw text centered on `center_x` with its top edge at `top`.
/// `offset` shifts right/down (used for the shadow pass).
fn draw_text(
    img: &mut RgbaImage,
    text: &str,
    center_x: u32,
    top: u32,
    scale: u32,
    color: [u8; 4],
    offset: u32,
) {
    let glyphs: Vec<[u8; 7]> = text.chars().filter_map(glyph).collect();
    if glyphs.is_empty() {
        return;
    }
    let count = glyphs.len() as u32;
    let text_w = count * 5 * scale + (count - 1) * scale;
    let mut pen_x = center_x.saturating_sub(text_w / 2) + offset;
    let pen_y = top + offset;

    for rows in glyphs {
        for (row, bits) in rows.iter().enumerate() {
            for col in 0..5u32 {
                if bits & (0x10 >> col) == 0 {
                    continue;
                }
                for sy in 0..scale {
                    for sx in 0..scale {
                        let px = pen_x + col * scale + sx;
                        let py = pen_y + row as u32 * scale + sy;
                        if px < img.width() && py < img.height() {
                            blend_px(img, px, py, color);
                        }
                    }
                }
            }
        }
        pen_x += 6 * scale;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_is_deterministic() {
        let a = generate_face(DieKind::D20, 7, 0);
        let b = generate_face(DieKind::D20, 7, 0);
        assert_eq!(a.as_raw(), b.as_raw());
    }

    #[test]
    fn faces_are_visually_distinct() {
        let a = generate_face(DieKind::D20, 7, 0);
        let b = generate_face(DieKind::D20, 17, 0);
        assert_ne!(a.as_raw(), b.as_raw());
    }

    #[test]
    fn colors_are_visually_distinct() {
        let red = generate_face(DieKind::D20, 7, 0);
        let blue = generate_face(DieKind::D20, 7, 210);
        assert_ne!(red.as_raw(), blue.as_raw());
    }

    #[test]
    fn corners_stay_transparent() {
        let img = generate_face(DieKind::D6, 3, 120);
        assert_eq!(img.get_pixel(0, 0).0[3], 0);
        assert_eq!(img.get_pixel(127, 127).0[3], 0);
    }

    #[test]
    fn center_is_opaque() {
        let img = generate_face(DieKind::D6, 3, 120);
        assert_eq!(img.get_pixel(64, 64).0[3], 255);
    }

    #[test]
    fn every_face_of_a_die_renders() {
        for face in 1..=20 {
            let img = generate_face(DieKind::D20, face, 45);
            assert_eq!(img.width(), PLACEHOLDER_SIZE);
            assert_eq!(img.height(), PLACEHOLDER_SIZE);
        }
    }

    #[test]
    fn white_variant_is_untinted_grey() {
        let img = generate_face(DieKind::D20, 5, -1);
        // Sample a face pixel away from text: grey face color has r==g.
        let px = img.get_pixel(40, 64).0;
        assert_eq!(px[0], px[1]);
    }
}
