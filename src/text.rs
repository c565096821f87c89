use ab_glyph::{point, Font, FontArc, GlyphId, ScaleFont};
use image::{Rgba, RgbaImage};

use crate::error::{DollError, Result};
use crate::render::blend_over;

/// Text alignment relative to the anchor x coordinate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextAlignment {
    Left,
    Center,
}

/// Lay out a single line of text, returning `(glyph, x)` pairs relative to the
/// aligned anchor plus the total advance width.
pub fn layout_line(font: &FontArc, text: &str, font_size: f32, alignment: TextAlignment) -> (Vec<(GlyphId, f32)>, f32) {
    let scaled = font.as_scaled(font_size);

    let mut glyphs = Vec::new();
    let mut cursor_x = 0.0f32;
    let mut last_glyph: Option<GlyphId> = None;

    for ch in text.chars() {
        let glyph_id = font.glyph_id(ch);
        if let Some(prev) = last_glyph {
            cursor_x += scaled.kern(prev, glyph_id);
        }
        glyphs.push((glyph_id, cursor_x));
        cursor_x += scaled.h_advance(glyph_id);
        last_glyph = Some(glyph_id);
    }

    let total_width = cursor_x;
    let offset = match alignment {
        TextAlignment::Left => 0.0,
        TextAlignment::Center => -total_width * 0.5,
    };
    for glyph in &mut glyphs {
        glyph.1 += offset;
    }

    (glyphs, total_width)
}

/// Draw one line of text onto `img` with its baseline at `baseline_y`.
/// Coverage is blended source-over; pixels outside the image are dropped.
pub fn draw_text(
    img: &mut RgbaImage,
    font: &FontArc,
    text: &str,
    font_size: f32,
    alignment: TextAlignment,
    anchor_x: f32,
    baseline_y: f32,
    color: Rgba<u8>,
) {
    let (glyphs, _) = layout_line(font, text, font_size, alignment);
    let (w, h) = img.dimensions();

    for (glyph_id, gx) in glyphs {
        let glyph = glyph_id.with_scale_and_position(font_size, point(anchor_x + gx, baseline_y));
        let Some(outlined) = font.outline_glyph(glyph) else {
            continue; // whitespace
        };
        let bounds = outlined.px_bounds();
        outlined.draw(|px, py, cov| {
            let x = bounds.min.x as i32 + px as i32;
            let y = bounds.min.y as i32 + py as i32;
            if x < 0 || y < 0 || x >= w as i32 || y >= h as i32 {
                return;
            }
            let a = (color[3] as f32 * cov.clamp(0.0, 1.0)).round() as u8;
            let dst = img.get_pixel_mut(x as u32, y as u32);
            *dst = blend_over(*dst, Rgba([color[0], color[1], color[2], a]));
        });
    }
}

/// Best available sans-serif face: the system default via font-kit, then
/// egui's bundled proportional font.
pub fn load_caption_font() -> Result<FontArc> {
    if let Some(font) = load_system_sans() {
        return Ok(font);
    }
    crate::log_warn!("No system sans-serif font found, using bundled font for captions");
    load_bundled_font()
}

fn load_system_sans() -> Option<FontArc> {
    use font_kit::family_name::FamilyName;
    use font_kit::properties::Properties;
    use font_kit::source::SystemSource;

    let handle = SystemSource::new()
        .select_best_match(&[FamilyName::SansSerif], &Properties::new())
        .ok()?;
    let font_data = handle.load().ok()?;
    let bytes: Vec<u8> = (*font_data.copy_font_data()?).clone();
    FontArc::try_from_vec(bytes).ok()
}

/// egui ships its default fonts inside the binary; reuse the first
/// proportional one so captions work even without system fonts.
pub fn load_bundled_font() -> Result<FontArc> {
    let defs = egui::FontDefinitions::default();
    let names = defs
        .families
        .get(&egui::FontFamily::Proportional)
        .cloned()
        .unwrap_or_default();
    for name in names {
        if let Some(data) = defs.font_data.get(&name)
            && let Ok(font) = FontArc::try_from_vec(data.font.to_vec())
        {
            return Ok(font);
        }
    }
    Err(DollError::Font("no bundled proportional font".to_string()))
}
