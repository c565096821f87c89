//! Save the current doll as a PNG with a caption stamped along the bottom.
//!
//! The caption is drawn straight onto the frame that gets encoded. Callers
//! repaint the on-screen canvas afterwards, so the caption only ever shows up
//! in the saved file.

use ab_glyph::FontArc;
use image::{Rgba, RgbaImage};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::text::{draw_text, TextAlignment};

pub const DEFAULT_CAPTION: &str = "Frontend Dollmaker Script";
pub const DEFAULT_FILE_NAME: &str = "mydoll.png";
pub const CAPTION_SIZE: f32 = 12.0;
/// Distance from the bottom edge to the caption baseline.
pub const CAPTION_BASELINE_INSET: f32 = 5.0;
pub const CAPTION_COLOR: Rgba<u8> = Rgba([0, 0, 0, 230]);

/// Stamp `caption` centered near the bottom edge of `frame`.
pub fn stamp_caption(frame: &mut RgbaImage, caption: &str, font: &FontArc) {
    if caption.is_empty() {
        return;
    }
    let anchor_x = frame.width() as f32 / 2.0;
    let baseline = frame.height() as f32 - CAPTION_BASELINE_INSET;
    draw_text(
        frame,
        font,
        caption,
        CAPTION_SIZE,
        TextAlignment::Center,
        anchor_x,
        baseline,
        CAPTION_COLOR,
    );
}

/// Caption the frame in place and PNG-encode it. Without a font the frame is
/// encoded uncaptioned.
pub fn export_png(frame: &mut RgbaImage, caption: &str, font: Option<&FontArc>) -> Result<Vec<u8>> {
    match font {
        Some(font) => stamp_caption(frame, caption, font),
        None if !caption.is_empty() => {
            crate::log_warn!("Export: no caption font available, saving without caption");
        }
        None => {}
    }
    crate::io::encode_png(frame)
}

/// Where an export lands: `dir/file_name` when an export directory is
/// configured, otherwise whatever the save dialog returns.
pub fn resolve_target(export_dir: Option<&Path>, file_name: &str) -> Option<PathBuf> {
    match export_dir {
        Some(dir) => Some(dir.join(file_name)),
        None => crate::io::pick_save_path(file_name),
    }
}

/// Caption, encode and write in one step. Returns the written path.
pub fn export_to(frame: &mut RgbaImage, caption: &str, font: Option<&FontArc>, path: &Path) -> Result<PathBuf> {
    let bytes = export_png(frame, caption, font)?;
    crate::io::write_bytes(&bytes, path)?;
    crate::log_info!("Exported {}x{} doll to {}", frame.width(), frame.height(), path.display());
    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composition::tests::solid;
    use crate::composition::{Composition, Part};
    use crate::render::render;
    use crate::text::load_bundled_font;

    #[test]
    fn export_keeps_canvas_pixel_size() {
        let mut comp = Composition::new(400, 300);
        comp.push(Part::new(solid(50, 50, [200, 10, 10, 255]), "p", 10.0, 10.0));
        let mut frame = render(&comp);
        let font = load_bundled_font().unwrap();

        let bytes = export_png(&mut frame, DEFAULT_CAPTION, Some(&font)).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (400, 300));
    }

    #[test]
    fn caption_only_touches_the_bottom_strip() {
        let comp = Composition::new(200, 200);
        let mut frame = render(&comp);
        let font = load_bundled_font().unwrap();
        stamp_caption(&mut frame, DEFAULT_CAPTION, &font);

        let inked: Vec<u32> = frame
            .enumerate_pixels()
            .filter(|(_, _, p)| p[3] > 0)
            .map(|(_, y, _)| y)
            .collect();
        assert!(!inked.is_empty());
        // Glyphs sit on the baseline; descenders may dip a few rows below it.
        assert!(inked.iter().all(|&y| y >= 200 - 5 - 16 && y < 200));
        assert!(inked.iter().any(|&y| y <= 200 - 5));
    }

    #[test]
    fn rerender_after_export_drops_the_caption() {
        let comp = Composition::new(120, 60);
        let mut frame = render(&comp);
        let font = load_bundled_font().unwrap();
        export_png(&mut frame, DEFAULT_CAPTION, Some(&font)).unwrap();
        assert!(frame.pixels().any(|p| p[3] > 0));

        let fresh = render(&comp);
        assert!(fresh.pixels().all(|p| p[3] == 0));
    }

    #[test]
    fn export_to_writes_into_export_dir() {
        let dir = tempfile::tempdir().unwrap();
        let target = resolve_target(Some(dir.path()), DEFAULT_FILE_NAME).unwrap();
        let mut frame = render(&Composition::new(32, 32));

        let written = export_to(&mut frame, "", None, &target).unwrap();
        assert_eq!(written, dir.path().join("mydoll.png"));
        let decoded = image::open(&written).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (32, 32));
    }
}
