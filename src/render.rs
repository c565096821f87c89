use image::{Rgba, RgbaImage};

use crate::composition::{Composition, Part};

/// Translucent warm fill drawn beneath the selected part.
pub const SELECTION_HIGHLIGHT: Rgba<u8> = Rgba([255, 153, 153, 153]);

/// Full repaint of the composition into a fresh transparent frame.
///
/// The output depends only on the part stack, the selection and the frame
/// size, so calling it twice in a row yields identical pixels.
pub fn render(comp: &Composition) -> RgbaImage {
    let mut frame = RgbaImage::new(comp.width, comp.height);
    for part in comp.parts() {
        if comp.is_selected(part.id) {
            fill_rect(&mut frame, part, SELECTION_HIGHLIGHT);
        }
        draw_part(&mut frame, part);
    }
    frame
}

/// Source-over composite of `top` onto `base` (straight alpha).
pub fn blend_over(base: Rgba<u8>, top: Rgba<u8>) -> Rgba<u8> {
    // Fast paths: nothing to draw, or fully opaque overwrite
    if top[3] == 0 {
        return base;
    }
    if top[3] == 255 {
        return top;
    }

    let base_a = base[3] as f32 / 255.0;
    let top_a = top[3] as f32 / 255.0;

    let out_a = top_a + base_a * (1.0 - top_a);
    if out_a == 0.0 {
        return Rgba([0, 0, 0, 0]);
    }

    let channel = |i: usize| {
        let b = base[i] as f32 / 255.0;
        let t = top[i] as f32 / 255.0;
        let v = (t * top_a + b * base_a * (1.0 - top_a)) / out_a;
        (v * 255.0).round().clamp(0.0, 255.0) as u8
    };

    Rgba([
        channel(0),
        channel(1),
        channel(2),
        (out_a * 255.0).round().clamp(0.0, 255.0) as u8,
    ])
}

/// Integer pixel bounds of a part, clipped to the frame. `None` when fully off-canvas.
fn clipped_bounds(frame: &RgbaImage, part: &Part) -> Option<(i64, i64, i64, i64)> {
    let x0 = part.x.round() as i64;
    let y0 = part.y.round() as i64;
    let x1 = (x0 + part.w as i64).min(frame.width() as i64);
    let y1 = (y0 + part.h as i64).min(frame.height() as i64);
    let cx0 = x0.max(0);
    let cy0 = y0.max(0);
    if cx0 >= x1 || cy0 >= y1 {
        return None;
    }
    Some((cx0, cy0, x1, y1))
}

fn fill_rect(frame: &mut RgbaImage, part: &Part, color: Rgba<u8>) {
    let Some((x0, y0, x1, y1)) = clipped_bounds(frame, part) else {
        return;
    };
    for y in y0..y1 {
        for x in x0..x1 {
            let px = frame.get_pixel_mut(x as u32, y as u32);
            *px = blend_over(*px, color);
        }
    }
}

/// Nearest-neighbor placement: the image is drawn 1:1 at its rounded origin.
fn draw_part(frame: &mut RgbaImage, part: &Part) {
    let Some((x0, y0, x1, y1)) = clipped_bounds(frame, part) else {
        return;
    };
    let ox = part.x.round() as i64;
    let oy = part.y.round() as i64;
    for y in y0..y1 {
        for x in x0..x1 {
            let Some(src) = part.image.get_pixel_checked((x - ox) as u32, (y - oy) as u32) else {
                continue;
            };
            let px = frame.get_pixel_mut(x as u32, y as u32);
            *px = blend_over(*px, *src);
        }
    }
}

/// Convert a frame into an egui texture image.
pub fn to_color_image(frame: &RgbaImage) -> egui::ColorImage {
    egui::ColorImage::from_rgba_unmultiplied(
        [frame.width() as usize, frame.height() as usize],
        frame.as_raw(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composition::tests::solid;
    use crate::composition::Part;

    #[test]
    fn empty_composition_is_transparent() {
        let comp = Composition::new(8, 6);
        let frame = render(&comp);
        assert_eq!(frame.dimensions(), (8, 6));
        assert!(frame.pixels().all(|p| p[3] == 0));
    }

    #[test]
    fn later_parts_paint_over_earlier_ones() {
        let mut comp = Composition::new(20, 20);
        comp.push(Part::new(solid(10, 10, [255, 0, 0, 255]), "red", 0.0, 0.0));
        comp.push(Part::new(solid(10, 10, [0, 0, 255, 255]), "blue", 5.0, 5.0));
        let frame = render(&comp);
        assert_eq!(*frame.get_pixel(2, 2), Rgba([255, 0, 0, 255]));
        assert_eq!(*frame.get_pixel(7, 7), Rgba([0, 0, 255, 255]));
        assert_eq!(frame.get_pixel(17, 17)[3], 0);
    }

    #[test]
    fn selection_highlight_shows_through_transparent_pixels() {
        let mut comp = Composition::new(10, 10);
        let id = comp.push(Part::new(solid(4, 4, [0, 0, 0, 0]), "clear", 2.0, 2.0));
        assert!(render(&comp).get_pixel(3, 3)[3] == 0);

        comp.select(Some(id));
        let frame = render(&comp);
        assert_eq!(*frame.get_pixel(3, 3), SELECTION_HIGHLIGHT);
        assert_eq!(frame.get_pixel(0, 0)[3], 0);
    }

    #[test]
    fn off_canvas_parts_are_clipped() {
        let mut comp = Composition::new(10, 10);
        comp.push(Part::new(solid(6, 6, [0, 255, 0, 255]), "g", -3.0, 7.0));
        comp.push(Part::new(solid(6, 6, [0, 255, 0, 255]), "gone", 50.0, 50.0));
        let frame = render(&comp);
        assert_eq!(frame.get_pixel(0, 9)[1], 255);
        assert_eq!(frame.get_pixel(2, 9)[1], 255);
        assert_eq!(frame.get_pixel(3, 9)[3], 0);
        assert_eq!(frame.get_pixel(0, 6)[3], 0);
    }

    #[test]
    fn render_is_deterministic() {
        let mut comp = Composition::new(16, 16);
        let id = comp.push(Part::new(solid(5, 5, [10, 20, 30, 128]), "half", 3.5, 1.2));
        comp.select(Some(id));
        assert_eq!(render(&comp), render(&comp));
    }

    #[test]
    fn blend_over_half_alpha_on_opaque() {
        let out = blend_over(Rgba([0, 0, 0, 255]), Rgba([255, 255, 255, 128]));
        assert_eq!(out[3], 255);
        assert!((127..=129).contains(&out[0]));
    }
}
