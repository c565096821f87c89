//! On-screen doll canvas: texture upload, screen ↔ canvas mapping and the
//! translation of raw egui pointer input into [`PointerEvent`]s.

use egui::{Color32, Pos2, Rect, Sense, Stroke, TextureHandle, TextureOptions, Vec2};
use image::RgbaImage;

use crate::composition::Composition;
use crate::interaction::PointerEvent;
use crate::render::{render, to_color_image};

/// What egui reported about the primary pointer this frame, already mapped
/// into canvas pixel space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PointerSnapshot {
    /// Pointer position in canvas pixels (may lie outside the canvas).
    pub pos: Option<Pos2>,
    pub over_canvas: bool,
    pub pressed: bool,
    pub released: bool,
    pub moved: bool,
    pub double_clicked: bool,
    /// A touch is in progress (finger rather than mouse).
    pub touch: bool,
    /// egui input time in seconds.
    pub time: f64,
}

/// Tracks whether the current press started on the canvas, so releases
/// outside it still end a drag.
#[derive(Clone, Copy, Debug, Default)]
pub struct PressTracker {
    active: bool,
    touch: bool,
}

impl PressTracker {
    /// Turn one frame of pointer input into ordered events: press, move,
    /// release, then double-click.
    pub fn translate(&mut self, snap: PointerSnapshot) -> Vec<PointerEvent> {
        let mut events = Vec::new();
        let Some(p) = snap.pos else {
            if snap.released {
                self.active = false;
            }
            return events;
        };

        if snap.pressed && snap.over_canvas {
            self.active = true;
            self.touch = snap.touch;
            events.push(if snap.touch {
                PointerEvent::TouchStart(p, snap.time)
            } else {
                PointerEvent::Down(p)
            });
        }
        if snap.moved && self.active {
            events.push(PointerEvent::Move(p));
        }

        // Only presses that began on the canvas count as canvas clicks.
        if snap.released && self.active {
            events.push(if self.touch {
                PointerEvent::TouchEnd(p)
            } else {
                PointerEvent::Up(p)
            });
            self.active = false;
            self.touch = false;
        }

        if snap.double_clicked && snap.over_canvas {
            events.push(PointerEvent::DoubleClick(p));
        }
        events
    }
}

/// Map a screen position into canvas pixels for a canvas drawn into `rect`.
/// Not clamped: positions left of / above the canvas come out negative.
pub fn screen_to_canvas(screen_pos: Pos2, rect: Rect, canvas_size: [u32; 2]) -> Pos2 {
    let sx = canvas_size[0] as f32 / rect.width().max(1.0);
    let sy = canvas_size[1] as f32 / rect.height().max(1.0);
    Pos2::new(
        (screen_pos.x - rect.min.x) * sx,
        (screen_pos.y - rect.min.y) * sy,
    )
}

/// On-screen size for a canvas whose longer edge is `display_size` points.
pub fn display_extent(canvas_size: [u32; 2], display_size: f32) -> Vec2 {
    let [w, h] = canvas_size;
    let longest = w.max(h).max(1) as f32;
    Vec2::new(w as f32, h as f32) * (display_size / longest)
}

pub struct CanvasView {
    texture: Option<TextureHandle>,
    /// Last rendered frame; export stamps its caption onto this buffer.
    pub frame: RgbaImage,
    dirty: bool,
    pub press: PressTracker,
}

impl CanvasView {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            texture: None,
            frame: RgbaImage::new(width, height),
            dirty: true,
            press: PressTracker::default(),
        }
    }

    /// Request a full repaint on the next frame.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Re-render the composition into `frame` if anything changed.
    pub fn refresh(&mut self, comp: &Composition) -> bool {
        if !self.dirty {
            return false;
        }
        self.frame = render(comp);
        self.dirty = false;
        if let Some(tex) = &mut self.texture {
            tex.set(to_color_image(&self.frame), TextureOptions::NEAREST);
        }
        true
    }

    /// Paint the canvas and return the raw pointer events for this frame.
    pub fn show(&mut self, ui: &mut egui::Ui, comp: &Composition, display_size: f32) -> Vec<PointerEvent> {
        self.refresh(comp);
        let texture = self.texture.get_or_insert_with(|| {
            ui.ctx()
                .load_texture("doll_canvas", to_color_image(&self.frame), TextureOptions::NEAREST)
        });

        let size = [comp.width, comp.height];
        let (rect, response) = ui.allocate_exact_size(display_extent(size, display_size), Sense::click_and_drag());

        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 0.0, Color32::WHITE);
        painter.image(
            texture.id(),
            rect,
            Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0)),
            Color32::WHITE,
        );
        painter.rect_stroke(rect, 0.0, Stroke::new(1.0, Color32::from_gray(160)));

        let snap = ui.input(|i| PointerSnapshot {
            pos: i.pointer.interact_pos().map(|p| screen_to_canvas(p, rect, size)),
            over_canvas: response.hovered()
                || i.pointer.interact_pos().is_some_and(|p| rect.contains(p)),
            pressed: i.pointer.primary_pressed(),
            released: i.pointer.primary_released(),
            moved: i.pointer.delta() != Vec2::ZERO,
            double_clicked: i.pointer.button_double_clicked(egui::PointerButton::Primary),
            touch: i.any_touches(),
            time: i.time,
        });
        self.press.translate(snap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(x: f32, y: f32) -> PointerSnapshot {
        PointerSnapshot {
            pos: Some(Pos2::new(x, y)),
            over_canvas: true,
            ..Default::default()
        }
    }

    #[test]
    fn screen_mapping_scales_to_pixels() {
        let rect = Rect::from_min_size(Pos2::new(100.0, 50.0), Vec2::splat(200.0));
        let p = screen_to_canvas(Pos2::new(150.0, 150.0), rect, [400, 400]);
        assert_eq!(p, Pos2::new(100.0, 200.0));
        let outside = screen_to_canvas(Pos2::new(90.0, 40.0), rect, [400, 400]);
        assert_eq!(outside, Pos2::new(-20.0, -20.0));
    }

    #[test]
    fn display_extent_keeps_aspect() {
        assert_eq!(display_extent([400, 200], 200.0), Vec2::new(200.0, 100.0));
        assert_eq!(display_extent([300, 300], 150.0), Vec2::splat(150.0));
    }

    #[test]
    fn release_follows_press_and_double_click_comes_last() {
        let mut t = PressTracker::default();
        let ev = t.translate(PointerSnapshot { pressed: true, ..snap(3.0, 4.0) });
        assert_eq!(ev, vec![PointerEvent::Down(Pos2::new(3.0, 4.0))]);

        let ev = t.translate(PointerSnapshot { moved: true, ..snap(5.0, 4.0) });
        assert_eq!(ev, vec![PointerEvent::Move(Pos2::new(5.0, 4.0))]);

        let ev = t.translate(PointerSnapshot { released: true, double_clicked: true, ..snap(5.0, 4.0) });
        assert_eq!(
            ev,
            vec![
                PointerEvent::Up(Pos2::new(5.0, 4.0)),
                PointerEvent::DoubleClick(Pos2::new(5.0, 4.0)),
            ]
        );
    }

    #[test]
    fn release_without_canvas_press_sends_nothing() {
        let mut t = PressTracker::default();
        let ev = t.translate(PointerSnapshot { released: true, ..snap(50.0, 50.0) });
        assert!(ev.is_empty());
    }

    #[test]
    fn release_after_press_elsewhere_keeps_selection() {
        use crate::composition::tests::part_at;
        use crate::interaction::Interaction;

        let mut comp = Composition::new(100, 100);
        let a = comp.push(part_at(0.0, 0.0, 10, 10));
        comp.select(Some(a));
        let mut ix = Interaction::new();
        let mut t = PressTracker::default();

        // Press on a side panel (off canvas), release over the canvas.
        let off = PointerSnapshot { over_canvas: false, ..snap(-40.0, 50.0) };
        t.translate(PointerSnapshot { pressed: true, ..off });
        for event in t.translate(PointerSnapshot { released: true, ..snap(50.0, 50.0) }) {
            ix.handle(&mut comp, event);
        }
        assert_eq!(comp.selection(), Some(a));
    }

    #[test]
    fn movement_in_the_press_frame_is_kept() {
        let mut t = PressTracker::default();
        let ev = t.translate(PointerSnapshot { pressed: true, moved: true, ..snap(2.0, 3.0) });
        assert_eq!(
            ev,
            vec![PointerEvent::Down(Pos2::new(2.0, 3.0)), PointerEvent::Move(Pos2::new(2.0, 3.0))]
        );
    }

    #[test]
    fn moves_without_press_are_ignored() {
        let mut t = PressTracker::default();
        assert!(t.translate(PointerSnapshot { moved: true, ..snap(1.0, 1.0) }).is_empty());
    }

    #[test]
    fn press_outside_canvas_is_ignored_but_drag_may_leave_it() {
        let mut t = PressTracker::default();
        let outside = PointerSnapshot { over_canvas: false, ..snap(-5.0, -5.0) };
        assert!(t.translate(PointerSnapshot { pressed: true, ..outside }).is_empty());

        t.translate(PointerSnapshot { pressed: true, ..snap(1.0, 1.0) });
        let ev = t.translate(PointerSnapshot { moved: true, ..outside });
        assert_eq!(ev, vec![PointerEvent::Move(Pos2::new(-5.0, -5.0))]);
        let ev = t.translate(PointerSnapshot { released: true, ..outside });
        assert_eq!(ev, vec![PointerEvent::Up(Pos2::new(-5.0, -5.0))]);
    }

    #[test]
    fn touch_press_arms_hold_and_ends_as_touch() {
        let mut t = PressTracker::default();
        let ev = t.translate(PointerSnapshot { pressed: true, touch: true, time: 2.0, ..snap(1.0, 1.0) });
        assert_eq!(ev, vec![PointerEvent::TouchStart(Pos2::new(1.0, 1.0), 2.0)]);
        // Finger already lifted when the release is reported.
        let ev = t.translate(PointerSnapshot { released: true, touch: false, ..snap(1.0, 1.0) });
        assert_eq!(ev, vec![PointerEvent::TouchEnd(Pos2::new(1.0, 1.0))]);
    }
}
