//! Pointer / touch state machine for the doll canvas.
//!
//! Events arrive already converted to canvas pixel coordinates. Each handler
//! returns `true` when the composition changed in a way that needs a redraw.
//!
//! Ordering on a release is fixed: the drag ends first, then the
//! click-deselect rule runs for the same point. A double-click is fed in
//! after the release of its second click.

use egui::{Pos2, Vec2};

use crate::composition::{Composition, PartId};

/// How long a touch must be held before it selects the part under it.
pub const HOLD_TO_SELECT_SECS: f64 = 0.5;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerEvent {
    Down(Pos2),
    Move(Pos2),
    Up(Pos2),
    DoubleClick(Pos2),
    /// Touch press at `time` seconds; arms the hold timer.
    TouchStart(Pos2, f64),
    TouchEnd(Pos2),
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum DragState {
    #[default]
    Idle,
    Dragging { part: PartId, offset: Vec2 },
}

#[derive(Clone, Copy, Debug)]
struct HoldTimer {
    pos: Pos2,
    started: f64,
}

#[derive(Debug, Default)]
pub struct Interaction {
    drag: DragState,
    hold: Option<HoldTimer>,
}

impl Interaction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.drag, DragState::Dragging { .. })
    }

    pub fn hold_pending(&self) -> bool {
        self.hold.is_some()
    }

    pub fn handle(&mut self, comp: &mut Composition, event: PointerEvent) -> bool {
        match event {
            PointerEvent::Down(p) => self.start_drag(comp, p),
            PointerEvent::Move(p) => self.move_drag(comp, p),
            PointerEvent::Up(p) => self.release(comp, p),
            PointerEvent::DoubleClick(p) => select_at(comp, p),
            PointerEvent::TouchStart(p, time) => {
                self.hold = Some(HoldTimer { pos: p, started: time });
                self.start_drag(comp, p)
            }
            PointerEvent::TouchEnd(p) => {
                self.hold = None;
                self.release(comp, p)
            }
        }
    }

    /// Fire the hold timer once it has been armed for at least
    /// [`HOLD_TO_SELECT_SECS`]. The timer fires at most once.
    pub fn tick(&mut self, comp: &mut Composition, now: f64) -> bool {
        match self.hold {
            Some(timer) if now - timer.started >= HOLD_TO_SELECT_SECS => {
                self.hold = None;
                select_at(comp, timer.pos)
            }
            _ => false,
        }
    }

    fn start_drag(&mut self, comp: &mut Composition, p: Pos2) -> bool {
        let Some(id) = comp.hit_test(p) else {
            return false;
        };
        let Some(origin) = comp.get(id).map(|part| part.origin()) else {
            return false;
        };
        self.drag = DragState::Dragging {
            part: id,
            offset: p - origin,
        };
        comp.bring_to_front(id);
        true
    }

    fn move_drag(&mut self, comp: &mut Composition, p: Pos2) -> bool {
        let DragState::Dragging { part, offset } = self.drag else {
            return false;
        };
        if comp.move_to(part, p - offset) {
            true
        } else {
            // Part vanished mid-drag (deleted or cleared).
            self.drag = DragState::Idle;
            false
        }
    }

    fn release(&mut self, comp: &mut Composition, p: Pos2) -> bool {
        self.drag = DragState::Idle;
        match comp.selected_part() {
            Some(sel) if !sel.contains(p) => comp.select(None),
            _ => false,
        }
    }

    /// Delete the selected part. No-op without a selection.
    pub fn delete_selected(&mut self, comp: &mut Composition) -> bool {
        let Some(removed) = comp.remove_selected() else {
            return false;
        };
        if matches!(self.drag, DragState::Dragging { part, .. } if part == removed.id) {
            self.drag = DragState::Idle;
        }
        true
    }

    pub fn clear_all(&mut self, comp: &mut Composition) -> bool {
        comp.clear();
        self.drag = DragState::Idle;
        self.hold = None;
        true
    }
}

/// Select the topmost part under `p`, or clear the selection on a miss.
fn select_at(comp: &mut Composition, p: Pos2) -> bool {
    let hit = comp.hit_test(p);
    comp.select(hit)
}
