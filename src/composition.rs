use std::sync::Arc;

use egui::Pos2;
use image::RgbaImage;
use uuid::Uuid;

/// Identity of a placed part. Two parts with the same image and geometry
/// are still different parts.
pub type PartId = Uuid;

/// A placed, draggable image instance.
#[derive(Clone, Debug)]
pub struct Part {
    pub id: PartId,
    pub image: Arc<RgbaImage>,
    /// Where the image was loaded from (for logging / tooltips).
    pub source: String,
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Part {
    pub fn new(image: Arc<RgbaImage>, source: impl Into<String>, x: f32, y: f32) -> Self {
        let (w, h) = image.dimensions();
        Self {
            id: Uuid::new_v4(),
            image,
            source: source.into(),
            x,
            y,
            w: w as f32,
            h: h as f32,
        }
    }

    pub fn origin(&self) -> Pos2 {
        Pos2::new(self.x, self.y)
    }

    /// Inclusive on all four edges.
    pub fn contains(&self, p: Pos2) -> bool {
        p.x >= self.x && p.x <= self.x + self.w && p.y >= self.y && p.y <= self.y + self.h
    }
}

/// Ordered stack of parts (back to front) plus the current selection.
#[derive(Clone, Debug)]
pub struct Composition {
    pub width: u32,
    pub height: u32,
    parts: Vec<Part>,
    selection: Option<PartId>,
}

impl Composition {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            parts: Vec::new(),
            selection: None,
        }
    }

    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn get(&self, id: PartId) -> Option<&Part> {
        self.parts.iter().find(|p| p.id == id)
    }

    fn get_mut(&mut self, id: PartId) -> Option<&mut Part> {
        self.parts.iter_mut().find(|p| p.id == id)
    }

    /// Append a freshly loaded image centered in the canvas. Returns the new part's id.
    pub fn add_centered(&mut self, image: Arc<RgbaImage>, source: impl Into<String>) -> PartId {
        let (w, h) = image.dimensions();
        let x = (self.width as f32 - w as f32) / 2.0;
        let y = (self.height as f32 - h as f32) / 2.0;
        self.push(Part::new(image, source, x, y))
    }

    pub fn push(&mut self, part: Part) -> PartId {
        let id = part.id;
        self.parts.push(part);
        id
    }

    /// Topmost part under `p`, searching from the end of the stack.
    pub fn hit_test(&self, p: Pos2) -> Option<PartId> {
        self.parts.iter().rev().find(|part| part.contains(p)).map(|part| part.id)
    }

    /// Move a part to the end of the stack so it renders on top.
    pub fn bring_to_front(&mut self, id: PartId) -> bool {
        let Some(idx) = self.parts.iter().position(|p| p.id == id) else {
            return false;
        };
        let part = self.parts.remove(idx);
        self.parts.push(part);
        true
    }

    pub fn move_to(&mut self, id: PartId, origin: Pos2) -> bool {
        match self.get_mut(id) {
            Some(part) => {
                part.x = origin.x;
                part.y = origin.y;
                true
            }
            None => false,
        }
    }

    pub fn selection(&self) -> Option<PartId> {
        self.selection
    }

    pub fn selected_part(&self) -> Option<&Part> {
        self.selection.and_then(|id| self.get(id))
    }

    pub fn is_selected(&self, id: PartId) -> bool {
        self.selection == Some(id)
    }

    /// Select `id` (or clear with `None`). Ids not in the stack clear the selection.
    /// Returns true if the selection changed.
    pub fn select(&mut self, id: Option<PartId>) -> bool {
        let next = id.filter(|id| self.get(*id).is_some());
        let changed = next != self.selection;
        self.selection = next;
        changed
    }

    /// Remove a single part by identity.
    pub fn remove(&mut self, id: PartId) -> Option<Part> {
        let idx = self.parts.iter().position(|p| p.id == id)?;
        if self.selection == Some(id) {
            self.selection = None;
        }
        Some(self.parts.remove(idx))
    }

    /// Remove the selected part, if any.
    pub fn remove_selected(&mut self) -> Option<Part> {
        let id = self.selection?;
        self.remove(id)
    }

    pub fn clear(&mut self) {
        self.parts.clear();
        self.selection = None;
    }
}
