use std::collections::HashMap;

use ab_glyph::FontArc;
use eframe::egui;
use egui::{Color32, TextureHandle, TextureOptions, Vec2};

use crate::canvas::CanvasView;
use crate::composition::Composition;
use crate::drawers::Drawers;
use crate::interaction::Interaction;
use crate::loader::{LoadResult, PartsLoader};
use crate::render::to_color_image;
use crate::settings::DollSettings;

/// Edge length of drawer thumbnails in points.
const THUMB_SIZE: f32 = 48.0;

pub struct DollmakerApp {
    settings: DollSettings,
    composition: Composition,
    interaction: Interaction,
    canvas: CanvasView,
    drawers: Drawers,
    loader: PartsLoader,
    /// Drawer previews keyed by image source.
    thumbnails: HashMap<String, TextureHandle>,
    caption_font: Option<FontArc>,
    caption_font_tried: bool,
    status: String,
}

impl DollmakerApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, settings: DollSettings) -> Self {
        let mut loader = PartsLoader::new();
        crate::log_info!(
            "Loading manifest {} for doll type \"{}\"",
            settings.manifest,
            settings.doll_type
        );
        loader.request_manifest(&settings.manifest);

        Self {
            composition: Composition::new(settings.canvas_width, settings.canvas_height),
            interaction: Interaction::new(),
            canvas: CanvasView::new(settings.canvas_width, settings.canvas_height),
            drawers: Drawers::new(settings.categories.iter().cloned()),
            loader,
            thumbnails: HashMap::new(),
            caption_font: None,
            caption_font_tried: false,
            status: "Loading parts…".to_string(),
            settings,
        }
    }

    /// Apply one finished background job.
    fn apply_load_result(&mut self, ctx: &egui::Context, result: LoadResult) {
        match result {
            LoadResult::Manifest(Ok(manifest)) => {
                self.drawers = Drawers::from_manifest(&self.settings.categories, &manifest);
                let sources: Vec<String> = self
                    .drawers
                    .drawers()
                    .iter()
                    .flat_map(|d| d.thumbnails.iter().map(|t| t.source.clone()))
                    .collect();
                crate::log_info!(
                    "Manifest loaded: {} drawers, {} parts",
                    self.drawers.len(),
                    sources.len()
                );
                self.status = format!("{} parts available", sources.len());
                for source in sources {
                    self.loader.request_thumbnail(&source);
                }
            }
            LoadResult::Manifest(Err(e)) => {
                crate::log_err!("Manifest {} failed: {}", self.settings.manifest, e);
                self.status = format!("Could not load parts: {}", e);
            }
            LoadResult::Thumbnail { source, image: Ok(img) } => {
                let tex = ctx.load_texture(source.clone(), to_color_image(&img), TextureOptions::NEAREST);
                self.thumbnails.insert(source, tex);
            }
            LoadResult::Thumbnail { source, image: Err(e) } => {
                crate::log_warn!("Thumbnail {} failed: {}", source, e);
            }
            LoadResult::Part { source, image: Ok(img) } => {
                self.composition.add_centered(img, source);
                self.canvas.mark_dirty();
            }
            LoadResult::Part { source, image: Err(e) } => {
                crate::log_warn!("Part {} failed: {}", source, e);
                self.status = format!("Could not load {}", source);
            }
        }
    }

    fn delete_selected(&mut self) {
        if self.interaction.delete_selected(&mut self.composition) {
            self.canvas.mark_dirty();
        }
    }

    fn clear_all(&mut self) {
        if self.interaction.clear_all(&mut self.composition) {
            self.canvas.mark_dirty();
        }
    }

    fn caption_font(&mut self) -> Option<&FontArc> {
        if !self.caption_font_tried {
            self.caption_font_tried = true;
            match crate::text::load_caption_font() {
                Ok(font) => self.caption_font = Some(font),
                Err(e) => crate::log_warn!("Caption font unavailable: {}", e),
            }
        }
        self.caption_font.as_ref()
    }

    /// Stamp the caption onto the live frame, write it out, then repaint so
    /// the caption only survives in the saved file.
    fn save(&mut self) {
        let Some(path) = crate::export::resolve_target(
            self.settings.export_dir.as_deref(),
            &self.settings.export_file_name,
        ) else {
            return;
        };

        self.canvas.refresh(&self.composition);
        let caption = self.settings.caption.clone();
        let font = self.caption_font().cloned();
        match crate::export::export_to(&mut self.canvas.frame, &caption, font.as_ref(), &path) {
            Ok(written) => self.status = format!("Saved {}", written.display()),
            Err(e) => {
                crate::log_err!("Export to {} failed: {}", path.display(), e);
                self.status = format!("Save failed: {}", e);
            }
        }
        self.canvas.mark_dirty();
    }

    fn drawers_panel(&mut self, ui: &mut egui::Ui) {
        ui.heading("Parts");
        ui.separator();
        if self.drawers.is_empty() {
            ui.weak("No categories");
            return;
        }

        let mut toggled = None;
        let mut requested = Vec::new();
        egui::ScrollArea::vertical().show(ui, |ui| {
            for (idx, drawer) in self.drawers.drawers().iter().enumerate() {
                let open = self.drawers.is_open(idx);
                let arrow = if open { "▼" } else { "▶" };
                if ui
                    .add(egui::SelectableLabel::new(open, format!("{} {}", arrow, drawer.name)))
                    .clicked()
                {
                    toggled = Some(idx);
                }
                if !open {
                    continue;
                }
                if drawer.thumbnails.is_empty() {
                    ui.weak("  (empty)");
                    continue;
                }
                ui.horizontal_wrapped(|ui| {
                    for thumb in &drawer.thumbnails {
                        let clicked = match self.thumbnails.get(&thumb.source) {
                            Some(tex) => {
                                let sized = egui::load::SizedTexture::from_handle(tex);
                                let img = egui::Image::from_texture(sized)
                                    .fit_to_exact_size(Vec2::splat(THUMB_SIZE))
                                    .maintain_aspect_ratio(true);
                                ui.add(egui::ImageButton::new(img))
                                    .on_hover_text(&thumb.alt)
                                    .clicked()
                            }
                            None => ui
                                .add_sized(Vec2::splat(THUMB_SIZE), egui::Button::new(&thumb.alt).wrap(true))
                                .clicked(),
                        };
                        if clicked {
                            requested.push(thumb.source.clone());
                        }
                    }
                });
            }
        });

        if let Some(idx) = toggled {
            self.drawers.toggle(idx);
        }
        for source in requested {
            self.loader.request_part(&source);
        }
    }
}

impl eframe::App for DollmakerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // --- Poll background loads ---
        for result in self.loader.poll() {
            self.apply_load_result(ctx, result);
        }
        if self.loader.pending() > 0 {
            ctx.request_repaint();
        }

        // --- Hold-to-select timer ---
        let now = ctx.input(|i| i.time);
        if self.interaction.tick(&mut self.composition, now) {
            self.canvas.mark_dirty();
        }
        if self.interaction.hold_pending() {
            ctx.request_repaint_after(std::time::Duration::from_millis(50));
        }

        // --- Keyboard shortcuts ---
        if ctx.input(|i| i.key_pressed(egui::Key::Delete) || i.key_pressed(egui::Key::Backspace)) {
            self.delete_selected();
        }

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(&self.status);
                let pending = self.loader.pending();
                if pending > 0 {
                    ui.separator();
                    ui.spinner();
                    ui.label(format!("{} loading", pending));
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.weak(format!("{} parts placed", self.composition.len()));
                });
            });
        });

        egui::SidePanel::left("drawers")
            .resizable(true)
            .default_width(220.0)
            .show(ctx, |ui| self.drawers_panel(ui));

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.horizontal(|ui| {
                let has_selection = self.composition.selection().is_some();
                if ui
                    .add_enabled(has_selection, egui::Button::new("Delete"))
                    .on_hover_text("Remove the selected part (double-click or hold to select)")
                    .clicked()
                {
                    self.delete_selected();
                }
                if ui.button("Clear all").clicked() {
                    self.clear_all();
                }
                if ui.button("Save").clicked() {
                    self.save();
                }
            });
            ui.add_space(8.0);

            let events = self
                .canvas
                .show(ui, &self.composition, self.settings.display_size);
            for event in events {
                if self.interaction.handle(&mut self.composition, event) {
                    self.canvas.mark_dirty();
                }
            }
            if self.interaction.is_dragging() {
                ui.ctx().set_cursor_icon(egui::CursorIcon::Grabbing);
            }

            if let Some(part) = self.composition.selected_part() {
                ui.add_space(4.0);
                ui.colored_label(
                    Color32::from_rgb(200, 90, 90),
                    format!("Selected: {}", part.source),
                );
            }
        });
    }
}
