use crate::config::GalleryConfig;
use crate::constants::*;
use crate::file_record::{FileRecord, PreviewHandle};
use crate::format::{format_date, format_file_size, FileKind};
use crate::gallery::Gallery;
use crate::input::{command_for_key, command_for_wheel, PanGesture};
use crate::intake::{collect_sources, AcceptFilter};
use crate::preview::{PreviewStatus, TexturePreviews};
use crate::video_player::VideoPlayer;
use crate::viewer::ViewerCommand;
use eframe::egui::{
    self, pos2, vec2, Align2, Color32, FontId, Id, Pos2, Rect, RichText, Rounding, Sense, Stroke,
    TextureHandle, Vec2,
};
use std::path::PathBuf;

/// Deferred grid interactions, applied once the frame's UI has been laid out.
enum CardAction {
    Open(usize),
    Remove(String),
    Reorder(usize, usize),
}

/// What the viewer needs from the current record, copied out so the preview
/// cache can be borrowed mutably while painting.
struct ViewedFile {
    name: String,
    mime_type: String,
    byte_size: u64,
    last_modified_ms: i64,
    kind: FileKind,
    path: PathBuf,
    preview: PreviewHandle,
}

impl ViewedFile {
    fn from_record(record: &FileRecord) -> Self {
        Self {
            name: record.name.clone(),
            mime_type: record.mime_type.clone(),
            byte_size: record.byte_size,
            last_modified_ms: record.last_modified_ms,
            kind: record.kind(),
            path: record.source.path.clone(),
            preview: record.preview.clone(),
        }
    }
}

pub struct GalleryApp {
    gallery: Gallery<TexturePreviews>,
    config: GalleryConfig,
    accept: AcceptFilter,
    pan: PanGesture,
    files_hovering: bool,
}

impl GalleryApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: GalleryConfig) -> Self {
        let previews = TexturePreviews::new(
            cc.egui_ctx.clone(),
            config.thumbnail_size,
            config.viewer_max_dimension,
        );
        cc.egui_ctx.set_visuals(egui::Visuals::light());

        Self {
            gallery: Gallery::new(previews),
            accept: AcceptFilter::parse(&config.accept),
            config,
            pan: PanGesture::default(),
            files_hovering: false,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Intake
    // ─────────────────────────────────────────────────────────────────────────────

    fn add_paths(&mut self, paths: Vec<PathBuf>) {
        if paths.is_empty() {
            return;
        }
        let sources = collect_sources(paths, &self.accept, self.config.max_files);
        self.gallery.add_files(sources);
    }

    fn pick_files(&mut self) {
        if let Some(paths) = rfd::FileDialog::new().set_title("Add files").pick_files() {
            self.add_paths(paths);
        }
    }

    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let (hovering, dropped) = ctx.input(|i| {
            let dropped: Vec<PathBuf> = i
                .raw
                .dropped_files
                .iter()
                .filter_map(|f| f.path.clone())
                .collect();
            (!i.raw.hovered_files.is_empty(), dropped)
        });
        self.files_hovering = hovering;
        self.add_paths(dropped);
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Page
    // ─────────────────────────────────────────────────────────────────────────────

    fn render_header(&self, ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            ui.add_space(24.0);
            ui.label(
                RichText::new("Temporary File Gallery")
                    .size(32.0)
                    .strong()
                    .color(COLOR_TEXT_PRIMARY),
            );
            ui.add_space(8.0);
            ui.label(
                RichText::new(
                    "Add files and browse them in a gallery. Files are only held in memory \
                     and are forgotten when the window closes.",
                )
                .color(COLOR_TEXT_MUTED),
            );
            ui.add_space(24.0);
        });
    }

    fn render_drop_zone(&mut self, ui: &mut egui::Ui) {
        let width = ui.available_width().min(DROP_ZONE_MAX_WIDTH);
        let (outer, _) = ui.allocate_exact_size(vec2(ui.available_width(), DROP_ZONE_HEIGHT), Sense::hover());
        let rect = Rect::from_center_size(outer.center(), vec2(width, DROP_ZONE_HEIGHT));
        let response = ui.interact(rect, Id::new("drop_zone"), Sense::click());

        let active = self.files_hovering;
        let (fill, border) = if active {
            (COLOR_DROP_ZONE_ACTIVE_BG, COLOR_DROP_ZONE_ACTIVE_BORDER)
        } else if response.hovered() {
            (COLOR_PREVIEW_BG, COLOR_TEXT_MUTED)
        } else {
            (Color32::TRANSPARENT, COLOR_DROP_ZONE_BORDER)
        };

        let painter = ui.painter_at(rect);
        let rounding = Rounding::same(CARD_CORNER_RADIUS);
        painter.rect_filled(rect, rounding, fill);
        painter.rect_stroke(rect.shrink(1.0), rounding, Stroke::new(2.0, border));

        let (icon, headline) = if active {
            ("📁", "Drop files here!")
        } else {
            ("📤", "Click to add files or drag and drop them here")
        };
        let center = rect.center();
        painter.text(
            center - vec2(0.0, 34.0),
            Align2::CENTER_CENTER,
            icon,
            FontId::proportional(ICON_FONT_SIZE * 0.8),
            COLOR_TEXT_PRIMARY,
        );
        painter.text(
            center + vec2(0.0, 10.0),
            Align2::CENTER_CENTER,
            headline,
            FontId::proportional(17.0),
            COLOR_TEXT_PRIMARY,
        );
        let accepted = if self.accept.accepts_all() {
            "images, videos, and other file types".to_string()
        } else {
            self.config.accept.clone()
        };
        painter.text(
            center + vec2(0.0, 36.0),
            Align2::CENTER_CENTER,
            format!("Supports {accepted} (max {} files)", self.config.max_files),
            FontId::proportional(13.0),
            COLOR_TEXT_MUTED,
        );

        if response.clicked() {
            self.pick_files();
        }
        ui.add_space(24.0);
    }

    fn render_stats(&mut self, ui: &mut egui::Ui) {
        if self.gallery.is_empty() {
            return;
        }
        egui::Frame::none()
            .fill(COLOR_CARD_BG)
            .rounding(Rounding::same(8.0))
            .inner_margin(12.0)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.label(RichText::new(files_uploaded_label(self.gallery.len())).color(COLOR_TEXT_MUTED));
                    if self.gallery.previews().has_pending() {
                        ui.spinner();
                        ui.label(RichText::new("Loading previews").color(COLOR_TEXT_MUTED));
                    }
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        let clear = egui::Button::new(RichText::new("Clear All").color(Color32::WHITE))
                            .fill(COLOR_DANGER);
                        if ui.add(clear).clicked() {
                            self.gallery.clear_all();
                        }
                    });
                });
            });
        ui.add_space(16.0);
    }

    fn render_empty_grid(&self, ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            ui.add_space(48.0);
            ui.label(RichText::new("📸").size(56.0));
            ui.add_space(12.0);
            ui.label(
                RichText::new("No files uploaded yet")
                    .size(20.0)
                    .color(COLOR_TEXT_MUTED),
            );
            ui.label(RichText::new("Upload some files to get started!").color(COLOR_TEXT_MUTED));
        });
    }

    fn render_grid(&self, ui: &mut egui::Ui, actions: &mut Vec<CardAction>) {
        if self.gallery.is_empty() {
            self.render_empty_grid(ui);
            return;
        }

        let columns = grid_columns(ui.available_width());
        let dragged_index = egui::DragAndDrop::payload::<usize>(ui.ctx()).map(|index| *index);

        let records = self.gallery.records();
        for (row, chunk) in records.chunks(columns).enumerate() {
            ui.horizontal(|ui| {
                ui.spacing_mut().item_spacing.x = GRID_SPACING;
                for (column, record) in chunk.iter().enumerate() {
                    let index = row * columns + column;
                    self.render_card(ui, record, index, dragged_index == Some(index), actions);
                }
            });
            ui.add_space(GRID_SPACING);
        }
    }

    fn render_card(
        &self,
        ui: &mut egui::Ui,
        record: &FileRecord,
        index: usize,
        is_dragged: bool,
        actions: &mut Vec<CardAction>,
    ) {
        let card_size = vec2(CARD_WIDTH, CARD_PREVIEW_HEIGHT + CARD_PADDING * 2.0 + 44.0);
        let (rect, _) = ui.allocate_exact_size(card_size, Sense::hover());
        let card_id = Id::new(("card", &record.id));
        let response = ui.interact(rect, card_id, Sense::click_and_drag());
        response.dnd_set_drag_payload(index);

        let hovered = ui.rect_contains_pointer(rect);
        let drop_target = response.dnd_hover_payload::<usize>().is_some_and(|from| *from != index);

        let mut painter = ui.painter_at(rect);
        if is_dragged {
            painter.set_opacity(DRAGGED_CARD_OPACITY);
        }

        let rounding = Rounding::same(CARD_CORNER_RADIUS);
        painter.rect_filled(rect, rounding, COLOR_CARD_BG);
        let border = if drop_target {
            Stroke::new(2.0, COLOR_ACCENT)
        } else if hovered {
            Stroke::new(1.0, COLOR_DROP_ZONE_BORDER)
        } else {
            Stroke::new(1.0, COLOR_PREVIEW_BG)
        };
        painter.rect_stroke(rect, rounding, border);

        let preview_rect = Rect::from_min_size(
            rect.min + Vec2::splat(CARD_PADDING),
            vec2(CARD_WIDTH - CARD_PADDING * 2.0, CARD_PREVIEW_HEIGHT),
        );
        self.render_card_preview(&painter, record, preview_rect);

        let text_width = preview_rect.width();
        let name_galley = truncated_galley(ui, &record.name, 14.0, COLOR_TEXT_PRIMARY, text_width);
        painter.galley(
            pos2(preview_rect.min.x, preview_rect.max.y + 8.0),
            name_galley,
            COLOR_TEXT_PRIMARY,
        );
        painter.text(
            pos2(preview_rect.min.x, preview_rect.max.y + 28.0),
            Align2::LEFT_TOP,
            format_file_size(record.byte_size),
            FontId::proportional(12.0),
            COLOR_TEXT_MUTED,
        );

        if hovered {
            painter.text(
                rect.min + vec2(CARD_PADDING + 2.0, CARD_PADDING + 2.0),
                Align2::LEFT_TOP,
                "⋮⋮",
                FontId::proportional(14.0),
                COLOR_TEXT_MUTED,
            );
        }

        // Registered after the card so it wins the click.
        let mut remove_clicked = false;
        if hovered && !is_dragged {
            let remove_rect = Rect::from_center_size(
                rect.right_top() + vec2(-REMOVE_BUTTON_SIZE, REMOVE_BUTTON_SIZE),
                Vec2::splat(REMOVE_BUTTON_SIZE),
            );
            let remove = ui.interact(remove_rect, card_id.with("remove"), Sense::click());
            let fill = if remove.hovered() {
                COLOR_DANGER_HOVER
            } else {
                COLOR_DANGER
            };
            painter.circle_filled(remove_rect.center(), REMOVE_BUTTON_SIZE / 2.0, fill);
            painter.text(
                remove_rect.center(),
                Align2::CENTER_CENTER,
                "×",
                FontId::proportional(14.0),
                Color32::WHITE,
            );
            remove_clicked = remove.clicked();
        }

        if remove_clicked {
            actions.push(CardAction::Remove(record.id.clone()));
        } else if response.clicked() {
            actions.push(CardAction::Open(index));
        }

        if let Some(from) = response.dnd_release_payload::<usize>() {
            if *from != index {
                actions.push(CardAction::Reorder(*from, index));
            }
        }

        response.on_hover_text(record.name.as_str());
    }

    fn render_card_preview(&self, painter: &egui::Painter, record: &FileRecord, rect: Rect) {
        let rounding = Rounding::same(CARD_CORNER_RADIUS * 0.6);
        painter.rect_filled(rect, rounding, COLOR_PREVIEW_BG);

        let kind = record.kind();
        match self.gallery.previews().thumbnail(&record.preview) {
            PreviewStatus::Ready(texture) => {
                let uv = cover_uv(texture.size_vec2(), rect.size());
                painter.image(texture.id(), rect, uv, Color32::WHITE);
                if kind == FileKind::Video {
                    painter.rect_filled(rect, rounding, Color32::from_black_alpha(50));
                    painter.text(
                        rect.center(),
                        Align2::CENTER_CENTER,
                        "▶",
                        FontId::proportional(ICON_FONT_SIZE),
                        Color32::WHITE,
                    );
                }
            }
            PreviewStatus::Pending => {
                painter.text(
                    rect.center(),
                    Align2::CENTER_CENTER,
                    "…",
                    FontId::proportional(ICON_FONT_SIZE * 0.6),
                    COLOR_TEXT_MUTED,
                );
            }
            PreviewStatus::Unavailable => {
                painter.text(
                    rect.center() - vec2(0.0, 12.0),
                    Align2::CENTER_CENTER,
                    kind.icon(),
                    FontId::proportional(ICON_FONT_SIZE),
                    COLOR_TEXT_PRIMARY,
                );
                painter.text(
                    rect.center() + vec2(0.0, 26.0),
                    Align2::CENTER_CENTER,
                    mime_label(&record.mime_type),
                    FontId::proportional(12.0),
                    COLOR_TEXT_MUTED,
                );
            }
        }
    }

    fn apply_card_actions(&mut self, actions: Vec<CardAction>) {
        for action in actions {
            match action {
                CardAction::Open(index) => self.gallery.open_viewer(index),
                CardAction::Remove(id) => {
                    self.gallery.remove_file(&id);
                }
                CardAction::Reorder(from, to) => {
                    if let Err(err) = self.gallery.reorder_files(from, to) {
                        log::warn!("{err}");
                    }
                }
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Viewer
    // ─────────────────────────────────────────────────────────────────────────────

    fn handle_viewer_input(&mut self, ctx: &egui::Context) {
        if !self.gallery.viewer().is_open() {
            return;
        }

        let commands: Vec<ViewerCommand> = ctx.input(|i| {
            i.events
                .iter()
                .filter_map(|event| match event {
                    egui::Event::Key {
                        key, pressed: true, ..
                    } => command_for_key(*key),
                    egui::Event::MouseWheel { delta, .. } => Some(command_for_wheel(delta.y)),
                    _ => None,
                })
                .collect()
        });

        for command in commands {
            self.gallery.viewer_command(command);
        }
    }

    fn render_viewer(&mut self, ctx: &egui::Context) {
        let Some(file) = self.gallery.current_record().map(ViewedFile::from_record) else {
            return;
        };

        let dt = ctx.input(|i| i.unstable_dt).max(0.0);
        let previews = self.gallery.previews_mut();
        let has_media = previews.viewer_media(&file.preview).is_some();
        let (texture, video) = if has_media {
            if let Some(wait) = previews.advance_viewer(dt) {
                ctx.request_repaint_after(wait);
            }
            previews
                .viewer_media(&file.preview)
                .map(|media| (media.texture().cloned(), media.video().map(VideoControls::of)))
                .unwrap_or((None, None))
        } else {
            (None, None)
        };

        let screen = ctx.screen_rect();
        let mut commands = Vec::new();
        let mut toggle_video = false;

        egui::Area::new(Id::new("viewer"))
            .order(egui::Order::Foreground)
            .fixed_pos(screen.min)
            .show(ctx, |ui| {
                ui.set_min_size(screen.size());
                let backdrop = ui.interact(screen, Id::new("viewer_backdrop"), Sense::click());
                ui.painter()
                    .rect_filled(screen, 0.0, Color32::from_black_alpha(VIEWER_BACKDROP_ALPHA));

                let content_bounds = screen.shrink(VIEWER_OVERLAY_MARGIN * 4.0);
                let content_clicked = match (&texture, video) {
                    (Some(texture), _) => self.render_viewer_media(ui, texture, content_bounds, &mut commands),
                    (None, Some(controls)) if !controls.failed => {
                        ui.painter().text(
                            content_bounds.center(),
                            Align2::CENTER_CENTER,
                            "Loading video…",
                            FontId::proportional(18.0),
                            Color32::LIGHT_GRAY,
                        );
                        false
                    }
                    _ => self.render_viewer_fallback(ui, &file, content_bounds),
                };

                if backdrop.clicked() && !content_clicked {
                    commands.push(ViewerCommand::Close);
                }

                if let (Some(controls), Some(_)) = (video, &texture) {
                    toggle_video |= render_video_controls(ui, screen, controls);
                }
                self.render_viewer_controls(ui, screen, &file, texture.is_some(), &mut commands);
            });

        if toggle_video || (video.is_some() && ctx.input(|i| i.key_pressed(egui::Key::Space))) {
            self.gallery.previews_mut().toggle_video();
        }
        for command in commands {
            self.gallery.viewer_command(command);
        }
    }

    /// Paints the zoomed, panned media and routes pan gestures. Returns true if
    /// the pointer interaction landed on the media itself.
    fn render_viewer_media(
        &mut self,
        ui: &mut egui::Ui,
        texture: &TextureHandle,
        bounds: Rect,
        commands: &mut Vec<ViewerCommand>,
    ) -> bool {
        let viewer = *self.gallery.viewer();
        let scale = viewer.scale();
        let size = fit_size(texture.size_vec2(), bounds.size()) * scale;
        let center = bounds.center() + viewer.position() * scale;
        let rect = Rect::from_center_size(center, size);

        let response = ui.interact(
            rect.intersect(ui.clip_rect()),
            Id::new("viewer_media"),
            Sense::click_and_drag(),
        );

        if response.drag_started() {
            if let Some(pointer) = response.interact_pointer_pos() {
                commands.extend(self.pan.press(pointer, &viewer));
            }
        } else if response.dragged() {
            if let Some(pointer) = response.interact_pointer_pos() {
                commands.extend(self.pan.moved(pointer, &viewer));
            }
        }
        if response.drag_stopped() || (viewer.is_dragging() && !response.dragged()) {
            commands.push(self.pan.release());
        }

        if scale > 1.0 {
            let cursor = if viewer.is_dragging() {
                egui::CursorIcon::Grabbing
            } else {
                egui::CursorIcon::Grab
            };
            if response.hovered() || viewer.is_dragging() {
                ui.ctx().set_cursor_icon(cursor);
            }
        }

        ui.painter().image(
            texture.id(),
            rect,
            Rect::from_min_max(pos2(0.0, 0.0), pos2(1.0, 1.0)),
            Color32::WHITE,
        );

        response.clicked() || response.dragged() || response.drag_stopped()
    }

    /// Icon, name, and a save action for files without a visual preview.
    /// Returns true if the save button was clicked.
    fn render_viewer_fallback(&self, ui: &mut egui::Ui, file: &ViewedFile, bounds: Rect) -> bool {
        let panel = Rect::from_center_size(bounds.center(), vec2(360.0, 220.0));
        let mut clicked = false;
        ui.allocate_new_ui(egui::UiBuilder::new().max_rect(panel), |ui| {
            ui.vertical_centered(|ui| {
                ui.label(RichText::new(file.kind.icon()).size(ICON_FONT_SIZE * 2.0));
                ui.label(RichText::new(&file.name).size(20.0).color(Color32::WHITE));
                ui.label(
                    RichText::new("Preview not available for this file type")
                        .color(Color32::LIGHT_GRAY),
                );
                ui.add_space(12.0);
                let save = egui::Button::new(RichText::new("Save a copy…").color(Color32::WHITE))
                    .fill(COLOR_ACCENT);
                if ui.add(save).clicked() {
                    clicked = true;
                    save_copy(file);
                }
            });
        });
        clicked
    }

    fn render_viewer_controls(
        &self,
        ui: &mut egui::Ui,
        screen: Rect,
        file: &ViewedFile,
        has_media: bool,
        commands: &mut Vec<ViewerCommand>,
    ) {
        let margin = VIEWER_OVERLAY_MARGIN;
        let len = self.gallery.len();
        let viewer = self.gallery.viewer();
        let zoomable = has_media && file.kind.is_previewable();

        let close_rect = Rect::from_min_size(
            screen.right_top() + vec2(-margin - VIEWER_BUTTON_SIZE, margin),
            Vec2::splat(VIEWER_BUTTON_SIZE),
        );
        if round_button(ui, close_rect, "×", "viewer_close") {
            commands.push(ViewerCommand::Close);
        }

        if len > 1 {
            let y = screen.center().y - VIEWER_BUTTON_SIZE / 2.0;
            let prev_rect = Rect::from_min_size(pos2(screen.min.x + margin, y), Vec2::splat(VIEWER_BUTTON_SIZE));
            let next_rect = Rect::from_min_size(
                pos2(screen.max.x - margin - VIEWER_BUTTON_SIZE, y),
                Vec2::splat(VIEWER_BUTTON_SIZE),
            );
            if round_button(ui, prev_rect, "←", "viewer_prev") {
                commands.push(ViewerCommand::Prev);
            }
            if round_button(ui, next_rect, "→", "viewer_next") {
                commands.push(ViewerCommand::Next);
            }
        }

        if zoomable {
            let bar = Rect::from_center_size(
                pos2(screen.center().x, screen.max.y - 96.0),
                vec2(180.0, 36.0),
            );
            ui.allocate_new_ui(egui::UiBuilder::new().max_rect(bar), |ui| {
                ui.horizontal_centered(|ui| {
                    if ui.add(overlay_button("−")).clicked() {
                        commands.push(ViewerCommand::ZoomOut);
                    }
                    if ui.add(overlay_button(&zoom_label(viewer.scale()))).clicked() {
                        commands.push(ViewerCommand::ResetZoom);
                    }
                    if ui.add(overlay_button("+")).clicked() {
                        commands.push(ViewerCommand::ZoomIn);
                    }
                });
            });
        }

        let info = [
            format!("Type: {}", mime_label(&file.mime_type)),
            format!("Size: {}", format_file_size(file.byte_size)),
            format!("Modified: {}", format_date(file.last_modified_ms)),
        ];
        overlay_panel(ui, Id::new("viewer_info"), Align2::LEFT_BOTTOM, screen, |ui| {
            ui.label(RichText::new(&file.name).size(17.0).strong().color(Color32::WHITE));
            for line in &info {
                ui.label(RichText::new(line).size(13.0).color(Color32::LIGHT_GRAY));
            }
        });

        if len > 1 {
            if let Some(index) = viewer.current_index() {
                overlay_panel(ui, Id::new("viewer_counter"), Align2::RIGHT_BOTTOM, screen, |ui| {
                    ui.label(RichText::new(format!("{} of {len}", index + 1)).color(Color32::WHITE));
                });
            }
        }

        overlay_panel(ui, Id::new("viewer_hints"), Align2::LEFT_TOP, screen, |ui| {
            let hint = |ui: &mut egui::Ui, text: &str| {
                ui.label(RichText::new(text).size(11.0).color(Color32::WHITE));
            };
            hint(ui, "ESC: Close");
            if len > 1 {
                hint(ui, "← → : Navigate");
            }
            if file.kind.is_previewable() {
                hint(ui, "+ - 0: Zoom");
            }
            if file.kind == FileKind::Video {
                hint(ui, "Space: Play/Pause");
            }
        });
    }
}

impl eframe::App for GalleryApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_dropped_files(ctx);

        if self.gallery.previews_mut().poll_thumbnails() {
            ctx.request_repaint();
        }

        self.handle_viewer_input(ctx);
        let viewer_open = self.gallery.viewer().is_open();
        if !viewer_open {
            self.gallery.previews_mut().release_viewer_media();
        }

        let mut actions = Vec::new();
        egui::CentralPanel::default()
            .frame(egui::Frame::default().fill(COLOR_PAGE_BG).inner_margin(16.0))
            .show(ctx, |ui| {
                egui::ScrollArea::vertical()
                    .id_salt("gallery")
                    .auto_shrink([false, false])
                    .enable_scrolling(!viewer_open)
                    .show(ui, |ui| {
                        self.render_header(ui);
                        self.render_drop_zone(ui);
                        self.render_stats(ui);
                        self.render_grid(ui, &mut actions);
                    });
            });
        self.apply_card_actions(actions);

        if self.gallery.viewer().is_open() {
            self.render_viewer(ctx);
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Playback state read out of the viewer's video player for one frame.
#[derive(Clone, Copy)]
struct VideoControls {
    playing: bool,
    finished: bool,
    failed: bool,
    position_secs: f64,
}

impl VideoControls {
    fn of(player: &VideoPlayer) -> Self {
        Self {
            playing: player.is_playing(),
            finished: player.is_finished(),
            failed: player.has_failed(),
            position_secs: player.position_secs(),
        }
    }

    fn button_label(&self) -> &'static str {
        if self.playing {
            "⏸ Pause"
        } else if self.finished {
            "↻ Replay"
        } else {
            "▶ Play"
        }
    }
}

/// Play/pause bar above the zoom controls. Returns true if the button was clicked.
fn render_video_controls(ui: &mut egui::Ui, screen: Rect, controls: VideoControls) -> bool {
    let bar = Rect::from_center_size(
        pos2(screen.center().x, screen.max.y - 140.0),
        vec2(220.0, 36.0),
    );
    let mut clicked = false;
    ui.allocate_new_ui(egui::UiBuilder::new().max_rect(bar), |ui| {
        ui.horizontal_centered(|ui| {
            clicked = ui.add(overlay_button(controls.button_label())).clicked();
            ui.label(
                RichText::new(format_clock(controls.position_secs)).color(Color32::WHITE),
            );
        });
    });
    clicked
}

/// `m:ss` for a playback position.
fn format_clock(secs: f64) -> String {
    let total = secs.max(0.0).floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

fn files_uploaded_label(count: usize) -> String {
    let plural = if count == 1 { "" } else { "s" };
    format!("{count} file{plural} uploaded")
}

fn mime_label(mime: &str) -> &str {
    if mime.is_empty() {
        "Unknown"
    } else {
        mime
    }
}

fn zoom_label(scale: f32) -> String {
    format!("{}%", (scale * 100.0).round() as i32)
}

/// Number of card columns that fit in `width`.
fn grid_columns(width: f32) -> usize {
    (((width + GRID_SPACING) / (CARD_WIDTH + GRID_SPACING)).floor() as usize).max(1)
}

/// Largest size with the image's aspect ratio that fits in `bounds`, never upscaled.
fn fit_size(image: Vec2, bounds: Vec2) -> Vec2 {
    if image.x <= 0.0 || image.y <= 0.0 {
        return Vec2::ZERO;
    }
    let scale = (bounds.x / image.x).min(bounds.y / image.y).min(1.0);
    image * scale
}

/// UV rectangle that crops an image to fill a frame of a different aspect ratio.
fn cover_uv(image: Vec2, frame: Vec2) -> Rect {
    let full = Rect::from_min_max(pos2(0.0, 0.0), pos2(1.0, 1.0));
    if image.x <= 0.0 || image.y <= 0.0 || frame.x <= 0.0 || frame.y <= 0.0 {
        return full;
    }
    let image_aspect = image.x / image.y;
    let frame_aspect = frame.x / frame.y;
    if image_aspect > frame_aspect {
        let w = frame_aspect / image_aspect;
        Rect::from_min_max(pos2((1.0 - w) / 2.0, 0.0), pos2((1.0 + w) / 2.0, 1.0))
    } else {
        let h = image_aspect / frame_aspect;
        Rect::from_min_max(pos2(0.0, (1.0 - h) / 2.0), pos2(1.0, (1.0 + h) / 2.0))
    }
}

fn truncated_galley(
    ui: &egui::Ui,
    text: &str,
    size: f32,
    color: Color32,
    max_width: f32,
) -> std::sync::Arc<egui::Galley> {
    let mut job = egui::text::LayoutJob::single_section(
        text.to_string(),
        egui::TextFormat::simple(FontId::proportional(size), color),
    );
    job.wrap = egui::text::TextWrapping::truncate_at_width(max_width);
    ui.fonts(|fonts| fonts.layout_job(job))
}

fn round_button(ui: &mut egui::Ui, rect: Rect, label: &str, id: &str) -> bool {
    let response = ui.interact(rect, Id::new(id), Sense::click());
    let alpha = if response.hovered() {
        VIEWER_PANEL_ALPHA + 60
    } else {
        VIEWER_PANEL_ALPHA
    };
    let painter = ui.painter();
    painter.circle_filled(rect.center(), rect.width() / 2.0, Color32::from_black_alpha(alpha));
    painter.text(
        rect.center(),
        Align2::CENTER_CENTER,
        label,
        FontId::proportional(22.0),
        Color32::WHITE,
    );
    response.clicked()
}

fn overlay_button(label: &str) -> egui::Button<'static> {
    egui::Button::new(RichText::new(label.to_string()).color(Color32::WHITE))
        .fill(Color32::from_black_alpha(VIEWER_PANEL_ALPHA))
        .min_size(vec2(44.0, 32.0))
}

fn overlay_panel(
    ui: &egui::Ui,
    id: Id,
    anchor: Align2,
    screen: Rect,
    add_contents: impl FnOnce(&mut egui::Ui),
) {
    let margin = VIEWER_OVERLAY_MARGIN;
    let offset = vec2(
        if anchor.x() == egui::Align::Min { margin } else { -margin },
        if anchor.y() == egui::Align::Min { margin } else { -margin },
    );
    egui::Area::new(id)
        .order(egui::Order::Tooltip)
        .pivot(anchor)
        .fixed_pos(anchor_pos(screen, anchor) + offset)
        .show(ui.ctx(), |ui| {
            egui::Frame::none()
                .fill(Color32::from_black_alpha(VIEWER_PANEL_ALPHA))
                .rounding(Rounding::same(6.0))
                .inner_margin(10.0)
                .show(ui, add_contents);
        });
}

fn anchor_pos(rect: Rect, anchor: Align2) -> Pos2 {
    let x = match anchor.x() {
        egui::Align::Min => rect.min.x,
        egui::Align::Center => rect.center().x,
        egui::Align::Max => rect.max.x,
    };
    let y = match anchor.y() {
        egui::Align::Min => rect.min.y,
        egui::Align::Center => rect.center().y,
        egui::Align::Max => rect.max.y,
    };
    pos2(x, y)
}

fn save_copy(file: &ViewedFile) {
    let Some(target) = rfd::FileDialog::new()
        .set_title("Save a copy")
        .set_file_name(&file.name)
        .save_file()
    else {
        return;
    };

    match std::fs::copy(&file.path, &target) {
        Ok(bytes) => log::info!("saved {} ({bytes} bytes) to {}", file.name, target.display()),
        Err(err) => log::error!("failed to save {} to {}: {err}", file.name, target.display()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_files_uploaded_label() {
        assert_eq!(files_uploaded_label(1), "1 file uploaded");
        assert_eq!(files_uploaded_label(3), "3 files uploaded");
    }

    #[test]
    fn test_zoom_label() {
        assert_eq!(zoom_label(1.0), "100%");
        assert_eq!(zoom_label(2.25), "225%");
        assert_eq!(zoom_label(1.0 / 1.5), "67%");
    }

    #[test]
    fn test_grid_columns() {
        assert_eq!(grid_columns(100.0), 1);
        assert_eq!(grid_columns(CARD_WIDTH * 2.0 + GRID_SPACING), 2);
        assert_eq!(grid_columns(CARD_WIDTH * 2.0 + GRID_SPACING - 1.0), 1);
    }

    #[test]
    fn test_fit_size_never_upscales() {
        assert_eq!(fit_size(vec2(100.0, 50.0), vec2(800.0, 600.0)), vec2(100.0, 50.0));
        assert_eq!(fit_size(vec2(1600.0, 800.0), vec2(800.0, 600.0)), vec2(800.0, 400.0));
        assert_eq!(fit_size(vec2(0.0, 10.0), vec2(800.0, 600.0)), Vec2::ZERO);
    }

    #[test]
    fn test_cover_uv_crops_the_long_axis() {
        let wide = cover_uv(vec2(200.0, 100.0), vec2(100.0, 100.0));
        assert_eq!(wide, Rect::from_min_max(pos2(0.25, 0.0), pos2(0.75, 1.0)));

        let tall = cover_uv(vec2(100.0, 200.0), vec2(100.0, 100.0));
        assert_eq!(tall, Rect::from_min_max(pos2(0.0, 0.25), pos2(1.0, 0.75)));
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(0.0), "0:00");
        assert_eq!(format_clock(9.99), "0:09");
        assert_eq!(format_clock(125.4), "2:05");
        assert_eq!(format_clock(-1.0), "0:00");
    }

    #[test]
    fn test_video_button_label_follows_state() {
        let mut controls = VideoControls {
            playing: false,
            finished: false,
            failed: false,
            position_secs: 0.0,
        };
        assert_eq!(controls.button_label(), "▶ Play");
        controls.playing = true;
        assert_eq!(controls.button_label(), "⏸ Pause");
        controls.playing = false;
        controls.finished = true;
        assert_eq!(controls.button_label(), "↻ Replay");
    }

    #[test]
    fn test_mime_label() {
        assert_eq!(mime_label(""), "Unknown");
        assert_eq!(mime_label("image/png"), "image/png");
    }
}
