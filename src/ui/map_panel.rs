use eframe::egui;
use egui::{pos2, vec2, Color32, Pos2, Rect, Stroke, Vec2};
use std::collections::HashMap;

use crate::engine::engine::EngineHandle;
use crate::engine::protocol::{DecodedImage, EngineCommand};
use crate::model::catalog::{Coordinates, Region};
use crate::model::map_focus::{external_map_url, Marker, RegionImages};
use crate::model::progress::ProgressStorage;
use crate::model::session::ChecklistSession;

/* =========================
   Viewport
   ========================= */

/// Side of the square map plane, in map units.
pub const MAP_EXTENT: f32 = 1000.0;

const MIN_ZOOM: f32 = -1.0;
const MAX_ZOOM: f32 = 2.0;
const FLY_TO_ZOOM: f32 = 2.0;
const HOME: Coordinates = [MAP_EXTENT / 2.0, MAP_EXTENT / 2.0];

/// Camera over the map plane. `center` is `[lat, lng]`; one map unit spans
/// `2^zoom` points. Latitude grows upwards.
#[derive(Debug, Clone, PartialEq)]
pub struct MapViewport {
    pub center: Coordinates,
    pub zoom: f32,
    flight: Option<(Coordinates, f32)>,
}

impl Default for MapViewport {
    fn default() -> Self {
        Self {
            center: HOME,
            zoom: 0.0,
            flight: None,
        }
    }
}

impl MapViewport {
    pub fn scale(&self) -> f32 {
        self.zoom.exp2()
    }

    pub fn to_screen(&self, at: Coordinates, rect: Rect) -> Pos2 {
        let s = self.scale();
        let c = rect.center();
        pos2(
            c.x + (at[1] - self.center[1]) * s,
            c.y - (at[0] - self.center[0]) * s,
        )
    }

    /// Screen rectangle covered by the whole map image.
    pub fn image_rect(&self, rect: Rect) -> Rect {
        Rect::from_min_max(
            self.to_screen([MAP_EXTENT, 0.0], rect),
            self.to_screen([0.0, MAP_EXTENT], rect),
        )
    }

    /// Drags the map by a screen delta. Cancels any flight in progress.
    pub fn pan(&mut self, delta: Vec2) {
        let s = self.scale();
        self.flight = None;
        self.center = clamp_to_plane([
            self.center[0] + delta.y / s,
            self.center[1] - delta.x / s,
        ]);
    }

    pub fn zoom_by(&mut self, steps: f32) {
        self.flight = None;
        self.zoom = (self.zoom + steps).clamp(MIN_ZOOM, MAX_ZOOM);
    }

    pub fn fly_to(&mut self, target: Coordinates) {
        self.flight = Some((clamp_to_plane(target), FLY_TO_ZOOM));
    }

    pub fn is_flying(&self) -> bool {
        self.flight.is_some()
    }

    /// Advances a flight by `dt` seconds. Returns true while still moving.
    pub fn step(&mut self, dt: f32) -> bool {
        let Some((target, zoom)) = self.flight else {
            return false;
        };

        let t = 1.0 - (-dt * 6.0).exp();
        self.center = [
            lerp(self.center[0], target[0], t),
            lerp(self.center[1], target[1], t),
        ];
        self.zoom = lerp(self.zoom, zoom, t);

        let arrived = (self.center[0] - target[0]).abs() < 0.5
            && (self.center[1] - target[1]).abs() < 0.5
            && (self.zoom - zoom).abs() < 0.01;
        if arrived {
            self.center = target;
            self.zoom = zoom;
            self.flight = None;
        }
        !arrived
    }
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

fn clamp_to_plane(at: Coordinates) -> Coordinates {
    [at[0].clamp(0.0, MAP_EXTENT), at[1].clamp(0.0, MAP_EXTENT)]
}

/* =========================
   Map View
   ========================= */

pub enum MapAction {
    Close,
    ClearFocus,
    OpenUrl(String),
    Focus { item_id: String, region: Region },
}

enum ImageSlot {
    Pending,
    Ready(egui::TextureHandle),
    Failed,
}

pub struct MapView {
    images: RegionImages,
    // Keyed by image source so regions sharing a fallback share the texture.
    slots: HashMap<String, ImageSlot>,
    viewport: MapViewport,
    shown_region: Option<Region>,
    last_focus: Option<String>,
}

impl MapView {
    pub fn new(images: RegionImages) -> Self {
        Self {
            images,
            slots: HashMap::new(),
            viewport: MapViewport::default(),
            shown_region: None,
            last_focus: None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.slots.values().any(|s| matches!(s, ImageSlot::Pending))
    }

    pub fn on_image_loaded(
        &mut self,
        ctx: &egui::Context,
        region: Region,
        source: String,
        image: Result<DecodedImage, String>,
    ) {
        let slot = match image {
            Ok(image) => {
                let color = egui::ColorImage::from_rgba_unmultiplied(image.size, &image.rgba);
                let name = format!("map-{}", region.key());
                ImageSlot::Ready(ctx.load_texture(name, color, egui::TextureOptions::LINEAR))
            }
            Err(_) => ImageSlot::Failed,
        };
        self.slots.insert(source, slot);
    }

    fn ensure_requested(&mut self, region: Region, engine: &EngineHandle) -> Option<String> {
        let source = self.images.resolve(region)?.to_string();
        if !self.slots.contains_key(&source) {
            log::debug!("Requesting map image for {region}: {source}");
            self.slots.insert(source.clone(), ImageSlot::Pending);
            engine.send(EngineCommand::LoadMapImage {
                region,
                source: source.clone(),
            });
        }
        Some(source)
    }

    /// Keeps the camera in step with the session: region switches reset it,
    /// a newly focused item with coordinates is flown to.
    fn sync_camera<S: ProgressStorage>(&mut self, session: &ChecklistSession<S>) {
        let region = session.map().active_region();
        if self.shown_region != Some(region) {
            self.shown_region = Some(region);
            self.viewport = MapViewport::default();
        }

        let focus = session.map().focused_item().map(str::to_string);
        if focus != self.last_focus {
            if let Some(at) = session.focused_item().and_then(|item| item.coordinates) {
                self.viewport.fly_to(at);
            }
            self.last_focus = focus;
        }
    }

    pub fn show<S: ProgressStorage>(
        &mut self,
        ctx: &egui::Context,
        session: &ChecklistSession<S>,
        engine: &EngineHandle,
    ) -> Option<MapAction> {
        let mut action = None;
        let region = session.map().active_region();
        self.sync_camera(session);
        let source = self.ensure_requested(region, engine);

        egui::SidePanel::right("map")
            .resizable(true)
            .default_width(620.0)
            .min_width(320.0)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label(egui::RichText::new("INTERACTIVE MAP").strong().small());
                    ui.label(egui::RichText::new(region.label()).weak());

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.small_button("✖").on_hover_text("Close map").clicked() {
                            action = Some(MapAction::Close);
                        }
                        if ui
                            .button("Open to Login / Sync")
                            .on_hover_text("Login / Sync features require the external map")
                            .clicked()
                        {
                            action = Some(MapAction::OpenUrl(external_map_url(region).into()));
                        }
                    });
                });

                if let Some(item) = session.focused_item() {
                    ui.horizontal(|ui| {
                        ui.label(format!("📍 {} · {}", item.title, item.location));
                        if ui.small_button("✖").on_hover_text("Clear focus").clicked() {
                            action = Some(MapAction::ClearFocus);
                        }
                    });
                }

                ui.separator();

                let slot = source.as_ref().and_then(|s| self.slots.get(s));
                if let Some(focus) = draw_map(ui, &mut self.viewport, slot, &session.markers()) {
                    action = Some(MapAction::Focus {
                        item_id: focus,
                        region,
                    });
                }
            });

        action
    }
}

fn draw_map(
    ui: &mut egui::Ui,
    viewport: &mut MapViewport,
    slot: Option<&ImageSlot>,
    markers: &[Marker],
) -> Option<String> {
    let (response, painter) =
        ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());
    let rect = response.rect;

    if response.dragged() {
        viewport.pan(response.drag_delta());
    }
    if response.hovered() {
        let scroll = ui.input(|i| i.smooth_scroll_delta.y);
        if scroll != 0.0 {
            viewport.zoom_by(scroll / 200.0);
        }
    }
    let dt = ui.input(|i| i.stable_dt).min(0.1);
    if viewport.step(dt) {
        ui.ctx().request_repaint();
    }

    painter.rect_filled(rect, egui::CornerRadius::ZERO, Color32::from_rgb(10, 10, 10));
    match slot {
        Some(ImageSlot::Ready(texture)) => {
            painter.image(
                texture.id(),
                viewport.image_rect(rect),
                Rect::from_min_max(pos2(0.0, 0.0), pos2(1.0, 1.0)),
                Color32::WHITE,
            );
        }
        Some(ImageSlot::Pending) => {
            painter.text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                "Loading map…",
                egui::FontId::proportional(14.0),
                Color32::GRAY,
            );
        }
        Some(ImageSlot::Failed) | None => {
            painter.rect_stroke(
                viewport.image_rect(rect),
                egui::CornerRadius::ZERO,
                Stroke::new(1.0, Color32::from_gray(60)),
                egui::StrokeKind::Inside,
            );
        }
    }

    let hover = response.hover_pos();
    let mut hovered: Option<&Marker> = None;

    for marker in markers {
        let at = viewport.to_screen(marker.position, rect);
        let (radius, fill) = if marker.focused {
            (9.0, Color32::from_rgb(255, 215, 0))
        } else {
            (6.0, Color32::from_rgb(59, 130, 246))
        };
        painter.circle(at, radius, fill, Stroke::new(2.0, Color32::BLACK));

        if hover.is_some_and(|p| p.distance(at) <= radius + 3.0) {
            hovered = Some(marker);
        }
        if marker.focused {
            draw_popup(&painter, at + vec2(12.0, -12.0), marker);
        }
    }

    let clicked = response.clicked();
    if let Some(marker) = hovered {
        response.on_hover_ui_at_pointer(|ui| {
            ui.strong(marker.title.as_str());
            ui.label(egui::RichText::new(&marker.short_desc).small());
        });
        if clicked {
            return Some(marker.item_id.clone());
        }
    }
    None
}

fn draw_popup(painter: &egui::Painter, anchor: Pos2, marker: &Marker) {
    let galley = painter.layout_no_wrap(
        marker.title.clone(),
        egui::FontId::proportional(13.0),
        Color32::BLACK,
    );
    let rect = Rect::from_min_size(anchor - vec2(0.0, galley.size().y), galley.size())
        .expand2(vec2(6.0, 4.0));
    painter.rect_filled(rect, egui::CornerRadius::same(4), Color32::from_rgb(240, 240, 240));
    painter.galley(rect.min + vec2(6.0, 4.0), galley, Color32::BLACK);
}
