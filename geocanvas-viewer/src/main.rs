use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context as _;
use clap::Parser;
use geocanvas::{
    data::geojson::GeoJsonStyles,
    input::{TouchEventType, TouchPoint},
    rendering::{EguiSurface, TileTextures},
    FeatureCollection, GeoJson, InputEvent, LatLng, MapEngine, MapOptions, Point, Tooltip,
};
use serde::Deserialize;

#[derive(Parser, Debug)]
#[command(author, version, about = "Interactive viewer for GeoJSON point, line and polygon data")]
struct Args {
    /// GeoJSON file to display
    data: PathBuf,

    /// Raster tile URL template with {z}, {x} and {y} placeholders
    #[arg(long)]
    tiles: Option<String>,

    /// Initial zoom level (1-20)
    #[arg(long)]
    zoom: Option<f64>,

    /// Initial center as LAT,LNG
    #[arg(long, value_parser = parse_center, allow_hyphen_values = true)]
    center: Option<LatLng>,

    /// JSON file with map options and feature styles
    #[arg(long)]
    options: Option<PathBuf>,
}

fn parse_center(value: &str) -> Result<LatLng, String> {
    let (lat, lng) = value
        .split_once(',')
        .ok_or_else(|| format!("expected LAT,LNG, got '{}'", value))?;
    let lat: f64 = lat.trim().parse().map_err(|e| format!("bad latitude: {}", e))?;
    let lng: f64 = lng.trim().parse().map_err(|e| format!("bad longitude: {}", e))?;
    Ok(LatLng::new(lat, lng))
}

/// Contents of the `--options` file
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ViewerConfig {
    #[serde(flatten)]
    map: MapOptions,
    styles: GeoJsonStyles,
}

fn load(args: &Args) -> anyhow::Result<(FeatureCollection, MapOptions)> {
    let config: ViewerConfig = match &args.options {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading options {}", path.display()))?;
            serde_json::from_str(&text).with_context(|| format!("parsing options {}", path.display()))?
        }
        None => ViewerConfig::default(),
    };

    let text = std::fs::read_to_string(&args.data)
        .with_context(|| format!("reading {}", args.data.display()))?;
    let geojson: GeoJson = text.parse()?;

    let mut features = FeatureCollection::new();
    let report = features.add_geojson(&geojson, &config.styles);
    log::info!(
        "Loaded {} feature(s) from {}, skipped {}",
        report.accepted,
        args.data.display(),
        report.skipped.len()
    );

    let mut options = config.map;
    if let Some(url) = &args.tiles {
        options.tile_url = Some(url.clone());
    }
    if let Some(zoom) = args.zoom {
        options.zoom = Some(zoom);
    }
    if let Some(center) = args.center {
        options.center = Some(center);
    }
    Ok((features, options))
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let (features, options) = load(&args)?;
    let title = options.title.clone();
    let engine = MapEngine::new(features, options, Point::new(1200.0, 800.0))
        .map_err(|e| anyhow::anyhow!("creating map engine: {}", e))?;

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_title(title),
        ..Default::default()
    };

    eframe::run_native(
        "geocanvas-viewer",
        native_options,
        Box::new(|cc| Box::new(ViewerApp::new(cc, engine))),
    )
    .map_err(|e| anyhow::anyhow!("viewer failed: {}", e))
}

struct ViewerApp {
    engine: MapEngine,
    textures: TileTextures,
    /// Active touch contacts by id, in surface coordinates
    touches: BTreeMap<u64, Point>,
    hovering: bool,
}

impl ViewerApp {
    fn new(_cc: &eframe::CreationContext<'_>, engine: MapEngine) -> Self {
        Self {
            engine,
            textures: TileTextures::new(),
            touches: BTreeMap::new(),
            hovering: false,
        }
    }

    /// Translates this frame's egui events into engine input
    fn forward_input(&mut self, ui: &egui::Ui, rect: egui::Rect) {
        let local = |pos: egui::Pos2| Point::new(f64::from(pos.x - rect.min.x), f64::from(pos.y - rect.min.y));
        let events = ui.input(|i| i.events.clone());
        let hover = ui.input(|i| i.pointer.hover_pos());

        for event in events {
            match event {
                egui::Event::Touch { id, phase, pos, .. } => {
                    let event_type = match phase {
                        egui::TouchPhase::Start => {
                            if !rect.contains(pos) {
                                continue;
                            }
                            self.touches.insert(id.0, local(pos));
                            TouchEventType::Start
                        }
                        egui::TouchPhase::Move => {
                            match self.touches.get_mut(&id.0) {
                                Some(p) => *p = local(pos),
                                None => continue,
                            }
                            TouchEventType::Move
                        }
                        egui::TouchPhase::End => {
                            self.touches.remove(&id.0);
                            TouchEventType::End
                        }
                        egui::TouchPhase::Cancel => {
                            self.touches.remove(&id.0);
                            TouchEventType::Cancel
                        }
                    };
                    let touches = self
                        .touches
                        .iter()
                        .map(|(id, p)| TouchPoint::new(*id, *p))
                        .collect();
                    self.engine.handle_input(InputEvent::Touch { event_type, touches });
                }
                // egui mirrors the first touch as pointer events
                _ if !self.touches.is_empty() => {}
                egui::Event::PointerButton {
                    pos,
                    button: egui::PointerButton::Primary,
                    pressed,
                    ..
                } => {
                    if pressed && rect.contains(pos) && hover.map_or(false, |h| rect.contains(h)) {
                        self.engine.handle_input(InputEvent::PointerDown { position: local(pos) });
                    } else if !pressed {
                        self.engine.handle_input(InputEvent::PointerUp);
                    }
                }
                egui::Event::PointerMoved(pos) => {
                    let dragging = !self.engine.gesture_state().is_idle();
                    if rect.contains(pos) || dragging {
                        self.hovering = true;
                        self.engine.handle_input(InputEvent::PointerMove { position: local(pos) });
                    } else if self.hovering {
                        self.hovering = false;
                        self.engine.handle_input(InputEvent::PointerLeave);
                    }
                }
                egui::Event::PointerGone => {
                    self.hovering = false;
                    self.engine.handle_input(InputEvent::PointerLeave);
                }
                egui::Event::Scroll(delta) if delta.y != 0.0 => {
                    if let Some(pos) = hover.filter(|p| rect.contains(*p)) {
                        // egui scrolls up with positive y, wheel input uses the opposite sign
                        self.engine.handle_input(InputEvent::Wheel {
                            delta_y: -f64::from(delta.y),
                            position: local(pos),
                        });
                    }
                }
                egui::Event::Zoom(factor) if factor != 1.0 => {
                    if let Some(pos) = hover.filter(|p| rect.contains(*p)) {
                        let delta_y = if factor > 1.0 { -1.0 } else { 1.0 };
                        self.engine.handle_input(InputEvent::Wheel {
                            delta_y,
                            position: local(pos),
                        });
                    }
                }
                _ => {}
            }
        }
    }

    fn draw_tooltip(&self, painter: &egui::Painter, rect: egui::Rect, tooltip: &Tooltip) {
        let padding = egui::vec2(8.0, 6.0);
        let text = tooltip.content.to_text();
        let font = egui::FontId::proportional(13.0);
        let text_size = painter
            .layout_no_wrap(text.clone(), font.clone(), egui::Color32::BLACK)
            .size();
        let box_size = text_size + padding * 2.0;

        let top_left = tooltip.position(
            Point::new(f64::from(box_size.x), f64::from(box_size.y)),
            Point::new(f64::from(rect.width()), f64::from(rect.height())),
        );
        let box_rect = egui::Rect::from_min_size(
            rect.min + egui::vec2(top_left.x as f32, top_left.y as f32),
            box_size,
        );
        painter.rect_filled(box_rect, 4.0, egui::Color32::from_rgba_unmultiplied(255, 255, 255, 240));
        painter.rect_stroke(box_rect, 4.0, egui::Stroke::new(1.0, egui::Color32::from_gray(160)));
        painter.text(
            box_rect.min + padding,
            egui::Align2::LEFT_TOP,
            text,
            font,
            egui::Color32::from_gray(30),
        );
    }
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::top("controls").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button("+").on_hover_text("Zoom in").clicked() {
                    self.engine.zoom_in();
                }
                if ui.button("−").on_hover_text("Zoom out").clicked() {
                    self.engine.zoom_out();
                }
                if ui.button("Fit").on_hover_text("Show all data").clicked() {
                    self.engine.fit_bounds();
                }
                ui.separator();
                let viewport = self.engine.viewport();
                ui.label(format!(
                    "Center: {:.4}, {:.4} | Zoom: {:.2} | Features: {}",
                    viewport.center.lat,
                    viewport.center.lng,
                    viewport.zoom,
                    self.engine.features().len()
                ));
            });
        });

        let attribution = self.engine.options().attribution.clone();
        if !attribution.is_empty() {
            egui::TopBottomPanel::bottom("attribution").show(ctx, |ui| {
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.small(attribution);
                });
            });
        }

        egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| {
                let (rect, _response) =
                    ui.allocate_exact_size(ui.available_size(), egui::Sense::click_and_drag());

                let size = Point::new(f64::from(rect.width()), f64::from(rect.height()));
                if self.engine.viewport().size != size {
                    self.engine.handle_input(InputEvent::Resize { size });
                }
                self.forward_input(ui, rect);
                self.engine.pump_tiles();

                let painter = ui.painter_at(rect);
                let mut surface = EguiSurface::new(&painter, &mut self.textures);
                if let Err(e) = self.engine.render(&mut surface) {
                    log::warn!("Frame failed to render: {}", e);
                }
                self.textures.end_frame();

                if let Some(tooltip) = self.engine.tooltip() {
                    self.draw_tooltip(&painter, rect, tooltip);
                }
            });

        // Tile completions arrive off the UI thread; poll until they are all in
        if self.engine.pending_tiles() > 0 {
            ctx.request_repaint_after(Duration::from_millis(50));
        }
    }
}
