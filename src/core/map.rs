//! The render loop.
//!
//! [`MapEngine`] wires the pieces together: input goes through the
//! [`ViewportController`], tile completions are drained on the engine
//! thread, and a frame is cleared, composited and drawn in one synchronous
//! call. Every state change sets a single pending-redraw flag, so any number
//! of tile completions arriving between two frames costs one redraw.

use crate::core::{
    config::MapOptions,
    constants::BUTTON_ZOOM_STEP,
    control::MapControl,
    geo::{LatLng, Point},
    viewport::Viewport,
};
use crate::data::features::FeatureCollection;
use crate::input::{
    events::InputEvent,
    gestures::{GestureState, ViewportController},
};
use crate::rendering::{features::FeatureRenderer, surface::DrawSurface};
use crate::spatial::hit_test::HitTester;
use crate::tiles::{
    compositor::TileCompositor,
    loader::{default_fetcher, DisabledFetcher, TileFetcher},
    source::UrlTemplate,
};
use crate::ui::tooltip::{Tooltip, TooltipContent};
use crate::Result;

pub struct MapEngine {
    pub(super) controller: ViewportController,
    features: FeatureCollection,
    options: MapOptions,
    /// Zoom restored by [`MapEngine::fit_bounds`]
    home_zoom: f64,
    tiles: Option<TileCompositor>,
    renderer: FeatureRenderer,
    hit_tester: HitTester,
    tooltip: Option<Tooltip>,
    pub(super) needs_redraw: bool,
}

impl MapEngine {
    /// Builds an engine, fetching basemap tiles over HTTP when a tile URL is set
    pub fn new(features: FeatureCollection, options: MapOptions, size: Point) -> Result<Self> {
        let fetcher: Box<dyn TileFetcher> = match tile_template(&options) {
            Some(_) => default_fetcher()?,
            None => Box::new(DisabledFetcher),
        };
        Ok(Self::with_fetcher(features, options, size, fetcher))
    }

    /// Builds an engine that fetches tiles through `fetcher`
    pub fn with_fetcher(
        features: FeatureCollection,
        options: MapOptions,
        size: Point,
        fetcher: Box<dyn TileFetcher>,
    ) -> Self {
        let (center, zoom) = options.initial_view(features.bounds());
        let viewport = Viewport::new(center, zoom, size);

        let tiles = tile_template(&options).map(|template| {
            TileCompositor::new(
                UrlTemplate::new(template),
                fetcher,
                options.effective_cache_capacity(),
            )
        });

        log::info!(
            "Map engine ready: {} points, {} lines, {} polygons, center ({:.5}, {:.5}) zoom {}, basemap {}",
            features.points().len(),
            features.lines().len(),
            features.polygons().len(),
            viewport.center.lat,
            viewport.center.lng,
            viewport.zoom,
            if tiles.is_some() { "on" } else { "off" },
        );

        Self {
            controller: ViewportController::new(viewport),
            features,
            options,
            home_zoom: zoom,
            tiles,
            renderer: FeatureRenderer,
            hit_tester: HitTester,
            tooltip: None,
            needs_redraw: true,
        }
    }

    /// Applies an input event; returns true when a redraw was requested.
    ///
    /// Pointer motion while no gesture is active refreshes the tooltip;
    /// any gesture hides it, as does the pointer leaving the surface.
    pub fn handle_input(&mut self, event: InputEvent) -> bool {
        let view_changed = self.controller.handle(&event);

        let tooltip_changed = match &event {
            InputEvent::PointerMove { position } if self.controller.state().is_idle() => {
                self.update_tooltip(*position)
            }
            InputEvent::PointerLeave => self.hide_tooltip(),
            _ if !self.controller.state().is_idle() => self.hide_tooltip(),
            _ => false,
        };

        let redraw = view_changed || tooltip_changed;
        if redraw {
            self.needs_redraw = true;
        }
        redraw
    }

    fn update_tooltip(&mut self, position: Point) -> bool {
        let next = self
            .hit_tester
            .resolve(&self.features, self.controller.viewport(), position)
            .and_then(|feature| {
                let (properties, spec) = self.features.describe(feature)?;
                let content = TooltipContent::build(spec, properties)?;
                Some(Tooltip {
                    anchor: position,
                    feature,
                    content,
                })
            });
        let changed = next != self.tooltip;
        self.tooltip = next;
        changed
    }

    fn hide_tooltip(&mut self) -> bool {
        self.tooltip.take().is_some()
    }

    /// Zooms in one step around the view center
    pub fn zoom_in(&mut self) -> bool {
        self.zoom_by(BUTTON_ZOOM_STEP)
    }

    /// Zooms out one step around the view center
    pub fn zoom_out(&mut self) -> bool {
        self.zoom_by(-BUTTON_ZOOM_STEP)
    }

    fn zoom_by(&mut self, delta: f64) -> bool {
        let changed = self.controller.zoom_by(delta);
        if changed {
            self.needs_redraw = true;
        }
        changed
    }

    /// Centers the view on the data bounds and restores the initial zoom.
    ///
    /// The zoom is the one resolved at construction; it is not recomputed
    /// from the current bounds.
    pub fn fit_bounds(&mut self) {
        let center = self
            .features
            .bounds()
            .map(|bounds| bounds.center())
            .unwrap_or_default();
        log::debug!(
            "Fitting bounds: center ({:.5}, {:.5}) zoom {}",
            center.lat,
            center.lng,
            self.home_zoom
        );
        self.controller.jump_to(center, self.home_zoom);
        self.tooltip = None;
        self.needs_redraw = true;
    }

    /// Applies finished tile fetches; returns how many landed in the cache
    pub fn pump_tiles(&mut self) -> usize {
        let Some(tiles) = self.tiles.as_mut() else {
            return 0;
        };
        let applied = tiles.drain_completions();
        if applied > 0 {
            log::debug!("{} tile(s) loaded, scheduling one redraw", applied);
            self.needs_redraw = true;
        }
        applied
    }

    /// Draws a full frame: background, tiles, polygons, lines, points
    pub fn render(&mut self, surface: &mut dyn DrawSurface) -> Result<()> {
        let viewport = self.controller.viewport();
        surface.clear(viewport.size, self.options.background_color)?;
        if let Some(tiles) = self.tiles.as_mut() {
            tiles.composite(viewport, surface)?;
        }
        self.renderer.render(&self.features, viewport, surface)?;
        self.needs_redraw = false;
        Ok(())
    }

    /// Draws a frame only when something changed since the last one
    pub fn render_if_needed(&mut self, surface: &mut dyn DrawSurface) -> Result<bool> {
        if !self.needs_redraw {
            return Ok(false);
        }
        self.render(surface)?;
        Ok(true)
    }

    pub fn needs_redraw(&self) -> bool {
        self.needs_redraw
    }

    /// Tiles requested but not yet resolved
    pub fn pending_tiles(&self) -> usize {
        self.tiles.as_ref().map_or(0, |tiles| tiles.cache().pending())
    }

    /// Gesture in progress, if any
    pub fn gesture_state(&self) -> GestureState {
        self.controller.state()
    }

    pub fn tooltip(&self) -> Option<&Tooltip> {
        self.tooltip.as_ref()
    }

    pub fn viewport(&self) -> &Viewport {
        self.controller.viewport()
    }

    pub fn features(&self) -> &FeatureCollection {
        &self.features
    }

    pub fn options(&self) -> &MapOptions {
        &self.options
    }

    pub fn home_zoom(&self) -> f64 {
        self.home_zoom
    }

    pub fn tile_compositor(&self) -> Option<&TileCompositor> {
        self.tiles.as_ref()
    }

    pub fn center(&self) -> LatLng {
        self.viewport().center
    }

    pub fn control(&mut self) -> MapControl<'_> {
        MapControl::new(self)
    }
}

/// Configured tile URL, ignoring blank values
fn tile_template(options: &MapOptions) -> Option<&str> {
    options
        .tile_url
        .as_deref()
        .map(str::trim)
        .filter(|url| !url.is_empty())
}

impl std::fmt::Debug for MapEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapEngine")
            .field("viewport", self.controller.viewport())
            .field("features", &self.features.len())
            .field("tiles", &self.tiles)
            .field("needs_redraw", &self.needs_redraw)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::style::{PointStyle, PolygonStyle, TooltipSpec};
    use crate::input::events::{TouchEventType, TouchPoint};
    use crate::rendering::context::RenderContext;
    use crate::tiles::loader::{TileCompletion, TileImage, TileRequest};
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct QueueFetcher {
        pending: Arc<Mutex<Vec<TileCompletion>>>,
    }

    impl TileFetcher for QueueFetcher {
        fn fetch(&self, _request: TileRequest, completion: TileCompletion) {
            self.pending.lock().unwrap().push(completion);
        }
    }

    fn cities() -> FeatureCollection {
        let mut fc = FeatureCollection::new();
        fc.add_points(
            &[
                json!({"lat": 40.71, "lng": -74.0, "name": "NYC"}),
                json!({"lat": 34.05, "lng": -118.24, "name": "LA"}),
            ],
            PointStyle::default().with_tooltip(TooltipSpec::fields(["name"])),
        );
        fc
    }

    fn engine(features: FeatureCollection) -> MapEngine {
        MapEngine::with_fetcher(
            features,
            MapOptions::default(),
            Point::new(800.0, 600.0),
            Box::new(QueueFetcher::default()),
        )
    }

    #[test]
    fn test_initial_view_from_bounds() {
        let engine = engine(cities());
        let center = engine.center();
        assert!((center.lat - (40.71 + 34.05) / 2.0).abs() < 1e-9);
        assert!((center.lng - (-74.0 - 118.24) / 2.0).abs() < 1e-9);
        // 44 degree span
        assert_eq!(engine.viewport().zoom, 4.0);
        assert!(engine.tile_compositor().is_none());
    }

    #[test]
    fn test_frame_draws_background_then_features() {
        let mut engine = engine(cities());
        let mut ctx = RenderContext::new();
        assert!(engine.render_if_needed(&mut ctx).unwrap());
        assert_eq!(ctx.kind_sequence(), vec!["clear", "circle"]);
        assert!(!engine.render_if_needed(&mut ctx).unwrap());
    }

    #[test]
    fn test_tile_completions_coalesce_into_one_redraw() {
        let fetcher = QueueFetcher::default();
        let mut engine = MapEngine::with_fetcher(
            FeatureCollection::new(),
            MapOptions::default()
                .with_zoom(1.0)
                .with_tile_url("https://tiles.test/{z}/{x}/{y}.png"),
            Point::new(512.0, 512.0),
            Box::new(fetcher.clone()),
        );
        let mut ctx = RenderContext::new();
        engine.render(&mut ctx).unwrap();
        assert_eq!(engine.pending_tiles(), 4);
        assert!(!engine.needs_redraw());

        for completion in fetcher.pending.lock().unwrap().drain(..) {
            completion.succeed(TileImage::from_rgba(1, 1, vec![0, 0, 0, 255]));
        }
        assert_eq!(engine.pump_tiles(), 4);
        assert!(engine.needs_redraw());

        assert!(engine.render_if_needed(&mut ctx).unwrap());
        assert!(!engine.render_if_needed(&mut ctx).unwrap());
        assert_eq!(ctx.kind_sequence(), vec!["clear", "tile"]);
        assert_eq!(engine.pump_tiles(), 0);
    }

    #[test]
    fn test_tooltip_follows_hover() {
        let mut engine = engine(cities());
        let nyc = engine.viewport().lat_lng_to_pixel(&LatLng::new(40.71, -74.0));

        assert!(engine.handle_input(InputEvent::PointerMove { position: nyc }));
        let tooltip = engine.tooltip().unwrap();
        assert_eq!(tooltip.content.to_text(), "name: NYC");

        // same feature, same spot: nothing to redraw
        assert!(!engine.handle_input(InputEvent::PointerMove { position: nyc }));

        assert!(engine.handle_input(InputEvent::PointerLeave));
        assert!(engine.tooltip().is_none());
    }

    #[test]
    fn test_features_without_tooltip_spec_show_nothing() {
        let mut fc = FeatureCollection::new();
        fc.add_polygons(
            &[json!({"coords": [[-10, -10], [-10, 10], [10, 10], [10, -10]]})],
            PolygonStyle::default(),
        );
        let mut engine = engine(fc);
        engine.handle_input(InputEvent::PointerMove {
            position: Point::new(400.0, 300.0),
        });
        assert!(engine.tooltip().is_none());
    }

    #[test]
    fn test_drag_hides_tooltip() {
        let mut engine = engine(cities());
        let nyc = engine.viewport().lat_lng_to_pixel(&LatLng::new(40.71, -74.0));
        engine.handle_input(InputEvent::PointerMove { position: nyc });
        assert!(engine.tooltip().is_some());

        engine.handle_input(InputEvent::PointerDown { position: nyc });
        assert!(engine.tooltip().is_none());
        assert!(engine.handle_input(InputEvent::PointerMove {
            position: Point::new(nyc.x + 30.0, nyc.y)
        }));
        assert!(engine.tooltip().is_none());
    }

    #[test]
    fn test_zoom_buttons_and_fit_bounds() {
        let mut engine = engine(cities());
        let home = engine.center();

        assert!(engine.zoom_in());
        assert_eq!(engine.viewport().zoom, 5.0);
        engine.control().set_center(LatLng::new(0.0, 0.0));

        engine.fit_bounds();
        assert_eq!(engine.viewport().zoom, engine.home_zoom());
        assert_eq!(engine.center(), home);

        engine.control().set_zoom(1.0);
        assert!(!engine.zoom_out());
    }

    #[test]
    fn test_fit_bounds_without_data_goes_to_origin() {
        let mut engine = MapEngine::with_fetcher(
            FeatureCollection::new(),
            MapOptions::default().with_center(LatLng::new(20.0, 20.0)).with_zoom(7.0),
            Point::new(800.0, 600.0),
            Box::new(QueueFetcher::default()),
        );
        engine.fit_bounds();
        assert_eq!(engine.center(), LatLng::new(0.0, 0.0));
        assert_eq!(engine.viewport().zoom, 7.0);
    }

    #[test]
    fn test_pinch_and_resize_request_redraw() {
        let mut engine = engine(cities());
        let mut ctx = RenderContext::new();
        engine.render(&mut ctx).unwrap();

        assert!(engine.handle_input(InputEvent::Resize {
            size: Point::new(1024.0, 768.0)
        }));
        assert_eq!(engine.viewport().size, Point::new(1024.0, 768.0));
        engine.render(&mut ctx).unwrap();

        let start = vec![
            TouchPoint::new(0, Point::new(400.0, 300.0)),
            TouchPoint::new(1, Point::new(500.0, 300.0)),
        ];
        engine.handle_input(InputEvent::Touch {
            event_type: TouchEventType::Start,
            touches: start,
        });
        let spread = vec![
            TouchPoint::new(0, Point::new(350.0, 300.0)),
            TouchPoint::new(1, Point::new(550.0, 300.0)),
        ];
        assert!(engine.handle_input(InputEvent::Touch {
            event_type: TouchEventType::Move,
            touches: spread,
        }));
        assert!((engine.viewport().zoom - 5.0).abs() < 1e-9);
        assert!(engine.needs_redraw());
    }
}
