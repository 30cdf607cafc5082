//! End-to-end behavior of the map engine, driven headlessly through
//! `RenderContext` and an in-memory tile fetcher.

use geocanvas::{
    data::geojson::GeoJsonStyles,
    tiles::loader::{TileCompletion, TileImage, TileRequest},
    FeatureCollection, FeatureRef, GeoJson, HitTester, InputEvent, LatLng, MapEngine, MapOptions,
    Point, PointStyle, PolygonStyle, RenderContext, TileCoord, TileFetcher, Viewport,
};
use serde_json::json;
use std::sync::{Arc, Mutex};

/// Records every request and holds completions until the test resolves them
#[derive(Clone, Default)]
struct CountingFetcher {
    requests: Arc<Mutex<Vec<TileCoord>>>,
    pending: Arc<Mutex<Vec<TileCompletion>>>,
}

impl CountingFetcher {
    fn count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn resolve_all(&self) -> usize {
        let pending: Vec<_> = self.pending.lock().unwrap().drain(..).collect();
        let n = pending.len();
        for completion in pending {
            completion.succeed(TileImage::from_rgba(2, 2, vec![200; 16]));
        }
        n
    }
}

impl TileFetcher for CountingFetcher {
    fn fetch(&self, request: TileRequest, completion: TileCompletion) {
        self.requests.lock().unwrap().push(request.coord);
        self.pending.lock().unwrap().push(completion);
    }
}

fn engine_with(features: FeatureCollection, options: MapOptions) -> MapEngine {
    MapEngine::with_fetcher(
        features,
        options,
        Point::new(800.0, 600.0),
        Box::new(CountingFetcher::default()),
    )
}

fn assert_close(a: f64, b: f64, eps: f64) {
    assert!((a - b).abs() <= eps, "{} != {} (eps {})", a, b, eps);
}

#[test]
fn test_projection_round_trip() {
    println!("🧪 [TEST] pixel_to_lat_lng inverts lat_lng_to_pixel");
    let samples = [(0.0, 0.0), (84.9, 179.9), (-84.9, -179.9), (37.7749, -122.4194), (-33.86, 151.2)];
    for zoom in [1.0, 3.5, 12.0, 20.0] {
        let viewport = Viewport::new(LatLng::new(10.0, 20.0), zoom, Point::new(800.0, 600.0));
        for (lat, lng) in samples {
            let pixel = viewport.lat_lng_to_pixel(&LatLng::new(lat, lng));
            let back = viewport.pixel_to_lat_lng(&pixel);
            assert_close(back.lat, lat, 1e-6);
            assert_close(back.lng, lng, 1e-6);
        }
    }
}

#[test]
fn test_wheel_zoom_keeps_point_under_cursor() {
    println!("🧪 [TEST] wheel zoom is anchor preserving");
    let mut engine = engine_with(
        FeatureCollection::new(),
        MapOptions::default().with_center(LatLng::new(48.85, 2.35)).with_zoom(6.0),
    );
    let cursor = Point::new(123.0, 456.0);

    for delta_y in [-1.0, -1.0, 1.0, -3.0] {
        let under = engine.viewport().pixel_to_lat_lng(&cursor);
        assert!(engine.handle_input(InputEvent::Wheel {
            delta_y,
            position: cursor
        }));
        let after = engine.viewport().lat_lng_to_pixel(&under);
        assert_close(after.x, cursor.x, 1.0);
        assert_close(after.y, cursor.y, 1.0);
    }
    assert_close(engine.viewport().zoom, 7.0, 1e-12);
}

#[test]
fn test_pan_then_reverse_pan_restores_center() {
    println!("🧪 [TEST] pan inverse");
    let mut engine = engine_with(
        FeatureCollection::new(),
        MapOptions::default().with_center(LatLng::new(-20.0, 30.0)).with_zoom(8.0),
    );
    let start = engine.viewport().center;

    let drag = |engine: &mut MapEngine, from: Point, to: Point| {
        engine.handle_input(InputEvent::PointerDown { position: from });
        engine.handle_input(InputEvent::PointerMove { position: to });
        engine.handle_input(InputEvent::PointerUp);
    };
    drag(&mut engine, Point::new(400.0, 300.0), Point::new(530.0, 210.0));
    assert!(engine.viewport().center != start);
    drag(&mut engine, Point::new(530.0, 210.0), Point::new(400.0, 300.0));

    let end = engine.viewport().center;
    assert_close(end.lat, start.lat, 1e-9);
    assert_close(end.lng, start.lng, 1e-9);
}

#[test]
fn test_three_city_hit_scenario() {
    println!("🧪 [TEST] three points at zoom 3");
    let mut features = FeatureCollection::new();
    features.add_points(
        &[
            json!({"lat": 0, "lng": 0, "name": "A"}),
            json!({"lat": 45, "lng": 90, "name": "B"}),
            json!({"lat": -45, "lng": -90, "name": "C"}),
        ],
        PointStyle::default().with_radius(12.0),
    );
    let engine = engine_with(
        features,
        MapOptions::default().with_center(LatLng::new(0.0, 0.0)).with_zoom(3.0),
    );

    let b = engine.viewport().lat_lng_to_pixel(&LatLng::new(45.0, 90.0));
    let hit = HitTester.resolve(engine.features(), engine.viewport(), b);
    assert_eq!(hit, Some(FeatureRef::Point(1)));
    let (properties, _) = engine.features().describe(FeatureRef::Point(1)).unwrap();
    assert_eq!(properties["name"], "B");

    // exactly at the center always hits, radius + 4 never does
    let away = Point::new(b.x + 20.0, b.y);
    assert_eq!(HitTester.resolve(engine.features(), engine.viewport(), away), None);
    let edge = Point::new(b.x, b.y + 16.0);
    assert_eq!(HitTester.resolve(engine.features(), engine.viewport(), edge), None);
}

#[test]
fn test_square_with_hole_scenario() {
    println!("🧪 [TEST] polygon parity with a hole");
    let mut features = FeatureCollection::new();
    features.add_polygons(
        &[json!({"coords": [
            [[-10, -10], [-10, 10], [10, 10], [10, -10]],
            [[-3, -3], [3, -3], [3, 3], [-3, 3]]
        ]})],
        PolygonStyle::default(),
    );
    let engine = engine_with(
        features,
        MapOptions::default().with_center(LatLng::new(0.0, 0.0)).with_zoom(4.0),
    );
    let viewport = engine.viewport();

    let center = viewport.lat_lng_to_pixel(&LatLng::new(0.0, 0.0));
    assert_eq!(HitTester.resolve(engine.features(), viewport, center), None);

    let corner = viewport.lat_lng_to_pixel(&LatLng::new(8.0, -8.0));
    assert_eq!(
        HitTester.resolve(engine.features(), viewport, corner),
        Some(FeatureRef::Polygon(0))
    );

    let outside = viewport.lat_lng_to_pixel(&LatLng::new(15.0, 0.0));
    assert_eq!(HitTester.resolve(engine.features(), viewport, outside), None);
}

#[test]
fn test_each_tile_is_fetched_once() {
    println!("🧪 [TEST] tile cache idempotence");
    let fetcher = CountingFetcher::default();
    let mut engine = MapEngine::with_fetcher(
        FeatureCollection::new(),
        MapOptions::default()
            .with_center(LatLng::new(0.0, 0.0))
            .with_zoom(4.0)
            .with_tile_url("https://tiles.example/{z}/{x}/{y}.png"),
        Point::new(800.0, 600.0),
        Box::new(fetcher.clone()),
    );
    let mut ctx = RenderContext::new();

    engine.render(&mut ctx).unwrap();
    let first = fetcher.count();
    assert!(first > 0);
    engine.render(&mut ctx).unwrap();
    engine.render(&mut ctx).unwrap();
    assert_eq!(fetcher.count(), first);

    let mut coords = fetcher.requests.lock().unwrap().clone();
    coords.sort_by_key(|c| (c.z, c.x, c.y));
    coords.dedup();
    assert_eq!(coords.len(), first);
}

#[test]
fn test_frame_order_and_coalesced_tile_redraw() {
    println!("🧪 [TEST] tiles, then polygons, lines and points; one redraw per batch of tiles");
    let mut features = FeatureCollection::new();
    features.add_points(&[json!({"lat": 1, "lng": 1})], PointStyle::default());
    features.add_polygons(
        &[json!({"coords": [[0, 0], [0, 5], [5, 5]]})],
        PolygonStyle::default(),
    );
    features.add_lines(
        &[json!({"coords": [[0, 0], [3, 3]]})],
        geocanvas::LineStyle::default(),
    );

    let fetcher = CountingFetcher::default();
    let mut engine = MapEngine::with_fetcher(
        features,
        MapOptions::default()
            .with_zoom(2.0)
            .with_tile_url("https://tiles.example/{z}/{x}/{y}.png"),
        Point::new(800.0, 600.0),
        Box::new(fetcher.clone()),
    );
    let mut ctx = RenderContext::new();
    assert!(engine.render_if_needed(&mut ctx).unwrap());
    assert_eq!(ctx.kind_sequence(), vec!["clear", "fill", "stroke", "circle"]);

    let resolved = fetcher.resolve_all();
    assert!(resolved > 1);
    assert!(!engine.needs_redraw());
    assert_eq!(engine.pump_tiles(), resolved);
    assert!(engine.needs_redraw());

    assert!(engine.render_if_needed(&mut ctx).unwrap());
    assert!(!engine.render_if_needed(&mut ctx).unwrap());
    assert_eq!(ctx.frames, 2);
    assert_eq!(
        ctx.kind_sequence(),
        vec!["clear", "tile", "fill", "stroke", "circle"]
    );
}

#[test]
fn test_default_cache_never_refetches_after_panning_back() {
    println!("🧪 [TEST] default options keep every tile for the session");
    let fetcher = CountingFetcher::default();
    let mut engine = MapEngine::with_fetcher(
        FeatureCollection::new(),
        MapOptions::default()
            .with_center(LatLng::new(0.0, 0.0))
            .with_zoom(10.0)
            .with_tile_url("https://tiles.example/{z}/{x}/{y}.png"),
        Point::new(800.0, 600.0),
        Box::new(fetcher.clone()),
    );
    assert_eq!(engine.tile_compositor().unwrap().cache().capacity(), None);
    let mut ctx = RenderContext::new();

    let mut drag_and_draw = |engine: &mut MapEngine, dx: f64| {
        engine.render(&mut ctx).unwrap();
        fetcher.resolve_all();
        engine.pump_tiles();
        engine.handle_input(InputEvent::PointerDown {
            position: Point::new(400.0, 300.0),
        });
        engine.handle_input(InputEvent::PointerMove {
            position: Point::new(400.0 + dx, 300.0),
        });
        engine.handle_input(InputEvent::PointerUp);
    };
    for _ in 0..40 {
        drag_and_draw(&mut engine, 700.0);
    }
    for _ in 0..40 {
        drag_and_draw(&mut engine, -700.0);
    }
    engine.render(&mut ctx).unwrap();

    let mut coords = fetcher.requests.lock().unwrap().clone();
    let total = coords.len();
    coords.sort_by_key(|c| (c.z, c.x, c.y));
    coords.dedup();
    assert!(total > 0);
    assert_eq!(coords.len(), total, "a tile was fetched twice");
}

#[test]
fn test_small_cache_draws_every_visible_tile_on_a_static_view() {
    println!("🧪 [TEST] a bounded cache never evicts the current frame's tiles");
    let fetcher = CountingFetcher::default();
    let mut engine = MapEngine::with_fetcher(
        FeatureCollection::new(),
        MapOptions::default()
            .with_center(LatLng::new(0.0, 0.0))
            .with_zoom(10.0)
            .with_tile_url("https://tiles.example/{z}/{x}/{y}.png")
            .with_tile_cache_capacity(Some(64)),
        Point::new(1920.0, 1080.0),
        Box::new(fetcher.clone()),
    );
    let visible = {
        let compositor = engine.tile_compositor().unwrap();
        compositor.visible_tiles(engine.viewport()).len()
    };
    assert!(visible > 64);

    let mut ctx = RenderContext::new();
    for _ in 0..6 {
        engine.render(&mut ctx).unwrap();
        fetcher.resolve_all();
        engine.pump_tiles();
    }
    engine.render(&mut ctx).unwrap();

    let drawn = ctx.commands().iter().filter(|c| c.kind() == "tile").count();
    assert_eq!(drawn, visible);
    assert_eq!(fetcher.count(), visible);
}

#[test]
fn test_bounded_cache_stays_bounded_while_panning() {
    println!("🧪 [TEST] LRU tile cache");
    let fetcher = CountingFetcher::default();
    let mut engine = MapEngine::with_fetcher(
        FeatureCollection::new(),
        MapOptions::default()
            .with_center(LatLng::new(0.0, 0.0))
            .with_zoom(10.0)
            .with_tile_url("https://tiles.example/{z}/{x}/{y}.png")
            .with_tile_cache_capacity(Some(64)),
        Point::new(800.0, 600.0),
        Box::new(fetcher.clone()),
    );
    let mut ctx = RenderContext::new();

    for _ in 0..10 {
        engine.render(&mut ctx).unwrap();
        fetcher.resolve_all();
        engine.pump_tiles();
        engine.handle_input(InputEvent::PointerDown {
            position: Point::new(700.0, 300.0),
        });
        engine.handle_input(InputEvent::PointerMove {
            position: Point::new(100.0, 300.0),
        });
        engine.handle_input(InputEvent::PointerUp);
    }

    let cache = engine.tile_compositor().unwrap().cache();
    assert_eq!(cache.capacity(), Some(64));
    assert!(cache.len() <= 64);
    assert!(fetcher.count() > 64);
}

#[test]
fn test_geojson_document_end_to_end() {
    println!("🧪 [TEST] GeoJSON ingestion feeds the renderer");
    let geojson: GeoJson = r#"{
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature", "properties": {"name": "pin"},
             "geometry": {"type": "Point", "coordinates": [2.35, 48.85]}},
            {"type": "Feature", "properties": {},
             "geometry": {"type": "LineString", "coordinates": [[2.0, 48.0], [3.0, 49.0]]}},
            {"type": "Feature", "properties": null, "geometry": null}
        ]
    }"#
    .parse()
    .unwrap();

    let mut features = FeatureCollection::new();
    let report = features.add_geojson(&geojson, &GeoJsonStyles::default());
    assert_eq!(report.accepted, 2);
    assert_eq!(features.points()[0].position, LatLng::new(48.85, 2.35));

    let mut engine = engine_with(features, MapOptions::default());
    let mut ctx = RenderContext::new();
    engine.render(&mut ctx).unwrap();
    assert_eq!(ctx.kind_sequence(), vec!["clear", "stroke", "circle"]);
}
