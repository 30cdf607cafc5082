use geocanvas::{
    data::style::TooltipSpec,
    rendering::DrawCommand,
    FeatureCollection, InputEvent, LatLng, LineStyle, MapEngine, MapOptions, Point, PointStyle,
    PolygonStyle, RenderContext,
};
use serde_json::json;

/// Drives the engine without any UI and prints what each frame would draw
fn main() -> geocanvas::Result<()> {
    env_logger::init();

    println!("🗺️ geocanvas headless example");
    println!("=============================");

    let mut features = FeatureCollection::new();
    let mut report = features.add_points(
        &[
            json!({"lat": 40.7128, "lng": -74.0060, "name": "New York", "population": 8336817}),
            json!({"lat": 51.5074, "lng": -0.1278, "name": "London", "population": 8982000}),
            json!({"latitude": 35.6762, "lon": 139.6503, "name": "Tokyo"}),
            json!({"name": "Nowhere"}),
        ],
        PointStyle::default()
            .with_radius(10.0)
            .with_label_field("name")
            .with_tooltip(TooltipSpec::fields(["name", "population"])),
    );
    println!("✅ Points: {} accepted, {} skipped", report.accepted, report.skipped.len());

    report.merge(features.add_lines(
        &[json!({"coords": [[40.7128, -74.0060], [51.5074, -0.1278], [35.6762, 139.6503]], "route": "A"})],
        LineStyle::default().with_dasharray("8,4"),
    ));
    report.merge(features.add_polygons(
        &[json!({
            "coords": [
                [[30.0, -10.0], [60.0, -10.0], [60.0, 30.0], [30.0, 30.0]],
                [[40.0, 0.0], [50.0, 0.0], [50.0, 10.0], [40.0, 10.0]]
            ],
            "name": "Europe-ish"
        })],
        PolygonStyle::default().with_tooltip(TooltipSpec::template("{name}")),
    ));
    println!("✅ All layers: {} feature(s) loaded", report.accepted);

    let mut engine = MapEngine::new(features, MapOptions::default(), Point::new(1024.0, 768.0))?;
    let viewport = engine.viewport().clone();
    println!(
        "✅ Engine created: center {:.4}, {:.4} zoom {} size {}x{}",
        viewport.center.lat, viewport.center.lng, viewport.zoom, viewport.size.x, viewport.size.y
    );

    let mut ctx = RenderContext::new();
    engine.render(&mut ctx)?;
    summarize("initial frame", &ctx);

    println!("\n🎯 Hovering London:");
    let london = engine.viewport().lat_lng_to_pixel(&LatLng::new(51.5074, -0.1278));
    engine.handle_input(InputEvent::PointerMove { position: london });
    match engine.tooltip() {
        Some(tooltip) => println!("   💬 {}", tooltip.content.to_text().replace('\n', " | ")),
        None => println!("   (no tooltip)"),
    }

    println!("\n🚀 Dragging 200px to the left:");
    engine.handle_input(InputEvent::PointerDown { position: london });
    engine.handle_input(InputEvent::PointerMove {
        position: Point::new(london.x - 200.0, london.y),
    });
    engine.handle_input(InputEvent::PointerUp);
    let center = engine.viewport().center;
    println!("   📍 center now {:.4}, {:.4}", center.lat, center.lng);

    println!("\n🔍 Wheel zoom at the cursor:");
    for _ in 0..3 {
        engine.handle_input(InputEvent::Wheel {
            delta_y: -100.0,
            position: Point::new(300.0, 300.0),
        });
    }
    println!("   zoom now {}", engine.viewport().zoom);

    engine.fit_bounds();
    engine.render_if_needed(&mut ctx)?;
    summarize("after fit", &ctx);

    println!("\n✨ Headless example completed successfully!");
    Ok(())
}

fn summarize(label: &str, ctx: &RenderContext) {
    let count = |kind: &str| ctx.commands().iter().filter(|c| c.kind() == kind).count();
    println!(
        "🖼️ {}: {} command(s), order {:?}, {} circle(s), {} label(s)",
        label,
        ctx.commands().len(),
        ctx.kind_sequence(),
        count("circle"),
        count("text"),
    );
    for command in ctx.commands() {
        if let DrawCommand::Text { text, position, .. } = command {
            println!("   🏷️ '{}' at ({:.1}, {:.1})", text, position.x, position.y);
        }
    }
}
