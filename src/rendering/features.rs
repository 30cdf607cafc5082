//! Vector feature drawing.
//!
//! Per frame the order is fixed: every polygon, then every line, then every
//! point, so markers are never hidden under area fills. Geometry is
//! projected fresh for each frame.

use crate::core::{
    constants::{LABEL_FONT_SIZE, LABEL_OFFSET},
    geo::Point,
    viewport::Viewport,
};
use crate::data::{
    features::{display_value, is_truthy, FeatureCollection, LineFeature, PointFeature, PolygonFeature},
    style::Color,
};
use crate::rendering::surface::{DrawSurface, FillPaint, FillRule, Path, StrokePaint, TextStyle};
use crate::Result;

/// Label text color
const LABEL_COLOR: Color = Color::rgb(0x33, 0x33, 0x33);

/// Draws features onto a [`DrawSurface`]
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureRenderer;

impl FeatureRenderer {
    /// Draws all polygons, then all lines, then all points
    pub fn render(
        &self,
        features: &FeatureCollection,
        viewport: &Viewport,
        surface: &mut dyn DrawSurface,
    ) -> Result<()> {
        for polygon in features.polygons() {
            self.draw_polygon(polygon, viewport, surface)?;
        }
        for line in features.lines() {
            self.draw_line(line, viewport, surface)?;
        }
        for point in features.points() {
            self.draw_point(point, viewport, surface)?;
        }
        Ok(())
    }

    /// Filled circle, optional border, optional label above the marker
    pub fn draw_point(
        &self,
        point: &PointFeature,
        viewport: &Viewport,
        surface: &mut dyn DrawSurface,
    ) -> Result<()> {
        let style = &point.style;
        let position = viewport.lat_lng_to_pixel(&point.position);

        let fill = FillPaint::new(style.color, style.opacity);
        let stroke = (style.stroke_width > 0.0)
            .then(|| StrokePaint::solid(style.stroke, style.stroke_width, style.opacity));
        surface.draw_circle(position, style.radius, &fill, stroke.as_ref())?;

        let label = style
            .label_field
            .as_ref()
            .and_then(|field| point.properties.get(field))
            .filter(|value| is_truthy(value));
        if let Some(value) = label {
            let anchor = Point::new(
                position.x,
                position.y - f64::from(style.radius) - LABEL_OFFSET,
            );
            let text_style = TextStyle {
                color: LABEL_COLOR,
                font_size: LABEL_FONT_SIZE,
            };
            surface.draw_text(&display_value(value), anchor, &text_style)?;
        }
        Ok(())
    }

    /// Connected poly-line; lines with fewer than two vertices are not drawn
    pub fn draw_line(
        &self,
        line: &LineFeature,
        viewport: &Viewport,
        surface: &mut dyn DrawSurface,
    ) -> Result<()> {
        if line.coords.len() < 2 {
            return Ok(());
        }
        let style = &line.style;
        let points = line
            .coords
            .iter()
            .map(|c| viewport.lat_lng_to_pixel(c))
            .collect();
        let stroke = StrokePaint::solid(style.stroke, style.stroke_width, style.stroke_opacity)
            .with_dash(style.dash_pattern());
        surface.stroke_path(&Path::polyline(points), &stroke)
    }

    /// Compound path of the outer ring and every hole, filled even-odd.
    ///
    /// The same path is stroked, so hole boundaries get the same outline as
    /// the outer boundary.
    pub fn draw_polygon(
        &self,
        polygon: &PolygonFeature,
        viewport: &Viewport,
        surface: &mut dyn DrawSurface,
    ) -> Result<()> {
        match polygon.outer() {
            Some(outer) if outer.len() >= 3 => {}
            _ => return Ok(()),
        }
        let style = &polygon.style;

        let mut path = Path::new();
        for ring in polygon.rings.iter().filter(|r| !r.is_empty()) {
            path.push_ring(ring.iter().map(|c| viewport.lat_lng_to_pixel(c)).collect());
        }

        surface.fill_path(
            &path,
            &FillPaint::new(style.fill, style.fill_opacity),
            FillRule::EvenOdd,
        )?;
        if style.stroke_width > 0.0 {
            let stroke = StrokePaint::solid(style.stroke, style.stroke_width, style.stroke_opacity);
            surface.stroke_path(&path, &stroke)?;
        }
        Ok(())
    }
}
