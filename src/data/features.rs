//! Normalized feature storage.
//!
//! Everything the engine draws or hit-tests lives in a [`FeatureCollection`]:
//! three insertion-ordered lists plus the running bounds of every accepted
//! coordinate. Features are immutable once added.

use crate::core::geo::{GeoBounds, LatLng};
use crate::data::{
    ingest,
    style::{LineStyle, PointStyle, PolygonStyle, TooltipSpec},
};
use serde_json::Value;
use std::sync::Arc;

/// Insertion-ordered property mapping carried by every feature
pub type Properties = serde_json::Map<String, Value>;

/// A point marker
#[derive(Debug, Clone)]
pub struct PointFeature {
    pub position: LatLng,
    pub properties: Properties,
    pub style: Arc<PointStyle>,
}

/// A poly-line through two or more coordinates
#[derive(Debug, Clone)]
pub struct LineFeature {
    pub coords: Vec<LatLng>,
    pub properties: Properties,
    pub style: Arc<LineStyle>,
}

/// A polygon; `rings[0]` is the outer boundary, the rest are holes
#[derive(Debug, Clone)]
pub struct PolygonFeature {
    pub rings: Vec<Vec<LatLng>>,
    pub properties: Properties,
    pub style: Arc<PolygonStyle>,
}

impl PolygonFeature {
    pub fn outer(&self) -> Option<&[LatLng]> {
        self.rings.first().map(Vec::as_slice)
    }

    pub fn holes(&self) -> &[Vec<LatLng>] {
        self.rings.get(1..).unwrap_or_default()
    }
}

/// Index of a feature inside its kind's list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureRef {
    Point(usize),
    Line(usize),
    Polygon(usize),
}

/// Outcome of a batch add
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IngestReport {
    /// Number of features added
    pub accepted: usize,
    /// One diagnostic per skipped record
    pub skipped: Vec<String>,
}

impl IngestReport {
    pub fn merge(&mut self, other: IngestReport) {
        self.accepted += other.accepted;
        self.skipped.extend(other.skipped);
    }
}

/// All features known to the engine plus their aggregate bounds
#[derive(Debug, Clone, Default)]
pub struct FeatureCollection {
    points: Vec<PointFeature>,
    lines: Vec<LineFeature>,
    polygons: Vec<PolygonFeature>,
    bounds: Option<GeoBounds>,
}

impl FeatureCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn points(&self) -> &[PointFeature] {
        &self.points
    }

    pub fn lines(&self) -> &[LineFeature] {
        &self.lines
    }

    pub fn polygons(&self) -> &[PolygonFeature] {
        &self.polygons
    }

    /// Bounds of every accepted coordinate, `None` until something is added
    pub fn bounds(&self) -> Option<GeoBounds> {
        self.bounds
    }

    pub fn len(&self) -> usize {
        self.points.len() + self.lines.len() + self.polygons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Adds point records; see [`ingest::point_record`] for the accepted shapes
    pub fn add_points(&mut self, records: &[Value], style: PointStyle) -> IngestReport {
        let style = Arc::new(style);
        self.ingest(records, "point", |fc, record| {
            let (position, properties) = ingest::point_record(record)?;
            fc.push_point(position, properties, Arc::clone(&style));
            Ok(())
        })
    }

    /// Adds line records; see [`ingest::line_record`]
    pub fn add_lines(&mut self, records: &[Value], style: LineStyle) -> IngestReport {
        let style = Arc::new(style);
        self.ingest(records, "line", |fc, record| {
            let (coords, properties) = ingest::line_record(record)?;
            fc.push_line(coords, properties, Arc::clone(&style))
        })
    }

    /// Adds polygon records; see [`ingest::polygon_record`]
    pub fn add_polygons(&mut self, records: &[Value], style: PolygonStyle) -> IngestReport {
        let style = Arc::new(style);
        self.ingest(records, "polygon", |fc, record| {
            let (rings, properties) = ingest::polygon_record(record)?;
            fc.push_polygon(rings, properties, Arc::clone(&style))
        })
    }

    fn ingest<F>(&mut self, records: &[Value], kind: &str, mut add: F) -> IngestReport
    where
        F: FnMut(&mut Self, &Value) -> Result<(), crate::MapError>,
    {
        let mut report = IngestReport::default();
        for record in records {
            match add(self, record) {
                Ok(()) => report.accepted += 1,
                Err(err) => {
                    log::warn!("Skipping {}: {} ({})", kind, err, record);
                    report.skipped.push(err.to_string());
                }
            }
        }
        report
    }

    /// Adds an already-normalized point
    pub fn push_point(&mut self, position: LatLng, properties: Properties, style: Arc<PointStyle>) {
        GeoBounds::accumulate(&mut self.bounds, position.lat, position.lng);
        self.points.push(PointFeature {
            position,
            properties,
            style,
        });
    }

    /// Adds an already-normalized line; fewer than two coordinates is rejected
    pub fn push_line(
        &mut self,
        coords: Vec<LatLng>,
        properties: Properties,
        style: Arc<LineStyle>,
    ) -> Result<(), crate::MapError> {
        if coords.len() < 2 {
            return Err(crate::MapError::InvalidFeature(format!(
                "line needs at least 2 coordinates, got {}",
                coords.len()
            )));
        }
        for c in &coords {
            GeoBounds::accumulate(&mut self.bounds, c.lat, c.lng);
        }
        self.lines.push(LineFeature {
            coords,
            properties,
            style,
        });
        Ok(())
    }

    /// Adds an already-normalized polygon.
    ///
    /// Rings with fewer than three positions are dropped; a polygon left
    /// without rings is rejected.
    pub fn push_polygon(
        &mut self,
        mut rings: Vec<Vec<LatLng>>,
        properties: Properties,
        style: Arc<PolygonStyle>,
    ) -> Result<(), crate::MapError> {
        rings.retain(|ring| ring.len() >= 3);
        if rings.is_empty() {
            return Err(crate::MapError::InvalidFeature(
                "polygon has no ring with at least 3 positions".to_string(),
            ));
        }
        for c in rings.iter().flatten() {
            GeoBounds::accumulate(&mut self.bounds, c.lat, c.lng);
        }
        self.polygons.push(PolygonFeature {
            rings,
            properties,
            style,
        });
        Ok(())
    }

    /// Properties and tooltip settings of a referenced feature
    pub fn describe(&self, feature: FeatureRef) -> Option<(&Properties, &TooltipSpec)> {
        match feature {
            FeatureRef::Point(i) => self.points.get(i).map(|p| (&p.properties, &p.style.tooltip)),
            FeatureRef::Line(i) => self.lines.get(i).map(|l| (&l.properties, &l.style.tooltip)),
            FeatureRef::Polygon(i) => self
                .polygons
                .get(i)
                .map(|p| (&p.properties, &p.style.tooltip)),
        }
    }

    /// Removes every feature and resets the bounds
    pub fn clear(&mut self) {
        self.points.clear();
        self.lines.clear();
        self.polygons.clear();
        self.bounds = None;
    }
}

/// Text shown for a property value in labels and tooltips.
///
/// Strings are used verbatim, null is empty, integral numbers print without
/// a fractional part, arrays join their elements with `,` and objects
/// print as compact JSON.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.to_string()
            } else if let Some(u) = n.as_u64() {
                u.to_string()
            } else {
                let f = n.as_f64().unwrap_or_default();
                if f.fract() == 0.0 && f.abs() < 1e15 {
                    format!("{}", f as i64)
                } else {
                    f.to_string()
                }
            }
        }
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(display_value).collect::<Vec<_>>().join(","),
        Value::Object(_) => value.to_string(),
    }
}

/// Whether a property value counts as present for labelling
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(false, |f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_add_points_shares_style_and_widens_bounds() {
        let mut fc = FeatureCollection::new();
        let report = fc.add_points(
            &[
                json!({"lat": 40.71, "lng": -74.0, "name": "NYC"}),
                json!({"latitude": 34.05, "lon": -118.24, "name": "LA"}),
                json!({"name": "nowhere"}),
            ],
            PointStyle::default(),
        );

        assert_eq!(report.accepted, 2);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(fc.points().len(), 2);
        assert!(Arc::ptr_eq(&fc.points()[0].style, &fc.points()[1].style));

        let bounds = fc.bounds().unwrap();
        assert_eq!(bounds.min_lat, 34.05);
        assert_eq!(bounds.max_lng, -74.0);
    }

    #[test]
    fn test_short_lines_and_polygons_are_skipped() {
        let mut fc = FeatureCollection::new();
        let report = fc.add_lines(
            &[json!({"coords": [[0.0, 0.0]]}), json!({"coords": [[0, 0], [1, 1]]})],
            LineStyle::default(),
        );
        assert_eq!(report.accepted, 1);

        let report = fc.add_polygons(
            &[
                json!({"coords": [[0, 0], [1, 1]]}),
                json!({"coords": [[[0, 0], [1, 1]]]}),
                json!({"coords": [[0, 0], [0, 1], [1, 1]]}),
            ],
            PolygonStyle::default(),
        );
        assert_eq!(report.accepted, 1);
        assert_eq!(report.skipped.len(), 2);
    }

    #[test]
    fn test_clear_resets_bounds() {
        let mut fc = FeatureCollection::new();
        fc.add_points(&[json!({"lat": 1, "lng": 2})], PointStyle::default());
        assert!(fc.bounds().is_some());
        fc.clear();
        assert!(fc.is_empty());
        assert!(fc.bounds().is_none());
    }

    #[test]
    fn test_display_value() {
        assert_eq!(display_value(&json!("Paris")), "Paris");
        assert_eq!(display_value(&json!(8336817)), "8336817");
        assert_eq!(display_value(&json!(2.0)), "2");
        assert_eq!(display_value(&json!(40.71)), "40.71");
        assert_eq!(display_value(&json!(null)), "");
        assert_eq!(display_value(&json!([1, "a", null])), "1,a,");
        assert_eq!(display_value(&json!({"k": 1})), r#"{"k":1}"#);
    }

    #[test]
    fn test_truthiness() {
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!(false)));
        assert!(is_truthy(&json!("A")));
        assert!(is_truthy(&json!(3)));
        assert!(is_truthy(&json!([])));
    }
}
