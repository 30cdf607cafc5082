use crate::core::geo::LatLng;
use crate::data::{
    features::{FeatureCollection, IngestReport, Properties},
    style::{LineStyle, PointStyle, PolygonStyle},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A GeoJSON position: `[lng, lat, ...]`
pub type Position = Vec<f64>;

/// GeoJSON geometry types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GeoJsonGeometry {
    Point { coordinates: Position },
    MultiPoint { coordinates: Vec<Position> },
    LineString { coordinates: Vec<Position> },
    MultiLineString { coordinates: Vec<Vec<Position>> },
    Polygon { coordinates: Vec<Vec<Position>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<Position>>> },
    GeometryCollection { geometries: Vec<GeoJsonGeometry> },
}

/// GeoJSON feature with geometry and properties
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoJsonFeature {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<serde_json::Value>,
    pub geometry: Option<GeoJsonGeometry>,
    #[serde(default)]
    pub properties: Option<Properties>,
}

/// Root GeoJSON object: a collection, a single feature or a bare geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GeoJson {
    FeatureCollection { features: Vec<GeoJsonFeature> },
    Feature(GeoJsonFeature),
    #[serde(untagged)]
    Geometry(GeoJsonGeometry),
}

impl std::str::FromStr for GeoJson {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_str(s).map_err(|e| crate::Error::ParseError(format!("Invalid GeoJSON: {}", e)))
    }
}

/// Styles applied to the features produced from one GeoJSON document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeoJsonStyles {
    pub point: PointStyle,
    pub line: LineStyle,
    pub polygon: PolygonStyle,
}

/// Shared style handles for one conversion pass
struct StyleSet {
    point: Arc<PointStyle>,
    line: Arc<LineStyle>,
    polygon: Arc<PolygonStyle>,
}

/// Swaps a `[lng, lat]` position into a coordinate
fn to_lat_lng(position: &[f64]) -> Option<LatLng> {
    match position {
        [lng, lat, ..] => Some(LatLng::new(*lat, *lng)),
        _ => None,
    }
}

fn to_path(positions: &[Position]) -> Vec<LatLng> {
    positions.iter().filter_map(|p| to_lat_lng(p)).collect()
}

fn record(report: &mut IngestReport, result: Result<(), crate::MapError>) {
    match result {
        Ok(()) => report.accepted += 1,
        Err(err) => {
            log::warn!("Skipping GeoJSON geometry: {}", err);
            report.skipped.push(err.to_string());
        }
    }
}

impl FeatureCollection {
    /// Adds every feature of a GeoJSON document.
    ///
    /// Multi-geometries become one feature per member, each carrying a copy
    /// of the source feature's properties.
    pub fn add_geojson(&mut self, geojson: &GeoJson, styles: &GeoJsonStyles) -> IngestReport {
        let styles = StyleSet {
            point: Arc::new(styles.point.clone()),
            line: Arc::new(styles.line.clone()),
            polygon: Arc::new(styles.polygon.clone()),
        };
        let mut report = IngestReport::default();

        match geojson {
            GeoJson::FeatureCollection { features } => {
                for feature in features {
                    self.add_geojson_feature(feature, &styles, &mut report);
                }
            }
            GeoJson::Feature(feature) => self.add_geojson_feature(feature, &styles, &mut report),
            GeoJson::Geometry(geometry) => {
                self.add_geometry(geometry, &Properties::new(), &styles, &mut report)
            }
        }
        report
    }

    fn add_geojson_feature(
        &mut self,
        feature: &GeoJsonFeature,
        styles: &StyleSet,
        report: &mut IngestReport,
    ) {
        let Some(geometry) = &feature.geometry else {
            log::debug!("GeoJSON feature without geometry ignored");
            return;
        };
        let empty = Properties::new();
        let properties = feature.properties.as_ref().unwrap_or(&empty);
        self.add_geometry(geometry, properties, styles, report);
    }

    fn add_geometry(
        &mut self,
        geometry: &GeoJsonGeometry,
        properties: &Properties,
        styles: &StyleSet,
        report: &mut IngestReport,
    ) {
        match geometry {
            GeoJsonGeometry::Point { coordinates } => {
                record(report, self.push_geojson_point(coordinates, properties, styles))
            }
            GeoJsonGeometry::MultiPoint { coordinates } => {
                for position in coordinates {
                    record(report, self.push_geojson_point(position, properties, styles));
                }
            }
            GeoJsonGeometry::LineString { coordinates } => record(report, self.push_line(
                to_path(coordinates),
                properties.clone(),
                Arc::clone(&styles.line),
            )),
            GeoJsonGeometry::MultiLineString { coordinates } => {
                for line in coordinates {
                    record(report, self.push_line(
                        to_path(line),
                        properties.clone(),
                        Arc::clone(&styles.line),
                    ));
                }
            }
            GeoJsonGeometry::Polygon { coordinates } => record(report, self.push_polygon(
                coordinates.iter().map(|ring| to_path(ring)).collect(),
                properties.clone(),
                Arc::clone(&styles.polygon),
            )),
            GeoJsonGeometry::MultiPolygon { coordinates } => {
                for polygon in coordinates {
                    record(report, self.push_polygon(
                        polygon.iter().map(|ring| to_path(ring)).collect(),
                        properties.clone(),
                        Arc::clone(&styles.polygon),
                    ));
                }
            }
            GeoJsonGeometry::GeometryCollection { geometries } => {
                for geometry in geometries {
                    self.add_geometry(geometry, properties, styles, report);
                }
            }
        }
    }

    fn push_geojson_point(
        &mut self,
        position: &[f64],
        properties: &Properties,
        styles: &StyleSet,
    ) -> Result<(), crate::MapError> {
        let position = to_lat_lng(position).ok_or_else(|| {
            crate::MapError::InvalidFeature("point position needs [lng, lat]".to_string())
        })?;
        self.push_point(position, properties.clone(), Arc::clone(&styles.point));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "geometry": {"type": "Point", "coordinates": [-74.0, 40.71]},
                "properties": {"name": "NYC"}
            },
            {
                "type": "Feature",
                "geometry": {"type": "LineString", "coordinates": [[-74.0, 40.71], [-118.24, 34.05]]},
                "properties": {"route": "NYC to LA"}
            },
            {
                "type": "Feature",
                "geometry": {
                    "type": "MultiPolygon",
                    "coordinates": [
                        [[[0, 0], [10, 0], [10, 10], [0, 10], [0, 0]]],
                        [[[20, 20], [30, 20], [30, 30]]]
                    ]
                },
                "properties": {"zone": "Z"}
            },
            {"type": "Feature", "geometry": null, "properties": {}}
        ]
    }"#;

    #[test]
    fn test_parse_and_convert_collection() {
        let geojson: GeoJson = SAMPLE.parse().unwrap();
        let mut fc = FeatureCollection::new();
        let report = fc.add_geojson(&geojson, &GeoJsonStyles::default());

        assert_eq!(report.accepted, 4);
        assert_eq!(fc.points().len(), 1);
        assert_eq!(fc.lines().len(), 1);
        assert_eq!(fc.polygons().len(), 2);

        // positions are swapped into lat/lng order
        assert_eq!(fc.points()[0].position, LatLng::new(40.71, -74.0));
        assert_eq!(fc.points()[0].properties["name"], "NYC");
        assert_eq!(fc.polygons()[1].properties["zone"], "Z");
    }

    #[test]
    fn test_bare_geometry() {
        let geojson: GeoJson =
            r#"{"type": "MultiPoint", "coordinates": [[1, 2], [3, 4]]}"#.parse().unwrap();
        let mut fc = FeatureCollection::new();
        fc.add_geojson(&geojson, &GeoJsonStyles::default());
        assert_eq!(fc.points().len(), 2);
        assert!(fc.points()[0].properties.is_empty());
    }

    #[test]
    fn test_geometry_collection_recurses() {
        let geojson: GeoJson = r#"{
            "type": "Feature",
            "properties": {"id": 7},
            "geometry": {
                "type": "GeometryCollection",
                "geometries": [
                    {"type": "Point", "coordinates": [5, 5]},
                    {"type": "LineString", "coordinates": [[0, 0]]}
                ]
            }
        }"#
        .parse()
        .unwrap();
        let mut fc = FeatureCollection::new();
        let report = fc.add_geojson(&geojson, &GeoJsonStyles::default());
        assert_eq!(report.accepted, 1);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(fc.points()[0].properties["id"], 7);
    }

    #[test]
    fn test_invalid_document() {
        assert!("{\"type\": \"Nope\"}".parse::<GeoJson>().is_err());
    }
}
