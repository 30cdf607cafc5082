use crate::core::constants::MAX_CENTER_LATITUDE;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Represents a geographical coordinate with latitude and longitude
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    /// Creates a new LatLng coordinate
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Validates that the coordinates are within valid ranges
    pub fn is_valid(&self) -> bool {
        self.lat >= -90.0 && self.lat <= 90.0 && self.lng >= -180.0 && self.lng <= 180.0
    }

    /// Wraps longitude into the half-open range (-180, 180].
    ///
    /// Non-finite input is passed through unchanged.
    pub fn wrap_lng(lng: f64) -> f64 {
        if !lng.is_finite() {
            return lng;
        }
        let wrapped = (lng + 180.0).rem_euclid(360.0) - 180.0;
        if wrapped <= -180.0 {
            wrapped + 360.0
        } else {
            wrapped
        }
    }

    /// Clamps latitude to the range the view center may occupy
    pub fn clamp_lat(lat: f64) -> f64 {
        lat.clamp(-MAX_CENTER_LATITUDE, MAX_CENTER_LATITUDE)
    }

    /// Returns a copy usable as a view center: latitude clamped, longitude wrapped
    pub fn as_view_center(&self) -> LatLng {
        LatLng::new(Self::clamp_lat(self.lat), Self::wrap_lng(self.lng))
    }
}

impl Default for LatLng {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// Represents a point in screen or world-pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn add(&self, other: &Point) -> Point {
        Point::new(self.x + other.x, self.y + other.y)
    }

    pub fn subtract(&self, other: &Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }

    pub fn multiply(&self, scalar: f64) -> Point {
        Point::new(self.x * scalar, self.y * scalar)
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

impl Default for Point {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// Running aggregate of every ingested coordinate.
///
/// Bounds only ever widen; there is no way to shrink them short of
/// discarding the aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl GeoBounds {
    /// Creates degenerate bounds around a single coordinate
    pub fn from_point(lat: f64, lng: f64) -> Self {
        Self {
            min_lat: lat,
            max_lat: lat,
            min_lng: lng,
            max_lng: lng,
        }
    }

    /// Widens the bounds to include a coordinate
    pub fn extend(&mut self, lat: f64, lng: f64) {
        self.min_lat = self.min_lat.min(lat);
        self.max_lat = self.max_lat.max(lat);
        self.min_lng = self.min_lng.min(lng);
        self.max_lng = self.max_lng.max(lng);
    }

    /// Widens an optional aggregate, creating it on the first coordinate
    pub fn accumulate(bounds: &mut Option<GeoBounds>, lat: f64, lng: f64) {
        match bounds {
            Some(b) => b.extend(lat, lng),
            None => *bounds = Some(GeoBounds::from_point(lat, lng)),
        }
    }

    /// Gets the centroid of the bounds
    pub fn center(&self) -> LatLng {
        LatLng::new(
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lng + self.max_lng) / 2.0,
        )
    }

    /// Largest of the latitude and longitude spans, in degrees
    pub fn max_span(&self) -> f64 {
        (self.max_lat - self.min_lat).max(self.max_lng - self.min_lng)
    }

    /// Checks if the bounds contain a coordinate
    pub fn contains(&self, point: &LatLng) -> bool {
        point.lat >= self.min_lat
            && point.lat <= self.max_lat
            && point.lng >= self.min_lng
            && point.lng <= self.max_lng
    }
}

/// Represents a tile address in the slippy map tile system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileCoord {
    pub x: u32,
    pub y: u32,
    pub z: u8,
}

impl TileCoord {
    pub fn new(x: u32, y: u32, z: u8) -> Self {
        Self { x, y, z }
    }

    /// Number of tiles along each axis at this tile's zoom level
    pub fn tiles_per_axis(z: u8) -> u64 {
        1u64 << z.min(63)
    }

    /// Checks if the tile is valid for its zoom level
    pub fn is_valid(&self) -> bool {
        let max_coord = Self::tiles_per_axis(self.z);
        u64::from(self.x) < max_coord && u64::from(self.y) < max_coord
    }

    /// Cache key in `z/x/y` form
    pub fn key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.z, self.x, self.y)
    }
}
