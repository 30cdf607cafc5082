use crate::core::{
    constants::{MAX_ZOOM, MIN_ZOOM},
    geo::{LatLng, Point},
    projection,
};
use serde::{Deserialize, Serialize};

/// Current view of the map: center, zoom and viewport size in pixels.
///
/// This is the only state that changes while the map is being used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// The center of the map view in geographical coordinates
    pub center: LatLng,
    /// The current zoom level
    pub zoom: f64,
    /// The size of the viewport in pixels
    pub size: Point,
}

impl Viewport {
    /// Creates a new viewport, clamping zoom and center to their valid ranges
    pub fn new(center: LatLng, zoom: f64, size: Point) -> Self {
        Self {
            center: center.as_view_center(),
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
            size,
        }
    }

    /// Sets the center, clamping latitude and wrapping longitude
    pub fn set_center(&mut self, center: LatLng) {
        self.center = center.as_view_center();
    }

    /// Sets the zoom level, clamping to the valid range
    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
    }

    /// Sets the viewport size
    pub fn set_size(&mut self, size: Point) {
        self.size = size;
    }

    /// Width of the world in pixels at the current zoom
    pub fn world_size(&self) -> f64 {
        projection::world_size(self.zoom)
    }

    /// World-pixel position of the view center at the current zoom
    pub fn center_world(&self) -> Point {
        projection::project(&self.center, self.zoom)
    }

    /// Converts a geographical coordinate to viewport pixel coordinates
    pub fn lat_lng_to_pixel(&self, lat_lng: &LatLng) -> Point {
        projection::geo_to_pixel(lat_lng, self)
    }

    /// Converts viewport pixel coordinates back to geographical coordinates
    pub fn pixel_to_lat_lng(&self, pixel: &Point) -> LatLng {
        projection::pixel_to_geo(pixel, self)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(LatLng::new(0.0, 0.0), MIN_ZOOM, Point::new(800.0, 600.0))
    }
}
