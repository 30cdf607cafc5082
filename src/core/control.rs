use crate::core::{
    geo::{LatLng, Point},
    map::MapEngine,
};
use crate::data::features::FeatureCollection;

/// Scripting surface over a running engine.
///
/// Obtained from [`MapEngine::control`]. Mutators go through the same
/// clamping as interactive input and request a redraw when the view
/// actually changes.
pub struct MapControl<'a> {
    engine: &'a mut MapEngine,
}

impl<'a> MapControl<'a> {
    pub(crate) fn new(engine: &'a mut MapEngine) -> Self {
        Self { engine }
    }

    pub fn center(&self) -> LatLng {
        self.engine.viewport().center
    }

    pub fn set_center(&mut self, center: LatLng) -> &mut Self {
        if self.engine.controller.set_center(center) {
            self.engine.needs_redraw = true;
        }
        self
    }

    pub fn zoom(&self) -> f64 {
        self.engine.viewport().zoom
    }

    pub fn set_zoom(&mut self, zoom: f64) -> &mut Self {
        if self.engine.controller.set_zoom(zoom) {
            self.engine.needs_redraw = true;
        }
        self
    }

    /// Forces the next [`MapEngine::render_if_needed`] to draw
    pub fn request_redraw(&mut self) -> &mut Self {
        self.engine.needs_redraw = true;
        self
    }

    pub fn features(&self) -> &FeatureCollection {
        self.engine.features()
    }

    pub fn lat_lng_to_pixel(&self, lat_lng: &LatLng) -> Point {
        self.engine.viewport().lat_lng_to_pixel(lat_lng)
    }

    pub fn pixel_to_lat_lng(&self, pixel: &Point) -> LatLng {
        self.engine.viewport().pixel_to_lat_lng(pixel)
    }
}
