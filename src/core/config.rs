//! View and engine options.
//!
//! Options are plain serde records so hosts can load them from JSON next to
//! the data they display. Everything is optional; missing values resolve
//! against the data bounds when the engine is built.

use crate::core::{
    constants::MIN_TILE_CACHE_CAPACITY,
    geo::{GeoBounds, LatLng},
};
use crate::data::style::Color;
use serde::{Deserialize, Serialize};

/// Options applied when an engine is constructed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapOptions {
    /// Window or page title used by hosts
    pub title: String,
    /// Initial center; defaults to the centroid of the data bounds
    pub center: Option<LatLng>,
    /// Initial zoom; defaults to a zoom derived from the data bounds
    pub zoom: Option<f64>,
    /// Color the surface is cleared with before each frame
    pub background_color: Color,
    /// Raster basemap template containing `{z}`, `{x}` and `{y}`
    pub tile_url: Option<String>,
    /// Attribution text shown by hosts next to the basemap
    pub attribution: String,
    /// Maximum number of cached tiles; `None` (the default) keeps every tile
    /// for the session so each tile is fetched at most once
    pub tile_cache_capacity: Option<usize>,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            title: "Map Export".to_string(),
            center: None,
            zoom: None,
            background_color: Color::rgb(0xf0, 0xf0, 0xf0),
            tile_url: None,
            attribution: String::new(),
            tile_cache_capacity: None,
        }
    }
}

impl MapOptions {
    pub fn with_center(mut self, center: LatLng) -> Self {
        self.center = Some(center);
        self
    }

    pub fn with_zoom(mut self, zoom: f64) -> Self {
        self.zoom = Some(zoom);
        self
    }

    pub fn with_tile_url(mut self, url: impl Into<String>) -> Self {
        self.tile_url = Some(url.into());
        self
    }

    pub fn with_background(mut self, color: Color) -> Self {
        self.background_color = color;
        self
    }

    pub fn with_tile_cache_capacity(mut self, capacity: Option<usize>) -> Self {
        self.tile_cache_capacity = capacity;
        self
    }

    /// Resolves the initial center and zoom against the data bounds.
    ///
    /// Without data the bounds collapse to (0, 0), which yields the
    /// single-location zoom.
    pub fn initial_view(&self, bounds: Option<GeoBounds>) -> (LatLng, f64) {
        let bounds = bounds.unwrap_or_else(|| GeoBounds::from_point(0.0, 0.0));
        let center = self.center.unwrap_or_else(|| bounds.center());
        let zoom = self.zoom.unwrap_or_else(|| auto_zoom(&bounds));
        (center, zoom)
    }

    /// Tile cache capacity with the minimum applied
    pub fn effective_cache_capacity(&self) -> Option<usize> {
        self.tile_cache_capacity
            .map(|capacity| capacity.max(MIN_TILE_CACHE_CAPACITY))
    }
}

/// Zoom level that frames `bounds`, stepped on the larger of the two spans
pub fn auto_zoom(bounds: &GeoBounds) -> f64 {
    let span = bounds.max_span();
    let zoom = if span == 0.0 {
        15
    } else if span < 0.01 {
        16
    } else if span < 0.05 {
        14
    } else if span < 0.1 {
        13
    } else if span < 0.5 {
        11
    } else if span < 1.0 {
        10
    } else if span < 5.0 {
        8
    } else if span < 10.0 {
        6
    } else if span < 50.0 {
        4
    } else {
        2
    };
    f64::from(zoom)
}
