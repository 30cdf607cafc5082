//! # geocanvas
//!
//! A small, self-contained map view engine for point, line and polygon data.
//!
//! Features are normalized once at construction; afterwards everything is
//! driven by input, resize and tile-load events. Each event mutates the view
//! state (or the tile cache) and requests a redraw, which composites the
//! optional raster basemap followed by polygons, lines and points onto any
//! [`rendering::DrawSurface`].

pub mod core;
pub mod data;
pub mod input;
pub mod prelude;
pub mod rendering;
pub mod spatial;
pub mod tiles;
pub mod ui;
pub use crate::core::constants;

// Re-export public API
pub use core::{
    config::MapOptions,
    control::MapControl,
    geo::{GeoBounds, LatLng, Point, TileCoord},
    map::MapEngine,
    viewport::Viewport,
};

pub use data::{
    features::{FeatureCollection, LineFeature, PointFeature, PolygonFeature},
    geojson::GeoJson,
    style::{Color, LineStyle, PointStyle, PolygonStyle, TooltipSpec},
};

pub use input::{events::InputEvent, gestures::ViewportController};

pub use rendering::{context::RenderContext, surface::DrawSurface};

pub use spatial::hit_test::{FeatureRef, HitTester};

pub use tiles::{compositor::TileCompositor, loader::TileFetcher};

pub use ui::tooltip::Tooltip;

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[cfg(feature = "render")]
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Invalid style: {0}")]
    InvalidStyle(String),

    #[error("Invalid feature: {0}")]
    InvalidFeature(String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Error type alias for convenience
pub type Error = MapError;
