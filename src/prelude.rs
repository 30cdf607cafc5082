//! Prelude module for common geocanvas types and traits
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use geocanvas::prelude::*;`

pub use crate::core::{
    config::{auto_zoom, MapOptions},
    control::MapControl,
    geo::{GeoBounds, LatLng, Point, TileCoord},
    map::MapEngine,
    viewport::Viewport,
};

pub use crate::data::{
    features::{FeatureCollection, IngestReport, LineFeature, PointFeature, PolygonFeature},
    geojson::{GeoJson, GeoJsonStyles},
    style::{Color, LineStyle, PointStyle, PolygonStyle, TooltipSpec},
};

pub use crate::input::{
    events::{InputEvent, TouchEventType, TouchPoint},
    gestures::{GestureState, ViewportController},
};

pub use crate::rendering::{
    context::{DrawCommand, RenderContext},
    surface::{DrawSurface, FillPaint, FillRule, Path, StrokePaint, TextStyle},
};

#[cfg(feature = "egui")]
pub use crate::rendering::egui_surface::{EguiSurface, TileTextures};

pub use crate::spatial::hit_test::{FeatureRef, HitTester};

pub use crate::tiles::{
    cache::{TileCache, TileState},
    compositor::{TileCompositor, TilePlacement},
    loader::{TileCompletion, TileFetcher, TileImage, TileRequest},
    source::{TileSource, UrlTemplate},
};

#[cfg(all(feature = "tokio-runtime", feature = "render"))]
pub use crate::tiles::loader::HttpTileFetcher;

pub use crate::ui::tooltip::{Tooltip, TooltipContent, TooltipRow};

pub use crate::{Error as MapError, Result};
