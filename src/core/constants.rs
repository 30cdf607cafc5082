//! Engine-wide constants. Most of them mirror common web-map conventions;
//! keeping them in a single place makes it easier to tweak magic numbers.

/// Square raster tile size in pixels.
pub const TILE_SIZE: f64 = 256.0;

/// Lowest zoom level the view may reach.
pub const MIN_ZOOM: f64 = 1.0;

/// Highest zoom level the view may reach.
pub const MAX_ZOOM: f64 = 20.0;

/// Absolute latitude bound for the view center.
pub const MAX_CENTER_LATITUDE: f64 = 85.0;

/// Zoom change applied per wheel event.
pub const WHEEL_ZOOM_STEP: f64 = 0.5;

/// Zoom change applied by the zoom-in / zoom-out controls.
pub const BUTTON_ZOOM_STEP: f64 = 1.0;

/// Extra tiles requested around the viewport on each side.
pub const TILE_MARGIN: f64 = 1.0;

/// Smallest capacity accepted for a bounded tile cache.
pub const MIN_TILE_CACHE_CAPACITY: usize = 64;

/// Slack (px) added to a marker radius when hit testing points.
pub const POINT_HIT_SLOP: f64 = 3.0;

/// Slack (px) added to half the stroke width when hit testing lines.
pub const LINE_HIT_SLOP: f64 = 5.0;

/// Gap (px) between a point marker and its label baseline.
pub const LABEL_OFFSET: f64 = 5.0;

/// Label font size in pixels.
pub const LABEL_FONT_SIZE: f32 = 12.0;

/// Offset (px) of the tooltip box from the cursor.
pub const TOOLTIP_OFFSET: f64 = 15.0;

/// Margin (px) kept between the tooltip box and the container's far edges.
pub const TOOLTIP_EDGE_MARGIN: f64 = 10.0;

/// Minimum inset (px) of the tooltip box from the container's near edges.
pub const TOOLTIP_MIN_INSET: f64 = 5.0;
