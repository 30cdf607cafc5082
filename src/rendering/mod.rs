pub mod context;
#[cfg(feature = "egui")]
pub mod egui_surface;
pub mod features;
pub mod surface;

// Re-export main types
pub use context::{DrawCommand, RenderContext};
#[cfg(feature = "egui")]
pub use egui_surface::{EguiSurface, TileTextures};
pub use features::FeatureRenderer;
pub use surface::{DrawSurface, FillPaint, FillRule, Path, StrokePaint, TextStyle};
