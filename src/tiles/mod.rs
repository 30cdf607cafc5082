pub mod cache;
pub mod compositor;
pub mod loader;
pub mod source;

// Re-exports for convenience
pub use compositor::TileCompositor;
pub use loader::{TileFetcher, TileImage};
pub use source::{TileSource, UrlTemplate};
