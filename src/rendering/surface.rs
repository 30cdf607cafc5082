//! The drawing-surface abstraction.
//!
//! Renderers never talk to a graphics backend directly; they emit calls on a
//! [`DrawSurface`]. A recording implementation lives in
//! [`crate::rendering::context`], an egui one behind the `egui` feature.

use crate::core::geo::{Point, TileCoord};
use crate::data::style::Color;
use crate::tiles::loader::TileImage;
use crate::Result;

/// One connected run of vertices
#[derive(Debug, Clone, PartialEq)]
pub struct SubPath {
    pub points: Vec<Point>,
    /// Whether the last vertex connects back to the first
    pub closed: bool,
}

/// A possibly compound path made of several sub-paths
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    pub subpaths: Vec<SubPath>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    /// Single open poly-line
    pub fn polyline(points: Vec<Point>) -> Self {
        Self {
            subpaths: vec![SubPath {
                points,
                closed: false,
            }],
        }
    }

    /// Appends a closed ring
    pub fn push_ring(&mut self, points: Vec<Point>) {
        self.subpaths.push(SubPath {
            points,
            closed: true,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.subpaths.iter().all(|s| s.points.is_empty())
    }

    /// Every segment of the path, closing segments included
    pub fn segments(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        self.subpaths.iter().flat_map(|sub| {
            let open = sub.points.windows(2).map(|w| (w[0], w[1]));
            let closing = match (sub.closed, sub.points.first(), sub.points.last()) {
                (true, Some(first), Some(last)) if sub.points.len() > 2 => Some((*last, *first)),
                _ => None,
            };
            open.chain(closing)
        })
    }
}

/// How a path interior is decided
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillRule {
    NonZero,
    /// Inside when a ray crosses the path an odd number of times
    EvenOdd,
}

/// Fill color and opacity
#[derive(Debug, Clone, PartialEq)]
pub struct FillPaint {
    pub color: Color,
    pub opacity: f32,
}

impl FillPaint {
    pub fn new(color: Color, opacity: f32) -> Self {
        Self { color, opacity }
    }

    /// Final alpha in 0..=255
    pub fn alpha(&self) -> u8 {
        self.color.alpha_with(self.opacity)
    }
}

/// Stroke settings; joins and caps are round
#[derive(Debug, Clone, PartialEq)]
pub struct StrokePaint {
    pub color: Color,
    pub width: f32,
    pub opacity: f32,
    /// Alternating dash and gap lengths; empty for a solid line
    pub dash: Vec<f32>,
}

impl StrokePaint {
    pub fn solid(color: Color, width: f32, opacity: f32) -> Self {
        Self {
            color,
            width,
            opacity,
            dash: Vec::new(),
        }
    }

    pub fn with_dash(mut self, dash: Vec<f32>) -> Self {
        self.dash = dash;
        self
    }

    pub fn alpha(&self) -> u8 {
        self.color.alpha_with(self.opacity)
    }
}

/// Text is drawn horizontally centered with its baseline at the anchor
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub color: Color,
    pub font_size: f32,
}

/// Target of every draw call made during a frame
pub trait DrawSurface {
    /// Starts a frame by filling the whole surface
    fn clear(&mut self, size: Point, background: Color) -> Result<()>;

    /// Draws a tile image stretched over the square at `min` with edge `size`
    fn draw_tile(&mut self, coord: TileCoord, image: &TileImage, min: Point, size: f64) -> Result<()>;

    fn draw_circle(
        &mut self,
        center: Point,
        radius: f32,
        fill: &FillPaint,
        stroke: Option<&StrokePaint>,
    ) -> Result<()>;

    fn fill_path(&mut self, path: &Path, fill: &FillPaint, rule: FillRule) -> Result<()>;

    fn stroke_path(&mut self, path: &Path, stroke: &StrokePaint) -> Result<()>;

    fn draw_text(&mut self, text: &str, position: Point, style: &TextStyle) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segments_close_rings() {
        let mut path = Path::new();
        path.push_ring(vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 1.0),
        ]);
        assert_eq!(path.segments().count(), 3);

        let line = Path::polyline(vec![Point::new(0.0, 0.0), Point::new(2.0, 2.0)]);
        assert_eq!(line.segments().count(), 1);
        assert!(Path::new().is_empty());
    }
}
