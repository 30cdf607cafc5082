use crate::{
    core::geo::{Point, TileCoord},
    data::style::Color,
    rendering::surface::{DrawSurface, FillPaint, FillRule, Path, StrokePaint, TextStyle},
    tiles::loader::TileImage,
    Result,
};

/// Recording rendering context.
///
/// Stores every call as a [`DrawCommand`] instead of rasterizing. Headless
/// hosts and tests inspect the queue to see what a frame would draw.
#[derive(Debug, Default)]
pub struct RenderContext {
    /// Drawing primitives of the current frame, in call order
    pub drawing_queue: Vec<DrawCommand>,
    /// Number of frames started with [`DrawSurface::clear`]
    pub frames: usize,
}

/// Commands that can be issued to the render context
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear {
        size: Point,
        background: Color,
    },
    Tile {
        coord: TileCoord,
        min: Point,
        size: f64,
    },
    Circle {
        center: Point,
        radius: f32,
        fill: FillPaint,
        stroke: Option<StrokePaint>,
    },
    FillPath {
        path: Path,
        fill: FillPaint,
        rule: FillRule,
    },
    StrokePath {
        path: Path,
        stroke: StrokePaint,
    },
    Text {
        text: String,
        position: Point,
        style: TextStyle,
    },
}

impl DrawCommand {
    /// Short name of the command kind
    pub fn kind(&self) -> &'static str {
        match self {
            DrawCommand::Clear { .. } => "clear",
            DrawCommand::Tile { .. } => "tile",
            DrawCommand::Circle { .. } => "circle",
            DrawCommand::FillPath { .. } => "fill",
            DrawCommand::StrokePath { .. } => "stroke",
            DrawCommand::Text { .. } => "text",
        }
    }
}

impl RenderContext {
    /// Create a new render context
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.drawing_queue
    }

    /// Command kinds in call order, with consecutive repeats collapsed
    pub fn kind_sequence(&self) -> Vec<&'static str> {
        let mut kinds: Vec<&'static str> = Vec::new();
        for command in &self.drawing_queue {
            let kind = command.kind();
            if kinds.last() != Some(&kind) {
                kinds.push(kind);
            }
        }
        kinds
    }
}

impl DrawSurface for RenderContext {
    fn clear(&mut self, size: Point, background: Color) -> Result<()> {
        self.drawing_queue.clear();
        self.frames += 1;
        self.drawing_queue.push(DrawCommand::Clear { size, background });
        Ok(())
    }

    fn draw_tile(&mut self, coord: TileCoord, image: &TileImage, min: Point, size: f64) -> Result<()> {
        if image.is_degenerate() {
            return Err(format!("Degenerate image for tile {}", coord).into());
        }
        self.drawing_queue.push(DrawCommand::Tile { coord, min, size });
        Ok(())
    }

    fn draw_circle(
        &mut self,
        center: Point,
        radius: f32,
        fill: &FillPaint,
        stroke: Option<&StrokePaint>,
    ) -> Result<()> {
        self.drawing_queue.push(DrawCommand::Circle {
            center,
            radius,
            fill: fill.clone(),
            stroke: stroke.cloned(),
        });
        Ok(())
    }

    fn fill_path(&mut self, path: &Path, fill: &FillPaint, rule: FillRule) -> Result<()> {
        self.drawing_queue.push(DrawCommand::FillPath {
            path: path.clone(),
            fill: fill.clone(),
            rule,
        });
        Ok(())
    }

    fn stroke_path(&mut self, path: &Path, stroke: &StrokePaint) -> Result<()> {
        self.drawing_queue.push(DrawCommand::StrokePath {
            path: path.clone(),
            stroke: stroke.clone(),
        });
        Ok(())
    }

    fn draw_text(&mut self, text: &str, position: Point, style: &TextStyle) -> Result<()> {
        self.drawing_queue.push(DrawCommand::Text {
            text: text.to_string(),
            position,
            style: style.clone(),
        });
        Ok(())
    }
}
