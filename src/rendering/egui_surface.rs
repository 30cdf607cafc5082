//! [`DrawSurface`] on top of an [`egui::Painter`].
//!
//! Surface coordinates are relative to the map rect; `origin` is that rect's
//! top-left corner in screen space. egui only tessellates convex fills, so
//! polygon interiors are rasterized into one-pixel scanline spans instead.

use crate::core::geo::{Point, TileCoord};
use crate::data::style::Color;
use crate::rendering::surface::{DrawSurface, FillPaint, FillRule, Path, StrokePaint, TextStyle};
use crate::spatial::geometry::scanline_spans;
use crate::tiles::loader::TileImage;
use crate::Result;
use egui::{Align2, Color32, ColorImage, FontId, Pos2, Rect, Shape, Stroke, TextureHandle, TextureOptions, Vec2};
use fxhash::{FxHashMap, FxHashSet};
use std::sync::Arc;

/// GPU textures for tile images, kept across frames.
///
/// A texture survives as long as its tile was drawn in the previous frame.
#[derive(Default)]
pub struct TileTextures {
    textures: FxHashMap<TileCoord, (Arc<Vec<u8>>, TextureHandle)>,
    used: FxHashSet<TileCoord>,
}

impl TileTextures {
    pub fn new() -> Self {
        Self::default()
    }

    fn texture_for(&mut self, ctx: &egui::Context, coord: TileCoord, image: &TileImage) -> egui::TextureId {
        self.used.insert(coord);
        if let Some((pixels, handle)) = self.textures.get(&coord) {
            if Arc::ptr_eq(pixels, &image.pixels) {
                return handle.id();
            }
        }
        let color_image = ColorImage::from_rgba_unmultiplied(
            [image.width as usize, image.height as usize],
            &image.pixels,
        );
        let handle = ctx.load_texture(format!("tile_{}", coord), color_image, TextureOptions::LINEAR);
        let id = handle.id();
        self.textures.insert(coord, (image.pixels.clone(), handle));
        id
    }

    /// Drops textures of tiles that were not drawn since the last call
    pub fn end_frame(&mut self) {
        let used = std::mem::take(&mut self.used);
        self.textures.retain(|coord, _| used.contains(coord));
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}

/// Paints draw calls into an egui painter
pub struct EguiSurface<'a> {
    painter: &'a egui::Painter,
    textures: &'a mut TileTextures,
    origin: Pos2,
}

impl<'a> EguiSurface<'a> {
    /// Surface covering the painter's clip rect
    pub fn new(painter: &'a egui::Painter, textures: &'a mut TileTextures) -> Self {
        let origin = painter.clip_rect().min;
        Self {
            painter,
            textures,
            origin,
        }
    }

    fn pos(&self, p: &Point) -> Pos2 {
        self.origin + Vec2::new(p.x as f32, p.y as f32)
    }

    fn screen_points(&self, points: &[Point]) -> Vec<Pos2> {
        points.iter().map(|p| self.pos(p)).collect()
    }
}

fn color32(color: Color, alpha: u8) -> Color32 {
    Color32::from_rgba_unmultiplied(color.r, color.g, color.b, alpha)
}

fn stroke(paint: &StrokePaint) -> Stroke {
    Stroke::new(paint.width, color32(paint.color, paint.alpha()))
}

impl DrawSurface for EguiSurface<'_> {
    fn clear(&mut self, size: Point, background: Color) -> Result<()> {
        let rect = Rect::from_min_size(self.origin, Vec2::new(size.x as f32, size.y as f32));
        self.painter.rect_filled(rect, 0.0, color32(background, background.a));
        Ok(())
    }

    fn draw_tile(&mut self, coord: TileCoord, image: &TileImage, min: Point, size: f64) -> Result<()> {
        if image.is_degenerate() {
            return Err(format!("Degenerate image for tile {}", coord).into());
        }
        let texture = self.textures.texture_for(self.painter.ctx(), coord, image);
        let rect = Rect::from_min_size(self.pos(&min), Vec2::splat(size as f32));
        self.painter.image(
            texture,
            rect,
            Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0)),
            Color32::WHITE,
        );
        Ok(())
    }

    fn draw_circle(
        &mut self,
        center: Point,
        radius: f32,
        fill: &FillPaint,
        stroke_paint: Option<&StrokePaint>,
    ) -> Result<()> {
        let outline = stroke_paint.map(stroke).unwrap_or(Stroke::NONE);
        self.painter.circle(
            self.pos(&center),
            radius,
            color32(fill.color, fill.alpha()),
            outline,
        );
        Ok(())
    }

    fn fill_path(&mut self, path: &Path, fill: &FillPaint, rule: FillRule) -> Result<()> {
        let edges: Vec<(Point, Point)> = path.segments().collect();
        let (min_y, max_y) = edges
            .iter()
            .flat_map(|(a, b)| [a.y, b.y])
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), y| (lo.min(y), hi.max(y)));
        if !min_y.is_finite() || !max_y.is_finite() {
            return Ok(());
        }

        // Only rows inside the clip rect are worth rasterizing
        let clip = self.painter.clip_rect();
        let first = min_y.max(f64::from(clip.min.y - self.origin.y)).floor() as i64;
        let last = max_y.min(f64::from(clip.max.y - self.origin.y)).ceil() as i64;
        let color = color32(fill.color, fill.alpha());

        let mut shapes = Vec::new();
        for row in first..last {
            let y = row as f64 + 0.5;
            for (x0, x1) in scanline_spans(&edges, y, rule) {
                let rect = Rect::from_min_max(
                    self.pos(&Point::new(x0, row as f64)),
                    self.pos(&Point::new(x1, row as f64 + 1.0)),
                );
                shapes.push(Shape::rect_filled(rect, 0.0, color));
            }
        }
        self.painter.extend(shapes);
        Ok(())
    }

    fn stroke_path(&mut self, path: &Path, paint: &StrokePaint) -> Result<()> {
        let line = stroke(paint);
        for sub in &path.subpaths {
            let mut points = self.screen_points(&sub.points);
            if points.len() < 2 {
                continue;
            }
            if paint.dash.is_empty() {
                let shape = if sub.closed {
                    Shape::closed_line(points, line)
                } else {
                    Shape::line(points, line)
                };
                self.painter.add(shape);
            } else {
                if sub.closed {
                    points.push(points[0]);
                }
                let dashes: Vec<f32> = paint.dash.iter().step_by(2).copied().collect();
                let gaps: Vec<f32> = paint.dash.iter().skip(1).step_by(2).copied().collect();
                self.painter
                    .extend(Shape::dashed_line_with_offset(&points, line, &dashes, &gaps, 0.0));
            }
        }
        Ok(())
    }

    fn draw_text(&mut self, text: &str, position: Point, style: &TextStyle) -> Result<()> {
        self.painter.text(
            self.pos(&position),
            Align2::CENTER_BOTTOM,
            text,
            FontId::proportional(style.font_size),
            color32(style.color, style.color.a),
        );
        Ok(())
    }
}
