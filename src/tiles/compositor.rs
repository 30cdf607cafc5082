//! Raster basemap compositing.
//!
//! Tile imagery is discrete (integer zoom levels) while the view zoom is
//! continuous. Tiles are therefore picked at `floor(zoom)` and drawn scaled
//! by `2^(zoom - floor(zoom))`.

use crate::core::{
    constants::{TILE_MARGIN, TILE_SIZE},
    geo::{Point, TileCoord},
    viewport::Viewport,
};
use crate::rendering::surface::DrawSurface;
use crate::tiles::{
    cache::TileCache,
    loader::{TileCompletion, TileFetcher, TileRequest, TileResponse},
    source::TileSource,
};
use crate::Result;
use crossbeam_channel::{unbounded, Receiver, Sender};

/// Where a visible tile lands on the surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TilePlacement {
    pub coord: TileCoord,
    /// Top-left corner in surface pixels
    pub min: Point,
    /// Edge length in surface pixels
    pub size: f64,
}

/// Computes the tiles covering `viewport` plus one tile of margin on each side.
///
/// Indices outside `[0, 2^z)` are skipped. Non-finite zoom or size yields
/// no tiles.
pub fn visible_tiles(viewport: &Viewport) -> Vec<TilePlacement> {
    let zoom = viewport.zoom;
    if !zoom.is_finite() || !viewport.size.x.is_finite() || !viewport.size.y.is_finite() {
        return Vec::new();
    }

    let tile_zoom = zoom.floor().clamp(0.0, f64::from(u8::MAX));
    let z = tile_zoom as u8;
    let fractional_scale = 2_f64.powf(zoom - tile_zoom);
    let scaled_tile_size = TILE_SIZE * fractional_scale;

    let center = viewport.center_world();
    if !center.x.is_finite() || !center.y.is_finite() {
        return Vec::new();
    }
    let center_tile_x = center.x / scaled_tile_size;
    let center_tile_y = center.y / scaled_tile_size;
    let half_w = viewport.size.x / 2.0 / scaled_tile_size;
    let half_h = viewport.size.y / 2.0 / scaled_tile_size;

    let last = TileCoord::tiles_per_axis(z).saturating_sub(1) as i64;
    // Float-to-int casts saturate, so out-of-range values collapse onto the clamp
    let start_x = ((center_tile_x - half_w - TILE_MARGIN).floor() as i64).max(0);
    let start_y = ((center_tile_y - half_h - TILE_MARGIN).floor() as i64).max(0);
    let end_x = ((center_tile_x + half_w + TILE_MARGIN).ceil() as i64).min(last);
    let end_y = ((center_tile_y + half_h + TILE_MARGIN).ceil() as i64).min(last);

    let mut tiles = Vec::new();
    for x in start_x..=end_x {
        for y in start_y..=end_y {
            let min = Point::new(
                x as f64 * scaled_tile_size - center.x + viewport.size.x / 2.0,
                y as f64 * scaled_tile_size - center.y + viewport.size.y / 2.0,
            );
            tiles.push(TilePlacement {
                coord: TileCoord::new(x as u32, y as u32, z),
                min,
                size: scaled_tile_size,
            });
        }
    }
    tiles
}

/// Draws the basemap and keeps its tile cache fed
pub struct TileCompositor {
    source: Box<dyn TileSource>,
    fetcher: Box<dyn TileFetcher>,
    cache: TileCache,
    tx: Sender<TileResponse>,
    rx: Receiver<TileResponse>,
    fetches: usize,
}

impl TileCompositor {
    pub fn new<S>(source: S, fetcher: Box<dyn TileFetcher>, capacity: Option<usize>) -> Self
    where
        S: TileSource + 'static,
    {
        let (tx, rx) = unbounded();
        Self {
            source: Box::new(source),
            fetcher,
            cache: TileCache::new(capacity),
            tx,
            rx,
            fetches: 0,
        }
    }

    pub fn cache(&self) -> &TileCache {
        &self.cache
    }

    /// Number of fetches issued so far
    pub fn fetch_count(&self) -> usize {
        self.fetches
    }

    /// Tiles visible in `viewport`; see [`visible_tiles`]
    pub fn visible_tiles(&self, viewport: &Viewport) -> Vec<TilePlacement> {
        visible_tiles(viewport)
    }

    /// Draws every loaded visible tile and starts fetches for unseen ones.
    ///
    /// Returns the number of tiles drawn. Pending and failed tiles leave
    /// their region untouched. A bounded cache grows to the visible set so a
    /// frame never evicts its own tiles.
    pub fn composite(&mut self, viewport: &Viewport, surface: &mut dyn DrawSurface) -> Result<usize> {
        let visible = visible_tiles(viewport);
        self.cache.reserve(visible.len());

        let mut drawn = 0;
        for placement in visible {
            let coord = placement.coord;
            match self.cache.touch(&coord) {
                Some(state) => {
                    if let Some(image) = state.drawable() {
                        surface.draw_tile(coord, image, placement.min, placement.size)?;
                        drawn += 1;
                    }
                }
                None => self.request(coord),
            }
        }
        Ok(drawn)
    }

    fn request(&mut self, coord: TileCoord) {
        self.cache.insert_pending(coord);
        self.fetches += 1;
        let request = TileRequest {
            coord,
            url: self.source.url(coord),
        };
        log::debug!("Requesting tile {}", request.url);
        self.fetcher
            .fetch(request, TileCompletion::new(coord, self.tx.clone()));
    }

    /// Applies every completion received since the last call.
    ///
    /// Returns how many were applied to live cache entries; completions for
    /// evicted tiles are dropped.
    pub fn drain_completions(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(response) = self.rx.try_recv() {
            let image = match response.result {
                Ok(image) => Some(image),
                Err(e) => {
                    log::warn!("Tile {} failed to load: {}", response.coord, e);
                    None
                }
            };
            if self.cache.complete(response.coord, image) {
                applied += 1;
            }
        }
        applied
    }
}

impl std::fmt::Debug for TileCompositor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TileCompositor")
            .field("cache", &self.cache)
            .field("fetches", &self.fetches)
            .finish()
    }
}
