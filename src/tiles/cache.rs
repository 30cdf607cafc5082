use crate::core::geo::TileCoord;
use crate::tiles::loader::TileImage;
use fxhash::FxBuildHasher;
use lru::LruCache;
use std::num::NonZeroUsize;

/// Load state of a cached tile
#[derive(Debug, Clone, PartialEq)]
pub enum TileState {
    /// Fetch issued, no completion yet
    Pending,
    /// Image decoded and ready to draw
    Loaded(TileImage),
    /// Fetch or decode failed; the region stays blank for the session
    Failed,
}

impl TileState {
    /// Image to draw, if loaded and non-degenerate
    pub fn drawable(&self) -> Option<&TileImage> {
        match self {
            TileState::Loaded(image) if !image.is_degenerate() => Some(image),
            _ => None,
        }
    }
}

/// Tile cache keyed by tile address with least-recently-drawn eviction.
///
/// Entries are created the first time a tile becomes visible and promoted
/// every time it is drawn. An unbounded cache never evicts.
pub struct TileCache {
    entries: LruCache<TileCoord, TileState, FxBuildHasher>,
}

impl TileCache {
    /// Creates a cache holding at most `capacity` tiles, or unbounded for `None`
    pub fn new(capacity: Option<usize>) -> Self {
        let entries = match capacity.and_then(NonZeroUsize::new) {
            Some(cap) => LruCache::with_hasher(cap, FxBuildHasher::default()),
            None => LruCache::unbounded_with_hasher(FxBuildHasher::default()),
        };
        Self { entries }
    }

    /// Looks a tile up without touching its recency
    pub fn peek(&self, coord: &TileCoord) -> Option<&TileState> {
        self.entries.peek(coord)
    }

    /// Looks a tile up and marks it as most recently drawn
    pub fn touch(&mut self, coord: &TileCoord) -> Option<&TileState> {
        self.entries.get(coord)
    }

    pub fn contains(&self, coord: &TileCoord) -> bool {
        self.entries.contains(coord)
    }

    /// Creates a pending entry; returns the address evicted to make room
    pub fn insert_pending(&mut self, coord: TileCoord) -> Option<TileCoord> {
        match self.entries.push(coord, TileState::Pending) {
            Some((evicted, state)) if evicted != coord => {
                log::debug!("Evicted tile {} ({:?})", evicted, StateKind(&state));
                Some(evicted)
            }
            _ => None,
        }
    }

    /// Records a fetch outcome.
    ///
    /// Returns false when the tile was evicted while its fetch was in
    /// flight; the result is dropped in that case.
    pub fn complete(&mut self, coord: TileCoord, image: Option<TileImage>) -> bool {
        match self.entries.peek_mut(&coord) {
            Some(state) => {
                *state = match image {
                    Some(image) => TileState::Loaded(image),
                    None => TileState::Failed,
                };
                true
            }
            None => {
                log::debug!("Dropping completion for evicted tile {}", coord);
                false
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of tiles kept, `None` when unbounded
    pub fn capacity(&self) -> Option<usize> {
        let cap = self.entries.cap().get();
        (cap != usize::MAX).then_some(cap)
    }

    /// Grows a bounded cache so it can hold `count` tiles at once.
    ///
    /// Never shrinks; unbounded caches are left alone.
    pub fn reserve(&mut self, count: usize) {
        let Some(capacity) = self.capacity() else {
            return;
        };
        if let Some(grown) = NonZeroUsize::new(count).filter(|n| n.get() > capacity) {
            log::debug!("Growing tile cache from {} to {} entries", capacity, grown);
            self.entries.resize(grown);
        }
    }

    /// Number of tiles whose fetch has not completed yet
    pub fn pending(&self) -> usize {
        self.entries
            .iter()
            .filter(|(_, state)| matches!(state, TileState::Pending))
            .count()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl std::fmt::Debug for TileCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TileCache")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .finish()
    }
}

/// Logs a state without its pixel buffer
struct StateKind<'a>(&'a TileState);

impl std::fmt::Debug for StateKind<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            TileState::Pending => f.write_str("pending"),
            TileState::Loaded(_) => f.write_str("loaded"),
            TileState::Failed => f.write_str("failed"),
        }
    }
}
