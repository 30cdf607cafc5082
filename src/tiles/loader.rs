//! Tile fetching.
//!
//! A [`TileFetcher`] receives one request per newly visible tile and reports
//! the outcome through a [`TileCompletion`]. Completions travel over a
//! channel and are applied to the cache on the engine thread, so fetchers
//! may run anywhere. There is no retry and no timeout: a failed tile stays
//! blank for the rest of the session.

use crate::core::geo::TileCoord;
use crate::Result;
use crossbeam_channel::Sender;
use std::sync::Arc;

/// Decoded RGBA tile image
#[derive(Debug, Clone, PartialEq)]
pub struct TileImage {
    pub width: u32,
    pub height: u32,
    /// Row-major RGBA8 pixels, unpremultiplied
    pub pixels: Arc<Vec<u8>>,
}

impl TileImage {
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        Self {
            width,
            height,
            pixels: Arc::new(pixels),
        }
    }

    /// True for images with no area or with a pixel buffer that does not match their size
    pub fn is_degenerate(&self) -> bool {
        let expected = u64::from(self.width) * u64::from(self.height) * 4;
        self.width == 0 || self.height == 0 || self.pixels.len() as u64 != expected
    }

    /// Decodes PNG/JPEG/... bytes into RGBA
    #[cfg(feature = "render")]
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let image = image::load_from_memory(bytes)
            .map_err(crate::MapError::from)?
            .to_rgba8();
        let (width, height) = image.dimensions();
        Ok(Self::from_rgba(width, height, image.into_raw()))
    }
}

/// One tile to fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileRequest {
    pub coord: TileCoord,
    pub url: String,
}

/// Outcome of a fetch as delivered to the engine
#[derive(Debug)]
pub struct TileResponse {
    pub coord: TileCoord,
    pub result: Result<TileImage>,
}

/// Single-use handle a fetcher resolves when its request finishes
#[derive(Debug)]
pub struct TileCompletion {
    coord: TileCoord,
    tx: Sender<TileResponse>,
}

impl TileCompletion {
    pub(crate) fn new(coord: TileCoord, tx: Sender<TileResponse>) -> Self {
        Self { coord, tx }
    }

    pub fn coord(&self) -> TileCoord {
        self.coord
    }

    pub fn succeed(self, image: TileImage) {
        self.finish(Ok(image));
    }

    pub fn fail(self, error: impl Into<Box<dyn std::error::Error + Send + Sync>>) {
        self.finish(Err(error.into()));
    }

    pub fn finish(self, result: Result<TileImage>) {
        // The receiver only goes away with the engine
        if self
            .tx
            .send(TileResponse {
                coord: self.coord,
                result,
            })
            .is_err()
        {
            log::debug!("Engine gone, discarding tile {}", self.coord);
        }
    }
}

/// Issues tile fetches
pub trait TileFetcher: Send {
    /// Starts fetching `request`; must eventually resolve `completion` or drop it
    fn fetch(&self, request: TileRequest, completion: TileCompletion);
}

/// Fetcher used when no HTTP backend is compiled in; every tile fails at once
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledFetcher;

impl TileFetcher for DisabledFetcher {
    fn fetch(&self, request: TileRequest, completion: TileCompletion) {
        completion.fail(format!(
            "no tile fetcher available for {}",
            request.url
        ));
    }
}

/// Fetcher the engine uses when the caller does not inject one
pub fn default_fetcher() -> Result<Box<dyn TileFetcher>> {
    #[cfg(all(feature = "tokio-runtime", feature = "render"))]
    {
        Ok(Box::new(HttpTileFetcher::new()?))
    }
    #[cfg(not(all(feature = "tokio-runtime", feature = "render")))]
    {
        log::warn!("Built without tokio-runtime/render; basemap tiles will stay blank");
        Ok(Box::new(DisabledFetcher))
    }
}

#[cfg(all(feature = "tokio-runtime", feature = "render"))]
pub use http::HttpTileFetcher;

#[cfg(all(feature = "tokio-runtime", feature = "render"))]
mod http {
    use super::*;
    use crate::MapError;
    use once_cell::sync::Lazy;

    /// Shared async HTTP client with a User-Agent so that public tile servers
    /// (e.g. OpenStreetMap) accept the request.
    pub(crate) static HTTP_CLIENT: Lazy<reqwest::Client> = Lazy::new(|| {
        reqwest::Client::builder()
            .user_agent(concat!("geocanvas/", env!("CARGO_PKG_VERSION")))
            .pool_max_idle_per_host(16)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new())
    });

    /// Downloads and decodes tiles on a private tokio runtime
    pub struct HttpTileFetcher {
        runtime: Option<tokio::runtime::Runtime>,
    }

    impl HttpTileFetcher {
        pub fn new() -> Result<Self> {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .worker_threads(2)
                .thread_name("geocanvas-tiles")
                .enable_all()
                .build()
                .map_err(MapError::Io)?;
            Ok(Self {
                runtime: Some(runtime),
            })
        }

        async fn download(url: &str) -> Result<TileImage> {
            let response = HTTP_CLIENT
                .get(url)
                .send()
                .await
                .map_err(MapError::Network)?;
            if !response.status().is_success() {
                return Err(format!("HTTP {} for {}", response.status(), url).into());
            }
            let bytes = response.bytes().await.map_err(MapError::Network)?;
            let image = tokio::task::spawn_blocking(move || TileImage::decode(&bytes)).await??;
            Ok(image)
        }
    }

    impl TileFetcher for HttpTileFetcher {
        fn fetch(&self, request: TileRequest, completion: TileCompletion) {
            let Some(runtime) = &self.runtime else {
                completion.fail("tile runtime shut down");
                return;
            };
            log::debug!("Fetching tile {} from {}", request.coord, request.url);
            runtime.spawn(async move {
                let result = Self::download(&request.url).await;
                match &result {
                    Ok(image) => log::info!(
                        "Loaded tile {} ({}x{})",
                        request.coord,
                        image.width,
                        image.height
                    ),
                    Err(e) => log::warn!("Tile {} failed: {}", request.coord, e),
                }
                completion.finish(result);
            });
        }
    }

    impl Drop for HttpTileFetcher {
        fn drop(&mut self) {
            // In-flight downloads are abandoned rather than awaited
            if let Some(runtime) = self.runtime.take() {
                runtime.shutdown_background();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;

    #[test]
    fn test_completion_delivers_response() {
        let (tx, rx) = unbounded();
        let coord = TileCoord::new(1, 1, 2);
        TileCompletion::new(coord, tx.clone()).succeed(TileImage::from_rgba(
            1,
            1,
            vec![1, 2, 3, 4],
        ));
        TileCompletion::new(coord, tx).fail("boom");

        let first = rx.try_recv().unwrap();
        assert_eq!(first.coord, coord);
        assert!(first.result.is_ok());
        assert!(rx.try_recv().unwrap().result.is_err());
    }

    #[test]
    fn test_disabled_fetcher_fails_immediately() {
        let (tx, rx) = unbounded();
        let coord = TileCoord::new(0, 0, 1);
        DisabledFetcher.fetch(
            TileRequest {
                coord,
                url: "https://t/1/0/0.png".to_string(),
            },
            TileCompletion::new(coord, tx),
        );
        assert!(rx.try_recv().unwrap().result.is_err());
    }

    #[test]
    fn test_degenerate_detection() {
        assert!(TileImage::from_rgba(0, 0, Vec::new()).is_degenerate());
        assert!(TileImage::from_rgba(2, 2, vec![0; 4]).is_degenerate());
        assert!(!TileImage::from_rgba(2, 2, vec![0; 16]).is_degenerate());
    }

    #[cfg(feature = "render")]
    #[test]
    fn test_decode_rejects_garbage() {
        assert!(TileImage::decode(b"not an image").is_err());
    }
}
