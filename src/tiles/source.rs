use crate::core::geo::TileCoord;

/// Trait representing anything that can produce tile URLs for a given coordinate.
pub trait TileSource: Send + Sync {
    /// Build a URL for the requested `coord`.
    fn url(&self, coord: TileCoord) -> String;
}

/// URL template containing the literal tokens `{z}`, `{x}` and `{y}`.
///
/// Each token is substituted once, at its first occurrence; a template that
/// repeats a token keeps the later copies verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlTemplate {
    template: String,
}

impl UrlTemplate {
    const TOKENS: [&'static str; 3] = ["{z}", "{x}", "{y}"];

    pub fn new(template: impl Into<String>) -> Self {
        let template = template.into();
        for token in Self::TOKENS {
            match template.matches(token).count() {
                0 => log::warn!("Tile URL template '{}' has no {} placeholder", template, token),
                1 => {}
                n => log::warn!(
                    "Tile URL template '{}' repeats {} {} times; only the first is replaced",
                    template,
                    token,
                    n
                ),
            }
        }
        Self { template }
    }

    pub fn as_str(&self) -> &str {
        &self.template
    }
}

impl TileSource for UrlTemplate {
    fn url(&self, coord: TileCoord) -> String {
        self.template
            .replacen("{z}", &coord.z.to_string(), 1)
            .replacen("{x}", &coord.x.to_string(), 1)
            .replacen("{y}", &coord.y.to_string(), 1)
    }
}
