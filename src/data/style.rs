//! Style records attached to features.
//!
//! One style is created per batch-add call and shared (via `Arc`) by every
//! feature of that batch. Field names and defaults follow the style records
//! accepted by the ingestion layer.

use crate::MapError;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// RGBA color parsed from a CSS hex string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Alpha of the color combined with an extra opacity factor, as 0..=255
    pub fn alpha_with(&self, opacity: f32) -> u8 {
        let opacity = if opacity.is_finite() { opacity.clamp(0.0, 1.0) } else { 1.0 };
        (f32::from(self.a) * opacity).round() as u8
    }
}

impl FromStr for Color {
    type Err = MapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || MapError::InvalidStyle(format!("unsupported color '{s}'"));
        let hex = s.trim().strip_prefix('#').ok_or_else(invalid)?;
        if !hex.is_ascii() {
            return Err(invalid());
        }

        let nibble = |i: usize| u8::from_str_radix(&hex[i..=i], 16).map(|v| v * 17);
        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16);

        let color = match hex.len() {
            3 => Color::rgb(nibble(0)?, nibble(1)?, nibble(2)?),
            4 => Color::new(nibble(0)?, nibble(1)?, nibble(2)?, nibble(3)?),
            6 => Color::rgb(byte(0)?, byte(2)?, byte(4)?),
            8 => Color::new(byte(0)?, byte(2)?, byte(4)?, byte(6)?),
            _ => return Err(invalid()),
        };
        Ok(color)
    }
}

impl From<std::num::ParseIntError> for MapError {
    fn from(err: std::num::ParseIntError) -> Self {
        MapError::InvalidStyle(err.to_string())
    }
}

impl TryFrom<String> for Color {
    type Error = MapError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 255 {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            write!(f, "#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

/// Default marker / stroke blue
pub const DEFAULT_BLUE: Color = Color::rgb(0x33, 0x88, 0xff);

/// Which properties a tooltip shows for a feature
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TooltipSpec {
    /// Property names listed as `field: value` rows
    #[serde(rename = "tooltip_fields")]
    pub fields: Option<Vec<String>>,
    /// Text template with `{property}` placeholders; takes precedence over `fields`
    #[serde(rename = "tooltip_template")]
    pub template: Option<String>,
}

impl TooltipSpec {
    pub fn fields<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: Some(fields.into_iter().map(Into::into).collect()),
            template: None,
        }
    }

    pub fn template(template: impl Into<String>) -> Self {
        Self {
            fields: None,
            template: Some(template.into()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_none() && self.template.is_none()
    }
}

/// Style for point features
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointStyle {
    /// Fill color
    pub color: Color,
    /// Marker radius in pixels
    pub radius: f32,
    /// Border color
    pub stroke: Color,
    /// Border width; zero disables the border
    pub stroke_width: f32,
    /// Opacity (0.0 to 1.0) of fill and border
    pub opacity: f32,
    #[serde(flatten)]
    pub tooltip: TooltipSpec,
    /// Property whose value is drawn above the marker
    pub label_field: Option<String>,
}

impl Default for PointStyle {
    fn default() -> Self {
        Self {
            color: DEFAULT_BLUE,
            radius: 8.0,
            stroke: Color::rgb(255, 255, 255),
            stroke_width: 2.0,
            opacity: 1.0,
            tooltip: TooltipSpec::default(),
            label_field: None,
        }
    }
}

impl PointStyle {
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius;
        self
    }

    pub fn with_tooltip(mut self, tooltip: TooltipSpec) -> Self {
        self.tooltip = tooltip;
        self
    }

    pub fn with_label_field(mut self, field: impl Into<String>) -> Self {
        self.label_field = Some(field.into());
        self
    }
}

/// Style for line features
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineStyle {
    /// Line color
    pub stroke: Color,
    /// Line width in pixels
    pub stroke_width: f32,
    /// Opacity (0.0 to 1.0)
    pub stroke_opacity: f32,
    /// Dash pattern as a comma-separated list of lengths, e.g. `"5,5"`
    pub stroke_dasharray: Option<String>,
    #[serde(flatten)]
    pub tooltip: TooltipSpec,
}

impl Default for LineStyle {
    fn default() -> Self {
        Self {
            stroke: DEFAULT_BLUE,
            stroke_width: 3.0,
            stroke_opacity: 1.0,
            stroke_dasharray: None,
            tooltip: TooltipSpec::default(),
        }
    }
}

impl LineStyle {
    pub fn with_stroke(mut self, stroke: Color, width: f32) -> Self {
        self.stroke = stroke;
        self.stroke_width = width;
        self
    }

    pub fn with_dasharray(mut self, dasharray: impl Into<String>) -> Self {
        self.stroke_dasharray = Some(dasharray.into());
        self
    }

    pub fn with_tooltip(mut self, tooltip: TooltipSpec) -> Self {
        self.tooltip = tooltip;
        self
    }

    /// Parsed dash pattern; empty means a solid line
    pub fn dash_pattern(&self) -> Vec<f32> {
        self.stroke_dasharray
            .as_deref()
            .map(parse_dash_pattern)
            .unwrap_or_default()
    }
}

/// Style for polygon features
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolygonStyle {
    /// Fill color
    pub fill: Color,
    /// Fill opacity (0.0 to 1.0)
    pub fill_opacity: f32,
    /// Border color
    pub stroke: Color,
    /// Border width
    pub stroke_width: f32,
    /// Stroke opacity (0.0 to 1.0)
    pub stroke_opacity: f32,
    #[serde(flatten)]
    pub tooltip: TooltipSpec,
}

impl Default for PolygonStyle {
    fn default() -> Self {
        Self {
            fill: DEFAULT_BLUE,
            fill_opacity: 0.3,
            stroke: DEFAULT_BLUE,
            stroke_width: 2.0,
            stroke_opacity: 1.0,
            tooltip: TooltipSpec::default(),
        }
    }
}

impl PolygonStyle {
    pub fn with_fill(mut self, fill: Color, opacity: f32) -> Self {
        self.fill = fill;
        self.fill_opacity = opacity;
        self
    }

    pub fn with_tooltip(mut self, tooltip: TooltipSpec) -> Self {
        self.tooltip = tooltip;
        self
    }
}

/// Parses a literal comma-separated dash list.
///
/// Empty entries count as zero. A list containing anything unparsable,
/// negative or non-finite is rejected as a whole, as is a list of zeros;
/// both yield a solid line. Odd-length lists are repeated once so that
/// dashes and gaps alternate.
pub fn parse_dash_pattern(pattern: &str) -> Vec<f32> {
    let mut dashes = Vec::new();
    for part in pattern.split(',') {
        let part = part.trim();
        let value = if part.is_empty() {
            0.0
        } else {
            match part.parse::<f32>() {
                Ok(v) if v.is_finite() && v >= 0.0 => v,
                _ => return Vec::new(),
            }
        };
        dashes.push(value);
    }

    if dashes.iter().all(|d| *d == 0.0) {
        return Vec::new();
    }
    if dashes.len() % 2 == 1 {
        dashes.extend_from_within(..);
    }
    dashes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_parsing() {
        assert_eq!("#3388ff".parse::<Color>().unwrap(), Color::rgb(0x33, 0x88, 0xff));
        assert_eq!("#fff".parse::<Color>().unwrap(), Color::rgb(255, 255, 255));
        assert_eq!("#0008".parse::<Color>().unwrap(), Color::new(0, 0, 0, 0x88));
        assert_eq!("#11223344".parse::<Color>().unwrap(), Color::new(0x11, 0x22, 0x33, 0x44));
        assert!("red".parse::<Color>().is_err());
        assert!("#12345".parse::<Color>().is_err());
        assert!("#gggggg".parse::<Color>().is_err());
    }

    #[test]
    fn test_color_display_round_trip() {
        let color = Color::rgb(0xe7, 0x4c, 0x3c);
        assert_eq!(color.to_string(), "#e74c3c");
        assert_eq!(Color::new(1, 2, 3, 4).to_string(), "#01020304");
    }

    #[test]
    fn test_style_defaults_from_empty_record() {
        let style: PointStyle = serde_json::from_str("{}").unwrap();
        assert_eq!(style, PointStyle::default());
        assert_eq!(style.radius, 8.0);

        let style: PolygonStyle = serde_json::from_str(r##"{"fill": "#27ae60"}"##).unwrap();
        assert_eq!(style.fill, Color::rgb(0x27, 0xae, 0x60));
        assert_eq!(style.fill_opacity, 0.3);
    }

    #[test]
    fn test_tooltip_fields_are_flattened() {
        let style: LineStyle =
            serde_json::from_str(r#"{"tooltip_fields": ["route"], "stroke_width": 4}"#).unwrap();
        assert_eq!(style.tooltip.fields, Some(vec!["route".to_string()]));
        assert_eq!(style.stroke_width, 4.0);
    }

    #[test]
    fn test_dash_pattern_parsing() {
        assert_eq!(parse_dash_pattern("5,5"), vec![5.0, 5.0]);
        assert_eq!(parse_dash_pattern(" 10, 4 ,2"), vec![10.0, 4.0, 2.0, 10.0, 4.0, 2.0]);
        assert_eq!(parse_dash_pattern("6"), vec![6.0, 6.0]);
        assert!(parse_dash_pattern("5,x").is_empty());
        assert!(parse_dash_pattern("5,-1").is_empty());
        assert!(parse_dash_pattern("").is_empty());
        assert!(parse_dash_pattern("0,0").is_empty());
    }
}
