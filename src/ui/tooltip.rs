//! Hover tooltip content and placement.

use crate::core::{
    constants::{TOOLTIP_EDGE_MARGIN, TOOLTIP_MIN_INSET, TOOLTIP_OFFSET},
    geo::Point,
};
use crate::data::{
    features::{display_value, FeatureRef, Properties},
    style::TooltipSpec,
};
use serde_json::Value;

/// One `field: value` line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TooltipRow {
    pub field: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TooltipContent {
    /// Rows for the configured fields that have a value
    Rows(Vec<TooltipRow>),
    /// Expanded template text
    Text(String),
}

impl TooltipContent {
    /// Builds the content for a feature's properties.
    ///
    /// A template takes precedence over a field list. Returns `None` when the
    /// style asks for no tooltip or when the result would be empty.
    pub fn build(spec: &TooltipSpec, properties: &Properties) -> Option<Self> {
        if let Some(template) = spec.template.as_deref() {
            let text = expand_template(template, properties);
            return (!text.is_empty()).then_some(TooltipContent::Text(text));
        }
        let rows: Vec<TooltipRow> = spec
            .fields
            .as_ref()?
            .iter()
            .filter_map(|field| match properties.get(field) {
                None | Some(Value::Null) => None,
                Some(value) => Some(TooltipRow {
                    field: field.clone(),
                    value: display_value(value),
                }),
            })
            .collect();
        (!rows.is_empty()).then_some(TooltipContent::Rows(rows))
    }

    /// Plain-text rendering, one row per line
    pub fn to_text(&self) -> String {
        match self {
            TooltipContent::Text(text) => text.clone(),
            TooltipContent::Rows(rows) => rows
                .iter()
                .map(|row| format!("{}: {}", row.field, row.value))
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

/// Replaces every `{word}` token with the matching property's display text.
///
/// Word characters are ASCII letters, digits and `_`. Missing and null
/// properties expand to nothing; anything that is not a token is copied.
fn expand_template(template: &str, properties: &Properties) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let word_len = after
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(after.len());
        if word_len > 0 && after[word_len..].starts_with('}') {
            let key = &after[..word_len];
            if let Some(value) = properties.get(key).filter(|v| !v.is_null()) {
                out.push_str(&display_value(value));
            }
            rest = &after[word_len + 1..];
        } else {
            out.push('{');
            rest = after;
        }
    }
    out.push_str(rest);
    out
}

/// A visible tooltip
#[derive(Debug, Clone, PartialEq)]
pub struct Tooltip {
    /// Pointer position the tooltip belongs to
    pub anchor: Point,
    pub feature: FeatureRef,
    pub content: TooltipContent,
}

impl Tooltip {
    /// Top-left corner for a box of `size` next to `anchor` inside `container`.
    ///
    /// The box sits down-right of the cursor and flips to the other side of
    /// an axis where it would overflow.
    pub fn place(anchor: Point, size: Point, container: Point) -> Point {
        let mut left = anchor.x + TOOLTIP_OFFSET;
        let mut top = anchor.y + TOOLTIP_OFFSET;
        if left + size.x > container.x - TOOLTIP_EDGE_MARGIN {
            left = anchor.x - size.x - TOOLTIP_EDGE_MARGIN;
        }
        if top + size.y > container.y - TOOLTIP_EDGE_MARGIN {
            top = anchor.y - size.y - TOOLTIP_EDGE_MARGIN;
        }
        Point::new(left.max(TOOLTIP_MIN_INSET), top.max(TOOLTIP_MIN_INSET))
    }

    /// Placement of this tooltip; see [`Tooltip::place`]
    pub fn position(&self, size: Point, container: Point) -> Point {
        Self::place(self.anchor, size, container)
    }
}
