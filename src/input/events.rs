use crate::core::geo::Point;
use serde::{Deserialize, Serialize};

/// Input events consumed by the engine.
///
/// Positions are in pixels relative to the top-left corner of the map
/// surface. Hosts translate their native events into these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    /// Primary button pressed (single contact)
    PointerDown { position: Point },
    /// Pointer moved, pressed or not
    PointerMove { position: Point },
    /// Primary button released
    PointerUp,
    /// Pointer left the map surface
    PointerLeave,
    /// Scroll wheel; only the sign of `delta_y` matters
    Wheel { delta_y: f64, position: Point },
    /// Touch events (multi-touch); `touches` lists every contact still down
    Touch {
        event_type: TouchEventType,
        touches: Vec<TouchPoint>,
    },
    /// Viewport/window resize
    Resize { size: Point },
}

/// Types of touch events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TouchEventType {
    Start,
    Move,
    End,
    Cancel,
}

/// Individual touch point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TouchPoint {
    pub id: u64,
    pub position: Point,
}

impl TouchPoint {
    pub fn new(id: u64, position: Point) -> Self {
        Self { id, position }
    }
}

impl InputEvent {
    /// Pointer position carried by the event, if any
    pub fn position(&self) -> Option<Point> {
        match self {
            InputEvent::PointerDown { position }
            | InputEvent::PointerMove { position }
            | InputEvent::Wheel { position, .. } => Some(*position),
            InputEvent::Touch { touches, .. } => touches.first().map(|t| t.position),
            InputEvent::PointerUp | InputEvent::PointerLeave | InputEvent::Resize { .. } => None,
        }
    }
}

/// Pixel distance between the first two contacts
pub fn touch_distance(touches: &[TouchPoint]) -> Option<f64> {
    match touches {
        [a, b, ..] => Some(a.position.distance_to(&b.position)),
        _ => None,
    }
}
