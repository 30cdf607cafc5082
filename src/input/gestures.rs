//! Gesture state machine and view-state owner.
//!
//! [`ViewportController`] is the only place where center and zoom change.
//! Each input event maps to one transition function; every transition
//! reports whether the view changed so the caller knows when to redraw.

use crate::core::{
    constants::{MAX_ZOOM, MIN_ZOOM, WHEEL_ZOOM_STEP},
    geo::{LatLng, Point},
    projection,
    viewport::Viewport,
};
use crate::input::events::{touch_distance, InputEvent, TouchEventType, TouchPoint};

/// Current gesture; drag and pinch are mutually exclusive
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureState {
    Idle,
    /// Single-contact drag
    Panning {
        /// Pixel where the contact went down
        anchor: Point,
        /// World-pixel position of the view center when the drag started
        start_center: Point,
        /// Zoom when the drag started; the drag is evaluated at this zoom
        start_zoom: f64,
    },
    /// Two-contact pinch
    Pinching { start_distance: f64, start_zoom: f64 },
}

impl GestureState {
    pub fn is_idle(&self) -> bool {
        matches!(self, GestureState::Idle)
    }
}

/// Owns the view state and mutates it from input
#[derive(Debug, Clone)]
pub struct ViewportController {
    viewport: Viewport,
    state: GestureState,
}

impl ViewportController {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            state: GestureState::Idle,
        }
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    /// Dispatches an event to its transition; returns true when the view changed
    pub fn handle(&mut self, event: &InputEvent) -> bool {
        match event {
            InputEvent::PointerDown { position } => {
                self.pointer_down(*position);
                false
            }
            InputEvent::PointerMove { position } => self.pointer_move(*position),
            InputEvent::PointerUp | InputEvent::PointerLeave => {
                self.release();
                false
            }
            InputEvent::Wheel { delta_y, position } => self.wheel(*delta_y, *position),
            InputEvent::Touch {
                event_type,
                touches,
            } => self.touch(*event_type, touches),
            InputEvent::Resize { size } => self.resize(*size),
        }
    }

    /// Idle or pinching → Panning, anchored at `position`
    pub fn pointer_down(&mut self, position: Point) {
        self.state = GestureState::Panning {
            anchor: position,
            start_center: self.viewport.center_world(),
            start_zoom: self.viewport.zoom,
        };
    }

    /// Pans while Panning; otherwise a plain hover and nothing changes
    pub fn pointer_move(&mut self, position: Point) -> bool {
        let GestureState::Panning {
            anchor,
            start_center,
            start_zoom,
        } = self.state
        else {
            return false;
        };

        // Keeps the geo point that was under the anchor under the cursor
        let delta = position.subtract(&anchor);
        let center_world = start_center.subtract(&delta);
        let center = projection::unproject(&center_world, start_zoom);
        self.apply_center(center)
    }

    /// Any gesture → Idle
    pub fn release(&mut self) {
        self.state = GestureState::Idle;
    }

    /// Anchor-preserving zoom by one wheel step
    pub fn wheel(&mut self, delta_y: f64, position: Point) -> bool {
        let step = if delta_y > 0.0 {
            -WHEEL_ZOOM_STEP
        } else if delta_y < 0.0 {
            WHEEL_ZOOM_STEP
        } else {
            return false;
        };
        self.zoom_around(self.viewport.zoom + step, position)
    }

    /// Sets `zoom` while keeping the coordinate under `position` in place
    pub fn zoom_around(&mut self, zoom: f64, position: Point) -> bool {
        if !zoom.is_finite() {
            return false;
        }
        let new_zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        if new_zoom == self.viewport.zoom {
            return false;
        }

        let mut target = self.viewport.pixel_to_lat_lng(&position);
        // Stay on the same world copy as the current center
        let center_lng = self.viewport.center.lng;
        while target.lng - center_lng > 180.0 {
            target.lng -= 360.0;
        }
        while target.lng - center_lng < -180.0 {
            target.lng += 360.0;
        }

        let center =
            projection::center_for_anchor(&target, &position, new_zoom, &self.viewport.size);
        self.viewport.set_zoom(new_zoom);
        self.apply_center(center);
        true
    }

    /// Touch transitions: one contact pans, two pinch, lifting any contact ends the gesture
    pub fn touch(&mut self, event_type: TouchEventType, touches: &[TouchPoint]) -> bool {
        match event_type {
            TouchEventType::Start => {
                match touches {
                    [single] => self.pointer_down(single.position),
                    [_, _] => {
                        if let Some(distance) = touch_distance(touches) {
                            self.state = GestureState::Pinching {
                                start_distance: distance,
                                start_zoom: self.viewport.zoom,
                            };
                        }
                    }
                    _ => {}
                }
                false
            }
            TouchEventType::Move => match (self.state, touches) {
                (GestureState::Panning { .. }, [single]) => self.pointer_move(single.position),
                (
                    GestureState::Pinching {
                        start_distance,
                        start_zoom,
                    },
                    [_, _],
                ) => {
                    if start_distance <= 0.0 {
                        return false;
                    }
                    match touch_distance(touches) {
                        Some(distance) => {
                            self.set_zoom(start_zoom + (distance / start_distance).log2())
                        }
                        None => false,
                    }
                }
                _ => false,
            },
            TouchEventType::End | TouchEventType::Cancel => {
                self.release();
                false
            }
        }
    }

    /// New surface size; center and zoom are kept
    pub fn resize(&mut self, size: Point) -> bool {
        self.viewport.set_size(size);
        true
    }

    /// Sets the zoom around the view center, clamped; returns true if it changed
    pub fn set_zoom(&mut self, zoom: f64) -> bool {
        if !zoom.is_finite() {
            return false;
        }
        let before = self.viewport.zoom;
        self.viewport.set_zoom(zoom);
        self.viewport.zoom != before
    }

    /// Changes the zoom by `delta` around the view center
    pub fn zoom_by(&mut self, delta: f64) -> bool {
        self.set_zoom(self.viewport.zoom + delta)
    }

    /// Sets the center, clamping latitude and wrapping longitude
    pub fn set_center(&mut self, center: LatLng) -> bool {
        self.apply_center(center)
    }

    /// Jumps to `center` at `zoom` and drops any gesture in progress
    pub fn jump_to(&mut self, center: LatLng, zoom: f64) {
        self.state = GestureState::Idle;
        self.set_zoom(zoom);
        self.apply_center(center);
    }

    fn apply_center(&mut self, center: LatLng) -> bool {
        let before = self.viewport.center;
        self.viewport.set_center(center);
        self.viewport.center != before
    }
}
