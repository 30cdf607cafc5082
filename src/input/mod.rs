pub mod events;
pub mod gestures;

// Re-export the essential types
pub use events::{InputEvent, TouchEventType, TouchPoint};
pub use gestures::{GestureState, ViewportController};
