//! Browser event extraction.
//!
//! DOM listeners on the surface translate raw events into `SurfaceEvent`s
//! and hand them to an `EventSink`. The sink decides whether the browser's
//! default action runs.

use std::rc::Rc;

use loom_editor_core::{Key, KeyInput, Modifiers, PointerInput};

/// An event the surface forwards to the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
    /// Click inside the surface, in surface viewport coordinates.
    Click(PointerInput),
    /// Keydown on the element being edited.
    EditKey(KeyInput),
    /// The element being edited lost focus.
    EditBlur,
}

/// Result of handling a surface event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResult {
    /// Event was handled, prevent default browser behavior.
    Handled,
    /// Let the browser handle the event.
    PassThrough,
}

impl EventResult {
    pub fn prevents_default(self) -> bool {
        matches!(self, Self::Handled)
    }
}

/// Receiver for surface events.
pub type EventSink = Rc<dyn Fn(SurfaceEvent) -> EventResult>;

/// Parse a browser `KeyboardEvent.key` value into a `Key`.
pub fn parse_key(key: &str) -> Key {
    Key::from_key_value(key)
}

/// Extract key and modifiers from a keyboard event.
pub fn key_input_from_event(event: &web_sys::KeyboardEvent) -> KeyInput {
    let modifiers = Modifiers {
        ctrl: event.ctrl_key(),
        alt: event.alt_key(),
        shift: event.shift_key(),
        meta: event.meta_key(),
    };
    KeyInput::with_modifiers(parse_key(&event.key()), modifiers)
}

/// Pointer position of a mouse event, relative to its document's viewport.
pub fn pointer_from_event(event: &web_sys::MouseEvent) -> PointerInput {
    PointerInput::new(event.client_x() as f64, event.client_y() as f64)
}
