//! Interaction modes and the listener sets that belong to them.
//!
//! Exactly one mode is active at a time, and exactly one listener set is
//! attached to the surface at any instant. `ModeMachine::transition` is the
//! only place that attaches or detaches listener sets, always as a
//! detach-then-attach pair.

use serde::{Deserialize, Serialize};

use crate::platform::RenderedSurface;

/// What pointer and keyboard input inside the surface is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InteractionMode {
    /// Plain view: clicks behave natively, nothing is selectable.
    #[default]
    Viewing,
    /// Manual inline editing with the contextual toolbar.
    ManualEdit,
    /// Picking an element to hand to the AI as context.
    AiSelect,
}

impl InteractionMode {
    /// The listener set that must be live while this mode is active.
    pub fn listener_set(self) -> ListenerSet {
        match self {
            Self::Viewing => ListenerSet::Passive,
            Self::ManualEdit => ListenerSet::ManualPick,
            Self::AiSelect => ListenerSet::AiPick,
        }
    }

    /// Modes in which clicks select elements and navigation is suppressed.
    pub fn is_edit_capable(self) -> bool {
        !matches!(self, Self::Viewing)
    }
}

/// A group of surface listeners attached and detached as one unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ListenerSet {
    /// Default cursor, native click behavior.
    Passive,
    /// Capturing click listener that selects and suppresses navigation.
    ManualPick,
    /// Same interception as `ManualPick`, reporting picks to the AI context.
    AiPick,
}

impl ListenerSet {
    /// Whether this set intercepts clicks (and with them, navigation).
    pub fn intercepts_clicks(self) -> bool {
        !matches!(self, Self::Passive)
    }
}

/// Owns the active mode and the listener set currently on the surface.
#[derive(Debug, Default)]
pub struct ModeMachine {
    mode: InteractionMode,
    attached: Option<ListenerSet>,
}

impl ModeMachine {
    /// Create a machine in `Viewing` with nothing attached yet.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    /// The listener set currently attached, if the machine has been started.
    pub fn attached(&self) -> Option<ListenerSet> {
        self.attached
    }

    /// Attach the current mode's listener set if nothing is attached.
    ///
    /// Returns false if a set was already attached.
    pub fn start<S: RenderedSurface>(&mut self, surface: &mut S) -> bool {
        if self.attached.is_some() {
            return false;
        }
        let set = self.mode.listener_set();
        surface.attach_listeners(set);
        self.attached = Some(set);
        tracing::trace!(?set, "mode machine started");
        true
    }

    /// Move to `next`, swapping listener sets as a single paired operation.
    ///
    /// Idempotent: returns false and touches nothing if `next` is already
    /// the active mode and its set is attached.
    pub fn transition<S: RenderedSurface>(&mut self, surface: &mut S, next: InteractionMode) -> bool {
        let next_set = next.listener_set();
        if self.mode == next && self.attached == Some(next_set) {
            return false;
        }

        if let Some(previous) = self.attached.take() {
            surface.detach_listeners(previous);
        }
        surface.attach_listeners(next_set);
        self.attached = Some(next_set);

        tracing::debug!(from = ?self.mode, to = ?next, "interaction mode transition");
        self.mode = next;
        true
    }

    /// Detach the live set without attaching another (surface teardown).
    pub fn stop<S: RenderedSurface>(&mut self, surface: &mut S) {
        if let Some(set) = self.attached.take() {
            surface.detach_listeners(set);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::HeadlessSurface;

    #[test]
    fn test_start_attaches_once() {
        let mut surface = HeadlessSurface::new();
        let mut machine = ModeMachine::new();
        assert!(machine.start(&mut surface));
        assert!(!machine.start(&mut surface));
        assert_eq!(surface.attached_listener_sets(), &[ListenerSet::Passive]);
    }

    #[test]
    fn test_transition_swaps_sets() {
        let mut surface = HeadlessSurface::new();
        let mut machine = ModeMachine::new();
        machine.start(&mut surface);

        assert!(machine.transition(&mut surface, InteractionMode::ManualEdit));
        assert_eq!(surface.attached_listener_sets(), &[ListenerSet::ManualPick]);

        assert!(machine.transition(&mut surface, InteractionMode::Viewing));
        assert_eq!(surface.attached_listener_sets(), &[ListenerSet::Passive]);
    }

    #[test]
    fn test_transition_is_idempotent() {
        let mut surface = HeadlessSurface::new();
        let mut machine = ModeMachine::new();
        machine.start(&mut surface);
        machine.transition(&mut surface, InteractionMode::AiSelect);
        let attaches = surface.attach_count();

        assert!(!machine.transition(&mut surface, InteractionMode::AiSelect));
        assert_eq!(surface.attach_count(), attaches);
        assert_eq!(surface.attached_listener_sets(), &[ListenerSet::AiPick]);
    }

    #[test]
    fn test_stop_leaves_nothing_attached() {
        let mut surface = HeadlessSurface::new();
        let mut machine = ModeMachine::new();
        machine.start(&mut surface);
        machine.stop(&mut surface);
        assert!(surface.attached_listener_sets().is_empty());
        assert_eq!(machine.attached(), None);
    }
}
