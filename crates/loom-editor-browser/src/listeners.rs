//! Lifetime of DOM listeners.
//!
//! A `ListenerGuard` owns the `gloo-events` listeners of one listener set (or
//! one edit session). Retiring it disarms every handler at once; the
//! listeners themselves are freed after the current dispatch returns, since
//! a guard is often retired from inside one of its own handlers.

use std::cell::Cell;
use std::rc::Rc;

use gloo_events::EventListener;

pub(crate) struct ListenerGuard {
    armed: Rc<Cell<bool>>,
    listeners: Vec<EventListener>,
}

impl ListenerGuard {
    pub(crate) fn new() -> Self {
        Self {
            armed: Rc::new(Cell::new(true)),
            listeners: Vec::new(),
        }
    }

    /// Flag every handler must check before acting.
    pub(crate) fn armed(&self) -> Rc<Cell<bool>> {
        Rc::clone(&self.armed)
    }

    pub(crate) fn push(&mut self, listener: EventListener) {
        self.listeners.push(listener);
    }

    /// Disarm now; remove the DOM listeners on the next microtask.
    pub(crate) fn retire(self) {
        self.armed.set(false);
        let listeners = self.listeners;
        if listeners.is_empty() {
            return;
        }
        wasm_bindgen_futures::spawn_local(async move {
            drop(listeners);
        });
    }
}
