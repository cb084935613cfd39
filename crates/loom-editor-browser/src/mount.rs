//! Wiring a `LiveEditor` to an iframe.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use loom_editor_core::{
    EditorConfig, EditorHost, EngineError, KeydownResult, LiveEditor, SurfaceError,
};
use web_sys::{Element, HtmlIFrameElement};

use crate::events::{EventResult, EventSink, SurfaceEvent};
use crate::surface::IframeSurface;

type Engine<H> = LiveEditor<IframeSurface, H>;

/// A live editor mounted on an iframe, with its DOM listeners routed back
/// into the engine.
///
/// Host callbacks run while the engine is borrowed. Calling back into the
/// editor from inside one fails with a surface error instead of panicking.
pub struct MountedEditor<H: EditorHost<Element> + 'static> {
    engine: Rc<RefCell<Engine<H>>>,
}

impl<H: EditorHost<Element> + 'static> MountedEditor<H> {
    /// Render `document` into `iframe` and start in `Viewing`.
    pub fn mount(
        iframe: HtmlIFrameElement,
        host: H,
        config: EditorConfig,
        document: impl Into<String>,
    ) -> Result<Self, EngineError> {
        let mut surface = IframeSurface::new(iframe)?;

        // Listeners are created during construction, before the engine has
        // an address, so the sink resolves it through a slot filled below.
        let slot: Rc<RefCell<Weak<RefCell<Engine<H>>>>> = Rc::new(RefCell::new(Weak::new()));
        let sink_slot = Rc::clone(&slot);
        let sink: EventSink = Rc::new(move |event: SurfaceEvent| {
            let Some(cell) = sink_slot.borrow().upgrade() else {
                return EventResult::PassThrough;
            };
            // Events fired synchronously by our own DOM mutations arrive
            // while the engine is borrowed; those are dropped.
            let Ok(mut engine) = cell.try_borrow_mut() else {
                tracing::trace!(?event, "dropping re-entrant surface event");
                return EventResult::PassThrough;
            };
            dispatch(&mut engine, event)
        });
        surface.set_sink(sink);

        let engine = Rc::new(RefCell::new(LiveEditor::new(surface, host, config, document)?));
        *slot.borrow_mut() = Rc::downgrade(&engine);
        tracing::debug!("editor mounted");
        Ok(Self { engine })
    }

    /// Run `f` against the engine.
    pub fn with<R>(&self, f: impl FnOnce(&mut Engine<H>) -> R) -> Result<R, EngineError> {
        let mut engine = self
            .engine
            .try_borrow_mut()
            .map_err(|_| SurfaceError::from("editor is busy handling an event"))?;
        Ok(f(&mut engine))
    }
}

impl<H: EditorHost<Element> + 'static> Drop for MountedEditor<H> {
    fn drop(&mut self) {
        match self.engine.try_borrow_mut() {
            Ok(mut engine) => engine.stop(),
            Err(_) => tracing::warn!("editor dropped while handling an event"),
        }
    }
}

/// Route one surface event into the engine.
fn dispatch<H: EditorHost<Element>>(engine: &mut Engine<H>, event: SurfaceEvent) -> EventResult {
    match event {
        SurfaceEvent::Click(pointer) => match engine.on_pointer(pointer) {
            Ok(outcome) if outcome.suppresses_default() => EventResult::Handled,
            Ok(_) => EventResult::PassThrough,
            // A refused click in an intercepting mode must still not navigate.
            Err(err) => {
                tracing::debug!(%err, "click rejected");
                EventResult::Handled
            }
        },
        SurfaceEvent::EditKey(input) => match engine.handle_edit_key(&input) {
            Ok(KeydownResult::Handled) => EventResult::Handled,
            Ok(KeydownResult::NotHandled) => EventResult::PassThrough,
            Err(err) => {
                tracing::warn!(%err, "edit key failed");
                EventResult::Handled
            }
        },
        SurfaceEvent::EditBlur => {
            if let Err(err) = engine.handle_edit_blur() {
                tracing::warn!(%err, "commit on blur failed");
            }
            EventResult::PassThrough
        }
    }
}
