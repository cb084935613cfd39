//! Browser implementation of the rendered surface.
//!
//! The document lives inside an `<iframe>`. Rendering parses the markup with
//! `DOMParser` and swaps the iframe's root element, so scripts in the
//! document never run and document-level listeners survive re-renders.

use std::cell::Cell;
use std::rc::Rc;

use gloo_events::{EventListener, EventListenerOptions, EventListenerPhase};
use loom_editor_core::platform::is_structural_root;
use loom_editor_core::{
    Generation, ListenerSet, PointerInput, Rect, RenderedSurface, SmolStr, SurfaceError,
};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    Document, DomParser, Element, Event, HtmlElement, HtmlIFrameElement, KeyboardEvent,
    MouseEvent, Node, SupportedType,
};

use crate::events::{EventSink, SurfaceEvent, key_input_from_event, pointer_from_event};
use crate::listeners::ListenerGuard;

fn js_err(context: &str, err: JsValue) -> SurfaceError {
    SurfaceError(format!("{context}: {err:?}"))
}

struct EditingState {
    element: Element,
    original_class: Option<String>,
    guard: ListenerGuard,
}

/// A `RenderedSurface` over the document of an `<iframe>`.
pub struct IframeSurface {
    iframe: HtmlIFrameElement,
    generation: Generation,
    /// Doctype name of the last rendered document.
    doctype: Option<String>,
    sink: Option<EventSink>,
    attached: Vec<(ListenerSet, ListenerGuard)>,
    editing: Option<EditingState>,
    pointer_cursor: bool,
}

impl IframeSurface {
    /// Wrap an iframe that is already in the page.
    pub fn new(iframe: HtmlIFrameElement) -> Result<Self, SurfaceError> {
        if iframe.content_document().is_none() {
            return Err(SurfaceError::from(
                "iframe has no content document (is it attached?)",
            ));
        }
        Ok(Self {
            iframe,
            generation: Generation::default(),
            doctype: None,
            sink: None,
            attached: Vec::new(),
            editing: None,
            pointer_cursor: false,
        })
    }

    pub fn iframe(&self) -> &HtmlIFrameElement {
        &self.iframe
    }

    /// Set the receiver for events from listeners attached after this call.
    pub fn set_sink(&mut self, sink: EventSink) {
        self.sink = Some(sink);
    }

    /// The iframe's live document.
    pub fn document(&self) -> Result<Document, SurfaceError> {
        self.iframe
            .content_document()
            .ok_or_else(|| SurfaceError::from("iframe has no content document"))
    }

    fn apply_cursor(&self) {
        let Some(body) = self.document().ok().and_then(|d| d.body()) else {
            return;
        };
        let cursor = if self.pointer_cursor {
            "pointer"
        } else {
            "default"
        };
        if let Err(err) = body.style().set_property("cursor", cursor) {
            tracing::debug!(?err, "failed to set surface cursor");
        }
    }

    fn click_listener(&self, document: &Document, armed: Rc<Cell<bool>>) -> Option<EventListener> {
        let sink = self.sink.clone()?;
        Some(EventListener::new_with_options(
            document,
            "click",
            EventListenerOptions {
                phase: EventListenerPhase::Capture,
                passive: false,
            },
            move |event: &Event| {
                if !armed.get() {
                    return;
                }
                let Some(mouse) = event.dyn_ref::<MouseEvent>() else {
                    return;
                };
                if sink(SurfaceEvent::Click(pointer_from_event(mouse))).prevents_default() {
                    event.prevent_default();
                    event.stop_propagation();
                }
            },
        ))
    }

    fn edit_listeners(&self, element: &Element, guard: &mut ListenerGuard) {
        let Some(sink) = self.sink.clone() else {
            return;
        };

        let armed = guard.armed();
        let blur_sink = Rc::clone(&sink);
        guard.push(EventListener::new(element, "blur", move |_event: &Event| {
            if armed.get() {
                blur_sink(SurfaceEvent::EditBlur);
            }
        }));

        let armed = guard.armed();
        guard.push(EventListener::new_with_options(
            element,
            "keydown",
            EventListenerOptions {
                phase: EventListenerPhase::Bubble,
                passive: false,
            },
            move |event: &Event| {
                if !armed.get() {
                    return;
                }
                let Some(key_event) = event.dyn_ref::<KeyboardEvent>() else {
                    return;
                };
                if sink(SurfaceEvent::EditKey(key_input_from_event(key_event))).prevents_default() {
                    event.prevent_default();
                }
            },
        ));
    }

    /// Remove edit markers from `state.element` and release its listeners.
    fn strip_editing(state: EditingState) {
        state.guard.retire();
        let element = state.element;
        let restored = element
            .remove_attribute("contenteditable")
            .and_then(|()| match &state.original_class {
                Some(class) => element.set_attribute("class", class),
                None => element.remove_attribute("class"),
            });
        if let Err(err) = restored {
            tracing::warn!(?err, "failed to remove edit markers");
        }
        if let Some(html) = element.dyn_ref::<HtmlElement>() {
            let _ = html.blur();
        }
    }
}

/// Child-index path from `root` down to `node`.
fn child_path(root: &Node, node: &Node) -> Option<Vec<u32>> {
    let mut path = Vec::new();
    let mut current = node.clone();
    while current != *root {
        let parent = current.parent_node()?;
        let siblings = parent.child_nodes();
        let index = (0..siblings.length()).find(|&i| siblings.get(i).as_ref() == Some(&current))?;
        path.push(index);
        current = parent;
    }
    path.reverse();
    Some(path)
}

fn follow_path(root: &Node, path: &[u32]) -> Option<Node> {
    let mut current = root.clone();
    for &index in path {
        current = current.child_nodes().get(index)?;
    }
    Some(current)
}

impl RenderedSurface for IframeSurface {
    type Node = Element;

    fn render(&mut self, document: &str) -> Result<(), SurfaceError> {
        self.generation = self.generation.next();
        if let Some(state) = self.editing.take() {
            state.guard.retire();
        }

        let target = self.document()?;
        let parser = DomParser::new().map_err(|e| js_err("DOMParser", e))?;
        let parsed = parser
            .parse_from_string(document, SupportedType::TextHtml)
            .map_err(|e| js_err("parse", e))?;
        self.doctype = parsed.doctype().map(|d| d.name());

        let root = parsed
            .document_element()
            .ok_or_else(|| SurfaceError::from("parsed document has no root element"))?;
        let imported = target
            .import_node_with_deep(&root, true)
            .map_err(|e| js_err("import", e))?;
        let swapped = match target.document_element() {
            Some(old) => target.replace_child(&imported, &old),
            None => target.append_child(&imported),
        };
        swapped.map_err(|e| js_err("swap root", e))?;

        self.apply_cursor();
        tracing::debug!(
            generation = self.generation.0,
            len = document.len(),
            "surface rendered"
        );
        Ok(())
    }

    fn generation(&self) -> Generation {
        self.generation
    }

    fn serialize(&self) -> Result<String, SurfaceError> {
        let document = self.document()?;
        let root = document
            .document_element()
            .ok_or_else(|| SurfaceError::from("document has no root element"))?;

        let markup = match &self.editing {
            // Serialize a copy with the edit markers taken off.
            Some(state) => {
                let path = child_path(&root, &state.element)
                    .ok_or_else(|| SurfaceError::from("edited element left the document"))?;
                let copy = root
                    .clone_node_with_deep(true)
                    .map_err(|e| js_err("clone", e))?;
                if let Some(marked) = follow_path(&copy, &path).and_then(|n| n.dyn_into::<Element>().ok()) {
                    let _ = marked.remove_attribute("contenteditable");
                    let _ = match &state.original_class {
                        Some(class) => marked.set_attribute("class", class),
                        None => marked.remove_attribute("class"),
                    };
                }
                copy.dyn_into::<Element>()
                    .map_err(|_| SurfaceError::from("cloned root is not an element"))?
                    .outer_html()
            }
            None => root.outer_html(),
        };

        Ok(match &self.doctype {
            Some(name) => format!("<!DOCTYPE {name}>{markup}"),
            None => markup,
        })
    }

    fn hit_test(&self, pointer: PointerInput) -> Option<Element> {
        let document = self.document().ok()?;
        let element = document.element_from_point(pointer.x as f32, pointer.y as f32)?;
        if is_structural_root(&element.local_name()) {
            return None;
        }
        Some(element)
    }

    /// Geometry relative to the iframe's offset parent, where the toolbar
    /// overlay is positioned.
    fn bounding_box(&self, node: &Element) -> Option<Rect> {
        if !self.is_attached(node) {
            return None;
        }
        let rect = node.get_bounding_client_rect();
        Some(Rect::new(
            rect.top() + f64::from(self.iframe.offset_top()),
            rect.left() + f64::from(self.iframe.offset_left()),
            rect.width(),
            rect.height(),
        ))
    }

    fn is_attached(&self, node: &Element) -> bool {
        let node: &Node = node;
        node.is_connected()
            && self
                .document()
                .is_ok_and(|document| document.contains(Some(node)))
    }

    fn contains(&self, ancestor: &Element, node: &Element) -> bool {
        let node: &Node = node;
        ancestor.contains(Some(node))
    }

    fn tag_name(&self, node: &Element) -> SmolStr {
        SmolStr::new(node.local_name())
    }

    fn attribute(&self, node: &Element, name: &str) -> Option<String> {
        node.get_attribute(name)
    }

    fn inner_html(&self, node: &Element) -> String {
        node.inner_html()
    }

    fn outer_html(&self, node: &Element) -> String {
        node.outer_html()
    }

    fn text_content(&self, node: &Element) -> String {
        node.text_content().unwrap_or_default()
    }

    fn has_element_children(&self, node: &Element) -> bool {
        node.child_element_count() > 0
    }

    fn set_attribute(&mut self, node: &Element, name: &str, value: &str) -> Result<(), SurfaceError> {
        node.set_attribute(name, value)
            .map_err(|e| js_err("setAttribute", e))
    }

    fn remove_attribute(&mut self, node: &Element, name: &str) -> Result<(), SurfaceError> {
        node.remove_attribute(name)
            .map_err(|e| js_err("removeAttribute", e))
    }

    fn set_inner_html(&mut self, node: &Element, markup: &str) -> Result<(), SurfaceError> {
        node.set_inner_html(markup);
        Ok(())
    }

    fn set_text_content(&mut self, node: &Element, text: &str) -> Result<(), SurfaceError> {
        node.set_text_content(Some(text));
        Ok(())
    }

    fn remove_node(&mut self, node: &Element) -> Result<(), SurfaceError> {
        if is_structural_root(&node.local_name()) {
            return Err(SurfaceError::from("cannot remove a structural root"));
        }
        if !self.is_attached(node) {
            return Err(SurfaceError::from("node is not attached"));
        }
        node.remove();
        Ok(())
    }

    fn attach_listeners(&mut self, set: ListenerSet) {
        let mut guard = ListenerGuard::new();
        if set.intercepts_clicks() {
            match self.document() {
                Ok(document) => {
                    if let Some(listener) = self.click_listener(&document, guard.armed()) {
                        guard.push(listener);
                    }
                }
                Err(err) => tracing::warn!(%err, ?set, "cannot attach listener set"),
            }
        }
        self.attached.push((set, guard));
        self.pointer_cursor = set.intercepts_clicks();
        self.apply_cursor();
        tracing::trace!(?set, "listener set attached");
    }

    fn detach_listeners(&mut self, set: ListenerSet) {
        if let Some(pos) = self.attached.iter().position(|(s, _)| *s == set) {
            let (_, guard) = self.attached.remove(pos);
            guard.retire();
            tracing::trace!(?set, "listener set detached");
        }
        self.pointer_cursor = self.attached.iter().any(|(s, _)| s.intercepts_clicks());
        self.apply_cursor();
    }

    fn begin_editing(&mut self, node: &Element, editing_class: &str) -> Result<(), SurfaceError> {
        if let Some(previous) = self.editing.take() {
            Self::strip_editing(previous);
        }

        let original_class = node.get_attribute("class");
        node.set_attribute("contenteditable", "true")
            .map_err(|e| js_err("contenteditable", e))?;
        node.class_list()
            .add_1(editing_class)
            .map_err(|e| js_err("classList.add", e))?;

        let mut guard = ListenerGuard::new();
        self.edit_listeners(node, &mut guard);
        self.editing = Some(EditingState {
            element: node.clone(),
            original_class,
            guard,
        });

        if let Some(html) = node.dyn_ref::<HtmlElement>() {
            html.focus().map_err(|e| js_err("focus", e))?;
        }
        Ok(())
    }

    fn end_editing(&mut self, node: &Element, _editing_class: &str) {
        if let Some(state) = self.editing.take_if(|state| state.element == *node) {
            Self::strip_editing(state);
        }
    }
}
