//! WASM browser tests for loom-editor-browser.
//!
//! Run with: `wasm-pack test --headless --firefox` or `--chrome`

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

use loom_editor_browser::{
    EventResult, IframeSurface, MountedEditor, SurfaceEvent, parse_key,
};
use loom_editor_core::{
    EditorConfig, EditorHost, InteractionMode, Key, ListenerSet, Notice, PointerInput,
    RenderedSurface,
};
use web_sys::{Element, HtmlIFrameElement};

const PAGE: &str = r#"<!DOCTYPE html><html><head><style>body{margin:0}h1{margin:0;height:40px}</style></head><body><h1>Welcome</h1><a href="/old">Docs</a></body></html>"#;

fn iframe() -> HtmlIFrameElement {
    let document = web_sys::window().unwrap().document().unwrap();
    let iframe: HtmlIFrameElement = wasm_bindgen::JsCast::unchecked_into(
        document.create_element("iframe").unwrap(),
    );
    iframe
        .set_attribute("style", "width:400px;height:300px;border:0")
        .unwrap();
    document.body().unwrap().append_child(&iframe).unwrap();
    iframe
}

fn surface_with(document: &str) -> IframeSurface {
    let mut surface = IframeSurface::new(iframe()).unwrap();
    surface.render(document).unwrap();
    surface
}

fn first(surface: &IframeSurface, selector: &str) -> Element {
    surface
        .document()
        .unwrap()
        .query_selector(selector)
        .unwrap()
        .unwrap()
}

/// Dispatch a click at the element's center, the way a real pointer would.
fn click_at(element: &Element) -> web_sys::MouseEvent {
    let point = center(element);
    let init = web_sys::MouseEventInit::new();
    init.set_bubbles(true);
    init.set_cancelable(true);
    init.set_client_x(point.x as i32);
    init.set_client_y(point.y as i32);
    let event = web_sys::MouseEvent::new_with_mouse_event_init_dict("click", &init).unwrap();
    element.dispatch_event(&event).unwrap();
    event
}

fn center(element: &Element) -> PointerInput {
    let rect = element.get_bounding_client_rect();
    PointerInput::new(
        rect.left() + rect.width() / 2.0,
        rect.top() + rect.height() / 2.0,
    )
}

// === Key parsing ===

#[wasm_bindgen_test]
fn test_parse_key() {
    assert_eq!(parse_key("Enter"), Key::Enter);
    assert_eq!(parse_key("Escape"), Key::Escape);
    assert_eq!(parse_key("a"), Key::character("a"));
}

#[wasm_bindgen_test]
fn test_event_result() {
    assert!(EventResult::Handled.prevents_default());
    assert!(!EventResult::PassThrough.prevents_default());
}

// === Surface ===

#[wasm_bindgen_test]
fn test_render_serialize_round_trip() {
    let surface = surface_with(PAGE);
    let html = surface.serialize().unwrap();
    assert!(html.starts_with("<!DOCTYPE html><html>"));
    assert!(html.contains("<h1>Welcome</h1>"));
    assert!(html.contains(r#"<a href="/old">Docs</a>"#));
}

#[wasm_bindgen_test]
fn test_render_bumps_generation() {
    let mut surface = surface_with(PAGE);
    let before = surface.generation();
    let heading = first(&surface, "h1");
    surface.render(PAGE).unwrap();
    assert!(surface.generation() > before);
    assert!(!surface.is_attached(&heading));
}

#[wasm_bindgen_test]
fn test_hit_test_finds_innermost_element() {
    let surface = surface_with(PAGE);
    let heading = first(&surface, "h1");
    let hit = surface.hit_test(center(&heading)).unwrap();
    assert_eq!(hit, heading);
    assert_eq!(surface.tag_name(&hit), "h1");
}

#[wasm_bindgen_test]
fn test_hit_test_skips_structural_roots() {
    let surface = surface_with(PAGE);
    // Below the content, only body is under the pointer.
    assert!(surface.hit_test(PointerInput::new(200.0, 250.0)).is_none());
}

#[wasm_bindgen_test]
fn test_serialize_strips_edit_markers() {
    let mut surface = surface_with(PAGE);
    let heading = first(&surface, "h1");
    surface.begin_editing(&heading, "editing-element").unwrap();
    assert_eq!(
        heading.get_attribute("contenteditable").as_deref(),
        Some("true")
    );
    assert!(heading.class_list().contains("editing-element"));

    let html = surface.serialize().unwrap();
    assert!(html.contains("<h1>Welcome</h1>"));
    assert!(!html.contains("contenteditable"));

    surface.end_editing(&heading, "editing-element");
    assert!(heading.get_attribute("contenteditable").is_none());
    assert!(heading.get_attribute("class").is_none());
}

#[wasm_bindgen_test]
fn test_remove_node_refuses_roots() {
    let mut surface = surface_with(PAGE);
    let body = first(&surface, "body");
    assert!(surface.remove_node(&body).is_err());
    let link = first(&surface, "a");
    surface.remove_node(&link).unwrap();
    assert!(!surface.serialize().unwrap().contains("Docs"));
}

#[wasm_bindgen_test]
fn test_cursor_follows_listener_set() {
    let mut surface = surface_with(PAGE);
    let body = surface.document().unwrap().body().unwrap();

    surface.attach_listeners(ListenerSet::ManualPick);
    assert_eq!(body.style().get_property_value("cursor").unwrap(), "pointer");

    surface.detach_listeners(ListenerSet::ManualPick);
    surface.attach_listeners(ListenerSet::Passive);
    assert_eq!(body.style().get_property_value("cursor").unwrap(), "default");
}

#[wasm_bindgen_test]
fn test_click_listener_forwards_to_sink() {
    let mut surface = surface_with(PAGE);
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink_seen = Rc::clone(&seen);
    surface.set_sink(Rc::new(move |event: SurfaceEvent| {
        sink_seen.borrow_mut().push(event);
        EventResult::Handled
    }));
    surface.attach_listeners(ListenerSet::ManualPick);

    let heading = first(&surface, "h1");
    let event = click_at(&heading);
    assert!(event.default_prevented());
    assert_eq!(seen.borrow().len(), 1);
    assert!(matches!(seen.borrow()[0], SurfaceEvent::Click(_)));

    // Detached handlers are disarmed immediately.
    surface.detach_listeners(ListenerSet::ManualPick);
    let event = click_at(&heading);
    assert!(!event.default_prevented());
    assert_eq!(seen.borrow().len(), 1);
}

// === Mounted editor ===

#[derive(Default)]
struct Recorder {
    documents: Rc<RefCell<Vec<String>>>,
    notices: Rc<RefCell<Vec<Notice>>>,
}

impl EditorHost<Element> for Recorder {
    fn document_changed(&mut self, document: &str) {
        self.documents.borrow_mut().push(document.to_string());
    }

    fn notice(&mut self, notice: Notice) {
        self.notices.borrow_mut().push(notice);
    }
}

#[wasm_bindgen_test]
fn test_mounted_link_edit() {
    let recorder = Recorder::default();
    let documents = Rc::clone(&recorder.documents);
    let notices = Rc::clone(&recorder.notices);
    let editor =
        MountedEditor::mount(iframe(), recorder, EditorConfig::default(), PAGE).unwrap();

    editor
        .with(|e| e.set_mode(InteractionMode::ManualEdit))
        .unwrap()
        .unwrap();

    let link = editor
        .with(|e| first(e.surface(), "a"))
        .unwrap();
    // The click goes through the capture listener into the engine, which
    // selects the link and suppresses navigation.
    let event = click_at(&link);
    assert!(event.default_prevented());
    let selected = editor
        .with(|e| e.selection().map(|s| s.tag().to_string()))
        .unwrap();
    assert_eq!(selected.as_deref(), Some("a"));

    let request = editor.with(|e| e.open_link_editor()).unwrap().unwrap();
    assert_eq!(request.url, "/old");
    editor
        .with(|e| e.confirm_link("https://example.com"))
        .unwrap()
        .unwrap();

    let last = documents.borrow().last().cloned().unwrap();
    assert!(last.contains(r#"<a href="https://example.com">Docs</a>"#));
    assert_eq!(notices.borrow().as_slice(), &[Notice::LinkUpdated]);
    assert!(editor.with(|e| e.selection().is_none()).unwrap());
}

#[wasm_bindgen_test]
fn test_mounted_edit_commits_on_enter() {
    let recorder = Recorder::default();
    let documents = Rc::clone(&recorder.documents);
    let editor =
        MountedEditor::mount(iframe(), recorder, EditorConfig::default(), PAGE).unwrap();
    editor
        .with(|e| e.set_mode(InteractionMode::ManualEdit))
        .unwrap()
        .unwrap();

    let heading = editor.with(|e| first(e.surface(), "h1")).unwrap();
    editor
        .with(|e| e.on_pointer(center(&heading)))
        .unwrap()
        .unwrap();
    editor.with(|e| e.begin_edit()).unwrap().unwrap();

    heading.set_text_content(Some("Hello"));
    let init = web_sys::KeyboardEventInit::new();
    init.set_key("Enter");
    init.set_cancelable(true);
    let event =
        web_sys::KeyboardEvent::new_with_keyboard_event_init_dict("keydown", &init).unwrap();
    heading.dispatch_event(&event).unwrap();

    assert!(event.default_prevented());
    assert!(editor.with(|e| e.edit_session().is_none()).unwrap());
    let last = documents.borrow().last().cloned().unwrap();
    assert!(last.contains("<h1>Hello</h1>"));
}
