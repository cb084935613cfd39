//! In-memory rendered surface.
//!
//! `HeadlessSurface` keeps the document as an arena tree and implements
//! `RenderedSurface` without a browser. There is no layout engine: element
//! geometry is whatever the host assigns with [`HeadlessSurface::set_layout`],
//! and hit-testing picks the deepest element whose box contains the point.

mod parse;
mod tree;

use std::collections::HashMap;

use smol_str::SmolStr;

pub use tree::NodeId;

use crate::mode::ListenerSet;
use crate::platform::{RenderedSurface, SurfaceError, is_structural_root};
use crate::types::{Generation, PointerInput, Rect};

use tree::{NodeData, Tree, escape_text, is_raw_text};

/// Markers put on an element by `begin_editing`.
#[derive(Debug, Clone)]
struct EditingMarks {
    node: NodeId,
    /// The `class` attribute before the editing class was added.
    original_class: Option<String>,
}

/// A `RenderedSurface` backed by an in-memory tree.
#[derive(Debug, Clone)]
pub struct HeadlessSurface {
    tree: Tree,
    generation: Generation,
    layout: HashMap<NodeId, Rect>,
    listeners: Vec<ListenerSet>,
    attach_count: usize,
    editing: Option<EditingMarks>,
    focused: Option<NodeId>,
}

impl Default for HeadlessSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessSurface {
    /// An empty surface at generation 0.
    pub fn new() -> Self {
        Self {
            tree: Tree::new(0),
            generation: Generation::default(),
            layout: HashMap::new(),
            listeners: Vec::new(),
            attach_count: 0,
            editing: None,
            focused: None,
        }
    }

    /// A surface with `document` already rendered.
    pub fn from_document(document: &str) -> Self {
        let mut surface = Self::new();
        surface.load(document);
        surface
    }

    fn load(&mut self, document: &str) {
        self.generation = self.generation.next();
        self.tree = Tree::new(self.generation.0);
        let root = self.tree.root();
        parse::parse_into(&mut self.tree, root, document);
        self.layout.clear();
        self.editing = None;
        self.focused = None;
    }

    /// First element with `tag`, in document order.
    pub fn find_first(&self, tag: &str) -> Option<NodeId> {
        self.find_all(tag).into_iter().next()
    }

    /// All elements with `tag`, in document order.
    pub fn find_all(&self, tag: &str) -> Vec<NodeId> {
        self.tree
            .elements_with_depth()
            .into_iter()
            .filter(|(id, _)| {
                self.tree
                    .tag(*id)
                    .is_some_and(|t| t.eq_ignore_ascii_case(tag))
            })
            .map(|(id, _)| id)
            .collect()
    }

    /// Assign the viewport box used for hit-testing and toolbar placement.
    pub fn set_layout(&mut self, node: NodeId, rect: Rect) {
        self.layout.insert(node, rect);
    }

    /// Listener sets currently attached, in attach order.
    pub fn attached_listener_sets(&self) -> &[ListenerSet] {
        &self.listeners
    }

    /// Total number of `attach_listeners` calls so far.
    pub fn attach_count(&self) -> usize {
        self.attach_count
    }

    /// Element holding keyboard focus, if any.
    pub fn focused(&self) -> Option<NodeId> {
        self.focused
    }

    /// Cursor shown over the surface body.
    pub fn cursor(&self) -> &'static str {
        if self.listeners.iter().any(|set| set.intercepts_clicks()) {
            "pointer"
        } else {
            "default"
        }
    }

    fn require_element(&self, node: &NodeId) -> Result<(), SurfaceError> {
        if !self.tree.is_attached(*node) {
            return Err(SurfaceError::from("node is not attached"));
        }
        if !self.tree.is_element(*node) {
            return Err(SurfaceError::from("node is not an element"));
        }
        Ok(())
    }

    fn strip_marks(tree: &mut Tree, marks: &EditingMarks) {
        tree.remove_attribute(marks.node, "contenteditable");
        match &marks.original_class {
            Some(class) => {
                tree.set_attribute(marks.node, "class", class);
            }
            None => {
                tree.remove_attribute(marks.node, "class");
            }
        }
    }
}

impl RenderedSurface for HeadlessSurface {
    type Node = NodeId;

    fn render(&mut self, document: &str) -> Result<(), SurfaceError> {
        self.load(document);
        tracing::trace!(generation = self.generation.0, "headless surface rendered");
        Ok(())
    }

    fn generation(&self) -> Generation {
        self.generation
    }

    fn serialize(&self) -> Result<String, SurfaceError> {
        let root = self.tree.root();
        match &self.editing {
            // Edit markers never reach the serialized document.
            Some(marks) => {
                let mut tree = self.tree.clone();
                Self::strip_marks(&mut tree, marks);
                Ok(tree.serialize_children(root))
            }
            None => Ok(self.tree.serialize_children(root)),
        }
    }

    fn hit_test(&self, pointer: PointerInput) -> Option<NodeId> {
        self.tree
            .elements_with_depth()
            .into_iter()
            .filter(|(id, _)| {
                self.tree
                    .tag(*id)
                    .is_some_and(|tag| !is_structural_root(tag))
            })
            .filter(|(id, _)| {
                self.layout
                    .get(id)
                    .is_some_and(|rect| rect.contains(pointer.x, pointer.y))
            })
            // Deepest wins; among equals, the later (painted on top) one.
            .max_by_key(|(_, depth)| *depth)
            .map(|(id, _)| id)
    }

    fn bounding_box(&self, node: &NodeId) -> Option<Rect> {
        if !self.tree.is_attached(*node) {
            return None;
        }
        self.layout.get(node).copied()
    }

    fn is_attached(&self, node: &NodeId) -> bool {
        self.tree.is_attached(*node)
    }

    fn contains(&self, ancestor: &NodeId, node: &NodeId) -> bool {
        self.tree.contains(*ancestor, *node)
    }

    fn tag_name(&self, node: &NodeId) -> SmolStr {
        self.tree.tag(*node).map(SmolStr::new).unwrap_or_default()
    }

    fn attribute(&self, node: &NodeId, name: &str) -> Option<String> {
        self.tree.attribute(*node, name).map(str::to_string)
    }

    fn inner_html(&self, node: &NodeId) -> String {
        self.tree.serialize_children(*node)
    }

    fn outer_html(&self, node: &NodeId) -> String {
        self.tree.serialize_node(*node)
    }

    fn text_content(&self, node: &NodeId) -> String {
        self.tree.text_content(*node)
    }

    fn has_element_children(&self, node: &NodeId) -> bool {
        self.tree
            .children(*node)
            .into_iter()
            .any(|child| self.tree.is_element(child))
    }

    fn set_attribute(&mut self, node: &NodeId, name: &str, value: &str) -> Result<(), SurfaceError> {
        self.require_element(node)?;
        self.tree.set_attribute(*node, name, value);
        Ok(())
    }

    fn remove_attribute(&mut self, node: &NodeId, name: &str) -> Result<(), SurfaceError> {
        self.require_element(node)?;
        self.tree.remove_attribute(*node, name);
        Ok(())
    }

    fn set_inner_html(&mut self, node: &NodeId, markup: &str) -> Result<(), SurfaceError> {
        self.require_element(node)?;
        self.tree.clear_children(*node);
        let raw = self.tree.tag(*node).is_some_and(is_raw_text);
        if raw {
            if !markup.is_empty() {
                self.tree.append(*node, NodeData::Text(markup.to_string()));
            }
        } else {
            parse::parse_into(&mut self.tree, *node, markup);
        }
        Ok(())
    }

    fn set_text_content(&mut self, node: &NodeId, text: &str) -> Result<(), SurfaceError> {
        self.require_element(node)?;
        self.tree.clear_children(*node);
        if !text.is_empty() {
            self.tree
                .append(*node, NodeData::Text(escape_text(text).into_owned()));
        }
        Ok(())
    }

    fn remove_node(&mut self, node: &NodeId) -> Result<(), SurfaceError> {
        self.require_element(node)?;
        if self.tree.tag(*node).is_some_and(is_structural_root) {
            return Err(SurfaceError::from("cannot remove a structural root"));
        }
        self.tree.detach(*node);
        if self.focused.is_some_and(|f| !self.tree.is_attached(f)) {
            self.focused = None;
        }
        Ok(())
    }

    fn attach_listeners(&mut self, set: ListenerSet) {
        self.listeners.push(set);
        self.attach_count += 1;
    }

    fn detach_listeners(&mut self, set: ListenerSet) {
        if let Some(pos) = self.listeners.iter().position(|s| *s == set) {
            self.listeners.remove(pos);
        }
    }

    fn begin_editing(&mut self, node: &NodeId, editing_class: &str) -> Result<(), SurfaceError> {
        self.require_element(node)?;
        if let Some(previous) = self.editing.take() {
            Self::strip_marks(&mut self.tree, &previous);
        }

        let original_class = self.tree.attribute(*node, "class").map(str::to_string);
        let class = match original_class.as_deref() {
            Some(existing) if !existing.trim().is_empty() => format!("{existing} {editing_class}"),
            _ => editing_class.to_string(),
        };
        self.tree.set_attribute(*node, "contenteditable", "true");
        self.tree.set_attribute(*node, "class", &class);

        self.editing = Some(EditingMarks {
            node: *node,
            original_class,
        });
        self.focused = Some(*node);
        Ok(())
    }

    fn end_editing(&mut self, node: &NodeId, _editing_class: &str) {
        if self.editing.as_ref().is_some_and(|m| m.node == *node) {
            if let Some(marks) = self.editing.take() {
                Self::strip_marks(&mut self.tree, &marks);
            }
        }
        if self.focused == Some(*node) {
            self.focused = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = "<!DOCTYPE html><html><head></head><body><section><h1>Title</h1><p>Body <a href=\"/x\">link</a></p></section></body></html>";

    fn laid_out() -> HeadlessSurface {
        let mut surface = HeadlessSurface::from_document(PAGE);
        let html = surface.find_first("html").unwrap();
        let body = surface.find_first("body").unwrap();
        let section = surface.find_first("section").unwrap();
        let h1 = surface.find_first("h1").unwrap();
        let p = surface.find_first("p").unwrap();
        let a = surface.find_first("a").unwrap();
        surface.set_layout(html, Rect::new(0.0, 0.0, 800.0, 600.0));
        surface.set_layout(body, Rect::new(0.0, 0.0, 800.0, 600.0));
        surface.set_layout(section, Rect::new(0.0, 0.0, 800.0, 200.0));
        surface.set_layout(h1, Rect::new(10.0, 10.0, 400.0, 40.0));
        surface.set_layout(p, Rect::new(60.0, 10.0, 400.0, 20.0));
        surface.set_layout(a, Rect::new(60.0, 50.0, 30.0, 20.0));
        surface
    }

    #[test]
    fn test_round_trips_document() {
        let surface = HeadlessSurface::from_document(PAGE);
        assert_eq!(surface.serialize().unwrap(), PAGE);
    }

    #[test]
    fn test_render_bumps_generation_and_invalidates_handles() {
        let mut surface = HeadlessSurface::from_document("<p>a</p>");
        let old = surface.find_first("p").unwrap();
        let before = surface.generation();

        surface.render("<p>b</p>").unwrap();

        assert_eq!(surface.generation(), before.next());
        assert!(!surface.is_attached(&old));
        assert_eq!(surface.text_content(&old), "");
        assert!(surface.set_text_content(&old, "x").is_err());
    }

    #[test]
    fn test_hit_test_picks_deepest() {
        let surface = laid_out();
        let a = surface.find_first("a").unwrap();
        let p = surface.find_first("p").unwrap();
        let section = surface.find_first("section").unwrap();

        assert_eq!(surface.hit_test(PointerInput::new(55.0, 65.0)), Some(a));
        assert_eq!(surface.hit_test(PointerInput::new(20.0, 65.0)), Some(p));
        assert_eq!(surface.hit_test(PointerInput::new(700.0, 150.0)), Some(section));
    }

    #[test]
    fn test_hit_test_never_returns_roots() {
        let surface = laid_out();
        assert_eq!(surface.hit_test(PointerInput::new(700.0, 500.0)), None);
    }

    #[test]
    fn test_contains_walks_ancestors() {
        let surface = laid_out();
        let p = surface.find_first("p").unwrap();
        let a = surface.find_first("a").unwrap();
        let h1 = surface.find_first("h1").unwrap();

        assert!(surface.contains(&p, &a));
        assert!(surface.contains(&p, &p));
        assert!(!surface.contains(&a, &p));
        assert!(!surface.contains(&h1, &a));
    }

    #[test]
    fn test_editing_markers_restore_class() {
        let mut surface =
            HeadlessSurface::from_document("<p class=\"lead\">x</p><span>y</span>");
        let p = surface.find_first("p").unwrap();
        let span = surface.find_first("span").unwrap();

        surface.begin_editing(&p, "editing-element").unwrap();
        assert_eq!(
            surface.attribute(&p, "class").as_deref(),
            Some("lead editing-element")
        );
        assert_eq!(surface.focused(), Some(p));
        assert_eq!(
            surface.serialize().unwrap(),
            "<p class=\"lead\">x</p><span>y</span>"
        );
        surface.end_editing(&p, "editing-element");

        surface.begin_editing(&span, "editing-element").unwrap();
        surface.end_editing(&span, "editing-element");

        assert_eq!(
            surface.serialize().unwrap(),
            "<p class=\"lead\">x</p><span>y</span>"
        );
        assert_eq!(surface.focused(), None);
    }

    #[test]
    fn test_text_content_escapes_markup() {
        let mut surface = HeadlessSurface::from_document("<p>x</p>");
        let p = surface.find_first("p").unwrap();
        surface.set_text_content(&p, "<b>not bold</b> & co").unwrap();

        assert_eq!(surface.text_content(&p), "<b>not bold</b> & co");
        assert!(!surface.has_element_children(&p));
        assert_eq!(
            surface.outer_html(&p),
            "<p>&lt;b&gt;not bold&lt;/b&gt; &amp; co</p>"
        );
    }

    #[test]
    fn test_remove_node_detaches() {
        let mut surface = laid_out();
        let h1 = surface.find_first("h1").unwrap();
        surface.remove_node(&h1).unwrap();

        assert!(!surface.is_attached(&h1));
        assert_eq!(surface.bounding_box(&h1), None);
        assert!(!surface.serialize().unwrap().contains("<h1>"));

        let body = surface.find_first("body").unwrap();
        assert!(surface.remove_node(&body).is_err());
    }

    #[test]
    fn test_cursor_follows_listener_set() {
        let mut surface = HeadlessSurface::new();
        surface.attach_listeners(ListenerSet::Passive);
        assert_eq!(surface.cursor(), "default");
        surface.detach_listeners(ListenerSet::Passive);
        surface.attach_listeners(ListenerSet::ManualPick);
        assert_eq!(surface.cursor(), "pointer");
    }
}
