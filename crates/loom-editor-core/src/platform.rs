//! Platform abstraction for the rendered surface.
//!
//! `RenderedSurface` defines the interface between the engine and the live
//! rendering of the document (a sandboxed iframe in the browser, an in-memory
//! tree in `HeadlessSurface`). The surface is a pass-through to the live tree
//! plus a serializer: it never holds mutation intent of its own.

use std::fmt;

use smol_str::SmolStr;

use crate::mode::ListenerSet;
use crate::types::{Generation, PointerInput, Rect};

/// Error type for surface operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceError(pub String);

impl fmt::Display for SurfaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "surface error: {}", self.0)
    }
}

impl std::error::Error for SurfaceError {}

impl From<&str> for SurfaceError {
    fn from(s: &str) -> Self {
        SurfaceError(s.to_string())
    }
}

impl From<String> for SurfaceError {
    fn from(s: String) -> Self {
        SurfaceError(s)
    }
}

/// Tags of the two structural roots, which are never selectable.
pub const STRUCTURAL_ROOTS: [&str; 2] = ["html", "body"];

/// True if `tag` names one of the document's structural roots.
pub fn is_structural_root(tag: &str) -> bool {
    STRUCTURAL_ROOTS
        .iter()
        .any(|root| root.eq_ignore_ascii_case(tag))
}

/// A live, isolated rendering of the document.
///
/// Node handles (`Self::Node`) are only meaningful under the generation they
/// were obtained in; the engine stamps them into `NodeRef`s and checks
/// `generation()` before every use.
pub trait RenderedSurface {
    /// Raw handle to one element of the live tree.
    type Node: Clone + PartialEq + fmt::Debug;

    // === Document lifecycle ===

    /// Replace the rendered tree entirely with `document`.
    ///
    /// Must bump `generation()` even if rendering fails, so no handle from the
    /// previous tree is ever considered current again.
    fn render(&mut self, document: &str) -> Result<(), SurfaceError>;

    /// Current render generation.
    fn generation(&self) -> Generation;

    /// Serialize the full live document, including any in-place mutations.
    fn serialize(&self) -> Result<String, SurfaceError>;

    // === Queries ===

    /// Innermost element under the pointer, never `html` or `body`.
    fn hit_test(&self, pointer: PointerInput) -> Option<Self::Node>;

    /// Fresh viewport-relative geometry. Implementations must not cache.
    fn bounding_box(&self, node: &Self::Node) -> Option<Rect>;

    /// Whether the node is still part of the live tree.
    fn is_attached(&self, node: &Self::Node) -> bool;

    /// Whether `node` is `ancestor` itself or one of its descendants.
    fn contains(&self, ancestor: &Self::Node, node: &Self::Node) -> bool;

    /// Lowercase tag name.
    fn tag_name(&self, node: &Self::Node) -> SmolStr;

    fn attribute(&self, node: &Self::Node, name: &str) -> Option<String>;

    fn inner_html(&self, node: &Self::Node) -> String;

    fn outer_html(&self, node: &Self::Node) -> String;

    fn text_content(&self, node: &Self::Node) -> String;

    /// Whether the element contains nested elements (rich content).
    fn has_element_children(&self, node: &Self::Node) -> bool;

    // === Mutations ===

    fn set_attribute(
        &mut self,
        node: &Self::Node,
        name: &str,
        value: &str,
    ) -> Result<(), SurfaceError>;

    fn remove_attribute(&mut self, node: &Self::Node, name: &str) -> Result<(), SurfaceError>;

    fn set_inner_html(&mut self, node: &Self::Node, markup: &str) -> Result<(), SurfaceError>;

    /// Replace the element's children with a single text node.
    fn set_text_content(&mut self, node: &Self::Node, text: &str) -> Result<(), SurfaceError>;

    /// Detach the element from the live tree.
    fn remove_node(&mut self, node: &Self::Node) -> Result<(), SurfaceError>;

    // === Listener lifecycle ===

    /// Attach the document-level listener set for a mode.
    ///
    /// Only ever called by `ModeMachine`, paired with `detach_listeners`.
    fn attach_listeners(&mut self, set: ListenerSet);

    /// Detach a previously attached listener set. After this returns, none of
    /// its handlers may run again.
    fn detach_listeners(&mut self, set: ListenerSet);

    /// Make `node` directly editable: editable flag, `editing_class` marker,
    /// focus, and blur/keydown listeners scoped to the element.
    fn begin_editing(&mut self, node: &Self::Node, editing_class: &str)
    -> Result<(), SurfaceError>;

    /// Undo everything `begin_editing` did, leaving the element's markup as
    /// it would be without the edit markers.
    fn end_editing(&mut self, node: &Self::Node, editing_class: &str);
}
