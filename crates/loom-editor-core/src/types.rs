//! Core geometry and handle types: rects, pointer input, and generation-stamped node refs.
//!
//! These types are surface-agnostic and can be used with any `RenderedSurface` implementation.

use serde::{Deserialize, Serialize};

/// Viewport-relative box of a rendered element.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Create a new rect.
    pub fn new(top: f64, left: f64, width: f64, height: f64) -> Self {
        Self {
            top,
            left,
            width,
            height,
        }
    }

    /// Bottom edge (exclusive).
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Right edge (exclusive).
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    /// Check if a point lies inside the rect.
    ///
    /// The top-left edge is inclusive, the bottom-right edge exclusive, so
    /// adjacent boxes never both claim a point on their shared border.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.left && x < self.right() && y >= self.top && y < self.bottom()
    }
}

/// Pointer position in surface viewport coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PointerInput {
    pub x: f64,
    pub y: f64,
}

impl PointerInput {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Render generation of a surface.
///
/// Bumped on every `render`. A node handle is only valid under the
/// generation it was acquired in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(pub u64);

impl Generation {
    /// The generation that follows this one.
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// A live handle into the rendered tree, stamped with its generation.
///
/// Only the engine and surfaces mint these. Use [`NodeRef::is_current`] or
/// let the engine revalidate before touching the node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeRef<N> {
    node: N,
    generation: Generation,
}

impl<N> NodeRef<N> {
    /// Stamp a raw node handle with the generation it was acquired under.
    pub fn new(node: N, generation: Generation) -> Self {
        Self { node, generation }
    }

    pub fn node(&self) -> &N {
        &self.node
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// True if this handle was acquired under `current`.
    pub fn is_current(&self, current: Generation) -> bool {
        self.generation == current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_contains_edges() {
        let rect = Rect::new(10.0, 20.0, 100.0, 50.0);
        assert!(rect.contains(20.0, 10.0));
        assert!(rect.contains(119.9, 59.9));
        assert!(!rect.contains(120.0, 30.0)); // right edge exclusive
        assert!(!rect.contains(30.0, 60.0)); // bottom edge exclusive
        assert!(!rect.contains(19.0, 30.0));
    }

    #[test]
    fn test_node_ref_generation() {
        let gen1 = Generation(3);
        let node_ref = NodeRef::new(7usize, gen1);
        assert!(node_ref.is_current(gen1));
        assert!(!node_ref.is_current(gen1.next()));
        assert_eq!(*node_ref.node(), 7);
    }
}
