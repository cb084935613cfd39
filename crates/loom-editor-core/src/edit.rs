//! Inline edit sessions.
//!
//! An edit session turns one text-editable element into a directly editable
//! region and remembers its pre-edit markup. Commit compares against that
//! snapshot: unchanged content never produces a document update.

use serde::Serialize;

use crate::error::EngineError;
use crate::platform::{RenderedSurface, SurfaceError};
use crate::selection::EditTarget;
use crate::types::NodeRef;

/// The one in-progress direct edit.
#[derive(Debug, Clone, PartialEq)]
pub struct EditSession<N> {
    target: NodeRef<N>,
    snapshot: String,
}

impl<N> EditSession<N> {
    pub fn target(&self) -> &NodeRef<N> {
        &self.target
    }

    /// Inner markup of the element when the session opened.
    pub fn snapshot(&self) -> &str {
        &self.snapshot
    }
}

/// Result of closing an edit session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Content matched the snapshot (or the tree was already replaced).
    Unchanged,
    /// Content changed; carries the freshly serialized document.
    Changed(String),
}

/// Owns at most one `EditSession`.
#[derive(Debug)]
pub struct InlineEditor<N> {
    session: Option<EditSession<N>>,
}

impl<N> Default for InlineEditor<N> {
    fn default() -> Self {
        Self { session: None }
    }
}

impl<N: Clone + PartialEq + std::fmt::Debug> InlineEditor<N> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> Option<&EditSession<N>> {
        self.session.as_ref()
    }

    pub fn is_editing(&self) -> bool {
        self.session.is_some()
    }

    /// Open a session on `target`.
    ///
    /// A session that is already open is committed first; its outcome is
    /// returned so the caller can propagate it.
    pub fn begin<S: RenderedSurface<Node = N>>(
        &mut self,
        surface: &mut S,
        target: EditTarget<N>,
        editing_class: &str,
    ) -> Result<Option<CommitOutcome>, EngineError> {
        let previous = if self.session.is_some() {
            Some(self.commit(surface, editing_class)?)
        } else {
            None
        };

        let target = target.into_target();
        if !is_live(surface, &target) {
            return Err(EngineError::StaleReference);
        }

        let snapshot = surface.inner_html(target.node());
        surface.begin_editing(target.node(), editing_class)?;
        tracing::debug!(
            tag = %surface.tag_name(target.node()),
            snapshot_len = snapshot.len(),
            "edit session opened"
        );
        self.session = Some(EditSession { target, snapshot });
        Ok(previous)
    }

    /// Close the session, serializing the document only if content changed.
    ///
    /// The session and the element's edit markers are cleared whether or
    /// not anything changed, and even if serialization fails.
    pub fn commit<S: RenderedSurface<Node = N>>(
        &mut self,
        surface: &mut S,
        editing_class: &str,
    ) -> Result<CommitOutcome, EngineError> {
        let session = self.session.take().ok_or(EngineError::NoEditSession)?;
        if !is_live(surface, &session.target) {
            tracing::debug!("edit session target gone, dropping session");
            return Ok(CommitOutcome::Unchanged);
        }

        let node = session.target.node();
        surface.end_editing(node, editing_class);

        if surface.inner_html(node) == session.snapshot {
            tracing::trace!("edit session closed without changes");
            return Ok(CommitOutcome::Unchanged);
        }

        let document = surface.serialize()?;
        tracing::debug!(len = document.len(), "edit session committed");
        Ok(CommitOutcome::Changed(document))
    }

    /// Restore the snapshot into the element. The session stays open.
    pub fn rollback<S: RenderedSurface<Node = N>>(&self, surface: &mut S) -> Result<(), EngineError> {
        let session = self.session.as_ref().ok_or(EngineError::NoEditSession)?;
        if !is_live(surface, &session.target) {
            return Ok(());
        }
        surface.set_inner_html(session.target.node(), &session.snapshot)?;
        Ok(())
    }

    /// Roll back, then commit the original content.
    pub fn cancel<S: RenderedSurface<Node = N>>(
        &mut self,
        surface: &mut S,
        editing_class: &str,
    ) -> Result<CommitOutcome, EngineError> {
        if let Err(err) = self.rollback(surface) {
            // Still close the session; a failed rollback must not leave it open.
            self.commit(surface, editing_class)?;
            return Err(err);
        }
        self.commit(surface, editing_class)
    }

    /// Forget the session without touching the surface.
    ///
    /// Only valid once the tree the session pointed into is gone.
    pub(crate) fn abandon(&mut self) {
        self.session = None;
    }
}

/// Payload for the single-line label prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelEditRequest {
    pub tag: String,
    pub current: String,
}

/// Write a prompted label into `node`.
///
/// Returns false (and writes nothing) for empty or unchanged values.
pub fn apply_label<S: RenderedSurface>(
    surface: &mut S,
    node: &S::Node,
    value: &str,
) -> Result<bool, SurfaceError> {
    let value = value.trim();
    if value.is_empty() || value == surface.text_content(node).trim() {
        return Ok(false);
    }
    surface.set_text_content(node, value)?;
    Ok(true)
}

pub(crate) fn is_live<S: RenderedSurface>(surface: &S, target: &NodeRef<S::Node>) -> bool {
    target.is_current(surface.generation()) && surface.is_attached(target.node())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EditorConfig;
    use crate::headless::HeadlessSurface;
    use crate::selection::Selection;

    const CLASS: &str = "editing-element";

    fn select(surface: &HeadlessSurface, tag: &str) -> Selection<crate::headless::NodeId> {
        let node = surface.find_first(tag).expect("element exists");
        Selection::new(
            NodeRef::new(node, surface.generation()),
            tag.into(),
            &EditorConfig::default(),
        )
    }

    #[test]
    fn test_commit_without_changes_is_unchanged() {
        let mut surface = HeadlessSurface::from_document("<body><p>Hello</p></body>");
        let mut editor = InlineEditor::new();
        let target = select(&surface, "p").edit_target().unwrap();

        editor.begin(&mut surface, target, CLASS).unwrap();
        assert!(editor.is_editing());
        let outcome = editor.commit(&mut surface, CLASS).unwrap();

        assert_eq!(outcome, CommitOutcome::Unchanged);
        assert!(!editor.is_editing());
        assert_eq!(
            surface.serialize().unwrap(),
            "<body><p>Hello</p></body>"
        );
    }

    #[test]
    fn test_commit_with_changes_serializes() {
        let mut surface = HeadlessSurface::from_document("<body><p>Hello</p></body>");
        let mut editor = InlineEditor::new();
        let target = select(&surface, "p").edit_target().unwrap();
        let node = *target.target().node();

        editor.begin(&mut surface, target, CLASS).unwrap();
        assert_eq!(
            surface.attribute(&node, "contenteditable").as_deref(),
            Some("true")
        );
        surface.set_text_content(&node, "Goodbye").unwrap();

        let outcome = editor.commit(&mut surface, CLASS).unwrap();
        assert_eq!(
            outcome,
            CommitOutcome::Changed("<body><p>Goodbye</p></body>".to_string())
        );
    }

    #[test]
    fn test_cancel_restores_snapshot() {
        let mut surface =
            HeadlessSurface::from_document("<body><p class=\"lead\">Hi <b>there</b></p></body>");
        let mut editor = InlineEditor::new();
        let target = select(&surface, "p").edit_target().unwrap();
        let node = *target.target().node();

        editor.begin(&mut surface, target, CLASS).unwrap();
        surface.set_inner_html(&node, "scribbles").unwrap();

        let outcome = editor.cancel(&mut surface, CLASS).unwrap();
        assert_eq!(outcome, CommitOutcome::Unchanged);
        assert_eq!(
            surface.serialize().unwrap(),
            "<body><p class=\"lead\">Hi <b>there</b></p></body>"
        );
    }

    #[test]
    fn test_begin_commits_previous_session() {
        let mut surface =
            HeadlessSurface::from_document("<body><p>One</p><h1>Two</h1></body>");
        let mut editor = InlineEditor::new();
        let first = select(&surface, "p").edit_target().unwrap();
        let first_node = *first.target().node();
        editor.begin(&mut surface, first, CLASS).unwrap();
        surface.set_text_content(&first_node, "Uno").unwrap();

        let second = select(&surface, "h1").edit_target().unwrap();
        let previous = editor.begin(&mut surface, second, CLASS).unwrap();

        // The previous session is serialized before the new one marks its element.
        assert_eq!(
            previous,
            Some(CommitOutcome::Changed(
                "<body><p>Uno</p><h1>Two</h1></body>".to_string()
            ))
        );
        assert_eq!(surface.attribute(&first_node, "contenteditable"), None);
        assert_eq!(editor.session().map(|s| s.snapshot()), Some("Two"));
    }

    #[test]
    fn test_apply_label_skips_empty_and_unchanged() {
        let mut surface = HeadlessSurface::from_document("<body><button>Buy</button></body>");
        let node = surface.find_first("button").unwrap();

        assert!(!apply_label(&mut surface, &node, "   ").unwrap());
        assert!(!apply_label(&mut surface, &node, "Buy").unwrap());
        assert!(apply_label(&mut surface, &node, " Buy now ").unwrap());
        assert_eq!(surface.text_content(&node), "Buy now");
    }
}
