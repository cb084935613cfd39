//! Contextual toolbar presentation.
//!
//! `present` is a pure function of mode, selection and the selection's live
//! geometry. The toolbar is a manual-editing affordance only: `AiSelect` uses
//! the selection for reporting but never shows it.

use std::borrow::Cow;

use serde::Serialize;

use crate::config::EditorConfig;
use crate::mode::InteractionMode;
use crate::selection::{ElementCategory, Selection};
use crate::types::Rect;

/// An action button on the toolbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ToolbarAction {
    /// Edit the element's text.
    Edit,
    /// Edit the element's navigation target.
    Link,
    /// Remove the element from the document.
    Remove,
    /// Clear the selection.
    Deselect,
}

/// A positioned toolbar overlay.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Toolbar {
    pub top: f64,
    pub left: f64,
    /// Non-interactive description of the element's kind.
    pub label: Cow<'static, str>,
    pub category: ElementCategory,
    pub actions: Vec<ToolbarAction>,
}

impl Toolbar {
    pub fn has(&self, action: ToolbarAction) -> bool {
        self.actions.contains(&action)
    }
}

/// Derive the toolbar for the current state, if one should be shown.
///
/// `bounds` must be the selection's freshly measured box; without it there
/// is nothing to anchor to and no toolbar is shown.
pub fn present<N: Clone>(
    mode: InteractionMode,
    selection: Option<&Selection<N>>,
    bounds: Option<Rect>,
    config: &EditorConfig,
) -> Option<Toolbar> {
    if mode != InteractionMode::ManualEdit {
        return None;
    }
    let selection = selection?;
    let bounds = bounds?;
    let category = selection.category();

    let mut actions = Vec::with_capacity(4);
    if category.is_text_editable() {
        actions.push(ToolbarAction::Edit);
    }
    if matches!(category, ElementCategory::Linkable(_)) {
        actions.push(ToolbarAction::Link);
    }
    actions.push(ToolbarAction::Remove);
    actions.push(ToolbarAction::Deselect);

    Some(Toolbar {
        top: bounds.top - config.toolbar_offset,
        left: bounds.left,
        label: tag_label(selection.tag()),
        category,
        actions,
    })
}

/// Human-readable name for a tag.
pub fn tag_label(tag: &str) -> Cow<'static, str> {
    let label = match tag.to_ascii_lowercase().as_str() {
        "p" => "Paragraph",
        "h1" => "Heading 1",
        "h2" => "Heading 2",
        "h3" => "Heading 3",
        "h4" => "Heading 4",
        "h5" => "Heading 5",
        "h6" => "Heading 6",
        "a" => "Link",
        "button" => "Button",
        "span" => "Text",
        "li" => "List Item",
        "ul" => "Unordered List",
        "ol" => "Ordered List",
        "div" => "Block",
        "section" => "Section",
        "header" => "Header",
        "footer" => "Footer",
        "nav" => "Navigation",
        "main" => "Main Content",
        "article" => "Article",
        "aside" => "Aside",
        "img" => "Image",
        "video" => "Video",
        "form" => "Form",
        "input" => "Input",
        "label" => "Label",
        "table" => "Table",
        "blockquote" => "Quote",
        "figure" => "Figure",
        "svg" => "Icon",
        _ => return Cow::Owned(tag.to_ascii_uppercase()),
    };
    Cow::Borrowed(label)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Generation, NodeRef};

    fn selection(tag: &str) -> Selection<u32> {
        Selection::new(
            NodeRef::new(0, Generation(0)),
            tag.into(),
            &EditorConfig::default(),
        )
    }

    #[test]
    fn test_no_toolbar_outside_manual_edit() {
        let config = EditorConfig::default();
        let sel = selection("p");
        let rect = Some(Rect::new(100.0, 10.0, 50.0, 20.0));
        assert!(present(InteractionMode::Viewing, Some(&sel), rect, &config).is_none());
        assert!(present(InteractionMode::AiSelect, Some(&sel), rect, &config).is_none());
        assert!(present::<u32>(InteractionMode::ManualEdit, None, rect, &config).is_none());
        assert!(present(InteractionMode::ManualEdit, Some(&sel), None, &config).is_none());
    }

    #[test]
    fn test_paragraph_toolbar() {
        let config = EditorConfig::default();
        let sel = selection("p");
        let toolbar = present(
            InteractionMode::ManualEdit,
            Some(&sel),
            Some(Rect::new(100.0, 10.0, 50.0, 20.0)),
            &config,
        )
        .unwrap();

        assert_eq!(toolbar.top, 55.0);
        assert_eq!(toolbar.left, 10.0);
        assert_eq!(toolbar.label, "Paragraph");
        assert_eq!(
            toolbar.actions,
            vec![
                ToolbarAction::Edit,
                ToolbarAction::Remove,
                ToolbarAction::Deselect
            ]
        );
    }

    #[test]
    fn test_anchor_and_plain_toolbars() {
        let config = EditorConfig::default();
        let rect = Some(Rect::new(0.0, 0.0, 10.0, 10.0));

        let anchor = present(InteractionMode::ManualEdit, Some(&selection("a")), rect, &config)
            .unwrap();
        assert!(anchor.has(ToolbarAction::Edit));
        assert!(anchor.has(ToolbarAction::Link));

        let plain = present(InteractionMode::ManualEdit, Some(&selection("div")), rect, &config)
            .unwrap();
        assert!(!plain.has(ToolbarAction::Edit));
        assert!(!plain.has(ToolbarAction::Link));
        assert!(plain.has(ToolbarAction::Deselect));
    }

    #[test]
    fn test_tag_label_fallback() {
        assert_eq!(tag_label("h2"), "Heading 2");
        assert_eq!(tag_label("LI"), "List Item");
        assert_eq!(tag_label("marquee"), "MARQUEE");
    }
}
