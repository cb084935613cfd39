//! Element categories and the current selection.
//!
//! The category of a selected element decides which toolbar actions apply.
//! `EditTarget` is the type-level permission to open an inline edit: it can
//! only be obtained from a selection whose category is text-editable.

use serde::Serialize;
use smol_str::SmolStr;

use crate::config::EditorConfig;
use crate::types::NodeRef;

/// How a linkable element stores its navigation target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LinkKind {
    /// `<a href>`.
    Anchor,
    /// `<button onclick="window.location.href='...'">`.
    ButtonRedirect,
}

/// Capability category of an element, derived from its tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "link")]
pub enum ElementCategory {
    TextBearing,
    Linkable(LinkKind),
    Plain,
}

impl ElementCategory {
    /// Whether the edit action applies.
    ///
    /// Linkable elements carry a label, so they are text-editable too.
    pub fn is_text_editable(self) -> bool {
        matches!(self, Self::TextBearing | Self::Linkable(_))
    }

    pub fn link_kind(self) -> Option<LinkKind> {
        match self {
            Self::Linkable(kind) => Some(kind),
            _ => None,
        }
    }
}

/// Classify a (lowercase) tag name.
pub fn classify(tag: &str, config: &EditorConfig) -> ElementCategory {
    if tag.eq_ignore_ascii_case("a") {
        ElementCategory::Linkable(LinkKind::Anchor)
    } else if tag.eq_ignore_ascii_case("button") {
        ElementCategory::Linkable(LinkKind::ButtonRedirect)
    } else if config.is_text_tag(tag) {
        ElementCategory::TextBearing
    } else {
        ElementCategory::Plain
    }
}

/// The selected element plus its derived category.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection<N> {
    target: NodeRef<N>,
    tag: SmolStr,
    category: ElementCategory,
}

impl<N: Clone> Selection<N> {
    pub fn new(target: NodeRef<N>, tag: SmolStr, config: &EditorConfig) -> Self {
        let category = classify(&tag, config);
        Self {
            target,
            tag,
            category,
        }
    }

    pub fn target(&self) -> &NodeRef<N> {
        &self.target
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn category(&self) -> ElementCategory {
        self.category
    }

    /// Permission to open an inline edit on this element, if its category allows it.
    pub fn edit_target(&self) -> Option<EditTarget<N>> {
        self.category.is_text_editable().then(|| EditTarget {
            target: self.target.clone(),
            tag: self.tag.clone(),
        })
    }
}

/// A node proven text-editable at selection time.
///
/// No public constructor: `InlineEditor::begin` accepts only these, so
/// opening an edit on a plain element cannot be expressed.
#[derive(Debug, Clone, PartialEq)]
pub struct EditTarget<N> {
    target: NodeRef<N>,
    tag: SmolStr,
}

impl<N> EditTarget<N> {
    pub fn target(&self) -> &NodeRef<N> {
        &self.target
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub(crate) fn into_target(self) -> NodeRef<N> {
        self.target
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Generation;

    #[test]
    fn test_classify_defaults() {
        let config = EditorConfig::default();
        assert_eq!(classify("p", &config), ElementCategory::TextBearing);
        assert_eq!(classify("h3", &config), ElementCategory::TextBearing);
        assert_eq!(
            classify("a", &config),
            ElementCategory::Linkable(LinkKind::Anchor)
        );
        assert_eq!(
            classify("button", &config),
            ElementCategory::Linkable(LinkKind::ButtonRedirect)
        );
        assert_eq!(classify("div", &config), ElementCategory::Plain);
        assert_eq!(classify("img", &config), ElementCategory::Plain);
    }

    #[test]
    fn test_classify_respects_config() {
        let config = EditorConfig {
            text_tags: vec!["blockquote".into()],
            ..Default::default()
        };
        assert_eq!(classify("blockquote", &config), ElementCategory::TextBearing);
        assert_eq!(classify("p", &config), ElementCategory::Plain);
    }

    #[test]
    fn test_edit_target_gated_on_category() {
        let config = EditorConfig::default();
        let para = Selection::new(NodeRef::new(1u32, Generation(0)), "p".into(), &config);
        let div = Selection::new(NodeRef::new(2u32, Generation(0)), "div".into(), &config);
        let link = Selection::new(NodeRef::new(3u32, Generation(0)), "a".into(), &config);

        assert!(para.edit_target().is_some());
        assert!(div.edit_target().is_none());
        assert!(link.edit_target().is_some());
    }
}
