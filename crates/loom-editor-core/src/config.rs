use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// Engine configuration.
///
/// Every field has a default, so hosts only pass what they want to change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    /// Vertical distance between the toolbar and the top of the selection.
    pub toolbar_offset: f64,
    /// Tags whose text can be edited in place.
    pub text_tags: Vec<SmolStr>,
    /// Class put on the element while it is being edited.
    pub editing_class: SmolStr,
    /// Edit childless anchors/buttons through a single-line prompt.
    pub label_prompt_for_links: bool,
    /// Emit `Notice::ElementUpdated` after a changed commit.
    pub notify_on_commit: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            toolbar_offset: 45.0,
            text_tags: ["p", "h1", "h2", "h3", "h4", "h5", "h6", "span", "li"]
                .into_iter()
                .map(SmolStr::new_static)
                .collect(),
            editing_class: SmolStr::new_static("editing-element"),
            label_prompt_for_links: true,
            notify_on_commit: true,
        }
    }
}

impl EditorConfig {
    /// Whether `tag` is configured as text-bearing.
    pub fn is_text_tag(&self, tag: &str) -> bool {
        self.text_tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }
}
