//! Types exposed to JavaScript via wasm-bindgen.

use loom_editor_core::{ElementCategory, Notice, PickedElement, Selection, tag_label};
use serde::Serialize;
use tsify_next::Tsify;
use wasm_bindgen::prelude::*;

/// A transient message for the user.
#[derive(Debug, Clone, Serialize, Tsify)]
#[tsify(into_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct JsNotice {
    /// `aiBusy`, `elementUpdated`, `linkUpdated` or `elementRemoved`.
    pub kind: String,
    pub message: String,
    pub warning: bool,
}

impl From<Notice> for JsNotice {
    fn from(notice: Notice) -> Self {
        let kind = match notice {
            Notice::AiBusy => "aiBusy",
            Notice::ElementUpdated => "elementUpdated",
            Notice::LinkUpdated => "linkUpdated",
            Notice::ElementRemoved => "elementRemoved",
        };
        Self {
            kind: kind.to_string(),
            message: notice.message().to_string(),
            warning: notice.is_warning(),
        }
    }
}

/// The selected element, as reported to `onSelectionChange`.
#[derive(Debug, Clone, Serialize, Tsify)]
#[tsify(into_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct JsSelection {
    pub tag: String,
    /// Human-readable kind, e.g. "Heading 1".
    pub label: String,
    pub text_editable: bool,
    pub linkable: bool,
}

impl<N: Clone> From<&Selection<N>> for JsSelection {
    fn from(selection: &Selection<N>) -> Self {
        let category = selection.category();
        Self {
            tag: selection.tag().to_string(),
            label: tag_label(selection.tag()).into_owned(),
            text_editable: category.is_text_editable(),
            linkable: matches!(category, ElementCategory::Linkable(_)),
        }
    }
}

/// Element picked in AI select mode.
#[derive(Debug, Clone, Serialize, Tsify)]
#[tsify(into_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct JsPickedElement {
    pub tag: String,
    pub outer_html: String,
}

impl From<&PickedElement> for JsPickedElement {
    fn from(picked: &PickedElement) -> Self {
        Self {
            tag: picked.tag.to_string(),
            outer_html: picked.outer_html.clone(),
        }
    }
}
