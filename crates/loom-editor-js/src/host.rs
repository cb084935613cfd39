//! Engine callbacks routed to JavaScript functions.

use loom_editor_core::{EditorHost, Notice, PickedElement, Selection};
use serde::Serialize;
use wasm_bindgen::JsValue;
use web_sys::Element;

use crate::types::{JsNotice, JsPickedElement, JsSelection};

/// Host whose callbacks are optional JS functions.
#[derive(Default)]
pub(crate) struct JsHost {
    pub(crate) on_document_change: Option<js_sys::Function>,
    pub(crate) on_selection_change: Option<js_sys::Function>,
    pub(crate) on_ai_pick: Option<js_sys::Function>,
    pub(crate) on_notice: Option<js_sys::Function>,
}

fn call(callback: &Option<js_sys::Function>, arg: JsValue) {
    let Some(callback) = callback else {
        return;
    };
    if let Err(err) = callback.call1(&JsValue::NULL, &arg) {
        tracing::warn!(?err, "host callback threw");
    }
}

fn to_js<T: Serialize>(value: &T) -> JsValue {
    serde_wasm_bindgen::to_value(value).unwrap_or_else(|err| {
        tracing::warn!(%err, "failed to convert callback payload");
        JsValue::UNDEFINED
    })
}

impl EditorHost<Element> for JsHost {
    fn document_changed(&mut self, document: &str) {
        call(&self.on_document_change, JsValue::from_str(document));
    }

    fn selection_changed(&mut self, selection: Option<&Selection<Element>>) {
        let arg = match selection {
            Some(selection) => to_js(&JsSelection::from(selection)),
            None => JsValue::NULL,
        };
        call(&self.on_selection_change, arg);
    }

    fn ai_element_picked(&mut self, picked: &PickedElement) {
        call(&self.on_ai_pick, to_js(&JsPickedElement::from(picked)));
    }

    fn notice(&mut self, notice: Notice) {
        call(&self.on_notice, to_js(&JsNotice::from(notice)));
    }
}
