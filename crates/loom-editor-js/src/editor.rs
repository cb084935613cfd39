//! JsLiveEditor - the live editor wrapper for JavaScript.

use loom_editor_browser::{IframeSurface, MountedEditor};
use loom_editor_core::{AiCompletion, EditorConfig, EngineError, InteractionMode, LiveEditor};
use serde::Serialize;
use wasm_bindgen::prelude::*;
use web_sys::HtmlIFrameElement;

use crate::host::JsHost;

type Engine = LiveEditor<IframeSurface, JsHost>;

fn engine_err(err: EngineError) -> JsError {
    JsError::new(&err.to_string())
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsError> {
    serde_wasm_bindgen::to_value(value)
        .map_err(|e| JsError::new(&format!("Serialization error: {}", e)))
}

fn mode_name(mode: InteractionMode) -> &'static str {
    match mode {
        InteractionMode::Viewing => "viewing",
        InteractionMode::ManualEdit => "manualEdit",
        InteractionMode::AiSelect => "aiSelect",
    }
}

fn parse_mode(mode: &str) -> Result<InteractionMode, JsError> {
    match mode {
        "viewing" => Ok(InteractionMode::Viewing),
        "manualEdit" => Ok(InteractionMode::ManualEdit),
        "aiSelect" => Ok(InteractionMode::AiSelect),
        other => Err(JsError::new(&format!("Unknown mode: {}", other))),
    }
}

/// A live editor mounted on an iframe.
///
/// Callbacks run synchronously inside editor calls. Calling back into the
/// editor from a callback throws; defer such calls with `queueMicrotask`.
#[wasm_bindgen]
pub struct JsLiveEditor {
    inner: MountedEditor<JsHost>,
}

impl JsLiveEditor {
    fn run<R>(&self, f: impl FnOnce(&mut Engine) -> Result<R, EngineError>) -> Result<R, JsError> {
        self.inner
            .with(f)
            .and_then(|result| result)
            .map_err(engine_err)
    }
}

#[wasm_bindgen]
impl JsLiveEditor {
    /// Render `document` into `iframe`.
    ///
    /// `config` is an optional partial `EditorConfig` object
    /// (`toolbarOffset`, `textTags`, `editingClass`, `labelPromptForLinks`,
    /// `notifyOnCommit`).
    #[wasm_bindgen(constructor)]
    pub fn new(
        iframe: HtmlIFrameElement,
        document: &str,
        config: JsValue,
    ) -> Result<JsLiveEditor, JsError> {
        let config: EditorConfig = if config.is_undefined() || config.is_null() {
            EditorConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)
                .map_err(|e| JsError::new(&format!("Invalid config: {}", e)))?
        };
        let inner = MountedEditor::mount(iframe, JsHost::default(), config, document)
            .map_err(engine_err)?;
        Ok(Self { inner })
    }

    // === Callbacks ===

    /// Called with the new document string after every committed change.
    #[wasm_bindgen(js_name = onDocumentChange)]
    pub fn on_document_change(&self, callback: Option<js_sys::Function>) -> Result<(), JsError> {
        self.run(|e| {
            e.host_mut().on_document_change = callback;
            Ok(())
        })
    }

    /// Called with the selection (or null when cleared).
    #[wasm_bindgen(js_name = onSelectionChange)]
    pub fn on_selection_change(&self, callback: Option<js_sys::Function>) -> Result<(), JsError> {
        self.run(|e| {
            e.host_mut().on_selection_change = callback;
            Ok(())
        })
    }

    /// Called with `{ tag, outerHtml }` when an element is picked in AI select mode.
    #[wasm_bindgen(js_name = onAiPick)]
    pub fn on_ai_pick(&self, callback: Option<js_sys::Function>) -> Result<(), JsError> {
        self.run(|e| {
            e.host_mut().on_ai_pick = callback;
            Ok(())
        })
    }

    /// Called with `{ kind, message, warning }` for transient user messages.
    #[wasm_bindgen(js_name = onNotice)]
    pub fn on_notice(&self, callback: Option<js_sys::Function>) -> Result<(), JsError> {
        self.run(|e| {
            e.host_mut().on_notice = callback;
            Ok(())
        })
    }

    // === Document ===

    /// Get the canonical document.
    #[wasm_bindgen(js_name = getDocument)]
    pub fn get_document(&self) -> Result<String, JsError> {
        self.run(|e| Ok(e.document().to_string()))
    }

    /// Replace the document. Returns false if it was already current.
    #[wasm_bindgen(js_name = setDocument)]
    pub fn set_document(&self, document: String) -> Result<bool, JsError> {
        self.run(|e| e.set_document(document))
    }

    /// Mark an AI generation as in flight. Entering an editing mode and
    /// clicking in one are refused while it is.
    #[wasm_bindgen(js_name = setAiWorking)]
    pub fn set_ai_working(&self, working: bool) -> Result<(), JsError> {
        self.run(|e| {
            e.set_ai_working(working);
            Ok(())
        })
    }

    #[wasm_bindgen(js_name = isAiWorking)]
    pub fn is_ai_working(&self) -> Result<bool, JsError> {
        self.run(|e| Ok(e.is_ai_working()))
    }

    /// Apply `{ document, prompt?, changedRegions? }` from a finished AI run.
    #[wasm_bindgen(js_name = applyAiResult)]
    pub fn apply_ai_result(&self, completion: JsValue) -> Result<(), JsError> {
        let completion: AiCompletion = serde_wasm_bindgen::from_value(completion)
            .map_err(|e| JsError::new(&format!("Invalid completion: {}", e)))?;
        self.run(|e| e.apply_ai_result(completion))
    }

    /// Line ranges changed by the last AI run, `[{ startLine, endLine }]`.
    #[wasm_bindgen(js_name = getEmphasis)]
    pub fn get_emphasis(&self) -> Result<JsValue, JsError> {
        let regions = self.run(|e| Ok(e.emphasis().to_vec()))?;
        to_js(&regions)
    }

    // === Modes ===

    /// `"viewing"`, `"manualEdit"` or `"aiSelect"`.
    #[wasm_bindgen(js_name = getMode)]
    pub fn get_mode(&self) -> Result<String, JsError> {
        self.run(|e| Ok(mode_name(e.mode()).to_string()))
    }

    #[wasm_bindgen(js_name = setMode)]
    pub fn set_mode(&self, mode: &str) -> Result<bool, JsError> {
        let mode = parse_mode(mode)?;
        self.run(|e| e.set_mode(mode))
    }

    /// Toggle manual edit mode, returning the new mode.
    #[wasm_bindgen(js_name = toggleManualEdit)]
    pub fn toggle_manual_edit(&self) -> Result<String, JsError> {
        self.run(|e| e.toggle_manual_edit()).map(|m| mode_name(m).to_string())
    }

    /// Toggle AI select mode, returning the new mode.
    #[wasm_bindgen(js_name = toggleAiSelect)]
    pub fn toggle_ai_select(&self) -> Result<String, JsError> {
        self.run(|e| e.toggle_ai_select()).map(|m| mode_name(m).to_string())
    }

    // === Selection and toolbar ===

    #[wasm_bindgen(js_name = hasSelection)]
    pub fn has_selection(&self) -> Result<bool, JsError> {
        self.run(|e| Ok(e.selection().is_some()))
    }

    /// Clear the selection. Returns false if nothing was selected.
    pub fn deselect(&self) -> Result<bool, JsError> {
        self.run(|e| Ok(e.deselect()))
    }

    /// The toolbar to show, positioned in the iframe's offset parent, or
    /// undefined.
    pub fn toolbar(&self) -> Result<JsValue, JsError> {
        match self.run(|e| Ok(e.toolbar()))? {
            Some(toolbar) => to_js(&toolbar),
            None => Ok(JsValue::UNDEFINED),
        }
    }

    // === Text editing ===

    /// Start editing the selection.
    ///
    /// Returns `{ kind: "inPlace" }` or `{ kind: "prompt", request: { tag, current } }`;
    /// a prompt is answered with `confirmLabel` or `cancelPrompt`.
    #[wasm_bindgen(js_name = beginEdit)]
    pub fn begin_edit(&self) -> Result<JsValue, JsError> {
        let start = self.run(|e| e.begin_edit())?;
        to_js(&start)
    }

    /// Commit the open edit. Returns true if the document changed.
    #[wasm_bindgen(js_name = commitEdit)]
    pub fn commit_edit(&self) -> Result<bool, JsError> {
        self.run(|e| e.commit_edit())
    }

    #[wasm_bindgen(js_name = cancelEdit)]
    pub fn cancel_edit(&self) -> Result<(), JsError> {
        self.run(|e| e.cancel_edit())
    }

    #[wasm_bindgen(js_name = confirmLabel)]
    pub fn confirm_label(&self, value: &str) -> Result<bool, JsError> {
        self.run(|e| e.confirm_label(value))
    }

    // === Links ===

    /// Open the link prompt for the selection: `{ url, kind }`.
    #[wasm_bindgen(js_name = openLinkEditor)]
    pub fn open_link_editor(&self) -> Result<JsValue, JsError> {
        let request = self.run(|e| e.open_link_editor())?;
        to_js(&request)
    }

    #[wasm_bindgen(js_name = confirmLink)]
    pub fn confirm_link(&self, url: &str) -> Result<(), JsError> {
        self.run(|e| e.confirm_link(url))
    }

    /// Dismiss a pending link or label prompt.
    #[wasm_bindgen(js_name = cancelPrompt)]
    pub fn cancel_prompt(&self) -> Result<bool, JsError> {
        self.run(|e| Ok(e.cancel_prompt()))
    }

    // === Removal ===

    #[wasm_bindgen(js_name = removeSelected)]
    pub fn remove_selected(&self) -> Result<(), JsError> {
        self.run(|e| e.remove_selected())
    }
}
