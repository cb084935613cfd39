//! WASM bindings for the loom live-document editor.
//!
//! Mounts the editor on an `<iframe>` in a JavaScript/TypeScript app. The
//! app owns the document string; the editor reports every committed change
//! through `onDocumentChange`.

mod editor;
mod host;
mod types;

pub use editor::*;
pub use types::*;

use wasm_bindgen::prelude::*;

/// Initialize panic hook and console logging.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();

    let level = if cfg!(debug_assertions) {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_wasm::set_as_global_default_with_config(
        tracing_wasm::WASMLayerConfigBuilder::new()
            .set_max_level(level)
            .build(),
    );
}
