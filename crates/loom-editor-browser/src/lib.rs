//! Browser DOM layer for the loom live-document editor.
//!
//! This crate renders the document into a sandboxed `<iframe>` and wires its
//! DOM events back into the core engine. It assumes a
//! `wasm32-unknown-unknown` target environment.
//!
//! # Architecture
//!
//! - `surface`: `IframeSurface`, the `RenderedSurface` over the iframe's document
//! - `events`: DOM event extraction into `SurfaceEvent`s
//! - `listeners`: `gloo-events` guards for one listener set or edit session
//! - `mount`: `MountedEditor`, the engine shared with the surface's listeners
//!
//! # Re-exports
//!
//! This crate re-exports `loom-editor-core` for convenience, so consumers
//! only need to depend on `loom-editor-browser`.

// Re-export core crate
pub use loom_editor_core;
pub use loom_editor_core::*;

pub mod events;
mod listeners;
pub mod mount;
pub mod surface;

pub use events::{EventResult, EventSink, SurfaceEvent, key_input_from_event, parse_key};
pub use mount::MountedEditor;
pub use surface::IframeSurface;
