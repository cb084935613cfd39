//! loom-editor-core: Pure Rust live-document editing logic without browser dependencies.
//!
//! This crate provides:
//! - `RenderedSurface` trait for the live rendering of an HTML document
//! - `HeadlessSurface` - in-memory implementation for tests and non-browser hosts
//! - `ModeMachine` - exclusive interaction modes with paired listener attach/detach
//! - Inline text editing, link attribute editing and the contextual toolbar
//! - `LiveEditor<S, H>` - the engine tying them to a canonical document string

pub mod actions;
pub mod config;
pub mod edit;
pub mod engine;
pub mod error;
pub mod headless;
pub mod link;
pub mod mode;
pub mod platform;
pub mod selection;
pub mod toolbar;
pub mod types;

pub use actions::{EditKey, Key, KeyInput, KeydownResult, Modifiers};
pub use config::EditorConfig;
pub use edit::{EditSession, InlineEditor, LabelEditRequest};
pub use engine::{
    AiCompletion, ChangedRegion, ClickOutcome, EditStart, EditorHost, LiveEditor, Notice,
    PickedElement,
};
pub use error::EngineError;
pub use headless::{HeadlessSurface, NodeId};
pub use link::{LinkEditRequest, extract_redirect_url, read_target, redirect_expression, write_target};
pub use mode::{InteractionMode, ListenerSet, ModeMachine};
pub use platform::{RenderedSurface, SurfaceError};
pub use selection::{EditTarget, ElementCategory, LinkKind, Selection, classify};
pub use smol_str::SmolStr;
pub use toolbar::{Toolbar, ToolbarAction, tag_label};
pub use types::{Generation, NodeRef, PointerInput, Rect};
