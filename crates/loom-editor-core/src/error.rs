//! Error types for engine operations.

use thiserror::Error;

use crate::platform::SurfaceError;

/// Errors returned by `LiveEditor` operations.
///
/// None of these leave the engine in a partial state: a rejected call
/// leaves mode, selection and document as they were, except
/// `StaleReference`, which clears the selection it was found on.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum EngineError {
    /// The node handle predates the current render.
    #[error("node reference is stale")]
    StaleReference,

    /// The operation needs a selection and there is none.
    #[error("no element selected")]
    NoSelection,

    /// The selected element is not text-editable.
    #[error("<{0}> is not text-editable")]
    NotEditable(String),

    /// The selected element has no navigation target.
    #[error("<{0}> is not linkable")]
    NotLinkable(String),

    /// No inline edit session is open.
    #[error("no edit session open")]
    NoEditSession,

    /// No link or label prompt is awaiting confirmation.
    #[error("no prompt awaiting confirmation")]
    NoPendingPrompt,

    /// The operation is only valid in an edit-capable mode.
    #[error("operation requires manual edit mode")]
    ModeInactive,

    /// A document replacement is in flight.
    #[error("AI is still working on the document")]
    AiBusy,

    /// The surface rejected a mutation or failed to serialize.
    #[error(transparent)]
    Surface(#[from] SurfaceError),
}
