//! The live editing engine.
//!
//! `LiveEditor` owns the surface, the canonical document string and every
//! piece of transient editing state (mode, selection, edit session, open
//! prompt). All of that state is torn down through one routine,
//! `invalidate`, which runs before any mode change and before any external
//! document replacement touches the tree.


use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::actions::{EditKey, KeyInput, KeydownResult};
use crate::config::EditorConfig;
use crate::edit::{CommitOutcome, EditSession, InlineEditor, LabelEditRequest, apply_label, is_live};
use crate::error::EngineError;
use crate::link::{LinkEditRequest, read_target, write_target};
use crate::mode::{InteractionMode, ModeMachine};
use crate::platform::{RenderedSurface, is_structural_root};
use crate::selection::{LinkKind, Selection};
use crate::toolbar::{self, Toolbar};
use crate::types::{NodeRef, PointerInput};

/// Callbacks from the engine to the application shell.
///
/// Every method has a no-op default.
pub trait EditorHost<N> {
    /// The canonical document changed through a commit.
    fn document_changed(&mut self, _document: &str) {}

    /// The selection was set, replaced or cleared.
    fn selection_changed(&mut self, _selection: Option<&Selection<N>>) {}

    /// An element was picked in `AiSelect` mode.
    fn ai_element_picked(&mut self, _picked: &PickedElement) {}

    /// A transient message for the user.
    fn notice(&mut self, _notice: Notice) {}
}

impl<N> EditorHost<N> for () {}

/// Transient user-facing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Notice {
    /// Interaction was refused because a document replacement is in flight.
    AiBusy,
    ElementUpdated,
    LinkUpdated,
    ElementRemoved,
}

impl Notice {
    pub fn message(self) -> &'static str {
        match self {
            Self::AiBusy => "Please wait for the AI to finish working.",
            Self::ElementUpdated => "Element updated!",
            Self::LinkUpdated => "Link updated!",
            Self::ElementRemoved => "Element removed!",
        }
    }

    /// Warnings are refusals; everything else reports success.
    pub fn is_warning(self) -> bool {
        matches!(self, Self::AiBusy)
    }
}

/// Element handed to the AI context in `AiSelect` mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PickedElement {
    pub tag: SmolStr,
    pub outer_html: String,
}

/// A line range of the new document the AI reported as changed (1-based, inclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangedRegion {
    pub start_line: u32,
    pub end_line: u32,
}

/// Final result of an AI completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiCompletion {
    pub document: String,
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub changed_regions: Vec<ChangedRegion>,
}

/// What a pointer click inside the surface amounted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ClickOutcome {
    /// `Viewing`: the click keeps its native behavior.
    Ignored,
    /// Nothing selectable was hit (empty space or a structural root).
    Missed,
    /// The click landed inside the element being edited.
    Editing,
    /// The hit element is now the selection.
    Selected,
}

impl ClickOutcome {
    /// Whether the native click behavior (navigation, form submission)
    /// must be suppressed.
    pub fn suppresses_default(self) -> bool {
        !matches!(self, Self::Ignored)
    }
}

/// How an edit action proceeds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "request")]
pub enum EditStart {
    /// The element is now directly editable on the surface.
    InPlace,
    /// The element's label is edited through a single-line prompt.
    Prompt(LabelEditRequest),
}

#[derive(Debug, Clone)]
enum Prompt<N> {
    Label(NodeRef<N>),
    Link { target: NodeRef<N>, kind: LinkKind },
}

/// Edit-synchronization engine over a rendered surface.
pub struct LiveEditor<S: RenderedSurface, H: EditorHost<S::Node> = ()> {
    surface: S,
    host: H,
    config: EditorConfig,
    document: String,
    modes: ModeMachine,
    selection: Option<Selection<S::Node>>,
    editor: InlineEditor<S::Node>,
    prompt: Option<Prompt<S::Node>>,
    emphasis: Vec<ChangedRegion>,
    ai_working: bool,
}

impl<S: RenderedSurface, H: EditorHost<S::Node>> LiveEditor<S, H> {
    /// Render `document` onto `surface` and attach the `Viewing` listeners.
    pub fn new(
        mut surface: S,
        host: H,
        config: EditorConfig,
        document: impl Into<String>,
    ) -> Result<Self, EngineError> {
        let document = document.into();
        surface.render(&document)?;
        let mut modes = ModeMachine::new();
        modes.start(&mut surface);
        Ok(Self {
            surface,
            host,
            config,
            document,
            modes,
            selection: None,
            editor: InlineEditor::new(),
            prompt: None,
            emphasis: Vec::new(),
            ai_working: false,
        })
    }

    // === Queries ===

    /// The canonical document.
    pub fn document(&self) -> &str {
        &self.document
    }

    pub fn mode(&self) -> InteractionMode {
        self.modes.mode()
    }

    pub fn selection(&self) -> Option<&Selection<S::Node>> {
        self.selection.as_ref()
    }

    pub fn edit_session(&self) -> Option<&EditSession<S::Node>> {
        self.editor.session()
    }

    /// Whether a label or link prompt awaits confirmation.
    pub fn has_pending_prompt(&self) -> bool {
        self.prompt.is_some()
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Direct access to the surface, e.g. to feed it typed input while an
    /// edit session is open. Rendering through this bypasses the engine.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Regions the last AI completion reported as changed, until the next
    /// commit or replacement.
    pub fn emphasis(&self) -> &[ChangedRegion] {
        &self.emphasis
    }

    pub fn is_ai_working(&self) -> bool {
        self.ai_working
    }

    // === Document replacement ===

    /// Replace the document from the host.
    ///
    /// Returns false without touching anything when `document` is the
    /// current one (the host echoing back a commit).
    pub fn set_document(&mut self, document: impl Into<String>) -> Result<bool, EngineError> {
        let document = document.into();
        if document == self.document {
            tracing::trace!("set_document: unchanged, skipping re-render");
            return Ok(false);
        }
        self.replace(document)?;
        self.emphasis.clear();
        Ok(true)
    }

    /// Mark an AI generation as in flight (or finished).
    pub fn set_ai_working(&mut self, working: bool) {
        if self.ai_working != working {
            tracing::debug!(working, "ai working state changed");
        }
        self.ai_working = working;
    }

    /// Apply a finished AI completion as a full document replacement.
    pub fn apply_ai_result(&mut self, completion: AiCompletion) -> Result<(), EngineError> {
        self.ai_working = false;
        tracing::debug!(
            prompt_len = completion.prompt.len(),
            regions = completion.changed_regions.len(),
            "applying ai completion"
        );
        let result = self.replace(completion.document);
        self.emphasis = completion.changed_regions;
        result
    }

    fn replace(&mut self, document: String) -> Result<(), EngineError> {
        self.invalidate();
        self.document = document;
        self.surface.render(&self.document)?;
        Ok(())
    }

    // === Modes ===

    /// Switch interaction mode.
    ///
    /// Returns false if `next` is already active. A request to go straight
    /// from one edit-capable mode to the other passes through `Viewing`.
    pub fn set_mode(&mut self, next: InteractionMode) -> Result<bool, EngineError> {
        let current = self.mode();
        if current == next {
            return Ok(false);
        }
        if next.is_edit_capable() {
            self.reject_if_ai_busy()?;
        }
        if current.is_edit_capable() && next.is_edit_capable() {
            self.transition(InteractionMode::Viewing);
        }
        self.transition(next);
        Ok(true)
    }

    pub fn toggle_manual_edit(&mut self) -> Result<InteractionMode, EngineError> {
        self.toggle(InteractionMode::ManualEdit)
    }

    pub fn toggle_ai_select(&mut self) -> Result<InteractionMode, EngineError> {
        self.toggle(InteractionMode::AiSelect)
    }

    fn toggle(&mut self, mode: InteractionMode) -> Result<InteractionMode, EngineError> {
        let next = if self.mode() == mode {
            InteractionMode::Viewing
        } else {
            mode
        };
        self.set_mode(next)?;
        Ok(self.mode())
    }

    fn transition(&mut self, next: InteractionMode) {
        self.invalidate();
        self.modes.transition(&mut self.surface, next);
    }

    /// Detach the live listener set, committing any open edit first.
    pub fn stop(&mut self) {
        self.invalidate();
        self.modes.stop(&mut self.surface);
    }

    // === Pointer input ===

    /// Hit-test the surface and stamp the result with the current generation.
    pub fn hit_test(&self, pointer: PointerInput) -> Option<NodeRef<S::Node>> {
        self.surface
            .hit_test(pointer)
            .map(|node| NodeRef::new(node, self.surface.generation()))
    }

    /// Handle a click at `pointer`.
    pub fn on_pointer(&mut self, pointer: PointerInput) -> Result<ClickOutcome, EngineError> {
        self.reject_if_ai_busy()?;
        if !self.mode().is_edit_capable() {
            return Ok(ClickOutcome::Ignored);
        }
        match self.hit_test(pointer) {
            Some(target) => self.on_surface_click(target),
            None => Ok(ClickOutcome::Missed),
        }
    }

    /// Handle a click that landed on `target`.
    pub fn on_surface_click(
        &mut self,
        target: NodeRef<S::Node>,
    ) -> Result<ClickOutcome, EngineError> {
        self.reject_if_ai_busy()?;
        let mode = self.mode();
        if !mode.is_edit_capable() {
            return Ok(ClickOutcome::Ignored);
        }
        if !is_live(&self.surface, &target) {
            tracing::warn!("click on a stale node reference");
            self.set_selection(None);
            return Err(EngineError::StaleReference);
        }

        let inside_edit = self
            .editor
            .session()
            .is_some_and(|session| self.surface.contains(session.target().node(), target.node()));
        if inside_edit {
            return Ok(ClickOutcome::Editing);
        }

        let tag = self.surface.tag_name(target.node());
        if is_structural_root(&tag) {
            return Ok(ClickOutcome::Missed);
        }

        if mode == InteractionMode::AiSelect {
            let picked = PickedElement {
                tag: tag.clone(),
                outer_html: self.surface.outer_html(target.node()),
            };
            tracing::debug!(%tag, "element picked for ai context");
            self.host.ai_element_picked(&picked);
        }

        let selection = Selection::new(target, tag, &self.config);
        self.set_selection(Some(selection));
        Ok(ClickOutcome::Selected)
    }

    /// Clear the selection. Returns false if there was none.
    pub fn deselect(&mut self) -> bool {
        let had = self.selection.is_some();
        self.set_selection(None);
        had
    }

    // === Inline editing ===

    /// Start editing the selected element's text.
    ///
    /// Childless links and buttons go through the label prompt (confirm with
    /// [`confirm_label`](Self::confirm_label)); everything else becomes
    /// editable in place. The selection is cleared either way.
    pub fn begin_edit(&mut self) -> Result<EditStart, EngineError> {
        self.reject_if_ai_busy()?;
        self.require_manual_edit()?;
        let selection = self.live_selection()?;
        let Some(target) = selection.edit_target() else {
            return Err(EngineError::NotEditable(selection.tag().to_string()));
        };

        let node = target.target().node();
        let use_prompt = self.config.label_prompt_for_links
            && selection.category().link_kind().is_some()
            && !self.surface.has_element_children(node);

        if use_prompt {
            let request = LabelEditRequest {
                tag: selection.tag().to_string(),
                current: self.surface.text_content(node).trim().to_string(),
            };
            self.prompt = Some(Prompt::Label(target.target().clone()));
            self.set_selection(None);
            return Ok(EditStart::Prompt(request));
        }

        let previous = self
            .editor
            .begin(&mut self.surface, target, &self.config.editing_class)?;
        if let Some(outcome) = previous {
            self.settle(outcome);
        }
        self.set_selection(None);
        Ok(EditStart::InPlace)
    }

    /// Route a keydown from the element being edited.
    pub fn handle_edit_key(&mut self, input: &KeyInput) -> Result<KeydownResult, EngineError> {
        if !self.editor.is_editing() {
            return Ok(KeydownResult::NotHandled);
        }
        match input.edit_key() {
            EditKey::Confirm => {
                self.commit_edit()?;
                Ok(KeydownResult::Handled)
            }
            EditKey::Cancel => {
                self.cancel_edit()?;
                Ok(KeydownResult::Handled)
            }
            EditKey::Other => Ok(KeydownResult::NotHandled),
        }
    }

    /// The element being edited lost focus.
    pub fn handle_edit_blur(&mut self) -> Result<(), EngineError> {
        if self.editor.is_editing() {
            self.commit_edit()?;
        }
        Ok(())
    }

    /// Close the edit session. Returns true if the document changed.
    pub fn commit_edit(&mut self) -> Result<bool, EngineError> {
        let outcome = self
            .editor
            .commit(&mut self.surface, &self.config.editing_class)?;
        Ok(self.settle(outcome))
    }

    /// Restore the pre-edit markup and close the session.
    pub fn cancel_edit(&mut self) -> Result<(), EngineError> {
        let outcome = self
            .editor
            .cancel(&mut self.surface, &self.config.editing_class)?;
        self.settle(outcome);
        Ok(())
    }

    /// Confirm the label prompt. Returns true if the document changed.
    ///
    /// Empty or unchanged values close the prompt without a write.
    pub fn confirm_label(&mut self, value: &str) -> Result<bool, EngineError> {
        self.reject_if_ai_busy()?;
        let target = match self.prompt.take() {
            Some(Prompt::Label(target)) => target,
            other => {
                self.prompt = other;
                return Err(EngineError::NoPendingPrompt);
            }
        };
        if !is_live(&self.surface, &target) {
            return Err(EngineError::StaleReference);
        }
        self.flush_session();

        if !apply_label(&mut self.surface, target.node(), value)? {
            return Ok(false);
        }
        let document = self.surface.serialize()?;
        self.propagate(document);
        if self.config.notify_on_commit {
            self.host.notice(Notice::ElementUpdated);
        }
        Ok(true)
    }

    // === Links ===

    /// Open the link editor for the selected element, returning its current
    /// target for the URL prompt.
    pub fn open_link_editor(&mut self) -> Result<LinkEditRequest, EngineError> {
        self.reject_if_ai_busy()?;
        self.require_manual_edit()?;
        let selection = self.live_selection()?;
        let Some(kind) = selection.category().link_kind() else {
            return Err(EngineError::NotLinkable(selection.tag().to_string()));
        };

        let url = read_target(&self.surface, selection.target().node(), kind);
        self.prompt = Some(Prompt::Link {
            target: selection.target().clone(),
            kind,
        });
        Ok(LinkEditRequest { url, kind })
    }

    /// Write the confirmed URL, serialize, and clear the selection.
    pub fn confirm_link(&mut self, url: &str) -> Result<(), EngineError> {
        self.reject_if_ai_busy()?;
        let (target, kind) = match self.prompt.take() {
            Some(Prompt::Link { target, kind }) => (target, kind),
            other => {
                self.prompt = other;
                return Err(EngineError::NoPendingPrompt);
            }
        };
        if !is_live(&self.surface, &target) {
            self.set_selection(None);
            return Err(EngineError::StaleReference);
        }
        self.flush_session();

        write_target(&mut self.surface, target.node(), kind, url)?;
        let document = self.surface.serialize()?;
        tracing::debug!(?kind, %url, "link target written");
        self.propagate(document);
        self.set_selection(None);
        self.host.notice(Notice::LinkUpdated);
        Ok(())
    }

    /// Close any open prompt without writing. Returns false if none was open.
    pub fn cancel_prompt(&mut self) -> bool {
        self.prompt.take().is_some()
    }

    // === Removal ===

    /// Remove the selected element from the document.
    pub fn remove_selected(&mut self) -> Result<(), EngineError> {
        self.reject_if_ai_busy()?;
        self.require_manual_edit()?;
        let selection = self.live_selection()?;
        self.flush_session();

        self.surface.remove_node(selection.target().node())?;
        let document = self.surface.serialize()?;
        tracing::debug!(tag = selection.tag(), "element removed");
        self.propagate(document);
        self.set_selection(None);
        self.host.notice(Notice::ElementRemoved);
        Ok(())
    }

    // === Toolbar ===

    /// The toolbar for the current state, positioned from fresh geometry.
    pub fn toolbar(&self) -> Option<Toolbar> {
        let selection = self.selection.as_ref()?;
        if !is_live(&self.surface, selection.target()) {
            return None;
        }
        let bounds = self.surface.bounding_box(selection.target().node());
        toolbar::present(self.mode(), Some(selection), bounds, &self.config)
    }

    // === Internals ===

    /// Tear down transient state: commit any open edit, drop any prompt,
    /// clear the selection.
    fn invalidate(&mut self) {
        self.flush_session();
        if self.prompt.take().is_some() {
            tracing::debug!("open prompt dropped");
        }
        self.set_selection(None);
    }

    /// Force-commit an open edit session. Failures are logged, never fatal.
    fn flush_session(&mut self) {
        if !self.editor.is_editing() {
            return;
        }
        match self
            .editor
            .commit(&mut self.surface, &self.config.editing_class)
        {
            Ok(outcome) => {
                self.settle(outcome);
            }
            Err(err) => tracing::warn!(%err, "forced commit failed"),
        }
    }

    /// Propagate a commit outcome. Returns true if the document changed.
    fn settle(&mut self, outcome: CommitOutcome) -> bool {
        match outcome {
            CommitOutcome::Unchanged => false,
            CommitOutcome::Changed(document) => {
                self.propagate(document);
                if self.config.notify_on_commit {
                    self.host.notice(Notice::ElementUpdated);
                }
                true
            }
        }
    }

    fn propagate(&mut self, document: String) {
        self.document = document;
        self.emphasis.clear();
        self.host.document_changed(&self.document);
    }

    fn set_selection(&mut self, selection: Option<Selection<S::Node>>) {
        if self.selection.is_none() && selection.is_none() {
            return;
        }
        self.selection = selection;
        self.host.selection_changed(self.selection.as_ref());
    }

    /// The selection, revalidated against the current tree.
    fn live_selection(&mut self) -> Result<Selection<S::Node>, EngineError> {
        let selection = self.selection.clone().ok_or(EngineError::NoSelection)?;
        if !is_live(&self.surface, selection.target()) {
            tracing::warn!(tag = selection.tag(), "selection went stale");
            self.set_selection(None);
            return Err(EngineError::StaleReference);
        }
        Ok(selection)
    }

    fn require_manual_edit(&self) -> Result<(), EngineError> {
        if self.mode() != InteractionMode::ManualEdit {
            return Err(EngineError::ModeInactive);
        }
        Ok(())
    }

    fn reject_if_ai_busy(&mut self) -> Result<(), EngineError> {
        if self.ai_working {
            self.host.notice(Notice::AiBusy);
            return Err(EngineError::AiBusy);
        }
        Ok(())
    }
}
