//! Command dispatch and format-state synchronisation
//!
//! The dispatcher is the single owner of the current [`FormatState`]. It
//! recomputes the state once for every notification the engine emits, in
//! order, so the toolbar always reflects the most recent change. Commands
//! issued before an engine is attached are dropped.

use crate::command::{EditorCommand, IndentChange};
use crate::engine::{ChangeSource, EditorEngine};
use crate::mount::{MountEvent, MountSignal};
use crate::page_break;
use crate::{EditError, Result};
use doc_model::{
    Alignment, Direction, Document, Format, FormatKey, FormatState, Range, Script, MAX_INDENT,
};
use tracing::{debug, info, trace};

pub struct CommandDispatcher {
    engine: Option<Box<dyn EditorEngine>>,
    format_state: FormatState,
    mount: MountSignal,
    /// Number of format-state recomputations so far
    revision: u64,
}

impl CommandDispatcher {
    pub fn new() -> Self {
        Self {
            engine: None,
            format_state: FormatState::new(),
            mount: MountSignal::new(),
            revision: 0,
        }
    }

    /// Attach an engine and notify mount listeners
    pub fn attach(&mut self, mut engine: Box<dyn EditorEngine>) {
        // Anything queued before attachment describes a state we never saw
        engine.take_events();
        let name = engine.name().to_string();
        self.engine = Some(engine);
        self.refresh();
        info!(engine = %name, "editing engine attached");
        self.mount.mounted(&name);
    }

    /// Detach the engine; later commands become no-ops
    pub fn detach(&mut self) -> Option<Box<dyn EditorEngine>> {
        let engine = self.engine.take();
        if engine.is_some() {
            self.mount.unmounted();
            self.format_state = FormatState::new();
            info!("editing engine detached");
        }
        engine
    }

    /// Run `listener` once the engine is ready (immediately if it already is)
    pub fn on_mount(&mut self, listener: impl FnMut(&MountEvent) + 'static) {
        self.mount.subscribe(listener);
    }

    pub fn is_ready(&self) -> bool {
        self.engine.is_some()
    }

    pub fn engine(&self) -> Option<&dyn EditorEngine> {
        self.engine.as_deref()
    }

    /// Formatting active at the current selection
    pub fn format_state(&self) -> &FormatState {
        &self.format_state
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Issue a command from the UI. Failures, including a missing engine,
    /// are logged and otherwise ignored.
    pub fn dispatch(&mut self, command: EditorCommand, range: Option<Range>) {
        if let Err(err) = self.try_dispatch(command, range) {
            debug!(error = %err, "command ignored");
        }
    }

    /// Issue a command, reporting why it did nothing.
    ///
    /// `range` defaults to the engine's current selection.
    pub fn try_dispatch(&mut self, command: EditorCommand, range: Option<Range>) -> Result<()> {
        let Some(engine) = self.engine.as_deref_mut() else {
            return Err(EditError::EngineNotReady(command.display_name().to_string()));
        };

        let range = range
            .or_else(|| engine.selection())
            .unwrap_or_default()
            .clamp(engine.length());
        engine.set_selection(range, ChangeSource::Api);

        trace!(command = command.display_name(), ?range, "dispatching");
        let result = execute(engine, command, range);
        self.sync();
        result
    }

    /// Insert a page-break marker at an index
    pub fn insert_page_break(&mut self, index: usize) -> Result<()> {
        self.try_dispatch(EditorCommand::InsertPageBreak, Some(Range::caret(index)))
    }

    /// Report a selection made in the UI
    pub fn select(&mut self, range: Range) {
        if let Some(engine) = self.engine.as_deref_mut() {
            engine.set_selection(range, ChangeSource::User);
            self.sync();
        }
    }

    /// Replace the document, e.g. after loading a file. Not undoable.
    pub fn load(&mut self, document: Document) -> Result<()> {
        let engine = self
            .engine
            .as_deref_mut()
            .ok_or_else(|| EditError::EngineNotReady("Load".to_string()))?;
        engine.set_contents(document, ChangeSource::Api);
        engine.set_selection(Range::caret(0), ChangeSource::Api);
        self.sync();
        Ok(())
    }

    /// Recompute the format state once per pending engine notification
    pub fn sync(&mut self) {
        let Some(engine) = self.engine.as_deref_mut() else {
            return;
        };
        for event in engine.take_events() {
            let range = engine.selection().unwrap_or_default();
            self.format_state = engine.format_at(range);
            self.revision += 1;
            trace!(?event, revision = self.revision, "format state recomputed");
        }
    }

    /// Copy of the current document, for export. Does not touch history.
    pub fn snapshot(&self) -> Option<Document> {
        self.engine.as_deref().map(|e| e.contents())
    }

    /// True when the document holds something worth exporting
    pub fn has_unsaved_content(&self) -> bool {
        self.engine
            .as_deref()
            .is_some_and(|e| !e.contents().is_blank())
    }

    fn refresh(&mut self) {
        if let Some(engine) = self.engine.as_deref() {
            let range = engine.selection().unwrap_or_default();
            self.format_state = engine.format_at(range);
            self.revision += 1;
        }
    }
}

impl Default for CommandDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

fn execute(engine: &mut dyn EditorEngine, command: EditorCommand, range: Range) -> Result<()> {
    let user = ChangeSource::User;
    match command {
        EditorCommand::Set(format) => engine.apply_format(range, &format, user),
        EditorCommand::Toggle(key) => {
            let current = engine.format_at(range).effective(key);
            let next = current.toggled().ok_or_else(|| {
                EditError::InvalidCommand(format!("{} is not an on/off attribute", key.name()))
            })?;
            engine.apply_format(range, &next, user)
        }
        EditorCommand::ToggleScript(script) => {
            let current = engine.format_at(range).effective(FormatKey::Script);
            let next = if current == Format::Script(script) {
                Script::Normal
            } else {
                script
            };
            engine.apply_format(range, &Format::Script(next), user)
        }
        EditorCommand::SetList(kind) => {
            let current = engine.format_at(range).effective(FormatKey::List);
            let next = if current == Format::List(Some(kind)) {
                None
            } else {
                Some(kind)
            };
            engine.apply_format(range, &Format::List(next), user)
        }
        EditorCommand::Indent(change) => {
            let level = match engine.format_at(range).effective(FormatKey::Indent) {
                Format::Indent(level) => level,
                _ => 0,
            };
            let next = match change {
                IndentChange::Increase => level.saturating_add(1).min(MAX_INDENT),
                IndentChange::Decrease => level.saturating_sub(1),
            };
            engine.apply_format(range, &Format::Indent(next), user)
        }
        EditorCommand::ToggleDirection => {
            let state = engine.format_at(range);
            let rtl = state.effective(FormatKey::Direction) == Format::Direction(Direction::Rtl);
            let align = state.effective(FormatKey::Align);
            if rtl {
                engine.apply_format(range, &Format::Direction(Direction::Ltr), user)?;
                if align == Format::Align(Alignment::Right) {
                    engine.apply_format(range, &Format::Align(Alignment::Left), user)?;
                }
            } else {
                engine.apply_format(range, &Format::Direction(Direction::Rtl), user)?;
                if align == Format::Align(Alignment::Left) {
                    engine.apply_format(range, &Format::Align(Alignment::Right), user)?;
                }
            }
            Ok(())
        }
        EditorCommand::Clean => engine.remove_format(range, user),
        EditorCommand::InsertText(text) => {
            if !range.is_collapsed() {
                engine.delete_text(range, user)?;
            }
            let end = engine.insert_text(range.index, &text, user)?;
            engine.set_selection(Range::caret(end), user);
            Ok(())
        }
        EditorCommand::DeleteBackward => {
            let target = if range.is_collapsed() {
                if range.index == 0 {
                    return Ok(());
                }
                Range::new(range.index - 1, 1)
            } else {
                range
            };
            engine.delete_text(target, user)?;
            engine.set_selection(Range::caret(target.index), user);
            Ok(())
        }
        EditorCommand::InsertEmbed(embed) => {
            let past = engine.insert_embed(range.index, embed, user)?;
            engine.set_selection(Range::caret(past), user);
            Ok(())
        }
        EditorCommand::InsertPageBreak => {
            page_break::insert_page_break(engine, range.index).map(|_| ())
        }
        EditorCommand::NewPage => page_break::append_new_page(engine),
        EditorCommand::Undo => {
            if !engine.undo() {
                debug!("nothing to undo");
            }
            Ok(())
        }
        EditorCommand::Redo => {
            if !engine.redo() {
                debug!("nothing to redo");
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryEngine;
    use doc_model::{BlockKind, ListKind};
    use std::cell::Cell;
    use std::rc::Rc;

    fn attached(text: &str) -> CommandDispatcher {
        let mut dispatcher = CommandDispatcher::new();
        dispatcher.attach(Box::new(MemoryEngine::with_document(Document::from_text(text))));
        dispatcher
    }

    #[test]
    fn test_commands_without_engine_are_noops() {
        let mut dispatcher = CommandDispatcher::new();
        let err = dispatcher
            .try_dispatch(EditorCommand::Toggle(FormatKey::Bold), None)
            .unwrap_err();
        assert!(matches!(err, EditError::EngineNotReady(_)));

        dispatcher.dispatch(EditorCommand::InsertPageBreak, None);
        assert!(dispatcher.format_state().is_empty());
        assert!(dispatcher.snapshot().is_none());
        assert!(!dispatcher.has_unsaved_content());
    }

    #[test]
    fn test_toggle_bold_round_trip() {
        let mut dispatcher = attached("Hello");
        let all = Some(Range::new(0, 5));

        dispatcher.dispatch(EditorCommand::Toggle(FormatKey::Bold), all);
        assert!(dispatcher.format_state().is_enabled(FormatKey::Bold));

        dispatcher.dispatch(EditorCommand::Toggle(FormatKey::Bold), all);
        assert!(!dispatcher.format_state().contains(FormatKey::Bold));
    }

    #[test]
    fn test_toggle_rejects_valued_attribute() {
        let mut dispatcher = attached("Hello");
        let err = dispatcher
            .try_dispatch(EditorCommand::Toggle(FormatKey::Color), None)
            .unwrap_err();
        assert!(matches!(err, EditError::InvalidCommand(_)));
    }

    #[test]
    fn test_format_before_typing() {
        let mut dispatcher = attached("");
        dispatcher.dispatch(EditorCommand::Toggle(FormatKey::Bold), None);
        assert!(dispatcher.format_state().is_enabled(FormatKey::Bold));

        dispatcher.dispatch(EditorCommand::InsertText("hi".into()), None);
        let doc = dispatcher.snapshot().unwrap();
        assert!(doc.blocks()[0].runs()[0].format.bold);
        assert!(dispatcher.format_state().is_enabled(FormatKey::Bold));
    }

    #[test]
    fn test_list_toggle_is_involution() {
        let mut dispatcher = attached("item");
        let original = dispatcher.snapshot().unwrap();

        dispatcher.dispatch(EditorCommand::SetList(ListKind::Ordered), None);
        let doc = dispatcher.snapshot().unwrap();
        assert_eq!(doc.blocks()[0].kind, BlockKind::ListItem { list: ListKind::Ordered });

        dispatcher.dispatch(EditorCommand::SetList(ListKind::Ordered), None);
        assert_eq!(dispatcher.snapshot().unwrap(), original);
    }

    #[test]
    fn test_switch_list_kind() {
        let mut dispatcher = attached("item");
        dispatcher.dispatch(EditorCommand::SetList(ListKind::Ordered), None);
        dispatcher.dispatch(EditorCommand::SetList(ListKind::Bullet), None);
        assert_eq!(
            dispatcher.format_state().get(FormatKey::List),
            Some(&Format::List(Some(ListKind::Bullet)))
        );
    }

    #[test]
    fn test_script_toggle() {
        let mut dispatcher = attached("x2");
        let range = Some(Range::new(1, 1));
        dispatcher.dispatch(EditorCommand::ToggleScript(Script::Super), range);
        assert_eq!(
            dispatcher.format_state().effective(FormatKey::Script),
            Format::Script(Script::Super)
        );
        dispatcher.dispatch(EditorCommand::ToggleScript(Script::Sub), range);
        assert_eq!(
            dispatcher.format_state().effective(FormatKey::Script),
            Format::Script(Script::Sub)
        );
        dispatcher.dispatch(EditorCommand::ToggleScript(Script::Sub), range);
        assert!(!dispatcher.format_state().contains(FormatKey::Script));
    }

    #[test]
    fn test_indent_is_clamped() {
        let mut dispatcher = attached("text");
        for _ in 0..8 {
            dispatcher.dispatch(EditorCommand::Indent(IndentChange::Increase), None);
        }
        assert_eq!(
            dispatcher.format_state().effective(FormatKey::Indent),
            Format::Indent(MAX_INDENT)
        );
        for _ in 0..8 {
            dispatcher.dispatch(EditorCommand::Indent(IndentChange::Decrease), None);
        }
        assert!(!dispatcher.format_state().contains(FormatKey::Indent));
    }

    #[test]
    fn test_indent_from_loaded_file_stays_in_range() {
        let doc: Document = serde_json::from_str(
            r#"{"blocks":[{"kind":{"type":"paragraph"},"format":{"indent":255},"runs":[{"text":"deep"}]}]}"#,
        )
        .unwrap();
        let mut dispatcher = CommandDispatcher::new();
        dispatcher.attach(Box::new(MemoryEngine::new()));
        dispatcher.load(doc).unwrap();

        dispatcher
            .try_dispatch(EditorCommand::Indent(IndentChange::Increase), None)
            .unwrap();
        assert_eq!(
            dispatcher.format_state().effective(FormatKey::Indent),
            Format::Indent(MAX_INDENT)
        );
    }

    #[test]
    fn test_block_format_on_marker_is_rejected() {
        let mut dispatcher = attached("ab");
        dispatcher.insert_page_break(2).unwrap();
        let before = dispatcher.snapshot().unwrap();
        assert_eq!(before.blocks()[1].kind, BlockKind::PageBreak);

        let err = dispatcher
            .try_dispatch(EditorCommand::Set(Format::Header(Some(2))), Some(Range::caret(3)))
            .unwrap_err();
        assert!(matches!(err, EditError::InvalidCommand(_)));
        assert_eq!(dispatcher.snapshot().unwrap(), before);

        // The same command on the paragraph after the marker applies
        dispatcher
            .try_dispatch(EditorCommand::Set(Format::Header(Some(2))), Some(Range::caret(4)))
            .unwrap();
        assert_eq!(
            dispatcher.format_state().get(FormatKey::Header),
            Some(&Format::Header(Some(2)))
        );
    }

    #[test]
    fn test_direction_toggle_aligns_right() {
        let mut dispatcher = attached("text");
        dispatcher.dispatch(EditorCommand::ToggleDirection, None);
        let state = dispatcher.format_state();
        assert_eq!(state.effective(FormatKey::Direction), Format::Direction(Direction::Rtl));
        assert_eq!(state.effective(FormatKey::Align), Format::Align(Alignment::Right));

        dispatcher.dispatch(EditorCommand::ToggleDirection, None);
        assert!(dispatcher.format_state().is_empty());
    }

    #[test]
    fn test_page_break_moves_caret() {
        let mut dispatcher = attached("abc");
        dispatcher.insert_page_break(1).unwrap();
        let engine = dispatcher.engine().unwrap();
        assert_eq!(engine.selection(), Some(Range::caret(3)));
        assert_eq!(engine.contents().visible_text(), "abc");
    }

    #[test]
    fn test_undo_redo_via_commands() {
        let mut dispatcher = attached("");
        dispatcher.dispatch(EditorCommand::InsertText("abc".into()), None);
        dispatcher.dispatch(EditorCommand::Undo, None);
        assert_eq!(dispatcher.snapshot().unwrap().visible_text(), "");
        dispatcher.dispatch(EditorCommand::Redo, None);
        assert_eq!(dispatcher.snapshot().unwrap().visible_text(), "abc");
        // Undo with an empty redo stack is harmless
        dispatcher.dispatch(EditorCommand::Redo, None);
    }

    #[test]
    fn test_rapid_user_edits_share_one_undo_entry() {
        let mut dispatcher = attached("");
        for _ in 0..50 {
            dispatcher.dispatch(EditorCommand::InsertText("a".into()), None);
        }
        dispatcher.dispatch(EditorCommand::Undo, None);
        assert_eq!(dispatcher.snapshot().unwrap().visible_text(), "");
    }

    #[test]
    fn test_one_recompute_per_notification() {
        let mut dispatcher = attached("abc");
        let before = dispatcher.revision();
        dispatcher.select(Range::caret(2));
        assert_eq!(dispatcher.revision(), before + 1);

        // Same selection again: no notification, no recompute
        dispatcher.select(Range::caret(2));
        assert_eq!(dispatcher.revision(), before + 1);
    }

    #[test]
    fn test_delete_backward() {
        let mut dispatcher = attached("abc");
        dispatcher.dispatch(EditorCommand::DeleteBackward, Some(Range::caret(3)));
        assert_eq!(dispatcher.snapshot().unwrap().visible_text(), "ab");
        dispatcher.dispatch(EditorCommand::DeleteBackward, Some(Range::caret(0)));
        assert_eq!(dispatcher.snapshot().unwrap().visible_text(), "ab");
    }

    #[test]
    fn test_mount_listeners() {
        let calls = Rc::new(Cell::new(0));
        let mut dispatcher = CommandDispatcher::new();

        let early = Rc::clone(&calls);
        dispatcher.on_mount(move |_| early.set(early.get() + 1));
        assert_eq!(calls.get(), 0);

        dispatcher.attach(Box::new(MemoryEngine::new()));
        assert_eq!(calls.get(), 1);

        let late = Rc::clone(&calls);
        dispatcher.on_mount(move |_| late.set(late.get() + 1));
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_blank_document_has_no_content() {
        let mut dispatcher = attached("   ");
        assert!(!dispatcher.has_unsaved_content());
        dispatcher.dispatch(EditorCommand::NewPage, None);
        assert!(!dispatcher.has_unsaved_content());
        dispatcher.dispatch(EditorCommand::InsertText("x".into()), None);
        assert!(dispatcher.has_unsaved_content());
    }
}
