//! Editor commands issued by the toolbar, keyboard shortcuts and menus

use doc_model::{Embed, Format, FormatKey, ListKind, Script};
use serde::{Deserialize, Serialize};

/// Direction of an indent change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndentChange {
    Increase,
    Decrease,
}

/// A request to change the document or the editing state.
///
/// Toggles carry no value: the dispatcher reads the current state and
/// turns them into an explicit assignment before reaching the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", content = "args", rename_all = "kebab-case")]
pub enum EditorCommand {
    /// Assign an explicit value
    Set(Format),
    /// Invert an on/off attribute
    Toggle(FormatKey),
    /// Switch a script mode on, or back to normal if already active
    ToggleScript(Script),
    /// Turn blocks into list items of a kind, or back into paragraphs
    SetList(ListKind),
    Indent(IndentChange),
    /// Flip between left-to-right and right-to-left
    ToggleDirection,
    /// Remove all formatting from the selection
    Clean,
    /// Replace the selection with text
    InsertText(String),
    /// Delete the selection, or the character before a caret
    DeleteBackward,
    /// Insert an image or video
    InsertEmbed(Embed),
    InsertPageBreak,
    /// Page break followed by blank lines, caret moved to the end
    NewPage,
    Undo,
    Redo,
}

impl EditorCommand {
    /// Get a display name for this command
    pub fn display_name(&self) -> &'static str {
        match self {
            EditorCommand::Set(_) => "Set Format",
            EditorCommand::Toggle(_) => "Toggle Format",
            EditorCommand::ToggleScript(_) => "Toggle Script",
            EditorCommand::SetList(_) => "Toggle List",
            EditorCommand::Indent(IndentChange::Increase) => "Increase Indent",
            EditorCommand::Indent(IndentChange::Decrease) => "Decrease Indent",
            EditorCommand::ToggleDirection => "Toggle Direction",
            EditorCommand::Clean => "Clear Formatting",
            EditorCommand::InsertText(_) => "Insert Text",
            EditorCommand::DeleteBackward => "Delete",
            EditorCommand::InsertEmbed(_) => "Insert Embed",
            EditorCommand::InsertPageBreak => "Insert Page Break",
            EditorCommand::NewPage => "New Page",
            EditorCommand::Undo => "Undo",
            EditorCommand::Redo => "Redo",
        }
    }

    /// True for commands that only change formatting
    pub fn is_formatting(&self) -> bool {
        matches!(
            self,
            EditorCommand::Set(_)
                | EditorCommand::Toggle(_)
                | EditorCommand::ToggleScript(_)
                | EditorCommand::SetList(_)
                | EditorCommand::Indent(_)
                | EditorCommand::ToggleDirection
                | EditorCommand::Clean
        )
    }
}
