//! The capability boundary between editor logic and a concrete editing engine
//!
//! Everything above this trait (dispatch, format-state sync, export) talks
//! to the engine only through these operations, so any engine offering
//! them can be swapped in.

use crate::Result;
use doc_model::{Document, Embed, Format, FormatState, Range};
use serde::{Deserialize, Serialize};

/// Who initiated a change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeSource {
    /// Direct user action; recorded in undo history
    User,
    /// Programmatic change; not recorded
    Api,
    /// Programmatic change that observers may ignore
    Silent,
}

/// Notifications emitted by an engine, drained by the dispatcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    SelectionChanged {
        range: Option<Range>,
        source: ChangeSource,
    },
    ContentChanged {
        source: ChangeSource,
    },
    /// The pending format for the next insertion changed without touching content
    CursorFormatChanged {
        index: usize,
    },
}

pub trait EditorEngine {
    /// Short identifier used in logs
    fn name(&self) -> &str;

    /// Snapshot of the current contents
    fn contents(&self) -> Document;

    /// Replace the contents. Clears history.
    fn set_contents(&mut self, document: Document, source: ChangeSource);

    /// Document length in index units
    fn length(&self) -> usize;

    fn selection(&self) -> Option<Range>;

    fn set_selection(&mut self, range: Range, source: ChangeSource);

    /// Formats in effect over a range. A collapsed range reports what the
    /// next typed character would receive; a wider range reports only the
    /// values shared by everything in it.
    fn format_at(&self, range: Range) -> FormatState;

    /// Apply one attribute to a range. Inline attributes on a collapsed
    /// range become the pending format for the next insertion there.
    fn apply_format(&mut self, range: Range, format: &Format, source: ChangeSource) -> Result<()>;

    /// Strip inline and block formatting from a range
    fn remove_format(&mut self, range: Range, source: ChangeSource) -> Result<()>;

    /// Insert text; returns the index just past it
    fn insert_text(&mut self, index: usize, text: &str, source: ChangeSource) -> Result<usize>;

    fn delete_text(&mut self, range: Range, source: ChangeSource) -> Result<()>;

    /// Insert a registered embed; returns the index just past it
    fn insert_embed(&mut self, index: usize, embed: Embed, source: ChangeSource) -> Result<usize>;

    /// Returns false when there was nothing to undo
    fn undo(&mut self) -> bool;

    fn redo(&mut self) -> bool;

    /// Take all notifications emitted since the previous call, oldest first
    fn take_events(&mut self) -> Vec<EngineEvent>;
}
