//! In-process editing engine over a [`Document`]

use crate::engine::{ChangeSource, EditorEngine, EngineEvent};
use crate::undo::{History, Snapshot};
use crate::{EditError, Result};
use doc_model::{
    DocModelError, Document, Embed, EmbedRegistry, Format, FormatKey, FormatState, InlineFormat,
    Range,
};
use tracing::trace;

/// Inline formats chosen at a caret, waiting for the next insertion there
#[derive(Debug, Clone)]
struct PendingFormat {
    index: usize,
    formats: Vec<Format>,
}

impl PendingFormat {
    fn set(&mut self, format: Format) {
        self.formats.retain(|f| f.key() != format.key());
        self.formats.push(format);
    }
}

/// Editing engine holding the document in memory
#[derive(Debug)]
pub struct MemoryEngine {
    document: Document,
    selection: Option<Range>,
    pending: Option<PendingFormat>,
    history: History,
    events: Vec<EngineEvent>,
    registry: &'static EmbedRegistry,
}

impl MemoryEngine {
    pub fn new() -> Self {
        Self::with_document(Document::new())
    }

    pub fn with_document(document: Document) -> Self {
        Self {
            document,
            selection: Some(Range::caret(0)),
            pending: None,
            history: History::new(),
            events: Vec::new(),
            registry: EmbedRegistry::global(),
        }
    }

    /// Replace the history, e.g. with custom limits
    pub fn with_history(mut self, history: History) -> Self {
        self.history = history;
        self
    }

    /// Accept embeds from a registry other than the process-wide one
    pub fn with_registry(mut self, registry: &'static EmbedRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            document: self.document.clone(),
            selection: self.selection,
        }
    }

    /// Run a document mutation. Failed mutations leave the document
    /// untouched; successful ones that changed something are recorded
    /// (user changes only) and announced.
    fn mutate<T>(
        &mut self,
        source: ChangeSource,
        op: impl FnOnce(&mut Document) -> Result<T>,
    ) -> Result<T> {
        let before = self.snapshot();
        let out = match op(&mut self.document) {
            Ok(out) => out,
            Err(err) => {
                self.document = before.document;
                return Err(err);
            }
        };

        if self.document != before.document {
            if source == ChangeSource::User {
                self.history.record(before);
            }
            let len = self.document.len();
            self.selection = self.selection.map(|r| r.clamp(len));
            trace!(?source, len, "content changed");
            self.events.push(EngineEvent::ContentChanged { source });
        }
        Ok(out)
    }

    /// Inline format the next character typed at `index` would receive
    fn caret_format(&self, index: usize) -> InlineFormat {
        let loc = self.document.locate(index);
        let mut format = self
            .document
            .block(loc.block)
            .filter(|b| !b.is_atomic())
            .map(|b| b.inline_format_at(loc.offset))
            .unwrap_or_default();
        if let Some(pending) = self.pending.as_ref().filter(|p| p.index == index) {
            for f in &pending.formats {
                format.apply(f);
            }
        }
        format
    }

    fn set_pending(&mut self, index: usize, formats: impl IntoIterator<Item = Format>) {
        let pending = self.pending.get_or_insert_with(|| PendingFormat {
            index,
            formats: Vec::new(),
        });
        if pending.index != index {
            *pending = PendingFormat {
                index,
                formats: Vec::new(),
            };
        }
        for format in formats {
            pending.set(format);
        }
        self.events.push(EngineEvent::CursorFormatChanged { index });
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.document = snapshot.document;
        self.selection = snapshot.selection.map(|r| r.clamp(self.document.len()));
        self.pending = None;
        self.events.push(EngineEvent::ContentChanged {
            source: ChangeSource::User,
        });
        self.events.push(EngineEvent::SelectionChanged {
            range: self.selection,
            source: ChangeSource::User,
        });
    }
}

impl Default for MemoryEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Formats present with the same value in every group
fn common_formats(mut groups: impl Iterator<Item = Vec<Format>>) -> Vec<Format> {
    let Some(first) = groups.next() else {
        return Vec::new();
    };
    let rest: Vec<Vec<Format>> = groups.collect();
    first
        .into_iter()
        .filter(|f| rest.iter().all(|group| group.contains(f)))
        .collect()
}

impl EditorEngine for MemoryEngine {
    fn name(&self) -> &str {
        "memory"
    }

    fn contents(&self) -> Document {
        self.document.clone()
    }

    fn set_contents(&mut self, document: Document, source: ChangeSource) {
        self.document = document;
        self.history.clear();
        self.pending = None;
        let len = self.document.len();
        self.selection = self.selection.map(|r| r.clamp(len));
        self.events.push(EngineEvent::ContentChanged { source });
    }

    fn length(&self) -> usize {
        self.document.len()
    }

    fn selection(&self) -> Option<Range> {
        self.selection
    }

    fn set_selection(&mut self, range: Range, source: ChangeSource) {
        let range = range.clamp(self.document.len());
        if self.selection == Some(range) {
            return;
        }
        if self
            .pending
            .as_ref()
            .is_some_and(|p| !range.is_collapsed() || p.index != range.index)
        {
            self.pending = None;
        }
        self.selection = Some(range);
        self.events.push(EngineEvent::SelectionChanged {
            range: Some(range),
            source,
        });
    }

    fn format_at(&self, range: Range) -> FormatState {
        let range = range.clamp(self.document.len());
        let runs = self.document.inline_formats_in(range);

        let mut formats = if range.is_collapsed() || runs.is_empty() {
            self.caret_format(range.index).formats()
        } else {
            common_formats(runs.into_iter().map(InlineFormat::formats))
        };
        formats.extend(common_formats(
            self.document
                .text_blocks_in(range)
                .into_iter()
                .map(|b| b.block_formats()),
        ));
        FormatState::from_formats(formats)
    }

    fn apply_format(&mut self, range: Range, format: &Format, source: ChangeSource) -> Result<()> {
        let range = range.clamp(self.document.len());
        if format.is_inline() {
            if range.is_collapsed() || self.document.inline_formats_in(range).is_empty() {
                self.set_pending(range.index, [format.clone()]);
                return Ok(());
            }
            return self.mutate(source, |doc| {
                doc.format_text(range, format);
                Ok(())
            });
        }
        if self.document.text_blocks_in(range).is_empty() {
            return Err(EditError::InvalidCommand(format!(
                "{} needs a text block, found only embeds at {}",
                format.key().name(),
                range.index
            )));
        }
        self.mutate(source, |doc| doc.format_blocks(range, format).map_err(EditError::from))
    }

    fn remove_format(&mut self, range: Range, source: ChangeSource) -> Result<()> {
        let range = range.clamp(self.document.len());
        if range.is_collapsed() {
            let defaults = FormatKey::ALL
                .iter()
                .filter(|k| k.is_inline())
                .map(FormatKey::default_format);
            self.set_pending(range.index, defaults);
        }
        self.mutate(source, |doc| {
            doc.clear_text_format(range);
            for key in FormatKey::ALL.iter().filter(|k| !k.is_inline()) {
                doc.format_blocks(range, &key.default_format())?;
            }
            Ok(())
        })
    }

    fn insert_text(&mut self, index: usize, text: &str, source: ChangeSource) -> Result<usize> {
        let index = index.min(self.document.len().saturating_sub(1));
        let format = self
            .pending
            .as_ref()
            .filter(|p| p.index == index)
            .map(|_| self.caret_format(index));
        let end = self.mutate(source, |doc| Ok(doc.insert_text(index, text, format)))?;
        self.pending = None;
        Ok(end)
    }

    fn delete_text(&mut self, range: Range, source: ChangeSource) -> Result<()> {
        self.mutate(source, |doc| {
            doc.delete(range);
            Ok(())
        })
    }

    fn insert_embed(&mut self, index: usize, embed: Embed, source: ChangeSource) -> Result<usize> {
        let name = embed.name();
        if !self.registry.is_registered(name) {
            return Err(DocModelError::UnregisteredEmbed(name.to_string()).into());
        }
        self.mutate(source, |doc| Ok(doc.insert_block(index, embed.into_block())))
    }

    fn undo(&mut self) -> bool {
        let current = self.snapshot();
        match self.history.undo(current) {
            Some(previous) => {
                self.restore(previous);
                true
            }
            None => false,
        }
    }

    fn redo(&mut self) -> bool {
        let current = self.snapshot();
        match self.history.redo(current) {
            Some(next) => {
                self.restore(next);
                true
            }
            None => false,
        }
    }

    fn take_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.events)
    }
}
