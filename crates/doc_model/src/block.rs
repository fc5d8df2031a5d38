//! Block nodes - paragraphs, headings, list items and atomic embeds

use crate::{
    BlockFormat, DocModelError, Format, FormatKey, InlineFormat, ListKind, Result, Run,
    MAX_HEADING_LEVEL, MAX_INDENT,
};
use serde::{Deserialize, Serialize};

/// Structural kind of a block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum BlockKind {
    Paragraph,
    Heading { level: u8 },
    ListItem { list: ListKind },
    Blockquote,
    CodeBlock,
    /// Zero-width marker forcing a hard page boundary on export
    PageBreak,
    Image { source: String },
    Video { source: String },
}

impl BlockKind {
    /// Atomic blocks carry no text and occupy a single index
    pub fn is_atomic(&self) -> bool {
        matches!(
            self,
            BlockKind::PageBreak | BlockKind::Image { .. } | BlockKind::Video { .. }
        )
    }
}

/// Atomic content that can be inserted into the document flow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "source", rename_all = "kebab-case")]
pub enum Embed {
    PageBreak,
    Image(String),
    Video(String),
}

impl Embed {
    /// Name under which this embed kind is registered
    pub fn name(&self) -> &'static str {
        match self {
            Embed::PageBreak => crate::registry::PAGE_BREAK,
            Embed::Image(_) => crate::registry::IMAGE,
            Embed::Video(_) => crate::registry::VIDEO,
        }
    }

    pub fn into_block(self) -> Block {
        let kind = match self {
            Embed::PageBreak => BlockKind::PageBreak,
            Embed::Image(source) => BlockKind::Image { source },
            Embed::Video(source) => BlockKind::Video { source },
        };
        Block::new(kind)
    }
}

/// A block: a kind, block attributes and (for text blocks) inline runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub kind: BlockKind,
    #[serde(default)]
    pub format: BlockFormat,
    #[serde(default)]
    runs: Vec<Run>,
}

impl Block {
    pub fn new(kind: BlockKind) -> Self {
        Self {
            kind,
            format: BlockFormat::default(),
            runs: Vec::new(),
        }
    }

    /// Create an empty paragraph
    pub fn paragraph() -> Self {
        Self::new(BlockKind::Paragraph)
    }

    pub fn page_break() -> Self {
        Self::new(BlockKind::PageBreak)
    }

    /// Create a heading, rejecting levels outside 1..=6
    pub fn heading(level: u8) -> Result<Self> {
        if level == 0 || level > MAX_HEADING_LEVEL {
            return Err(DocModelError::InvalidHeadingLevel(level));
        }
        Ok(Self::new(BlockKind::Heading { level }))
    }

    /// Create a text block from runs. Runs are dropped for atomic kinds.
    pub fn with_runs(kind: BlockKind, runs: Vec<Run>) -> Self {
        let mut block = Self::new(kind);
        if !block.is_atomic() {
            block.runs = runs;
            block.strip_newlines();
        }
        block
    }

    /// Builder-style block attribute setter
    pub fn with_format(mut self, format: BlockFormat) -> Self {
        self.format = format;
        self
    }

    pub fn runs(&self) -> &[Run] {
        &self.runs
    }

    pub fn is_atomic(&self) -> bool {
        self.kind.is_atomic()
    }

    /// Number of text characters
    pub fn text_len(&self) -> usize {
        self.runs.iter().map(Run::char_len).sum()
    }

    /// Length in the document index space: text plus the terminating
    /// newline for text blocks, 1 for atomic blocks
    pub fn len(&self) -> usize {
        if self.is_atomic() {
            1
        } else {
            self.text_len() + 1
        }
    }

    /// Concatenated run text
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    /// Make sure a run boundary exists at `offset`, returning the index of
    /// the run that starts there
    fn ensure_boundary(&mut self, offset: usize) -> usize {
        let mut pos = 0;
        for i in 0..self.runs.len() {
            if pos == offset {
                return i;
            }
            let len = self.runs[i].char_len();
            if offset < pos + len {
                let tail = self.runs[i].split_off(offset - pos);
                self.runs.insert(i + 1, tail);
                return i + 1;
            }
            pos += len;
        }
        self.runs.len()
    }

    /// Split at a character offset, returning the tail as a new block of
    /// the same kind and attributes. A run spanning the offset is split in
    /// two runs with identical formatting.
    pub fn split_off(&mut self, offset: usize) -> Block {
        let index = self.ensure_boundary(offset);
        let tail = self.runs.split_off(index);
        Block {
            kind: self.kind.clone(),
            format: self.format.clone(),
            runs: tail,
        }
    }

    /// Append the runs of another block
    pub fn append(&mut self, other: Block) {
        if !self.is_atomic() {
            self.runs.extend(other.runs);
            self.normalize();
        }
    }

    /// Insert newline-free text at `offset` with the given format
    pub fn insert_text(&mut self, offset: usize, text: &str, format: InlineFormat) {
        if self.is_atomic() || text.is_empty() {
            return;
        }
        let offset = offset.min(self.text_len());
        let index = self.ensure_boundary(offset);
        self.runs.insert(index, Run::with_format(text, format));
        self.normalize();
    }

    /// Delete characters in `[start, end)`
    pub fn delete(&mut self, start: usize, end: usize) {
        if self.is_atomic() || start >= end {
            return;
        }
        let s = self.ensure_boundary(start);
        let e = self.ensure_boundary(end);
        self.runs.drain(s..e);
        self.normalize();
    }

    /// Apply an inline format to characters in `[start, end)`
    pub fn format_range(&mut self, start: usize, end: usize, format: &Format) {
        self.update_range(start, end, |f| {
            f.apply(format);
        });
    }

    /// Reset inline formatting of characters in `[start, end)`
    pub fn clear_range(&mut self, start: usize, end: usize) {
        self.update_range(start, end, |f| *f = InlineFormat::default());
    }

    fn update_range(&mut self, start: usize, end: usize, mut update: impl FnMut(&mut InlineFormat)) {
        if self.is_atomic() || start >= end {
            return;
        }
        let s = self.ensure_boundary(start);
        let e = self.ensure_boundary(end);
        for run in &mut self.runs[s..e] {
            update(&mut run.format);
        }
        self.normalize();
    }

    /// Format a caret at `offset` would pick up: the run before it,
    /// otherwise the run after it
    pub fn inline_format_at(&self, offset: usize) -> InlineFormat {
        let mut pos = 0;
        let mut after = None;
        for run in &self.runs {
            let len = run.char_len();
            if offset > pos && offset <= pos + len {
                return run.format.clone();
            }
            if after.is_none() && pos >= offset && len > 0 {
                after = Some(&run.format);
            }
            pos += len;
        }
        after.cloned().unwrap_or_default()
    }

    /// Formats of all runs overlapping `[start, end)`
    pub fn inline_formats_in(&self, start: usize, end: usize) -> Vec<&InlineFormat> {
        let mut pos = 0;
        let mut formats = Vec::new();
        for run in &self.runs {
            let len = run.char_len();
            if pos < end && pos + len > start {
                formats.push(&run.format);
            }
            pos += len;
        }
        formats
    }

    /// Current value of a block attribute; `None` for inline attributes
    /// and for atomic blocks
    pub fn block_format(&self, key: FormatKey) -> Option<Format> {
        if self.is_atomic() {
            return None;
        }
        let format = match key {
            FormatKey::Header => Format::Header(match self.kind {
                BlockKind::Heading { level } => Some(level),
                _ => None,
            }),
            FormatKey::List => Format::List(match self.kind {
                BlockKind::ListItem { list } => Some(list),
                _ => None,
            }),
            FormatKey::Blockquote => Format::Blockquote(self.kind == BlockKind::Blockquote),
            FormatKey::CodeBlock => Format::CodeBlock(self.kind == BlockKind::CodeBlock),
            FormatKey::Align => Format::Align(self.format.align),
            FormatKey::Direction => Format::Direction(self.format.direction),
            FormatKey::Indent => Format::Indent(self.format.indent),
            _ => return None,
        };
        Some(format)
    }

    /// All block attributes as explicit formats
    pub fn block_formats(&self) -> Vec<Format> {
        FormatKey::ALL
            .iter()
            .filter_map(|key| self.block_format(*key))
            .collect()
    }

    /// Apply a block attribute. The kind-changing attributes (header, list,
    /// blockquote, code block) are mutually exclusive: setting one replaces
    /// the kind, clearing one only resets a block that currently has it.
    /// Returns `Ok(false)` when nothing applies (inline format or atomic block).
    pub fn apply_block_format(&mut self, format: &Format) -> Result<bool> {
        if self.is_atomic() || format.is_inline() {
            return Ok(false);
        }
        match format {
            Format::Header(Some(level)) => {
                if *level == 0 || *level > MAX_HEADING_LEVEL {
                    return Err(DocModelError::InvalidHeadingLevel(*level));
                }
                self.kind = BlockKind::Heading { level: *level };
            }
            Format::Header(None) => {
                if matches!(self.kind, BlockKind::Heading { .. }) {
                    self.kind = BlockKind::Paragraph;
                }
            }
            Format::List(Some(list)) => self.kind = BlockKind::ListItem { list: *list },
            Format::List(None) => {
                if matches!(self.kind, BlockKind::ListItem { .. }) {
                    self.kind = BlockKind::Paragraph;
                }
            }
            Format::Blockquote(on) => self.set_exclusive_kind(BlockKind::Blockquote, *on),
            Format::CodeBlock(on) => self.set_exclusive_kind(BlockKind::CodeBlock, *on),
            Format::Align(align) => self.format.align = *align,
            Format::Direction(direction) => self.format.direction = *direction,
            Format::Indent(level) => self.format.indent = (*level).min(MAX_INDENT),
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn set_exclusive_kind(&mut self, kind: BlockKind, on: bool) {
        if on {
            self.kind = kind;
        } else if self.kind == kind {
            self.kind = BlockKind::Paragraph;
        }
    }

    /// Drop empty runs and merge neighbours with equal formatting
    pub fn normalize(&mut self) {
        let mut merged: Vec<Run> = Vec::with_capacity(self.runs.len());
        for run in self.runs.drain(..) {
            if run.is_empty() {
                continue;
            }
            match merged.last_mut() {
                Some(last) if last.format == run.format => last.text.push_str(&run.text),
                _ => merged.push(run),
            }
        }
        self.runs = merged;
    }

    /// Bring attributes read from a file back into range: indent is capped,
    /// an impossible heading level becomes a paragraph, and atomic blocks
    /// lose any runs and attributes they were given
    pub(crate) fn sanitize(&mut self) {
        if self.is_atomic() {
            self.runs.clear();
            self.format = BlockFormat::default();
            return;
        }
        if let BlockKind::Heading { level } = self.kind {
            if level == 0 || level > MAX_HEADING_LEVEL {
                self.kind = BlockKind::Paragraph;
            }
        }
        self.format.indent = self.format.indent.min(MAX_INDENT);
        self.strip_newlines();
    }

    /// Runs never contain newlines; the block boundary is the newline
    fn strip_newlines(&mut self) {
        for run in &mut self.runs {
            if run.text.contains(['\n', '\r']) {
                run.text = run.text.replace(['\n', '\r'], " ");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Alignment, Format};

    fn bold() -> InlineFormat {
        InlineFormat::new().with(Format::Bold(true))
    }

    fn hello_world() -> Block {
        Block::with_runs(
            BlockKind::Paragraph,
            vec![Run::new("Hello "), Run::with_format("world", bold())],
        )
    }

    #[test]
    fn test_lengths() {
        let block = hello_world();
        assert_eq!(block.text_len(), 11);
        assert_eq!(block.len(), 12);
        assert_eq!(Block::page_break().len(), 1);
    }

    #[test]
    fn test_split_mid_run() {
        let mut block = hello_world();
        let tail = block.split_off(8);

        assert_eq!(block.text(), "Hello wo");
        assert_eq!(tail.text(), "rld");
        assert_eq!(block.runs().last().map(|r| &r.format), Some(&bold()));
        assert_eq!(tail.runs()[0].format, bold());
    }

    #[test]
    fn test_format_range_splits_and_merges() {
        let mut block = hello_world();
        block.format_range(0, 6, &Format::Bold(true));
        assert_eq!(block.runs().len(), 1);
        assert_eq!(block.text(), "Hello world");

        block.format_range(0, 5, &Format::Italic(true));
        assert_eq!(block.runs().len(), 2);
        assert!(block.runs()[0].format.italic);
        assert!(!block.runs()[1].format.italic);
    }

    #[test]
    fn test_insert_and_delete() {
        let mut block = hello_world();
        block.insert_text(5, ",", InlineFormat::default());
        assert_eq!(block.text(), "Hello, world");
        assert_eq!(block.runs().len(), 2);

        block.delete(5, 7);
        assert_eq!(block.text(), "Helloworld");
    }

    #[test]
    fn test_inline_format_at_prefers_previous_char() {
        let block = hello_world();
        assert!(!block.inline_format_at(6).bold);
        assert!(block.inline_format_at(7).bold);
        assert!(!block.inline_format_at(0).bold);
    }

    #[test]
    fn test_list_formats_are_exclusive() {
        let mut block = hello_world();
        block
            .apply_block_format(&Format::List(Some(ListKind::Bullet)))
            .unwrap();
        block
            .apply_block_format(&Format::List(Some(ListKind::Ordered)))
            .unwrap();
        assert_eq!(
            block.kind,
            BlockKind::ListItem {
                list: ListKind::Ordered
            }
        );

        // Clearing a blockquote on a list item leaves the list alone
        block.apply_block_format(&Format::Blockquote(false)).unwrap();
        assert!(matches!(block.kind, BlockKind::ListItem { .. }));

        block.apply_block_format(&Format::List(None)).unwrap();
        assert_eq!(block.kind, BlockKind::Paragraph);
    }

    #[test]
    fn test_block_attributes() {
        let mut block = Block::paragraph();
        block.apply_block_format(&Format::Indent(9)).unwrap();
        block
            .apply_block_format(&Format::Align(Alignment::Justify))
            .unwrap();
        assert_eq!(block.format.indent, MAX_INDENT);
        assert_eq!(block.format.align, Alignment::Justify);
        assert!(block.apply_block_format(&Format::Header(Some(7))).is_err());
    }

    #[test]
    fn test_sanitize_out_of_range_attributes() {
        let mut heading = Block::with_runs(BlockKind::Heading { level: 9 }, vec![Run::new("T")])
            .with_format(BlockFormat {
                indent: 255,
                ..BlockFormat::default()
            });
        heading.sanitize();
        assert_eq!(heading.kind, BlockKind::Paragraph);
        assert_eq!(heading.format.indent, MAX_INDENT);

        let mut marker = Block::page_break();
        marker.runs.push(Run::new("hidden"));
        marker.format.indent = 3;
        marker.sanitize();
        assert!(marker.runs().is_empty());
        assert!(marker.format.is_default());
    }

    #[test]
    fn test_atomic_blocks_ignore_text() {
        let mut marker = Block::page_break();
        marker.insert_text(0, "x", InlineFormat::default());
        assert_eq!(marker.text_len(), 0);
        assert!(!marker.apply_block_format(&Format::Indent(1)).unwrap());
        assert!(marker.block_formats().is_empty());
    }
}
