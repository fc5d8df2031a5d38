//! Document root and index-space operations
//!
//! A document is addressed with a single linear index: every text block
//! contributes its characters plus one terminating newline, every atomic
//! block (page break, image, video) contributes exactly one unit.

use crate::{Block, Format, InlineFormat, Location, Range, Result};
use serde::{Deserialize, Serialize};

/// The root document: an ordered, never-empty sequence of blocks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawDocument")]
pub struct Document {
    blocks: Vec<Block>,
}

#[derive(Deserialize)]
struct RawDocument {
    #[serde(default)]
    blocks: Vec<Block>,
}

impl From<RawDocument> for Document {
    fn from(raw: RawDocument) -> Self {
        Document::from_blocks(raw.blocks)
    }
}

impl Document {
    /// Create a document holding one empty paragraph
    pub fn new() -> Self {
        Self {
            blocks: vec![Block::paragraph()],
        }
    }

    /// Create a document from blocks, restoring the structural invariants
    pub fn from_blocks(blocks: Vec<Block>) -> Self {
        let mut doc = Self { blocks };
        doc.ensure_invariants();
        doc
    }

    /// One unformatted paragraph per line
    pub fn from_text(text: &str) -> Self {
        let mut doc = Self::new();
        doc.insert_text(0, text, None);
        doc
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn block(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index)
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Total length in index units
    pub fn len(&self) -> usize {
        self.blocks.iter().map(Block::len).sum()
    }

    /// Concatenated text of every run, without block separators
    pub fn visible_text(&self) -> String {
        self.blocks
            .iter()
            .flat_map(|b| b.runs())
            .map(|r| r.text.as_str())
            .collect()
    }

    /// True when there is nothing worth exporting: whitespace-only text
    /// and no image or video embeds. Page breaks alone are not content.
    pub fn is_blank(&self) -> bool {
        let has_media = self.blocks.iter().any(|b| {
            matches!(
                b.kind,
                crate::BlockKind::Image { .. } | crate::BlockKind::Video { .. }
            )
        });
        !has_media && self.visible_text().trim().is_empty()
    }

    /// Index at which a block starts
    pub fn block_start(&self, block: usize) -> usize {
        self.blocks.iter().take(block).map(Block::len).sum()
    }

    /// Resolve an index to a block and offset. Indices past the end clamp
    /// to the position before the final newline.
    pub fn locate(&self, index: usize) -> Location {
        let index = index.min(self.len().saturating_sub(1));
        let mut start = 0;
        for (i, block) in self.blocks.iter().enumerate() {
            let len = block.len();
            if index < start + len {
                return Location {
                    block: i,
                    offset: index - start,
                };
            }
            start += len;
        }
        let last = self.blocks.len().saturating_sub(1);
        Location {
            block: last,
            offset: self.blocks.get(last).map(Block::text_len).unwrap_or(0),
        }
    }

    /// Indices of all blocks touched by a range
    pub fn blocks_in(&self, range: Range) -> std::ops::RangeInclusive<usize> {
        let range = range.clamp(self.len());
        let first = self.locate(range.index).block;
        let last = if range.is_collapsed() {
            first
        } else {
            self.locate(range.end() - 1).block
        };
        first..=last
    }

    /// For each text block touched by a range: (block, local start, local end)
    fn text_spans(&self, range: Range) -> Vec<(usize, usize, usize)> {
        let range = range.clamp(self.len());
        self.blocks_in(range)
            .filter(|&i| !self.blocks[i].is_atomic())
            .map(|i| {
                let start = self.block_start(i);
                let block = &self.blocks[i];
                let local_start = range.index.saturating_sub(start).min(block.text_len());
                let local_end = range.end().saturating_sub(start).min(block.text_len());
                (i, local_start, local_end)
            })
            .collect()
    }

    /// Insert text at an index. Newlines split blocks. Without an explicit
    /// format the text inherits the format of the preceding character.
    /// Returns the index just past the inserted text.
    pub fn insert_text(&mut self, index: usize, text: &str, format: Option<InlineFormat>) -> usize {
        let text = text.replace("\r\n", "\n").replace('\r', "\n");
        let start = index.min(self.len().saturating_sub(1));
        let loc = self.locate(start);
        let mut block_idx = loc.block;
        let mut offset = loc.offset;

        if self.blocks[block_idx].is_atomic() {
            // Text typed at a marker lands in a fresh paragraph before it
            self.blocks.insert(block_idx, Block::paragraph());
            offset = 0;
        }

        let format = format.unwrap_or_else(|| self.blocks[block_idx].inline_format_at(offset));
        let mut lines = text.split('\n');
        if let Some(first) = lines.next() {
            self.blocks[block_idx].insert_text(offset, first, format.clone());
            offset += first.chars().count();
        }
        for line in lines {
            let tail = self.blocks[block_idx].split_off(offset);
            block_idx += 1;
            self.blocks.insert(block_idx, tail);
            self.blocks[block_idx].insert_text(0, line, format.clone());
            offset = line.chars().count();
        }

        self.ensure_invariants();
        start + text.chars().count()
    }

    /// Delete a range. Atomic blocks inside the range are removed; a
    /// deleted newline merges the following text block into the current one.
    pub fn delete(&mut self, range: Range) {
        let range = range.clamp(self.len());
        if range.is_collapsed() {
            return;
        }
        let start = self.locate(range.index);
        let end = self.locate(range.end());

        if start.block == end.block {
            self.blocks[start.block].delete(start.offset, end.offset);
            self.ensure_invariants();
            return;
        }

        let mut tail_blocks = self.blocks.split_off(end.block);
        self.blocks.truncate(start.block + 1);

        let first_atomic = self.blocks[start.block].is_atomic();
        if first_atomic {
            self.blocks.pop();
        } else {
            let first = &mut self.blocks[start.block];
            let len = first.text_len();
            first.delete(start.offset, len);
        }

        let mut end_block = tail_blocks.remove(0);
        if end_block.is_atomic() {
            // An end index at offset 0 of a marker does not cover it
            self.blocks.push(end_block);
        } else {
            let kept = end_block.split_off(end.offset);
            if first_atomic {
                self.blocks.push(kept);
            } else {
                self.blocks[start.block].append(kept);
            }
        }
        self.blocks.extend(tail_blocks);
        self.ensure_invariants();
    }

    /// Insert a block at an index and return the index just past it.
    ///
    /// At the start of a block the new block goes in front of it, at the end
    /// of a text block it goes after it, and in the middle the text block is
    /// split in two (a run spanning the index becomes two runs with the same
    /// format) with the new block between the halves.
    pub fn insert_block(&mut self, index: usize, block: Block) -> usize {
        let loc = self.locate(index);
        let target = &self.blocks[loc.block];
        let position = if target.is_atomic() || loc.offset == 0 {
            loc.block
        } else if loc.offset >= target.text_len() {
            loc.block + 1
        } else {
            let tail = self.blocks[loc.block].split_off(loc.offset);
            self.blocks.insert(loc.block + 1, tail);
            loc.block + 1
        };
        self.blocks.insert(position, block);
        self.ensure_invariants();
        self.block_start(position) + self.blocks[position].len()
    }

    /// Apply an inline format to every character in a range
    pub fn format_text(&mut self, range: Range, format: &Format) {
        for (i, start, end) in self.text_spans(range) {
            self.blocks[i].format_range(start, end, format);
        }
    }

    /// Remove inline formatting from every character in a range
    pub fn clear_text_format(&mut self, range: Range) {
        for (i, start, end) in self.text_spans(range) {
            self.blocks[i].clear_range(start, end);
        }
    }

    /// Apply a block format to every text block touched by a range
    pub fn format_blocks(&mut self, range: Range, format: &Format) -> Result<()> {
        for i in self.blocks_in(range) {
            self.blocks[i].apply_block_format(format)?;
        }
        Ok(())
    }

    /// Inline formats of every run overlapping a range
    pub fn inline_formats_in(&self, range: Range) -> Vec<&InlineFormat> {
        self.text_spans(range)
            .into_iter()
            .flat_map(|(i, start, end)| self.blocks[i].inline_formats_in(start, end))
            .collect()
    }

    /// Text blocks touched by a range
    pub fn text_blocks_in(&self, range: Range) -> Vec<&Block> {
        self.blocks_in(range)
            .map(|i| &self.blocks[i])
            .filter(|b| !b.is_atomic())
            .collect()
    }

    /// Never empty, always ends with a text block the caret can enter, and
    /// every block attribute is within range
    fn ensure_invariants(&mut self) {
        for block in &mut self.blocks {
            block.sanitize();
        }
        if self.blocks.last().map_or(true, Block::is_atomic) {
            self.blocks.push(Block::paragraph());
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
