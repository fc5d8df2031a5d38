//! Selection model - cursor position and selected range in index space

use serde::{Deserialize, Serialize};

/// A selection in the document, expressed as a start index and a length.
/// A zero length is a collapsed caret.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
    pub index: usize,
    pub length: usize,
}

impl Range {
    pub fn new(index: usize, length: usize) -> Self {
        Self { index, length }
    }

    /// Collapsed selection (caret only)
    pub fn caret(index: usize) -> Self {
        Self { index, length: 0 }
    }

    /// Check if this selection is collapsed (just a caret)
    pub fn is_collapsed(&self) -> bool {
        self.length == 0
    }

    /// Exclusive end index
    pub fn end(&self) -> usize {
        self.index + self.length
    }

    /// Clamp into a document of `doc_len` index units. The final newline is
    /// never selectable.
    pub fn clamp(&self, doc_len: usize) -> Self {
        let max = doc_len.saturating_sub(1);
        let index = self.index.min(max);
        let end = self.end().min(max);
        Self {
            index,
            length: end - index,
        }
    }
}

/// A resolved index: which block, and where inside it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    /// Block position in the document
    pub block: usize,
    /// Character offset inside the block (0 for atomic blocks)
    pub offset: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp() {
        assert_eq!(Range::new(3, 10).clamp(6), Range::new(3, 2));
        assert_eq!(Range::new(9, 0).clamp(6), Range::caret(5));
        assert_eq!(Range::caret(0).clamp(0), Range::caret(0));
    }
}
