//! Text run - a contiguous span of text with consistent formatting

use crate::InlineFormat;
use serde::{Deserialize, Serialize};

/// A text run - contiguous text sharing one inline format
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Run {
    /// The text content of this run (never contains a newline)
    pub text: String,
    /// Formatting applied to the whole run
    #[serde(default)]
    pub format: InlineFormat,
}

impl Run {
    /// Create a new unformatted run
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            format: InlineFormat::default(),
        }
    }

    /// Create a run with explicit formatting
    pub fn with_format(text: impl Into<String>, format: InlineFormat) -> Self {
        Self {
            text: text.into(),
            format,
        }
    }

    /// Length in characters (the unit of document indices)
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Split this run at a character offset, returning the tail.
    /// Both halves keep the same format.
    pub fn split_off(&mut self, char_offset: usize) -> Run {
        let byte_offset = byte_offset(&self.text, char_offset);
        let tail = self.text.split_off(byte_offset);
        Run {
            text: tail,
            format: self.format.clone(),
        }
    }
}

/// Convert a character offset to a byte offset, clamping to the end
pub(crate) fn byte_offset(text: &str, char_offset: usize) -> usize {
    text.char_indices()
        .nth(char_offset)
        .map(|(i, _)| i)
        .unwrap_or(text.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Format;

    #[test]
    fn test_split_keeps_format() {
        let format = InlineFormat::new().with(Format::Bold(true));
        let mut run = Run::with_format("héllo", format.clone());
        let tail = run.split_off(2);

        assert_eq!(run.text, "hé");
        assert_eq!(tail.text, "llo");
        assert_eq!(run.format, format);
        assert_eq!(tail.format, format);
    }

    #[test]
    fn test_split_past_end_yields_empty_tail() {
        let mut run = Run::new("abc");
        let tail = run.split_off(10);
        assert_eq!(run.text, "abc");
        assert!(tail.is_empty());
    }
}
