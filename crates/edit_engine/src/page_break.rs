//! Page-break marker insertion

use crate::engine::{ChangeSource, EditorEngine};
use crate::Result;
use doc_model::{Embed, Range};

/// Blank lines opened after the marker by [`append_new_page`]
const NEW_PAGE_PADDING: &str = "\n\n";

/// Insert a page-break marker at `index` and put the caret just after it.
/// Surrounding text and its formatting are unchanged; a run spanning the
/// index is split into two runs with the same format.
pub fn insert_page_break(engine: &mut dyn EditorEngine, index: usize) -> Result<usize> {
    let past = engine.insert_embed(index, Embed::PageBreak, ChangeSource::User)?;
    engine.set_selection(Range::caret(past), ChangeSource::User);
    Ok(past)
}

/// Start a new page at the end of the document: a marker followed by
/// empty paragraphs, with the caret on the last of them.
pub fn append_new_page(engine: &mut dyn EditorEngine) -> Result<()> {
    let end = engine.length().saturating_sub(1);
    engine.insert_embed(end, Embed::PageBreak, ChangeSource::User)?;

    let end = engine.length().saturating_sub(1);
    engine.insert_text(end, NEW_PAGE_PADDING, ChangeSource::User)?;

    let end = engine.length().saturating_sub(1);
    engine.set_selection(Range::caret(end), ChangeSource::User);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryEngine;
    use doc_model::{BlockKind, Document};

    #[test]
    fn test_insert_mid_text() {
        let mut engine = MemoryEngine::with_document(Document::from_text("abcdef"));
        let past = insert_page_break(&mut engine, 3).unwrap();

        let doc = engine.contents();
        assert_eq!(doc.visible_text(), "abcdef");
        assert_eq!(doc.blocks()[1].kind, BlockKind::PageBreak);
        assert_eq!(past, 5);
        assert_eq!(engine.selection(), Some(Range::caret(5)));
    }

    #[test]
    fn test_new_page_on_empty_document() {
        let mut engine = MemoryEngine::new();
        append_new_page(&mut engine).unwrap();

        let doc = engine.contents();
        let kinds: Vec<_> = doc.blocks().iter().map(|b| b.kind.clone()).collect();
        assert_eq!(
            kinds,
            vec![
                BlockKind::PageBreak,
                BlockKind::Paragraph,
                BlockKind::Paragraph,
                BlockKind::Paragraph,
            ]
        );
        assert_eq!(engine.selection(), Some(Range::caret(doc.len() - 1)));
    }

    #[test]
    fn test_new_page_after_text() {
        let mut engine = MemoryEngine::with_document(Document::from_text("abc"));
        append_new_page(&mut engine).unwrap();

        let doc = engine.contents();
        assert_eq!(doc.block_count(), 5);
        assert_eq!(doc.blocks()[0].text(), "abc");
        assert_eq!(doc.blocks()[1].kind, BlockKind::PageBreak);
        assert!(doc.blocks()[2..].iter().all(|b| b.text().is_empty()));
    }
}
