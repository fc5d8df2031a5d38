//! Plain-text export

use doc_model::Document;

/// One line per text block. Page breaks and media embeds are dropped.
pub fn to_plain_text(document: &Document) -> String {
    let mut out = String::new();
    for block in document.blocks().iter().filter(|b| !b.is_atomic()) {
        out.push_str(&block.text());
        out.push('\n');
    }
    out
}
