//! Property tests for HTML export

use doc_model::{Block, BlockKind, Document, Format, InlineFormat, ListKind, Run};
use proptest::prelude::*;
use store::{html, HtmlExportOptions, HtmlSerializer, PageWidth};

fn arb_run() -> impl Strategy<Value = Run> {
    (
        "[a-zA-Z <>&\"']{1,12}",
        any::<bool>(),
        any::<bool>(),
        proptest::option::of(prop_oneof![Just("#ff0000"), Just("navy"), Just("url(x)")]),
    )
        .prop_map(|(text, bold, italic, color)| {
            Run::with_format(
                text,
                InlineFormat::new()
                    .with(Format::Bold(bold))
                    .with(Format::Italic(italic))
                    .with(Format::Color(color.map(String::from))),
            )
        })
}

fn arb_block() -> impl Strategy<Value = Block> {
    prop_oneof![
        prop::collection::vec(arb_run(), 0..4)
            .prop_map(|runs| Block::with_runs(BlockKind::Paragraph, runs)),
        (1u8..=6, prop::collection::vec(arb_run(), 1..3))
            .prop_map(|(level, runs)| Block::with_runs(BlockKind::Heading { level }, runs)),
        prop::collection::vec(arb_run(), 1..3).prop_map(|runs| Block::with_runs(
            BlockKind::ListItem {
                list: ListKind::Bullet
            },
            runs
        )),
        Just(Block::page_break()),
    ]
}

fn arb_document() -> impl Strategy<Value = Document> {
    prop::collection::vec(arb_block(), 0..8).prop_map(Document::from_blocks)
}

proptest! {
    #[test]
    fn serialization_is_deterministic(doc in arb_document(), name in "[a-z <]{0,10}") {
        let serializer = HtmlSerializer::new();
        let first = serializer.serialize(&doc, &name);
        let second = serializer.serialize(&doc.clone(), &name);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn page_always_has_a_body(doc in arb_document()) {
        let page = html::serialize(&doc, "doc");
        prop_assert!(page.starts_with("<!DOCTYPE html>\n"));
        prop_assert!(page.ends_with("</body>\n</html>\n"));
        prop_assert!(!page.contains("<body>\n</body>"));
    }

    #[test]
    fn every_marker_becomes_a_page_break_div(doc in arb_document()) {
        let markers = doc.blocks().iter().filter(|b| b.kind == BlockKind::PageBreak).count();
        let page = html::serialize(&doc, "doc");
        prop_assert_eq!(page.matches("<div class=\"page-break\"></div>").count(), markers);
    }
}

#[test]
fn page_width_option_sets_body_width() {
    let serializer =
        HtmlSerializer::with_options(HtmlExportOptions::default().with_page_width(PageWidth::Legal));
    let page = serializer.serialize(&Document::from_text("x"), "doc");
    assert!(page.contains("body { max-width: 1056px; }"));

    let default_page = html::serialize(&Document::from_text("x"), "doc");
    assert!(default_page.contains("body { max-width: 816px; }"));
}
