//! HTML export - Serializes a Document to a self-contained HTML page
//!
//! The output carries its own stylesheet, so every class it uses renders
//! without outside help. Output is deterministic: the same document and
//! name always produce byte-identical markup.

mod escape;
mod stylesheet;

pub use escape::{escape, sanitize_color, sanitize_src, sanitize_url, BLANK_URL};

use crate::HtmlExportOptions;
use doc_model::registry::{IMAGE, PAGE_BREAK, VIDEO};
use doc_model::{
    Alignment, Block, BlockKind, Direction, Document, EmbedRegistry, FontFamily, ListKind, Run,
    Script, SizeClass, MAX_HEADING_LEVEL, MAX_INDENT,
};
use escape::{color_token, push_escaped};
use std::collections::HashMap;
use tracing::warn;

/// HTML serializer
#[derive(Debug, Clone, Default)]
pub struct HtmlSerializer {
    options: HtmlExportOptions,
}

impl HtmlSerializer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: HtmlExportOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &HtmlExportOptions {
        &self.options
    }

    /// Render a complete HTML page for `document`, titled `name`
    pub fn serialize(&self, document: &Document, name: &str) -> String {
        let mut writer = HtmlWriter::new(&self.options);
        writer.write(document, name);
        writer.out
    }
}

/// Serialize with default options
pub fn serialize(document: &Document, name: &str) -> String {
    HtmlSerializer::new().serialize(document, name)
}

struct HtmlWriter<'a> {
    options: &'a HtmlExportOptions,
    registry: &'static EmbedRegistry,
    out: String,
    /// Raw color value -> sanitised value, `None` when rejected
    colors: HashMap<String, Option<String>>,
    /// Accepted colors in first-use order (for the stylesheet)
    used_colors: Vec<String>,
}

impl<'a> HtmlWriter<'a> {
    fn new(options: &'a HtmlExportOptions) -> Self {
        Self {
            options,
            registry: EmbedRegistry::global(),
            out: String::new(),
            colors: HashMap::new(),
            used_colors: Vec::new(),
        }
    }

    fn write(&mut self, document: &Document, name: &str) {
        // First pass: collect colors for the stylesheet
        self.collect_colors(document);

        self.write_head(name);
        self.out.push_str("<body>\n");
        self.write_blocks(document.blocks());
        self.out.push_str("</body>\n</html>\n");
    }

    fn collect_colors(&mut self, document: &Document) {
        let runs = document.blocks().iter().flat_map(|b| b.runs());
        for run in runs {
            for raw in [&run.format.color, &run.format.background].into_iter().flatten() {
                if self.colors.contains_key(raw) {
                    continue;
                }
                let color = sanitize_color(raw);
                if let Some(ref c) = color {
                    if !self.used_colors.contains(c) {
                        self.used_colors.push(c.clone());
                    }
                }
                self.colors.insert(raw.clone(), color);
            }
        }
    }

    fn write_head(&mut self, name: &str) {
        self.out.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>");
        push_escaped(&mut self.out, self.options.resolve_name(name));
        self.out.push_str("</title>\n<style>\n");
        stylesheet::write_stylesheet(&mut self.out, self.options.page_width, &self.used_colors);
        self.out.push_str("</style>\n</head>\n");
    }

    fn write_blocks(&mut self, blocks: &[Block]) {
        let mut i = 0;
        while i < blocks.len() {
            let block = &blocks[i];
            // Consecutive list items of one kind share a list; consecutive
            // code lines share a <pre>
            let grouped = matches!(block.kind, BlockKind::ListItem { .. } | BlockKind::CodeBlock);
            let count = if grouped {
                blocks[i..].iter().take_while(|b| b.kind == block.kind).count()
            } else {
                1
            };
            let group = &blocks[i..i + count];

            match &block.kind {
                BlockKind::ListItem { list } => self.write_list(*list, group),
                BlockKind::CodeBlock => self.write_code(group),
                _ => self.write_block(block),
            }
            i += count;
        }
    }

    fn write_block(&mut self, block: &Block) {
        let tag = match &block.kind {
            BlockKind::Paragraph => "p".to_string(),
            BlockKind::Heading { level } => format!("h{}", (*level).clamp(1, MAX_HEADING_LEVEL)),
            BlockKind::Blockquote => "blockquote".to_string(),
            BlockKind::PageBreak => return self.write_page_break(),
            BlockKind::Image { source } => return self.write_image(source),
            BlockKind::Video { source } => return self.write_video(source),
            BlockKind::ListItem { .. } | BlockKind::CodeBlock => {
                return self.write_blocks(std::slice::from_ref(block))
            }
        };
        self.open_tag(&tag, &block_classes(block));
        self.write_runs(block.runs());
        self.out.push_str(&format!("</{tag}>\n"));
    }

    fn write_list(&mut self, list: ListKind, items: &[Block]) {
        let tag = match list {
            ListKind::Ordered => "ol",
            ListKind::Bullet => "ul",
        };
        self.out.push_str(&format!("<{tag}>\n"));
        for item in items {
            self.open_tag("li", &block_classes(item));
            self.write_runs(item.runs());
            self.out.push_str("</li>\n");
        }
        self.out.push_str(&format!("</{tag}>\n"));
    }

    fn write_code(&mut self, lines: &[Block]) {
        let mut classes = vec!["code-block".to_string()];
        if let Some(first) = lines.first() {
            classes.extend(block_classes(first));
        }
        self.open_tag("pre", &classes);
        for (i, line) in lines.iter().enumerate() {
            if i > 0 {
                self.out.push('\n');
            }
            push_escaped(&mut self.out, &line.text());
        }
        self.out.push_str("</pre>\n");
    }

    fn write_page_break(&mut self) {
        match self.registry.get(PAGE_BREAK) {
            Some(spec) => self.out.push_str(&format!(
                "<{tag} class=\"{class}\"></{tag}>\n",
                tag = spec.tag,
                class = spec.class
            )),
            None => warn!("page-break embed not registered; marker skipped"),
        }
    }

    fn write_image(&mut self, source: &str) {
        let Some(spec) = self.registry.get(IMAGE) else {
            warn!("image embed not registered; image skipped");
            return;
        };
        self.out
            .push_str(&format!("<{} class=\"{}\" src=\"", spec.tag, spec.class));
        push_escaped(&mut self.out, sanitize_src(source));
        self.out.push_str("\" alt=\"\">\n");
    }

    fn write_video(&mut self, source: &str) {
        let Some(spec) = self.registry.get(VIDEO) else {
            warn!("video embed not registered; video skipped");
            return;
        };
        let url = sanitize_url(source);
        self.out
            .push_str(&format!("<{} class=\"{}\"><a href=\"", spec.tag, spec.class));
        push_escaped(&mut self.out, url);
        self.out.push_str("\">");
        push_escaped(&mut self.out, url);
        self.out.push_str(&format!("</a></{}>\n", spec.tag));
    }

    fn open_tag(&mut self, tag: &str, classes: &[String]) {
        self.out.push('<');
        self.out.push_str(tag);
        if !classes.is_empty() {
            self.out.push_str(" class=\"");
            self.out.push_str(&classes.join(" "));
            self.out.push('"');
        }
        self.out.push('>');
    }

    fn write_runs(&mut self, runs: &[Run]) {
        if runs.iter().all(Run::is_empty) {
            self.out.push_str("<br>");
            return;
        }
        for run in runs.iter().filter(|r| !r.is_empty()) {
            let link = run.format.link.as_deref().map(sanitize_url);
            if let Some(href) = link {
                self.out.push_str("<a href=\"");
                push_escaped(&mut self.out, href);
                self.out.push_str("\">");
            }
            let classes = self.run_classes(run);
            self.open_tag("span", &classes);
            push_escaped(&mut self.out, &run.text);
            self.out.push_str("</span>");
            if link.is_some() {
                self.out.push_str("</a>");
            }
        }
    }

    fn run_classes(&self, run: &Run) -> Vec<String> {
        let format = &run.format;
        let mut classes = Vec::new();
        if format.font != FontFamily::SansSerif {
            classes.push(format!("font-{}", format.font.as_str()));
        }
        if format.size != SizeClass::Normal {
            classes.push(format!("size-{}", format.size.as_str()));
        }
        for (on, class) in [
            (format.bold, "bold"),
            (format.italic, "italic"),
            (format.underline, "underline"),
            (format.strike, "strike"),
        ] {
            if on {
                classes.push(class.to_string());
            }
        }
        match format.script {
            Script::Normal => {}
            Script::Sub => classes.push("script-sub".to_string()),
            Script::Super => classes.push("script-super".to_string()),
        }
        if let Some(color) = self.accepted_color(&format.color) {
            classes.push(format!("color-{}", color_token(color)));
        }
        if let Some(color) = self.accepted_color(&format.background) {
            classes.push(format!("bg-{}", color_token(color)));
        }
        classes
    }

    fn accepted_color(&self, raw: &Option<String>) -> Option<&str> {
        let raw = raw.as_ref()?;
        self.colors.get(raw)?.as_deref()
    }
}

fn block_classes(block: &Block) -> Vec<String> {
    let mut classes = Vec::new();
    let indent = block.format.indent.min(MAX_INDENT);
    if indent > 0 {
        classes.push(format!("indent-{indent}"));
    }
    if block.format.align != Alignment::Left {
        classes.push(format!("align-{}", block.format.align.as_str()));
    }
    if block.format.direction == Direction::Rtl {
        classes.push("dir-rtl".to_string());
    }
    classes
}

#[cfg(test)]
mod tests {
    use super::*;
    use doc_model::{BlockFormat, Format, InlineFormat};

    fn body(html: &str) -> &str {
        let start = html.find("<body>\n").map(|i| i + 7).unwrap_or(0);
        let end = html.find("</body>").unwrap_or(html.len());
        &html[start..end]
    }

    fn para(runs: Vec<Run>) -> Block {
        Block::with_runs(BlockKind::Paragraph, runs)
    }

    #[test]
    fn test_hello_bold_world() {
        let doc = Document::from_blocks(vec![para(vec![
            Run::new("Hello "),
            Run::with_format("world", InlineFormat::new().with(Format::Bold(true))),
        ])]);
        let html = serialize(&doc, "Greeting");
        assert_eq!(
            body(&html),
            "<p><span>Hello </span><span class=\"bold\">world</span></p>\n"
        );
        assert!(html.contains("<title>Greeting</title>"));
    }

    #[test]
    fn test_empty_document() {
        let html = serialize(&Document::new(), "");
        assert_eq!(body(&html), "<p><br></p>\n");
        assert!(html.contains("<title>Untitled Document</title>"));
    }

    #[test]
    fn test_page_break_marker() {
        let doc = Document::from_blocks(vec![
            para(vec![Run::new("one")]),
            Block::page_break(),
            para(vec![Run::new("two")]),
        ]);
        let html = serialize(&doc, "x");
        assert_eq!(
            body(&html),
            "<p><span>one</span></p>\n<div class=\"page-break\"></div>\n<p><span>two</span></p>\n"
        );
        assert!(html.contains("page-break-before: always"));
    }

    #[test]
    fn test_lists_are_grouped() {
        let bullet = BlockKind::ListItem {
            list: ListKind::Bullet,
        };
        let doc = Document::from_blocks(vec![
            Block::with_runs(bullet.clone(), vec![Run::new("a")]),
            Block::with_runs(bullet.clone(), vec![Run::new("b")])
                .with_format(BlockFormat {
                    indent: 1,
                    ..Default::default()
                }),
            Block::with_runs(
                BlockKind::ListItem {
                    list: ListKind::Ordered,
                },
                vec![Run::new("c")],
            ),
        ]);
        let html = serialize(&doc, "x");
        assert_eq!(
            body(&html),
            "<ul>\n<li><span>a</span></li>\n<li class=\"indent-1\"><span>b</span></li>\n</ul>\n\
             <ol>\n<li><span>c</span></li>\n</ol>\n"
        );
    }

    #[test]
    fn test_code_block_lines_share_pre() {
        let doc = Document::from_blocks(vec![
            Block::with_runs(BlockKind::CodeBlock, vec![Run::new("fn main() {")]),
            Block::with_runs(BlockKind::CodeBlock, vec![Run::new("}")]),
        ]);
        let html = serialize(&doc, "x");
        assert!(body(&html).starts_with("<pre class=\"code-block\">fn main() {\n}</pre>\n"));
    }

    #[test]
    fn test_heading_and_block_classes() {
        let block = Block::with_runs(BlockKind::Heading { level: 2 }, vec![Run::new("T")])
            .with_format(BlockFormat {
                align: Alignment::Center,
                direction: Direction::Rtl,
                indent: 0,
            });
        let html = serialize(&Document::from_blocks(vec![block]), "x");
        assert!(body(&html).starts_with("<h2 class=\"align-center dir-rtl\"><span>T</span></h2>\n"));
    }

    #[test]
    fn test_loaded_attributes_stay_inside_stylesheet() {
        let doc: Document = serde_json::from_str(
            r#"{"blocks":[
                {"kind":{"type":"heading","level":9},"format":{"indent":9},"runs":[{"text":"T"}]},
                {"kind":{"type":"heading","level":3},"format":{"indent":200},"runs":[{"text":"U"}]}
            ]}"#,
        )
        .unwrap();
        let html = serialize(&doc, "x");
        assert_eq!(
            body(&html),
            "<p class=\"indent-5\"><span>T</span></p>\n<h3 class=\"indent-5\"><span>U</span></h3>\n"
        );
        assert!(html.contains(".indent-5 {"));
        assert!(!html.contains("indent-9"));
    }

    #[test]
    fn test_text_and_attributes_escaped() {
        let doc = Document::from_blocks(vec![para(vec![Run::with_format(
            "<script>",
            InlineFormat::new()
                .with(Format::Link(Some("javascript:alert('x')".into())))
                .with(Format::Color(Some("red\" onclick=\"x".into()))),
        )])]);
        let html = serialize(&doc, "<b>Name</b>");
        assert!(html.contains("<title>&lt;b&gt;Name&lt;/b&gt;</title>"));
        assert_eq!(
            body(&html),
            "<p><a href=\"about:blank\"><span>&lt;script&gt;</span></a></p>\n"
        );
        assert!(!html.contains("onclick"));
    }

    #[test]
    fn test_color_rules_follow_first_use() {
        let red = InlineFormat::new().with(Format::Color(Some("#FF0000".into())));
        let blue_bg = InlineFormat::new().with(Format::Background(Some("blue".into())));
        let doc = Document::from_blocks(vec![para(vec![
            Run::with_format("r", red),
            Run::with_format("b", blue_bg),
        ])]);
        let html = serialize(&doc, "x");
        assert!(body(&html).starts_with(
            "<p><span class=\"color-ff0000\">r</span><span class=\"bg-blue\">b</span></p>"
        ));
        let red_rule = html.find(".color-ff0000 {").unwrap();
        let blue_rule = html.find(".bg-blue {").unwrap();
        assert!(red_rule < blue_rule);
    }

    #[test]
    fn test_embeds() {
        let doc = Document::from_blocks(vec![
            Block::new(BlockKind::Image {
                source: "https://example.com/a.png".into(),
            }),
            Block::new(BlockKind::Video {
                source: "https://example.com/v".into(),
            }),
        ]);
        let html = serialize(&doc, "x");
        assert_eq!(
            body(&html),
            "<img class=\"embed-image\" src=\"https://example.com/a.png\" alt=\"\">\n\
             <p class=\"embed-video\"><a href=\"https://example.com/v\">https://example.com/v</a></p>\n\
             <p><br></p>\n"
        );
    }
}
