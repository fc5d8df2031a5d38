//! Embedded stylesheet for exported pages
//!
//! Every class the writer can emit has a rule here, so an exported page
//! renders the same without any external stylesheet.

use super::escape::color_token;
use crate::PageWidth;
use doc_model::MAX_INDENT;

const BASE_RULES: &[&str] = &[
    "body { margin: 0 auto; padding: 48px; font-family: Helvetica, Arial, sans-serif; font-size: 13px; line-height: 1.42; }",
    "p, h1, h2, h3, h4, h5, h6, blockquote, pre, ol, ul { margin: 0; padding: 0; }",
    "h1 { font-size: 2em; }",
    "h2 { font-size: 1.5em; }",
    "h3 { font-size: 1.17em; }",
    "h4 { font-size: 1em; }",
    "h5 { font-size: 0.83em; }",
    "h6 { font-size: 0.67em; }",
    ".bold { font-weight: bold; }",
    ".italic { font-style: italic; }",
    ".underline { text-decoration: underline; }",
    ".strike { text-decoration: line-through; }",
    ".underline.strike { text-decoration: underline line-through; }",
    ".size-small { font-size: 0.75em; }",
    ".size-large { font-size: 1.5em; }",
    ".size-huge { font-size: 2.5em; }",
    ".font-serif { font-family: Georgia, 'Times New Roman', serif; }",
    ".font-monospace { font-family: Monaco, 'Courier New', monospace; }",
    ".script-sub { vertical-align: sub; font-size: smaller; }",
    ".script-super { vertical-align: super; font-size: smaller; }",
    "blockquote { border-left: 4px solid #ccc; margin: 5px 0; padding-left: 16px; }",
    "pre.code-block { background-color: #23241f; color: #f8f8f2; white-space: pre-wrap; margin: 5px 0; padding: 5px 10px; }",
    "ol, ul { padding-left: 1.5em; }",
    ".align-left { text-align: left; }",
    ".align-center { text-align: center; }",
    ".align-right { text-align: right; }",
    ".align-justify { text-align: justify; }",
    ".dir-rtl { direction: rtl; }",
    ".page-break { page-break-before: always; break-before: page; height: 0; margin: 16px 0; border-top: 1px dashed #ccc; }",
    ".embed-image { max-width: 100%; }",
    ".embed-video { margin: 5px 0; }",
    "a { color: #06c; }",
];

/// Append the full `<style>` contents: base rules, page width, indent
/// levels, then one rule pair per color in first-use order.
pub fn write_stylesheet(out: &mut String, page_width: PageWidth, colors: &[String]) {
    for rule in BASE_RULES {
        out.push_str(rule);
        out.push('\n');
    }
    out.push_str(&format!("body {{ max-width: {}px; }}\n", page_width.pixels()));

    for level in 1..=u32::from(MAX_INDENT) {
        out.push_str(&format!(
            ".indent-{level} {{ padding-left: {}em; }}\n",
            level * 3
        ));
    }
    for level in 1..=u32::from(MAX_INDENT) {
        out.push_str(&format!(
            "li.indent-{level} {{ padding-left: {}.5em; }}\n",
            level * 3 + 1
        ));
    }

    for color in colors {
        let token = color_token(color);
        out.push_str(&format!(".color-{token} {{ color: {color}; }}\n"));
        out.push_str(&format!(".bg-{token} {{ background-color: {color}; }}\n"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_covers_every_class() {
        let mut css = String::new();
        write_stylesheet(&mut css, PageWidth::A4, &["#ff0000".to_string()]);
        for selector in [
            ".bold", ".italic", ".underline", ".strike", ".size-small", ".size-large",
            ".size-huge", ".font-serif", ".font-monospace", ".script-sub", ".script-super",
            "blockquote", "pre.code-block", ".indent-5", "li.indent-1", ".align-justify",
            ".dir-rtl", ".page-break", ".embed-image", ".embed-video", ".color-ff0000",
            ".bg-ff0000",
        ] {
            assert!(css.contains(selector), "missing rule for {selector}");
        }
        assert!(css.contains("max-width: 595px"));
        assert!(css.contains("li.indent-1 { padding-left: 4.5em; }"));
    }
}
