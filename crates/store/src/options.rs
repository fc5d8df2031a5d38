//! Export options

use serde::{Deserialize, Serialize};

/// Name used when a document has none
pub const DEFAULT_DOCUMENT_NAME: &str = "Untitled Document";

/// Page width presets, in CSS pixels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PageWidth {
    Letter,
    A4,
    #[default]
    Wide,
    Legal,
}

impl PageWidth {
    pub fn pixels(&self) -> u32 {
        match self {
            PageWidth::Letter => 612,
            PageWidth::A4 => 595,
            PageWidth::Wide => 816,
            PageWidth::Legal => 1056,
        }
    }
}

/// Options for HTML export
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HtmlExportOptions {
    /// Maximum body width
    pub page_width: PageWidth,
    /// Title used when the document name is blank
    pub default_name: String,
}

impl HtmlExportOptions {
    pub fn with_page_width(mut self, page_width: PageWidth) -> Self {
        self.page_width = page_width;
        self
    }

    /// Document name to emit, falling back to the default
    pub fn resolve_name<'a>(&'a self, name: &'a str) -> &'a str {
        let name = name.trim();
        if name.is_empty() {
            &self.default_name
        } else {
            name
        }
    }
}

impl Default for HtmlExportOptions {
    fn default() -> Self {
        Self {
            page_width: PageWidth::default(),
            default_name: DEFAULT_DOCUMENT_NAME.to_string(),
        }
    }
}
