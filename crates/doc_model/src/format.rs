//! Formatting attributes and the sparse active-format snapshot
//!
//! Runs carry a concrete [`InlineFormat`]; blocks carry a kind plus a
//! [`BlockFormat`]. Toolbar-facing code never sees either directly: it works
//! with [`Format`] values (one attribute with one explicit value) and reads
//! the [`FormatState`] computed for the current selection.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Deepest indent level a block can carry
pub const MAX_INDENT: u8 = 5;

/// Deepest heading level
pub const MAX_HEADING_LEVEL: u8 = 6;

/// Font family classes offered by the toolbar
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FontFamily {
    #[default]
    SansSerif,
    Serif,
    Monospace,
}

impl FontFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            FontFamily::SansSerif => "sans-serif",
            FontFamily::Serif => "serif",
            FontFamily::Monospace => "monospace",
        }
    }
}

/// Relative size classes (no absolute point sizes)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SizeClass {
    Small,
    #[default]
    Normal,
    Large,
    Huge,
}

impl SizeClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            SizeClass::Small => "small",
            SizeClass::Normal => "normal",
            SizeClass::Large => "large",
            SizeClass::Huge => "huge",
        }
    }
}

/// Vertical script position
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Script {
    #[default]
    Normal,
    Sub,
    Super,
}

/// Text alignment options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

impl Alignment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
            Alignment::Justify => "justify",
        }
    }
}

/// Writing direction of a block
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    #[default]
    Ltr,
    Rtl,
}

/// List flavours; a block is in at most one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ListKind {
    Ordered,
    Bullet,
}

/// Name of a formatting attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FormatKey {
    Font,
    Size,
    Bold,
    Italic,
    Underline,
    Strike,
    Script,
    Color,
    Background,
    Link,
    Header,
    List,
    Blockquote,
    CodeBlock,
    Align,
    Direction,
    Indent,
}

impl FormatKey {
    pub const ALL: [FormatKey; 17] = [
        FormatKey::Font,
        FormatKey::Size,
        FormatKey::Bold,
        FormatKey::Italic,
        FormatKey::Underline,
        FormatKey::Strike,
        FormatKey::Script,
        FormatKey::Color,
        FormatKey::Background,
        FormatKey::Link,
        FormatKey::Header,
        FormatKey::List,
        FormatKey::Blockquote,
        FormatKey::CodeBlock,
        FormatKey::Align,
        FormatKey::Direction,
        FormatKey::Indent,
    ];

    /// Attribute name as used by the toolbar
    pub fn name(&self) -> &'static str {
        match self {
            FormatKey::Font => "font",
            FormatKey::Size => "size",
            FormatKey::Bold => "bold",
            FormatKey::Italic => "italic",
            FormatKey::Underline => "underline",
            FormatKey::Strike => "strike",
            FormatKey::Script => "script",
            FormatKey::Color => "color",
            FormatKey::Background => "background",
            FormatKey::Link => "link",
            FormatKey::Header => "header",
            FormatKey::List => "list",
            FormatKey::Blockquote => "blockquote",
            FormatKey::CodeBlock => "code-block",
            FormatKey::Align => "align",
            FormatKey::Direction => "direction",
            FormatKey::Indent => "indent",
        }
    }

    /// Whether this attribute lives on runs rather than on blocks
    pub fn is_inline(&self) -> bool {
        matches!(
            self,
            FormatKey::Font
                | FormatKey::Size
                | FormatKey::Bold
                | FormatKey::Italic
                | FormatKey::Underline
                | FormatKey::Strike
                | FormatKey::Script
                | FormatKey::Color
                | FormatKey::Background
                | FormatKey::Link
        )
    }

    /// The value an absent attribute stands for
    pub fn default_format(&self) -> Format {
        match self {
            FormatKey::Font => Format::Font(FontFamily::default()),
            FormatKey::Size => Format::Size(SizeClass::default()),
            FormatKey::Bold => Format::Bold(false),
            FormatKey::Italic => Format::Italic(false),
            FormatKey::Underline => Format::Underline(false),
            FormatKey::Strike => Format::Strike(false),
            FormatKey::Script => Format::Script(Script::default()),
            FormatKey::Color => Format::Color(None),
            FormatKey::Background => Format::Background(None),
            FormatKey::Link => Format::Link(None),
            FormatKey::Header => Format::Header(None),
            FormatKey::List => Format::List(None),
            FormatKey::Blockquote => Format::Blockquote(false),
            FormatKey::CodeBlock => Format::CodeBlock(false),
            FormatKey::Align => Format::Align(Alignment::default()),
            FormatKey::Direction => Format::Direction(Direction::default()),
            FormatKey::Indent => Format::Indent(0),
        }
    }
}

/// One attribute with one explicit value
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "attr", content = "value", rename_all = "kebab-case")]
pub enum Format {
    Font(FontFamily),
    Size(SizeClass),
    Bold(bool),
    Italic(bool),
    Underline(bool),
    Strike(bool),
    Script(Script),
    Color(Option<String>),
    Background(Option<String>),
    Link(Option<String>),
    Header(Option<u8>),
    List(Option<ListKind>),
    Blockquote(bool),
    CodeBlock(bool),
    Align(Alignment),
    Direction(Direction),
    Indent(u8),
}

impl Format {
    pub fn key(&self) -> FormatKey {
        match self {
            Format::Font(_) => FormatKey::Font,
            Format::Size(_) => FormatKey::Size,
            Format::Bold(_) => FormatKey::Bold,
            Format::Italic(_) => FormatKey::Italic,
            Format::Underline(_) => FormatKey::Underline,
            Format::Strike(_) => FormatKey::Strike,
            Format::Script(_) => FormatKey::Script,
            Format::Color(_) => FormatKey::Color,
            Format::Background(_) => FormatKey::Background,
            Format::Link(_) => FormatKey::Link,
            Format::Header(_) => FormatKey::Header,
            Format::List(_) => FormatKey::List,
            Format::Blockquote(_) => FormatKey::Blockquote,
            Format::CodeBlock(_) => FormatKey::CodeBlock,
            Format::Align(_) => FormatKey::Align,
            Format::Direction(_) => FormatKey::Direction,
            Format::Indent(_) => FormatKey::Indent,
        }
    }

    pub fn is_inline(&self) -> bool {
        self.key().is_inline()
    }

    pub fn is_default(&self) -> bool {
        *self == self.key().default_format()
    }

    /// Inverted value for on/off attributes, `None` for everything else
    pub fn toggled(&self) -> Option<Format> {
        match self {
            Format::Bold(v) => Some(Format::Bold(!v)),
            Format::Italic(v) => Some(Format::Italic(!v)),
            Format::Underline(v) => Some(Format::Underline(!v)),
            Format::Strike(v) => Some(Format::Strike(!v)),
            Format::Blockquote(v) => Some(Format::Blockquote(!v)),
            Format::CodeBlock(v) => Some(Format::CodeBlock(!v)),
            _ => None,
        }
    }
}

/// Inline formatting carried by a run. Every field holds a concrete value;
/// the default value means "not formatted".
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct InlineFormat {
    pub font: FontFamily,
    pub size: SizeClass,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strike: bool,
    pub script: Script,
    pub color: Option<String>,
    pub background: Option<String>,
    pub link: Option<String>,
}

impl InlineFormat {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style helper used heavily in tests and fixtures
    pub fn with(mut self, format: Format) -> Self {
        self.apply(&format);
        self
    }

    /// Current value of an inline attribute; `None` for block attributes
    pub fn get(&self, key: FormatKey) -> Option<Format> {
        let format = match key {
            FormatKey::Font => Format::Font(self.font),
            FormatKey::Size => Format::Size(self.size),
            FormatKey::Bold => Format::Bold(self.bold),
            FormatKey::Italic => Format::Italic(self.italic),
            FormatKey::Underline => Format::Underline(self.underline),
            FormatKey::Strike => Format::Strike(self.strike),
            FormatKey::Script => Format::Script(self.script),
            FormatKey::Color => Format::Color(self.color.clone()),
            FormatKey::Background => Format::Background(self.background.clone()),
            FormatKey::Link => Format::Link(self.link.clone()),
            _ => return None,
        };
        Some(format)
    }

    /// Set one attribute. Returns false when `format` is not inline.
    pub fn apply(&mut self, format: &Format) -> bool {
        match format {
            Format::Font(v) => self.font = *v,
            Format::Size(v) => self.size = *v,
            Format::Bold(v) => self.bold = *v,
            Format::Italic(v) => self.italic = *v,
            Format::Underline(v) => self.underline = *v,
            Format::Strike(v) => self.strike = *v,
            Format::Script(v) => self.script = *v,
            Format::Color(v) => self.color = v.clone(),
            Format::Background(v) => self.background = v.clone(),
            Format::Link(v) => self.link = v.clone(),
            _ => return false,
        }
        true
    }

    /// All inline attributes as explicit formats
    pub fn formats(&self) -> Vec<Format> {
        FormatKey::ALL
            .iter()
            .filter_map(|key| self.get(*key))
            .collect()
    }

    pub fn is_default(&self) -> bool {
        *self == InlineFormat::default()
    }
}

/// Block-level attributes other than the block kind
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockFormat {
    pub align: Alignment,
    pub direction: Direction,
    /// 0 (none) to [`MAX_INDENT`]
    pub indent: u8,
}

impl BlockFormat {
    pub fn is_default(&self) -> bool {
        *self == BlockFormat::default()
    }
}

/// Active formatting at a selection.
///
/// Sparse: only attributes with a non-default value are stored, and an
/// absent key means "inherit/default", never "false". Owned by the command
/// dispatcher and handed out by shared reference only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatState {
    values: BTreeMap<FormatKey, Format>,
}

impl FormatState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a state from explicit formats, dropping default values
    pub fn from_formats(formats: impl IntoIterator<Item = Format>) -> Self {
        let values = formats
            .into_iter()
            .filter(|f| !f.is_default())
            .map(|f| (f.key(), f))
            .collect();
        Self { values }
    }

    /// Raw sparse lookup
    pub fn get(&self, key: FormatKey) -> Option<&Format> {
        self.values.get(&key)
    }

    /// Lookup substituting the attribute default when absent
    pub fn effective(&self, key: FormatKey) -> Format {
        self.values
            .get(&key)
            .cloned()
            .unwrap_or_else(|| key.default_format())
    }

    pub fn contains(&self, key: FormatKey) -> bool {
        self.values.contains_key(&key)
    }

    /// True when an on/off attribute is switched on
    pub fn is_enabled(&self, key: FormatKey) -> bool {
        matches!(
            self.values.get(&key),
            Some(
                Format::Bold(true)
                    | Format::Italic(true)
                    | Format::Underline(true)
                    | Format::Strike(true)
                    | Format::Blockquote(true)
                    | Format::CodeBlock(true)
            )
        )
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Format> {
        self.values.values()
    }
}
