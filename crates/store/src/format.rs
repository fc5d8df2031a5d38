//! On-disk document format

use chrono::{DateTime, Utc};
use doc_model::Document;
use serde::{Deserialize, Serialize};

/// File format version
pub const FORMAT_VERSION: u32 = 1;

/// File extension for saved documents
pub const FILE_EXTENSION: &str = "json";

/// File header for format identification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileHeader {
    /// Magic string for format identification
    pub magic: String,
    /// Format version
    pub version: u32,
    /// Document name shown in exports
    pub name: String,
    /// Last modified timestamp
    pub modified: DateTime<Utc>,
}

impl FileHeader {
    pub const MAGIC: &'static str = "RICHTEXT-DOC";

    pub fn new(name: impl Into<String>) -> Self {
        Self {
            magic: Self::MAGIC.to_string(),
            version: FORMAT_VERSION,
            name: name.into(),
            modified: Utc::now(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.magic == Self::MAGIC && self.version <= FORMAT_VERSION
    }
}

/// Complete file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentFile {
    pub header: FileHeader,
    pub document: Document,
}

impl DocumentFile {
    pub fn new(name: impl Into<String>, document: Document) -> Self {
        Self {
            header: FileHeader::new(name),
            document,
        }
    }
}
