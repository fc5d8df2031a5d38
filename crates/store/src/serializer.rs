//! Document file serialization

use crate::{DocumentFile, Result, StoreError};
use std::path::Path;
use tracing::debug;

/// Serialize a document file to JSON
pub fn serialize(file: &DocumentFile) -> Result<String> {
    let json = serde_json::to_string_pretty(file)?;
    Ok(json)
}

/// Deserialize a document file from JSON.
///
/// A bare document (no header) is accepted and given an empty name.
pub fn deserialize(json: &str) -> Result<DocumentFile> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    if value.get("header").is_none() {
        let document = serde_json::from_value(value)?;
        return Ok(DocumentFile::new(String::new(), document));
    }

    let file: DocumentFile = serde_json::from_value(value)?;
    if !file.header.is_valid() {
        return Err(StoreError::InvalidFormat(format!(
            "Invalid or unsupported format version: {}",
            file.header.version
        )));
    }
    Ok(file)
}

/// Read a document file from disk
pub fn load(path: &Path) -> Result<DocumentFile> {
    if !path.exists() {
        return Err(StoreError::FileNotFound(path.display().to_string()));
    }
    let json = std::fs::read_to_string(path)?;
    let file = deserialize(&json)?;
    debug!(path = %path.display(), blocks = file.document.block_count(), "document loaded");
    Ok(file)
}

/// Write a document file to disk
pub fn save(path: &Path, file: &DocumentFile) -> Result<()> {
    std::fs::write(path, serialize(file)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FORMAT_VERSION;
    use doc_model::Document;

    #[test]
    fn test_round_trip() {
        let file = DocumentFile::new("Notes", Document::from_text("one\ntwo"));
        let json = serialize(&file).unwrap();
        let loaded = deserialize(&json).unwrap();
        assert_eq!(loaded, file);
    }

    #[test]
    fn test_bare_document_accepted() {
        let json = serde_json::to_string(&Document::from_text("hi")).unwrap();
        let loaded = deserialize(&json).unwrap();
        assert_eq!(loaded.document.visible_text(), "hi");
        assert!(loaded.header.name.is_empty());
    }

    #[test]
    fn test_rejects_future_version() {
        let mut file = DocumentFile::new("x", Document::new());
        file.header.version = FORMAT_VERSION + 1;
        let json = serialize(&file).unwrap();
        assert!(matches!(deserialize(&json), Err(StoreError::InvalidFormat(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(&dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, StoreError::FileNotFound(_)));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.json");
        let file = DocumentFile::new("Saved", Document::from_text("body"));
        save(&path, &file).unwrap();
        assert_eq!(load(&path).unwrap(), file);
    }
}
