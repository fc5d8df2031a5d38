//! Wire types for the conversion backend

use crate::{ConversionError, Result};
use bytes::Bytes;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Conversions offered by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionType {
    PdfToWord,
    WordToPdf,
    HtmlToPdf,
    TextToDocx,
}

impl ConversionType {
    pub const ALL: [ConversionType; 4] = [
        ConversionType::PdfToWord,
        ConversionType::WordToPdf,
        ConversionType::HtmlToPdf,
        ConversionType::TextToDocx,
    ];

    /// Value of the `type` form field
    pub fn as_str(&self) -> &'static str {
        match self {
            ConversionType::PdfToWord => "pdf_to_word",
            ConversionType::WordToPdf => "word_to_pdf",
            ConversionType::HtmlToPdf => "html_to_pdf",
            ConversionType::TextToDocx => "text_to_docx",
        }
    }
}

impl fmt::Display for ConversionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConversionType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        ConversionType::ALL
            .into_iter()
            .find(|t| t.as_str() == s.trim())
            .ok_or_else(|| {
                let known: Vec<_> = ConversionType::ALL.iter().map(|t| t.as_str()).collect();
                format!("unknown conversion type '{}' (expected one of {})", s, known.join(", "))
            })
    }
}

/// Body of a successful upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub original_id: String,
    pub converted_id: String,
}

/// Where the uploaded original and the converted file can be fetched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadLinks {
    pub original: Url,
    pub converted: Url,
}

/// A named payload for the upload form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, content_type: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Read a file from disk, guessing its content type from the extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        Ok(Self::new(file_name, content_type_for(&extension), bytes))
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

fn content_type_for(extension: &str) -> &'static str {
    match extension {
        "pdf" => "application/pdf",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "doc" => "application/msword",
        "html" | "htm" => "text/html",
        "txt" => "text/plain",
        _ => "application/octet-stream",
    }
}

/// A converted file fetched from the backend. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    id: String,
    bytes: Bytes,
}

impl Artifact {
    pub fn new(id: impl Into<String>, bytes: impl Into<Bytes>) -> Result<Self> {
        let id = id.into();
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(ConversionError::EmptyArtifact { id });
        }
        Ok(Self { id, bytes })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
