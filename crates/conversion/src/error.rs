//! Error types for conversion and export

use thiserror::Error;

/// Failures talking to the conversion backend
#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("Conversion request failed ({status}): {message}")]
    ConversionRequest { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("Converted file {id} is empty")]
    EmptyArtifact { id: String },

    #[error("Invalid response from conversion service: {0}")]
    InvalidResponse(String),

    #[error("Invalid upload: {0}")]
    InvalidUpload(String),

    #[error("Invalid service URL: {0}")]
    InvalidUrl(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Terminal outcome of an export job that did not complete
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Conversion(#[from] ConversionError),

    #[error("Export cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, ConversionError>;
