//! Error types for document model operations

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocModelError {
    #[error("Invalid heading level: {0}")]
    InvalidHeadingLevel(u8),

    #[error("Embed kind not registered: {0}")]
    UnregisteredEmbed(String),
}

pub type Result<T> = std::result::Result<T, DocModelError>;
