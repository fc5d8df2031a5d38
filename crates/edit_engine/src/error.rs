//! Error types for editing operations

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EditError {
    #[error("Editing engine not attached; dropped command: {0}")]
    EngineNotReady(String),

    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    #[error("Document model error: {0}")]
    DocModel(#[from] doc_model::DocModelError),
}

pub type Result<T> = std::result::Result<T, EditError>;
