//! Document Model - Rich-text blocks, runs and formatting
//!
//! This crate provides the document model owned by an editing engine:
//! an ordered sequence of blocks addressed by a linear index, inline runs
//! with concrete formatting, the sparse [`FormatState`] snapshot the
//! toolbar renders from, and the registry of embeddable block kinds.

mod block;
mod document;
mod error;
mod format;
pub mod registry;
mod run;
mod selection;

pub use block::*;
pub use document::*;
pub use error::*;
pub use format::*;
pub use registry::{EmbedRegistry, EmbedSpec, Registration};
pub use run::*;
pub use selection::*;
