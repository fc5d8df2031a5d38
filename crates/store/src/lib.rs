//! Store - Document files and export serialization
//!
//! This crate handles the JSON document file format and the serializers
//! used by export: a self-contained HTML page for the PDF path and plain
//! text for the DOCX path.

mod error;
mod format;
pub mod html;
mod options;
mod serializer;
mod text;

pub use error::*;
pub use format::*;
pub use html::HtmlSerializer;
pub use options::*;
pub use serializer::*;
pub use text::*;
