//! Conversion - Backend client, downloads and the export pipeline
//!
//! Documents leave the editor through this crate: a snapshot is
//! serialized (HTML for PDF, plain text for DOCX), uploaded to the
//! conversion service, and the converted file is fetched and handed to a
//! [`Downloader`].

mod client;
mod config;
mod download;
mod error;
mod export;
mod types;

pub use client::*;
pub use config::*;
pub use download::*;
pub use error::*;
pub use export::*;
pub use types::*;
