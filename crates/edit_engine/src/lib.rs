//! Edit Engine - Command dispatch, format-state sync and undo/redo
//!
//! This crate defines the capability set an editing engine must offer,
//! an in-memory engine implementing it, and the dispatcher that turns
//! toolbar commands into explicit engine calls while keeping the current
//! [`doc_model::FormatState`] in step with every change.

mod command;
mod dispatcher;
mod engine;
mod error;
mod memory_engine;
mod mount;
pub mod page_break;
mod undo;

pub use command::*;
pub use dispatcher::*;
pub use engine::*;
pub use error::*;
pub use memory_engine::*;
pub use mount::*;
pub use undo::*;
