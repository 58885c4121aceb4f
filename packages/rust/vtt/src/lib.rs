//! Target-app (VTT) document store access.
//!
//! This crate provides:
//! - [`VttRuntime`] — the primitive operations of the target app's runtime
//! - [`JournalWriter`] — create-entry and write-notes on top of a runtime
//! - [`FileVtt`] — a directory-backed runtime (journal bundle on disk)
//! - [`MemoryVtt`] — an in-memory runtime for tests and dry runs

mod file;
mod memory;
mod runtime;
mod writer;

pub use file::FileVtt;
pub use memory::MemoryVtt;
pub use runtime::VttRuntime;
pub use writer::JournalWriter;
