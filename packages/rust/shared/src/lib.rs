//! Shared types, error model, and configuration for hexbridge.
//!
//! This crate is the foundation depended on by all other hexbridge crates.
//! It provides:
//! - [`HexbridgeError`] — the unified error type
//! - Domain types ([`ExtractedPage`], [`TargetRef`], [`CrawlRequest`], ...)
//! - Configuration ([`AppConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DelaysConfig, SourceConfig, TargetConfig, config_dir, config_file_path,
    init_config, load_config, load_config_from,
};
pub use error::{HexbridgeError, Result};
pub use types::{
    CrawlReport, CrawlRequest, DEFAULT_PAGE_TITLE, ExtractedPage, NotesExtract, ObjectId, TabId,
    TargetRef,
};
