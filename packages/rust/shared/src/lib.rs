//! Shared types, error model, and configuration for readmepage.
//!
//! This crate is the foundation depended on by all other readmepage crates.
//! It provides:
//! - [`ReadmePageError`] — the unified error type
//! - Table-of-contents types ([`Toc`], [`TocEntry`])
//! - Configuration ([`AppConfig`] and its per-stage sections, config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DEFAULT_SOURCE_URL, HighlightConfig, OutputConfig, PageConfig, SourceConfig,
    TocConfig, TransformConfig, config_dir, config_file_path, init_config, load_config,
    load_config_from, resolve_config,
};
pub use error::{ReadmePageError, Result};
pub use types::{Toc, TocEntry};
