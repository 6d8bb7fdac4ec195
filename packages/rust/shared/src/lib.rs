//! Shared types, error model, and configuration for Freshwire.
//!
//! This crate is the foundation depended on by all other Freshwire crates.
//! It provides:
//! - [`FreshwireError`] — the unified error type
//! - Domain types ([`FetchOutcome`], [`ProcessedItem`], [`ContentKind`], [`BatchOutcome`])
//! - Configuration ([`AppConfig`], [`FetchConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, FetchConfig, SourcesConfig, StorageConfig, config_dir, config_file_path,
    init_config, load_config, load_config_from,
};
pub use error::{FreshwireError, Result};
pub use types::{
    BatchOutcome, ContentKind, FeedEntry, FetchFailure, FetchOutcome, ItemMetadata, ParsedFeed,
    ProcessedItem,
};
