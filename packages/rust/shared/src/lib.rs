//! Shared types, error model, and configuration for ContextKeys.
//!
//! This crate is the foundation depended on by all other ContextKeys crates.
//! It provides:
//! - [`ContextKeysError`] — the unified error type
//! - Domain types ([`KeywordSequence`], [`MergePolicy`])
//! - Configuration ([`AppConfig`], [`GenerationConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DefaultsConfig, GenerationConfig, config_dir, config_file_path, init_config,
    load_config, load_config_from, resolve_api_key,
};
pub use error::{ContextKeysError, Result};
pub use types::{KeywordSequence, MergePolicy};
