//! Shared types, error model, and configuration for wikimd.
//!
//! This crate is the foundation depended on by all other wikimd crates.
//! It provides:
//! - [`WikiMdError`]: the unified error type
//! - Domain types ([`Page`], [`Section`])
//! - Collaborator traits ([`PageProvider`], [`LinkTarget`])
//! - Configuration ([`AppConfig`], [`ConvertConfig`], config loading)

pub mod config;
pub mod error;
pub mod source;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, ConvertConfig, DefaultsConfig, LANG_PLACEHOLDER, LinksConfig, MathStyle,
    SourceConfig, config_dir, config_file_path, init_config, load_config, load_config_from,
};
pub use error::{Result, WikiMdError};
pub use source::{LinkTarget, PageProvider};
pub use types::{Page, Section};
