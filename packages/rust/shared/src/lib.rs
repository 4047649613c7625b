//! Shared types, error model, and configuration for Inkflow.
//!
//! This crate is the foundation depended on by all other Inkflow crates.
//! It provides:
//! - [`InkflowError`]: the unified error type
//! - Artifact types ([`IdeaSet`], [`ResearchSummary`], [`Article`]) and [`Stage`]
//! - Configuration ([`AppConfig`], tone rules, config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, CompletionConfig, DefaultsConfig, ResearchConfig, SearchConfig, Tone, ToneRule,
    config_dir, config_file_path, init_config, load_config, load_config_from, read_secret,
    validate_api_key, validate_config, validate_search_key,
};
pub use error::{InkflowError, Result};
pub use types::{Article, IdeaSet, ResearchSummary, RunId, Stage, local_timestamp};
