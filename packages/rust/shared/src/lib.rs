//! Shared types, error model, and configuration for DeepBrief.
//!
//! This crate is the foundation depended on by all other DeepBrief crates.
//! It provides:
//! - [`DeepBriefError`], the unified error type
//! - Domain types ([`SearchHit`], [`StructuredDocument`], [`ResearchReport`], [`RunId`])
//! - Configuration ([`AppConfig`], [`FetchConfig`], config loading)
//! - Tracing bootstrap ([`logging::init_tracing`])

pub mod config;
pub mod error;
pub mod logging;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DefaultsConfig, FetchConfig, FetchSettings, config_dir, config_file_path,
    init_config, load_config, load_config_from,
};
pub use error::{DeepBriefError, Result};
pub use types::{
    ResearchReport, RunId, SearchHit, SearchResponse, Section, StructuredDocument, Subsection,
};
