//! Shared types, error model, and configuration for NoahAid.
//!
//! This crate is the foundation depended on by all other NoahAid crates.
//! It provides:
//! - [`NoahAidError`] — the unified error type
//! - Domain types ([`Topic`], [`Message`], [`RichText`])
//! - Configuration ([`AppConfig`], [`ResponderSettings`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DEFAULT_FALLBACK_TEXT, DEFAULT_REPLY_DELAY_MS, DisplayConfig, KnowledgeBaseConfig,
    ResponderConfig, ResponderSettings, TitleMatch, config_dir, config_file_path, init_config,
    load_config, load_config_from, validate_config,
};
pub use error::{NoahAidError, Result};
pub use types::{Message, MessageId, MessageKind, RichText, Severity, Span, Topic};
