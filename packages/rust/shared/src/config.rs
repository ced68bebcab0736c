//! Application configuration for NoahAid.
//!
//! User config lives at `~/.noahaid/noahaid.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{NoahAidError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "noahaid.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".noahaid";

/// Reply sent when no topic matches a query.
pub const DEFAULT_FALLBACK_TEXT: &str =
    "Sorry, I couldn't find a first-aid guide for that. Try another keyword.";

/// Simulated "typing" latency before every reply.
pub const DEFAULT_REPLY_DELAY_MS: u64 = 800;

// ---------------------------------------------------------------------------
// Config structs (matching noahaid.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Reply behaviour.
    #[serde(default)]
    pub responder: ResponderConfig,

    /// Knowledge base source.
    #[serde(default)]
    pub knowledge_base: KnowledgeBaseConfig,

    /// Renderer settings.
    #[serde(default)]
    pub display: DisplayConfig,
}

/// Which way round the topic title is compared with the query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TitleMatch {
    /// The lowercased title must appear inside the lowercased query.
    #[default]
    TitleInQuery,
    /// The lowercased query must appear inside the lowercased title.
    QueryInTitle,
}

/// `[responder]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponderConfig {
    /// Delay before the assistant reply is appended, in milliseconds.
    #[serde(default = "default_reply_delay_ms")]
    pub reply_delay_ms: u64,

    /// Text of the single reply sent when nothing matches.
    #[serde(default = "default_fallback_text")]
    pub fallback_text: String,

    /// Title containment direction for matching.
    #[serde(default)]
    pub title_match: TitleMatch,
}

impl Default for ResponderConfig {
    fn default() -> Self {
        Self {
            reply_delay_ms: default_reply_delay_ms(),
            fallback_text: default_fallback_text(),
            title_match: TitleMatch::default(),
        }
    }
}

fn default_reply_delay_ms() -> u64 {
    DEFAULT_REPLY_DELAY_MS
}
fn default_fallback_text() -> String {
    DEFAULT_FALLBACK_TEXT.into()
}

/// `[knowledge_base]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KnowledgeBaseConfig {
    /// JSON file replacing the bundled topic table.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// `[display]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Name shown in headers and the typing indicator.
    #[serde(default = "default_assistant_name")]
    pub assistant_name: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            assistant_name: default_assistant_name(),
        }
    }
}

fn default_assistant_name() -> String {
    "NoahAid".into()
}

// ---------------------------------------------------------------------------
// Responder settings (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime responder settings - merged from config file + CLI flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponderSettings {
    pub reply_delay: Duration,
    pub fallback_text: String,
    pub title_match: TitleMatch,
}

impl Default for ResponderSettings {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for ResponderSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            reply_delay: Duration::from_millis(config.responder.reply_delay_ms),
            fallback_text: config.responder.fallback_text.clone(),
            title_match: config.responder.title_match,
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.noahaid/`).
pub fn config_dir() -> Result<PathBuf> {
    let home =
        dirs::home_dir().ok_or_else(|| NoahAidError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.noahaid/noahaid.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| NoahAidError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| {
        NoahAidError::config(format!("failed to parse {}: {e}", path.display()))
    })?;
    validate_config(&config)?;
    Ok(config)
}

/// Reject values that would make the responder misbehave.
pub fn validate_config(config: &AppConfig) -> Result<()> {
    if config.responder.fallback_text.trim().is_empty() {
        return Err(NoahAidError::config("responder.fallback_text must not be empty"));
    }
    if config.display.assistant_name.trim().is_empty() {
        return Err(NoahAidError::config("display.assistant_name must not be empty"));
    }
    Ok(())
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| NoahAidError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| NoahAidError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| NoahAidError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
