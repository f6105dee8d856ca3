//! Message formatting configuration with per-project overrides.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;

/// File name of the per-project override, relative to the repository root.
pub const CONFIG_FILE_NAME: &str = ".quill.toml";

/// Header style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStyle {
    /// Plain `type(scope): description`.
    #[default]
    Conventional,
    /// Gitmoji marker before the type.
    Emoji,
}

/// Formatting knobs consumed by the synthesizer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageConfig {
    pub style: MessageStyle,
    pub lowercase_first_letter: bool,
    /// Maximum header length, prefix included.
    pub description_max_length: usize,
    pub remove_period: bool,
}

impl Default for MessageConfig {
    fn default() -> Self {
        Self {
            style: MessageStyle::Conventional,
            lowercase_first_letter: true,
            description_max_length: 72,
            remove_period: true,
        }
    }
}

/// Load the message configuration for a repository: built-in defaults
/// overlaid with `.quill.toml` when present.
pub fn load_config(repo_path: &Path) -> Result<MessageConfig, ConfigError> {
    let path = repo_path.join(CONFIG_FILE_NAME);
    if !path.exists() {
        return Ok(MessageConfig::default());
    }

    let raw = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadFailed {
        path: path.display().to_string(),
        source: e,
    })?;

    let config: MessageConfig =
        toml_edit::de::from_str(&raw).map_err(|e| ConfigError::ParseFailed {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

    debug!("loaded message config from {}", path.display());

    Ok(config)
}
