use crate::client::openai::DEFAULT_BASE_URL;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Model used when nothing else is selected
pub const DEFAULT_MODEL: &str = "gpt-4.1";

/// Models offered for selection. Any other name can be given as `custom_model`.
pub const MODEL_OPTIONS: &[&str] = &["gpt-4.1-mini", "gpt-4.1", "gpt-4o", "gpt-4o-mini", "o4-mini"];

/// Largest source accepted for a single rewrite, in characters
pub const DEFAULT_MAX_CHARS: usize = 120_000;

/// Instruction used when the caller does not supply one
pub const DEFAULT_INSTRUCTION: &str =
    "Improve clarity and fix grammar. Keep original meaning. Preserve formatting and code blocks.";

/// User settings from `Redraft Settings.yaml` and `REDRAFT_*` environment variables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// One of [`MODEL_OPTIONS`]
    pub model: String,

    /// Free-text model name overriding `model` when non-empty
    pub custom_model: Option<String>,

    /// Completion service credential. Never written back to disk.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    pub base_url: String,

    pub max_chars: usize,

    /// Default editing instruction
    pub instruction: String,

    pub debug_mode: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            custom_model: None,
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            max_chars: DEFAULT_MAX_CHARS,
            instruction: DEFAULT_INSTRUCTION.to_string(),
            debug_mode: false,
        }
    }
}

/// Invalid settings values
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SettingsError {
    #[error("Unknown model {0:?}; pick one of the listed models or set custom_model")]
    UnknownModel(String),

    #[error("max_chars must be greater than zero")]
    ZeroMaxChars,

    #[error("base_url must not be empty")]
    EmptyBaseUrl,
}

impl Settings {
    /// Model name sent to the completion service
    pub fn effective_model(&self) -> &str {
        match self.custom_model.as_deref().map(str::trim) {
            Some(custom) if !custom.is_empty() => custom,
            _ => &self.model,
        }
    }

    /// Credential, if one is configured and non-blank
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    pub fn has_custom_model(&self) -> bool {
        self.custom_model
            .as_deref()
            .is_some_and(|m| !m.trim().is_empty())
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if !self.has_custom_model() && !MODEL_OPTIONS.contains(&self.model.as_str()) {
            return Err(SettingsError::UnknownModel(self.model.clone()));
        }
        if self.max_chars == 0 {
            return Err(SettingsError::ZeroMaxChars);
        }
        if self.base_url.trim().is_empty() {
            return Err(SettingsError::EmptyBaseUrl);
        }
        Ok(())
    }
}
