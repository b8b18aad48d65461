//! Configuration management for Debate Arena
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::arena::controller::MAX_EVENT_BUFFER;
use crate::cli::{Cli, Commands};
use crate::error::{DebateError, Result};
use crate::prompts::moderator_prompt::generate_moderator_prompt;
use crate::prompts::DEFAULT_MODEL;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure for Debate Arena
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Remote chat provider settings
    #[serde(default)]
    pub provider: ProviderConfig,
    /// Debate persona settings
    #[serde(default)]
    pub debate: DebateConfig,
    /// Interactive chat settings
    #[serde(default)]
    pub chat: ChatConfig,
}

/// Provider configuration
///
/// Specifies which remote chat API to use and its settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Type of provider to use
    #[serde(rename = "type", default = "default_provider_type")]
    pub provider_type: String,

    /// Gemini configuration
    #[serde(default)]
    pub gemini: GeminiConfig,
}

fn default_provider_type() -> String {
    "gemini".to_string()
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            provider_type: default_provider_type(),
            gemini: GeminiConfig::default(),
        }
    }
}

/// Gemini provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// Model every session is bound to
    #[serde(default = "default_gemini_model")]
    pub model: String,

    /// API base URL (useful for tests and local mocks)
    #[serde(default = "default_gemini_api_base")]
    pub api_base: String,

    /// API key; normally supplied through `GEMINI_API_KEY` or `API_KEY`
    /// rather than written to the config file
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
}

fn default_gemini_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_gemini_api_base() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            model: default_gemini_model(),
            api_base: default_gemini_api_base(),
            api_key: None,
        }
    }
}

/// Debate persona configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebateConfig {
    /// System instruction bound to each session
    #[serde(default = "default_system_instruction")]
    pub system_instruction: String,
}

fn default_system_instruction() -> String {
    generate_moderator_prompt()
}

impl Default for DebateConfig {
    fn default() -> Self {
        Self {
            system_instruction: default_system_instruction(),
        }
    }
}

/// Interactive chat configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Show `HH:MM` timestamps when printing the transcript
    #[serde(default = "default_show_timestamps")]
    pub show_timestamps: bool,

    /// Capacity of the transcript event channel
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,
}

fn default_show_timestamps() -> bool {
    true
}

fn default_event_buffer() -> usize {
    256
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            show_timestamps: default_show_timestamps(),
            event_buffer: default_event_buffer(),
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Returns
    ///
    /// Returns the loaded and merged configuration
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &str, cli: &Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| DebateError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| DebateError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(provider_type) = std::env::var("DEBATE_ARENA_PROVIDER") {
            self.provider.provider_type = provider_type;
        }

        if let Ok(model) = std::env::var("DEBATE_ARENA_MODEL") {
            self.provider.gemini.model = model;
        }

        if let Ok(api_base) = std::env::var("DEBATE_ARENA_API_BASE") {
            self.provider.gemini.api_base = api_base;
        }

        // GEMINI_API_KEY wins over the generic API_KEY.
        let key = std::env::var("GEMINI_API_KEY")
            .or_else(|_| std::env::var("API_KEY"))
            .ok()
            .filter(|k| !k.trim().is_empty());
        if key.is_some() {
            self.provider.gemini.api_key = key;
        }
    }

    fn apply_cli_overrides(&mut self, cli: &Cli) {
        if cli.verbose {
            tracing::debug!("Verbose mode enabled");
        }

        let model = match &cli.command {
            Commands::Chat { model } | Commands::Ask { model, .. } => model.as_ref(),
        };
        if let Some(model) = model {
            tracing::debug!("Using model override: {}", model);
            self.provider.gemini.model = model.clone();
        }
    }

    /// Validate the configuration
    ///
    /// A missing API key is not a validation failure; it is reported as a
    /// warning when the client is created.
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        let valid_providers = ["gemini"];
        if !valid_providers.contains(&self.provider.provider_type.as_str()) {
            return Err(DebateError::Config(format!(
                "Invalid provider type: {}. Must be one of: {}",
                self.provider.provider_type,
                valid_providers.join(", ")
            ))
            .into());
        }

        if self.provider.gemini.model.trim().is_empty() {
            return Err(DebateError::Config("gemini.model cannot be empty".to_string()).into());
        }

        let api_base = &self.provider.gemini.api_base;
        if !(api_base.starts_with("http://") || api_base.starts_with("https://")) {
            return Err(DebateError::Config(format!(
                "gemini.api_base must be an http(s) URL, got: {}",
                api_base
            ))
            .into());
        }

        if self.debate.system_instruction.trim().is_empty() {
            return Err(DebateError::Config(
                "debate.system_instruction cannot be empty".to_string(),
            )
            .into());
        }

        if !(1..=MAX_EVENT_BUFFER).contains(&self.chat.event_buffer) {
            return Err(DebateError::Config(format!(
                "chat.event_buffer must be between 1 and {}, got: {}",
                MAX_EVENT_BUFFER, self.chat.event_buffer
            ))
            .into());
        }

        Ok(())
    }
}
