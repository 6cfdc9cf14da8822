use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;

use crate::constants::{
    DEFAULT_CHAT_ENDPOINT, DEFAULT_CHAT_MODEL, DEFAULT_IMAP_PORT, DEFAULT_TEMPERATURE,
    MAX_BODY_CHARS_PER_EMAIL, MAX_EMAILS_TO_FETCH, MAX_EMAIL_BODIES_IN_PROMPT, TOKEN_ENV_VARS,
};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Prefill values for the connect prompts
    #[serde(default)]
    pub imap: ImapConfig,
    /// Chat-completion endpoint settings
    #[serde(default)]
    pub ai: AiConfig,
    /// Caps bounding fetched messages and prompt size
    #[serde(default)]
    pub limits: LimitsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImapConfig {
    #[serde(default)]
    pub server: Option<String>,
    #[serde(default = "default_imap_port")]
    pub port: u16,
    #[serde(default)]
    pub username: Option<String>,
}

impl Default for ImapConfig {
    fn default() -> Self {
        Self {
            server: None,
            port: default_imap_port(),
            username: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    /// API token. Falls back to MAILCHAT_API_TOKEN / FRIENDLI_TOKEN.
    #[serde(default)]
    pub api_token: Option<String>,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_token: None,
            endpoint: default_endpoint(),
            model: default_model(),
            temperature: default_temperature(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitsConfig {
    #[serde(default = "default_max_emails_to_fetch")]
    pub max_emails_to_fetch: usize,
    #[serde(default = "default_max_bodies_in_prompt")]
    pub max_bodies_in_prompt: usize,
    #[serde(default = "default_max_body_chars")]
    pub max_body_chars: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_emails_to_fetch: default_max_emails_to_fetch(),
            max_bodies_in_prompt: default_max_bodies_in_prompt(),
            max_body_chars: default_max_body_chars(),
        }
    }
}

fn default_imap_port() -> u16 {
    DEFAULT_IMAP_PORT
}

fn default_endpoint() -> String {
    DEFAULT_CHAT_ENDPOINT.to_string()
}

fn default_model() -> String {
    DEFAULT_CHAT_MODEL.to_string()
}

fn default_temperature() -> f32 {
    DEFAULT_TEMPERATURE
}

fn default_max_emails_to_fetch() -> usize {
    MAX_EMAILS_TO_FETCH
}

fn default_max_bodies_in_prompt() -> usize {
    MAX_EMAIL_BODIES_IN_PROMPT
}

fn default_max_body_chars() -> usize {
    MAX_BODY_CHARS_PER_EMAIL
}

impl Config {
    pub fn config_dir() -> Result<PathBuf> {
        let dir = dirs::config_dir()
            .context("Could not find config directory")?
            .join("mailchat");
        Ok(dir)
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load the config file, or defaults when none exists.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if !path.exists() {
            tracing::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// API token from the config file, else from the environment.
    pub fn default_api_token(&self) -> Option<String> {
        self.ai
            .api_token
            .clone()
            .filter(|t| !t.trim().is_empty())
            .or_else(token_from_env)
    }
}

fn token_from_env() -> Option<String> {
    TOKEN_ENV_VARS
        .iter()
        .filter_map(|var| env::var(var).ok())
        .find(|value| !value.trim().is_empty())
}
