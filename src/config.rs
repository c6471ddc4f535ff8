//! TOML configuration parsing.
//!
//! Every field has a serde default so a partial file (or none at all, via
//! [`Config::minimal`]) is enough to run the server against the public
//! dictionary and Wikipedia endpoints.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub lookup: LookupConfig,
    #[serde(default)]
    pub ai: AiConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:3030".to_string()
}

/// Outbound sources used by the term lookup aggregator.
#[derive(Debug, Deserialize, Clone)]
pub struct LookupConfig {
    #[serde(default = "default_dictionary_url")]
    pub dictionary_url: String,
    #[serde(default = "default_wikipedia_url")]
    pub wikipedia_url: String,
    #[serde(default = "default_dictionary_timeout_ms")]
    pub dictionary_timeout_ms: u64,
    #[serde(default = "default_wikipedia_timeout_ms")]
    pub wikipedia_timeout_ms: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            dictionary_url: default_dictionary_url(),
            wikipedia_url: default_wikipedia_url(),
            dictionary_timeout_ms: default_dictionary_timeout_ms(),
            wikipedia_timeout_ms: default_wikipedia_timeout_ms(),
            user_agent: default_user_agent(),
        }
    }
}

impl LookupConfig {
    pub fn dictionary_timeout(&self) -> Duration {
        Duration::from_millis(self.dictionary_timeout_ms)
    }

    pub fn wikipedia_timeout(&self) -> Duration {
        Duration::from_millis(self.wikipedia_timeout_ms)
    }
}

fn default_dictionary_url() -> String {
    "https://api.dictionaryapi.dev/api/v2/entries/en".to_string()
}
fn default_wikipedia_url() -> String {
    "https://en.wikipedia.org/api/rest_v1/page/summary".to_string()
}
fn default_dictionary_timeout_ms() -> u64 {
    5000
}
fn default_wikipedia_timeout_ms() -> u64 {
    3000
}
fn default_user_agent() -> String {
    "DocsBuddy-Lookup/1.0".to_string()
}

/// LLM completion settings shared by the sentence analyzer and chat.
#[derive(Debug, Deserialize, Clone)]
pub struct AiConfig {
    /// Name of the environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub analyzer_model: String,
    #[serde(default = "default_analyzer_max_tokens")]
    pub analyzer_max_tokens: u32,
    #[serde(default = "default_analyzer_temperature")]
    pub analyzer_temperature: f64,
    #[serde(default = "default_model")]
    pub chat_model: String,
    #[serde(default = "default_chat_max_tokens")]
    pub chat_max_tokens: u32,
    #[serde(default = "default_chat_temperature")]
    pub chat_temperature: f64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_api_key_env(),
            base_url: default_base_url(),
            analyzer_model: default_model(),
            analyzer_max_tokens: default_analyzer_max_tokens(),
            analyzer_temperature: default_analyzer_temperature(),
            chat_model: default_model(),
            chat_max_tokens: default_chat_max_tokens(),
            chat_temperature: default_chat_temperature(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl AiConfig {
    /// Reads the configured credential variable. Empty values count as unset.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}
fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}
fn default_model() -> String {
    "gpt-4o-mini".to_string()
}
fn default_analyzer_max_tokens() -> u32 {
    150
}
fn default_analyzer_temperature() -> f64 {
    0.3
}
fn default_chat_max_tokens() -> u32 {
    1000
}
fn default_chat_temperature() -> f64 {
    0.7
}
fn default_timeout_secs() -> u64 {
    30
}

impl Config {
    /// Built-in defaults, used when no config file is present.
    pub fn minimal() -> Self {
        Self::default()
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    if config.server.bind.trim().is_empty() {
        anyhow::bail!("server.bind must not be empty");
    }

    // Validate lookup sources
    if config.lookup.dictionary_url.trim().is_empty() {
        anyhow::bail!("lookup.dictionary_url must not be empty");
    }
    if config.lookup.wikipedia_url.trim().is_empty() {
        anyhow::bail!("lookup.wikipedia_url must not be empty");
    }
    if config.lookup.dictionary_timeout_ms == 0 {
        anyhow::bail!("lookup.dictionary_timeout_ms must be > 0");
    }
    if config.lookup.wikipedia_timeout_ms == 0 {
        anyhow::bail!("lookup.wikipedia_timeout_ms must be > 0");
    }

    // Validate AI settings
    if config.ai.api_key_env.trim().is_empty() {
        anyhow::bail!("ai.api_key_env must not be empty");
    }
    if config.ai.base_url.trim().is_empty() {
        anyhow::bail!("ai.base_url must not be empty");
    }
    for (name, value) in [
        ("ai.analyzer_temperature", config.ai.analyzer_temperature),
        ("ai.chat_temperature", config.ai.chat_temperature),
    ] {
        if !(0.0..=2.0).contains(&value) {
            anyhow::bail!("{} must be in [0.0, 2.0]", name);
        }
    }
    if config.ai.analyzer_max_tokens == 0 || config.ai.chat_max_tokens == 0 {
        anyhow::bail!("ai max_tokens settings must be > 0");
    }
    if config.ai.timeout_secs == 0 {
        anyhow::bail!("ai.timeout_secs must be > 0");
    }

    Ok(())
}
