use clap::{Args, ValueEnum};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} requires an api key")]
    MissingApiKey(&'static str),

    #[error("{0} requires a model name")]
    MissingModel(&'static str),

    #[error("failed to build http client: {0}")]
    HttpClient(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    #[default]
    Google,
    #[serde(rename = "openai")]
    #[value(name = "openai")]
    OpenAi,
    #[serde(rename = "deepseek")]
    #[value(name = "deepseek")]
    DeepSeek,
    /// No machine translation; gaps stay empty.
    None,
}

impl Provider {
    pub fn as_str(self) -> &'static str {
        match self {
            Provider::Google => "google",
            Provider::OpenAi => "openai",
            Provider::DeepSeek => "deepseek",
            Provider::None => "none",
        }
    }

    fn needs_credentials(self) -> bool {
        matches!(self, Provider::OpenAi | Provider::DeepSeek)
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// Translation provider settings, shared by the protocol payload (`translator`
/// object) and the command line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Args)]
pub struct TranslatorConfig {
    /// Machine translation provider used to fill missing halves.
    #[arg(long, value_enum, env = "SALON_CORE_PROVIDER", default_value_t = Provider::Google)]
    #[serde(default)]
    pub provider: Provider,

    /// API key for chat providers.
    #[arg(long = "api-key", env = "SALON_CORE_API_KEY", hide_env_values = true)]
    #[serde(default)]
    pub api_key: Option<String>,

    /// Model name for chat providers.
    #[arg(long, env = "SALON_CORE_MODEL")]
    #[serde(default)]
    pub model: Option<String>,

    /// Per-request timeout in seconds.
    #[arg(long = "timeout", default_value_t = DEFAULT_TIMEOUT_SECS)]
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            provider: Provider::default(),
            api_key: None,
            model: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl TranslatorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.provider.needs_credentials() {
            return Ok(());
        }

        let blank = |v: &Option<String>| v.as_deref().map(str::trim).unwrap_or("").is_empty();

        if blank(&self.api_key) {
            return Err(ConfigError::MissingApiKey(self.provider.as_str()));
        }
        if blank(&self.model) {
            return Err(ConfigError::MissingModel(self.provider.as_str()));
        }

        Ok(())
    }
}
