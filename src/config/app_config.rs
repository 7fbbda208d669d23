use serde::Deserialize;

use crate::infrastructure::llm::ProviderEndpoints;

/// Passphrase used when `security.encryption_key` is not configured
pub const DEVELOPMENT_ENCRYPTION_KEY: &str = "development-only-encryption-key";

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub security: SecurityConfig,
    #[serde(default)]
    pub credentials: CredentialsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Vendor endpoints and outbound call limits
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    pub openai_base_url: String,
    pub anthropic_base_url: String,
    /// Whole-request timeout for vendor calls; unset waits indefinitely
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SecurityConfig {
    /// Secret for encrypting stored API keys
    #[serde(default)]
    pub encryption_key: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CredentialsConfig {
    #[serde(default)]
    pub validation: ValidationMode,
}

/// How a newly submitted API key is checked before it is stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ValidationMode {
    /// One minimal live chat call against the vendor
    #[default]
    Probe,
    /// Offline prefix and length heuristic
    Format,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        let endpoints = ProviderEndpoints::default();

        Self {
            openai_base_url: endpoints.openai_base_url,
            anthropic_base_url: endpoints.anthropic_base_url,
            request_timeout_secs: None,
        }
    }
}

impl ProvidersConfig {
    pub fn endpoints(&self) -> ProviderEndpoints {
        ProviderEndpoints {
            openai_base_url: self.openai_base_url.clone(),
            anthropic_base_url: self.anthropic_base_url.clone(),
        }
    }

    pub fn request_timeout(&self) -> Option<std::time::Duration> {
        self.request_timeout_secs.map(std::time::Duration::from_secs)
    }
}

impl SecurityConfig {
    /// The configured key, or the development default
    pub fn encryption_key_or_default(&self) -> &str {
        self.encryption_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .unwrap_or(DEVELOPMENT_ENCRYPTION_KEY)
    }

    pub fn uses_development_key(&self) -> bool {
        self.encryption_key.as_deref().is_none_or(str::is_empty)
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
