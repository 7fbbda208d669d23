//! Layered application configuration

mod app_config;

pub use app_config::{
    AppConfig, CredentialsConfig, LogFormat, LoggingConfig, ProvidersConfig, SecurityConfig,
    ServerConfig, ValidationMode, DEVELOPMENT_ENCRYPTION_KEY,
};
