//! Credential resolution, validation and encryption at rest

mod cipher;
mod env_provider;
mod resolver;
mod validator;

pub use cipher::AesGcmCipher;
pub use env_provider::EnvCredentialProvider;
pub use resolver::CredentialResolver;
pub use validator::{format_looks_valid, CredentialValidator};
