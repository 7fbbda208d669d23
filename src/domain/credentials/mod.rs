//! Credential management domain

mod cipher;
mod credential;
mod provider;
mod stored;

pub use cipher::SecretCipher;
pub use credential::{Credential, CredentialSource};
pub use provider::CredentialProvider;
pub use stored::{ApiKeySummary, StoredApiKey};

#[cfg(test)]
pub use cipher::mock::PrefixCipher;
#[cfg(test)]
pub use provider::mock::MockCredentialProvider;
