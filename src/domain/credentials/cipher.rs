use std::fmt::Debug;

use crate::domain::DomainError;

/// Encryption-at-rest routine for stored API keys
pub trait SecretCipher: Send + Sync + Debug {
    fn encrypt(&self, plaintext: &str) -> Result<String, DomainError>;

    /// Fails with [`DomainError::Crypto`] on malformed or tampered input
    fn decrypt(&self, ciphertext: &str) -> Result<String, DomainError>;
}
