//! AES-256-GCM encryption of stored API keys using `ring`.
//!
//! Ciphertexts are serialised as `hex(nonce):hex(ciphertext || tag)` with a
//! fresh random 96-bit nonce per call, so encrypting the same key twice
//! yields different strings.

use ring::aead::{self, Aad, BoundKey, Nonce, NonceSequence, OpeningKey, SealingKey, UnboundKey, NONCE_LEN};
use ring::rand::{SecureRandom, SystemRandom};
use sha2::{Digest, Sha256};

use crate::domain::{DomainError, SecretCipher};

const KEY_LEN: usize = 32;

static AEAD_ALG: &aead::Algorithm = &aead::AES_256_GCM;

/// Yields exactly one nonce; every seal/open gets its own key object
struct SingleNonce(Option<[u8; NONCE_LEN]>);

impl NonceSequence for SingleNonce {
    fn advance(&mut self) -> Result<Nonce, ring::error::Unspecified> {
        self.0
            .take()
            .map(Nonce::assume_unique_for_key)
            .ok_or(ring::error::Unspecified)
    }
}

/// [`SecretCipher`] backed by AES-256-GCM
pub struct AesGcmCipher {
    key: [u8; KEY_LEN],
    rng: SystemRandom,
}

impl AesGcmCipher {
    /// A 32-byte secret is used as-is; anything else is hashed with SHA-256
    pub fn new(secret: &str) -> Result<Self, DomainError> {
        if secret.is_empty() {
            return Err(DomainError::configuration("Encryption key must not be empty"));
        }

        let mut key = [0u8; KEY_LEN];
        if secret.len() == KEY_LEN {
            key.copy_from_slice(secret.as_bytes());
        } else {
            key.copy_from_slice(&Sha256::digest(secret.as_bytes()));
        }

        Ok(Self {
            key,
            rng: SystemRandom::new(),
        })
    }

    fn unbound_key(&self) -> Result<UnboundKey, DomainError> {
        UnboundKey::new(AEAD_ALG, &self.key)
            .map_err(|_| DomainError::crypto("Failed to create AES-256-GCM key"))
    }
}

impl std::fmt::Debug for AesGcmCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AesGcmCipher")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

impl SecretCipher for AesGcmCipher {
    fn encrypt(&self, plaintext: &str) -> Result<String, DomainError> {
        let mut nonce = [0u8; NONCE_LEN];
        self.rng
            .fill(&mut nonce)
            .map_err(|_| DomainError::crypto("Failed to generate nonce"))?;

        let mut sealing_key = SealingKey::new(self.unbound_key()?, SingleNonce(Some(nonce)));

        let mut in_out = plaintext.as_bytes().to_vec();
        sealing_key
            .seal_in_place_append_tag(Aad::empty(), &mut in_out)
            .map_err(|_| DomainError::crypto("Failed to encrypt API key"))?;

        Ok(format!("{}:{}", hex::encode(nonce), hex::encode(in_out)))
    }

    fn decrypt(&self, ciphertext: &str) -> Result<String, DomainError> {
        let (nonce_hex, body_hex) = ciphertext
            .split_once(':')
            .ok_or_else(|| DomainError::crypto("Invalid encrypted text format"))?;

        let nonce: [u8; NONCE_LEN] = hex::decode(nonce_hex)
            .ok()
            .and_then(|bytes| bytes.try_into().ok())
            .ok_or_else(|| DomainError::crypto("Invalid nonce"))?;

        let mut in_out =
            hex::decode(body_hex).map_err(|_| DomainError::crypto("Invalid ciphertext encoding"))?;

        let mut opening_key = OpeningKey::new(self.unbound_key()?, SingleNonce(Some(nonce)));
        let plaintext = opening_key
            .open_in_place(Aad::empty(), &mut in_out)
            .map_err(|_| DomainError::crypto("Failed to decrypt API key"))?;

        String::from_utf8(plaintext.to_vec())
            .map_err(|_| DomainError::crypto("Decrypted API key is not valid UTF-8"))
    }
}
