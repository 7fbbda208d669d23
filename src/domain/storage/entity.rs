//! Storage entity traits and types

use std::fmt::Debug;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Trait for types that can be used as storage keys
pub trait StorageKey: Clone + Debug + Send + Sync + Eq + std::hash::Hash {
    fn as_str(&self) -> &str;
}

/// Trait for records kept behind a [`super::Storage`]
pub trait StorageEntity: Clone + Debug + Send + Sync {
    type Key: StorageKey;

    fn key(&self) -> &Self::Key;
}

/// Opaque string identifier shared by every stored record type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Fresh random identifier
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl StorageKey for RecordId {
    fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_unique() {
        let a = RecordId::generate();
        let b = RecordId::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn test_record_id_serializes_as_plain_string() {
        let id = RecordId::new("conv-1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"conv-1\"");
        assert_eq!(id.as_str(), "conv-1");
    }
}
