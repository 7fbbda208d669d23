//! Storage domain - Generic storage abstraction layer

mod entity;
mod repository;

pub use entity::{RecordId, StorageEntity, StorageKey};
pub use repository::Storage;
