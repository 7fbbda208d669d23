//! Conversation history domain

mod entity;

pub use entity::{derive_title, Conversation, ConversationMessage};
