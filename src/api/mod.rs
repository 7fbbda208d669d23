//! API layer - HTTP endpoints and middleware

pub mod conversations;
pub mod health;
pub mod llm;
pub mod middleware;
pub mod router;
pub mod settings;
pub mod state;
pub mod types;

pub use router::create_router_with_state;
pub use state::{AppState, StorageHandles};
