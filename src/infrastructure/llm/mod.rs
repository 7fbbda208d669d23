//! LLM provider implementations

mod anthropic;
mod http_client;
mod openai;
mod registry;
mod sse;

pub use anthropic::AnthropicProvider;
pub use http_client::{ByteStream, HttpClient, HttpClientTrait};
pub use openai::OpenAiProvider;
pub use registry::{ProviderEndpoints, ProviderRegistry};

#[cfg(test)]
pub use http_client::mock::MockHttpClient;
