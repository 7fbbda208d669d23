//! Static provider catalog consumed by model pickers

use serde::Serialize;

use super::ProviderId;

/// Read-only metadata describing one vendor
#[derive(Debug, Clone, Serialize)]
pub struct ProviderDescriptor {
    pub id: ProviderId,
    pub name: &'static str,
    pub description: &'static str,
    pub models: &'static [&'static str],
}

/// Every vendor the UI may offer. Declaring a vendor here does not mean an
/// adapter exists for it; the registry decides that.
pub static AVAILABLE_PROVIDERS: [ProviderDescriptor; 5] = [
    ProviderDescriptor {
        id: ProviderId::OpenAi,
        name: "OpenAI",
        description: "GPT models from OpenAI including GPT-4 and GPT-3.5",
        models: &["gpt-4o", "gpt-4o-mini", "gpt-4-turbo", "gpt-4", "gpt-3.5-turbo"],
    },
    ProviderDescriptor {
        id: ProviderId::Anthropic,
        name: "Anthropic",
        description: "Claude models from Anthropic including Claude-3",
        models: &[
            "claude-3-5-sonnet-20241022",
            "claude-3-5-haiku-20241022",
            "claude-3-opus-20240229",
        ],
    },
    ProviderDescriptor {
        id: ProviderId::Google,
        name: "Google AI",
        description: "Gemini models from Google AI",
        models: &["gemini-1.5-pro", "gemini-1.5-flash"],
    },
    ProviderDescriptor {
        id: ProviderId::Cohere,
        name: "Cohere",
        description: "Command models from Cohere",
        models: &["command-r-plus", "command-r"],
    },
    ProviderDescriptor {
        id: ProviderId::HuggingFace,
        name: "Hugging Face",
        description: "Open source models via Hugging Face",
        models: &[
            "meta-llama/Llama-2-70b-chat-hf",
            "mistralai/Mistral-7B-Instruct-v0.1",
        ],
    },
];

pub fn find_descriptor(id: ProviderId) -> Option<&'static ProviderDescriptor> {
    AVAILABLE_PROVIDERS.iter().find(|d| d.id == id)
}
