//! Model catalog endpoint

use serde::Serialize;

use crate::api::types::Json;
use crate::domain::llm::{ProviderDescriptor, AVAILABLE_PROVIDERS};
use crate::domain::ProviderId;

/// One selectable model, flattened out of its provider
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelEntry {
    pub id: &'static str,
    pub name: &'static str,
    pub provider: ProviderId,
    pub provider_name: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct CatalogResponse {
    pub providers: &'static [ProviderDescriptor],
    pub models: Vec<ModelEntry>,
}

impl CatalogResponse {
    pub fn from_catalog() -> Self {
        let models = AVAILABLE_PROVIDERS
            .iter()
            .flat_map(|descriptor| {
                descriptor.models.iter().map(move |model| ModelEntry {
                    id: model,
                    name: model,
                    provider: descriptor.id,
                    provider_name: descriptor.name,
                })
            })
            .collect();

        Self {
            providers: &AVAILABLE_PROVIDERS,
            models,
        }
    }
}

/// GET /api/llm/models
pub async fn list_models() -> Json<CatalogResponse> {
    Json(CatalogResponse::from_catalog())
}
