//! Model catalog aggregation across backends

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::client::BackendClient;
use crate::error::BackendError;
use crate::registry::{BackendDescriptor, BackendRegistry};

/// `created` timestamp used for the synthetic audio model entries
const SYNTHETIC_CREATED: i64 = 1_677_649_963;

/// One model catalog entry, OpenAI list shape. Unknown fields from backend
/// catalogs are carried through untouched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelDescriptor {
    pub id: String,
    pub object: String,
    pub created: i64,
    pub owned_by: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ModelDescriptor {
    fn synthetic(id: &str, owned_by: &str) -> Self {
        Self {
            id: id.to_string(),
            object: "model".to_string(),
            created: SYNTHETIC_CREATED,
            owned_by: owned_by.to_string(),
            extra: serde_json::Map::new(),
        }
    }
}

/// The `/v1/models` response shape
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelList {
    pub object: String,
    pub data: Vec<ModelDescriptor>,
}

/// Merge model catalogs from the chat and embeddings backends, then append
/// the two synthetic audio entries.
///
/// A failing backend contributes zero entries; this call itself never
/// fails. Duplicate ids across catalogs are not merged — that is the
/// aggregation policy, not an oversight.
pub async fn list_models(client: &BackendClient, registry: &BackendRegistry) -> ModelList {
    let (chat_models, embedding_models) = tokio::join!(
        fetch_catalog(client, registry.chat()),
        fetch_catalog(client, registry.embeddings()),
    );

    let mut data = Vec::new();
    for (backend, result) in [
        (registry.chat(), chat_models),
        (registry.embeddings(), embedding_models),
    ] {
        match result {
            Ok(models) => data.extend(models),
            Err(e) => {
                tracing::warn!(backend = backend.name, error = %e, "Failed to fetch model catalog");
            }
        }
    }

    // The transcription and speech backends expose no catalog endpoint
    data.push(ModelDescriptor::synthetic("whisper-1", "openai"));
    data.push(ModelDescriptor::synthetic("kokoro-v1.0", "kokoro"));

    ModelList {
        object: "list".to_string(),
        data,
    }
}

/// Fetch one backend's catalog, preserving entry order
async fn fetch_catalog(
    client: &BackendClient,
    backend: &BackendDescriptor,
) -> Result<Vec<ModelDescriptor>, BackendError> {
    let Some(url) = backend.catalog_url() else {
        return Ok(Vec::new());
    };

    let response = client.request(reqwest::Method::GET, &url).send().await?;
    if response.status() != StatusCode::OK {
        return Err(BackendError::UnexpectedStatus(response.status().as_u16()));
    }

    let list: ModelList = response
        .json()
        .await
        .map_err(|e| BackendError::Malformed(e.to_string()))?;

    Ok(list.data)
}
