//! Per-endpoint request handlers
//!
//! Every proxied operation resolves to exactly one backend through the
//! registry; only `/health` and `/v1/models` fan out.

use axum::{
    body::to_bytes,
    extract::{Multipart, Request, State},
    http::HeaderMap,
    response::Response,
    Json,
};
use bytes::Bytes;
use reqwest::Method;

use super::server::GatewayState;
use super::streaming::{buffer_response, forward_request_headers, relay_buffered, relay_streaming};
use crate::aggregator::{check_health, list_models, HealthReport, ModelList};
use crate::error::{ApiError, BackendError};
use crate::registry::Operation;

/// Upper bound on inbound body size (audio uploads included)
pub const MAX_BODY_BYTES: usize = 100 * 1024 * 1024;

/// Read the inbound body and require it to parse as JSON. Rejection
/// happens here, before any backend call is attempted.
async fn read_json_body(req: Request) -> Result<(HeaderMap, Bytes, serde_json::Value), ApiError> {
    let (parts, body) = req.into_parts();

    let bytes = to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|e| ApiError::bad_request(format!("failed to read request body: {}", e)))?;

    let json: serde_json::Value = serde_json::from_slice(&bytes)
        .map_err(|e| ApiError::bad_request(format!("request body is not valid JSON: {}", e)))?;

    Ok((parts.headers, bytes, json))
}

/// `POST /v1/chat/completions` — buffered or streaming relay to the chat
/// backend, decided by the caller's `stream` flag
pub async fn chat_completions(
    State(state): State<GatewayState>,
    req: Request,
) -> Result<Response, ApiError> {
    let (headers, body, json) = read_json_body(req).await?;

    let stream_requested = json
        .get("stream")
        .and_then(|s| s.as_bool())
        .unwrap_or(false);

    tracing::info!(
        model = json.get("model").and_then(|m| m.as_str()).unwrap_or("unknown"),
        stream = stream_requested,
        "Proxying chat completion request"
    );

    let url = state.registry.target_url(Operation::ChatCompletions);
    if stream_requested {
        relay_streaming(&state.client, Method::POST, &url, &headers, body).await
    } else {
        relay_buffered(&state.client, Method::POST, &url, &headers, body).await
    }
}

/// `POST /v1/embeddings` — buffered relay to the embeddings backend
pub async fn embeddings(
    State(state): State<GatewayState>,
    req: Request,
) -> Result<Response, ApiError> {
    let (headers, body, json) = read_json_body(req).await?;

    tracing::info!(
        model = json.get("model").and_then(|m| m.as_str()).unwrap_or("unknown"),
        "Proxying embedding request"
    );

    let url = state.registry.target_url(Operation::Embeddings);
    relay_buffered(&state.client, Method::POST, &url, &headers, body).await
}

/// `POST /v1/audio/speech` — JSON in, buffered binary audio relay out
pub async fn speech(State(state): State<GatewayState>, req: Request) -> Result<Response, ApiError> {
    let (headers, body, json) = read_json_body(req).await?;

    tracing::info!(
        voice = json.get("voice").and_then(|v| v.as_str()).unwrap_or("default"),
        "Proxying speech request"
    );

    let url = state.registry.target_url(Operation::Speech);
    relay_buffered(&state.client, Method::POST, &url, &headers, body).await
}

/// `POST /v1/audio/transcriptions` — decompose the inbound multipart form
/// and re-encode it for the transcription backend.
///
/// File parts keep their filename, bytes, and declared content type; text
/// fields pass through by name. Absent fields stay absent, and fields the
/// backend does not recognize are still forwarded.
pub async fn transcriptions(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let mut form = reqwest::multipart::Form::new();
    let mut part_count = 0usize;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("invalid multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if let Some(filename) = field.file_name().map(str::to_string) {
            let content_type = field.content_type().map(str::to_string);
            let data = field
                .bytes()
                .await
                .map_err(|e| ApiError::bad_request(format!("failed to read file part: {}", e)))?;

            let mut part = reqwest::multipart::Part::bytes(data.to_vec()).file_name(filename);
            if let Some(ct) = content_type {
                part = part
                    .mime_str(&ct)
                    .map_err(|e| ApiError::bad_request(format!("invalid part content type: {}", e)))?;
            }
            form = form.part(name, part);
        } else {
            let text = field
                .text()
                .await
                .map_err(|e| ApiError::bad_request(format!("failed to read form field: {}", e)))?;
            form = form.text(name, text);
        }
        part_count += 1;
    }

    tracing::info!(parts = part_count, "Proxying transcription request");

    let url = state.registry.target_url(Operation::Transcription);
    // Content-Type is skipped: reqwest sets a new multipart boundary
    let request = forward_request_headers(
        state.client.request(Method::POST, &url),
        &headers,
        true,
    );
    let upstream = request
        .multipart(form)
        .send()
        .await
        .map_err(BackendError::from)?;

    Ok(buffer_response(upstream).await?)
}

/// `GET /health` — probe all backends concurrently; always HTTP 200 with
/// the aggregate status in the body
pub async fn health(State(state): State<GatewayState>) -> Json<HealthReport> {
    Json(check_health(&state.client, &state.registry).await)
}

/// `GET /v1/models` — merged catalog across backends plus the synthetic
/// audio entries
pub async fn models(State(state): State<GatewayState>) -> Json<ModelList> {
    Json(list_models(&state.client, &state.registry).await)
}
