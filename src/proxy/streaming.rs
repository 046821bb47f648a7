//! Buffered and streaming relay primitives
//!
//! Both relay modes forward the backend response verbatim. Buffered mode
//! captures the whole upstream response before the first byte reaches the
//! caller; streaming mode forwards each chunk as it arrives, in receipt
//! order, with no coalescing.

use axum::{
    body::Body,
    http::{header, HeaderMap, HeaderName},
    response::Response,
};
use bytes::Bytes;
use futures::TryStreamExt;
use reqwest::{Method, RequestBuilder};

use crate::client::BackendClient;
use crate::error::{ApiError, BackendError};

/// Copy inbound request headers onto the outbound builder.
///
/// `Host` and `Content-Length` are re-derived by the transport. The
/// multipart path also skips `Content-Type`, since the outbound form
/// carries a fresh boundary.
pub fn forward_request_headers(
    mut builder: RequestBuilder,
    headers: &HeaderMap,
    skip_content_type: bool,
) -> RequestBuilder {
    for (name, value) in headers.iter() {
        if name == header::HOST || name == header::CONTENT_LENGTH {
            continue;
        }
        if skip_content_type && name == header::CONTENT_TYPE {
            continue;
        }
        builder = builder.header(name, value);
    }
    builder
}

/// Send a buffered call and relay the full upstream response
pub async fn relay_buffered(
    client: &BackendClient,
    method: Method,
    url: &str,
    headers: &HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    let request = forward_request_headers(client.request(method, url), headers, false);
    let upstream = request.body(body).send().await.map_err(BackendError::from)?;
    Ok(buffer_response(upstream).await?)
}

/// Capture a complete upstream response, then rebuild it verbatim.
/// Non-2xx statuses pass through untouched; the gateway does not
/// reinterpret backend error semantics.
pub async fn buffer_response(upstream: reqwest::Response) -> Result<Response, BackendError> {
    let status = upstream.status();
    let headers = upstream.headers().clone();
    let body = upstream.bytes().await.map_err(BackendError::from)?;

    if status.is_client_error() || status.is_server_error() {
        tracing::debug!(status = %status, "Relaying backend error response verbatim");
    }

    let mut response = Response::builder().status(status);
    for (name, value) in headers.iter() {
        if is_framing_header(name) {
            continue;
        }
        response = response.header(name, value);
    }

    Ok(response.body(Body::from(body)).unwrap())
}

/// Open a streaming relay: each upstream chunk is forwarded as soon as it
/// arrives. The content type is fixed to an event stream because the
/// caller opted into stream semantics.
///
/// A mid-transfer upstream failure terminates the body stream; bytes
/// already relayed are not retracted and no trailing error frame is sent.
/// If the caller disconnects, axum drops the body, which drops the
/// upstream response and closes its connection.
pub async fn relay_streaming(
    client: &BackendClient,
    method: Method,
    url: &str,
    headers: &HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    let request = forward_request_headers(client.streaming_request(method, url), headers, false);
    let upstream = client.send_streaming(request.body(body)).await?;

    let status = upstream.status();
    let upstream_headers = upstream.headers().clone();

    let stream = upstream.bytes_stream().map_err(|e| {
        tracing::error!(error = %e, "Upstream stream failed mid-transfer, closing relay");
        std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
    });

    let mut response = Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, "text/event-stream");
    for (name, value) in upstream_headers.iter() {
        if is_framing_header(name) || name == header::CONTENT_TYPE {
            continue;
        }
        response = response.header(name, value);
    }

    Ok(response.body(Body::from_stream(stream)).unwrap())
}

/// Headers the transport must re-derive for the chosen relay mode
fn is_framing_header(name: &HeaderName) -> bool {
    name == header::CONTENT_LENGTH || name == header::TRANSFER_ENCODING
}
