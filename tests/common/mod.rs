//! Shared test helpers: in-process mock backends and a gateway instance
//!
//! Mock backends are real axum servers on ephemeral loopback ports, so the
//! gateway under test talks to them over actual HTTP.

#![allow(dead_code)]

use std::net::SocketAddr;

use axum::Router;
use tokio::net::TcpListener;

use inference_gateway::config::{BackendEndpoints, GatewayConfig, ServerConfig};
use inference_gateway::{build_router, GatewayState};

/// Serve a router on an ephemeral loopback port
pub async fn spawn(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// Base URL for a spawned server
pub fn base_url(addr: SocketAddr) -> String {
    format!("http://{}", addr)
}

/// A base URL nothing listens on (port 1 is never bound in tests)
pub fn unreachable_url() -> String {
    "http://127.0.0.1:1".to_string()
}

/// Endpoints pointing every backend at the same mock address
pub fn endpoints_all(addr: SocketAddr) -> BackendEndpoints {
    let url = base_url(addr);
    BackendEndpoints {
        chat_url: url.clone(),
        embeddings_url: url.clone(),
        transcription_url: url.clone(),
        speech_url: url,
    }
}

/// Endpoints with explicit per-backend base URLs
pub fn endpoints(chat: String, embeddings: String, transcription: String, speech: String) -> BackendEndpoints {
    BackendEndpoints {
        chat_url: chat,
        embeddings_url: embeddings,
        transcription_url: transcription,
        speech_url: speech,
    }
}

/// A backend that accepts TCP connections but never sends a byte back
pub async fn spawn_silent_backend() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            tokio::spawn(async move {
                use tokio::io::AsyncReadExt;
                let mut buf = [0u8; 1024];
                while let Ok(n) = socket.read(&mut buf).await {
                    if n == 0 {
                        break;
                    }
                }
            });
        }
    });
    addr
}

/// Spawn a gateway wired to the given backend endpoints, returning its
/// base URL
pub async fn spawn_gateway(backends: BackendEndpoints) -> String {
    spawn_gateway_with_timeout(backends, 30).await
}

/// Spawn a gateway with an explicit request timeout in seconds
pub async fn spawn_gateway_with_timeout(backends: BackendEndpoints, timeout_seconds: u64) -> String {
    let config = GatewayConfig {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        backends,
        timeout_seconds,
    };

    let state = GatewayState::new(config).unwrap();
    let addr = spawn(build_router(state)).await;
    base_url(addr)
}
