//! Environment-sourced gateway configuration

use std::time::Duration;

use url::Url;

/// Default base addresses for the four backends
const DEFAULT_CHAT_URL: &str = "http://localhost:3000";
const DEFAULT_EMBEDDINGS_URL: &str = "http://localhost:8001";
const DEFAULT_TRANSCRIPTION_URL: &str = "http://localhost:8002";
const DEFAULT_SPEECH_URL: &str = "http://localhost:8003";

fn default_timeout() -> u64 {
    300
}

/// Gateway bind address
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Base addresses of the backend services
#[derive(Debug, Clone)]
pub struct BackendEndpoints {
    pub chat_url: String,
    pub embeddings_url: String,
    pub transcription_url: String,
    pub speech_url: String,
}

/// Main gateway configuration, read once at startup
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub server: ServerConfig,
    pub backends: BackendEndpoints,
    /// Overall timeout for non-streaming backend calls, in seconds
    pub timeout_seconds: u64,
}

impl GatewayConfig {
    /// Load configuration from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let backend_url = |var: &str, default: &str| -> Result<String, ConfigError> {
            let raw = lookup(var).unwrap_or_else(|| default.to_string());
            validate_base_url(var, &raw)?;
            Ok(raw.trim_end_matches('/').to_string())
        };

        let port = match lookup("PROXY_PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|_| ConfigError::InvalidPort(raw))?,
            None => 8000,
        };

        let timeout_seconds = match lookup("INFERENCE_TIMEOUT") {
            Some(raw) => raw
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidTimeout(raw))?,
            None => default_timeout(),
        };

        Ok(Self {
            server: ServerConfig {
                host: lookup("PROXY_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port,
            },
            backends: BackendEndpoints {
                chat_url: backend_url("BERNARD_URL", DEFAULT_CHAT_URL)?,
                embeddings_url: backend_url("VLLM_URL", DEFAULT_EMBEDDINGS_URL)?,
                transcription_url: backend_url("WHISPER_URL", DEFAULT_TRANSCRIPTION_URL)?,
                speech_url: backend_url("KOKORO_URL", DEFAULT_SPEECH_URL)?,
            },
            timeout_seconds,
        })
    }

    /// Overall timeout for non-streaming backend calls
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// Reject addresses the backend client could never use
fn validate_base_url(var: &str, raw: &str) -> Result<(), ConfigError> {
    let parsed = Url::parse(raw).map_err(|e| ConfigError::InvalidUrl {
        var: var.to_string(),
        message: e.to_string(),
    })?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(ConfigError::InvalidUrl {
            var: var.to_string(),
            message: format!("unsupported scheme '{}'", parsed.scheme()),
        });
    }
    Ok(())
}

/// Startup-fatal configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid backend URL in {var}: {message}")]
    InvalidUrl { var: String, message: String },

    #[error("invalid PROXY_PORT value: {0}")]
    InvalidPort(String),

    #[error("invalid INFERENCE_TIMEOUT value: {0}")]
    InvalidTimeout(String),
}
