//! inference-gateway: unified OpenAI-compatible gateway
//!
//! Presents a single API surface and fans requests out to four
//! independently running backends:
//! - chat completions (with token-streamed relay)
//! - embeddings
//! - audio transcription (multipart re-encoding)
//! - speech synthesis
//!
//! `/health` and `/v1/models` aggregate across all backends; every other
//! operation maps to exactly one.

pub mod aggregator;
pub mod client;
pub mod config;
pub mod error;
pub mod proxy;
pub mod registry;

pub use config::GatewayConfig;
pub use proxy::{build_router, run_server, GatewayState};
