//! HTTP surface of the gateway: routing, relay, and server lifecycle

mod handler;
pub mod server;
mod streaming;

pub use server::{build_router, run_server, GatewayState};
