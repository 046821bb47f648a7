//! inference-gateway: unified OpenAI-compatible inference gateway
//!
//! A single HTTP surface in front of four independently running inference
//! backends (chat, embeddings, transcription, speech synthesis). Requests
//! are routed to exactly one backend and relayed verbatim, buffered or
//! streamed; `/health` and `/v1/models` aggregate across all backends.

use clap::{Parser, Subcommand, ValueEnum};
use std::time::Duration;

use inference_gateway::{run_server, GatewayConfig, GatewayState};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "trace"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

#[derive(Parser)]
#[command(name = "inference-gateway")]
#[command(version = "0.1.0")]
#[command(about = "Unified OpenAI-compatible gateway for inference backends")]
#[command(long_about = "
inference-gateway presents a single OpenAI-compatible API and proxies each
operation to the backend responsible for it:
  /v1/chat/completions      -> chat backend (buffered or streamed)
  /v1/embeddings            -> embeddings backend
  /v1/audio/transcriptions  -> transcription backend (multipart)
  /v1/audio/speech          -> speech-synthesis backend
  /health, /v1/models       -> aggregated across all backends

Configuration is environment-sourced: BERNARD_URL, VLLM_URL, WHISPER_URL,
KOKORO_URL, PROXY_HOST, PROXY_PORT, INFERENCE_TIMEOUT.

Example usage:
  inference-gateway run
  inference-gateway run --port 8080
  inference-gateway test-backends
")]
struct Cli {
    /// Set logging level (trace, debug, info, warn, error)
    #[arg(long, global = true, value_name = "LEVEL")]
    log_level: Option<LogLevel>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the gateway server
    Run {
        /// Override bind host
        #[arg(long)]
        host: Option<String>,
        /// Override listen port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Load and print the resolved environment configuration
    CheckConfig,

    /// Probe each configured backend and report reachability
    TestBackends,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level_filter = if let Some(level) = cli.log_level {
        level.to_string()
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
            .to_string()
    };

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&level_filter))
        .init();

    match cli.command {
        Commands::Run { host, port } => {
            let mut config = GatewayConfig::from_env()?;
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }

            run_server(config)
                .await
                .map_err(|e| anyhow::anyhow!("server error: {}", e))?;
        }
        Commands::CheckConfig => {
            check_config()?;
        }
        Commands::TestBackends => {
            test_backends().await?;
        }
    }

    Ok(())
}

/// Print the resolved configuration
fn check_config() -> anyhow::Result<()> {
    let config = GatewayConfig::from_env()?;

    println!("✓ Configuration is valid\n");
    println!("Server:");
    println!("  Listen: {}:{}", config.server.host, config.server.port);
    println!("  Request timeout: {}s", config.timeout_seconds);
    println!("\nBackends:");
    println!("  chat (bernard):        {}", config.backends.chat_url);
    println!("  embeddings (vllm):     {}", config.backends.embeddings_url);
    println!("  transcription (whisper): {}", config.backends.transcription_url);
    println!("  speech (kokoro):       {}", config.backends.speech_url);

    Ok(())
}

/// Probe every registered backend's health URL
async fn test_backends() -> anyhow::Result<()> {
    let config = GatewayConfig::from_env()?;
    let state = GatewayState::new(config)?;

    let mut all_reachable = true;
    for backend in state.registry.all() {
        let health_url = backend.health_url();
        println!("Testing {} at {}", backend.name, health_url);

        match state.client.probe(&health_url, Duration::from_secs(5)).await {
            Ok(resp) => {
                println!("  ✓ reachable (status {})", resp.status());
            }
            Err(e) => {
                println!("  ✗ {}", e);
                all_reachable = false;
            }
        }
    }

    if !all_reachable {
        std::process::exit(1);
    }

    Ok(())
}
