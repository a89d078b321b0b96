//! Igor client binary.
//!
//! Connects to the Igor service, logs connection transitions and state
//! changes, and runs until interrupted.

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::{debug, info, warn};

use igor_client::config::expand_str_path;
use igor_client::{ClientConfig, ConnectionState, IgorClient, NullSpeech, StateChange};

#[derive(Debug, Parser)]
#[command(name = "igor-client", version, about = "Client core for the Igor assistant")]
struct Cli {
    /// Path to the configuration file
    #[arg(long, env = "IGOR_CONFIG")]
    config: Option<String>,

    /// WebSocket endpoint of the Igor service
    #[arg(long)]
    endpoint: Option<String>,

    /// Fixed reconnect delay in milliseconds
    #[arg(long)]
    reconnect_delay_ms: Option<u64>,

    /// Disable narration of inbound knowledge
    #[arg(long)]
    no_narration: bool,

    /// Emit logs as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.as_deref().map(expand_str_path).transpose()?;
    let mut config = ClientConfig::load(config_path.as_deref())?;

    if let Some(endpoint) = cli.endpoint {
        config.endpoint = endpoint;
    }
    if let Some(delay) = cli.reconnect_delay_ms {
        config.reconnect_delay_ms = delay;
    }
    if cli.no_narration {
        config.narration_enabled = false;
    }
    if cli.json {
        config.logging.json = true;
    }

    init_logging(&config);

    info!("Connecting to {}", config.endpoint);
    let client = IgorClient::new(&config, Arc::new(NullSpeech));
    client.open().await;

    let mut connection = client.subscribe_connection();
    let mut changes = client.subscribe_changes();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            state = connection.recv() => if let Ok(state) = state {
                match state {
                    ConnectionState::Open => info!("Connection open"),
                    ConnectionState::Reconnecting => {
                        warn!("Connection lost; retrying automatically");
                    }
                    other => debug!("Connection state: {other}"),
                }
            },
            change = changes.recv() => if let Ok(change) = change {
                match change {
                    StateChange::TaskAdded(task) => {
                        info!("New task: {} ({})", task.text, task.category);
                    }
                    StateChange::KnowledgeUpdated(content) => {
                        info!("Knowledge updated: {content}");
                    }
                }
            },
        }
    }

    info!("Shutting down");
    client.close().await;
    Ok(())
}

fn init_logging(config: &ClientConfig) {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let level = config.logging.level.as_str();
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("igor_client={level},igor_protocol={level}")));

    if config.logging.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
            .ok();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init()
            .ok();
    }

    // Also init env_logger for compatibility with log crate users
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .try_init()
        .ok();
}
