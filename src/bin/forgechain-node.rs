#![forbid(unsafe_code)]
//! ForgeChain node: loads configuration, builds the ledger and serves the API.

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use forgechain::api::{run_api_server, Node};
use forgechain::blockchain::Blockchain;
use forgechain::config::load_config;
use forgechain::identity::generate_node_id;

#[derive(Parser)]
#[command(version, about = "Single-node proof-of-work ledger")]
struct Args {
    /// Path to the TOML configuration file. Defaults apply when it is missing.
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,
    /// Interface to bind, overriding `server.host`.
    #[arg(long)]
    host: Option<String>,
    /// Port to bind, overriding `server.port` and `PORT`.
    #[arg(short, long)]
    port: Option<u16>,
    /// Reward address for mined blocks, overriding `node.identifier`.
    #[arg(long)]
    node_id: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let mut config = load_config(&args.config)?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    config.validate()?;

    let node_id = args
        .node_id
        .filter(|id| !id.is_empty())
        .or_else(|| Some(config.node.identifier.clone()).filter(|id| !id.is_empty()))
        .unwrap_or_else(generate_node_id);

    tracing::info!(%node_id, host = %config.server.host, port = config.server.port, "node.starting");

    let node = Arc::new(Node::new(Blockchain::new(node_id), config.mining.clone()));
    run_api_server(node, &config.server.host, config.server.port).await
}
