//! BreezeKV Server Binary
//!
//! Starts the TCP server for BreezeKV.

use std::sync::Arc;

use breezekv::network::Server;
use breezekv::{Config, Engine};
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

/// BreezeKV Server
#[derive(Parser, Debug)]
#[command(name = "breezekv-server")]
#[command(about = "In-memory key-value store with optimistic transactions")]
#[command(version)]
struct Args {
    /// Listen address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:7379")]
    listen: String,

    /// Maximum queued connections
    #[arg(short, long, default_value = "1024")]
    max_connections: usize,

    /// Number of connection worker threads
    #[arg(short, long, default_value = "8")]
    workers: usize,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,breezekv=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("BreezeKV Server v{}", breezekv::VERSION);
    tracing::info!("Listen address: {}", args.listen);

    // Build config from args
    let config = Config::builder()
        .listen_addr(&args.listen)
        .max_connections(args.max_connections)
        .worker_threads(args.workers)
        .build();

    // The store is in-memory; every start begins empty
    let engine = Arc::new(Engine::new());
    tracing::info!("Engine initialized");

    // Start server
    let server = Server::new(config, engine);
    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Server stopped");
}
