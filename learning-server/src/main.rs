//! learning-server - watch a YouTube video, then get quizzed on it
//!
//! Serves the browser UI and the JSON API on one port.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use learning_common::config::{
    load_toml_config, locate_config, resolve_api_key, RootFolderInitializer, RootFolderResolver,
    TomlConfig, ANTHROPIC_API_KEY_ENV, TRANSCRIPT_API_KEY_ENV,
};
use learning_common::db::init_database;
use learning_server::services::{AnthropicClient, OEmbedClient, TranscriptApiClient};
use learning_server::{build_router, AppState};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for learning-server
#[derive(Parser, Debug)]
#[command(name = "learning-server")]
#[command(about = "Video learning service with AI-generated challenges")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "5730", env = "LEARNING_PORT")]
    port: u16,

    /// Address to bind
    #[arg(short, long, default_value = "127.0.0.1")]
    bind: String,

    /// Root folder holding learning.db (also read from LEARNING_ROOT_FOLDER)
    #[arg(short, long)]
    root_folder: Option<PathBuf>,

    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Config is read before tracing starts; the outcome is logged below
    let config_path = locate_config(args.config.as_deref());
    let loaded = config_path.as_deref().map(load_toml_config);
    let toml_config = match &loaded {
        Some(Ok(config)) => config.clone(),
        _ => TomlConfig::default(),
    };

    let level = &toml_config.logging.level;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("learning_server={level},learning_common={level},tower_http={level}").into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting learning-server v{}", env!("CARGO_PKG_VERSION"));
    match (&config_path, &loaded) {
        (Some(path), Some(Ok(_))) => info!("Loaded configuration from {}", path.display()),
        (_, Some(Err(e))) => warn!("{} - using defaults", e),
        _ => info!("No config file found, using defaults"),
    }

    let root_folder = RootFolderResolver::new("learning-server")
        .with_cli_arg(args.root_folder.clone())
        .with_toml(&toml_config)
        .resolve();

    let initializer = RootFolderInitializer::new(root_folder);
    initializer
        .ensure_directory_exists()
        .context("Failed to create root folder")?;

    let db_path = initializer.database_path();
    info!("Database path: {}", db_path.display());
    let pool = init_database(&db_path)
        .await
        .context("Failed to initialize database")?;

    let anthropic_key = resolve_api_key(
        ANTHROPIC_API_KEY_ENV,
        toml_config.anthropic_api_key.as_deref(),
    );
    let transcript_key = resolve_api_key(
        TRANSCRIPT_API_KEY_ENV,
        toml_config.transcript_api_key.as_deref(),
    );

    let llm = AnthropicClient::new(anthropic_key, toml_config.anthropic_base_url.clone())
        .context("Failed to create Anthropic client")?;
    let transcripts =
        TranscriptApiClient::new(transcript_key, toml_config.transcript_base_url.clone())
            .context("Failed to create transcript client")?;
    let metadata = OEmbedClient::new().context("Failed to create oEmbed client")?;

    let state = AppState::new(
        pool,
        Arc::new(llm),
        Arc::new(transcripts),
        Arc::new(metadata),
        toml_config.models.clone(),
    );
    let app = build_router(state);

    let addr: SocketAddr = format!("{}:{}", args.bind, args.port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", args.bind, args.port))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("learning-server listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
