//! pomod-ui - Pomodoro focus timer gateway
//!
//! Serves the timer API and the authenticated proxy to the remote
//! music streaming service, and streams state changes over SSE.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};

use pomod_common::config::{RootFolderInitializer, RootFolderResolver};
use pomod_common::db::init_database;
use pomod_common::events::EventBus;
use pomod_ui::config::UiConfig;
use pomod_ui::spotify::NowPlayingPoller;
use pomod_ui::{build_router, AppState};

/// Command-line arguments
#[derive(Debug, Parser)]
#[command(name = "pomod-ui", about = "Pomodoro focus timer with streaming-music control")]
struct Args {
    /// Root folder holding the service database
    #[arg(long)]
    root_folder: Option<PathBuf>,

    /// Override the configured HTTP port
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Build identification logged immediately, before database delays
    info!(
        "Starting pomod-ui v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();

    let resolver = RootFolderResolver::new("pomod-ui").with_cli_override(args.root_folder);
    let root_folder = resolver.resolve();

    let initializer = RootFolderInitializer::new(root_folder);
    initializer.ensure_directory_exists()?;

    let db_path = initializer.database_path();
    info!("Database path: {}", db_path.display());

    let pool = init_database(&db_path).await?;

    let mut config = UiConfig::from_database(&pool).await;
    if let Some(port) = args.port {
        config.port = port;
    }
    if config.client_id.is_empty() || config.client_secret.is_empty() {
        warn!(
            "OAuth client credentials not configured; token renewal will fail \
             (set {} / {} or the client_id / client_secret settings)",
            pomod_ui::config::CLIENT_ID_ENV,
            pomod_ui::config::CLIENT_SECRET_ENV
        );
    }

    let events = EventBus::new(1000);
    let state = AppState::new(pool, config.clone(), events);

    // The poller is owned here so it is torn down with the process
    let poller = NowPlayingPoller::new();
    poller.start(state.clone(), config.track_poll_interval_secs);

    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port)).await?;
    info!("pomod-ui listening on http://{}:{}", config.host, config.port);
    info!("Health check: http://{}:{}/health", config.host, config.port);

    axum::serve(listener, app).await?;

    poller.stop();
    Ok(())
}
