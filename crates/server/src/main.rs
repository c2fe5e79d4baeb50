use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use clipfetch_core::{
    load_config_or_default, validate_config, JobRegistry, LocalToolchain, MetadataProber,
    ProcessRunner, Toolchain, TokioProcessRunner,
};
use clipfetch_server::{api::create_router, state::AppState};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging; CLIPFETCH_LOG_FORMAT=json switches to structured output
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    let json_logs = std::env::var("CLIPFETCH_LOG_FORMAT").is_ok_and(|f| f == "json");
    if json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    // Determine config path
    let config_path = std::env::var("CLIPFETCH_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config_or_default(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!(
        max_concurrent_jobs = config.registry.max_concurrent_jobs,
        stall_timeout_secs = config.registry.stall_timeout_secs,
        "Registry configured"
    );

    // Check the toolchain once up front; jobs re-check on every submit
    let toolchain: Arc<dyn Toolchain> = Arc::new(LocalToolchain::new(config.tools.clone()));
    let tools = toolchain.ensure_ready().await;
    if tools.tool_installed {
        info!(
            path = %tools.tool_path.display(),
            version = tools.tool_version.as_deref().unwrap_or("unknown"),
            "yt-dlp found"
        );
    } else {
        warn!(
            path = %tools.tool_path.display(),
            "yt-dlp not found, downloads and probes will be refused until it is installed"
        );
    }
    if !tools.av_tool_installed {
        warn!("ffmpeg not found, merging and audio extraction will fail");
    }

    let runner: Arc<dyn ProcessRunner> = Arc::new(TokioProcessRunner::new(config.runner.clone()));
    info!("Using process runner: {}", runner.name());

    let registry = JobRegistry::new(
        config.registry.clone(),
        Arc::clone(&toolchain),
        Arc::clone(&runner),
    );
    let prober = Arc::new(MetadataProber::new(
        config.prober.clone(),
        Arc::clone(&toolchain),
        Arc::clone(&runner),
    ));

    // Create app state
    let state = Arc::new(AppState::new(
        config.clone(),
        registry.clone(),
        prober,
        toolchain,
    ));

    // Create router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    // No process may outlive the server
    info!("Server shutting down...");
    let cancelled = registry.cancel_all().await;
    info!(cancelled, "All jobs stopped");

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
