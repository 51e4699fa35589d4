use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use repaykaro::backend::HttpBackend;
use repaykaro::cli::{run_command, Cli};
use repaykaro::config::Config;
use repaykaro::AppState;

fn init_logging(level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if !cli.is_serve() {
        // Client commands print their own output; keep logs quiet unless asked
        init_logging(cli.log_level.as_deref().unwrap_or("warn"));
        return run_command(&cli).await;
    }

    // Load configuration
    let mut config = Config::load(&cli.config)?;
    if let Some(url) = &cli.api_base_url {
        config = config.with_backend_url(url);
    }

    // Initialize logging
    let log_level = cli
        .log_level
        .as_ref()
        .unwrap_or(&config.logging.level)
        .clone();
    init_logging(&log_level);

    tracing::info!("Starting RepayKaro portal v{}", env!("CARGO_PKG_VERSION"));

    let backend = HttpBackend::new(&config.backend)?;
    tracing::info!(base_url = %config.backend.base_url, "Using backend API");

    let state = Arc::new(AppState::new(config.clone(), Arc::new(backend)));
    let app = repaykaro::api::create_app(state, &config.server.static_dir);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Portal listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install signal handler");
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

    tracing::info!("Shutdown signal received");
}
