//! `linkbiod`: the linkbio web server.
//!
//! Usage:
//!   linkbiod -c <context-name-or-path> [--listen <addr>]
//!
//! The context name resolves to `/etc/linkbio/<name>.toml`.
//! If a path with `/` or `.` is given, it's used directly.

mod auth_middleware;
mod bootstrap;
mod config;
mod editor;
mod login;
mod pages;
mod routes;

use std::sync::Arc;

use clap::Parser;
use linkbio_backend::{Backend, CachedBackend};
use linkbio_core::Module;
use linkbio_profile::ProfileModule;
use tokio::signal::ctrl_c;
use tracing::{error, info};

use auth_middleware::SessionKeys;
use config::ServerConfig;
use routes::AppState;

/// linkbio server.
#[derive(Parser, Debug)]
#[command(name = "linkbiod", about = "linkbio profile server")]
struct Cli {
    /// Context name or path to config file.
    #[arg(short = 'c', long = "config", required = true)]
    config: String,

    /// Listen address.
    #[arg(long = "listen", default_value = "0.0.0.0:8080")]
    listen: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    let config_path = ServerConfig::resolve_path(&cli.config);
    info!("Loading configuration from {}", config_path.display());
    let server_config = ServerConfig::load(&config_path)?;
    bootstrap::verify_config(&server_config)?;

    // One client for the whole process, behind the query cache.
    let query_config = server_config.query_config();
    info!(
        stale_secs = query_config.stale_time.as_secs(),
        retry = query_config.retry,
        "Query cache configured"
    );
    let backend: Arc<dyn Backend> = Arc::new(CachedBackend::new(
        bootstrap::build_backend(&server_config)?,
        query_config,
    ));

    let profile_module = ProfileModule::new(backend.clone());
    info!("Profile module initialized");
    let module_routes = vec![(profile_module.name(), profile_module.routes())];

    let session_keys = Arc::new(SessionKeys::new(
        &server_config.session.jwt_secret,
        &server_config.session.cookie_name,
    ));

    let app_state = AppState {
        backend,
        session_keys,
        config: Arc::new(server_config),
    };
    let app = routes::build_router(app_state, module_routes);

    let listener = tokio::net::TcpListener::bind(&cli.listen).await?;
    info!("linkbio server listening on {}", cli.listen);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let interrupt = async {
        match ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = interrupt => {},
        _ = terminate => {},
    }
}
