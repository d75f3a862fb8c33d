//! Web server for the helpdesk ticket dashboard
#![forbid(unsafe_code)]

use helpdesk_core::{Config, context_error, context_error::Result, init_logging};
use helpdesk_web::build_app;
use std::net::{IpAddr, SocketAddr};
use tokio::net::TcpListener;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (for development convenience)
    let dotenv = dotenvy::dotenv();

    let (config, config_error) = match Config::load() {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };

    init_logging(&config.logging)?;

    if let Err(e) = dotenv {
        info!("No .env file loaded: {}", e);
    }
    if let Some(e) = config_error {
        warn!("Failed to load config ({}), using defaults", e);
    }

    let host: IpAddr = config.server.host.parse().map_err(|e| {
        context_error!("Invalid web server host '{}': {}", config.server.host, e)
    })?;
    let addr = SocketAddr::new(host, config.server.port);

    info!(
        "Helpdesk dashboard v{} reading {}",
        env!("CARGO_PKG_VERSION"),
        config.data.path.display()
    );

    let app = build_app(config);

    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| context_error!("Failed to bind to {}: {}", addr, e))?;

    info!("Dashboard available at http://{}", addr);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| context_error!("Server error: {}", e))?;

    info!("Server shutdown complete");
    Ok(())
}

/// Handle graceful shutdown signals
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
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
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C, shutting down gracefully...");
        },
        () = terminate => {
            info!("Received terminate signal, shutting down gracefully...");
        },
    }
}
