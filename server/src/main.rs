mod app;
mod config;
mod dataset;
mod error;
mod render;
mod routes;
mod state;
mod table;

use std::process::ExitCode;

use tokio::signal;
use tracing_subscriber::EnvFilter;

use crate::state::AppState;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let source_url = config::source_url();
    let tolerance = config::simplify_tolerance();
    tracing::info!(%source_url, tolerance, "Fetching region dataset...");

    // Readiness is gated on this fetch; there is no retry.
    let http_client = match state::build_http_client() {
        Ok(client) => client,
        Err(e) => {
            tracing::error!(error = %e, "failed to build HTTP client");
            return ExitCode::FAILURE;
        }
    };
    let dataset = match dataset::load(&http_client, &source_url, tolerance).await {
        Ok(dataset) => dataset,
        Err(e) => {
            tracing::error!(error = %e, "failed to load region dataset");
            return ExitCode::FAILURE;
        }
    };
    drop(http_client);

    let state = AppState::new(dataset);
    let app = app::build_app(state, &config::static_dir());

    let addr = format!("0.0.0.0:{}", config::server_port());
    tracing::info!("Prioritas Map server listening on {addr}");

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, %addr, "failed to bind TCP listener");
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %e, "server failed");
        return ExitCode::FAILURE;
    }

    tracing::info!("Server shut down gracefully");
    ExitCode::SUCCESS
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        let mut sigterm = match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(sigterm) => sigterm,
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                return;
            }
        };
        sigterm.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
