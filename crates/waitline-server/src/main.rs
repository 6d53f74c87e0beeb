//! Waitline server entry point.
//!
//! Loads configuration, resolves the vendor API key through the standard
//! source chain, and starts the Axum HTTP server with graceful shutdown.
//! A missing key degrades the newsletter endpoints to 503 — it never stops
//! the server from coming up.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{info, warn};

use waitline_core::resolver::default_resolver;
use waitline_core::vendor::{VendorConfig, build_client};

use waitline_server::config::ServerConfig;
use waitline_server::routes;
use waitline_server::state::{AppState, DegradedReason};

use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration from environment.
    let config = ServerConfig::from_env();

    // Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .json()
        .init();

    let state = Arc::new(build_app_state());

    // The landing page is served from another origin; keep CORS permissive.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = routes::router(Arc::clone(&state))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind to {}", config.bind_addr))?;

    info!(addr = %config.bind_addr, vendor = state.vendor, "Waitline server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Waitline server stopped");
    Ok(())
}

/// Select the vendor and resolve its API key. Failures degrade the
/// newsletter endpoints instead of aborting startup.
fn build_app_state() -> AppState {
    match VendorConfig::from_env() {
        Ok(vendor_config) => {
            let vendor = vendor_config.vendor_name();
            let resolver = default_resolver(vendor, None);
            match resolver.resolve() {
                Some(resolved) => {
                    info!(vendor, source = resolved.source, "vendor API key resolved");
                    AppState {
                        client: Ok(build_client(&vendor_config, resolved.key)),
                        vendor,
                    }
                }
                None => {
                    warn!(vendor, "no API key resolved; newsletter signup will be disabled");
                    AppState {
                        client: Err(DegradedReason::MissingKey),
                        vendor,
                    }
                }
            }
        }
        Err(e) => {
            warn!(error = %e, "vendor misconfigured; newsletter signup will be disabled");
            AppState {
                client: Err(DegradedReason::MissingAudience),
                vendor: "resend",
            }
        }
    }
}

/// Resolve on ctrl-c or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to install ctrl-c handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => warn!(error = %e, "failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("shutdown signal received");
}
