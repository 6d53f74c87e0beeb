//! Server configuration for Waitline.
//!
//! Loads configuration from environment variables with sensible defaults.
//! Vendor selection and credentials are delegated to `waitline-core`.

use std::net::SocketAddr;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the HTTP listener to.
    pub bind_addr: SocketAddr,
    /// Log level filter (e.g., `info`, `debug`, `warn`).
    pub log_level: String,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `PORT` — port to bind on (cloud-host convention, binds to `0.0.0.0`)
    /// - `WAITLINE_BIND_ADDR` — full bind address (overrides `PORT`, default: `127.0.0.1:8300`)
    /// - `WAITLINE_LOG_LEVEL` — log filter (default: `info`)
    ///
    /// Vendor variables (`WAITLINE_VENDOR`, `BREVO_LIST_ID`,
    /// `RESEND_AUDIENCE_ID`, the key sources) are read by
    /// [`waitline_core::vendor::VendorConfig`] and the key resolver.
    #[must_use]
    pub fn from_env() -> Self {
        // Priority: WAITLINE_BIND_ADDR > PORT > default 127.0.0.1:8300
        let bind_addr = if let Ok(addr) = std::env::var("WAITLINE_BIND_ADDR") {
            addr.parse()
                .unwrap_or_else(|_| SocketAddr::from(([127, 0, 0, 1], 8300)))
        } else if let Ok(port_str) = std::env::var("PORT") {
            let port: u16 = port_str.parse().unwrap_or(8300);
            SocketAddr::from(([0, 0, 0, 0], port))
        } else {
            SocketAddr::from(([127, 0, 0, 1], 8300))
        };

        let log_level =
            std::env::var("WAITLINE_LOG_LEVEL").unwrap_or_else(|_| "info".to_owned());

        Self {
            bind_addr,
            log_level,
        }
    }
}
