//! Shared application state for the Waitline server.
//!
//! A single [`AppState`] is constructed at startup and shared across all
//! Axum handlers via `Arc`. It holds the vendor client when the API key
//! resolved at boot, or the reason the newsletter endpoints are degraded.

use std::sync::Arc;

use waitline_core::vendor::EmailSubscriptionClient;

/// Why the newsletter endpoints are unavailable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DegradedReason {
    /// No API key resolved from any source.
    MissingKey,
    /// The vendor needs a list/audience id and none was configured.
    MissingAudience,
}

/// Shared application state passed to all HTTP handlers.
pub struct AppState {
    /// The vendor client, `Err` with the degradation reason when signups
    /// cannot work.
    pub client: Result<Arc<dyn EmailSubscriptionClient>, DegradedReason>,
    /// Active vendor name, for the health endpoint.
    pub vendor: &'static str,
}

impl AppState {
    /// The client, or the degradation reason for error mapping.
    pub fn subscription_client(
        &self,
    ) -> Result<&Arc<dyn EmailSubscriptionClient>, DegradedReason> {
        self.client.as_ref().map_err(|reason| *reason)
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("vendor", &self.vendor)
            .field("enabled", &self.client.is_ok())
            .finish_non_exhaustive()
    }
}
