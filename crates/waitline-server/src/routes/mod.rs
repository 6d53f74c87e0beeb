//! Route modules for the Waitline server.

pub mod newsletter;
pub mod sys;

use std::sync::Arc;

use axum::Router;

use crate::state::AppState;

/// Assemble the full application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(newsletter::router())
        .merge(sys::router())
        .with_state(state)
}
