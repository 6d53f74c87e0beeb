//! Newsletter routes: `POST /api/subscribe` and `GET /api/contact`.
//!
//! Thin JSON layer over the vendor client. The landing page posts a raw
//! email (plus optional name fields); the contact lookup accepts an `id`
//! or `email` query parameter.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::info;

use waitline_core::vendor::{ContactQuery, SubscriptionRequest};

use crate::error::AppError;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/subscribe", post(subscribe))
        .route("/api/contact", get(contact))
}

// ── Request / response types ─────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribeBody {
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

#[derive(Debug, Serialize)]
pub struct SubscribeResponse {
    pub message: String,
    pub contact: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct ContactParams {
    pub id: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ContactResponse {
    pub contact: serde_json::Value,
}

// ── Handlers ─────────────────────────────────────────────────────────

async fn subscribe(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SubscribeBody>,
) -> Result<(StatusCode, Json<SubscribeResponse>), AppError> {
    let client = state.subscription_client()?;

    if body.email.trim().is_empty() {
        return Err(AppError::BadRequest(
            "A valid email address is required.".to_owned(),
        ));
    }

    let request = SubscriptionRequest {
        email: body.email.trim().to_owned(),
        first_name: body.first_name,
        last_name: body.last_name,
    };

    let subscription = client.subscribe(&request).await?;
    info!(
        vendor = client.vendor(),
        already_subscribed = subscription.already_subscribed,
        "contact subscribed"
    );

    let contact = subscription
        .id
        .map(|id| serde_json::json!({ "id": id }));

    Ok((
        StatusCode::CREATED,
        Json(SubscribeResponse {
            message: "Thanks for subscribing!".to_owned(),
            contact,
        }),
    ))
}

async fn contact(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ContactParams>,
) -> Result<Json<ContactResponse>, AppError> {
    let client = state.subscription_client()?;

    if params.id.is_none() && params.email.is_none() {
        return Err(AppError::BadRequest(
            "Provide either a contact id or email query parameter.".to_owned(),
        ));
    }

    let query = ContactQuery {
        id: params.id,
        email: params.email,
    };

    let contact = client.get_contact(&query).await?;
    Ok(Json(ContactResponse { contact }))
}
