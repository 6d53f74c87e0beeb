//! Vendor mailing-list clients.
//!
//! One [`EmailSubscriptionClient`] capability with a per-vendor
//! implementation, selected by [`VendorConfig`]. Brevo authenticates with
//! an `api-key` header and addresses numeric list ids; Resend uses a
//! bearer token and string audience ids. The two header schemes are not
//! interchangeable.
//!
//! Every submission is exactly one HTTP call: no retries, no backoff, no
//! timeout override. Validation failures (empty key, malformed email)
//! short-circuit before any network traffic.

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::error::SubscribeError;

/// Default Brevo API origin.
pub const BREVO_DEFAULT_BASE: &str = "https://api.brevo.com";
/// Default Resend API origin.
pub const RESEND_DEFAULT_BASE: &str = "https://api.resend.com";

/// Fallback shown when a vendor error body is absent or unparseable.
const GENERIC_REJECTION: &str = "the mailing-list service returned an unexpected response";

// ── Configuration ────────────────────────────────────────────────────

/// Which vendor integration is active. Exactly one — never both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VendorConfig {
    /// Brevo contacts API with a numeric list id.
    Brevo { list_id: i64 },
    /// Resend contacts API with a string audience id.
    Resend { audience_id: String },
}

impl VendorConfig {
    /// Select the vendor from environment variables.
    ///
    /// - `WAITLINE_VENDOR` — `brevo` (default) or `resend`
    /// - `BREVO_LIST_ID` — numeric list id (default: `5`)
    /// - `RESEND_AUDIENCE_ID` — required when the vendor is `resend`
    pub fn from_env() -> Result<Self, SubscribeError> {
        let vendor = std::env::var("WAITLINE_VENDOR")
            .unwrap_or_else(|_| "brevo".to_owned())
            .to_lowercase();

        match vendor.as_str() {
            "resend" => {
                let audience_id = std::env::var("RESEND_AUDIENCE_ID")
                    .ok()
                    .filter(|v| !v.trim().is_empty())
                    .ok_or_else(|| SubscribeError::MissingAudience {
                        reason: "RESEND_AUDIENCE_ID is not set".to_owned(),
                    })?;
                Ok(Self::Resend { audience_id })
            }
            _ => {
                let list_id = std::env::var("BREVO_LIST_ID")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(5);
                Ok(Self::Brevo { list_id })
            }
        }
    }

    /// Stable lowercase vendor name, also used as the key-store slot.
    pub fn vendor_name(&self) -> &'static str {
        match self {
            Self::Brevo { .. } => "brevo",
            Self::Resend { .. } => "resend",
        }
    }

    /// API origin for this vendor, honoring the `WAITLINE_API_BASE`
    /// override used by tests and local development.
    pub fn base_url(&self) -> String {
        std::env::var("WAITLINE_API_BASE").unwrap_or_else(|_| {
            match self {
                Self::Brevo { .. } => BREVO_DEFAULT_BASE,
                Self::Resend { .. } => RESEND_DEFAULT_BASE,
            }
            .to_owned()
        })
    }
}

// ── Request / response types ─────────────────────────────────────────

/// One form submission, discarded after the HTTP call resolves.
#[derive(Debug, Clone)]
pub struct SubscriptionRequest {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl SubscriptionRequest {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            first_name: String::new(),
            last_name: String::new(),
        }
    }
}

/// Outcome of a successful subscription call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    /// Vendor-assigned contact id, when the response carried one.
    pub id: Option<String>,
    /// The address was already on the list (Brevo HTTP 409).
    pub already_subscribed: bool,
}

/// Lookup parameters for an existing contact.
#[derive(Debug, Clone, Default)]
pub struct ContactQuery {
    pub id: Option<String>,
    pub email: Option<String>,
}

impl ContactQuery {
    fn identifier(&self) -> Result<&str, SubscribeError> {
        self.id
            .as_deref()
            .or(self.email.as_deref())
            .filter(|v| !v.trim().is_empty())
            .ok_or(SubscribeError::EmptyContactQuery)
    }
}

// ── Capability trait ─────────────────────────────────────────────────

/// Adds an email address to the vendor's mailing list / audience.
#[async_trait]
pub trait EmailSubscriptionClient: Send + Sync {
    /// Stable vendor name for logs and status output.
    fn vendor(&self) -> &'static str;

    /// Submit one subscription. Exactly one network call on the happy
    /// path; zero when local validation fails.
    async fn subscribe(&self, req: &SubscriptionRequest) -> Result<Subscription, SubscribeError>;

    /// Look up an existing contact by id or email.
    async fn get_contact(&self, query: &ContactQuery) -> Result<Value, SubscribeError>;
}

/// Build the configured vendor's client.
pub fn build_client(
    config: &VendorConfig,
    api_key: String,
) -> std::sync::Arc<dyn EmailSubscriptionClient> {
    let base_url = config.base_url();
    match config {
        VendorConfig::Brevo { list_id } => {
            std::sync::Arc::new(BrevoClient::new(base_url, api_key, *list_id))
        }
        VendorConfig::Resend { audience_id } => {
            std::sync::Arc::new(ResendClient::new(base_url, api_key, audience_id.clone()))
        }
    }
}

// ── Shared validation / response plumbing ────────────────────────────

fn validate(api_key: &str, email: &str) -> Result<(), SubscribeError> {
    if api_key.trim().is_empty() {
        return Err(SubscribeError::MissingKey);
    }
    if !email.contains('@') {
        return Err(SubscribeError::InvalidEmail {
            email: email.to_owned(),
        });
    }
    Ok(())
}

/// Pull a human-readable message out of a vendor error body.
///
/// Tries `message`, then `errors[0].message`, then `code` — the shapes the
/// two vendors actually return. `None` when the body is absent or not JSON.
fn extract_error_message(body: &str) -> Option<String> {
    let json: Value = serde_json::from_str(body).ok()?;

    if let Some(msg) = json.get("message").and_then(Value::as_str) {
        return Some(msg.to_owned());
    }
    if let Some(msg) = json
        .get("errors")
        .and_then(Value::as_array)
        .and_then(|errors| errors.first())
        .and_then(|e| e.get("message"))
        .and_then(Value::as_str)
    {
        return Some(msg.to_owned());
    }
    json.get("code")
        .and_then(Value::as_str)
        .map(str::to_owned)
}

/// Map a non-success response into [`SubscribeError::Rejected`].
async fn rejection(resp: reqwest::Response) -> SubscribeError {
    let status = resp.status().as_u16();
    let message = match resp.text().await {
        Ok(body) => extract_error_message(&body).unwrap_or_else(|| GENERIC_REJECTION.to_owned()),
        Err(_) => GENERIC_REJECTION.to_owned(),
    };
    SubscribeError::Rejected { status, message }
}

fn contact_id_from(json: &Value) -> Option<String> {
    let id = json.get("id").or_else(|| json.get("data")?.get("id"))?;
    match id {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

// ── Brevo ────────────────────────────────────────────────────────────

/// Brevo (ex-Sendinblue) contacts client. Named `api-key` header scheme.
pub struct BrevoClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    list_id: i64,
}

impl BrevoClient {
    pub fn new(base_url: String, api_key: String, list_id: i64) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            api_key,
            list_id,
        }
    }
}

#[async_trait]
impl EmailSubscriptionClient for BrevoClient {
    fn vendor(&self) -> &'static str {
        "brevo"
    }

    async fn subscribe(&self, req: &SubscriptionRequest) -> Result<Subscription, SubscribeError> {
        validate(&self.api_key, &req.email)?;

        let body = serde_json::json!({
            "email": req.email,
            "listIds": [self.list_id],
            "updateEnabled": true,
        });

        let resp = self
            .http
            .post(format!("{}/v3/contacts", self.base_url))
            .header("api-key", &self.api_key)
            .header("Accept", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| SubscribeError::network(&e))?;

        let status = resp.status();

        // Duplicate contact — Brevo updates in place, treat as subscribed.
        if status == reqwest::StatusCode::CONFLICT {
            debug!(email = %req.email, "brevo reported existing contact");
            return Ok(Subscription {
                id: None,
                already_subscribed: true,
            });
        }

        if !status.is_success() {
            return Err(rejection(resp).await);
        }

        let id = resp
            .json::<Value>()
            .await
            .ok()
            .as_ref()
            .and_then(contact_id_from);

        Ok(Subscription {
            id,
            already_subscribed: false,
        })
    }

    async fn get_contact(&self, query: &ContactQuery) -> Result<Value, SubscribeError> {
        if self.api_key.trim().is_empty() {
            return Err(SubscribeError::MissingKey);
        }
        let identifier = query.identifier()?;

        let resp = self
            .http
            .get(format!("{}/v3/contacts/{identifier}", self.base_url))
            .header("api-key", &self.api_key)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| SubscribeError::network(&e))?;

        if !resp.status().is_success() {
            return Err(rejection(resp).await);
        }

        resp.json().await.map_err(|e| SubscribeError::network(&e))
    }
}

// ── Resend ───────────────────────────────────────────────────────────

/// Resend contacts client. Bearer-token header scheme.
pub struct ResendClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    audience_id: String,
}

impl ResendClient {
    pub fn new(base_url: String, api_key: String, audience_id: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            api_key,
            audience_id,
        }
    }
}

#[async_trait]
impl EmailSubscriptionClient for ResendClient {
    fn vendor(&self) -> &'static str {
        "resend"
    }

    async fn subscribe(&self, req: &SubscriptionRequest) -> Result<Subscription, SubscribeError> {
        validate(&self.api_key, &req.email)?;
        if self.audience_id.trim().is_empty() {
            return Err(SubscribeError::MissingAudience {
                reason: "audience id is empty".to_owned(),
            });
        }

        let body = serde_json::json!({
            "email": req.email,
            "first_name": req.first_name,
            "last_name": req.last_name,
            "unsubscribed": false,
            "audience_id": self.audience_id,
        });

        let resp = self
            .http
            .post(format!("{}/v1/contacts", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| SubscribeError::network(&e))?;

        if !resp.status().is_success() {
            return Err(rejection(resp).await);
        }

        let id = resp
            .json::<Value>()
            .await
            .ok()
            .as_ref()
            .and_then(contact_id_from);

        Ok(Subscription {
            id,
            already_subscribed: false,
        })
    }

    async fn get_contact(&self, query: &ContactQuery) -> Result<Value, SubscribeError> {
        if self.api_key.trim().is_empty() {
            return Err(SubscribeError::MissingKey);
        }
        query.identifier()?;

        let mut request = self
            .http
            .get(format!("{}/v1/contacts", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .query(&[("audience_id", self.audience_id.as_str())]);
        if let Some(id) = query.id.as_deref() {
            request = request.query(&[("id", id)]);
        }
        if let Some(email) = query.email.as_deref() {
            request = request.query(&[("email", email)]);
        }

        let resp = request
            .send()
            .await
            .map_err(|e| SubscribeError::network(&e))?;

        if !resp.status().is_success() {
            return Err(rejection(resp).await);
        }

        resp.json().await.map_err(|e| SubscribeError::network(&e))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn brevo(server: &MockServer) -> BrevoClient {
        BrevoClient::new(server.uri(), "xkeysib-test".to_owned(), 5)
    }

    fn resend(server: &MockServer) -> ResendClient {
        ResendClient::new(server.uri(), "re_test".to_owned(), "aud_123".to_owned())
    }

    // ── extract_error_message ────────────────────────────────────────

    #[test]
    fn error_message_prefers_top_level_message() {
        let body = r#"{"message": "email is invalid", "code": "invalid_parameter"}"#;
        assert_eq!(
            extract_error_message(body).as_deref(),
            Some("email is invalid")
        );
    }

    #[test]
    fn error_message_falls_back_to_errors_array() {
        let body = r#"{"errors": [{"message": "list does not exist"}]}"#;
        assert_eq!(
            extract_error_message(body).as_deref(),
            Some("list does not exist")
        );
    }

    #[test]
    fn error_message_falls_back_to_code() {
        let body = r#"{"code": "unauthorized"}"#;
        assert_eq!(extract_error_message(body).as_deref(), Some("unauthorized"));
    }

    #[test]
    fn error_message_none_for_garbage() {
        assert!(extract_error_message("<html>nope</html>").is_none());
        assert!(extract_error_message("").is_none());
    }

    // ── Brevo ────────────────────────────────────────────────────────

    #[tokio::test]
    async fn brevo_subscribe_sends_api_key_header_and_list_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v3/contacts"))
            .and(header("api-key", "xkeysib-test"))
            .and(body_partial_json(json!({
                "email": "ada@example.com",
                "listIds": [5],
                "updateEnabled": true,
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 42})))
            .expect(1)
            .mount(&server)
            .await;

        let sub = brevo(&server)
            .subscribe(&SubscriptionRequest::new("ada@example.com"))
            .await
            .unwrap();
        assert_eq!(sub.id.as_deref(), Some("42"));
        assert!(!sub.already_subscribed);
    }

    #[tokio::test]
    async fn brevo_409_is_already_subscribed_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v3/contacts"))
            .respond_with(
                ResponseTemplate::new(409)
                    .set_body_json(json!({"code": "duplicate_parameter", "message": "Contact already exist"})),
            )
            .mount(&server)
            .await;

        let sub = brevo(&server)
            .subscribe(&SubscriptionRequest::new("ada@example.com"))
            .await
            .unwrap();
        assert!(sub.already_subscribed);
    }

    #[tokio::test]
    async fn brevo_rejection_extracts_vendor_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v3/contacts"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(json!({"message": "email is invalid"})),
            )
            .mount(&server)
            .await;

        let err = brevo(&server)
            .subscribe(&SubscriptionRequest::new("ada@example.com"))
            .await
            .unwrap_err();
        match err {
            SubscribeError::Rejected { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "email is invalid");
            }
            other => panic!("expected Rejected, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn brevo_rejection_with_unparseable_body_uses_generic_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v3/contacts"))
            .respond_with(ResponseTemplate::new(502).set_body_string("<html>bad gateway</html>"))
            .mount(&server)
            .await;

        let err = brevo(&server)
            .subscribe(&SubscriptionRequest::new("ada@example.com"))
            .await
            .unwrap_err();
        match err {
            SubscribeError::Rejected { status, message } => {
                assert_eq!(status, 502);
                assert_eq!(message, GENERIC_REJECTION);
            }
            other => panic!("expected Rejected, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_key_short_circuits_without_network_call() {
        let server = MockServer::start().await;
        // Zero requests expected — validation fails before the call.
        Mock::given(method("POST"))
            .and(path("/v3/contacts"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;

        let client = BrevoClient::new(server.uri(), "   ".to_owned(), 5);
        let err = client
            .subscribe(&SubscriptionRequest::new("ada@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, SubscribeError::MissingKey));
    }

    #[tokio::test]
    async fn email_without_at_sign_short_circuits() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;

        let err = brevo(&server)
            .subscribe(&SubscriptionRequest::new("not-an-email"))
            .await
            .unwrap_err();
        assert!(matches!(err, SubscribeError::InvalidEmail { .. }));
    }

    #[tokio::test]
    async fn brevo_contact_lookup_by_email() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v3/contacts/ada@example.com"))
            .and(header("api-key", "xkeysib-test"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"id": 42, "email": "ada@example.com"})),
            )
            .mount(&server)
            .await;

        let contact = brevo(&server)
            .get_contact(&ContactQuery {
                id: None,
                email: Some("ada@example.com".to_owned()),
            })
            .await
            .unwrap();
        assert_eq!(contact["id"], 42);
    }

    #[tokio::test]
    async fn contact_lookup_without_identifier_is_rejected_locally() {
        let server = MockServer::start().await;
        let err = brevo(&server)
            .get_contact(&ContactQuery::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SubscribeError::EmptyContactQuery));
    }

    // ── Resend ───────────────────────────────────────────────────────

    #[tokio::test]
    async fn resend_subscribe_sends_bearer_token_and_audience() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/contacts"))
            .and(header("Authorization", "Bearer re_test"))
            .and(body_partial_json(json!({
                "email": "ada@example.com",
                "unsubscribed": false,
                "audience_id": "aud_123",
            })))
            .respond_with(
                ResponseTemplate::new(201).set_body_json(json!({"id": "cont_abc"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let sub = resend(&server)
            .subscribe(&SubscriptionRequest::new("ada@example.com"))
            .await
            .unwrap();
        assert_eq!(sub.id.as_deref(), Some("cont_abc"));
    }

    #[tokio::test]
    async fn resend_rejection_extracts_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/contacts"))
            .respond_with(
                ResponseTemplate::new(422)
                    .set_body_json(json!({"message": "audience not found"})),
            )
            .mount(&server)
            .await;

        let err = resend(&server)
            .subscribe(&SubscriptionRequest::new("ada@example.com"))
            .await
            .unwrap_err();
        match err {
            SubscribeError::Rejected { status, message } => {
                assert_eq!(status, 422);
                assert_eq!(message, "audience not found");
            }
            other => panic!("expected Rejected, got {other:?}"),
        }
    }

    // ── Connectivity ─────────────────────────────────────────────────

    #[tokio::test]
    async fn unreachable_vendor_is_a_network_error() {
        // Nothing listens on this port.
        let client = BrevoClient::new("http://127.0.0.1:19999".to_owned(), "k".to_owned(), 5);
        let err = client
            .subscribe(&SubscriptionRequest::new("ada@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, SubscribeError::Network { .. }));
    }
}
