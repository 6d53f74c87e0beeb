//! Signup-flow state machine.
//!
//! Drives the waitlist widget: idle → submitting → {success, error}, back
//! to idle when the user edits the email field. The controller owns the
//! current status and user-facing message; [`SignupView`] derives the
//! presentation flags (button state, which message region is visible) so
//! callers only render.

use std::sync::Arc;

use tracing::debug;

use crate::error::SubscribeError;
use crate::vendor::{EmailSubscriptionClient, Subscription, SubscriptionRequest};

/// Shown when no API key could be resolved — raised without any network
/// attempt.
pub const CONFIG_MISSING_MESSAGE: &str =
    "Signups are temporarily unavailable. The mailing-list API key is not configured.";

/// Shown on transport-level failures.
pub const NETWORK_ISSUE_MESSAGE: &str =
    "We hit a network issue while submitting your email. Please try again.";

/// Shown when the email fails local validation.
pub const INVALID_EMAIL_MESSAGE: &str = "Please enter a valid email address.";

/// Where the widget currently is. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionStatus {
    Idle,
    Submitting,
    Success,
    Error,
}

/// Presentation flags derived from the current status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignupView {
    pub button_disabled: bool,
    pub button_label: &'static str,
    pub show_hint: bool,
    pub show_success: bool,
    /// `Some` only in the error state.
    pub error_message: Option<String>,
}

/// Owns the widget state and the wired vendor client.
///
/// The client is `None` when key resolution came up empty at construction
/// time; submitting in that configuration transitions straight to the
/// error state with zero network calls.
pub struct SignupController {
    client: Option<Arc<dyn EmailSubscriptionClient>>,
    status: SubmissionStatus,
    message: Option<String>,
    email: String,
    first_name: String,
    last_name: String,
}

impl SignupController {
    pub fn new(client: Option<Arc<dyn EmailSubscriptionClient>>) -> Self {
        Self {
            client,
            status: SubmissionStatus::Idle,
            message: None,
            email: String::new(),
            first_name: String::new(),
            last_name: String::new(),
        }
    }

    /// Optional name fields forwarded to the vendor alongside the email.
    #[must_use]
    pub fn with_names(mut self, first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        self.first_name = first_name.into();
        self.last_name = last_name.into();
        self
    }

    pub fn status(&self) -> SubmissionStatus {
        self.status
    }

    /// The email field contents; cleared after a successful submission.
    pub fn email(&self) -> &str {
        &self.email
    }

    /// The user edited the email field — any terminal state returns to idle.
    pub fn on_edit(&mut self, email: &str) {
        self.email = email.to_owned();
        if self.status != SubmissionStatus::Idle {
            self.status = SubmissionStatus::Idle;
            self.message = None;
        }
    }

    /// Submit the current email. Returns the resulting terminal status.
    ///
    /// A submit while one is already in flight is ignored — the view keeps
    /// the button disabled during `Submitting`, and this is the matching
    /// soft guard.
    pub async fn submit(&mut self) -> SubmissionStatus {
        if self.status == SubmissionStatus::Submitting {
            return self.status;
        }

        let email = self.email.trim().to_owned();
        if !email.contains('@') {
            return self.fail(INVALID_EMAIL_MESSAGE.to_owned());
        }

        self.status = SubmissionStatus::Submitting;
        self.message = None;

        let Some(client) = self.client.clone() else {
            // Key never resolved — error out before any network traffic.
            return self.fail(CONFIG_MISSING_MESSAGE.to_owned());
        };

        let request = SubscriptionRequest {
            email,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
        };
        match client.subscribe(&request).await {
            Ok(subscription) => self.succeed(&subscription),
            Err(e) => {
                debug!(error = %e, "subscription attempt failed");
                self.fail(error_message(&e))
            }
        }
    }

    fn succeed(&mut self, subscription: &Subscription) -> SubmissionStatus {
        self.email.clear();
        self.status = SubmissionStatus::Success;
        self.message = Some(if subscription.already_subscribed {
            "You're already on the list!".to_owned()
        } else {
            "You're on the list!".to_owned()
        });
        self.status
    }

    fn fail(&mut self, message: String) -> SubmissionStatus {
        self.status = SubmissionStatus::Error;
        self.message = Some(message);
        self.status
    }

    /// Success or error text for the currently visible message region.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Derive what the widget should show right now.
    pub fn view(&self) -> SignupView {
        let submitting = self.status == SubmissionStatus::Submitting;
        SignupView {
            button_disabled: submitting,
            button_label: if submitting {
                "Joining…"
            } else {
                "Join the waitlist"
            },
            show_hint: self.status == SubmissionStatus::Idle,
            show_success: self.status == SubmissionStatus::Success,
            error_message: if self.status == SubmissionStatus::Error {
                self.message.clone()
            } else {
                None
            },
        }
    }
}

impl std::fmt::Debug for SignupController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignupController")
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

/// User-facing message for a failed submission: the vendor's own message
/// when it supplied one, a generic fallback otherwise.
fn error_message(err: &SubscribeError) -> String {
    match err {
        SubscribeError::MissingKey | SubscribeError::MissingAudience { .. } => {
            CONFIG_MISSING_MESSAGE.to_owned()
        }
        SubscribeError::InvalidEmail { .. } => INVALID_EMAIL_MESSAGE.to_owned(),
        SubscribeError::Rejected { message, .. } => {
            format!("We couldn't add that email yet: {message}")
        }
        SubscribeError::Network { .. } | SubscribeError::EmptyContactQuery => {
            NETWORK_ISSUE_MESSAGE.to_owned()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use serde_json::Value;

    use super::*;
    use crate::vendor::ContactQuery;

    /// Fake client that counts calls and returns a scripted outcome.
    struct ScriptedClient {
        calls: AtomicUsize,
        outcome: fn() -> Result<Subscription, SubscribeError>,
    }

    impl ScriptedClient {
        fn new(outcome: fn() -> Result<Subscription, SubscribeError>) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                outcome,
            })
        }
    }

    #[async_trait]
    impl EmailSubscriptionClient for ScriptedClient {
        fn vendor(&self) -> &'static str {
            "scripted"
        }

        async fn subscribe(
            &self,
            _req: &SubscriptionRequest,
        ) -> Result<Subscription, SubscribeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            (self.outcome)()
        }

        async fn get_contact(&self, _query: &ContactQuery) -> Result<Value, SubscribeError> {
            Err(SubscribeError::EmptyContactQuery)
        }
    }

    fn as_dyn(client: &Arc<ScriptedClient>) -> Option<Arc<dyn EmailSubscriptionClient>> {
        Some(Arc::clone(client) as Arc<dyn EmailSubscriptionClient>)
    }

    fn ok_outcome() -> Result<Subscription, SubscribeError> {
        Ok(Subscription {
            id: Some("1".to_owned()),
            already_subscribed: false,
        })
    }

    fn rejected_outcome() -> Result<Subscription, SubscribeError> {
        Err(SubscribeError::Rejected {
            status: 400,
            message: "email is invalid".to_owned(),
        })
    }

    fn network_outcome() -> Result<Subscription, SubscribeError> {
        Err(SubscribeError::Network {
            reason: "connection refused".to_owned(),
        })
    }

    #[tokio::test]
    async fn missing_key_errors_without_invoking_the_client() {
        let mut controller = SignupController::new(None);
        controller.on_edit("ada@example.com");

        let status = controller.submit().await;
        assert_eq!(status, SubmissionStatus::Error);
        assert_eq!(controller.message(), Some(CONFIG_MISSING_MESSAGE));
    }

    #[tokio::test]
    async fn invalid_email_errors_without_invoking_the_client() {
        let client = ScriptedClient::new(ok_outcome);
        let mut controller = SignupController::new(as_dyn(&client));
        controller.on_edit("no-at-sign");

        let status = controller.submit().await;
        assert_eq!(status, SubmissionStatus::Error);
        assert_eq!(client.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn successful_submit_clears_the_email_field() {
        let client = ScriptedClient::new(ok_outcome);
        let mut controller = SignupController::new(as_dyn(&client));
        controller.on_edit("ada@example.com");

        let status = controller.submit().await;
        assert_eq!(status, SubmissionStatus::Success);
        assert_eq!(controller.email(), "");
        assert_eq!(client.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn rejection_surfaces_the_vendor_message() {
        let client = ScriptedClient::new(rejected_outcome);
        let mut controller = SignupController::new(as_dyn(&client));
        controller.on_edit("ada@example.com");

        let status = controller.submit().await;
        assert_eq!(status, SubmissionStatus::Error);
        assert_eq!(
            controller.message(),
            Some("We couldn't add that email yet: email is invalid")
        );
    }

    #[tokio::test]
    async fn network_failure_uses_the_generic_message() {
        let client = ScriptedClient::new(network_outcome);
        let mut controller = SignupController::new(as_dyn(&client));
        controller.on_edit("ada@example.com");

        controller.submit().await;
        assert_eq!(controller.message(), Some(NETWORK_ISSUE_MESSAGE));
    }

    #[tokio::test]
    async fn editing_returns_any_terminal_state_to_idle() {
        let client = ScriptedClient::new(rejected_outcome);
        let mut controller = SignupController::new(as_dyn(&client));
        controller.on_edit("ada@example.com");
        controller.submit().await;
        assert_eq!(controller.status(), SubmissionStatus::Error);

        controller.on_edit("ada2@example.com");
        assert_eq!(controller.status(), SubmissionStatus::Idle);
        assert!(controller.message().is_none());
    }

    #[tokio::test]
    async fn view_reflects_each_state() {
        let client = ScriptedClient::new(ok_outcome);
        let mut controller = SignupController::new(as_dyn(&client));

        let idle = controller.view();
        assert!(!idle.button_disabled);
        assert_eq!(idle.button_label, "Join the waitlist");
        assert!(idle.show_hint);
        assert!(!idle.show_success);
        assert!(idle.error_message.is_none());

        controller.on_edit("ada@example.com");
        controller.submit().await;
        let success = controller.view();
        assert!(success.show_success);
        assert!(!success.show_hint);

        controller.on_edit("x");
        controller.submit().await;
        let error = controller.view();
        assert_eq!(error.error_message.as_deref(), Some(INVALID_EMAIL_MESSAGE));
    }
}
