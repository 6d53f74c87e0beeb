//! Error types for `waitline-core`.
//!
//! Each variant carries enough context to explain the failure to an end
//! user. Messages never include the API key itself — only which source was
//! consulted or which field was rejected.

/// Errors from the newsletter subscription flow.
///
/// The taxonomy is deliberate: configuration and validation errors are
/// raised before any network traffic; rejection and network errors are
/// raised after exactly one attempt. Nothing here is retried.
#[derive(Debug, thiserror::Error)]
pub enum SubscribeError {
    /// No API key could be resolved from any configured source.
    #[error("mailing-list API key is not configured")]
    MissingKey,

    /// The vendor needs a list/audience identifier and none was configured.
    #[error("audience identifier is not configured: {reason}")]
    MissingAudience { reason: String },

    /// The email address failed local validation — no network call made.
    #[error("invalid email address: {email:?}")]
    InvalidEmail { email: String },

    /// A contact lookup was issued without an id or email.
    #[error("contact lookup requires an id or an email")]
    EmptyContactQuery,

    /// The vendor API rejected the request with a non-success status.
    #[error("vendor rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// A network-level failure (DNS, refused connection, offline).
    #[error("network error while contacting the vendor: {reason}")]
    Network { reason: String },
}

impl SubscribeError {
    /// Wrap a transport error, keeping only its display form.
    pub fn network(err: &reqwest::Error) -> Self {
        Self::Network {
            reason: err.to_string(),
        }
    }
}

/// Errors from the budget calculator.
#[derive(Debug, thiserror::Error)]
pub enum BudgetError {
    /// The raw amount could not be parsed as a number.
    #[error("enter a valid amount for {field}")]
    InvalidAmount { field: &'static str },

    /// Income must be strictly positive.
    #[error("income must be greater than zero")]
    NonPositiveIncome,

    /// Spending may not be negative.
    #[error("spending cannot be negative")]
    NegativeSpending,
}
