//! Core library for Waitline.
//!
//! Contains the API-key resolution chain, the vendor mailing-list clients
//! (Brevo and Resend behind one trait), the signup-flow state machine, the
//! 50/30/20 budget calculator, and the launch countdown. This crate knows
//! nothing about HTTP serving or terminals — those live in
//! `waitline-server` and `waitline-cli`.

pub mod budget;
pub mod countdown;
pub mod error;
pub mod keysource;
pub mod resolver;
pub mod signup;
pub mod vendor;

pub use error::{BudgetError, SubscribeError};
pub use resolver::{KeyResolver, ResolvedKey};
pub use vendor::{EmailSubscriptionClient, SubscriptionRequest, VendorConfig};
