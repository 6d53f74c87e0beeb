//! HTTP server library for Waitline.
//!
//! The backend companion to the launch landing page: a small JSON API that
//! forwards newsletter signups to the configured mailing-list vendor. No
//! persistence, no auth — a key that fails to resolve degrades the signup
//! endpoints, never the process.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;
