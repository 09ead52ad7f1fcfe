//! HTTP middleware components.
//!
//! Middleware are functions that run before route handlers. They can
//! authenticate requests or short-circuit them.

/// API key authentication middleware
pub mod auth;
