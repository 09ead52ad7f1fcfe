//! HTTP request handlers (route handlers).
//!
//! Each handler is an async function that:
//! 1. Receives HTTP request data (JSON body, URL params, etc.)
//! 2. Calls into the services
//! 3. Returns HTTP response (JSON, status code)

/// API key management endpoints
pub mod credentials;
/// Health check endpoint
pub mod health;
/// Repository summarizer endpoint
pub mod summarizer;
/// Key validation endpoints
pub mod validation;
