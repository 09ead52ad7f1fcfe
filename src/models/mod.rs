//! Data models representing database entities and API payloads.

/// Key validation payloads
pub mod auth;
/// API key (credential) model
pub mod credential;
/// GitHub repository summary payloads
pub mod summary;
