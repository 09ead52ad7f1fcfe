//! Business logic services.
//!
//! Services contain core business logic separated from HTTP handlers.

pub mod credential_service;
pub mod secret_generator;
pub mod summary_service;
