//! HTTP request handlers.
//!
//! Each handler is responsible for request validation, the single outbound backend call,
//! and response translation. Handlers return [`crate::errors::Error`] which converts to
//! an appropriate HTTP status with a JSON `{"error": ...}` body.
//!
//! - [`posts`]: the credential-injecting write proxy

pub mod posts;
