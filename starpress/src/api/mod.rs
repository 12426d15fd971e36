//! API layer for HTTP request handling and data models.
//!
//! This module contains the gateway's REST surface, organized into:
//!
//! - **[`handlers`]**: Axum route handlers
//! - **[`models`]**: Request/response data structures
//!
//! The exposed surface is deliberately small: `POST /api/posts` proxies content-creation
//! requests to the backend with the server-held credential attached. Endpoints are
//! documented with OpenAPI annotations via `utoipa`; the rendered docs are served at
//! `/docs` when the server is running.

pub mod handlers;
pub mod models;
