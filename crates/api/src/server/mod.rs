//! Axum HTTP server, routing, and middleware.
//!
//! # Responsibilities
//! - Define the Axum router with the route groups and shared middleware.
//! - Inject shared application state (`AppState`) into handlers.
//! - Map [`common::ServiceError`] onto HTTP responses.

pub mod error;
pub mod handlers;
pub mod router;
pub mod state;
