//! Provider session middleware and the wiring that connects it to the router.
//!
//! - [`token`] finds the session token in a request.
//! - [`SessionVerifier`] checks it against the provider.
//! - [`SessionLayer`] is the provider middleware (optional or required session).
//! - [`adapter`] runs that middleware in front of router handlers.

pub mod adapter;
pub mod layer;
pub mod token;
pub mod verifier;

pub use layer::SessionLayer;
pub use verifier::SessionVerifier;
