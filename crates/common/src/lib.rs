//! Wire types and errors shared across the session demo crates.

pub mod error;
pub mod protocol;

pub use error::ServiceError;
