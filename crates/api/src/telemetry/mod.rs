//! Structured logging, with optional OpenTelemetry span export.
//!
//! # Telemetry invariants
//!
//! - **No session tokens or provider secret keys** in any span attribute or
//!   log field. Subjects and session ids are fine.
//! - Log level is configurable via `LOG_LEVEL` (default: `info`); `RUST_LOG`
//!   takes precedence when set.

pub mod init;

pub use init::init_telemetry;
