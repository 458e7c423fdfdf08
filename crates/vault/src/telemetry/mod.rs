//! Structured logging for the vault service.
//!
//! # Telemetry invariants
//!
//! - **No field value or key material** may appear in any span or log field.
//!   Record ids, field counts and read counters are fine.
//! - Log level is configurable via `LOG_LEVEL` (default: `info`); `RUST_LOG`
//!   takes precedence when set.

pub mod init;

pub use init::init_telemetry;
