//! Logging utilities.
//!
//! This module centralizes logger initialization and keeps the rest of the
//! crate on the standard `log` facade; callers pick the backend behavior at
//! startup and everything else stays backend-agnostic.

mod init;

pub use init::{init_logging, LoggingConfig};
