//! Tracing subscriber initialization
//!
//! Human-readable output by default; `LOG_FORMAT=json` switches to one JSON
//! object per line for log shippers.

mod init_basic;

pub use init_basic::{init_telemetry, shutdown_telemetry, LogFormat};
