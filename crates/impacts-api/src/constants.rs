//! API constants

/// Base path for every API route
pub const API_PREFIX: &str = "/api";

/// Service name reported in logs and the OpenAPI document
pub const SERVICE_NAME: &str = "impacts-api";

/// Log filter used when `RUST_LOG` is not set
pub const DEFAULT_LOG_FILTER: &str = "impacts=debug,impacts_api=debug,tower_http=debug";

/// Multipart framing around an uploaded file; added to the upload cap for the body limit.
pub const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Concurrent in-flight requests before the server starts queueing
pub const DEFAULT_HTTP_CONCURRENCY_LIMIT: usize = 1_024;

/// Length of an invitation token before hex encoding
pub const INVITATION_TOKEN_BYTES: usize = 32;
