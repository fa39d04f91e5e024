//! Admin authentication
//!
//! Back-office routes are guarded by a single shared key (`ADMIN_API_KEY`).
//! When no key is configured the guard is not installed, which is only
//! accepted outside production.

pub mod middleware;

pub use middleware::{admin_key_middleware, AdminAuthState};
