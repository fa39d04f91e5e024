//! Basic Impacts API Library
//!
//! HTTP handlers, services, middleware and application setup for the impact
//! score platform.

mod api_doc;
pub mod auth;
pub mod constants;
pub mod error;
mod handlers;
pub mod services;
pub mod setup;
pub mod state;

pub use error::{ErrorResponse, HttpAppError};
pub use state::AppState;
