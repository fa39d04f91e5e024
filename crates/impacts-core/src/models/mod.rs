//! Data models for the application
//!
//! This module contains all data structures used throughout the application,
//! organized by domain. Each sub-module represents a specific feature area.

mod ingest;
mod invitation;
mod leaderboard;
mod organization;
mod program;
mod verification;
mod workflow;

// Re-export all models for convenient imports
pub use ingest::*;
pub use invitation::*;
pub use leaderboard::*;
pub use organization::*;
pub use program::*;
pub use verification::*;
pub use workflow::*;
