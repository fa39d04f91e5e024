//! Basic Impacts Core Library
//!
//! This crate provides core domain models, error types, configuration, validation
//! and the workflow interpreter shared across all Basic Impacts components.

pub mod config;
pub mod error;
pub mod models;
pub mod validation;
pub mod workflow_engine;

// Re-export commonly used types
pub use config::{BaseConfig, Config, ImpactsConfig, StorageBackend};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use workflow_engine::{run_workflow, validate_steps, RunOutcome, WorkflowError, WorkflowRun};
