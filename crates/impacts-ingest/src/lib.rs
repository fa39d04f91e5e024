//! Basic Impacts ingestion pipeline
//!
//! Turns pasted or uploaded JSON into organization candidates:
//!
//! - [`input`] accepts raw text or an uploaded file within size limits
//! - [`parser`] parses it strictly
//! - [`mapper`] maps loose, AI-generated records onto the canonical shape
//! - [`batch`] checks array input before anything is submitted
//! - [`session`] and [`form`] hold one candidate through preview, edit and approval
//! - [`gateway`] is the persistence contract both the API client and tests implement

pub mod batch;
pub mod error;
pub mod form;
pub mod gateway;
pub mod input;
pub mod mapper;
pub mod parser;
pub mod session;

pub use batch::{import_batch, validate_batch, validate_batch_value};
pub use error::IngestError;
pub use form::OrganizationForm;
pub use gateway::{GatewayError, PersistenceGateway};
pub use input::{accept_upload, UploadLimits};
pub use mapper::{map_organization, map_value, UntrustedOrganization, UntrustedProgram};
pub use parser::parse_json;
pub use session::{ImportSession, SessionState};
