pub mod ingest;
pub mod invitations;
pub mod organizations;
pub mod programs;
pub mod public;
pub mod verification_requests;
pub mod workflows;
