//! Application services: validation and orchestration on top of the repositories.

pub mod invitation;
pub mod organization;
pub mod verification;
pub mod workflow;

pub use invitation::InvitationService;
pub use organization::OrganizationService;
pub use verification::VerificationService;
pub use workflow::WorkflowService;
