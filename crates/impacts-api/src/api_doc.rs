//! OpenAPI documentation.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::constants::SERVICE_NAME;
use crate::error;
use crate::handlers;
use impacts_core::models;

/// Returns the OpenAPI spec served at `/api/openapi.json`.
pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    let mut spec = ApiDoc::openapi();
    spec.info.title = SERVICE_NAME.to_string();
    spec
}

struct AdminKeyAddon;

impl Modify for AdminKeyAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "admin_key",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Basic Impacts API",
        version = "0.1.0",
        description = "Impact scores for nonprofit organizations: JSON ingestion, admin back-office and public leaderboard. Admin routes take `Authorization: Bearer <ADMIN_API_KEY>` when a key is configured."
    ),
    paths(
        // Ingestion
        handlers::ingest::parse_organization,
        handlers::ingest::preview_organization,
        handlers::ingest::upload_organization_file,
        handlers::ingest::batch_create_organizations,
        // Organizations
        handlers::organizations::create_organization,
        handlers::organizations::list_organizations,
        handlers::organizations::get_organization,
        handlers::organizations::update_organization,
        handlers::organizations::delete_organization,
        handlers::programs::list_programs,
        handlers::programs::create_program,
        // Public
        handlers::public::get_leaderboard,
        handlers::public::get_stats,
        // Back-office
        handlers::invitations::create_invitation,
        handlers::invitations::list_invitations,
        handlers::invitations::resend_invitation,
        handlers::invitations::cancel_invitation,
        handlers::invitations::accept_invitation,
        handlers::verification_requests::create_verification_request,
        handlers::verification_requests::list_verification_requests,
        handlers::verification_requests::assign_verification_request,
        handlers::verification_requests::process_verification_request,
        handlers::workflows::create_workflow,
        handlers::workflows::list_workflows,
        handlers::workflows::get_workflow,
        handlers::workflows::update_workflow,
        handlers::workflows::delete_workflow,
        handlers::workflows::run_workflow,
    ),
    components(schemas(
        error::ErrorResponse,
        models::ParseRequest,
        models::ParseResponse,
        models::PreviewResponse,
        models::UploadResponse,
        models::BatchCreateRequest,
        models::BatchImportReport,
        models::BatchItemError,
        models::Organization,
        models::OrganizationDetail,
        models::CreateOrganizationRequest,
        models::CreatedOrganization,
        models::UpdateOrganizationRequest,
        models::VerificationLevel,
        models::Program,
        models::NewProgram,
        models::Metric,
        models::NewMetric,
        models::Partner,
        models::NewPartner,
        models::LeaderboardEntry,
        models::PlatformStats,
        models::SectorCount,
        models::Invitation,
        models::InvitationStatus,
        models::CreateInvitationRequest,
        models::VerificationRequest,
        models::VerificationStatus,
        models::CreateVerificationRequest,
        models::AssignVerificationRequest,
        models::ProcessVerificationRequest,
        models::VerificationDecision,
        models::Workflow,
        models::WorkflowStep,
        models::WorkflowAction,
        models::ConditionField,
        models::ConditionOperator,
        models::CreateWorkflowRequest,
        models::UpdateWorkflowRequest,
        impacts_core::WorkflowRun,
        impacts_core::RunOutcome,
        handlers::ingest::UploadForm,
        handlers::organizations::OrganizationListResponse,
        handlers::invitations::AcceptInvitationRequest,
        handlers::workflows::RunWorkflowRequest,
    )),
    modifiers(&AdminKeyAddon),
    tags(
        (name = "ingest", description = "Parse, preview, upload and batch-create organizations"),
        (name = "organizations", description = "Organization management"),
        (name = "programs", description = "Programs owned by an organization"),
        (name = "public", description = "Leaderboard and platform statistics"),
        (name = "invitations", description = "Admin invitations"),
        (name = "verification", description = "Verification review queue"),
        (name = "workflows", description = "Admin automation over organizations"),
    )
)]
pub struct ApiDoc;
