//! Domain route groups (ingestion, organizations, back-office).

use crate::constants::API_PREFIX;
use crate::handlers;
use crate::state::AppState;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;

/// Leaderboard, statistics and invitation acceptance
pub fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/leaderboard", API_PREFIX),
            get(handlers::public::get_leaderboard),
        )
        .route(&format!("{}/stats", API_PREFIX), get(handlers::public::get_stats))
        .route(
            &format!("{}/invitations/{{id}}/accept", API_PREFIX),
            post(handlers::invitations::accept_invitation),
        )
}

pub fn ingest_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/organizations/parse", API_PREFIX),
            post(handlers::ingest::parse_organization),
        )
        .route(
            &format!("{}/organizations/preview", API_PREFIX),
            post(handlers::ingest::preview_organization),
        )
        .route(
            &format!("{}/organizations/upload", API_PREFIX),
            post(handlers::ingest::upload_organization_file),
        )
        .route(
            &format!("{}/organizations/batch", API_PREFIX),
            post(handlers::ingest::batch_create_organizations),
        )
}

pub fn organization_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/organizations", API_PREFIX),
            get(handlers::organizations::list_organizations)
                .post(handlers::organizations::create_organization),
        )
        .route(
            &format!("{}/organizations/{{id}}", API_PREFIX),
            get(handlers::organizations::get_organization)
                .put(handlers::organizations::update_organization)
                .delete(handlers::organizations::delete_organization),
        )
        .route(
            &format!("{}/organizations/{{id}}/programs", API_PREFIX),
            get(handlers::programs::list_programs).post(handlers::programs::create_program),
        )
}

pub fn invitation_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/invitations", API_PREFIX),
            get(handlers::invitations::list_invitations)
                .post(handlers::invitations::create_invitation),
        )
        .route(
            &format!("{}/invitations/{{id}}/resend", API_PREFIX),
            post(handlers::invitations::resend_invitation),
        )
        .route(
            &format!("{}/invitations/{{id}}/cancel", API_PREFIX),
            post(handlers::invitations::cancel_invitation),
        )
}

pub fn verification_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/verification-requests", API_PREFIX),
            get(handlers::verification_requests::list_verification_requests)
                .post(handlers::verification_requests::create_verification_request),
        )
        .route(
            &format!("{}/verification-requests/{{id}}/assign", API_PREFIX),
            post(handlers::verification_requests::assign_verification_request),
        )
        .route(
            &format!("{}/verification-requests/{{id}}/process", API_PREFIX),
            post(handlers::verification_requests::process_verification_request),
        )
}

pub fn workflow_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/workflows", API_PREFIX),
            get(handlers::workflows::list_workflows).post(handlers::workflows::create_workflow),
        )
        .route(
            &format!("{}/workflows/{{id}}", API_PREFIX),
            get(handlers::workflows::get_workflow)
                .put(handlers::workflows::update_workflow)
                .delete(handlers::workflows::delete_workflow),
        )
        .route(
            &format!("{}/workflows/{{id}}/run", API_PREFIX),
            post(handlers::workflows::run_workflow),
        )
}
