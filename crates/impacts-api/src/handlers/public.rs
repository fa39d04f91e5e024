//! Public read endpoints: leaderboard and platform statistics.

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Json},
};
use impacts_core::models::{LeaderboardEntry, PlatformStats};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;

use crate::error::HttpAppError;
use crate::state::AppState;

#[derive(Debug, Deserialize, IntoParams)]
pub struct LeaderboardParams {
    pub sector: Option<String>,
    pub region: Option<String>,
    /// Number of rows, 1 to 100 (default 10)
    pub limit: Option<i64>,
}

/// Organizations ranked by impact score
#[utoipa::path(
    get,
    path = "/api/leaderboard",
    params(LeaderboardParams),
    responses(
        (status = 200, description = "Ranked organizations", body = Vec<LeaderboardEntry>)
    ),
    tag = "public"
)]
#[tracing::instrument(skip(state))]
pub async fn get_leaderboard(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LeaderboardParams>,
) -> Result<impl IntoResponse, HttpAppError> {
    let entries = state
        .organizations
        .leaderboard(params.sector, params.region, params.limit)
        .await?;
    Ok(Json(entries))
}

#[utoipa::path(
    get,
    path = "/api/stats",
    responses(
        (status = 200, description = "Platform totals", body = PlatformStats)
    ),
    tag = "public"
)]
pub async fn get_stats(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    Ok(Json(state.organizations.stats().await?))
}
