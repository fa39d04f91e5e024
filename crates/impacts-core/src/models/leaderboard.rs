//! Read models for the public leaderboard and platform statistics.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::organization::{Organization, VerificationLevel};

/// Default and maximum number of leaderboard rows
pub const DEFAULT_LEADERBOARD_SIZE: i64 = 10;
pub const MAX_LEADERBOARD_SIZE: i64 = 100;

#[derive(Debug, Clone, Default)]
pub struct LeaderboardQuery {
    pub sector: Option<String>,
    pub region: Option<String>,
    pub limit: i64,
}

/// Ranked organization; `rank` is 1-based
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub rank: i64,
    pub id: Uuid,
    pub name: String,
    pub sector: String,
    pub region: String,
    pub impact_score: i32,
    pub impact_grade: String,
    pub verification_level: VerificationLevel,
    pub beneficiary_count: i64,
}

impl LeaderboardEntry {
    pub fn from_organization(rank: i64, org: &Organization) -> Self {
        Self {
            rank,
            id: org.id,
            name: org.name.clone(),
            sector: org.sector.clone(),
            region: org.region.clone(),
            impact_score: org.impact_score,
            impact_grade: org.impact_grade.clone(),
            verification_level: org.verification_level,
            beneficiary_count: org.beneficiary_count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct SectorCount {
    pub sector: String,
    pub count: i64,
}

/// Aggregate figures shown on the public landing page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlatformStats {
    pub total_organizations: i64,
    /// Organizations at `verified` or `audited`
    pub verified_organizations: i64,
    pub average_impact_score: f64,
    pub total_beneficiaries: i64,
    pub sectors: Vec<SectorCount>,
}

impl PlatformStats {
    /// Compute stats from a full organization scan. Sectors sort by count then name.
    pub fn from_organizations<'a>(orgs: impl IntoIterator<Item = &'a Organization>) -> Self {
        let mut total = 0i64;
        let mut verified = 0i64;
        let mut score_sum = 0i64;
        let mut beneficiaries = 0i64;
        let mut sectors: std::collections::BTreeMap<String, i64> = Default::default();
        for org in orgs {
            total += 1;
            if org.verification_level != VerificationLevel::SelfReported {
                verified += 1;
            }
            score_sum = score_sum.saturating_add(i64::from(org.impact_score));
            beneficiaries = beneficiaries.saturating_add(org.beneficiary_count);
            *sectors.entry(org.sector.clone()).or_default() += 1;
        }
        let mut sectors: Vec<SectorCount> = sectors
            .into_iter()
            .map(|(sector, count)| SectorCount { sector, count })
            .collect();
        sectors.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.sector.cmp(&b.sector)));
        PlatformStats {
            total_organizations: total,
            verified_organizations: verified,
            average_impact_score: if total == 0 {
                0.0
            } else {
                score_sum as f64 / total as f64
            },
            total_beneficiaries: beneficiaries,
            sectors,
        }
    }
}
