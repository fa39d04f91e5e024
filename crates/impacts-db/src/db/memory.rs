//! In-process repositories
//!
//! One [`MemoryStore`] backs every repository trait so that deleting an
//! organization can remove what it owns. State sits behind a single
//! `tokio::sync::RwLock`; nothing survives a restart.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use impacts_core::models::{
    CreateOrganizationRequest, CreateWorkflowRequest, Invitation, InvitationStatus,
    LeaderboardEntry, LeaderboardQuery, Metric, NewProgram, Organization, OrganizationDetail,
    OrganizationFilter, Partner, PlatformStats, Program, UpdateOrganizationRequest,
    UpdateWorkflowRequest, VerificationLevel, VerificationRequest, VerificationStatus, Workflow,
};

use super::invitation::InvitationRepository;
use super::organization::OrganizationRepository;
use super::program::ProgramRepository;
use super::verification::VerificationRepository;
use super::workflow::WorkflowRepository;

#[derive(Default)]
struct MemoryState {
    organizations: HashMap<Uuid, Organization>,
    programs: Vec<Program>,
    metrics: Vec<Metric>,
    partners: Vec<Partner>,
    invitations: HashMap<Uuid, Invitation>,
    verification_requests: HashMap<Uuid, VerificationRequest>,
    workflows: HashMap<Uuid, Workflow>,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn page<T>(items: Vec<T>, limit: i64, offset: i64) -> Vec<T> {
    items
        .into_iter()
        .skip(offset.max(0) as usize)
        .take(limit.max(0) as usize)
        .collect()
}

fn filtered(state: &MemoryState, filter: &OrganizationFilter) -> Vec<Organization> {
    let mut rows: Vec<Organization> = state
        .organizations
        .values()
        .filter(|org| filter.matches(org))
        .cloned()
        .collect();
    rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
    rows
}

#[async_trait]
impl OrganizationRepository for MemoryStore {
    async fn create(&self, request: CreateOrganizationRequest) -> Result<Organization> {
        let now = Utc::now();
        let id = Uuid::new_v4();
        let org = Organization {
            id,
            name: request.name,
            sector: request.sector,
            region: request.region,
            website: request.website,
            contact_info: request.contact_info,
            contact_email: request.contact_email,
            mission: request.mission,
            description: request.description,
            impact_score: request.impact_score,
            impact_grade: request.impact_grade,
            verification_level: request.verification_level,
            founding_year: request.founding_year,
            employee_count: request.employee_count,
            program_count: request.program_count,
            beneficiary_count: request.beneficiary_count,
            annual_budget: request.annual_budget,
            summary: request.summary,
            created_at: now,
            updated_at: now,
        };

        let mut state = self.state.write().await;
        state.programs.extend(
            request
                .programs
                .into_iter()
                .map(|p| p.into_program(id, now)),
        );
        state
            .metrics
            .extend(request.metrics.into_iter().map(|m| m.into_metric(id)));
        state
            .partners
            .extend(request.partners.into_iter().map(|p| p.into_partner(id)));
        state.organizations.insert(id, org.clone());
        Ok(org)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Organization>> {
        Ok(self.state.read().await.organizations.get(&id).cloned())
    }

    async fn get_detail(&self, id: Uuid) -> Result<Option<OrganizationDetail>> {
        let state = self.state.read().await;
        let Some(organization) = state.organizations.get(&id).cloned() else {
            return Ok(None);
        };
        Ok(Some(OrganizationDetail {
            organization,
            programs: state
                .programs
                .iter()
                .filter(|p| p.organization_id == id)
                .cloned()
                .collect(),
            metrics: state
                .metrics
                .iter()
                .filter(|m| m.organization_id == id)
                .cloned()
                .collect(),
            partners: state
                .partners
                .iter()
                .filter(|p| p.organization_id == id)
                .cloned()
                .collect(),
        }))
    }

    async fn list(&self, filter: &OrganizationFilter) -> Result<Vec<Organization>> {
        let state = self.state.read().await;
        Ok(page(filtered(&state, filter), filter.limit, filter.offset))
    }

    async fn count(&self, filter: &OrganizationFilter) -> Result<i64> {
        let state = self.state.read().await;
        Ok(state
            .organizations
            .values()
            .filter(|org| filter.matches(org))
            .count() as i64)
    }

    async fn update(
        &self,
        id: Uuid,
        update: &UpdateOrganizationRequest,
    ) -> Result<Option<Organization>> {
        let mut state = self.state.write().await;
        Ok(state.organizations.get_mut(&id).map(|org| {
            update.apply_to(org);
            org.updated_at = Utc::now();
            org.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let mut state = self.state.write().await;
        if state.organizations.remove(&id).is_none() {
            return Ok(false);
        }
        state.programs.retain(|p| p.organization_id != id);
        state.metrics.retain(|m| m.organization_id != id);
        state.partners.retain(|p| p.organization_id != id);
        state
            .verification_requests
            .retain(|_, r| r.organization_id != id);
        for invitation in state.invitations.values_mut() {
            if invitation.organization_id == Some(id) {
                invitation.organization_id = None;
            }
        }
        Ok(true)
    }

    async fn leaderboard(&self, query: &LeaderboardQuery) -> Result<Vec<LeaderboardEntry>> {
        let filter = OrganizationFilter {
            sector: query.sector.clone(),
            region: query.region.clone(),
            ..Default::default()
        };
        let state = self.state.read().await;
        let mut rows: Vec<&Organization> = state
            .organizations
            .values()
            .filter(|org| filter.matches(org))
            .collect();
        rows.sort_by(|a, b| {
            b.impact_score
                .cmp(&a.impact_score)
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(rows
            .into_iter()
            .take(query.limit.max(0) as usize)
            .enumerate()
            .map(|(i, org)| LeaderboardEntry::from_organization(i as i64 + 1, org))
            .collect())
    }

    async fn stats(&self) -> Result<PlatformStats> {
        let state = self.state.read().await;
        Ok(PlatformStats::from_organizations(
            state.organizations.values(),
        ))
    }
}

#[async_trait]
impl ProgramRepository for MemoryStore {
    async fn list_for_organization(&self, organization_id: Uuid) -> Result<Vec<Program>> {
        let state = self.state.read().await;
        Ok(state
            .programs
            .iter()
            .filter(|p| p.organization_id == organization_id)
            .cloned()
            .collect())
    }

    async fn create(&self, organization_id: Uuid, program: NewProgram) -> Result<Option<Program>> {
        let now = Utc::now();
        let mut state = self.state.write().await;
        let Some(org) = state.organizations.get_mut(&organization_id) else {
            return Ok(None);
        };
        let program = program.into_program(organization_id, now);
        org.program_count = org.program_count.saturating_add(1);
        org.beneficiary_count = org.beneficiary_count.saturating_add(program.people_reached);
        org.updated_at = now;
        state.programs.push(program.clone());
        Ok(Some(program))
    }
}

#[async_trait]
impl InvitationRepository for MemoryStore {
    async fn create(&self, invitation: &Invitation) -> Result<Invitation> {
        let mut state = self.state.write().await;
        state.invitations.insert(invitation.id, invitation.clone());
        Ok(invitation.clone())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Invitation>> {
        Ok(self.state.read().await.invitations.get(&id).cloned())
    }

    async fn list(
        &self,
        status: Option<InvitationStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Invitation>> {
        let state = self.state.read().await;
        let mut rows: Vec<Invitation> = state
            .invitations
            .values()
            .filter(|i| status.map_or(true, |s| i.status == s))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(page(rows, limit, offset))
    }

    async fn save(&self, invitation: &Invitation) -> Result<Option<Invitation>> {
        let mut state = self.state.write().await;
        Ok(state.invitations.get_mut(&invitation.id).map(|stored| {
            stored.status = invitation.status;
            stored.token = invitation.token.clone();
            stored.expires_at = invitation.expires_at;
            stored.updated_at = invitation.updated_at;
            stored.clone()
        }))
    }
}

#[async_trait]
impl VerificationRepository for MemoryStore {
    async fn create(
        &self,
        organization_id: Uuid,
        request_type: VerificationLevel,
    ) -> Result<VerificationRequest> {
        let now = Utc::now();
        let request = VerificationRequest {
            id: Uuid::new_v4(),
            organization_id,
            request_type,
            status: VerificationStatus::Pending,
            assigned_to: None,
            review_notes: String::new(),
            created_at: now,
            updated_at: now,
        };
        let mut state = self.state.write().await;
        state
            .verification_requests
            .insert(request.id, request.clone());
        Ok(request)
    }

    async fn get(&self, id: Uuid) -> Result<Option<VerificationRequest>> {
        Ok(self
            .state
            .read()
            .await
            .verification_requests
            .get(&id)
            .cloned())
    }

    async fn list(
        &self,
        status: Option<VerificationStatus>,
        organization_id: Option<Uuid>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<VerificationRequest>> {
        let state = self.state.read().await;
        let mut rows: Vec<VerificationRequest> = state
            .verification_requests
            .values()
            .filter(|r| status.map_or(true, |s| r.status == s))
            .filter(|r| organization_id.map_or(true, |id| r.organization_id == id))
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(page(rows, limit, offset))
    }

    async fn assign(&self, id: Uuid, assigned_to: &str) -> Result<Option<VerificationRequest>> {
        let mut state = self.state.write().await;
        Ok(state.verification_requests.get_mut(&id).map(|request| {
            if request.assigned_to.as_deref() != Some(assigned_to) {
                request.assigned_to = Some(assigned_to.to_string());
                request.updated_at = Utc::now();
            }
            request.clone()
        }))
    }

    async fn decide(
        &self,
        id: Uuid,
        status: VerificationStatus,
        review_notes: &str,
    ) -> Result<Option<VerificationRequest>> {
        let mut state = self.state.write().await;
        Ok(state
            .verification_requests
            .get_mut(&id)
            .filter(|r| r.status == VerificationStatus::Pending)
            .map(|request| {
                request.status = status;
                request.review_notes = review_notes.to_string();
                request.updated_at = Utc::now();
                request.clone()
            }))
    }
}

#[async_trait]
impl WorkflowRepository for MemoryStore {
    async fn create(&self, request: CreateWorkflowRequest) -> Result<Workflow> {
        let now = Utc::now();
        let workflow = Workflow {
            id: Uuid::new_v4(),
            name: request.name.trim().to_string(),
            description: request.description,
            steps: request.steps,
            active: request.active,
            created_at: now,
            updated_at: now,
        };
        let mut state = self.state.write().await;
        state.workflows.insert(workflow.id, workflow.clone());
        Ok(workflow)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Workflow>> {
        Ok(self.state.read().await.workflows.get(&id).cloned())
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Workflow>> {
        let state = self.state.read().await;
        let mut rows: Vec<Workflow> = state.workflows.values().cloned().collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(page(rows, limit, offset))
    }

    async fn update(&self, id: Uuid, update: UpdateWorkflowRequest) -> Result<Option<Workflow>> {
        let mut state = self.state.write().await;
        Ok(state.workflows.get_mut(&id).map(|workflow| {
            let mut update = update;
            if let Some(name) = update.name.as_mut() {
                *name = name.trim().to_string();
            }
            update.apply_to(workflow);
            workflow.updated_at = Utc::now();
            workflow.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        Ok(self.state.write().await.workflows.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use impacts_core::models::{NewMetric, NewPartner};

    fn request(name: &str, sector: &str, score: i32) -> CreateOrganizationRequest {
        CreateOrganizationRequest {
            name: name.to_string(),
            sector: sector.to_string(),
            region: "ON".to_string(),
            impact_score: score,
            impact_grade: "N/A".to_string(),
            founding_year: 2001,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn create_with_children_and_cascade_delete() {
        let store = MemoryStore::new();
        let mut req = request("Literacy First", "Education", 70);
        req.programs = vec![NewProgram {
            name: "Tutoring".to_string(),
            people_reached: 40,
            ..Default::default()
        }];
        req.metrics = vec![NewMetric {
            name: "Graduation".to_string(),
            ..Default::default()
        }];
        req.partners = vec![NewPartner {
            name: "School board".to_string(),
            role: "Host".to_string(),
        }];
        let org = OrganizationRepository::create(&store, req).await.unwrap();

        let detail = store.get_detail(org.id).await.unwrap().unwrap();
        assert_eq!(detail.programs.len(), 1);
        assert_eq!(detail.metrics.len(), 1);
        assert_eq!(detail.partners.len(), 1);

        let verification = VerificationRepository::create(&store, org.id, VerificationLevel::Verified)
            .await
            .unwrap();

        assert!(OrganizationRepository::delete(&store, org.id).await.unwrap());
        assert!(store.get_detail(org.id).await.unwrap().is_none());
        assert!(store.list_for_organization(org.id).await.unwrap().is_empty());
        assert!(VerificationRepository::get(&store, verification.id)
            .await
            .unwrap()
            .is_none());
        assert!(!OrganizationRepository::delete(&store, org.id).await.unwrap());
    }

    #[tokio::test]
    async fn list_filters_and_pages() {
        let store = MemoryStore::new();
        for i in 0..5 {
            OrganizationRepository::create(&store, request(&format!("Health {i}"), "Health", 50))
                .await
                .unwrap();
        }
        OrganizationRepository::create(&store, request("Books", "Education", 50))
            .await
            .unwrap();

        let filter = OrganizationFilter {
            sector: Some("health".to_string()),
            limit: 2,
            offset: 0,
            ..Default::default()
        };
        assert_eq!(OrganizationRepository::list(&store, &filter).await.unwrap().len(), 2);
        assert_eq!(store.count(&filter).await.unwrap(), 5);

        let last_page = OrganizationFilter {
            offset: 4,
            ..filter
        };
        assert_eq!(
            OrganizationRepository::list(&store, &last_page)
                .await
                .unwrap()
                .len(),
            1
        );
    }

    #[tokio::test]
    async fn leaderboard_ranks_by_score_then_name() {
        let store = MemoryStore::new();
        OrganizationRepository::create(&store, request("Beta", "Health", 80))
            .await
            .unwrap();
        OrganizationRepository::create(&store, request("Alpha", "Health", 80))
            .await
            .unwrap();
        OrganizationRepository::create(&store, request("Gamma", "Education", 95))
            .await
            .unwrap();

        let all = store
            .leaderboard(&LeaderboardQuery {
                limit: 10,
                ..Default::default()
            })
            .await
            .unwrap();
        let names: Vec<&str> = all.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["Gamma", "Alpha", "Beta"]);
        assert_eq!(all[2].rank, 3);

        let health = store
            .leaderboard(&LeaderboardQuery {
                sector: Some("Health".to_string()),
                limit: 1,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(health.len(), 1);
        assert_eq!(health[0].name, "Alpha");
    }

    #[tokio::test]
    async fn program_create_updates_counters() {
        let store = MemoryStore::new();
        let org = OrganizationRepository::create(&store, request("Food Bank", "Food", 40))
            .await
            .unwrap();
        let program = ProgramRepository::create(
            &store,
            org.id,
            NewProgram {
                name: "Pantry".to_string(),
                people_reached: 250,
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
        assert_eq!(program.status, "active");

        let org = OrganizationRepository::get(&store, org.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(org.program_count, 1);
        assert_eq!(org.beneficiary_count, 250);

        assert!(ProgramRepository::create(&store, Uuid::new_v4(), NewProgram::default())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn program_reach_counter_saturates() {
        let store = MemoryStore::new();
        let org = OrganizationRepository::create(&store, request("Big Reach", "Health", 10))
            .await
            .unwrap();
        for name in ["First", "Second"] {
            ProgramRepository::create(
                &store,
                org.id,
                NewProgram {
                    name: name.to_string(),
                    people_reached: i64::MAX,
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        }
        let org = OrganizationRepository::get(&store, org.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(org.program_count, 2);
        assert_eq!(org.beneficiary_count, i64::MAX);
    }

    #[tokio::test]
    async fn verification_assign_is_idempotent_and_decide_once() {
        let store = MemoryStore::new();
        let request = VerificationRepository::create(&store, Uuid::new_v4(), VerificationLevel::Audited)
            .await
            .unwrap();

        let first = store.assign(request.id, "reviewer-1").await.unwrap().unwrap();
        let second = store.assign(request.id, "reviewer-1").await.unwrap().unwrap();
        assert_eq!(first.updated_at, second.updated_at);
        assert_eq!(second.assigned_to.as_deref(), Some("reviewer-1"));

        let decided = store
            .decide(request.id, VerificationStatus::Approved, "checked filings")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(decided.status, VerificationStatus::Approved);
        assert!(store
            .decide(request.id, VerificationStatus::Rejected, "")
            .await
            .unwrap()
            .is_none());
    }
}
