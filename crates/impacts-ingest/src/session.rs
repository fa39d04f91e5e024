//! Human-in-the-loop import of a single organization.
//!
//! ```text
//! Empty -> Parsed -> Previewed <-> Editing
//!                       |
//!                       +-> Submitted | Discarded
//! ```
//!
//! A fresh parse is the only way back to `Parsed` and is allowed from any
//! state, terminal ones included. A parse that fails leaves the session as it
//! was.

use std::fmt;

use impacts_core::models::{CreateOrganizationRequest, CreatedOrganization};
use serde_json::Value;
use validator::Validate;

use crate::error::IngestError;
use crate::form::OrganizationForm;
use crate::gateway::PersistenceGateway;
use crate::mapper::map_value;
use crate::parser::parse_json;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Empty,
    Parsed,
    Previewed,
    Editing,
    Submitted,
    Discarded,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Empty => "empty",
            SessionState::Parsed => "parsed",
            SessionState::Previewed => "previewed",
            SessionState::Editing => "editing",
            SessionState::Submitted => "submitted",
            SessionState::Discarded => "discarded",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Submitted | SessionState::Discarded)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One in-flight candidate and where it is in the review flow.
#[derive(Debug)]
pub struct ImportSession {
    state: SessionState,
    current_year: i32,
    parsed: Option<Value>,
    candidate: Option<CreateOrganizationRequest>,
    form: Option<OrganizationForm>,
    created: Option<CreatedOrganization>,
}

impl ImportSession {
    /// `current_year` fills missing years during mapping.
    pub fn new(current_year: i32) -> Self {
        Self {
            state: SessionState::Empty,
            current_year,
            parsed: None,
            candidate: None,
            form: None,
            created: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn parsed(&self) -> Option<&Value> {
        self.parsed.as_ref()
    }

    pub fn candidate(&self) -> Option<&CreateOrganizationRequest> {
        self.candidate.as_ref()
    }

    pub fn form(&self) -> Option<&OrganizationForm> {
        self.form.as_ref()
    }

    /// Result of the last successful approval
    pub fn created(&self) -> Option<&CreatedOrganization> {
        self.created.as_ref()
    }

    fn require(&self, operation: &'static str, expected: SessionState) -> Result<(), IngestError> {
        if self.state != expected {
            return Err(IngestError::InvalidState {
                operation,
                state: self.state,
            });
        }
        Ok(())
    }

    /// Parse raw text, replacing whatever the session held.
    pub fn parse(&mut self, raw: &str) -> Result<&Value, IngestError> {
        let value = parse_json(raw)?;
        self.state = SessionState::Parsed;
        self.candidate = None;
        self.form = None;
        self.created = None;
        Ok(self.parsed.insert(value))
    }

    /// Map the parsed value into a candidate and show it read-only.
    pub fn preview(&mut self) -> Result<&CreateOrganizationRequest, IngestError> {
        self.require("preview", SessionState::Parsed)?;
        let value = self.parsed.as_ref().ok_or(IngestError::InvalidState {
            operation: "preview",
            state: self.state,
        })?;
        let candidate = map_value(value, self.current_year)?;
        self.state = SessionState::Previewed;
        Ok(self.candidate.insert(candidate))
    }

    /// Open the editable form, seeded from the candidate.
    pub fn edit(&mut self) -> Result<&mut OrganizationForm, IngestError> {
        self.require("edit", SessionState::Previewed)?;
        let candidate = self.candidate.as_ref().ok_or(IngestError::InvalidState {
            operation: "edit",
            state: self.state,
        })?;
        let form = OrganizationForm::from_candidate(candidate);
        self.state = SessionState::Editing;
        Ok(self.form.insert(form))
    }

    /// Validate the form and merge it into the candidate.
    ///
    /// On validation failure the session stays in `Editing` with the form kept,
    /// so the operator can correct it.
    pub fn save(&mut self) -> Result<&CreateOrganizationRequest, IngestError> {
        self.require("save", SessionState::Editing)?;
        let form = self
            .form
            .take()
            .ok_or(IngestError::InvalidState {
                operation: "save",
                state: self.state,
            })?
            .normalized();
        if let Err(errors) = form.validate() {
            self.form = Some(form);
            return Err(errors.into());
        }
        let candidate = self.candidate.get_or_insert_with(Default::default);
        form.merge_into(candidate);
        self.state = SessionState::Previewed;
        Ok(candidate)
    }

    /// Leave the form without saving.
    pub fn cancel_edit(&mut self) -> Result<(), IngestError> {
        self.require("cancel editing", SessionState::Editing)?;
        self.form = None;
        self.state = SessionState::Previewed;
        Ok(())
    }

    /// Re-validate the candidate and hand it to `gateway`.
    ///
    /// Gateway failures keep the session in `Previewed` so the operator can
    /// retry by hand.
    pub async fn approve(
        &mut self,
        gateway: &dyn PersistenceGateway,
    ) -> Result<&CreatedOrganization, IngestError> {
        self.require("approve", SessionState::Previewed)?;
        let candidate = self.candidate.as_ref().ok_or(IngestError::InvalidState {
            operation: "approve",
            state: self.state,
        })?;
        OrganizationForm::from_candidate(candidate)
            .normalized()
            .validate()?;

        let created = match gateway.create_organization(candidate).await {
            Ok(created) => created,
            Err(e) => {
                tracing::warn!(error = %e, name = %candidate.name, "Organization create failed");
                return Err(e.into());
            }
        };
        tracing::info!(id = %created.id, name = %created.name, "Organization imported");

        self.parsed = None;
        self.candidate = None;
        self.state = SessionState::Submitted;
        Ok(self.created.insert(created))
    }

    /// Drop the candidate. Allowed from any non-terminal state.
    pub fn discard(&mut self) -> Result<(), IngestError> {
        if self.state.is_terminal() {
            return Err(IngestError::InvalidState {
                operation: "discard",
                state: self.state,
            });
        }
        self.parsed = None;
        self.candidate = None;
        self.form = None;
        self.state = SessionState::Discarded;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::GatewayError;
    use async_trait::async_trait;
    use impacts_core::models::BatchImportReport;
    use std::sync::Mutex;
    use uuid::Uuid;

    #[derive(Default)]
    struct RecordingGateway {
        created: Mutex<Vec<CreateOrganizationRequest>>,
        fail: bool,
    }

    #[async_trait]
    impl PersistenceGateway for RecordingGateway {
        async fn create_organization(
            &self,
            candidate: &CreateOrganizationRequest,
        ) -> Result<CreatedOrganization, GatewayError> {
            if self.fail {
                return Err(GatewayError::Rejected {
                    status: 500,
                    message: "boom".to_string(),
                });
            }
            self.created.lock().unwrap().push(candidate.clone());
            Ok(CreatedOrganization {
                id: Uuid::new_v4(),
                name: candidate.name.clone(),
            })
        }

        async fn create_batch(&self, _items: &[Value]) -> Result<BatchImportReport, GatewayError> {
            Ok(BatchImportReport::default())
        }
    }

    const MINIMAL: &str = r#"{"name":"A","sector":"Education","region":"ON"}"#;

    #[test]
    fn parse_then_preview() {
        let mut session = ImportSession::new(2025);
        session.parse(MINIMAL).unwrap();
        assert_eq!(session.state(), SessionState::Parsed);
        let candidate = session.preview().unwrap();
        assert_eq!(candidate.name, "A");
        assert_eq!(candidate.impact_score, 0);
        assert_eq!(candidate.impact_grade, "N/A");
        assert_eq!(session.state(), SessionState::Previewed);
    }

    #[test]
    fn failed_parse_keeps_state() {
        let mut session = ImportSession::new(2025);
        assert!(session.parse("{oops").is_err());
        assert_eq!(session.state(), SessionState::Empty);

        session.parse(MINIMAL).unwrap();
        session.preview().unwrap();
        assert!(session.parse("[1,").is_err());
        assert_eq!(session.state(), SessionState::Previewed);
        assert_eq!(session.candidate().unwrap().name, "A");
    }

    #[test]
    fn array_cannot_be_previewed() {
        let mut session = ImportSession::new(2025);
        session.parse("[]").unwrap();
        assert!(matches!(session.preview(), Err(IngestError::NotAnObject)));
        assert_eq!(session.state(), SessionState::Parsed);
    }

    #[test]
    fn invalid_edit_is_rejected_and_kept() {
        let mut session = ImportSession::new(2025);
        session.parse(MINIMAL).unwrap();
        session.preview().unwrap();
        session.edit().unwrap().impact_score = 150;
        let err = session.save().unwrap_err();
        assert_eq!(err.invalid_fields(), vec!["impact_score".to_string()]);
        assert_eq!(session.state(), SessionState::Editing);
        assert_eq!(session.form().unwrap().impact_score, 150);
        assert_eq!(session.candidate().unwrap().impact_score, 0);
    }

    #[test]
    fn edit_cycle() {
        let mut session = ImportSession::new(2025);
        session.parse(MINIMAL).unwrap();
        session.preview().unwrap();

        session.edit().unwrap().impact_score = 72;
        assert_eq!(session.save().unwrap().impact_score, 72);
        assert_eq!(session.state(), SessionState::Previewed);

        session.edit().unwrap().name = "Changed".to_string();
        session.cancel_edit().unwrap();
        assert_eq!(session.candidate().unwrap().name, "A");
    }

    #[test]
    fn wrong_state_operations_fail() {
        let mut session = ImportSession::new(2025);
        assert!(matches!(
            session.preview(),
            Err(IngestError::InvalidState { .. })
        ));
        assert!(session.edit().is_err());
        assert!(session.save().is_err());
        session.discard().unwrap();
        assert_eq!(session.state(), SessionState::Discarded);
        assert!(session.discard().is_err());

        session.parse(MINIMAL).unwrap();
        assert_eq!(session.state(), SessionState::Parsed);
    }

    #[tokio::test]
    async fn approve_submits_and_clears() {
        let gateway = RecordingGateway::default();
        let mut session = ImportSession::new(2025);
        session.parse(MINIMAL).unwrap();
        session.preview().unwrap();
        let created = session.approve(&gateway).await.unwrap();
        assert_eq!(created.name, "A");
        assert_eq!(session.state(), SessionState::Submitted);
        assert!(session.candidate().is_none());
        assert_eq!(gateway.created.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn approve_revalidates() {
        let gateway = RecordingGateway::default();
        let mut session = ImportSession::new(2025);
        session
            .parse(r#"{"name":"A","sector":"Education","region":"ON","impact_score":150}"#)
            .unwrap();
        session.preview().unwrap();
        assert!(matches!(
            session.approve(&gateway).await,
            Err(IngestError::Validation(_))
        ));
        assert!(gateway.created.lock().unwrap().is_empty());
        assert_eq!(session.state(), SessionState::Previewed);
    }

    #[tokio::test]
    async fn gateway_failure_is_recoverable() {
        let gateway = RecordingGateway {
            fail: true,
            ..Default::default()
        };
        let mut session = ImportSession::new(2025);
        session.parse(MINIMAL).unwrap();
        session.preview().unwrap();
        match session.approve(&gateway).await {
            Err(IngestError::Gateway(e)) => {
                assert_eq!(e.client_message(), "Failed to create organization")
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert_eq!(session.state(), SessionState::Previewed);
        assert!(session.candidate().is_some());
    }
}
