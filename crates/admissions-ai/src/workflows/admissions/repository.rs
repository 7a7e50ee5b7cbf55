use serde::Serialize;

use super::assessment::assess_risk;
use super::decision::{CommitError, DecisionCommit};
use super::domain::{ApplicationId, ApplicationRecord};

/// Storage abstraction so the service can be exercised in isolation.
///
/// Implementations must keep the timeline append-only: `commit_decision` appends one
/// entry and updates the status in the same write, and nothing rewrites earlier
/// entries.
pub trait ApplicationRepository: Send + Sync {
    fn insert(&self, record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError>;
    fn fetch(&self, id: ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError>;
    fn all(&self) -> Result<Vec<ApplicationRecord>, RepositoryError>;
    /// Apply the commit atomically, failing with `Rejected` when the stored timeline no
    /// longer has the length the commit was planned against.
    fn commit_decision(
        &self,
        commit: &DecisionCommit,
    ) -> Result<ApplicationRecord, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
    #[error("decision commit rejected: {0}")]
    Rejected(#[from] CommitError),
}

impl RepositoryError {
    /// Failures that a fresh read and another attempt can clear.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            RepositoryError::Unavailable(_)
                | RepositoryError::Rejected(CommitError::StaleTimeline { .. })
        )
    }
}

impl ApplicationRecord {
    pub fn status_view(&self) -> ApplicationStatusView {
        let assessment = assess_risk(self);
        let latest = self.latest_decision();

        ApplicationStatusView {
            application_id: self.id,
            status: self.status().label(),
            recommendation: assessment.decision_recommendation.copy,
            risk_flagged: !assessment.header_badges.is_empty(),
            decision_note: latest.and_then(|entry| entry.note.clone()),
        }
    }
}

/// Compact status payload for API responses and CLI output.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationStatusView {
    pub application_id: ApplicationId,
    pub status: &'static str,
    pub recommendation: &'static str,
    pub risk_flagged: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decision_note: Option<String>,
}
