use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::validation::ValidationError;

/// Event text recorded when an application first enters the review queue.
pub const SUBMITTED_EVENT: &str = "Application Submitted";

const DECISION_EVENT_PREFIX: &str = "Decision: ";

/// Positive integer identifier for an admission application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct ApplicationId(u64);

impl ApplicationId {
    pub fn new(raw: u64) -> Result<Self, ValidationError> {
        if raw == 0 {
            return Err(ValidationError::InvalidApplicationId(raw.to_string()));
        }
        Ok(Self(raw))
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl TryFrom<u64> for ApplicationId {
    type Error = ValidationError;

    fn try_from(raw: u64) -> Result<Self, Self::Error> {
        Self::new(raw)
    }
}

impl From<ApplicationId> for u64 {
    fn from(id: ApplicationId) -> Self {
        id.0
    }
}

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Student details captured at intake. Carried through untouched by the risk engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentDetails {
    pub name: String,
    pub grade: u8,
    pub date_of_birth: String,
    pub previous_school: String,
}

/// Guardian contact details. Carried through untouched by the risk engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardianContact {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreditCheckStatus {
    Pending,
    Complete,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncomeDocsStatus {
    Verified,
    UnderReview,
    Missing,
    Failed,
}

/// Financial inputs consumed by the credit and affordability classifiers.
///
/// Amounts are monthly figures in the school's billing currency. Missing, zero,
/// negative, or non-finite amounts are all treated as "data unavailable".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialProfile {
    pub credit_score: Option<i32>,
    pub credit_check_status: CreditCheckStatus,
    pub monthly_fee: Option<f64>,
    pub monthly_disposable_income: Option<f64>,
    pub income_docs_status: IncomeDocsStatus,
}

/// Review status of an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApplicationStatus {
    #[serde(rename = "Pending Review")]
    PendingReview,
    Approved,
    Declined,
    #[serde(rename = "Awaiting Documents")]
    AwaitingDocuments,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 4] = [
        ApplicationStatus::PendingReview,
        ApplicationStatus::Approved,
        ApplicationStatus::Declined,
        ApplicationStatus::AwaitingDocuments,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::PendingReview => "Pending Review",
            ApplicationStatus::Approved => "Approved",
            ApplicationStatus::Declined => "Declined",
            ApplicationStatus::AwaitingDocuments => "Awaiting Documents",
        }
    }

    /// Case-insensitive lookup accepting both display labels and snake_case keys.
    pub fn from_label(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_ascii_lowercase().replace('_', " ");
        Self::ALL
            .into_iter()
            .find(|status| status.label().to_ascii_lowercase() == normalized)
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentStatus {
    Verified,
    #[serde(rename = "Under Review")]
    UnderReview,
    Pending,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportingDocument {
    pub name: String,
    pub status: DocumentStatus,
    pub uploaded_at: NaiveDate,
}

/// Counts of supporting documents by verification state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DocumentSummary {
    pub verified: usize,
    pub under_review: usize,
    pub pending: usize,
}

impl DocumentSummary {
    pub fn from_documents(documents: &[SupportingDocument]) -> Self {
        documents
            .iter()
            .fold(Self::default(), |mut summary, document| {
                match document.status {
                    DocumentStatus::Verified => summary.verified += 1,
                    DocumentStatus::UnderReview => summary.under_review += 1,
                    DocumentStatus::Pending => summary.pending += 1,
                }
                summary
            })
    }

    pub fn total(&self) -> usize {
        self.verified + self.under_review + self.pending
    }

    pub fn all_verified(&self) -> bool {
        self.under_review == 0 && self.pending == 0
    }
}

/// One entry of the append-only application timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub event: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl TimelineEntry {
    pub fn new(event: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            event: event.into(),
            timestamp,
            note: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Event text used for a decision that moves an application into `status`.
    pub fn decision_event(status: ApplicationStatus) -> String {
        format!(
            "{DECISION_EVENT_PREFIX}{}",
            status.label().to_ascii_uppercase()
        )
    }

    /// Status implied by this entry when it records a decision.
    pub fn decision_status(&self) -> Option<ApplicationStatus> {
        let outcome = self.event.strip_prefix(DECISION_EVENT_PREFIX)?;
        ApplicationStatus::ALL
            .into_iter()
            .find(|status| status.label().eq_ignore_ascii_case(outcome))
    }
}

/// Timeline problems detected when a record is registered or an event is appended.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimelineError {
    #[error("timeline is empty; every application starts with a submission entry")]
    Empty,
    #[error("timeline entry {index} at {timestamp} precedes the entry before it")]
    OutOfOrder {
        index: usize,
        timestamp: DateTime<Utc>,
    },
    #[error("status {recorded} does not match {derived} implied by the latest decision")]
    StatusMismatch {
        recorded: ApplicationStatus,
        derived: ApplicationStatus,
    },
    #[error("decision events can only be recorded through the decision workflow: {0}")]
    DecisionEvent(String),
}

/// Admission application as held by the repository.
///
/// `status` and `timeline` are private: they change together through the decision
/// workflow, and the timeline only ever grows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub id: ApplicationId,
    pub student: StudentDetails,
    pub guardian: GuardianContact,
    pub financials: FinancialProfile,
    status: ApplicationStatus,
    pub documents: Vec<SupportingDocument>,
    timeline: Vec<TimelineEntry>,
}

impl ApplicationRecord {
    /// Build a freshly submitted application awaiting review.
    pub fn submitted(
        id: ApplicationId,
        student: StudentDetails,
        guardian: GuardianContact,
        financials: FinancialProfile,
        documents: Vec<SupportingDocument>,
        submitted_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            student,
            guardian,
            financials,
            status: ApplicationStatus::PendingReview,
            documents,
            timeline: vec![TimelineEntry::new(SUBMITTED_EVENT, submitted_at)],
        }
    }

    pub fn status(&self) -> ApplicationStatus {
        self.status
    }

    /// Timeline in storage (append) order.
    pub fn timeline(&self) -> &[TimelineEntry] {
        &self.timeline
    }

    /// Timeline sorted by timestamp ascending; ties keep append order.
    pub fn timeline_in_display_order(&self) -> Vec<&TimelineEntry> {
        let mut entries: Vec<&TimelineEntry> = self.timeline.iter().collect();
        entries.sort_by_key(|entry| entry.timestamp);
        entries
    }

    pub fn submitted_at(&self) -> Option<DateTime<Utc>> {
        self.timeline.first().map(|entry| entry.timestamp)
    }

    pub fn last_activity_at(&self) -> Option<DateTime<Utc>> {
        self.timeline.last().map(|entry| entry.timestamp)
    }

    pub fn latest_decision(&self) -> Option<&TimelineEntry> {
        self.timeline
            .iter()
            .rev()
            .find(|entry| entry.decision_status().is_some())
    }

    /// Status implied by the timeline alone.
    pub fn derived_status(&self) -> ApplicationStatus {
        self.latest_decision()
            .and_then(TimelineEntry::decision_status)
            .unwrap_or(ApplicationStatus::PendingReview)
    }

    pub fn document_summary(&self) -> DocumentSummary {
        DocumentSummary::from_documents(&self.documents)
    }

    /// Append a non-decision event (document uploads, credit check progress, ...).
    pub fn record_event(&mut self, entry: TimelineEntry) -> Result<(), TimelineError> {
        if entry.decision_status().is_some() {
            return Err(TimelineError::DecisionEvent(entry.event));
        }
        if let Some(last) = self.timeline.last() {
            if entry.timestamp < last.timestamp {
                return Err(TimelineError::OutOfOrder {
                    index: self.timeline.len(),
                    timestamp: entry.timestamp,
                });
            }
        }
        self.timeline.push(entry);
        Ok(())
    }

    /// Verify the stored invariants: a non-empty chronological timeline whose latest
    /// decision agrees with `status`.
    pub fn check_integrity(&self) -> Result<(), TimelineError> {
        if self.timeline.is_empty() {
            return Err(TimelineError::Empty);
        }

        for (index, pair) in self.timeline.windows(2).enumerate() {
            if pair[1].timestamp < pair[0].timestamp {
                return Err(TimelineError::OutOfOrder {
                    index: index + 1,
                    timestamp: pair[1].timestamp,
                });
            }
        }

        let derived = self.derived_status();
        if derived != self.status {
            return Err(TimelineError::StatusMismatch {
                recorded: self.status,
                derived,
            });
        }

        Ok(())
    }

    /// Status and timeline writes are confined to this method so they stay paired.
    pub(super) fn push_decision(&mut self, status: ApplicationStatus, entry: TimelineEntry) {
        self.timeline.push(entry);
        self.status = status;
    }
}
