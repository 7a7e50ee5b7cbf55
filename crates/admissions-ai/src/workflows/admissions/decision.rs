use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{ApplicationId, ApplicationRecord, ApplicationStatus, TimelineEntry};
use super::validation::ValidationError;

/// Human decision recorded against an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionAction {
    Approve,
    RequestDocuments,
    Decline,
}

impl DecisionAction {
    pub const fn as_str(self) -> &'static str {
        match self {
            DecisionAction::Approve => "approve",
            DecisionAction::RequestDocuments => "request_documents",
            DecisionAction::Decline => "decline",
        }
    }

    pub const fn target_status(self) -> ApplicationStatus {
        match self {
            DecisionAction::Approve => ApplicationStatus::Approved,
            DecisionAction::RequestDocuments => ApplicationStatus::AwaitingDocuments,
            DecisionAction::Decline => ApplicationStatus::Declined,
        }
    }
}

impl FromStr for DecisionAction {
    type Err = ValidationError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "approve" => Ok(DecisionAction::Approve),
            "request_documents" => Ok(DecisionAction::RequestDocuments),
            "decline" => Ok(DecisionAction::Decline),
            other => Err(ValidationError::UnknownDecision(other.to_string())),
        }
    }
}

impl fmt::Display for DecisionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A planned status change plus the timeline entry recording it.
///
/// Only [`ApplicationStateMachine::plan`] builds commits, and only
/// [`ApplicationRecord::apply_commit`] consumes them, so status and timeline can
/// never be written separately.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionCommit {
    application_id: ApplicationId,
    action: DecisionAction,
    entry: TimelineEntry,
    expected_timeline_len: usize,
}

impl DecisionCommit {
    pub fn application_id(&self) -> ApplicationId {
        self.application_id
    }

    pub fn action(&self) -> DecisionAction {
        self.action
    }

    pub fn status(&self) -> ApplicationStatus {
        self.action.target_status()
    }

    pub fn entry(&self) -> &TimelineEntry {
        &self.entry
    }

    /// Timeline length observed when the commit was planned.
    pub fn expected_timeline_len(&self) -> usize {
        self.expected_timeline_len
    }
}

/// Reasons a record refuses a commit.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommitError {
    #[error("commit for application {commit} applied to application {record}")]
    WrongApplication {
        commit: ApplicationId,
        record: ApplicationId,
    },
    #[error("timeline changed since the decision was planned (expected {expected} entries, found {found})")]
    StaleTimeline { expected: usize, found: usize },
}

impl ApplicationRecord {
    /// Apply a planned decision: append the entry and overwrite the status together.
    pub fn apply_commit(&mut self, commit: &DecisionCommit) -> Result<(), CommitError> {
        if commit.application_id != self.id {
            return Err(CommitError::WrongApplication {
                commit: commit.application_id,
                record: self.id,
            });
        }

        let found = self.timeline().len();
        if found != commit.expected_timeline_len {
            return Err(CommitError::StaleTimeline {
                expected: commit.expected_timeline_len,
                found,
            });
        }

        self.push_decision(commit.status(), commit.entry.clone());
        Ok(())
    }
}

/// Transition rules for application review.
///
/// Every status accepts every decision. A repeat decision appends another entry and
/// replaces the status; earlier decisions stay in the timeline.
pub struct ApplicationStateMachine;

impl ApplicationStateMachine {
    /// Plan a decision against the record as currently stored. Pure.
    ///
    /// The entry timestamp is clamped to the latest existing entry so append order
    /// stays chronological even if the caller's clock runs behind storage.
    pub fn plan(
        record: &ApplicationRecord,
        action: DecisionAction,
        notes: Option<&str>,
        now: DateTime<Utc>,
    ) -> DecisionCommit {
        let timestamp = record
            .last_activity_at()
            .map_or(now, |latest| now.max(latest));

        let mut entry =
            TimelineEntry::new(TimelineEntry::decision_event(action.target_status()), timestamp);
        if let Some(note) = notes.map(str::trim).filter(|note| !note.is_empty()) {
            entry = entry.with_note(note);
        }

        DecisionCommit {
            application_id: record.id,
            action,
            entry,
            expected_timeline_len: record.timeline().len(),
        }
    }

    /// Plan and apply in one step on an owned record.
    pub fn apply(
        record: &mut ApplicationRecord,
        action: DecisionAction,
        notes: Option<&str>,
        now: DateTime<Utc>,
    ) -> TimelineEntry {
        let commit = Self::plan(record, action, notes, now);
        let entry = commit.entry.clone();
        // planned against this exact record, so it cannot be stale
        record.push_decision(commit.status(), commit.entry);
        entry
    }
}

/// Result of a successfully persisted decision.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecisionReceipt {
    pub application_id: ApplicationId,
    pub status: ApplicationStatus,
    pub timeline_event: TimelineEntry,
    pub message: String,
}

impl DecisionReceipt {
    pub(crate) fn from_commit(commit: &DecisionCommit) -> Self {
        let status = commit.status();
        Self {
            application_id: commit.application_id,
            status,
            timeline_event: commit.entry.clone(),
            message: format!(
                "Application {} has been {}",
                commit.application_id,
                status.label().to_ascii_lowercase()
            ),
        }
    }
}
