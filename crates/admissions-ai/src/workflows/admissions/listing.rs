use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::assessment::{assess_risk, RiskLevel};
use super::domain::{ApplicationId, ApplicationRecord, ApplicationStatus};
use super::validation::ValidationError;

/// Query parameters accepted by the listing endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub search: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplicationFilter {
    pub status: Option<ApplicationStatus>,
    pub search: Option<String>,
}

impl ApplicationFilter {
    /// `status=all` (or an empty value) disables status filtering.
    pub fn from_query(query: &ListQuery) -> Result<Self, ValidationError> {
        let status = match query.status.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) if raw.eq_ignore_ascii_case("all") => None,
            Some(raw) => Some(
                ApplicationStatus::from_label(raw)
                    .ok_or_else(|| ValidationError::UnknownStatus(raw.to_string()))?,
            ),
        };

        let search = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
            .map(str::to_lowercase);

        Ok(Self { status, search })
    }

    /// Status must match exactly; search is a case-insensitive substring match over
    /// student name, guardian name, and the id's digits.
    pub fn matches(&self, record: &ApplicationRecord) -> bool {
        if let Some(status) = self.status {
            if record.status() != status {
                return false;
            }
        }

        match &self.search {
            None => true,
            Some(term) => {
                record.student.name.to_lowercase().contains(term)
                    || record.guardian.name.to_lowercase().contains(term)
                    || record.id.to_string().contains(term.as_str())
            }
        }
    }
}

/// One row of the application listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApplicationSummary {
    pub id: ApplicationId,
    pub student_name: String,
    pub guardian_name: String,
    pub grade: u8,
    pub status: ApplicationStatus,
    pub submitted_date: Option<NaiveDate>,
    pub risk_level: RiskLevel,
}

impl ApplicationSummary {
    pub fn from_record(record: &ApplicationRecord) -> Self {
        Self {
            id: record.id,
            student_name: record.student.name.clone(),
            guardian_name: record.guardian.name.clone(),
            grade: record.student.grade,
            status: record.status(),
            submitted_date: record.submitted_at().map(|at| at.date_naive()),
            risk_level: assess_risk(record).risk_level(),
        }
    }
}

/// Counts by status across every stored application, independent of the filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ApplicationStats {
    pub total: usize,
    pub pending: usize,
    pub approved: usize,
    pub declined: usize,
    pub awaiting: usize,
}

impl ApplicationStats {
    pub fn from_records(records: &[ApplicationRecord]) -> Self {
        records.iter().fold(Self::default(), |mut stats, record| {
            stats.total += 1;
            match record.status() {
                ApplicationStatus::PendingReview => stats.pending += 1,
                ApplicationStatus::Approved => stats.approved += 1,
                ApplicationStatus::Declined => stats.declined += 1,
                ApplicationStatus::AwaitingDocuments => stats.awaiting += 1,
            }
            stats
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApplicationListing {
    pub applications: Vec<ApplicationSummary>,
    pub total: usize,
    pub stats: ApplicationStats,
}

/// Filter and summarize records, ordered by id.
pub fn build_listing(records: &[ApplicationRecord], filter: &ApplicationFilter) -> ApplicationListing {
    let mut applications: Vec<ApplicationSummary> = records
        .iter()
        .filter(|record| filter.matches(record))
        .map(ApplicationSummary::from_record)
        .collect();
    applications.sort_by_key(|summary| summary.id);

    ApplicationListing {
        total: applications.len(),
        applications,
        stats: ApplicationStats::from_records(records),
    }
}
