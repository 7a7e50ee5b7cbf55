use admissions_ai::workflows::admissions::{
    ApplicationId, ApplicationRecord, ApplicationRepository, ApplicationStateMachine,
    CreditCheckStatus, DecisionAction, DecisionCommit, DocumentStatus, FinancialProfile,
    GuardianContact, IncomeDocsStatus, RepositoryError, StudentDetails, SupportingDocument,
    TimelineEntry,
};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryApplicationRepository {
    records: Arc<Mutex<HashMap<ApplicationId, ApplicationRecord>>>,
}

impl InMemoryApplicationRepository {
    /// Repository preloaded with the demo applications.
    pub(crate) fn seeded() -> Result<Self, RepositoryError> {
        let repository = Self::default();
        for record in seed_applications() {
            repository.insert(record)?;
        }
        Ok(repository)
    }
}

impl ApplicationRepository for InMemoryApplicationRepository {
    fn insert(&self, record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.id, record.clone());
        Ok(record)
    }

    fn fetch(&self, id: ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(&id).cloned())
    }

    fn all(&self) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.values().cloned().collect())
    }

    fn commit_decision(
        &self,
        commit: &DecisionCommit,
    ) -> Result<ApplicationRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let record = guard
            .get_mut(&commit.application_id())
            .ok_or(RepositoryError::NotFound)?;
        record.apply_commit(commit)?;
        Ok(record.clone())
    }
}

struct SeedApplication {
    id: u64,
    student: &'static str,
    guardian: &'static str,
    grade: u8,
    credit_score: i32,
    monthly_fee: f64,
    disposable_income: f64,
    income_docs: IncomeDocsStatus,
    submitted_day: u32,
    decision: Option<DecisionAction>,
}

const SEED_APPLICATIONS: [SeedApplication; 5] = [
    SeedApplication {
        id: 12345,
        student: "John Smith",
        guardian: "Sarah Smith",
        grade: 5,
        credit_score: 685,
        monthly_fee: 8500.0,
        disposable_income: 25000.0,
        income_docs: IncomeDocsStatus::UnderReview,
        submitted_day: 8,
        decision: None,
    },
    SeedApplication {
        id: 12346,
        student: "Emma Johnson",
        guardian: "Michael Johnson",
        grade: 3,
        credit_score: 745,
        monthly_fee: 9200.0,
        disposable_income: 35000.0,
        income_docs: IncomeDocsStatus::Verified,
        submitted_day: 7,
        decision: Some(DecisionAction::Approve),
    },
    SeedApplication {
        id: 12347,
        student: "Liam Brown",
        guardian: "Jessica Brown",
        grade: 7,
        credit_score: 580,
        monthly_fee: 7800.0,
        disposable_income: 15000.0,
        income_docs: IncomeDocsStatus::UnderReview,
        submitted_day: 6,
        decision: Some(DecisionAction::RequestDocuments),
    },
    SeedApplication {
        id: 12348,
        student: "Sophia Davis",
        guardian: "David Davis",
        grade: 2,
        credit_score: 520,
        monthly_fee: 8900.0,
        disposable_income: 12000.0,
        income_docs: IncomeDocsStatus::Verified,
        submitted_day: 5,
        decision: Some(DecisionAction::Decline),
    },
    SeedApplication {
        id: 12349,
        student: "Noah Wilson",
        guardian: "Jennifer Wilson",
        grade: 4,
        credit_score: 625,
        monthly_fee: 8100.0,
        disposable_income: 22000.0,
        income_docs: IncomeDocsStatus::Verified,
        submitted_day: 4,
        decision: None,
    },
];

fn seed_timestamp(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, day, hour, minute, 0)
        .single()
        .unwrap_or_default()
}

fn seed_record(seed: &SeedApplication) -> Option<ApplicationRecord> {
    let id = ApplicationId::new(seed.id).ok()?;
    let uploaded = NaiveDate::from_ymd_opt(2024, 1, seed.submitted_day + 2)?;
    let email_name = seed.guardian.to_ascii_lowercase().replace(' ', ".");

    let mut record = ApplicationRecord::submitted(
        id,
        StudentDetails {
            name: seed.student.to_string(),
            grade: seed.grade,
            date_of_birth: format!("{}-03-15", 2020 - i32::from(seed.grade)),
            previous_school: "Sunrise Elementary School".to_string(),
        },
        GuardianContact {
            name: seed.guardian.to_string(),
            email: format!("{email_name}@example.com"),
            phone: "+27 11 123 4567".to_string(),
            address: "123 Main Street, Johannesburg, 2000".to_string(),
        },
        FinancialProfile {
            credit_score: Some(seed.credit_score),
            credit_check_status: CreditCheckStatus::Complete,
            monthly_fee: Some(seed.monthly_fee),
            monthly_disposable_income: Some(seed.disposable_income),
            income_docs_status: seed.income_docs,
        },
        vec![
            SupportingDocument {
                name: "ID Document".to_string(),
                status: DocumentStatus::Verified,
                uploaded_at: uploaded,
            },
            SupportingDocument {
                name: "Proof of Income".to_string(),
                status: match seed.income_docs {
                    IncomeDocsStatus::Verified => DocumentStatus::Verified,
                    _ => DocumentStatus::UnderReview,
                },
                uploaded_at: uploaded,
            },
            SupportingDocument {
                name: "Bank Statements".to_string(),
                status: DocumentStatus::UnderReview,
                uploaded_at: uploaded,
            },
        ],
        seed_timestamp(seed.submitted_day, 10, 30),
    );

    let day = seed.submitted_day;
    for (event, at) in [
        ("Documents Uploaded", seed_timestamp(day + 2, 14, 22)),
        ("Credit Check Initiated", seed_timestamp(day + 3, 9, 15)),
        ("Credit Check Completed", seed_timestamp(day + 4, 11, 45)),
    ] {
        record.record_event(TimelineEntry::new(event, at)).ok()?;
    }

    if let Some(action) = seed.decision {
        ApplicationStateMachine::apply(&mut record, action, None, seed_timestamp(day + 5, 9, 0));
    }

    Some(record)
}

/// Demo applications covering each recommendation path and every status.
pub(crate) fn seed_applications() -> Vec<ApplicationRecord> {
    SEED_APPLICATIONS.iter().filter_map(seed_record).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use admissions_ai::workflows::admissions::{assess_risk, ApplicationStatus};

    #[test]
    fn seed_applications_are_consistent() {
        let records = seed_applications();
        assert_eq!(records.len(), SEED_APPLICATIONS.len());
        for record in &records {
            assert!(record.check_integrity().is_ok(), "record {}", record.id);
        }
    }

    #[test]
    fn seeds_cover_every_status() {
        let records = seed_applications();
        for status in ApplicationStatus::ALL {
            assert!(
                records.iter().any(|record| record.status() == status),
                "missing {status}"
            );
        }
    }

    #[test]
    fn seeded_repository_holds_all_records() {
        let repository = InMemoryApplicationRepository::seeded().expect("seeds insert");
        let all = repository.all().expect("records listed");
        assert_eq!(all.len(), 5);

        let declined = repository
            .fetch(ApplicationId::new(12348).expect("positive id"))
            .expect("fetch succeeds")
            .expect("record present");
        assert_eq!(
            assess_risk(&declined).decision_recommendation.copy,
            "Decline – High Risk"
        );
    }
}
