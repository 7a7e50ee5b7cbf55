use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use serde_json::Value;

use crate::config::DecisionConfig;
use crate::workflows::admissions::decision::DecisionCommit;
use crate::workflows::admissions::domain::{
    ApplicationId, ApplicationRecord, CreditCheckStatus, DocumentStatus, FinancialProfile,
    GuardianContact, IncomeDocsStatus, StudentDetails, SupportingDocument, TimelineEntry,
};
use crate::workflows::admissions::repository::{ApplicationRepository, RepositoryError};
use crate::workflows::admissions::service::{AdmissionsService, Clock};
use crate::workflows::admissions::{admissions_router, assess_risk, RiskAssessment};

pub(super) fn at(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, day, hour, minute, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn id(raw: u64) -> ApplicationId {
    ApplicationId::new(raw).expect("positive id")
}

pub(super) fn financials(score: Option<i32>, fee: f64, income: f64) -> FinancialProfile {
    FinancialProfile {
        credit_score: score,
        credit_check_status: CreditCheckStatus::Complete,
        monthly_fee: Some(fee),
        monthly_disposable_income: Some(income),
        income_docs_status: IncomeDocsStatus::Verified,
    }
}

pub(super) fn student(name: &str) -> StudentDetails {
    StudentDetails {
        name: name.to_string(),
        grade: 5,
        date_of_birth: "2015-03-15".to_string(),
        previous_school: "Sunrise Elementary School".to_string(),
    }
}

pub(super) fn guardian(name: &str) -> GuardianContact {
    GuardianContact {
        name: name.to_string(),
        email: "guardian@example.com".to_string(),
        phone: "+27 11 123 4567".to_string(),
        address: "123 Main Street, Johannesburg, 2000".to_string(),
    }
}

fn documents() -> Vec<SupportingDocument> {
    let uploaded = NaiveDate::from_ymd_opt(2024, 1, 10).expect("valid date");
    vec![
        SupportingDocument {
            name: "ID Document".to_string(),
            status: DocumentStatus::Verified,
            uploaded_at: uploaded,
        },
        SupportingDocument {
            name: "Proof of Income".to_string(),
            status: DocumentStatus::UnderReview,
            uploaded_at: uploaded,
        },
        SupportingDocument {
            name: "Bank Statements".to_string(),
            status: DocumentStatus::Pending,
            uploaded_at: uploaded,
        },
    ]
}

/// Pending application with a realistic pre-decision history.
pub(super) fn record_with(raw_id: u64, financials: FinancialProfile) -> ApplicationRecord {
    let mut record = ApplicationRecord::submitted(
        id(raw_id),
        student("John Smith"),
        guardian("Sarah Smith"),
        financials,
        documents(),
        at(8, 10, 30),
    );
    record
        .record_event(TimelineEntry::new("Documents Uploaded", at(10, 14, 22)))
        .expect("chronological");
    record
        .record_event(TimelineEntry::new("Credit Check Completed", at(12, 11, 45)))
        .expect("chronological");
    record
}

/// Application 42: score 745 (band A) and a 26% ratio.
pub(super) fn pending_record() -> ApplicationRecord {
    record_with(42, financials(Some(745), 6500.0, 25000.0))
}

pub(super) fn assessment_for(record: &ApplicationRecord) -> RiskAssessment {
    assess_risk(record)
}

/// Clock that returns a fixed instant and advances a minute per call.
pub(super) struct SteppingClock {
    start: DateTime<Utc>,
    calls: AtomicUsize,
}

impl SteppingClock {
    pub(super) fn starting_at(start: DateTime<Utc>) -> Self {
        Self {
            start,
            calls: AtomicUsize::new(0),
        }
    }
}

impl Clock for SteppingClock {
    fn now(&self) -> DateTime<Utc> {
        let step = self.calls.fetch_add(1, Ordering::SeqCst) as i64;
        self.start + Duration::minutes(step)
    }
}

pub(super) fn decision_config() -> DecisionConfig {
    DecisionConfig {
        mutation_retries: 2,
    }
}

pub(super) fn build_service() -> (AdmissionsService<MemoryRepository>, Arc<MemoryRepository>) {
    let repository = Arc::new(MemoryRepository::default());
    repository.seed(pending_record());
    let service = AdmissionsService::with_clock(
        repository.clone(),
        Arc::new(SteppingClock::starting_at(at(15, 9, 0))),
        decision_config(),
    );
    (service, repository)
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) records: Arc<Mutex<HashMap<ApplicationId, ApplicationRecord>>>,
    pub(super) fetches: Arc<AtomicUsize>,
}

impl MemoryRepository {
    pub(super) fn seed(&self, record: ApplicationRecord) {
        self.records
            .lock()
            .expect("repository mutex poisoned")
            .insert(record.id, record);
    }

    pub(super) fn stored(&self, id: ApplicationId) -> ApplicationRecord {
        self.records
            .lock()
            .expect("repository mutex poisoned")
            .get(&id)
            .cloned()
            .expect("record present")
    }
}

impl ApplicationRepository for MemoryRepository {
    fn insert(&self, record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.id, record.clone());
        Ok(record)
    }

    fn fetch(&self, id: ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
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

/// Reads succeed; the first `failures` commits report the store as unavailable.
pub(super) struct FlakyRepository {
    pub(super) inner: MemoryRepository,
    failures: AtomicUsize,
    pub(super) commit_attempts: AtomicUsize,
}

impl FlakyRepository {
    pub(super) fn failing(failures: usize, record: ApplicationRecord) -> Self {
        let inner = MemoryRepository::default();
        inner.seed(record);
        Self {
            inner,
            failures: AtomicUsize::new(failures),
            commit_attempts: AtomicUsize::new(0),
        }
    }
}

impl ApplicationRepository for FlakyRepository {
    fn insert(&self, record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError> {
        self.inner.insert(record)
    }

    fn fetch(&self, id: ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError> {
        self.inner.fetch(id)
    }

    fn all(&self) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        self.inner.all()
    }

    fn commit_decision(
        &self,
        commit: &DecisionCommit,
    ) -> Result<ApplicationRecord, RepositoryError> {
        self.commit_attempts.fetch_add(1, Ordering::SeqCst);
        let remaining = self.failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures.store(remaining - 1, Ordering::SeqCst);
            return Err(RepositoryError::Unavailable("database offline".to_string()));
        }
        self.inner.commit_decision(commit)
    }
}

/// Another writer appends a "Reference Received" entry just before every commit, so
/// each planned decision is stale by the time it is applied.
#[derive(Default)]
pub(super) struct InterleavingRepository {
    pub(super) inner: MemoryRepository,
}

impl ApplicationRepository for InterleavingRepository {
    fn insert(&self, record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError> {
        self.inner.insert(record)
    }

    fn fetch(&self, id: ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError> {
        self.inner.fetch(id)
    }

    fn all(&self) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        self.inner.all()
    }

    fn commit_decision(
        &self,
        commit: &DecisionCommit,
    ) -> Result<ApplicationRecord, RepositoryError> {
        {
            let mut guard = self.inner.records.lock().expect("repository mutex poisoned");
            let record = guard
                .get_mut(&commit.application_id())
                .ok_or(RepositoryError::NotFound)?;
            record
                .record_event(TimelineEntry::new(
                    "Reference Received",
                    commit.entry().timestamp,
                ))
                .expect("chronological event");
        }
        self.inner.commit_decision(commit)
    }
}

pub(super) struct UnavailableRepository;

impl ApplicationRepository for UnavailableRepository {
    fn insert(&self, _record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn all(&self) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn commit_decision(
        &self,
        _commit: &DecisionCommit,
    ) -> Result<ApplicationRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) fn router_with_service(service: AdmissionsService<MemoryRepository>) -> axum::Router {
    admissions_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 16 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) async fn read_text_body(response: Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), 16 * 1024)
        .await
        .expect("read body");
    String::from_utf8(body.to_vec()).expect("utf-8 body")
}
