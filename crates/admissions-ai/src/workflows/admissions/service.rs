use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::config::DecisionConfig;

use super::assessment::{assess_risk, RiskAssessment};
use super::decision::{ApplicationStateMachine, DecisionAction, DecisionReceipt};
use super::domain::{ApplicationId, ApplicationRecord, TimelineError};
use super::export::{application_summary_csv, export_file_name, CsvExport, ExportError};
use super::listing::{build_listing, ApplicationFilter, ApplicationListing};
use super::repository::{ApplicationRepository, RepositoryError};
use super::validation::{parse_application_id, ValidationError};

/// Source of "now" for timeline entries.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// One mutex per application id; decisions on different ids never contend.
#[derive(Default)]
struct DecisionLocks {
    by_id: Mutex<HashMap<ApplicationId, Arc<Mutex<()>>>>,
}

impl DecisionLocks {
    fn for_id(&self, id: ApplicationId) -> Arc<Mutex<()>> {
        let mut locks = self.by_id.lock().unwrap_or_else(PoisonError::into_inner);
        locks.entry(id).or_default().clone()
    }

    /// Drop the entry for `id` once the caller's handle is the only one outside the table.
    fn release(&self, id: ApplicationId, lock: Arc<Mutex<()>>) {
        let mut locks = self.by_id.lock().unwrap_or_else(PoisonError::into_inner);
        let idle = locks
            .get(&id)
            .is_some_and(|held| Arc::ptr_eq(held, &lock) && Arc::strong_count(&lock) == 2);
        if idle {
            locks.remove(&id);
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.by_id.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

/// Service composing the repository, risk assessment, and decision state machine.
pub struct AdmissionsService<R> {
    repository: Arc<R>,
    clock: Arc<dyn Clock>,
    config: DecisionConfig,
    locks: DecisionLocks,
}

impl<R> AdmissionsService<R>
where
    R: ApplicationRepository + 'static,
{
    pub fn new(repository: Arc<R>, config: DecisionConfig) -> Self {
        Self::with_clock(repository, Arc::new(SystemClock), config)
    }

    pub fn with_clock(repository: Arc<R>, clock: Arc<dyn Clock>, config: DecisionConfig) -> Self {
        Self {
            repository,
            clock,
            config,
            locks: DecisionLocks::default(),
        }
    }

    /// Store a record produced by intake after checking its timeline invariants.
    pub fn register(
        &self,
        record: ApplicationRecord,
    ) -> Result<ApplicationRecord, AdmissionsServiceError> {
        record.check_integrity()?;
        let stored = self.repository.insert(record)?;
        debug!(application_id = %stored.id, "application registered");
        Ok(stored)
    }

    pub fn get(&self, id: ApplicationId) -> Result<ApplicationRecord, AdmissionsServiceError> {
        self.repository
            .fetch(id)?
            .ok_or(AdmissionsServiceError::NotFound(id))
    }

    /// Risk assessment for a stored application. Never mutates.
    pub fn assess(&self, id: ApplicationId) -> Result<RiskAssessment, AdmissionsServiceError> {
        let record = self.get(id)?;
        Ok(assess_risk(&record))
    }

    pub fn list(
        &self,
        filter: &ApplicationFilter,
    ) -> Result<ApplicationListing, AdmissionsServiceError> {
        let records = self.repository.all()?;
        Ok(build_listing(&records, filter))
    }

    /// CSV review summary and its download name, both taken from one read of the record.
    pub fn export_csv(&self, id: ApplicationId) -> Result<CsvExport, AdmissionsServiceError> {
        let record = self.get(id)?;
        let assessment = assess_risk(&record);
        Ok(CsvExport {
            file_name: export_file_name(&record),
            body: application_summary_csv(&record, &assessment)?,
        })
    }

    /// Validate raw request input, then record the decision.
    pub fn submit_decision(
        &self,
        raw_id: &str,
        raw_decision: &str,
        notes: Option<&str>,
    ) -> Result<DecisionReceipt, AdmissionsServiceError> {
        let id = parse_application_id(raw_id)?;
        let action: DecisionAction = raw_decision.parse()?;
        self.apply_decision(id, action, notes)
    }

    /// Record a decision, updating status and timeline together.
    ///
    /// Decisions on one id are serialized. A stale plan is re-planned from a fresh read
    /// and an unavailable repository is retried, both within the configured budget. The
    /// repository applies each commit as a single write, so an exhausted budget leaves
    /// the stored record untouched.
    pub fn apply_decision(
        &self,
        id: ApplicationId,
        action: DecisionAction,
        notes: Option<&str>,
    ) -> Result<DecisionReceipt, AdmissionsServiceError> {
        let lock = self.locks.for_id(id);
        let outcome = {
            let _serialized = lock.lock().unwrap_or_else(PoisonError::into_inner);
            self.commit_with_retries(id, action, notes)
        };
        self.locks.release(id, lock);
        outcome
    }

    /// Ids with a decision in flight.
    #[cfg(test)]
    pub(crate) fn decisions_in_flight(&self) -> usize {
        self.locks.len()
    }

    fn commit_with_retries(
        &self,
        id: ApplicationId,
        action: DecisionAction,
        notes: Option<&str>,
    ) -> Result<DecisionReceipt, AdmissionsServiceError> {
        let attempts = u32::from(self.config.mutation_retries) + 1;
        let mut attempt = 0;
        loop {
            attempt += 1;

            let record = match self.repository.fetch(id) {
                Ok(Some(record)) => record,
                Ok(None) => return Err(AdmissionsServiceError::NotFound(id)),
                Err(RepositoryError::Unavailable(reason)) if attempt < attempts => {
                    warn!(application_id = %id, attempt, %reason, "fetch failed, retrying decision");
                    continue;
                }
                Err(source) => {
                    return Err(AdmissionsServiceError::MutationFailed {
                        id,
                        attempts: attempt,
                        source,
                    })
                }
            };

            let commit = ApplicationStateMachine::plan(&record, action, notes, self.clock.now());

            match self.repository.commit_decision(&commit) {
                Ok(_) => {
                    info!(
                        application_id = %id,
                        decision = %action,
                        status = %commit.status(),
                        "decision recorded"
                    );
                    return Ok(DecisionReceipt::from_commit(&commit));
                }
                Err(RepositoryError::NotFound) => return Err(AdmissionsServiceError::NotFound(id)),
                Err(err) if err.is_transient() && attempt < attempts => {
                    warn!(application_id = %id, attempt, error = %err, "decision commit failed, retrying");
                }
                Err(source) => {
                    warn!(application_id = %id, attempts = attempt, error = %source, "decision not recorded");
                    return Err(AdmissionsServiceError::MutationFailed {
                        id,
                        attempts: attempt,
                        source,
                    });
                }
            }
        }
    }
}

/// Error raised by the admissions service.
#[derive(Debug, thiserror::Error)]
pub enum AdmissionsServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("application {0} not found")]
    NotFound(ApplicationId),
    #[error("application {id} was not updated after {attempts} attempt(s): {source}")]
    MutationFailed {
        id: ApplicationId,
        attempts: u32,
        #[source]
        source: RepositoryError,
    },
    #[error(transparent)]
    Integrity(#[from] TimelineError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Export(#[from] ExportError),
}

impl AdmissionsServiceError {
    /// Whether the caller may retry the same request unchanged.
    pub fn is_retryable(&self) -> bool {
        match self {
            AdmissionsServiceError::MutationFailed { source, .. } => source.is_transient(),
            AdmissionsServiceError::Repository(source) => source.is_transient(),
            _ => false,
        }
    }
}
