//! School admission financial screening.
//!
//! Two independent classifiers (credit risk and fee affordability) feed a fixed
//! recommendation matrix and header badge rule. Human decisions run through a small
//! state machine that updates status and the append-only timeline together.

pub mod assessment;
pub mod decision;
pub mod domain;
pub mod export;
pub mod listing;
pub mod repository;
pub mod router;
pub mod service;
pub mod validation;

#[cfg(test)]
mod tests;

pub use assessment::{
    assess_risk, classify_credit, classify_income, recommend_decision, CreditBand, CreditResult,
    DecisionRecommendation, IncomeResult, RecommendedAction, RiskAssessment, RiskBadge, RiskColor,
    RiskLevel,
};
pub use decision::{
    ApplicationStateMachine, CommitError, DecisionAction, DecisionCommit, DecisionReceipt,
};
pub use domain::{
    ApplicationId, ApplicationRecord, ApplicationStatus, CreditCheckStatus, DocumentStatus,
    DocumentSummary, FinancialProfile, GuardianContact, IncomeDocsStatus, StudentDetails,
    SupportingDocument, TimelineEntry, TimelineError,
};
pub use export::CsvExport;
pub use listing::{ApplicationFilter, ApplicationListing, ApplicationStats, ApplicationSummary};
pub use repository::{ApplicationRepository, ApplicationStatusView, RepositoryError};
pub use router::admissions_router;
pub use service::{AdmissionsService, AdmissionsServiceError, Clock, SystemClock};
pub use validation::ValidationError;
