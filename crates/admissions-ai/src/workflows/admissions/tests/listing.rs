use super::common::*;
use crate::workflows::admissions::assessment::RiskLevel;
use crate::workflows::admissions::decision::{ApplicationStateMachine, DecisionAction};
use crate::workflows::admissions::domain::{ApplicationRecord, ApplicationStatus};
use crate::workflows::admissions::listing::{
    build_listing, ApplicationFilter, ApplicationStats, ListQuery,
};
use crate::workflows::admissions::validation::ValidationError;

fn query(status: Option<&str>, search: Option<&str>) -> ListQuery {
    ListQuery {
        status: status.map(str::to_string),
        search: search.map(str::to_string),
    }
}

fn mixed_records() -> Vec<ApplicationRecord> {
    let pending = pending_record();

    let mut approved = record_with(12346, financials(Some(700), 10000.0, 25000.0));
    approved.student.name = "Emma Johnson".to_string();
    approved.guardian.name = "Michael Johnson".to_string();
    ApplicationStateMachine::apply(&mut approved, DecisionAction::Approve, None, at(14, 9, 0));

    let mut declined = record_with(12347, financials(Some(580), 7800.0, 15000.0));
    declined.student.name = "Lucas Brown".to_string();
    declined.guardian.name = "Amanda Brown".to_string();
    ApplicationStateMachine::apply(&mut declined, DecisionAction::Decline, None, at(14, 9, 0));

    vec![declined, pending, approved]
}

#[test]
fn all_or_missing_status_disables_filtering() {
    for status in [None, Some(""), Some("all"), Some("ALL")] {
        let filter = ApplicationFilter::from_query(&query(status, None)).expect("valid filter");
        assert_eq!(filter.status, None, "{status:?}");
    }
}

#[test]
fn status_filter_accepts_labels_and_keys() {
    let filter =
        ApplicationFilter::from_query(&query(Some("pending_review"), None)).expect("valid filter");
    assert_eq!(filter.status, Some(ApplicationStatus::PendingReview));

    let filter =
        ApplicationFilter::from_query(&query(Some("Awaiting Documents"), None)).expect("valid");
    assert_eq!(filter.status, Some(ApplicationStatus::AwaitingDocuments));
}

#[test]
fn unknown_status_filter_is_rejected() {
    assert_eq!(
        ApplicationFilter::from_query(&query(Some("archived"), None)),
        Err(ValidationError::UnknownStatus("archived".to_string()))
    );
}

#[test]
fn listing_is_sorted_by_id_and_filtered_by_status() {
    let records = mixed_records();

    let everything = build_listing(&records, &ApplicationFilter::default());
    let ids: Vec<u64> = everything
        .applications
        .iter()
        .map(|summary| summary.id.get())
        .collect();
    assert_eq!(ids, vec![42, 12346, 12347]);

    let filter = ApplicationFilter::from_query(&query(Some("approved"), None)).expect("valid");
    let approved = build_listing(&records, &filter);
    assert_eq!(approved.total, 1);
    assert_eq!(approved.applications[0].student_name, "Emma Johnson");
    assert_eq!(approved.applications[0].status, ApplicationStatus::Approved);
}

#[test]
fn search_matches_names_and_id_case_insensitively() {
    let records = mixed_records();

    let by_guardian = ApplicationFilter::from_query(&query(None, Some("  AMANDA "))).expect("valid");
    let listing = build_listing(&records, &by_guardian);
    assert_eq!(listing.total, 1);
    assert_eq!(listing.applications[0].id.get(), 12347);

    let by_id = ApplicationFilter::from_query(&query(None, Some("1234"))).expect("valid");
    assert_eq!(build_listing(&records, &by_id).total, 2);

    let nobody = ApplicationFilter::from_query(&query(None, Some("zzz"))).expect("valid");
    assert!(build_listing(&records, &nobody).applications.is_empty());
}

#[test]
fn stats_cover_all_records_regardless_of_filter() {
    let records = mixed_records();
    let filter = ApplicationFilter::from_query(&query(Some("declined"), None)).expect("valid");

    let listing = build_listing(&records, &filter);

    assert_eq!(listing.total, 1);
    assert_eq!(
        listing.stats,
        ApplicationStats {
            total: 3,
            pending: 1,
            approved: 1,
            declined: 1,
            awaiting: 0,
        }
    );
}

#[test]
fn summaries_carry_risk_level_and_submission_date() {
    let listing = build_listing(&mixed_records(), &ApplicationFilter::default());

    let levels: Vec<RiskLevel> = listing
        .applications
        .iter()
        .map(|summary| summary.risk_level)
        .collect();
    assert_eq!(levels, vec![RiskLevel::Low, RiskLevel::Medium, RiskLevel::High]);
    assert_eq!(
        listing.applications[0].submitted_date,
        Some(at(8, 10, 30).date_naive())
    );
}
