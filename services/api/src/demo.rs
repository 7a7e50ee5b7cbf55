use crate::infra::InMemoryApplicationRepository;
use admissions_ai::config::DecisionConfig;
use admissions_ai::error::AppError;
use admissions_ai::workflows::admissions::validation::parse_application_id;
use admissions_ai::workflows::admissions::{
    assess_risk, AdmissionsService, AdmissionsServiceError, ApplicationFilter, ApplicationId,
    ApplicationRecord, DecisionAction, RiskAssessment,
};
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Application to decide on after the screening overview.
    #[arg(long, default_value = "12345", value_parser = parse_application_id)]
    pub(crate) application: ApplicationId,
    /// Decision to record: approve, request_documents, or decline.
    #[arg(long, default_value = "approve")]
    pub(crate) decision: DecisionAction,
    /// Optional reviewer note stored with the decision.
    #[arg(long)]
    pub(crate) notes: Option<String>,
}

#[derive(Args, Debug)]
pub(crate) struct AssessArgs {
    /// JSON application record to assess instead of a seeded application.
    #[arg(long)]
    pub(crate) record: Option<PathBuf>,
    /// Seeded application id to assess when no record file is given.
    #[arg(long, default_value = "12345", value_parser = parse_application_id)]
    pub(crate) application: ApplicationId,
    /// Print the assessment as JSON.
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ExportArgs {
    /// Seeded application id to export.
    #[arg(long, value_parser = parse_application_id)]
    pub(crate) application: ApplicationId,
    /// Write the CSV to this path instead of stdout.
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
}

fn demo_service() -> Result<AdmissionsService<InMemoryApplicationRepository>, AppError> {
    let repository =
        InMemoryApplicationRepository::seeded().map_err(AdmissionsServiceError::from)?;
    Ok(AdmissionsService::new(
        Arc::new(repository),
        DecisionConfig::default(),
    ))
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        application,
        decision,
        notes,
    } = args;

    let service = demo_service()?;

    println!("Admissions screening demo");
    let listing = service.list(&ApplicationFilter::default())?;
    println!(
        "{} applications | {} pending | {} approved | {} declined | {} awaiting documents",
        listing.stats.total,
        listing.stats.pending,
        listing.stats.approved,
        listing.stats.declined,
        listing.stats.awaiting
    );
    for summary in &listing.applications {
        let assessment = service.assess(summary.id)?;
        println!(
            "- #{} {} (grade {}) | {} | credit {} | affordability {} | {}{}",
            summary.id,
            summary.student_name,
            summary.grade,
            summary.status,
            assessment.credit_result.color.label(),
            assessment.income_result.copy,
            assessment.decision_recommendation.copy,
            if assessment.header_badges.is_empty() {
                ""
            } else {
                " | RISK FLAG"
            }
        );
    }

    println!("\nRecording decision '{decision}' for application {application}");
    let receipt = service.apply_decision(application, decision, notes.as_deref())?;
    println!("{}", receipt.message);

    let record = service.get(application)?;
    render_timeline(&record);
    Ok(())
}

pub(crate) fn run_assess(args: AssessArgs) -> Result<(), AppError> {
    let record = match args.record {
        Some(path) => {
            let raw = std::fs::read_to_string(path)?;
            serde_json::from_str::<ApplicationRecord>(&raw)?
        }
        None => demo_service()?.get(args.application)?,
    };

    let assessment = assess_risk(&record);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&assessment)?);
    } else {
        render_assessment(&record, &assessment);
    }
    Ok(())
}

pub(crate) fn run_export(args: ExportArgs) -> Result<(), AppError> {
    let service = demo_service()?;
    let export = service.export_csv(args.application)?;

    match args.output {
        Some(path) => {
            std::fs::write(&path, &export.body)?;
            println!("Wrote {} ({})", path.display(), export.file_name);
        }
        None => print!("{}", export.body),
    }
    Ok(())
}

pub(crate) fn render_assessment(record: &ApplicationRecord, assessment: &RiskAssessment) {
    let credit = &assessment.credit_result;
    let income = &assessment.income_result;

    println!(
        "Application {} - {} (grade {})",
        record.id, record.student.name, record.student.grade
    );
    println!("Status: {}", record.status());
    match (credit.band, credit.score) {
        (Some(band), Some(score)) => println!(
            "Credit: band {band:?} ({score}) {} - {}",
            credit.color.label(),
            credit.description
        ),
        (Some(band), None) => println!(
            "Credit: band {band:?} {} - {}",
            credit.color.label(),
            credit.description
        ),
        _ => println!("Credit: {} - {}", credit.copy, credit.description),
    }
    println!("Affordability: {} {}", income.copy, income.color.label());
    println!(
        "Recommendation: {} ({})",
        assessment.decision_recommendation.copy,
        assessment.decision_recommendation.color.label()
    );
    println!("Risk level: {}", assessment.risk_level().label());
    if !assessment.header_badges.is_empty() {
        println!("Risk flag: HIGH");
    }
}

fn render_timeline(record: &ApplicationRecord) {
    println!("Timeline for application {}:", record.id);
    for entry in record.timeline_in_display_order() {
        match &entry.note {
            Some(note) => println!(
                "  {} | {} | {}",
                entry.timestamp.format("%Y-%m-%d %H:%M"),
                entry.event,
                note
            ),
            None => println!(
                "  {} | {}",
                entry.timestamp.format("%Y-%m-%d %H:%M"),
                entry.event
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use admissions_ai::workflows::admissions::ApplicationStatus;

    #[test]
    fn demo_decision_updates_seeded_application() {
        let service = demo_service().expect("demo service builds");
        let id = ApplicationId::new(12349).expect("positive id");

        let receipt = service
            .apply_decision(id, DecisionAction::Decline, Some("affordability too tight"))
            .expect("decision recorded");

        assert_eq!(receipt.status, ApplicationStatus::Declined);
        let record = service.get(id).expect("record present");
        assert_eq!(record.status(), ApplicationStatus::Declined);
        assert!(record.check_integrity().is_ok());
    }

    #[test]
    fn run_export_writes_csv_file() {
        let path = std::env::temp_dir().join(format!(
            "admissions-export-{}.csv",
            std::process::id()
        ));

        run_export(ExportArgs {
            application: ApplicationId::new(12345).expect("positive id"),
            output: Some(path.clone()),
        })
        .expect("export succeeds");

        let written = std::fs::read_to_string(&path).expect("file written");
        let _ = std::fs::remove_file(&path);
        assert!(written.starts_with("Application ID,Student Name"));
        assert!(written.contains("John Smith"));
    }

    #[test]
    fn run_assess_reads_record_files() {
        let record = crate::infra::seed_applications()
            .into_iter()
            .next()
            .expect("seeded record");
        let path = std::env::temp_dir().join(format!(
            "admissions-record-{}.json",
            std::process::id()
        ));
        std::fs::write(&path, serde_json::to_vec(&record).expect("serializes"))
            .expect("record written");

        let outcome = run_assess(AssessArgs {
            record: Some(path.clone()),
            application: record.id,
            json: true,
        });
        let _ = std::fs::remove_file(&path);

        assert!(outcome.is_ok());
    }

    #[test]
    fn run_assess_rejects_malformed_records() {
        let path = std::env::temp_dir().join(format!(
            "admissions-malformed-{}.json",
            std::process::id()
        ));
        std::fs::write(&path, b"{\"id\": 0}").expect("record written");

        let outcome = run_assess(AssessArgs {
            record: Some(path.clone()),
            application: ApplicationId::new(12345).expect("positive id"),
            json: false,
        });
        let _ = std::fs::remove_file(&path);

        assert!(matches!(outcome, Err(AppError::Record(_))));
    }

    #[test]
    fn unknown_seeded_application_is_not_found() {
        let outcome = run_assess(AssessArgs {
            record: None,
            application: ApplicationId::new(999).expect("positive id"),
            json: false,
        });

        assert!(matches!(
            outcome,
            Err(AppError::Admissions(AdmissionsServiceError::NotFound(_)))
        ));
    }
}
