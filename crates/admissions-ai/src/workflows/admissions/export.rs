use super::assessment::RiskAssessment;
use super::domain::ApplicationRecord;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to write csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to flush csv buffer: {0}")]
    Flush(String),
    #[error("csv output was not valid utf-8")]
    Encoding(#[from] std::string::FromUtf8Error),
}

fn write_block(headers: &[&str], values: &[String]) -> Result<String, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(headers)?;
    writer.write_record(values)?;
    let bytes = writer
        .into_inner()
        .map_err(|err| ExportError::Flush(err.to_string()))?;
    Ok(String::from_utf8(bytes)?)
}

fn display_or_na<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "N/A".to_string(), |value| value.to_string())
}

/// Review summary as three CSV blocks (student, guardian, risk) separated by blank lines.
pub fn application_summary_csv(
    record: &ApplicationRecord,
    assessment: &RiskAssessment,
) -> Result<String, ExportError> {
    let student = write_block(
        &[
            "Application ID",
            "Student Name",
            "Grade",
            "Date of Birth",
            "Previous School",
        ],
        &[
            record.id.to_string(),
            record.student.name.clone(),
            record.student.grade.to_string(),
            record.student.date_of_birth.clone(),
            record.student.previous_school.clone(),
        ],
    )?;

    let guardian = write_block(
        &["Guardian Name", "Email", "Phone", "Address"],
        &[
            record.guardian.name.clone(),
            record.guardian.email.clone(),
            record.guardian.phone.clone(),
            record.guardian.address.clone(),
        ],
    )?;

    let credit = &assessment.credit_result;
    let income = &assessment.income_result;
    let risk = write_block(
        &[
            "Credit Band",
            "Credit Score",
            "Credit Risk",
            "Income Ratio",
            "Affordability",
            "Monthly Fee",
            "Disposable Income",
            "Recommendation",
            "Status",
        ],
        &[
            display_or_na(credit.band.map(|band| format!("{band:?}"))),
            display_or_na(record.financials.credit_score),
            credit.color.label().to_string(),
            display_or_na(income.ratio_pct.map(|ratio| format!("{ratio}%"))),
            income.color.label().to_string(),
            display_or_na(record.financials.monthly_fee),
            display_or_na(record.financials.monthly_disposable_income),
            assessment.decision_recommendation.copy.to_string(),
            record.status().label().to_string(),
        ],
    )?;

    Ok([student, guardian, risk].join("\n"))
}

/// A rendered review summary ready to be served or written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvExport {
    pub file_name: String,
    pub body: String,
}

/// Download name used by the HTTP export.
pub fn export_file_name(record: &ApplicationRecord) -> String {
    format!("application-{}-export.csv", record.id)
}
