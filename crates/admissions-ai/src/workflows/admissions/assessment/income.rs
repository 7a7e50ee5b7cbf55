use serde::Serialize;

use super::super::domain::IncomeDocsStatus;
use super::RiskColor;

const AFFORDABLE_MAX_PCT: u32 = 35;
const TIGHT_MAX_PCT: u32 = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IncomeResult {
    pub color: RiskColor,
    pub copy: String,
    pub ratio_pct: Option<u32>,
    pub description: &'static str,
}

fn usable_amount(amount: Option<f64>) -> Option<f64> {
    amount.filter(|value| value.is_finite() && *value > 0.0)
}

/// `round(fee / income * 100)`, defined only when both amounts are present and positive.
pub fn fee_to_income_ratio(monthly_fee: Option<f64>, monthly_income: Option<f64>) -> Option<u32> {
    let fee = usable_amount(monthly_fee)?;
    let income = usable_amount(monthly_income)?;
    // float-to-int `as` saturates, so extreme ratios clamp to u32::MAX
    Some((fee / income * 100.0).round() as u32)
}

/// Classify fee affordability. Document status overrides the raw ratio:
/// failed beats missing data, missing data beats under review, and under review
/// always reports amber.
pub fn classify_income(
    monthly_fee: Option<f64>,
    monthly_income: Option<f64>,
    docs_status: IncomeDocsStatus,
) -> IncomeResult {
    let ratio_pct = fee_to_income_ratio(monthly_fee, monthly_income);

    if docs_status == IncomeDocsStatus::Failed {
        return IncomeResult {
            color: RiskColor::Red,
            copy: "Over Threshold".to_string(),
            ratio_pct,
            description: "Documents failed verification.",
        };
    }

    let ratio = match ratio_pct {
        Some(ratio) if docs_status != IncomeDocsStatus::Missing => ratio,
        _ => {
            return IncomeResult {
                color: RiskColor::Grey,
                copy: "Pending...".to_string(),
                ratio_pct,
                description: "Documents missing or data unavailable.",
            };
        }
    };

    if docs_status == IncomeDocsStatus::UnderReview {
        return IncomeResult {
            color: RiskColor::Amber,
            copy: format!("{ratio}% (Under Review)"),
            ratio_pct: Some(ratio),
            description: "Documents are currently under review.",
        };
    }

    let (color, description) = if ratio <= AFFORDABLE_MAX_PCT {
        (RiskColor::Green, "affordable")
    } else if ratio <= TIGHT_MAX_PCT {
        (RiskColor::Amber, "tight")
    } else {
        (RiskColor::Red, "over threshold")
    };

    IncomeResult {
        color,
        copy: format!("{ratio}% ({description})"),
        ratio_pct: Some(ratio),
        description,
    }
}
