mod badges;
mod credit;
mod income;
mod recommendation;

pub use badges::{derive_header_badges, BadgeKind, BadgeSeverity, RiskBadge};
pub use credit::{classify_credit, CreditBand, CreditResult};
pub use income::{classify_income, fee_to_income_ratio, IncomeResult};
pub use recommendation::{
    recommend_decision, DecisionRecommendation, RecommendedAction, DECISION_MATRIX,
};

use serde::{Deserialize, Serialize};

use super::domain::ApplicationRecord;

/// Traffic-light outcome shared by both classifiers. `Grey` means indeterminate,
/// not a risk level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskColor {
    Grey,
    Green,
    Amber,
    Red,
}

impl RiskColor {
    pub const ALL: [RiskColor; 4] = [
        RiskColor::Grey,
        RiskColor::Green,
        RiskColor::Amber,
        RiskColor::Red,
    ];

    /// Position in [`RiskColor::ALL`]; used to index the decision matrix.
    pub const fn index(self) -> usize {
        match self {
            RiskColor::Grey => 0,
            RiskColor::Green => 1,
            RiskColor::Amber => 2,
            RiskColor::Red => 3,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            RiskColor::Grey => "grey",
            RiskColor::Green => "green",
            RiskColor::Amber => "amber",
            RiskColor::Red => "red",
        }
    }
}

/// Coarse risk level shown in application listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Pending,
}

impl RiskLevel {
    pub const fn label(self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
            RiskLevel::Pending => "Pending",
        }
    }
}

/// Read-only combination of both classifier results, the recommendation, and badges.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskAssessment {
    pub credit_result: CreditResult,
    pub income_result: IncomeResult,
    pub decision_recommendation: DecisionRecommendation,
    pub header_badges: Vec<RiskBadge>,
}

impl RiskAssessment {
    pub fn risk_level(&self) -> RiskLevel {
        let credit = self.credit_result.color;
        let income = self.income_result.color;

        if !self.header_badges.is_empty() {
            RiskLevel::High
        } else if credit == RiskColor::Grey || income == RiskColor::Grey {
            RiskLevel::Pending
        } else if credit == RiskColor::Green && income == RiskColor::Green {
            RiskLevel::Low
        } else {
            RiskLevel::Medium
        }
    }
}

/// Run both classifiers over the record's financial fields and combine the results.
pub fn assess_risk(record: &ApplicationRecord) -> RiskAssessment {
    let financials = &record.financials;

    let credit_result = classify_credit(financials.credit_score, financials.credit_check_status);
    let income_result = classify_income(
        financials.monthly_fee,
        financials.monthly_disposable_income,
        financials.income_docs_status,
    );
    let decision_recommendation = recommend_decision(credit_result.color, income_result.color);
    let header_badges = derive_header_badges(credit_result.color, income_result.color);

    RiskAssessment {
        credit_result,
        income_result,
        decision_recommendation,
        header_badges,
    }
}
