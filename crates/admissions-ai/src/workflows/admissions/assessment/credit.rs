use serde::Serialize;

use super::super::domain::CreditCheckStatus;
use super::RiskColor;

/// Letter grade summarizing credit risk. `F` is reserved for failed checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CreditBand {
    A,
    B,
    C,
    D,
    E,
    F,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreditResult {
    pub color: RiskColor,
    pub band: Option<CreditBand>,
    pub copy: &'static str,
    pub description: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<i32>,
}

struct BandThreshold {
    min_score: i32,
    band: CreditBand,
    color: RiskColor,
    copy: &'static str,
    description: &'static str,
}

/// Inclusive lower bounds, highest first. Scores below the last entry fall into band E.
const BAND_THRESHOLDS: [BandThreshold; 4] = [
    BandThreshold {
        min_score: 720,
        band: CreditBand::A,
        color: RiskColor::Green,
        copy: "Low",
        description: "Very Low Risk",
    },
    BandThreshold {
        min_score: 670,
        band: CreditBand::B,
        color: RiskColor::Green,
        copy: "Low",
        description: "Low Risk",
    },
    BandThreshold {
        min_score: 610,
        band: CreditBand::C,
        color: RiskColor::Amber,
        copy: "Medium",
        description: "Medium Risk",
    },
    BandThreshold {
        min_score: 550,
        band: CreditBand::D,
        color: RiskColor::Red,
        copy: "High",
        description: "High Risk",
    },
];

/// Map a credit score and check status to a band and color.
///
/// Pending checks (or a missing score) take precedence over failures, and failures
/// take precedence over the numeric bands. Any integer score resolves to a band.
pub fn classify_credit(score: Option<i32>, status: CreditCheckStatus) -> CreditResult {
    let score = match (status, score) {
        (CreditCheckStatus::Pending, _) | (_, None) => {
            return CreditResult {
                color: RiskColor::Grey,
                band: None,
                copy: "Pending...",
                description: "Credit check pending.",
                score: None,
            };
        }
        (CreditCheckStatus::Failed, Some(_)) => {
            return CreditResult {
                color: RiskColor::Red,
                band: Some(CreditBand::F),
                copy: "High",
                description: "Credit check failed.",
                score: None,
            };
        }
        (CreditCheckStatus::Complete, Some(score)) => score,
    };

    match BAND_THRESHOLDS
        .iter()
        .find(|threshold| score >= threshold.min_score)
    {
        Some(threshold) => CreditResult {
            color: threshold.color,
            band: Some(threshold.band),
            copy: threshold.copy,
            description: threshold.description,
            score: Some(score),
        },
        None => CreditResult {
            color: RiskColor::Red,
            band: Some(CreditBand::E),
            copy: "High",
            description: "Very High Risk",
            score: Some(score),
        },
    }
}
