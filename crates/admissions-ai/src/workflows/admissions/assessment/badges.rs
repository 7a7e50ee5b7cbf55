use serde::Serialize;

use super::RiskColor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BadgeKind {
    #[serde(rename = "Risk Flag")]
    RiskFlag,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BadgeSeverity {
    High,
}

/// Header flag displayed next to the application status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RiskBadge {
    #[serde(rename = "type")]
    pub kind: BadgeKind,
    pub severity: BadgeSeverity,
}

/// A single high-severity risk flag when either signal is red; nothing otherwise.
pub fn derive_header_badges(credit: RiskColor, income: RiskColor) -> Vec<RiskBadge> {
    if credit == RiskColor::Red || income == RiskColor::Red {
        vec![RiskBadge {
            kind: BadgeKind::RiskFlag,
            severity: BadgeSeverity::High,
        }]
    } else {
        Vec::new()
    }
}
