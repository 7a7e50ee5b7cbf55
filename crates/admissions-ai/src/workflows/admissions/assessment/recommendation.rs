use serde::Serialize;

use super::RiskColor;

/// UI action suggested alongside a recommendation. Display only; it never drives
/// a status transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendedAction {
    Review,
    Decline,
    ConditionalApproval,
    Approve,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DecisionRecommendation {
    pub copy: &'static str,
    pub color: RiskColor,
    pub action_tag: RecommendedAction,
}

const REVIEW: DecisionRecommendation = DecisionRecommendation {
    copy: "Review",
    color: RiskColor::Amber,
    action_tag: RecommendedAction::Review,
};

const DECLINE: DecisionRecommendation = DecisionRecommendation {
    copy: "Decline – High Risk",
    color: RiskColor::Red,
    action_tag: RecommendedAction::Decline,
};

const CONDITIONAL: DecisionRecommendation = DecisionRecommendation {
    copy: "Conditional Approval",
    color: RiskColor::Green,
    action_tag: RecommendedAction::ConditionalApproval,
};

const APPROVE: DecisionRecommendation = DecisionRecommendation {
    copy: "Approval Recommended",
    color: RiskColor::Green,
    action_tag: RecommendedAction::Approve,
};

/// Recommendation for every ordered `(credit, income)` pair, indexed by
/// [`RiskColor::index`]. Rows are credit colors, columns are income colors, both in
/// `grey, green, amber, red` order.
pub const DECISION_MATRIX: [[DecisionRecommendation; 4]; 4] = [
    // credit grey: indeterminate, always review
    [REVIEW, REVIEW, REVIEW, REVIEW],
    // credit green
    [REVIEW, APPROVE, CONDITIONAL, REVIEW],
    // credit amber
    [REVIEW, REVIEW, REVIEW, REVIEW],
    // credit red
    [REVIEW, REVIEW, REVIEW, DECLINE],
];

pub fn recommend_decision(credit: RiskColor, income: RiskColor) -> DecisionRecommendation {
    DECISION_MATRIX[credit.index()][income.index()]
}
