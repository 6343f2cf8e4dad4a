//! Headline counters for one assessment's merged control states.

use posture_types::{AggregatedControlState, ControlStatus};
use serde::{Deserialize, Serialize};

use crate::precedence::{is_answered_control_status, is_open_control_status, STATUS_PRECEDENCE};
use crate::readiness::{compute_readiness_score, compute_risk_assessment_score, ReadinessInputs};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentSummary {
    pub total_controls: usize,
    pub answered_controls: usize,
    pub implemented_controls: usize,
    pub partial_controls: usize,
    pub not_applicable_controls: usize,
    pub open_controls: usize,
    pub evidence_covered_controls: usize,
    pub high_risk_open: usize,
    pub completion_percent: f64,
    pub evidence_coverage_percent: f64,
    pub readiness_score: f64,
    pub risk_assessment_score: f64,
    pub overdue_poam_count: usize,
    /// Responses waiting on a customer reviewer.
    pub awaiting_customer_review: usize,
    /// Responses or evidence sent back to the vendor.
    pub needs_info_or_rejected: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCount {
    pub status: ControlStatus,
    pub count: usize,
}

pub fn summarize_assessment(states: &[AggregatedControlState]) -> AssessmentSummary {
    let inputs = ReadinessInputs::from_states(states);
    let count = |predicate: fn(&AggregatedControlState) -> bool| {
        states.iter().filter(|state| predicate(state)).count()
    };

    AssessmentSummary {
        total_controls: inputs.total_controls,
        answered_controls: count(|state| is_answered_control_status(state.status)),
        implemented_controls: count(|state| state.status == ControlStatus::Implemented),
        partial_controls: count(|state| state.status == ControlStatus::PartiallyImplemented),
        not_applicable_controls: count(|state| state.status == ControlStatus::NotApplicable),
        open_controls: count(|state| is_open_control_status(state.status)),
        evidence_covered_controls: count(|state| state.has_evidence()),
        high_risk_open: inputs.high_risk_open,
        completion_percent: inputs.completion_percent,
        evidence_coverage_percent: inputs.evidence_coverage_percent,
        readiness_score: compute_readiness_score(&inputs),
        risk_assessment_score: compute_risk_assessment_score(states),
        overdue_poam_count: states.iter().map(|state| state.poam_overdue_count).sum(),
        awaiting_customer_review: count(|state| {
            state
                .review_status
                .is_some_and(|status| status.is_awaiting_review())
        }),
        needs_info_or_rejected: count(|state| {
            state.review_status.is_some_and(|status| status.is_returned())
                || state
                    .evidence_review_status
                    .is_some_and(|status| status.is_returned())
        }),
    }
}

/// Control count per status in precedence order; unrecognized statuses are
/// appended only when present.
pub fn status_distribution(states: &[AggregatedControlState]) -> Vec<StatusCount> {
    let count_of = |status: ControlStatus| {
        states.iter().filter(|state| state.status == status).count()
    };
    let mut distribution: Vec<StatusCount> = STATUS_PRECEDENCE
        .iter()
        .map(|status| StatusCount {
            status: *status,
            count: count_of(*status),
        })
        .collect();
    let unrecognized = count_of(ControlStatus::Unrecognized);
    if unrecognized > 0 {
        distribution.push(StatusCount {
            status: ControlStatus::Unrecognized,
            count: unrecognized,
        });
    }
    distribution
}
