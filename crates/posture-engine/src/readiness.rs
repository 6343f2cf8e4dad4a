//! Composite readiness score and the percentage helpers it is built from.

use posture_types::AggregatedControlState;
use serde::{Deserialize, Serialize};

use crate::precedence::{
    is_answered_control_status, is_high_risk_open, is_open_control_status, risk_weight,
};

const COMPLETION_WEIGHT: f64 = 0.55;
const EVIDENCE_WEIGHT: f64 = 0.45;
const EXPOSURE_PENALTY_SCALE: f64 = 120.0;
const EXPOSURE_PENALTY_CAP: f64 = 35.0;
const MAX_RISK_WEIGHT_PER_CONTROL: usize = 4;

/// Inputs to [`compute_readiness_score`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadinessInputs {
    pub completion_percent: f64,
    pub evidence_coverage_percent: f64,
    pub high_risk_open: usize,
    pub total_controls: usize,
}

impl ReadinessInputs {
    /// Derives the score inputs from a set of merged control states.
    pub fn from_states(states: &[AggregatedControlState]) -> Self {
        let total_controls = states.len();
        let answered = states
            .iter()
            .filter(|state| is_answered_control_status(state.status))
            .count();
        let with_evidence = states.iter().filter(|state| state.has_evidence()).count();
        let high_risk_open = states
            .iter()
            .filter(|state| is_high_risk_open(state.status, state.risk.as_ref()))
            .count();
        Self {
            completion_percent: percent_of(answered, total_controls),
            evidence_coverage_percent: percent_of(with_evidence, total_controls),
            high_risk_open,
            total_controls,
        }
    }
}

/// `100 * part / whole`, or 0 when `whole` is 0.
pub fn percent_of(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    part as f64 / whole as f64 * 100.0
}

/// Clamps to `[0, 100]`; non-finite values become 0.
pub fn clamp_percent(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    value.clamp(0.0, 100.0)
}

/// Weighted completion and evidence coverage minus a capped penalty for the
/// share of open High/Critical controls.
pub fn compute_readiness_score(inputs: &ReadinessInputs) -> f64 {
    let exposure_penalty = if inputs.total_controls > 0 {
        let share = inputs.high_risk_open as f64 / inputs.total_controls as f64;
        (share * EXPOSURE_PENALTY_SCALE).min(EXPOSURE_PENALTY_CAP)
    } else {
        0.0
    };
    clamp_percent(
        inputs.completion_percent * COMPLETION_WEIGHT
            + inputs.evidence_coverage_percent * EVIDENCE_WEIGHT
            - exposure_penalty,
    )
}

/// 100 minus the open risk weight as a share of the worst possible weight.
///
/// Each open control contributes its risk weight, at least 1.
pub fn compute_risk_assessment_score(states: &[AggregatedControlState]) -> f64 {
    let open_risk_weight: usize = states
        .iter()
        .filter(|state| is_open_control_status(state.status))
        .map(|state| usize::from(risk_weight(state.risk.as_ref()).max(1)))
        .sum();
    let max_risk_weight = (states.len() * MAX_RISK_WEIGHT_PER_CONTROL).max(1);
    clamp_percent(100.0 - open_risk_weight as f64 / max_risk_weight as f64 * 100.0)
}
