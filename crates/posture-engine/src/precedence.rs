//! Merge precedence for control status and risk.
//!
//! Status merges optimistically (best status seen wins) while risk escalates
//! to the worst level seen. Both folds keep `current` on ties.

use posture_types::{ControlStatus, RiskLevel};

/// Best-to-worst order used when folding duplicate status records.
pub const STATUS_PRECEDENCE: [ControlStatus; 6] = [
    ControlStatus::Implemented,
    ControlStatus::PartiallyImplemented,
    ControlStatus::NotApplicable,
    ControlStatus::ReviewRequired,
    ControlStatus::InProgress,
    ControlStatus::NotImplemented,
];

/// Minimum risk weight counted as high risk (High or Critical).
pub const HIGH_RISK_WEIGHT: u8 = 3;

/// Position in [`STATUS_PRECEDENCE`]; values outside it rank last.
pub fn status_rank(status: ControlStatus) -> usize {
    STATUS_PRECEDENCE
        .iter()
        .position(|candidate| *candidate == status)
        .unwrap_or(STATUS_PRECEDENCE.len())
}

/// Returns whichever status ranks better, keeping `current` on a tie.
pub fn pick_best_status(current: Option<ControlStatus>, next: ControlStatus) -> ControlStatus {
    match current {
        None => next,
        Some(current) if status_rank(next) < status_rank(current) => next,
        Some(current) => current,
    }
}

/// Severity weight for an optional risk; absent risk weighs 0.
pub fn risk_weight(risk: Option<&RiskLevel>) -> u8 {
    risk.map_or(0, RiskLevel::weight)
}

/// Returns whichever risk weighs strictly more, keeping `current` on a tie.
pub fn pick_worst_risk(
    current: Option<&RiskLevel>,
    next: Option<&RiskLevel>,
) -> Option<RiskLevel> {
    match (current, next) {
        (None, next) => next.cloned(),
        (current, None) => current.cloned(),
        (Some(current), Some(next)) if next.weight() > current.weight() => Some(next.clone()),
        (Some(current), Some(_)) => Some(current.clone()),
    }
}

/// Open controls still need remediation work.
pub fn is_open_control_status(status: ControlStatus) -> bool {
    matches!(
        status,
        ControlStatus::NotImplemented
            | ControlStatus::PartiallyImplemented
            | ControlStatus::ReviewRequired
            | ControlStatus::InProgress
    )
}

/// Answered controls carry any recognized status except `NOT_IMPLEMENTED`.
pub fn is_answered_control_status(status: ControlStatus) -> bool {
    !matches!(
        status,
        ControlStatus::NotImplemented | ControlStatus::Unrecognized
    )
}

/// Open status combined with a High or Critical risk.
pub fn is_high_risk_open(status: ControlStatus, risk: Option<&RiskLevel>) -> bool {
    is_open_control_status(status) && risk_weight(risk) >= HIGH_RISK_WEIGHT
}
