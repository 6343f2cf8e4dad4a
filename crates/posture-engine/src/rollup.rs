//! Per-domain and per-framework coverage rollups with ranked top gaps.

use std::collections::BTreeMap;

use posture_types::{AggregatedControlState, ControlStatus, RiskLevel};
use serde::{Deserialize, Serialize};

use crate::precedence::{is_answered_control_status, is_high_risk_open, is_open_control_status};
use crate::queue::sort_by_risk_then_due;
use crate::readiness::percent_of;

/// Label for controls whose catalogue entry has no domain.
pub const UNCATEGORIZED_DOMAIN: &str = "Uncategorized";

/// Compact projection of an open control listed as a gap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlGap {
    pub id: String,
    pub code: String,
    pub title: String,
    pub status: ControlStatus,
    pub risk: Option<RiskLevel>,
}

impl From<&AggregatedControlState> for ControlGap {
    fn from(state: &AggregatedControlState) -> Self {
        Self {
            id: state.control_id.clone(),
            code: state.code.clone(),
            title: state.title.clone(),
            status: state.status,
            risk: state.risk.clone(),
        }
    }
}

/// Counters shared by every rollup grouping.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollupCounts {
    pub total_controls: usize,
    pub answered_controls: usize,
    pub implemented_controls: usize,
    pub partial_controls: usize,
    pub missing_controls: usize,
    pub evidence_coverage_percent: f64,
    pub high_risk_count: usize,
}

impl RollupCounts {
    pub fn from_states(states: &[&AggregatedControlState]) -> Self {
        let total_controls = states.len();
        let answered_controls = states
            .iter()
            .filter(|state| is_answered_control_status(state.status))
            .count();
        let count_status = |status: ControlStatus| {
            states.iter().filter(|state| state.status == status).count()
        };
        let evidence_covered = states.iter().filter(|state| state.has_evidence()).count();
        Self {
            total_controls,
            answered_controls,
            implemented_controls: count_status(ControlStatus::Implemented),
            partial_controls: count_status(ControlStatus::PartiallyImplemented),
            missing_controls: total_controls - answered_controls,
            evidence_coverage_percent: percent_of(evidence_covered, total_controls),
            high_risk_count: states
                .iter()
                .filter(|state| is_high_risk_open(state.status, state.risk.as_ref()))
                .count(),
        }
    }

    pub fn completion_percent(&self) -> f64 {
        percent_of(self.answered_controls, self.total_controls)
    }

    pub fn implemented_percent(&self) -> f64 {
        percent_of(self.implemented_controls, self.total_controls)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainRollup {
    pub domain: String,
    #[serde(flatten)]
    pub counts: RollupCounts,
    pub top_gaps: Vec<ControlGap>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameworkRollup {
    pub framework_key: String,
    pub framework_name: String,
    #[serde(flatten)]
    pub counts: RollupCounts,
    pub top_gaps: Vec<ControlGap>,
}

/// Open controls ranked risk-then-due, truncated to `limit`.
pub fn top_gaps(states: &[&AggregatedControlState], limit: usize) -> Vec<ControlGap> {
    let mut open: Vec<&AggregatedControlState> = states
        .iter()
        .copied()
        .filter(|state| is_open_control_status(state.status))
        .collect();
    sort_by_risk_then_due(&mut open);
    open.into_iter().take(limit).map(ControlGap::from).collect()
}

pub fn domain_label(state: &AggregatedControlState) -> &str {
    state
        .domain
        .as_deref()
        .filter(|domain| !domain.trim().is_empty())
        .unwrap_or(UNCATEGORIZED_DOMAIN)
}

/// Rollups by domain, least complete first, then by domain name.
pub fn build_domain_rollups(
    states: &[AggregatedControlState],
    top_gaps_limit: usize,
) -> Vec<DomainRollup> {
    let mut groups: BTreeMap<&str, Vec<&AggregatedControlState>> = BTreeMap::new();
    for state in states {
        groups.entry(domain_label(state)).or_default().push(state);
    }

    let mut rollups: Vec<DomainRollup> = groups
        .into_iter()
        .map(|(domain, rows)| DomainRollup {
            domain: domain.to_string(),
            counts: RollupCounts::from_states(&rows),
            top_gaps: top_gaps(&rows, top_gaps_limit),
        })
        .collect();
    rollups.sort_by(|left, right| {
        left.counts
            .completion_percent()
            .total_cmp(&right.counts.completion_percent())
            .then_with(|| left.domain.cmp(&right.domain))
    });
    rollups
}

/// Rollups by framework key, most implemented first, then by key.
pub fn build_framework_rollups(
    states: &[AggregatedControlState],
    top_gaps_limit: usize,
) -> Vec<FrameworkRollup> {
    let mut groups: BTreeMap<&str, Vec<&AggregatedControlState>> = BTreeMap::new();
    for state in states {
        groups
            .entry(state.framework_key.as_str())
            .or_default()
            .push(state);
    }

    let mut rollups: Vec<FrameworkRollup> = groups
        .into_iter()
        .map(|(framework_key, rows)| FrameworkRollup {
            framework_key: framework_key.to_string(),
            framework_name: rows
                .first()
                .map(|state| state.framework_name.clone())
                .unwrap_or_default(),
            counts: RollupCounts::from_states(&rows),
            top_gaps: top_gaps(&rows, top_gaps_limit),
        })
        .collect();
    rollups.sort_by(|left, right| {
        right
            .counts
            .implemented_percent()
            .total_cmp(&left.counts.implemented_percent())
            .then_with(|| left.framework_key.cmp(&right.framework_key))
    });
    rollups
}
