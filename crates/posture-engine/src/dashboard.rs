//! Composes merged states into the vendor assessment view and the customer
//! portfolio view.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use posture_types::{
    AggregatedControlState, AssessmentSnapshot, PortfolioSnapshot, ReviewStatus, RiskLevel,
};
use serde::{Deserialize, Serialize};

use crate::precedence::{is_answered_control_status, is_open_control_status};
use crate::queue::{request_queue, sort_by_risk_then_due, PriorityRow, QueueLimits};
use crate::readiness::percent_of;
use crate::rollup::{build_domain_rollups, build_framework_rollups, DomainRollup, FrameworkRollup};
use crate::source::aggregate_assessment;
use crate::summary::{status_distribution, summarize_assessment, AssessmentSummary, StatusCount};

/// Vendor-side view of one assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentPosture {
    pub assessment_id: String,
    pub assessment_name: String,
    pub generated_at: DateTime<Utc>,
    pub summary: AssessmentSummary,
    pub status_distribution: Vec<StatusCount>,
    pub domain_rollups: Vec<DomainRollup>,
    pub framework_rollups: Vec<FrameworkRollup>,
    pub request_queue: Vec<AggregatedControlState>,
    pub states: Vec<AggregatedControlState>,
}

#[tracing::instrument(
    level = "debug",
    skip_all,
    fields(assessment_id = %snapshot.assessment_id)
)]
pub fn build_assessment_posture(
    snapshot: &AssessmentSnapshot,
    limits: &QueueLimits,
    now: DateTime<Utc>,
) -> AssessmentPosture {
    let states = aggregate_assessment(snapshot, now);
    let posture = AssessmentPosture {
        assessment_id: snapshot.assessment_id.clone(),
        assessment_name: snapshot.assessment_name.clone(),
        generated_at: now,
        summary: summarize_assessment(&states),
        status_distribution: status_distribution(&states),
        domain_rollups: build_domain_rollups(&states, limits.top_gaps),
        framework_rollups: build_framework_rollups(&states, limits.top_gaps),
        request_queue: request_queue(&states, limits.request_queue),
        states,
    };
    tracing::debug!(
        controls = posture.states.len(),
        requests = posture.request_queue.len(),
        readiness = posture.summary.readiness_score,
        "assessment posture built"
    );
    posture
}

/// One assessment's line on the customer portfolio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioRow {
    pub assessment_id: String,
    pub assessment_name: String,
    pub framework_keys: Vec<String>,
    #[serde(flatten)]
    pub summary: AssessmentSummary,
    pub reviewer_queue_count: usize,
}

/// A control waiting on the customer, tagged with its assessment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewQueueEntry {
    pub assessment_id: String,
    #[serde(flatten)]
    pub state: AggregatedControlState,
}

impl PriorityRow for ReviewQueueEntry {
    fn priority_risk(&self) -> Option<&RiskLevel> {
        self.state.risk.as_ref()
    }

    fn priority_due_date(&self) -> Option<DateTime<Utc>> {
        self.state.due_date
    }
}

/// Customer-side view across every assessment in a portfolio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioPosture {
    pub generated_at: DateTime<Utc>,
    pub total_controls: usize,
    pub completion_percent: f64,
    pub evidence_coverage_percent: f64,
    pub sla_adherence_percent: f64,
    pub status_distribution: Vec<StatusCount>,
    pub rows: Vec<PortfolioRow>,
    pub review_queue: Vec<ReviewQueueEntry>,
}

/// Only controls with a record in the selected family reach the customer's
/// review queue and SLA figure.
fn has_record(state: &AggregatedControlState) -> bool {
    state.source.is_some()
}

/// Whether a control needs the customer reviewer's attention.
pub fn needs_customer_review(state: &AggregatedControlState) -> bool {
    let review_pending = state.review_status.is_some_and(|status| {
        matches!(
            status,
            ReviewStatus::Submitted
                | ReviewStatus::UnderReview
                | ReviewStatus::NeedsInfo
                | ReviewStatus::Rejected
        )
    });
    state.pending_evidence_review_count > 0
        || review_pending
        || state.poam_open_count > 0
        || (is_answered_control_status(state.status) && !state.has_evidence())
}

/// Whether a response or its evidence sits in a reviewer's inbox.
pub fn is_in_reviewer_queue(state: &AggregatedControlState) -> bool {
    let response_waiting = state.review_status.is_some_and(|status| {
        matches!(
            status,
            ReviewStatus::Submitted | ReviewStatus::UnderReview | ReviewStatus::NeedsInfo
        )
    });
    let evidence_waiting = state.evidence_review_status.is_some_and(|status| {
        matches!(
            status,
            ReviewStatus::Submitted
                | ReviewStatus::UnderReview
                | ReviewStatus::NeedsInfo
                | ReviewStatus::Rejected
        )
    });
    response_waiting || evidence_waiting
}

/// Share of open controls that are not past due; 100 when nothing is open.
pub fn sla_adherence_percent(states: &[AggregatedControlState], now: DateTime<Utc>) -> f64 {
    let open: Vec<&AggregatedControlState> = states
        .iter()
        .filter(|state| is_open_control_status(state.status))
        .collect();
    if open.is_empty() {
        return 100.0;
    }
    let on_track = open
        .iter()
        .filter(|state| state.due_date.map_or(true, |due| due >= now))
        .count();
    percent_of(on_track, open.len())
}

fn framework_keys(states: &[AggregatedControlState]) -> Vec<String> {
    states
        .iter()
        .map(|state| state.framework_key.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

#[tracing::instrument(
    level = "debug",
    skip_all,
    fields(assessments = snapshot.assessments.len())
)]
pub fn build_portfolio_posture(
    snapshot: &PortfolioSnapshot,
    limits: &QueueLimits,
    now: DateTime<Utc>,
) -> PortfolioPosture {
    let mut rows = Vec::with_capacity(snapshot.assessments.len());
    let mut all_states = Vec::new();
    let mut recorded_states = Vec::new();
    let mut review_queue = Vec::new();

    for assessment in &snapshot.assessments {
        let states = aggregate_assessment(assessment, now);
        rows.push(PortfolioRow {
            assessment_id: assessment.assessment_id.clone(),
            assessment_name: assessment.assessment_name.clone(),
            framework_keys: framework_keys(&states),
            summary: summarize_assessment(&states),
            reviewer_queue_count: states.iter().filter(|state| is_in_reviewer_queue(state)).count(),
        });
        review_queue.extend(
            states
                .iter()
                .filter(|state| has_record(state) && needs_customer_review(state))
                .map(|state| ReviewQueueEntry {
                    assessment_id: assessment.assessment_id.clone(),
                    state: state.clone(),
                }),
        );
        recorded_states.extend(states.iter().filter(|state| has_record(state)).cloned());
        all_states.extend(states);
    }

    sort_by_risk_then_due(&mut review_queue);
    let pending_reviews = review_queue.len();
    review_queue.truncate(limits.review_queue);

    let summary = summarize_assessment(&all_states);
    tracing::debug!(
        controls = all_states.len(),
        pending_reviews,
        "portfolio posture built"
    );
    PortfolioPosture {
        generated_at: now,
        total_controls: summary.total_controls,
        completion_percent: summary.completion_percent,
        evidence_coverage_percent: summary.evidence_coverage_percent,
        sla_adherence_percent: sla_adherence_percent(&recorded_states, now),
        status_distribution: status_distribution(&all_states),
        rows,
        review_queue,
    }
}
