use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use posture_engine::{
    due_label, AssessmentPosture, ControlGap, PortfolioPosture, RollupCounts, StatusCount,
};
use posture_types::{AggregatedControlState, RiskLevel};
use serde::Serialize;

fn risk_text(risk: Option<&RiskLevel>) -> &str {
    risk.map(RiskLevel::as_str)
        .filter(|value| !value.trim().is_empty())
        .unwrap_or("none")
}

fn gaps_text(gaps: &[ControlGap]) -> String {
    if gaps.is_empty() {
        return "none".to_string();
    }
    gaps.iter()
        .map(|gap| format!("{}:{}", gap.code, risk_text(gap.risk.as_ref())))
        .collect::<Vec<_>>()
        .join(",")
}

fn distribution_text(distribution: &[StatusCount]) -> String {
    distribution
        .iter()
        .map(|entry| format!("{}:{}", entry.status.label(), entry.count))
        .collect::<Vec<_>>()
        .join(", ")
}

fn counts_text(counts: &RollupCounts) -> String {
    format!(
        "total={} answered={} implemented={} partial={} missing={} completion={:.1} evidence={:.1} high_risk={}",
        counts.total_controls,
        counts.answered_controls,
        counts.implemented_controls,
        counts.partial_controls,
        counts.missing_controls,
        counts.completion_percent(),
        counts.evidence_coverage_percent,
        counts.high_risk_count
    )
}

fn queue_line(state: &AggregatedControlState, now: DateTime<Utc>) -> String {
    format!(
        "{} {} status={} risk={} due={} owner={} evidence={} poam_open={}",
        state.code,
        state.title,
        state.status.label(),
        risk_text(state.risk.as_ref()),
        due_label(state.due_date, now),
        state
            .owner
            .as_deref()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or("unassigned"),
        state.evidence_count,
        state.poam_open_count
    )
}

pub fn render_assessment_text(posture: &AssessmentPosture) -> String {
    let summary = &posture.summary;
    let mut lines = vec![format!(
        "assessment posture: id={} name={} controls={} readiness={:.1} completion={:.1} evidence={:.1} high_risk_open={} risk_score={:.1} overdue_poam={} awaiting_review={} needs_info_or_rejected={}",
        posture.assessment_id,
        posture.assessment_name,
        summary.total_controls,
        summary.readiness_score,
        summary.completion_percent,
        summary.evidence_coverage_percent,
        summary.high_risk_open,
        summary.risk_assessment_score,
        summary.overdue_poam_count,
        summary.awaiting_customer_review,
        summary.needs_info_or_rejected
    )];
    lines.push(format!(
        "status distribution: {}",
        distribution_text(&posture.status_distribution)
    ));
    for rollup in &posture.domain_rollups {
        lines.push(format!(
            "domain {}: {} top_gaps={}",
            rollup.domain,
            counts_text(&rollup.counts),
            gaps_text(&rollup.top_gaps)
        ));
    }
    for rollup in &posture.framework_rollups {
        lines.push(format!(
            "framework {} ({}): {} top_gaps={}",
            rollup.framework_key,
            rollup.framework_name,
            counts_text(&rollup.counts),
            gaps_text(&rollup.top_gaps)
        ));
    }
    lines.push(format!("request queue: {}", posture.request_queue.len()));
    for state in &posture.request_queue {
        lines.push(format!("  {}", queue_line(state, posture.generated_at)));
    }
    lines.join("\n")
}

pub fn render_portfolio_text(posture: &PortfolioPosture) -> String {
    let mut lines = vec![format!(
        "portfolio posture: assessments={} controls={} completion={:.1} evidence={:.1} sla_adherence={:.1}",
        posture.rows.len(),
        posture.total_controls,
        posture.completion_percent,
        posture.evidence_coverage_percent,
        posture.sla_adherence_percent
    )];
    lines.push(format!(
        "status distribution: {}",
        distribution_text(&posture.status_distribution)
    ));
    for row in &posture.rows {
        let frameworks = if row.framework_keys.is_empty() {
            "none".to_string()
        } else {
            row.framework_keys.join(",")
        };
        lines.push(format!(
            "assessment {} ({}): frameworks={} controls={} completion={:.1} evidence={:.1} readiness={:.1} reviewer_queue={} overdue_poam={}",
            row.assessment_id,
            row.assessment_name,
            frameworks,
            row.summary.total_controls,
            row.summary.completion_percent,
            row.summary.evidence_coverage_percent,
            row.summary.readiness_score,
            row.reviewer_queue_count,
            row.summary.overdue_poam_count
        ));
    }
    lines.push(format!("review queue: {}", posture.review_queue.len()));
    for entry in &posture.review_queue {
        lines.push(format!(
            "  [{}] {}",
            entry.assessment_id,
            queue_line(&entry.state, posture.generated_at)
        ));
    }
    lines.join("\n")
}

pub fn render_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("failed to serialize posture report")
}
