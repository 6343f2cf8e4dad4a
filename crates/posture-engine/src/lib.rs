//! Compliance posture aggregation.
//!
//! Merges raw control records into one state per control, then derives the
//! readiness score, domain and framework rollups, prioritized work queues and
//! due-date labels the vendor and customer views render.

mod dashboard;
mod due;
mod merge;
mod precedence;
mod queue;
mod readiness;
mod review;
mod rollup;
mod source;
mod summary;

pub use dashboard::{
    build_assessment_posture, build_portfolio_posture, is_in_reviewer_queue,
    needs_customer_review, sla_adherence_percent, AssessmentPosture, PortfolioPosture,
    PortfolioRow, ReviewQueueEntry,
};
pub use due::{due_label, DueLabel};
pub use merge::{has_customer_request, merge_control_records, DEFAULT_CONTROL_STATUS};
pub use precedence::{
    is_answered_control_status, is_high_risk_open, is_open_control_status, pick_best_status,
    pick_worst_risk, risk_weight, status_rank, HIGH_RISK_WEIGHT, STATUS_PRECEDENCE,
};
pub use queue::{
    compare_risk_then_due, request_queue, sort_by_risk_then_due, sorted_by_risk_then_due,
    PriorityRow, QueueLimits, DEFAULT_REQUEST_QUEUE_LIMIT, DEFAULT_REVIEW_QUEUE_LIMIT,
    DEFAULT_TOP_GAPS_LIMIT,
};
pub use readiness::{
    clamp_percent, compute_readiness_score, compute_risk_assessment_score, percent_of,
    ReadinessInputs,
};
pub use review::{
    open_poam_count, overdue_poam_count, pending_evidence_review_count, rejected_evidence_count,
    worst_evidence_review_status, worst_poam_status, EVIDENCE_REVIEW_SEVERITY,
    POAM_STATUS_SEVERITY,
};
pub use rollup::{
    build_domain_rollups, build_framework_rollups, domain_label, top_gaps, ControlGap,
    DomainRollup, FrameworkRollup, RollupCounts, UNCATEGORIZED_DOMAIN,
};
pub use source::{
    aggregate_assessment, build_control_states, group_records_by_control, select_record_source,
};
pub use summary::{status_distribution, summarize_assessment, AssessmentSummary, StatusCount};
