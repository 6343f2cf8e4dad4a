//! Summaries over nested evidence submissions and POA&M items.

use chrono::{DateTime, Utc};
use posture_types::{EvidenceSubmission, PoamItem, PoamStatus, ReviewStatus};

/// Worst-first order for evidence review outcomes.
pub const EVIDENCE_REVIEW_SEVERITY: [ReviewStatus; 5] = [
    ReviewStatus::Rejected,
    ReviewStatus::NeedsInfo,
    ReviewStatus::UnderReview,
    ReviewStatus::Submitted,
    ReviewStatus::Approved,
];

/// Worst-first order for remediation item status.
pub const POAM_STATUS_SEVERITY: [PoamStatus; 4] = [
    PoamStatus::Blocked,
    PoamStatus::Open,
    PoamStatus::InProgress,
    PoamStatus::Done,
];

/// Returns the value ranking earliest in `order`, ties resolved by input
/// position. Values missing from `order` rank after every listed value.
fn worst_by_order<T, I>(values: I, order: &[T]) -> Option<T>
where
    T: Copy + PartialEq,
    I: IntoIterator<Item = T>,
{
    let rank = |value: &T| {
        order
            .iter()
            .position(|candidate| candidate == value)
            .unwrap_or(order.len())
    };
    values.into_iter().fold(None, |worst, value| match worst {
        Some(current) if rank(&current) <= rank(&value) => Some(current),
        _ => Some(value),
    })
}

/// Single worst review status across a control's evidence submissions.
pub fn worst_evidence_review_status(submissions: &[EvidenceSubmission]) -> Option<ReviewStatus> {
    worst_by_order(
        submissions.iter().map(|submission| submission.review_status),
        &EVIDENCE_REVIEW_SEVERITY,
    )
}

/// Single worst status across a control's remediation items.
pub fn worst_poam_status(items: &[PoamItem]) -> Option<PoamStatus> {
    worst_by_order(items.iter().map(|item| item.status), &POAM_STATUS_SEVERITY)
}

/// Submissions still in the reviewer's court or returned to the vendor.
pub fn pending_evidence_review_count(submissions: &[EvidenceSubmission]) -> usize {
    submissions
        .iter()
        .filter(|submission| {
            submission.review_status.is_awaiting_review() || submission.review_status.is_returned()
        })
        .count()
}

pub fn rejected_evidence_count(submissions: &[EvidenceSubmission]) -> usize {
    submissions
        .iter()
        .filter(|submission| submission.review_status == ReviewStatus::Rejected)
        .count()
}

pub fn open_poam_count(items: &[PoamItem]) -> usize {
    items.iter().filter(|item| !item.status.is_done()).count()
}

pub fn overdue_poam_count(items: &[PoamItem], now: DateTime<Utc>) -> usize {
    items.iter().filter(|item| item.is_overdue(now)).count()
}
