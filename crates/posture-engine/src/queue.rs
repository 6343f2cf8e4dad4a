//! Risk-then-due ordering shared by every work queue and top-gap list.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use posture_types::{AggregatedControlState, RiskLevel};
use serde::{Deserialize, Serialize};

use crate::precedence::risk_weight;

pub const DEFAULT_REQUEST_QUEUE_LIMIT: usize = 15;
pub const DEFAULT_REVIEW_QUEUE_LIMIT: usize = 12;
pub const DEFAULT_TOP_GAPS_LIMIT: usize = 3;

/// Truncation limits for queue surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueLimits {
    /// Vendor request queue length.
    pub request_queue: usize,
    /// Customer review queue length.
    pub review_queue: usize,
    /// Gaps listed per rollup group.
    pub top_gaps: usize,
}

impl Default for QueueLimits {
    fn default() -> Self {
        Self {
            request_queue: DEFAULT_REQUEST_QUEUE_LIMIT,
            review_queue: DEFAULT_REVIEW_QUEUE_LIMIT,
            top_gaps: DEFAULT_TOP_GAPS_LIMIT,
        }
    }
}

/// Row that can be prioritized by risk and due date.
pub trait PriorityRow {
    fn priority_risk(&self) -> Option<&RiskLevel>;
    fn priority_due_date(&self) -> Option<DateTime<Utc>>;
}

impl PriorityRow for AggregatedControlState {
    fn priority_risk(&self) -> Option<&RiskLevel> {
        self.risk.as_ref()
    }

    fn priority_due_date(&self) -> Option<DateTime<Utc>> {
        self.due_date
    }
}

impl<T: PriorityRow + ?Sized> PriorityRow for &T {
    fn priority_risk(&self) -> Option<&RiskLevel> {
        (**self).priority_risk()
    }

    fn priority_due_date(&self) -> Option<DateTime<Utc>> {
        (**self).priority_due_date()
    }
}

/// Heavier risk first, then sooner due date; missing due dates sort last.
pub fn compare_risk_then_due<T: PriorityRow + ?Sized>(left: &T, right: &T) -> Ordering {
    risk_weight(right.priority_risk())
        .cmp(&risk_weight(left.priority_risk()))
        .then_with(|| {
            match (left.priority_due_date(), right.priority_due_date()) {
                (Some(left), Some(right)) => left.cmp(&right),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            }
        })
}

/// Stable in-place sort by [`compare_risk_then_due`].
pub fn sort_by_risk_then_due<T: PriorityRow>(rows: &mut [T]) {
    rows.sort_by(compare_risk_then_due);
}

/// Sorted copy of `rows`, leaving the input untouched.
pub fn sorted_by_risk_then_due<T: PriorityRow + Clone>(rows: &[T]) -> Vec<T> {
    let mut sorted = rows.to_vec();
    sort_by_risk_then_due(&mut sorted);
    sorted
}

/// Vendor-facing queue: controls carrying a customer request, worst first.
pub fn request_queue(
    states: &[AggregatedControlState],
    limit: usize,
) -> Vec<AggregatedControlState> {
    let mut queue: Vec<AggregatedControlState> = states
        .iter()
        .filter(|state| state.has_customer_request)
        .cloned()
        .collect();
    sort_by_risk_then_due(&mut queue);
    queue.truncate(limit);
    queue
}
