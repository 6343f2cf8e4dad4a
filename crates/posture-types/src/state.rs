use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::records::{ControlMetadata, RecordFamily};
use crate::risk::RiskLevel;
use crate::status::{ControlStatus, PoamStatus, ReviewStatus};

/// Reconciled view of one control within one assessment.
///
/// Built fresh for every read and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedControlState {
    pub control_id: String,
    pub code: String,
    pub title: String,
    pub domain: Option<String>,
    pub framework_id: String,
    pub framework_key: String,
    pub framework_name: String,
    /// Family the merged records came from; `None` when no record exists.
    pub source: Option<RecordFamily>,
    pub status: ControlStatus,
    pub risk: Option<RiskLevel>,
    pub evidence_count: usize,
    pub owner: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub review_status: Option<ReviewStatus>,
    pub evidence_review_status: Option<ReviewStatus>,
    pub pending_evidence_review_count: usize,
    pub rejected_evidence_count: usize,
    pub poam_open_count: usize,
    pub poam_overdue_count: usize,
    pub poam_status_summary: Option<PoamStatus>,
    pub has_customer_request: bool,
}

impl AggregatedControlState {
    /// Copies identity fields from catalogue metadata; everything else starts empty.
    pub fn from_metadata(metadata: &ControlMetadata, status: ControlStatus) -> Self {
        Self {
            control_id: metadata.id.clone(),
            code: metadata.code.clone(),
            title: metadata.title.clone(),
            domain: metadata.domain.clone(),
            framework_id: metadata.framework_id.clone(),
            framework_key: metadata.framework_key.clone(),
            framework_name: metadata.framework_name.clone(),
            source: None,
            status,
            risk: None,
            evidence_count: 0,
            owner: None,
            due_date: None,
            review_status: None,
            evidence_review_status: None,
            pending_evidence_review_count: 0,
            rejected_evidence_count: 0,
            poam_open_count: 0,
            poam_overdue_count: 0,
            poam_status_summary: None,
            has_customer_request: false,
        }
    }

    pub fn has_evidence(&self) -> bool {
        self.evidence_count > 0
    }
}
