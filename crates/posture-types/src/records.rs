//! Raw per-control records as fetched by the persistence layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::risk::{deserialize_optional_risk, RiskLevel};
use crate::status::{ControlStatus, PoamStatus, ReviewStatus};

/// Catalogue metadata for one control in assessment scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlMetadata {
    pub id: String,
    pub code: String,
    pub title: String,
    #[serde(default)]
    pub domain: Option<String>,
    pub framework_id: String,
    pub framework_key: String,
    pub framework_name: String,
}

/// Historical finding row. Several may exist per (assessment, control).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyRecord {
    pub control_id: String,
    #[serde(default)]
    pub status: Option<ControlStatus>,
    #[serde(default, deserialize_with = "deserialize_optional_risk")]
    pub risk: Option<RiskLevel>,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub evidence_link_ids: Vec<String>,
}

/// Evidence submitted against a control response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvidenceSubmission {
    #[serde(default)]
    pub id: Option<String>,
    pub review_status: ReviewStatus,
}

/// Remediation task tracked against a control response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoamItem {
    #[serde(default)]
    pub id: Option<String>,
    pub status: PoamStatus,
    #[serde(default, deserialize_with = "deserialize_optional_risk")]
    pub severity: Option<RiskLevel>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
}

impl PoamItem {
    /// Returns true when the item is still open and its due date has passed.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        !self.status.is_done() && matches!(self.due_date, Some(due) if due < now)
    }
}

/// Control response row. At most one exists per (assessment, control).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentRecord {
    pub control_id: String,
    #[serde(default)]
    pub status: Option<ControlStatus>,
    #[serde(default, deserialize_with = "deserialize_optional_risk")]
    pub risk: Option<RiskLevel>,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub review_status: Option<ReviewStatus>,
    #[serde(default)]
    pub evidence_submissions: Vec<EvidenceSubmission>,
    #[serde(default)]
    pub poam_items: Vec<PoamItem>,
}

/// Which historical data shape a record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordFamily {
    Legacy,
    Current,
}

impl RecordFamily {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Legacy => "legacy",
            Self::Current => "current",
        }
    }
}

/// One fact about one control, tagged by the family it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum RawControlRecord {
    Legacy(LegacyRecord),
    Current(CurrentRecord),
}

impl RawControlRecord {
    pub fn family(&self) -> RecordFamily {
        match self {
            Self::Legacy(_) => RecordFamily::Legacy,
            Self::Current(_) => RecordFamily::Current,
        }
    }

    pub fn control_id(&self) -> &str {
        match self {
            Self::Legacy(record) => &record.control_id,
            Self::Current(record) => &record.control_id,
        }
    }

    pub fn status(&self) -> Option<ControlStatus> {
        match self {
            Self::Legacy(record) => record.status,
            Self::Current(record) => record.status,
        }
    }

    pub fn risk(&self) -> Option<&RiskLevel> {
        match self {
            Self::Legacy(record) => record.risk.as_ref(),
            Self::Current(record) => record.risk.as_ref(),
        }
    }

    pub fn owner(&self) -> Option<&str> {
        match self {
            Self::Legacy(record) => record.owner.as_deref(),
            Self::Current(record) => record.owner.as_deref(),
        }
    }

    pub fn due_date(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Legacy(record) => record.due_date,
            Self::Current(record) => record.due_date,
        }
    }

    /// Linked evidence for legacy rows, submissions for current rows.
    pub fn evidence_count(&self) -> usize {
        match self {
            Self::Legacy(record) => record.evidence_link_ids.len(),
            Self::Current(record) => record.evidence_submissions.len(),
        }
    }
}

impl From<LegacyRecord> for RawControlRecord {
    fn from(record: LegacyRecord) -> Self {
        Self::Legacy(record)
    }
}

impl From<CurrentRecord> for RawControlRecord {
    fn from(record: CurrentRecord) -> Self {
        Self::Current(record)
    }
}
