//! Serialized form of the records a persistence layer fetched for one or more
//! assessments, plus the invariants checked before aggregation.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::records::{ControlMetadata, CurrentRecord, LegacyRecord};

pub const SNAPSHOT_SCHEMA_VERSION: u32 = 1;

fn snapshot_schema_version() -> u32 {
    SNAPSHOT_SCHEMA_VERSION
}

/// Error raised when a fetched snapshot violates a record-shape invariant.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to decode snapshot: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("unsupported snapshot schema version {found} (expected {expected})")]
    UnsupportedSchemaVersion { found: u32, expected: u32 },
    #[error("assessment at index {index} has an empty assessment id")]
    EmptyAssessmentId { index: usize },
    #[error("snapshot contains duplicate assessment id '{assessment_id}'")]
    DuplicateAssessment { assessment_id: String },
    #[error("assessment '{assessment_id}' lists control '{control_id}' more than once")]
    DuplicateControl {
        assessment_id: String,
        control_id: String,
    },
    #[error("assessment '{assessment_id}' has more than one control response for control '{control_id}'")]
    DuplicateCurrentRecord {
        assessment_id: String,
        control_id: String,
    },
}

/// Everything fetched for a single assessment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentSnapshot {
    #[serde(default = "snapshot_schema_version")]
    pub schema_version: u32,
    pub assessment_id: String,
    #[serde(default)]
    pub assessment_name: String,
    /// Controls in scope for the assessment.
    #[serde(default)]
    pub controls: Vec<ControlMetadata>,
    #[serde(default)]
    pub legacy_records: Vec<LegacyRecord>,
    #[serde(default)]
    pub current_records: Vec<CurrentRecord>,
}

/// Snapshot of several assessments, as shown on the customer portfolio view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSnapshot {
    pub schema_version: u32,
    #[serde(default)]
    pub assessments: Vec<AssessmentSnapshot>,
}

impl PortfolioSnapshot {
    pub fn find_assessment(&self, assessment_id: &str) -> Option<&AssessmentSnapshot> {
        self.assessments
            .iter()
            .find(|assessment| assessment.assessment_id == assessment_id)
    }
}

pub fn parse_portfolio_snapshot(raw: &str) -> Result<PortfolioSnapshot, SnapshotError> {
    let snapshot = serde_json::from_str::<PortfolioSnapshot>(raw)?;
    validate_portfolio_snapshot(&snapshot)?;
    Ok(snapshot)
}

pub fn validate_portfolio_snapshot(snapshot: &PortfolioSnapshot) -> Result<(), SnapshotError> {
    ensure_schema_version(snapshot.schema_version)?;
    let mut assessment_ids = HashSet::new();
    for (index, assessment) in snapshot.assessments.iter().enumerate() {
        validate_assessment_snapshot(assessment, index)?;
        if !assessment_ids.insert(assessment.assessment_id.trim()) {
            return Err(SnapshotError::DuplicateAssessment {
                assessment_id: assessment.assessment_id.trim().to_string(),
            });
        }
    }
    Ok(())
}

pub fn validate_assessment_snapshot(
    snapshot: &AssessmentSnapshot,
    index: usize,
) -> Result<(), SnapshotError> {
    ensure_schema_version(snapshot.schema_version)?;
    if snapshot.assessment_id.trim().is_empty() {
        return Err(SnapshotError::EmptyAssessmentId { index });
    }

    let mut control_ids = HashSet::new();
    for control in &snapshot.controls {
        if !control_ids.insert(control.id.as_str()) {
            return Err(SnapshotError::DuplicateControl {
                assessment_id: snapshot.assessment_id.clone(),
                control_id: control.id.clone(),
            });
        }
    }

    let mut responded = HashSet::new();
    for record in &snapshot.current_records {
        if !responded.insert(record.control_id.as_str()) {
            return Err(SnapshotError::DuplicateCurrentRecord {
                assessment_id: snapshot.assessment_id.clone(),
                control_id: record.control_id.clone(),
            });
        }
    }
    Ok(())
}

fn ensure_schema_version(found: u32) -> Result<(), SnapshotError> {
    if found != SNAPSHOT_SCHEMA_VERSION {
        return Err(SnapshotError::UnsupportedSchemaVersion {
            found,
            expected: SNAPSHOT_SCHEMA_VERSION,
        });
    }
    Ok(())
}
