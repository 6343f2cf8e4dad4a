//! Chooses the record family for an assessment and merges every control in
//! scope from that family alone.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use posture_types::{
    AggregatedControlState, AssessmentSnapshot, ControlMetadata, CurrentRecord, LegacyRecord,
    RawControlRecord, RecordFamily,
};

use crate::merge::merge_control_records;

/// Any control response switches the whole assessment to the current family.
pub fn select_record_source(legacy: &[LegacyRecord], current: &[CurrentRecord]) -> RecordFamily {
    if current.is_empty() {
        tracing::debug!(
            legacy_records = legacy.len(),
            "no control responses; falling back to legacy findings"
        );
        RecordFamily::Legacy
    } else {
        RecordFamily::Current
    }
}

/// Groups the selected family's records by control id, keeping fetch order.
pub fn group_records_by_control(
    family: RecordFamily,
    legacy: &[LegacyRecord],
    current: &[CurrentRecord],
) -> HashMap<String, Vec<RawControlRecord>> {
    let records: Vec<RawControlRecord> = match family {
        RecordFamily::Legacy => legacy.iter().cloned().map(RawControlRecord::from).collect(),
        RecordFamily::Current => current.iter().cloned().map(RawControlRecord::from).collect(),
    };
    let mut grouped: HashMap<String, Vec<RawControlRecord>> = HashMap::new();
    for record in records {
        grouped
            .entry(record.control_id().to_string())
            .or_default()
            .push(record);
    }
    grouped
}

/// Builds one merged state per catalogue control, in catalogue order.
///
/// Controls without records in the selected family merge from zero records.
/// Records pointing at controls outside the catalogue are skipped.
pub fn build_control_states(
    controls: &[ControlMetadata],
    legacy: &[LegacyRecord],
    current: &[CurrentRecord],
    now: DateTime<Utc>,
) -> Vec<AggregatedControlState> {
    let family = select_record_source(legacy, current);
    let mut grouped = group_records_by_control(family, legacy, current);

    let catalogue: HashSet<&str> = controls.iter().map(|control| control.id.as_str()).collect();
    let orphaned = grouped
        .keys()
        .filter(|control_id| !catalogue.contains(control_id.as_str()))
        .count();
    if orphaned > 0 {
        tracing::warn!(
            orphaned_controls = orphaned,
            family = family.as_str(),
            "skipping records for controls outside the assessment catalogue"
        );
    }

    controls
        .iter()
        .map(|control| {
            let records = grouped.remove(&control.id).unwrap_or_default();
            merge_control_records(control, &records, now)
        })
        .collect()
}

/// Merged control states for a fetched assessment snapshot.
#[tracing::instrument(
    level = "debug",
    skip_all,
    fields(assessment_id = %snapshot.assessment_id, controls = snapshot.controls.len())
)]
pub fn aggregate_assessment(
    snapshot: &AssessmentSnapshot,
    now: DateTime<Utc>,
) -> Vec<AggregatedControlState> {
    build_control_states(
        &snapshot.controls,
        &snapshot.legacy_records,
        &snapshot.current_records,
        now,
    )
}
