//! Folds the raw records of one control into an `AggregatedControlState`.

use chrono::{DateTime, Utc};
use posture_types::{
    AggregatedControlState, ControlMetadata, ControlStatus, CurrentRecord, EvidenceSubmission,
    PoamItem, RawControlRecord, RecordFamily, RiskLevel,
};

use crate::precedence::{is_open_control_status, pick_best_status, pick_worst_risk};
use crate::review::{
    open_poam_count, overdue_poam_count, pending_evidence_review_count, rejected_evidence_count,
    worst_evidence_review_status, worst_poam_status,
};

/// Status assumed for a control with no record, or a record without a status.
pub const DEFAULT_CONTROL_STATUS: ControlStatus = ControlStatus::NotImplemented;

/// Merges every record for one control in fold order.
///
/// Legacy-only input (including no input at all) approximates the remediation
/// counters from the merged status: one open task while the control is open,
/// overdue once its due date has passed.
#[tracing::instrument(
    level = "trace",
    skip_all,
    fields(control_id = %metadata.id, records = records.len())
)]
pub fn merge_control_records(
    metadata: &ControlMetadata,
    records: &[RawControlRecord],
    now: DateTime<Utc>,
) -> AggregatedControlState {
    let mut status = None;
    let mut risk: Option<RiskLevel> = None;
    let mut evidence_count = 0usize;
    let mut owner: Option<String> = None;
    let mut due_date = None;
    let mut responses: Vec<&CurrentRecord> = Vec::new();

    for record in records {
        let record_status = record.status().unwrap_or(DEFAULT_CONTROL_STATUS);
        status = Some(pick_best_status(status, record_status));
        risk = pick_worst_risk(risk.as_ref(), record.risk());
        evidence_count += record.evidence_count();
        if owner.is_none() {
            owner = record.owner().map(str::to_string);
        }
        due_date = earliest(due_date, record.due_date());
        if let RawControlRecord::Current(response) = record {
            responses.push(response);
        }
    }

    let status = status.unwrap_or(DEFAULT_CONTROL_STATUS);
    let mut state = AggregatedControlState::from_metadata(metadata, status);
    state.risk = risk;
    state.evidence_count = evidence_count;
    state.owner = owner;
    state.due_date = due_date;

    if responses.is_empty() {
        let open = is_open_control_status(status);
        state.source = (!records.is_empty()).then_some(RecordFamily::Legacy);
        state.poam_open_count = usize::from(open);
        state.poam_overdue_count = usize::from(open && is_past(due_date, now));
        state.pending_evidence_review_count = usize::from(open && evidence_count > 0);
    } else {
        let submissions: Vec<EvidenceSubmission> = responses
            .iter()
            .flat_map(|response| response.evidence_submissions.iter().cloned())
            .collect();
        let poam_items: Vec<PoamItem> = responses
            .iter()
            .flat_map(|response| response.poam_items.iter().cloned())
            .collect();

        state.source = Some(RecordFamily::Current);
        state.review_status = responses.iter().find_map(|response| response.review_status);
        state.evidence_review_status = worst_evidence_review_status(&submissions);
        state.pending_evidence_review_count = pending_evidence_review_count(&submissions);
        state.rejected_evidence_count = rejected_evidence_count(&submissions);
        state.poam_open_count = open_poam_count(&poam_items);
        state.poam_overdue_count = overdue_poam_count(&poam_items, now);
        state.poam_status_summary = worst_poam_status(&poam_items);
    }

    state.has_customer_request = has_customer_request(&state);
    state
}

/// Whether the control belongs on the vendor's request queue.
pub fn has_customer_request(state: &AggregatedControlState) -> bool {
    is_open_control_status(state.status)
        || state.evidence_count == 0
        || state.review_status.is_some_and(|status| status.is_returned())
        || state
            .evidence_review_status
            .is_some_and(|status| status.is_returned())
        || state.poam_open_count > 0
}

fn earliest(
    current: Option<DateTime<Utc>>,
    next: Option<DateTime<Utc>>,
) -> Option<DateTime<Utc>> {
    match (current, next) {
        (Some(current), Some(next)) => Some(current.min(next)),
        (current, next) => current.or(next),
    }
}

fn is_past(date: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    matches!(date, Some(date) if date < now)
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use posture_types::{
        ControlMetadata, ControlStatus, CurrentRecord, EvidenceSubmission, LegacyRecord, PoamItem,
        PoamStatus, RawControlRecord, RecordFamily, ReviewStatus, RiskLevel,
    };

    use super::{merge_control_records, DEFAULT_CONTROL_STATUS};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 4, 15, 9, 0, 0).unwrap()
    }

    fn metadata() -> ControlMetadata {
        ControlMetadata {
            id: "ctl-ac-1".to_string(),
            code: "AC-1".to_string(),
            title: "Access Control Policy".to_string(),
            domain: Some("Access Control".to_string()),
            framework_id: "fw-nist".to_string(),
            framework_key: "NIST_CSF".to_string(),
            framework_name: "NIST CSF".to_string(),
        }
    }

    fn legacy(
        status: Option<ControlStatus>,
        risk: Option<RiskLevel>,
        owner: Option<&str>,
        due_in_days: Option<i64>,
        evidence: usize,
    ) -> RawControlRecord {
        RawControlRecord::Legacy(LegacyRecord {
            control_id: "ctl-ac-1".to_string(),
            status,
            risk,
            owner: owner.map(str::to_string),
            due_date: due_in_days.map(|days| now() + Duration::days(days)),
            evidence_link_ids: (0..evidence).map(|index| format!("ev-{index}")).collect(),
        })
    }

    fn response() -> CurrentRecord {
        CurrentRecord {
            control_id: "ctl-ac-1".to_string(),
            status: Some(ControlStatus::Implemented),
            risk: Some(RiskLevel::Low),
            owner: Some("it-ops".to_string()),
            due_date: None,
            review_status: Some(ReviewStatus::Approved),
            evidence_submissions: vec![EvidenceSubmission {
                id: Some("sub-1".to_string()),
                review_status: ReviewStatus::Approved,
            }],
            poam_items: Vec::new(),
        }
    }

    #[test]
    fn functional_legacy_history_merges_best_status_and_worst_risk() {
        let records = vec![
            legacy(
                Some(ControlStatus::NotImplemented),
                Some(RiskLevel::High),
                None,
                None,
                0,
            ),
            legacy(Some(ControlStatus::Implemented), None, None, None, 1),
            legacy(
                Some(ControlStatus::PartiallyImplemented),
                Some(RiskLevel::Medium),
                None,
                None,
                2,
            ),
        ];
        let state = merge_control_records(&metadata(), &records, now());
        assert_eq!(state.status, ControlStatus::Implemented);
        assert_eq!(state.risk, Some(RiskLevel::High));
        assert_eq!(state.evidence_count, 3);
        assert_eq!(state.source, Some(RecordFamily::Legacy));
    }

    #[test]
    fn functional_owner_is_first_non_null_and_due_date_is_earliest() {
        let records = vec![
            legacy(Some(ControlStatus::InProgress), None, None, Some(10), 0),
            legacy(Some(ControlStatus::InProgress), None, Some("alice"), None, 0),
            legacy(Some(ControlStatus::InProgress), None, Some("bob"), Some(-2), 0),
            legacy(Some(ControlStatus::InProgress), None, None, Some(4), 0),
        ];
        let state = merge_control_records(&metadata(), &records, now());
        assert_eq!(state.owner.as_deref(), Some("alice"));
        assert_eq!(state.due_date, Some(now() - Duration::days(2)));
    }

    #[test]
    fn unit_single_record_merge_is_identity() {
        let records = vec![legacy(
            Some(ControlStatus::ReviewRequired),
            Some(RiskLevel::Critical),
            Some("carol"),
            Some(7),
            2,
        )];
        let state = merge_control_records(&metadata(), &records, now());
        assert_eq!(state.status, ControlStatus::ReviewRequired);
        assert_eq!(state.risk, Some(RiskLevel::Critical));
        assert_eq!(state.owner.as_deref(), Some("carol"));
        assert_eq!(state.due_date, Some(now() + Duration::days(7)));
        assert_eq!(state.evidence_count, 2);
        assert_eq!(state.code, "AC-1");
        assert_eq!(state.framework_key, "NIST_CSF");
    }

    #[test]
    fn unit_single_current_record_merge_is_identity() {
        let mut record = response();
        record.status = Some(ControlStatus::InProgress);
        record.risk = Some(RiskLevel::High);
        record.due_date = Some(now() + Duration::days(9));
        record.review_status = Some(ReviewStatus::UnderReview);

        let records = vec![RawControlRecord::Current(record)];
        let state = merge_control_records(&metadata(), &records, now());
        assert_eq!(state.source, Some(RecordFamily::Current));
        assert_eq!(state.status, ControlStatus::InProgress);
        assert_eq!(state.risk, Some(RiskLevel::High));
        assert_eq!(state.owner.as_deref(), Some("it-ops"));
        assert_eq!(state.due_date, Some(now() + Duration::days(9)));
        assert_eq!(state.review_status, Some(ReviewStatus::UnderReview));
        assert_eq!(state.evidence_count, 1);
        assert_eq!(state.evidence_review_status, Some(ReviewStatus::Approved));
    }

    #[test]
    fn unit_no_records_defaults_to_not_implemented() {
        let state = merge_control_records(&metadata(), &[], now());
        assert_eq!(state.status, DEFAULT_CONTROL_STATUS);
        assert_eq!(state.risk, None);
        assert_eq!(state.evidence_count, 0);
        assert_eq!(state.source, None);
        assert_eq!(state.poam_open_count, 1);
        assert_eq!(state.poam_overdue_count, 0);
        assert!(state.has_customer_request);
    }

    #[test]
    fn unit_missing_record_status_is_treated_as_not_implemented() {
        let records = vec![legacy(None, Some(RiskLevel::Low), None, None, 1)];
        let state = merge_control_records(&metadata(), &records, now());
        assert_eq!(state.status, ControlStatus::NotImplemented);
    }

    #[test]
    fn functional_legacy_remediation_is_approximated_from_status() {
        let overdue = vec![legacy(Some(ControlStatus::InProgress), None, None, Some(-1), 1)];
        let state = merge_control_records(&metadata(), &overdue, now());
        assert_eq!(state.poam_open_count, 1);
        assert_eq!(state.poam_overdue_count, 1);
        assert_eq!(state.pending_evidence_review_count, 1);

        let closed = vec![legacy(Some(ControlStatus::Implemented), None, None, Some(-1), 1)];
        let state = merge_control_records(&metadata(), &closed, now());
        assert_eq!(state.poam_open_count, 0);
        assert_eq!(state.poam_overdue_count, 0);
        assert!(!state.has_customer_request);
    }

    #[test]
    fn functional_current_record_carries_review_and_remediation_detail() {
        let mut record = response();
        record.status = Some(ControlStatus::PartiallyImplemented);
        record.review_status = Some(ReviewStatus::UnderReview);
        record.evidence_submissions = vec![
            EvidenceSubmission {
                id: None,
                review_status: ReviewStatus::Approved,
            },
            EvidenceSubmission {
                id: None,
                review_status: ReviewStatus::NeedsInfo,
            },
        ];
        record.poam_items = vec![
            PoamItem {
                id: None,
                status: PoamStatus::Open,
                severity: Some(RiskLevel::High),
                due_date: Some(now() - Duration::days(3)),
            },
            PoamItem {
                id: None,
                status: PoamStatus::Done,
                severity: Some(RiskLevel::Low),
                due_date: Some(now() - Duration::days(30)),
            },
            PoamItem {
                id: None,
                status: PoamStatus::InProgress,
                severity: None,
                due_date: None,
            },
        ];
        let state =
            merge_control_records(&metadata(), &[RawControlRecord::Current(record)], now());
        assert_eq!(state.source, Some(RecordFamily::Current));
        assert_eq!(state.review_status, Some(ReviewStatus::UnderReview));
        assert_eq!(state.evidence_review_status, Some(ReviewStatus::NeedsInfo));
        assert_eq!(state.evidence_count, 2);
        assert_eq!(state.pending_evidence_review_count, 1);
        assert_eq!(state.poam_open_count, 2);
        assert_eq!(state.poam_overdue_count, 1);
        assert_eq!(state.poam_status_summary, Some(PoamStatus::Open));
        assert!(state.has_customer_request);
    }

    #[test]
    fn functional_closed_current_record_without_requests() {
        let state =
            merge_control_records(&metadata(), &[RawControlRecord::Current(response())], now());
        assert_eq!(state.status, ControlStatus::Implemented);
        assert_eq!(state.poam_open_count, 0);
        assert!(!state.has_customer_request);
    }

    #[test]
    fn regression_returned_review_raises_customer_request_on_closed_control() {
        let mut record = response();
        record.review_status = Some(ReviewStatus::Rejected);
        let state =
            merge_control_records(&metadata(), &[RawControlRecord::Current(record)], now());
        assert!(state.has_customer_request);

        let mut record = response();
        record.evidence_submissions[0].review_status = ReviewStatus::NeedsInfo;
        let state =
            merge_control_records(&metadata(), &[RawControlRecord::Current(record)], now());
        assert!(state.has_customer_request);
    }

    #[test]
    fn regression_closed_control_without_evidence_raises_customer_request() {
        let mut record = response();
        record.evidence_submissions.clear();
        let state =
            merge_control_records(&metadata(), &[RawControlRecord::Current(record)], now());
        assert!(state.has_customer_request);
    }
}
