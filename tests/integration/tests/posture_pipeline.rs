use chrono::{DateTime, Duration, TimeZone, Utc};
use posture_engine::{
    aggregate_assessment, build_assessment_posture, build_portfolio_posture, due_label,
    merge_control_records, QueueLimits,
};
use posture_types::{
    parse_portfolio_snapshot, ControlMetadata, ControlStatus, LegacyRecord, RawControlRecord,
    RecordFamily, RiskLevel, SnapshotError,
};
use proptest::prelude::*;
use serde_json::{json, Value};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 9, 1, 0, 0, 0).unwrap()
}

fn control(id: &str, domain: &str, framework_key: &str) -> Value {
    json!({
        "id": id,
        "code": id.to_uppercase(),
        "title": format!("Control {id}"),
        "domain": domain,
        "frameworkId": format!("fw-{framework_key}"),
        "frameworkKey": framework_key,
        "frameworkName": format!("{framework_key} framework"),
    })
}

fn portfolio_json() -> Value {
    json!({
        "schemaVersion": 1,
        "assessments": [
            {
                "assessmentId": "asmt-history",
                "assessmentName": "History Only",
                "controls": [
                    control("h1", "Access", "SOC2"),
                    control("h2", "Access", "SOC2"),
                    control("h3", "Change", "SOC2"),
                ],
                "legacyRecords": [
                    { "controlId": "h1", "status": "NOT_IMPLEMENTED", "risk": "High" },
                    { "controlId": "h1", "status": "IMPLEMENTED", "risk": null, "evidenceLinkIds": ["e1"] },
                    { "controlId": "h1", "status": "PARTIALLY_IMPLEMENTED", "risk": "Medium" },
                    { "controlId": "h2", "status": "IN_PROGRESS", "risk": "crit", "dueDate": "2026-08-25T00:00:00Z" },
                    { "controlId": "h3", "status": "SOMETHING_NEW", "risk": "Severe" }
                ]
            },
            {
                "assessmentId": "asmt-live",
                "assessmentName": "Live Responses",
                "controls": [
                    control("r1", "Access", "ISO27001"),
                    control("r2", "Ops", "ISO27001"),
                ],
                "legacyRecords": [
                    { "controlId": "r2", "status": "IMPLEMENTED", "risk": "Low", "evidenceLinkIds": ["x"] }
                ],
                "currentRecords": [
                    {
                        "controlId": "r1",
                        "status": "REVIEW_REQUIRED",
                        "risk": "High",
                        "dueDate": "2026-09-04T00:00:00Z",
                        "reviewStatus": "SUBMITTED",
                        "evidenceSubmissions": [{ "reviewStatus": "UNDER_REVIEW" }],
                        "poamItems": [
                            { "status": "DONE", "dueDate": "2026-08-01T00:00:00Z" },
                            { "status": "BLOCKED", "dueDate": "2026-10-01T00:00:00Z" }
                        ]
                    }
                ]
            }
        ]
    })
}

#[test]
fn integration_legacy_history_folds_optimistic_status_and_pessimistic_risk() {
    let snapshot = parse_portfolio_snapshot(&portfolio_json().to_string()).expect("snapshot");
    let history = snapshot.find_assessment("asmt-history").expect("history");
    let states = aggregate_assessment(history, now());

    assert_eq!(states[0].status, ControlStatus::Implemented);
    assert_eq!(states[0].risk, Some(RiskLevel::High));
    assert_eq!(states[0].evidence_count, 1);
    assert_eq!(states[0].source, Some(RecordFamily::Legacy));

    assert_eq!(states[1].risk, Some(RiskLevel::Critical));
    assert_eq!(states[1].poam_open_count, 1);
    assert_eq!(states[1].poam_overdue_count, 1);
    assert_eq!(due_label(states[1].due_date, now()), "7d overdue");

    assert_eq!(states[2].status, ControlStatus::Unrecognized);
    assert_eq!(states[2].risk, Some(RiskLevel::Other("Severe".to_string())));
    assert!(states[2].has_customer_request);
}

#[test]
fn integration_current_responses_replace_legacy_history_for_whole_assessment() {
    let snapshot = parse_portfolio_snapshot(&portfolio_json().to_string()).expect("snapshot");
    let live = snapshot.find_assessment("asmt-live").expect("live");
    let states = aggregate_assessment(live, now());

    assert_eq!(states[0].source, Some(RecordFamily::Current));
    assert_eq!(states[0].poam_open_count, 1);
    assert_eq!(states[0].poam_overdue_count, 0);
    assert_eq!(states[0].pending_evidence_review_count, 1);

    // r2 has only a legacy finding, which the current family hides
    assert_eq!(states[1].status, ControlStatus::NotImplemented);
    assert_eq!(states[1].evidence_count, 0);
    assert_eq!(states[1].risk, None);
}

#[test]
fn integration_vendor_and_portfolio_views_share_one_ordering() {
    let snapshot = parse_portfolio_snapshot(&portfolio_json().to_string()).expect("snapshot");
    let limits = QueueLimits::default();

    let history = snapshot.find_assessment("asmt-history").expect("history");
    let vendor = build_assessment_posture(history, &limits, now());
    let codes: Vec<&str> = vendor
        .request_queue
        .iter()
        .map(|state| state.code.as_str())
        .collect();
    // h1 is implemented with evidence; h3 risk is unrecognized and weighs 0
    assert_eq!(codes, vec!["H2", "H3"]);

    let portfolio = build_portfolio_posture(&snapshot, &limits, now());
    let queued: Vec<(&str, &str)> = portfolio
        .review_queue
        .iter()
        .map(|entry| (entry.assessment_id.as_str(), entry.state.code.as_str()))
        .collect();
    // r2 has no control response, so only the vendor is asked about it
    assert_eq!(queued, vec![("asmt-history", "H2"), ("asmt-live", "R1")]);
    // open controls with a record: h2 (overdue), r1 (due in 3d)
    assert_eq!(portfolio.sla_adherence_percent, 50.0);
    assert_eq!(portfolio.total_controls, 5);
    assert_eq!(portfolio.rows[1].reviewer_queue_count, 1);
}

#[test]
fn integration_aggregation_is_deterministic_for_identical_input() {
    let raw = portfolio_json().to_string();
    let first = parse_portfolio_snapshot(&raw).expect("snapshot");
    let second = parse_portfolio_snapshot(&raw).expect("snapshot");
    let limits = QueueLimits::default();
    assert_eq!(
        build_portfolio_posture(&first, &limits, now()),
        build_portfolio_posture(&second, &limits, now())
    );
}

#[test]
fn regression_duplicate_control_response_is_rejected_at_the_boundary() {
    let mut raw = portfolio_json();
    let duplicate = raw["assessments"][1]["currentRecords"][0].clone();
    raw["assessments"][1]["currentRecords"]
        .as_array_mut()
        .expect("records")
        .push(duplicate);
    let error = parse_portfolio_snapshot(&raw.to_string()).expect_err("duplicate response");
    assert!(matches!(error, SnapshotError::DuplicateCurrentRecord { .. }));
}

fn metadata() -> ControlMetadata {
    ControlMetadata {
        id: "p".to_string(),
        code: "P".to_string(),
        title: "Property control".to_string(),
        domain: None,
        framework_id: "fw".to_string(),
        framework_key: "FW".to_string(),
        framework_name: "Framework".to_string(),
    }
}

fn any_finding() -> impl Strategy<Value = RawControlRecord> {
    let status = prop_oneof![
        Just(ControlStatus::NotImplemented),
        Just(ControlStatus::PartiallyImplemented),
        Just(ControlStatus::NotApplicable),
        Just(ControlStatus::ReviewRequired),
        Just(ControlStatus::InProgress),
        Just(ControlStatus::Implemented),
    ];
    let risk = prop_oneof![
        Just(None),
        Just(Some(RiskLevel::Low)),
        Just(Some(RiskLevel::Medium)),
        Just(Some(RiskLevel::High)),
        Just(Some(RiskLevel::Critical)),
    ];
    (proptest::option::of(status), risk, -20i64..20, 0usize..3).prop_map(
        |(status, risk, due_offset, evidence)| {
            RawControlRecord::Legacy(LegacyRecord {
                control_id: "p".to_string(),
                status,
                risk,
                owner: None,
                due_date: Some(now() + Duration::days(due_offset)),
                evidence_link_ids: (0..evidence).map(|index| format!("ev-{index}")).collect(),
            })
        },
    )
}

proptest! {
    #[test]
    fn property_merge_ignores_record_order_for_status_risk_evidence_and_due(
        records in proptest::collection::vec(any_finding(), 0..8)
    ) {
        let forward = merge_control_records(&metadata(), &records, now());
        let mut reversed = records.clone();
        reversed.reverse();
        let backward = merge_control_records(&metadata(), &reversed, now());
        prop_assert_eq!(forward.status, backward.status);
        prop_assert_eq!(forward.risk, backward.risk);
        prop_assert_eq!(forward.evidence_count, backward.evidence_count);
        prop_assert_eq!(forward.due_date, backward.due_date);
        prop_assert_eq!(forward.has_customer_request, backward.has_customer_request);
    }
}
