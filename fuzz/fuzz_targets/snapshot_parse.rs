#![no_main]

use chrono::{TimeZone, Utc};
use libfuzzer_sys::fuzz_target;
use posture_engine::{build_portfolio_posture, QueueLimits};
use posture_types::parse_portfolio_snapshot;

fuzz_target!(|data: &[u8]| {
    let raw = String::from_utf8_lossy(data);
    let Ok(snapshot) = parse_portfolio_snapshot(&raw) else {
        return;
    };
    let Some(now) = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).single() else {
        return;
    };
    let limits = QueueLimits::default();
    let posture = build_portfolio_posture(&snapshot, &limits, now);

    assert_eq!(posture.rows.len(), snapshot.assessments.len());
    assert!(posture.review_queue.len() <= limits.review_queue);
    assert!((0.0..=100.0).contains(&posture.sla_adherence_percent));
    for row in &posture.rows {
        assert!((0.0..=100.0).contains(&row.summary.readiness_score));
        assert!((0.0..=100.0).contains(&row.summary.risk_assessment_score));
    }
});
