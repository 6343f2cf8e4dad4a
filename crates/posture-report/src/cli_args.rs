use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Parser, ValueEnum};
use posture_engine::{
    QueueLimits, DEFAULT_REQUEST_QUEUE_LIMIT, DEFAULT_REVIEW_QUEUE_LIMIT, DEFAULT_TOP_GAPS_LIMIT,
};

fn parse_positive_usize(value: &str) -> Result<usize, String> {
    let parsed = value
        .parse::<usize>()
        .map_err(|error| format!("failed to parse integer: {error}"))?;
    if parsed == 0 {
        return Err("value must be greater than 0".to_string());
    }
    Ok(parsed)
}

fn parse_rfc3339_utc(value: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(value.trim())
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|error| format!("expected an RFC 3339 timestamp: {error}"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CliView {
    /// One assessment as the responding vendor sees it.
    Vendor,
    /// Every assessment in the snapshot as the customer sees it.
    Portfolio,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CliOutputFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(
    name = "posture-report",
    about = "Aggregate compliance control records into readiness posture reports",
    version
)]
pub struct Cli {
    #[arg(
        long,
        env = "POSTURE_SNAPSHOT",
        help = "Path to a portfolio snapshot JSON file"
    )]
    pub snapshot: PathBuf,

    #[arg(
        long,
        env = "POSTURE_VIEW",
        value_enum,
        default_value_t = CliView::Portfolio,
        help = "Report to render"
    )]
    pub view: CliView,

    #[arg(
        long = "assessment-id",
        env = "POSTURE_ASSESSMENT_ID",
        help = "Assessment to report on; required for the vendor view"
    )]
    pub assessment_id: Option<String>,

    #[arg(
        long,
        env = "POSTURE_FORMAT",
        value_enum,
        default_value_t = CliOutputFormat::Text,
        help = "Output format"
    )]
    pub format: CliOutputFormat,

    #[arg(
        long,
        env = "POSTURE_NOW",
        value_parser = parse_rfc3339_utc,
        help = "Reference instant for due-date math (RFC 3339); defaults to the current time"
    )]
    pub now: Option<DateTime<Utc>>,

    #[arg(
        long = "request-queue-limit",
        env = "POSTURE_REQUEST_QUEUE_LIMIT",
        default_value_t = DEFAULT_REQUEST_QUEUE_LIMIT,
        value_parser = parse_positive_usize,
        help = "Maximum controls listed in the vendor request queue"
    )]
    pub request_queue_limit: usize,

    #[arg(
        long = "review-queue-limit",
        env = "POSTURE_REVIEW_QUEUE_LIMIT",
        default_value_t = DEFAULT_REVIEW_QUEUE_LIMIT,
        value_parser = parse_positive_usize,
        help = "Maximum controls listed in the customer review queue"
    )]
    pub review_queue_limit: usize,

    #[arg(
        long = "top-gaps-limit",
        env = "POSTURE_TOP_GAPS_LIMIT",
        default_value_t = DEFAULT_TOP_GAPS_LIMIT,
        value_parser = parse_positive_usize,
        help = "Maximum gaps listed per domain and framework rollup"
    )]
    pub top_gaps_limit: usize,
}

impl Cli {
    pub fn queue_limits(&self) -> QueueLimits {
        QueueLimits {
            request_queue: self.request_queue_limit,
            review_queue: self.review_queue_limit,
            top_gaps: self.top_gaps_limit,
        }
    }

    pub fn reference_time(&self) -> DateTime<Utc> {
        self.now.unwrap_or_else(Utc::now)
    }
}
