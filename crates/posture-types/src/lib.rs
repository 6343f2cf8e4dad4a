//! Shared data types for compliance posture aggregation.
//!
//! Holds the closed status/risk enumerations, the two raw record families a
//! persistence layer hands over, the aggregated per-control state, and the
//! snapshot shape used to move fetched records between processes.

mod records;
mod risk;
mod snapshot;
mod state;
mod status;

pub use records::{
    ControlMetadata, CurrentRecord, EvidenceSubmission, LegacyRecord, PoamItem, RawControlRecord,
    RecordFamily,
};
pub use risk::{deserialize_optional_risk, RiskLevel};
pub use snapshot::{
    parse_portfolio_snapshot, validate_assessment_snapshot, validate_portfolio_snapshot,
    AssessmentSnapshot, PortfolioSnapshot, SnapshotError, SNAPSHOT_SCHEMA_VERSION,
};
pub use state::AggregatedControlState;
pub use status::{ControlStatus, PoamStatus, ReviewStatus};
