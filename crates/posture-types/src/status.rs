//! Closed status enumerations for controls, reviews, and remediation items.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Implementation state recorded for a control within an assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ControlStatus {
    NotImplemented,
    PartiallyImplemented,
    NotApplicable,
    ReviewRequired,
    InProgress,
    Implemented,
    /// Any status string outside the closed set.
    #[serde(other)]
    Unrecognized,
}

impl ControlStatus {
    /// Every recognized status, in declaration order.
    pub const KNOWN: [ControlStatus; 6] = [
        Self::NotImplemented,
        Self::PartiallyImplemented,
        Self::NotApplicable,
        Self::ReviewRequired,
        Self::InProgress,
        Self::Implemented,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotImplemented => "NOT_IMPLEMENTED",
            Self::PartiallyImplemented => "PARTIALLY_IMPLEMENTED",
            Self::NotApplicable => "NOT_APPLICABLE",
            Self::ReviewRequired => "REVIEW_REQUIRED",
            Self::InProgress => "IN_PROGRESS",
            Self::Implemented => "IMPLEMENTED",
            Self::Unrecognized => "UNRECOGNIZED",
        }
    }

    /// Parses a raw status string; unknown values map to `Unrecognized`.
    pub fn parse(raw: &str) -> Self {
        Self::KNOWN
            .into_iter()
            .find(|status| status.as_str() == raw)
            .unwrap_or(Self::Unrecognized)
    }

    /// Human label used by text renderers ("PARTIALLY IMPLEMENTED").
    pub fn label(self) -> String {
        self.as_str().replace('_', " ")
    }
}

impl fmt::Display for ControlStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Workflow state of a vendor's control response or evidence submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewStatus {
    Draft,
    Submitted,
    UnderReview,
    NeedsInfo,
    Approved,
    Rejected,
    #[serde(other)]
    Unrecognized,
}

impl ReviewStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Submitted => "SUBMITTED",
            Self::UnderReview => "UNDER_REVIEW",
            Self::NeedsInfo => "NEEDS_INFO",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
            Self::Unrecognized => "UNRECOGNIZED",
        }
    }

    /// Returns true when the reviewer sent the item back to the vendor.
    pub fn is_returned(self) -> bool {
        matches!(self, Self::NeedsInfo | Self::Rejected)
    }

    /// Returns true while the item waits on a customer reviewer.
    pub fn is_awaiting_review(self) -> bool {
        matches!(self, Self::Submitted | Self::UnderReview)
    }
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle state of a POA&M remediation item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PoamStatus {
    Open,
    InProgress,
    Blocked,
    Done,
    #[serde(other)]
    Unrecognized,
}

impl PoamStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::InProgress => "IN_PROGRESS",
            Self::Blocked => "BLOCKED",
            Self::Done => "DONE",
            Self::Unrecognized => "UNRECOGNIZED",
        }
    }

    pub fn is_done(self) -> bool {
        self == Self::Done
    }
}

impl fmt::Display for PoamStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
