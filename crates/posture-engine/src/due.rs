//! Human due-date labels.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Due-date classification relative to a reference instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "days", rename_all = "snake_case")]
pub enum DueLabel {
    NoDueDate,
    Overdue(u64),
    DueToday,
    DueIn(u64),
}

impl DueLabel {
    /// Days are `ceil((date - now) / 1 day)`; a date less than a day in the
    /// past still reads as due today.
    pub fn classify(date: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Self {
        let Some(date) = date else {
            return Self::NoDueDate;
        };
        let diff_ms = (date - now).num_milliseconds() as f64;
        let diff_days = (diff_ms / MILLIS_PER_DAY).ceil() as i64;
        match diff_days {
            days if days < 0 => Self::Overdue(days.unsigned_abs()),
            0 => Self::DueToday,
            days => Self::DueIn(days.unsigned_abs()),
        }
    }

    pub fn is_overdue(self) -> bool {
        matches!(self, Self::Overdue(_))
    }
}

impl fmt::Display for DueLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoDueDate => f.write_str("No due date"),
            Self::Overdue(days) => write!(f, "{days}d overdue"),
            Self::DueToday => f.write_str("Due today"),
            Self::DueIn(days) => write!(f, "Due in {days}d"),
        }
    }
}

pub fn due_label(date: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    DueLabel::classify(date, now).to_string()
}
