//! Risk levels normalized from free-form boundary strings.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Severity attached to a control or remediation item.
///
/// Recognized levels are ordered `Low < Medium < High < Critical`. Any other
/// non-empty input is kept verbatim in `Other` and carries no severity weight.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
    Other(String),
}

impl RiskLevel {
    /// Normalizes a raw risk string by case-insensitive prefix.
    ///
    /// Returns `None` for the empty string.
    pub fn normalize(raw: &str) -> Option<Self> {
        if raw.is_empty() {
            return None;
        }
        let lowered = raw.to_lowercase();
        let level = if lowered.starts_with("crit") {
            Self::Critical
        } else if lowered.starts_with("high") {
            Self::High
        } else if lowered.starts_with("med") {
            Self::Medium
        } else if lowered.starts_with("low") {
            Self::Low
        } else {
            Self::Other(raw.to_string())
        };
        Some(level)
    }

    /// Severity weight: Critical 4, High 3, Medium 2, Low 1, anything else 0.
    pub fn weight(&self) -> u8 {
        match self {
            Self::Critical => 4,
            Self::High => 3,
            Self::Medium => 2,
            Self::Low => 1,
            Self::Other(_) => 0,
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, Self::Other(_))
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Critical => "Critical",
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
            Self::Other(raw) => raw.as_str(),
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for RiskLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RiskLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::normalize(&raw).unwrap_or(Self::Other(raw)))
    }
}

/// Deserializes an optional risk, treating `null` and `""` as absent.
pub fn deserialize_optional_risk<'de, D>(deserializer: D) -> Result<Option<RiskLevel>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(RiskLevel::normalize))
}
