use std::path::Path;

use anyhow::{bail, Context, Result};
use posture_types::{parse_portfolio_snapshot, AssessmentSnapshot, PortfolioSnapshot};

pub fn load_portfolio_snapshot(path: &Path) -> Result<PortfolioSnapshot> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read snapshot {}", path.display()))?;
    let snapshot = parse_portfolio_snapshot(&raw)
        .with_context(|| format!("invalid snapshot {}", path.display()))?;
    tracing::debug!(
        path = %path.display(),
        assessments = snapshot.assessments.len(),
        "loaded portfolio snapshot"
    );
    Ok(snapshot)
}

pub fn select_assessment<'a>(
    snapshot: &'a PortfolioSnapshot,
    assessment_id: Option<&str>,
) -> Result<&'a AssessmentSnapshot> {
    let Some(assessment_id) = assessment_id.map(str::trim).filter(|id| !id.is_empty()) else {
        bail!("--assessment-id is required for the vendor view");
    };
    match snapshot.find_assessment(assessment_id) {
        Some(assessment) => Ok(assessment),
        None => bail!("assessment '{assessment_id}' not found in snapshot"),
    }
}
