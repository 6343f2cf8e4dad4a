use anyhow::Result;
use posture_engine::{build_assessment_posture, build_portfolio_posture};

use crate::cli_args::{Cli, CliOutputFormat, CliView};
use crate::render::{render_assessment_text, render_json, render_portfolio_text};
use crate::snapshot_loader::{load_portfolio_snapshot, select_assessment};

/// Loads the snapshot named on the command line and renders the requested view.
pub fn build_report(cli: &Cli) -> Result<String> {
    let snapshot = load_portfolio_snapshot(&cli.snapshot)?;
    let limits = cli.queue_limits();
    let now = cli.reference_time();

    match cli.view {
        CliView::Vendor => {
            let assessment = select_assessment(&snapshot, cli.assessment_id.as_deref())?;
            let posture = build_assessment_posture(assessment, &limits, now);
            match cli.format {
                CliOutputFormat::Text => Ok(render_assessment_text(&posture)),
                CliOutputFormat::Json => render_json(&posture),
            }
        }
        CliView::Portfolio => {
            if cli.assessment_id.is_some() {
                tracing::warn!("--assessment-id is ignored by the portfolio view");
            }
            let posture = build_portfolio_posture(&snapshot, &limits, now);
            match cli.format {
                CliOutputFormat::Text => Ok(render_portfolio_text(&posture)),
                CliOutputFormat::Json => render_json(&posture),
            }
        }
    }
}

pub fn run_cli(cli: Cli) -> Result<()> {
    let report = build_report(&cli)?;
    println!("{report}");
    Ok(())
}
