//! Automated verification of every skill exposed by an editor instance.
//!
//! Fetches the catalog, synthesizes side-effect-free parameters, invokes all
//! skills under a concurrency cap, and folds the outcomes into a report.

mod classify;
mod dispatch;
mod persist;
mod report;
mod synthesize;

use std::sync::Arc;

use uskill_client::{CatalogError, SkillsClient};

pub use classify::{classify, SkillOutcome, Verdict};
pub use dispatch::{
    dispatch_skills, DispatchConfig, DispatchProgress, ProgressHandler, DEFAULT_MAX_IN_FLIGHT,
};
pub use persist::persist_report;
pub use report::{escape_table_cell, ReportFormat, ReportSummary, VerificationReport};
pub use synthesize::{safe_override, string_placeholder, synthesize, SAFE_OVERRIDE_SKILLS};

/// Runs a full verification pass against one editor instance.
///
/// A failed catalog fetch aborts the run; individual skill failures only
/// show up as report rows.
pub async fn verify_instance(
    client: &SkillsClient,
    config: &DispatchConfig,
    on_progress: Option<ProgressHandler>,
) -> Result<VerificationReport, CatalogError> {
    let skills = client.list_skills().await?;
    tracing::info!(
        base_url = client.base_url(),
        skills = skills.len(),
        max_in_flight = config.max_in_flight,
        "starting verification run"
    );

    let outcomes = dispatch_skills(Arc::new(client.clone()), skills, config, on_progress).await;
    let report = VerificationReport::from_outcomes(outcomes);
    tracing::info!(
        passed = report.summary.passed,
        warned = report.summary.warned,
        failed = report.summary.failed,
        "verification run finished"
    );
    Ok(report)
}
