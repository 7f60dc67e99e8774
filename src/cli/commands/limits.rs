//! cli::commands::limits
//!
//! `wry org limits`: remaining and maximum org limits.

use anyhow::{Context as _, Result};

use super::open_session;
use crate::cli::Context;
use crate::core::limits::{fetch_report, LimitsReport, HEADER};
use crate::core::selection::Selection;
use crate::org::OrgApi;
use crate::ui::output;

/// Run the limits command.
pub fn limits(ctx: &Context, alias: Option<&str>, limits: Option<&str>) -> Result<()> {
    let session = open_session(ctx, alias)?;
    let selection = Selection::parse(limits);
    tracing::debug!(org = session.target.label(), ?selection, "fetching limits");

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(limits_with_org(ctx, session.org.as_ref(), &selection))?;
    Ok(())
}

/// Fetch and print limits using an already connected org.
///
/// Unknown names are reported as lines; they do not fail the command.
pub async fn limits_with_org(
    ctx: &Context,
    org: &dyn OrgApi,
    selection: &Selection,
) -> Result<LimitsReport> {
    let report = fetch_report(org, selection)
        .await
        .context("Failed to fetch org limits")?;

    if ctx.json {
        output::print_json(&report)?;
    } else {
        output::report(HEADER);
        for line in &report.lines {
            output::report(line);
        }
    }
    Ok(report)
}
