//! cli::commands::count
//!
//! `wry data count`: record counts per object and record type.

use anyhow::{Context as _, Result};

use super::open_session;
use crate::cli::Context;
use crate::core::count::{checking_line, count_records, resolve_objects, CountReport};
use crate::core::selection::Selection;
use crate::org::OrgApi;
use crate::ui::output;

/// Run the count command.
pub fn count(ctx: &Context, alias: Option<&str>, objects: Option<&str>) -> Result<()> {
    let session = open_session(ctx, alias)?;
    let selection = Selection::parse(objects);
    let exclude = session.config.count_exclude();
    tracing::debug!(org = session.target.label(), ?selection, "counting records");

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(count_with_org(
        ctx,
        session.org.as_ref(),
        &selection,
        &exclude,
    ))?;
    Ok(())
}

/// Count and print using an already connected org.
pub async fn count_with_org(
    ctx: &Context,
    org: &dyn OrgApi,
    selection: &Selection,
    exclude: &[String],
) -> Result<CountReport> {
    let objects = resolve_objects(org, selection, exclude)
        .await
        .context("Failed to list objects")?;
    output::print(checking_line(objects.len()), ctx.verbosity());

    let report = count_records(org, &objects)
        .await
        .context("Failed to count records")?;

    if ctx.json {
        output::print_json(&report)?;
    } else {
        for line in report.lines() {
            output::report(line);
        }
    }
    Ok(report)
}
