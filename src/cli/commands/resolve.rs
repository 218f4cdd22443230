//! Resolve Command
//!
//! Reassign colliding ports and rewrite the affected config files.

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::cli::ui::Output;
use crate::cli::util::{CommandContext, confirm, current_ports};
use crate::rewriter::ConfigRewriter;
use crate::types::{Outcome, Project, ReconciliationPlan, RewriteReport, Result};

pub struct ResolveOptions {
    pub path: Option<PathBuf>,
    pub depth: Option<usize>,
    pub dry_run: bool,
    pub yes: bool,
}

pub fn run(options: ResolveOptions) -> Result<()> {
    let ctx = CommandContext::load(options.path, options.depth)?;
    let out = Output::new();

    let projects = ctx.scan()?;
    if projects.is_empty() {
        out.warning("No web apps found.");
        return Ok(());
    }

    let (_, report) = reconcile(&ctx, &projects, options.dry_run, options.yes, &out)?;

    let failed = report.failures().count();
    if failed > 0 {
        out.error(&format!("{} rewrite(s) failed; other changes were kept", failed));
    } else if options.dry_run && !report.is_empty() {
        out.info("Dry run: no files were changed.");
    }
    Ok(())
}

/// Plan, confirm and apply port reassignments for `projects`.
///
/// Returns the plan that was shown and the rewrite report. The report is
/// empty when there was nothing to do or the user declined.
pub(crate) fn reconcile(
    ctx: &CommandContext,
    projects: &[Project],
    dry_run: bool,
    yes: bool,
    out: &Output,
) -> Result<(ReconciliationPlan, RewriteReport)> {
    let plan = ctx.resolver().resolve(projects);

    for unresolved in &plan.unresolved {
        out.warning(&format!(
            "No free port for {} in {}-{}; it stays on {}",
            unresolved.project.display(),
            unresolved.searched_from,
            unresolved.searched_to,
            unresolved.port
        ));
    }

    if plan.entries.is_empty() {
        out.success("No port conflicts.");
        return Ok((plan, RewriteReport::default()));
    }

    out.section("Port reassignments");
    for entry in &plan.entries {
        println!("  {}", entry);
    }

    if !dry_run && !yes && !confirm("Apply these changes?")? {
        out.info("No changes made.");
        return Ok((plan, RewriteReport::default()));
    }

    let report = ConfigRewriter::new(dry_run).apply(&plan);
    print_report(out, &report);
    Ok((plan, report))
}

pub(crate) fn print_report(out: &Output, report: &RewriteReport) {
    if report.is_empty() {
        return;
    }

    out.section("Config changes");
    for entry in &report.entries {
        let line = entry.to_string();
        match entry.outcome {
            Outcome::Applied => out.success(&line),
            Outcome::Failed(_) => out.error(&line),
            Outcome::Planned | Outcome::Unchanged => out.dim(&line),
        }
    }
}

/// Ports in effect after a reconcile: the plan's ports on a dry run,
/// otherwise whatever a fresh scan now reports
pub(crate) fn ports_after(
    ctx: &CommandContext,
    projects: &[Project],
    plan: &ReconciliationPlan,
    report: &RewriteReport,
    dry_run: bool,
) -> Result<BTreeMap<PathBuf, u16>> {
    if report.is_empty() {
        return Ok(current_ports(projects));
    }
    if dry_run {
        return Ok(plan.final_ports().clone());
    }
    Ok(current_ports(&ctx.scan()?))
}
