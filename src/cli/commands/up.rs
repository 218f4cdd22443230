//! Up Command
//!
//! Scan, reconcile ports, expose every unique port through Tailscale and add
//! the tailnet origin to backend CORS allow-lists.

use std::collections::BTreeMap;
use std::path::PathBuf;

use super::resolve::{ports_after, print_report, reconcile};
use crate::cli::ui::Output;
use crate::cli::util::{CommandContext, current_ports};
use crate::exposure::{ExposureOutcome, ExposureReport, public_url};
use crate::rewriter::ConfigRewriter;
use crate::types::{
    ExposureMode, FunnelError, Outcome, Project, ReconciliationPlan, RewriteReport, Result,
};

pub struct UpOptions {
    pub path: Option<PathBuf>,
    pub depth: Option<usize>,
    /// Only expose projects ending up on this port
    pub port: Option<u16>,
    pub mode: Option<ExposureMode>,
    pub no_cors: bool,
    pub no_resolve: bool,
    /// Tailnet domain; looked up from Tailscale when omitted
    pub domain: Option<String>,
    pub dry_run: bool,
    pub yes: bool,
}

pub async fn run(options: UpOptions) -> Result<()> {
    let ctx = CommandContext::load(options.path.clone(), options.depth)?;
    let out = Output::new();
    let tailscale = ctx.tailscale();
    let mode = options.mode.unwrap_or(ctx.config.exposure.mode);
    let update_cors = !options.no_cors && ctx.config.cors.enabled;

    // A dry run never invokes the tool
    let domain = if options.dry_run {
        options.domain.clone()
    } else {
        if !tailscale.is_running().await? {
            return Err(FunnelError::tool(
                tailscale.binary(),
                "not running; start it first",
            ));
        }
        match options.domain.clone() {
            Some(domain) => Some(domain),
            None => Some(tailscale.domain().await?),
        }
    };

    if let Some(domain) = &domain {
        out.info(&format!("Tailscale domain: {}", domain));
    }

    let projects = ctx.scan()?;
    if projects.is_empty() {
        out.warning("No web apps found.");
        return Ok(());
    }

    let final_ports = if options.no_resolve {
        current_ports(&projects)
    } else {
        let (plan, report) = reconcile(&ctx, &projects, options.dry_run, options.yes, &out)?;
        ports_after(&ctx, &projects, &plan, &report, options.dry_run)?
    };

    let selected: BTreeMap<PathBuf, u16> = final_ports
        .into_iter()
        .filter(|(_, port)| options.port.is_none_or(|wanted| *port == wanted))
        .collect();

    if selected.is_empty() {
        if let Some(port) = options.port {
            out.warning(&format!("No apps found on port {}.", port));
        }
        return Ok(());
    }

    out.section(&format!("Exposing via {} ({})", mode, mode.description()));
    let exposure = ReconciliationPlan::exposing(selected).with_mode(mode);
    let report = tailscale
        .expose_all(&exposure, domain.as_deref(), options.dry_run)
        .await;
    print_exposure(&out, &report, domain.as_deref());

    if update_cors {
        let cors = add_cors_origins(&projects, &exposure, domain.as_deref(), options.dry_run, &out);
        print_report(&out, &cors);
    }

    let urls = report.exposed_urls();
    if !urls.is_empty() {
        out.header("Your apps are accessible at:");
        for url in urls {
            println!("  {}", url);
        }
    }

    let failed = report.failures().count();
    if failed > 0 {
        return Err(FunnelError::tool(
            tailscale.binary(),
            format!("{} of {} port(s) could not be exposed", failed, report.entries.len()),
        ));
    }
    Ok(())
}

fn print_exposure(out: &Output, report: &ExposureReport, domain: Option<&str>) {
    for entry in &report.entries {
        match &entry.outcome {
            ExposureOutcome::Exposed { .. } => {
                out.success(&format!("{} set up for port {}", report.mode, entry.port))
            }
            ExposureOutcome::Failed { status, message } => out.error(&format!(
                "Failed to set up {} for port {} ({}): {}",
                report.mode, entry.port, status, message
            )),
            ExposureOutcome::Planned => out.dim(&match domain {
                Some(domain) => format!(
                    "Would {} port {} -> {}",
                    report.mode,
                    entry.port,
                    public_url(domain, entry.port)
                ),
                None => format!("Would {} port {}", report.mode, entry.port),
            }),
        }
    }
}

fn add_cors_origins(
    projects: &[Project],
    exposure: &ReconciliationPlan,
    domain: Option<&str>,
    dry_run: bool,
    out: &Output,
) -> RewriteReport {
    let mut report = RewriteReport::default();
    let Some(domain) = domain else {
        out.info("Pass --domain to preview CORS updates in a dry run.");
        return report;
    };

    let rewriter = ConfigRewriter::new(dry_run);
    let selected = exposure.final_ports();
    for project in projects.iter().filter(|p| selected.contains_key(&p.path)) {
        report.extend(rewriter.add_cors_origin(project, domain));
    }

    if report.is_empty() {
        out.dim("No CORS configs to update.");
    } else if report.count(&Outcome::Unchanged) == report.entries.len() {
        out.dim("CORS configs already allow this domain.");
    }
    report
}
