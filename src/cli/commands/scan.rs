//! Scan Command
//!
//! List detected web apps and any port conflicts between them.

use std::path::{Path, PathBuf};

use crate::cli::ui::Output;
use crate::cli::util::CommandContext;
use crate::types::{Project, ReconciliationPlan, Result};

pub fn run(path: Option<PathBuf>, depth: Option<usize>) -> Result<()> {
    let ctx = CommandContext::load(path, depth)?;
    let out = Output::new();

    out.info(&format!("Scanning {}", ctx.root.display()));
    let projects = ctx.scan()?;

    if projects.is_empty() {
        out.warning("No web apps found.");
        return Ok(());
    }

    out.header(&format!("Detected {} web app(s)", projects.len()));
    print_projects(&out, &projects);

    let plan = ctx.resolver().resolve(&projects);
    print_conflicts(&out, &plan);

    Ok(())
}

pub(crate) fn print_projects(out: &Output, projects: &[Project]) {
    let rows: Vec<Vec<String>> = projects
        .iter()
        .map(|p| {
            vec![
                p.name.clone(),
                p.framework()
                    .app_kind()
                    .map(|k| k.to_string())
                    .unwrap_or_default(),
                p.framework().to_string(),
                p.effective_port().map(|port| port.to_string()).unwrap_or_default(),
                port_source(p),
                p.cors_config
                    .as_deref()
                    .map(|c| relative_to(c, &p.path))
                    .unwrap_or_else(|| "-".to_string()),
            ]
        })
        .collect();

    out.table(&["Name", "Type", "Framework", "Port", "Source", "CORS"], &rows);
}

pub(crate) fn print_conflicts(out: &Output, plan: &ReconciliationPlan) {
    if !plan.has_conflicts() {
        println!();
        out.success("No port conflicts.");
        return;
    }

    out.section("Port conflicts");
    for conflict in &plan.conflicts {
        let displaced: Vec<String> = conflict.displaced.iter().map(|p| display_name(p)).collect();
        out.warning(&format!(
            "Port {}: {} keeps it; {} must move",
            conflict.port,
            display_name(&conflict.anchor),
            displaced.join(", ")
        ));
    }
    out.dim("Run `ts-funnel resolve` to reassign ports.");
}

fn port_source(project: &Project) -> String {
    match &project.declared {
        Some(declared) => format!(
            "{} ({})",
            relative_to(&declared.file.path, &project.path),
            declared.key
        ),
        None => "default".to_string(),
    }
}

fn relative_to(path: &Path, base: &Path) -> String {
    path.strip_prefix(base)
        .unwrap_or(path)
        .display()
        .to_string()
}

pub(crate) fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
