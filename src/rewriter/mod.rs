//! Config Rewriter Module
//!
//! Applies a reconciliation plan to project config files and adds the public
//! origin to backend CORS allow-lists.
//!
//! Every edit is format-preserving and written atomically. Failures are
//! recorded per entry; one unreadable file never stops the rest. In dry-run
//! mode the same report is produced without touching the filesystem.

pub mod atomic;
pub mod cors;
pub mod port;

use std::fs;
use std::io;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::types::{
    ConfigFileKind, FunnelError, Outcome, PlanEntry, Project, ReconciliationPlan, Result,
    RewriteEntry, RewriteReport,
};
use atomic::{ensure_within, write_atomic};
use cors::{CorsStyle, ListChange, add_origin, origin_for, validate_domain};

/// Key recorded for CORS failures that precede finding any list
const CORS_KEY: &str = "cors-origins";

pub struct ConfigRewriter {
    dry_run: bool,
}

impl ConfigRewriter {
    pub fn new(dry_run: bool) -> Self {
        Self { dry_run }
    }

    /// Rewrite the port declaration of every displaced project in `plan`
    pub fn apply(&self, plan: &ReconciliationPlan) -> RewriteReport {
        let mut report = RewriteReport::default();
        for entry in &plan.entries {
            report.push(self.rewrite_port(entry));
        }
        report
    }

    fn rewrite_port(&self, entry: &PlanEntry) -> RewriteEntry {
        let file = &entry.target.file;
        let key = &entry.target.key;
        let record = |old_value: Option<String>, outcome: Outcome| RewriteEntry {
            project: entry.project.clone(),
            file: file.path.clone(),
            key: key.clone(),
            old_value,
            new_value: entry.new_port.to_string(),
            outcome,
        };

        let current = match read_optional(&file.path) {
            Ok(current) => current,
            Err(e) => {
                warn!("Cannot read {}: {}", file.path.display(), e);
                return record(None, Outcome::Failed(e.to_string()));
            }
        };

        let edit = match (file.kind, current.as_deref()) {
            (ConfigFileKind::DotEnv, content) => port::set_env_port(content, key, entry.new_port),
            (ConfigFileKind::PackageJson, Some(content)) => {
                port::set_script_port(content, key, entry.new_port)
            }
            (ConfigFileKind::PackageJson, None) => Err("file not found".to_string()),
        };

        match edit {
            Ok(edit) => {
                let outcome = self.commit(&file.path, current.as_deref(), &edit.content);
                record(edit.old_value, outcome)
            }
            Err(reason) => {
                warn!("Skipping {}: {}", file.path.display(), reason);
                record(None, Outcome::Failed(reason))
            }
        }
    }

    /// Add `https://<domain>` to the project's CORS allow-lists.
    ///
    /// Projects without a located CORS config yield an empty report.
    pub fn add_cors_origin(&self, project: &Project, domain: &str) -> RewriteReport {
        let mut report = RewriteReport::default();
        let (Some(config), Some(style)) = (
            project.cors_config.as_ref(),
            CorsStyle::for_framework(project.framework()),
        ) else {
            return report;
        };

        let origin = origin_for(domain);
        let record = |key: &str, outcome: Outcome| RewriteEntry {
            project: project.path.clone(),
            file: config.clone(),
            key: key.to_string(),
            old_value: None,
            new_value: origin.clone(),
            outcome,
        };

        let content = match self.read_cors_config(config, &project.path, domain) {
            Ok(content) => content,
            Err(e) => {
                warn!("Skipping CORS update for {}: {}", project.path.display(), e);
                report.push(record(CORS_KEY, Outcome::Failed(e.to_string())));
                return report;
            }
        };

        let Some(edit) = add_origin(&content, style, &origin) else {
            report.push(record(
                CORS_KEY,
                Outcome::Failed("no origin allow-list found".to_string()),
            ));
            return report;
        };

        let written = self.commit(config, Some(&content), &edit.content);
        for (list, change) in edit.lists {
            let outcome = match change {
                ListChange::Added => written.clone(),
                ListChange::AlreadyPresent | ListChange::AllowsAll => Outcome::Unchanged,
            };
            report.push(record(list, outcome));
        }

        report
    }

    fn read_cors_config(&self, config: &Path, project: &Path, domain: &str) -> Result<String> {
        validate_domain(domain)?;
        let path = ensure_within(config, project)?;
        fs::read_to_string(&path).map_err(FunnelError::from)
    }

    fn commit(&self, path: &Path, current: Option<&str>, content: &str) -> Outcome {
        if current == Some(content) {
            return Outcome::Unchanged;
        }
        if self.dry_run {
            debug!("Dry run: would write {}", path.display());
            return Outcome::Planned;
        }

        match write_atomic(path, content) {
            Ok(()) => {
                info!("Updated {}", path.display());
                Outcome::Applied
            }
            Err(e) => {
                warn!("Failed to write {}: {}", path.display(), e);
                Outcome::Failed(e.to_string())
            }
        }
    }
}

/// File content, or `None` if it does not exist
fn read_optional(path: &Path) -> io::Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}
