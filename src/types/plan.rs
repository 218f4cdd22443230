//! Reconciliation plan
//!
//! Pure data produced by the conflict resolver. Applying it is a separate
//! step, so the same plan drives both dry runs and real rewrites.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use super::mode::ExposureMode;
use super::project::{ConfigFile, FrameworkKind};

/// Where a reassigned port must be written
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RewriteTarget {
    pub file: ConfigFile,
    pub key: String,
    /// False when the declaration does not exist yet and must be added
    pub existing: bool,
}

/// One reassignment
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanEntry {
    pub project: PathBuf,
    pub framework: FrameworkKind,
    pub old_port: u16,
    pub new_port: u16,
    pub target: RewriteTarget,
}

/// Projects sharing one effective port
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortConflict {
    pub port: u16,
    /// Keeps the original port
    pub anchor: PathBuf,
    /// Everyone else, in path order
    pub displaced: Vec<PathBuf>,
}

/// A displaced project for which no free port was found
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnresolvedConflict {
    pub project: PathBuf,
    pub port: u16,
    pub searched_from: u16,
    pub searched_to: u16,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconciliationPlan {
    /// Final port for every classified project
    pub assignments: BTreeMap<PathBuf, u16>,
    pub conflicts: Vec<PortConflict>,
    pub entries: Vec<PlanEntry>,
    pub unresolved: Vec<UnresolvedConflict>,
    /// How the final ports are to be exposed
    pub mode: ExposureMode,
}

impl ReconciliationPlan {
    /// Plan with fixed final ports and nothing to rewrite
    pub fn exposing(assignments: BTreeMap<PathBuf, u16>) -> Self {
        Self {
            assignments,
            ..Default::default()
        }
    }

    pub fn with_mode(mut self, mode: ExposureMode) -> Self {
        self.mode = mode;
        self
    }

    /// Nothing to rewrite and nothing left unresolved
    pub fn is_clean(&self) -> bool {
        self.entries.is_empty() && self.unresolved.is_empty()
    }

    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }

    /// Project path → port after the plan is applied
    pub fn final_ports(&self) -> &BTreeMap<PathBuf, u16> {
        &self.assignments
    }

    pub fn entry_for(&self, project: &std::path::Path) -> Option<&PlanEntry> {
        self.entries.iter().find(|e| e.project == project)
    }
}

impl fmt::Display for PlanEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}  {} -> {}  {} ({}{})",
            self.project.display(),
            self.old_port,
            self.new_port,
            self.target.file.path.display(),
            self.target.key,
            if self.target.existing { "" } else { ", new" }
        )
    }
}

impl fmt::Display for ReconciliationPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_clean() {
            return writeln!(f, "No port conflicts.");
        }

        for entry in &self.entries {
            writeln!(f, "{}", entry)?;
        }

        for unresolved in &self.unresolved {
            writeln!(
                f,
                "{}  {} -> unresolved (no free port in {}-{})",
                unresolved.project.display(),
                unresolved.port,
                unresolved.searched_from,
                unresolved.searched_to
            )?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::project::ConfigFileKind;

    fn entry() -> PlanEntry {
        PlanEntry {
            project: PathBuf::from("/p/appB"),
            framework: FrameworkKind::NextJs,
            old_port: 3000,
            new_port: 3001,
            target: RewriteTarget {
                file: ConfigFile::new("/p/appB/.env", ConfigFileKind::DotEnv),
                key: "PORT".to_string(),
                existing: false,
            },
        }
    }

    #[test]
    fn test_plan_entry_display() {
        assert_eq!(
            entry().to_string(),
            "/p/appB  3000 -> 3001  /p/appB/.env (PORT, new)"
        );
    }

    #[test]
    fn test_clean_plan_display() {
        let plan = ReconciliationPlan::default();
        assert!(plan.is_clean());
        assert_eq!(plan.to_string(), "No port conflicts.\n");
    }

    #[test]
    fn test_entry_lookup() {
        let plan = ReconciliationPlan {
            entries: vec![entry()],
            ..Default::default()
        };
        assert!(plan.entry_for(std::path::Path::new("/p/appB")).is_some());
        assert!(plan.entry_for(std::path::Path::new("/p/appA")).is_none());
    }

    #[test]
    fn test_exposing_carries_mode() {
        let ports = BTreeMap::from([(PathBuf::from("/p/web"), 5173)]);
        let plan = ReconciliationPlan::exposing(ports.clone()).with_mode(ExposureMode::Serve);

        assert_eq!(plan.mode, ExposureMode::Serve);
        assert_eq!(plan.final_ports(), &ports);
        assert!(plan.is_clean());
    }
}
