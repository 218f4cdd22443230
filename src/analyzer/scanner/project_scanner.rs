use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::filter::SkipFilter;
use crate::analyzer::cors::locate_cors_config;
use crate::analyzer::markers::{DirectoryListing, classify};
use crate::analyzer::ports::{candidate_config_files, find_declared_port};
use crate::constants::scan::DEFAULT_MAX_DEPTH;
use crate::types::{FunnelError, Project, Result};

/// Finds web projects below a root directory
pub struct ProjectScanner {
    root: PathBuf,
    max_depth: usize,
    filter: SkipFilter,
}

impl ProjectScanner {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            max_depth: DEFAULT_MAX_DEPTH,
            filter: SkipFilter::new(),
        }
    }

    /// Number of directory levels examined below the root
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_skip_dirs(mut self, names: Vec<String>) -> Self {
        self.filter = self.filter.with_extra(names);
        self
    }

    /// Walk the tree and classify every directory.
    ///
    /// Only a missing or unreadable root is an error. Directories matching no
    /// framework are dropped silently.
    pub fn scan(&self) -> Result<Vec<Project>> {
        let root = self.root.canonicalize().map_err(|e| FunnelError::ScanRoot {
            path: self.root.clone(),
            reason: e.to_string(),
        })?;

        if !root.is_dir() {
            return Err(FunnelError::ScanRoot {
                path: root,
                reason: "not a directory".to_string(),
            });
        }

        info!("Scanning {} (depth {})", root.display(), self.max_depth);

        let mut projects = Vec::new();

        for entry in self.filter.walker(&root, self.max_depth, true) {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    debug!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };

            if !entry.file_type().is_some_and(|t| t.is_dir()) {
                continue;
            }

            if let Some(project) = self.inspect(entry.path()) {
                projects.push(project);
            }
        }

        info!("Found {} project(s)", projects.len());
        Ok(projects)
    }

    /// Classify one directory and gather its port and CORS details
    pub fn inspect(&self, dir: &Path) -> Option<Project> {
        let listing = match DirectoryListing::read(dir) {
            Ok(l) => l,
            Err(e) => {
                debug!("Cannot list {}: {}", dir.display(), e);
                return None;
            }
        };

        let framework = classify(&listing);
        if !framework.is_known() {
            return None;
        }

        let config_files = candidate_config_files(dir, framework);
        let declared = find_declared_port(&config_files);

        let mut project = Project::new(dir, framework).with_config_files(config_files);
        if let Some(declared) = declared {
            project = project.with_declared(declared);
        }
        if let Some(cors) = locate_cors_config(dir, framework, &self.filter) {
            project = project.with_cors_config(cors);
        }

        debug!(
            "Detected {} at {} (port {:?})",
            framework,
            dir.display(),
            project.effective_port()
        );

        Some(project)
    }
}
