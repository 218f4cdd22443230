//! CLI Common Utilities
//!
//! Shared initialization and context management for CLI commands.

use console::Term;
use directories::BaseDirs;
use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::analyzer::ProjectScanner;
use crate::config::{Config, ConfigLoader};
use crate::constants::scan::DEFAULT_PROJECT_DIRS;
use crate::exposure::{SystemRunner, Tailscale};
use crate::resolver::ConflictResolver;
use crate::types::{Project, Result};

/// Command execution context
///
/// Loaded configuration plus the scan root chosen for this invocation.
pub struct CommandContext {
    pub config: Config,
    pub root: PathBuf,
}

impl CommandContext {
    /// Load config and settle the scan root and depth.
    ///
    /// `path` and `depth` come from the command line and win over config.
    pub fn load(path: Option<PathBuf>, depth: Option<usize>) -> Result<Self> {
        let mut config = ConfigLoader::load()?;
        if let Some(depth) = depth {
            config.scan.max_depth = depth;
            config.validate()?;
        }

        let root = path.unwrap_or_else(|| default_projects_dir(config.scan.root.as_deref()));
        Ok(Self { config, root })
    }

    pub fn scanner(&self) -> ProjectScanner {
        ProjectScanner::new(&self.root)
            .with_max_depth(self.config.scan.max_depth)
            .with_skip_dirs(self.config.scan.skip_dirs.clone())
    }

    pub fn scan(&self) -> Result<Vec<Project>> {
        self.scanner().scan()
    }

    pub fn resolver(&self) -> ConflictResolver {
        ConflictResolver::new(self.config.ports.search_window).with_mode(self.config.exposure.mode)
    }

    pub fn tailscale(&self) -> Tailscale<SystemRunner> {
        tailscale(&self.config)
    }
}

pub fn tailscale(config: &Config) -> Tailscale<SystemRunner> {
    let runner = SystemRunner::new(Duration::from_secs(config.exposure.timeout_secs));
    Tailscale::new(config.exposure.binary.clone(), runner)
}

/// Current effective port of every project
pub fn current_ports(projects: &[Project]) -> BTreeMap<PathBuf, u16> {
    projects
        .iter()
        .filter_map(|p| p.effective_port().map(|port| (p.path.clone(), port)))
        .collect()
}

/// Scan root used when none is given on the command line
pub fn default_projects_dir(configured: Option<&Path>) -> PathBuf {
    if let Some(root) = configured {
        return expand_home(root);
    }

    BaseDirs::new()
        .and_then(|dirs| {
            let home = dirs.home_dir();
            DEFAULT_PROJECT_DIRS
                .iter()
                .map(|name| home.join(name))
                .find(|candidate| candidate.is_dir())
        })
        .or_else(|| env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Expand a leading `~/`
fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), BaseDirs::new()) {
        (Ok(rest), Some(dirs)) => dirs.home_dir().join(rest),
        _ => path.to_path_buf(),
    }
}

/// Ask a yes/no question; only `y` or `yes` accepts
pub fn confirm(prompt: &str) -> Result<bool> {
    let term = Term::stdout();
    term.write_str(&format!("{} [y/N]: ", prompt))?;
    let answer = term.read_line()?;
    Ok(is_yes(&answer))
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}
