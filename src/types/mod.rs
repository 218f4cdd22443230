//! Core domain types

pub mod error;
pub mod mode;
pub mod plan;
pub mod project;
pub mod report;

pub use error::{FunnelError, Result};
pub use mode::ExposureMode;
pub use plan::{PlanEntry, PortConflict, ReconciliationPlan, RewriteTarget, UnresolvedConflict};
pub use project::{
    AppKind, ConfigFile, ConfigFileKind, DeclaredPort, Family, FrameworkKind, Project,
};
pub use report::{Outcome, RewriteEntry, RewriteReport};

/// Validate a port number is in the TCP range
pub fn validate_port(port: u32) -> Result<u16> {
    use crate::constants::ports::{MAX_PORT, MIN_PORT};

    if port >= MIN_PORT as u32 && port <= MAX_PORT as u32 {
        Ok(port as u16)
    } else {
        Err(FunnelError::InvalidPort(port))
    }
}

/// Parse a textual port, treating anything outside 1..=65535 as absent
pub fn parse_port(value: &str) -> Option<u16> {
    value
        .trim()
        .parse::<u32>()
        .ok()
        .and_then(|p| validate_port(p).ok())
}
