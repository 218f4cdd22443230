//! ts-funnel - Local Web App Port Reconciler for Tailscale
//!
//! Discovers web application projects on disk, infers the port each one
//! binds to, resolves collisions between them and exposes the result
//! through Tailscale Funnel or Serve.
//!
//! ## Pipeline
//!
//! - **Scan**: marker rules classify directories; config files supply port overrides
//! - **Resolve**: colliding projects get the lowest free port above their framework default
//! - **Rewrite**: format-preserving, atomic edits to `.env` / `package.json`, plus CORS origins
//! - **Expose**: one Tailscale invocation per unique port, ascending
//!
//! ## Quick Start
//!
//! ```ignore
//! use ts_funnel::{ConfigRewriter, ConflictResolver, ProjectScanner};
//!
//! let projects = ProjectScanner::new("~/Projects").scan()?;
//! let plan = ConflictResolver::default().resolve(&projects);
//! let report = ConfigRewriter::new(true).apply(&plan);
//! print!("{}", report);
//! ```
//!
//! ## Modules
//!
//! - [`analyzer`]: Marker rules, port extraction, CORS config discovery, scanning
//! - [`resolver`]: Port conflict resolution
//! - [`rewriter`]: Config file edits
//! - [`exposure`]: Tailscale driver and process runner
//! - [`config`]: Layered configuration

pub mod analyzer;
pub mod cli;
pub mod config;
pub mod constants;
pub mod exposure;
pub mod resolver;
pub mod rewriter;
pub mod types;

// =============================================================================
// Core Re-exports
// =============================================================================

// Configuration
pub use config::{Config, ConfigLoader};

// Error Types
pub use types::error::{FunnelError, Result};

// Domain
pub use types::{
    ExposureMode, FrameworkKind, Outcome, Project, ReconciliationPlan, RewriteReport,
};

// =============================================================================
// Pipeline Re-exports
// =============================================================================

pub use analyzer::{ProjectScanner, classify};
pub use exposure::{CommandRunner, ExposureReport, SystemRunner, Tailscale};
pub use resolver::ConflictResolver;
pub use rewriter::ConfigRewriter;
