//! Unified Error Type System
//!
//! Centralized error type for the whole application.
//!
//! Only stage-fatal conditions travel as `FunnelError`: a missing scan root,
//! an unloadable configuration, an unusable exposure tool. Per-item problems
//! (a bad manifest, a failed rewrite, an exhausted port window, a failed
//! tool invocation) are recorded in the stage's structured result instead.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FunnelError {
    // -------------------------------------------------------------------------
    // System Errors (auto From impl)
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    // -------------------------------------------------------------------------
    // Domain Errors
    // -------------------------------------------------------------------------
    #[error("Config error: {0}")]
    Config(String),

    #[error("Cannot scan {}: {reason}", path.display())]
    ScanRoot { path: PathBuf, reason: String },

    #[error("Parse error in {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("Invalid port number: {0}")]
    InvalidPort(u32),

    #[error("Invalid domain format: {0}")]
    InvalidDomain(String),

    #[error("Refusing to edit {} outside of project {}", path.display(), project.display())]
    UnsafePath { path: PathBuf, project: PathBuf },

    // -------------------------------------------------------------------------
    // External Tool Errors
    // -------------------------------------------------------------------------
    #[error("{tool} not found. Is it installed?")]
    ToolNotFound { tool: String },

    #[error("{tool} failed: {message}")]
    Tool { tool: String, message: String },

    #[error("Timeout after {duration:?}: {operation}")]
    Timeout {
        operation: String,
        duration: Duration,
    },
}

pub type Result<T> = std::result::Result<T, FunnelError>;

impl FunnelError {
    /// Create a parse error for a file
    pub fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a tool failure
    pub fn tool(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Tool {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Create a timeout error
    pub fn timeout(operation: impl Into<String>, duration: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            duration,
        }
    }

    /// Whether the failure concerns the external tool rather than local state
    pub fn is_tool_error(&self) -> bool {
        matches!(
            self,
            Self::ToolNotFound { .. } | Self::Tool { .. } | Self::Timeout { .. }
        )
    }
}
