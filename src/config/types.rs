//! Configuration Types
//!
//! All configuration structures with sensible defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::constants::{exposure, ports, scan};
use crate::types::{ExposureMode, FunnelError, Result};

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory scanning
    pub scan: ScanConfig,

    /// Port reconciliation
    pub ports: PortsConfig,

    /// Tunnel tool settings
    pub exposure: ExposureConfig,

    /// CORS allow-list updates
    pub cors: CorsConfig,
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    /// Returns `FunnelError::Config` on validation failure.
    pub fn validate(&self) -> Result<()> {
        if self.scan.max_depth == 0 {
            return Err(FunnelError::Config(
                "scan.max_depth must be greater than 0".to_string(),
            ));
        }

        if self.ports.search_window == 0 {
            return Err(FunnelError::Config(
                "ports.search_window must be greater than 0".to_string(),
            ));
        }

        if self.exposure.timeout_secs == 0 {
            return Err(FunnelError::Config(
                "exposure.timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.exposure.binary.trim().is_empty() {
            return Err(FunnelError::Config(
                "exposure.binary must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

// =============================================================================
// Scan Configuration
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Default root when no path is given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,

    /// Directory levels examined below the root
    pub max_depth: usize,

    /// Directory names excluded in addition to the built-in list
    pub skip_dirs: Vec<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            root: None,
            max_depth: scan::DEFAULT_MAX_DEPTH,
            skip_dirs: Vec::new(),
        }
    }
}

// =============================================================================
// Ports Configuration
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortsConfig {
    /// Replacement ports are searched in `[default, default + search_window]`
    pub search_window: u16,
}

impl Default for PortsConfig {
    fn default() -> Self {
        Self {
            search_window: ports::DEFAULT_SEARCH_WINDOW,
        }
    }
}

// =============================================================================
// Exposure Configuration
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExposureConfig {
    /// Tunnel tool executable
    pub binary: String,

    pub mode: ExposureMode,

    /// Per-invocation timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ExposureConfig {
    fn default() -> Self {
        Self {
            binary: exposure::DEFAULT_BINARY.to_string(),
            mode: ExposureMode::default(),
            timeout_secs: exposure::DEFAULT_TIMEOUT_SECS,
        }
    }
}

// =============================================================================
// CORS Configuration
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Add the tailnet origin to backend allow-lists on `up`
    pub enabled: bool,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.scan.max_depth, 3);
        assert_eq!(config.ports.search_window, 100);
        assert_eq!(config.exposure.binary, "tailscale");
        assert_eq!(config.exposure.mode, ExposureMode::Funnel);
        assert!(config.cors.enabled);
    }

    #[test]
    fn test_validate_rejects_zero_depth() {
        let mut config = Config::default();
        config.scan.max_depth = 0;
        assert!(matches!(config.validate(), Err(FunnelError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_empty_binary() {
        let mut config = Config::default();
        config.exposure.binary = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip_omits_unset_root() {
        let text = toml::to_string_pretty(&Config::default()).unwrap();
        assert!(!text.contains("root"));
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed, Config::default());
    }
}
