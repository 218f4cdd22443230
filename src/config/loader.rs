//! Configuration Loader (Figment-based)
//!
//! Loads and merges configuration from multiple sources using Figment:
//! 1. Built-in defaults (Serialized)
//! 2. Global config (<config dir>/ts-funnel/config.toml)
//! 3. Project config (./.ts-funnel.toml)
//! 4. Environment variables (TS_FUNNEL_* prefix, `__` between sections)

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::types::Config;
use crate::types::{FunnelError, Result};

const ENV_PREFIX: &str = "TS_FUNNEL_";
const PROJECT_CONFIG_FILE: &str = ".ts-funnel.toml";
const GLOBAL_CONFIG_FILE: &str = "config.toml";

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with full resolution chain:
    /// defaults → global → project → env vars
    pub fn load() -> Result<Config> {
        Self::load_from(
            Self::global_config_path().as_deref(),
            &Self::project_config_path(),
        )
    }

    /// Same chain with explicit file locations
    pub fn load_from(global: Option<&Path>, project: &Path) -> Result<Config> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        if let Some(global_path) = global
            && global_path.exists()
        {
            debug!("Loading global config from: {}", global_path.display());
            figment = figment.merge(Toml::file(global_path));
        }

        if project.exists() {
            debug!("Loading project config from: {}", project.display());
            figment = figment.merge(Toml::file(project));
        }

        // TS_FUNNEL_SCAN__MAX_DEPTH -> scan.max_depth
        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config: Config = figment
            .extract()
            .map_err(|e| FunnelError::Config(format!("Configuration error: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    // =========================================================================
    // Path Management
    // =========================================================================

    /// Global config directory, e.g. ~/.config/ts-funnel/
    pub fn global_dir() -> Option<PathBuf> {
        ProjectDirs::from("", "", "ts-funnel").map(|dirs| dirs.config_dir().to_path_buf())
    }

    pub fn global_config_path() -> Option<PathBuf> {
        Self::global_dir().map(|dir| dir.join(GLOBAL_CONFIG_FILE))
    }

    pub fn project_config_path() -> PathBuf {
        PathBuf::from(PROJECT_CONFIG_FILE)
    }

    // =========================================================================
    // Initialization
    // =========================================================================

    /// Write the default config file to the global location, or to the
    /// current directory with `project`. Returns the path and whether it
    /// was written.
    pub fn init(project: bool, force: bool) -> Result<(PathBuf, bool)> {
        let path = if project {
            Self::project_config_path()
        } else {
            Self::global_config_path().ok_or_else(|| {
                FunnelError::Config("Cannot determine global config directory".to_string())
            })?
        };

        Self::init_at(&path, force).map(|written| (path, written))
    }

    fn init_at(path: &Path, force: bool) -> Result<bool> {
        if path.exists() && !force {
            info!("Config exists: {}", path.display());
            return Ok(false);
        }

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, Self::default_config())?;
        info!("Created config: {}", path.display());
        Ok(true)
    }

    /// Default config content (TOML)
    fn default_config() -> &'static str {
        r#"# ts-funnel configuration
# Project settings in ./.ts-funnel.toml override these.
# Environment: TS_FUNNEL_<SECTION>__<KEY>, e.g. TS_FUNNEL_SCAN__MAX_DEPTH=4

[scan]
# root = "~/Projects"
max_depth = 3
skip_dirs = []

[ports]
search_window = 100

[exposure]
binary = "tailscale"
mode = "funnel"
timeout_secs = 30

[cors]
enabled = true
"#
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ExposureMode;
    use figment::Jail;
    use tempfile::TempDir;

    #[test]
    fn test_load_defaults() {
        Jail::expect_with(|_jail| {
            let config = ConfigLoader::load_from(None, Path::new(".ts-funnel.toml")).unwrap();
            assert_eq!(config, Config::default());
            Ok(())
        });
    }

    #[test]
    fn test_project_file_over_global() {
        Jail::expect_with(|jail| {
            jail.create_file("global.toml", "[scan]\nmax_depth = 5\n[ports]\nsearch_window = 20\n")?;
            jail.create_file(".ts-funnel.toml", "[scan]\nmax_depth = 2\n")?;

            let config =
                ConfigLoader::load_from(Some(Path::new("global.toml")), Path::new(".ts-funnel.toml"))
                    .unwrap();
            assert_eq!(config.scan.max_depth, 2);
            assert_eq!(config.ports.search_window, 20);
            Ok(())
        });
    }

    #[test]
    fn test_env_override() {
        Jail::expect_with(|jail| {
            jail.create_file(".ts-funnel.toml", "[exposure]\nmode = \"funnel\"\n")?;
            jail.set_env("TS_FUNNEL_EXPOSURE__MODE", "serve");
            jail.set_env("TS_FUNNEL_SCAN__MAX_DEPTH", "4");

            let config = ConfigLoader::load_from(None, Path::new(".ts-funnel.toml")).unwrap();
            assert_eq!(config.exposure.mode, ExposureMode::Serve);
            assert_eq!(config.scan.max_depth, 4);
            Ok(())
        });
    }

    #[test]
    fn test_invalid_value_rejected() {
        Jail::expect_with(|jail| {
            jail.create_file(".ts-funnel.toml", "[exposure]\ntimeout_secs = 0\n")?;
            let err = ConfigLoader::load_from(None, Path::new(".ts-funnel.toml")).unwrap_err();
            assert!(err.to_string().contains("timeout_secs"));
            Ok(())
        });
    }

    #[test]
    fn test_init_writes_loadable_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested/config.toml");

        assert!(ConfigLoader::init_at(&path, false).unwrap());
        assert!(!ConfigLoader::init_at(&path, false).unwrap());

        let config = ConfigLoader::load_from(Some(&path), &temp.path().join("missing.toml")).unwrap();
        assert_eq!(config.exposure.binary, "tailscale");
    }
}
