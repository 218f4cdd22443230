//! Config Command
//!
//! Manage ts-funnel configuration.
//!
//! Usage:
//!   ts-funnel config show [-f json|toml]
//!   ts-funnel config path
//!   ts-funnel config init [--project] [--force]

use crate::cli::ui::Output;
use crate::config::ConfigLoader;
use crate::types::{FunnelError, Result};

/// Show the merged effective configuration
pub fn show(format: &str) -> Result<()> {
    let config = ConfigLoader::load()?;

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&config)?),
        "toml" | "text" => println!(
            "{}",
            toml::to_string_pretty(&config).map_err(|e| FunnelError::Config(e.to_string()))?
        ),
        other => {
            return Err(FunnelError::Config(format!(
                "Unknown format '{}'. Valid values: toml, json",
                other
            )));
        }
    }

    Ok(())
}

/// Show configuration paths
pub fn path() -> Result<()> {
    println!("Configuration paths:");
    println!();

    match ConfigLoader::global_config_path() {
        Some(global) => {
            let exists = if global.exists() { "✓" } else { "✗" };
            println!("  Global:  {} {}", exists, global.display());
        }
        None => println!("  Global:  (not available)"),
    }

    let project = ConfigLoader::project_config_path();
    let exists = if project.exists() { "✓" } else { "✗" };
    println!("  Project: {} {}", exists, project.display());

    Ok(())
}

/// Write the default config file
pub fn init(project: bool, force: bool) -> Result<()> {
    let out = Output::new();
    let (path, written) = ConfigLoader::init(project, force)?;

    if written {
        out.success(&format!("Created {}", path.display()));
    } else {
        out.info(&format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        ));
    }
    Ok(())
}
