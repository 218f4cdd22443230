//! Down Command
//!
//! Remove serve and funnel configuration.

use crate::cli::ui::Output;
use crate::cli::util::tailscale;
use crate::config::ConfigLoader;
use crate::types::Result;

pub async fn run(all: bool) -> Result<()> {
    let out = Output::new();

    if !all {
        out.info("Use --all to remove all funnels.");
        return Ok(());
    }

    let config = ConfigLoader::load()?;
    tailscale(&config).reset().await?;
    out.success("All funnels removed.");
    Ok(())
}
