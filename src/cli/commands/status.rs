//! Status Command
//!
//! Display the tailnet domain and current funnel configuration.

use crate::cli::ui::Output;
use crate::cli::util::tailscale;
use crate::config::ConfigLoader;
use crate::types::{FunnelError, Result};

pub async fn run() -> Result<()> {
    let config = ConfigLoader::load()?;
    let tailscale = tailscale(&config);
    let out = Output::new();

    if !tailscale.is_running().await? {
        return Err(FunnelError::tool(tailscale.binary(), "not running"));
    }

    let domain = tailscale
        .domain()
        .await
        .unwrap_or_else(|_| "unknown".to_string());
    out.info(&format!("Tailscale domain: {}", domain));

    let status = tailscale.status_text().await?;
    if status.is_empty() {
        out.dim("No funnels currently configured.");
    } else {
        out.section("Current funnels");
        println!("{}", status);
    }

    Ok(())
}
