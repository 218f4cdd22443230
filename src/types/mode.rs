//! Exposure mode

use serde::{Deserialize, Serialize};

/// How a port is exposed through the tunnel tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExposureMode {
    /// Public internet (Tailscale Funnel)
    #[default]
    Funnel,
    /// Tailnet only (Tailscale Serve)
    Serve,
}

impl ExposureMode {
    pub fn description(&self) -> &'static str {
        match self {
            ExposureMode::Funnel => "public",
            ExposureMode::Serve => "tailnet only",
        }
    }
}

impl std::fmt::Display for ExposureMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExposureMode::Funnel => write!(f, "funnel"),
            ExposureMode::Serve => write!(f, "serve"),
        }
    }
}

impl std::str::FromStr for ExposureMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "funnel" | "public" => Ok(ExposureMode::Funnel),
            "serve" | "tailnet" => Ok(ExposureMode::Serve),
            _ => Err(format!(
                "Invalid mode '{}'. Valid values: funnel, serve",
                s
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mode() {
        assert_eq!("funnel".parse::<ExposureMode>(), Ok(ExposureMode::Funnel));
        assert_eq!("SERVE".parse::<ExposureMode>(), Ok(ExposureMode::Serve));
        assert!("tunnel".parse::<ExposureMode>().is_err());
    }
}
