//! Exposure Module
//!
//! Boundary to the external tunnel tool: a process runner and the Tailscale
//! driver built on it.

pub mod report;
pub mod runner;
pub mod tailscale;

pub use report::{ExposureEntry, ExposureOutcome, ExposureReport, public_url};
pub use runner::{CommandOutput, CommandRunner, SystemRunner};
pub use tailscale::Tailscale;
