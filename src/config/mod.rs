//! Configuration Management
//!
//! Unified configuration system with hierarchical resolution:
//! 1. Built-in defaults
//! 2. Global config (<config dir>/ts-funnel/config.toml)
//! 3. Project config (./.ts-funnel.toml)
//! 4. Environment variables (TS_FUNNEL_*)
//! 5. CLI arguments (highest priority)

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::*;
