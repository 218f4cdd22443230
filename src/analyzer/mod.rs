//! Project Analyzer Module
//!
//! Turns a directory tree into a list of classified web projects:
//! - Ordered framework marker rules
//! - Port override extraction from config files
//! - CORS allow-list file discovery
//! - Bounded directory scanning

pub mod cors;
pub mod manifest;
pub mod markers;
pub mod ports;
pub mod scanner;

pub use markers::{DirectoryListing, classify};
pub use ports::extract_port;
pub use scanner::{ProjectScanner, SkipFilter};
