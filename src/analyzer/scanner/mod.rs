pub mod filter;
pub mod project_scanner;

pub use filter::SkipFilter;
pub use project_scanner::ProjectScanner;
