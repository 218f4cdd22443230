pub mod commands;
pub mod ui;
pub mod util;

pub use util::{CommandContext, confirm, default_projects_dir};
