pub mod config;
pub mod down;
pub mod resolve;
pub mod scan;
pub mod status;
pub mod up;
