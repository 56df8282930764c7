//! Command implementations.

pub mod config_cmd;
pub mod discover;
pub mod scan;
