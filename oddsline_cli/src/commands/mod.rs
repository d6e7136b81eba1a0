//! CLI subcommand implementations.

pub mod cache;
pub mod credits;
pub mod odds;
