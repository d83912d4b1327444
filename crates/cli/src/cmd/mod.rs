//! CLI command implementations

pub mod example_config;
pub mod once;
pub mod watch;
