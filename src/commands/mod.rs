//! Subcommand implementations for the `orb-scanner` binary

pub mod analyze;
pub mod download;
