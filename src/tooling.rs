//! Tooling & Integration Layer
//!
//! The `bms` operator CLI.

pub mod cli;

pub use cli::{Cli, CliContext, CommandOutput, Commands};
