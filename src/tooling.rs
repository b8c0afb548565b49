//! Tooling & Integration Layer
//!
//! Command-line entry points over the workspace session.

pub mod cli;

pub use cli::{Cli, CliContext, Commands};
