//! Canopy CLI Binary
//!
//! Command-line interface for browsing and watching a workspace tree.

use anyhow::Context;
use canopy::logging::init_logging;
use canopy::tooling::cli::{Cli, CliContext};
use clap::Parser;
use std::process;

fn main() {
    let cli = Cli::parse();
    cli.export_log_overrides();

    let context = match init(&cli) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("Error initializing workspace: {:#}", e);
            process::exit(1);
        }
    };

    match context.execute(&cli.command) {
        Ok(output) => {
            println!("{}", output);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

fn init(cli: &Cli) -> anyhow::Result<CliContext> {
    let context = CliContext::new(cli.workspace.clone(), cli.config.clone())
        .with_context(|| format!("workspace {}", cli.workspace.display()))?;
    init_logging(Some(&context.config().logging)).context("logging setup failed")?;
    Ok(context)
}
