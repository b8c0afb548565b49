//! CLI Tooling
//!
//! Command-line front end: print a workspace tree, expand directories, or
//! follow live changes.

use crate::config::{CanopyConfig, ConfigLoader};
use crate::error::ApiError;
use crate::storage::LocalStorage;
use crate::tree::find_node;
use crate::workspace::{
    format_tree_json, format_tree_text, ClickIntent, ClickOutcome, WorkspaceSession,
};
use clap::{Parser, Subcommand};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Canopy CLI - live workspace directory tree
#[derive(Parser)]
#[command(name = "canopy")]
#[command(about = "Browse a workspace tree and follow filesystem changes")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, file+stderr, both)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the workspace tree
    Show {
        /// Levels to load below the root (overrides workspace.initial_depth)
        #[arg(long)]
        depth: Option<usize>,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Expand directories in order, then print the tree
    Explore {
        /// Directories to expand, absolute or relative to the workspace
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Print the tree every time a change batch alters it, until Ctrl-C
    Watch,
}

impl Cli {
    /// Export log flags as `CANOPY_LOG*` variables, which take precedence
    /// over the configuration file.
    pub fn export_log_overrides(&self) {
        if let Some(level) = &self.log_level {
            std::env::set_var("CANOPY_LOG", level);
        }
        if let Some(format) = &self.log_format {
            std::env::set_var("CANOPY_LOG_FORMAT", format);
        }
        if let Some(output) = &self.log_output {
            std::env::set_var("CANOPY_LOG_OUTPUT", output);
        }
        if let Some(file) = &self.log_file {
            std::env::set_var("CANOPY_LOG_FILE", file);
        }
    }
}

/// CLI context for one invocation
pub struct CliContext {
    workspace_root: PathBuf,
    config: CanopyConfig,
    color: bool,
}

impl CliContext {
    /// Resolve the workspace root and load its configuration.
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, ApiError> {
        let workspace_root = LocalStorage::resolve_root(&workspace_root)?;
        let config = match &config_path {
            Some(path) => ConfigLoader::load_from_file(path)?,
            None => ConfigLoader::load(&workspace_root)?,
        };
        let color = std::io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none();
        Ok(Self {
            workspace_root,
            config,
            color,
        })
    }

    pub fn config(&self) -> &CanopyConfig {
        &self.config
    }

    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    /// Execute a CLI command, returning the text to print.
    pub fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        let runtime = tokio::runtime::Runtime::new().map_err(|e| {
            ApiError::ConfigError(format!("Failed to start async runtime: {}", e))
        })?;
        runtime.block_on(self.execute_async(command))
    }

    async fn execute_async(&self, command: &Commands) -> Result<String, ApiError> {
        match command {
            Commands::Show { depth, format } => self.show(*depth, format).await,
            Commands::Explore { paths } => self.explore(paths).await,
            Commands::Watch => self.watch().await,
        }
    }

    async fn open_session(&self, config: &CanopyConfig) -> Result<WorkspaceSession, ApiError> {
        let storage = Arc::new(LocalStorage::from_config(config)?);
        WorkspaceSession::open(storage, self.workspace_root.clone()).await
    }

    async fn show(&self, depth: Option<usize>, format: &str) -> Result<String, ApiError> {
        if format != "text" && format != "json" {
            return Err(ApiError::ConfigError(format!(
                "Invalid format: {} (must be 'text' or 'json')",
                format
            )));
        }
        let mut config = self.config.clone();
        if let Some(depth) = depth {
            config.workspace.initial_depth = depth;
        }
        let session = self.open_session(&config).await?;
        let tree = session.snapshot();
        session.close().await;

        if format == "json" {
            format_tree_json(&tree).map_err(|e| {
                ApiError::ConfigError(format!("Failed to serialize tree: {}", e))
            })
        } else {
            Ok(format_tree_text(&tree, None, self.color))
        }
    }

    async fn explore(&self, paths: &[PathBuf]) -> Result<String, ApiError> {
        let session = self.open_session(&self.config).await?;
        let mut lines = Vec::new();
        for path in paths {
            let target = if path.is_absolute() {
                path.clone()
            } else {
                self.workspace_root.join(path)
            };
            let snapshot = session.snapshot();
            let Some(node) = find_node(&snapshot, &target) else {
                session.close().await;
                return Err(ApiError::InvalidPath(target));
            };
            let outcome = session.click(ClickIntent::for_node(node)).await;
            let outcome = match outcome {
                Ok(outcome) => outcome,
                Err(e) => {
                    session.close().await;
                    return Err(e);
                }
            };
            lines.push(describe_outcome(&target, &outcome));
        }
        let tree = session.snapshot();
        session.close().await;

        lines.push(format_tree_text(&tree, None, self.color));
        Ok(lines.join("\n"))
    }

    async fn watch(&self) -> Result<String, ApiError> {
        let session = self.open_session(&self.config).await?;
        let mut snapshots = session.subscribe_snapshots();
        println!("{}", format_tree_text(&session.snapshot(), None, self.color));
        info!(root = %self.workspace_root.display(), "Watching workspace");

        loop {
            tokio::select! {
                changed = snapshots.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let tree = snapshots.borrow_and_update().clone();
                    println!("{}", format_tree_text(&tree, None, self.color));
                }
                _ = tokio::signal::ctrl_c() => break,
            }
        }
        session.close().await;
        Ok(format!("Stopped watching {}", self.workspace_root.display()))
    }
}

fn describe_outcome(target: &Path, outcome: &ClickOutcome) -> String {
    match outcome {
        ClickOutcome::Explored { child_count, .. } => {
            format!("Explored {} ({} entries)", target.display(), child_count)
        }
        ClickOutcome::Toggled { is_open, .. } => format!(
            "{} {}",
            if *is_open { "Opened" } else { "Closed" },
            target.display()
        ),
        ClickOutcome::OpenFile { .. } => format!("{} is a file", target.display()),
        ClickOutcome::Ignored => format!("Nothing to do for {}", target.display()),
    }
}
