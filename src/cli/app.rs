//! Main CLI application structure

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::debug;

use super::output::{Output, OutputFormat};
use super::{demo, query};
use crate::logging;
use crate::storage::{Config, Plan};

#[derive(Parser)]
#[command(name = "taskgraph")]
#[command(author, version, about = "Task bookkeeping with an acyclic dependency graph")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (defaults to the config's default_format)
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Log level (overrides --verbose and TASKGRAPH_LOG)
    #[arg(long, global = true)]
    pub log_level: Option<LogLevel>,

    /// Config file path
    #[arg(long, global = true, env = "TASKGRAPH_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print every task in execution order
    Order {
        /// Plan file (TOML, or YAML with a .yaml/.yml extension)
        plan: PathBuf,
    },

    /// Show pending tasks whose dependencies are all done
    Ready {
        /// Plan file
        plan: PathBuf,
    },

    /// Show tasks with blocked status or waiting on unfinished dependencies
    Blocked {
        /// Plan file
        plan: PathBuf,
    },

    /// Show tasks grouped by status
    Board {
        /// Plan file
        plan: PathBuf,
    },

    /// Show points and completed tasks per assignee
    Kpi {
        /// Plan file
        plan: PathBuf,
    },

    /// Show task details
    Show {
        /// Plan file
        plan: PathBuf,

        /// Task key or ID
        task: String,
    },

    /// Validate a plan file
    Check {
        /// Plan file
        plan: PathBuf,
    },

    /// Build the database/API example and print its order
    Demo,
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    logging::init_logging(cli.log_level, cli.verbose, config.log_level.as_deref())?;
    debug!(config = ?cli.config, "taskgraph starting");

    let output = Output::new(cli.format.unwrap_or(config.default_format));

    match cli.command {
        Commands::Order { plan } => query::order(&output, &load_plan(&plan, &config)?)?,
        Commands::Ready { plan } => query::ready(&output, &load_plan(&plan, &config)?)?,
        Commands::Blocked { plan } => query::blocked(&output, &load_plan(&plan, &config)?)?,
        Commands::Board { plan } => query::board(&output, &load_plan(&plan, &config)?)?,
        Commands::Kpi { plan } => query::kpi(&output, &load_plan(&plan, &config)?)?,
        Commands::Show { plan, task } => query::show(&output, &load_plan(&plan, &config)?, &task)?,
        Commands::Check { plan } => query::check(&output, &load_plan(&plan, &config)?)?,
        Commands::Demo => demo::run(&output)?,
    }

    debug!("command completed successfully");
    Ok(())
}

fn load_plan(path: &std::path::Path, config: &Config) -> Result<Plan> {
    Plan::load(path, config.default_priority)
        .with_context(|| format!("Invalid plan: {}", path.display()))
}
