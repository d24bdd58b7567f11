//! # Storage Layer
//!
//! Read-only file inputs for the CLI. Nothing here writes back: the task
//! graph itself lives only in memory.
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Plans | TOML or YAML | any path given on the command line |
//! | Config | TOML | `--config`, `TASKGRAPH_CONFIG` or `~/.config/taskgraph/config.toml` |
//!
//! ## Key Types
//!
//! - [`Plan`] - A task graph replayed from a plan file, with its keys
//! - [`Config`] - User configuration

mod config;
mod plan;

pub use config::{Config, ConfigError, OutputFormat};
pub use plan::{parse_deadline, Plan, PlanError, PlanFile, PlanTask};
