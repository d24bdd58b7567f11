//! # Command-Line Interface
//!
//! Read-only views over a plan file.
//!
//! | Command | Purpose |
//! |---------|---------|
//! | `order` | Every task in execution order |
//! | `ready` | Pending tasks whose dependencies are done |
//! | `blocked` | Tasks with blocked status or unmet dependencies |
//! | `board` | Tasks grouped by status |
//! | `kpi` | Points and completed tasks per assignee |
//! | `show` | One task's details |
//! | `check` | Validate a plan |
//! | `demo` | The built-in two-task example |
//!
//! ## Output Formats
//!
//! All commands support `--format` flag:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod demo;
mod output;
mod query;

pub use app::{run, Cli, Commands, LogLevel};
pub use output::{Output, OutputFormat};
