//! Logging setup for `taskgraph` using `tracing` + `tracing-subscriber`.
//!
//! Priority for determining the log filter:
//! 1. `--log-level` CLI flag (if provided)
//! 2. `--verbose` (debug)
//! 3. `TASKGRAPH_LOG` environment variable (any `EnvFilter` directive)
//! 4. `log_level` from the config file
//! 5. default to `warn`
//!
//! Logs are sent to STDERR so that stdout carries only command output.

use anyhow::{anyhow, Context, Result};
use tracing_subscriber::{fmt, EnvFilter};

use crate::cli::LogLevel;

pub const LOG_ENV: &str = "TASKGRAPH_LOG";

const DEFAULT_DIRECTIVE: &str = "warn";

/// Initialise global logging subscriber.
///
/// Safe to call once at startup.
pub fn init_logging(
    cli_level: Option<LogLevel>,
    verbose: bool,
    config_level: Option<&str>,
) -> Result<()> {
    let env_level = std::env::var(LOG_ENV).ok();
    let directive = resolve_directive(cli_level, verbose, env_level.as_deref(), config_level);

    let filter = EnvFilter::try_new(&directive)
        .with_context(|| format!("Invalid log filter '{}'", directive))?;

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("Failed to initialise logging: {}", e))
}

/// Picks the filter directive from the sources in priority order
pub fn resolve_directive(
    cli_level: Option<LogLevel>,
    verbose: bool,
    env_level: Option<&str>,
    config_level: Option<&str>,
) -> String {
    if let Some(level) = cli_level {
        return level.as_str().to_string();
    }
    if verbose {
        return LogLevel::Debug.as_str().to_string();
    }

    [env_level, config_level]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|s| !s.is_empty())
        .unwrap_or(DEFAULT_DIRECTIVE)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_wins_over_everything() {
        let directive =
            resolve_directive(Some(LogLevel::Trace), true, Some("info"), Some("error"));
        assert_eq!(directive, "trace");
    }

    #[test]
    fn verbose_means_debug() {
        assert_eq!(resolve_directive(None, true, Some("info"), None), "debug");
    }

    #[test]
    fn env_then_config_then_default() {
        assert_eq!(
            resolve_directive(None, false, Some("taskgraph=trace"), Some("error")),
            "taskgraph=trace"
        );
        assert_eq!(resolve_directive(None, false, Some("  "), Some("error")), "error");
        assert_eq!(resolve_directive(None, false, None, None), "warn");
    }
}
