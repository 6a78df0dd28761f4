//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use contracts::Severity;
use std::path::PathBuf;

/// logmux - fan one log call out to many sinks
#[derive(Parser, Debug)]
#[command(
    name = "logmux",
    author,
    version,
    about = "Logging multiplexer",
    long_about = "Builds a logging multiplexer from a configuration file and delivers \n\
                  records to every configured sink: console, file, tracing or a UDP \n\
                  forwarder."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "LOGMUX_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "compact",
        global = true,
        env = "LOGMUX_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Deliver one record to every sink
    Emit(EmitArgs),

    /// Deliver each stdin line to every sink
    Pipe(PipeArgs),

    /// Validate configuration file without opening sinks
    Validate(ValidateArgs),

    /// Display configuration information
    Info(InfoArgs),
}

/// Arguments for the `emit` command
#[derive(Parser, Debug, Clone)]
pub struct EmitArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(short, long, default_value = "logmux.toml", env = "LOGMUX_CONFIG")]
    pub config: PathBuf,

    /// Record severity
    #[arg(short, long, default_value = "info")]
    pub severity: Severity,

    /// Program name for this record
    #[arg(short, long)]
    pub progname: Option<String>,

    /// Print delivery statistics after closing
    #[arg(long)]
    pub stats: bool,

    /// Message text
    pub message: String,
}

/// Arguments for the `pipe` command
#[derive(Parser, Debug, Clone)]
pub struct PipeArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(short, long, default_value = "logmux.toml", env = "LOGMUX_CONFIG")]
    pub config: PathBuf,

    /// Log each line at this severity instead of writing it raw
    #[arg(short, long)]
    pub severity: Option<Severity>,

    /// Stop at the first delivery failure
    #[arg(long)]
    pub fail_fast: bool,

    /// Print delivery statistics after closing
    #[arg(long)]
    pub stats: bool,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "LOGMUX_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "logmux.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "logmux.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    Pretty,
    /// Compact single-line format
    #[default]
    Compact,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_emit() {
        let cli = Cli::try_parse_from([
            "logmux", "-v", "emit", "-c", "app.toml", "--severity", "WARNING", "-p", "svc",
            "disk almost full",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 1);
        let Commands::Emit(args) = cli.command else {
            panic!("expected emit");
        };
        assert_eq!(args.config, PathBuf::from("app.toml"));
        assert_eq!(args.severity, Severity::Warn);
        assert_eq!(args.progname.as_deref(), Some("svc"));
        assert_eq!(args.message, "disk almost full");
    }

    #[test]
    fn test_parse_pipe_defaults() {
        let cli = Cli::try_parse_from(["logmux", "pipe"]).unwrap();
        let Commands::Pipe(args) = cli.command else {
            panic!("expected pipe");
        };
        assert_eq!(args.severity, None);
        assert_eq!(args.metrics_port, 0);
        assert!(!args.fail_fast);
    }

    #[test]
    fn test_rejects_unknown_severity() {
        assert!(Cli::try_parse_from(["logmux", "emit", "--severity", "loud", "x"]).is_err());
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["logmux", "-q", "-v", "info"]).is_err());
    }
}
