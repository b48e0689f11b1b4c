// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `stackdag`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "stackdag",
    version,
    about = "Build and run declarative provisioning stacks as job DAGs.",
    long_about = None
)]
pub struct CliArgs {
    /// Stack to operate on (e.g. "aws_eks").
    #[arg(long, value_name = "NAME")]
    pub stack: String,

    /// Path to the variable inputs file (TOML).
    ///
    /// Default: `Stackvars.toml` in the current working directory.
    #[arg(long, value_name = "PATH", default_value = "Stackvars.toml")]
    pub vars: String,

    /// Validate the stack and print its variables, jobs and edges, but
    /// don't submit anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Fan-in policy for jobs with multiple predecessors: "all" (default)
    /// or "any".
    #[arg(long, value_name = "POLICY", default_value = "all")]
    pub fan_in: String,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `STACKDAG_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
