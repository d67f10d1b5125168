//! CLI command definitions for pipeforge.
//!
//! Exposes the pipeline runner as a command-line tool: run a pipe-delimited
//! command string, or supply one command line per stage when `|` splitting
//! would get in the way.

use clap::Parser;

use crate::pipeline::{self, RunOptions, RunStack};

/// Run pipelines of external commands with streamed output and conditional
/// success matching.
#[derive(Parser)]
#[command(name = "pipeforge")]
#[command(about = "Run external command pipelines with conditional success matching")]
#[command(version)]
#[command(
    long_about = "pipeforge runs a linear pipeline of external commands, wiring each stage's \
stdout into the next stage's stdin like a shell pipe.\n\nEvery captured stream is logged as it \
arrives, and a stage that exits non-zero is still treated as successful when any of its output \
lines matches a --success-pattern.\n\nExample usage:\n  pipeforge run \"cat access.log | grep 500 | wc -l\"\n  \
pipeforge run \"terraform apply\" --dir ./infra --success-pattern \"No changes.\""
)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info", global = true)]
    pub log_level: String,
}

/// Available CLI subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Run a pipe-delimited command pipeline.
    Run(RunArgs),

    /// Run a pipeline built from one command line per stage.
    ///
    /// Use this instead of `run` when a stage's arguments contain a literal
    /// `|` that must not split the pipeline.
    Exec(ExecArgs),
}

/// Arguments for `pipeforge run`.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// The command pipeline, e.g. "cat access.log | wc -l".
    pub command: String,

    /// Working directory applied to every stage.
    #[arg(short, long, default_value = ".")]
    pub dir: String,

    /// Regex that rescues a failing stage when it matches a line of the
    /// stage's output. Repeatable.
    #[arg(short = 'p', long = "success-pattern")]
    pub success_patterns: Vec<String>,
}

/// Arguments for `pipeforge exec`.
#[derive(Parser, Debug)]
pub struct ExecArgs {
    /// One command line per stage, in pipeline order. Repeatable.
    #[arg(short = 's', long = "stage", required = true)]
    pub stages: Vec<String>,

    /// Working directory applied to every stage.
    #[arg(short, long, default_value = ".")]
    pub dir: String,

    /// Regex that rescues a failing stage when it matches a line of the
    /// stage's output. Repeatable.
    #[arg(short = 'p', long = "success-pattern")]
    pub success_patterns: Vec<String>,
}

/// Parses CLI arguments from the process environment.
pub fn parse_cli() -> Cli {
    Cli::parse()
}

/// Parses CLI arguments and runs the selected command.
pub async fn run() -> anyhow::Result<()> {
    run_with_cli(parse_cli()).await
}

/// Runs the selected command with already-parsed arguments.
pub async fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Run(args) => {
            let options = RunOptions::new()
                .with_dir(args.dir)
                .with_success_patterns(args.success_patterns);
            pipeline::run_with_options(&args.command, &options).await?;
        }
        Commands::Exec(args) => {
            let stack = RunStack::build(&args.stages, &args.dir)?;
            pipeline::execute(stack, &args.success_patterns).await?;
        }
    }
    Ok(())
}
